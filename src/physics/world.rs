use super::body::{Body, BodyId};
use super::collision;
use super::constraint::PointerConstraint;
use super::vec2::Vec2;
use super::{GRAVITY, MAX_SPEED};

/// Velocity impulse iterations per step.
const SOLVER_ITERATIONS: usize = 4;

/// Manages all rigid bodies in the simulation.
pub struct PhysicsWorld {
    bodies: Vec<Body>,
    next_id: BodyId,
    pub gravity: Vec2,
    drag: Option<PointerConstraint>,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            next_id: 1,
            gravity: Vec2::new(0.0, GRAVITY),
            drag: None,
        }
    }

    /// Add a body and return its ID. Insertion order is preserved, which the
    /// gallery relies on for draw order.
    pub fn add_body(&mut self, mut body: Body) -> BodyId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        body.id = id;
        self.bodies.push(body);
        id
    }

    /// Remove a body by ID.
    pub fn remove_body(&mut self, id: BodyId) -> bool {
        let Some(idx) = self.bodies.iter().position(|b| b.id == id) else {
            return false;
        };
        self.bodies.remove(idx);
        if self.drag.as_ref().map(|d| d.body) == Some(id) {
            self.drag = None;
        }
        true
    }

    /// Remove all bodies and any active drag.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.drag = None;
        self.next_id = 1;
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn set_position(&mut self, id: BodyId, x: f32, y: f32) {
        if let Some(body) = self.body_mut(id) {
            body.pos = Vec2::new(x, y);
        }
    }

    pub fn set_velocity(&mut self, id: BodyId, x: f32, y: f32) {
        if let Some(body) = self.body_mut(id) {
            body.velocity = Vec2::new(x, y);
        }
    }

    pub fn set_angular_velocity(&mut self, id: BodyId, w: f32) {
        if let Some(body) = self.body_mut(id) {
            body.angular_vel = w;
        }
    }

    // === POINTER DRAG ===

    /// Grab the topmost dynamic body under `point`, if any.
    pub fn start_drag(&mut self, point: Vec2) -> Option<BodyId> {
        let body = self
            .bodies
            .iter()
            .rev()
            .find(|b| !b.is_static && b.contains_point(point))?;
        let constraint = PointerConstraint::new(body.id, body.to_local(point), point);
        let id = body.id;
        self.drag = Some(constraint);
        Some(id)
    }

    pub fn update_drag(&mut self, point: Vec2) {
        if let Some(drag) = &mut self.drag {
            drag.target = point;
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn dragging(&self) -> Option<BodyId> {
        self.drag.as_ref().map(|d| d.body)
    }

    /// Advance the simulation by one fixed timestep (`dt` in seconds).
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        // Integrate velocities; clamp to keep cost bounded and avoid tunneling.
        for body in self.bodies.iter_mut() {
            if body.is_static {
                continue;
            }
            body.velocity = body.velocity + self.gravity * dt;
            let speed = body.velocity.length();
            if speed > MAX_SPEED {
                body.velocity = body.velocity * (MAX_SPEED / speed);
            }
        }

        // Pointer spring overrides gravity's pull while a body is held.
        if let Some(drag) = &self.drag {
            if let Some(body) = self.bodies.iter_mut().find(|b| b.id == drag.body) {
                drag.apply(body, dt);
            }
        }

        // Integrate positions.
        for body in self.bodies.iter_mut() {
            if body.is_static {
                continue;
            }
            body.pos = body.pos + body.velocity * dt;
            body.angle += body.angular_vel * dt;
        }

        // Narrow phase once, then iterate the impulse response.
        let mut manifolds = Vec::new();
        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                if self.bodies[i].is_static && self.bodies[j].is_static {
                    continue;
                }
                if let Some(contact) = collision::collide(&self.bodies[i], &self.bodies[j]) {
                    manifolds.push((i, j, contact));
                }
            }
        }

        for _ in 0..SOLVER_ITERATIONS {
            for (i, j, contact) in manifolds.iter() {
                let (head, tail) = self.bodies.split_at_mut(*j);
                collision::solve(&mut head[*i], &mut tail[0], contact);
            }
        }

        for (i, j, contact) in manifolds.iter() {
            let (head, tail) = self.bodies.split_at_mut(*j);
            collision::correct(&mut head[*i], &mut tail[0], contact);
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::Material;

    fn square(x: f32, y: f32, half: f32) -> Body {
        let outline = vec![
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ];
        Body::from_vertices(x, y, &outline, Material::new(0.4, 0.5, 0.001))
    }

    #[test]
    fn add_remove_clear() {
        let mut world = PhysicsWorld::new();
        let a = world.add_body(square(0.0, 0.0, 10.0));
        let b = world.add_body(square(100.0, 0.0, 10.0));
        assert_ne!(a, b);
        assert_eq!(world.body_count(), 2);

        assert!(world.remove_body(a));
        assert!(!world.remove_body(a));
        assert_eq!(world.body_count(), 1);

        world.clear();
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn gravity_pulls_dynamic_bodies_down() {
        let mut world = PhysicsWorld::new();
        let id = world.add_body(square(0.0, 0.0, 10.0));

        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }

        let body = world.body(id).expect("body exists");
        // Roughly g t² / 2 after one second of free fall.
        assert!(body.pos.y > 400.0 && body.pos.y < 600.0);
        assert!(body.velocity.y > 900.0);
    }

    #[test]
    fn static_bodies_never_move() {
        let mut world = PhysicsWorld::new();
        let id = world.add_body(Body::static_rect(100.0, 200.0, 400.0, 20.0));

        for _ in 0..120 {
            world.step(1.0 / 60.0);
        }

        let wall = world.body(id).expect("wall exists");
        assert_eq!(wall.pos, Vec2::new(100.0, 200.0));
        assert_eq!(wall.velocity, Vec2::zero());
    }

    #[test]
    fn dropped_body_settles_on_the_floor() {
        let mut world = PhysicsWorld::new();
        world.add_body(Body::static_rect(0.0, 300.0, 400.0, 20.0));
        let id = world.add_body(square(0.0, 200.0, 20.0));

        for _ in 0..600 {
            world.step(1.0 / 60.0);
        }

        let body = world.body(id).expect("body exists");
        // Resting on the floor top (y = 290) with its half-extent above it.
        assert!(body.pos.y > 260.0 && body.pos.y < 275.0, "y = {}", body.pos.y);
        assert!(body.velocity.length() < 30.0);
    }

    #[test]
    fn drag_pulls_a_grabbed_body() {
        let mut world = PhysicsWorld::new();
        world.gravity = Vec2::zero();
        let id = world.add_body(square(100.0, 100.0, 20.0));

        assert_eq!(world.start_drag(Vec2::new(100.0, 100.0)), Some(id));
        world.update_drag(Vec2::new(300.0, 100.0));

        for _ in 0..300 {
            world.step(1.0 / 60.0);
        }

        let body = world.body(id).expect("body exists");
        assert!((body.pos.x - 300.0).abs() < 5.0, "x = {}", body.pos.x);

        world.end_drag();
        assert_eq!(world.dragging(), None);
    }

    #[test]
    fn drag_misses_empty_space_and_static_walls() {
        let mut world = PhysicsWorld::new();
        world.add_body(Body::static_rect(0.0, 0.0, 100.0, 100.0));
        assert_eq!(world.start_drag(Vec2::new(0.0, 0.0)), None);
        assert_eq!(world.start_drag(Vec2::new(500.0, 500.0)), None);
    }

    #[test]
    fn removing_a_dragged_body_clears_the_drag() {
        let mut world = PhysicsWorld::new();
        let id = world.add_body(square(0.0, 0.0, 10.0));
        world.start_drag(Vec2::new(0.0, 0.0));
        assert_eq!(world.dragging(), Some(id));

        world.remove_body(id);
        assert_eq!(world.dragging(), None);
    }
}
