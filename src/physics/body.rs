use super::vec2::Vec2;

pub type BodyId = u32;

/// Surface/material properties for a dynamic body.
#[derive(Clone, Copy, Debug)]
pub struct Material {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Material {
    pub fn new(restitution: f32, friction: f32, density: f32) -> Self {
        Self { restitution, friction, density }
    }
}

/// Rigid Body - a convex polygon moving as a single unit
pub struct Body {
    /// Unique ID for this body (assigned by the world)
    pub id: BodyId,

    // === Physics State ===
    /// World position (center of mass)
    pub pos: Vec2,
    /// Velocity vector (pixels per second)
    pub velocity: Vec2,
    /// Rotation angle (radians)
    pub angle: f32,
    /// Angular velocity (radians per second)
    pub angular_vel: f32,

    /// Static bodies never move and have infinite mass
    pub is_static: bool,

    // === Material ===
    /// Bounciness (0.0 = no bounce, 1.0 = full elastic)
    pub restitution: f32,
    /// Coulomb friction coefficient
    pub friction: f32,

    // === Mass Properties ===
    /// 1 / mass (0 for static bodies)
    pub inv_mass: f32,
    /// 1 / moment of inertia about the center of mass (0 for static bodies)
    pub inv_inertia: f32,

    // === Shape ===
    /// Convex hull in local space, counter-clockwise, centered on the centroid
    pub hull: Vec<Vec2>,
    /// Radius of the bounding circle around the local origin
    pub bounding_radius: f32,
}

impl Body {
    /// Create a dynamic body from an arbitrary vertex outline.
    ///
    /// The outline may be concave; collision uses its convex hull. The hull
    /// is re-centered so (x, y) is the center of mass.
    pub fn from_vertices(x: f32, y: f32, outline: &[Vec2], material: Material) -> Self {
        let mut hull = convex_hull(outline);
        let (area, centroid, inertia_per_density) = mass_properties(&hull);

        for v in hull.iter_mut() {
            *v = *v - centroid;
        }

        let mass = (material.density * area).max(1e-6);
        // Parallel axis shift: inertia about the centroid instead of the origin.
        let inertia =
            (material.density * inertia_per_density - mass * centroid.length_squared()).max(1e-6);

        let bounding_radius = hull
            .iter()
            .map(|v| v.length())
            .fold(0.0_f32, f32::max);

        Self {
            id: 0,
            pos: Vec2::new(x, y),
            velocity: Vec2::zero(),
            angle: 0.0,
            angular_vel: 0.0,
            is_static: false,
            restitution: material.restitution,
            friction: material.friction,
            inv_mass: 1.0 / mass,
            inv_inertia: 1.0 / inertia,
            hull,
            bounding_radius,
        }
    }

    /// Create a static rectangle (boundary wall) centered at (x, y).
    pub fn static_rect(x: f32, y: f32, w: f32, h: f32) -> Self {
        let hw = w / 2.0;
        let hh = h / 2.0;
        let hull = vec![
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ];

        Self {
            id: 0,
            pos: Vec2::new(x, y),
            velocity: Vec2::zero(),
            angle: 0.0,
            angular_vel: 0.0,
            is_static: true,
            restitution: 0.0,
            friction: 0.5,
            inv_mass: 0.0,
            inv_inertia: 0.0,
            hull,
            bounding_radius: (hw * hw + hh * hh).sqrt(),
        }
    }

    /// Transform a local point to world coordinates
    #[inline]
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.pos + local.rotated(self.angle)
    }

    /// Transform a world point to local coordinates
    #[inline]
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        (world - self.pos).rotated(-self.angle)
    }

    /// Hull vertices in world space
    pub fn world_hull(&self) -> Vec<Vec2> {
        self.hull.iter().map(|v| self.to_world(*v)).collect()
    }

    /// Point-in-body test against the world-space hull
    pub fn contains_point(&self, point: Vec2) -> bool {
        let local = self.to_local(point);
        let n = self.hull.len();
        for i in 0..n {
            let a = self.hull[i];
            let b = self.hull[(i + 1) % n];
            if (b - a).cross(local - a) < 0.0 {
                return false;
            }
        }
        true
    }

    /// Apply an impulse at a world-space contact point
    pub fn apply_impulse_at(&mut self, impulse: Vec2, contact: Vec2) {
        if self.is_static {
            return;
        }
        self.velocity = self.velocity + impulse * self.inv_mass;
        let r = contact - self.pos;
        self.angular_vel += r.cross(impulse) * self.inv_inertia;
    }
}

/// Andrew monotone chain. Returns the hull counter-clockwise.
fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut pts: Vec<Vec2> = points.to_vec();
    pts.sort_by(|a, b| {
        (a.x, a.y)
            .partial_cmp(&(b.x, b.y))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    pts.dedup_by(|a, b| (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6);

    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Vec2> = Vec::with_capacity(pts.len() * 2);

    // Lower hull
    for &p in pts.iter() {
        while hull.len() >= 2 {
            let a = hull[hull.len() - 2];
            let b = hull[hull.len() - 1];
            if (b - a).cross(p - a) <= 0.0 {
                hull.pop();
            } else {
                break;
            }
        }
        hull.push(p);
    }

    // Upper hull
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len {
            let a = hull[hull.len() - 2];
            let b = hull[hull.len() - 1];
            if (b - a).cross(p - a) <= 0.0 {
                hull.pop();
            } else {
                break;
            }
        }
        hull.push(p);
    }

    hull.pop();
    hull
}

/// Area, centroid and second moment (per unit density, about the origin)
/// of a counter-clockwise polygon.
fn mass_properties(hull: &[Vec2]) -> (f32, Vec2, f32) {
    let n = hull.len();
    if n < 3 {
        return (1.0, Vec2::zero(), 1.0);
    }

    let mut twice_area = 0.0_f32;
    let mut centroid = Vec2::zero();
    let mut second_moment = 0.0_f32;

    for i in 0..n {
        let p1 = hull[i];
        let p2 = hull[(i + 1) % n];
        let cross = p1.cross(p2);
        twice_area += cross;
        centroid = centroid + (p1 + p2) * cross;
        second_moment += cross * (p1.dot(p1) + p1.dot(p2) + p2.dot(p2));
    }

    let area = (twice_area / 2.0).abs().max(1e-6);
    let centroid = centroid * (1.0 / (3.0 * twice_area));
    let second_moment = (second_moment / 12.0).abs();

    (area, centroid, second_moment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_outline(half: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ]
    }

    #[test]
    fn hull_of_concave_outline_is_convex() {
        // Arrow with a notch; the notch vertex must not survive.
        let outline = vec![
            Vec2::new(0.0, -10.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 3.0),
            Vec2::new(-10.0, 10.0),
        ];
        let hull = convex_hull(&outline);
        assert_eq!(hull.len(), 3);
        assert!(!hull.iter().any(|v| (v.y - 3.0).abs() < 1e-3));
    }

    #[test]
    fn hull_is_counter_clockwise() {
        let hull = convex_hull(&square_outline(5.0));
        let mut twice_area = 0.0;
        for i in 0..hull.len() {
            twice_area += hull[i].cross(hull[(i + 1) % hull.len()]);
        }
        assert!(twice_area > 0.0);
    }

    #[test]
    fn from_vertices_centers_on_centroid() {
        // Off-center square: centroid at (10, 10), so the body hull re-centers.
        let outline = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(20.0, 20.0),
            Vec2::new(0.0, 20.0),
        ];
        let body = Body::from_vertices(50.0, 50.0, &outline, Material::new(0.4, 0.5, 0.001));
        let sum: Vec2 = body.hull.iter().fold(Vec2::zero(), |acc, v| acc + *v);
        assert!(sum.length() < 1e-3);
        assert_eq!(body.pos, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn square_mass_matches_density_times_area() {
        let body = Body::from_vertices(0.0, 0.0, &square_outline(10.0), Material::new(0.0, 0.5, 0.001));
        let mass = 1.0 / body.inv_mass;
        assert!((mass - 0.001 * 400.0).abs() < 1e-4);
    }

    #[test]
    fn contains_point_respects_rotation() {
        let mut body = Body::from_vertices(0.0, 0.0, &square_outline(10.0), Material::new(0.0, 0.5, 0.001));
        assert!(body.contains_point(Vec2::new(9.0, 9.0)));
        assert!(!body.contains_point(Vec2::new(11.0, 0.0)));

        body.angle = std::f32::consts::FRAC_PI_4;
        // Rotated 45°, the old corner region is now outside…
        assert!(!body.contains_point(Vec2::new(9.0, 9.0)));
        // …but the diagonal reaches further along the axes.
        assert!(body.contains_point(Vec2::new(13.0, 0.0)));
    }

    #[test]
    fn static_rect_has_infinite_mass() {
        let wall = Body::static_rect(400.0, 600.0, 800.0, 20.0);
        assert!(wall.is_static);
        assert_eq!(wall.inv_mass, 0.0);
        assert_eq!(wall.inv_inertia, 0.0);
        assert_eq!(wall.hull.len(), 4);
    }
}
