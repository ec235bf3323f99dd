use super::body::{Body, BodyId};
use super::vec2::Vec2;

/// Damped spring between a grabbed point on a body and the pointer.
///
/// Each step the body gains velocity toward the pointer proportional to the
/// remaining gap; the damping term eats the previous velocity so the body
/// follows without orbiting the cursor.
pub struct PointerConstraint {
    pub body: BodyId,
    /// Grab point in body-local coordinates
    pub local_anchor: Vec2,
    /// Pointer position in world coordinates
    pub target: Vec2,
    pub stiffness: f32,
    pub damping: f32,
}

impl PointerConstraint {
    pub fn new(body: BodyId, local_anchor: Vec2, target: Vec2) -> Self {
        Self {
            body,
            local_anchor,
            target,
            stiffness: 0.08,
            damping: 0.45,
        }
    }

    /// Pull the body toward the pointer. `dt` is the fixed step in seconds.
    pub(crate) fn apply(&self, body: &mut Body, dt: f32) {
        if body.is_static || dt <= 0.0 {
            return;
        }

        let anchor = body.to_world(self.local_anchor);
        let gap = self.target - anchor;

        // stiffness is "fraction of the gap closed per step", like the
        // position advance of a kinematic spring: v * dt == gap * stiffness.
        let pull = gap * (self.stiffness / dt);
        body.velocity = body.velocity * self.damping + pull;
        body.angular_vel *= self.damping;
    }
}
