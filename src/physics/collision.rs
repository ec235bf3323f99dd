//! Convex polygon contact generation (SAT + face clipping) and the
//! impulse response with friction, restitution and positional correction.

use super::body::Body;
use super::vec2::Vec2;

/// Contacts slower than this along the normal are treated as inelastic,
/// which keeps resting stacks from jittering.
const RESTITUTION_THRESHOLD: f32 = 30.0;
const PENETRATION_SLOP: f32 = 0.05;
const CORRECTION_PERCENT: f32 = 0.2;

/// Contact manifold between two bodies.
pub struct Contact {
    /// Unit normal pointing from body A to body B
    pub normal: Vec2,
    pub penetration: f32,
    pub points: [Vec2; 2],
    pub count: usize,
}

/// Narrow phase: SAT over both hulls, then clip the incident face against
/// the reference face to get up to two contact points.
pub(crate) fn collide(a: &Body, b: &Body) -> Option<Contact> {
    let delta = b.pos - a.pos;
    let reach = a.bounding_radius + b.bounding_radius;
    if delta.length_squared() > reach * reach {
        return None;
    }

    let hull_a = a.world_hull();
    let hull_b = b.world_hull();
    if hull_a.len() < 3 || hull_b.len() < 3 {
        return None;
    }

    let (sep_a, face_a) = max_separation(&hull_a, &hull_b);
    if sep_a > 0.0 {
        return None;
    }
    let (sep_b, face_b) = max_separation(&hull_b, &hull_a);
    if sep_b > 0.0 {
        return None;
    }

    // Reference face = the one with the shallowest penetration.
    let (reference, incident, ref_face, flip) = if sep_b > sep_a + 1e-3 {
        (&hull_b, &hull_a, face_b, true)
    } else {
        (&hull_a, &hull_b, face_a, false)
    };

    let n = reference.len();
    let v1 = reference[ref_face];
    let v2 = reference[(ref_face + 1) % n];
    let ref_normal = face_normal(v1, v2);

    let inc_face = incident_face(incident, ref_normal);
    let m = incident.len();
    let mut i1 = incident[inc_face];
    let mut i2 = incident[(inc_face + 1) % m];

    // Clip to the reference face's side planes.
    let side = (v2 - v1).normalize();
    if !clip_segment(&mut i1, &mut i2, -side, -side.dot(v1)) {
        return None;
    }
    if !clip_segment(&mut i1, &mut i2, side, side.dot(v2)) {
        return None;
    }

    // Keep only points behind the reference face.
    let mut points = [Vec2::zero(); 2];
    let mut count = 0;
    let mut penetration = 0.0;
    for p in [i1, i2] {
        let depth = ref_normal.dot(v1 - p);
        if depth >= 0.0 {
            points[count] = p;
            count += 1;
            penetration += depth;
        }
    }
    if count == 0 {
        return None;
    }
    penetration /= count as f32;

    let normal = if flip { -ref_normal } else { ref_normal };
    Some(Contact { normal, penetration, points, count })
}

/// Apply the velocity impulse response for one manifold. May be iterated;
/// positional correction is separate (`correct`).
pub(crate) fn solve(a: &mut Body, b: &mut Body, contact: &Contact) {
    let inv_mass_pair = a.inv_mass + b.inv_mass;
    if inv_mass_pair == 0.0 {
        return;
    }

    // Mixing rules: bounciest restitution wins, grippiest friction loses.
    let e_base = a.restitution.max(b.restitution);
    let friction = a.friction.min(b.friction);
    let n = contact.normal;

    for i in 0..contact.count {
        let p = contact.points[i];
        let ra = p - a.pos;
        let rb = p - b.pos;

        // Relative velocity at the contact point (v + w × r).
        let rv = b.velocity + rb.perp() * b.angular_vel - a.velocity - ra.perp() * a.angular_vel;
        let vel_n = rv.dot(n);
        if vel_n > 0.0 {
            continue;
        }

        let ra_n = ra.cross(n);
        let rb_n = rb.cross(n);
        let inv_mass_n =
            inv_mass_pair + ra_n * ra_n * a.inv_inertia + rb_n * rb_n * b.inv_inertia;

        let e = if vel_n.abs() < RESTITUTION_THRESHOLD { 0.0 } else { e_base };
        let j = -(1.0 + e) * vel_n / inv_mass_n / contact.count as f32;

        let impulse = n * j;
        a.apply_impulse_at(-impulse, p);
        b.apply_impulse_at(impulse, p);

        // Friction along the tangent, clamped by Coulomb's cone.
        let rv = b.velocity + rb.perp() * b.angular_vel - a.velocity - ra.perp() * a.angular_vel;
        let tangent = (rv - n * rv.dot(n)).normalize();
        if tangent.length_squared() < 1e-6 {
            continue;
        }

        let ra_t = ra.cross(tangent);
        let rb_t = rb.cross(tangent);
        let inv_mass_t =
            inv_mass_pair + ra_t * ra_t * a.inv_inertia + rb_t * rb_t * b.inv_inertia;

        let jt = (-rv.dot(tangent) / inv_mass_t / contact.count as f32)
            .clamp(-friction * j.abs(), friction * j.abs());

        let friction_impulse = tangent * jt;
        a.apply_impulse_at(-friction_impulse, p);
        b.apply_impulse_at(friction_impulse, p);
    }
}

/// Push overlapping bodies apart; the slop leaves a hair of overlap so
/// resting contacts stay persistent.
pub(crate) fn correct(a: &mut Body, b: &mut Body, contact: &Contact) {
    let inv_mass_pair = a.inv_mass + b.inv_mass;
    if inv_mass_pair == 0.0 {
        return;
    }

    let depth = (contact.penetration - PENETRATION_SLOP).max(0.0);
    let correction = contact.normal * (CORRECTION_PERCENT * depth / inv_mass_pair);
    a.pos = a.pos - correction * a.inv_mass;
    b.pos = b.pos + correction * b.inv_mass;
}

/// Outward normal of the edge v1 -> v2 on a counter-clockwise hull.
fn face_normal(v1: Vec2, v2: Vec2) -> Vec2 {
    let e = v2 - v1;
    Vec2::new(e.y, -e.x).normalize()
}

/// Best separation of `other` from each face of `hull`.
/// Positive means a separating axis exists.
fn max_separation(hull: &[Vec2], other: &[Vec2]) -> (f32, usize) {
    let n = hull.len();
    let mut best = f32::NEG_INFINITY;
    let mut best_face = 0;

    for i in 0..n {
        let normal = face_normal(hull[i], hull[(i + 1) % n]);
        let face_dot = normal.dot(hull[i]);

        let mut support = f32::INFINITY;
        for &v in other.iter() {
            support = support.min(normal.dot(v));
        }

        let separation = support - face_dot;
        if separation > best {
            best = separation;
            best_face = i;
        }
    }

    (best, best_face)
}

/// Face of `hull` most anti-parallel to `normal`.
fn incident_face(hull: &[Vec2], normal: Vec2) -> usize {
    let n = hull.len();
    let mut best = f32::INFINITY;
    let mut best_face = 0;

    for i in 0..n {
        let dot = face_normal(hull[i], hull[(i + 1) % n]).dot(normal);
        if dot < best {
            best = dot;
            best_face = i;
        }
    }

    best_face
}

/// Clip the segment to the half-plane n·p <= c. Returns false when the
/// whole segment is outside.
fn clip_segment(p1: &mut Vec2, p2: &mut Vec2, n: Vec2, c: f32) -> bool {
    let d1 = n.dot(*p1) - c;
    let d2 = n.dot(*p2) - c;

    if d1 > 0.0 && d2 > 0.0 {
        return false;
    }
    if d1 > 0.0 {
        *p1 = *p1 + (*p2 - *p1) * (d1 / (d1 - d2));
    } else if d2 > 0.0 {
        *p2 = *p2 + (*p1 - *p2) * (d2 / (d2 - d1));
    }

    true
}
