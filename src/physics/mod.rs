//! Minimal 2D rigid body simulation for the cookie gallery
//!
//! This is intentionally small (not a general physics engine). Scope:
//! - dynamic convex-polygon bodies built from arbitrary vertex outlines
//! - static rectangle boundary walls
//! - impulse contact resolution with friction and restitution
//! - a damped spring pointer constraint for dragging

mod vec2;
mod body;
mod collision;
mod constraint;
mod world;

pub use body::{Body, BodyId, Material};
pub use constraint::PointerConstraint;
pub use vec2::Vec2;
pub use world::PhysicsWorld;

/// Gravity in logical pixels per second squared.
pub const GRAVITY: f32 = 980.0;

/// Speed clamp to keep the solver stable and avoid tunneling.
pub const MAX_SPEED: f32 = 1200.0;
