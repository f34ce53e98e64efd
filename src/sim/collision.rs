//! Collision detection and response for the avatar
//!
//! Deliberately primitive: walls are vertical planes at 0 and W, platforms
//! are one-way from above. The correction supervisor cleans up the cases
//! this model cannot prevent.

use glam::Vec2;

use super::state::{Avatar, Platform};

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal at collision (pointing toward the avatar)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check the avatar against the left and right world walls
pub fn wall_collision(pos: Vec2, radius: f32, world_width: f32) -> CollisionResult {
    if pos.x < radius {
        return CollisionResult {
            hit: true,
            normal: Vec2::X,
            penetration: radius - pos.x,
        };
    }
    if pos.x > world_width - radius {
        return CollisionResult {
            hit: true,
            normal: Vec2::NEG_X,
            penetration: pos.x - (world_width - radius),
        };
    }
    CollisionResult::miss()
}

/// Push the avatar out of a wall and bounce a fraction of its speed back
pub fn resolve_wall(avatar: &mut Avatar, hit: &CollisionResult, restitution: f32) {
    if !hit.hit {
        return;
    }
    avatar.pos += hit.normal * hit.penetration;
    avatar.vel.x *= -restitution;
}

/// Whether the avatar came down through the top of `platform` this tick
///
/// `fall` is this tick's vertical displacement. One-way: an avatar moving
/// up, or one that was already below the top edge before the fall, passes
/// through.
pub fn lands_on(avatar: &Avatar, platform: &Platform, fall: f32) -> bool {
    let r = avatar.radius;
    let within_x = avatar.pos.x + r > platform.x && avatar.pos.x - r < platform.right();
    let bottom = avatar.bottom();
    let prev_bottom = bottom - fall;
    within_x && bottom > platform.y && prev_bottom <= platform.y + 1.0
}
