//! Per-tick simulation
//!
//! Order within a tick is fixed: physics step, correction supervisor,
//! camera, ledger, then column upkeep and the death check.

use super::collision::{lands_on, resolve_wall, wall_collision};
use super::state::{GameState, Platform};
use super::supervisor::Surroundings;
use super::worldgen::maintain_column;
use crate::error::RespawnError;
use crate::ledger::LandingAward;
use crate::sign_or_positive;

use rand::Rng;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Jump (only acts while grounded)
    pub jump: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

/// The supervisor's view of the running game
///
/// A respawn rebuilds the whole state, which the supervisor is still
/// borrowing, so the request is recorded and honoured once it returns.
struct LoopSurroundings<'a> {
    width: f32,
    platforms: &'a [Platform],
    respawn_requested: bool,
}

impl Surroundings for LoopSurroundings<'_> {
    fn world_width(&self) -> f32 {
        self.width
    }

    fn platforms(&self) -> &[Platform] {
        self.platforms
    }

    fn respawn(&mut self) -> Result<(), RespawnError> {
        self.respawn_requested = true;
        Ok(())
    }
}

/// Advance the game state by `delta` ticks of simulated time
pub fn tick(state: &mut GameState, input: &TickInput, delta: f32) {
    if !delta.is_finite() || delta <= 0.0 {
        return;
    }

    // Post-death freeze counts frames, not simulated time
    if state.dead_timer > 0 {
        state.dead_timer -= 1;
        return;
    }

    let input = if input.idle_mode {
        autopilot(state)
    } else {
        input.clone()
    };

    state.time_ticks += 1;
    state.elapsed += f64::from(delta);

    let landed = physics_step(state, &input, delta);

    let mut env = LoopSurroundings {
        width: state.world_width,
        platforms: &state.platforms,
        respawn_requested: false,
    };
    state.supervisor.step(delta, &mut state.avatar, &mut env);
    if env.respawn_requested {
        state.respawn();
        return;
    }

    let target_y = state.avatar.pos.y;
    state.camera.update(target_y, delta);

    let now = state.now_secs();
    for index in landed {
        match state.ledger.on_land(&mut state.platforms[index], now) {
            LandingAward::Points(points) => log::trace!("Landing +{points}"),
            LandingAward::Penalty(points) => log::debug!("Penalty landing -{points}"),
            LandingAward::AlreadyCollected => {}
        }
    }
    state.ledger.update(now);

    maintain_column(state);

    let below_view = state.camera.to_screen(state.avatar.pos.y);
    if below_view > state.world_height + state.tuning.physics.death_margin {
        log::debug!("Fell {below_view:.0} below the viewport");
        state.respawn();
        return;
    }

    let climbed = state.spawn_y - state.avatar.pos.y;
    if climbed > 0.0 {
        state.height_score = state.height_score.max(climbed.floor() as u32);
    }
}

/// Input, gravity, integration, walls and platform landings
///
/// Returns the indices of platforms landed on this tick.
fn physics_step(state: &mut GameState, input: &TickInput, delta: f32) -> Vec<usize> {
    let phys = &state.tuning.physics;
    let avatar = &mut state.avatar;

    if input.left {
        avatar.vel.x -= phys.accel * delta;
    }
    if input.right {
        avatar.vel.x += phys.accel * delta;
    }
    avatar.vel.x = avatar.vel.x.clamp(-avatar.max_vx, avatar.max_vx);

    avatar.vel.y += phys.gravity * delta;
    if input.jump && avatar.grounded {
        avatar.vel.y = -phys.jump_speed;
        avatar.grounded = false;
        avatar.angular_vel = -phys.jump_spin * sign_or_positive(avatar.vel.x);
    }

    avatar.pos += avatar.vel * delta;

    let hit = wall_collision(avatar.pos, avatar.radius, state.world_width);
    resolve_wall(avatar, &hit, phys.wall_restitution);

    avatar.rotation += avatar.angular_vel * delta;
    avatar.angular_vel *= phys.spin_decay.powf(delta);

    let mut landed = Vec::new();
    avatar.grounded = false;
    for (index, platform) in state.platforms.iter().enumerate() {
        if !lands_on(avatar, platform, avatar.vel.y * delta) {
            continue;
        }
        avatar.pos.y = platform.y - avatar.radius;
        if avatar.vel.y > phys.slide_min_vy {
            // Hard landing: skid in the direction of travel (a coin flip when at rest)
            let dir = if avatar.vel.x != 0.0 {
                avatar.vel.x.signum()
            } else if state.rng.random_bool(0.5) {
                -1.0
            } else {
                1.0
            };
            avatar.vel.x += dir * phys.slide_boost;
            avatar.angular_vel += phys.slide_spin * dir;
        }
        avatar.vel.y = 0.0;
        avatar.grounded = true;
        landed.push(index);
    }

    avatar.vel.x *= phys.friction.powf(delta);
    landed
}

/// Demo player: head for the nearest platform above and jump whenever grounded
fn autopilot(state: &GameState) -> TickInput {
    let avatar = &state.avatar;
    let feet = avatar.bottom();
    let target = state
        .platforms
        .iter()
        .filter(|p| p.y < feet - 1.0)
        .max_by(|a, b| a.y.total_cmp(&b.y));

    let mut input = TickInput {
        jump: avatar.grounded,
        ..Default::default()
    };
    if let Some(platform) = target {
        let dx = platform.center_x() - avatar.pos.x;
        input.left = dx < -4.0;
        input.right = dx > 4.0;
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn new_state() -> GameState {
        GameState::new(12345, Tuning::default())
    }

    #[test]
    fn test_avatar_rests_on_start_platform() {
        let mut state = new_state();
        let rest_y = state.platforms[0].y - state.avatar.radius;

        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), 1.0);
        }

        assert!(state.avatar.grounded);
        assert!((state.avatar.pos.y - rest_y).abs() < 1e-3);
        assert_eq!(state.respawns, 0);
        assert_eq!(state.time_ticks, 30);
    }

    #[test]
    fn test_jump_leaves_ground() {
        let mut state = new_state();
        tick(&mut state, &TickInput::default(), 1.0);
        assert!(state.avatar.grounded);
        let start_y = state.avatar.pos.y;

        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &jump, 1.0);

        assert!(!state.avatar.grounded);
        assert!(state.avatar.vel.y < 0.0);
        assert!(state.avatar.pos.y < start_y);
        assert!(state.height_score > 0);
    }

    #[test]
    fn test_horizontal_speed_capped_by_input() {
        let mut state = new_state();
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        let start_x = state.avatar.pos.x;

        for _ in 0..10 {
            tick(&mut state, &right, 1.0);
            assert!(state.avatar.vel.x <= state.avatar.max_vx);
        }

        assert!(state.avatar.pos.x > start_x);
    }

    #[test]
    fn test_dead_timer_freezes_simulation() {
        let mut state = new_state();
        state.respawn();
        let pos = state.avatar.pos;
        let frozen = state.dead_timer;

        tick(&mut state, &TickInput::default(), 1.0);

        assert_eq!(state.avatar.pos, pos);
        assert_eq!(state.dead_timer, frozen - 1);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_falling_out_of_view_respawns() {
        let mut state = new_state();
        state.avatar.pos.y += 2000.0;

        tick(&mut state, &TickInput::default(), 1.0);

        assert_eq!(state.respawns, 1);
        assert!(state.is_dead());
    }

    #[test]
    fn test_non_finite_position_respawns_via_supervisor() {
        let mut state = new_state();
        state.avatar.pos.x = f32::NAN;

        tick(&mut state, &TickInput::default(), 1.0);

        assert_eq!(state.respawns, 1);
        assert!(state.avatar.pos.x.is_finite());
    }

    #[test]
    fn test_non_finite_vertical_velocity_respawns() {
        for vy in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let mut state = new_state();
            state.avatar.vel.y = vy;

            tick(&mut state, &TickInput::default(), 1.0);

            assert_eq!(state.respawns, 1, "vy = {vy}");
            assert!(state.avatar.pos.is_finite());
            assert!(state.camera.y.is_finite());
            assert_eq!(state.avatar.vel, Vec2::ZERO);
        }
    }

    #[test]
    fn test_velocity_glitch_suppressed_before_camera() {
        let mut state = new_state();
        state.avatar.vel.y = 1e9;

        tick(&mut state, &TickInput::default(), 1.0);

        assert!(state.avatar.vel.y.abs() <= state.supervisor.config().max_vertical_speed);
    }

    #[test]
    fn test_pinned_against_wall_gets_nudged() {
        let mut state = new_state();
        // Full-width floor so holding left walks straight into the wall
        state.platforms[0].x = 0.0;
        state.platforms[0].w = state.world_width;
        let left = TickInput {
            left: true,
            ..Default::default()
        };

        for _ in 0..200 {
            tick(&mut state, &left, 1.0);
        }

        assert!(state.supervisor.last_nudge_frame().is_some());
        assert_eq!(state.respawns, 0);
    }

    #[test]
    fn test_landing_pays_out_once() {
        let mut state = new_state();
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), 1.0);
        }
        assert_eq!(state.ledger.points, 1);
        assert!(state.platforms[0].collected);
    }

    #[test]
    fn test_zero_delta_is_ignored() {
        let mut state = new_state();
        tick(&mut state, &TickInput::default(), 0.0);
        tick(&mut state, &TickInput::default(), f32::NAN);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_autopilot_climbs() {
        let mut state = new_state();
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        let mut best = 0;
        for _ in 0..60 {
            tick(&mut state, &idle, 1.0);
            best = best.max(state.height_score);
        }

        assert!(best >= 100, "best height {best}");
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999, Tuning::default());
        let mut state2 = GameState::new(99999, Tuning::default());
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        for _ in 0..500 {
            tick(&mut state1, &idle, 1.0);
            tick(&mut state2, &idle, 1.0);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.avatar.pos, state2.avatar.pos);
        assert_eq!(state1.platforms, state2.platforms);
        assert_eq!(state1.ledger.points, state2.ledger.points);
    }

    #[test]
    fn test_resize_narrows_world() {
        let mut state = new_state();
        state.resize(300.0, 700.0);
        state.avatar.pos = Vec2::new(350.0, state.avatar.pos.y);

        tick(&mut state, &TickInput::default(), 1.0);

        assert!(state.avatar.pos.x <= 300.0 - state.avatar.radius + 1e-3);
    }
}
