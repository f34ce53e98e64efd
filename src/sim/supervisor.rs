//! Movement-correction supervisor
//!
//! Runs once per tick after the physics step and before the camera and
//! ledger. The primitive collision model can leave the avatar pinned against
//! a wall, wedged between a platform and the world edge, or carrying a
//! garbage velocity; this module detects those states and nudges the avatar
//! out of them without touching gravity-driven vertical motion.
//!
//! Per tick, in order:
//! 1. Clamp both velocity components to finite safety ceilings
//! 2. Zero large residual horizontal velocity (post-spawn overshoot)
//! 3. Measure real horizontal displacement since the previous tick
//! 4. Accumulate / reset the wall-stuck timer
//! 5. Wall nudge when the timer crosses its threshold
//! 6. Accumulate / reset the narrow-gap timer (first matching platform wins)
//! 7. Gap nudge toward the world centre
//! 8. Request a respawn if the avatar left the world entirely (or its position is not finite)
//! 9. Record the displacement baseline

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Platform;
use crate::error::RespawnError;

/// Read/write access to the body being supervised
pub trait Body {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, pos: Vec2);
    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, vel: Vec2);
    fn set_angular_velocity(&mut self, angular_vel: f32);
    fn radius(&self) -> f32;
    /// Configured top horizontal speed (drives the sanitation ceiling)
    fn max_horizontal_speed(&self) -> f32;
}

/// What the supervisor can see of (and ask of) the world around the body
pub trait Surroundings {
    /// Current horizontal extent; `<= 0` disables horizontal correction
    fn world_width(&self) -> f32;

    /// Live platform list, in the order the scan should visit it
    fn platforms(&self) -> &[Platform];

    /// Best-effort respawn. Errors are logged by the caller and dropped.
    ///
    /// The default does nothing, for hosts that have no respawn hook.
    fn respawn(&mut self) -> Result<(), RespawnError> {
        Ok(())
    }
}

/// Thresholds and impulses for the supervisor (immutable once constructed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// Hard cap on |vy| in units per tick
    pub max_vertical_speed: f32,
    /// Horizontal cap = max(min_horizontal_ceiling, max speed * this)
    pub horizontal_ceiling_mult: f32,
    pub min_horizontal_ceiling: f32,
    /// Used when the body reports a non-finite or non-positive max speed
    pub fallback_max_speed: f32,
    /// Fraction of the horizontal ceiling above which vx is zeroed outright
    pub overshoot_fraction: f32,
    /// Displacement per delta unit below which the body counts as stationary
    pub min_displacement: f32,
    /// Distance from a world edge that counts as touching it
    pub edge_epsilon: f32,
    /// Accumulated delta before a wall nudge (1.2 s at 60 ticks/s)
    pub wall_stuck_threshold: f32,
    /// Gap threshold as a fraction of the wall threshold
    pub gap_threshold_fraction: f32,
    /// Ticks that must pass after a nudge before another may fire
    pub nudge_cooldown_ticks: u64,
    /// How far a wall nudge pushes away from the edge
    pub wall_push: f32,
    /// Minimum clearance between body and edge after a nudge
    pub min_edge_clearance: f32,
    /// Escape speed floor applied by a wall nudge
    pub wall_nudge_speed: f32,
    /// Escape speed floor applied by a gap nudge
    pub gap_escape_speed: f32,
    /// A gap narrower than radius + this traps the body
    pub gap_margin: f32,
    /// Vertical slack when testing platform overlap
    pub gap_vertical_tolerance: f32,
    /// How close to the platform edge the body must be to be "in" the gap
    pub gap_edge_tolerance: f32,
    /// Distance past either world edge that triggers a respawn
    pub off_world_margin: f32,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            max_vertical_speed: 50.0,
            horizontal_ceiling_mult: 3.0,
            min_horizontal_ceiling: 8.0,
            fallback_max_speed: 6.0,
            overshoot_fraction: 0.6,
            min_displacement: 0.8,
            edge_epsilon: 0.001,
            wall_stuck_threshold: 72.0,
            gap_threshold_fraction: 0.5,
            nudge_cooldown_ticks: 20,
            wall_push: 0.5,
            min_edge_clearance: 2.5,
            wall_nudge_speed: 2.2,
            gap_escape_speed: 1.8,
            gap_margin: 6.0,
            gap_vertical_tolerance: 6.0,
            gap_edge_tolerance: 8.0,
            off_world_margin: 80.0,
        }
    }
}

impl CorrectionConfig {
    /// Horizontal speed ceiling for a body with the given top speed
    pub fn horizontal_ceiling(&self, max_speed: f32) -> f32 {
        let max_speed = if max_speed.is_finite() && max_speed > 0.0 {
            max_speed
        } else {
            self.fallback_max_speed
        };
        (max_speed * self.horizontal_ceiling_mult).max(self.min_horizontal_ceiling)
    }

    pub fn gap_stuck_threshold(&self) -> f32 {
        self.wall_stuck_threshold * self.gap_threshold_fraction
    }
}

/// Which world edge the body is pressed against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Left,
    Right,
}

/// Clamp one velocity component into `[-ceiling, ceiling]`
///
/// Infinities keep their sign; NaN carries no direction and becomes 0.
#[inline]
pub fn clamp_component(v: f32, ceiling: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else if v.abs() > ceiling {
        ceiling.copysign(v)
    } else {
        v
    }
}

/// Per-avatar corrective controller
#[derive(Debug, Clone)]
pub struct Supervisor {
    config: CorrectionConfig,
    wall_stuck: f32,
    gap_stuck: f32,
    prev_pos: Vec2,
    frame: u64,
    last_nudge_frame: Option<u64>,
}

impl Supervisor {
    /// Create a supervisor for a freshly spawned body
    pub fn new(config: CorrectionConfig, body: &impl Body) -> Self {
        let mut supervisor = Self {
            config,
            wall_stuck: 0.0,
            gap_stuck: 0.0,
            prev_pos: Vec2::ZERO,
            frame: 0,
            last_nudge_frame: None,
        };
        supervisor.reset(body);
        supervisor
    }

    /// Forget all history and re-base on the body's current position (call on respawn)
    pub fn reset(&mut self, body: &impl Body) {
        self.wall_stuck = 0.0;
        self.gap_stuck = 0.0;
        self.prev_pos = body.position();
        self.frame = 0;
        self.last_nudge_frame = None;
    }

    pub fn config(&self) -> &CorrectionConfig {
        &self.config
    }

    /// Accumulated wall-stuck time in delta units
    pub fn wall_stuck(&self) -> f32 {
        self.wall_stuck
    }

    /// Accumulated narrow-gap time in delta units
    pub fn gap_stuck(&self) -> f32 {
        self.gap_stuck
    }

    /// Ticks stepped since the last reset
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn last_nudge_frame(&self) -> Option<u64> {
        self.last_nudge_frame
    }

    /// Position recorded at the end of the previous tick
    pub fn baseline(&self) -> Vec2 {
        self.prev_pos
    }

    /// Advance one tick of `delta` simulated time
    pub fn step(&mut self, delta: f32, body: &mut impl Body, env: &mut impl Surroundings) {
        self.frame += 1;

        self.sanitize_velocity(body);

        let width = env.world_width();
        if width > 0.0 {
            let moving = (body.position().x - self.prev_pos.x).abs()
                > self.config.min_displacement * delta;

            let edge = self.touching_edge(body, width);
            if edge.is_some() && !moving {
                self.wall_stuck += delta;
            } else {
                self.wall_stuck = 0.0;
            }
            if let Some(edge) = edge
                && self.wall_stuck >= self.config.wall_stuck_threshold
                && self.cooldown_elapsed()
            {
                self.wall_nudge(body, edge, width);
            }

            if self.in_narrow_gap(body, width, env.platforms()) {
                self.gap_stuck += delta;
            } else {
                self.gap_stuck = 0.0;
            }
            if self.gap_stuck >= self.config.gap_stuck_threshold() && self.cooldown_elapsed() {
                self.gap_nudge(body, width);
            }

            let pos = body.position();
            let margin = self.config.off_world_margin;
            // A non-finite position is as lost as one far past the edge
            if !pos.is_finite() || pos.x < -margin || pos.x > width + margin {
                log::info!("Avatar left the world at {pos:?}, requesting respawn");
                if let Err(e) = env.respawn() {
                    log::warn!("Respawn request failed: {e}");
                }
            }
        } else {
            self.wall_stuck = 0.0;
            self.gap_stuck = 0.0;
        }

        self.prev_pos = body.position();
    }

    /// Steps 1-2: ceilings, then the overshoot guard
    fn sanitize_velocity(&self, body: &mut impl Body) {
        let ceiling_x = self.config.horizontal_ceiling(body.max_horizontal_speed());
        let vel = body.velocity();
        let mut sane = Vec2::new(
            clamp_component(vel.x, ceiling_x),
            clamp_component(vel.y, self.config.max_vertical_speed),
        );
        // Bit comparison so a NaN input still counts as changed
        if sane.x.to_bits() != vel.x.to_bits() || sane.y.to_bits() != vel.y.to_bits() {
            log::debug!("Clamped velocity {vel:?} -> {sane:?}");
        }

        if sane.x.abs() > ceiling_x * self.config.overshoot_fraction {
            log::debug!("Suppressed horizontal overshoot vx={:.2}", sane.x);
            sane.x = 0.0;
            body.set_angular_velocity(0.0);
        }
        body.set_velocity(sane);
    }

    fn touching_edge(&self, body: &impl Body, width: f32) -> Option<Edge> {
        let x = body.position().x;
        let r = body.radius();
        let eps = self.config.edge_epsilon;
        if x - r <= eps {
            Some(Edge::Left)
        } else if x + r >= width - eps {
            Some(Edge::Right)
        } else {
            None
        }
    }

    fn cooldown_elapsed(&self) -> bool {
        self.last_nudge_frame
            .is_none_or(|last| self.frame - last > self.config.nudge_cooldown_ticks)
    }

    fn stamp_nudge(&mut self, body: &mut impl Body) {
        body.set_angular_velocity(0.0);
        self.last_nudge_frame = Some(self.frame);
    }

    fn wall_nudge(&mut self, body: &mut impl Body, edge: Edge, width: f32) {
        let mut pos = body.position();
        let mut vel = body.velocity();
        let r = body.radius();
        let clearance = r + self.config.min_edge_clearance;
        match edge {
            Edge::Left => {
                pos.x = (pos.x + self.config.wall_push).max(clearance);
                vel.x = vel.x.max(self.config.wall_nudge_speed);
            }
            Edge::Right => {
                pos.x = (pos.x - self.config.wall_push).min(width - clearance);
                vel.x = vel.x.min(-self.config.wall_nudge_speed);
            }
        }
        log::debug!(
            "Wall nudge ({edge:?}) at frame {} after {:.1} stuck: x={:.2} vx={:.2}",
            self.frame,
            self.wall_stuck,
            pos.x,
            vel.x
        );
        body.set_position(pos);
        body.set_velocity(vel);
        self.stamp_nudge(body);
        self.wall_stuck = 0.0;
    }

    /// First platform (in list order) that pins the body against a wall
    fn in_narrow_gap(&self, body: &impl Body, width: f32, platforms: &[Platform]) -> bool {
        let pos = body.position();
        let r = body.radius();
        let tol = self.config.gap_vertical_tolerance;
        let max_gap = r + self.config.gap_margin;
        let edge_tol = self.config.gap_edge_tolerance;

        platforms.iter().any(|pl| {
            let top = pos.y - r;
            let bottom = pos.y + r;
            if bottom < pl.y - tol || top > pl.bottom() + tol {
                return false;
            }
            let gap_left = pl.x;
            if (0.0..max_gap).contains(&gap_left) && pos.x < pl.x + edge_tol {
                return true;
            }
            let gap_right = width - pl.right();
            (0.0..max_gap).contains(&gap_right) && pos.x > pl.right() - edge_tol
        })
    }

    fn gap_nudge(&mut self, body: &mut impl Body, width: f32) {
        let mut pos = body.position();
        let mut vel = body.velocity();
        let r = body.radius();
        let centre = width * 0.5;
        if pos.x < centre {
            vel.x = vel.x.max(self.config.gap_escape_speed);
        } else {
            vel.x = vel.x.min(-self.config.gap_escape_speed);
        }
        let lo = r + self.config.min_edge_clearance;
        let hi = width - r - self.config.min_edge_clearance;
        pos.x = if lo <= hi { pos.x.clamp(lo, hi) } else { centre };

        log::debug!(
            "Gap nudge at frame {} after {:.1} stuck: x={:.2} vx={:.2}",
            self.frame,
            self.gap_stuck,
            pos.x,
            vel.x
        );
        body.set_position(pos);
        body.set_velocity(vel);
        self.stamp_nudge(body);
        self.gap_stuck = 0.0;
    }
}
