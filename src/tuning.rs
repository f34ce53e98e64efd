//! Data-driven game balance
//!
//! Every section is `#[serde(default)]`, so a tuning file only needs the
//! values it changes:
//!
//! ```json
//! { "physics": { "gravity": 0.45 }, "correction": { "nudge_cooldown_ticks": 30 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TuningError;
pub use crate::sim::supervisor::CorrectionConfig;

/// Initial viewport size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 700.0,
        }
    }
}

/// Avatar motion (units per tick, per tick²)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub radius: f32,
    pub max_vx: f32,
    /// Horizontal acceleration while a direction is held
    pub accel: f32,
    pub gravity: f32,
    /// Per-tick horizontal velocity retention
    pub friction: f32,
    /// Upward speed of a jump
    pub jump_speed: f32,
    /// Spin given by a jump (signed by travel direction)
    pub jump_spin: f32,
    /// Fraction of vx kept (and reversed) on hitting a wall
    pub wall_restitution: f32,
    /// Per-tick angular velocity retention
    pub spin_decay: f32,
    /// Falling faster than this onto a platform triggers a slide
    pub slide_min_vy: f32,
    pub slide_boost: f32,
    pub slide_spin: f32,
    /// Frozen ticks after a death
    pub respawn_delay_ticks: u32,
    /// Falling this far below the viewport is a death
    pub death_margin: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            radius: 18.0,
            max_vx: 5.5,
            accel: 0.38,
            gravity: 0.5,
            friction: 0.960375,
            jump_speed: 10.5 * 1.10,
            jump_spin: 0.45,
            wall_restitution: 0.2,
            spin_decay: 0.95,
            slide_min_vy: 2.0,
            slide_boost: 1.6 * 0.3,
            slide_spin: 0.8,
            respawn_delay_ticks: 40,
            death_margin: 120.0,
        }
    }
}

/// Procedural platform column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationTuning {
    pub start_width: f32,
    pub start_height: f32,
    /// Start platform top, measured up from the bottom of the viewport
    pub start_offset: f32,
    pub initial_platforms: usize,
    pub min_width: f32,
    pub max_width: f32,
    pub height: f32,
    /// Vertical spacing between consecutive platforms
    pub min_gap: f32,
    pub max_gap: f32,
    /// Keep a platform this far from either wall
    pub side_margin: f32,
    /// Prune platforms this far below the viewport
    pub prune_below: f32,
    /// Keep generating until the top platform is this far above the viewport
    pub spawn_above: f32,
    /// Probability that a new platform carries a pickup
    pub pickup_chance: f64,
}

impl Default for GenerationTuning {
    fn default() -> Self {
        Self {
            start_width: 220.0,
            start_height: 16.0,
            start_offset: 40.0,
            initial_platforms: 20,
            min_width: 60.0,
            max_width: 140.0,
            height: 14.0,
            min_gap: 40.0,
            max_gap: 120.0,
            side_margin: 10.0,
            prune_below: 300.0,
            spawn_above: 320.0,
            pickup_chance: 0.08,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Target position as a fraction of viewport height
    pub follow_ratio: f32,
    pub smoothing: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            follow_ratio: 0.45,
            smoothing: 0.18,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    pub landing_points: i64,
    pub penalty_points: i64,
    /// Lifetime of an x2/x3 multiplier
    pub multiplier_secs: f64,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            landing_points: 1,
            penalty_points: 10,
            multiplier_secs: 10.0,
        }
    }
}

/// All tunables for a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub physics: PhysicsTuning,
    pub generation: GenerationTuning,
    pub camera: CameraTuning,
    pub scoring: ScoringTuning,
    pub correction: CorrectionConfig,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {value}")))
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("world.width", self.world.width)?;
        positive("world.height", self.world.height)?;
        positive("physics.radius", self.physics.radius)?;
        positive("physics.max_vx", self.physics.max_vx)?;
        if !(0.0..=1.0).contains(&self.physics.friction) {
            return Err(invalid("physics.friction", "must be within 0..=1"));
        }

        let g = &self.generation;
        positive("generation.min_width", g.min_width)?;
        positive("generation.min_gap", g.min_gap)?;
        if g.max_width < g.min_width {
            return Err(invalid("generation.max_width", "must be >= min_width"));
        }
        if g.max_gap < g.min_gap {
            return Err(invalid("generation.max_gap", "must be >= min_gap"));
        }
        if !(0.0..=1.0).contains(&g.pickup_chance) {
            return Err(invalid("generation.pickup_chance", "must be within 0..=1"));
        }

        if !(0.0..=1.0).contains(&self.camera.smoothing) {
            return Err(invalid("camera.smoothing", "must be within 0..=1"));
        }

        let c = &self.correction;
        positive("correction.max_vertical_speed", c.max_vertical_speed)?;
        positive("correction.wall_stuck_threshold", c.wall_stuck_threshold)?;
        if c.min_edge_clearance < 0.0 {
            return Err(invalid("correction.min_edge_clearance", "must not be negative"));
        }
        Ok(())
    }
}
