//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives here. Given the same seed, tuning
//! and inputs, a run replays identically.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::supervisor::{Body, Supervisor};
use crate::camera::Camera;
use crate::ledger::Ledger;
use crate::tuning::Tuning;

/// Power-up carried by a platform, resolved on first landing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    /// Double points for a while
    #[serde(rename = "x2")]
    Double,
    /// Triple points for a while
    #[serde(rename = "x3")]
    Triple,
    /// Lose ten points
    #[serde(rename = "minus10")]
    Penalty,
}

/// An axis-aligned platform (y grows downward, `y` is the top edge)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Landing point already awarded
    #[serde(default)]
    pub collected: bool,
    #[serde(default)]
    pub pickup: Option<PickupKind>,
    #[serde(default)]
    pub pickup_collected: bool,
}

impl Platform {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            collected: false,
            pickup: None,
            pickup_collected: false,
        }
    }

    pub fn with_pickup(mut self, pickup: PickupKind) -> Self {
        self.pickup = Some(pickup);
        self
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.w * 0.5
    }
}

/// The player-controlled ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Top horizontal speed reachable from input
    pub max_vx: f32,
    pub rotation: f32,
    pub angular_vel: f32,
    /// Standing on a platform this tick
    pub grounded: bool,
}

impl Avatar {
    pub fn new(radius: f32, max_vx: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius,
            max_vx,
            rotation: 0.0,
            angular_vel: 0.0,
            grounded: false,
        }
    }

    /// Place at `pos` with all motion cleared
    pub fn place(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.rotation = 0.0;
        self.angular_vel = 0.0;
        self.grounded = false;
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.radius
    }
}

impl Body for Avatar {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    fn velocity(&self) -> Vec2 {
        self.vel
    }

    fn set_velocity(&mut self, vel: Vec2) {
        self.vel = vel;
    }

    fn set_angular_velocity(&mut self, angular_vel: f32) {
        self.angular_vel = angular_vel;
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn max_horizontal_speed(&self) -> f32 {
        self.max_vx
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// World generation RNG
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Horizontal extent of the world (viewport width)
    pub world_width: f32,
    /// Viewport height
    pub world_height: f32,
    pub avatar: Avatar,
    /// Platforms ordered bottom (oldest) to top (newest)
    pub platforms: Vec<Platform>,
    pub camera: Camera,
    pub ledger: Ledger,
    pub supervisor: Supervisor,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Elapsed simulated time in delta units
    pub elapsed: f64,
    /// Ticks left in the post-death freeze
    pub dead_timer: u32,
    /// Highest climb above the spawn point this life
    pub height_score: u32,
    /// Avatar y at spawn, the reference for `height_score`
    pub spawn_y: f32,
    /// Lives lost so far this session
    pub respawns: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let avatar = Avatar::new(tuning.physics.radius, tuning.physics.max_vx);
        let supervisor = Supervisor::new(tuning.correction.clone(), &avatar);
        let mut camera = Camera::new(tuning.camera.smoothing);
        camera.resize(tuning.world.height, tuning.camera.follow_ratio);
        let ledger = Ledger::new(tuning.scoring.clone());

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            world_width: tuning.world.width,
            world_height: tuning.world.height,
            tuning,
            avatar,
            platforms: Vec::new(),
            camera,
            ledger,
            supervisor,
            time_ticks: 0,
            elapsed: 0.0,
            dead_timer: 0,
            height_score: 0,
            spawn_y: 0.0,
            respawns: 0,
        };

        state.spawn();
        state
    }

    /// Build a fresh world and put the avatar on the start platform
    fn spawn(&mut self) {
        super::worldgen::spawn_initial_platforms(self);
        self.spawn_y = self.avatar.pos.y;
        self.height_score = 0;
        self.camera.focus(self.avatar.pos.y);
        self.supervisor.reset(&self.avatar);
    }

    /// Lose a life: freeze briefly, then restart from a regenerated world
    pub fn respawn(&mut self) {
        self.respawns += 1;
        log::info!(
            "Respawn #{} (height {}, points {})",
            self.respawns,
            self.height_score,
            self.ledger.points
        );
        self.dead_timer = self.tuning.physics.respawn_delay_ticks;
        self.spawn();
    }

    /// Viewport resize: world width follows the viewport, camera re-anchors
    pub fn resize(&mut self, width: f32, height: f32) {
        log::debug!("Resize {}x{} -> {}x{}", self.world_width, self.world_height, width, height);
        self.world_width = width;
        self.world_height = height;
        self.camera.resize(height, self.tuning.camera.follow_ratio);
    }

    /// Simulated seconds since the session began (the ledger's clock)
    pub fn now_secs(&self) -> f64 {
        self.elapsed / f64::from(crate::consts::TICKS_PER_SECOND)
    }

    /// Whether the avatar is in the post-death freeze
    pub fn is_dead(&self) -> bool {
        self.dead_timer > 0
    }
}
