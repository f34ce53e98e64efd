//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick order (physics, supervisor, camera, ledger)
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod supervisor;
pub mod tick;
pub mod worldgen;

pub use collision::{CollisionResult, lands_on, resolve_wall, wall_collision};
pub use state::{Avatar, GameState, PickupKind, Platform};
pub use supervisor::{Body, CorrectionConfig, Supervisor, Surroundings, clamp_component};
pub use tick::{TickInput, tick};
pub use worldgen::{create_platform_at, maintain_column, spawn_initial_platforms};
