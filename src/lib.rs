//! Skyhop - A vertical platformer with a movement-correction supervisor
//!
//! Core modules:
//! - `sim`: Simulation (physics step, world generation, correction supervisor)
//! - `camera`: Vertical follow camera
//! - `ledger`: Points and time-limited multipliers
//! - `tuning`: Data-driven game balance
//! - `error`: Typed errors for configuration and collaborators

pub mod camera;
pub mod error;
pub mod ledger;
pub mod sim;
pub mod tuning;

pub use camera::Camera;
pub use error::{RespawnError, TuningError};
pub use ledger::{Ledger, Multiplier};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Nominal simulation rate; one delta unit is one tick at this rate
    pub const TICKS_PER_SECOND: f32 = 60.0;
    /// Milliseconds per nominal tick
    pub const MS_PER_TICK: f32 = 16.67;
    /// Longest frame accepted by [`crate::frame_delta`] (prevents tunnelling after a stall)
    pub const MAX_FRAME_MS: f32 = 40.0;
}

/// Convert elapsed wall-clock milliseconds into delta ticks
///
/// Long frames are capped at [`consts::MAX_FRAME_MS`]; negative or
/// non-finite input yields zero.
#[inline]
pub fn frame_delta(elapsed_ms: f32) -> f32 {
    if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
        return 0.0;
    }
    elapsed_ms.min(consts::MAX_FRAME_MS) / consts::MS_PER_TICK
}

/// Sign of `v` as ±1.0, treating zero as positive
#[inline]
pub fn sign_or_positive(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_delta_nominal() {
        assert!((frame_delta(16.67) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_frame_delta_caps_long_frames() {
        let capped = frame_delta(500.0);
        assert!((capped - consts::MAX_FRAME_MS / consts::MS_PER_TICK).abs() < 1e-6);
    }

    #[test]
    fn test_frame_delta_rejects_garbage() {
        assert_eq!(frame_delta(-5.0), 0.0);
        assert_eq!(frame_delta(f32::NAN), 0.0);
    }

    #[test]
    fn test_sign_or_positive() {
        assert_eq!(sign_or_positive(-3.0), -1.0);
        assert_eq!(sign_or_positive(0.0), 1.0);
        assert_eq!(sign_or_positive(2.5), 1.0);
    }
}
