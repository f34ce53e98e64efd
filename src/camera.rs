//! Vertical follow camera
//!
//! Tracks a world-space y coordinate with exponential smoothing. The target
//! sits `follow_offset` below the top of the viewport.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// World y of the top of the viewport
    pub y: f32,
    /// Viewport height
    pub height: f32,
    /// Where in the viewport the target is held (pixels from the top)
    pub follow_offset: f32,
    /// Fraction of the remaining distance closed per tick
    pub smoothing: f32,
}

impl Camera {
    pub fn new(smoothing: f32) -> Self {
        Self {
            y: 0.0,
            height: 600.0,
            follow_offset: 0.0,
            smoothing: smoothing.clamp(0.0, 1.0),
        }
    }

    /// Re-anchor after a viewport change
    pub fn resize(&mut self, height: f32, follow_ratio: f32) {
        if height > 0.0 {
            self.height = height;
        }
        self.follow_offset = self.height * follow_ratio;
    }

    fn target_for(&self, target_y: f32) -> f32 {
        target_y - self.follow_offset
    }

    /// Ease toward `target_y` over `delta` ticks
    ///
    /// Smoothing compounds per tick, so two half-ticks land where one full
    /// tick would.
    pub fn update(&mut self, target_y: f32, delta: f32) {
        let target = self.target_for(target_y);
        let t = 1.0 - (1.0 - self.smoothing).powf(delta.max(0.0));
        self.y += (target - self.y) * t;
    }

    /// Snap straight to `target_y`
    pub fn focus(&mut self, target_y: f32) {
        self.y = self.target_for(target_y);
    }

    /// Convert a world y to a viewport y
    #[inline]
    pub fn to_screen(&self, world_y: f32) -> f32 {
        world_y - self.y
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(0.18)
    }
}
