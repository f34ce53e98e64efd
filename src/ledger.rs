//! Points and power-up multipliers
//!
//! Independent of physics: the game loop reports landings and the current
//! simulated time, the ledger does the bookkeeping.

use serde::{Deserialize, Serialize};

use crate::sim::state::{PickupKind, Platform};
use crate::tuning::ScoringTuning;

/// Active points multiplier; a value of 1 means none
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multiplier {
    pub value: u8,
    /// Simulated time (seconds) at which the multiplier lapses
    pub expires_at: f64,
}

impl Multiplier {
    pub const NONE: Self = Self {
        value: 1,
        expires_at: 0.0,
    };

    pub fn is_active(&self) -> bool {
        self.value > 1
    }

    /// Fraction of the multiplier's lifetime left (for HUD timers)
    pub fn remaining_fraction(&self, now: f64, duration: f64) -> f64 {
        if !self.is_active() || duration <= 0.0 {
            return 0.0;
        }
        ((self.expires_at - now) / duration).clamp(0.0, 1.0)
    }
}

impl Default for Multiplier {
    fn default() -> Self {
        Self::NONE
    }
}

/// Outcome of a landing, for logging and HUD effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingAward {
    /// Platform already paid out
    AlreadyCollected,
    /// Points added (after multiplier)
    Points(i64),
    /// Penalty pickup; points removed and nothing awarded
    Penalty(i64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub points: i64,
    pub multiplier: Multiplier,
    tuning: ScoringTuning,
}

impl Ledger {
    pub fn new(tuning: ScoringTuning) -> Self {
        Self {
            points: 0,
            multiplier: Multiplier::NONE,
            tuning,
        }
    }

    pub fn tuning(&self) -> &ScoringTuning {
        &self.tuning
    }

    /// Expire the multiplier once its time is up
    pub fn update(&mut self, now: f64) {
        if self.multiplier.is_active() && now >= self.multiplier.expires_at {
            log::debug!("Multiplier x{} expired", self.multiplier.value);
            self.multiplier = Multiplier::NONE;
        }
    }

    /// Pay out a landing on `platform`, once per platform
    ///
    /// A pickup is resolved before the landing point: multipliers apply to
    /// the very landing that collected them, a penalty replaces it.
    pub fn on_land(&mut self, platform: &mut Platform, now: f64) -> LandingAward {
        if platform.collected {
            return LandingAward::AlreadyCollected;
        }
        platform.collected = true;

        if let Some(kind) = platform.pickup
            && !platform.pickup_collected
        {
            platform.pickup_collected = true;
            let value = match kind {
                PickupKind::Penalty => {
                    self.points -= self.tuning.penalty_points;
                    log::debug!("Penalty pickup: -{}", self.tuning.penalty_points);
                    return LandingAward::Penalty(self.tuning.penalty_points);
                }
                PickupKind::Double => 2,
                PickupKind::Triple => 3,
            };
            // A new pickup always overrides the running one, even a bigger one
            self.multiplier = Multiplier {
                value,
                expires_at: now + self.tuning.multiplier_secs,
            };
            log::debug!("Multiplier x{value} until {:.1}s", self.multiplier.expires_at);
        }

        let award = self.tuning.landing_points * i64::from(self.multiplier.value);
        self.points += award;
        LandingAward::Points(award)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(ScoringTuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Platform {
        Platform::new(0.0, 0.0, 100.0, 14.0)
    }

    #[test]
    fn test_landing_awards_once() {
        let mut ledger = Ledger::default();
        let mut pl = plain();

        assert_eq!(ledger.on_land(&mut pl, 0.0), LandingAward::Points(1));
        assert_eq!(ledger.on_land(&mut pl, 0.1), LandingAward::AlreadyCollected);
        assert_eq!(ledger.points, 1);
    }

    #[test]
    fn test_multiplier_applies_to_collecting_landing() {
        let mut ledger = Ledger::default();
        let mut pl = plain().with_pickup(PickupKind::Triple);

        assert_eq!(ledger.on_land(&mut pl, 5.0), LandingAward::Points(3));
        assert_eq!(ledger.multiplier.value, 3);
        assert_eq!(ledger.multiplier.expires_at, 15.0);
        assert!(pl.pickup_collected);

        let mut next = plain();
        ledger.on_land(&mut next, 6.0);
        assert_eq!(ledger.points, 6);
    }

    #[test]
    fn test_lower_pickup_overrides_higher() {
        let mut ledger = Ledger::default();
        ledger.on_land(&mut plain().with_pickup(PickupKind::Triple), 0.0);
        ledger.on_land(&mut plain().with_pickup(PickupKind::Double), 1.0);

        assert_eq!(ledger.multiplier.value, 2);
        assert_eq!(ledger.multiplier.expires_at, 11.0);
    }

    #[test]
    fn test_penalty_subtracts_without_award() {
        let mut ledger = Ledger::default();
        let mut pl = plain().with_pickup(PickupKind::Penalty);

        assert_eq!(ledger.on_land(&mut pl, 0.0), LandingAward::Penalty(10));
        assert_eq!(ledger.points, -10);
        assert!(pl.collected);
        assert_eq!(ledger.on_land(&mut pl, 1.0), LandingAward::AlreadyCollected);
    }

    #[test]
    fn test_multiplier_expires() {
        let mut ledger = Ledger::default();
        ledger.on_land(&mut plain().with_pickup(PickupKind::Double), 0.0);

        ledger.update(9.9);
        assert!(ledger.multiplier.is_active());

        ledger.update(10.0);
        assert_eq!(ledger.multiplier, Multiplier::NONE);
    }

    #[test]
    fn test_remaining_fraction() {
        let m = Multiplier {
            value: 2,
            expires_at: 10.0,
        };
        assert!((m.remaining_fraction(5.0, 10.0) - 0.5).abs() < 1e-9);
        assert_eq!(m.remaining_fraction(12.0, 10.0), 0.0);
        assert_eq!(Multiplier::NONE.remaining_fraction(0.0, 10.0), 0.0);
    }
}
