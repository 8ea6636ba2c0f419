//! Data-driven game balance
//!
//! A session reads every timing and physics value from its `Tuning`, so tests
//! can run the same rules with different numbers. Hosts always use the
//! defaults, which are the compile-time constants in [`crate::consts`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Minimum time between accepted drops (ms)
    pub drop_cooldown_ms: u64,
    /// Preview hidden time after a drop (ms)
    pub preview_reveal_ms: u64,
    /// Preview hidden time at session start (ms)
    pub initial_reveal_ms: u64,
    /// Delay between the top-tier merge and the win (ms)
    pub win_announce_ms: u64,
    /// Loss-check debounce window (ms)
    pub loss_window_ms: u64,
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,
    pub piece_friction: f32,
    pub piece_mass: f32,
    /// Dropped pieces come from tiers `0..spawn_tiers`
    pub spawn_tiers: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            drop_cooldown_ms: DROP_COOLDOWN.as_millis() as u64,
            preview_reveal_ms: PREVIEW_REVEAL_DELAY.as_millis() as u64,
            initial_reveal_ms: INITIAL_REVEAL_DELAY.as_millis() as u64,
            win_announce_ms: WIN_ANNOUNCE_DELAY.as_millis() as u64,
            loss_window_ms: LOSS_CHECK_WINDOW.as_millis() as u64,
            gravity: GRAVITY,
            piece_friction: PIECE_FRICTION,
            piece_mass: PIECE_MASS,
            spawn_tiers: SPAWN_TIERS,
        }
    }
}

impl Tuning {
    pub fn drop_cooldown(&self) -> Duration {
        Duration::from_millis(self.drop_cooldown_ms)
    }

    pub fn preview_reveal_delay(&self) -> Duration {
        Duration::from_millis(self.preview_reveal_ms)
    }

    pub fn initial_reveal_delay(&self) -> Duration {
        Duration::from_millis(self.initial_reveal_ms)
    }

    pub fn win_announce_delay(&self) -> Duration {
        Duration::from_millis(self.win_announce_ms)
    }

    pub fn loss_window(&self) -> Duration {
        Duration::from_millis(self.loss_window_ms)
    }

    /// Size of the spawn pool, kept within the tier ladder
    pub fn spawn_pool(&self) -> usize {
        self.spawn_tiers.clamp(1, MAX_TIER + 1)
    }

    /// Same tuning with a different drop cooldown
    pub fn with_drop_cooldown(mut self, cooldown: Duration) -> Self {
        self.drop_cooldown_ms = cooldown.as_millis() as u64;
        self
    }
}
