//! Merge Drop - a merge-on-collision drop puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (game rules on top of a 2D circle simulator)
//! - `input`: Pointer/touch handling
//! - `view`: Render descriptors handed to an external renderer
//! - `settings`: Host settings (viewport, seed)
//! - `tuning`: Data-driven game balance

pub mod input;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod view;

pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Fixed simulation rate
    pub const SIM_HZ: u32 = 120;
    /// Nominal timestep, rounded down to whole nanoseconds. `FixedStepper`
    /// hands out steps of this length or 1 ns longer so that every `SIM_HZ`
    /// steps add up to exactly one second.
    pub const SIM_DT: Duration = Duration::from_nanos(1_000_000_000 / SIM_HZ as u64);
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena width never exceeds this, whatever the viewport
    pub const MAX_ARENA_WIDTH: f32 = 400.0;
    /// Thickness of the ground and side walls
    pub const WALL_THICKNESS: f32 = 100.0;
    /// Vertical center of the loss sensor strip
    pub const SENSOR_Y: f32 = 60.0;
    pub const SENSOR_THICKNESS: f32 = 1.0;
    /// Collision-filter group of the sensor; never equal to a tier
    pub const SENSOR_GROUP: i32 = -1;

    /// Radius of each tier, smallest first
    pub const SIZE: [f32; 12] = [
        10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 110.0, 120.0,
    ];
    /// Index of the largest tier. Producing it wins the game.
    pub const MAX_TIER: usize = SIZE.len() - 1;
    /// Dropped pieces are drawn from the smallest N tiers
    pub const SPAWN_TIERS: usize = 3;
    /// Dropped pieces start this far below the arena top (plus their radius)
    pub const DROP_HEIGHT_OFFSET: f32 = 8.0;

    /// Minimum time between accepted drops
    pub const DROP_COOLDOWN: Duration = Duration::from_millis(1200);
    /// The next-piece preview stays hidden this long after a drop
    pub const PREVIEW_REVEAL_DELAY: Duration = Duration::from_millis(1200);
    /// Preview reveal delay at session start
    pub const INITIAL_REVEAL_DELAY: Duration = Duration::from_millis(1);
    /// Lets the final merge play before the win overlay appears
    pub const WIN_ANNOUNCE_DELAY: Duration = Duration::from_millis(200);
    /// Collision-end bursts are coalesced into one loss check per window
    pub const LOSS_CHECK_WINDOW: Duration = Duration::from_millis(3000);

    /// Downward acceleration (pixels/s²)
    pub const GRAVITY: f32 = 1000.0;
    /// Shared physics profile of every piece
    pub const PIECE_FRICTION: f32 = 0.2;
    pub const PIECE_MASS: f32 = 10.0;

    /// Fill colors for non-sprite bodies
    pub const WALL_FILL: &str = "#fff";
    pub const SENSOR_FILL: &str = "#f00";
    pub const BACKGROUND_FILL: &str = "#fff";
}

/// Clamp a center x so a circle of `radius` stays inside `[0, width]`.
///
/// When the arena is narrower than the circle the left bound wins.
#[inline]
pub fn clamp_center_x(x: f32, radius: f32, width: f32) -> f32 {
    x.min(width - radius).max(radius)
}

/// Sprite asset for a tier index (sprites are numbered from 1)
#[inline]
pub fn sprite_path(tier_index: usize) -> String {
    format!("/assets/{}.png", tier_index + 1)
}
