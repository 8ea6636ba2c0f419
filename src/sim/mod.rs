//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, driven by a simulation clock
//! - Seeded RNG only
//! - Stable iteration order (by body ID)
//! - No rendering or platform dependencies

pub mod arena;
pub mod merge;
pub mod monitor;
pub mod physics;
pub mod registry;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timer;

pub use arena::{Arena, ArenaBodies};
pub use merge::{MergeResolver, successor_position};
pub use monitor::EndConditionMonitor;
pub use physics::{
    Aabb, BodyDesc, BodyId, BodyKind, CircleWorld, CollisionEvents, CollisionPair, PhysicsWorld,
    Shape,
};
pub use registry::{Piece, PieceRegistry, Tier};
pub use spawn::{Preview, SpawnSlot};
pub use state::{GameEvent, GamePhase, GameSession, SessionState};
pub use tick::{CollisionListener, FixedStepper, TickInput, advance_frame, tick};
pub use timer::{Scheduler, TimerTask};
