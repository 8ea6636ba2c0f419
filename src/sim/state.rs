//! Game session state
//!
//! All state shared by the spawn, merge and end-condition rules lives in one
//! [`SessionState`], owned by a [`GameSession`] together with the two
//! collision listeners. A restart resets every piece of it in one place.

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::{Arena, ArenaBodies};
use super::merge::MergeResolver;
use super::monitor::EndConditionMonitor;
use super::physics::{BodyId, CollisionEvents, PhysicsWorld};
use super::registry::{Piece, PieceRegistry, Tier, piece_body};
use super::spawn::{self, Preview, SpawnSlot};
use super::tick::CollisionListener;
use super::timer::{Scheduler, TimerTask};
use crate::Tuning;

/// Current phase of the game. `Won` and `Lost` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Won,
    Lost,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        self != GamePhase::Playing
    }
}

/// Things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PieceDropped { id: BodyId, tier: Tier, x: f32 },
    PiecesMerged {
        consumed: [BodyId; 2],
        created: BodyId,
        tier: Tier,
    },
    PreviewShown { tier: Tier },
    PhaseChanged { from: GamePhase, to: GamePhase },
}

/// Shared mutable state of one game
#[derive(Debug, Clone)]
pub struct SessionState {
    pub arena: Arena,
    pub bodies: ArenaBodies,
    pub tuning: Tuning,
    pub registry: PieceRegistry,
    pub spawn: SpawnSlot,
    pub preview: Preview,
    pub timers: Scheduler,
    phase: GamePhase,
    seed: u64,
    rng: Pcg32,
    /// Simulation clock
    now: Duration,
    events: Vec<GameEvent>,
}

impl SessionState {
    fn new(arena: Arena, bodies: ArenaBodies, tuning: Tuning, seed: u64) -> Self {
        let mut state = Self {
            arena,
            bodies,
            tuning,
            registry: PieceRegistry::new(),
            spawn: SpawnSlot::new(Tier::SMALLEST),
            preview: Preview::default(),
            timers: Scheduler::new(),
            phase: GamePhase::Playing,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            now: Duration::ZERO,
            events: Vec::new(),
        };
        let delay = state.tuning.initial_reveal_delay();
        spawn::hide_preview(&mut state, delay);
        state
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Move to `to`; terminal phases are never left. Returns whether the phase changed.
    pub fn set_phase(&mut self, to: GamePhase) -> bool {
        let from = self.phase;
        if from.is_terminal() || from == to {
            return false;
        }
        log::info!("Phase {:?} -> {:?} at {:?}", from, to, self.now);
        self.phase = to;
        self.emit(GameEvent::PhaseChanged { from, to });
        true
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Draw a tier uniformly from the spawn pool
    pub fn roll_tier(&mut self) -> Tier {
        let index = self.rng.random_range(0..self.tuning.spawn_pool());
        Tier::new(index).unwrap_or(Tier::SMALLEST)
    }

    /// Queue deferred work relative to the session clock
    pub fn schedule(&mut self, delay: Duration, task: TimerTask) {
        self.timers.schedule(self.now, delay, task);
    }

    /// Advance the clock, decay the drop cooldown and collect due timers
    pub fn advance_clock(&mut self, dt: Duration) -> Vec<TimerTask> {
        self.now += dt;
        self.spawn.decay(dt);
        self.timers.take_due(self.now)
    }

    /// Create a piece body in the simulator and register it
    pub fn spawn_piece(&mut self, world: &mut dyn PhysicsWorld, tier: Tier, pos: Vec2) -> Piece {
        let desc = piece_body(tier, pos, &self.tuning);
        let fallback = desc.shape.bounds_at(pos);
        let id = world.add_body(desc);
        let bounds = world.bounds(id).unwrap_or(fallback);
        let piece = Piece {
            id,
            tier,
            pos: bounds.center(),
            bounds,
        };
        self.registry.add(piece.clone());
        piece
    }

    fn reset(&mut self, world: &mut dyn PhysicsWorld, seed: u64) {
        for id in self.registry.ids() {
            world.remove_body(id);
        }
        *self = Self::new(self.arena, self.bodies, self.tuning.clone(), seed);
    }
}

/// One game: shared state plus the rules that react to the simulator
#[derive(Debug, Clone)]
pub struct GameSession {
    pub state: SessionState,
    pub merge: MergeResolver,
    pub monitor: EndConditionMonitor,
}

impl GameSession {
    /// Build the arena in `world` and start playing
    pub fn new(world: &mut dyn PhysicsWorld, arena: Arena, tuning: Tuning, seed: u64) -> Self {
        let bodies = arena.build(world);
        log::info!(
            "New session (seed {}): arena {}x{}",
            seed,
            arena.width,
            arena.height
        );
        Self {
            state: SessionState::new(arena, bodies, tuning, seed),
            merge: MergeResolver::new(),
            monitor: EndConditionMonitor::new(),
        }
    }

    /// Remove every piece and start over; the arena bodies are kept
    pub fn restart(&mut self, world: &mut dyn PhysicsWorld, seed: u64) {
        log::info!("Restarting session (seed {})", seed);
        self.state.reset(world, seed);
        self.merge.reset();
        self.monitor.reset();
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    pub fn can_drop(&self) -> bool {
        spawn::can_drop(&self.state)
    }

    /// Drop the next piece at arena x; `None` if dropping is not allowed now
    pub fn drop_piece(&mut self, world: &mut dyn PhysicsWorld, pointer_x: f32) -> Option<Piece> {
        spawn::drop_piece(&mut self.state, world, pointer_x)
    }

    pub fn move_preview(&mut self, arena_x: f32) {
        spawn::move_preview(&mut self.state, arena_x);
    }

    pub fn next_tier(&self) -> Tier {
        self.state.spawn.next_tier
    }

    pub fn pieces(&self) -> &PieceRegistry {
        &self.state.registry
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    /// Run a timer that came due
    pub fn run_timer(&mut self, world: &dyn PhysicsWorld, task: TimerTask) {
        match task {
            TimerTask::RevealPreview { generation } => {
                spawn::reveal_preview(&mut self.state, generation);
            }
            TimerTask::AnnounceWin => {
                if self.state.set_phase(GamePhase::Won) {
                    log::info!("Top tier reached");
                }
            }
            TimerTask::CheckLoss => {
                self.monitor.evaluate(&mut self.state, world);
            }
        }
    }

    /// Hand one step's collision pairs to the listeners: merges first, so
    /// touch tracking only sees pieces that survived the batch
    pub fn handle_collisions(&mut self, world: &mut dyn PhysicsWorld, events: &CollisionEvents) {
        let Self {
            state,
            merge,
            monitor,
        } = self;
        let mut listeners: [&mut dyn CollisionListener; 2] = [merge, monitor];
        if !events.started.is_empty() {
            for listener in listeners.iter_mut() {
                listener.on_collision_start(state, world, &events.started);
            }
        }
        if !events.ended.is_empty() {
            for listener in listeners.iter_mut() {
                listener.on_collision_end(state, world, &events.ended);
            }
        }
    }
}
