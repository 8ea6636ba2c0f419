//! Fixed timestep simulation tick
//!
//! One tick applies input, runs due timers, steps the simulator and routes
//! the resulting collision pairs to the game rules, always in that order.

use std::time::Duration;

use super::physics::{CollisionPair, PhysicsWorld};
use super::state::{GameSession, SessionState};
use crate::consts::{MAX_SUBSTEPS, SIM_HZ};

/// Longest frame the stepper will catch up on
const MAX_FRAME_DT: Duration = Duration::from_millis(100);

/// Reacts to the collision batches produced by one simulator step
pub trait CollisionListener {
    fn on_collision_start(
        &mut self,
        _state: &mut SessionState,
        _world: &mut dyn PhysicsWorld,
        _pairs: &[CollisionPair],
    ) {
    }

    fn on_collision_end(
        &mut self,
        _state: &mut SessionState,
        _world: &mut dyn PhysicsWorld,
        _pairs: &[CollisionPair],
    ) {
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Pointer position in arena x; moves the preview
    pub pointer_x: Option<f32>,
    /// Drop the next piece at this arena x (pointer release)
    pub drop_at: Option<f32>,
    /// Start over with this seed
    pub restart: Option<u64>,
}

impl TickInput {
    /// Forget the one-shot commands once a tick has consumed them
    pub fn clear_one_shots(&mut self) {
        self.drop_at = None;
        self.restart = None;
    }
}

/// Advance the session by one fixed timestep
pub fn tick(
    session: &mut GameSession,
    world: &mut dyn PhysicsWorld,
    input: &TickInput,
    dt: Duration,
) {
    if let Some(seed) = input.restart {
        session.restart(world, seed);
    }

    if let Some(x) = input.pointer_x {
        session.move_preview(x);
    }

    if let Some(x) = input.drop_at {
        session.drop_piece(world, x);
    }

    for task in session.state.advance_clock(dt) {
        session.run_timer(world, task);
    }

    let events = world.step(dt.as_secs_f32());
    session.state.registry.sync_geometry(world);
    if !events.is_empty() {
        session.handle_collisions(world, &events);
    }
}

/// Accumulates frame time and hands out whole simulation steps
///
/// Step lengths are whole nanoseconds. Step `k` ends at `k * 1s / rate`
/// rounded down, so the simulated clock never drifts from frame time.
#[derive(Debug, Clone)]
pub struct FixedStepper {
    rate_hz: u32,
    max_substeps: u32,
    accumulator: Duration,
    /// Steps handed out so far
    taken: u64,
}

impl Default for FixedStepper {
    fn default() -> Self {
        Self::new(SIM_HZ, MAX_SUBSTEPS)
    }
}

impl FixedStepper {
    pub fn new(rate_hz: u32, max_substeps: u32) -> Self {
        Self {
            rate_hz: rate_hz.max(1),
            max_substeps,
            accumulator: Duration::ZERO,
            taken: 0,
        }
    }

    fn boundary_nanos(&self, step: u64) -> u128 {
        step as u128 * 1_000_000_000 / self.rate_hz as u128
    }

    /// Length of the next step
    fn next_step(&self) -> Duration {
        let nanos = self.boundary_nanos(self.taken + 1) - self.boundary_nanos(self.taken);
        Duration::from_nanos(nanos as u64)
    }

    /// Simulated time handed out so far
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.boundary_nanos(self.taken) as u64)
    }

    /// Add a frame's elapsed time; returns the steps to run now, in order
    pub fn accumulate(&mut self, frame_dt: Duration) -> Vec<Duration> {
        self.accumulator += frame_dt.min(MAX_FRAME_DT);
        let mut steps = Vec::new();
        while (steps.len() as u32) < self.max_substeps {
            let step = self.next_step();
            if self.accumulator < step {
                break;
            }
            self.accumulator -= step;
            self.taken += 1;
            steps.push(step);
        }
        steps
    }
}

/// Run every step a frame owes; one-shot input is consumed by the first step
pub fn advance_frame(
    session: &mut GameSession,
    world: &mut dyn PhysicsWorld,
    stepper: &mut FixedStepper,
    input: &mut TickInput,
    frame_dt: Duration,
) -> u32 {
    let steps = stepper.accumulate(frame_dt);
    for &dt in &steps {
        tick(session, world, input, dt);
        input.clear_one_shots();
    }
    steps.len() as u32
}
