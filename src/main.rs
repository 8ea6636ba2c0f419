//! Merge Drop entry point
//!
//! Runs a headless autoplay session: pieces are dropped by a seeded demo
//! player until the game is won, lost or the time limit runs out.
//!
//! Usage: `merge-drop [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use merge_drop::Settings;
    use merge_drop::sim::{
        CircleWorld, FixedStepper, GameEvent, GameSession, TickInput, advance_frame,
    };
    use merge_drop::view::Frame;

    env_logger::init();
    log::info!("Merge Drop (native autoplay) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path)),
        None => Settings::default(),
    };
    let seed = settings.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    });

    let arena = settings.arena();
    let tuning = settings.tuning();
    let mut world = CircleWorld::new(tuning.gravity);
    let mut session = GameSession::new(&mut world, arena, tuning, seed);
    let mut player = autoplay::Player::new(&settings, seed);
    let mut stepper = FixedStepper::default();
    let mut input = TickInput::default();

    // Host frames at 60 Hz; the stepper turns them into fixed sim steps
    let frame_dt = Duration::from_micros(16_667);
    let limit = Duration::from_secs(settings.max_play_secs);
    let mut drops = 0u32;

    while !session.phase().is_terminal() && session.state.now() < limit {
        if session.can_drop() {
            player.act(&mut input);
        }
        advance_frame(&mut session, &mut world, &mut stepper, &mut input, frame_dt);

        for event in session.drain_events() {
            match event {
                GameEvent::PieceDropped { id, tier, x } => {
                    drops += 1;
                    log::debug!("Dropped {} (tier {}) at x={:.1}", id, tier.index(), x);
                }
                GameEvent::PiecesMerged { created, tier, .. } => {
                    log::info!("Merged into {} (tier {})", created, tier.index());
                }
                GameEvent::PreviewShown { tier } => {
                    log::trace!("Preview shows tier {}", tier.index());
                }
                GameEvent::PhaseChanged { from, to } => {
                    log::info!("Phase {:?} -> {:?}", from, to);
                }
            }
        }
    }

    let frame = Frame::capture(&session, &world);
    let highest = session
        .pieces()
        .highest_tier()
        .map(|t| t.index().to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "seed {}: {:?} after {:.1}s, {} drops, {} merges, {} pieces on the board, highest tier {}",
        seed,
        session.phase(),
        session.state.now().as_secs_f32(),
        drops,
        session.merge.merges(),
        frame.pieces.len(),
        highest
    );
    if let Some(heading) = frame.overlay.heading() {
        println!("{}", heading);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts drive the library directly
}

/// Demo player: chooses where the next piece goes
#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use merge_drop::Settings;
    use merge_drop::input::{PointerEvent, PointerMapper};
    use merge_drop::settings::DropStrategy;
    use merge_drop::sim::TickInput;

    /// Step of the sweep strategy across the arena
    const SWEEP_STEP: f32 = 37.0;
    /// Mixed into the seed so drop positions do not mirror tier rolls
    const PLAYER_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

    pub struct Player {
        rng: Pcg32,
        strategy: DropStrategy,
        mapper: PointerMapper,
        /// Arena offset inside the viewport, to produce client coordinates
        offset: f32,
        width: f32,
        sweep_x: f32,
        sweep_dir: f32,
    }

    impl Player {
        pub fn new(settings: &Settings, seed: u64) -> Self {
            let arena = settings.arena();
            Self {
                rng: Pcg32::seed_from_u64(seed ^ PLAYER_STREAM),
                strategy: settings.strategy,
                mapper: PointerMapper::new(&arena, settings.viewport_width),
                offset: arena.offset_in(settings.viewport_width),
                width: arena.width,
                sweep_x: 0.0,
                sweep_dir: 1.0,
            }
        }

        fn next_x(&mut self) -> f32 {
            match self.strategy {
                DropStrategy::Random => self.rng.random_range(0.0..=self.width),
                DropStrategy::Center => self.width / 2.0,
                DropStrategy::Sweep => {
                    let x = self.sweep_x;
                    self.sweep_x += SWEEP_STEP * self.sweep_dir;
                    if self.sweep_x > self.width || self.sweep_x < 0.0 {
                        self.sweep_dir = -self.sweep_dir;
                        self.sweep_x = self.sweep_x.clamp(0.0, self.width.max(0.0));
                    }
                    x
                }
            }
        }

        /// Move the pointer and release it, as a player would
        pub fn act(&mut self, input: &mut TickInput) {
            let client_x = self.next_x() + self.offset;
            self.mapper.apply(PointerEvent::Move { client_x }, input);
            self.mapper.apply(PointerEvent::Release { client_x }, input);
        }
    }
}
