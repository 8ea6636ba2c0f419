//! Spawn controller: next tier, drop cooldown, clamped drop position
//!
//! The spawn slot and preview are only mutated here; the preview UI reads them.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::PhysicsWorld;
use super::registry::{Piece, Tier};
use super::state::{GameEvent, SessionState};
use super::timer::TimerTask;
use crate::consts::DROP_HEIGHT_OFFSET;

/// Next tier to drop and the time left before dropping is allowed again
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnSlot {
    pub next_tier: Tier,
    pub cooldown_remaining: Duration,
}

impl SpawnSlot {
    /// Fresh slot, ready to drop immediately
    pub fn new(next_tier: Tier) -> Self {
        Self {
            next_tier,
            cooldown_remaining: Duration::ZERO,
        }
    }

    pub fn ready(&self) -> bool {
        self.cooldown_remaining.is_zero()
    }

    pub fn decay(&mut self, elapsed: Duration) {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(elapsed);
    }
}

/// Next-piece preview element state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    pub visible: bool,
    /// Left edge in arena coordinates
    pub left: f32,
    /// Bumped on every hide; a reveal for an older generation is stale
    pub generation: u32,
}

/// True while playing and off cooldown
pub fn can_drop(state: &SessionState) -> bool {
    state.is_playing() && state.spawn.ready()
}

/// Drop the next piece at `pointer_x` (arena coordinates)
///
/// The position is clamped so the piece fits between the walls; it is never
/// the reason for a rejection. Returns `None` during cooldown or once the
/// game is over.
pub fn drop_piece(
    state: &mut SessionState,
    world: &mut dyn PhysicsWorld,
    pointer_x: f32,
) -> Option<Piece> {
    if !can_drop(state) {
        log::debug!(
            "Drop at x={} rejected (phase {:?}, cooldown {:?})",
            pointer_x,
            state.phase(),
            state.spawn.cooldown_remaining
        );
        return None;
    }

    let tier = state.spawn.next_tier;
    let x = state.arena.clamp_x(pointer_x, tier.radius());
    let y = DROP_HEIGHT_OFFSET + tier.radius();
    let piece = state.spawn_piece(world, tier, Vec2::new(x, y));

    state.spawn.cooldown_remaining = state.tuning.drop_cooldown();
    state.spawn.next_tier = state.roll_tier();
    let delay = state.tuning.preview_reveal_delay();
    hide_preview(state, delay);

    log::debug!(
        "Dropped tier {} as {} at x={:.1}; next tier {}",
        tier.index(),
        piece.id,
        x,
        state.spawn.next_tier.index()
    );
    state.emit(GameEvent::PieceDropped {
        id: piece.id,
        tier,
        x,
    });
    Some(piece)
}

/// Hide the preview and schedule its reveal after `delay`
pub fn hide_preview(state: &mut SessionState, delay: Duration) {
    state.preview.visible = false;
    state.preview.generation = state.preview.generation.wrapping_add(1);
    let generation = state.preview.generation;
    state.schedule(delay, TimerTask::RevealPreview { generation });
}

/// Show the preview if `generation` is still current; returns whether it was shown
pub fn reveal_preview(state: &mut SessionState, generation: u32) -> bool {
    if generation != state.preview.generation || !state.is_playing() {
        return false;
    }
    state.preview.visible = true;
    let tier = state.spawn.next_tier;
    state.emit(GameEvent::PreviewShown { tier });
    true
}

/// Follow the pointer with the preview, keeping it inside the arena
pub fn move_preview(state: &mut SessionState, arena_x: f32) {
    let radius = state.spawn.next_tier.radius();
    state.preview.left = (arena_x - radius)
        .max(0.0)
        .min(state.arena.width - radius * 2.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::sim::arena::Arena;
    use crate::sim::physics::CircleWorld;
    use crate::sim::state::{GamePhase, GameSession};

    fn session(cooldown_ms: u64) -> (CircleWorld, GameSession) {
        let mut world = CircleWorld::new(0.0);
        let tuning = Tuning::default().with_drop_cooldown(Duration::from_millis(cooldown_ms));
        let session = GameSession::new(&mut world, Arena::from_viewport(384.0, 700.0), tuning, 1);
        (world, session)
    }

    #[test]
    fn test_drop_clamps_left_edge() {
        let (mut world, mut session) = session(1200);
        let piece = session.drop_piece(&mut world, -50.0).unwrap();
        assert_eq!(piece.tier, Tier::SMALLEST);
        assert_eq!(piece.pos.x, 10.0);
        assert_eq!(piece.pos.y, DROP_HEIGHT_OFFSET + 10.0);
        assert_eq!(world.group(piece.id), Some(0));
    }

    #[test]
    fn test_drop_clamps_right_edge() {
        let (mut world, mut session) = session(1200);
        let piece = session.drop_piece(&mut world, 1000.0).unwrap();
        assert_eq!(piece.pos.x, 374.0);
    }

    #[test]
    fn test_drop_arms_cooldown_and_rolls_next() {
        let (mut world, mut session) = session(1200);
        let piece = session.drop_piece(&mut world, 100.0).unwrap();

        assert!(!session.can_drop());
        assert_eq!(session.state.spawn.cooldown_remaining, Duration::from_millis(1200));
        assert!(session.next_tier().index() < 3);
        assert!(session.pieces().contains(piece.id));
        assert!(world.contains(piece.id));
        assert!(session.drop_piece(&mut world, 100.0).is_none());
        assert_eq!(session.pieces().len(), 1);
    }

    #[test]
    fn test_cooldown_expiry_reenables_drop() {
        let (mut world, mut session) = session(1500);
        let first = session.drop_piece(&mut world, 100.0).unwrap();

        session.state.advance_clock(Duration::from_millis(1400));
        assert!(!session.can_drop());
        session.state.advance_clock(Duration::from_millis(100));
        assert!(session.can_drop());

        let second = session.drop_piece(&mut world, 100.0).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_drop_rejected_when_game_over() {
        let (mut world, mut session) = session(1200);
        session.state.set_phase(GamePhase::Won);
        assert!(!session.can_drop());
        assert!(session.drop_piece(&mut world, 100.0).is_none());
        assert!(session.pieces().is_empty());
    }

    #[test]
    fn test_preview_hidden_then_revealed() {
        let (mut world, mut session) = session(1200);
        let initial = session.state.preview.generation;
        session.drop_piece(&mut world, 100.0).unwrap();

        assert!(!session.state.preview.visible);
        assert!(!reveal_preview(&mut session.state, initial), "stale reveal ignored");
        assert!(reveal_preview(&mut session.state, initial + 1));
        assert!(session.state.preview.visible);
    }

    #[test]
    fn test_preview_follows_pointer_inside_arena() {
        let (_, mut session) = session(1200);
        // Next tier starts at 0 (radius 10)
        session.move_preview(5.0);
        assert_eq!(session.state.preview.left, 0.0);
        session.move_preview(100.0);
        assert_eq!(session.state.preview.left, 90.0);
        session.move_preview(383.0);
        assert_eq!(session.state.preview.left, 364.0);
    }
}
