//! Merge resolver: equal-tier pieces that touch fuse into the next tier
//!
//! Pairs are resolved one at a time against the live registry, so a piece
//! consumed by an earlier pair in the same batch is simply absent for later
//! ones (first pair wins).

use glam::Vec2;

use super::arena::Arena;
use super::physics::{Aabb, CollisionPair, PhysicsWorld};
use super::registry::{Piece, Tier};
use super::state::{GameEvent, SessionState};
use super::tick::CollisionListener;
use super::timer::TimerTask;

#[derive(Debug, Clone, Default)]
pub struct MergeResolver {
    merges: u64,
}

impl MergeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges resolved since the session started
    pub fn merges(&self) -> u64 {
        self.merges
    }

    pub fn reset(&mut self) {
        self.merges = 0;
    }

    /// Try to merge one colliding pair; returns the successor piece
    pub fn resolve_pair(
        &mut self,
        state: &mut SessionState,
        world: &mut dyn PhysicsWorld,
        pair: CollisionPair,
    ) -> Option<Piece> {
        if world.is_static(pair.a) || world.is_static(pair.b) {
            return None;
        }
        let (Some(group_a), Some(group_b)) = (world.group(pair.a), world.group(pair.b)) else {
            return None;
        };
        if group_a != group_b {
            return None;
        }
        let (Some(a), Some(b)) = (
            state.registry.find_by_id(pair.a),
            state.registry.find_by_id(pair.b),
        ) else {
            return None;
        };
        if a.tier != b.tier {
            log::warn!("Pair {:?} shares group {} but not tier", pair, group_a);
            return None;
        }
        let tier = a.tier;
        let Some(next) = tier.next() else {
            log::debug!("Top-tier pair {} / {} stays apart", pair.a, pair.b);
            return None;
        };
        let bounds_a = world.bounds(pair.a).unwrap_or(a.bounds);
        let bounds_b = world.bounds(pair.b).unwrap_or(b.bounds);

        state.registry.remove(&pair.ids());
        for id in pair.ids() {
            world.remove_body(id);
        }

        if next.is_top() {
            log::info!("Top tier {} created; announcing win", next.index());
            let delay = state.tuning.win_announce_delay();
            state.schedule(delay, TimerTask::AnnounceWin);
        }

        let pos = successor_position(&bounds_a, &bounds_b, next, &state.arena);
        let piece = state.spawn_piece(world, next, pos);
        self.merges += 1;
        log::debug!(
            "Merged {} + {} (tier {}) into {} (tier {}) at ({:.1}, {:.1})",
            pair.a,
            pair.b,
            tier.index(),
            piece.id,
            next.index(),
            pos.x,
            pos.y
        );
        state.emit(GameEvent::PiecesMerged {
            consumed: pair.ids(),
            created: piece.id,
            tier: next,
        });
        Some(piece)
    }
}

/// Where the successor of two merged pieces appears
///
/// Midpoint of the two bounding-box minimum corners, clamped so a piece of
/// `tier` stays between the walls and above the ground.
pub fn successor_position(a: &Aabb, b: &Aabb, tier: Tier, arena: &Arena) -> Vec2 {
    let radius = tier.radius();
    let mid = (a.min + b.min) / 2.0;
    Vec2::new(arena.clamp_x(mid.x, radius), arena.clamp_y(mid.y, radius))
}

impl CollisionListener for MergeResolver {
    fn on_collision_start(
        &mut self,
        state: &mut SessionState,
        world: &mut dyn PhysicsWorld,
        pairs: &[CollisionPair],
    ) {
        for &pair in pairs {
            if !state.is_playing() {
                break;
            }
            self.resolve_pair(state, world, pair);
        }
    }
}
