//! Piece registry: the live pieces and their tiers
//!
//! Every id in the registry is a live simulator body and every live piece
//! body is in the registry. Only the session's spawn/merge paths touch it.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{Aabb, BodyDesc, BodyId, PhysicsWorld};
use crate::Tuning;
use crate::consts::{MAX_TIER, SIZE};

/// Discrete size rank of a piece, `0..=MAX_TIER`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tier(u8);

impl Tier {
    pub const SMALLEST: Tier = Tier(0);
    pub const TOP: Tier = Tier(MAX_TIER as u8);

    pub fn new(index: usize) -> Option<Self> {
        (index <= MAX_TIER).then_some(Tier(index as u8))
    }

    /// Tier tagged on a body's collision-filter group
    pub fn from_group(group: i32) -> Option<Self> {
        usize::try_from(group).ok().and_then(Tier::new)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn radius(self) -> f32 {
        SIZE[self.index()]
    }

    /// Collision-filter group carried by bodies of this tier
    #[inline]
    pub fn group(self) -> i32 {
        self.0 as i32
    }

    /// Tier produced by merging two pieces of this tier
    pub fn next(self) -> Option<Self> {
        Tier::new(self.index() + 1)
    }

    pub fn is_top(self) -> bool {
        self == Tier::TOP
    }

    pub fn sprite(self) -> String {
        crate::sprite_path(self.index())
    }
}

/// Simulator body for a piece of `tier` centered at `pos`
pub fn piece_body(tier: Tier, pos: Vec2, tuning: &Tuning) -> BodyDesc {
    BodyDesc::circle(pos, tier.radius(), tier.group())
        .with_friction(tuning.piece_friction)
        .with_mass(tuning.piece_mass)
}

/// A live piece and its latest geometry snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: BodyId,
    pub tier: Tier,
    pub pos: Vec2,
    pub bounds: Aabb,
}

impl Piece {
    pub fn radius(&self) -> f32 {
        self.tier.radius()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PieceRegistry {
    pieces: BTreeMap<BodyId, Piece>,
}

impl PieceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a piece; returns false (and keeps the old entry) on a duplicate id
    pub fn add(&mut self, piece: Piece) -> bool {
        if self.pieces.contains_key(&piece.id) {
            log::warn!("Piece {} already registered", piece.id);
            return false;
        }
        self.pieces.insert(piece.id, piece);
        true
    }

    /// Remove pieces by id. Unknown ids are skipped; the removed pieces are returned.
    pub fn remove(&mut self, ids: &[BodyId]) -> Vec<Piece> {
        ids.iter().filter_map(|id| self.pieces.remove(id)).collect()
    }

    pub fn find_by_id(&self, id: BodyId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.pieces.contains_key(&id)
    }

    /// Live pieces in id order
    pub fn all_live(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    pub fn ids(&self) -> Vec<BodyId> {
        self.pieces.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn count_tier(&self, tier: Tier) -> usize {
        self.pieces.values().filter(|p| p.tier == tier).count()
    }

    pub fn highest_tier(&self) -> Option<Tier> {
        self.pieces.values().map(|p| p.tier).max()
    }

    pub fn clear(&mut self) {
        self.pieces.clear();
    }

    /// Refresh position/bounds snapshots from the simulator
    pub fn sync_geometry(&mut self, world: &dyn PhysicsWorld) {
        for piece in self.pieces.values_mut() {
            match world.bounds(piece.id) {
                Some(bounds) => {
                    piece.bounds = bounds;
                    piece.pos = bounds.center();
                }
                None => log::warn!("Piece {} has no simulator body", piece.id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(id: u32, tier: usize) -> Piece {
        let tier = Tier::new(tier).unwrap();
        let pos = Vec2::new(100.0, 100.0);
        Piece {
            id: BodyId(id),
            tier,
            pos,
            bounds: Aabb::from_center(pos, Vec2::splat(tier.radius())),
        }
    }

    #[test]
    fn test_tier_ladder() {
        assert_eq!(Tier::SMALLEST.radius(), 10.0);
        assert_eq!(Tier::TOP.radius(), 120.0);
        assert_eq!(Tier::TOP.index(), 11);
        assert_eq!(Tier::TOP.next(), None);
        assert_eq!(Tier::new(10).unwrap().next(), Some(Tier::TOP));
        assert_eq!(Tier::new(12), None);
        assert_eq!(Tier::SMALLEST.sprite(), "/assets/1.png");
    }

    #[test]
    fn test_tier_from_group() {
        assert_eq!(Tier::from_group(-1), None);
        assert_eq!(Tier::from_group(3), Tier::new(3));
        assert_eq!(Tier::from_group(99), None);
    }

    #[test]
    fn test_add_rejects_duplicate_ids() {
        let mut registry = PieceRegistry::new();
        assert!(registry.add(piece(1, 0)));
        assert!(!registry.add(piece(1, 5)));
        assert_eq!(registry.find_by_id(BodyId(1)).unwrap().tier, Tier::SMALLEST);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut registry = PieceRegistry::new();
        registry.add(piece(1, 0));
        registry.add(piece(2, 0));

        let removed = registry.remove(&[BodyId(2), BodyId(7)]);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, BodyId(2));
        assert!(registry.remove(&[BodyId(2)]).is_empty());
        assert_eq!(registry.ids(), vec![BodyId(1)]);
    }

    #[test]
    fn test_all_live_in_id_order() {
        let mut registry = PieceRegistry::new();
        registry.add(piece(5, 1));
        registry.add(piece(2, 0));
        registry.add(piece(9, 1));

        let ids: Vec<_> = registry.all_live().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![2, 5, 9]);
        assert_eq!(registry.count_tier(Tier::new(1).unwrap()), 2);
        assert_eq!(registry.highest_tier(), Tier::new(1));
    }
}
