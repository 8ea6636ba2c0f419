//! Presentation descriptors
//!
//! Plain data the renderer draws from. Nothing here feeds back into the
//! simulation; a frame is rebuilt from the session after every tick.

use glam::Vec2;
use serde::Serialize;

use crate::consts::{BACKGROUND_FILL, SENSOR_FILL, WALL_FILL};
use crate::sim::{
    Aabb, Arena, BodyId, GamePhase, GameSession, Piece, PhysicsWorld, Preview, Tier,
};

/// Sprite-textured circle for one live piece
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieceVisual {
    pub id: BodyId,
    pub tier: Tier,
    pub pos: Vec2,
    pub radius: f32,
    pub sprite: String,
}

impl From<&Piece> for PieceVisual {
    fn from(piece: &Piece) -> Self {
        Self {
            id: piece.id,
            tier: piece.tier,
            pos: piece.pos,
            radius: piece.radius(),
            sprite: piece.tier.sprite(),
        }
    }
}

/// Flat-colored boundary rectangle (walls, ground, sensor strip)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyVisual {
    pub id: BodyId,
    pub bounds: Aabb,
    pub fill: &'static str,
}

/// Next-piece preview element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewDescriptor {
    /// Left edge in arena coordinates; the element is `2 * radius` square
    pub left: f32,
    pub radius: f32,
    pub sprite: String,
    pub visible: bool,
}

impl PreviewDescriptor {
    pub fn new(preview: &Preview, next: Tier) -> Self {
        Self {
            left: preview.left,
            radius: next.radius(),
            sprite: next.sprite(),
            visible: preview.visible,
        }
    }

    pub fn size(&self) -> f32 {
        self.radius * 2.0
    }
}

/// Terminal overlay selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Overlay {
    None,
    Win,
    Lose,
}

impl From<GamePhase> for Overlay {
    fn from(phase: GamePhase) -> Self {
        match phase {
            GamePhase::Playing => Overlay::None,
            GamePhase::Won => Overlay::Win,
            GamePhase::Lost => Overlay::Lose,
        }
    }
}

impl Overlay {
    /// Every shown overlay offers a single restart action
    pub fn offers_restart(self) -> bool {
        self != Overlay::None
    }

    pub fn heading(self) -> Option<&'static str> {
        match self {
            Overlay::None => None,
            Overlay::Win => Some("Well done!"),
            Overlay::Lose => Some("Game over"),
        }
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub arena: Arena,
    pub background: &'static str,
    pub boundary: Vec<BodyVisual>,
    pub pieces: Vec<PieceVisual>,
    pub preview: PreviewDescriptor,
    pub overlay: Overlay,
    pub can_drop: bool,
}

impl Frame {
    pub fn capture(session: &GameSession, world: &dyn PhysicsWorld) -> Self {
        let state = &session.state;
        let bodies = state.bodies;
        let boundary = [
            (bodies.sensor, SENSOR_FILL),
            (bodies.ground, WALL_FILL),
            (bodies.left_wall, WALL_FILL),
            (bodies.right_wall, WALL_FILL),
        ]
        .into_iter()
        .filter_map(|(id, fill)| world.bounds(id).map(|bounds| BodyVisual { id, bounds, fill }))
        .collect();

        Self {
            arena: state.arena,
            background: BACKGROUND_FILL,
            boundary,
            pieces: session.pieces().all_live().map(PieceVisual::from).collect(),
            preview: PreviewDescriptor::new(&state.preview, session.next_tier()),
            overlay: Overlay::from(session.phase()),
            can_drop: session.can_drop(),
        }
    }
}
