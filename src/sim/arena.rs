//! Static arena boundary: ground, side walls and the loss sensor strip

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{BodyDesc, BodyId, PhysicsWorld};
use crate::clamp_center_x;
use crate::consts::*;

/// Arena dimensions (origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    /// Width follows the viewport up to [`MAX_ARENA_WIDTH`]; height is the full viewport
    pub fn from_viewport(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            width: viewport_width.min(MAX_ARENA_WIDTH).max(0.0),
            height: viewport_height.max(0.0),
        }
    }

    /// Clamp a center x so a circle of `radius` stays between the walls
    #[inline]
    pub fn clamp_x(&self, x: f32, radius: f32) -> f32 {
        clamp_center_x(x, radius, self.width)
    }

    /// Clamp a center y so a circle of `radius` stays above the ground
    #[inline]
    pub fn clamp_y(&self, y: f32, radius: f32) -> f32 {
        y.min(self.height - radius)
    }

    /// Horizontal offset of the arena inside a wider viewport (it is centered)
    pub fn offset_in(&self, viewport_width: f32) -> f32 {
        (viewport_width - self.width) / 2.0
    }

    pub fn sensor_body(&self) -> BodyDesc {
        BodyDesc::sensor(
            Vec2::new(self.width / 2.0, SENSOR_Y),
            Vec2::new(self.width, SENSOR_THICKNESS),
            SENSOR_GROUP,
        )
    }

    pub fn ground_body(&self) -> BodyDesc {
        BodyDesc::wall(
            Vec2::new(self.width / 2.0, self.height + WALL_THICKNESS / 2.0),
            Vec2::new(self.width, WALL_THICKNESS),
        )
    }

    pub fn left_wall_body(&self) -> BodyDesc {
        BodyDesc::wall(
            Vec2::new(-WALL_THICKNESS / 2.0, self.height / 2.0),
            Vec2::new(WALL_THICKNESS, self.height),
        )
    }

    pub fn right_wall_body(&self) -> BodyDesc {
        BodyDesc::wall(
            Vec2::new(self.width + WALL_THICKNESS / 2.0, self.height / 2.0),
            Vec2::new(WALL_THICKNESS, self.height),
        )
    }

    /// Add the boundary bodies to the simulator
    pub fn build(&self, world: &mut dyn PhysicsWorld) -> ArenaBodies {
        let bodies = ArenaBodies {
            sensor: world.add_body(self.sensor_body()),
            ground: world.add_body(self.ground_body()),
            left_wall: world.add_body(self.left_wall_body()),
            right_wall: world.add_body(self.right_wall_body()),
        };
        log::debug!(
            "Arena {}x{} built: sensor {}, ground {}, walls {}/{}",
            self.width,
            self.height,
            bodies.sensor,
            bodies.ground,
            bodies.left_wall,
            bodies.right_wall
        );
        bodies
    }
}

/// Simulator ids of the boundary bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaBodies {
    pub sensor: BodyId,
    pub ground: BodyId,
    pub left_wall: BodyId,
    pub right_wall: BodyId,
}

impl ArenaBodies {
    /// Walls and ground (the sensor is not a physical boundary)
    pub fn walls(&self) -> [BodyId; 3] {
        [self.ground, self.left_wall, self.right_wall]
    }

    pub fn is_boundary(&self, id: BodyId) -> bool {
        id == self.sensor || self.walls().contains(&id)
    }
}
