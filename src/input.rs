//! Pointer/touch input
//!
//! The arena is centered horizontally in the viewport, so client x has to be
//! shifted into arena x before it reaches the simulation.

use serde::{Deserialize, Serialize};

use crate::sim::{Arena, TickInput};

/// Raw pointer event in viewport (client) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Pointer or touch moved
    Move { client_x: f32 },
    /// Pointer released or touch ended: drop here
    Release { client_x: f32 },
}

/// Converts viewport events into tick input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMapper {
    offset: f32,
}

impl PointerMapper {
    pub fn new(arena: &Arena, viewport_width: f32) -> Self {
        Self {
            offset: arena.offset_in(viewport_width),
        }
    }

    #[inline]
    pub fn to_arena_x(&self, client_x: f32) -> f32 {
        client_x - self.offset
    }

    /// Fold `event` into the input for the next tick
    pub fn apply(&self, event: PointerEvent, input: &mut TickInput) {
        match event {
            PointerEvent::Move { client_x } => {
                input.pointer_x = Some(self.to_arena_x(client_x));
            }
            PointerEvent::Release { client_x } => {
                let x = self.to_arena_x(client_x);
                input.pointer_x = Some(x);
                input.drop_at = Some(x);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_viewport_offsets_pointer() {
        let arena = Arena::from_viewport(1000.0, 800.0);
        let mapper = PointerMapper::new(&arena, 1000.0);
        assert_eq!(mapper.to_arena_x(300.0), 0.0);
        assert_eq!(mapper.to_arena_x(500.0), 200.0);
    }

    #[test]
    fn test_narrow_viewport_is_identity() {
        let arena = Arena::from_viewport(360.0, 800.0);
        let mapper = PointerMapper::new(&arena, 360.0);
        assert_eq!(mapper.to_arena_x(42.0), 42.0);
    }

    #[test]
    fn test_release_requests_drop() {
        let arena = Arena::from_viewport(600.0, 800.0);
        let mapper = PointerMapper::new(&arena, 600.0);
        let mut input = TickInput::default();

        mapper.apply(PointerEvent::Move { client_x: 150.0 }, &mut input);
        assert_eq!(input.pointer_x, Some(50.0));
        assert_eq!(input.drop_at, None);

        mapper.apply(PointerEvent::Release { client_x: 180.0 }, &mut input);
        assert_eq!(input.drop_at, Some(80.0));
    }
}
