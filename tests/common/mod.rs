//! Shared helpers for integration tests
//!
//! `ScriptedWorld` is a physics double: bodies never move on their own and
//! every step returns the next queued collision batch.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use glam::Vec2;
use merge_drop::Tuning;
use merge_drop::sim::{
    Aabb, Arena, BodyDesc, BodyId, BodyKind, CollisionEvents, CollisionPair, GameEvent,
    GameSession, PhysicsWorld, TickInput, tick,
};

#[derive(Debug, Default)]
pub struct ScriptedWorld {
    bodies: BTreeMap<BodyId, BodyDesc>,
    next_id: u32,
    queued: VecDeque<CollisionEvents>,
    pub steps: u32,
}

impl ScriptedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position(&mut self, id: BodyId, pos: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.pos = pos;
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Report `pairs` as starting to touch on the next step
    pub fn queue_started(&mut self, pairs: &[(BodyId, BodyId)]) {
        self.queued.push_back(CollisionEvents {
            started: to_pairs(pairs),
            ended: Vec::new(),
        });
    }

    /// Report `pairs` as separating on the next step
    pub fn queue_ended(&mut self, pairs: &[(BodyId, BodyId)]) {
        self.queued.push_back(CollisionEvents {
            started: Vec::new(),
            ended: to_pairs(pairs),
        });
    }
}

fn to_pairs(pairs: &[(BodyId, BodyId)]) -> Vec<CollisionPair> {
    pairs.iter().map(|&(a, b)| CollisionPair::new(a, b)).collect()
}

impl PhysicsWorld for ScriptedWorld {
    fn add_body(&mut self, desc: BodyDesc) -> BodyId {
        self.next_id += 1;
        let id = BodyId(self.next_id);
        self.bodies.insert(id, desc);
        id
    }

    fn remove_body(&mut self, id: BodyId) -> bool {
        self.bodies.remove(&id).is_some()
    }

    fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    fn bounds(&self, id: BodyId) -> Option<Aabb> {
        self.bodies.get(&id).map(|b| b.shape.bounds_at(b.pos))
    }

    fn group(&self, id: BodyId) -> Option<i32> {
        self.bodies.get(&id).map(|b| b.group)
    }

    fn is_static(&self, id: BodyId) -> bool {
        self.bodies
            .get(&id)
            .is_some_and(|b| b.kind == BodyKind::Static)
    }

    fn overlaps(&self, a: BodyId, b: BodyId) -> bool {
        match (self.bounds(a), self.bounds(b)) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => false,
        }
    }

    fn step(&mut self, _dt: f32) -> CollisionEvents {
        self.steps += 1;
        self.queued.pop_front().unwrap_or_default()
    }
}

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

pub fn scripted_session(viewport_width: f32, tuning: Tuning) -> (ScriptedWorld, GameSession) {
    let mut world = ScriptedWorld::new();
    let session = GameSession::new(
        &mut world,
        Arena::from_viewport(viewport_width, 800.0),
        tuning,
        42,
    );
    (world, session)
}

/// Tick with no input; returns the events emitted during the tick
pub fn idle(session: &mut GameSession, world: &mut ScriptedWorld, dt: Duration) -> Vec<GameEvent> {
    tick(session, world, &TickInput::default(), dt);
    session.drain_events()
}

pub fn drop_at(x: f32) -> TickInput {
    TickInput {
        drop_at: Some(x),
        ..Default::default()
    }
}
