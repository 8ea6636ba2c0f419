//! Rigid-body simulator seam and the built-in circle simulator
//!
//! The game rules only ever talk to a [`PhysicsWorld`]: they add and remove
//! bodies, read bounds and collision-filter groups, ask whether two bodies
//! overlap, and consume the collision-start/collision-end pairs produced by
//! each step. [`CircleWorld`] is the deterministic simulator the crate ships
//! with: dynamic circles under gravity, static boxes and overlap-only sensors.

use std::collections::BTreeSet;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identity of a simulator body. Never reused within a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Axis-aligned bounding box (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Closest point inside the box to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// Collision geometry of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { half_extents: Vec2 },
}

impl Shape {
    pub fn bounds_at(&self, pos: Vec2) -> Aabb {
        match *self {
            Shape::Circle { radius } => Aabb::from_center(pos, Vec2::splat(radius)),
            Shape::Rect { half_extents } => Aabb::from_center(pos, half_extents),
        }
    }
}

/// How the simulator treats a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Moves under gravity and contact response
    Dynamic,
    /// Never moves; pushes dynamic bodies out (walls, ground)
    Static,
    /// Never moves; reports overlap but applies no response
    Sensor,
}

/// Everything needed to create a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    pub pos: Vec2,
    pub shape: Shape,
    pub kind: BodyKind,
    /// Collision-filter group tag
    pub group: i32,
    pub friction: f32,
    pub mass: f32,
}

impl BodyDesc {
    pub fn circle(pos: Vec2, radius: f32, group: i32) -> Self {
        Self {
            pos,
            shape: Shape::Circle { radius },
            kind: BodyKind::Dynamic,
            group,
            friction: 0.1,
            mass: 1.0,
        }
    }

    /// Static box from its center and full size
    pub fn wall(center: Vec2, size: Vec2) -> Self {
        Self {
            pos: center,
            shape: Shape::Rect {
                half_extents: size * 0.5,
            },
            kind: BodyKind::Static,
            group: 0,
            friction: 0.1,
            mass: 0.0,
        }
    }

    /// Overlap-only box from its center and full size
    pub fn sensor(center: Vec2, size: Vec2, group: i32) -> Self {
        Self {
            kind: BodyKind::Sensor,
            group,
            ..Self::wall(center, size)
        }
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }
}

/// Two bodies whose contact started or ended, stored with `a < b`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CollisionPair {
    pub a: BodyId,
    pub b: BodyId,
}

impl CollisionPair {
    pub fn new(x: BodyId, y: BodyId) -> Self {
        Self {
            a: x.min(y),
            b: x.max(y),
        }
    }

    pub fn involves(&self, id: BodyId) -> bool {
        self.a == id || self.b == id
    }

    pub fn ids(&self) -> [BodyId; 2] {
        [self.a, self.b]
    }
}

/// Pair notifications produced by one simulator step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionEvents {
    pub started: Vec<CollisionPair>,
    pub ended: Vec<CollisionPair>,
}

impl CollisionEvents {
    pub fn is_empty(&self) -> bool {
        self.started.is_empty() && self.ended.is_empty()
    }
}

/// The rigid-body simulator as seen by the game rules
pub trait PhysicsWorld {
    /// Create a body and return its new identity
    fn add_body(&mut self, desc: BodyDesc) -> BodyId;
    /// Remove a body; returns false if it was not present
    fn remove_body(&mut self, id: BodyId) -> bool;
    fn contains(&self, id: BodyId) -> bool;
    /// Current bounds of a live body
    fn bounds(&self, id: BodyId) -> Option<Aabb>;
    /// Collision-filter group of a live body
    fn group(&self, id: BodyId) -> Option<i32>;
    /// True for fixed arena geometry (walls, ground); false for sensors and pieces
    fn is_static(&self, id: BodyId) -> bool;
    /// Geometric overlap test, independent of collision response
    fn overlaps(&self, a: BodyId, b: BodyId) -> bool;
    /// Advance the simulation by `dt` seconds
    fn step(&mut self, dt: f32) -> CollisionEvents;
}

/// Bodies closer than this are reported as touching
const CONTACT_SLOP: f32 = 0.5;
/// Contact relaxation passes per substep
const SOLVER_ITERATIONS: usize = 4;
/// Default substeps per step
const DEFAULT_SUBSTEPS: u32 = 4;

#[derive(Debug, Clone)]
struct Body {
    id: BodyId,
    pos: Vec2,
    vel: Vec2,
    shape: Shape,
    kind: BodyKind,
    group: i32,
    friction: f32,
    inv_mass: f32,
}

impl Body {
    fn bounds(&self) -> Aabb {
        self.shape.bounds_at(self.pos)
    }

    fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }
}

/// Contact between two shapes: push direction for `a` and penetration depth
#[derive(Debug, Clone, Copy)]
struct Contact {
    normal: Vec2,
    depth: f32,
}

/// Contact of shape `a` against shape `b`; `depth > -slop` means touching.
/// `normal` points from `b` toward `a`.
fn contact(a_pos: Vec2, a_shape: Shape, b_pos: Vec2, b_shape: Shape) -> Contact {
    match (a_shape, b_shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            let delta = a_pos - b_pos;
            let dist = delta.length();
            let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::NEG_Y };
            Contact {
                normal,
                depth: ra + rb - dist,
            }
        }
        (Shape::Circle { radius }, Shape::Rect { half_extents }) => {
            let rect = Aabb::from_center(b_pos, half_extents);
            let closest = rect.closest_point(a_pos);
            let delta = a_pos - closest;
            let dist = delta.length();
            if dist > f32::EPSILON {
                Contact {
                    normal: delta / dist,
                    depth: radius - dist,
                }
            } else {
                // Center inside the box: leave through the nearest face
                let to_min = a_pos - rect.min;
                let to_max = rect.max - a_pos;
                let faces = [
                    (to_min.x, Vec2::NEG_X),
                    (to_max.x, Vec2::X),
                    (to_min.y, Vec2::NEG_Y),
                    (to_max.y, Vec2::Y),
                ];
                let (gap, normal) = faces
                    .into_iter()
                    .min_by(|x, y| x.0.total_cmp(&y.0))
                    .unwrap_or((0.0, Vec2::NEG_Y));
                Contact {
                    normal,
                    depth: radius + gap,
                }
            }
        }
        (Shape::Rect { .. }, Shape::Circle { .. }) => {
            let c = contact(b_pos, b_shape, a_pos, a_shape);
            Contact {
                normal: -c.normal,
                depth: c.depth,
            }
        }
        (Shape::Rect { half_extents: ha }, Shape::Rect { half_extents: hb }) => {
            let a = Aabb::from_center(a_pos, ha);
            let b = Aabb::from_center(b_pos, hb);
            let overlap_x = a.max.x.min(b.max.x) - a.min.x.max(b.min.x);
            let overlap_y = a.max.y.min(b.max.y) - a.min.y.max(b.min.y);
            let (depth, normal) = if overlap_x < overlap_y {
                (overlap_x, Vec2::new((a_pos.x - b_pos.x).signum(), 0.0))
            } else {
                (overlap_y, Vec2::new(0.0, (a_pos.y - b_pos.y).signum()))
            };
            Contact { normal, depth }
        }
    }
}

/// Deterministic circle simulator
///
/// Bodies are kept sorted by id, so iteration order and the order of the
/// reported pairs only depend on the sequence of calls.
#[derive(Debug, Clone)]
pub struct CircleWorld {
    bodies: Vec<Body>,
    next_id: u32,
    gravity: Vec2,
    substeps: u32,
    /// Pairs touching at the end of the previous step
    contacts: BTreeSet<CollisionPair>,
}

impl CircleWorld {
    /// World with downward gravity (pixels/s²)
    pub fn new(gravity: f32) -> Self {
        Self {
            bodies: Vec::new(),
            next_id: 1,
            gravity: Vec2::new(0.0, gravity),
            substeps: DEFAULT_SUBSTEPS,
            contacts: BTreeSet::new(),
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn position(&self, id: BodyId) -> Option<Vec2> {
        self.body(id).map(|b| b.pos)
    }

    pub fn velocity(&self, id: BodyId) -> Option<Vec2> {
        self.body(id).map(|b| b.vel)
    }

    /// Teleport a body (test setups and scripted scenes)
    pub fn set_position(&mut self, id: BodyId, pos: Vec2) {
        if let Some(body) = self.body_mut(id) {
            body.pos = pos;
        }
    }

    fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.binary_search_by_key(&id, |b| b.id).ok()
    }

    fn body(&self, id: BodyId) -> Option<&Body> {
        self.index_of(id).map(|i| &self.bodies[i])
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.index_of(id).map(|i| &mut self.bodies[i])
    }

    /// Whether the pair is tracked at all (one side must move)
    fn tracks(a: &Body, b: &Body) -> bool {
        a.is_dynamic() || b.is_dynamic()
    }

    /// Whether the pair gets contact response
    fn responds(a: &Body, b: &Body) -> bool {
        if a.kind == BodyKind::Sensor || b.kind == BodyKind::Sensor {
            return false;
        }
        // Shared negative group never collides
        !(a.group == b.group && a.group < 0)
    }

    fn integrate(&mut self, h: f32) {
        for body in self.bodies.iter_mut().filter(|b| b.is_dynamic()) {
            body.vel += self.gravity * h;
            body.pos += body.vel * h;
        }
    }

    fn solve_contacts(&mut self) {
        let n = self.bodies.len();
        for _ in 0..SOLVER_ITERATIONS {
            for i in 0..n {
                for j in (i + 1)..n {
                    let (left, right) = self.bodies.split_at_mut(j);
                    let a = &mut left[i];
                    let b = &mut right[0];
                    if !Self::tracks(a, b) || !Self::responds(a, b) {
                        continue;
                    }
                    if !a.bounds().overlaps(&b.bounds()) {
                        continue;
                    }
                    let c = contact(a.pos, a.shape, b.pos, b.shape);
                    if c.depth <= 0.0 {
                        continue;
                    }
                    resolve(a, b, c);
                }
            }
        }
    }

    fn touching_pairs(&self) -> BTreeSet<CollisionPair> {
        let mut pairs = BTreeSet::new();
        for (i, a) in self.bodies.iter().enumerate() {
            for b in &self.bodies[i + 1..] {
                if !Self::tracks(a, b) {
                    continue;
                }
                let (ea, eb) = (expand(a.bounds()), expand(b.bounds()));
                if !ea.overlaps(&eb) {
                    continue;
                }
                if contact(a.pos, a.shape, b.pos, b.shape).depth > -CONTACT_SLOP {
                    pairs.insert(CollisionPair::new(a.id, b.id));
                }
            }
        }
        pairs
    }
}

fn expand(aabb: Aabb) -> Aabb {
    Aabb {
        min: aabb.min - Vec2::splat(CONTACT_SLOP),
        max: aabb.max + Vec2::splat(CONTACT_SLOP),
    }
}

/// Positional correction plus inelastic normal response and friction
fn resolve(a: &mut Body, b: &mut Body, c: Contact) {
    let total = a.inv_mass + b.inv_mass;
    if total <= 0.0 {
        return;
    }
    let correction = c.normal * c.depth;
    a.pos += correction * (a.inv_mass / total);
    b.pos -= correction * (b.inv_mass / total);

    let relative = a.vel - b.vel;
    let approaching = relative.dot(c.normal);
    if approaching < 0.0 {
        let impulse = c.normal * approaching;
        a.vel -= impulse * (a.inv_mass / total);
        b.vel += impulse * (b.inv_mass / total);
    }

    let tangent = Vec2::new(-c.normal.y, c.normal.x);
    let sliding = (a.vel - b.vel).dot(tangent);
    let friction = (a.friction + b.friction) * 0.5;
    let damp = tangent * sliding * friction;
    a.vel -= damp * (a.inv_mass / total);
    b.vel += damp * (b.inv_mass / total);
}

impl PhysicsWorld for CircleWorld {
    fn add_body(&mut self, desc: BodyDesc) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        let inv_mass = if desc.kind == BodyKind::Dynamic && desc.mass > 0.0 {
            1.0 / desc.mass
        } else {
            0.0
        };
        // Ids grow monotonically, so pushing keeps the list sorted
        self.bodies.push(Body {
            id,
            pos: desc.pos,
            vel: Vec2::ZERO,
            shape: desc.shape,
            kind: desc.kind,
            group: desc.group,
            friction: desc.friction,
            inv_mass,
        });
        id
    }

    fn remove_body(&mut self, id: BodyId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.bodies.remove(index);
        self.contacts.retain(|pair| !pair.involves(id));
        true
    }

    fn contains(&self, id: BodyId) -> bool {
        self.index_of(id).is_some()
    }

    fn bounds(&self, id: BodyId) -> Option<Aabb> {
        self.body(id).map(Body::bounds)
    }

    fn group(&self, id: BodyId) -> Option<i32> {
        self.body(id).map(|b| b.group)
    }

    fn is_static(&self, id: BodyId) -> bool {
        self.body(id).is_some_and(|b| b.kind == BodyKind::Static)
    }

    fn overlaps(&self, a: BodyId, b: BodyId) -> bool {
        let (Some(a), Some(b)) = (self.body(a), self.body(b)) else {
            return false;
        };
        if !a.bounds().overlaps(&b.bounds()) {
            return false;
        }
        contact(a.pos, a.shape, b.pos, b.shape).depth > 0.0
    }

    fn step(&mut self, dt: f32) -> CollisionEvents {
        let h = dt / self.substeps as f32;
        for _ in 0..self.substeps {
            self.integrate(h);
            self.solve_contacts();
        }

        let touching = self.touching_pairs();
        let events = CollisionEvents {
            started: touching.difference(&self.contacts).copied().collect(),
            ended: self.contacts.difference(&touching).copied().collect(),
        };
        self.contacts = touching;
        events
    }
}
