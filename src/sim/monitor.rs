//! End-condition monitor: loss detection through the top sensor strip
//!
//! Pieces that have touched something (another piece or a wall) are tracked
//! in the end-touch set. Contact with a tracked piece arms one debounced check;
//! when it fires, any tracked piece still overlapping the sensor ends the game.
//! A check that finds no offender re-arms itself while pieces are tracked, so a
//! settled stack is still caught without any further contact changes.

use std::collections::BTreeSet;

use super::physics::{BodyId, CollisionPair, PhysicsWorld};
use super::registry::PieceRegistry;
use super::state::{GamePhase, SessionState};
use super::tick::CollisionListener;
use super::timer::TimerTask;
use crate::consts::SENSOR_GROUP;

#[derive(Debug, Clone, Default)]
pub struct EndConditionMonitor {
    /// End-touch set: live pieces that have been in contact
    touched: BTreeSet<BodyId>,
    /// A loss check is scheduled and not yet run
    armed: bool,
    checks: u32,
}

fn is_sensor(state: &SessionState, world: &dyn PhysicsWorld, id: BodyId) -> bool {
    id == state.bodies.sensor || world.group(id) == Some(SENSOR_GROUP)
}

impl EndConditionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_tracked(&self, id: BodyId) -> bool {
        self.touched.contains(&id)
    }

    pub fn tracked(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.touched.iter().copied()
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Loss checks evaluated so far
    pub fn checks_run(&self) -> u32 {
        self.checks
    }

    /// Track the live pieces of every pair that does not involve the sensor
    pub fn record(
        &mut self,
        state: &SessionState,
        world: &dyn PhysicsWorld,
        pairs: &[CollisionPair],
    ) {
        for pair in pairs {
            if pair.ids().iter().any(|&id| is_sensor(state, world, id)) {
                continue;
            }
            for id in pair.ids() {
                if state.registry.contains(id) {
                    self.touched.insert(id);
                }
            }
        }
        self.prune(&state.registry);
    }

    /// Forget ids that are no longer live pieces
    pub fn prune(&mut self, registry: &PieceRegistry) {
        self.touched.retain(|&id| registry.contains(id));
    }

    /// Schedule a loss check one window from now unless one is already pending
    pub fn arm(&mut self, state: &mut SessionState) {
        if self.armed || !state.is_playing() {
            return;
        }
        self.armed = true;
        let window = state.tuning.loss_window();
        state.schedule(window, TimerTask::CheckLoss);
        log::debug!("Loss check armed for {:?}", state.now() + window);
    }

    /// Run the debounced check; returns true if it ended the game
    pub fn evaluate(&mut self, state: &mut SessionState, world: &dyn PhysicsWorld) -> bool {
        self.armed = false;
        if !state.is_playing() {
            return false;
        }
        self.checks += 1;
        self.prune(&state.registry);

        let sensor = state.bodies.sensor;
        let offender = self.touched.iter().copied().find(|&id| world.overlaps(id, sensor));
        match offender {
            Some(id) => {
                log::info!("Piece {} settled on the sensor line", id);
                state.set_phase(GamePhase::Lost)
            }
            None => {
                log::debug!(
                    "Loss check #{}: {} tracked, none on the sensor",
                    self.checks,
                    self.touched.len()
                );
                if !self.touched.is_empty() {
                    self.arm(state);
                }
                false
            }
        }
    }
}

impl CollisionListener for EndConditionMonitor {
    fn on_collision_start(
        &mut self,
        state: &mut SessionState,
        world: &mut dyn PhysicsWorld,
        pairs: &[CollisionPair],
    ) {
        if !state.is_playing() {
            return;
        }
        self.record(state, world, pairs);
        let tracked = pairs
            .iter()
            .any(|p| p.ids().iter().any(|&id| self.touched.contains(&id)));
        if tracked {
            self.arm(state);
        }
    }

    fn on_collision_end(
        &mut self,
        state: &mut SessionState,
        world: &mut dyn PhysicsWorld,
        pairs: &[CollisionPair],
    ) {
        if !state.is_playing() {
            return;
        }
        self.record(state, world, pairs);
        let qualifies = pairs
            .iter()
            .any(|p| !(is_sensor(state, world, p.a) && is_sensor(state, world, p.b)));
        if qualifies {
            self.arm(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::sim::arena::Arena;
    use crate::sim::physics::CircleWorld;
    use crate::sim::registry::Tier;
    use crate::sim::state::GameSession;
    use glam::Vec2;
    use std::time::Duration;

    fn session() -> (CircleWorld, GameSession) {
        let mut world = CircleWorld::new(0.0);
        let session = GameSession::new(
            &mut world,
            Arena::from_viewport(400.0, 800.0),
            Tuning::default(),
            11,
        );
        (world, session)
    }

    #[test]
    fn test_sensor_pairs_are_not_tracked() {
        let (mut world, mut session) = session();
        let piece = session.state.spawn_piece(&mut world, Tier::SMALLEST, Vec2::new(100.0, 60.0));
        let sensor = session.state.bodies.sensor;

        session
            .monitor
            .record(&session.state, &world, &[CollisionPair::new(piece.id, sensor)]);
        assert!(!session.monitor.is_tracked(piece.id));
    }

    #[test]
    fn test_wall_contact_tracks_piece_only() {
        let (mut world, mut session) = session();
        let piece = session.state.spawn_piece(&mut world, Tier::SMALLEST, Vec2::new(10.0, 790.0));
        let ground = session.state.bodies.ground;

        session
            .monitor
            .record(&session.state, &world, &[CollisionPair::new(piece.id, ground)]);
        assert_eq!(session.monitor.tracked().collect::<Vec<_>>(), vec![piece.id]);
    }

    #[test]
    fn test_merged_ids_are_pruned() {
        let (mut world, mut session) = session();
        let pos = Vec2::new(100.0, 60.0);
        let a = session.state.spawn_piece(&mut world, Tier::SMALLEST, pos);
        let b = session.state.spawn_piece(&mut world, Tier::SMALLEST, pos);
        let pair = CollisionPair::new(a.id, b.id);
        session.monitor.record(&session.state, &world, &[pair]);
        assert!(session.monitor.is_tracked(a.id));

        session.merge.resolve_pair(&mut session.state, &mut world, pair).unwrap();
        let lost = session.monitor.evaluate(&mut session.state, &world);

        assert!(!session.monitor.is_tracked(a.id));
        assert!(!session.monitor.is_tracked(b.id));
        assert!(!lost);
    }

    #[test]
    fn test_tracked_piece_on_sensor_loses() {
        let (mut world, mut session) = session();
        let a = session.state.spawn_piece(&mut world, Tier::SMALLEST, Vec2::new(100.0, 60.0));
        let b = session
            .state
            .spawn_piece(&mut world, Tier::new(1).unwrap(), Vec2::new(100.0, 90.0));
        session
            .monitor
            .record(&session.state, &world, &[CollisionPair::new(a.id, b.id)]);

        assert!(session.monitor.evaluate(&mut session.state, &world));
        assert_eq!(session.phase(), GamePhase::Lost);
        // Already lost: further checks are no-ops
        assert!(!session.monitor.evaluate(&mut session.state, &world));
        assert_eq!(session.monitor.checks_run(), 1);
    }

    #[test]
    fn test_untracked_piece_on_sensor_is_ignored() {
        let (mut world, mut session) = session();
        session.state.spawn_piece(&mut world, Tier::SMALLEST, Vec2::new(100.0, 60.0));
        assert!(!session.monitor.evaluate(&mut session.state, &world));
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_collision_end_bursts_arm_once() {
        let (mut world, mut session) = session();
        let a = session.state.spawn_piece(&mut world, Tier::SMALLEST, Vec2::new(100.0, 400.0));
        let ground = session.state.bodies.ground;
        let pairs = [CollisionPair::new(a.id, ground)];

        for _ in 0..5 {
            session
                .monitor
                .on_collision_end(&mut session.state, &mut world, &pairs);
        }
        assert!(session.monitor.is_armed());
        assert_eq!(session.state.timers.count(TimerTask::CheckLoss), 1);

        let due = session.state.advance_clock(Duration::from_millis(2999));
        assert!(!due.contains(&TimerTask::CheckLoss));
        let due = session.state.advance_clock(Duration::from_millis(1));
        assert_eq!(due, vec![TimerTask::CheckLoss]);
    }

    #[test]
    fn test_contact_with_tracked_piece_arms_check() {
        let (mut world, mut session) = session();
        let a = session.state.spawn_piece(&mut world, Tier::SMALLEST, Vec2::new(100.0, 790.0));
        let ground = session.state.bodies.ground;

        session
            .monitor
            .on_collision_start(&mut session.state, &mut world, &[CollisionPair::new(a.id, ground)]);
        assert!(session.monitor.is_armed());
        assert_eq!(session.state.timers.count(TimerTask::CheckLoss), 1);
    }

    #[test]
    fn test_clean_check_rearms_while_pieces_are_tracked() {
        let (mut world, mut session) = session();
        let a = session.state.spawn_piece(&mut world, Tier::SMALLEST, Vec2::new(100.0, 790.0));
        let ground = session.state.bodies.ground;
        session
            .monitor
            .record(&session.state, &world, &[CollisionPair::new(a.id, ground)]);

        assert!(!session.monitor.evaluate(&mut session.state, &world));
        assert!(session.monitor.is_armed());
        assert_eq!(session.state.timers.count(TimerTask::CheckLoss), 1);

        let due = session.state.advance_clock(Duration::from_millis(3000));
        assert!(due.contains(&TimerTask::CheckLoss));

        // Nothing tracked: the cadence stops
        session.state.registry.remove(&[a.id]);
        assert!(!session.monitor.evaluate(&mut session.state, &world));
        assert_eq!(session.state.timers.count(TimerTask::CheckLoss), 0);
        assert!(!session.monitor.is_armed());
    }
}
