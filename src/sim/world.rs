//! Contract with the physics collaborator
//!
//! The rule engine never integrates motion itself. It asks the world to create
//! and remove bodies, reads positions and velocities, and drains the
//! collision-start pairs the world collected during its last step.

use glam::Vec2;

use super::rank::RankIndex;
use super::state::EntityId;

/// Physics engine as seen by the session
pub trait PhysicsWorld {
    /// Create a cat body of `rank` centred at `position`
    fn create_entity(&mut self, rank: RankIndex, position: Vec2) -> EntityId;

    /// Remove a body; unknown ids are ignored
    fn remove_entity(&mut self, id: EntityId);

    fn position(&self, id: EntityId) -> Option<Vec2>;

    fn velocity(&self, id: EntityId) -> Option<Vec2>;

    /// Pairs whose contact began since the last call, in arrival order.
    /// May include bodies that are not cats (walls); the session filters them.
    fn take_collision_starts(&mut self) -> Vec<(EntityId, EntityId)>;
}

/// Scriptable world for rule-engine tests
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Debug, Clone)]
    pub struct FakeBody {
        pub rank: RankIndex,
        pub position: Vec2,
        pub velocity: Vec2,
    }

    /// Bodies stay wherever the test puts them
    #[derive(Debug, Default)]
    pub struct FakeWorld {
        pub bodies: BTreeMap<EntityId, FakeBody>,
        pub collisions: Vec<(EntityId, EntityId)>,
        pub created: Vec<(EntityId, RankIndex, Vec2)>,
        pub removed: Vec<EntityId>,
        next_id: u32,
    }

    impl FakeWorld {
        pub fn new() -> Self {
            Self {
                next_id: 100,
                ..Default::default()
            }
        }

        pub fn collide(&mut self, a: EntityId, b: EntityId) {
            self.collisions.push((a, b));
        }

        pub fn place(&mut self, id: EntityId, position: Vec2, velocity: Vec2) {
            if let Some(body) = self.bodies.get_mut(&id) {
                body.position = position;
                body.velocity = velocity;
            }
        }

        pub fn ranks(&self) -> Vec<RankIndex> {
            self.bodies.values().map(|b| b.rank).collect()
        }
    }

    impl PhysicsWorld for FakeWorld {
        fn create_entity(&mut self, rank: RankIndex, position: Vec2) -> EntityId {
            let id = EntityId(self.next_id);
            self.next_id += 1;
            self.bodies.insert(
                id,
                FakeBody {
                    rank,
                    position,
                    velocity: Vec2::ZERO,
                },
            );
            self.created.push((id, rank, position));
            id
        }

        fn remove_entity(&mut self, id: EntityId) {
            if self.bodies.remove(&id).is_some() {
                self.removed.push(id);
            }
        }

        fn position(&self, id: EntityId) -> Option<Vec2> {
            self.bodies.get(&id).map(|b| b.position)
        }

        fn velocity(&self, id: EntityId) -> Option<Vec2> {
            self.bodies.get(&id).map(|b| b.velocity)
        }

        fn take_collision_starts(&mut self) -> Vec<(EntityId, EntityId)> {
            std::mem::take(&mut self.collisions)
        }
    }
}
