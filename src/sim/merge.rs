//! Merge resolution
//!
//! Collision callbacks only enqueue pairs; the batch is applied once per tick
//! after the physics step, so the body list is never mutated mid-iteration.
//! Within a batch, the first pair to claim a cat wins and later pairs that
//! mention it are dropped.

use std::collections::HashSet;

use glam::Vec2;
use serde::Serialize;

use super::rank::{RankIndex, RankTable};
use super::state::{EntityId, EntityRegistry};
use super::world::PhysicsWorld;

/// Two equal-rank cats that touched during the last step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingMerge {
    pub a: EntityId,
    pub b: EntityId,
}

/// One committed merge: remove both sources, spawn one successor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MergeResult {
    pub remove_a: EntityId,
    pub remove_b: EntityId,
    pub spawn_rank: RankIndex,
    pub spawn_position: Vec2,
    pub score_delta: u64,
}

/// FIFO batch of pending merges
#[derive(Debug, Default)]
pub struct MergeResolver {
    pending: Vec<PendingMerge>,
}

impl MergeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a pair if both are live cats of the same, non-top rank.
    /// Returns whether the pair was queued.
    pub fn observe_collision(
        &mut self,
        a: EntityId,
        b: EntityId,
        registry: &EntityRegistry,
        ranks: &RankTable,
    ) -> bool {
        if a == b {
            return false;
        }
        let (Some(rank_a), Some(rank_b)) = (registry.rank_of(a), registry.rank_of(b)) else {
            return false;
        };
        if rank_a != rank_b || ranks.is_max_rank(rank_a) {
            return false;
        }
        self.pending.push(PendingMerge { a, b });
        true
    }

    /// Drain the batch into merge results, in arrival order
    pub fn resolve_batch<W: PhysicsWorld + ?Sized>(
        &mut self,
        registry: &EntityRegistry,
        world: &W,
        ranks: &RankTable,
    ) -> Vec<MergeResult> {
        let mut consumed: HashSet<EntityId> = HashSet::new();
        let mut results = Vec::new();

        for PendingMerge { a, b } in self.pending.drain(..) {
            if consumed.contains(&a) || consumed.contains(&b) {
                continue;
            }
            let Some(rank) = registry.rank_of(a) else {
                continue;
            };
            if !registry.contains(b) {
                continue;
            }
            // Gone from the world between enqueue and resolution
            let (Some(pos_a), Some(pos_b)) = (world.position(a), world.position(b)) else {
                continue;
            };

            consumed.insert(a);
            consumed.insert(b);

            let spawn_rank = rank + 1;
            results.push(MergeResult {
                remove_a: a,
                remove_b: b,
                spawn_rank,
                spawn_position: (pos_a + pos_b) / 2.0,
                score_delta: ranks.rank(spawn_rank).score_value,
            });
        }

        results
    }

    /// Forget queued pairs without resolving them
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn pending(&self) -> &[PendingMerge] {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::testing::FakeWorld;
    use proptest::prelude::*;

    fn spawn(
        world: &mut FakeWorld,
        registry: &mut EntityRegistry,
        rank: RankIndex,
        x: f32,
    ) -> EntityId {
        let id = world.create_entity(rank, Vec2::new(x, 500.0));
        registry.insert(id, rank);
        id
    }

    #[test]
    fn test_equal_ranks_merge_into_successor() {
        let ranks = RankTable::standard();
        let mut world = FakeWorld::new();
        let mut registry = EntityRegistry::default();
        let a = spawn(&mut world, &mut registry, 0, 100.0);
        let b = spawn(&mut world, &mut registry, 0, 140.0);

        let mut resolver = MergeResolver::new();
        assert!(resolver.observe_collision(a, b, &registry, &ranks));

        let results = resolver.resolve_batch(&registry, &world, &ranks);
        assert_eq!(results.len(), 1);
        let merge = results[0];
        assert_eq!((merge.remove_a, merge.remove_b), (a, b));
        assert_eq!(merge.spawn_rank, 1);
        assert_eq!(merge.spawn_position, Vec2::new(120.0, 500.0));
        assert_eq!(merge.score_delta, 3);
        assert!(resolver.pending().is_empty());
    }

    #[test]
    fn test_ignores_mismatched_and_unknown_bodies() {
        let ranks = RankTable::standard();
        let mut world = FakeWorld::new();
        let mut registry = EntityRegistry::default();
        let a = spawn(&mut world, &mut registry, 0, 100.0);
        let b = spawn(&mut world, &mut registry, 1, 140.0);
        let wall = EntityId(1);

        let mut resolver = MergeResolver::new();
        assert!(!resolver.observe_collision(a, b, &registry, &ranks));
        assert!(!resolver.observe_collision(a, wall, &registry, &ranks));
        assert!(!resolver.observe_collision(a, a, &registry, &ranks));
        assert!(resolver.pending().is_empty());
    }

    #[test]
    fn test_top_rank_never_queued() {
        let ranks = RankTable::standard();
        let mut world = FakeWorld::new();
        let mut registry = EntityRegistry::default();
        let top = ranks.count() - 1;
        let a = spawn(&mut world, &mut registry, top, 100.0);
        let b = spawn(&mut world, &mut registry, top, 300.0);

        let mut resolver = MergeResolver::new();
        assert!(!resolver.observe_collision(a, b, &registry, &ranks));
        assert!(resolver.resolve_batch(&registry, &world, &ranks).is_empty());
    }

    #[test]
    fn test_shared_cat_first_pair_wins() {
        let ranks = RankTable::standard();
        let mut world = FakeWorld::new();
        let mut registry = EntityRegistry::default();
        let x = spawn(&mut world, &mut registry, 2, 100.0);
        let y = spawn(&mut world, &mut registry, 2, 160.0);
        let z = spawn(&mut world, &mut registry, 2, 40.0);
        let u = spawn(&mut world, &mut registry, 2, 300.0);
        let v = spawn(&mut world, &mut registry, 2, 360.0);

        let mut resolver = MergeResolver::new();
        resolver.observe_collision(x, y, &registry, &ranks);
        resolver.observe_collision(x, z, &registry, &ranks);
        resolver.observe_collision(u, v, &registry, &ranks);

        let results = resolver.resolve_batch(&registry, &world, &ranks);
        assert_eq!(results.len(), 2);
        assert_eq!((results[0].remove_a, results[0].remove_b), (x, y));
        assert_eq!((results[1].remove_a, results[1].remove_b), (u, v));
    }

    #[test]
    fn test_skips_bodies_gone_before_resolution() {
        let ranks = RankTable::standard();
        let mut world = FakeWorld::new();
        let mut registry = EntityRegistry::default();
        let a = spawn(&mut world, &mut registry, 0, 100.0);
        let b = spawn(&mut world, &mut registry, 0, 140.0);
        let c = spawn(&mut world, &mut registry, 0, 180.0);
        let d = spawn(&mut world, &mut registry, 0, 220.0);

        let mut resolver = MergeResolver::new();
        resolver.observe_collision(a, b, &registry, &ranks);
        resolver.observe_collision(c, d, &registry, &ranks);

        registry.remove(a);
        world.remove_entity(d);

        assert!(resolver.resolve_batch(&registry, &world, &ranks).is_empty());
        assert!(resolver.pending().is_empty());
    }

    proptest! {
        #[test]
        fn prop_cat_used_by_at_most_one_merge(
            pairs in prop::collection::vec((0usize..8, 0usize..8), 0..40)
        ) {
            let ranks = RankTable::standard();
            let mut world = FakeWorld::new();
            let mut registry = EntityRegistry::default();
            let ids: Vec<EntityId> = (0..8)
                .map(|i| spawn(&mut world, &mut registry, 1, 40.0 * i as f32))
                .collect();

            let mut resolver = MergeResolver::new();
            for (i, j) in pairs {
                resolver.observe_collision(ids[i], ids[j], &registry, &ranks);
            }
            let results = resolver.resolve_batch(&registry, &world, &ranks);

            let mut seen = HashSet::new();
            for merge in &results {
                prop_assert!(seen.insert(merge.remove_a));
                prop_assert!(seen.insert(merge.remove_b));
                prop_assert_eq!(merge.spawn_rank, 2);
                prop_assert_eq!(merge.score_delta, 6);
            }
            prop_assert!(results.len() <= 4);
        }
    }
}
