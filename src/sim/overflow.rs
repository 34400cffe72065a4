//! Game-over detection
//!
//! A cat that has come to rest while its top edge is still inside the drop
//! zone means the container is full. A cat merely falling through the zone
//! is moving too fast to count, and cats still in their grace period are
//! skipped entirely.
//!
//! This does not confirm the cat is resting on the stack: one paused at the
//! apex of a bounce inside the zone also qualifies.

use super::rank::RankTable;
use super::state::{EntityId, EntitySnapshot};

/// First cat that overflows the drop zone, if any
pub fn find_overflow(
    entities: &[EntitySnapshot],
    ranks: &RankTable,
    drop_zone_y: f32,
    settle_speed: f32,
) -> Option<EntityId> {
    entities
        .iter()
        .filter(|e| e.tracked_for_overflow)
        .find(|e| {
            let top = e.position.y - ranks.radius(e.rank);
            top < drop_zone_y && e.velocity.length() < settle_speed
        })
        .map(|e| e.id)
}

/// True when the stack has overflowed the drop zone
#[inline]
pub fn check(
    entities: &[EntitySnapshot],
    ranks: &RankTable,
    drop_zone_y: f32,
    settle_speed: f32,
) -> bool {
    find_overflow(entities, ranks, drop_zone_y, settle_speed).is_some()
}
