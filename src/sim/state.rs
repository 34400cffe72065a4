//! Session state and the entity registry
//!
//! Everything the session owns lives here; bodies themselves live in the
//! physics collaborator and are referenced by [`EntityId`].

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rank::RankIndex;

/// Opaque body handle issued by the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Constructed, not yet initialized
    Ready,
    /// Accepting drops
    Playing,
    /// Stack overflowed the drop zone
    Over,
}

/// Domain facts about a live cat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEntity {
    pub rank: RankIndex,
    /// Set once the post-creation grace period has elapsed
    pub tracked_for_overflow: bool,
}

/// Live cats known to the session, ordered by id for deterministic iteration
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entries: BTreeMap<EntityId, TrackedEntity>,
}

impl EntityRegistry {
    pub fn insert(&mut self, id: EntityId, rank: RankIndex) {
        self.entries.insert(
            id,
            TrackedEntity {
                rank,
                tracked_for_overflow: false,
            },
        );
    }

    pub fn remove(&mut self, id: EntityId) -> Option<TrackedEntity> {
        self.entries.remove(&id)
    }

    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&TrackedEntity> {
        self.entries.get(&id)
    }

    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    #[inline]
    pub fn rank_of(&self, id: EntityId) -> Option<RankIndex> {
        self.entries.get(&id).map(|e| e.rank)
    }

    /// Mark a cat as eligible for overflow checks. Returns false if it is gone.
    pub fn track_for_overflow(&mut self, id: EntityId) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.tracked_for_overflow = true;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &TrackedEntity)> {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.entries.keys().copied().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Scalar session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u64,
    /// Survives restarts; only ever raised
    pub best_score: u64,
    pub current_rank: RankIndex,
    pub next_rank: RankIndex,
    pub drop_allowed: bool,
    pub phase: GamePhase,
}

impl SessionState {
    pub fn new(best_score: u64) -> Self {
        Self {
            score: 0,
            best_score,
            current_rank: 0,
            next_rank: 0,
            drop_allowed: false,
            phase: GamePhase::Ready,
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }
}

/// A live cat as seen by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub rank: RankIndex,
    pub position: Vec2,
    pub velocity: Vec2,
    pub tracked_for_overflow: bool,
}

/// Read-only view of the session for HUD drawing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub score: u64,
    pub best_score: u64,
    pub current_rank: RankIndex,
    pub next_rank: RankIndex,
    pub drop_allowed: bool,
    pub is_over: bool,
    pub phase: GamePhase,
    /// Last pointer x (preview only)
    pub aim_x: f32,
}

/// Things that happened during a session call, for effects and HUD updates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    Dropped {
        id: EntityId,
        rank: RankIndex,
        position: Vec2,
    },
    Merged {
        id: EntityId,
        rank: RankIndex,
        position: Vec2,
        score_delta: u64,
    },
    BestScore(u64),
    GameOver {
        final_score: u64,
    },
    Restarted,
}
