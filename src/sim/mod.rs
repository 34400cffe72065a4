//! Deterministic rule engine
//!
//! All gameplay rules live here. This module must stay pure and deterministic:
//! - Randomness only through an injectable `RankSource`
//! - Time only through `tick(dt)`; no wall clock
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod merge;
pub mod overflow;
pub mod physics;
pub mod rank;
pub mod session;
pub mod spawn;
pub mod state;
pub mod timer;
pub mod world;

pub use merge::{MergeResolver, MergeResult, PendingMerge};
pub use physics::CircleWorld;
pub use rank::{CAT_RANKS, DROPPABLE_RANKS, Rank, RankIndex, RankTable};
pub use session::GameSession;
pub use spawn::{PcgRankSource, RankSource, ScriptedRankSource, SpawnQueue};
pub use state::{
    EntityId, EntityRegistry, EntitySnapshot, GameEvent, GamePhase, SessionSnapshot, SessionState,
    TrackedEntity,
};
pub use timer::{Scheduler, TimerEvent};
pub use world::PhysicsWorld;
