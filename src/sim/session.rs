//! Game session controller
//!
//! Owns the session state and coordinates spawning, merging and game-over
//! detection. The host calls [`GameSession::tick`] once per frame after
//! stepping its physics world; everything that would have been a free-running
//! timer is an epoch-tagged entry in the session's [`Scheduler`].
//!
//! Lifecycle: `Ready --init--> Playing --overflow--> Over`, and `restart`
//! re-enters `Playing` from either `Playing` or `Over` with everything but
//! the best score zeroed.

use glam::Vec2;

use super::merge::{MergeResolver, MergeResult};
use super::overflow;
use super::rank::{RankIndex, RankTable};
use super::spawn::{PcgRankSource, RankSource, SpawnQueue};
use super::state::{
    EntityId, EntityRegistry, EntitySnapshot, GameEvent, GamePhase, SessionSnapshot, SessionState,
};
use super::timer::{Scheduler, TimerEvent};
use super::world::PhysicsWorld;
use crate::clamp_drop_x;
use crate::config::{ConfigError, GameConfig};
use crate::persistence::BestScoreStore;

/// One game of Suika Cats
pub struct GameSession {
    config: GameConfig,
    ranks: RankTable,
    state: SessionState,
    spawn: SpawnQueue,
    merges: MergeResolver,
    entities: EntityRegistry,
    timers: Scheduler,
    store: Box<dyn BestScoreStore>,
    /// Pointer x for the drop preview
    aim_x: f32,
    /// Events produced since the last tick
    events: Vec<GameEvent>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("state", &self.state)
            .field("entities", &self.entities.len())
            .field("pending_merges", &self.merges.pending().len())
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Create a session in the `Ready` phase. The best score is loaded from `store`.
    ///
    /// Fails if `config` does not describe a playable field for `ranks`.
    pub fn new(
        config: GameConfig,
        ranks: RankTable,
        source: Box<dyn RankSource>,
        store: Box<dyn BestScoreStore>,
    ) -> Result<Self, ConfigError> {
        config.validate(&ranks)?;
        let best_score = store.load_best_score();
        let aim_x = config.width / 2.0;
        Ok(Self {
            config,
            ranks,
            state: SessionState::new(best_score),
            spawn: SpawnQueue::new(source),
            merges: MergeResolver::new(),
            entities: EntityRegistry::default(),
            timers: Scheduler::new(),
            store,
            aim_x,
            events: Vec::new(),
        })
    }

    /// Standard cat ladder with a seeded random spawn queue
    pub fn with_seed(
        config: GameConfig,
        seed: u64,
        store: Box<dyn BestScoreStore>,
    ) -> Result<Self, ConfigError> {
        log::info!("Spawn queue seeded with {}", seed);
        Self::new(
            config,
            RankTable::standard(),
            Box::new(PcgRankSource::new(seed)),
            store,
        )
    }

    /// Leave `Ready`: prime the spawn queue and start playing.
    ///
    /// Only valid before the first round; use [`restart`](Self::restart) afterwards
    /// so live bodies are removed from the world.
    pub fn init(&mut self) {
        if self.state.phase != GamePhase::Ready {
            log::warn!("init() ignored in phase {:?}; use restart()", self.state.phase);
            return;
        }
        self.reset_round();
        log::info!("Session started (best score {})", self.state.best_score);
    }

    /// Remove every cat and start a fresh round, keeping the best score
    pub fn restart<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        for id in self.entities.ids() {
            world.remove_entity(id);
        }
        let previous = self.state.score;
        self.reset_round();
        self.events.push(GameEvent::Restarted);
        log::info!(
            "Session restarted (previous score {}, best {})",
            previous,
            self.state.best_score
        );
    }

    fn reset_round(&mut self) {
        // Timers armed in the previous round must never fire
        self.timers.bump_epoch();
        self.merges.clear();
        self.entities.clear();

        self.state.score = 0;
        self.state.drop_allowed = true;
        self.state.phase = GamePhase::Playing;

        self.spawn.prime(&self.ranks);
        self.sync_spawn();

        self.timers
            .schedule(self.config.overflow_poll_interval, TimerEvent::OverflowPoll);
    }

    fn sync_spawn(&mut self) {
        self.state.current_rank = self.spawn.current();
        self.state.next_rank = self.spawn.next();
    }

    /// Drop the current cat at `x`. Ignored (returns `None`) during the
    /// cooldown, before `init`, or after game over.
    pub fn request_drop<W: PhysicsWorld + ?Sized>(
        &mut self,
        x: f32,
        world: &mut W,
    ) -> Option<EntityId> {
        if self.state.phase != GamePhase::Playing || !self.state.drop_allowed {
            return None;
        }

        let rank = self.state.current_rank;
        let x = clamp_drop_x(
            x,
            self.ranks.radius(rank),
            self.config.drop_margin,
            self.config.width,
        );
        let position = Vec2::new(x, self.config.drop_y());
        let id = self.spawn_entity(world, rank, position);

        self.state.drop_allowed = false;
        self.timers
            .schedule(self.config.drop_cooldown, TimerEvent::DropReady);
        self.spawn.advance(&self.ranks);
        self.sync_spawn();

        log::debug!("Dropped {} {} at x={:.1}", self.ranks.rank(rank).name, id, x);
        self.events.push(GameEvent::Dropped { id, rank, position });
        Some(id)
    }

    /// Report the start of contact between two bodies. Only queues; nothing
    /// changes until the next tick.
    pub fn on_collision_start(&mut self, a: EntityId, b: EntityId) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        self.merges
            .observe_collision(a, b, &self.entities, &self.ranks)
    }

    /// Advance the session by `dt` seconds. Call once per frame, after the
    /// physics step. Returns the events produced since the previous tick.
    pub fn tick<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, dt: f32) -> Vec<GameEvent> {
        if self.state.phase == GamePhase::Ready {
            world.take_collision_starts();
            return std::mem::take(&mut self.events);
        }

        for (a, b) in world.take_collision_starts() {
            self.on_collision_start(a, b);
        }

        if self.state.phase == GamePhase::Playing {
            let results = self.merges.resolve_batch(&self.entities, world, &self.ranks);
            for merge in results {
                self.apply_merge(world, merge);
            }
        } else {
            self.merges.clear();
        }

        for event in self.timers.advance(dt) {
            match event {
                TimerEvent::DropReady => {
                    if self.state.phase == GamePhase::Playing {
                        self.state.drop_allowed = true;
                    }
                }
                TimerEvent::TrackForOverflow(id) => {
                    self.entities.track_for_overflow(id);
                }
                TimerEvent::OverflowPoll => {
                    if self.state.phase == GamePhase::Playing {
                        self.poll_overflow(world);
                    }
                    if self.state.phase == GamePhase::Playing {
                        self.timers
                            .schedule(self.config.overflow_poll_interval, TimerEvent::OverflowPoll);
                    }
                }
            }
        }

        std::mem::take(&mut self.events)
    }

    fn spawn_entity<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        rank: RankIndex,
        position: Vec2,
    ) -> EntityId {
        let id = world.create_entity(rank, position);
        self.entities.insert(id, rank);
        self.timers
            .schedule(self.config.grace_period, TimerEvent::TrackForOverflow(id));
        id
    }

    fn apply_merge<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, merge: MergeResult) {
        world.remove_entity(merge.remove_a);
        world.remove_entity(merge.remove_b);
        self.entities.remove(merge.remove_a);
        self.entities.remove(merge.remove_b);

        let id = self.spawn_entity(world, merge.spawn_rank, merge.spawn_position);
        self.update_score(merge.score_delta);

        log::debug!(
            "Merged {} + {} into {} {} (+{})",
            merge.remove_a,
            merge.remove_b,
            self.ranks.rank(merge.spawn_rank).name,
            id,
            merge.score_delta
        );
        self.events.push(GameEvent::Merged {
            id,
            rank: merge.spawn_rank,
            position: merge.spawn_position,
            score_delta: merge.score_delta,
        });
    }

    fn poll_overflow<W: PhysicsWorld + ?Sized>(&mut self, world: &W) {
        let snapshots = self.entities(world);
        let offender = overflow::find_overflow(
            &snapshots,
            &self.ranks,
            self.config.drop_zone_height,
            self.config.settle_speed,
        );
        if let Some(id) = offender {
            self.state.phase = GamePhase::Over;
            self.state.drop_allowed = false;
            log::info!(
                "Game over: {} settled in the drop zone, final score {}",
                id,
                self.state.score
            );
            self.events.push(GameEvent::GameOver {
                final_score: self.state.score,
            });
        }
    }

    /// Add to the score, raising and persisting the best score when beaten.
    /// Returns the new best score if it changed.
    pub fn update_score(&mut self, delta: u64) -> Option<u64> {
        self.state.score += delta;
        if self.state.score <= self.state.best_score {
            return None;
        }
        self.state.best_score = self.state.score;
        self.store.save_best_score(self.state.best_score);
        log::info!("New best score {}", self.state.best_score);
        self.events.push(GameEvent::BestScore(self.state.best_score));
        Some(self.state.best_score)
    }

    // === Input surface ===

    /// Pointer/touch press: aim and drop
    pub fn on_pointer_down<W: PhysicsWorld + ?Sized>(
        &mut self,
        x: f32,
        world: &mut W,
    ) -> Option<EntityId> {
        self.aim_x = x;
        self.request_drop(x, world)
    }

    /// Pointer/touch move; affects only the preview
    pub fn on_pointer_move(&mut self, x: f32) {
        self.aim_x = x;
    }

    pub fn on_restart_requested<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        self.restart(world);
    }

    // === Query surface ===

    /// Where the current cat would land if dropped now
    pub fn preview_x(&self) -> f32 {
        clamp_drop_x(
            self.aim_x,
            self.ranks.radius(self.state.current_rank),
            self.config.drop_margin,
            self.config.width,
        )
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            score: self.state.score,
            best_score: self.state.best_score,
            current_rank: self.state.current_rank,
            next_rank: self.state.next_rank,
            drop_allowed: self.state.drop_allowed,
            is_over: self.state.is_over(),
            phase: self.state.phase,
            aim_x: self.aim_x,
        }
    }

    /// Live cats with their current motion; bodies the world no longer has are skipped
    pub fn entities<W: PhysicsWorld + ?Sized>(&self, world: &W) -> Vec<EntitySnapshot> {
        self.entities
            .iter()
            .filter_map(|(id, entry)| {
                Some(EntitySnapshot {
                    id,
                    rank: entry.rank,
                    position: world.position(id)?,
                    velocity: world.velocity(id)?,
                    tracked_for_overflow: entry.tracked_for_overflow,
                })
            })
            .collect()
    }

    #[inline]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.state.score
    }

    #[inline]
    pub fn best_score(&self) -> u64 {
        self.state.best_score
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn ranks(&self) -> &RankTable {
        &self.ranks
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
