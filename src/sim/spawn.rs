//! Spawn queue: which cat the player holds now, and which comes next
//!
//! The random draw is the only non-determinism in the rule engine, so it sits
//! behind [`RankSource`] and can be swapped for a scripted sequence.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::rank::{RankIndex, RankTable};

/// Source of uniform draws for the spawn queue
pub trait RankSource {
    /// Uniform integer in `[0, upper)`; `upper` is always at least 1
    fn pick(&mut self, upper: usize) -> usize;
}

/// Seeded PCG source used in real games
#[derive(Debug, Clone)]
pub struct PcgRankSource {
    rng: Pcg32,
}

impl PcgRankSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl RankSource for PcgRankSource {
    fn pick(&mut self, upper: usize) -> usize {
        self.rng.random_range(0..upper)
    }
}

/// Replays a fixed sequence, wrapping around at the end
#[derive(Debug, Clone)]
pub struct ScriptedRankSource {
    picks: Vec<usize>,
    cursor: usize,
}

impl ScriptedRankSource {
    /// `picks` must not be empty; each value is reduced modulo the requested bound
    pub fn new(picks: Vec<usize>) -> Self {
        assert!(!picks.is_empty(), "scripted source needs at least one pick");
        Self { picks, cursor: 0 }
    }

    /// Always offers the same pick
    pub fn constant(pick: usize) -> Self {
        Self::new(vec![pick])
    }
}

impl RankSource for ScriptedRankSource {
    fn pick(&mut self, upper: usize) -> usize {
        let value = self.picks[self.cursor % self.picks.len()];
        self.cursor += 1;
        value % upper
    }
}

/// Current/next pair of droppable ranks
pub struct SpawnQueue {
    source: Box<dyn RankSource>,
    current: RankIndex,
    next: RankIndex,
}

impl std::fmt::Debug for SpawnQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnQueue")
            .field("current", &self.current)
            .field("next", &self.next)
            .finish_non_exhaustive()
    }
}

impl SpawnQueue {
    pub fn new(source: Box<dyn RankSource>) -> Self {
        Self {
            source,
            current: 0,
            next: 0,
        }
    }

    /// Shift `next` into `current`, draw a fresh `next`. Returns the new current rank.
    pub fn advance(&mut self, ranks: &RankTable) -> RankIndex {
        let droppable = ranks.droppable_ranks();
        self.current = self.next;
        self.next = droppable.start + self.source.pick(droppable.len());
        self.current
    }

    /// Fill both slots before the first drop of a session
    pub fn prime(&mut self, ranks: &RankTable) {
        self.advance(ranks);
        self.advance(ranks);
    }

    #[inline]
    pub fn current(&self) -> RankIndex {
        self.current
    }

    #[inline]
    pub fn next(&self) -> RankIndex {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_shifts_next_into_current() {
        let ranks = RankTable::standard();
        let mut queue = SpawnQueue::new(Box::new(ScriptedRankSource::new(vec![1, 3, 2])));
        queue.prime(&ranks);
        assert_eq!(queue.current(), 1);
        assert_eq!(queue.next(), 3);

        assert_eq!(queue.advance(&ranks), 3);
        assert_eq!(queue.next(), 2);
    }

    #[test]
    fn test_scripted_picks_reduced_to_droppable() {
        let ranks = RankTable::standard();
        let mut queue = SpawnQueue::new(Box::new(ScriptedRankSource::constant(7)));
        queue.prime(&ranks);
        assert_eq!(queue.current(), 2);
        assert_eq!(queue.next(), 2);
    }

    #[test]
    fn test_pcg_draws_stay_droppable() {
        let ranks = RankTable::standard();
        let mut queue = SpawnQueue::new(Box::new(PcgRankSource::new(42)));
        queue.prime(&ranks);
        for _ in 0..500 {
            let current = queue.advance(&ranks);
            assert!(ranks.droppable_ranks().contains(&current));
            assert!(ranks.droppable_ranks().contains(&queue.next()));
        }
    }

    #[test]
    fn test_pcg_is_deterministic() {
        let mut a = PcgRankSource::new(1234);
        let mut b = PcgRankSource::new(1234);
        let seq_a: Vec<usize> = (0..32).map(|_| a.pick(5)).collect();
        let seq_b: Vec<usize> = (0..32).map(|_| b.pick(5)).collect();
        assert_eq!(seq_a, seq_b);
    }
}
