//! Best-score persistence
//!
//! A single scalar survives across sessions. On the web it lives in
//! LocalStorage; elsewhere an in-memory store stands in.

use std::cell::Cell;
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
mod local_storage;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

/// Where the best score is kept
pub trait BestScoreStore {
    /// Stored best score, 0 if none
    fn load_best_score(&self) -> u64;

    /// Called whenever the best score rises
    fn save_best_score(&mut self, score: u64);
}

/// In-memory store. Clones share the same value so a caller can keep a
/// handle after giving one to the session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: Rc<Cell<u64>>,
    saves: Rc<Cell<u32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a best score
    pub fn with_best(best: u64) -> Self {
        let store = Self::default();
        store.best.set(best);
        store
    }

    #[inline]
    pub fn best(&self) -> u64 {
        self.best.get()
    }

    /// Number of save calls observed
    #[inline]
    pub fn save_count(&self) -> u32 {
        self.saves.get()
    }
}

impl BestScoreStore for MemoryStore {
    fn load_best_score(&self) -> u64 {
        self.best.get()
    }

    fn save_best_score(&mut self, score: u64) {
        self.best.set(score);
        self.saves.set(self.saves.get() + 1);
    }
}

/// Parse a stored best score; anything unreadable counts as no score
pub fn parse_best_score(raw: &str) -> Option<u64> {
    serde_json::from_str::<u64>(raw.trim()).ok()
}

/// Encode a best score the way it is stored
pub fn encode_best_score(score: u64) -> String {
    // a bare integer, readable by parseInt
    serde_json::to_string(&score).unwrap_or_else(|_| score.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_shares_value() {
        let handle = MemoryStore::with_best(12);
        let mut store: Box<dyn BestScoreStore> = Box::new(handle.clone());
        assert_eq!(store.load_best_score(), 12);

        store.save_best_score(40);
        assert_eq!(handle.best(), 40);
        assert_eq!(handle.save_count(), 1);
    }

    #[test]
    fn test_best_score_encoding() {
        assert_eq!(encode_best_score(57), "57");
        assert_eq!(parse_best_score("57"), Some(57));
        assert_eq!(parse_best_score(" 8\n"), Some(8));
        assert_eq!(parse_best_score("NaN"), None);
        assert_eq!(parse_best_score("-3"), None);
        assert_eq!(parse_best_score(""), None);
    }
}
