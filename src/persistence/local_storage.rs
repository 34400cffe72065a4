//! LocalStorage-backed best score (WASM only)

use super::{BestScoreStore, encode_best_score, parse_best_score};

/// Best score under a LocalStorage key
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new(Self::STORAGE_KEY)
    }
}

impl LocalStorageStore {
    pub const STORAGE_KEY: &'static str = "suikaCatsBest";

    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

impl BestScoreStore for LocalStorageStore {
    fn load_best_score(&self) -> u64 {
        let Some(storage) = Self::storage() else {
            log::warn!("LocalStorage unavailable, best score starts at 0");
            return 0;
        };

        match storage.get_item(&self.key) {
            Ok(Some(raw)) => match parse_best_score(&raw) {
                Some(best) => {
                    log::info!("Loaded best score {}", best);
                    best
                }
                None => {
                    log::warn!("Ignoring unreadable best score {:?}", raw);
                    0
                }
            },
            _ => {
                log::info!("No best score found, starting fresh");
                0
            }
        }
    }

    fn save_best_score(&mut self, score: u64) {
        if let Some(storage) = Self::storage() {
            if storage
                .set_item(&self.key, &encode_best_score(score))
                .is_err()
            {
                log::warn!("Failed to save best score {}", score);
            }
        }
    }
}
