//! Play-field geometry and timing
//!
//! Defaults come from `consts`; a JSON override can be supplied by the host.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::rank::RankTable;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Tunable game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Field width (pixels)
    pub width: f32,
    /// Field height (pixels)
    pub height: f32,
    /// Drop zone band height; cats are released at half this height
    pub drop_zone_height: f32,
    /// Wall clearance applied when clamping a drop
    pub drop_margin: f32,
    /// Seconds between drops
    pub drop_cooldown: f32,
    /// Seconds a new cat is exempt from overflow checks
    pub grace_period: f32,
    /// Seconds between overflow polls
    pub overflow_poll_interval: f32,
    /// Speed below which a cat counts as settled (px/s)
    pub settle_speed: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: GAME_WIDTH,
            height: GAME_HEIGHT,
            drop_zone_height: DROP_ZONE_HEIGHT,
            drop_margin: DROP_MARGIN,
            drop_cooldown: DROP_COOLDOWN,
            grace_period: GRACE_PERIOD,
            overflow_poll_interval: OVERFLOW_POLL_INTERVAL,
            settle_speed: SETTLE_SPEED,
        }
    }
}

impl GameConfig {
    /// y coordinate at which dropped cats are created
    #[inline]
    pub fn drop_y(&self) -> f32 {
        self.drop_zone_height / 2.0
    }

    /// Parse a JSON override; missing fields keep their defaults
    pub fn from_json(json: &str, ranks: &RankTable) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate(ranks)?;
        Ok(config)
    }

    /// Check that the configuration describes a playable field for `ranks`
    pub fn validate(&self, ranks: &RankTable) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: "must be a positive number",
                })
            }
        }
        fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: "must be zero or greater",
                })
            }
        }

        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("drop_zone_height", self.drop_zone_height)?;
        positive("overflow_poll_interval", self.overflow_poll_interval)?;
        positive("settle_speed", self.settle_speed)?;
        non_negative("drop_margin", self.drop_margin)?;
        non_negative("drop_cooldown", self.drop_cooldown)?;
        non_negative("grace_period", self.grace_period)?;

        if self.drop_zone_height >= self.height {
            return Err(ConfigError::Invalid {
                field: "drop_zone_height",
                reason: "must be smaller than the field height",
            });
        }
        // every droppable cat must fit between the walls with its margin
        if self.width < 2.0 * (ranks.largest_droppable_radius() + self.drop_margin) {
            return Err(ConfigError::Invalid {
                field: "width",
                reason: "too narrow for the largest droppable cat",
            });
        }
        Ok(())
    }

    /// LocalStorage key for a JSON override
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "suikaCatsConfig";

    /// Load the override from LocalStorage (WASM only), falling back to defaults
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json, &RankTable::standard()) {
                    Ok(config) => {
                        log::info!("Loaded config override from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring config override: {}", e),
                }
            }
        }

        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
