//! Suika Cats - a merge arcade game
//!
//! Core modules:
//! - `sim`: Deterministic rule engine (ranks, spawning, merges, game over, session)
//! - `persistence`: Best-score storage (LocalStorage on web, in-memory elsewhere)
//! - `config`: Tunable play-field geometry and timing

pub mod config;
pub mod persistence;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use persistence::{BestScoreStore, MemoryStore};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the browser frame cadence)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play field dimensions (pixels, y grows downward)
    pub const GAME_WIDTH: f32 = 400.0;
    pub const GAME_HEIGHT: f32 = 600.0;
    /// Height of the drop zone band at the top of the field
    pub const DROP_ZONE_HEIGHT: f32 = 80.0;
    /// Gap kept between a dropped cat and the side walls
    pub const DROP_MARGIN: f32 = 5.0;

    /// Seconds between drops
    pub const DROP_COOLDOWN: f32 = 0.5;
    /// Seconds after creation before a cat counts toward overflow
    pub const GRACE_PERIOD: f32 = 0.5;
    /// Seconds between game-over polls
    pub const OVERFLOW_POLL_INTERVAL: f32 = 1.0;
    /// Speed (px/s) below which a cat is considered settled
    pub const SETTLE_SPEED: f32 = 30.0;
}

/// Clamp a drop x coordinate so a circle of `radius` stays `margin` away from both walls
#[inline]
pub fn clamp_drop_x(x: f32, radius: f32, margin: f32, width: f32) -> f32 {
    let min_x = radius + margin;
    let max_x = width - radius - margin;
    min_x.max(x.min(max_x))
}
