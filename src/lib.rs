//! Stadium Runner - football arcade mini-games
//!
//! Core modules:
//! - `sim`: Session state machines (dodgeball runner, dribble, penalty shootout)
//! - `persistence`: Fail-soft key/value store, key space and startup migration
//! - `platform`: Browser/native abstraction (storage backends, clock)
//! - `profiles` / `leaderboard` / `highscores`: Player records
//! - `tuning`: Data-driven difficulty curves
//! - `presentation`: Port to the rendering/audio collaborator
//! - `app`: Menu flow, results screen and display-hold driver

pub mod app;
pub mod highscores;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod presentation;
pub mod profiles;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use app::{App, Screen};
pub use highscores::{HighScoreKey, HighScores};
pub use leaderboard::{GameMode, LeaderboardEntry, LeaderboardService, RecordOutcome};
pub use persistence::PersistenceStore;
pub use profiles::{Country, Profile, ProfileError, ProfileRegistry};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the browser frame cadence)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Screen dimensions
    pub const GAME_W: f32 = 800.0;
    pub const GAME_H: f32 = 500.0;
    /// Height of the fan stands (top & bottom)
    pub const STAND_H: f32 = 60.0;
    pub const FIELD_TOP: f32 = STAND_H;
    pub const FIELD_BOT: f32 = GAME_H - STAND_H;
    pub const FIELD_H: f32 = FIELD_BOT - FIELD_TOP;

    /// Base player run speed (px/s)
    pub const PLAYER_SPEED: f32 = 160.0;
    /// Player body half extents (18x26 box)
    pub const PLAYER_HALF_W: f32 = 9.0;
    pub const PLAYER_HALF_H: f32 = 13.0;

    /// Unscaled ball radius
    pub const BALL_RADIUS: f32 = 6.0;
}

/// Distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Unit heading from `from` toward `to` (zero when coincident)
#[inline]
pub fn heading(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}
