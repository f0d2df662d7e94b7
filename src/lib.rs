//! Astro Defenders - trivia-powered asteroid defense
//!
//! Core modules:
//! - `sim`: Deterministic simulation (asteroid lifecycle, waves, question gate)
//! - `session`: Host-side score/health bookkeeping
//! - `highscores`: Leaderboard persisted to LocalStorage
//! - `tuning`: Data-driven game balance
//! - `web`: wasm-bindgen surface for the browser shell

pub mod highscores;
pub mod session;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::HighScores;
pub use session::Session;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Milliseconds on the host clock
    pub type Millis = u64;

    /// Spawn cadence never drops below this (ms)
    pub const MIN_SPAWN_INTERVAL_MS: u64 = 1000;
    /// Jitter bounds applied to a wave's spawn rate
    pub const SPAWN_JITTER_MIN: f32 = 0.5;
    pub const SPAWN_JITTER_MAX: f32 = 1.5;

    /// Damage for an asteroid that reaches the ground untouched
    pub const IMPACT_DAMAGE: u32 = 20;
    /// Damage for a wrong answer (worse than ignoring the asteroid)
    pub const WRONG_ANSWER_DAMAGE: u32 = 30;

    /// Settle delays (ms) between a terminal visual state and removal
    pub const COLLISION_SETTLE_MS: u64 = 1000;
    pub const DEFLECT_SETTLE_MS: u64 = 1500;
    pub const WRONG_ANSWER_HIGHLIGHT_MS: u64 = 500;

    /// Vertical spawn line (above the visible area)
    pub const SPAWN_Y: f32 = -100.0;
    /// Ground line as a fraction of viewport height
    pub const GROUND_LINE_FRACTION: f32 = 0.75;
    /// How far past the ground line the fall path ends
    pub const FALL_OVERSHOOT: f32 = 50.0;
    /// Deflected asteroids exit upward to here
    pub const DEFLECT_EXIT_Y: f32 = -200.0;
    /// Max lateral scatter for a deflection (either side)
    pub const DEFLECT_SCATTER: f32 = 400.0;

    /// Boss fall duration relative to the tier duration
    pub const BOSS_FALL_FACTOR: f32 = 1.5;
    /// Fast asteroids fall this much quicker
    pub const FAST_FALL_FACTOR: f32 = 0.75;

    /// Starting health for a session
    pub const STARTING_HEALTH: u32 = 100;
}
