//! Data-driven game balance
//!
//! Everything here can be overridden from a JSON file; missing fields keep
//! their defaults. The wave curve itself is not tunable (see `sim::wave`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::question::Difficulty;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value: {0}")]
    Invalid(&'static str),
}

/// Fall duration per difficulty tier (ms)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallDurations {
    pub easy: f32,
    pub medium: f32,
    pub hard: f32,
}

impl Default for FallDurations {
    fn default() -> Self {
        Self {
            easy: 8000.0,
            medium: 7000.0,
            hard: 6000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Playfield ===
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Horizontal margin kept free on both sides when spawning
    pub spawn_margin: f32,

    // === Spawned asteroids ===
    pub min_size: f32,
    pub max_size: f32,
    /// Probability a spawned asteroid is flagged potentially hazardous
    pub hazardous_chance: f64,
    /// Reported velocity (km/h) for locally generated asteroids
    pub velocity_kmh: f32,
    /// Seconds per cosmetic rotation
    pub rotation_secs: f32,
    pub fall_durations: FallDurations,

    // === Questions ===
    /// Treat an unanswered question as wrong once the wave's time limit runs out
    pub enforce_question_timeout: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            viewport_height: 720.0,
            spawn_margin: 50.0,

            min_size: 60.0,
            max_size: 120.0,
            hazardous_chance: 0.3,
            velocity_kmh: 25_000.0,
            rotation_secs: 15.0,
            fall_durations: FallDurations::default(),

            enforce_question_timeout: true,
        }
    }
}

impl Tuning {
    /// Tuning for a specific viewport
    pub fn with_viewport(width: f32, height: f32) -> Self {
        Self {
            viewport_width: width,
            viewport_height: height,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse, or log and fall back to defaults
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(err) => {
                log::warn!("{}; using default tuning", err);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.viewport_width <= 2.0 * self.spawn_margin || self.viewport_height <= 0.0 {
            return Err(TuningError::Invalid("viewport too small for spawn margin"));
        }
        if !(self.min_size > 0.0 && self.min_size < self.max_size) {
            return Err(TuningError::Invalid("size range must be positive and non-empty"));
        }
        if !(0.0..=1.0).contains(&self.hazardous_chance) {
            return Err(TuningError::Invalid("hazardous_chance must be within 0..=1"));
        }
        let f = self.fall_durations;
        if f.easy <= 0.0 || f.medium <= 0.0 || f.hard <= 0.0 {
            return Err(TuningError::Invalid("fall durations must be positive"));
        }
        Ok(())
    }

    /// This tuning if it validates, otherwise defaults on a viewport clamped
    /// to fit the default spawn margin
    pub fn sanitized(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(err) => {
                log::warn!("{}; using default tuning for this viewport", err);
                let min_width = 2.0 * Self::default().spawn_margin + 1.0;
                // f32::max drops a NaN operand
                Self::with_viewport(
                    self.viewport_width.max(min_width),
                    self.viewport_height.max(1.0),
                )
            }
        }
    }

    /// Ground line in screen space
    pub fn ground_y(&self) -> f32 {
        self.viewport_height * GROUND_LINE_FRACTION
    }

    /// Where the fall path ends, just past the ground line
    pub fn fall_end_y(&self) -> f32 {
        self.ground_y() + FALL_OVERSHOOT
    }

    /// Fall duration for the difficulty tier of `level`
    pub fn fall_duration_ms(&self, level: u32) -> f32 {
        match Difficulty::tier_for_level(level) {
            Difficulty::Easy => self.fall_durations.easy,
            Difficulty::Medium => self.fall_durations.medium,
            Difficulty::Hard => self.fall_durations.hard,
        }
    }
}
