//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Host-provided monotonic clock only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod asteroid;
pub mod gate;
pub mod outcome;
pub mod question;
pub mod sink;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod tracker;
pub mod wave;

pub use asteroid::{
    Asteroid, AsteroidId, AsteroidPhase, Skin, ThreatLevel, active_count, is_active, is_terminal,
    with_question_triggered,
};
pub use gate::{GateRejection, OpenQuestion, QuestionGate};
pub use outcome::{Outcome, Settled};
pub use question::{
    Difficulty, LocalQuestionBank, Question, QuestionError, QuestionProvider, question_or_fallback,
};
pub use sink::{ActiveQuestion, GameHost, QuestionListener, ScoreAndHealthSink};
pub use spawn::{SpawnRoll, SpawnScheduler};
pub use state::{GameEvent, GameState, GameStatus, TickContext};
pub use tick::tick;
pub use tracker::FreezeFlags;
pub use wave::{
    AsteroidKind, BossAbility, BossDescriptor, EventEffect, SpecialEvent, WaveConfig,
    normalize_wave, wave_config,
};
