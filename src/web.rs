//! Browser binding
//!
//! `WebGame` wraps the simulation and a session behind a small wasm-bindgen
//! surface. The page owns the render loop and calls `tick` with
//! `performance.now()`; everything else is input forwarding.

use wasm_bindgen::prelude::*;

use crate::consts::Millis;
use crate::highscores::HighScores;
use crate::session::Session;
use crate::sim::{AsteroidId, GameState, LocalQuestionBank, normalize_wave, tick};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by an earlier instance
        return;
    }
    log::info!("Astro Defenders starting...");
}

/// Game instance holding all state
#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
    session: Session,
    high_scores: HighScores,
    time_freeze: bool,
    now: Millis,
}

#[wasm_bindgen]
impl WebGame {
    /// New run. `tuning_json` overrides balance values; bad JSON falls back to defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, tuning_json: Option<String>) -> WebGame {
        let seed = js_sys::Date::now() as u64;
        let mut tuning = tuning_json
            .as_deref()
            .map(Tuning::from_json_or_default)
            .unwrap_or_default();
        tuning.viewport_width = width;
        tuning.viewport_height = height;

        WebGame {
            state: GameState::new(seed, tuning.sanitized()),
            session: Session::new(LocalQuestionBank::builtin(seed)),
            high_scores: HighScores::load(),
            time_freeze: false,
            now: 0,
        }
    }

    /// Advance to `now_ms`; returns the tick's events as JSON
    pub fn tick(&mut self, now_ms: f64) -> String {
        self.now = now_ms.max(0.0) as Millis;
        let ctx = self.session.context(self.now, self.time_freeze);
        tick(&mut self.state, &ctx, &mut self.session);

        let events = self.state.drain_events();
        self.session.handle_events(&events);
        if self.session.is_game_over() {
            self.session
                .record_high_score(&mut self.high_scores, js_sys::Date::now());
        }
        serde_json::to_string(&events).unwrap_or_default()
    }

    /// Player clicked an asteroid; true if its question opened
    pub fn click(&mut self, asteroid_id: u32) -> bool {
        match self
            .state
            .trigger_question(AsteroidId(asteroid_id), self.now, &mut self.session)
        {
            Ok(()) => true,
            Err(rejection) => {
                log::debug!("Click on #{} ignored: {:?}", asteroid_id, rejection);
                false
            }
        }
    }

    /// Answer the open question; true if the answer was correct
    pub fn answer(&mut self, answer_index: usize) -> bool {
        let Some((id, correct)) = self.session.check_answer(answer_index) else {
            return false;
        };
        self.state
            .resolve_answer(id, correct, self.now, &mut self.session);
        correct
    }

    pub fn set_time_freeze(&mut self, frozen: bool) {
        self.time_freeze = frozen;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.session.set_paused(paused);
    }

    /// Jump to a wave (debug/level select); any value is clamped to a valid wave
    pub fn set_wave(&mut self, wave: f64) {
        self.session.wave = normalize_wave(wave);
    }

    pub fn score(&self) -> f64 {
        self.session.score as f64
    }

    pub fn health(&self) -> u32 {
        self.session.health
    }

    pub fn wave(&self) -> u32 {
        self.session.wave
    }

    pub fn is_game_over(&self) -> bool {
        self.session.is_game_over()
    }

    /// Full simulation state for rendering
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.state).unwrap_or_default()
    }

    /// Session (score, health, open question) for the HUD
    pub fn session_json(&self) -> String {
        serde_json::to_string(&self.session).unwrap_or_default()
    }

    pub fn high_scores_json(&self) -> String {
        serde_json::to_string(&self.high_scores).unwrap_or_default()
    }
}
