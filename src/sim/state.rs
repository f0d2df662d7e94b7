//! Game state and core simulation types
//!
//! All state that must be persisted for determinism lives here. The active
//! asteroid collection is only ever mutated through `&mut GameState`.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::asteroid::{Asteroid, AsteroidId, AsteroidPhase};
use super::gate::{GateRejection, QuestionGate};
use super::outcome::{self, Outcome, Settled};
use super::question::question_or_fallback;
use super::sink::{GameHost, QuestionListener, ScoreAndHealthSink};
use super::spawn::{SpawnScheduler, boss_successor};
use super::wave::{EventEffect, SpecialEvent, WaveConfig, wave_config};
use crate::consts::Millis;
use crate::tuning::Tuning;

/// Host-level game status; the simulation only runs while `Playing`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    Playing,
    Paused,
    GameOver,
}

/// Per-tick inputs from the host
#[derive(Debug, Clone, Copy, Default)]
pub struct TickContext {
    /// Monotonic host time (ms)
    pub now: Millis,
    /// Time-freeze power-up active
    pub time_freeze: bool,
    pub status: GameStatus,
    /// Wave the host wants to be playing
    pub wave: u32,
}

/// Things that happened, for presentation and bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    WaveStarted(u32),
    WaveCleared(u32),
    SpecialEventStarted(SpecialEvent),
    SpecialEventEnded(SpecialEvent),
    Spawned { id: AsteroidId, boss: bool },
    QuestionOpened(AsteroidId),
    QuestionClosed(AsteroidId),
    /// Time limit ran out; resolved as a wrong answer
    QuestionExpired(AsteroidId),
    GroundImpact(AsteroidId),
    /// Correct answer; `streak` includes this one
    Deflected {
        id: AsteroidId,
        points: u32,
        streak: u32,
    },
    WrongAnswer(AsteroidId),
    BossHit {
        id: AsteroidId,
        successor: AsteroidId,
        remaining: u8,
    },
    /// Wrong-answer highlight is over; the asteroid is now hitting the ground
    Colliding(AsteroidId),
    Removed(AsteroidId),
}

impl From<Settled> for GameEvent {
    fn from(settled: Settled) -> Self {
        match settled {
            Settled::Colliding(id) => GameEvent::Colliding(id),
            Settled::Impacted { id, .. } | Settled::Cleared { id, .. } => GameEvent::Removed(id),
        }
    }
}

/// A special event running in the current wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub event: SpecialEvent,
    pub ends_at: Millis,
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Rules for the wave in progress
    pub wave: WaveConfig,
    /// `None` until the first tick starts the wave
    pub wave_started_at: Option<Millis>,
    pub wave_cleared: bool,
    /// Active asteroids (sorted by id for determinism)
    pub asteroids: Vec<Asteroid>,
    pub gate: QuestionGate,
    pub scheduler: SpawnScheduler,
    pub special_events: Vec<ActiveEvent>,
    /// Consecutive correct answers
    pub streak: u32,
    /// Host time of the previous tick
    pub last_now: Option<Millis>,
    /// Host time of the last running tick before the current pause
    #[serde(default)]
    pub paused_at: Option<Millis>,
    /// Pending events (drained by the host)
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed. Tuning that fails
    /// validation is replaced through `Tuning::sanitized`.
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning: tuning.sanitized(),
            wave: wave_config(1),
            wave_started_at: None,
            wave_cleared: false,
            asteroids: Vec::new(),
            gate: QuestionGate::new(),
            scheduler: SpawnScheduler::new(),
            special_events: Vec::new(),
            streak: 0,
            last_now: None,
            paused_at: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> AsteroidId {
        let id = AsteroidId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Id the next spawned entity will receive
    pub(crate) fn peek_entity_id(&self) -> AsteroidId {
        AsteroidId(self.next_id)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// A question is open (global question freeze)
    pub fn question_freeze(&self) -> bool {
        self.gate.is_open()
    }

    pub fn asteroid(&self, id: AsteroidId) -> Option<&Asteroid> {
        self.asteroids.iter().find(|a| a.id == id)
    }

    /// Asteroid whose question is currently open
    pub fn active_question(&self) -> Option<&Asteroid> {
        self.gate.current().and_then(|open| self.asteroid(open.asteroid))
    }

    /// Number of asteroids in the question-open phase
    pub fn open_question_count(&self) -> usize {
        self.asteroids
            .iter()
            .filter(|a| matches!(a.phase, AsteroidPhase::QuestionOpen { .. }))
            .count()
    }

    /// Combined modifiers of the special events running right now
    pub fn effect(&self, now: Millis) -> EventEffect {
        self.special_events
            .iter()
            .filter(|e| now < e.ends_at)
            .fold(EventEffect::NEUTRAL, |acc, e| acc.combine(e.event.effect()))
    }

    /// Move every stored timestamp later by `by` ms, so time spent paused
    /// counts toward no timer
    pub fn shift_clock(&mut self, by: Millis) {
        if by == 0 {
            return;
        }
        if let Some(started) = &mut self.wave_started_at {
            *started += by;
        }
        if let Some(next) = &mut self.scheduler.next_spawn_at {
            *next += by;
        }
        self.gate.shift(by);
        for active in &mut self.special_events {
            active.ends_at += by;
        }
        for asteroid in &mut self.asteroids {
            asteroid.phase.shift(by);
        }
    }

    /// All spawns done and the field is empty
    pub fn is_wave_complete(&self) -> bool {
        self.scheduler.exhausted(&self.wave) && self.asteroids.is_empty()
    }

    /// Switch to `wave`. Pending score and damage from the previous wave are
    /// reported first; asteroids still in flight are discarded.
    pub fn start_wave<H: ScoreAndHealthSink + QuestionListener + ?Sized>(
        &mut self,
        wave: u32,
        now: Millis,
        host: &mut H,
    ) {
        if let Some(open) = self.gate.current() {
            self.gate.close(open.asteroid, host);
            self.events.push(GameEvent::QuestionClosed(open.asteroid));
        }
        for entry in outcome::flush(&mut self.asteroids, host) {
            self.events.push(entry.into());
        }
        if !self.asteroids.is_empty() {
            log::info!("Discarding {} asteroids from previous wave", self.asteroids.len());
            self.asteroids.clear();
        }

        self.wave = wave_config(wave);
        self.wave_started_at = Some(now);
        self.wave_cleared = false;
        self.scheduler.reset();
        self.special_events = self
            .wave
            .special_events
            .iter()
            .map(|&event| ActiveEvent {
                event,
                ends_at: now + event.effect().duration_ms,
            })
            .collect();
        let extra = self
            .special_events
            .iter()
            .fold(EventEffect::NEUTRAL, |acc, e| acc.combine(e.event.effect()))
            .extra_asteroids;
        self.scheduler.bonus = (self.wave.asteroid_count as f32 * extra).round() as u32;

        log::info!(
            "Wave {}: {} asteroids, {} at once, spawn every ~{}ms{}",
            self.wave.wave_number,
            self.scheduler.quota(&self.wave),
            self.wave.max_simultaneous,
            self.wave.spawn_rate_ms,
            self.wave
                .boss
                .as_ref()
                .map(|b| format!(", boss {}", b.name))
                .unwrap_or_default()
        );
        self.events.push(GameEvent::WaveStarted(self.wave.wave_number));
        for active in &self.special_events {
            log::info!("Special event: {}", active.event.name());
            self.events.push(GameEvent::SpecialEventStarted(active.event));
        }
    }

    /// Player engaged an asteroid: open its question
    pub fn trigger_question<L: QuestionListener + ?Sized>(
        &mut self,
        id: AsteroidId,
        now: Millis,
        listener: &mut L,
    ) -> Result<(), GateRejection> {
        self.gate.open(&mut self.asteroids, id, now, listener)?;
        self.events.push(GameEvent::QuestionOpened(id));
        Ok(())
    }

    /// Answer the open question on `id`. No-op (None) unless that question is open.
    pub fn resolve_answer<H: GameHost + ?Sized>(
        &mut self,
        id: AsteroidId,
        is_correct: bool,
        now: Millis,
        host: &mut H,
    ) -> Option<Outcome> {
        let multiplier = self.wave.point_multiplier * self.effect(now).points;
        let ground_y = self.tuning.ground_y();
        let outcome = outcome::resolve_answer(
            &mut self.asteroids,
            id,
            is_correct,
            now,
            ground_y,
            multiplier,
            &mut self.rng,
        )?;

        if self.gate.close(id, host) {
            self.events.push(GameEvent::QuestionClosed(id));
        }

        match outcome {
            Outcome::WrongAnswer => {
                self.streak = 0;
                self.events.push(GameEvent::WrongAnswer(id));
            }
            Outcome::Deflected { points } => {
                self.streak += 1;
                self.events.push(GameEvent::Deflected {
                    id,
                    points,
                    streak: self.streak,
                });
            }
            Outcome::BossPartialHit { points, remaining } => {
                self.streak += 1;
                self.events.push(GameEvent::Deflected {
                    id,
                    points,
                    streak: self.streak,
                });
                self.spawn_boss_successor(id, remaining, host);
            }
            Outcome::GroundImpact => {}
        }
        Some(outcome)
    }

    fn spawn_boss_successor<H: GameHost + ?Sized>(
        &mut self,
        prev: AsteroidId,
        remaining: u8,
        host: &mut H,
    ) {
        let question = question_or_fallback(host, self.wave.wave_number, self.streak);
        let successor_id = self.peek_entity_id();
        let successor = self
            .asteroid(prev)
            .and_then(|a| boss_successor(a, successor_id, question));
        if let Some(successor) = successor {
            self.next_entity_id();
            log::info!(
                "{} survives with {} hit points left",
                successor.name,
                remaining
            );
            self.asteroids.push(successor);
            self.events.push(GameEvent::BossHit {
                id: prev,
                successor: successor_id,
                remaining,
            });
        }
    }

    /// Untriggered asteroid crossed the ground line
    pub fn resolve_ground_impact(&mut self, id: AsteroidId, now: Millis) -> Option<Outcome> {
        let ground_y = self.tuning.ground_y();
        let outcome = outcome::resolve_ground_impact(&mut self.asteroids, id, now, ground_y)?;
        self.events.push(GameEvent::GroundImpact(id));
        Some(outcome)
    }

    /// Ensure asteroids are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.asteroids.sort_by_key(|a| a.id);
    }
}
