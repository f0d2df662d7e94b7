//! Question interrupt gate
//!
//! One global question slot. `open` and `close` are the only mutators, so
//! "at most one question open" holds by construction.

use serde::{Deserialize, Serialize};

use super::asteroid::{Asteroid, AsteroidId, AsteroidPhase};
use super::sink::{ActiveQuestion, QuestionListener};
use crate::consts::Millis;

/// The occupied slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenQuestion {
    pub asteroid: AsteroidId,
    pub opened_at: Millis,
}

/// Why an interaction did not open a question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// Another asteroid's question is already open
    Busy(AsteroidId),
    /// No such asteroid in the active set
    Unknown,
    /// Already triggered or no longer falling
    NotFalling,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionGate {
    slot: Option<OpenQuestion>,
}

impl QuestionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// A question is being answered (the global question freeze)
    pub fn is_open(&self) -> bool {
        self.slot.is_some()
    }

    pub fn current(&self) -> Option<OpenQuestion> {
        self.slot
    }

    /// FALLING -> QUESTION_OPEN for the asteroid the player engaged
    pub fn open<L: QuestionListener + ?Sized>(
        &mut self,
        asteroids: &mut [Asteroid],
        id: AsteroidId,
        now: Millis,
        listener: &mut L,
    ) -> Result<(), GateRejection> {
        if let Some(open) = self.slot {
            return Err(GateRejection::Busy(open.asteroid));
        }
        let asteroid = asteroids
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(GateRejection::Unknown)?;
        if asteroid.question_triggered || asteroid.phase != AsteroidPhase::Falling {
            return Err(GateRejection::NotFalling);
        }

        asteroid.question_triggered = true;
        asteroid.phase = AsteroidPhase::QuestionOpen { opened_at: now };
        self.slot = Some(OpenQuestion {
            asteroid: id,
            opened_at: now,
        });
        log::debug!("Question opened for {}", id);

        let asteroid = &*asteroid;
        listener.on_active_question_change(Some(ActiveQuestion {
            question: &asteroid.question,
            asteroid,
        }));
        Ok(())
    }

    /// Release the slot if `id` holds it. Returns whether anything closed.
    pub fn close<L: QuestionListener + ?Sized>(&mut self, id: AsteroidId, listener: &mut L) -> bool {
        match self.slot {
            Some(open) if open.asteroid == id => {
                self.slot = None;
                log::debug!("Question closed for {}", id);
                listener.on_active_question_change(None);
                true
            }
            _ => false,
        }
    }

    /// Move the open question's timestamp later by `by` ms
    pub fn shift(&mut self, by: Millis) {
        if let Some(open) = &mut self.slot {
            open.opened_at += by;
        }
    }

    /// The open question has run past `limit_ms`
    pub fn expired(&self, now: Millis, limit_ms: Millis) -> Option<AsteroidId> {
        self.slot
            .filter(|open| now.saturating_sub(open.opened_at) >= limit_ms)
            .map(|open| open.asteroid)
    }
}
