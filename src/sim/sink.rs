//! Collaborator seams the simulation reports into

use super::asteroid::{Asteroid, AsteroidId};
use super::question::{Question, QuestionProvider};

/// Fire-and-forget damage/score notifications
pub trait ScoreAndHealthSink {
    fn report_damage(&mut self, amount: u32, asteroid: &Asteroid);
    fn report_score(&mut self, points: u32);
}

/// The question currently surfaced to the player
#[derive(Debug, Clone, Copy)]
pub struct ActiveQuestion<'a> {
    pub question: &'a Question,
    pub asteroid: &'a Asteroid,
}

impl ActiveQuestion<'_> {
    pub fn asteroid_id(&self) -> AsteroidId {
        self.asteroid.id
    }
}

/// Notified whenever the single question slot opens or closes
pub trait QuestionListener {
    fn on_active_question_change(&mut self, active: Option<ActiveQuestion<'_>>);
}

/// Everything the driver needs from its host
pub trait GameHost: QuestionProvider + ScoreAndHealthSink + QuestionListener {}

impl<T: QuestionProvider + ScoreAndHealthSink + QuestionListener> GameHost for T {}
