//! Player session
//!
//! The host-side collaborator the simulation reports into: health, score,
//! answer accuracy, wave progression and the question currently on screen.

use serde::Serialize;

use crate::consts::{Millis, STARTING_HEALTH};
use crate::highscores::{HighScoreEntry, HighScores};
use crate::sim::{
    ActiveQuestion, Asteroid, AsteroidId, GameEvent, GameStatus, LocalQuestionBank, Question,
    QuestionError, QuestionListener, QuestionProvider, ScoreAndHealthSink, TickContext,
};

/// Question shown to the player, copied out of the simulation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentedQuestion {
    pub asteroid: AsteroidId,
    pub asteroid_name: String,
    pub question: Question,
}

/// One player's run
#[derive(Debug, Clone, Serialize)]
pub struct Session<P = LocalQuestionBank> {
    #[serde(skip)]
    provider: P,
    pub health: u32,
    pub score: u64,
    pub wave: u32,
    pub status: GameStatus,
    /// Longest run of consecutive correct answers, as reported by the simulation
    pub best_streak: u32,
    pub correct: u32,
    pub answered: u32,
    pub presented: Option<PresentedQuestion>,
    /// Leaderboard rank of this run once recorded
    pub rank: Option<usize>,
    #[serde(skip)]
    recorded: bool,
}

impl<P: QuestionProvider> Session<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            health: STARTING_HEALTH,
            score: 0,
            wave: 1,
            status: GameStatus::Playing,
            best_streak: 0,
            correct: 0,
            answered: 0,
            presented: None,
            rank: None,
            recorded: false,
        }
    }

    /// Per-tick context for the simulation
    pub fn context(&self, now: Millis, time_freeze: bool) -> TickContext {
        TickContext {
            now,
            time_freeze,
            status: self.status,
            wave: self.wave,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.status = match (self.status, paused) {
            (GameStatus::GameOver, _) => GameStatus::GameOver,
            (_, true) => GameStatus::Paused,
            (_, false) => GameStatus::Playing,
        };
    }

    /// Percentage of answered questions that were correct
    pub fn accuracy(&self) -> f32 {
        if self.answered == 0 {
            return 0.0;
        }
        self.correct as f32 / self.answered as f32 * 100.0
    }

    /// Check an answer against the question on screen
    pub fn check_answer(&self, answer_index: usize) -> Option<(AsteroidId, bool)> {
        self.presented
            .as_ref()
            .map(|p| (p.asteroid, p.question.is_correct(answer_index)))
    }

    /// Bookkeeping for simulation events
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for event in events {
            match *event {
                GameEvent::Deflected { streak, .. } => {
                    self.answered += 1;
                    self.correct += 1;
                    self.best_streak = self.best_streak.max(streak);
                }
                GameEvent::WrongAnswer(_) => self.answered += 1,
                GameEvent::WaveCleared(n) if !self.is_game_over() => {
                    self.wave = n + 1;
                    log::info!("Advancing to wave {}", self.wave);
                }
                _ => {}
            }
        }
    }

    /// Put a finished run on the leaderboard (once)
    pub fn record_high_score(&mut self, scores: &mut HighScores, timestamp: f64) -> Option<usize> {
        if !self.is_game_over() || self.recorded {
            return self.rank;
        }
        self.recorded = true;
        self.rank = scores.add_score(HighScoreEntry {
            score: self.score,
            wave: self.wave,
            accuracy: self.accuracy(),
            timestamp,
        });
        if let Some(rank) = self.rank {
            log::info!("New high score #{}: {}", rank, self.score);
            scores.save();
        }
        self.rank
    }
}

impl<P: QuestionProvider> QuestionProvider for Session<P> {
    fn get_question(&mut self, level: u32, streak: u32) -> Result<Question, QuestionError> {
        self.provider.get_question(level, streak)
    }
}

impl<P> ScoreAndHealthSink for Session<P> {
    fn report_damage(&mut self, amount: u32, asteroid: &Asteroid) {
        if self.status == GameStatus::GameOver {
            return;
        }
        self.health = self.health.saturating_sub(amount);
        log::info!(
            "{} {} hit for {} (health {})",
            asteroid.name,
            asteroid.id,
            amount,
            self.health
        );
        if self.health == 0 {
            log::info!("Game over at wave {} with {} points", self.wave, self.score);
            self.status = GameStatus::GameOver;
        }
    }

    fn report_score(&mut self, points: u32) {
        self.score += points as u64;
    }
}

impl<P> QuestionListener for Session<P> {
    fn on_active_question_change(&mut self, active: Option<ActiveQuestion<'_>>) {
        self.presented = active.map(|a| PresentedQuestion {
            asteroid: a.asteroid_id(),
            asteroid_name: a.asteroid.name.clone(),
            question: a.question.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GameState, tick};
    use crate::tuning::Tuning;

    fn session() -> Session {
        Session::new(LocalQuestionBank::builtin(1))
    }

    #[test]
    fn test_damage_ends_game() {
        let mut session = session();
        let rock = crate::sim::asteroid::tests::test_asteroid(1);

        for _ in 0..4 {
            session.report_damage(20, &rock);
        }
        assert_eq!(session.health, 20);
        assert!(!session.is_game_over());

        session.report_damage(30, &rock);
        assert_eq!(session.health, 0);
        assert!(session.is_game_over());
        assert_eq!(session.context(5, false).status, GameStatus::GameOver);

        // Pause can't resurrect a finished run
        session.set_paused(false);
        assert!(session.is_game_over());
    }

    #[test]
    fn test_events_drive_accuracy_and_wave() {
        let mut session = session();
        session.handle_events(&[
            GameEvent::Deflected {
                id: AsteroidId(1),
                points: 10,
                streak: 1,
            },
            GameEvent::Deflected {
                id: AsteroidId(2),
                points: 10,
                streak: 2,
            },
            GameEvent::WrongAnswer(AsteroidId(3)),
            GameEvent::Deflected {
                id: AsteroidId(4),
                points: 10,
                streak: 1,
            },
            GameEvent::WaveCleared(1),
        ]);
        assert_eq!(session.answered, 4);
        assert_eq!(session.correct, 3);
        assert!((session.accuracy() - 75.0).abs() < 1e-4);
        assert_eq!(session.best_streak, 2);
        assert_eq!(session.wave, 2);
        assert_eq!(session.context(0, false).wave, 2);
    }

    #[test]
    fn test_best_streak_follows_simulation() {
        let mut session = session();
        let mut state = GameState::new(2, Tuning::default());

        for (n, correct) in [(1, true), (2, true), (3, false), (4, true)] {
            state
                .asteroids
                .push(crate::sim::asteroid::tests::test_asteroid(n));
            state
                .trigger_question(AsteroidId(n), 0, &mut session)
                .unwrap();
            state.resolve_answer(AsteroidId(n), correct, 10, &mut session);
            let events = state.drain_events();
            session.handle_events(&events);
        }

        assert_eq!(state.streak, 1);
        assert_eq!(session.best_streak, 2);
        assert_eq!(session.correct, 3);
        assert_eq!(session.answered, 4);
    }

    #[test]
    fn test_presented_question_follows_gate() {
        let mut session = session();
        let mut state = GameState::new(4, Tuning::default());
        tick(&mut state, &session.context(0, false), &mut session);

        let id = state.asteroids[0].id;
        state.trigger_question(id, 10, &mut session).unwrap();
        let presented = session.presented.clone().unwrap();
        assert_eq!(presented.asteroid, id);
        assert_eq!(presented.question, state.asteroids[0].question);

        let correct = presented.question.correct_answer;
        assert_eq!(session.check_answer(correct), Some((id, true)));
        assert_eq!(session.check_answer(correct + 1), Some((id, false)));

        state.resolve_answer(id, true, 20, &mut session);
        assert!(session.presented.is_none());
        assert_eq!(session.check_answer(0), None);
    }

    #[test]
    fn test_unattended_run_ends_in_game_over() {
        let mut session = session();
        let mut state = GameState::new(21, Tuning::default());
        let mut scores = HighScores::new();

        let mut now = 0;
        while !session.is_game_over() && now < 300_000 {
            tick(&mut state, &session.context(now, false), &mut session);
            let events = state.drain_events();
            session.handle_events(&events);
            now += 50;
        }

        // Wave 1 has three asteroids (60 damage), wave 2 finishes the job
        assert!(session.is_game_over());
        assert_eq!(session.health, 0);
        assert_eq!(session.wave, 2);
        assert_eq!(session.score, 0);

        // Nothing scored, nothing to record
        assert_eq!(session.record_high_score(&mut scores, 1.0), None);
        assert!(scores.is_empty());

        // Further ticks are inert
        let positions: Vec<_> = state.asteroids.iter().map(|a| (a.id, a.pos)).collect();
        tick(&mut state, &session.context(now + 5000, false), &mut session);
        assert!(state.drain_events().is_empty());
        let after: Vec<_> = state.asteroids.iter().map(|a| (a.id, a.pos)).collect();
        assert_eq!(positions, after);
    }

    #[test]
    fn test_high_score_recorded_once() {
        let mut session = session();
        let mut scores = HighScores::new();
        let rock = crate::sim::asteroid::tests::test_asteroid(1);

        session.report_score(120);
        assert_eq!(session.record_high_score(&mut scores, 1.0), None);

        session.report_damage(STARTING_HEALTH, &rock);
        assert_eq!(session.record_high_score(&mut scores, 2.0), Some(1));
        assert_eq!(session.record_high_score(&mut scores, 3.0), Some(1));
        assert_eq!(scores.entries.len(), 1);
        assert_eq!(scores.entries[0].score, 120);
    }
}
