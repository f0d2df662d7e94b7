//! Trivia questions and the provider seam
//!
//! The simulation only needs "give me a usable question for this level".
//! `LocalQuestionBank` is the built-in provider; any other source (network,
//! storage) plugs in through `QuestionProvider`.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Question difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Difficulty tier the game is in at a given level
    pub fn tier_for_level(level: u32) -> Self {
        match level {
            0..=2 => Difficulty::Easy,
            3..=5 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }
}

/// A multiple-choice question bound to an asteroid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub question: String,
    pub answers: Vec<String>,
    /// Index into `answers`
    pub correct_answer: usize,
    pub points: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    /// Built-in question used whenever a provider fails
    pub fn fallback() -> Self {
        Self {
            id: "space_fallback".to_string(),
            question: "How many planets are in our solar system?".to_string(),
            answers: vec!["7", "8", "9", "10"]
                .into_iter()
                .map(String::from)
                .collect(),
            correct_answer: 1,
            points: 10,
            difficulty: Difficulty::Easy,
            explanation: Some(
                "There are 8 planets since Pluto was reclassified as a dwarf planet in 2006!"
                    .to_string(),
            ),
        }
    }

    /// Check that the question can actually be asked and answered
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.id.trim().is_empty() {
            return Err(QuestionError::Malformed {
                id: self.id.clone(),
                reason: "missing id",
            });
        }
        if self.question.trim().is_empty() {
            return Err(QuestionError::Malformed {
                id: self.id.clone(),
                reason: "missing question text",
            });
        }
        if self.answers.len() < 2 {
            return Err(QuestionError::Malformed {
                id: self.id.clone(),
                reason: "needs at least 2 answers",
            });
        }
        if self.correct_answer >= self.answers.len() {
            return Err(QuestionError::Malformed {
                id: self.id.clone(),
                reason: "correct answer index out of range",
            });
        }
        Ok(())
    }

    pub fn is_correct(&self, answer_index: usize) -> bool {
        answer_index == self.correct_answer
    }
}

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("question {id:?} is malformed: {reason}")]
    Malformed { id: String, reason: &'static str },
    #[error("no questions available for level {level}")]
    Exhausted { level: u32 },
    #[error("question data could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question provider unavailable: {0}")]
    Unavailable(String),
}

/// Source of questions for newly spawned asteroids
pub trait QuestionProvider {
    fn get_question(&mut self, level: u32, streak: u32) -> Result<Question, QuestionError>;
}

/// Ask the provider, falling back to the built-in question on any failure.
/// An asteroid must never spawn without a usable question.
pub fn question_or_fallback<P: QuestionProvider + ?Sized>(
    provider: &mut P,
    level: u32,
    streak: u32,
) -> Question {
    match provider
        .get_question(level, streak)
        .and_then(|q| q.validate().map(|_| q))
    {
        Ok(question) => question,
        Err(err) => {
            log::warn!("Question provider failed ({}), using fallback", err);
            Question::fallback()
        }
    }
}

/// One category in the quiz data file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Quiz data file layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizData {
    #[serde(default)]
    pub categories: BTreeMap<String, QuizCategory>,
    #[serde(default)]
    pub streak_bonus_questions: Vec<Question>,
}

/// Streak length that unlocks bonus questions
pub const STREAK_BONUS_THRESHOLD: u32 = 5;
/// Chance of drawing from the bonus pool once unlocked
pub const STREAK_BONUS_CHANCE: f64 = 0.3;

/// Local, level-aware question bank
#[derive(Debug, Clone)]
pub struct LocalQuestionBank {
    questions: Vec<Question>,
    bonus: Vec<Question>,
    rng: Pcg32,
}

impl LocalQuestionBank {
    /// Bank with the built-in space trivia
    pub fn builtin(seed: u64) -> Self {
        Self::from_questions(builtin_questions(), Vec::new(), seed)
    }

    pub fn from_questions(questions: Vec<Question>, bonus: Vec<Question>, seed: u64) -> Self {
        let keep = |q: &Question| match q.validate() {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Dropping question: {}", err);
                false
            }
        };
        let questions: Vec<_> = questions.into_iter().filter(keep).collect();
        let bonus: Vec<_> = bonus.into_iter().filter(keep).collect();
        log::info!(
            "Question bank ready: {} questions, {} streak bonus",
            questions.len(),
            bonus.len()
        );
        Self {
            questions,
            bonus,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Load a bank from quiz JSON (`{"categories": {..}, "streakBonusQuestions": [..]}`)
    pub fn from_json(json: &str, seed: u64) -> Result<Self, QuestionError> {
        let data: QuizData = serde_json::from_str(json)?;
        let questions = data
            .categories
            .into_values()
            .flat_map(|c| c.questions)
            .collect();
        Ok(Self::from_questions(
            questions,
            data.streak_bonus_questions,
            seed,
        ))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn count_by_difficulty(&self, difficulty: Difficulty) -> usize {
        self.questions
            .iter()
            .filter(|q| q.difficulty == difficulty)
            .count()
    }

    /// Weighted candidate pool for a level: easy-heavy early, hard-heavy late
    fn pool_for_level(questions: &[Question], level: u32) -> Vec<&Question> {
        let weights: [(Difficulty, usize); 3] = match Difficulty::tier_for_level(level) {
            Difficulty::Easy => [
                (Difficulty::Easy, 2),
                (Difficulty::Medium, 1),
                (Difficulty::Hard, 0),
            ],
            Difficulty::Medium => [
                (Difficulty::Easy, 1),
                (Difficulty::Medium, 2),
                (Difficulty::Hard, 0),
            ],
            Difficulty::Hard => [
                (Difficulty::Easy, 0),
                (Difficulty::Medium, 1),
                (Difficulty::Hard, 2),
            ],
        };

        let mut pool = Vec::new();
        for (difficulty, weight) in weights {
            for _ in 0..weight {
                pool.extend(questions.iter().filter(|q| q.difficulty == difficulty));
            }
        }
        pool
    }
}

impl QuestionProvider for LocalQuestionBank {
    fn get_question(&mut self, level: u32, streak: u32) -> Result<Question, QuestionError> {
        if streak >= STREAK_BONUS_THRESHOLD
            && !self.bonus.is_empty()
            && self.rng.random_bool(STREAK_BONUS_CHANCE)
        {
            let index = self.rng.random_range(0..self.bonus.len());
            return Ok(self.bonus[index].clone());
        }

        let pool = Self::pool_for_level(&self.questions, level);
        if pool.is_empty() {
            return Err(QuestionError::Exhausted { level });
        }
        let index = self.rng.random_range(0..pool.len());
        Ok(pool[index].clone())
    }
}

fn q(
    id: &str,
    difficulty: Difficulty,
    points: u32,
    question: &str,
    answers: [&str; 4],
    correct_answer: usize,
    explanation: &str,
) -> Question {
    Question {
        id: id.to_string(),
        question: question.to_string(),
        answers: answers.iter().map(|a| a.to_string()).collect(),
        correct_answer,
        points,
        difficulty,
        explanation: Some(explanation.to_string()),
    }
}

/// Built-in space trivia
pub fn builtin_questions() -> Vec<Question> {
    use Difficulty::*;
    vec![
        q(
            "space_001",
            Easy,
            10,
            "What causes most asteroids to be found between Mars and Jupiter?",
            ["Gravity", "Solar wind", "Magnetic fields", "Temperature"],
            0,
            "Jupiter's strong gravity prevented these rocks from forming into a planet!",
        ),
        q(
            "space_002",
            Easy,
            10,
            "Which is the largest object in the asteroid belt?",
            ["Vesta", "Pallas", "Ceres", "Hygiea"],
            2,
            "Ceres is so big it is classified as a dwarf planet.",
        ),
        q(
            "space_003",
            Easy,
            10,
            "What is the name of Earth's only natural satellite?",
            ["Phobos", "The Moon", "Titan", "Europa"],
            1,
            "The Moon formed about 4.5 billion years ago.",
        ),
        q(
            "space_004",
            Medium,
            15,
            "What is the name of NASA's mission that returned samples from asteroid Bennu?",
            ["DART", "OSIRIS-REx", "Lucy", "NEAR Shoemaker"],
            1,
            "OSIRIS-REx successfully collected samples from asteroid Bennu!",
        ),
        q(
            "space_005",
            Medium,
            15,
            "Which NASA mission deliberately crashed into an asteroid to change its orbit?",
            ["DART", "Dawn", "Psyche", "Hayabusa"],
            0,
            "DART shortened the orbit of the moonlet Dimorphos in 2022.",
        ),
        q(
            "space_006",
            Medium,
            15,
            "Roughly how long ago did an asteroid impact end the age of the dinosaurs?",
            [
                "6 million years",
                "66 million years",
                "660 million years",
                "6 billion years",
            ],
            1,
            "The Chicxulub impact happened about 66 million years ago.",
        ),
        q(
            "space_007",
            Hard,
            20,
            "Which asteroid will pass closer to Earth than some satellites in 2029?",
            ["Ceres", "Apophis", "Vesta", "Eros"],
            1,
            "Apophis will pass very close to Earth in 2029!",
        ),
        q(
            "space_008",
            Hard,
            20,
            "What makes an asteroid 'potentially hazardous' by NASA's definition?",
            [
                "It is made of metal",
                "It spins faster than 1 rotation per hour",
                "It is larger than ~140 m and can come within 0.05 AU of Earth's orbit",
                "It has a moon",
            ],
            2,
            "Size and minimum orbit intersection distance decide the classification.",
        ),
        q(
            "space_009",
            Hard,
            20,
            "Which spacecraft was the first to orbit and land on an asteroid?",
            ["Rosetta", "Hayabusa2", "NEAR Shoemaker", "Dawn"],
            2,
            "NEAR Shoemaker touched down on Eros in 2001.",
        ),
    ]
}
