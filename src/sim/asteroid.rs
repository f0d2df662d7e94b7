//! Asteroid entity model
//!
//! Plain data plus pure predicates. All timing is driven from outside
//! (tracker, gate, outcome) so an asteroid never owns a timer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::question::Question;
use super::wave::{AsteroidKind, BossDescriptor};
use crate::consts::*;

/// Stable entity id, unique within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AsteroidId(pub u32);

impl std::fmt::Display for AsteroidId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Threat classification derived from visual size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
}

impl ThreatLevel {
    pub fn from_size(size: f32) -> Self {
        if size > 100.0 {
            ThreatLevel::High
        } else if size >= 75.0 {
            ThreatLevel::Medium
        } else {
            ThreatLevel::Low
        }
    }
}

/// Cosmetic skin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Skin {
    #[default]
    Regular,
    Gold,
    Crystal,
}

pub const SKINS: [Skin; 3] = [Skin::Regular, Skin::Gold, Skin::Crystal];

/// Where an asteroid is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AsteroidPhase {
    /// Falling toward the ground line
    Falling,
    /// Player engaged it; waiting on an answer
    QuestionOpen { opened_at: Millis },
    /// Answered correctly, flying off screen
    Deflected {
        since: Millis,
        exit: Vec2,
        points: u32,
    },
    /// Answered wrong, brief highlight before it hits
    WrongAnswer { since: Millis, damage: u32 },
    /// Hitting the ground
    Colliding { since: Millis, damage: u32 },
}

impl AsteroidPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AsteroidPhase::Deflected { .. }
                | AsteroidPhase::WrongAnswer { .. }
                | AsteroidPhase::Colliding { .. }
        )
    }

    /// Move the phase timestamp later by `by` ms
    pub fn shift(&mut self, by: Millis) {
        match self {
            AsteroidPhase::Falling => {}
            AsteroidPhase::QuestionOpen { opened_at } => *opened_at += by,
            AsteroidPhase::Deflected { since, .. }
            | AsteroidPhase::WrongAnswer { since, .. }
            | AsteroidPhase::Colliding { since, .. } => *since += by,
        }
    }
}

/// Boss hit points riding on an asteroid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossState {
    pub descriptor: BossDescriptor,
    pub hit_points: u8,
}

/// A falling threat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: AsteroidId,
    pub name: String,
    /// Visual size in pixels (cosmetic, drives threat level)
    pub size: f32,
    pub start: Vec2,
    pub end: Vec2,
    pub pos: Vec2,
    pub hazardous: bool,
    /// Estimated diameter (m)
    pub diameter: f32,
    /// Relative velocity (km/h)
    pub velocity: f32,
    /// Time budget to cross from spawn to the end of the fall path (ms)
    pub fall_duration_ms: f32,
    /// Unfrozen fall time accumulated so far (ms, speed-scaled)
    pub fall_elapsed_ms: f32,
    pub question: Question,
    pub question_triggered: bool,
    pub threat: ThreatLevel,
    pub kind: AsteroidKind,
    pub skin: Skin,
    /// Seconds per cosmetic rotation
    pub rotation_secs: f32,
    pub boss: Option<BossState>,
    pub phase: AsteroidPhase,
}

impl Asteroid {
    /// Fraction of the fall path covered (clamped to 1)
    pub fn progress(&self) -> f32 {
        if self.fall_duration_ms <= 0.0 {
            return 1.0;
        }
        (self.fall_elapsed_ms / self.fall_duration_ms).min(1.0)
    }

    /// Advance along the fall path. Only falling asteroids move.
    pub fn advance_fall(&mut self, dt_ms: f32, speed: f32) {
        if self.phase != AsteroidPhase::Falling {
            return;
        }
        self.fall_elapsed_ms += dt_ms * speed;
        self.pos = self.start.lerp(self.end, self.progress());
    }

    /// Has the asteroid crossed below the ground line (screen y grows downward)
    pub fn breached(&self, ground_y: f32) -> bool {
        self.pos.y > ground_y
    }

    pub fn is_boss(&self) -> bool {
        self.boss.is_some()
    }
}

/// Still in play: falling or waiting on an answer
pub fn is_active(a: &Asteroid) -> bool {
    !a.phase.is_terminal()
}

/// Deflected, wrong-answered or colliding
pub fn is_terminal(a: &Asteroid) -> bool {
    a.phase.is_terminal()
}

/// Copy of `a` with its question marked as triggered.
/// Already-triggered asteroids come back unchanged; the flag never reverts.
pub fn with_question_triggered(a: &Asteroid) -> Asteroid {
    Asteroid {
        question_triggered: true,
        ..a.clone()
    }
}

/// Number of asteroids still in play
pub fn active_count(asteroids: &[Asteroid]) -> usize {
    asteroids.iter().filter(|a| is_active(a)).count()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Falling test asteroid straight down the middle of an 800x600 view
    pub(crate) fn test_asteroid(id: u32) -> Asteroid {
        let ground_y = 600.0 * GROUND_LINE_FRACTION;
        Asteroid {
            id: AsteroidId(id),
            name: format!("Test {}", id),
            size: 80.0,
            start: Vec2::new(400.0, SPAWN_Y),
            end: Vec2::new(400.0, ground_y + FALL_OVERSHOOT),
            pos: Vec2::new(400.0, SPAWN_Y),
            hazardous: false,
            diameter: 80.0,
            velocity: 25_000.0,
            fall_duration_ms: 8000.0,
            fall_elapsed_ms: 0.0,
            question: Question::fallback(),
            question_triggered: false,
            threat: ThreatLevel::from_size(80.0),
            kind: AsteroidKind::Normal,
            skin: Skin::Regular,
            rotation_secs: 15.0,
            boss: None,
            phase: AsteroidPhase::Falling,
        }
    }

    #[test]
    fn test_threat_from_size() {
        assert_eq!(ThreatLevel::from_size(60.0), ThreatLevel::Low);
        assert_eq!(ThreatLevel::from_size(80.0), ThreatLevel::Medium);
        assert_eq!(ThreatLevel::from_size(100.0), ThreatLevel::Medium);
        assert_eq!(ThreatLevel::from_size(101.0), ThreatLevel::High);
    }

    #[test]
    fn test_advance_fall_interpolates() {
        let mut a = test_asteroid(1);
        a.advance_fall(4000.0, 1.0);
        assert!((a.progress() - 0.5).abs() < 1e-6);
        let mid = (a.start.y + a.end.y) / 2.0;
        assert!((a.pos.y - mid).abs() < 1e-3);

        // Overshooting the budget clamps at the end of the path
        a.advance_fall(10_000.0, 1.0);
        assert_eq!(a.pos, a.end);
    }

    #[test]
    fn test_terminal_asteroids_do_not_move() {
        let mut a = test_asteroid(1);
        a.phase = AsteroidPhase::Colliding {
            since: 0,
            damage: IMPACT_DAMAGE,
        };
        let before = a.pos;
        a.advance_fall(1000.0, 1.0);
        assert_eq!(a.pos, before);
        assert!(is_terminal(&a));
        assert!(!is_active(&a));
    }

    #[test]
    fn test_with_question_triggered() {
        let a = test_asteroid(1);
        let b = with_question_triggered(&a);
        assert!(!a.question_triggered);
        assert!(b.question_triggered);
        assert!(with_question_triggered(&b).question_triggered);
        assert_eq!(b.id, a.id);
    }

    #[test]
    fn test_breach() {
        let mut a = test_asteroid(1);
        let ground_y = 450.0;
        assert!(!a.breached(ground_y));
        a.advance_fall(8000.0, 1.0);
        assert!(a.breached(ground_y));
    }
}
