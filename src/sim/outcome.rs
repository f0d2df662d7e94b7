//! Outcome resolution and settle timers
//!
//! Resolution only moves an asteroid into a terminal visual phase stamped
//! with the time it entered. `settle` is the one driver that walks those
//! stamps forward, removes finished asteroids and reports damage/score.

use glam::Vec2;
use rand::Rng;

use super::asteroid::{Asteroid, AsteroidId, AsteroidPhase};
use super::sink::ScoreAndHealthSink;
use crate::consts::*;

/// How a resolution ended for the asteroid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Reached the ground without being engaged
    GroundImpact,
    /// Correct answer
    Deflected { points: u32 },
    /// Wrong answer (or timeout)
    WrongAnswer,
    /// Correct answer against a boss that still has hit points left.
    /// The caller spawns the successor.
    BossPartialHit { points: u32, remaining: u8 },
}

/// Something `settle` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// Wrong-answer highlight finished; now colliding
    Colliding(AsteroidId),
    /// Removed after impact; damage reported
    Impacted { id: AsteroidId, damage: u32 },
    /// Removed after deflection; score reported
    Cleared { id: AsteroidId, points: u32 },
}

/// Untriggered asteroid hit the ground: start colliding.
/// No-op unless the asteroid is still falling and untriggered.
pub fn resolve_ground_impact(
    asteroids: &mut [Asteroid],
    id: AsteroidId,
    now: Millis,
    ground_y: f32,
) -> Option<Outcome> {
    let asteroid = asteroids
        .iter_mut()
        .find(|a| a.id == id && a.phase == AsteroidPhase::Falling && !a.question_triggered)?;

    asteroid.phase = AsteroidPhase::Colliding {
        since: now,
        damage: IMPACT_DAMAGE,
    };
    asteroid.pos = Vec2::new(asteroid.end.x, ground_y);
    log::info!("{} {} hit the ground", asteroid.name, asteroid.id);
    Some(Outcome::GroundImpact)
}

/// Resolve the open question on `id`.
/// No-op unless the asteroid is in the question-open phase.
pub fn resolve_answer<R: Rng + ?Sized>(
    asteroids: &mut [Asteroid],
    id: AsteroidId,
    is_correct: bool,
    now: Millis,
    ground_y: f32,
    points_multiplier: f32,
    rng: &mut R,
) -> Option<Outcome> {
    let asteroid = asteroids
        .iter_mut()
        .find(|a| a.id == id && matches!(a.phase, AsteroidPhase::QuestionOpen { .. }))?;

    if !is_correct {
        asteroid.phase = AsteroidPhase::WrongAnswer {
            since: now,
            damage: WRONG_ANSWER_DAMAGE,
        };
        asteroid.pos = Vec2::new(asteroid.end.x, ground_y);
        log::info!("Wrong answer on {} {}", asteroid.name, asteroid.id);
        return Some(Outcome::WrongAnswer);
    }

    let points = (asteroid.question.points as f32 * points_multiplier).round() as u32;
    let scatter = (rng.random::<f32>() - 0.5) * 2.0 * DEFLECT_SCATTER;
    asteroid.phase = AsteroidPhase::Deflected {
        since: now,
        exit: Vec2::new(asteroid.start.x + scatter, DEFLECT_EXIT_Y),
        points,
    };
    log::info!("Deflected {} {} (+{})", asteroid.name, asteroid.id, points);

    match asteroid.boss.as_ref() {
        Some(boss) if boss.hit_points > 1 => Some(Outcome::BossPartialHit {
            points,
            remaining: boss.hit_points - 1,
        }),
        _ => Some(Outcome::Deflected { points }),
    }
}

/// Advance staged terminal phases and remove asteroids whose settle delay
/// has elapsed. Reports happen here, after the visual phase and at removal.
pub fn settle<S: ScoreAndHealthSink + ?Sized>(
    asteroids: &mut Vec<Asteroid>,
    now: Millis,
    sink: &mut S,
) -> Vec<Settled> {
    let mut settled = Vec::new();

    for asteroid in asteroids.iter_mut() {
        loop {
            match asteroid.phase {
                AsteroidPhase::WrongAnswer { since, damage }
                    if now.saturating_sub(since) >= WRONG_ANSWER_HIGHLIGHT_MS =>
                {
                    asteroid.phase = AsteroidPhase::Colliding {
                        since: since + WRONG_ANSWER_HIGHLIGHT_MS,
                        damage,
                    };
                    settled.push(Settled::Colliding(asteroid.id));
                }
                AsteroidPhase::Colliding { since, damage }
                    if now.saturating_sub(since) >= COLLISION_SETTLE_MS =>
                {
                    settled.push(Settled::Impacted {
                        id: asteroid.id,
                        damage,
                    });
                    break;
                }
                AsteroidPhase::Deflected { since, points, .. }
                    if now.saturating_sub(since) >= DEFLECT_SETTLE_MS =>
                {
                    settled.push(Settled::Cleared {
                        id: asteroid.id,
                        points,
                    });
                    break;
                }
                _ => break,
            }
        }
    }

    let mut removed = Vec::new();
    for entry in &settled {
        match *entry {
            Settled::Impacted { id, damage } => {
                if let Some(asteroid) = asteroids.iter().find(|a| a.id == id) {
                    sink.report_damage(damage, asteroid);
                }
                removed.push(id);
            }
            Settled::Cleared { id, points } => {
                sink.report_score(points);
                removed.push(id);
            }
            Settled::Colliding(_) => {}
        }
    }
    if !removed.is_empty() {
        asteroids.retain(|a| !removed.contains(&a.id));
    }

    settled
}

/// Run every pending settle stage to completion now, reporting as `settle` does.
/// Falling and question-open asteroids are left alone.
pub fn flush<S: ScoreAndHealthSink + ?Sized>(
    asteroids: &mut Vec<Asteroid>,
    sink: &mut S,
) -> Vec<Settled> {
    settle(asteroids, Millis::MAX, sink)
}
