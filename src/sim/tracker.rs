//! Fall and ground-collision tracking

use super::asteroid::{Asteroid, AsteroidId, AsteroidPhase};

/// Global pause state for a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreezeFlags {
    /// Time-freeze power-up
    pub time_freeze: bool,
    /// A question is open
    pub question_freeze: bool,
}

impl FreezeFlags {
    pub fn frozen(&self) -> bool {
        self.time_freeze || self.question_freeze
    }
}

/// Advance every falling asteroid by `dt_ms` and report ground breaches.
///
/// Frozen ticks move nothing and report nothing, for every asteroid.
/// Triggered asteroids never report a breach; their answer decides them.
pub fn advance(
    asteroids: &mut [Asteroid],
    dt_ms: f32,
    freeze: FreezeFlags,
    speed: f32,
    ground_y: f32,
) -> Vec<AsteroidId> {
    if freeze.frozen() {
        return Vec::new();
    }

    let mut breaches = Vec::new();
    for asteroid in asteroids.iter_mut() {
        if asteroid.phase != AsteroidPhase::Falling {
            continue;
        }
        if !asteroid.question_triggered {
            asteroid.advance_fall(dt_ms, speed);
        }
        if asteroid.breached(ground_y) {
            if asteroid.question_triggered {
                log::debug!("Breach suppressed for {} (question pending)", asteroid.id);
            } else {
                breaches.push(asteroid.id);
            }
        }
    }
    breaches
}
