//! Spawn scheduling
//!
//! Cadence comes from the wave config with random jitter; every random draw
//! for a new asteroid goes through `SpawnRoll` so construction stays testable.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::asteroid::{
    Asteroid, AsteroidId, AsteroidPhase, BossState, SKINS, Skin, ThreatLevel, active_count,
};
use super::question::{Question, QuestionProvider, question_or_fallback};
use super::wave::{AsteroidKind, BossDescriptor, WaveConfig};
use crate::consts::*;
use crate::tuning::Tuning;

/// Random attributes for one new asteroid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRoll {
    pub start_x: f32,
    pub end_x: f32,
    pub size: f32,
    pub hazardous: bool,
    pub kind: AsteroidKind,
    pub skin: Skin,
    /// Catalog-style number used in the display name
    pub designation: u32,
}

impl SpawnRoll {
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, tuning: &Tuning, kinds: &[AsteroidKind]) -> Self {
        let lo = tuning.spawn_margin;
        let hi = tuning.viewport_width - tuning.spawn_margin;
        let kind = if kinds.is_empty() {
            AsteroidKind::Normal
        } else {
            kinds[rng.random_range(0..kinds.len())]
        };
        Self {
            start_x: rng.random_range(lo..hi),
            end_x: rng.random_range(lo..hi),
            size: rng.random_range(tuning.min_size..tuning.max_size),
            hazardous: rng.random_bool(tuning.hazardous_chance),
            kind,
            skin: SKINS[rng.random_range(0..SKINS.len())],
            designation: rng.random_range(0..1000),
        }
    }
}

/// Build a regular asteroid from a roll
pub fn build_asteroid(
    id: AsteroidId,
    roll: &SpawnRoll,
    question: Question,
    tuning: &Tuning,
    level: u32,
) -> Asteroid {
    let start = Vec2::new(roll.start_x, SPAWN_Y);
    Asteroid {
        id,
        name: format!("Asteroid {}", roll.designation),
        size: roll.size,
        start,
        end: Vec2::new(roll.end_x, tuning.fall_end_y()),
        pos: start,
        hazardous: roll.hazardous,
        diameter: roll.size,
        velocity: tuning.velocity_kmh,
        fall_duration_ms: tuning.fall_duration_ms(level) * roll.kind.fall_factor(),
        fall_elapsed_ms: 0.0,
        question,
        question_triggered: false,
        threat: ThreatLevel::from_size(roll.size),
        kind: roll.kind,
        skin: roll.skin,
        rotation_secs: tuning.rotation_secs,
        boss: None,
        phase: AsteroidPhase::Falling,
    }
}

/// Build a boss asteroid; position comes from the roll, the rest from the descriptor
pub fn build_boss(
    id: AsteroidId,
    roll: &SpawnRoll,
    descriptor: &BossDescriptor,
    question: Question,
    tuning: &Tuning,
    level: u32,
) -> Asteroid {
    let start = Vec2::new(roll.start_x, SPAWN_Y);
    Asteroid {
        id,
        name: descriptor.name.clone(),
        size: descriptor.size,
        start,
        end: Vec2::new(roll.end_x, tuning.fall_end_y()),
        pos: start,
        hazardous: true,
        diameter: descriptor.size,
        velocity: tuning.velocity_kmh,
        fall_duration_ms: tuning.fall_duration_ms(level) * BOSS_FALL_FACTOR,
        fall_elapsed_ms: 0.0,
        question,
        question_triggered: false,
        threat: ThreatLevel::High,
        kind: AsteroidKind::Normal,
        skin: roll.skin,
        rotation_secs: tuning.rotation_secs * 2.0,
        boss: Some(BossState {
            descriptor: descriptor.clone(),
            hit_points: descriptor.hit_points,
        }),
        phase: AsteroidPhase::Falling,
    }
}

/// Boss that continues after a partial hit: a fresh entity with one hit point
/// less, picking up exactly where the previous one was on its fall path
pub fn boss_successor(prev: &Asteroid, id: AsteroidId, question: Question) -> Option<Asteroid> {
    let boss = prev.boss.as_ref()?;
    let hit_points = boss.hit_points.checked_sub(1).filter(|hp| *hp > 0)?;
    Some(Asteroid {
        id,
        question,
        question_triggered: false,
        phase: AsteroidPhase::Falling,
        boss: Some(BossState {
            descriptor: boss.descriptor.clone(),
            hit_points,
        }),
        ..prev.clone()
    })
}

/// Per-call spawn inputs owned by the game state
#[derive(Debug, Clone, Copy)]
pub struct SpawnEnv<'a> {
    /// Id the new asteroid will get if one is spawned
    pub id: AsteroidId,
    pub tuning: &'a Tuning,
    pub streak: u32,
}

/// Decides when and what to spawn within a wave
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnScheduler {
    /// Next cadence point; `None` until the first spawn of the wave
    pub next_spawn_at: Option<Millis>,
    /// Regular asteroids spawned this wave
    pub spawned: u32,
    pub boss_spawned: bool,
    /// Extra regular asteroids granted by this wave's special events
    pub bonus: u32,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything for a new wave
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Regular asteroids this wave will spawn
    pub fn quota(&self, wave: &WaveConfig) -> u32 {
        wave.asteroid_count + self.bonus
    }

    /// No more regular asteroids or bosses left to spawn this wave
    pub fn exhausted(&self, wave: &WaveConfig) -> bool {
        self.spawned >= self.quota(wave) && (!wave.has_boss() || self.boss_spawned)
    }

    /// Jittered delay until the next attempt, never below the fairness floor
    pub fn next_delay<R: Rng + ?Sized>(rng: &mut R, wave: &WaveConfig, interval_factor: f32) -> Millis {
        let jitter = rng.random_range(SPAWN_JITTER_MIN..SPAWN_JITTER_MAX);
        let delay = wave.spawn_rate_ms as f32 * interval_factor * jitter;
        (delay as Millis).max(MIN_SPAWN_INTERVAL_MS)
    }

    /// Create one asteroid if the wave still has room for it.
    ///
    /// Never touches `active`; the caller appends the result.
    pub fn try_spawn<P, R>(
        &mut self,
        active: &[Asteroid],
        wave: &WaveConfig,
        provider: &mut P,
        rng: &mut R,
        env: SpawnEnv<'_>,
    ) -> Option<Asteroid>
    where
        P: QuestionProvider + ?Sized,
        R: Rng + ?Sized,
    {
        if active_count(active) >= wave.max_simultaneous as usize {
            return None;
        }

        let level = wave.wave_number;
        if self.spawned < self.quota(wave) {
            let roll = SpawnRoll::draw(rng, env.tuning, &wave.asteroid_kinds);
            let question = question_or_fallback(provider, level, env.streak);
            self.spawned += 1;
            let asteroid = build_asteroid(env.id, &roll, question, env.tuning, level);
            log::debug!(
                "Spawned {} {} ({:?}, {}/{})",
                asteroid.name,
                asteroid.id,
                asteroid.kind,
                self.spawned,
                self.quota(wave)
            );
            return Some(asteroid);
        }

        if let Some(descriptor) = wave.boss.as_ref().filter(|_| !self.boss_spawned) {
            let roll = SpawnRoll::draw(rng, env.tuning, &wave.asteroid_kinds);
            let question = question_or_fallback(provider, level, env.streak);
            self.boss_spawned = true;
            log::info!("Boss incoming: {}", descriptor.name);
            return Some(build_boss(env.id, &roll, descriptor, question, env.tuning, level));
        }

        None
    }

    /// Run the cadence for this tick.
    ///
    /// The first spawn of a wave is immediate when the field is empty. A due
    /// attempt that gets skipped (question freeze, capacity) still reschedules.
    #[allow(clippy::too_many_arguments)]
    pub fn poll<P, R>(
        &mut self,
        now: Millis,
        active: &[Asteroid],
        wave: &WaveConfig,
        question_freeze: bool,
        interval_factor: f32,
        provider: &mut P,
        rng: &mut R,
        env: SpawnEnv<'_>,
    ) -> Option<Asteroid>
    where
        P: QuestionProvider + ?Sized,
        R: Rng + ?Sized,
    {
        let nothing_yet = self.spawned == 0 && !self.boss_spawned;
        let forced = nothing_yet && active.is_empty() && !question_freeze;
        let due = self.next_spawn_at.is_none_or(|t| now >= t);
        if !forced && !due {
            return None;
        }

        let spawned = if question_freeze {
            None
        } else {
            self.try_spawn(active, wave, provider, rng, env)
        };
        self.next_spawn_at = Some(now + Self::next_delay(rng, wave, interval_factor));
        spawned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::asteroid::tests::test_asteroid;
    use crate::sim::question::LocalQuestionBank;
    use crate::sim::wave::wave_config;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn env(id: u32, tuning: &Tuning) -> SpawnEnv<'_> {
        SpawnEnv {
            id: AsteroidId(id),
            tuning,
            streak: 0,
        }
    }

    #[test]
    fn test_roll_within_bounds() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(42);
        let mut hazardous = 0;
        for _ in 0..2000 {
            let roll = SpawnRoll::draw(&mut rng, &tuning, &[AsteroidKind::Normal]);
            assert!(roll.start_x >= 50.0 && roll.start_x < tuning.viewport_width - 50.0);
            assert!(roll.end_x >= 50.0 && roll.end_x < tuning.viewport_width - 50.0);
            assert!(roll.size >= 60.0 && roll.size < 120.0);
            if roll.hazardous {
                hazardous += 1;
            }
        }
        // ~30% hazardous
        assert!((450..750).contains(&hazardous), "hazardous = {}", hazardous);
    }

    #[test]
    fn test_build_from_fixed_roll() {
        let tuning = Tuning::default();
        let roll = SpawnRoll {
            start_x: 50.0,
            end_x: tuning.viewport_width - 50.0,
            size: 120.0,
            hazardous: true,
            kind: AsteroidKind::Fast,
            skin: Skin::Gold,
            designation: 7,
        };
        let a = build_asteroid(AsteroidId(3), &roll, Question::fallback(), &tuning, 1);
        assert_eq!(a.name, "Asteroid 7");
        assert_eq!(a.pos, Vec2::new(50.0, SPAWN_Y));
        assert_eq!(a.end.y, tuning.ground_y() + FALL_OVERSHOOT);
        assert_eq!(a.threat, ThreatLevel::High);
        assert_eq!(a.fall_duration_ms, 8000.0 * FAST_FALL_FACTOR);
        assert!(!a.question_triggered);
        assert_eq!(a.phase, AsteroidPhase::Falling);
    }

    #[test]
    fn test_capacity_and_total_limits() {
        let tuning = Tuning::default();
        let wave = wave_config(1); // 3 total, 2 at once
        let mut bank = LocalQuestionBank::builtin(1);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut scheduler = SpawnScheduler::new();
        let mut active = Vec::new();

        for id in 1..=2 {
            let a = scheduler
                .try_spawn(&active, &wave, &mut bank, &mut rng, env(id, &tuning))
                .unwrap();
            active.push(a);
        }
        assert!(
            scheduler
                .try_spawn(&active, &wave, &mut bank, &mut rng, env(3, &tuning))
                .is_none()
        );

        // Terminal asteroids do not count toward capacity
        active[0].phase = AsteroidPhase::Colliding {
            since: 0,
            damage: IMPACT_DAMAGE,
        };
        let third = scheduler.try_spawn(&active, &wave, &mut bank, &mut rng, env(3, &tuning));
        assert!(third.is_some());
        active.clear();
        assert!(
            scheduler
                .try_spawn(&active, &wave, &mut bank, &mut rng, env(4, &tuning))
                .is_none()
        );
        assert!(scheduler.exhausted(&wave));
    }

    #[test]
    fn test_bonus_extends_regular_quota() {
        let tuning = Tuning::default();
        let wave = wave_config(1);
        let mut bank = LocalQuestionBank::builtin(1);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut scheduler = SpawnScheduler {
            spawned: wave.asteroid_count,
            bonus: 1,
            ..Default::default()
        };
        assert_eq!(scheduler.quota(&wave), 4);
        assert!(!scheduler.exhausted(&wave));

        let extra = scheduler
            .try_spawn(&[], &wave, &mut bank, &mut rng, env(4, &tuning))
            .unwrap();
        assert!(!extra.is_boss());
        assert!(scheduler.exhausted(&wave));
        assert!(
            scheduler
                .try_spawn(&[], &wave, &mut bank, &mut rng, env(5, &tuning))
                .is_none()
        );
    }

    #[test]
    fn test_boss_spawns_after_regulars() {
        let tuning = Tuning::default();
        let wave = wave_config(5);
        let mut bank = LocalQuestionBank::builtin(1);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut scheduler = SpawnScheduler {
            spawned: wave.asteroid_count,
            ..Default::default()
        };
        assert!(!scheduler.exhausted(&wave));
        let boss = scheduler
            .try_spawn(&[], &wave, &mut bank, &mut rng, env(9, &tuning))
            .unwrap();
        assert_eq!(boss.name, "Ceres Fragment");
        assert_eq!(boss.boss.as_ref().unwrap().hit_points, 3);
        assert_eq!(boss.threat, ThreatLevel::High);
        assert!(scheduler.exhausted(&wave));
    }

    #[test]
    fn test_poll_forces_first_spawn_and_jitters() {
        let tuning = Tuning::default();
        let wave = wave_config(1);
        let mut bank = LocalQuestionBank::builtin(1);
        let mut rng = Pcg32::seed_from_u64(9);
        let mut scheduler = SpawnScheduler::new();

        let first = scheduler.poll(0, &[], &wave, false, 1.0, &mut bank, &mut rng, env(1, &tuning));
        assert!(first.is_some());
        let next = scheduler.next_spawn_at.unwrap();
        assert!(next >= wave.min_spawn_interval() && next <= wave.max_spawn_interval());

        let active = vec![first.unwrap()];
        assert!(
            scheduler
                .poll(next - 1, &active, &wave, false, 1.0, &mut bank, &mut rng, env(2, &tuning))
                .is_none()
        );
        assert!(
            scheduler
                .poll(next, &active, &wave, false, 1.0, &mut bank, &mut rng, env(2, &tuning))
                .is_some()
        );
    }

    #[test]
    fn test_poll_skips_but_reschedules_under_question_freeze() {
        let tuning = Tuning::default();
        let wave = wave_config(1);
        let mut bank = LocalQuestionBank::builtin(1);
        let mut rng = Pcg32::seed_from_u64(9);
        let mut scheduler = SpawnScheduler {
            next_spawn_at: Some(1000),
            spawned: 1,
            ..Default::default()
        };
        let active = vec![test_asteroid(1)];
        let result =
            scheduler.poll(1000, &active, &wave, true, 1.0, &mut bank, &mut rng, env(2, &tuning));
        assert!(result.is_none());
        assert!(scheduler.next_spawn_at.unwrap() >= 2000);
        assert_eq!(scheduler.spawned, 1);
    }

    #[test]
    fn test_delay_floor() {
        let wave = wave_config(30);
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..500 {
            // Meteor shower shrinks the interval; the floor still holds
            assert!(SpawnScheduler::next_delay(&mut rng, &wave, 0.3) >= MIN_SPAWN_INTERVAL_MS);
        }
    }

    #[test]
    fn test_boss_successor() {
        let tuning = Tuning::default();
        let roll = SpawnRoll {
            start_x: 100.0,
            end_x: 200.0,
            size: 80.0,
            hazardous: false,
            kind: AsteroidKind::Normal,
            skin: Skin::Regular,
            designation: 1,
        };
        let descriptor = crate::sim::wave::boss_for_level(1);
        let mut boss = build_boss(AsteroidId(1), &roll, &descriptor, Question::fallback(), &tuning, 5);
        boss.fall_elapsed_ms = 1234.0;
        boss.question_triggered = true;

        let next = boss_successor(&boss, AsteroidId(2), Question::fallback()).unwrap();
        assert_eq!(next.id, AsteroidId(2));
        assert_eq!(next.boss.as_ref().unwrap().hit_points, 2);
        assert_eq!(next.fall_elapsed_ms, 1234.0);
        assert!(!next.question_triggered);

        let mut last = next.clone();
        last.boss.as_mut().unwrap().hit_points = 1;
        assert!(boss_successor(&last, AsteroidId(3), Question::fallback()).is_none());
        assert!(boss_successor(&test_asteroid(4), AsteroidId(5), Question::fallback()).is_none());
    }
}
