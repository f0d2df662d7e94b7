//! Wave and boss progression
//!
//! `wave_config` is a pure function of the wave number so difficulty curves
//! stay reproducible across runs and in tests.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Gameplay kinds, unlocked progressively by wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AsteroidKind {
    Normal,
    Fast,
    Heavy,
    Splitter,
    Shield,
}

impl AsteroidKind {
    /// Multiplier on the tier fall duration
    pub fn fall_factor(&self) -> f32 {
        match self {
            AsteroidKind::Fast => FAST_FALL_FACTOR,
            _ => 1.0,
        }
    }
}

/// Timed wave modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialEvent {
    MeteorShower,
    SolarFlare,
    AsteroidStorm,
    BonusRound,
}

/// What a special event does while it is running
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventEffect {
    pub duration_ms: Millis,
    /// Multiplier on the spawn interval (< 1 spawns faster)
    pub spawn_interval: f32,
    /// Multiplier on fall speed
    pub fall_speed: f32,
    /// Multiplier on the question time limit
    pub time_limit: f32,
    /// Multiplier on awarded points
    pub points: f32,
    /// Extra regular asteroids as a fraction of the wave's count
    pub extra_asteroids: f32,
}

impl EventEffect {
    pub const NEUTRAL: EventEffect = EventEffect {
        duration_ms: 0,
        spawn_interval: 1.0,
        fall_speed: 1.0,
        time_limit: 1.0,
        points: 1.0,
        extra_asteroids: 0.0,
    };

    /// Stack another effect on top of this one
    pub fn combine(self, other: EventEffect) -> EventEffect {
        EventEffect {
            duration_ms: self.duration_ms.max(other.duration_ms),
            spawn_interval: self.spawn_interval * other.spawn_interval,
            fall_speed: self.fall_speed * other.fall_speed,
            time_limit: self.time_limit * other.time_limit,
            points: self.points * other.points,
            extra_asteroids: self.extra_asteroids + other.extra_asteroids,
        }
    }
}

impl SpecialEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SpecialEvent::MeteorShower => "Meteor Shower",
            SpecialEvent::SolarFlare => "Solar Flare",
            SpecialEvent::AsteroidStorm => "Asteroid Storm",
            SpecialEvent::BonusRound => "Bonus Knowledge Round",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SpecialEvent::MeteorShower => "Rapid asteroid spawning for 10 seconds!",
            SpecialEvent::SolarFlare => "All asteroids move 2x faster for 15 seconds!",
            SpecialEvent::AsteroidStorm => "Double asteroid spawning with reduced visibility!",
            SpecialEvent::BonusRound => "All correct answers worth 3x points for 30 seconds!",
        }
    }

    pub fn effect(&self) -> EventEffect {
        let base = EventEffect::NEUTRAL;
        match self {
            SpecialEvent::MeteorShower => EventEffect {
                duration_ms: 10_000,
                spawn_interval: 0.3,
                extra_asteroids: 0.5,
                ..base
            },
            SpecialEvent::SolarFlare => EventEffect {
                duration_ms: 15_000,
                fall_speed: 2.0,
                time_limit: 0.8,
                ..base
            },
            SpecialEvent::AsteroidStorm => EventEffect {
                duration_ms: 20_000,
                spawn_interval: 0.5,
                extra_asteroids: 1.0,
                ..base
            },
            SpecialEvent::BonusRound => EventEffect {
                duration_ms: 30_000,
                points: 3.0,
                ..base
            },
        }
    }
}

/// Boss special abilities.
///
/// Multi-hit is carried by `BossDescriptor::hit_points` for every boss; the
/// remaining abilities are declared for content but have no resolution logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossAbility {
    MultiHit,
    SpeedBurst,
    SpawnMinions,
    Duplicate,
}

/// A boss asteroid template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossDescriptor {
    pub name: String,
    pub size: f32,
    pub hit_points: u8,
    pub ability: BossAbility,
    pub description: String,
}

/// Boss catalog: (name, size, hit points, ability, flavor text)
const BOSS_CATALOG: [(&str, f32, u8, BossAbility, &str); 4] = [
    (
        "Ceres Fragment",
        200.0,
        3,
        BossAbility::MultiHit,
        "A massive chunk of the dwarf planet Ceres. Requires multiple correct answers to destroy!",
    ),
    (
        "Vesta Core",
        180.0,
        2,
        BossAbility::SpeedBurst,
        "Core material from asteroid Vesta. Periodically accelerates toward Earth!",
    ),
    (
        "Apophis Shard",
        220.0,
        4,
        BossAbility::SpawnMinions,
        "Dangerous fragment of asteroid Apophis. Spawns smaller asteroids when damaged!",
    ),
    (
        "Bennu Cluster",
        160.0,
        2,
        BossAbility::Duplicate,
        "Sample from asteroid Bennu. Splits into two when first answered correctly!",
    ),
];

/// Boss for a given boss level (wave / 5); level 1 is the first boss
pub fn boss_for_level(boss_level: u32) -> BossDescriptor {
    let index = (boss_level.saturating_sub(1) as usize).min(BOSS_CATALOG.len() - 1);
    let (name, size, hit_points, ability, description) = BOSS_CATALOG[index];
    BossDescriptor {
        name: name.to_string(),
        size,
        hit_points,
        ability,
        description: description.to_string(),
    }
}

/// Immutable rules for one wave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    pub wave_number: u32,
    /// Regular asteroids to spawn over the wave (boss excluded)
    pub asteroid_count: u32,
    /// Cap on concurrently active (non-terminal) asteroids
    pub max_simultaneous: u32,
    /// Nominal spawn interval (ms) before jitter
    pub spawn_rate_ms: Millis,
    /// Seconds the player has to answer an open question
    pub time_limit_secs: u32,
    pub point_multiplier: f32,
    pub asteroid_kinds: Vec<AsteroidKind>,
    pub special_events: Vec<SpecialEvent>,
    pub boss: Option<BossDescriptor>,
}

impl WaveConfig {
    pub fn has_boss(&self) -> bool {
        self.boss.is_some()
    }

    /// Shortest jittered spawn interval (ms)
    pub fn min_spawn_interval(&self) -> Millis {
        ((self.spawn_rate_ms as f32 * SPAWN_JITTER_MIN) as Millis).max(MIN_SPAWN_INTERVAL_MS)
    }

    /// Longest jittered spawn interval (ms)
    pub fn max_spawn_interval(&self) -> Millis {
        ((self.spawn_rate_ms as f32 * SPAWN_JITTER_MAX) as Millis).max(MIN_SPAWN_INTERVAL_MS)
    }

    pub fn time_limit_ms(&self) -> Millis {
        self.time_limit_secs as Millis * 1000
    }
}

/// Clamp any host-supplied wave value to a valid wave (minimum 1)
pub fn normalize_wave(raw: f64) -> u32 {
    if raw.is_nan() {
        return 1;
    }
    raw.round().clamp(1.0, u32::MAX as f64) as u32
}

/// Build the configuration for a wave
pub fn wave_config(wave: u32) -> WaveConfig {
    let n = wave.max(1);

    let mut asteroid_kinds = vec![AsteroidKind::Normal];
    let mut special_events = Vec::new();

    if n >= 3 {
        asteroid_kinds.push(AsteroidKind::Fast);
    }
    if n >= 5 {
        asteroid_kinds.push(AsteroidKind::Heavy);
        special_events.push(SpecialEvent::MeteorShower);
    }
    if n >= 7 {
        asteroid_kinds.push(AsteroidKind::Splitter);
        special_events.push(SpecialEvent::SolarFlare);
    }
    if n >= 10 {
        asteroid_kinds.push(AsteroidKind::Shield);
        special_events.push(SpecialEvent::AsteroidStorm);
    }

    let boss = n.is_multiple_of(5).then(|| boss_for_level(n / 5));

    WaveConfig {
        wave_number: n,
        asteroid_count: (3 + n / 2).min(8),
        max_simultaneous: (2 + n / 3).min(4),
        spawn_rate_ms: 3000u64.saturating_sub(n as u64 * 150).max(MIN_SPAWN_INTERVAL_MS),
        time_limit_secs: 15u32.saturating_sub(n).max(8),
        point_multiplier: 1.0 + n as f32 * 0.1,
        asteroid_kinds,
        special_events,
        boss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_wave() {
        let config = wave_config(1);
        assert_eq!(config.asteroid_count, 3);
        assert_eq!(config.max_simultaneous, 2);
        assert_eq!(config.spawn_rate_ms, 2850);
        assert_eq!(config.time_limit_secs, 14);
        assert!(!config.has_boss());
        assert_eq!(config.asteroid_kinds, vec![AsteroidKind::Normal]);
        assert!(config.special_events.is_empty());
    }

    #[test]
    fn test_first_boss_is_ceres() {
        let config = wave_config(5);
        let boss = config.boss.expect("wave 5 has a boss");
        assert_eq!(boss.name, "Ceres Fragment");
        assert_eq!(boss.hit_points, 3);
        assert_eq!(boss.ability, BossAbility::MultiHit);
    }

    #[test]
    fn test_boss_catalog_clamps() {
        assert_eq!(wave_config(10).boss.unwrap().name, "Vesta Core");
        assert_eq!(wave_config(15).boss.unwrap().name, "Apophis Shard");
        assert_eq!(wave_config(20).boss.unwrap().name, "Bennu Cluster");
        assert_eq!(wave_config(45).boss.unwrap().name, "Bennu Cluster");
    }

    #[test]
    fn test_kind_thresholds() {
        assert_eq!(wave_config(2).asteroid_kinds.len(), 1);
        assert_eq!(wave_config(3).asteroid_kinds.len(), 2);
        assert_eq!(wave_config(5).asteroid_kinds.len(), 3);
        assert_eq!(wave_config(7).asteroid_kinds.len(), 4);
        assert_eq!(wave_config(10).asteroid_kinds.len(), 5);

        assert!(wave_config(4).special_events.is_empty());
        assert_eq!(wave_config(5).special_events, vec![SpecialEvent::MeteorShower]);
        assert_eq!(
            wave_config(12).special_events,
            vec![
                SpecialEvent::MeteorShower,
                SpecialEvent::SolarFlare,
                SpecialEvent::AsteroidStorm
            ]
        );
    }

    #[test]
    fn test_late_wave_floors() {
        let config = wave_config(30);
        assert_eq!(config.spawn_rate_ms, 1000);
        assert_eq!(config.time_limit_secs, 8);
        assert_eq!(config.min_spawn_interval(), 1000);
        assert_eq!(config.max_spawn_interval(), 1500);
    }

    #[test]
    fn test_normalize_wave() {
        assert_eq!(normalize_wave(-3.0), 1);
        assert_eq!(normalize_wave(0.0), 1);
        assert_eq!(normalize_wave(2.4), 2);
        assert_eq!(normalize_wave(2.6), 3);
        assert_eq!(normalize_wave(f64::NAN), 1);
        assert_eq!(wave_config(0), wave_config(1));
    }

    proptest! {
        #[test]
        fn prop_counts_bounded_and_monotonic(n in 1u32..1000) {
            let a = wave_config(n);
            let b = wave_config(n + 1);
            prop_assert!(a.asteroid_count <= 8);
            prop_assert!(a.max_simultaneous <= 4);
            prop_assert!(a.asteroid_count <= b.asteroid_count);
            prop_assert!(a.max_simultaneous <= b.max_simultaneous);
            prop_assert!(a.spawn_rate_ms >= MIN_SPAWN_INTERVAL_MS);
            prop_assert!(a.time_limit_secs >= 8);
        }

        #[test]
        fn prop_deterministic(n in 0u32..1000) {
            prop_assert_eq!(wave_config(n), wave_config(n));
        }

        #[test]
        fn prop_boss_every_fifth_wave(n in 1u32..1000) {
            prop_assert_eq!(wave_config(n).has_boss(), n % 5 == 0);
        }
    }
}
