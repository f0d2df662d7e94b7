//! Simulation tick
//!
//! Core game loop that advances simulation deterministically from the host's
//! monotonic clock.

use super::outcome::settle;
use super::sink::GameHost;
use super::spawn::SpawnEnv;
use super::state::{GameEvent, GameState, GameStatus, TickContext};
use super::tracker::{FreezeFlags, advance};
use crate::consts::Millis;

/// Advance the game state to `ctx.now`
pub fn tick<H: GameHost + ?Sized>(state: &mut GameState, ctx: &TickContext, host: &mut H) {
    let now = ctx.now;

    // Paused or game over: only re-base the clock so resuming doesn't jump
    if ctx.status != GameStatus::Playing {
        if state.paused_at.is_none() {
            state.paused_at = Some(state.last_now.unwrap_or(now));
        }
        state.last_now = Some(now);
        return;
    }
    if let (Some(paused_at), Some(last)) = (state.paused_at.take(), state.last_now) {
        let paused_for = last.saturating_sub(paused_at);
        log::debug!("Resuming after {}ms paused", paused_for);
        state.shift_clock(paused_for);
    }

    let wave = ctx.wave.max(1);
    if state.wave_started_at.is_none() || wave != state.wave.wave_number {
        state.start_wave(wave, now, host);
    }

    let dt_ms = state.last_now.map_or(0, |prev| now.saturating_sub(prev)) as f32;
    state.last_now = Some(now);

    expire_special_events(state, now);
    expire_question(state, now, host);

    let effect = state.effect(now);

    // Fall, then hand ground breaches to the resolver
    let freeze = FreezeFlags {
        time_freeze: ctx.time_freeze,
        question_freeze: state.question_freeze(),
    };
    let ground_y = state.tuning.ground_y();
    let breaches = advance(&mut state.asteroids, dt_ms, freeze, effect.fall_speed, ground_y);
    for id in breaches {
        state.resolve_ground_impact(id, now);
    }

    for entry in settle(&mut state.asteroids, now, host) {
        state.events.push(entry.into());
    }

    // Spawning
    let question_freeze = state.question_freeze();
    let env = SpawnEnv {
        id: state.peek_entity_id(),
        tuning: &state.tuning,
        streak: state.streak,
    };
    let spawned = state.scheduler.poll(
        now,
        &state.asteroids,
        &state.wave,
        question_freeze,
        effect.spawn_interval,
        host,
        &mut state.rng,
        env,
    );
    if let Some(asteroid) = spawned {
        let id = state.next_entity_id();
        debug_assert_eq!(id, asteroid.id);
        state.events.push(GameEvent::Spawned {
            id,
            boss: asteroid.is_boss(),
        });
        state.asteroids.push(asteroid);
    }

    if !state.wave_cleared && state.is_wave_complete() {
        state.wave_cleared = true;
        log::info!("Wave {} cleared", state.wave.wave_number);
        state.events.push(GameEvent::WaveCleared(state.wave.wave_number));
    }

    state.normalize_order();
}

fn expire_special_events(state: &mut GameState, now: Millis) {
    let (ended, running): (Vec<_>, Vec<_>) = state
        .special_events
        .drain(..)
        .partition(|active| now >= active.ends_at);
    state.special_events = running;
    for active in ended {
        log::info!("{} ended", active.event.name());
        state.events.push(GameEvent::SpecialEventEnded(active.event));
    }
}

/// Resolve an open question that ran out of time as a wrong answer
fn expire_question<H: GameHost + ?Sized>(state: &mut GameState, now: Millis, host: &mut H) {
    if !state.tuning.enforce_question_timeout {
        return;
    }
    let limit = (state.wave.time_limit_ms() as f32 * state.effect(now).time_limit) as Millis;
    if let Some(id) = state.gate.expired(now, limit) {
        log::info!("Question on {} timed out after {}ms", id, limit);
        state.events.push(GameEvent::QuestionExpired(id));
        state.resolve_answer(id, false, now, host);
    }
}
