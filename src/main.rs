//! Astro Defenders entry point
//!
//! The browser build is driven from JS through `astro_defenders::web`. Natively
//! this runs a headless autopilot game and prints a summary, which is handy for
//! checking balance changes from a tuning file:
//!
//! ```text
//! RUST_LOG=info astro-defenders [tuning.json] [seed]
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    autopilot::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use astro_defenders::consts::Millis;
    use astro_defenders::sim::{GameEvent, GameState, LocalQuestionBank, tick};
    use astro_defenders::{HighScores, Session, Tuning};

    /// Simulated frame length (ms)
    const FRAME_MS: Millis = 16;
    /// Stop after this much simulated time
    const MAX_RUN_MS: Millis = 15 * 60 * 1000;
    /// Autopilot waits this long after a spawn before engaging
    const REACTION_MS: Millis = 1500;
    /// Chance the autopilot picks the right answer
    const ANSWER_SKILL: f64 = 0.8;

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let tuning = match args.next() {
            Some(path) => match std::fs::read_to_string(&path) {
                Ok(json) => Tuning::from_json_or_default(&json),
                Err(err) => {
                    log::warn!("Can't read {}: {}; using default tuning", path, err);
                    Tuning::default()
                }
            },
            None => Tuning::default(),
        };
        let seed = args
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(12345);

        log::info!("Astro Defenders (native) autopilot, seed {}", seed);

        let mut state = GameState::new(seed, tuning);
        let mut session = Session::new(LocalQuestionBank::builtin(seed));
        let mut player = Pcg32::seed_from_u64(seed ^ 0x5eed);
        let mut high_scores = HighScores::load();
        let mut bosses = 0;
        let mut impacts = 0;

        let mut now: Millis = 0;
        while now < MAX_RUN_MS && !session.is_game_over() {
            tick(&mut state, &session.context(now, false), &mut session);

            let events = state.drain_events();
            for event in &events {
                match event {
                    GameEvent::Spawned { boss: true, .. } => bosses += 1,
                    GameEvent::GroundImpact(_) => impacts += 1,
                    _ => {}
                }
            }
            session.handle_events(&events);

            let presented = session
                .presented
                .as_ref()
                .map(|p| (p.question.correct_answer, p.question.answers.len()));
            if let Some((right, choices)) = presented {
                // Think about it for a moment, then answer
                let opened_at = state.gate.current().map_or(now, |open| open.opened_at);
                if now >= opened_at + REACTION_MS {
                    let choice = if player.random_bool(ANSWER_SKILL) {
                        right
                    } else {
                        (right + 1) % choices.max(1)
                    };
                    if let Some((id, correct)) = session.check_answer(choice) {
                        state.resolve_answer(id, correct, now, &mut session);
                    }
                }
            } else if let Some(target) = pick_target(&state) {
                let _ = state.trigger_question(target, now, &mut session);
            }

            now += FRAME_MS;
        }

        let rank = session.record_high_score(&mut high_scores, now as f64);

        println!("\n=== Astro Defenders autopilot ===");
        println!("Seed:          {}", seed);
        println!("Time played:   {:.1}s", now as f64 / 1000.0);
        println!("Wave reached:  {}", session.wave);
        println!("Score:         {}", session.score);
        println!("Health:        {}", session.health);
        println!(
            "Answers:       {}/{} ({:.0}%)",
            session.correct,
            session.answered,
            session.accuracy()
        );
        println!("Best streak:   {}", session.best_streak);
        println!("Ground hits:   {}", impacts);
        println!("Bosses seen:   {}", bosses);
        if let Some(rank) = rank {
            println!("Leaderboard:   #{}", rank);
        }
    }

    /// Lowest falling asteroid that has been on screen long enough
    fn pick_target(state: &GameState) -> Option<astro_defenders::sim::AsteroidId> {
        state
            .asteroids
            .iter()
            .filter(|a| !a.question_triggered && a.fall_elapsed_ms >= REACTION_MS as f32)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|a| a.id)
    }
}
