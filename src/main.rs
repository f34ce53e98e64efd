//! Skyhop headless runner
//!
//! Plays a seeded session with the autopilot and prints a JSON summary.
//!
//! Usage: `skyhop [seed] [tuning.json] [ticks]`

#[cfg(not(target_arch = "wasm32"))]
use serde::Serialize;

#[cfg(not(target_arch = "wasm32"))]
use skyhop::sim::{GameState, TickInput, tick};
#[cfg(not(target_arch = "wasm32"))]
use skyhop::{Tuning, consts, frame_delta};

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_TICKS: u64 = 3600;

/// End-of-run report
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    simulated_secs: f64,
    points: i64,
    multiplier: u8,
    multiplier_left: f64,
    height: u32,
    respawns: u32,
    last_nudge_frame: Option<u64>,
    platforms: usize,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            log::error!("Invalid seed: {e}");
            std::process::exit(2);
        }
        None => 42,
    };
    let tuning = match args.next() {
        Some(path) => match Tuning::load(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Could not load tuning: {e}");
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };
    let ticks = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TICKS);

    log::info!("Skyhop starting (seed {seed}, {ticks} frames)");

    let mut state = GameState::new(seed, tuning);
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    let delta = frame_delta(consts::MS_PER_TICK);

    let mut frames = 0;
    while frames < ticks {
        tick(&mut state, &input, delta);
        frames += 1;
        if frames % 600 == 0 {
            log::info!(
                "Frame {frames}: height {}, points {}, respawns {}",
                state.height_score,
                state.ledger.points,
                state.respawns
            );
        }
    }

    let now = state.now_secs();
    let summary = RunSummary {
        seed,
        ticks: state.time_ticks,
        simulated_secs: now,
        points: state.ledger.points,
        multiplier: state.ledger.multiplier.value,
        multiplier_left: state
            .ledger
            .multiplier
            .remaining_fraction(now, state.ledger.tuning().multiplier_secs),
        height: state.height_score,
        respawns: state.respawns,
        last_nudge_frame: state.supervisor.last_nudge_frame(),
        platforms: state.platforms.len(),
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Could not serialize summary: {e}"),
    }
    log::info!("Skyhop finished");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser builds drive `sim::tick` from their own frame loop
}
