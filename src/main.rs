//! Lane Dash headless driver
//!
//! Runs the simulation at a fixed 60 Hz frame rate with a simple autopilot,
//! then submits the result to an in-process leaderboard. Useful for balance
//! checks and smoke testing without a renderer.
//!
//! Environment:
//! - `RUST_LOG`: log filter (env_logger)
//! - `LANE_DASH_TUNING`: path to a tuning JSON document
//! - `LANE_DASH_PROFILE`: path to a JSON profile store (in-memory if unset)
//! - `LANE_DASH_SEED`: run seed

use std::time::Duration;

use chrono::Utc;
use lane_dash::consts::{LANES, PLAYER_Z};
use lane_dash::leaderboard::{self, InMemoryLeaderboard, Leaderboard, format_age};
use lane_dash::persistence::{JsonFileStore, KeyValueStore, MemoryStore};
use lane_dash::sim::{EntityKind, GameClock, ObstacleProfile, Shape, Simulation, TickInput};
use lane_dash::tuning::Tuning;

/// Frames simulated before giving up on a crash
const MAX_FRAMES: u32 = 60 * 120;
/// How far ahead the autopilot looks
const LOOKAHEAD: f32 = 18.0;

/// Pick an input that steers away from what is coming
fn autopilot(sim: &Simulation) -> TickInput {
    let lane = sim.session.lane;
    let mut danger = [f32::INFINITY; 3];
    let mut short_ahead = false;

    for (_, e) in sim.pool.active(EntityKind::Obstacle) {
        let gap = PLAYER_Z - e.pos.z;
        if !(-1.0..LOOKAHEAD).contains(&gap) {
            continue;
        }
        let slot = (e.lane + 1) as usize;
        danger[slot] = danger[slot].min(gap);
        if e.lane == lane && matches!(e.shape, Shape::Obstacle(ObstacleProfile::Short)) && gap < 6.0 {
            short_ahead = true;
        }
    }

    let here = danger[(lane + 1) as usize];
    let mut input = TickInput::default();
    if here.is_finite() {
        // Head for the adjacent lane with the most room
        let best = LANES
            .iter()
            .copied()
            .filter(|l| (l - lane).abs() == 1)
            .max_by(|a, b| danger[(*a + 1) as usize].total_cmp(&danger[(*b + 1) as usize]));
        match best {
            Some(target) if danger[(target + 1) as usize] > here => {
                input.move_left = target < lane;
                input.move_right = target > lane;
            }
            _ => input.jump = short_ahead,
        }
    }
    input
}

fn open_store() -> Box<dyn KeyValueStore> {
    match std::env::var("LANE_DASH_PROFILE") {
        Ok(path) => Box::new(JsonFileStore::open(path)),
        Err(_) => Box::new(MemoryStore::new()),
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    log::info!("Lane Dash (headless) starting...");

    let tuning = match std::env::var("LANE_DASH_TUNING") {
        Ok(path) => Tuning::load(path),
        Err(_) => Tuning::default(),
    };
    let seed = std::env::var("LANE_DASH_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5EED);

    let mut sim = Simulation::new(tuning, open_store(), seed);
    let mut clock = GameClock::new();
    clock.advance(0.0);

    sim.step(
        &TickInput {
            start: true,
            ..Default::default()
        },
        0.0,
    );

    let mut frames = 0;
    let mut dodged = 0;
    let mut collected = 0;
    while sim.session.is_playing() && frames < MAX_FRAMES {
        frames += 1;
        let dt = clock.advance(frames as f64 / 60.0);
        let input = autopilot(&sim);
        let report = sim.step(&input, dt);
        dodged += report.dodged;
        collected += report.collected;
    }

    let session = &sim.session;
    println!(
        "Run over after {:.1}s: score {}, {} dodged, {} coins (total {}), speed {:.0}",
        frames as f32 / 60.0,
        session.score,
        dodged,
        collected,
        session.profile.total_coins,
        session.speed
    );

    if !sim.session.is_playing() {
        let board = InMemoryLeaderboard::new();
        if let Err(e) = board.seed_if_empty().await {
            log::warn!("Seeding failed: {}", e);
        }
        let name = if sim.session.profile.player_name.is_empty() {
            "Autopilot".to_string()
        } else {
            sim.session.profile.player_name.clone()
        };
        match leaderboard::submit_score(&mut sim.session, &board, &name, Duration::from_secs(5)).await {
            Ok(record) => log::info!("Submitted as #{}", record.id),
            Err(e) => println!("Submission failed: {}", e),
        }

        match Leaderboard::fetch(&board).await {
            Ok(ranked) => {
                let now = Utc::now();
                println!("\nLeaderboard");
                for (i, r) in ranked.entries.iter().enumerate() {
                    println!("{:>3}. {:<16} {:>6}  {}", i + 1, r.player_name, r.score, format_age(r.created_at, now));
                }
            }
            Err(e) => println!("Could not load leaderboard: {}", e),
        }
    }
}
