//! Per-frame simulation step
//!
//! Frame order: input -> player -> entity motion -> collisions -> despawn ->
//! spawning -> rewards. Nothing advances unless the session is `Playing`.
//!
//! A frame is split into equal substeps so no entity travels further than
//! `MAX_STEP_DISTANCE` between collision checks.

use serde::{Deserialize, Serialize};

use super::collision::{self, Aabb};
use super::player::Player;
use super::pool::{Entity, EntityHandle, EntityKind, EntityPool, Shape};
use super::spawn::SpawnDirector;
use super::state::{GameStatus, Session};
use crate::consts::{DESPAWN_Z, MAX_FRAME_DT, MAX_STEP_DISTANCE, MAX_SUBSTEPS, PICKUP_SPIN_RATE};
use crate::economy::ScoreEconomy;
use crate::persistence::KeyValueStore;
use crate::tuning::Tuning;

/// Input intents for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start a run (from the menu or after game over)
    pub start: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
}

/// Net effect of one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Obstacles that passed the player
    pub dodged: u32,
    /// Pickups collected
    pub collected: u32,
    /// The run ended this frame
    pub crashed: bool,
    pub obstacles_spawned: u32,
    pub pickups_spawned: u32,
    /// Speed-ups triggered by dodge points
    pub speed_ups: u32,
    /// Whole points from survival time
    pub time_points: u64,
}

/// Owns the whole simulation; the host calls `step` once per rendered frame
#[derive(Debug)]
pub struct Simulation {
    pub session: Session,
    pub player: Player,
    pub pool: EntityPool,
    pub director: SpawnDirector,
    pub economy: ScoreEconomy,
    tuning: Tuning,
    seed: u64,
}

impl Simulation {
    /// Build a simulation, reading the profile from `store`
    pub fn new(tuning: Tuning, store: Box<dyn KeyValueStore>, seed: u64) -> Self {
        let economy = ScoreEconomy::new(store);
        let profile = economy.load_profile();
        log::info!(
            "Profile loaded: {} coins, {} cosmetics",
            profile.total_coins,
            profile.unlocked_characters.len()
        );
        Self {
            session: Session::new(&tuning, profile),
            player: Player::new(),
            pool: EntityPool::new(),
            director: SpawnDirector::new(seed),
            economy,
            tuning,
            seed,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Start a fresh run: clears the pool, reseeds spawning, resets the session
    pub fn reset_game(&mut self) {
        self.session.reset_game();
        self.pool.release_all();
        self.player.reset();
        self.economy.reset_run();
        let run_seed = self.seed.wrapping_add(self.session.runs as u64);
        self.director.reset(run_seed);
    }

    /// Apply one frame's input intents
    pub fn apply_input(&mut self, input: &TickInput) {
        if input.start
            && matches!(self.session.status, GameStatus::Menu | GameStatus::GameOver)
        {
            self.reset_game();
        }
        if input.move_left {
            self.session.move_left();
        }
        if input.move_right {
            self.session.move_right();
        }
        if input.jump {
            self.session.jump();
        }
    }

    /// Advance the world by `dt` seconds (clamped to `MAX_FRAME_DT`)
    pub fn step(&mut self, input: &TickInput, dt: f32) -> FrameReport {
        self.apply_input(input);

        let mut report = FrameReport::default();
        if !self.session.is_playing() {
            self.player.idle(self.session.status, dt);
            return report;
        }
        let dt = dt.clamp(0.0, MAX_FRAME_DT);

        let substeps = substep_count(self.session.speed * dt);
        let sub_dt = dt / substeps as f32;
        for _ in 0..substeps {
            self.substep(sub_dt, &mut report);
            if report.crashed {
                break;
            }
        }
        report
    }

    /// One slice of a frame; sets `report.crashed` and stops on a hit
    fn substep(&mut self, dt: f32, report: &mut FrameReport) {
        self.player.update(&mut self.session, &self.tuning, dt);

        advance_entities(&mut self.pool, self.session.speed * dt, dt);

        let outcome = collision::evaluate(&mut self.pool, &self.player.bounds(), self.tuning.hitbox_shrink);
        if let Some(handle) = outcome.crashed_into {
            log::debug!("Hit obstacle {:?}", handle);
            self.session.crash();
            report.crashed = true;
            return;
        }
        let dodged = despawn_passed(&mut self.pool);
        report.collected += outcome.collected;
        report.dodged += dodged;

        let spawned = self
            .director
            .update(&mut self.pool, &self.tuning, self.session.speed, dt);
        report.obstacles_spawned += spawned.obstacles;
        report.pickups_spawned += spawned.pickups;

        report.time_points += self.economy.add_time_score(&mut self.session, dt);
        for _ in 0..dodged {
            if self.economy.award_dodge(&mut self.session, &self.tuning) {
                report.speed_ups += 1;
            }
        }
        self.economy
            .award_pickups(&mut self.session, &self.tuning, outcome.collected);
    }

    /// Active entities for drawing, obstacles first, in slot order
    pub fn entities(&self) -> impl Iterator<Item = (EntityHandle, &Entity)> {
        self.pool.all_active()
    }

    pub fn player_bounds(&self) -> Aabb {
        self.player.bounds()
    }

    /// Owned copy of everything a renderer needs for this frame
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            status: self.session.status,
            score: self.session.score,
            coins: self.session.coins,
            total_coins: self.session.profile.total_coins,
            speed: self.session.speed,
            lane: self.session.lane,
            is_jumping: self.session.is_jumping,
            character: self.session.profile.current_character.clone(),
            player: self.player.pos.to_array(),
            player_tilt: self.player.tilt,
            entities: self
                .entities()
                .map(|(handle, e)| EntityView {
                    kind: handle.kind,
                    index: handle.index,
                    lane: e.lane,
                    pos: e.pos.to_array(),
                    shape: e.shape,
                })
                .collect(),
        }
    }
}

/// Substeps needed to cover `distance` without skipping a hit window
fn substep_count(distance: f32) -> u32 {
    ((distance / MAX_STEP_DISTANCE).ceil() as u32).clamp(1, MAX_SUBSTEPS)
}

/// Move every active entity toward the player; spin pickups
fn advance_entities(pool: &mut EntityPool, distance: f32, dt: f32) {
    pool.for_each_active(EntityKind::Obstacle, |_, e| e.pos.z += distance);
    pool.for_each_active(EntityKind::Pickup, |_, e| {
        e.pos.z += distance;
        if let Shape::Pickup { spin } = &mut e.shape {
            *spin = (*spin + PICKUP_SPIN_RATE * dt) % std::f32::consts::TAU;
        }
    });
}

/// Release entities past the despawn line; returns obstacles dodged
fn despawn_passed(pool: &mut EntityPool) -> u32 {
    let dodged = pool.release_if(EntityKind::Obstacle, |e| e.pos.z > DESPAWN_Z);
    pool.release_if(EntityKind::Pickup, |e| e.pos.z > DESPAWN_Z);
    dodged
}

/// One active entity as seen by a renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub kind: EntityKind,
    pub index: usize,
    pub lane: i8,
    pub pos: [f32; 3],
    pub shape: Shape,
}

/// Serializable frame state for hosts that ship it elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub status: GameStatus,
    pub score: u64,
    pub coins: u64,
    pub total_coins: u64,
    pub speed: f32,
    pub lane: i8,
    pub is_jumping: bool,
    pub character: String,
    pub player: [f32; 3],
    pub player_tilt: f32,
    pub entities: Vec<EntityView>,
}
