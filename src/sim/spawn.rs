//! Procedural obstacle waves and coin lines
//!
//! Waves fire on a speed-scaled timer. After a wave, a coin line may start in
//! a lane the wave left open; the line then drips out one pickup per tick.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::pool::{EntityKind, EntityPool, ObstacleProfile, Shape};
use crate::consts::{LANES, SPAWN_Z};
use crate::lane_x;
use crate::tuning::Tuning;

/// Lowest pickup height in a coin line
const PICKUP_MIN_Y: f32 = 0.5;
/// Coin line height curve: `base + amp * sin(freq * i)`
const PICKUP_ARC_BASE: f32 = 0.5;
const PICKUP_ARC_AMPLITUDE: f32 = 1.5;
const PICKUP_ARC_FREQ: f32 = 0.8;

/// Height of the `index`-th pickup in a coin line
pub fn pickup_height(index: u32) -> f32 {
    (PICKUP_ARC_BASE + (index as f32 * PICKUP_ARC_FREQ).sin() * PICKUP_ARC_AMPLITUDE).max(PICKUP_MIN_Y)
}

/// An in-progress coin line
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnPattern {
    pub active: bool,
    pub lane: i8,
    /// Pickups placed so far
    pub emitted: u32,
    /// Seconds since the last pickup
    pub timer: f32,
}

/// What the director placed this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub obstacles: u32,
    pub pickups: u32,
    /// Placements skipped because a pool was full
    pub exhausted: u32,
}

/// Lanes claimed by the current wave
#[derive(Debug, Clone, Copy, Default)]
struct LaneSet([bool; 3]);

impl LaneSet {
    fn slot(lane: i8) -> usize {
        (lane + 1) as usize
    }

    fn insert(&mut self, lane: i8) {
        self.0[Self::slot(lane)] = true;
    }

    fn contains(&self, lane: i8) -> bool {
        self.0[Self::slot(lane)]
    }

    fn len(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }
}

/// Decides when and where pooled entities enter the world
#[derive(Debug, Clone)]
pub struct SpawnDirector {
    rng: Pcg32,
    /// Seconds since the last wave
    pub spawn_timer: f32,
    pub pattern: SpawnPattern,
}

impl SpawnDirector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            spawn_timer: 0.0,
            pattern: SpawnPattern::default(),
        }
    }

    /// Reseed and clear timers for a new run
    pub fn reset(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Seconds between waves at `speed`
    pub fn wave_interval(tuning: &Tuning, speed: f32) -> f32 {
        tuning.spawn_interval_base / speed
    }

    /// Seconds between coin line pickups at `speed`
    pub fn pattern_interval(tuning: &Tuning, speed: f32) -> f32 {
        tuning.coin_interval_base / speed
    }

    /// Advance timers and place whatever is due
    pub fn update(&mut self, pool: &mut EntityPool, tuning: &Tuning, speed: f32, dt: f32) -> SpawnReport {
        let mut report = SpawnReport::default();

        self.spawn_timer += dt;
        if self.spawn_timer > Self::wave_interval(tuning, speed) {
            self.spawn_timer = 0.0;
            self.spawn_wave(pool, tuning, &mut report);
        }

        if self.pattern.active {
            self.pattern.timer += dt;
            if self.pattern.timer > Self::pattern_interval(tuning, speed) {
                self.pattern.timer = 0.0;
                self.emit_pickup(pool, tuning, &mut report);
            }
        }

        report
    }

    fn spawn_wave(&mut self, pool: &mut EntityPool, tuning: &Tuning, report: &mut SpawnReport) {
        let count = if self.rng.random::<f32>() < tuning.double_obstacle_chance {
            2
        } else {
            1
        };
        let mut occupied = LaneSet::default();

        for _ in 0..count {
            let Some(handle) = pool.acquire(EntityKind::Obstacle) else {
                log::warn!("Obstacle pool exhausted, skipping placement");
                report.exhausted += 1;
                continue;
            };

            // Avoid reusing a lane unless two are already taken
            let lane = loop {
                let lane = self.rng.random_range(-1..=1i8);
                if !occupied.contains(lane) || occupied.len() >= 2 {
                    break lane;
                }
            };
            occupied.insert(lane);

            let profile = if self.rng.random::<f32>() < 0.5 {
                ObstacleProfile::Tall
            } else {
                ObstacleProfile::Short
            };

            if let Some(entity) = pool.get_mut(handle) {
                entity.lane = lane;
                entity.pos = Vec3::new(lane_x(lane), profile.center_y(), SPAWN_Z);
                entity.shape = Shape::Obstacle(profile);
            }
            report.obstacles += 1;
        }

        if !self.pattern.active {
            self.maybe_start_pattern(&occupied, tuning);
        }

        log::trace!("Wave: {} obstacle(s), pattern active: {}", report.obstacles, self.pattern.active);
    }

    fn maybe_start_pattern(&mut self, occupied: &LaneSet, tuning: &Tuning) {
        let mut free = [0i8; 3];
        let mut free_len = 0;
        for lane in LANES {
            if !occupied.contains(lane) {
                free[free_len] = lane;
                free_len += 1;
            }
        }
        if free_len == 0 || self.rng.random::<f32>() >= tuning.coin_pattern_chance {
            return;
        }

        let lane = free[self.rng.random_range(0..free_len)];
        self.pattern = SpawnPattern {
            active: true,
            lane,
            emitted: 0,
            timer: 0.0,
        };
        log::debug!("Coin line started in lane {}", lane);
    }

    fn emit_pickup(&mut self, pool: &mut EntityPool, tuning: &Tuning, report: &mut SpawnReport) {
        let Some(handle) = pool.acquire(EntityKind::Pickup) else {
            log::warn!("Pickup pool exhausted, ending coin line");
            report.exhausted += 1;
            self.pattern.active = false;
            return;
        };

        let lane = self.pattern.lane;
        if let Some(entity) = pool.get_mut(handle) {
            entity.lane = lane;
            entity.pos = Vec3::new(lane_x(lane), pickup_height(self.pattern.emitted), SPAWN_Z);
            entity.shape = Shape::Pickup { spin: 0.0 };
        }
        report.pickups += 1;

        self.pattern.emitted += 1;
        if self.pattern.emitted >= tuning.coin_pattern_length {
            self.pattern.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave_lanes(pool: &EntityPool) -> Vec<i8> {
        pool.active(EntityKind::Obstacle).map(|(_, e)| e.lane).collect()
    }

    #[test]
    fn test_pickup_height_curve() {
        assert!((pickup_height(0) - 0.5).abs() < 1e-6);
        assert!((pickup_height(1) - (0.5 + 0.8f32.sin() * 1.5)).abs() < 1e-6);
        // sin(3.2) < 0 would dip below the floor
        assert_eq!(pickup_height(4), PICKUP_MIN_Y);
        for i in 0..20 {
            assert!(pickup_height(i) >= PICKUP_MIN_Y);
        }
    }

    #[test]
    fn test_wave_interval_shrinks_with_speed() {
        let tuning = Tuning::default();
        assert!((SpawnDirector::wave_interval(&tuning, 25.0) - 1.2).abs() < 1e-6);
        assert!((SpawnDirector::wave_interval(&tuning, 60.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_no_spawn_before_interval() {
        let tuning = Tuning::default();
        let mut pool = EntityPool::new();
        let mut director = SpawnDirector::new(1);
        let report = director.update(&mut pool, &tuning, 25.0, 1.0);
        assert_eq!(report, SpawnReport::default());
        assert_eq!(pool.all_active().count(), 0);
    }

    #[test]
    fn test_wave_places_obstacles_at_spawn_line() {
        let tuning = Tuning::default();
        let mut pool = EntityPool::new();
        let mut director = SpawnDirector::new(7);
        let report = director.update(&mut pool, &tuning, 25.0, 1.3);
        assert!(report.obstacles == 1 || report.obstacles == 2);
        assert_eq!(director.spawn_timer, 0.0);
        for (_, e) in pool.active(EntityKind::Obstacle) {
            assert_eq!(e.pos.z, SPAWN_Z);
            assert_eq!(e.pos.x, lane_x(e.lane));
            assert!(LANES.contains(&e.lane));
        }
    }

    #[test]
    fn test_double_wave_uses_distinct_lanes() {
        let tuning = Tuning {
            double_obstacle_chance: 1.0,
            ..Tuning::default()
        };
        for seed in 0..50 {
            let mut pool = EntityPool::new();
            let mut director = SpawnDirector::new(seed);
            director.update(&mut pool, &tuning, 25.0, 1.3);
            let lanes = wave_lanes(&pool);
            assert_eq!(lanes.len(), 2);
            assert_ne!(lanes[0], lanes[1]);
        }
    }

    #[test]
    fn test_pattern_starts_in_open_lane() {
        let tuning = Tuning {
            double_obstacle_chance: 1.0,
            coin_pattern_chance: 1.0,
            ..Tuning::default()
        };
        for seed in 0..50 {
            let mut pool = EntityPool::new();
            let mut director = SpawnDirector::new(seed);
            director.update(&mut pool, &tuning, 25.0, 1.3);
            assert!(director.pattern.active);
            assert!(!wave_lanes(&pool).contains(&director.pattern.lane));
        }
    }

    #[test]
    fn test_pattern_emits_five_then_stops() {
        let tuning = Tuning {
            coin_pattern_chance: 1.0,
            // Keep further waves out of the way
            spawn_interval_base: 1.0e6,
            ..Tuning::default()
        };
        let mut pool = EntityPool::new();
        let mut director = SpawnDirector::new(3);
        director.spawn_timer = 1.0e6;
        director.update(&mut pool, &tuning, 25.0, 0.0);
        assert!(director.pattern.active);

        let lane = director.pattern.lane;
        let mut placed = 0;
        for _ in 0..40 {
            placed += director.update(&mut pool, &tuning, 25.0, 0.25).pickups;
        }
        assert_eq!(placed, 5);
        assert!(!director.pattern.active);

        let heights: Vec<f32> = pool.active(EntityKind::Pickup).map(|(_, e)| e.pos.y).collect();
        let expected: Vec<f32> = (0..5).map(pickup_height).collect();
        assert_eq!(heights, expected);
        assert!(pool.active(EntityKind::Pickup).all(|(_, e)| e.lane == lane));
    }

    #[test]
    fn test_pattern_ends_when_pickups_exhausted() {
        let tuning = Tuning::default();
        let mut pool = EntityPool::new();
        while pool.acquire(EntityKind::Pickup).is_some() {}

        let mut director = SpawnDirector::new(9);
        director.pattern = SpawnPattern {
            active: true,
            lane: 0,
            emitted: 0,
            timer: 0.0,
        };
        let report = director.update(&mut pool, &tuning, 25.0, 0.25);
        assert_eq!(report.pickups, 0);
        assert_eq!(report.exhausted, 1);
        assert!(!director.pattern.active);
    }

    #[test]
    fn test_exhausted_obstacle_pool_skips_quietly() {
        let tuning = Tuning::default();
        let mut pool = EntityPool::new();
        while pool.acquire(EntityKind::Obstacle).is_some() {}

        let mut director = SpawnDirector::new(11);
        let report = director.update(&mut pool, &tuning, 25.0, 1.3);
        assert_eq!(report.obstacles, 0);
        assert!(report.exhausted >= 1);
        assert_eq!(pool.active_count(EntityKind::Obstacle), 20);
    }

    #[test]
    fn test_same_seed_same_waves() {
        let tuning = Tuning::default();
        let mut a = (EntityPool::new(), SpawnDirector::new(42));
        let mut b = (EntityPool::new(), SpawnDirector::new(42));
        for _ in 0..10 {
            a.1.update(&mut a.0, &tuning, 30.0, 0.5);
            b.1.update(&mut b.0, &tuning, 30.0, 0.5);
        }
        assert_eq!(wave_lanes(&a.0), wave_lanes(&b.0));
        assert_eq!(a.1.pattern, b.1.pattern);
    }
}
