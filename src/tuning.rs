//! Game balance values
//!
//! Loaded from a JSON document so designers can tweak pacing without a rebuild.
//! Missing fields fall back to the shipped defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors from loading a tuning document
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Balance configuration for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Speed ===
    /// Travel speed at the start of a run (units/sec)
    pub initial_speed: f32,
    /// Speed never exceeds this
    pub max_speed: f32,
    /// Added each time the score crosses a speed-up period
    pub speed_step: f32,
    /// Score period that triggers a speed-up (on dodge points)
    pub speed_up_every: u64,

    // === Spawning ===
    /// Wave interval is `spawn_interval_base / speed` seconds
    pub spawn_interval_base: f32,
    /// Coin pattern tick interval is `coin_interval_base / speed` seconds
    pub coin_interval_base: f32,
    /// Probability a wave carries two obstacles instead of one
    pub double_obstacle_chance: f32,
    /// Probability a new coin pattern starts after a wave
    pub coin_pattern_chance: f32,
    /// Pickups per coin pattern
    pub coin_pattern_length: u32,

    // === Rewards ===
    /// Points per dodged obstacle
    pub dodge_points: u64,
    /// Points per collected pickup
    pub pickup_points: u64,
    /// Coins per collected pickup
    pub pickup_coins: u64,

    // === Player ===
    /// Lateral approach rate toward the target lane (1/sec)
    pub lateral_rate: f32,
    /// Vertical launch speed (units/sec)
    pub jump_speed: f32,
    /// Downward acceleration (units/sec^2)
    pub gravity: f32,
    /// Player hitbox shrink against obstacles (per side)
    pub hitbox_shrink: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_speed: 25.0,
            max_speed: 60.0,
            speed_step: 1.0,
            speed_up_every: 20,

            spawn_interval_base: 30.0,
            coin_interval_base: 5.0,
            double_obstacle_chance: 0.3,
            coin_pattern_chance: 0.7,
            coin_pattern_length: 5,

            dodge_points: 1,
            pickup_points: 5,
            pickup_coins: 1,

            lateral_rate: 15.0,
            jump_speed: 18.0,
            gravity: 50.0,
            hitbox_shrink: 0.15,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load from a file, falling back to defaults when missing or invalid
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path)
            .map_err(TuningError::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Using default tuning ({})", e);
                Self::default()
            }
        }
    }

    /// Check cross-field invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.initial_speed > 0.0) {
            return Err(invalid("initial_speed", "must be positive"));
        }
        if self.max_speed < self.initial_speed {
            return Err(invalid("max_speed", "must be >= initial_speed"));
        }
        if self.speed_step < 0.0 {
            return Err(invalid("speed_step", "must not be negative"));
        }
        if self.speed_up_every == 0 {
            return Err(invalid("speed_up_every", "must be positive"));
        }
        if !(self.spawn_interval_base > 0.0) {
            return Err(invalid("spawn_interval_base", "must be positive"));
        }
        if !(self.coin_interval_base > 0.0) {
            return Err(invalid("coin_interval_base", "must be positive"));
        }
        if self.coin_pattern_length == 0 {
            return Err(invalid("coin_pattern_length", "must be positive"));
        }
        for (field, p) in [
            ("double_obstacle_chance", self.double_obstacle_chance),
            ("coin_pattern_chance", self.coin_pattern_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(field, "must be within [0, 1]"));
            }
        }
        if self.gravity <= 0.0 || self.jump_speed <= 0.0 {
            return Err(invalid("gravity", "jump speed and gravity must be positive"));
        }
        if !(self.lateral_rate > 0.0) {
            return Err(invalid("lateral_rate", "must be positive"));
        }
        if !(self.hitbox_shrink >= 0.0) {
            return Err(invalid("hitbox_shrink", "must not be negative"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
