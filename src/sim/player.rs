//! Player kinematics
//!
//! Lateral motion eases toward the target lane; vertical motion is a single
//! ballistic hop. The player never moves along z.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::state::{GameStatus, Session};
use crate::consts::{GROUND_Y, JUMP_READY_Y, PLAYER_HALF_EXTENTS, PLAYER_Z};
use crate::tuning::Tuning;
use crate::{damp_factor, lane_x};

/// Roll per unit of lateral lag
const TILT_PER_LAG: f32 = -0.2;
/// Approach rate of the roll toward its target
const TILT_RATE: f32 = 10.0;
/// Menu idle bob amplitude and angular frequency (rad/sec)
const IDLE_BOB_AMPLITUDE: f32 = 0.1;
const IDLE_BOB_FREQ: f32 = 5.0;

/// The runner's physical state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec3,
    pub vel_y: f32,
    /// Cosmetic roll (radians)
    pub tilt: f32,
    idle_time: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec3::new(0.0, GROUND_Y, PLAYER_Z),
            vel_y: 0.0,
            tilt: 0.0,
            idle_time: 0.0,
        }
    }
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.vel_y == 0.0 && self.pos.y <= JUMP_READY_Y
    }

    /// Advance one frame of play
    ///
    /// Launches a jump when the session requests one and the player is on the
    /// ground; clears `session.is_jumping` on landing.
    pub fn update(&mut self, session: &mut Session, tuning: &Tuning, dt: f32) {
        let target_x = lane_x(session.lane);
        self.pos.x += (target_x - self.pos.x) * damp_factor(tuning.lateral_rate, dt);

        if session.is_jumping && self.is_grounded() {
            self.vel_y = tuning.jump_speed;
        }

        self.pos.y += self.vel_y * dt;
        if self.pos.y > GROUND_Y || self.vel_y != 0.0 {
            self.vel_y -= tuning.gravity * dt;
        }

        if self.pos.y <= GROUND_Y && self.vel_y < 0.0 {
            self.pos.y = GROUND_Y;
            self.vel_y = 0.0;
            session.is_jumping = false;
        }

        let target_tilt = (self.pos.x - target_x) * TILT_PER_LAG;
        self.tilt += (target_tilt - self.tilt) * damp_factor(TILT_RATE, dt);
    }

    /// Cosmetic motion while no run is active
    pub fn idle(&mut self, status: GameStatus, dt: f32) {
        self.idle_time += dt;
        if status == GameStatus::Menu {
            self.pos.y = GROUND_Y + (self.idle_time * IDLE_BOB_FREQ).sin() * IDLE_BOB_AMPLITUDE;
        }
    }

    /// Back to the center lane on the ground
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// World-space box around the capsule
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec3::from_array(PLAYER_HALF_EXTENTS))
    }
}
