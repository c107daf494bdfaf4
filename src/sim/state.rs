//! Session state and lifecycle
//!
//! The single authoritative record of a play session. Everything the
//! presentation layer shows is read from here after `Simulation::step`.

use serde::{Deserialize, Serialize};

use crate::clamp_lane;
use crate::persistence::PersistedProfile;
use crate::tuning::Tuning;

/// Which screen/phase the game is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// Title screen, waiting for start
    #[default]
    Menu,
    /// Active run
    Playing,
    /// Run ended by a crash
    GameOver,
    /// Score submission in flight
    Submitting,
    /// Cosmetic shop
    Shop,
}

/// Session scalars plus the durable profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub status: GameStatus,
    pub score: u64,
    /// Coins picked up this run
    pub coins: u64,
    pub speed: f32,
    /// Target lane, always in {-1, 0, 1}
    pub lane: i8,
    pub is_jumping: bool,
    /// Name, coin balance and cosmetics (persisted)
    pub profile: PersistedProfile,
    /// Runs started since launch
    pub runs: u32,
    /// Message from the last failed submission
    pub last_error: Option<String>,
    min_speed: f32,
    max_speed: f32,
}

impl Session {
    pub fn new(tuning: &Tuning, profile: PersistedProfile) -> Self {
        Self {
            status: GameStatus::Menu,
            score: 0,
            coins: 0,
            speed: tuning.initial_speed,
            lane: 0,
            is_jumping: false,
            profile,
            runs: 0,
            last_error: None,
            min_speed: tuning.initial_speed,
            max_speed: tuning.max_speed,
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Begin a fresh run from any state
    pub fn reset_game(&mut self) {
        self.status = GameStatus::Playing;
        self.score = 0;
        self.coins = 0;
        self.speed = self.min_speed;
        self.lane = 0;
        self.is_jumping = false;
        self.last_error = None;
        self.runs += 1;
        log::info!("Run {} started", self.runs);
    }

    /// Set the target lane (out-of-range requests are clamped)
    pub fn set_lane(&mut self, lane: i32) {
        self.lane = clamp_lane(lane);
    }

    /// Shift one lane left; only while playing
    pub fn move_left(&mut self) -> bool {
        self.shift_lane(-1)
    }

    /// Shift one lane right; only while playing
    pub fn move_right(&mut self) -> bool {
        self.shift_lane(1)
    }

    fn shift_lane(&mut self, dir: i32) -> bool {
        if !self.is_playing() {
            return false;
        }
        let before = self.lane;
        self.set_lane(before as i32 + dir);
        self.lane != before
    }

    /// Request a jump; ignored while already airborne or not playing
    pub fn jump(&mut self) -> bool {
        if !self.is_playing() || self.is_jumping {
            return false;
        }
        self.is_jumping = true;
        true
    }

    /// Raise speed by `amount`, never past the maximum
    pub fn increase_speed(&mut self, amount: f32) {
        self.speed = (self.speed + amount).clamp(self.min_speed, self.max_speed);
    }

    /// Playing -> GameOver
    pub fn crash(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.status = GameStatus::GameOver;
        log::info!("Crashed with score {}", self.score);
        true
    }

    /// Menu -> Shop
    pub fn open_shop(&mut self) -> bool {
        self.transition(GameStatus::Menu, GameStatus::Shop)
    }

    /// Shop -> Menu
    pub fn close_shop(&mut self) -> bool {
        self.transition(GameStatus::Shop, GameStatus::Menu)
    }

    /// GameOver -> Submitting
    pub fn begin_submission(&mut self) -> bool {
        let ok = self.transition(GameStatus::GameOver, GameStatus::Submitting);
        if ok {
            self.last_error = None;
        }
        ok
    }

    /// Submitting -> Menu (score cleared) on success, -> GameOver on failure
    pub fn finish_submission(&mut self, outcome: Result<(), String>) -> bool {
        if self.status != GameStatus::Submitting {
            return false;
        }
        match outcome {
            Ok(()) => {
                self.status = GameStatus::Menu;
                self.score = 0;
            }
            Err(message) => {
                log::warn!("Score submission failed: {}", message);
                self.status = GameStatus::GameOver;
                self.last_error = Some(message);
            }
        }
        true
    }

    fn transition(&mut self, from: GameStatus, to: GameStatus) -> bool {
        if self.status != from {
            return false;
        }
        log::debug!("{:?} -> {:?}", from, to);
        self.status = to;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(&Tuning::default(), PersistedProfile::default())
    }

    #[test]
    fn test_starts_in_menu() {
        let s = session();
        assert_eq!(s.status, GameStatus::Menu);
        assert_eq!(s.speed, 25.0);
    }

    #[test]
    fn test_reset_from_every_state() {
        for status in [
            GameStatus::Menu,
            GameStatus::Playing,
            GameStatus::GameOver,
            GameStatus::Submitting,
            GameStatus::Shop,
        ] {
            let mut s = session();
            s.status = status;
            s.score = 99;
            s.coins = 4;
            s.speed = 41.0;
            s.lane = -1;
            s.is_jumping = true;

            s.reset_game();
            assert_eq!(s.status, GameStatus::Playing);
            assert_eq!(s.score, 0);
            assert_eq!(s.coins, 0);
            assert_eq!(s.speed, 25.0);
            assert_eq!(s.lane, 0);
            assert!(!s.is_jumping);
        }
    }

    #[test]
    fn test_lane_clamped() {
        let mut s = session();
        s.reset_game();
        s.set_lane(-4);
        assert_eq!(s.lane, -1);
        assert!(!s.move_left());
        assert!(s.move_right());
        assert!(s.move_right());
        assert!(!s.move_right());
        assert_eq!(s.lane, 1);
    }

    #[test]
    fn test_input_ignored_outside_play() {
        let mut s = session();
        assert!(!s.move_left());
        assert!(!s.jump());
        assert_eq!(s.lane, 0);
        assert!(!s.is_jumping);
    }

    #[test]
    fn test_speed_capped() {
        let mut s = session();
        for _ in 0..100 {
            s.increase_speed(1.0);
        }
        assert_eq!(s.speed, 60.0);
    }

    #[test]
    fn test_shop_round_trip() {
        let mut s = session();
        assert!(s.open_shop());
        assert_eq!(s.status, GameStatus::Shop);
        assert!(!s.open_shop());
        assert!(s.close_shop());
        assert_eq!(s.status, GameStatus::Menu);
    }

    #[test]
    fn test_submission_transitions() {
        let mut s = session();
        s.reset_game();
        s.score = 120;
        assert!(!s.begin_submission());
        assert!(s.crash());

        assert!(s.begin_submission());
        assert_eq!(s.status, GameStatus::Submitting);
        assert!(s.finish_submission(Err("offline".into())));
        assert_eq!(s.status, GameStatus::GameOver);
        assert_eq!(s.score, 120);
        assert_eq!(s.last_error.as_deref(), Some("offline"));

        assert!(s.begin_submission());
        assert!(s.finish_submission(Ok(())));
        assert_eq!(s.status, GameStatus::Menu);
        assert_eq!(s.score, 0);
    }
}
