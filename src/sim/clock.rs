//! Frame clock
//!
//! Turns host timestamps into per-frame deltas for `Simulation::step`.

use std::time::Instant;

use crate::consts::MAX_FRAME_DT;

/// Supplies a non-negative, bounded delta per frame
#[derive(Debug, Clone, Default)]
pub struct GameClock {
    last: Option<f64>,
    origin: Option<Instant>,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta since the previous call, given a host timestamp in seconds
    ///
    /// The first call returns 0. Timestamps that go backwards yield 0 and do
    /// not rewind the clock.
    pub fn advance(&mut self, now_secs: f64) -> f32 {
        let dt = match self.last {
            Some(last) if now_secs > last => (now_secs - last) as f32,
            Some(_) => return 0.0,
            None => 0.0,
        };
        self.last = Some(now_secs);
        dt.min(MAX_FRAME_DT)
    }

    /// Delta since the previous call, measured with the monotonic system clock
    pub fn tick(&mut self) -> f32 {
        let origin = *self.origin.get_or_insert_with(Instant::now);
        self.advance(origin.elapsed().as_secs_f64())
    }

    /// Forget the last timestamp (e.g. after the host was suspended)
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = GameClock::new();
        assert_eq!(clock.advance(12.0), 0.0);
        assert!((clock.advance(12.016) - 0.016).abs() < 1e-4);
    }

    #[test]
    fn test_backwards_time_is_ignored() {
        let mut clock = GameClock::new();
        clock.advance(5.0);
        assert_eq!(clock.advance(4.0), 0.0);
        // Still measured from 5.0
        assert!((clock.advance(5.05) - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut clock = GameClock::new();
        clock.advance(0.0);
        assert_eq!(clock.advance(3.0), MAX_FRAME_DT);
    }
}
