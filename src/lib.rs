//! Lane Dash - a three-lane endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, entity pool, spawning, collisions, session state)
//! - `economy`: Score/coin rewards and the cosmetic shop
//! - `persistence`: Key-value profile storage
//! - `leaderboard`: Remote score board boundary and async submission
//! - `tuning`: Data-driven game balance

pub mod economy;
pub mod leaderboard;
pub mod persistence;
pub mod sim;
pub mod tuning;

pub use economy::{CATALOG, Cosmetic, ScoreEconomy};
pub use leaderboard::{Leaderboard, LeaderboardError, LeaderboardService, ScoreRecord};
pub use persistence::{KeyValueStore, PersistedProfile};
pub use sim::{GameStatus, Session, Simulation, TickInput};
pub use tuning::Tuning;

/// World geometry and fixed capacities
pub mod consts {
    /// Lateral distance between lane centers
    pub const LANE_WIDTH: f32 = 2.5;
    /// Leftmost and rightmost lane indices
    pub const MIN_LANE: i8 = -1;
    pub const MAX_LANE: i8 = 1;
    /// All lanes, left to right
    pub const LANES: [i8; 3] = [-1, 0, 1];

    /// Player travel plane (entities stream toward +z)
    pub const PLAYER_Z: f32 = 5.0;
    /// Resting height of the player's center
    pub const GROUND_Y: f32 = 1.0;
    /// Jump may begin while at or below this height
    pub const JUMP_READY_Y: f32 = 1.05;
    /// Player capsule (radius 0.4, cylinder 0.8) as box half extents
    pub const PLAYER_HALF_EXTENTS: [f32; 3] = [0.4, 0.8, 0.4];

    /// Entities appear here...
    pub const SPAWN_Z: f32 = -80.0;
    /// ...and are released once past here
    pub const DESPAWN_Z: f32 = 10.0;

    /// Obstacle z-band tested against the player
    pub const OBSTACLE_BAND: (f32, f32) = (3.5, 6.5);
    /// Pickup z-band tested against the player
    pub const PICKUP_BAND: (f32, f32) = (4.0, 6.0);

    /// Pool capacities (allocated once, never grown)
    pub const OBSTACLE_CAPACITY: usize = 20;
    pub const PICKUP_CAPACITY: usize = 30;

    /// Pickup spin rate (radians/sec, cosmetic)
    pub const PICKUP_SPIN_RATE: f32 = 3.0;

    /// Largest frame delta the clock will hand out (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Longest z travel per simulation substep; must stay under the
    /// narrowest hit window (1.5 for a tall obstacle vs the shrunk player)
    pub const MAX_STEP_DISTANCE: f32 = 1.0;
    /// Maximum substeps per frame
    pub const MAX_SUBSTEPS: u32 = 8;
}

/// Clamp a requested lane into the playable range
#[inline]
pub fn clamp_lane(lane: i32) -> i8 {
    lane.clamp(consts::MIN_LANE as i32, consts::MAX_LANE as i32) as i8
}

/// World-space x of a lane center
#[inline]
pub fn lane_x(lane: i8) -> f32 {
    lane as f32 * consts::LANE_WIDTH
}

/// Frame-rate independent exponential approach factor
///
/// Returns the fraction of the remaining distance covered in `dt` at `rate`.
#[inline]
pub fn damp_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}
