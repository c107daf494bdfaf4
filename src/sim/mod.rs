//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform concerns:
//! - One `Simulation::step(dt)` per rendered frame, driven by the host
//! - Seeded RNG only
//! - Stable iteration order (pool slot order)
//! - No allocation while playing

pub mod clock;
pub mod collision;
pub mod player;
pub mod pool;
pub mod spawn;
pub mod state;
pub mod tick;

pub use clock::GameClock;
pub use collision::{Aabb, CollisionOutcome};
pub use player::Player;
pub use pool::{Entity, EntityHandle, EntityKind, EntityPool, ObstacleProfile, Shape};
pub use spawn::{SpawnDirector, SpawnPattern, SpawnReport};
pub use state::{GameStatus, Session};
pub use tick::{EntityView, FrameReport, FrameSnapshot, Simulation, TickInput};
