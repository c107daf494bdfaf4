//! Collision detection between the player and pooled entities
//!
//! Entities only get a box test once they enter a thin z-band around the
//! player's travel plane; everything else is rejected on a single compare.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::pool::{EntityHandle, EntityKind, EntityPool};
use crate::consts::{OBSTACLE_BAND, PICKUP_BAND};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Pull every face inward by `amount`, collapsing to the center at worst
    pub fn shrink(&self, amount: f32) -> Self {
        let center = self.center();
        let half = ((self.max - self.min) * 0.5 - Vec3::splat(amount)).max(Vec3::ZERO);
        Self::from_center(center, half)
    }

    /// Overlap test; touching faces count as a hit
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}

/// Whether `z` lies strictly inside a collision band
#[inline]
pub fn in_band(z: f32, band: (f32, f32)) -> bool {
    z > band.0 && z < band.1
}

/// Result of one frame's collision pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionOutcome {
    /// First obstacle (in slot order) touching the player
    pub crashed_into: Option<EntityHandle>,
    /// Pickups collected and released this pass
    pub collected: u32,
}

/// First active obstacle in the band that overlaps the (already shrunk) player box
pub fn find_obstacle_hit(pool: &EntityPool, player: &Aabb) -> Option<EntityHandle> {
    pool.active(EntityKind::Obstacle)
        .filter(|(_, e)| in_band(e.pos.z, OBSTACLE_BAND))
        .find(|(_, e)| player.intersects(&e.bounds()))
        .map(|(handle, _)| handle)
}

/// Collect a single pickup if it is active, in band and touching the player
///
/// Collecting releases the slot, so a second attempt on the same handle is a no-op.
pub fn try_collect(pool: &mut EntityPool, handle: EntityHandle, player: &Aabb) -> bool {
    if handle.kind != EntityKind::Pickup {
        return false;
    }
    let hit = pool
        .get(handle)
        .is_some_and(|e| e.is_active() && in_band(e.pos.z, PICKUP_BAND) && player.intersects(&e.bounds()));
    if hit {
        pool.release(handle);
    }
    hit
}

/// Collect every pickup touching the player
pub fn collect_pickups(pool: &mut EntityPool, player: &Aabb) -> u32 {
    let mut collected = 0;
    for index in 0..pool.capacity(EntityKind::Pickup) {
        let handle = EntityHandle {
            kind: EntityKind::Pickup,
            index,
        };
        if try_collect(pool, handle, player) {
            collected += 1;
        }
    }
    collected
}

/// Full collision pass for a frame
///
/// Obstacles are tested against the player box shrunk by `hitbox_shrink`;
/// pickups use the full box. A crash short-circuits pickup collection.
pub fn evaluate(pool: &mut EntityPool, player: &Aabb, hitbox_shrink: f32) -> CollisionOutcome {
    let forgiving = player.shrink(hitbox_shrink);
    if let Some(handle) = find_obstacle_hit(pool, &forgiving) {
        return CollisionOutcome {
            crashed_into: Some(handle),
            collected: 0,
        };
    }
    CollisionOutcome {
        crashed_into: None,
        collected: collect_pickups(pool, player),
    }
}
