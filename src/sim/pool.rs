//! Fixed-capacity entity pools
//!
//! Obstacles and pickups are allocated once when the pool is built and then
//! only toggled active/inactive. Nothing here allocates after construction.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::{OBSTACLE_CAPACITY, PICKUP_CAPACITY};

/// Which pool an entity lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle,
    Pickup,
}

/// Obstacle silhouettes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObstacleProfile {
    /// 2 wide, 2 high
    #[default]
    Tall,
    /// 3 wide, 0.8 high, low enough to clear with a jump
    Short,
}

impl ObstacleProfile {
    /// Box half extents
    pub fn half_extents(self) -> Vec3 {
        match self {
            ObstacleProfile::Tall => Vec3::new(1.0, 1.0, 0.5),
            ObstacleProfile::Short => Vec3::new(1.5, 0.4, 0.5),
        }
    }

    /// Height of the box center above the ground plane
    pub fn center_y(self) -> f32 {
        self.half_extents().y
    }
}

/// Per-kind shape data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Obstacle(ObstacleProfile),
    /// Spin angle around the vertical axis (cosmetic)
    Pickup { spin: f32 },
}

/// Coin disc half extents (radius 0.4, thickness 0.1, lying flat)
pub const PICKUP_HALF_EXTENTS: Vec3 = Vec3::new(0.4, 0.05, 0.4);

/// A pooled obstacle or pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub(super) active: bool,
    pub kind: EntityKind,
    pub lane: i8,
    pub pos: Vec3,
    pub shape: Shape,
}

impl Entity {
    fn dormant(kind: EntityKind) -> Self {
        let shape = match kind {
            EntityKind::Obstacle => Shape::Obstacle(ObstacleProfile::default()),
            EntityKind::Pickup => Shape::Pickup { spin: 0.0 },
        };
        Self {
            active: false,
            kind,
            lane: 0,
            pos: Vec3::ZERO,
            shape,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// World-space bounding box
    pub fn bounds(&self) -> Aabb {
        let half = match self.shape {
            Shape::Obstacle(profile) => profile.half_extents(),
            Shape::Pickup { .. } => PICKUP_HALF_EXTENTS,
        };
        Aabb::from_center(self.pos, half)
    }
}

/// Stable address of a pool slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    pub kind: EntityKind,
    pub index: usize,
}

/// Pre-allocated obstacle and pickup slots
#[derive(Debug, Clone)]
pub struct EntityPool {
    obstacles: Box<[Entity]>,
    pickups: Box<[Entity]>,
}

impl Default for EntityPool {
    fn default() -> Self {
        Self::with_capacity(OBSTACLE_CAPACITY, PICKUP_CAPACITY)
    }
}

impl EntityPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(obstacles: usize, pickups: usize) -> Self {
        Self {
            obstacles: (0..obstacles)
                .map(|_| Entity::dormant(EntityKind::Obstacle))
                .collect(),
            pickups: (0..pickups)
                .map(|_| Entity::dormant(EntityKind::Pickup))
                .collect(),
        }
    }

    fn slots(&self, kind: EntityKind) -> &[Entity] {
        match kind {
            EntityKind::Obstacle => &self.obstacles,
            EntityKind::Pickup => &self.pickups,
        }
    }

    fn slots_mut(&mut self, kind: EntityKind) -> &mut [Entity] {
        match kind {
            EntityKind::Obstacle => &mut self.obstacles,
            EntityKind::Pickup => &mut self.pickups,
        }
    }

    pub fn capacity(&self, kind: EntityKind) -> usize {
        self.slots(kind).len()
    }

    /// Claim the first inactive slot of `kind`, or `None` when exhausted
    ///
    /// The slot is marked active; the caller places it.
    pub fn acquire(&mut self, kind: EntityKind) -> Option<EntityHandle> {
        let index = self.slots(kind).iter().position(|e| !e.active)?;
        self.slots_mut(kind)[index].active = true;
        Some(EntityHandle { kind, index })
    }

    /// Return a slot to the pool (idempotent)
    pub fn release(&mut self, handle: EntityHandle) {
        if let Some(entity) = self.slots_mut(handle.kind).get_mut(handle.index) {
            entity.active = false;
        }
    }

    /// Release every active entity of `kind` matching `pred`; returns how many
    pub fn release_if(&mut self, kind: EntityKind, mut pred: impl FnMut(&Entity) -> bool) -> u32 {
        let mut released = 0;
        for entity in self.slots_mut(kind).iter_mut() {
            if entity.active && pred(entity) {
                entity.active = false;
                released += 1;
            }
        }
        released
    }

    /// Deactivate everything (start of a run)
    pub fn release_all(&mut self) {
        for entity in self.obstacles.iter_mut().chain(self.pickups.iter_mut()) {
            entity.active = false;
        }
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        self.slots(handle.kind).get(handle.index)
    }

    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        self.slots_mut(handle.kind).get_mut(handle.index)
    }

    pub fn is_active(&self, handle: EntityHandle) -> bool {
        self.get(handle).is_some_and(|e| e.active)
    }

    /// Active entities of `kind` in slot order
    pub fn active(&self, kind: EntityKind) -> impl Iterator<Item = (EntityHandle, &Entity)> {
        self.slots(kind)
            .iter()
            .enumerate()
            .filter(|(_, e)| e.active)
            .map(move |(index, e)| (EntityHandle { kind, index }, e))
    }

    /// Visit active entities of `kind` mutably, in slot order
    pub fn for_each_active(&mut self, kind: EntityKind, mut f: impl FnMut(EntityHandle, &mut Entity)) {
        for (index, entity) in self.slots_mut(kind).iter_mut().enumerate() {
            if entity.active {
                f(EntityHandle { kind, index }, entity);
            }
        }
    }

    pub fn active_count(&self, kind: EntityKind) -> usize {
        self.slots(kind).iter().filter(|e| e.active).count()
    }

    /// Every active entity, obstacles first
    pub fn all_active(&self) -> impl Iterator<Item = (EntityHandle, &Entity)> {
        self.active(EntityKind::Obstacle)
            .chain(self.active(EntityKind::Pickup))
    }
}
