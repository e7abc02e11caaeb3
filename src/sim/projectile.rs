//! Straight-line projectiles with swept hit detection
//!
//! Each step the projectile probes the full distance it is about to travel,
//! so a fast shot at a low tick rate still stops on a thin wall instead of
//! tunnelling through it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{CategoryMask, Faction, PhysicsQuery, ProbeFilter};
use super::state::ActorId;

/// Projectile lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileState {
    Flying,
    /// Lifetime ran out
    Expired,
    /// Struck something
    Hit,
}

/// Everything needed to launch a projectile. Produced by weapons and
/// shooters, turned into a [`Projectile`] by the orchestrator next tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSpawn {
    pub position: Vec2,
    pub direction: Vec2,
    pub damage: i32,
    pub speed: f32,
    pub lifetime: f32,
    pub hit_mask: CategoryMask,
    pub owner: Faction,
}

/// Result of a projectile striking something this step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileImpact {
    pub projectile: u32,
    pub point: Vec2,
    /// Damage receiver, None when the obstacle is scenery
    pub target: Option<ActorId>,
    pub damage: i32,
}

/// A flying projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Unit vector, fixed at launch
    direction: Vec2,
    pub damage: i32,
    pub speed: f32,
    pub remaining_lifetime: f32,
    pub owner: Faction,
    pub hit_mask: CategoryMask,
    pub state: ProjectileState,
}

impl Projectile {
    /// Launch from a spawn request. The direction is normalized here and
    /// never changes afterwards.
    pub fn launch(id: u32, spawn: &ProjectileSpawn) -> Self {
        Self {
            id,
            pos: spawn.position,
            direction: spawn.direction.normalize_or_zero(),
            damage: spawn.damage,
            speed: spawn.speed,
            remaining_lifetime: spawn.lifetime,
            owner: spawn.owner,
            hit_mask: spawn.hit_mask,
            state: ProjectileState::Flying,
        }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    #[inline]
    pub fn is_flying(&self) -> bool {
        self.state == ProjectileState::Flying
    }

    /// Advance one step. Returns the impact if this step struck something.
    ///
    /// Colliders tagged with the owner's faction are passed through, so a
    /// shot leaving its owner's body keeps its full step.
    pub fn step<P: PhysicsQuery>(&mut self, dt: f32, physics: &P) -> Option<ProjectileImpact> {
        if !self.is_flying() {
            return None;
        }

        let step = self.speed * dt;
        let filter = ProbeFilter::new(self.hit_mask).ignoring(self.owner);
        let mut impact = None;

        match physics.probe(self.pos, self.direction, step, filter) {
            Some(hit) => {
                self.pos = hit.point;
                self.state = ProjectileState::Hit;
                impact = Some(ProjectileImpact {
                    projectile: self.id,
                    point: hit.point,
                    target: hit.actor,
                    damage: self.damage,
                });
            }
            None => {
                self.pos += self.direction * step;
            }
        }

        self.remaining_lifetime -= dt;
        if self.remaining_lifetime <= 0.0 && self.is_flying() {
            self.state = ProjectileState::Expired;
        }

        impact
    }
}
