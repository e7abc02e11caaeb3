//! Weapon definitions and the per-wielder firing engine
//!
//! A [`WeaponController`] owns the wielder's loadout and decides each tick
//! whether the current weapon fires. Firing never creates projectiles
//! directly: it queues [`ProjectileSpawn`] requests that the orchestrator
//! launches at the start of the next tick.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{CategoryMask, Faction};
use super::projectile::ProjectileSpawn;
use super::state::CombatEvent;
use crate::consts::{MIN_COOLDOWN, MIN_FIRE_RATE};
use crate::rotate_degrees;

/// Template for the projectiles a weapon emits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectilePrototype {
    /// Seconds before the projectile expires
    pub lifetime: f32,
    /// Categories the projectile may strike
    pub hit_mask: CategoryMask,
}

impl Default for ProjectilePrototype {
    fn default() -> Self {
        Self {
            lifetime: 3.0,
            hit_mask: CategoryMask::ALL,
        }
    }
}

/// Immutable weapon configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponDefinition {
    pub name: String,
    pub damage: i32,
    /// Shots per second
    pub fire_rate: f32,
    pub muzzle_velocity: f32,
    /// Fires every tick while held; otherwise once per press
    pub is_automatic: bool,
    pub bullets_per_shot: u32,
    /// Total fan width in degrees
    pub spread_angle: f32,
    pub projectile: Option<ProjectilePrototype>,
}

impl Default for WeaponDefinition {
    fn default() -> Self {
        Self {
            name: String::from("Blaster"),
            damage: 10,
            fire_rate: 5.0,
            muzzle_velocity: 14.0,
            is_automatic: true,
            bullets_per_shot: 1,
            spread_angle: 0.0,
            projectile: Some(ProjectilePrototype::default()),
        }
    }
}

impl WeaponDefinition {
    /// Seconds between shots
    pub fn cooldown(&self) -> f32 {
        (1.0 / self.fire_rate.max(MIN_FIRE_RATE)).max(MIN_COOLDOWN)
    }

    /// Launch angles (degrees, relative to the muzzle direction) for one shot.
    ///
    /// A single bullet gets a random jitter inside the spread. Several bullets
    /// form an even, symmetric fan with no randomness.
    pub fn launch_angles<R: Rng>(&self, rng: &mut R) -> Vec<f32> {
        let count = self.bullets_per_shot.max(1);
        let spread = self.spread_angle.max(0.0);
        let half = spread * 0.5;

        if count == 1 {
            let angle = if spread > 0.0 {
                rng.random_range(-half..=half)
            } else {
                0.0
            };
            return vec![angle];
        }

        let step = if spread > 0.0 {
            spread / (count - 1) as f32
        } else {
            0.0
        };
        (0..count).map(|i| -half + step * i as f32).collect()
    }
}

/// Where shots leave from this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Muzzle {
    pub position: Vec2,
    /// Base firing direction (unit)
    pub direction: Vec2,
}

/// Fire/switch intent for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Trigger {
    pub fire_held: bool,
    pub switch_next: bool,
    pub switch_prev: bool,
}

/// Per-wielder firing state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponController {
    loadout: Vec<WeaponDefinition>,
    current_index: usize,
    cooldown_remaining: f32,
    previous_fire_held: bool,
    owner: Faction,
}

impl WeaponController {
    pub fn new(owner: Faction) -> Self {
        Self {
            loadout: Vec::new(),
            current_index: 0,
            cooldown_remaining: 0.0,
            previous_fire_held: false,
            owner,
        }
    }

    pub fn with_loadout(owner: Faction, loadout: Vec<WeaponDefinition>) -> Self {
        Self {
            loadout,
            ..Self::new(owner)
        }
    }

    /// Weapon currently in hand
    pub fn current(&self) -> Option<&WeaponDefinition> {
        self.loadout.get(self.current_index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn loadout(&self) -> &[WeaponDefinition] {
        &self.loadout
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_remaining
    }

    /// Append a weapon, optionally switching to it
    pub fn add_weapon(
        &mut self,
        weapon: WeaponDefinition,
        switch_to_new: bool,
        events: &mut Vec<CombatEvent>,
    ) {
        log::info!("{:?} picked up {}", self.owner, weapon.name);
        self.loadout.push(weapon);
        if switch_to_new {
            self.current_index = self.loadout.len() - 1;
        }
        events.push(CombatEvent::WeaponSwitched);
    }

    /// Cycle through the loadout by `dir` (+1 / -1), wrapping at both ends
    pub fn switch(&mut self, dir: i32, events: &mut Vec<CombatEvent>) {
        let len = self.loadout.len();
        if len <= 1 {
            return;
        }
        let len = len as i64;
        let next = (self.current_index as i64 + dir as i64).rem_euclid(len);
        self.current_index = next as usize;
        log::debug!(
            "{:?} switched to weapon {} ({})",
            self.owner,
            self.current_index,
            self.loadout[self.current_index].name
        );
        events.push(CombatEvent::WeaponSwitched);
    }

    /// Run one tick of the firing engine. Returns the number of projectiles queued.
    ///
    /// The weapon in hand at the start of the tick is the one that fires,
    /// even if a switch is requested in the same tick.
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        trigger: Trigger,
        muzzle: Muzzle,
        rng: &mut R,
        spawns: &mut Vec<ProjectileSpawn>,
        events: &mut Vec<CombatEvent>,
    ) -> usize {
        self.cooldown_remaining -= dt;

        let mut fired = 0;
        let weapon = self.current().cloned();

        if trigger.switch_next {
            self.switch(1, events);
        }
        if trigger.switch_prev {
            self.switch(-1, events);
        }

        let fire_pressed_edge = trigger.fire_held && !self.previous_fire_held;

        if let Some(weapon) = weapon {
            let wants_to_fire = if weapon.is_automatic {
                trigger.fire_held
            } else {
                fire_pressed_edge
            };

            if wants_to_fire && self.cooldown_remaining <= 0.0 {
                fired = self.fire(&weapon, muzzle, rng, spawns);
                self.cooldown_remaining = weapon.cooldown();
            }
        }

        self.previous_fire_held = trigger.fire_held;
        fired
    }

    /// Queue the projectiles for one shot of `weapon`.
    /// A weapon without a projectile prototype fires nothing.
    pub fn fire<R: Rng>(
        &self,
        weapon: &WeaponDefinition,
        muzzle: Muzzle,
        rng: &mut R,
        spawns: &mut Vec<ProjectileSpawn>,
    ) -> usize {
        let Some(prototype) = weapon.projectile.as_ref() else {
            log::debug!("{} has no projectile prototype, not firing", weapon.name);
            return 0;
        };

        let angles = weapon.launch_angles(rng);
        for &angle in &angles {
            spawns.push(ProjectileSpawn {
                position: muzzle.position,
                direction: rotate_degrees(muzzle.direction, angle),
                damage: weapon.damage,
                speed: weapon.muzzle_velocity,
                lifetime: prototype.lifetime,
                hit_mask: prototype.hit_mask,
                owner: self.owner,
            });
        }
        angles.len()
    }
}
