//! Player actor: movement intent, facing, weapons and health

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{CategoryMask, Faction, PhysicsQuery, ProbeFilter};
use super::health::ActorHealth;
use super::projectile::ProjectileSpawn;
use super::state::{ActorId, Body, CombatEvent, Damageable};
use super::tick::TickInput;
use super::weapon::{Muzzle, Trigger, WeaponController, WeaponDefinition};
use crate::consts::{MOVE_DEAD_ZONE, SPRINT_MULTIPLIER};

/// Player tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub spawn: Vec2,
    pub max_health: i32,
    pub radius: f32,
    /// Top walking speed (units/second)
    pub base_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub sprint_multiplier: f32,
    /// Downward acceleration. 0 = top-down arena, both axes steered.
    pub gravity: f32,
    pub jump_impulse: f32,
    pub ground_check_radius: f32,
    /// Muzzle position relative to the body when facing right
    pub muzzle_offset: Vec2,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: Vec2::ZERO,
            max_health: 100,
            radius: 0.5,
            base_speed: 6.0,
            acceleration: 60.0,
            deceleration: 80.0,
            sprint_multiplier: SPRINT_MULTIPLIER,
            gravity: 0.0,
            jump_impulse: 12.0,
            ground_check_radius: 0.15,
            muzzle_offset: Vec2::new(0.6, 0.0),
        }
    }
}

/// Step `current` toward `target` by at most `max_delta`
fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + max_delta.copysign(delta)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: ActorId,
    pub body: Body,
    pub config: PlayerConfig,
    pub weapons: WeaponController,
    health: ActorHealth,
    /// Unit aim direction. Horizontal only when gravity is on.
    aim: Vec2,
    grounded: bool,
}

impl Player {
    pub fn new(id: ActorId, config: PlayerConfig, loadout: Vec<WeaponDefinition>) -> Self {
        let body = Body::new(config.spawn, config.radius, config.base_speed, Faction::Player);
        Self {
            id,
            body,
            health: ActorHealth::new(config.max_health),
            weapons: WeaponController::with_loadout(Faction::Player, loadout),
            config,
            aim: Vec2::X,
            grounded: false,
        }
    }

    #[inline]
    pub fn health(&self) -> &ActorHealth {
        &self.health
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// +1 facing right, -1 facing left
    #[inline]
    pub fn facing(&self) -> f32 {
        if self.aim.x < 0.0 { -1.0 } else { 1.0 }
    }

    #[inline]
    pub fn aim(&self) -> Vec2 {
        self.aim
    }

    fn side_scroller(&self) -> bool {
        self.config.gravity > 0.0
    }

    /// Where shots leave from this tick
    pub fn muzzle(&self) -> Muzzle {
        let offset = if self.side_scroller() {
            Vec2::new(self.config.muzzle_offset.x * self.facing(), self.config.muzzle_offset.y)
        } else {
            self.aim * self.config.muzzle_offset.length()
        };
        Muzzle {
            position: self.body.position + offset,
            direction: self.aim,
        }
    }

    /// Heal and notify. Returns true if health changed.
    pub fn heal(&mut self, amount: i32, events: &mut Vec<CombatEvent>) -> bool {
        match self.health.heal(amount).snapshot() {
            Some((current, max)) => {
                events.push(CombatEvent::HealthChanged { current, max });
                true
            }
            None => false,
        }
    }

    /// Movement, then weapons. Dead players do nothing.
    pub fn update<P: PhysicsQuery, R: Rng>(
        &mut self,
        dt: f32,
        input: &TickInput,
        physics: &P,
        rng: &mut R,
        spawns: &mut Vec<ProjectileSpawn>,
        events: &mut Vec<CombatEvent>,
    ) {
        if !self.is_alive() {
            self.body.stop();
            return;
        }

        self.steer(dt, input);
        if self.side_scroller() {
            self.fall(dt, input, physics);
        } else {
            self.body.integrate(dt);
        }

        let trigger = Trigger {
            fire_held: input.fire_held,
            switch_next: input.switch_next_pressed,
            switch_prev: input.switch_prev_pressed,
        };
        let muzzle = self.muzzle();
        self.weapons.update(dt, trigger, muzzle, rng, spawns, events);
    }

    fn steer(&mut self, dt: f32, input: &TickInput) {
        let intent = input.move_vector.clamp_length_max(1.0);
        let mut top_speed = self.config.base_speed;
        if input.sprint_held {
            top_speed *= self.config.sprint_multiplier;
        }

        let axis = |current: f32, wanted: f32| {
            if wanted.abs() > MOVE_DEAD_ZONE {
                move_toward(current, wanted * top_speed, self.config.acceleration * dt)
            } else {
                move_toward(current, 0.0, self.config.deceleration * dt)
            }
        };

        self.body.velocity.x = axis(self.body.velocity.x, intent.x);
        if !self.side_scroller() {
            self.body.velocity.y = axis(self.body.velocity.y, intent.y);
        }

        if self.side_scroller() {
            if intent.x > MOVE_DEAD_ZONE {
                self.aim = Vec2::X;
            } else if intent.x < -MOVE_DEAD_ZONE {
                self.aim = Vec2::NEG_X;
            }
        } else if intent.length() > MOVE_DEAD_ZONE {
            self.aim = intent.normalize();
        }
    }

    /// Gravity, jumping and landing on SOLID ground
    fn fall<P: PhysicsQuery>(&mut self, dt: f32, input: &TickInput, physics: &P) {
        let feet = self.body.position - Vec2::new(0.0, self.body.radius);
        self.grounded = self.body.velocity.y <= 0.0
            && physics
                .overlap(feet, self.config.ground_check_radius, CategoryMask::SOLID)
                .is_some();

        if self.grounded {
            self.body.velocity.y = 0.0;
            if input.jump_pressed {
                self.body.velocity.y = self.config.jump_impulse;
                self.grounded = false;
            }
        } else {
            self.body.velocity.y -= self.config.gravity * dt;
        }

        self.body.position.x += self.body.velocity.x * dt;

        if self.body.velocity.y < 0.0 {
            let drop = -self.body.velocity.y * dt;
            let filter = ProbeFilter::new(CategoryMask::SOLID);
            if let Some(hit) = physics.probe(feet, Vec2::NEG_Y, drop, filter) {
                self.body.position.y = hit.point.y + self.body.radius;
                self.body.velocity.y = 0.0;
                return;
            }
        }
        self.body.position.y += self.body.velocity.y * dt;
    }
}

impl Damageable for Player {
    fn take_damage(&mut self, amount: i32, events: &mut Vec<CombatEvent>) {
        let change = self.health.take_damage(amount);
        if let Some((current, max)) = change.snapshot() {
            events.push(CombatEvent::HealthChanged { current, max });
        }
        if change.died() {
            log::info!("player {} died", self.id);
            self.body.stop();
            events.push(CombatEvent::ActorDied(self.id));
        }
    }
}
