//! Enemy behavior state machine
//!
//! Every enemy runs the same transition table each tick:
//!
//! | Condition                        | Result                          |
//! |----------------------------------|---------------------------------|
//! | Dead                             | stay Dead, halt, count down     |
//! | simulation suspended             | halt, skip everything           |
//! | Hurt and timer running           | stay Hurt                       |
//! | target within `attack_range`     | Attack                          |
//! | target within `detection_range`  | Chase                           |
//! | otherwise                        | Patrol                          |
//!
//! What Patrol/Chase/Attack actually do is supplied per archetype through
//! the [`Behavior`] trait (melee brawler, ranged shooter).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Faction;
use super::health::ActorHealth;
use super::projectile::ProjectileSpawn;
use super::state::{
    ActorId, Body, CombatCommand, CombatEvent, Damageable, SimContext, TargetSnapshot,
};
use super::weapon::ProjectilePrototype;
use crate::consts::{MIN_SHOTS_PER_SECOND, MIN_STOP_DISTANCE};

/// Enemy AI state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    Patrol,
    Chase,
    Attack,
    /// Staggered and invulnerable until the hurt timer runs out
    Hurt,
    /// Terminal
    Dead,
}

/// Shared enemy tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyStats {
    pub move_speed: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub max_health: i32,
    /// Invulnerability window after a non-lethal hit (seconds)
    pub hurt_duration: f32,
    /// Time a corpse stays in the simulation (seconds)
    pub death_destroy_delay: f32,
    /// Body radius for hit detection
    pub radius: f32,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            detection_range: 8.0,
            attack_range: 4.0,
            max_health: 20,
            hurt_duration: 0.2,
            death_destroy_delay: 1.5,
            radius: 0.5,
        }
    }
}

/// Waypoint loop. An empty route means "stand still".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolRoute {
    pub waypoints: Vec<Vec2>,
    /// Arrival radius around a waypoint
    pub reach_epsilon: f32,
    /// Idle time at each waypoint (seconds)
    pub dwell_time: f32,
    #[serde(skip)]
    index: usize,
    #[serde(skip)]
    idle_timer: f32,
}

impl Default for PatrolRoute {
    fn default() -> Self {
        Self {
            waypoints: Vec::new(),
            reach_epsilon: 0.1,
            dwell_time: 0.0,
            index: 0,
            idle_timer: 0.0,
        }
    }
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        Self {
            waypoints,
            ..Default::default()
        }
    }

    pub fn with_dwell(mut self, seconds: f32) -> Self {
        self.dwell_time = seconds.max(0.0);
        self
    }

    /// Waypoint currently being walked to
    pub fn current_waypoint(&self) -> Option<Vec2> {
        self.waypoints.get(self.index).copied()
    }

    pub fn tick(&mut self, body: &mut Body, dt: f32) {
        if self.waypoints.is_empty() {
            body.stop();
            return;
        }

        if self.idle_timer > 0.0 {
            self.idle_timer -= dt;
            body.stop();
            return;
        }

        let dest = self.waypoints[self.index % self.waypoints.len()];
        if body.position.distance(dest) <= self.reach_epsilon {
            self.index = (self.index + 1) % self.waypoints.len();
            self.idle_timer = self.dwell_time;
            body.stop();
            return;
        }

        body.approach(dest, dt);
    }
}

/// Per-archetype actions for the non-interrupt states
pub trait Behavior {
    /// Chase halts this close to the target
    fn stop_distance(&self) -> f32;

    fn patrol_tick(&mut self, body: &mut Body, dt: f32);

    fn chase_tick(&mut self, body: &mut Body, target: Option<&TargetSnapshot>) {
        let Some(target) = target else {
            body.stop();
            return;
        };

        if body.distance_to(target.position) > self.stop_distance().max(MIN_STOP_DISTANCE) {
            body.move_towards(target.position);
        } else {
            body.stop();
        }
    }

    fn attack_tick(
        &mut self,
        attacker: ActorId,
        body: &mut Body,
        target: Option<&TargetSnapshot>,
        dt: f32,
        commands: &mut Vec<CombatCommand>,
    );
}

/// Closes in and hits at arm's length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeBehavior {
    pub damage: i32,
    pub melee_range: f32,
    /// Seconds between hits
    pub hit_cooldown: f32,
    /// Stop this far from the target instead of pushing into it
    pub stop_distance: f32,
    pub patrol: PatrolRoute,
    #[serde(skip)]
    cooldown: f32,
}

impl Default for MeleeBehavior {
    fn default() -> Self {
        Self {
            damage: 12,
            melee_range: 1.1,
            hit_cooldown: 0.8,
            stop_distance: 0.6,
            patrol: PatrolRoute::default(),
            cooldown: 0.0,
        }
    }
}

impl MeleeBehavior {
    pub fn with_hit_cooldown(mut self, seconds: f32) -> Self {
        self.hit_cooldown = seconds.max(0.0);
        self
    }
}

impl Behavior for MeleeBehavior {
    fn stop_distance(&self) -> f32 {
        self.stop_distance
    }

    fn patrol_tick(&mut self, body: &mut Body, dt: f32) {
        self.patrol.tick(body, dt);
    }

    fn attack_tick(
        &mut self,
        attacker: ActorId,
        body: &mut Body,
        target: Option<&TargetSnapshot>,
        dt: f32,
        commands: &mut Vec<CombatCommand>,
    ) {
        let Some(target) = target else {
            body.stop();
            return;
        };

        let dist = body.distance_to(target.position);
        if dist > self.stop_distance {
            body.move_towards(target.position);
        } else {
            body.stop();
        }

        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return;
        }

        if dist <= self.melee_range && target.damageable {
            commands.push(CombatCommand::Damage {
                source: attacker,
                target: target.id,
                amount: self.damage,
            });
            self.cooldown = self.hit_cooldown;
        }
    }
}

/// Holds position (or backs off) and shoots at the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangedBehavior {
    pub shots_per_second: f32,
    pub damage: i32,
    pub projectile_speed: f32,
    /// Muzzle position relative to the body, x mirrored toward the target
    pub muzzle_offset: Vec2,
    /// Back away while the target is closer than this (0 = hold position)
    pub keep_distance: f32,
    /// Chase stops this far from the target
    pub stop_distance: f32,
    pub projectile: Option<ProjectilePrototype>,
    pub patrol: PatrolRoute,
    #[serde(skip)]
    cooldown: f32,
}

impl Default for RangedBehavior {
    fn default() -> Self {
        Self {
            shots_per_second: 1.5,
            damage: 8,
            projectile_speed: 10.0,
            muzzle_offset: Vec2::new(0.6, 0.0),
            keep_distance: 0.0,
            stop_distance: 0.6,
            projectile: Some(ProjectilePrototype::default()),
            patrol: PatrolRoute::default(),
            cooldown: 0.0,
        }
    }
}

impl RangedBehavior {
    pub fn with_muzzle_offset(mut self, offset: Vec2) -> Self {
        self.muzzle_offset = offset;
        self
    }

    fn muzzle_position(&self, body: &Body, aim_at: Vec2) -> Vec2 {
        let facing = if aim_at.x < body.position.x { -1.0 } else { 1.0 };
        body.position + Vec2::new(self.muzzle_offset.x * facing, self.muzzle_offset.y)
    }
}

impl Behavior for RangedBehavior {
    fn stop_distance(&self) -> f32 {
        self.stop_distance
    }

    fn patrol_tick(&mut self, body: &mut Body, dt: f32) {
        self.patrol.tick(body, dt);
    }

    fn attack_tick(
        &mut self,
        _attacker: ActorId,
        body: &mut Body,
        target: Option<&TargetSnapshot>,
        dt: f32,
        commands: &mut Vec<CombatCommand>,
    ) {
        let Some(target) = target else {
            body.stop();
            return;
        };

        self.cooldown -= dt;
        if self.cooldown <= 0.0 {
            if let Some(prototype) = &self.projectile {
                let muzzle = self.muzzle_position(body, target.position);
                commands.push(CombatCommand::Spawn(ProjectileSpawn {
                    position: muzzle,
                    direction: (target.position - muzzle).normalize_or_zero(),
                    damage: self.damage,
                    speed: self.projectile_speed,
                    lifetime: prototype.lifetime,
                    hit_mask: prototype.hit_mask,
                    owner: body.faction,
                }));
                self.cooldown = 1.0 / self.shots_per_second.max(MIN_SHOTS_PER_SECOND);
            }
        }

        if self.keep_distance > 0.0 && body.distance_to(target.position) < self.keep_distance {
            let away = (body.position - target.position).normalize_or_zero();
            body.velocity = away * body.move_speed;
        } else {
            body.stop();
        }
    }
}

/// Enemy archetype: which behavior drives the state actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Archetype {
    Melee(MeleeBehavior),
    Ranged(RangedBehavior),
}

impl Default for Archetype {
    fn default() -> Self {
        Archetype::Melee(MeleeBehavior::default())
    }
}

impl Archetype {
    fn behavior(&mut self) -> &mut dyn Behavior {
        match self {
            Archetype::Melee(b) => b,
            Archetype::Ranged(b) => b,
        }
    }

    pub fn stop_distance(&self) -> f32 {
        match self {
            Archetype::Melee(b) => b.stop_distance,
            Archetype::Ranged(b) => b.stop_distance,
        }
    }

    pub fn patrol(&self) -> &PatrolRoute {
        match self {
            Archetype::Melee(b) => &b.patrol,
            Archetype::Ranged(b) => &b.patrol,
        }
    }
}

/// A single enemy actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: ActorId,
    pub body: Body,
    pub stats: EnemyStats,
    pub archetype: Archetype,
    /// Player to hunt. Resolved lazily by the orchestrator when unset.
    pub target: Option<ActorId>,
    state: EnemyState,
    health: ActorHealth,
    invulnerable: bool,
    hurt_timer: f32,
    death_timer: f32,
    removable: bool,
}

impl Enemy {
    pub fn new(id: ActorId, position: Vec2, stats: EnemyStats, archetype: Archetype) -> Self {
        let body = Body::new(position, stats.radius, stats.move_speed, Faction::Enemy);
        let health = ActorHealth::new(stats.max_health);
        Self {
            id,
            body,
            stats,
            archetype,
            target: None,
            state: EnemyState::Patrol,
            health,
            invulnerable: false,
            hurt_timer: 0.0,
            death_timer: 0.0,
            removable: false,
        }
    }

    #[inline]
    pub fn state(&self) -> EnemyState {
        self.state
    }

    #[inline]
    pub fn health(&self) -> &ActorHealth {
        &self.health
    }

    #[inline]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.state == EnemyState::Dead
    }

    /// Death delay has elapsed; the orchestrator should drop this actor
    #[inline]
    pub fn is_removable(&self) -> bool {
        self.removable
    }

    fn in_range(&self, target: Option<&TargetSnapshot>, range: f32) -> bool {
        target.is_some_and(|t| self.body.distance_to(t.position) <= range)
    }

    /// Range-based pick among Attack / Chase / Patrol
    fn select_state(&self, target: Option<&TargetSnapshot>) -> EnemyState {
        if self.in_range(target, self.stats.attack_range) {
            EnemyState::Attack
        } else if self.in_range(target, self.stats.detection_range) {
            EnemyState::Chase
        } else {
            EnemyState::Patrol
        }
    }

    fn change_state(&mut self, next: EnemyState) {
        if self.state == next {
            return;
        }
        log::debug!("enemy {} {:?} -> {:?}", self.id, self.state, next);

        // Attack may keep closing distance; every other exit halts
        if self.state != EnemyState::Attack {
            self.body.stop();
        }
        self.state = next;
        if matches!(next, EnemyState::Hurt | EnemyState::Dead) {
            self.body.stop();
        }
    }

    /// Advance one tick. `target` is the previous tick's committed snapshot.
    pub fn update(
        &mut self,
        dt: f32,
        ctx: &SimContext,
        target: Option<&TargetSnapshot>,
        commands: &mut Vec<CombatCommand>,
    ) {
        if self.state == EnemyState::Dead {
            self.body.stop();
            if !ctx.is_suspended() && !self.removable {
                self.death_timer -= dt;
                if self.death_timer <= 0.0 {
                    self.removable = true;
                }
            }
            return;
        }

        if ctx.is_suspended() {
            self.body.stop();
            return;
        }

        if self.state == EnemyState::Hurt {
            self.hurt_timer -= dt;
            if self.hurt_timer > 0.0 {
                return;
            }
            // Stagger over: fall through and pick a state from current range
            self.invulnerable = false;
            self.hurt_timer = 0.0;
        }

        let next = self.select_state(target);
        self.change_state(next);

        let (id, state) = (self.id, self.state);
        let behavior = self.archetype.behavior();
        match state {
            EnemyState::Patrol => behavior.patrol_tick(&mut self.body, dt),
            EnemyState::Chase => behavior.chase_tick(&mut self.body, target),
            EnemyState::Attack => behavior.attack_tick(id, &mut self.body, target, dt, commands),
            EnemyState::Hurt | EnemyState::Dead => {}
        }

        self.body.integrate(dt);
    }
}

impl Damageable for Enemy {
    fn take_damage(&mut self, amount: i32, events: &mut Vec<CombatEvent>) {
        if self.state == EnemyState::Dead || self.invulnerable {
            return;
        }

        self.health.take_damage(amount.max(1));

        if !self.health.is_alive() {
            self.invulnerable = false;
            self.change_state(EnemyState::Dead);
            self.death_timer = self.stats.death_destroy_delay;
            log::info!("enemy {} died", self.id);
            events.push(CombatEvent::ActorDied(self.id));
            return;
        }

        self.invulnerable = true;
        self.hurt_timer = self.stats.hurt_duration;
        self.change_state(EnemyState::Hurt);
    }
}
