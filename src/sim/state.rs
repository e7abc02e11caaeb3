//! Combat state and core simulation types
//!
//! Everything that must be identical across two runs with the same seed and
//! inputs lives in [`CombatState`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{CategoryMask, Collider, CollisionWorld, Faction, Shape};
use super::enemy::{Archetype, Enemy, EnemyStats};
use super::health::ActorHealth;
use super::player::{Player, PlayerConfig};
use super::projectile::{Projectile, ProjectileSpawn};
use super::weapon::WeaponDefinition;

/// Entity identifier. Allocated from one counter for every kind of entity.
pub type ActorId = u32;

/// Top-level game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GamePhase {
    MainMenu,
    /// Active gameplay
    #[default]
    Play,
    Pause,
    /// Conversation on screen, world frozen
    Dialogue,
    /// Player died
    GameOver,
}

impl GamePhase {
    /// World frozen: no movement, no timers, no firing
    #[inline]
    pub fn is_suspended(self) -> bool {
        matches!(
            self,
            GamePhase::Pause | GamePhase::Dialogue | GamePhase::GameOver
        )
    }
}

/// Per-tick context handed to every actor update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimContext {
    pub phase: GamePhase,
}

impl SimContext {
    pub fn new(phase: GamePhase) -> Self {
        Self { phase }
    }

    #[inline]
    pub fn is_suspended(&self) -> bool {
        self.phase.is_suspended()
    }
}

/// Notifications for UI / game-flow collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// Player health moved
    HealthChanged { current: i32, max: i32 },
    WeaponSwitched,
    PhaseChanged(GamePhase),
    ActorDied(ActorId),
    /// Entity left the simulation (corpse timer done, prop destroyed)
    ActorRemoved(ActorId),
    WeaponGranted { weapon: String },
}

/// Anything projectiles and melee attacks can hurt
pub trait Damageable {
    fn take_damage(&mut self, amount: i32, events: &mut Vec<CombatEvent>);
}

/// Kinematic body shared by player and enemies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub move_speed: f32,
    pub faction: Faction,
}

impl Body {
    pub fn new(position: Vec2, radius: f32, move_speed: f32, faction: Faction) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius,
            move_speed,
            faction,
        }
    }

    #[inline]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }

    /// Head straight for `dest` at full speed
    pub fn move_towards(&mut self, dest: Vec2) {
        self.velocity = (dest - self.position).normalize_or_zero() * self.move_speed;
    }

    /// Like [`Body::move_towards`] but never overshoots `dest` within `dt`
    pub fn approach(&mut self, dest: Vec2, dt: f32) {
        let offset = dest - self.position;
        let dist = offset.length();
        if dist <= f32::EPSILON {
            self.stop();
            return;
        }
        let speed = if dt > 0.0 {
            self.move_speed.min(dist / dt)
        } else {
            self.move_speed
        };
        self.velocity = offset / dist * speed;
    }

    #[inline]
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    pub fn shape(&self) -> Shape {
        Shape::Circle {
            center: self.position,
            radius: self.radius,
        }
    }
}

/// Read-only view of the player, taken once per tick before any update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSnapshot {
    pub id: ActorId,
    pub position: Vec2,
    /// False once the target is dead
    pub damageable: bool,
}

/// Side effects produced by actors during a tick, applied by the orchestrator
/// after every actor has run
#[derive(Debug, Clone, PartialEq)]
pub enum CombatCommand {
    /// `source` is the attacker or projectile entity
    Damage {
        source: ActorId,
        target: ActorId,
        amount: i32,
    },
    /// Becomes a live projectile at the start of the next tick
    Spawn(ProjectileSpawn),
}

/// Heals the player on touch, then disappears
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealPickup {
    pub id: ActorId,
    pub position: Vec2,
    pub radius: f32,
    pub amount: i32,
}

/// Hands its weapon to the player on interact, once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponGiver {
    pub id: ActorId,
    pub position: Vec2,
    /// Interaction reach
    pub radius: f32,
    pub weapon: WeaponDefinition,
    pub given: bool,
}

/// Breakable scenery (crates, barrels)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prop {
    pub id: ActorId,
    pub shape: Shape,
    health: ActorHealth,
}

impl Prop {
    pub fn new(id: ActorId, shape: Shape, max_health: i32) -> Self {
        Self {
            id,
            shape,
            health: ActorHealth::new(max_health),
        }
    }

    #[inline]
    pub fn health(&self) -> &ActorHealth {
        &self.health
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        !self.health.is_alive()
    }
}

impl Damageable for Prop {
    fn take_damage(&mut self, amount: i32, events: &mut Vec<CombatEvent>) {
        if self.health.take_damage(amount).died() {
            log::info!("prop {} destroyed", self.id);
            events.push(CombatEvent::ActorDied(self.id));
        }
    }
}

/// Complete combat state (deterministic, serializable)
#[derive(Debug, Clone, Serialize)]
pub struct CombatState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter (advances only while not suspended)
    pub time_ticks: u64,
    phase: GamePhase,
    pub player: Option<Player>,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    /// Sorted by id
    pub projectiles: Vec<Projectile>,
    /// Spawn requests from the previous tick
    pub pending_spawns: Vec<ProjectileSpawn>,
    pub pickups: Vec<HealPickup>,
    pub givers: Vec<WeaponGiver>,
    pub props: Vec<Prop>,
    pub collision: CollisionWorld,
    #[serde(skip)]
    pub(crate) rng: Pcg32,
    #[serde(skip)]
    pub(crate) events: Vec<CombatEvent>,
    next_id: u32,
}

impl CombatState {
    /// Empty arena in the `Play` phase
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            time_ticks: 0,
            phase: GamePhase::Play,
            player: None,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            pending_spawns: Vec::new(),
            pickups: Vec::new(),
            givers: Vec::new(),
            props: Vec::new(),
            collision: CollisionWorld::new(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> ActorId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Change phase, notifying only on an actual change
    pub fn set_phase(&mut self, phase: GamePhase) {
        if self.phase == phase {
            return;
        }
        log::info!("phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.events.push(CombatEvent::PhaseChanged(phase));
    }

    pub fn context(&self) -> SimContext {
        SimContext::new(self.phase)
    }

    pub fn spawn_player(&mut self, config: PlayerConfig, loadout: Vec<WeaponDefinition>) -> ActorId {
        let id = self.next_entity_id();
        self.player = Some(Player::new(id, config, loadout));
        id
    }

    pub fn spawn_enemy(&mut self, position: Vec2, stats: EnemyStats, archetype: Archetype) -> ActorId {
        let id = self.next_entity_id();
        self.enemies.push(Enemy::new(id, position, stats, archetype));
        id
    }

    pub fn add_heal_pickup(&mut self, position: Vec2, radius: f32, amount: i32) -> ActorId {
        let id = self.next_entity_id();
        self.pickups.push(HealPickup {
            id,
            position,
            radius,
            amount,
        });
        id
    }

    pub fn add_weapon_giver(&mut self, position: Vec2, radius: f32, weapon: WeaponDefinition) -> ActorId {
        let id = self.next_entity_id();
        self.givers.push(WeaponGiver {
            id,
            position,
            radius,
            weapon,
            given: false,
        });
        id
    }

    pub fn add_prop(&mut self, shape: Shape, max_health: i32) -> ActorId {
        let id = self.next_entity_id();
        self.props.push(Prop::new(id, shape, max_health));
        id
    }

    pub fn add_obstacle(&mut self, collider: Collider) {
        self.collision.add_static(collider);
    }

    /// Queue a projectile. It becomes live at the start of the next tick.
    pub fn queue_projectile(&mut self, spawn: ProjectileSpawn) {
        self.pending_spawns.push(spawn);
    }

    /// Turn last tick's spawn requests into live projectiles
    pub fn launch_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending_spawns);
        for spawn in &pending {
            let id = self.next_entity_id();
            self.projectiles.push(Projectile::launch(id, spawn));
        }
    }

    pub fn enemy(&self, id: ActorId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Route damage to whatever owns `target`. Unknown ids are scenery.
    pub fn apply_damage(&mut self, target: ActorId, amount: i32) {
        if let Some(player) = self.player.as_mut().filter(|p| p.id == target) {
            player.take_damage(amount, &mut self.events);
        } else if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == target) {
            enemy.take_damage(amount, &mut self.events);
        } else if let Some(prop) = self.props.iter_mut().find(|p| p.id == target) {
            prop.take_damage(amount, &mut self.events);
        }
    }

    /// Snapshot of the player for this tick's enemy decisions
    pub fn player_target(&self) -> Option<TargetSnapshot> {
        self.player.as_ref().map(|p| TargetSnapshot {
            id: p.id,
            position: p.body.position,
            damageable: p.health().is_alive(),
        })
    }

    /// Rebuild actor colliders from committed positions
    pub fn rebuild_colliders(&mut self) {
        let player = self.player.iter().map(|p| {
            Collider::actor(p.id, p.body.shape(), CategoryMask::PLAYER, Faction::Player)
        });
        // Corpses still block shots until removed
        let enemies = self.enemies.iter().map(|e| {
            Collider::actor(e.id, e.body.shape(), CategoryMask::ENEMY, Faction::Enemy)
        });
        let props = self
            .props
            .iter()
            .filter(|p| !p.is_destroyed())
            .map(|p| Collider::actor(p.id, p.shape, CategoryMask::PROP, Faction::Scenery));

        let dynamics: Vec<Collider> = player.chain(enemies).chain(props).collect();
        self.collision.set_dynamics(dynamics);
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Take all notifications raised since the last drain
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
        self.pickups.sort_by_key(|p| p.id);
        self.givers.sort_by_key(|g| g.id);
        self.props.sort_by_key(|p| p.id);
    }
}
