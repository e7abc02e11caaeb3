//! Deterministic combat simulation module
//!
//! All combat logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No file, terminal or platform dependencies

pub mod collision;
pub mod enemy;
pub mod health;
pub mod player;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod weapon;

pub use collision::{
    Category, CategoryMask, Collider, CollisionWorld, Faction, PhysicsQuery, ProbeFilter, ProbeHit,
    Shape,
};
pub use enemy::{
    Archetype, Behavior, Enemy, EnemyState, EnemyStats, MeleeBehavior, PatrolRoute, RangedBehavior,
};
pub use health::{ActorHealth, HealthChange};
pub use player::{Player, PlayerConfig};
pub use projectile::{Projectile, ProjectileImpact, ProjectileSpawn, ProjectileState};
pub use state::{
    ActorId, Body, CombatCommand, CombatEvent, CombatState, Damageable, GamePhase, HealPickup, Prop,
    SimContext, TargetSnapshot, WeaponGiver,
};
pub use tick::{FixedStepper, TickInput, tick};
pub use weapon::{Muzzle, ProjectilePrototype, Trigger, WeaponController, WeaponDefinition};
