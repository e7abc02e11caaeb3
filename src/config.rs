//! Arena configuration loaded from TOML (e.g. `assets/arena.toml`).
//!
//! [`CombatConfig`] describes one arena: the player, the weapon catalogue,
//! static obstacles, enemies and interactables. Every record uses
//! `#[serde(default)]`, so a minimal file only needs the values it changes.
//!
//! Weapons are referenced by name everywhere else in the file. Names are
//! resolved once in [`CombatState::from_config`]; an unknown name is a load
//! error, never a per-tick lookup.

use std::collections::HashSet;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::sim::{Archetype, Collider, CombatState, EnemyStats, PlayerConfig, Shape, WeaponDefinition};

/// Complete arena description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// RNG seed (weapon jitter)
    pub seed: u64,
    /// No player section = enemies patrol forever
    pub player: Option<PlayerConfig>,
    /// Weapon catalogue, referenced by name
    pub weapons: Vec<WeaponDefinition>,
    /// Weapon names the player starts with, first one in hand
    pub starting_loadout: Vec<String>,
    /// Static SOLID scenery
    pub obstacles: Vec<Shape>,
    pub enemies: Vec<EnemyConfig>,
    pub heal_pickups: Vec<HealPickupConfig>,
    pub weapon_givers: Vec<WeaponGiverConfig>,
    pub props: Vec<PropConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyConfig {
    pub position: Vec2,
    #[serde(default)]
    pub stats: EnemyStats,
    #[serde(default)]
    pub behavior: Archetype,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealPickupConfig {
    pub position: Vec2,
    pub radius: f32,
    pub amount: i32,
}

impl Default for HealPickupConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            radius: 0.5,
            amount: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponGiverConfig {
    pub position: Vec2,
    /// Interaction reach
    pub radius: f32,
    /// Name from `weapons`
    pub weapon: String,
}

impl Default for WeaponGiverConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            radius: 1.5,
            weapon: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropConfig {
    pub shape: Shape,
    #[serde(default = "default_prop_health")]
    pub max_health: i32,
}

fn default_prop_health() -> i32 {
    10
}

fn check_shape(field: &str, shape: &Shape) -> ConfigResult<()> {
    match *shape {
        Shape::Circle { radius, .. } if radius <= 0.0 => {
            Err(ConfigError::invalid(format!("{field}.radius"), radius, "must be > 0"))
        }
        Shape::Rect { min, max } if min.x > max.x || min.y > max.y => Err(ConfigError::invalid(
            format!("{field}.min"),
            format!("{min:?}"),
            "must not exceed max",
        )),
        _ => Ok(()),
    }
}

impl CombatConfig {
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::info!(
            "loaded {}: {} weapons, {} enemies",
            path.display(),
            config.weapons.len(),
            config.enemies.len()
        );
        Ok(config)
    }

    /// Look up a catalogue weapon
    pub fn weapon(&self, name: &str) -> Option<&WeaponDefinition> {
        self.weapons.iter().find(|w| w.name == name)
    }

    fn resolve(&self, name: &str, context: impl Into<String>) -> ConfigResult<&WeaponDefinition> {
        self.weapon(name).ok_or_else(|| ConfigError::UnknownWeapon {
            name: name.to_string(),
            context: context.into(),
        })
    }

    /// Check every record. Fatal problems are errors; suspicious but
    /// playable values come back as warnings.
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let mut warnings = Vec::new();

        if let Some(player) = &self.player {
            if player.max_health < 1 {
                return Err(ConfigError::invalid(
                    "player.max_health",
                    player.max_health,
                    "must be >= 1",
                ));
            }
            if self.starting_loadout.is_empty() {
                warnings.push("player has an empty starting loadout and cannot fire".to_string());
            }
        }

        let mut seen = HashSet::new();
        for (i, weapon) in self.weapons.iter().enumerate() {
            if !seen.insert(weapon.name.as_str()) {
                return Err(ConfigError::invalid(
                    format!("weapons[{i}].name"),
                    &weapon.name,
                    "duplicate weapon name",
                ));
            }
            if weapon.bullets_per_shot < 1 {
                return Err(ConfigError::invalid(
                    format!("weapons[{i}].bullets_per_shot"),
                    weapon.bullets_per_shot,
                    "must be >= 1",
                ));
            }
            if weapon.spread_angle < 0.0 {
                return Err(ConfigError::invalid(
                    format!("weapons[{i}].spread_angle"),
                    weapon.spread_angle,
                    "must be >= 0",
                ));
            }
            if weapon.fire_rate <= 0.0 {
                return Err(ConfigError::invalid(
                    format!("weapons[{i}].fire_rate"),
                    weapon.fire_rate,
                    "must be > 0",
                ));
            }
            if weapon.projectile.is_none() {
                return Err(ConfigError::MissingProjectile {
                    weapon: weapon.name.clone(),
                });
            }
        }

        for name in &self.starting_loadout {
            self.resolve(name, "starting_loadout")?;
        }
        for (i, giver) in self.weapon_givers.iter().enumerate() {
            self.resolve(&giver.weapon, format!("weapon_givers[{i}]"))?;
        }

        for (i, shape) in self.obstacles.iter().enumerate() {
            check_shape(&format!("obstacles[{i}]"), shape)?;
        }
        for (i, prop) in self.props.iter().enumerate() {
            check_shape(&format!("props[{i}].shape"), &prop.shape)?;
            if prop.max_health < 1 {
                return Err(ConfigError::invalid(
                    format!("props[{i}].max_health"),
                    prop.max_health,
                    "must be >= 1",
                ));
            }
        }
        for (i, pickup) in self.heal_pickups.iter().enumerate() {
            if pickup.amount <= 0 {
                return Err(ConfigError::invalid(
                    format!("heal_pickups[{i}].amount"),
                    pickup.amount,
                    "must be > 0",
                ));
            }
        }

        for (i, enemy) in self.enemies.iter().enumerate() {
            let stats = &enemy.stats;
            if stats.max_health < 1 {
                return Err(ConfigError::invalid(
                    format!("enemies[{i}].stats.max_health"),
                    stats.max_health,
                    "must be >= 1",
                ));
            }
            if stats.attack_range > stats.detection_range {
                warnings.push(format!(
                    "enemies[{i}]: attack_range {} exceeds detection_range {}, it never chases",
                    stats.attack_range, stats.detection_range
                ));
            }
            if stats.attack_range < enemy.behavior.stop_distance() {
                warnings.push(format!(
                    "enemies[{i}]: attack_range {} is inside stop_distance {}, it stalls in chase",
                    stats.attack_range,
                    enemy.behavior.stop_distance()
                ));
            }
            if let Archetype::Ranged(ranged) = &enemy.behavior {
                if ranged.projectile.is_none() {
                    warnings.push(format!("enemies[{i}]: ranged enemy without projectile never fires"));
                }
                if ranged.shots_per_second <= 0.0 {
                    return Err(ConfigError::invalid(
                        format!("enemies[{i}].behavior.shots_per_second"),
                        ranged.shots_per_second,
                        "must be > 0",
                    ));
                }
            }
        }

        for warning in &warnings {
            log::warn!("{warning}");
        }
        Ok(warnings)
    }
}

impl CombatState {
    /// Validate `config` and build the arena it describes
    pub fn from_config(config: &CombatConfig) -> ConfigResult<Self> {
        config.validate()?;

        let mut state = CombatState::new(config.seed);

        for shape in &config.obstacles {
            state.add_obstacle(Collider::solid(*shape));
        }

        if let Some(player) = &config.player {
            let loadout = config
                .starting_loadout
                .iter()
                .map(|name| config.resolve(name, "starting_loadout").cloned())
                .collect::<ConfigResult<Vec<_>>>()?;
            state.spawn_player(player.clone(), loadout);
        }

        for enemy in &config.enemies {
            state.spawn_enemy(enemy.position, enemy.stats.clone(), enemy.behavior.clone());
        }
        for pickup in &config.heal_pickups {
            state.add_heal_pickup(pickup.position, pickup.radius, pickup.amount);
        }
        for (i, giver) in config.weapon_givers.iter().enumerate() {
            let weapon = config.resolve(&giver.weapon, format!("weapon_givers[{i}]"))?;
            state.add_weapon_giver(giver.position, giver.radius, weapon.clone());
        }
        for prop in &config.props {
            state.add_prop(prop.shape, prop.max_health);
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{CategoryMask, EnemyState, GamePhase, RangedBehavior};

    const ARENA: &str = r#"
seed = 7
starting_loadout = ["Pistol"]

[player]
spawn = [0.0, 0.5]
gravity = 30.0

[[weapons]]
name = "Pistol"
fire_rate = 4.0
is_automatic = false

[[weapons]]
name = "Scatter"
bullets_per_shot = 5
spread_angle = 40.0

[weapons.projectile]
lifetime = 0.5
hit_mask = ["solid", "enemy"]

[[obstacles]]
shape = "rect"
min = [-20.0, -1.0]
max = [20.0, 0.0]

[[enemies]]
position = [6.0, 0.5]

[enemies.behavior]
kind = "melee"

[enemies.behavior.patrol]
waypoints = [[4.0, 0.5], [8.0, 0.5]]

[[enemies]]
position = [12.0, 0.5]

[enemies.stats]
max_health = 30

[enemies.behavior]
kind = "ranged"
keep_distance = 3.0

[[heal_pickups]]
position = [3.0, 0.5]

[[weapon_givers]]
position = [-3.0, 0.5]
weapon = "Scatter"

[[props]]
max_health = 15

[props.shape]
shape = "circle"
center = [9.0, 0.5]
radius = 0.4
"#;

    #[test]
    fn test_parse_full_arena() {
        let config = CombatConfig::from_toml_str(ARENA).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.weapons.len(), 2);
        assert!(!config.weapons[0].is_automatic);
        // Unset fields keep their defaults
        assert_eq!(config.weapons[0].damage, 10);
        assert_eq!(
            config.weapons[1].projectile.as_ref().map(|p| p.hit_mask),
            Some(CategoryMask::SOLID | CategoryMask::ENEMY)
        );
        assert_eq!(config.enemies[1].stats.max_health, 30);
        assert_eq!(config.enemies[1].stats.attack_range, 4.0);
        assert!(matches!(config.enemies[1].behavior, Archetype::Ranged(ref r) if r.keep_distance == 3.0));
        assert_eq!(config.heal_pickups[0].amount, 25);
        assert_eq!(config.props[0].max_health, 15);
    }

    #[test]
    fn test_empty_file_is_valid() {
        let config = CombatConfig::from_toml_str("").unwrap();
        assert!(config.player.is_none());
        assert!(config.validate().unwrap().is_empty());
    }

    #[test]
    fn test_build_state_from_config() {
        let config = CombatConfig::from_toml_str(ARENA).unwrap();
        let state = CombatState::from_config(&config).unwrap();

        assert_eq!(state.phase(), GamePhase::Play);
        let player = state.player.as_ref().unwrap();
        assert_eq!(player.weapons.current().map(|w| w.name.as_str()), Some("Pistol"));
        assert_eq!(state.enemies.len(), 2);
        assert!(state.enemies.iter().all(|e| e.state() == EnemyState::Patrol));
        assert_eq!(state.enemies[0].archetype.patrol().waypoints.len(), 2);
        assert_eq!(state.givers[0].weapon.bullets_per_shot, 5);
        assert_eq!(state.collision.statics().len(), 1);
        assert_eq!(state.props.len(), 1);
        assert_eq!(state.pickups.len(), 1);
    }

    #[test]
    fn test_unknown_weapon_rejected() {
        let config = CombatConfig::from_toml_str(
            r#"
starting_loadout = ["Railgun"]
[player]
"#,
        )
        .unwrap();
        let err = CombatState::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownWeapon { ref name, .. } if name == "Railgun"));
    }

    #[test]
    fn test_giver_weapon_must_exist() {
        let config = CombatConfig::from_toml_str(
            r#"
[[weapon_givers]]
weapon = "Nope"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownWeapon { ref context, .. }) if context == "weapon_givers[0]"
        ));
    }

    #[test]
    fn test_weapon_rules() {
        let mut config = CombatConfig {
            weapons: vec![WeaponDefinition {
                bullets_per_shot: 0,
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));

        config.weapons[0] = WeaponDefinition {
            projectile: None,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingProjectile { .. })));

        config.weapons = vec![WeaponDefinition::default(), WeaponDefinition::default()];
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_range_order_is_a_warning() {
        let config = CombatConfig {
            enemies: vec![EnemyConfig {
                position: Vec2::ZERO,
                stats: EnemyStats {
                    attack_range: 10.0,
                    ..Default::default()
                },
                behavior: Archetype::default(),
            }],
            ..Default::default()
        };
        let warnings = config.validate().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("attack_range"));
    }

    #[test]
    fn test_attack_range_inside_stop_distance_warns() {
        let config = CombatConfig {
            enemies: vec![EnemyConfig {
                position: Vec2::ZERO,
                stats: EnemyStats {
                    attack_range: 0.0,
                    ..Default::default()
                },
                behavior: Archetype::Ranged(RangedBehavior::default()),
            }],
            ..Default::default()
        };
        let warnings = config.validate().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("stop_distance"));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        assert!(matches!(
            CombatConfig::from_toml_str("seed = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CombatConfig::load("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("does/not/exist.toml"));
    }
}
