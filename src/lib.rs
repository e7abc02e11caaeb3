//! Combat Sim - real-time 2D combat core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (enemy AI, weapons, projectiles, health)
//! - `config`: Data-driven arena, weapon and enemy configuration
//! - `error`: Configuration/load errors

pub mod config;
pub mod error;
pub mod sim;

pub use config::CombatConfig;
pub use error::{ConfigError, ConfigResult};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Floor for weapon fire rate (shots/second) to avoid divide-by-zero
    pub const MIN_FIRE_RATE: f32 = 0.1;
    /// Floor for any weapon cooldown, guarantees progress
    pub const MIN_COOLDOWN: f32 = 0.01;
    /// Floor for enemy shooter fire rate (shots/second)
    pub const MIN_SHOTS_PER_SECOND: f32 = 0.01;
    /// Floor for chase stopping distance
    pub const MIN_STOP_DISTANCE: f32 = 0.01;

    /// Sprint speed multiplier for the player
    pub const SPRINT_MULTIPLIER: f32 = 1.5;
    /// Movement input dead zone
    pub const MOVE_DEAD_ZONE: f32 = 0.01;
}

/// Rotate a direction vector counter-clockwise by `degrees`
#[inline]
pub fn rotate_degrees(dir: Vec2, degrees: f32) -> Vec2 {
    if degrees == 0.0 {
        return dir;
    }
    Vec2::from_angle(degrees.to_radians()).rotate(dir)
}

/// Signed angle (degrees) from `from` to `to`
#[inline]
pub fn angle_between_degrees(from: Vec2, to: Vec2) -> f32 {
    from.angle_to(to).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_degrees_quarter_turn() {
        let v = rotate_degrees(Vec2::X, 90.0);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_angle_between_roundtrip() {
        let v = rotate_degrees(Vec2::X, -15.0);
        assert!((angle_between_degrees(Vec2::X, v) + 15.0).abs() < 1e-4);
    }
}
