//! Tunable settings for the terrain, collision and controller components.
//!
//! Every field has a default taken from [`crate::constants`] or
//! [`crate::collision::settings`], so a settings file only needs to list the
//! values it overrides:
//!
//! ```toml
//! [controller]
//! run_speed = 12.0
//! gravity = 25.0
//! ```

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    collision::settings::{
        AIR_RESISTANCE, CONTACT_EPSILON, DEFAULT_CAPSULE_HEIGHT, DEFAULT_CAPSULE_RADIUS,
        DEFAULT_JUMP_SPEED, DEFAULT_RUN_SPEED, DEFAULT_WALK_SPEED, GRAVITY_MPS2,
        GROUND_CHECK_DISTANCE, GROUND_FRICTION, GROUND_NORMAL_MIN_Y, UPWARD_VELOCITY_THRESHOLD,
        WALL_PROBE_DISTANCE,
    },
    constants::{
        COLLISION_CHECK_INTERVAL, DEFAULT_SEA_LEVEL, HEIGHT_CACHE_MAX_ENTRIES,
        HEIGHT_CACHE_QUANTUM, HEIGHT_CACHE_TTL, LARGE_SURFACE_EXTENT,
    },
};

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// A value parsed but is out of range.
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Settings for the terrain registry and height query service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Elevation returned when no surface is registered.
    pub default_sea_level: f32,
    /// Cache key grid step (meters).
    pub cache_quantum: f32,
    /// Cache entry lifetime (seconds).
    pub cache_ttl_secs: f32,
    /// Entry count that triggers pruning.
    pub cache_max_entries: usize,
    /// Horizontal extent above which a surface gets elevated priority.
    pub large_surface_extent: f32,
}

impl TerrainSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs_f32(self.cache_ttl_secs.max(0.0))
    }
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            default_sea_level: DEFAULT_SEA_LEVEL,
            cache_quantum: HEIGHT_CACHE_QUANTUM,
            cache_ttl_secs: HEIGHT_CACHE_TTL.as_secs_f32(),
            cache_max_entries: HEIGHT_CACHE_MAX_ENTRIES,
            large_surface_extent: LARGE_SURFACE_EXTENT,
        }
    }
}

/// Settings for the collision resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionSettings {
    /// Separation added along the contact normal to every correction.
    pub contact_epsilon: f32,
    /// Length of the wall/ceiling proximity rays.
    pub wall_probe_distance: f32,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            contact_epsilon: CONTACT_EPSILON,
            wall_probe_distance: WALL_PROBE_DISTANCE,
        }
    }
}

/// Settings for the character controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    pub capsule_radius: f32,
    /// Total capsule height, caps included.
    pub capsule_height: f32,
    pub walk_speed: f32,
    pub run_speed: f32,
    pub jump_speed: f32,
    /// Gravity magnitude (positive, m/s^2).
    pub gravity: f32,
    /// Per-tick horizontal decay without input, in `[0, 1]`.
    pub ground_friction: f32,
    /// Per-tick horizontal decay while airborne, in `[0, 1]`.
    pub air_resistance: f32,
    /// Nominal ground detection distance; the stay-grounded band is twice this.
    pub ground_check_distance: f32,
    /// Vertical speed above which the body cannot be grounded.
    pub upward_velocity_threshold: f32,
    /// Minimum contact normal Y for a hit to count as ground.
    pub ground_normal_min_y: f32,
    /// Seconds between collision checks. Zero checks every tick.
    pub check_interval_secs: f32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            capsule_radius: DEFAULT_CAPSULE_RADIUS,
            capsule_height: DEFAULT_CAPSULE_HEIGHT,
            walk_speed: DEFAULT_WALK_SPEED,
            run_speed: DEFAULT_RUN_SPEED,
            jump_speed: DEFAULT_JUMP_SPEED,
            gravity: GRAVITY_MPS2,
            ground_friction: GROUND_FRICTION,
            air_resistance: AIR_RESISTANCE,
            ground_check_distance: GROUND_CHECK_DISTANCE,
            upward_velocity_threshold: UPWARD_VELOCITY_THRESHOLD,
            ground_normal_min_y: GROUND_NORMAL_MIN_Y,
            check_interval_secs: COLLISION_CHECK_INTERVAL.as_secs_f32(),
        }
    }
}

/// All settings, grouped per component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicsConfig {
    pub terrain: TerrainSettings,
    pub collision: CollisionSettings,
    pub controller: ControllerSettings,
}

impl KinematicsConfig {
    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Reject settings that would make the simulation misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.terrain;
        let c = &self.collision;
        let k = &self.controller;

        let finite = [
            ("terrain.default_sea_level", t.default_sea_level),
            ("terrain.cache_quantum", t.cache_quantum),
            ("terrain.cache_ttl_secs", t.cache_ttl_secs),
            ("terrain.large_surface_extent", t.large_surface_extent),
            ("collision.contact_epsilon", c.contact_epsilon),
            ("collision.wall_probe_distance", c.wall_probe_distance),
            ("controller.capsule_radius", k.capsule_radius),
            ("controller.capsule_height", k.capsule_height),
            ("controller.walk_speed", k.walk_speed),
            ("controller.run_speed", k.run_speed),
            ("controller.jump_speed", k.jump_speed),
            ("controller.gravity", k.gravity),
            ("controller.ground_friction", k.ground_friction),
            ("controller.air_resistance", k.air_resistance),
            ("controller.ground_check_distance", k.ground_check_distance),
            ("controller.upward_velocity_threshold", k.upward_velocity_threshold),
            ("controller.ground_normal_min_y", k.ground_normal_min_y),
            ("controller.check_interval_secs", k.check_interval_secs),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite")));
            }
        }

        // Everything except the sea level is a magnitude.
        for (name, value) in finite.iter().skip(1) {
            if *value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must not be negative")));
            }
        }

        if t.cache_quantum <= 0.0 {
            return Err(ConfigError::Invalid("terrain.cache_quantum must be positive".into()));
        }
        if c.contact_epsilon <= 0.0 {
            return Err(ConfigError::Invalid("collision.contact_epsilon must be positive".into()));
        }
        if k.capsule_radius <= 0.0 {
            return Err(ConfigError::Invalid("controller.capsule_radius must be positive".into()));
        }
        if k.capsule_height < 2.0 * k.capsule_radius {
            return Err(ConfigError::Invalid(
                "controller.capsule_height must be at least twice the radius".into(),
            ));
        }
        if k.ground_friction > 1.0 || k.air_resistance > 1.0 {
            return Err(ConfigError::Invalid(
                "controller friction factors must lie in [0, 1]".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        KinematicsConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = KinematicsConfig::from_toml_str(
            r#"
            [controller]
            run_speed = 12.0

            [terrain]
            default_sea_level = -2.5
            "#,
        )
        .unwrap();

        assert_eq!(config.controller.run_speed, 12.0);
        assert_eq!(config.controller.walk_speed, DEFAULT_WALK_SPEED);
        assert_eq!(config.terrain.default_sea_level, -2.5);
        assert_eq!(config.collision.contact_epsilon, CONTACT_EPSILON);
    }

    #[test]
    fn negative_magnitudes_are_rejected() {
        let err = KinematicsConfig::from_toml_str("[controller]\ngravity = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("gravity")));
    }

    #[test]
    fn negative_sea_level_is_allowed() {
        let config = KinematicsConfig::from_toml_str("[terrain]\ndefault_sea_level = -10.0\n");
        assert!(config.is_ok());
    }

    #[test]
    fn capsule_shorter_than_its_caps_is_rejected() {
        let err = KinematicsConfig::from_toml_str(
            "[controller]\ncapsule_radius = 1.0\ncapsule_height = 1.5\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = KinematicsConfig::from_toml_str("[controller\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = KinematicsConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
