//! Simulation configuration
//!
//! Everything the core would otherwise hard-code: arena bounds, solver
//! tolerances, the "no collision" time sentinel and ball defaults. Loaded from
//! JSON; missing fields fall back to [`crate::consts`].

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Error type for loading or validating a [`SimConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error while reading the config file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON or wrong field types.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Parsed fine but the values cannot drive a simulation.
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Axis-aligned arena bounds. `min.y` is the terminal (floor) boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::splat(ARENA_SIZE),
        }
    }
}

/// Tolerances shared by every sweep test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Threshold for "moving away / parallel" and near-zero denominators
    pub epsilon: f32,
    /// Anti-tunnelling backoff applied to endpoint contacts (time units)
    pub backoff: f32,
    /// Sentinel time meaning "no collision"
    pub max_time: f32,
    /// Use the reciprocal-square-root approximation instead of `f32::sqrt`
    pub fast_sqrt: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            backoff: ANTI_TUNNEL_BACKOFF,
            max_time: MAX_TIME,
            fast_sqrt: false,
        }
    }
}

/// Defaults for newly spawned balls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub radius: f32,
    /// Hit points removed from an edge polygon per contact
    pub damage: u32,
    /// Launch point of the first volley
    pub reset_position: Vec2,
    /// Skip the obstacle a ball just bounced off when predicting its next contact
    pub suppress_repeat_hit: bool,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            damage: BALL_DAMAGE,
            reset_position: Vec2::new(BALL_RESET_X, BALL_RESET_Y),
            suppress_repeat_hit: true,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub arena: ArenaConfig,
    pub solver: SolverConfig,
    pub ball: BallConfig,
}

impl SimConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the solvers cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let result = self.check();
        if let Err(err) = &result {
            log::warn!("Rejected config: {err}");
        }
        result
    }

    fn check(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &'static str| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason })
        };

        let extent = self.arena.max - self.arena.min;
        if !extent.is_finite() || extent.x <= 0.0 || extent.y <= 0.0 {
            return invalid("arena", "max must be strictly greater than min on both axes");
        }
        let ball = &self.ball;
        if !ball.radius.is_finite() || ball.radius <= 0.0 {
            return invalid("ball.radius", "must be positive");
        }
        if 2.0 * ball.radius >= extent.min_element() {
            return invalid("ball.radius", "ball does not fit inside the arena");
        }
        if !ball.reset_position.is_finite() {
            return invalid("ball.reset_position", "must be finite");
        }

        let solver = &self.solver;
        if !solver.epsilon.is_finite() || solver.epsilon <= 0.0 {
            return invalid("solver.epsilon", "must be positive");
        }
        if !solver.backoff.is_finite() || solver.backoff < 0.0 {
            return invalid("solver.backoff", "must be zero or positive");
        }
        if !solver.max_time.is_finite() || solver.max_time <= 0.0 {
            return invalid("solver.max_time", "must be a finite positive sentinel");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.arena.max, Vec2::splat(14.0));
        assert_eq!(config.solver.backoff, 0.01);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(r#"{ "solver": { "backoff": 0.02 } }"#).unwrap();
        assert_eq!(config.solver.backoff, 0.02);
        assert_eq!(config.solver.epsilon, EPSILON);
        assert_eq!(config.ball, BallConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = SimConfig::default();
        config.arena.max = Vec2::new(20.0, 30.0);
        config.ball.suppress_repeat_hit = false;
        let json = config.to_json_pretty().unwrap();
        assert_eq!(SimConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_inverted_arena() {
        let err = SimConfig::from_json(r#"{ "arena": { "min": [5.0, 0.0], "max": [1.0, 10.0] } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "arena", .. }));
    }

    #[test]
    fn test_rejects_bad_solver_values() {
        let mut config = SimConfig::default();
        config.solver.epsilon = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.solver.max_time = f32::INFINITY;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.ball.radius = 8.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "ball.radius", .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SimConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            SimConfig::load("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
