// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! These structs map to the sections of `gng_configuration.toml`. Real-valued
//! fields are kept as written; [`EngineConfig::to_params`] converts them to
//! the fixed-point form the engine runs on.

use gng_core::decay::ErrorDecayMode;
use gng_core::edge::half_adjacency_len;
use gng_core::engine::RATE_SHIFT;
use gng_core::{EngineParams, Fraction, LearningRate, Point};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{ConfigError, ConfigResult};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GngConfig {
    pub engine: EngineConfig,
    pub training: TrainingConfig,
    pub snapshot: SnapshotConfig,
    pub logging: LoggingConfig,
}

/// Learning parameters and arena capacity
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Must match the compiled node capacity
    pub max_nodes: usize,
    /// Must equal `max_nodes · (max_nodes − 1) / 2`
    pub max_edges: usize,
    pub lambda: u32,
    pub epsilon_winner: f64,
    pub epsilon_neighbor: f64,
    pub alpha: f64,
    pub beta: f64,
    /// "multiplicative" or "shift"
    pub decay_mode: String,
    /// Only used when `decay_mode = "shift"`
    pub decay_shift: u8,
    pub max_age: u32,
    pub seed_a: Vec<f64>,
    pub seed_b: Vec<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_nodes: 40,
            max_edges: half_adjacency_len(40),
            lambda: 100,
            epsilon_winner: 0.3,
            epsilon_neighbor: 0.001,
            alpha: 0.5,
            beta: 0.995,
            decay_mode: "multiplicative".to_string(),
            decay_shift: 8,
            max_age: 50,
            seed_a: vec![0.2, 0.2],
            seed_b: vec![0.8, 0.8],
        }
    }
}

impl EngineConfig {
    /// Convert to validated fixed-point engine parameters.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if a seed has the wrong dimensionality or is out of
    /// Q16.16 range, or if the converted parameters fail engine validation.
    pub fn to_params<const D: usize>(&self) -> ConfigResult<EngineParams<D>> {
        let decay = match self.decay_mode.as_str() {
            "multiplicative" => ErrorDecayMode::Multiplicative {
                beta: Fraction::from_f64(self.beta),
            },
            "shift" => ErrorDecayMode::ShiftApproximation {
                shift: self.decay_shift,
            },
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "engine.decay_mode '{}' must be 'multiplicative' or 'shift'",
                    other
                )))
            }
        };
        let max_age = u8::try_from(self.max_age).map_err(|_| {
            ConfigError::InvalidValue(format!("engine.max_age {} exceeds 255", self.max_age))
        })?;

        let params = EngineParams {
            lambda: self.lambda,
            winner_rate: LearningRate::from_fraction(self.epsilon_winner, RATE_SHIFT),
            neighbor_rate: LearningRate::from_fraction(self.epsilon_neighbor, RATE_SHIFT),
            alpha: Fraction::from_f64(self.alpha),
            decay,
            max_age,
            seeds: [
                seed_point("engine.seed_a", &self.seed_a)?,
                seed_point("engine.seed_b", &self.seed_b)?,
            ],
        };
        params
            .validate()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        Ok(params)
    }

    /// Reject a file whose capacity disagrees with the compiled arena.
    pub fn check_capacity<const N: usize, const E: usize>(&self) -> ConfigResult<()> {
        if self.max_nodes != N || self.max_edges != E {
            return Err(ConfigError::CapacityMismatch {
                configured_nodes: self.max_nodes,
                configured_edges: self.max_edges,
                compiled_nodes: N,
                compiled_edges: E,
            });
        }
        Ok(())
    }
}

fn seed_point<const D: usize>(field: &str, axes: &[f64]) -> ConfigResult<Point<D>> {
    let axes: [f64; D] = axes.try_into().map_err(|_| {
        ConfigError::InvalidValue(format!(
            "{} has {} coordinates, expected {}",
            field,
            axes.len(),
            D
        ))
    })?;
    let (point, clamped) = Point::from_f64_checked(axes);
    if clamped {
        return Err(ConfigError::InvalidValue(format!(
            "{} is outside the Q16.16 range",
            field
        )));
    }
    Ok(point)
}

/// Host-side training run
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub max_steps: u64,
    /// JSON file of `[[x, y], ...]` samples
    pub samples_path: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            samples_path: PathBuf::from("samples.json"),
        }
    }
}

/// Periodic graph export
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// 0 disables export
    pub every_n_steps: u64,
    /// "json" (one line per snapshot) or "pretty"
    pub format: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            every_n_steps: 100,
            format: "json".to_string(),
        }
    }
}

impl SnapshotConfig {
    pub fn is_pretty(&self) -> bool {
        self.format == "pretty"
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_converts_to_reference_params() {
        let params = EngineConfig::default().to_params::<2>().unwrap();
        assert_eq!(params, EngineParams::default());
    }

    #[test]
    fn test_parse_toml_sections() {
        let toml_src = r#"
            [engine]
            lambda = 50
            max_age = 30
            decay_mode = "shift"
            decay_shift = 7
            seed_a = [0.0, 0.0]
            seed_b = [1.0, 1.0]

            [snapshot]
            every_n_steps = 25
            format = "pretty"
        "#;
        let config: GngConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.engine.lambda, 50);
        assert_eq!(config.engine.max_nodes, 40);
        assert!(config.snapshot.is_pretty());
        assert_eq!(config.training.max_steps, 10_000);

        let params = config.engine.to_params::<2>().unwrap();
        assert_eq!(params.max_age, 30);
        assert_eq!(params.decay, ErrorDecayMode::ShiftApproximation { shift: 7 });
    }

    #[test]
    fn test_seed_dimension_mismatch() {
        let config = EngineConfig {
            seed_a: vec![0.1, 0.2, 0.3],
            ..EngineConfig::default()
        };
        let err = config.to_params::<2>().unwrap_err();
        assert!(err.to_string().contains("engine.seed_a"));
        assert!(config.to_params::<3>().is_err());
    }

    #[test]
    fn test_engine_rejects_slow_winner() {
        let config = EngineConfig {
            epsilon_winner: 0.001,
            epsilon_neighbor: 0.3,
            ..EngineConfig::default()
        };
        assert!(matches!(config.to_params::<2>(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_check_capacity() {
        let config = EngineConfig::default();
        assert!(config.check_capacity::<40, 780>().is_ok());
        assert!(matches!(
            config.check_capacity::<16, 120>(),
            Err(ConfigError::CapacityMismatch { compiled_nodes: 16, .. })
        ));
    }
}
