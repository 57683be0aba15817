// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every check runs and every problem is collected, so a single load
//! reports all mistakes in the file at once.

use crate::{ConfigError, ConfigResult, GngConfig};
use gng_core::arena::MAX_NODE_CAPACITY;
use gng_core::edge::half_adjacency_len;
use gng_core::engine::MAX_CONFIGURABLE_AGE;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    OutOfRange { field: String, reason: String },
    Inconsistent { fields: String, reason: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { field, reason } => {
                write!(f, "{} is out of range: {}", field, reason)
            }
            Self::Inconsistent { fields, reason } => {
                write!(f, "Inconsistent settings {}: {}", fields, reason)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Capacity (node range, edge table size)
/// - Learning parameters and their fixed-point precision
/// - Seeds
/// - Enumerated string values
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &GngConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_capacity(config, &mut errors);
    validate_learning(config, &mut errors);
    validate_seeds(config, &mut errors);
    validate_enums(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_capacity(config: &GngConfig, errors: &mut Vec<ConfigValidationError>) {
    let engine = &config.engine;
    if !(2..=MAX_NODE_CAPACITY).contains(&engine.max_nodes) {
        errors.push(ConfigValidationError::OutOfRange {
            field: "engine.max_nodes".to_string(),
            reason: format!("must be between 2 and {}", MAX_NODE_CAPACITY),
        });
    }
    let expected = half_adjacency_len(engine.max_nodes);
    if engine.max_edges != expected {
        errors.push(ConfigValidationError::Inconsistent {
            fields: "engine.max_nodes / engine.max_edges".to_string(),
            reason: format!(
                "{} nodes need {} edge cells, got {}",
                engine.max_nodes, expected, engine.max_edges
            ),
        });
    }
}

/// Smallest positive rate representable with the 16-bit rate shift
fn representable_rate(value: f64) -> bool {
    value * 65536.0 >= 1.0
}

fn validate_learning(config: &GngConfig, errors: &mut Vec<ConfigValidationError>) {
    let engine = &config.engine;

    if engine.lambda == 0 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "engine.lambda".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    for (field, value) in [
        ("engine.epsilon_winner", engine.epsilon_winner),
        ("engine.epsilon_neighbor", engine.epsilon_neighbor),
    ] {
        if !(value > 0.0 && value <= 1.0) {
            errors.push(ConfigValidationError::OutOfRange {
                field: field.to_string(),
                reason: "must be in (0.0, 1.0]".to_string(),
            });
        } else if !representable_rate(value) {
            errors.push(ConfigValidationError::InvalidValue {
                field: field.to_string(),
                reason: "rounds to zero at 1/65536 precision".to_string(),
            });
        }
    }

    if engine.epsilon_neighbor >= engine.epsilon_winner {
        errors.push(ConfigValidationError::Inconsistent {
            fields: "engine.epsilon_neighbor / engine.epsilon_winner".to_string(),
            reason: "neighbor rate must be smaller than winner rate".to_string(),
        });
    }

    if !(0.0..=1.0).contains(&engine.alpha) {
        errors.push(ConfigValidationError::OutOfRange {
            field: "engine.alpha".to_string(),
            reason: "must be between 0.0 and 1.0".to_string(),
        });
    }

    if !(engine.beta > 0.0 && engine.beta <= 1.0) {
        errors.push(ConfigValidationError::OutOfRange {
            field: "engine.beta".to_string(),
            reason: "must be in (0.0, 1.0]".to_string(),
        });
    }

    if engine.max_age > MAX_CONFIGURABLE_AGE as u32 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "engine.max_age".to_string(),
            reason: format!("must be at most {}", MAX_CONFIGURABLE_AGE),
        });
    }

    if engine.decay_mode == "shift" && !(1..=31).contains(&engine.decay_shift) {
        errors.push(ConfigValidationError::OutOfRange {
            field: "engine.decay_shift".to_string(),
            reason: "must be between 1 and 31".to_string(),
        });
    }
}

fn validate_seeds(config: &GngConfig, errors: &mut Vec<ConfigValidationError>) {
    let engine = &config.engine;
    for (field, seed) in [("engine.seed_a", &engine.seed_a), ("engine.seed_b", &engine.seed_b)] {
        if seed.is_empty() {
            errors.push(ConfigValidationError::InvalidValue {
                field: field.to_string(),
                reason: "must have at least one coordinate".to_string(),
            });
        }
        if seed.iter().any(|v| !v.is_finite() || v.abs() >= 32768.0) {
            errors.push(ConfigValidationError::OutOfRange {
                field: field.to_string(),
                reason: "coordinates must be finite and within ±32768".to_string(),
            });
        }
    }
    if engine.seed_a.len() != engine.seed_b.len() {
        errors.push(ConfigValidationError::Inconsistent {
            fields: "engine.seed_a / engine.seed_b".to_string(),
            reason: "seeds must have the same dimensionality".to_string(),
        });
    }
}

fn validate_enums(config: &GngConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.engine.decay_mode != "multiplicative" && config.engine.decay_mode != "shift" {
        errors.push(ConfigValidationError::InvalidValue {
            field: "engine.decay_mode".to_string(),
            reason: "must be 'multiplicative' or 'shift'".to_string(),
        });
    }
    if config.snapshot.format != "json" && config.snapshot.format != "pretty" {
        errors.push(ConfigValidationError::InvalidValue {
            field: "snapshot.format".to_string(),
            reason: "must be 'json' or 'pretty'".to_string(),
        });
    }
    if config.logging.format != "text" && config.logging.format != "json" {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.format".to_string(),
            reason: "must be 'text' or 'json'".to_string(),
        });
    }
    if !LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }
}
