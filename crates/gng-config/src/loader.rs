// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, GngConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "gng_configuration.toml";

/// Find the GNG configuration file
///
/// Search order:
/// 1. `GNG_CONFIG_PATH` environment variable
/// 2. Current working directory: `./gng_configuration.toml`
/// 3. Up to five parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("GNG_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by GNG_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        search_paths.extend(
            cwd.ancestors()
                .skip(1)
                .take(5)
                .map(|dir| dir.join(CONFIG_FILE_NAME)),
        );
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "GNG configuration file '{}' not found in any of these locations:\n{}\n\nSet GNG_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Call [`crate::validate_config`] on the result before using it.
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<GngConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: GngConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply one `key -> value` override. Unparseable values are ignored.
fn apply_override(config: &mut GngConfig, key: &str, value: &str) {
    match key {
        "lambda" => {
            if let Ok(v) = value.parse() {
                config.engine.lambda = v;
            }
        }
        "max_age" => {
            if let Ok(v) = value.parse() {
                config.engine.max_age = v;
            }
        }
        "epsilon_winner" => {
            if let Ok(v) = value.parse() {
                config.engine.epsilon_winner = v;
            }
        }
        "epsilon_neighbor" => {
            if let Ok(v) = value.parse() {
                config.engine.epsilon_neighbor = v;
            }
        }
        "alpha" => {
            if let Ok(v) = value.parse() {
                config.engine.alpha = v;
            }
        }
        "beta" => {
            if let Ok(v) = value.parse() {
                config.engine.beta = v;
            }
        }
        "decay_mode" => config.engine.decay_mode = value.to_lowercase(),
        "max_steps" => {
            if let Ok(v) = value.parse() {
                config.training.max_steps = v;
            }
        }
        "samples_path" => config.training.samples_path = PathBuf::from(value),
        "snapshot_every" => {
            if let Ok(v) = value.parse() {
                config.snapshot.every_n_steps = v;
            }
        }
        "snapshot_format" => config.snapshot.format = value.to_lowercase(),
        "log_level" => config.logging.level = value.to_lowercase(),
        "log_format" => config.logging.format = value.to_lowercase(),
        _ => {}
    }
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `GNG_LAMBDA` -> `engine.lambda`
/// - `GNG_MAX_AGE` -> `engine.max_age`
/// - `GNG_EPSILON_WINNER` -> `engine.epsilon_winner`
/// - `GNG_EPSILON_NEIGHBOR` -> `engine.epsilon_neighbor`
/// - `GNG_ALPHA` -> `engine.alpha`
/// - `GNG_BETA` -> `engine.beta`
/// - `GNG_MAX_STEPS` -> `training.max_steps`
/// - `GNG_SAMPLES_PATH` -> `training.samples_path`
/// - `GNG_SNAPSHOT_EVERY` -> `snapshot.every_n_steps`
/// - `GNG_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut GngConfig) {
    const ENV_KEYS: [(&str, &str); 10] = [
        ("GNG_LAMBDA", "lambda"),
        ("GNG_MAX_AGE", "max_age"),
        ("GNG_EPSILON_WINNER", "epsilon_winner"),
        ("GNG_EPSILON_NEIGHBOR", "epsilon_neighbor"),
        ("GNG_ALPHA", "alpha"),
        ("GNG_BETA", "beta"),
        ("GNG_MAX_STEPS", "max_steps"),
        ("GNG_SAMPLES_PATH", "samples_path"),
        ("GNG_SNAPSHOT_EVERY", "snapshot_every"),
        ("GNG_LOG_LEVEL", "log_level"),
    ];
    for (var, key) in ENV_KEYS {
        if let Ok(value) = env::var(var) {
            apply_override(config, key, &value);
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// Keys match the environment variables without the `GNG_` prefix, in
/// lower case (e.g. `{"lambda": "50", "log_level": "debug"}`), plus
/// `decay_mode`, `snapshot_format` and `log_format`.
pub fn apply_cli_overrides(config: &mut GngConfig, cli_args: &HashMap<String, String>) {
    for (key, value) in cli_args {
        apply_override(config, key, value);
    }
}
