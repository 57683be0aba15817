// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Observability configuration types

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Observability configuration errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ObservabilityError {
    #[error("Unknown log format '{0}' (expected 'text' or 'json')")]
    UnknownFormat(String),

    #[error("Unknown log level '{0}' (expected trace, debug, info, warn or error)")]
    UnknownLevel(String),
}

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ObservabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ObservabilityError::UnknownFormat(s.to_string())),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text or json)
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: &str, format: LogFormat) -> Self {
        Self {
            level: level.to_string(),
            format,
        }
    }

    /// Parsed base level
    pub fn level(&self) -> Result<tracing::Level, ObservabilityError> {
        tracing::Level::from_str(self.level.trim())
            .map_err(|_| ObservabilityError::UnknownLevel(self.level.clone()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("text".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert_eq!(
            "xml".parse::<LogFormat>(),
            Err(ObservabilityError::UnknownFormat("xml".to_string()))
        );
    }

    #[test]
    fn test_level() {
        assert_eq!(LoggingConfig::default().level(), Ok(tracing::Level::INFO));
        assert_eq!(
            LoggingConfig::new("DEBUG", LogFormat::Json).level(),
            Ok(tracing::Level::DEBUG)
        );
        assert!(LoggingConfig::new("loud", LogFormat::Text).level().is_err());
    }
}
