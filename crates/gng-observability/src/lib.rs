// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # gng-observability
//!
//! Logging setup shared by the GNG host tools.
//!
//! Provides consistent `tracing` initialization with per-crate debug flag
//! support (`--debug-gng-core`, `--debug-all`, `GNG_DEBUG`).

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &["gng-core", "gng-config", "gng-observability", "gng"];
