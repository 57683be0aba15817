// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # GNG - Online Growing Neural Gas
//!
//! An incremental topology-learning engine: it consumes a stream of
//! low-dimensional samples and maintains a graph of prototype nodes and aged
//! edges approximating the distribution's topology. All arithmetic is Q16.16
//! fixed point and all state lives in a statically sized arena.
//!
//! ## Feature Flags
//!
//! - **`std`** (default): owned snapshots, JSON export, serde derives
//! - **`host`** (default): TOML configuration ([`config`]) and logging setup
//!   ([`observability`])
//!
//! Embedded targets depend on `gng-core` directly with
//! `default-features = false`.
//!
//! ## Usage
//!
//! ```rust
//! use gng::prelude::*;
//!
//! let mut engine = GngEngine::<40, 780, 2>::new(EngineParams::default()).unwrap();
//! let sample = Point2::from_f64([0.5, 0.5]);
//! let report = engine.step(&sample);
//! assert_eq!(report.step, 1);
//! assert_eq!(engine.arena().active_count(), 2);
//! ```

/// Configuration loading and validation
#[cfg(feature = "host")]
pub use gng_config as config;

/// Logging initialization
#[cfg(feature = "host")]
pub use gng_observability as observability;

/// Engine (fixed point, arena, training loop, metrics)
pub use gng_core::*;

/// Version of the umbrella crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use gng_core::metrics::{evaluate, QualityReport};
    pub use gng_core::{
        Arena2, CyclicSamples, EdgeCode, EngineCounters, EngineError, EngineParams, ErrorDecayMode,
        Fixed, Fraction, GngEngine, GraphArena, LearningRate, Point, Point2, SampleSource,
        SnapshotPolicy, SnapshotSink, SoftFault, StepReport, TrainingLoop, TrainingSummary,
    };

    #[cfg(feature = "std")]
    pub use gng_core::{GraphSnapshot, JsonSnapshotWriter};
}
