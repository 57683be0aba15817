// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # GNG Core
//!
//! Fixed-point, allocation-free Growing Neural Gas for embedded targets.
//!
//! ## Features
//! - `no_std` compatible; all state lives in const-generic arrays
//! - Q16.16 arithmetic only, saturating instead of wrapping
//! - One-pass winner-local aging, adaptation and pruning
//! - Deterministic: same parameters and samples give bit-identical state
//!
//! ## Usage
//! ```rust
//! use gng_core::{CyclicSamples, EngineParams, GngEngine, NullSink, SnapshotPolicy, TrainingLoop};
//! use gng_core::fixed::Point2;
//!
//! let samples = [Point2::xy(0.1, 0.1), Point2::xy(0.9, 0.9), Point2::xy(0.5, 0.2)];
//! let engine = GngEngine::<40, 780, 2>::new(EngineParams::default()).unwrap();
//! let mut training = TrainingLoop::new(engine, CyclicSamples::new(&samples), SnapshotPolicy::disabled());
//!
//! let summary = training.run(300, &mut NullSink);
//! assert_eq!(summary.steps, 300);
//! assert!(summary.final_active_nodes >= 2);
//! ```
//!
//! ## Feature flags
//! - `std` (default): serde support, owned [`snapshot::GraphSnapshot`] with JSON export

#![no_std]

#[cfg(feature = "std")]
extern crate std;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod arena;
pub mod decay;
pub mod edge;
pub mod engine;
pub mod error;
pub mod fixed;
pub mod fused;
pub mod insertion;
pub mod metrics;
pub mod snapshot;
pub mod topology;
pub mod training;
pub mod winner;

pub use arena::{Arena2, GraphArena, InvariantViolation};
pub use decay::ErrorDecayMode;
pub use edge::EdgeCode;
pub use engine::{EngineCounters, EngineParams, GngEngine, StepPhase, StepReport};
pub use error::{EngineError, FaultCounters, FaultSet, Result, SoftFault};
pub use fixed::{Fixed, Fraction, LearningRate, Point, Point2};
pub use snapshot::{EdgeRecord, NodeRecord, SnapshotSink};
pub use training::{
    CyclicSamples, NullSink, SampleSource, SnapshotPolicy, Tick, TrainingLoop, TrainingSummary,
};

#[cfg(feature = "std")]
pub use snapshot::{GraphSnapshot, JsonSnapshotWriter};
