// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sample-driven training loop
//!
//! The loop is synchronous: it polls a [`SampleSource`], runs one engine
//! step per sample and, on the configured cadence, hands the arena to a
//! [`SnapshotSink`] between steps. A host stops it by simply not calling
//! [`TrainingLoop::tick`] again, or by bounding [`TrainingLoop::run`].

use crate::engine::{GngEngine, StepReport};
use crate::fixed::Point;
use crate::snapshot::SnapshotSink;

/// Supplies samples one at a time
pub trait SampleSource<const D: usize> {
    /// Next sample, or `None` if none is available yet
    fn poll_sample(&mut self) -> Option<Point<D>>;
}

/// Repeats a fixed sample sequence forever, wrapping to the beginning
#[derive(Debug, Clone)]
pub struct CyclicSamples<'a, const D: usize> {
    samples: &'a [Point<D>],
    cursor: usize,
    passes: u64,
}

impl<'a, const D: usize> CyclicSamples<'a, D> {
    pub fn new(samples: &'a [Point<D>]) -> Self {
        Self {
            samples,
            cursor: 0,
            passes: 0,
        }
    }

    /// Completed passes over the sequence
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl<const D: usize> SampleSource<D> for CyclicSamples<'_, D> {
    fn poll_sample(&mut self) -> Option<Point<D>> {
        let sample = *self.samples.get(self.cursor)?;
        self.cursor += 1;
        if self.cursor == self.samples.len() {
            self.cursor = 0;
            self.passes += 1;
        }
        Some(sample)
    }
}

/// How often to publish a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotPolicy {
    /// 0 disables publishing
    pub every_n_steps: u64,
}

impl SnapshotPolicy {
    pub const fn every(every_n_steps: u64) -> Self {
        Self { every_n_steps }
    }

    pub const fn disabled() -> Self {
        Self { every_n_steps: 0 }
    }

    pub const fn is_due(&self, step: u64) -> bool {
        self.every_n_steps != 0 && step % self.every_n_steps == 0
    }
}

impl Default for SnapshotPolicy {
    /// Every 100 steps
    fn default() -> Self {
        Self::every(100)
    }
}

/// A sink that drops every snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl<const N: usize, const E: usize, const D: usize> SnapshotSink<N, E, D> for NullSink {
    fn publish(&mut self, _arena: &crate::arena::GraphArena<N, E, D>) {}
}

/// Result of one [`TrainingLoop::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The source had nothing yet; no state changed
    Idle,
    Stepped {
        report: StepReport,
        published: bool,
    },
}

/// Totals for one [`TrainingLoop::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainingSummary {
    pub steps: u64,
    pub insertions: u64,
    pub degenerate_steps: u64,
    pub snapshots_published: u64,
    pub final_active_nodes: usize,
    pub final_active_edges: usize,
    /// The run ended early because the source ran dry
    pub source_exhausted: bool,
}

/// Drives an engine from a sample source
pub struct TrainingLoop<S, const N: usize, const E: usize, const D: usize> {
    engine: GngEngine<N, E, D>,
    source: S,
    policy: SnapshotPolicy,
}

impl<S, const N: usize, const E: usize, const D: usize> TrainingLoop<S, N, E, D>
where
    S: SampleSource<D>,
{
    pub fn new(engine: GngEngine<N, E, D>, source: S, policy: SnapshotPolicy) -> Self {
        Self {
            engine,
            source,
            policy,
        }
    }

    pub fn engine(&self) -> &GngEngine<N, E, D> {
        &self.engine
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_engine(self) -> GngEngine<N, E, D> {
        self.engine
    }

    /// Poll once; if a sample is available, run one step.
    pub fn tick(&mut self, sink: &mut dyn SnapshotSink<N, E, D>) -> Tick {
        let Some(sample) = self.source.poll_sample() else {
            return Tick::Idle;
        };
        let report = self.engine.step(&sample);
        let published = self.policy.is_due(report.step);
        if published {
            sink.publish(self.engine.arena());
        }
        Tick::Stepped { report, published }
    }

    /// Run up to `max_steps` steps, stopping early if the source returns `None`.
    pub fn run(&mut self, max_steps: u64, sink: &mut dyn SnapshotSink<N, E, D>) -> TrainingSummary {
        let mut summary = TrainingSummary::default();
        while summary.steps < max_steps {
            match self.tick(sink) {
                Tick::Idle => {
                    summary.source_exhausted = true;
                    break;
                }
                Tick::Stepped { report, published } => {
                    summary.steps += 1;
                    if report.inserted_node().is_some() {
                        summary.insertions += 1;
                    }
                    if report.is_degenerate() {
                        summary.degenerate_steps += 1;
                    }
                    if published {
                        summary.snapshots_published += 1;
                    }
                }
            }
        }
        summary.final_active_nodes = self.engine.arena().active_count();
        summary.final_active_edges = self.engine.arena().active_edge_count();
        tracing::debug!(
            "Training run finished: {} steps, {} insertions, {} active nodes",
            summary.steps,
            summary.insertions,
            summary.final_active_nodes
        );
        summary
    }
}
