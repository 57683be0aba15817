// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! One training step, end to end
//!
//! [`GngEngine`] owns the arena and the validated parameters and drives the
//! components in a fixed order for every sample:
//!
//! ```text
//! AwaitingSample → Searching → AccumulatingError → FusedUpdate
//!   → MovingWinner → ConnectingTopology → (MaybeInserting) → Decaying
//!   → AwaitingSample
//! ```
//!
//! A degenerate network (fewer than two active nodes) goes straight from
//! `Searching` back to `AwaitingSample`; the sample is consumed and the step
//! counter still advances.

use crate::arena::GraphArena;
use crate::decay::{self, ErrorDecayMode};
use crate::edge::EdgeCode;
use crate::error::{EngineError, FaultCounters, FaultSet, Result, SoftFault};
use crate::fixed::{Fraction, LearningRate, Point, Point2};
use crate::fused::{age_adapt_prune, FusedUpdateSummary};
use crate::insertion::{insert_node, is_due, InsertionOutcome};
use crate::topology::{connect_or_reset, ConnectOutcome};
use crate::winner::{find_winners, Winners};

/// Largest configurable `max_age`; the saturated code (age 254) must still exceed it.
pub const MAX_CONFIGURABLE_AGE: u8 = EdgeCode::MAX_AGE - 1;

/// Shift used when converting real learning rates
pub const RATE_SHIFT: u8 = 16;

/// Validated, fixed-point engine parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineParams<const D: usize> {
    /// Insertion interval in steps
    pub lambda: u32,
    pub winner_rate: LearningRate,
    /// Must be strictly slower than `winner_rate`
    pub neighbor_rate: LearningRate,
    /// Error scale applied to `q` and `f` at insertion
    pub alpha: Fraction,
    pub decay: ErrorDecayMode,
    /// Edges older than this are pruned
    pub max_age: u8,
    pub seeds: [Point<D>; 2],
}

impl<const D: usize> EngineParams<D> {
    /// Reference parameters (λ = 100, ε_b = 0.3, ε_n = 0.001, α = 0.5,
    /// β = 0.995, A_max = 50) around the given seeds.
    pub fn reference(seeds: [Point<D>; 2]) -> Self {
        Self {
            lambda: 100,
            winner_rate: LearningRate::from_fraction(0.3, RATE_SHIFT),
            neighbor_rate: LearningRate::from_fraction(0.001, RATE_SHIFT),
            alpha: Fraction::HALF,
            decay: ErrorDecayMode::reference(),
            max_age: 50,
            seeds,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.lambda == 0 {
            return Err(EngineError::InvalidParameters("lambda must be at least 1"));
        }
        if !self.winner_rate.is_valid() {
            return Err(EngineError::InvalidParameters(
                "winner learning rate must be in (0, 1]",
            ));
        }
        if !self.neighbor_rate.is_valid() {
            return Err(EngineError::InvalidParameters(
                "neighbor learning rate must be in (0, 1]",
            ));
        }
        if !self.neighbor_rate.is_slower_than(&self.winner_rate) {
            return Err(EngineError::InvalidParameters(
                "neighbor learning rate must be smaller than the winner rate",
            ));
        }
        if self.max_age > MAX_CONFIGURABLE_AGE {
            return Err(EngineError::InvalidParameters("max_age must be at most 253"));
        }
        if let ErrorDecayMode::ShiftApproximation { shift } = self.decay {
            if shift == 0 || shift > 31 {
                return Err(EngineError::InvalidParameters(
                    "decay shift must be in 1..=31",
                ));
            }
        }
        Ok(())
    }
}

impl Default for EngineParams<2> {
    fn default() -> Self {
        Self::reference([Point2::xy(0.2, 0.2), Point2::xy(0.8, 0.8)])
    }
}

/// Position within one training step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepPhase {
    #[default]
    AwaitingSample,
    Searching,
    AccumulatingError,
    FusedUpdate,
    MovingWinner,
    ConnectingTopology,
    MaybeInserting,
    Decaying,
}

impl StepPhase {
    /// Whether `next` may follow `self`
    pub fn can_transition_to(&self, next: StepPhase) -> bool {
        use StepPhase::*;
        matches!(
            (self, next),
            (AwaitingSample, Searching)
                | (Searching, AccumulatingError)
                | (Searching, AwaitingSample)
                | (AccumulatingError, FusedUpdate)
                | (FusedUpdate, MovingWinner)
                | (MovingWinner, ConnectingTopology)
                | (ConnectingTopology, MaybeInserting)
                | (ConnectingTopology, Decaying)
                | (MaybeInserting, Decaying)
                | (Decaying, AwaitingSample)
        )
    }
}

/// What happened during one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// Step number after this step (1-based)
    pub step: u64,
    /// `None` on a degenerate step
    pub winners: Option<Winners>,
    pub fused: FusedUpdateSummary,
    pub connection: ConnectOutcome,
    /// `None` when this step was not an insertion boundary
    pub insertion: Option<InsertionOutcome>,
    pub faults: FaultSet,
}

impl StepReport {
    fn degenerate(step: u64) -> Self {
        let mut faults = FaultSet::empty();
        faults.insert(SoftFault::DegenerateNetwork);
        Self {
            step,
            winners: None,
            fused: FusedUpdateSummary::default(),
            connection: ConnectOutcome::Ignored,
            insertion: None,
            faults,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.winners.is_none()
    }

    pub fn inserted_node(&self) -> Option<usize> {
        self.insertion.and_then(|outcome| outcome.inserted_node())
    }
}

/// Cumulative counters since construction or the last reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineCounters {
    pub steps: u64,
    pub degenerate_steps: u64,
    pub insertions: u64,
    pub edges_created: u64,
    pub edges_pruned: u64,
    pub nodes_removed: u64,
    pub faults: FaultCounters,
}

impl EngineCounters {
    fn record(&mut self, report: &StepReport) {
        self.steps += 1;
        if report.is_degenerate() {
            self.degenerate_steps += 1;
        }
        if report.inserted_node().is_some() {
            self.insertions += 1;
        }
        if report.connection == ConnectOutcome::Created {
            self.edges_created += 1;
        }
        self.edges_pruned += report.fused.edges_pruned as u64;
        self.nodes_removed += report.fused.nodes_removed as u64;
        self.faults.record(&report.faults);
    }
}

/// Online learning engine over a static arena
///
/// # Example
/// ```
/// use gng_core::{EngineParams, GngEngine};
/// use gng_core::fixed::Point2;
///
/// let mut engine = GngEngine::<8, 28, 2>::new(EngineParams::default()).unwrap();
/// let report = engine.step(&Point2::xy(0.5, 0.5));
/// assert_eq!(report.step, 1);
/// assert_eq!(engine.arena().active_edge_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GngEngine<const N: usize, const E: usize, const D: usize> {
    arena: GraphArena<N, E, D>,
    params: EngineParams<D>,
    counters: EngineCounters,
    phase: StepPhase,
}

impl<const N: usize, const E: usize, const D: usize> GngEngine<N, E, D> {
    /// Validate parameters and capacity, then seed the arena.
    pub fn new(params: EngineParams<D>) -> Result<Self> {
        params.validate()?;
        let mut arena = GraphArena::new()?;
        arena.seed(params.seeds[0], params.seeds[1]);

        tracing::info!(
            "GNG engine initialized: {} node slots, {} edge cells, {} dims, lambda={}, max_age={}, {} bytes",
            N,
            E,
            D,
            params.lambda,
            params.max_age,
            GraphArena::<N, E, D>::memory_footprint()
        );

        Ok(Self {
            arena,
            params,
            counters: EngineCounters::default(),
            phase: StepPhase::AwaitingSample,
        })
    }

    pub fn arena(&self) -> &GraphArena<N, E, D> {
        &self.arena
    }

    pub fn params(&self) -> &EngineParams<D> {
        &self.params
    }

    pub fn counters(&self) -> &EngineCounters {
        &self.counters
    }

    /// Always `AwaitingSample` between calls to [`GngEngine::step`]
    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    /// Re-seed the arena and clear the counters. Parameters are kept.
    pub fn reset(&mut self) {
        self.arena.seed(self.params.seeds[0], self.params.seeds[1]);
        self.counters = EngineCounters::default();
        self.phase = StepPhase::AwaitingSample;
    }

    /// Owned copy of the current graph
    #[cfg(feature = "std")]
    pub fn snapshot(&self) -> crate::snapshot::GraphSnapshot {
        crate::snapshot::GraphSnapshot::capture(&self.arena)
    }

    fn enter(&mut self, next: StepPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal step transition {:?} -> {:?}",
            self.phase,
            next
        );
        self.phase = next;
    }

    /// Process one sample to completion.
    pub fn step(&mut self, sample: &Point<D>) -> StepReport {
        self.enter(StepPhase::Searching);
        let winners = match find_winners(&self.arena, sample) {
            Ok(winners) => winners,
            Err(_) => {
                let step = self.arena.advance_step();
                tracing::trace!(
                    "Step {} skipped: {} active nodes",
                    step,
                    self.arena.active_count()
                );
                let report = StepReport::degenerate(step);
                self.counters.record(&report);
                self.enter(StepPhase::AwaitingSample);
                return report;
            }
        };
        let Winners { s1, d1, s2, .. } = winners;
        let mut faults = FaultSet::empty();
        let mut saturated = false;

        self.enter(StepPhase::AccumulatingError);
        saturated |= self.arena.accumulate_error(s1, d1);

        self.enter(StepPhase::FusedUpdate);
        let fused = age_adapt_prune(
            &mut self.arena,
            s1,
            sample,
            self.params.neighbor_rate,
            self.params.max_age,
        );
        saturated |= fused.saturated;

        self.enter(StepPhase::MovingWinner);
        saturated |= self.arena.move_toward(s1, sample, self.params.winner_rate);

        self.enter(StepPhase::ConnectingTopology);
        let connection = connect_or_reset(&mut self.arena, s1, s2);

        let step = self.arena.advance_step();
        let insertion = if is_due(step, self.params.lambda) {
            self.enter(StepPhase::MaybeInserting);
            let outcome = insert_node(&mut self.arena, self.params.alpha);
            match outcome {
                InsertionOutcome::Inserted { saturated: hit, .. } => saturated |= hit,
                InsertionOutcome::Skipped(fault) => faults.insert(fault),
            }
            Some(outcome)
        } else {
            None
        };

        self.enter(StepPhase::Decaying);
        decay::apply_to_all(&mut self.arena, self.params.decay);

        if saturated {
            faults.insert(SoftFault::ArithmeticSaturation);
        }
        let report = StepReport {
            step,
            winners: Some(winners),
            fused,
            connection,
            insertion,
            faults,
        };
        self.counters.record(&report);
        self.enter(StepPhase::AwaitingSample);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{squared_distance, Fixed};

    type Engine = GngEngine<8, 28, 2>;

    fn params() -> EngineParams<2> {
        EngineParams::default()
    }

    #[test]
    fn test_reference_params() {
        let p = params();
        assert_eq!(p.winner_rate.numerator, 19660);
        assert_eq!(p.neighbor_rate.numerator, 65);
        assert_eq!(p.alpha.raw(), 32768);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_params() {
        let mut p = params();
        p.lambda = 0;
        assert!(matches!(p.validate(), Err(EngineError::InvalidParameters(_))));

        let mut p = params();
        p.neighbor_rate = p.winner_rate;
        assert!(p.validate().is_err());

        let mut p = params();
        p.max_age = 254;
        assert!(p.validate().is_err());

        let mut p = params();
        p.winner_rate = LearningRate::new(3, 1);
        assert!(p.validate().is_err());

        let mut p = params();
        p.decay = ErrorDecayMode::ShiftApproximation { shift: 0 };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_new_rejects_capacity_mismatch() {
        assert!(matches!(
            GngEngine::<8, 27, 2>::new(params()),
            Err(EngineError::EdgeCapacityMismatch { expected: 28, actual: 27 })
        ));
    }

    #[test]
    fn test_phase_transitions() {
        use StepPhase::*;
        assert!(AwaitingSample.can_transition_to(Searching));
        assert!(Searching.can_transition_to(AwaitingSample));
        assert!(ConnectingTopology.can_transition_to(Decaying));
        assert!(!AwaitingSample.can_transition_to(FusedUpdate));
        assert!(!Decaying.can_transition_to(Searching));
        assert!(!MovingWinner.can_transition_to(FusedUpdate));
    }

    #[test]
    fn test_first_step_connects_seeds() {
        let mut engine = Engine::new(params()).unwrap();
        let report = engine.step(&Point2::xy(0.3, 0.3));
        assert_eq!(report.step, 1);
        let winners = report.winners.unwrap();
        assert_eq!((winners.s1, winners.s2), (0, 1));
        assert_eq!(report.connection, ConnectOutcome::Created);
        assert!(report.faults.is_empty());
        assert_eq!(engine.phase(), StepPhase::AwaitingSample);
        assert!(engine.arena().error_of(0) > 0);
        assert!(engine.arena().check_invariants().is_ok());
    }

    #[test]
    fn test_winner_moves_toward_sample() {
        let mut engine = Engine::new(params()).unwrap();
        let before = engine.arena().position_of(0).unwrap().to_f64();
        engine.step(&Point2::xy(0.0, 0.0));
        let after = engine.arena().position_of(0).unwrap().to_f64();
        assert!(after[0] < before[0]);
        assert!((after[0] - 0.14).abs() < 1e-3);
    }

    #[test]
    fn test_error_uses_pre_move_distance() {
        let seed = Point2::xy(0.25, 0.25);
        let mut p = EngineParams::reference([seed, Point2::xy(0.75, 0.75)]);
        p.decay = ErrorDecayMode::Multiplicative { beta: Fraction::ONE };
        let mut engine = Engine::new(p).unwrap();

        // distance² 1.0 to node 0 and 2.5 to node 1, both exact in Q16.16
        let sample = Point2::xy(-0.75, 0.25);
        let expected = (squared_distance(&seed, &sample) >> 16) as u32;
        let report = engine.step(&sample);

        assert_eq!(report.winners.unwrap().s1, 0);
        assert_eq!(expected, Fixed::ONE.raw() as u32);
        assert_eq!(engine.arena().error_of(0), expected);
        assert_eq!(engine.arena().error_of(1), 0);
        // the winner did move, so the error cannot come from the new position
        assert_ne!(engine.arena().position_of(0), Some(&seed));
    }

    #[test]
    fn test_degenerate_step_consumes_sample() {
        let mut p = params();
        p.max_age = 0;
        let mut engine = Engine::new(p).unwrap();
        engine.step(&Point2::xy(0.2, 0.2));
        // the (0,1) edge ages past 0 on the next win and both seeds are released
        let report = engine.step(&Point2::xy(0.2, 0.2));
        assert_eq!(report.fused.edges_pruned, 1);
        assert_eq!(engine.arena().active_count(), 0);

        let report = engine.step(&Point2::xy(0.5, 0.5));
        assert!(report.is_degenerate());
        assert!(report.faults.contains(SoftFault::DegenerateNetwork));
        assert_eq!(report.step, 3);
        assert_eq!(engine.counters().degenerate_steps, 1);
        assert_eq!(engine.counters().steps, 3);
        assert_eq!(engine.phase(), StepPhase::AwaitingSample);
    }

    #[test]
    fn test_insertion_on_lambda_boundary() {
        let mut p = params();
        p.lambda = 3;
        let mut engine = Engine::new(p).unwrap();
        let samples = [Point2::xy(0.1, 0.1), Point2::xy(0.9, 0.9), Point2::xy(0.5, 0.5)];
        for (i, sample) in samples.iter().enumerate() {
            let report = engine.step(sample);
            if i < 2 {
                assert!(report.insertion.is_none());
            } else {
                assert_eq!(report.inserted_node(), Some(2));
            }
        }
        assert_eq!(engine.arena().active_count(), 3);
        assert_eq!(engine.counters().insertions, 1);
        assert!(engine.arena().check_invariants().is_ok());
    }

    #[test]
    fn test_reset() {
        let mut engine = Engine::new(params()).unwrap();
        engine.step(&Point2::xy(0.5, 0.5));
        engine.reset();
        assert_eq!(engine.arena().step_count(), 0);
        assert_eq!(engine.arena().active_edge_count(), 0);
        assert_eq!(engine.counters().steps, 0);
    }
}
