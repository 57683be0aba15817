// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end growth scenarios driven through the public engine API.

mod common;

use gng::insertion::InsertionOutcome;
use gng::{EngineParams, GngEngine, Point2, SoftFault};

type Engine = GngEngine<40, 780, 2>;

fn reference_engine() -> Engine {
    Engine::new(EngineParams::reference([
        Point2::xy(0.2, 0.2),
        Point2::xy(0.8, 0.8),
    ]))
    .unwrap()
}

#[test]
fn test_first_insertion_at_lambda() {
    let mut engine = reference_engine();
    let samples = common::unit_square_samples(100, 7);

    let mut transitions = Vec::new();
    let mut previous = engine.arena().active_count();
    assert_eq!(previous, 2);

    for (k, sample) in samples.iter().enumerate() {
        let report = engine.step(sample);
        assert_eq!(report.step, k as u64 + 1);
        // Two connected seeds always win together, so neither is isolated.
        assert!(engine.arena().degree(0) > 0 && engine.arena().degree(1) > 0);

        let now = engine.arena().active_count();
        if now != previous {
            transitions.push((report.step, previous, now));
            previous = now;
        }
    }

    assert_eq!(transitions, vec![(100, 2, 3)]);
    assert_eq!(engine.counters().insertions, 1);
    assert_eq!(engine.arena().active_edge_count(), 2);
}

#[test]
fn test_insertion_correctness() {
    let mut engine = reference_engine();
    let samples = common::unit_square_samples(500, 11);

    let mut checked = 0;
    for sample in &samples {
        let report = engine.step(sample);
        if let Some(InsertionOutcome::Inserted { q, f, r, .. }) = report.insertion {
            let arena = engine.arena();
            assert!(arena.is_active(r));
            assert_eq!(arena.degree(r), 2);
            // Decay applies equally to both after insertion, so they stay equal.
            assert_eq!(arena.error_of(r), arena.error_of(q));
            assert!(!arena.edge(q, f).is_active());
            assert!(arena.edge(q, r).is_active());
            assert!(arena.edge(r, f).is_active());
            checked += 1;
        }
    }
    assert_eq!(checked, 5);
}

#[test]
fn test_growth_stops_at_capacity() {
    let mut params = EngineParams::reference([Point2::xy(0.2, 0.2), Point2::xy(0.8, 0.8)]);
    params.lambda = 5;
    let mut engine = GngEngine::<6, 15, 2>::new(params).unwrap();

    let mut exhausted = false;
    for sample in common::unit_square_samples(400, 3) {
        let report = engine.step(&sample);
        if report.insertion == Some(InsertionOutcome::Skipped(SoftFault::CapacityExhausted)) {
            exhausted = true;
            assert!(report.faults.contains(SoftFault::CapacityExhausted));
        }
        assert!(engine.arena().active_count() <= 6);
    }
    assert!(exhausted);
    assert!(engine.counters().faults.capacity_exhausted > 0);
}

#[test]
fn test_equidistant_seeds_pick_lower_index() {
    // Quarter points are exact in Q16.16, so both distances match bit for bit.
    let mut engine = Engine::new(EngineParams::reference([
        Point2::xy(0.25, 0.25),
        Point2::xy(0.75, 0.75),
    ]))
    .unwrap();
    let report = engine.step(&Point2::xy(0.5, 0.5));
    let winners = report.winners.unwrap();
    assert_eq!(winners.s1, 0);
    assert_eq!(winners.s2, 1);
    assert_eq!(winners.d1, winners.d2);
}

#[test]
fn test_ring_is_covered() {
    let mut engine = reference_engine();
    let samples = common::ring_samples(200);
    for k in 0..5_000 {
        engine.step(&samples[k % samples.len()]);
    }
    let arena = engine.arena();
    assert!(arena.active_count() > 10);
    assert!(arena.check_invariants().is_ok());

    let quality = gng::metrics::evaluate(arena, &samples).unwrap();
    assert!(quality.quantization_error.to_f64() < 0.15);
}
