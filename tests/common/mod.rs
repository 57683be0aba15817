// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for the scenario tests

#![allow(dead_code)]

use gng::Point2;

/// Deterministic samples in the unit square (64-bit LCG)
pub fn unit_square_samples(count: usize, seed: u64) -> Vec<Point2> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) as f64) / ((1u64 << 31) as f64)
    };
    (0..count).map(|_| Point2::xy(next(), next())).collect()
}

/// Samples on a ring of radius 0.4 around (0.5, 0.5)
pub fn ring_samples(count: usize) -> Vec<Point2> {
    (0..count)
        .map(|k| {
            let theta = (k as f64) * 2.399963229728653;
            Point2::xy(0.5 + 0.4 * theta.cos(), 0.5 + 0.4 * theta.sin())
        })
        .collect()
}
