// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Periodic node insertion
//!
//! Every `lambda` steps a node `r` is placed halfway between the node with
//! the largest accumulated error (`q`) and its worst neighbor (`f`). Edge
//! `(q, f)` is replaced by `(q, r)` and `(r, f)`. Each abort condition is a
//! soft fault: the insertion is skipped and retried at the next boundary.

use crate::arena::GraphArena;
use crate::error::SoftFault;
use crate::fixed::Fraction;
use crate::topology::{connect_or_reset, remove_edge};

/// Result of one insertion attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionOutcome {
    Inserted {
        q: usize,
        f: usize,
        r: usize,
        /// Midpoint clamped on at least one axis
        saturated: bool,
    },
    Skipped(SoftFault),
}

impl InsertionOutcome {
    pub fn inserted_node(&self) -> Option<usize> {
        match self {
            InsertionOutcome::Inserted { r, .. } => Some(*r),
            InsertionOutcome::Skipped(_) => None,
        }
    }
}

/// Whether step number `step` (1-based) is an insertion boundary
#[inline]
pub const fn is_due(step: u64, lambda: u32) -> bool {
    lambda != 0 && step != 0 && step % lambda as u64 == 0
}

/// Active node with the largest error; lowest index on ties.
pub fn highest_error_node<const N: usize, const E: usize, const D: usize>(
    arena: &GraphArena<N, E, D>,
) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for i in 0..N {
        if !arena.is_active(i) {
            continue;
        }
        let error = arena.error_of(i);
        if best.map_or(true, |(_, e)| error > e) {
            best = Some((i, error));
        }
    }
    best.map(|(i, _)| i)
}

/// Active neighbor of `q` with the largest error; lowest index on ties.
pub fn highest_error_neighbor<const N: usize, const E: usize, const D: usize>(
    arena: &GraphArena<N, E, D>,
    q: usize,
) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for j in arena.neighbors(q) {
        let error = arena.error_of(j);
        if best.map_or(true, |(_, e)| error > e) {
            best = Some((j, error));
        }
    }
    best.map(|(j, _)| j)
}

/// Attempt one insertion.
///
/// Error updates run in this order: `err[q] *= alpha`, `err[f] *= alpha`,
/// then `err[r] = err[q]` so `r` inherits the already-scaled value.
pub fn insert_node<const N: usize, const E: usize, const D: usize>(
    arena: &mut GraphArena<N, E, D>,
    alpha: Fraction,
) -> InsertionOutcome {
    let Some(q) = highest_error_node(arena) else {
        tracing::trace!("Insertion skipped: no active node");
        return InsertionOutcome::Skipped(SoftFault::DegenerateNetwork);
    };
    let Some(f) = highest_error_neighbor(arena, q) else {
        tracing::trace!("Insertion skipped: node {} has no active neighbor", q);
        return InsertionOutcome::Skipped(SoftFault::NoActiveNeighbor);
    };
    let Some(r) = arena.first_free_slot() else {
        tracing::trace!("Insertion skipped: all {} slots in use", N);
        return InsertionOutcome::Skipped(SoftFault::CapacityExhausted);
    };

    let (Some(pq), Some(pf)) = (arena.position_of(q), arena.position_of(f)) else {
        return InsertionOutcome::Skipped(SoftFault::DegenerateNetwork);
    };
    let (midpoint, saturated) = pq.midpoint(pf);

    if arena.activate_node(r, midpoint, 0).is_err() {
        return InsertionOutcome::Skipped(SoftFault::CapacityExhausted);
    }
    remove_edge(arena, q, f);
    connect_or_reset(arena, q, r);
    connect_or_reset(arena, r, f);

    let err_q = alpha.apply(arena.error_of(q));
    arena.set_error(q, err_q);
    let err_f = alpha.apply(arena.error_of(f));
    arena.set_error(f, err_f);
    arena.set_error(r, err_q);

    tracing::debug!(
        "Inserted node {} between {} and {} (error {})",
        r,
        q,
        f,
        err_q
    );
    InsertionOutcome::Inserted { q, f, r, saturated }
}
