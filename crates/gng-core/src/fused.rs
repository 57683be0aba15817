// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Winner-local aging, neighbor adaptation and pruning in one pass
//!
//! For every slot `j != s1`, in index order:
//!
//! 1. skip `j` if it is inactive
//! 2. skip `j` if edge `(s1, j)` is absent
//! 3. age the edge (saturating at code 255)
//! 4. move `j` toward the sample at the neighbor rate
//! 5. prune the edge if its updated age exceeds `max_age`
//!
//! Step 4 runs even when step 5 removes the edge in the same iteration.
//! Splitting this into separate age/move/prune passes changes the result.

use crate::arena::GraphArena;
use crate::fixed::{LearningRate, Point};
use crate::topology::prune_edge;

/// What one fused pass changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FusedUpdateSummary {
    /// Edges visited (aged and used to move a neighbor)
    pub neighbors_moved: u32,
    pub edges_pruned: u32,
    pub nodes_removed: u32,
    /// A neighbor move clamped at least one axis
    pub saturated: bool,
}

/// Run the fused pass around winner `s1` for `sample`.
pub fn age_adapt_prune<const N: usize, const E: usize, const D: usize>(
    arena: &mut GraphArena<N, E, D>,
    s1: usize,
    sample: &Point<D>,
    neighbor_rate: LearningRate,
    max_age: u8,
) -> FusedUpdateSummary {
    let mut summary = FusedUpdateSummary::default();

    for j in 0..N {
        if j == s1 || !arena.is_active(j) {
            continue;
        }
        let Some(idx) = arena.cell_index(s1, j) else {
            continue;
        };
        let code = arena.cell(idx);
        if !code.is_active() {
            continue;
        }

        let aged = code.aged();
        arena.set_cell(idx, aged);

        summary.saturated |= arena.move_toward(j, sample, neighbor_rate);
        summary.neighbors_moved += 1;

        if aged.exceeds(max_age) {
            tracing::trace!("Pruning edge ({}, {}) at age {:?}", s1, j, aged.age());
            let outcome = prune_edge(arena, s1, j);
            summary.edges_pruned += 1;
            summary.nodes_removed += outcome.nodes_removed();
        }
    }

    summary
}
