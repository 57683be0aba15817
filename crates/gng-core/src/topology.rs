// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Edge creation, reset and removal with degree bookkeeping
//!
//! Every change to the edge table that affects a degree counter goes
//! through this module, so `degree[i]` always equals the number of active
//! cells incident to `i`.

use crate::arena::GraphArena;
use crate::edge::EdgeCode;

/// Result of [`connect_or_reset`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A new edge was activated; both degrees went up by one
    Created,
    /// The edge already existed; its age is back to 0
    Reset,
    /// Self-pair, out of range, or an inactive endpoint
    Ignored,
}

/// Nodes released by a prune
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PruneOutcome {
    pub removed_a: bool,
    pub removed_b: bool,
}

impl PruneOutcome {
    pub fn nodes_removed(&self) -> u32 {
        self.removed_a as u32 + self.removed_b as u32
    }
}

/// Activate edge `(a, b)` with age 0, or reset its age if it already exists.
///
/// Degrees only change when the edge is created, so a second call with no
/// aging in between leaves both degrees untouched.
pub fn connect_or_reset<const N: usize, const E: usize, const D: usize>(
    arena: &mut GraphArena<N, E, D>,
    a: usize,
    b: usize,
) -> ConnectOutcome {
    if !arena.is_active(a) || !arena.is_active(b) {
        return ConnectOutcome::Ignored;
    }
    let Some(idx) = arena.cell_index(a, b) else {
        return ConnectOutcome::Ignored;
    };
    let existed = arena.cell(idx).is_active();
    arena.set_cell(idx, EdgeCode::fresh());
    if existed {
        ConnectOutcome::Reset
    } else {
        arena.increment_degree(a);
        arena.increment_degree(b);
        ConnectOutcome::Created
    }
}

/// Deactivate edge `(a, b)` and decrement both degrees.
///
/// Nodes are left active even if their degree reaches 0; insertion uses
/// this to rewire `(q, f)` before the new edges exist. Returns `false` if
/// there was no edge.
pub fn remove_edge<const N: usize, const E: usize, const D: usize>(
    arena: &mut GraphArena<N, E, D>,
    a: usize,
    b: usize,
) -> bool {
    let Some(idx) = arena.cell_index(a, b) else {
        return false;
    };
    if !arena.cell(idx).is_active() {
        return false;
    }
    arena.set_cell(idx, EdgeCode::EMPTY);
    arena.decrement_degree(a);
    arena.decrement_degree(b);
    true
}

/// Remove edge `(a, b)` and release any endpoint left without edges.
pub fn prune_edge<const N: usize, const E: usize, const D: usize>(
    arena: &mut GraphArena<N, E, D>,
    a: usize,
    b: usize,
) -> PruneOutcome {
    if !remove_edge(arena, a, b) {
        return PruneOutcome::default();
    }
    let outcome = PruneOutcome {
        removed_a: arena.degree(a) == 0 && arena.deactivate_node(a),
        removed_b: arena.degree(b) == 0 && arena.deactivate_node(b),
    };
    if outcome.removed_a {
        tracing::trace!("Node {} isolated and released", a);
    }
    if outcome.removed_b {
        tracing::trace!("Node {} isolated and released", b);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena2;
    use crate::fixed::Point2;

    type Arena = Arena2<4, 6>;

    fn seeded() -> Arena {
        let mut arena = Arena::new().unwrap();
        arena.seed(Point2::xy(0.2, 0.2), Point2::xy(0.8, 0.8));
        arena
    }

    #[test]
    fn test_connect_creates_then_resets() {
        let mut arena = seeded();
        assert_eq!(connect_or_reset(&mut arena, 0, 1), ConnectOutcome::Created);
        assert_eq!(arena.degree(0), 1);
        assert_eq!(arena.degree(1), 1);

        let idx = arena.cell_index(0, 1).unwrap();
        arena.set_cell(idx, EdgeCode::with_age(12));
        assert_eq!(connect_or_reset(&mut arena, 1, 0), ConnectOutcome::Reset);
        assert_eq!(arena.edge(0, 1).age(), Some(0));
        assert_eq!(arena.degree(0), 1);
        assert!(arena.check_invariants().is_ok());
    }

    #[test]
    fn test_connect_is_idempotent() {
        let mut arena = seeded();
        connect_or_reset(&mut arena, 0, 1);
        let degrees = (arena.degree(0), arena.degree(1));
        connect_or_reset(&mut arena, 0, 1);
        assert_eq!((arena.degree(0), arena.degree(1)), degrees);
    }

    #[test]
    fn test_connect_ignores_invalid_pairs() {
        let mut arena = seeded();
        assert_eq!(connect_or_reset(&mut arena, 0, 0), ConnectOutcome::Ignored);
        assert_eq!(connect_or_reset(&mut arena, 0, 2), ConnectOutcome::Ignored);
        assert_eq!(connect_or_reset(&mut arena, 0, 9), ConnectOutcome::Ignored);
        assert_eq!(arena.active_edge_count(), 0);
    }

    #[test]
    fn test_remove_edge_keeps_nodes() {
        let mut arena = seeded();
        connect_or_reset(&mut arena, 0, 1);
        assert!(remove_edge(&mut arena, 0, 1));
        assert!(!remove_edge(&mut arena, 0, 1));
        assert_eq!(arena.active_count(), 2);
        assert_eq!(arena.degree(0), 0);
    }

    #[test]
    fn test_prune_releases_isolated_nodes() {
        let mut arena = seeded();
        arena.activate_node(2, Point2::xy(0.5, 0.5), 0).unwrap();
        connect_or_reset(&mut arena, 0, 1);
        connect_or_reset(&mut arena, 1, 2);

        let outcome = prune_edge(&mut arena, 0, 1);
        assert!(outcome.removed_a);
        assert!(!outcome.removed_b);
        assert_eq!(outcome.nodes_removed(), 1);
        assert!(!arena.is_active(0));
        assert_eq!(arena.active_count(), 2);
        assert!(arena.check_invariants().is_ok());
    }
}
