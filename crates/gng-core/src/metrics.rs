// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Map quality metrics
//!
//! All metrics are integer-only and evaluate a fixed sample set against the
//! current arena without modifying it. Ratios are returned as [`Fraction`]
//! (parts per 65536), distances as Q16.16 [`Fixed`].

use crate::arena::GraphArena;
use crate::fixed::{isqrt_u64, Fixed, Fraction, Point, SCALE};
use crate::winner::find_winners;

/// Quality of a map against one sample set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityReport {
    /// Mean distance from each sample to its nearest node
    pub quantization_error: Fixed,
    /// Share of samples whose two nearest nodes are not connected
    pub topological_error: Fraction,
    /// Share of active nodes that are nearest to at least one sample
    pub node_utilization: Fraction,
    /// Average degree, `2·edges / nodes`
    pub edge_density: Fixed,
    pub active_nodes: usize,
    pub active_edges: usize,
    pub memory_bytes: usize,
}

/// Evaluate every metric. `None` when there are no samples or fewer than
/// two active nodes.
pub fn evaluate<const N: usize, const E: usize, const D: usize>(
    arena: &GraphArena<N, E, D>,
    samples: &[Point<D>],
) -> Option<QualityReport> {
    Some(QualityReport {
        quantization_error: quantization_error(arena, samples)?,
        topological_error: topological_error(arena, samples)?,
        node_utilization: node_utilization(arena, samples)?,
        edge_density: edge_density(arena),
        active_nodes: arena.active_count(),
        active_edges: arena.active_edge_count(),
        memory_bytes: GraphArena::<N, E, D>::memory_footprint(),
    })
}

/// Mean Euclidean distance to the best-matching node
pub fn quantization_error<const N: usize, const E: usize, const D: usize>(
    arena: &GraphArena<N, E, D>,
    samples: &[Point<D>],
) -> Option<Fixed> {
    let mut total: u128 = 0;
    let mut counted: u128 = 0;
    for sample in samples {
        let Ok(winners) = find_winners(arena, sample) else {
            continue;
        };
        // sqrt of a Q32.32 square is already Q16.16
        let squared = u64::try_from(winners.d1).unwrap_or(u64::MAX);
        total += isqrt_u64(squared) as u128;
        counted += 1;
    }
    if counted == 0 {
        return None;
    }
    let mean = (total / counted).min(i64::MAX as u128) as i64;
    Some(Fixed::from_wide(mean).0)
}

/// Fraction of samples whose winner and runner-up share no edge
pub fn topological_error<const N: usize, const E: usize, const D: usize>(
    arena: &GraphArena<N, E, D>,
    samples: &[Point<D>],
) -> Option<Fraction> {
    let mut misses: u64 = 0;
    let mut counted: u64 = 0;
    for sample in samples {
        let Ok(winners) = find_winners(arena, sample) else {
            continue;
        };
        counted += 1;
        if !arena.edge(winners.s1, winners.s2).is_active() {
            misses += 1;
        }
    }
    ratio(misses, counted)
}

/// Fraction of active nodes that win at least one sample
pub fn node_utilization<const N: usize, const E: usize, const D: usize>(
    arena: &GraphArena<N, E, D>,
    samples: &[Point<D>],
) -> Option<Fraction> {
    let mut won = [false; N];
    let mut any = false;
    for sample in samples {
        if let Ok(winners) = find_winners(arena, sample) {
            won[winners.s1] = true;
            any = true;
        }
    }
    if !any {
        return None;
    }
    let used = won.iter().filter(|w| **w).count() as u64;
    ratio(used, arena.active_count() as u64)
}

/// `2·edges / nodes` in Q16.16; zero for an empty arena
pub fn edge_density<const N: usize, const E: usize, const D: usize>(
    arena: &GraphArena<N, E, D>,
) -> Fixed {
    let nodes = arena.active_count() as i64;
    if nodes == 0 {
        return Fixed::ZERO;
    }
    let edges = arena.active_edge_count() as i64;
    Fixed::from_wide(2 * edges * SCALE / nodes).0
}

fn ratio(part: u64, whole: u64) -> Option<Fraction> {
    if whole == 0 {
        return None;
    }
    let raw = ((part.min(whole) as u128) << 16) / whole as u128;
    Fraction::from_raw(raw as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena2;
    use crate::fixed::Point2;
    use crate::topology::connect_or_reset;

    type Arena = Arena2<4, 6>;

    fn square() -> Arena {
        let mut arena = Arena::new().unwrap();
        arena.seed(Point2::xy(0.0, 0.0), Point2::xy(1.0, 0.0));
        arena.activate_node(2, Point2::xy(1.0, 1.0), 0).unwrap();
        arena.activate_node(3, Point2::xy(0.0, 1.0), 0).unwrap();
        connect_or_reset(&mut arena, 0, 1);
        connect_or_reset(&mut arena, 1, 2);
        arena
    }

    #[test]
    fn test_quantization_error() {
        let arena = square();
        // 3-4-5 triangle scaled to 0.3 / 0.4
        let samples = [Point2::xy(0.3, 0.4), Point2::xy(0.0, 0.0)];
        let qe = quantization_error(&arena, &samples).unwrap();
        assert!((qe.to_f64() - 0.25).abs() < 1e-3, "got {}", qe);
    }

    #[test]
    fn test_topological_error() {
        let arena = square();
        // (0,1) connected, (3,2) not
        let samples = [Point2::xy(0.4, 0.0), Point2::xy(0.4, 1.0)];
        assert_eq!(topological_error(&arena, &samples), Some(Fraction::HALF));
    }

    #[test]
    fn test_node_utilization() {
        let arena = square();
        let samples = [Point2::xy(0.1, 0.1), Point2::xy(0.9, 0.9)];
        assert_eq!(node_utilization(&arena, &samples), Some(Fraction::HALF));
    }

    #[test]
    fn test_edge_density() {
        let arena = square();
        // 2 edges over 4 nodes
        assert_eq!(edge_density(&arena), Fixed::from_f64(1.0));
        assert_eq!(edge_density(&Arena::new().unwrap()), Fixed::ZERO);
    }

    #[test]
    fn test_evaluate_needs_samples() {
        let arena = square();
        assert!(evaluate(&arena, &[]).is_none());
        let report = evaluate(&arena, &[Point2::xy(0.5, 0.5)]).unwrap();
        assert_eq!(report.active_nodes, 4);
        assert_eq!(report.active_edges, 2);
        assert_eq!(report.memory_bytes, Arena::memory_footprint());
    }
}
