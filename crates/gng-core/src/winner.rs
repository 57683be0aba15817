// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Nearest and second-nearest node search

use crate::arena::GraphArena;
use crate::error::SoftFault;
use crate::fixed::{squared_distance, Point};

/// Best and second-best match for one sample
///
/// Distances are unscaled Q32.32 squared distances. Ranking on the unscaled
/// value is exact because the rescale is monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Winners {
    pub s1: usize,
    pub d1: u128,
    pub s2: usize,
    pub d2: u128,
}

/// Scan every slot once and return the two nearest active nodes.
///
/// Comparisons are strict, so on an exact tie the lower index is kept.
/// Fewer than two active nodes yields [`SoftFault::DegenerateNetwork`].
///
/// # Example
/// ```
/// use gng_core::arena::Arena2;
/// use gng_core::fixed::Point2;
/// use gng_core::winner::find_winners;
///
/// let mut arena = Arena2::<4, 6>::new().unwrap();
/// arena.seed(Point2::xy(0.2, 0.2), Point2::xy(0.8, 0.8));
/// let w = find_winners(&arena, &Point2::xy(0.7, 0.7)).unwrap();
/// assert_eq!((w.s1, w.s2), (1, 0));
/// ```
pub fn find_winners<const N: usize, const E: usize, const D: usize>(
    arena: &GraphArena<N, E, D>,
    sample: &Point<D>,
) -> Result<Winners, SoftFault> {
    let mut best: Option<(usize, u128)> = None;
    let mut second: Option<(usize, u128)> = None;

    for i in 0..N {
        if !arena.is_active(i) {
            continue;
        }
        let Some(position) = arena.position_of(i) else {
            continue;
        };
        let dist = squared_distance(position, sample);
        match best {
            Some((_, d1)) if dist >= d1 => {
                if second.map_or(true, |(_, d2)| dist < d2) {
                    second = Some((i, dist));
                }
            }
            _ => {
                second = best;
                best = Some((i, dist));
            }
        }
    }

    match (best, second) {
        (Some((s1, d1)), Some((s2, d2))) => Ok(Winners { s1, d1, s2, d2 }),
        _ => Err(SoftFault::DegenerateNetwork),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena2;
    use crate::fixed::{Fixed, Point2};

    type Arena = Arena2<8, 28>;

    #[test]
    fn test_ties_go_to_lower_index() {
        let mut arena = Arena::new().unwrap();
        arena.seed(Point2::xy(5.0, 5.0), Point2::xy(-5.0, -5.0));
        arena.activate_node(3, Point2::xy(1.0, 0.0), 0).unwrap();
        arena.activate_node(5, Point2::xy(-1.0, 0.0), 0).unwrap();

        let w = find_winners(&arena, &Point2::ORIGIN).unwrap();
        assert_eq!(w.s1, 3);
        assert_eq!(w.s2, 5);
        assert_eq!(w.d1, w.d2);
    }

    #[test]
    fn test_second_winner_tracks_later_improvement() {
        let mut arena = Arena::new().unwrap();
        arena.seed(Point2::xy(0.0, 0.0), Point2::xy(3.0, 0.0));
        arena.activate_node(2, Point2::xy(1.0, 0.0), 0).unwrap();

        let w = find_winners(&arena, &Point2::xy(0.1, 0.0)).unwrap();
        assert_eq!((w.s1, w.s2), (0, 2));
        assert!(w.d1 < w.d2);
    }

    #[test]
    fn test_inactive_slots_are_skipped() {
        let mut arena = Arena::new().unwrap();
        arena.seed(Point2::xy(0.0, 0.0), Point2::xy(1.0, 1.0));
        arena.activate_node(4, Point2::xy(0.5, 0.5), 0).unwrap();
        arena.deactivate_node(4);

        let w = find_winners(&arena, &Point2::xy(0.5, 0.5)).unwrap();
        assert_ne!(w.s1, 4);
        assert_ne!(w.s2, 4);
    }

    #[test]
    fn test_degenerate_network() {
        let mut arena = Arena::new().unwrap();
        assert_eq!(
            find_winners(&arena, &Point2::ORIGIN),
            Err(SoftFault::DegenerateNetwork)
        );
        arena.seed(Point2::ORIGIN, Point2::xy(1.0, 1.0));
        arena.deactivate_node(0);
        assert_eq!(
            find_winners(&arena, &Point2::ORIGIN),
            Err(SoftFault::DegenerateNetwork)
        );
    }

    #[test]
    fn test_extreme_coordinates_rank_correctly() {
        let mut arena = Arena::new().unwrap();
        arena.seed(
            Point2::new([Fixed::MIN, Fixed::MIN]),
            Point2::new([Fixed::MAX, Fixed::MAX]),
        );
        let w = find_winners(&arena, &Point2::new([Fixed::MAX, Fixed::MAX])).unwrap();
        assert_eq!(w.s1, 1);
        assert_eq!(w.d1, 0);
        assert_eq!(w.s2, 0);
    }
}
