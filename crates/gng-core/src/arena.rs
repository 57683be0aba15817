// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-size node and edge storage
//!
//! The arena is the only owner of mutable learning state: node positions,
//! error accumulators, activity flags, degree counters and the
//! half-adjacency edge table. Everything is stored in arrays sized by const
//! generics, so the engine never allocates.

use crate::edge::{canonical_pair, half_adjacency_len, pair_index, EdgeCode};
use crate::error::{EngineError, Result};
use crate::fixed::{to_error_units, LearningRate, Point};
use crate::snapshot::{EdgeRecord, NodeRecord};

/// Largest supported node capacity (degrees and snapshot indices are bytes)
pub const MAX_NODE_CAPACITY: usize = u8::MAX as usize;

/// Static node table plus half-adjacency edge table
///
/// * `N` - node capacity (`2..=255`)
/// * `E` - edge-table length, must equal `N·(N−1)/2`
/// * `D` - position dimensionality (2 for the reference configuration)
///
/// # Example
/// ```
/// use gng_core::arena::GraphArena;
/// use gng_core::fixed::Point2;
///
/// let mut arena = GraphArena::<4, 6, 2>::new().unwrap();
/// arena.seed(Point2::xy(0.2, 0.2), Point2::xy(0.8, 0.8));
/// assert_eq!(arena.active_count(), 2);
/// assert_eq!(arena.first_free_slot(), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphArena<const N: usize, const E: usize, const D: usize> {
    positions: [Point<D>; N],
    errors: [u32; N],
    active: [bool; N],
    degrees: [u8; N],
    edges: [EdgeCode; E],
    active_count: usize,
    step: u64,
}

/// Reference two-dimensional arena
pub type Arena2<const N: usize, const E: usize> = GraphArena<N, E, 2>;

impl<const N: usize, const E: usize, const D: usize> GraphArena<N, E, D> {
    /// Create an empty arena (no active nodes)
    ///
    /// Fails if `E` is not the full half-adjacency size for `N`, or if `N`
    /// is outside `2..=255`.
    pub fn new() -> Result<Self> {
        if !(2..=MAX_NODE_CAPACITY).contains(&N) {
            return Err(EngineError::NodeCapacityOutOfRange {
                requested: N,
                max: MAX_NODE_CAPACITY,
            });
        }
        let expected = half_adjacency_len(N);
        if E != expected {
            return Err(EngineError::EdgeCapacityMismatch {
                expected,
                actual: E,
            });
        }
        Ok(Self {
            positions: [Point::ORIGIN; N],
            errors: [0; N],
            active: [false; N],
            degrees: [0; N],
            edges: [EdgeCode::EMPTY; E],
            active_count: 0,
            step: 0,
        })
    }

    /// Reset all state and activate exactly two nodes in slots 0 and 1.
    pub fn seed(&mut self, p0: Point<D>, p1: Point<D>) {
        self.positions = [Point::ORIGIN; N];
        self.errors = [0; N];
        self.active = [false; N];
        self.degrees = [0; N];
        self.edges = [EdgeCode::EMPTY; E];
        self.step = 0;

        self.positions[0] = p0;
        self.positions[1] = p1;
        self.active[0] = true;
        self.active[1] = true;
        self.active_count = 2;
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub const fn edge_capacity(&self) -> usize {
        E
    }

    #[inline]
    pub fn is_active(&self, i: usize) -> bool {
        self.active.get(i).copied().unwrap_or(false)
    }

    #[inline]
    pub fn degree(&self, i: usize) -> u8 {
        self.degrees.get(i).copied().unwrap_or(0)
    }

    #[inline]
    pub fn position_of(&self, i: usize) -> Option<&Point<D>> {
        self.positions.get(i)
    }

    #[inline]
    pub fn error_of(&self, i: usize) -> u32 {
        self.errors.get(i).copied().unwrap_or(0)
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Number of active cells in the edge table (full scan)
    pub fn active_edge_count(&self) -> usize {
        self.edges.iter().filter(|code| code.is_active()).count()
    }

    /// Steps consumed since the last `seed`
    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub(crate) fn advance_step(&mut self) -> u64 {
        self.step = self.step.wrapping_add(1);
        self.step
    }

    /// Lowest-index inactive slot
    pub fn first_free_slot(&self) -> Option<usize> {
        self.active.iter().position(|active| !active)
    }

    /// Add a Q16.16-rescaled squared distance to a node's error (saturating).
    ///
    /// Returns `true` if either the rescale or the addition saturated.
    pub fn accumulate_error(&mut self, i: usize, squared_distance: u128) -> bool {
        let Some(error) = self.errors.get_mut(i) else {
            return false;
        };
        let (units, clamped) = to_error_units(squared_distance);
        let (sum, overflow) = error.overflowing_add(units);
        *error = if overflow { u32::MAX } else { sum };
        clamped || overflow
    }

    /// `p += ((sample − p) · rate) >> shift` on every axis, saturated.
    ///
    /// Returns `true` if any axis was clamped.
    pub fn move_toward(&mut self, i: usize, sample: &Point<D>, rate: LearningRate) -> bool {
        let Some(position) = self.positions.get_mut(i) else {
            return false;
        };
        let mut clamped = false;
        for axis in 0..D {
            let current = position.0[axis];
            let moved = current.raw() as i64 + rate.step(current, sample.0[axis]);
            let (value, hit) = crate::fixed::Fixed::from_wide(moved);
            position.0[axis] = value;
            clamped |= hit;
        }
        clamped
    }

    /// Edge state for an unordered pair; self-pairs and out-of-range pairs read as empty.
    #[inline]
    pub fn edge(&self, a: usize, b: usize) -> EdgeCode {
        match self.cell_index(a, b) {
            Some(idx) => self.edges[idx],
            None => EdgeCode::EMPTY,
        }
    }

    #[inline]
    pub(crate) fn cell_index(&self, a: usize, b: usize) -> Option<usize> {
        let (i, j) = canonical_pair(a, b)?;
        if j >= N {
            return None;
        }
        Some(pair_index(N, i, j))
    }

    #[inline]
    pub(crate) fn cell(&self, idx: usize) -> EdgeCode {
        self.edges[idx]
    }

    #[inline]
    pub(crate) fn set_cell(&mut self, idx: usize, code: EdgeCode) {
        self.edges[idx] = code;
    }

    pub(crate) fn set_error(&mut self, i: usize, error: u32) {
        if let Some(slot) = self.errors.get_mut(i) {
            *slot = error;
        }
    }

    pub(crate) fn errors_mut(&mut self) -> impl Iterator<Item = &mut u32> + '_ {
        self.errors
            .iter_mut()
            .zip(self.active.iter())
            .filter_map(|(error, active)| if *active { Some(error) } else { None })
    }

    /// Saturating degree increment
    pub(crate) fn increment_degree(&mut self, i: usize) {
        if let Some(degree) = self.degrees.get_mut(i) {
            *degree = degree.saturating_add(1);
        }
    }

    /// Saturating degree decrement; returns the new degree.
    pub(crate) fn decrement_degree(&mut self, i: usize) -> u8 {
        match self.degrees.get_mut(i) {
            Some(degree) => {
                *degree = degree.saturating_sub(1);
                *degree
            }
            None => 0,
        }
    }

    /// Claim a free slot as an active node with degree 0.
    pub(crate) fn activate_node(&mut self, i: usize, position: Point<D>, error: u32) -> Result<()> {
        if i >= N {
            return Err(EngineError::IndexOutOfRange { index: i, capacity: N });
        }
        if !self.active[i] {
            self.active_count += 1;
        }
        self.active[i] = true;
        self.positions[i] = position;
        self.errors[i] = error;
        self.degrees[i] = 0;
        Ok(())
    }

    /// Release a slot. Returns `false` if it was already inactive.
    pub(crate) fn deactivate_node(&mut self, i: usize) -> bool {
        if !self.is_active(i) {
            return false;
        }
        self.active[i] = false;
        self.errors[i] = 0;
        self.degrees[i] = 0;
        self.active_count -= 1;
        true
    }

    /// Per-slot records for every node, active or not
    pub fn node_records(&self) -> impl Iterator<Item = NodeRecord<D>> + '_ {
        (0..N).map(move |i| NodeRecord {
            index: i as u8,
            active: self.active[i],
            degree: self.degrees[i],
            error: self.errors[i],
            position: self.positions[i],
        })
    }

    /// `(i, j, age)` for every active edge, `i < j`, in table order
    pub fn edge_records(&self) -> impl Iterator<Item = EdgeRecord> + '_ {
        (0..N).flat_map(move |i| {
            ((i + 1)..N).filter_map(move |j| {
                self.edges[pair_index(N, i, j)].age().map(|age| EdgeRecord {
                    i: i as u8,
                    j: j as u8,
                    age,
                })
            })
        })
    }

    /// Active slots adjacent to `i`
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        (0..N).filter(move |&j| j != i && self.is_active(j) && self.edge(i, j).is_active())
    }

    /// Check degree, capacity and endpoint consistency.
    pub fn check_invariants(&self) -> core::result::Result<(), InvariantViolation> {
        let mut active = 0;
        for i in 0..N {
            let mut incident = 0usize;
            for j in 0..N {
                if j != i && self.edge(i, j).is_active() {
                    incident += 1;
                }
            }
            if self.active[i] {
                active += 1;
                if incident != self.degrees[i] as usize {
                    return Err(InvariantViolation::DegreeMismatch {
                        node: i,
                        recorded: self.degrees[i],
                        actual: incident,
                    });
                }
            } else if incident != 0 || self.degrees[i] != 0 {
                return Err(InvariantViolation::InactiveEndpoint { node: i });
            }
        }
        if active != self.active_count || active > N {
            return Err(InvariantViolation::ActiveCountMismatch {
                recorded: self.active_count,
                actual: active,
            });
        }
        Ok(())
    }

    /// Size of the arena in bytes
    pub const fn memory_footprint() -> usize {
        core::mem::size_of::<Self>()
    }
}

/// A broken arena invariant, found by [`GraphArena::check_invariants`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    DegreeMismatch { node: usize, recorded: u8, actual: usize },
    InactiveEndpoint { node: usize },
    ActiveCountMismatch { recorded: usize, actual: usize },
}

impl core::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InvariantViolation::DegreeMismatch { node, recorded, actual } => write!(
                f,
                "node {} records degree {} but has {} active edges",
                node, recorded, actual
            ),
            InvariantViolation::InactiveEndpoint { node } => {
                write!(f, "inactive node {} still has edges or degree", node)
            }
            InvariantViolation::ActiveCountMismatch { recorded, actual } => write!(
                f,
                "active count {} disagrees with {} active slots",
                recorded, actual
            ),
        }
    }
}
