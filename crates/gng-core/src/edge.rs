// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Half-adjacency edge table encoding
//!
//! One byte per unordered node pair. `0` means no edge; `v > 0` means an
//! active edge whose age is `v - 1`. Call sites go through [`EdgeCode`] and
//! never touch the raw byte.

/// Packed edge cell: activity flag and age in one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeCode(u8);

impl EdgeCode {
    pub const EMPTY: EdgeCode = EdgeCode(0);

    /// Oldest age the code can hold; aging saturates here.
    pub const MAX_AGE: u8 = u8::MAX - 1;

    /// A newly created or reset edge (age 0)
    #[inline]
    pub const fn fresh() -> Self {
        EdgeCode(1)
    }

    /// Active edge with the given age, capped at [`EdgeCode::MAX_AGE`]
    #[inline]
    pub const fn with_age(age: u8) -> Self {
        if age >= Self::MAX_AGE {
            EdgeCode(u8::MAX)
        } else {
            EdgeCode(age + 1)
        }
    }

    #[inline]
    pub const fn is_active(self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub const fn age(self) -> Option<u8> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0 - 1)
        }
    }

    /// One more winner selection on this edge. Absent edges stay absent.
    #[inline]
    pub const fn aged(self) -> Self {
        if self.0 == 0 || self.0 == u8::MAX {
            self
        } else {
            EdgeCode(self.0 + 1)
        }
    }

    /// Active and strictly older than `max_age`
    #[inline]
    pub const fn exceeds(self, max_age: u8) -> bool {
        match self.age() {
            Some(age) => age > max_age,
            None => false,
        }
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Cells needed for every unordered pair of `nodes` slots
///
/// # Example
/// ```
/// use gng_core::edge::half_adjacency_len;
///
/// assert_eq!(half_adjacency_len(4), 6);
/// assert_eq!(half_adjacency_len(40), 780);
/// ```
pub const fn half_adjacency_len(nodes: usize) -> usize {
    if nodes < 2 {
        0
    } else {
        nodes * (nodes - 1) / 2
    }
}

/// Cell index for `i < j` in a table built for `nodes` slots
#[inline]
pub const fn pair_index(nodes: usize, i: usize, j: usize) -> usize {
    debug_assert!(i < j && j < nodes);
    i * (2 * nodes - i - 1) / 2 + (j - i - 1)
}

/// Order a pair as `(low, high)`; `None` for self-pairs.
#[inline]
pub const fn canonical_pair(a: usize, b: usize) -> Option<(usize, usize)> {
    if a < b {
        Some((a, b))
    } else if b < a {
        Some((b, a))
    } else {
        None
    }
}
