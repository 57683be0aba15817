// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the learning engine
//!
//! [`EngineError`] covers construction problems and is returned to the
//! caller. [`SoftFault`] covers the recoverable conditions met while
//! training; they are counted and reported per step, never raised.

use core::fmt;

/// Construction and access errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A parameter is outside its valid range
    InvalidParameters(&'static str),

    /// Edge table is not sized for every node pair
    EdgeCapacityMismatch {
        /// `N·(N−1)/2` for the compiled node capacity
        expected: usize,
        /// Compiled edge-table length
        actual: usize,
    },

    /// Node capacity outside the supported range
    NodeCapacityOutOfRange {
        /// Compiled node capacity
        requested: usize,
        /// Largest supported capacity
        max: usize,
    },

    /// Slot index past the arena capacity
    IndexOutOfRange {
        /// Requested slot
        index: usize,
        /// Arena capacity
        capacity: usize,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidParameters(msg) => write!(f, "Invalid parameters: {}", msg),
            EngineError::EdgeCapacityMismatch { expected, actual } => write!(
                f,
                "Edge capacity mismatch: half-adjacency table needs {} cells, got {}",
                expected, actual
            ),
            EngineError::NodeCapacityOutOfRange { requested, max } => write!(
                f,
                "Node capacity {} outside supported range 2..={}",
                requested, max
            ),
            EngineError::IndexOutOfRange { index, capacity } => {
                write!(f, "Node index {} out of range (capacity {})", index, capacity)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EngineError {}

/// Result type for engine construction
pub type Result<T> = core::result::Result<T, EngineError>;

/// Recoverable conditions met during a training step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum SoftFault {
    /// No free node slot at insertion time
    CapacityExhausted,
    /// Highest-error node has no neighbor to split toward
    NoActiveNeighbor,
    /// Fewer than two active nodes (or none at insertion time)
    DegenerateNetwork,
    /// A fixed-point result was clamped to its representable bounds
    ArithmeticSaturation,
}

impl SoftFault {
    pub const ALL: [SoftFault; 4] = [
        SoftFault::CapacityExhausted,
        SoftFault::NoActiveNeighbor,
        SoftFault::DegenerateNetwork,
        SoftFault::ArithmeticSaturation,
    ];

    const fn bit(self) -> u8 {
        match self {
            SoftFault::CapacityExhausted => 1 << 0,
            SoftFault::NoActiveNeighbor => 1 << 1,
            SoftFault::DegenerateNetwork => 1 << 2,
            SoftFault::ArithmeticSaturation => 1 << 3,
        }
    }
}

impl fmt::Display for SoftFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SoftFault::CapacityExhausted => "capacity exhausted",
            SoftFault::NoActiveNeighbor => "no active neighbor",
            SoftFault::DegenerateNetwork => "degenerate network",
            SoftFault::ArithmeticSaturation => "arithmetic saturation",
        };
        f.write_str(label)
    }
}

/// Set of soft faults seen during one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaultSet(u8);

impl FaultSet {
    pub const fn empty() -> Self {
        FaultSet(0)
    }

    pub fn insert(&mut self, fault: SoftFault) {
        self.0 |= fault.bit();
    }

    pub const fn contains(&self, fault: SoftFault) -> bool {
        self.0 & fault.bit() != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = SoftFault> + '_ {
        SoftFault::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

/// Cumulative soft-fault counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct FaultCounters {
    pub capacity_exhausted: u64,
    pub no_active_neighbor: u64,
    pub degenerate_network: u64,
    pub arithmetic_saturation: u64,
}

impl FaultCounters {
    pub fn record(&mut self, faults: &FaultSet) {
        for fault in faults.iter() {
            let counter = match fault {
                SoftFault::CapacityExhausted => &mut self.capacity_exhausted,
                SoftFault::NoActiveNeighbor => &mut self.no_active_neighbor,
                SoftFault::DegenerateNetwork => &mut self.degenerate_network,
                SoftFault::ArithmeticSaturation => &mut self.arithmetic_saturation,
            };
            *counter = counter.saturating_add(1);
        }
    }

    pub fn total(&self) -> u64 {
        self.capacity_exhausted
            .saturating_add(self.no_active_neighbor)
            .saturating_add(self.degenerate_network)
            .saturating_add(self.arithmetic_saturation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_set() {
        let mut set = FaultSet::empty();
        assert!(set.is_empty());
        set.insert(SoftFault::NoActiveNeighbor);
        set.insert(SoftFault::NoActiveNeighbor);
        assert!(set.contains(SoftFault::NoActiveNeighbor));
        assert!(!set.contains(SoftFault::CapacityExhausted));
        assert_eq!(set.iter().count(), 1);
    }

    #[test]
    fn test_counters_record() {
        let mut counters = FaultCounters::default();
        let mut set = FaultSet::empty();
        set.insert(SoftFault::CapacityExhausted);
        set.insert(SoftFault::ArithmeticSaturation);
        counters.record(&set);
        counters.record(&set);
        assert_eq!(counters.capacity_exhausted, 2);
        assert_eq!(counters.arithmetic_saturation, 2);
        assert_eq!(counters.total(), 4);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_display() {
        use std::string::ToString;

        let err = EngineError::EdgeCapacityMismatch { expected: 6, actual: 4 };
        assert!(err.to_string().contains("needs 6 cells"));
        assert_eq!(SoftFault::DegenerateNetwork.to_string(), "degenerate network");
    }
}
