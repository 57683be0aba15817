// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Read-only graph export
//!
//! [`NodeRecord`] and [`EdgeRecord`] are produced by the arena iterators
//! without allocating. With the `std` feature, [`GraphSnapshot`] takes an
//! owned copy between steps and serializes it with serde.

use crate::fixed::Point;

/// One node slot as seen by an external monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRecord<const D: usize> {
    pub index: u8,
    pub active: bool,
    pub degree: u8,
    pub error: u32,
    pub position: Point<D>,
}

impl<const D: usize> Default for NodeRecord<D> {
    fn default() -> Self {
        Self {
            index: 0,
            active: false,
            degree: 0,
            error: 0,
            position: Point::ORIGIN,
        }
    }
}

/// One active edge, `i < j`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeRecord {
    pub i: u8,
    pub j: u8,
    pub age: u8,
}

/// Receives the arena between steps
///
/// The training loop calls `publish` on the same thread, after a step has
/// completed, so every invariant holds for the duration of the call. Sinks
/// that hand data to another thread must copy it first.
pub trait SnapshotSink<const N: usize, const E: usize, const D: usize> {
    fn publish(&mut self, arena: &crate::arena::GraphArena<N, E, D>);
}

#[cfg(feature = "std")]
pub use owned::{GraphSnapshot, JsonSnapshotWriter, SnapshotNode};

#[cfg(feature = "std")]
mod owned {
    use super::EdgeRecord;
    use crate::arena::GraphArena;
    use crate::fixed::Fixed;
    use serde::{Deserialize, Serialize};
    use std::io::Write;
    use std::string::String;
    use std::vec::Vec;

    /// Node entry of an owned snapshot
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SnapshotNode {
        pub index: u8,
        pub active: bool,
        pub degree: u8,
        pub error: u32,
        /// Raw Q16.16 coordinates
        pub position: Vec<Fixed>,
    }

    impl SnapshotNode {
        pub fn position_f64(&self) -> Vec<f64> {
            self.position.iter().map(|axis| axis.to_f64()).collect()
        }
    }

    /// Owned, copy-on-read view of the whole graph
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct GraphSnapshot {
        pub step: u64,
        pub active_nodes: usize,
        pub active_edges: usize,
        pub nodes: Vec<SnapshotNode>,
        pub edges: Vec<EdgeRecord>,
    }

    impl GraphSnapshot {
        pub fn capture<const N: usize, const E: usize, const D: usize>(
            arena: &GraphArena<N, E, D>,
        ) -> Self {
            let nodes: Vec<SnapshotNode> = arena
                .node_records()
                .map(|rec| SnapshotNode {
                    index: rec.index,
                    active: rec.active,
                    degree: rec.degree,
                    error: rec.error,
                    position: rec.position.0.to_vec(),
                })
                .collect();
            let edges: Vec<EdgeRecord> = arena.edge_records().collect();
            Self {
                step: arena.step_count(),
                active_nodes: arena.active_count(),
                active_edges: edges.len(),
                nodes,
                edges,
            }
        }

        pub fn active(&self) -> impl Iterator<Item = &SnapshotNode> {
            self.nodes.iter().filter(|n| n.active)
        }

        pub fn to_json(&self) -> serde_json::Result<String> {
            serde_json::to_string(self)
        }

        pub fn to_json_pretty(&self) -> serde_json::Result<String> {
            serde_json::to_string_pretty(self)
        }

        pub fn from_json(json: &str) -> serde_json::Result<Self> {
            serde_json::from_str(json)
        }
    }

    /// Writes one JSON document per published snapshot
    pub struct JsonSnapshotWriter<W: Write> {
        writer: W,
        pretty: bool,
        written: usize,
        last_error: Option<std::io::Error>,
    }

    impl<W: Write> JsonSnapshotWriter<W> {
        pub fn new(writer: W, pretty: bool) -> Self {
            Self {
                writer,
                pretty,
                written: 0,
                last_error: None,
            }
        }

        pub fn written(&self) -> usize {
            self.written
        }

        /// First I/O failure, if any. Publishing stops after an error.
        pub fn take_error(&mut self) -> Option<std::io::Error> {
            self.last_error.take()
        }

        pub fn into_inner(self) -> W {
            self.writer
        }

        fn write_snapshot(&mut self, snapshot: &GraphSnapshot) -> std::io::Result<()> {
            if self.pretty {
                serde_json::to_writer_pretty(&mut self.writer, snapshot)?;
            } else {
                serde_json::to_writer(&mut self.writer, snapshot)?;
            }
            self.writer.write_all(b"\n")?;
            self.writer.flush()
        }
    }

    impl<W: Write, const N: usize, const E: usize, const D: usize> super::SnapshotSink<N, E, D>
        for JsonSnapshotWriter<W>
    {
        fn publish(&mut self, arena: &GraphArena<N, E, D>) {
            if self.last_error.is_some() {
                return;
            }
            let snapshot = GraphSnapshot::capture(arena);
            match self.write_snapshot(&snapshot) {
                Ok(()) => self.written += 1,
                Err(err) => {
                    tracing::warn!("Snapshot write failed at step {}: {}", snapshot.step, err);
                    self.last_error = Some(err);
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::arena::Arena2;
        use crate::fixed::Point2;
        use crate::snapshot::SnapshotSink;

        fn arena() -> Arena2<4, 6> {
            let mut arena = Arena2::<4, 6>::new().unwrap();
            arena.seed(Point2::xy(0.25, 0.5), Point2::xy(0.75, 0.5));
            arena
        }

        #[test]
        fn test_capture() {
            let snapshot = GraphSnapshot::capture(&arena());
            assert_eq!(snapshot.nodes.len(), 4);
            assert_eq!(snapshot.active_nodes, 2);
            assert_eq!(snapshot.active().count(), 2);
            assert!(snapshot.edges.is_empty());
            assert_eq!(snapshot.nodes[0].position_f64(), std::vec![0.25, 0.5]);
        }

        #[test]
        fn test_json_round_trip() {
            let snapshot = GraphSnapshot::capture(&arena());
            let json = snapshot.to_json().unwrap();
            assert!(json.contains("\"position\":[16384,32768]"));
            assert_eq!(GraphSnapshot::from_json(&json).unwrap(), snapshot);
        }

        #[test]
        fn test_writer_emits_one_line_per_snapshot() {
            let mut writer = JsonSnapshotWriter::new(Vec::new(), false);
            let arena = arena();
            writer.publish(&arena);
            writer.publish(&arena);
            assert_eq!(writer.written(), 2);
            assert!(writer.take_error().is_none());
            let out = String::from_utf8(writer.into_inner()).unwrap();
            assert_eq!(out.lines().count(), 2);
        }
    }
}
