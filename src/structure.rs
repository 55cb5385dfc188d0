//! Record model for extracted structural geometry.
//!
//! Nodes and bars are transient read-only snapshots of whatever the host (or
//! a document) reported. Identifiers are unique within a structure; a bar's
//! endpoints ideally resolve to nodes of the same structure, but dangling
//! references are tolerated and handled downstream, never treated as fatal.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A structural joint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Host-assigned identifier, unique within a structure.
    pub id: i64,
    /// Coordinate along the global X axis, when the host reported one.
    #[serde(default)]
    pub x: Option<f64>,
    /// Coordinate along the global Y axis, when the host reported one.
    #[serde(default)]
    pub y: Option<f64>,
    /// Coordinate along the global Z axis, when the host reported one.
    #[serde(default)]
    pub z: Option<f64>,
}

impl Node {
    /// Create a node with a full coordinate triple.
    #[must_use]
    pub const fn new(id: i64, x: f64, y: f64, z: f64) -> Self {
        Self {
            id,
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// Position of the node, available only when all three coordinates are
    /// present.
    #[must_use]
    pub fn position(&self) -> Option<Point3<f64>> {
        Some(Point3::new(self.x?, self.y?, self.z?))
    }
}

/// A structural member connecting two node identifiers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Host-assigned identifier, unique within a structure.
    pub id: i64,
    /// Identifier of the node at the start of the member.
    pub start_node: i64,
    /// Identifier of the node at the end of the member.
    pub end_node: i64,
    /// Section label, when the host reported a non-empty one.
    #[serde(default)]
    pub section: Option<String>,
}

/// An extracted structure: the node and bar collections, ordered by
/// identifier.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawStructure")]
pub struct Structure {
    nodes: Vec<Node>,
    bars: Vec<Bar>,
}

/// Wire shape of a structure document before ordering is applied.
#[derive(Deserialize)]
struct RawStructure {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    bars: Vec<Bar>,
}

impl From<RawStructure> for Structure {
    fn from(raw: RawStructure) -> Self {
        Self::new(raw.nodes, raw.bars)
    }
}

impl Structure {
    /// Build a structure from record collections.
    ///
    /// Records are sorted by identifier ascending; later duplicates of an
    /// identifier are discarded.
    #[must_use]
    pub fn new(mut nodes: Vec<Node>, mut bars: Vec<Bar>) -> Self {
        nodes.sort_by_key(|node| node.id);
        nodes.dedup_by_key(|node| node.id);
        bars.sort_by_key(|bar| bar.id);
        bars.dedup_by_key(|bar| bar.id);
        Self { nodes, bars }
    }

    /// The node records, ordered by identifier.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The bar records, ordered by identifier.
    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Look up a node by identifier.
    #[must_use]
    pub fn node(&self, id: i64) -> Option<&Node> {
        self.nodes
            .binary_search_by_key(&id, |node| node.id)
            .ok()
            .map(|index| &self.nodes[index])
    }

    /// Number of node records.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of bar records.
    #[must_use]
    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    /// True when the structure holds no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.bars.is_empty()
    }
}
