//! Assembly of extracted records into a renderable 3D scene.

use nalgebra::Point3;

use crate::structure::Structure;

/// A labelled marker standing in for one node.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    /// Identifier of the node the marker represents.
    pub node_id: i64,
    /// Text label shown beside the marker.
    pub label: String,
    /// Marker position; `None` when the node is missing part of its
    /// coordinate triple, in which case a renderer has nowhere to place it.
    pub position: Option<Point3<f64>>,
}

/// A line segment standing in for one bar.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// Identifier of the bar the segment represents.
    pub bar_id: i64,
    /// Display label for the segment.
    pub label: String,
    /// Position of the start endpoint.
    pub start: Point3<f64>,
    /// Position of the end endpoint.
    pub end: Point3<f64>,
}

/// A renderable scene: one marker series plus the bar segments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// One marker per node, positioned or not.
    pub markers: Vec<Marker>,
    /// One segment per bar whose endpoints both resolved.
    pub segments: Vec<Segment>,
    /// Bars skipped because an endpoint did not resolve to a positioned
    /// node.
    pub skipped_bars: usize,
}

/// Assemble the scene for a structure.
///
/// Every node contributes a marker labelled with its identifier. A bar
/// contributes a segment only when both endpoint identifiers resolve to
/// nodes with complete positions; anything else is counted as skipped, not
/// an error.
#[must_use]
pub fn build_scene(structure: &Structure) -> Scene {
    let markers = structure
        .nodes()
        .iter()
        .map(|node| Marker {
            node_id: node.id,
            label: node.id.to_string(),
            position: node.position(),
        })
        .collect();

    let mut segments = Vec::new();
    let mut skipped_bars = 0;
    for bar in structure.bars() {
        let start = structure.node(bar.start_node).and_then(|node| node.position());
        let end = structure.node(bar.end_node).and_then(|node| node.position());
        match start.zip(end) {
            Some((start, end)) => segments.push(Segment {
                bar_id: bar.id,
                label: format!("Bar {}", bar.id),
                start,
                end,
            }),
            None => skipped_bars += 1,
        }
    }

    Scene {
        markers,
        segments,
        skipped_bars,
    }
}
