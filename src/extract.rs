//! Materialization of structure records over the host boundary.
//!
//! Discovery yields identifiers only; each record is retrieved with a second
//! per-identifier lookup and decoded field by field. Every per-item host
//! failure is tolerated: a vanished item or an undecodable bar costs that
//! one record, never the batch.

use log::{debug, warn};

use crate::host::{BarItem, NodeItem, StructureModel};
use crate::scan::{discover, ProbeCollection, ScanLimits};
use crate::structure::{Bar, Node, Structure};

/// Extract every node record the collection will yield, sorted by
/// identifier.
pub fn extract_nodes<C>(collection: &C, limits: ScanLimits) -> Vec<Node>
where
    C: ProbeCollection,
    C::Item: NodeItem,
{
    let mut nodes = Vec::new();
    for id in discover(collection, limits) {
        let Ok(item) = collection.get(id) else {
            debug!("node {id} vanished between discovery and retrieval");
            continue;
        };
        nodes.push(Node {
            id,
            x: item.x(),
            y: item.y(),
            z: item.z(),
        });
    }
    nodes.sort_by_key(|node| node.id);
    nodes
}

/// Extract every bar record the collection will yield, sorted by
/// identifier.
///
/// Bars whose endpoint identifiers the host does not expose cannot be
/// materialized; they are dropped with a warning. Empty section labels are
/// normalized to `None`.
pub fn extract_bars<C>(collection: &C, limits: ScanLimits) -> Vec<Bar>
where
    C: ProbeCollection,
    C::Item: BarItem,
{
    let mut bars = Vec::new();
    for id in discover(collection, limits) {
        let Ok(item) = collection.get(id) else {
            debug!("bar {id} vanished between discovery and retrieval");
            continue;
        };
        let (Some(start_node), Some(end_node)) = (item.start_node(), item.end_node()) else {
            warn!("bar {id} does not expose both endpoints, dropping it");
            continue;
        };
        bars.push(Bar {
            id,
            start_node,
            end_node,
            section: item.section_name().filter(|name| !name.is_empty()),
        });
    }
    bars.sort_by_key(|bar| bar.id);
    bars
}

/// Extract the full structure from an opened project model.
pub fn extract_structure<M>(model: &M, limits: ScanLimits) -> Structure
where
    M: StructureModel,
    <M::Nodes as ProbeCollection>::Item: NodeItem,
    <M::Bars as ProbeCollection>::Item: BarItem,
{
    let structure = Structure::new(
        extract_nodes(model.nodes(), limits),
        extract_bars(model.bars(), limits),
    );
    debug!(
        "extracted {} nodes and {} bars",
        structure.node_count(),
        structure.bar_count()
    );
    structure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{MemoryBar, MemoryCollection, MemoryModel, MemoryNode};

    #[test]
    fn nodes_survive_missing_coordinates() {
        let mut collection = MemoryCollection::new();
        collection.insert(1, MemoryNode::at(1, 0.0, 1.0, 2.0));
        collection.insert(
            2,
            MemoryNode {
                number: Some(2),
                x: Some(4.0),
                y: None,
                z: None,
            },
        );

        let nodes = extract_nodes(&collection, ScanLimits::default());
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].id, 2);
        assert_eq!(nodes[1].x, Some(4.0));
        assert_eq!(nodes[1].y, None);
    }

    #[test]
    fn failed_retrieval_drops_only_that_identifier() {
        let mut collection = MemoryCollection::new();
        collection.insert(1, MemoryNode::at(1, 0.0, 0.0, 0.0));
        collection.insert(2, MemoryNode::at(2, 0.0, 0.0, 0.0));
        // Discovery over the bulk handle still sees the identifier, the
        // keyed retrieval afterwards does not.
        collection.fail_retrieval_of(2);

        let nodes = extract_nodes(&collection, ScanLimits::default());
        let ids: Vec<i64> = nodes.iter().map(|node| node.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn bars_without_endpoints_are_dropped() {
        let mut collection = MemoryCollection::new();
        collection.insert(1, MemoryBar::between(1, 1, 2, "IPE200"));
        collection.insert(
            2,
            MemoryBar {
                number: Some(2),
                start_node: Some(1),
                end_node: None,
                section_name: None,
            },
        );

        let bars = extract_bars(&collection, ScanLimits::default());
        let ids: Vec<i64> = bars.iter().map(|bar| bar.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn empty_section_labels_become_none() {
        let mut collection = MemoryCollection::new();
        collection.insert(1, MemoryBar::between(1, 1, 2, ""));
        let bars = extract_bars(&collection, ScanLimits::default());
        assert_eq!(bars[0].section, None);
    }

    #[test]
    fn extraction_is_ordered_by_identifier() {
        let mut nodes = MemoryCollection::new();
        // Bulk order deliberately differs from identifier order.
        nodes.set_bulk_override(vec![
            MemoryNode::at(9, 0.0, 0.0, 0.0),
            MemoryNode::at(4, 1.0, 0.0, 0.0),
        ]);
        nodes.insert(4, MemoryNode::at(4, 1.0, 0.0, 0.0));
        nodes.insert(9, MemoryNode::at(9, 0.0, 0.0, 0.0));

        let model = MemoryModel {
            nodes,
            bars: MemoryCollection::new(),
        };
        let structure = extract_structure(&model, ScanLimits::default());
        let ids: Vec<i64> = structure.nodes().iter().map(|node| node.id).collect();
        assert_eq!(ids, vec![4, 9]);
    }

    #[test]
    fn full_model_extraction() {
        let model = MemoryModel::with_entries(
            vec![
                MemoryNode::at(1, 0.0, 0.0, 0.0),
                MemoryNode::at(2, 6.0, 0.0, 0.0),
                MemoryNode::at(3, 3.0, 4.0, 0.0),
            ],
            vec![
                MemoryBar::between(1, 1, 2, "IPE200"),
                MemoryBar::between(2, 2, 3, "IPE200"),
                MemoryBar::between(3, 3, 1, "HEA140"),
            ],
        );

        let structure = extract_structure(&model, ScanLimits::default());
        assert_eq!(structure.node_count(), 3);
        assert_eq!(structure.bar_count(), 3);
        assert_eq!(structure.bars()[2].section.as_deref(), Some("HEA140"));
    }
}
