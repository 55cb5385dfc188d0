//! Plain-text tables for extracted structures.

use std::fmt::Write;

use crate::scene::Scene;
use crate::structure::Structure;

/// Render the node table: one row per node, blank cells for coordinates the
/// host never reported.
#[must_use]
pub fn render_node_table(structure: &Structure) -> String {
    let mut output = String::new();
    writeln!(
        &mut output,
        "{:>8}  {:>12}  {:>12}  {:>12}",
        "node", "x", "y", "z"
    )
    .expect("writing to string cannot fail");
    for node in structure.nodes() {
        writeln!(
            &mut output,
            "{:>8}  {:>12}  {:>12}  {:>12}",
            node.id,
            coordinate(node.x),
            coordinate(node.y),
            coordinate(node.z)
        )
        .expect("writing to string cannot fail");
    }
    output
}

/// Render the bar table: one row per bar, blank section cell when the host
/// reported none.
#[must_use]
pub fn render_bar_table(structure: &Structure) -> String {
    let mut output = String::new();
    writeln!(
        &mut output,
        "{:>8}  {:>8}  {:>8}  {}",
        "bar", "start", "end", "section"
    )
    .expect("writing to string cannot fail");
    for bar in structure.bars() {
        writeln!(
            &mut output,
            "{:>8}  {:>8}  {:>8}  {}",
            bar.id,
            bar.start_node,
            bar.end_node,
            bar.section.as_deref().unwrap_or("")
        )
        .expect("writing to string cannot fail");
    }
    output
}

/// One-line summary of an assembled scene.
#[must_use]
pub fn render_scene_summary(scene: &Scene) -> String {
    let positioned = scene
        .markers
        .iter()
        .filter(|marker| marker.position.is_some())
        .count();
    format!(
        "scene: {} node markers ({} positioned), {} bar segments, {} bars skipped",
        scene.markers.len(),
        positioned,
        scene.segments.len(),
        scene.skipped_bars
    )
}

/// Format a coordinate cell; missing values render as an empty cell.
fn coordinate(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.3}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::build_scene;
    use crate::structure::{Bar, Node};

    fn sample() -> Structure {
        Structure::new(
            vec![
                Node::new(1, 0.0, 0.0, 0.0),
                Node {
                    id: 2,
                    x: Some(1.5),
                    y: None,
                    z: Some(-2.0),
                },
            ],
            vec![
                Bar {
                    id: 1,
                    start_node: 1,
                    end_node: 2,
                    section: Some("IPE200".to_string()),
                },
                Bar {
                    id: 2,
                    start_node: 1,
                    end_node: 99,
                    section: None,
                },
            ],
        )
    }

    #[test]
    fn node_table_shows_blanks_for_missing_coordinates() {
        let table = render_node_table(&sample());
        assert!(table.contains("node"));
        assert!(table.contains("1.500"));
        assert!(table.contains("-2.000"));
        let second_row = table.lines().nth(2).expect("row for node 2");
        assert_eq!(second_row.split_whitespace().count(), 3);
    }

    #[test]
    fn bar_table_lists_sections_when_present() {
        let table = render_bar_table(&sample());
        assert!(table.contains("IPE200"));
        let dangling_row = table.lines().nth(2).expect("row for bar 2");
        assert!(dangling_row.contains("99"));
    }

    #[test]
    fn scene_summary_counts_skipped_bars() {
        let scene = build_scene(&sample());
        let summary = render_scene_summary(&scene);
        assert_eq!(
            summary,
            "scene: 2 node markers (1 positioned), 0 bar segments, 2 bars skipped"
        );
    }
}
