//! Reading and writing the JSON interchange document.
//!
//! The document is an object with two keys: `nodes` (array of `id`, `x`,
//! `y`, `z`) and `bars` (array of `id`, `start_node`, `end_node`,
//! `section`). Coordinates and section labels may be null or absent.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::errors::DocumentError;
use crate::structure::Structure;

/// Parse a structure document from a reader.
///
/// # Errors
///
/// Returns [`DocumentError::Malformed`] when the input is not valid JSON or
/// does not match the document schema.
pub fn from_reader<R: Read>(reader: R) -> Result<Structure, DocumentError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Load a structure document from a file.
///
/// # Errors
///
/// Returns [`DocumentError::Io`] when the file cannot be read and
/// [`DocumentError::Malformed`] when its contents do not parse.
pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Structure, DocumentError> {
    from_reader(BufReader::new(File::open(path)?))
}

/// Serialize a structure document, pretty-printed.
///
/// # Errors
///
/// Returns [`DocumentError::Malformed`] when serialization fails, which with
/// this schema means the underlying writer failed.
pub fn to_writer<W: Write>(writer: W, structure: &Structure) -> Result<(), DocumentError> {
    Ok(serde_json::to_writer_pretty(writer, structure)?)
}

/// Save a structure document to a file.
///
/// # Errors
///
/// Returns [`DocumentError::Io`] when the file cannot be created and
/// [`DocumentError::Malformed`] when serialization fails.
pub fn save_path<P: AsRef<Path>>(structure: &Structure, path: P) -> Result<(), DocumentError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    to_writer(&mut writer, structure)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
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
            vec![Bar {
                id: 1,
                start_node: 1,
                end_node: 2,
                section: Some("IPE200".to_string()),
            }],
        )
    }

    #[test]
    fn round_trip_preserves_records() {
        let structure = sample();
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &structure).expect("serialization succeeds");
        let reloaded = from_reader(buffer.as_slice()).expect("parse succeeds");
        assert_eq!(reloaded, structure);
    }

    #[test]
    fn absent_fields_deserialize_to_none() {
        let json = r#"{
            "nodes": [{"id": 4}, {"id": 5, "x": 1.0, "y": null, "z": 2.0}],
            "bars": [{"id": 1, "start_node": 4, "end_node": 5}]
        }"#;
        let structure = from_reader(json.as_bytes()).expect("parse succeeds");
        let first = structure.node(4).expect("node 4 present");
        assert_eq!((first.x, first.y, first.z), (None, None, None));
        let second = structure.node(5).expect("node 5 present");
        assert_eq!(second.y, None);
        assert_eq!(structure.bars()[0].section, None);
    }

    #[test]
    fn records_are_reordered_on_load() {
        let json = r#"{
            "nodes": [{"id": 9}, {"id": 3}],
            "bars": []
        }"#;
        let structure = from_reader(json.as_bytes()).expect("parse succeeds");
        let ids: Vec<i64> = structure.nodes().iter().map(|node| node.id).collect();
        assert_eq!(ids, vec![3, 9]);
    }

    #[test]
    fn malformed_input_is_rejected() {
        let error = from_reader("not json".as_bytes()).expect_err("parse fails");
        assert!(matches!(error, DocumentError::Malformed(_)));

        let error = from_reader(r#"{"nodes": 3}"#.as_bytes()).expect_err("parse fails");
        assert!(matches!(error, DocumentError::Malformed(_)));
    }

    #[test]
    fn save_and_load_through_a_file() {
        let structure = sample();
        let file = tempfile::NamedTempFile::new().expect("temp file created");
        save_path(&structure, file.path()).expect("save succeeds");
        let reloaded = load_path(file.path()).expect("load succeeds");
        assert_eq!(reloaded, structure);
    }
}
