#![warn(clippy::all)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod document;
pub mod errors;
pub mod extract;
pub mod host;
#[cfg(feature = "rerun")]
pub mod render;
pub mod report;
pub mod scan;
pub mod scene;
pub mod structure;

pub use errors::{DocumentError, HostError};
pub use scan::{discover, ScanLimits};
pub use scene::{build_scene, Marker, Scene, Segment};
pub use structure::{Bar, Node, Structure};
