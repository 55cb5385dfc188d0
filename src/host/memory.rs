//! An in-memory host for tests and host-free callers.
//!
//! Collections support the failure injection needed to exercise every branch
//! of discovery and extraction: refusing the bulk handle, serving a bulk
//! snapshot that differs from the keyed items, failing individual
//! retrievals, and omitting attributes on items.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::HostError;
use crate::scan::{BulkHandle, ProbeCollection, ProbeItem};

use super::{
    BarItem, HostApplication, HostRuntime, NodeItem, SessionOptions, StructureModel,
};

/// A node entry served by the in-memory model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryNode {
    /// Identifier; `None` simulates a host object without a `Number`.
    pub number: Option<i64>,
    /// `X` attribute.
    pub x: Option<f64>,
    /// `Y` attribute.
    pub y: Option<f64>,
    /// `Z` attribute.
    pub z: Option<f64>,
}

impl MemoryNode {
    /// A node with identifier and full coordinates.
    #[must_use]
    pub const fn at(number: i64, x: f64, y: f64, z: f64) -> Self {
        Self {
            number: Some(number),
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }
}

impl ProbeItem for MemoryNode {
    fn number(&self) -> Option<i64> {
        self.number
    }
}

impl NodeItem for MemoryNode {
    fn x(&self) -> Option<f64> {
        self.x
    }

    fn y(&self) -> Option<f64> {
        self.y
    }

    fn z(&self) -> Option<f64> {
        self.z
    }
}

/// A bar entry served by the in-memory model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryBar {
    /// Identifier; `None` simulates a host object without a `Number`.
    pub number: Option<i64>,
    /// `StartNode` attribute.
    pub start_node: Option<i64>,
    /// `EndNode` attribute.
    pub end_node: Option<i64>,
    /// `SectionName` attribute.
    pub section_name: Option<String>,
}

impl MemoryBar {
    /// A bar with identifier, endpoints and section label.
    #[must_use]
    pub fn between(number: i64, start_node: i64, end_node: i64, section: &str) -> Self {
        Self {
            number: Some(number),
            start_node: Some(start_node),
            end_node: Some(end_node),
            section_name: Some(section.to_string()),
        }
    }
}

impl ProbeItem for MemoryBar {
    fn number(&self) -> Option<i64> {
        self.number
    }
}

impl BarItem for MemoryBar {
    fn start_node(&self) -> Option<i64> {
        self.start_node
    }

    fn end_node(&self) -> Option<i64> {
        self.end_node
    }

    fn section_name(&self) -> Option<String> {
        self.section_name.clone()
    }
}

/// An in-memory collection keyed by identifier, with failure injection.
#[derive(Clone, Debug, Default)]
pub struct MemoryCollection<T> {
    items: BTreeMap<i64, T>,
    deny_bulk: bool,
    bulk_override: Option<Vec<T>>,
    failing_keys: BTreeSet<i64>,
}

impl<T: Clone> MemoryCollection<T> {
    /// An empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            deny_bulk: false,
            bulk_override: None,
            failing_keys: BTreeSet::new(),
        }
    }

    /// Store an item under `key`.
    pub fn insert(&mut self, key: i64, item: T) {
        self.items.insert(key, item);
    }

    /// Refuse the bulk handle so discovery must fall back to probing.
    #[must_use]
    pub fn with_bulk_denied(mut self) -> Self {
        self.deny_bulk = true;
        self
    }

    /// Serve `items` from the bulk handle instead of the keyed contents.
    pub fn set_bulk_override(&mut self, items: Vec<T>) {
        self.bulk_override = Some(items);
    }

    /// Make the keyed lookup of `key` fail even if an item is stored there.
    pub fn fail_retrieval_of(&mut self, key: i64) {
        self.failing_keys.insert(key);
    }
}

impl<T: Clone + ProbeItem> ProbeCollection for MemoryCollection<T> {
    type Item = T;
    type Bulk = MemoryBulk<T>;

    fn all(&self) -> Result<Self::Bulk, HostError> {
        if self.deny_bulk {
            return Err(HostError::BulkUnavailable);
        }
        let items = match &self.bulk_override {
            Some(items) => items.clone(),
            None => self.items.values().cloned().collect(),
        };
        Ok(MemoryBulk { items })
    }

    fn get(&self, key: i64) -> Result<Self::Item, HostError> {
        if self.failing_keys.contains(&key) {
            return Err(HostError::Lookup(key));
        }
        self.items.get(&key).cloned().ok_or(HostError::Lookup(key))
    }
}

/// Bulk snapshot handle over an in-memory collection.
#[derive(Clone, Debug)]
pub struct MemoryBulk<T> {
    items: Vec<T>,
}

impl<T: Clone + ProbeItem> BulkHandle for MemoryBulk<T> {
    type Item = T;

    fn get(&self, index: usize) -> Result<Self::Item, HostError> {
        index
            .checked_sub(1)
            .and_then(|position| self.items.get(position))
            .cloned()
            .ok_or(HostError::Lookup(index as i64))
    }
}

/// An in-memory structure model.
#[derive(Clone, Debug, Default)]
pub struct MemoryModel {
    /// The `Nodes` collection.
    pub nodes: MemoryCollection<MemoryNode>,
    /// The `Bars` collection.
    pub bars: MemoryCollection<MemoryBar>,
}

impl MemoryModel {
    /// A model populated from plain node and bar entries, keyed by their
    /// identifiers.
    #[must_use]
    pub fn with_entries(nodes: Vec<MemoryNode>, bars: Vec<MemoryBar>) -> Self {
        let mut model = Self::default();
        for node in nodes {
            if let Some(number) = node.number {
                model.nodes.insert(number, node);
            }
        }
        for bar in bars {
            if let Some(number) = bar.number {
                model.bars.insert(number, bar);
            }
        }
        model
    }
}

impl StructureModel for MemoryModel {
    type Nodes = MemoryCollection<MemoryNode>;
    type Bars = MemoryCollection<MemoryBar>;

    fn nodes(&self) -> &Self::Nodes {
        &self.nodes
    }

    fn bars(&self) -> &Self::Bars {
        &self.bars
    }
}

/// Observer for runtime releases, shared with tests.
#[derive(Clone, Debug, Default)]
pub struct ReleaseProbe(Arc<AtomicUsize>);

impl ReleaseProbe {
    /// Number of times the runtime context has been released.
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// A runtime whose acquisitions serve a fixed in-memory model.
#[derive(Clone, Debug, Default)]
pub struct MemoryRuntime {
    model: MemoryModel,
    fail_connect: bool,
    fail_open: bool,
    releases: ReleaseProbe,
}

impl MemoryRuntime {
    /// A runtime serving `model`.
    #[must_use]
    pub fn new(model: MemoryModel) -> Self {
        Self {
            model,
            fail_connect: false,
            fail_open: false,
            releases: ReleaseProbe::default(),
        }
    }

    /// Make acquisition fail as if the host could not be reached.
    #[must_use]
    pub fn refuse_connection(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Make project opening fail as if the host rejected the file.
    #[must_use]
    pub fn refuse_project(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Handle observing context releases; keep a clone before handing the
    /// runtime to a session.
    #[must_use]
    pub fn release_probe(&self) -> ReleaseProbe {
        self.releases.clone()
    }
}

impl HostRuntime for MemoryRuntime {
    type App = MemoryApp;

    fn acquire(&mut self, _options: &SessionOptions) -> Result<Self::App, HostError> {
        if self.fail_connect {
            return Err(HostError::Connect {
                reason: "no running instance and launching is disabled".to_string(),
            });
        }
        Ok(MemoryApp {
            model: self.model.clone(),
            fail_open: self.fail_open,
            opened: None,
        })
    }

    fn release(&mut self) {
        self.releases.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Application handle over the in-memory runtime.
#[derive(Clone, Debug)]
pub struct MemoryApp {
    model: MemoryModel,
    fail_open: bool,
    opened: Option<PathBuf>,
}

impl HostApplication for MemoryApp {
    type Model = MemoryModel;

    fn open_project(&mut self, path: &std::path::Path) -> Result<(), HostError> {
        if self.fail_open {
            return Err(HostError::OpenProject {
                path: path.to_path_buf(),
                reason: "file rejected by host".to_string(),
            });
        }
        self.opened = Some(path.to_path_buf());
        Ok(())
    }

    fn structure(&self) -> Result<Self::Model, HostError> {
        if self.opened.is_none() {
            return Err(HostError::Backend("no project open".to_string()));
        }
        Ok(self.model.clone())
    }
}
