//! Automation backend for the vendor application.
//!
//! The vendor ships no native bindings, so the backend embeds a Python
//! interpreter and drives the COM object model late-bound through `pywin32`.
//! Attribute reads are decoded field by field; whatever the host object
//! fails to expose simply decodes to `None` and is handled by the tolerant
//! extraction loops.

use std::marker::PhantomData;
use std::path::Path;

use log::debug;
use pyo3::prelude::*;

use crate::errors::HostError;
use crate::scan::{BulkHandle, ProbeCollection, ProbeItem};

use super::{
    BarItem, HostApplication, HostRuntime, NodeItem, SessionOptions, StructureModel,
};

/// COM program identifier of the host application.
const PROG_ID: &str = "Robot.Application";

fn backend_err(error: PyErr) -> HostError {
    HostError::Backend(error.to_string())
}

/// Runtime backed by an embedded Python interpreter with `pywin32`.
///
/// Acquisition initializes the COM apartment and release uninitializes it;
/// the [`super::Session`] wrapper guarantees the pairing.
#[derive(Debug, Default)]
pub struct RobotRuntime;

impl RobotRuntime {
    /// Create the runtime. Nothing host-side happens until acquisition.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HostRuntime for RobotRuntime {
    type App = RobotApp;

    fn acquire(&mut self, options: &SessionOptions) -> Result<Self::App, HostError> {
        Python::with_gil(|py| {
            let pythoncom = py.import("pythoncom").map_err(|error| HostError::Connect {
                reason: format!("pywin32 is not available: {error}"),
            })?;
            pythoncom
                .call_method0("CoInitialize")
                .map_err(backend_err)?;

            let client = py.import("win32com.client").map_err(|error| {
                let _ = pythoncom.call_method0("CoUninitialize");
                HostError::Connect {
                    reason: format!("pywin32 is not available: {error}"),
                }
            })?;

            let application = if options.attach_to_running {
                client
                    .call_method1("GetActiveObject", (PROG_ID,))
                    .or_else(|_| {
                        debug!("no running host instance, launching one");
                        client.call_method1("Dispatch", (PROG_ID,))
                    })
            } else {
                client.call_method1("Dispatch", (PROG_ID,))
            }
            .map_err(|error| {
                let _ = pythoncom.call_method0("CoUninitialize");
                HostError::Connect {
                    reason: error.to_string(),
                }
            })?;

            // Freshly launched instances come up visible by default; hosts
            // that predate the attribute just ignore the assignment.
            let _ = application.setattr("Visible", options.visible);

            Ok(RobotApp {
                application: application.unbind(),
            })
        })
    }

    fn release(&mut self) {
        Python::with_gil(|py| {
            if let Ok(pythoncom) = py.import("pythoncom") {
                let _ = pythoncom.call_method0("CoUninitialize");
            }
        });
    }
}

/// Application handle over the COM `Robot.Application` object.
pub struct RobotApp {
    application: Py<PyAny>,
}

impl HostApplication for RobotApp {
    type Model = RobotModel;

    fn open_project(&mut self, path: &Path) -> Result<(), HostError> {
        Python::with_gil(|py| {
            let project = self
                .application
                .bind(py)
                .getattr("Project")
                .map_err(backend_err)?;
            project
                .call_method1("Open", (path.to_string_lossy().into_owned(),))
                .map_err(|error| HostError::OpenProject {
                    path: path.to_path_buf(),
                    reason: error.to_string(),
                })?;
            Ok(())
        })
    }

    fn structure(&self) -> Result<Self::Model, HostError> {
        Python::with_gil(|py| {
            let structure = self
                .application
                .bind(py)
                .getattr("Project")
                .map_err(backend_err)?
                .getattr("Structure")
                .map_err(backend_err)?;
            Ok(RobotModel {
                nodes: RobotCollection::new(structure.getattr("Nodes").map_err(backend_err)?.unbind()),
                bars: RobotCollection::new(structure.getattr("Bars").map_err(backend_err)?.unbind()),
            })
        })
    }
}

/// Structure model over the COM `Structure` object.
pub struct RobotModel {
    nodes: RobotCollection<RobotNode>,
    bars: RobotCollection<RobotBar>,
}

impl StructureModel for RobotModel {
    type Nodes = RobotCollection<RobotNode>;
    type Bars = RobotCollection<RobotBar>;

    fn nodes(&self) -> &Self::Nodes {
        &self.nodes
    }

    fn bars(&self) -> &Self::Bars {
        &self.bars
    }
}

/// Wrapper construction from a late-bound COM object.
pub trait FromCom {
    /// Wrap the COM object handle.
    fn from_com(object: Py<PyAny>) -> Self;
}

/// A COM collection handle typed by the item wrapper it produces.
pub struct RobotCollection<T> {
    handle: Py<PyAny>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RobotCollection<T> {
    fn new(handle: Py<PyAny>) -> Self {
        Self {
            handle,
            _marker: PhantomData,
        }
    }
}

impl<T: FromCom + ProbeItem> ProbeCollection for RobotCollection<T> {
    type Item = T;
    type Bulk = RobotBulk<T>;

    fn all(&self) -> Result<Self::Bulk, HostError> {
        Python::with_gil(|py| {
            let bulk = self
                .handle
                .bind(py)
                .call_method0("GetAll")
                .map_err(|_| HostError::BulkUnavailable)?;
            Ok(RobotBulk {
                handle: bulk.unbind(),
                _marker: PhantomData,
            })
        })
    }

    fn get(&self, key: i64) -> Result<Self::Item, HostError> {
        Python::with_gil(|py| {
            let item = self
                .handle
                .bind(py)
                .call_method1("Get", (key,))
                .map_err(|_| HostError::Lookup(key))?;
            Ok(T::from_com(item.unbind()))
        })
    }
}

/// Positional handle over a COM `GetAll` snapshot.
pub struct RobotBulk<T> {
    handle: Py<PyAny>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromCom + ProbeItem> BulkHandle for RobotBulk<T> {
    type Item = T;

    fn get(&self, index: usize) -> Result<Self::Item, HostError> {
        Python::with_gil(|py| {
            let item = self
                .handle
                .bind(py)
                .call_method1("Get", (index,))
                .map_err(|_| HostError::Lookup(index as i64))?;
            Ok(T::from_com(item.unbind()))
        })
    }
}

fn attr_f64(object: &Py<PyAny>, name: &str) -> Option<f64> {
    Python::with_gil(|py| object.bind(py).getattr(name).ok()?.extract().ok())
}

fn attr_i64(object: &Py<PyAny>, name: &str) -> Option<i64> {
    Python::with_gil(|py| object.bind(py).getattr(name).ok()?.extract().ok())
}

fn attr_string(object: &Py<PyAny>, name: &str) -> Option<String> {
    Python::with_gil(|py| object.bind(py).getattr(name).ok()?.extract().ok())
}

/// Node wrapper reading `Number`, `X`, `Y` and `Z` late-bound.
pub struct RobotNode {
    object: Py<PyAny>,
}

impl FromCom for RobotNode {
    fn from_com(object: Py<PyAny>) -> Self {
        Self { object }
    }
}

impl ProbeItem for RobotNode {
    fn number(&self) -> Option<i64> {
        attr_i64(&self.object, "Number")
    }
}

impl NodeItem for RobotNode {
    fn x(&self) -> Option<f64> {
        attr_f64(&self.object, "X")
    }

    fn y(&self) -> Option<f64> {
        attr_f64(&self.object, "Y")
    }

    fn z(&self) -> Option<f64> {
        attr_f64(&self.object, "Z")
    }
}

/// Bar wrapper reading `Number`, `StartNode`, `EndNode` and `SectionName`
/// late-bound.
pub struct RobotBar {
    object: Py<PyAny>,
}

impl FromCom for RobotBar {
    fn from_com(object: Py<PyAny>) -> Self {
        Self { object }
    }
}

impl ProbeItem for RobotBar {
    fn number(&self) -> Option<i64> {
        attr_i64(&self.object, "Number")
    }
}

impl BarItem for RobotBar {
    fn start_node(&self) -> Option<i64> {
        attr_i64(&self.object, "StartNode")
    }

    fn end_node(&self) -> Option<i64> {
        attr_i64(&self.object, "EndNode")
    }

    fn section_name(&self) -> Option<String> {
        attr_string(&self.object, "SectionName")
    }
}
