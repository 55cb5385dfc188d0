//! Session management and the automation host boundary.
//!
//! The automation protocol itself belongs to the vendor application; these
//! traits model only the shape the extraction pipeline relies on: an
//! acquired application handle, an opened project exposing a structure
//! model, and the node and bar collections probed by the discovery scan.
//! Backends live in submodules; everything else in the crate is
//! host-agnostic.

pub mod memory;
#[cfg(feature = "robot")]
pub mod robot;

use std::path::Path;

use log::info;

use crate::errors::HostError;
use crate::scan::{ProbeCollection, ProbeItem};

/// A node item as exposed by the host object model.
pub trait NodeItem: ProbeItem {
    /// The `X` coordinate attribute, when present on the host object.
    fn x(&self) -> Option<f64>;
    /// The `Y` coordinate attribute, when present on the host object.
    fn y(&self) -> Option<f64>;
    /// The `Z` coordinate attribute, when present on the host object.
    fn z(&self) -> Option<f64>;
}

/// A bar item as exposed by the host object model.
pub trait BarItem: ProbeItem {
    /// The `StartNode` attribute. Bars without it cannot be materialized.
    fn start_node(&self) -> Option<i64>;
    /// The `EndNode` attribute. Bars without it cannot be materialized.
    fn end_node(&self) -> Option<i64>;
    /// The `SectionName` attribute, when present.
    fn section_name(&self) -> Option<String>;
}

/// The structure object of an opened project.
pub trait StructureModel {
    /// Collection holding the node items.
    type Nodes: ProbeCollection;
    /// Collection holding the bar items.
    type Bars: ProbeCollection;

    /// The `Nodes` collection handle.
    fn nodes(&self) -> &Self::Nodes;
    /// The `Bars` collection handle.
    fn bars(&self) -> &Self::Bars;
}

/// An application handle produced by a runtime acquisition.
pub trait HostApplication {
    /// Structure model type exposed by this application.
    type Model: StructureModel;

    /// Open a project file in the application.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::OpenProject`] when the host refuses the file.
    fn open_project(&mut self, path: &Path) -> Result<(), HostError>;

    /// The structure of the currently open project.
    ///
    /// # Errors
    ///
    /// Returns an error when no project is open or the host cannot hand out
    /// the structure object.
    fn structure(&self) -> Result<Self::Model, HostError>;
}

/// The automation runtime: owns the process-wide context that must be
/// acquired before any host call and released exactly once afterwards.
pub trait HostRuntime {
    /// Application handle type produced by acquisition.
    type App: HostApplication;

    /// Initialize the automation context and produce an application handle,
    /// attaching to a running host instance when one is available and
    /// launching a hidden one otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Connect`] when neither attaching nor launching
    /// works.
    fn acquire(&mut self, options: &SessionOptions) -> Result<Self::App, HostError>;

    /// Release the automation context. Called exactly once per acquisition,
    /// on every exit path.
    fn release(&mut self);
}

/// Options controlling session acquisition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    /// Show the host window when a new instance has to be launched.
    pub visible: bool,
    /// Attach to an already-running instance when one is available instead
    /// of always launching.
    pub attach_to_running: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            visible: false,
            attach_to_running: true,
        }
    }
}

/// A scoped automation session: acquired context plus opened project.
///
/// The runtime context is released when the session leaves scope, whichever
/// way that happens; [`Session::close`] is the orderly variant.
pub struct Session<R: HostRuntime> {
    runtime: R,
    app: Option<R::App>,
    released: bool,
}

impl<R: HostRuntime> Session<R> {
    /// Acquire the runtime, attach to or launch the host, and open
    /// `project`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Connect`] when the host cannot be reached and
    /// [`HostError::OpenProject`] when it refuses the file. The context is
    /// released before either error reaches the caller.
    pub fn open(mut runtime: R, project: &Path, options: SessionOptions) -> Result<Self, HostError> {
        let app = runtime.acquire(&options)?;
        let mut session = Self {
            runtime,
            app: Some(app),
            released: false,
        };
        // From here on the Drop impl guarantees release.
        if let Some(app) = session.app.as_mut() {
            app.open_project(project)?;
        }
        info!("project {} opened in automation host", project.display());
        Ok(session)
    }

    /// The structure model of the opened project.
    ///
    /// # Errors
    ///
    /// Propagates the host's failure to hand out the structure object.
    pub fn structure(&self) -> Result<<R::App as HostApplication>::Model, HostError> {
        match self.app.as_ref() {
            Some(app) => app.structure(),
            None => Err(HostError::Backend("session already released".to_string())),
        }
    }

    /// Release the automation context now instead of at end of scope.
    pub fn close(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if !self.released {
            self.released = true;
            // Host object handles must go before the context they live in.
            self.app = None;
            self.runtime.release();
            info!("automation context released");
        }
    }
}

impl<R: HostRuntime> Drop for Session<R> {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl<R: HostRuntime> std::fmt::Debug for Session<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("open", &self.app.is_some())
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::memory::{MemoryModel, MemoryRuntime};
    use super::{Session, SessionOptions};
    use crate::errors::HostError;

    #[test]
    fn context_is_released_after_close() {
        let runtime = MemoryRuntime::new(MemoryModel::default());
        let releases = runtime.release_probe();

        let session = Session::open(runtime, Path::new("model.rtd"), SessionOptions::default())
            .expect("session opens");
        assert_eq!(releases.count(), 0);
        session.close();
        assert_eq!(releases.count(), 1);
    }

    #[test]
    fn context_is_released_when_the_session_is_dropped() {
        let runtime = MemoryRuntime::new(MemoryModel::default());
        let releases = runtime.release_probe();
        {
            let _session =
                Session::open(runtime, Path::new("model.rtd"), SessionOptions::default())
                    .expect("session opens");
        }
        assert_eq!(releases.count(), 1);
    }

    #[test]
    fn context_is_released_when_the_project_cannot_be_opened() {
        let runtime = MemoryRuntime::new(MemoryModel::default()).refuse_project();
        let releases = runtime.release_probe();

        let error = Session::open(runtime, Path::new("model.rtd"), SessionOptions::default())
            .expect_err("open fails");
        assert!(matches!(error, HostError::OpenProject { .. }));
        assert_eq!(releases.count(), 1);
    }

    #[test]
    fn connection_failure_needs_no_release() {
        let runtime = MemoryRuntime::new(MemoryModel::default()).refuse_connection();
        let releases = runtime.release_probe();

        let error = Session::open(runtime, Path::new("model.rtd"), SessionOptions::default())
            .expect_err("open fails");
        assert!(matches!(error, HostError::Connect { .. }));
        assert_eq!(releases.count(), 0);
    }
}
