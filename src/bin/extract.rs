//! Extractor: drive the automation host, export the discovered structure.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use log::info;
use tempfile::NamedTempFile;

use framex::host::SessionOptions;
use framex::scan::ScanLimits;
use framex::scene::{build_scene, Scene};
use framex::structure::Structure;
use framex::{document, report};

#[derive(Debug, Parser)]
#[command(
    name = "framex-extract",
    version,
    about = "Extract node and bar geometry from a structural-analysis project file"
)]
struct Args {
    /// Project file to open in the automation host.
    project: PathBuf,
    /// Where to write the extracted structure document.
    #[arg(short, long, default_value = "structure.json")]
    output: PathBuf,
    /// Show the host window when a new instance has to be launched.
    #[arg(long)]
    visible: bool,
    /// Highest key probed when the host refuses a bulk handle.
    #[arg(long, default_value_t = ScanLimits::default().max_index)]
    max_index: i64,
    /// Stream the scene to a Rerun viewer (requires the `rerun` feature).
    #[arg(long)]
    spawn_viewer: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    // The host locks and may rewrite whatever it opens; hand it a working
    // copy that disappears with this scope, success or not.
    let working_copy = copy_to_temp(&args.project)?;

    let options = SessionOptions {
        visible: args.visible,
        ..SessionOptions::default()
    };
    let limits = ScanLimits {
        max_index: args.max_index,
        ..ScanLimits::default()
    };

    let structure = run_extraction(working_copy.path(), options, limits)?;

    document::save_path(&structure, &args.output)
        .with_context(|| format!("could not write {}", args.output.display()))?;
    info!("wrote {}", args.output.display());

    println!("Nodes");
    print!("{}", report::render_node_table(&structure));
    println!();
    println!("Bars");
    print!("{}", report::render_bar_table(&structure));
    println!();

    let scene = build_scene(&structure);
    println!("{}", report::render_scene_summary(&scene));

    if args.spawn_viewer {
        spawn_viewer(&scene)?;
    }
    Ok(())
}

/// Copy the project file next to the system temp directory, keeping its
/// extension so the host recognizes the format.
fn copy_to_temp(project: &Path) -> anyhow::Result<NamedTempFile> {
    let suffix = project
        .extension()
        .map(|extension| format!(".{}", extension.to_string_lossy()))
        .unwrap_or_default();
    let copy = tempfile::Builder::new()
        .prefix("framex-")
        .suffix(&suffix)
        .tempfile()
        .context("could not create temporary working copy")?;
    fs::copy(project, copy.path())
        .with_context(|| format!("could not copy {}", project.display()))?;
    Ok(copy)
}

#[cfg(feature = "robot")]
fn run_extraction(
    project: &Path,
    options: SessionOptions,
    limits: ScanLimits,
) -> anyhow::Result<Structure> {
    use framex::extract::extract_structure;
    use framex::host::robot::RobotRuntime;
    use framex::host::Session;

    let session = Session::open(RobotRuntime::new(), project, options)
        .context("automation host failure")?;
    let structure = {
        let model = session.structure().context("automation host failure")?;
        extract_structure(&model, limits)
    };
    session.close();
    Ok(structure)
}

#[cfg(not(feature = "robot"))]
fn run_extraction(
    _project: &Path,
    _options: SessionOptions,
    _limits: ScanLimits,
) -> anyhow::Result<Structure> {
    Err(framex::HostError::BackendUnavailable.into())
}

#[cfg(feature = "rerun")]
fn spawn_viewer(scene: &Scene) -> anyhow::Result<()> {
    framex::render::show(scene, "framex-extract").context("could not stream scene to viewer")
}

#[cfg(not(feature = "rerun"))]
fn spawn_viewer(_scene: &Scene) -> anyhow::Result<()> {
    anyhow::bail!("this build has no 3D viewer (enable the `rerun` feature)")
}
