//! Viewer for structure documents: tables plus the assembled 3D scene.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use framex::scene::{build_scene, Scene};
use framex::{document, report};

#[derive(Debug, Parser)]
#[command(
    name = "framex-view",
    version,
    about = "View structural node and bar geometry from a JSON document"
)]
struct Args {
    /// Structure document produced by framex-extract.
    document: PathBuf,
    /// Stream the scene to a Rerun viewer (requires the `rerun` feature).
    #[arg(long)]
    spawn_viewer: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let structure = document::load_path(&args.document)
        .with_context(|| format!("could not load {}", args.document.display()))?;

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

#[cfg(feature = "rerun")]
fn spawn_viewer(scene: &Scene) -> anyhow::Result<()> {
    framex::render::show(scene, "framex-view").context("could not stream scene to viewer")
}

#[cfg(not(feature = "rerun"))]
fn spawn_viewer(_scene: &Scene) -> anyhow::Result<()> {
    anyhow::bail!("this build has no 3D viewer (enable the `rerun` feature)")
}
