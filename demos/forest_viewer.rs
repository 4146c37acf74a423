//! Forest Viewer
//!
//! Opens the interactive forest scene. The tree model, hotspots and camera
//! come from an optional JSON configuration; flags override single values.
//!
//! Controls: WASD move, Space/Shift up and down, Q/E turn, drag to look,
//! scroll to zoom, R resets the camera, Esc quits.

use anyhow::{Context, Result};
use canopy_core::SceneConfig;
use canopy_visualization::{Viewer, ViewerOptions};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "forest_viewer", about = "Interactive point-cloud forest")]
struct Args {
    /// Scene configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tree model (OBJ), overrides the configured path
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Random seed for a reproducible forest
    #[arg(short, long)]
    seed: Option<u64>,

    /// Point budget for the surrounding forest
    #[arg(short, long)]
    budget: Option<usize>,

    /// Window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 800)]
    height: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => canopy_io::read_config(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(model) = args.model {
        config.tree.model_path = model;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(budget) = args.budget {
        config.forest.point_budget = budget;
    }

    log::info!("tree model: {}", config.tree.model_path.display());

    let options = ViewerOptions {
        width: args.width,
        height: args.height,
        ..ViewerOptions::default()
    };
    Viewer::with_options(config, options)
        .run()
        .context("viewer failed")?;

    Ok(())
}
