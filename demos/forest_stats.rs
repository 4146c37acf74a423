//! Forest Statistics
//!
//! Builds the scene without a window and prints what was generated: batch
//! sizes, forest breakdown and whether the tree model or the fallback tree
//! was used.

use anyhow::{Context, Result};
use canopy_core::{HeadlessSurface, SceneConfig, ViewportSize};
use canopy_visualization::{ForestApp, LoggingNavigator};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "forest_stats", about = "Generate the forest headlessly and report point counts")]
struct Args {
    /// Scene configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tree model (OBJ), overrides the configured path
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Random seed
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => canopy_io::read_config(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(model) = args.model {
        config.tree.model_path = model;
    }
    config.seed = Some(args.seed);

    let model_path = config.tree.model_path.clone();
    let mut app = ForestApp::new(
        config,
        HeadlessSurface::new(),
        ViewportSize::new(1280, 800),
        LoggingNavigator::default(),
    )
    .context("building scene")?;

    app.frame(Duration::ZERO)?;
    let source = app.on_model_loaded(canopy_io::read_model(&model_path)).clone();
    app.frame(Duration::from_millis(16))?;

    println!("Canopy forest statistics");
    println!("========================");
    println!("Seed: {}", args.seed);
    println!("Tree: {:?}", source);
    println!();

    for (role, batch) in app.scene().iter() {
        println!("{:<10} {:>8} points", role.name(), batch.len());
    }
    if let Some(hotspots) = app.hotspots() {
        println!("{:<10} {:>8} points", "hotspots", hotspots.len());
    }

    let stats = app.forest_stats();
    println!();
    println!("Forest breakdown:");
    println!("  archetypes:    {}", stats.archetypes);
    println!("  clusters:      {}", stats.clusters);
    println!("  trunk points:  {}", stats.trunk_points);
    println!("  branch points: {}", stats.branch_points);
    println!("  fill points:   {}", stats.fill_points);
    println!("  floor points:  {}", stats.floor_points);
    println!("  dropped:       {}", stats.dropped);
    println!();
    println!("Points submitted last frame: {}", app.surface().last_point_count);

    Ok(())
}
