//! Interaction and viewing for canopy scenes
//!
//! This crate turns the generated batches into an interactive session:
//! - First-person camera controller (drag to look, WASD, zoom limits)
//! - Hotspot hover, highlight and click navigation
//! - Scene registry and the per-frame application context
//! - Native viewer window on top of `canopy-gpu`

pub mod camera;
pub mod input;
pub mod controller;
pub mod hotspots;
pub mod scene;
pub mod overlay;
pub mod app;
pub mod viewer;

pub use camera::*;
pub use input::*;
pub use controller::*;
pub use hotspots::*;
pub use scene::*;
pub use overlay::*;
pub use app::*;
pub use viewer::*;

use canopy_core::{Result, SceneConfig};

/// Open the interactive forest viewer with `config`
pub fn show_forest(config: SceneConfig) -> Result<()> {
    Viewer::new(config).run()
}
