//! Scene configuration
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration. Colours are written as `"#RRGGBB"` strings.

use crate::color::{self, Color};
use crate::error::{Error, Result};
use crate::point::Point3f;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration of the forest scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SceneConfig {
    pub tree: TreeConfig,
    pub hotspots: HotspotConfig,
    pub ground: GroundConfig,
    pub forest: ForestConfig,
    pub camera: CameraConfig,
    /// Seed for every generator. `None` seeds from system entropy.
    pub seed: Option<u64>,
}

/// Centerpiece tree, loaded from a model or built by the fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Fallback tree height
    pub height: f32,
    /// Fallback trunk base radius
    pub radius_base: f32,
    /// Height rings per fallback primitive
    pub branch_levels: u32,
    pub points_per_level: u32,
    pub color_variation: f32,
    /// Fallback canopy colour
    #[serde(with = "color::hex")]
    pub base_color: Color,
    pub model_path: PathBuf,
    /// Jittered points added around model vertices
    pub filler_points: usize,
    /// Full width of the filler jitter box
    pub filler_offset: f32,
    /// Model points below this height are trunk
    pub trunk_height: f32,
    /// Approximate model height
    pub max_height: f32,
    /// Model points closer than this to the vertical axis (and below 70% of `max_height`) are trunk
    pub axis_radius: f32,
    pub model_point_size: f32,
    pub fallback_point_size: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            height: 5.0,
            radius_base: 0.5,
            branch_levels: 5,
            points_per_level: 2000,
            color_variation: 0.3,
            base_color: Color::from_hex(0x2E8B57),
            model_path: PathBuf::from("models/tree.obj"),
            filler_points: 5000,
            filler_offset: 0.3,
            trunk_height: 15.0,
            max_height: 40.0,
            axis_radius: 2.0,
            model_point_size: 0.08,
            fallback_point_size: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotspotConfig {
    pub point_size: f32,
    /// Pick radius around each hotspot, in world units
    pub pick_threshold: f32,
    pub positions: Vec<Point3f>,
    /// Height of the hover frame above the hovered point
    pub label_offset: f32,
    /// Relative amplitude of the size pulse
    pub pulse_amplitude: f32,
    /// Angular rate of the size pulse in radians per millisecond
    pub pulse_rate: f32,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            point_size: 0.15,
            pick_threshold: 0.2,
            positions: vec![
                Point3f::new(-2.0, 34.5, 0.0),
                Point3f::new(-1.8, 23.2, 1.5),
                Point3f::new(0.5, 35.5, -1.0),
                Point3f::new(1.2, 22.8, 2.2),
                Point3f::new(1.0, 14.0, 0.0),
            ],
            label_offset: 0.4,
            pulse_amplitude: 0.3,
            pulse_rate: 0.002,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub points: usize,
    pub radius: f32,
    pub point_size: f32,
    pub opacity: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            points: 10_000,
            radius: 100.0,
            point_size: 0.2,
            opacity: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Radius of the outer ring of trees
    pub radius: f32,
    pub max_height: f32,
    /// Width of the undergrowth band beyond `radius`
    pub thickness: f32,
    /// Upper bound on emitted points
    pub point_budget: usize,
    pub archetypes: usize,
    pub outer_clusters: usize,
    pub inner_clusters: usize,
    pub distant_layers: usize,
    pub clusters_per_layer: usize,
    pub max_distant_radius: f32,
    pub floor_points: usize,
    /// Points at or below this gray value are dropped
    pub visibility_threshold: f32,
    pub point_size: f32,
    pub opacity: f32,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            radius: 180.0,
            max_height: 400.0,
            thickness: 60.0,
            point_budget: 400_000,
            archetypes: 12,
            outer_clusters: 130,
            inner_clusters: 70,
            distant_layers: 5,
            clusters_per_layer: 150,
            max_distant_radius: 450.0,
            floor_points: 25_000,
            visibility_threshold: 0.01,
            point_size: 0.35,
            opacity: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Point3f,
    pub target: Point3f,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub move_speed: f32,
    /// Radians per pixel of drag
    pub rotate_speed: f32,
    pub vertical_speed: f32,
    /// Radians per frame while Q or E is held
    pub turn_rate: f32,
    pub zoom_step: f32,
    /// Pixels; longer pointer deltas are scaled down to this length
    pub max_drag_delta: f32,
    #[serde(with = "color::hex")]
    pub background: Color,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Point3f::new(0.0, 40.0, 70.0),
            target: Point3f::origin(),
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            min_distance: 5.0,
            max_distance: 200.0,
            move_speed: 0.125,
            rotate_speed: 0.002,
            vertical_speed: 0.125,
            turn_rate: 0.01,
            zoom_step: 2.0,
            max_drag_delta: 20.0,
            background: Color::from_hex(0x111111),
        }
    }
}

fn check(ok: bool, message: impl FnOnce() -> String) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidConfig(message()))
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    check(value.is_finite() && value > 0.0, || {
        format!("{} must be positive, got {}", name, value)
    })
}

impl SceneConfig {
    /// Reject values the generators and controller cannot work with
    pub fn validate(&self) -> Result<()> {
        let tree = &self.tree;
        positive("tree.height", tree.height)?;
        positive("tree.radius_base", tree.radius_base)?;
        positive("tree.max_height", tree.max_height)?;
        positive("tree.model_point_size", tree.model_point_size)?;
        positive("tree.fallback_point_size", tree.fallback_point_size)?;
        check(tree.branch_levels > 0, || "tree.branch_levels must be at least 1".into())?;
        check((0.0..=2.0).contains(&tree.color_variation), || {
            format!("tree.color_variation must lie in [0, 2], got {}", tree.color_variation)
        })?;
        check(tree.filler_offset.is_finite() && tree.filler_offset >= 0.0, || {
            "tree.filler_offset must be non-negative".into()
        })?;
        check(tree.base_color.is_normalized(), || "tree.base_color out of range".into())?;

        let hotspots = &self.hotspots;
        positive("hotspots.point_size", hotspots.point_size)?;
        positive("hotspots.pick_threshold", hotspots.pick_threshold)?;
        check(hotspots.positions.iter().all(crate::point::is_finite_point), || {
            "hotspots.positions must be finite".into()
        })?;

        positive("ground.radius", self.ground.radius)?;
        positive("ground.point_size", self.ground.point_size)?;

        let forest = &self.forest;
        positive("forest.radius", forest.radius)?;
        positive("forest.max_height", forest.max_height)?;
        positive("forest.point_size", forest.point_size)?;
        check(forest.max_distant_radius > forest.radius, || {
            "forest.max_distant_radius must exceed forest.radius".into()
        })?;
        check(forest.archetypes > 0, || "forest.archetypes must be at least 1".into())?;
        check(
            forest.outer_clusters + forest.inner_clusters + forest.distant_layers * forest.clusters_per_layer > 0,
            || "forest needs at least one cluster".into(),
        )?;

        let camera = &self.camera;
        positive("camera.near", camera.near)?;
        check(camera.far > camera.near, || "camera.far must exceed camera.near".into())?;
        check(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0, || {
            format!("camera.fov_degrees must lie in (0, 180), got {}", camera.fov_degrees)
        })?;
        positive("camera.min_distance", camera.min_distance)?;
        check(camera.max_distance >= camera.min_distance, || {
            "camera.max_distance must not be below camera.min_distance".into()
        })?;
        check(camera.position != camera.target, || {
            "camera.position and camera.target must differ".into()
        })?;

        Ok(())
    }
}
