//! Interactive hotspots
//!
//! A handful of marked points on the tree. Hovering one highlights it, shows
//! a white frame above it and a tooltip at the pointer; clicking opens the
//! page that belongs to it. The whole hotspot batch pulses in size.

use crate::camera::Camera;
use canopy_core::{
    world_up, Color, HotspotConfig, Point2f, Point3f, PointBatch, PointBuffer, PointMaterial, Ray,
    Vector3f,
};

pub const RESTING_COLOR: Color = Color::RED;
pub const HIGHLIGHT_COLOR: Color = Color::YELLOW;

/// Hover frame extent in world units
pub const FRAME_WIDTH: f32 = 0.6;
pub const FRAME_HEIGHT: f32 = 0.4;
const FRAME_COLUMNS: usize = 13;
const FRAME_ROWS: usize = 9;
const FRAME_POINT_SIZE: f32 = 0.05;
const FRAME_OPACITY: f32 = 0.9;

/// Tooltip offset from the pointer, in pixels
const TOOLTIP_OFFSET: (f32, f32) = (15.0, -15.0);

/// Page opened when hotspot `index` is clicked
pub fn hotspot_page(index: usize) -> String {
    format!("point{}.html", index + 1)
}

/// Opens hotspot pages
pub trait Navigator {
    fn navigate(&mut self, target: &str);
}

/// Navigator that logs each request and remembers it
#[derive(Debug, Default, Clone)]
pub struct LoggingNavigator {
    pub history: Vec<String>,
}

impl Navigator for LoggingNavigator {
    fn navigate(&mut self, target: &str) {
        log::info!("opening {}", target);
        self.history.push(target.to_string());
    }
}

/// Title card shown above the hovered hotspot
#[derive(Debug, Clone, PartialEq)]
pub struct HoverLabel {
    pub index: usize,
    pub title: String,
    pub position: Point3f,
}

/// Text that follows the pointer while a hotspot is hovered
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub text: String,
    /// Window pixel position
    pub position: Point2f,
}

/// Pointer location in both window pixels and normalized device coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub pixel: Point2f,
    pub ndc: Point2f,
}

impl PointerSample {
    /// Convert a window pixel position. NDC y points up.
    pub fn from_pixel(x: f32, y: f32, width: f32, height: f32) -> Self {
        let ndc = if width > 0.0 && height > 0.0 {
            Point2f::new(x / width * 2.0 - 1.0, -(y / height) * 2.0 + 1.0)
        } else {
            Point2f::origin()
        };
        Self {
            pixel: Point2f::new(x, y),
            ndc,
        }
    }
}

/// Hotspot batch, hover frame and hover bookkeeping
#[derive(Debug, Clone)]
pub struct HotspotLayer {
    config: HotspotConfig,
    batch: PointBatch,
    frame: PointBatch,
    bounds: Option<(Point3f, Point3f)>,
    hovered: Option<usize>,
    label: Option<HoverLabel>,
    tooltip: Option<Tooltip>,
}

impl HotspotLayer {
    pub fn new(config: &HotspotConfig) -> Self {
        let buffer: PointBuffer = config
            .positions
            .iter()
            .map(|p| (*p, RESTING_COLOR))
            .collect();

        let bounds = config.positions.split_first().map(|(first, rest)| {
            let margin = Vector3f::repeat(config.pick_threshold);
            let (min, max) = rest
                .iter()
                .fold((*first, *first), |(min, max), p| (min.inf(p), max.sup(p)));
            (min - margin, max + margin)
        });

        let frame_points: PointBuffer = (0..FRAME_COLUMNS * FRAME_ROWS)
            .map(|_| (Point3f::origin(), Color::WHITE))
            .collect();
        let mut frame = PointBatch::new(
            frame_points,
            PointMaterial::new(FRAME_POINT_SIZE, FRAME_OPACITY),
        );
        frame.set_visible(false);

        Self {
            config: config.clone(),
            batch: PointBatch::new(buffer, PointMaterial::opaque(config.point_size)),
            frame,
            bounds,
            hovered: None,
            label: None,
            tooltip: None,
        }
    }

    pub fn batch(&self) -> &PointBatch {
        &self.batch
    }

    pub fn frame_batch(&self) -> &PointBatch {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn label(&self) -> Option<&HoverLabel> {
        self.label.as_ref()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Nearest hotspot along `ray` whose closest approach lies within the
    /// pick threshold and whose distance from the ray origin lies in `[near, far]`
    pub fn pick(&self, ray: &Ray, near: f32, far: f32) -> Option<usize> {
        let (min, max) = self.bounds?;
        ray.hit_aabb(&min, &max)?;

        let threshold_sq = self.config.pick_threshold * self.config.pick_threshold;
        let mut best: Option<(usize, f32)> = None;
        for (index, position) in self.batch.buffer().positions().iter().enumerate() {
            if ray.distance_sq_to_point(position) >= threshold_sq {
                continue;
            }
            let distance = ray.closest_point_t(position);
            if distance < near || distance > far {
                continue;
            }
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Per-frame update: hover from the pointer (if it has entered the
    /// window) and the size pulse at `elapsed_ms`
    pub fn update(&mut self, camera: &Camera, pointer: Option<&PointerSample>, elapsed_ms: f64) {
        if let Some(pointer) = pointer {
            let hit = camera
                .ray_from_ndc(&pointer.ndc)
                .and_then(|ray| self.pick(&ray, camera.near, camera.far));
            self.set_hover(hit, camera, pointer.pixel);
        }
        self.pulse(elapsed_ms);
    }

    /// Move the hover to `hit`. Only the previously and newly hovered
    /// points change colour; staying on the same point changes nothing.
    pub fn set_hover(&mut self, hit: Option<usize>, camera: &Camera, pixel: Point2f) {
        match (hit, self.hovered) {
            (Some(index), Some(current)) if index == current => {}
            (Some(index), current) => {
                let Some(position) = self.batch.buffer().position(index).copied() else {
                    return;
                };
                if let Some(old) = current {
                    self.batch.set_color(old, RESTING_COLOR);
                }
                self.batch.set_color(index, HIGHLIGHT_COLOR);
                self.hovered = Some(index);

                let label_position = position + world_up() * self.config.label_offset;
                self.place_frame(label_position, camera);
                self.label = Some(HoverLabel {
                    index,
                    title: format!("Point {} Content", index + 1),
                    position: label_position,
                });
                self.tooltip = Some(Tooltip {
                    text: format!("Point {} - Click to open", index + 1),
                    position: Point2f::new(pixel.x + TOOLTIP_OFFSET.0, pixel.y + TOOLTIP_OFFSET.1),
                });
                log::debug!("hovering hotspot {}", index);
            }
            (None, Some(current)) => {
                self.batch.set_color(current, RESTING_COLOR);
                self.hovered = None;
                self.label = None;
                self.tooltip = None;
                self.frame.set_visible(false);
            }
            (None, None) => {}
        }
    }

    /// Scale the hotspot point size by `1 + amplitude · sin(rate · t)`
    pub fn pulse(&mut self, elapsed_ms: f64) {
        let phase = (self.config.pulse_rate as f64 * elapsed_ms).sin() as f32;
        let factor = 1.0 + self.config.pulse_amplitude * phase;
        self.batch.set_size(self.config.point_size * factor);
    }

    /// Open the hovered hotspot's page. Returns the index that was opened.
    pub fn click(&self, navigator: &mut dyn Navigator) -> Option<usize> {
        let index = self.hovered?;
        log::info!("Clicked on point {}", index);
        navigator.navigate(&hotspot_page(index));
        Some(index)
    }

    /// Lay the frame points out on a rectangle centred at `center`, facing the camera
    fn place_frame(&mut self, center: Point3f, camera: &Camera) {
        let to_camera = (camera.position - center)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3f::z);
        let right = world_up()
            .cross(&to_camera)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3f::x);
        let up = to_camera.cross(&right);

        let mut index = 0;
        for row in 0..FRAME_ROWS {
            let v = (row as f32 / (FRAME_ROWS - 1) as f32 - 0.5) * FRAME_HEIGHT;
            for column in 0..FRAME_COLUMNS {
                let u = (column as f32 / (FRAME_COLUMNS - 1) as f32 - 0.5) * FRAME_WIDTH;
                self.frame.set_position(index, center + right * u + up * v);
                index += 1;
            }
        }
        self.frame.set_visible(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use canopy_core::Drawable;

    fn camera_facing(target: Point3f) -> Camera {
        let mut camera = Camera::default();
        camera.position = target + Vector3f::new(0.0, 0.0, 10.0);
        camera.target = target;
        camera
    }

    fn layer() -> HotspotLayer {
        HotspotLayer::new(&HotspotConfig::default())
    }

    #[test]
    fn test_initial_state() {
        let layer = layer();
        assert_eq!(layer.len(), 5);
        assert!(layer.batch().buffer().colors().iter().all(|c| *c == RESTING_COLOR));
        assert!(!layer.frame_batch().is_visible());
        assert_eq!(layer.hovered(), None);
    }

    #[test]
    fn test_pick_nearest_within_threshold() {
        let config = HotspotConfig {
            positions: vec![
                Point3f::new(0.0, 0.0, -5.0),
                Point3f::new(0.1, 0.0, -2.0),
                Point3f::new(1.0, 0.0, -1.0),
            ],
            ..HotspotConfig::default()
        };
        let layer = HotspotLayer::new(&config);
        let ray = Ray::new(Point3f::origin(), -Vector3f::z()).unwrap();

        assert_eq!(layer.pick(&ray, 0.1, 1000.0), Some(1));
        // The near point falls in front of the near plane
        assert_eq!(layer.pick(&ray, 3.0, 1000.0), Some(0));

        let miss = Ray::new(Point3f::new(5.0, 5.0, 0.0), -Vector3f::z()).unwrap();
        assert_eq!(layer.pick(&miss, 0.1, 1000.0), None);
    }

    #[test]
    fn test_hover_is_mutually_exclusive() {
        let mut layer = layer();
        let camera = camera_facing(Point3f::new(0.0, 25.0, 0.0));
        let pixel = Point2f::new(300.0, 200.0);

        layer.set_hover(Some(1), &camera, pixel);
        layer.set_hover(Some(3), &camera, pixel);

        let colors = layer.batch().buffer().colors();
        assert_eq!(colors.iter().filter(|c| **c == HIGHLIGHT_COLOR).count(), 1);
        assert_eq!(colors[3], HIGHLIGHT_COLOR);
        assert_eq!(colors[1], RESTING_COLOR);
        assert_eq!(layer.hovered(), Some(3));

        let tooltip = layer.tooltip().unwrap();
        assert_eq!(tooltip.text, "Point 4 - Click to open");
        assert_eq!(tooltip.position, Point2f::new(315.0, 185.0));
        assert_eq!(layer.label().unwrap().title, "Point 4 Content");

        layer.set_hover(None, &camera, pixel);
        assert!(layer.batch().buffer().colors().iter().all(|c| *c == RESTING_COLOR));
        assert!(layer.label().is_none());
        assert!(layer.tooltip().is_none());
        assert!(!layer.frame_batch().is_visible());
    }

    #[test]
    fn test_staying_on_a_point_writes_nothing() {
        let mut layer = layer();
        let camera = camera_facing(Point3f::new(0.0, 25.0, 0.0));
        layer.set_hover(Some(0), &camera, Point2f::origin());
        let revision = layer.batch().revision();

        layer.set_hover(Some(0), &camera, Point2f::new(50.0, 50.0));
        assert_eq!(layer.batch().revision(), revision);
    }

    #[test]
    fn test_frame_sits_above_point_facing_camera() {
        let mut layer = layer();
        let hotspot = HotspotConfig::default().positions[2];
        // Eye level with the frame, so the frame plane is exactly vertical
        let camera = camera_facing(hotspot + Vector3f::new(0.0, 0.4, 0.0));
        layer.set_hover(Some(2), &camera, Point2f::origin());

        let label = layer.label().unwrap();
        assert_relative_eq!(label.position, hotspot + Vector3f::new(0.0, 0.4, 0.0), epsilon = 1e-5);

        let frame = layer.frame_batch();
        assert!(frame.is_visible());
        let (min, max) = frame.buffer().bounding_box();
        assert_relative_eq!(max.x - min.x, FRAME_WIDTH, epsilon = 1e-4);
        assert_relative_eq!(max.y - min.y, FRAME_HEIGHT, epsilon = 1e-4);
        assert_relative_eq!(max.z - min.z, 0.0, epsilon = 1e-4);
        assert_relative_eq!(frame.buffer().center(), label.position, epsilon = 1e-4);
    }

    #[test]
    fn test_pulse_only_touches_size() {
        let mut layer = layer();
        let camera = camera_facing(Point3f::new(0.0, 25.0, 0.0));
        layer.set_hover(Some(2), &camera, Point2f::origin());

        let quarter_period = std::f64::consts::FRAC_PI_2 / 0.002;
        layer.pulse(quarter_period);
        assert_relative_eq!(layer.batch().material().size, 0.15 * 1.3, epsilon = 1e-5);

        layer.pulse(0.0);
        assert_relative_eq!(layer.batch().material().size, 0.15);
        assert_eq!(layer.hovered(), Some(2));
        assert_eq!(layer.batch().buffer().colors()[2], HIGHLIGHT_COLOR);
    }

    #[test]
    fn test_click_navigates_to_page() {
        let mut layer = layer();
        let mut navigator = LoggingNavigator::default();
        assert_eq!(layer.click(&mut navigator), None);

        let camera = camera_facing(Point3f::new(0.0, 25.0, 0.0));
        layer.set_hover(Some(4), &camera, Point2f::origin());
        assert_eq!(layer.click(&mut navigator), Some(4));
        assert_eq!(navigator.history, vec!["point5.html".to_string()]);
    }

    #[test]
    fn test_pointer_sample_ndc() {
        let sample = PointerSample::from_pixel(0.0, 0.0, 800.0, 600.0);
        assert_eq!(sample.ndc, Point2f::new(-1.0, 1.0));
        let center = PointerSample::from_pixel(400.0, 300.0, 800.0, 600.0);
        assert_eq!(center.ndc, Point2f::new(0.0, 0.0));
    }

    #[test]
    fn test_update_hovers_point_under_pointer() {
        let mut layer = layer();
        let hotspot = HotspotConfig::default().positions[0];
        let camera = camera_facing(hotspot);

        // The hotspot sits on the view axis, so the window centre picks it
        let pointer = PointerSample::from_pixel(400.0, 300.0, 800.0, 600.0);
        layer.update(&camera, Some(&pointer), 0.0);
        assert_eq!(layer.hovered(), Some(0));

        let corner = PointerSample::from_pixel(0.0, 0.0, 800.0, 600.0);
        layer.update(&camera, Some(&corner), 16.0);
        assert_eq!(layer.hovered(), None);
    }

    #[test]
    fn test_random_pointer_paths_highlight_at_most_one() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut layer = layer();
        let positions = HotspotConfig::default().positions;
        let mut camera = Camera::default();
        camera.position = Point3f::new(0.0, 28.0, 30.0);
        camera.target = Point3f::new(0.0, 28.0, 0.0);
        let view_proj = camera.view_projection();
        let (width, height) = (800.0, 600.0);

        let mut rng = StdRng::seed_from_u64(21);
        let mut hovers = 0;
        for step in 0..500 {
            // Every third sample lands exactly on a hotspot
            let (x, y) = if step % 3 == 0 {
                let p = positions[rng.gen_range(0..positions.len())];
                let clip = view_proj * p.to_homogeneous();
                let ndc = clip.xy() / clip.w;
                ((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height)
            } else {
                (rng.gen_range(0.0..width), rng.gen_range(0.0..height))
            };
            let pointer = PointerSample::from_pixel(x, y, width, height);
            layer.update(&camera, Some(&pointer), step as f64 * 16.0);

            let colors = layer.batch().buffer().colors();
            let highlighted: Vec<usize> = colors
                .iter()
                .enumerate()
                .filter(|(_, c)| **c == HIGHLIGHT_COLOR)
                .map(|(i, _)| i)
                .collect();
            match layer.hovered() {
                Some(index) => {
                    hovers += 1;
                    assert_eq!(highlighted, vec![index]);
                    assert!(layer.tooltip().is_some());
                }
                None => {
                    assert!(highlighted.is_empty());
                    assert!(layer.tooltip().is_none());
                    assert!(!layer.frame_batch().is_visible());
                }
            }
        }
        assert!(hovers > 0);
    }
}
