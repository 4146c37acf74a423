//! Application context
//!
//! [`ForestApp`] owns everything one session needs: configuration, camera
//! controller, scene batches, hotspot layer, input routing, navigator and
//! the render surface. The host drives it with [`ForestApp::frame`],
//! [`ForestApp::handle_input`], [`ForestApp::resize`] and delivers the tree
//! model through [`ForestApp::on_model_loaded`].

use crate::camera::Camera;
use crate::controller::{CameraController, ControllerSettings};
use crate::hotspots::{HotspotLayer, LoggingNavigator, Navigator, PointerSample};
use crate::input::{InputEvent, InputKind, InputRouter, ListenerId, PointerButton};
use crate::overlay::ControlsHint;
use crate::scene::Scene;
use canopy_core::{BatchRole, Model, Point2f, RenderSurface, Result, SceneConfig, ViewportSize};
use canopy_generation::{
    build_centerpiece, generate_forest, generate_ground, CenterpieceSource, ForestStats,
};
use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;

/// One interactive forest session
pub struct ForestApp<S, N = LoggingNavigator> {
    config: SceneConfig,
    controller: CameraController,
    scene: Scene,
    forest_stats: ForestStats,
    hotspots: Option<HotspotLayer>,
    centerpiece: Option<CenterpieceSource>,
    router: InputRouter,
    listeners: Vec<ListenerId>,
    pointer: Option<Point2f>,
    pending_clicks: usize,
    viewport: ViewportSize,
    navigator: N,
    surface: S,
    hint: ControlsHint,
    rng: StdRng,
    elapsed: Duration,
}

impl<S: RenderSurface, N: Navigator> ForestApp<S, N> {
    /// Build the ground and forest and set up the camera.
    ///
    /// # Arguments
    /// * `config` - Scene configuration, validated here
    /// * `surface` - Surface to draw into; it is resized to `viewport`
    /// * `viewport` - Initial viewport size in pixels
    /// * `navigator` - Receives hotspot pages on click
    ///
    /// # Returns
    /// The app, with the centerpiece tree still pending
    pub fn new(config: SceneConfig, mut surface: S, viewport: ViewportSize, navigator: N) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut scene = Scene::new();
        scene.insert(BatchRole::Ground, generate_ground(&config.ground, &mut rng));
        let forest = generate_forest(&config.forest, &mut rng);
        let forest_stats = forest.stats;
        scene.insert(BatchRole::Forest, forest.batch);

        let camera = Camera::from_config(&config.camera, viewport.aspect());
        let mut controller =
            CameraController::new(camera, ControllerSettings::from_config(&config.camera));
        controller.set_zoom_limits(config.camera.min_distance, config.camera.max_distance);

        let mut router = InputRouter::new();
        controller.attach(&mut router);
        let listeners = vec![
            router.subscribe(InputKind::PointerMove),
            router.subscribe(InputKind::PointerUp),
        ];

        surface.resize(viewport);

        log::info!(
            "scene ready: {} points in {} batches",
            scene.point_count(),
            scene.len()
        );

        Ok(Self {
            config,
            controller,
            scene,
            forest_stats,
            hotspots: None,
            centerpiece: None,
            router,
            listeners,
            pointer: None,
            pending_clicks: 0,
            viewport,
            navigator,
            surface,
            hint: ControlsHint::default(),
            rng,
            elapsed: Duration::ZERO,
        })
    }

    /// Queue an input event for the next frame
    pub fn handle_input(&mut self, event: InputEvent) {
        self.router.dispatch(event);
    }

    /// Advance one frame at `elapsed` since start: camera, then hotspots
    /// (once the tree exists), then drawing.
    pub fn frame(&mut self, elapsed: Duration) -> Result<()> {
        self.elapsed = elapsed;

        self.controller.pump(&mut self.router);
        self.controller.update();

        for event in self.router.drain(&self.listeners) {
            match event {
                InputEvent::PointerMove { x, y } => self.pointer = Some(Point2f::new(x, y)),
                InputEvent::PointerUp {
                    button: PointerButton::Primary,
                } => self.pending_clicks += 1,
                _ => {}
            }
        }
        let clicks = std::mem::take(&mut self.pending_clicks);

        if let Some(layer) = self.hotspots.as_mut() {
            for _ in 0..clicks {
                layer.click(&mut self.navigator);
            }

            let pointer = self.pointer.map(|p| {
                PointerSample::from_pixel(
                    p.x,
                    p.y,
                    self.viewport.width as f32,
                    self.viewport.height as f32,
                )
            });
            layer.update(
                self.controller.camera(),
                pointer.as_ref(),
                elapsed.as_secs_f64() * 1000.0,
            );
        }

        let mut list = self
            .scene
            .draw_list(self.controller.camera().frame(), self.config.camera.background);
        if let Some(layer) = &self.hotspots {
            list.push(BatchRole::Hotspots, layer.batch());
            list.push(BatchRole::HoverFrame, layer.frame_batch());
        }
        self.surface.draw(&list)
    }

    /// Follow a viewport size change
    pub fn resize(&mut self, size: ViewportSize) {
        if size.is_empty() {
            return;
        }
        self.viewport = size;
        self.controller.camera_mut().set_viewport(size);
        self.surface.resize(size);
    }

    /// Receive the tree model load result: build the centerpiece (or the
    /// fallback), add the hotspots and start the controls hint.
    pub fn on_model_loaded(&mut self, loaded: Result<Model>) -> &CenterpieceSource {
        let tree = build_centerpiece(loaded, &self.config.tree, &mut self.rng);
        self.scene.insert(BatchRole::Tree, tree.batch);
        self.hotspots = Some(HotspotLayer::new(&self.config.hotspots));
        self.hint.start(self.elapsed);
        log::info!(
            "tree ready ({}), {} hotspots",
            if tree.source.is_fallback() { "fallback" } else { "model" },
            self.config.hotspots.positions.len()
        );
        self.centerpiece.insert(tree.source)
    }

    /// Detach every input listener and drop the scene
    pub fn shutdown(&mut self) {
        self.controller.detach(&mut self.router);
        for id in self.listeners.drain(..) {
            self.router.unsubscribe(id);
        }
        self.scene.clear();
        self.hotspots = None;
        log::info!("session closed");
    }

    pub fn reset_camera(&mut self) {
        self.controller.reset();
    }

    /// Text for the host's status line: the hover tooltip, or the controls hint while it shows
    pub fn status_text(&self) -> Option<String> {
        if let Some(tooltip) = self.hotspots.as_ref().and_then(HotspotLayer::tooltip) {
            return Some(tooltip.text.clone());
        }
        self.hint.text(self.elapsed).map(str::to_string)
    }

    pub fn is_ready(&self) -> bool {
        self.hotspots.is_some()
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CameraController {
        &mut self.controller
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn forest_stats(&self) -> &ForestStats {
        &self.forest_stats
    }

    pub fn hotspots(&self) -> Option<&HotspotLayer> {
        self.hotspots.as_ref()
    }

    pub fn centerpiece(&self) -> Option<&CenterpieceSource> {
        self.centerpiece.as_ref()
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }
}
