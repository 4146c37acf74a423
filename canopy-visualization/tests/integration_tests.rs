//! Integration tests for an interactive forest session driven headlessly

use approx::assert_relative_eq;
use canopy_core::{
    BatchRole, HeadlessSurface, Model, Point3f, SceneConfig, TriangleMesh, Vector3f, ViewportSize,
};
use canopy_visualization::{
    ForestApp, InputEvent, MoveKey, Navigator, PointerButton, CONTROLS_TEXT,
};
use std::time::Duration;

#[derive(Default)]
struct RecordingNavigator {
    opened: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, target: &str) {
        self.opened.push(target.to_string());
    }
}

fn config() -> SceneConfig {
    let mut config = SceneConfig::default();
    config.seed = Some(11);
    config.forest.point_budget = 15_000;
    config.forest.floor_points = 1_500;
    config.ground.points = 800;
    config
}

fn session() -> ForestApp<HeadlessSurface, RecordingNavigator> {
    ForestApp::new(
        config(),
        HeadlessSurface::new(),
        ViewportSize::new(640, 480),
        RecordingNavigator::default(),
    )
    .unwrap()
}

fn tree_model() -> Model {
    let mut mesh = TriangleMesh::new();
    let a = mesh.add_vertex(Point3f::new(-1.0, 0.0, 0.0));
    let b = mesh.add_vertex(Point3f::new(1.0, 0.0, 0.0));
    let c = mesh.add_vertex(Point3f::new(0.0, 8.0, 0.0));
    mesh.add_face([a, b, c]);
    Model::new(vec![mesh])
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[test]
fn test_full_session() {
    let mut app = session();
    app.frame(ms(0)).unwrap();
    assert_eq!(app.surface().last_roles, vec![BatchRole::Ground, BatchRole::Forest]);

    let source = app.on_model_loaded(Ok(tree_model())).clone();
    assert!(!source.is_fallback());
    app.frame(ms(16)).unwrap();

    let roles = &app.surface().last_roles;
    assert!(roles.contains(&BatchRole::Tree));
    assert!(roles.contains(&BatchRole::Hotspots));
    assert!(app.surface().last_point_count > app.scene().get(BatchRole::Ground).unwrap().len());

    app.frame(ms(1_000)).unwrap();
    assert_eq!(app.status_text().as_deref(), Some(CONTROLS_TEXT));

    app.shutdown();
    assert_eq!(app.router().listener_count(), 0);
}

#[test]
fn test_drag_turns_the_view() {
    let mut app = session();
    let yaw = app.controller().yaw();
    let position = app.controller().position();

    app.handle_input(InputEvent::PointerDown {
        button: PointerButton::Primary,
        x: 320.0,
        y: 240.0,
    });
    for step in 1..=5 {
        app.handle_input(InputEvent::PointerMove {
            x: 320.0 + 20.0 * step as f32,
            y: 240.0,
        });
    }
    app.handle_input(InputEvent::PointerUp {
        button: PointerButton::Primary,
    });
    app.frame(ms(16)).unwrap();

    assert!((app.controller().yaw() - yaw).abs() > 1e-3);
    assert_relative_eq!(app.controller().position(), position, epsilon = 1e-4);
    assert!(!app.controller().is_dragging());

    // Moving after release no longer turns
    let turned = app.controller().yaw();
    app.handle_input(InputEvent::PointerMove { x: 100.0, y: 100.0 });
    app.frame(ms(32)).unwrap();
    assert_relative_eq!(app.controller().yaw(), turned);
}

#[test]
fn test_wheel_respects_zoom_limits() {
    let mut app = session();
    let (min, max) = app.controller().zoom_limits();

    for _ in 0..200 {
        app.handle_input(InputEvent::Wheel { delta_y: -100.0 });
    }
    app.frame(ms(16)).unwrap();
    let d = app.controller().distance();
    assert!(d >= min - 1e-3 && d <= max + 1e-3);

    for _ in 0..200 {
        app.handle_input(InputEvent::Wheel { delta_y: 100.0 });
    }
    app.frame(ms(32)).unwrap();
    let d = app.controller().distance();
    assert!(d >= min - 1e-3 && d <= max + 1e-3);
}

#[test]
fn test_keys_move_and_reset_restores() {
    let mut app = session();
    let start = app.controller().position();

    app.handle_input(InputEvent::KeyDown(MoveKey::Up));
    app.frame(ms(16)).unwrap();
    app.handle_input(InputEvent::KeyUp(MoveKey::Up));
    app.frame(ms(32)).unwrap();
    assert!(app.controller().position().y > start.y);

    app.reset_camera();
    assert_relative_eq!(app.controller().position(), start, epsilon = 1e-5);
}

#[test]
fn test_click_opens_hovered_hotspot() {
    let mut app = session();
    app.on_model_loaded(Ok(tree_model()));

    let hotspot = app.config().hotspots.positions[2];
    app.controller_mut()
        .set_initial_pose(hotspot + Vector3f::new(0.0, 0.0, 8.0), hotspot);
    app.reset_camera();

    app.handle_input(InputEvent::PointerMove { x: 320.0, y: 240.0 });
    app.frame(ms(16)).unwrap();
    assert_eq!(app.status_text().as_deref(), Some("Point 3 - Click to open"));

    app.handle_input(InputEvent::PointerUp {
        button: PointerButton::Primary,
    });
    app.frame(ms(32)).unwrap();
    assert_eq!(app.navigator().opened, vec!["point3.html".to_string()]);

    // A secondary release is not a click
    app.handle_input(InputEvent::PointerUp {
        button: PointerButton::Secondary,
    });
    app.frame(ms(48)).unwrap();
    assert_eq!(app.navigator().opened.len(), 1);
}
