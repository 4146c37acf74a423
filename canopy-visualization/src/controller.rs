//! First-person camera controller
//!
//! The controller keeps a yaw/pitch look direction and moves the camera and
//! its target together. Input handlers only record what happened; the
//! recorded input is applied once per frame by [`CameraController::update`].
//!
//! Yaw is measured about world Y from +Z towards +X, pitch from the
//! horizontal plane. The look direction is
//! `(sin yaw · cos pitch, sin pitch, cos yaw · cos pitch)`.

use crate::camera::Camera;
use crate::input::{InputEvent, InputKind, InputRouter, InputState, ListenerId, MoveKey, PointerButton};
use canopy_core::{CameraConfig, Point2f, Point3f, Vector2f, Vector3f};
use std::f32::consts::FRAC_PI_2;

/// Pitch stays this far from straight up or down
pub const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.1;

/// Tuning for the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    pub move_speed: f32,
    pub rotate_speed: f32,
    pub vertical_speed: f32,
    pub turn_rate: f32,
    pub zoom_step: f32,
    pub max_drag_delta: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl ControllerSettings {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            move_speed: config.move_speed,
            rotate_speed: config.rotate_speed,
            vertical_speed: config.vertical_speed,
            turn_rate: config.turn_rate,
            zoom_step: config.zoom_step,
            max_drag_delta: config.max_drag_delta,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

/// Unit look direction for a yaw and pitch
pub fn look_direction(yaw: f32, pitch: f32) -> Vector3f {
    Vector3f::new(yaw.sin() * pitch.cos(), pitch.sin(), yaw.cos() * pitch.cos())
}

/// Yaw and pitch of the direction from `position` to `target`
pub fn orientation_between(position: &Point3f, target: &Point3f) -> (f32, f32) {
    let Some(dir) = (target - position).try_normalize(f32::EPSILON) else {
        return (0.0, 0.0);
    };
    let yaw = dir.x.atan2(dir.z);
    let pitch = dir.y.atan2((dir.x * dir.x + dir.z * dir.z).sqrt());
    (yaw, pitch)
}

/// Yaw, clamped pitch and the target reached from `position` along them.
///
/// The target is unchanged unless the pitch had to be clamped; then it is
/// moved onto the clamped look direction at the same distance.
fn clamped_pose(position: &Point3f, target: &Point3f) -> (f32, f32, Point3f) {
    let (yaw, pitch) = orientation_between(position, target);
    let clamped = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    if clamped == pitch {
        return (yaw, pitch, *target);
    }
    let distance = (target - position).norm();
    (yaw, clamped, position + look_direction(yaw, clamped) * distance)
}

/// First-person camera controller
#[derive(Debug)]
pub struct CameraController {
    camera: Camera,
    settings: ControllerSettings,
    yaw: f32,
    pitch: f32,
    initial_position: Point3f,
    initial_target: Point3f,

    drag_button: Option<PointerButton>,
    pointer: Point2f,
    keys: InputState,
    pending_look: Vec<Vector2f>,
    pending_zoom: Vec<f32>,

    listeners: Vec<ListenerId>,
}

impl CameraController {
    /// Take control of `camera`. Its current pose becomes the pose that
    /// [`reset`](Self::reset) restores.
    pub fn new(mut camera: Camera, settings: ControllerSettings) -> Self {
        let (yaw, pitch, target) = clamped_pose(&camera.position, &camera.target);
        camera.target = target;
        Self {
            initial_position: camera.position,
            initial_target: camera.target,
            camera,
            settings,
            yaw,
            pitch,
            drag_button: None,
            pointer: Point2f::origin(),
            keys: InputState::default(),
            pending_look: Vec::new(),
            pending_zoom: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access for projection changes such as the aspect ratio
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn position(&self) -> Point3f {
        self.camera.position
    }

    pub fn target(&self) -> Point3f {
        self.camera.target
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn distance(&self) -> f32 {
        self.camera.distance()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_button.is_some()
    }

    pub fn keys(&self) -> &InputState {
        &self.keys
    }

    pub fn zoom_limits(&self) -> (f32, f32) {
        (self.settings.min_distance, self.settings.max_distance)
    }

    pub fn is_attached(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Start a drag. Ignored while another button is held and for buttons that do not drag.
    pub fn on_pointer_down(&mut self, button: PointerButton, x: f32, y: f32) {
        if self.drag_button.is_some() || !button.starts_drag() {
            return;
        }
        self.drag_button = Some(button);
        self.pointer = Point2f::new(x, y);
    }

    /// Track the pointer and, while dragging, record a look delta clamped
    /// to the maximum drag length
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        let position = Point2f::new(x, y);
        let mut delta = position - self.pointer;
        self.pointer = position;

        if self.drag_button.is_none() {
            return;
        }

        let max = self.settings.max_drag_delta;
        let length = delta.norm();
        if length > max {
            delta *= max / length;
        }
        self.pending_look.push(delta);
    }

    /// End the drag if `button` is the one that started it
    pub fn on_pointer_up(&mut self, button: PointerButton) {
        if self.drag_button == Some(button) {
            self.drag_button = None;
        }
    }

    /// Record one zoom step. Positive deltas move away from the target.
    pub fn on_wheel(&mut self, delta_y: f32) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let step = if delta_y > 0.0 {
            -self.settings.zoom_step
        } else {
            self.settings.zoom_step
        };
        self.pending_zoom.push(step);
    }

    pub fn on_key_down(&mut self, key: MoveKey) {
        self.keys.set(key, true);
    }

    pub fn on_key_up(&mut self, key: MoveKey) {
        self.keys.set(key, false);
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { button, x, y } => self.on_pointer_down(button, x, y),
            InputEvent::PointerMove { x, y } => self.on_pointer_move(x, y),
            InputEvent::PointerUp { button } => self.on_pointer_up(button),
            InputEvent::Wheel { delta_y } => self.on_wheel(delta_y),
            InputEvent::KeyDown(key) => self.on_key_down(key),
            InputEvent::KeyUp(key) => self.on_key_up(key),
        }
    }

    /// Subscribe one listener per input kind
    pub fn attach(&mut self, router: &mut InputRouter) {
        if self.is_attached() {
            self.detach(router);
        }
        self.listeners = InputKind::ALL.iter().map(|&kind| router.subscribe(kind)).collect();
    }

    /// Unsubscribe every listener registered by [`attach`](Self::attach)
    pub fn detach(&mut self, router: &mut InputRouter) {
        for id in self.listeners.drain(..) {
            router.unsubscribe(id);
        }
    }

    /// Feed the events queued for this controller's listeners into the handlers
    pub fn pump(&mut self, router: &mut InputRouter) {
        if self.listeners.is_empty() {
            return;
        }
        for event in router.drain(&self.listeners) {
            self.handle_event(event);
        }
    }

    /// Apply the input recorded since the last frame
    pub fn update(&mut self) {
        for delta in std::mem::take(&mut self.pending_look) {
            self.apply_look(delta);
        }
        for step in std::mem::take(&mut self.pending_zoom) {
            self.apply_zoom(step);
        }
        self.apply_keys();
    }

    fn apply_look(&mut self, delta: Vector2f) {
        let speed = self.settings.rotate_speed;
        self.yaw -= delta.x * speed;
        self.pitch = (self.pitch - delta.y * speed).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.retarget();
    }

    fn apply_zoom(&mut self, step: f32) {
        let Some(direction) = (self.camera.target - self.camera.position).try_normalize(f32::EPSILON) else {
            return;
        };
        let position = self.camera.position + direction * step;
        let distance = (self.camera.target - position).norm();
        if distance >= self.settings.min_distance && distance <= self.settings.max_distance {
            self.camera.position = position;
        }
    }

    fn apply_keys(&mut self) {
        let keys = self.keys;
        let speed = self.settings.move_speed;

        // Camera-local movement: -z is forward, +x is right
        let mut local = Vector3f::zeros();
        if keys.forward {
            local.z -= speed;
        }
        if keys.backward {
            local.z += speed;
        }
        if keys.left {
            local.x -= speed;
        }
        if keys.right {
            local.x += speed;
        }
        if local != Vector3f::zeros() {
            let world = self.camera.right() * local.x
                + self.camera.view_up() * local.y
                - self.camera.forward() * local.z;
            self.translate(world);
        }

        let mut vertical = 0.0;
        if keys.up {
            vertical += self.settings.vertical_speed;
        }
        if keys.down {
            vertical -= self.settings.vertical_speed;
        }
        if vertical != 0.0 {
            self.translate(Vector3f::new(0.0, vertical, 0.0));
        }

        if keys.turn_left {
            self.yaw += self.settings.turn_rate;
            self.retarget();
        }
        if keys.turn_right {
            self.yaw -= self.settings.turn_rate;
            self.retarget();
        }
    }

    fn translate(&mut self, offset: Vector3f) {
        self.camera.position += offset;
        self.camera.target += offset;
    }

    /// Put the target on the look direction at the current distance
    fn retarget(&mut self) {
        let distance = self.camera.distance();
        self.camera.target = self.camera.position + look_direction(self.yaw, self.pitch) * distance;
    }

    /// Change the zoom limits and pull the camera back inside them along its current view axis
    pub fn set_zoom_limits(&mut self, min: f32, max: f32) {
        self.settings.min_distance = min;
        self.settings.max_distance = max;

        let distance = self.camera.distance();
        let clamped = if distance < min {
            min
        } else if distance > max {
            max
        } else {
            return;
        };

        let Some(back) = (self.camera.position - self.camera.target).try_normalize(f32::EPSILON) else {
            return;
        };
        self.camera.position = self.camera.target + back * clamped;
        log::debug!("camera snapped from distance {:.2} to {:.2}", distance, clamped);
    }

    /// Restore the initial pose exactly
    pub fn reset(&mut self) {
        let (yaw, pitch, target) = clamped_pose(&self.initial_position, &self.initial_target);
        self.camera.position = self.initial_position;
        self.camera.target = target;
        self.yaw = yaw;
        self.pitch = pitch;
        self.pending_look.clear();
        self.pending_zoom.clear();
        log::info!("camera reset to position {:?}", self.initial_position);
    }

    /// Replace the pose that [`reset`](Self::reset) restores. A target too
    /// close to straight up or down is moved onto the pitch limit.
    pub fn set_initial_pose(&mut self, position: Point3f, target: Point3f) {
        let (_, _, target) = clamped_pose(&position, &target);
        self.initial_position = position;
        self.initial_target = target;
    }

    pub fn initial_pose(&self) -> (Point3f, Point3f) {
        (self.initial_position, self.initial_target)
    }
}
