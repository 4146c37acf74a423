//! Native viewer window
//!
//! Runs a [`ForestApp`] in a winit window with the wgpu point renderer. The
//! tree model is read after the first frame has been presented, so the
//! window shows the ground and forest while the model loads. Hover tooltips
//! and the controls hint appear in the window title.

use crate::app::ForestApp;
use crate::hotspots::LoggingNavigator;
use crate::input::{InputEvent, MoveKey, PointerButton};
use canopy_core::{Error, Result, SceneConfig, ViewportSize};
use canopy_gpu::{PointCloudRenderer, RenderConfig};
use std::sync::Arc;
use std::time::Instant;
use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

const TITLE: &str = "Canopy";

/// Window options
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub render: RenderConfig,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            title: TITLE.to_string(),
            width: 1280,
            height: 800,
            render: RenderConfig::default(),
        }
    }
}

/// Interactive forest viewer
pub struct Viewer {
    config: SceneConfig,
    options: ViewerOptions,
}

impl Viewer {
    pub fn new(config: SceneConfig) -> Self {
        Self::with_options(config, ViewerOptions::default())
    }

    pub fn with_options(config: SceneConfig, options: ViewerOptions) -> Self {
        Self { config, options }
    }

    /// Open the window and run until it is closed
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()
            .map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(&self.options.title)
                .with_inner_size(LogicalSize::new(self.options.width, self.options.height))
                .build(&event_loop)
                .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
        );

        let renderer = pollster::block_on(PointCloudRenderer::new(
            window.clone(),
            self.options.render.clone(),
        ))?;
        let size = window.inner_size();
        let mut app = ForestApp::new(
            self.config,
            renderer,
            ViewportSize::new(size.width, size.height),
            LoggingNavigator::default(),
        )?;

        let model_path = app.config().tree.model_path.clone();
        let base_title = self.options.title;
        let start = Instant::now();
        let mut cursor = PhysicalPosition::new(0.0f64, 0.0f64);
        let mut model_requested = false;
        let mut shown_title = base_title.clone();
        let mut failure: Option<Error> = None;

        log::info!("viewer started");

        event_loop
            .run(|event, target| {
                target.set_control_flow(ControlFlow::Poll);

                match event {
                    Event::WindowEvent { event, .. } => match event {
                        WindowEvent::CloseRequested => {
                            app.shutdown();
                            target.exit();
                        }
                        WindowEvent::Resized(new_size) => {
                            app.resize(ViewportSize::new(new_size.width, new_size.height));
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            cursor = position;
                            app.handle_input(InputEvent::PointerMove {
                                x: position.x as f32,
                                y: position.y as f32,
                            });
                        }
                        WindowEvent::MouseInput { state, button, .. } => {
                            let button = pointer_button(button);
                            app.handle_input(match state {
                                ElementState::Pressed => InputEvent::PointerDown {
                                    button,
                                    x: cursor.x as f32,
                                    y: cursor.y as f32,
                                },
                                ElementState::Released => InputEvent::PointerUp { button },
                            });
                        }
                        WindowEvent::MouseWheel { delta, .. } => {
                            // winit reports scrolling up as positive, browsers as negative
                            let delta_y = match delta {
                                MouseScrollDelta::LineDelta(_, y) => -y,
                                MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                            };
                            app.handle_input(InputEvent::Wheel { delta_y });
                        }
                        WindowEvent::KeyboardInput { event, .. } => {
                            let PhysicalKey::Code(code) = event.physical_key else {
                                return;
                            };
                            let pressed = event.state == ElementState::Pressed;
                            if let Some(key) = move_key(code) {
                                app.handle_input(if pressed {
                                    InputEvent::KeyDown(key)
                                } else {
                                    InputEvent::KeyUp(key)
                                });
                            } else if pressed && !event.repeat {
                                match code {
                                    KeyCode::KeyR => app.reset_camera(),
                                    KeyCode::Escape => {
                                        app.shutdown();
                                        target.exit();
                                    }
                                    _ => {}
                                }
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            if let Err(e) = app.frame(start.elapsed()) {
                                log::error!("render failed: {}", e);
                                failure = Some(e);
                                app.shutdown();
                                target.exit();
                                return;
                            }

                            if !model_requested {
                                model_requested = true;
                                let loaded = canopy_io::read_model(&model_path);
                                app.on_model_loaded(loaded);
                            }

                            let title = match app.status_text() {
                                Some(status) => format!("{} | {}", base_title, status),
                                None => base_title.clone(),
                            };
                            if title != shown_title {
                                window.set_title(&title);
                                shown_title = title;
                            }
                        }
                        _ => {}
                    },
                    Event::AboutToWait => window.request_redraw(),
                    _ => {}
                }
            })
            .map_err(|e| Error::Visualization(format!("Event loop error: {}", e)))?;

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Middle => PointerButton::Middle,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Back => PointerButton::Other(3),
        MouseButton::Forward => PointerButton::Other(4),
        MouseButton::Other(n) => PointerButton::Other(n),
    }
}

fn move_key(code: KeyCode) -> Option<MoveKey> {
    Some(match code {
        KeyCode::KeyW => MoveKey::Forward,
        KeyCode::KeyS => MoveKey::Backward,
        KeyCode::KeyA => MoveKey::Left,
        KeyCode::KeyD => MoveKey::Right,
        KeyCode::KeyQ => MoveKey::TurnLeft,
        KeyCode::KeyE => MoveKey::TurnRight,
        KeyCode::Space => MoveKey::Up,
        KeyCode::ShiftLeft => MoveKey::Down,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(move_key(KeyCode::KeyW), Some(MoveKey::Forward));
        assert_eq!(move_key(KeyCode::ShiftLeft), Some(MoveKey::Down));
        assert_eq!(move_key(KeyCode::ShiftRight), None);
        assert_eq!(move_key(KeyCode::KeyR), None);
    }

    #[test]
    fn test_button_mapping() {
        assert_eq!(pointer_button(MouseButton::Left), PointerButton::Primary);
        assert_eq!(pointer_button(MouseButton::Right), PointerButton::Secondary);
        assert_eq!(pointer_button(MouseButton::Other(7)), PointerButton::Other(7));
    }
}
