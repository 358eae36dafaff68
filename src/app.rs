//! # Application Module
//!
//! `App` is the winit [`ApplicationHandler`] of the viewer. On the first `resumed` call it opens
//! the window, sets up the egui integration and blocks on [`Renderer::new`]; afterwards every
//! window event is offered to egui first and, if egui does not consume it, drives the orbit
//! camera or the window lifecycle.
//!
//! Each redraw builds the "Lighting" window, hands its edits to the renderer, and renders one
//! frame. A new redraw is requested after every event so the scene keeps animating.
//!
//! If setup fails the error is kept and the event loop exits; see [`App::take_error`].

use std::sync::Arc;

use web_time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Theme, Window, WindowId},
};

use crate::camera::OrbitCamera;
use crate::config::ViewerConfig;
use crate::error::{Error, Result};
use crate::renderer::Renderer;
use crate::uniform_buffer::LIGHT_COUNT;

/// Pixel scroll deltas (touchpads) are converted to wheel lines with this factor.
const PIXELS_PER_SCROLL_LINE: f64 = 40.0;

/// Weight of the newest frame in the smoothed frame time.
const FRAME_TIME_SMOOTHING: f32 = 0.05;

pub struct App {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    gui_state: Option<egui_winit::State>,
    last_render_time: Option<Instant>,
    start_time: Instant,
    last_size: (u32, u32),
    camera: OrbitCamera,
    cursor_position: (f64, f64),
    animate: bool,
    frame_time: f32,
    error: Option<Error>,
}

impl App {
    pub fn new(config: ViewerConfig) -> Self {
        let camera = OrbitCamera::new(config.camera.camera_state(), config.camera.drag_state());
        let animate = config.scene.animate;
        Self {
            config,
            window: None,
            renderer: None,
            gui_state: None,
            last_render_time: None,
            start_time: Instant::now(),
            last_size: (0, 0),
            camera,
            cursor_position: (0.0, 0.0),
            animate,
            frame_time: 0.0,
            error: None,
        }
    }

    /// The setup error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ))
            .with_resizable(self.config.window.resizable);
        let window = Arc::new(event_loop.create_window(attributes)?);

        let gui_context = egui::Context::default();
        let viewport_id = gui_context.viewport_id();
        let gui_state = egui_winit::State::new(
            gui_context,
            viewport_id,
            &window,
            Some(window.scale_factor() as _),
            Some(Theme::Dark),
            None,
        );

        let PhysicalSize { width, height } = window.inner_size();
        let (width, height) = (width.max(1), height.max(1));
        log::info!("Window created ({width} x {height})");

        let renderer = pollster::block_on(Renderer::new(
            window.clone(),
            width,
            height,
            &self.config,
        ))?;

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.gui_state = Some(gui_state);
        self.last_size = (width, height);
        self.last_render_time = Some(Instant::now());
        Ok(())
    }
}

/// Exponential moving average of the frame time. The first frame seeds the average.
fn smooth_frame_time(average: f32, delta_time: Duration) -> f32 {
    let seconds = delta_time.as_secs_f32();
    if average == 0.0 {
        seconds
    } else {
        average + (seconds - average) * FRAME_TIME_SMOOTHING
    }
}

/// Converts a wheel event into scroll lines, positive away from the user.
fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_SCROLL_LINE) as f32,
    }
}

/// A left button release ends a camera drag even when it lands on the GUI.
fn ends_drag(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::MouseInput {
            state: ElementState::Released,
            button: MouseButton::Left,
            ..
        }
    )
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(error) = self.init(event_loop) {
            self.error = Some(error);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(gui_state), Some(renderer), Some(window), Some(last_render_time)) = (
            self.gui_state.as_mut(),
            self.renderer.as_mut(),
            self.window.as_ref(),
            self.last_render_time.as_mut(),
        ) else {
            return;
        };

        let consumed = gui_state.on_window_event(window, &event).consumed;
        if ends_drag(&event) {
            let (x, y) = self.cursor_position;
            self.camera.mouse_button(false, x, y);
        }
        if consumed {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let (x, y) = self.cursor_position;
                self.camera
                    .mouse_button(state == ElementState::Pressed, x, y);
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_position = (position.x, position.y);
                self.camera.mouse_move(position.x, position.y);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.camera.scroll(scroll_lines(delta));
            }

            WindowEvent::Resized(PhysicalSize { width, height }) => {
                log::info!("Resizing renderer surface to: ({width}, {height})");
                renderer.resize(width, height);
                if width > 0 && height > 0 {
                    self.last_size = (width, height);
                }
            }

            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting...");
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta_time = now - *last_render_time;
                *last_render_time = now;

                self.frame_time = smooth_frame_time(self.frame_time, delta_time);

                self.camera.update_inertia();

                let gui_input = gui_state.take_egui_input(window);
                gui_state.egui_ctx().begin_pass(gui_input);

                let mut lighting = *renderer.lighting();
                let fps = if self.frame_time > 0.0 {
                    1.0 / self.frame_time
                } else {
                    0.0
                };
                egui::Window::new("Lighting").show(gui_state.egui_ctx(), |ui| {
                    for light in 0..LIGHT_COUNT {
                        let color = &mut lighting.colors[light];
                        let mut rgb = [color.x, color.y, color.z];
                        ui.horizontal(|ui| {
                            ui.label(format!("Color #{light}"));
                            if ui.color_edit_button_rgb(&mut rgb).changed() {
                                color.x = rgb[0];
                                color.y = rgb[1];
                                color.z = rgb[2];
                            }
                        });

                        let direction = &mut lighting.directions[light];
                        ui.horizontal(|ui| {
                            ui.label(format!("Direction #{light}"));
                            ui.add(egui::DragValue::new(&mut direction.x).speed(0.01));
                            ui.add(egui::DragValue::new(&mut direction.y).speed(0.01));
                            ui.add(egui::DragValue::new(&mut direction.z).speed(0.01));
                        });
                    }
                    ui.separator();
                    ui.checkbox(&mut self.animate, "Spin model");
                    ui.label(format!("{fps:.1} FPS"));
                });
                renderer.set_lighting(lighting);

                let egui_winit::egui::FullOutput {
                    textures_delta,
                    shapes,
                    pixels_per_point,
                    platform_output,
                    ..
                } = gui_state.egui_ctx().end_pass();

                gui_state.handle_platform_output(window, platform_output);

                let paint_jobs = gui_state.egui_ctx().tessellate(shapes, pixels_per_point);

                let screen_descriptor = {
                    let (width, height) = self.last_size;
                    egui_wgpu::ScreenDescriptor {
                        size_in_pixels: [width, height],
                        pixels_per_point: window.scale_factor() as f32,
                    }
                };

                renderer.render_frame(
                    screen_descriptor,
                    paint_jobs,
                    textures_delta,
                    &self.camera,
                    self.start_time.elapsed().as_secs_f32(),
                    self.animate,
                );
            }
            _ => (),
        }

        window.request_redraw();
    }
}
