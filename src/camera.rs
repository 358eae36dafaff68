//! # Orbit camera
//!
//! The camera orbits the origin on a sphere. Two angles place the eye on the sphere and a zoom
//! value scales its radius exponentially. Dragging with the left mouse button rotates the
//! camera, the scroll wheel zooms, and releasing the button lets the rotation coast to a stop
//! with a decaying velocity.
//!
//! The world is Z-up and left-handed, and the projection maps depth to `[0, 1]` as WebGPU
//! expects.

use nalgebra_glm as glm;

/// Elevation stays strictly inside the poles so the look-at basis never degenerates.
const MAX_ELEVATION: f32 = std::f32::consts::FRAC_PI_2 - 1e-5;
const MIN_ZOOM: f32 = -2.0;
const MAX_ZOOM: f32 = 2.0;
const MIN_VELOCITY: f32 = 1e-4;

pub const FIELD_OF_VIEW: f32 = 45.0;
pub const NEAR_PLANE: f32 = 0.01;
pub const FAR_PLANE: f32 = 100.0;

/// Where the camera sits on its orbit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    /// `x` is the azimuth around +Z, `y` the elevation above the XY plane, in radians.
    pub angles: glm::Vec2,
    /// The orbit radius is `exp(-zoom)`.
    pub zoom: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            angles: glm::vec2(0.8, 0.5),
            zoom: -1.2,
        }
    }
}

/// Mouse drag bookkeeping and the tuning constants for rotation and zoom.
#[derive(Clone, Copy, Debug)]
pub struct DragState {
    /// Whether a drag action is ongoing.
    pub active: bool,
    /// Mouse position (with X flipped) when the drag started.
    pub start_mouse: glm::Vec2,
    /// Camera state when the drag started.
    pub start_camera: CameraState,

    pub velocity: glm::Vec2,
    pub previous_delta: glm::Vec2,
    pub inertia: f32,

    pub sensitivity: f32,
    pub scroll_sensitivity: f32,
}

impl Default for DragState {
    fn default() -> Self {
        Self {
            active: false,
            start_mouse: glm::Vec2::zeros(),
            start_camera: CameraState::default(),
            velocity: glm::Vec2::zeros(),
            previous_delta: glm::Vec2::zeros(),
            inertia: 0.9,
            sensitivity: 0.01,
            scroll_sensitivity: 0.1,
        }
    }
}

/// The interactive camera: current state plus drag tracking.
#[derive(Clone, Copy, Debug, Default)]
pub struct OrbitCamera {
    pub state: CameraState,
    pub drag: DragState,
}

impl OrbitCamera {
    pub fn new(state: CameraState, drag: DragState) -> Self {
        Self { state, drag }
    }

    /// Starts a drag on press and ends it on release.
    pub fn mouse_button(&mut self, pressed: bool, x: f64, y: f64) {
        if pressed {
            self.drag.active = true;
            self.drag.start_mouse = glm::vec2(-x as f32, y as f32);
            self.drag.start_camera = self.state;
            self.drag.previous_delta = glm::Vec2::zeros();
            self.drag.velocity = glm::Vec2::zeros();
        } else {
            self.drag.active = false;
        }
    }

    /// Rotates the camera while a drag is active. Returns `true` if the camera moved.
    pub fn mouse_move(&mut self, x: f64, y: f64) -> bool {
        if !self.drag.active {
            return false;
        }
        let current = glm::vec2(-x as f32, y as f32);
        let delta = (current - self.drag.start_mouse) * self.drag.sensitivity;
        self.state.angles = self.drag.start_camera.angles + delta;
        self.state.angles.y = clamp_elevation(self.state.angles.y);

        self.drag.velocity = delta - self.drag.previous_delta;
        self.drag.previous_delta = delta;
        true
    }

    /// Zooms by `lines` scroll steps. Returns `true` if the zoom changed.
    pub fn scroll(&mut self, lines: f32) -> bool {
        let zoom = (self.state.zoom + self.drag.scroll_sensitivity * lines).clamp(MIN_ZOOM, MAX_ZOOM);
        let changed = zoom != self.state.zoom;
        self.state.zoom = zoom;
        changed
    }

    /// Keeps rotating after a drag ends, slowing down by `inertia` each frame.
    ///
    /// Returns `true` if the camera moved.
    pub fn update_inertia(&mut self) -> bool {
        if self.drag.active {
            return false;
        }
        if glm::length(&self.drag.velocity) < MIN_VELOCITY {
            return false;
        }
        self.state.angles += self.drag.velocity;
        self.state.angles.y = clamp_elevation(self.state.angles.y);
        self.drag.velocity *= self.drag.inertia;
        true
    }

    /// Camera eye in world space.
    pub fn eye_position(&self) -> glm::Vec3 {
        let (sx, cx) = self.state.angles.x.sin_cos();
        let (sy, cy) = self.state.angles.y.sin_cos();
        glm::vec3(cx * cy, sx * cy, sy) * (-self.state.zoom).exp()
    }

    /// World to view transform looking at the origin with +Z up.
    pub fn view_matrix(&self) -> glm::Mat4 {
        glm::look_at_lh(
            &self.eye_position(),
            &glm::Vec3::zeros(),
            &glm::Vec3::z(),
        )
    }

    pub fn projection_matrix(aspect_ratio: f32) -> glm::Mat4 {
        glm::perspective_lh_zo(
            aspect_ratio,
            FIELD_OF_VIEW.to_radians(),
            NEAR_PLANE,
            FAR_PLANE,
        )
    }
}

fn clamp_elevation(y: f32) -> f32 {
    y.clamp(-MAX_ELEVATION, MAX_ELEVATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn drag_rotates_relative_to_start() {
        let mut camera = OrbitCamera::default();
        camera.mouse_button(true, 100.0, 100.0);
        assert!(camera.mouse_move(90.0, 120.0));

        // X is flipped: moving left by 10 adds 10 * 0.01 to the azimuth.
        assert!(approx(camera.state.angles.x, 0.8 + 0.1));
        assert!(approx(camera.state.angles.y, 0.5 + 0.2));
        assert!(approx(camera.drag.velocity.x, 0.1));
    }

    #[test]
    fn moves_without_drag_are_ignored() {
        let mut camera = OrbitCamera::default();
        assert!(!camera.mouse_move(10.0, 10.0));
        assert_eq!(camera.state, CameraState::default());
    }

    #[test]
    fn elevation_is_clamped() {
        let mut camera = OrbitCamera::default();
        camera.mouse_button(true, 0.0, 0.0);
        camera.mouse_move(0.0, 10_000.0);
        assert!(camera.state.angles.y < std::f32::consts::FRAC_PI_2);
        assert!(approx(camera.state.angles.y, MAX_ELEVATION));
        camera.mouse_move(0.0, -10_000.0);
        assert!(approx(camera.state.angles.y, -MAX_ELEVATION));
    }

    #[test]
    fn scroll_zooms_and_clamps() {
        let mut camera = OrbitCamera::default();
        assert!(camera.scroll(2.0));
        assert!(approx(camera.state.zoom, -1.0));
        for _ in 0..100 {
            camera.scroll(1.0);
        }
        assert_eq!(camera.state.zoom, MAX_ZOOM);
        assert!(!camera.scroll(1.0));
    }

    #[test]
    fn inertia_decays_after_release() {
        let mut camera = OrbitCamera::default();
        camera.mouse_button(true, 0.0, 0.0);
        camera.mouse_move(-10.0, 0.0);
        camera.mouse_button(false, -10.0, 0.0);

        let before = camera.state.angles.x;
        assert!(camera.update_inertia());
        assert!(approx(camera.state.angles.x, before + 0.1));
        assert!(approx(camera.drag.velocity.x, 0.09));

        for _ in 0..1000 {
            camera.update_inertia();
        }
        assert!(!camera.update_inertia());
    }

    #[test]
    fn no_inertia_while_dragging() {
        let mut camera = OrbitCamera::default();
        camera.mouse_button(true, 0.0, 0.0);
        camera.mouse_move(-10.0, 0.0);
        assert!(!camera.update_inertia());
    }

    #[test]
    fn eye_sits_on_the_orbit() {
        let camera = OrbitCamera::new(
            CameraState {
                angles: glm::vec2(0.0, 0.0),
                zoom: 0.0,
            },
            DragState::default(),
        );
        let eye = camera.eye_position();
        assert!(approx(eye.x, 1.0) && approx(eye.y, 0.0) && approx(eye.z, 0.0));

        let radius = glm::length(&OrbitCamera::default().eye_position());
        assert!(approx(radius, 1.2f32.exp()));
    }

    #[test]
    fn view_maps_origin_in_front_of_eye() {
        let camera = OrbitCamera::default();
        let origin = camera.view_matrix() * glm::vec4(0.0, 0.0, 0.0, 1.0);
        // Left-handed view space looks down +Z.
        assert!(approx(origin.z, glm::length(&camera.eye_position())));
        assert!(approx(origin.x, 0.0) && approx(origin.y, 0.0));
    }

    #[test]
    fn projection_depth_is_zero_to_one() {
        let projection = OrbitCamera::projection_matrix(4.0 / 3.0);
        let near = projection * glm::vec4(0.0, 0.0, NEAR_PLANE, 1.0);
        let far = projection * glm::vec4(0.0, 0.0, FAR_PLANE, 1.0);
        assert!(approx(near.z / near.w, 0.0));
        assert!(approx(far.z / far.w, 1.0));
    }
}
