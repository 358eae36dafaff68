//! # Uniform Buffers
//!
//! CPU-side mirrors of the two uniform blocks read by the shader:
//!
//! - [`SceneUniforms`] (`@binding(0)`): the projection, view and model matrices, a base color,
//!   the camera position used for specular highlights and the elapsed time.
//! - [`LightingUniforms`] (`@binding(3)`): two directional lights, each with a direction and a
//!   color.
//!
//! Both are `#[repr(C)]` and `bytemuck::Pod`, and their sizes are multiples of 16 bytes as WGSL
//! uniform layout rules require. `vec3` members are padded into `vec4`s or followed by a scalar
//! so the Rust and WGSL layouts stay byte-identical.

use nalgebra_glm as glm;

/// The per-frame scene transform block.
#[repr(C)]
#[derive(Default, Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    /// View space to clip space (left-handed, depth in `[0, 1]`).
    pub projection: glm::Mat4,

    /// World space to view space.
    pub view: glm::Mat4,

    /// Model space to world space.
    pub model: glm::Mat4,

    /// Base color multiplied with the texture sample.
    pub color: glm::Vec4,

    /// Camera eye in world space. Shares a 16-byte slot with `time`.
    pub camera_world_position: glm::Vec3,

    /// Seconds since the application started.
    pub time: f32,
}

impl SceneUniforms {
    pub fn new(color: glm::Vec4) -> Self {
        Self {
            projection: glm::Mat4::identity(),
            view: glm::Mat4::identity(),
            model: glm::Mat4::identity(),
            color,
            camera_world_position: glm::Vec3::zeros(),
            time: 0.0,
        }
    }
}

/// Number of directional lights in [`LightingUniforms`].
pub const LIGHT_COUNT: usize = 2;

/// Two directional lights. The `w` components are unused padding.
#[repr(C)]
#[derive(Default, Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniforms {
    pub directions: [glm::Vec4; LIGHT_COUNT],
    pub colors: [glm::Vec4; LIGHT_COUNT],
}

impl LightingUniforms {
    pub fn new(directions: [[f32; 3]; LIGHT_COUNT], colors: [[f32; 3]; LIGHT_COUNT]) -> Self {
        Self {
            directions: directions.map(|[x, y, z]| glm::vec4(x, y, z, 0.0)),
            colors: colors.map(|[r, g, b]| glm::vec4(r, g, b, 1.0)),
        }
    }
}
