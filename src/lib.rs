//! # Mesh Viewer Library
//!
//! This library renders a textured, lit triangle mesh with the WebGPU API. The mesh is viewed
//! through an orbit camera driven by the mouse, and an egui overlay exposes the two lights of
//! the scene. Textures are uploaded with a full mip chain generated on the CPU.
//!
//! ## Modules
//!
//! - [`app`]: Window creation, the winit event loop handler, input routing and the GUI.
//! - [`renderer`]: Owns the GPU context and the scene, and draws one frame at a time.
//! - [`gpu`]: Instance, surface, adapter, device and queue setup.
//! - [`scene`]: The mesh, its uniforms, texture and render pipeline.
//! - [`camera`]: Orbit camera state, mouse drag with inertia, scroll zoom and matrices.
//! - [`mipmap`]: CPU mip chain generation with a 2x2 box filter.
//! - [`texture`]: Image decoding and GPU texture upload.
//! - [`resources`]: Mesh and shader loading.
//! - [`config`]: TOML settings.
//! - [`vertex`], [`uniform_buffer`], [`uniform_binding`]: GPU data layouts and uniform buffers.
//!
//! ## Constants
//!
//! ### [`SHADER_SOURCE`]
//!
//! The built-in WGSL shader. It transforms vertices by the model, view and projection matrices
//! and shades fragments with two directional lights (Lambert diffuse plus a Phong specular
//! term) applied to the texture color. A different shader can be loaded from disk through
//! [`config::AssetConfig::shader`] as long as it keeps the same bindings.
//!
//! ## Example
//!
//! ```no_run
//! use mesh_viewer_core::{App, ViewerConfig};
//!
//! let event_loop = winit::event_loop::EventLoop::new().unwrap();
//! let mut app = App::new(ViewerConfig::default());
//! event_loop.run_app(&mut app).unwrap();
//! ```

pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod gpu;
pub mod mipmap;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod texture;
pub mod uniform_binding;
pub mod uniform_buffer;
pub mod vertex;

pub use app::App;
pub use camera::OrbitCamera;
pub use config::ViewerConfig;
pub use error::{Error, Result};
pub use gpu::Gpu;
pub use renderer::Renderer;
pub use scene::Scene;
pub use uniform_binding::UniformBinding;
pub use uniform_buffer::{LightingUniforms, SceneUniforms};
pub use vertex::Vertex;

pub const SHADER_SOURCE: &str = include_str!("shader.wgsl");
