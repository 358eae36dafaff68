//! # Renderer
//!
//! The `Renderer` ties the GPU context, the depth buffer, the scene and the egui overlay
//! together and drives one frame at a time.
//!
//! Every frame follows the same order:
//!
//! 1. The scene uniforms are refreshed from the camera and uploaded if they changed.
//! 2. egui textures and buffers are updated.
//! 3. The next surface texture is acquired. If the surface is lost or outdated it is
//!    reconfigured and the frame is skipped.
//! 4. One render pass clears color and depth, draws the mesh, then draws the GUI on top.
//! 5. The commands are submitted, the frame is presented and the device is polled so pending
//!    callbacks run.

use crate::camera::OrbitCamera;
use crate::config::ViewerConfig;
use crate::error::Result;
use crate::gpu::Gpu;
use crate::resources::{load_mesh, load_shader_source};
use crate::scene::Scene;
use crate::texture::load_texture;
use crate::uniform_buffer::LightingUniforms;

pub struct Renderer {
    scene: Scene,
    egui_renderer: egui_wgpu::Renderer,
    depth_texture_view: wgpu::TextureView,
    clear_color: wgpu::Color,
    gpu: Gpu,
}

impl Renderer {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    /// Sets up the GPU for `window` and loads the mesh, texture and shader named in `config`.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        config: &ViewerConfig,
    ) -> Result<Self> {
        let gpu = Gpu::new_async(window, width, height).await?;
        let depth_texture_view = gpu.create_depth_texture(width, height);

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            Some(Self::DEPTH_FORMAT),
            1,
            false,
        );

        let vertices = load_mesh(&config.assets.mesh)?;
        let texture = load_texture(&gpu.device, &gpu.queue, &config.assets.texture)?;
        log::debug!(
            "Texture {}x{} with {} mip levels",
            texture.size.width,
            texture.size.height,
            texture.mip_level_count
        );

        let shader_source = match &config.assets.shader {
            Some(path) => load_shader_source(path)?,
            None => crate::SHADER_SOURCE.to_string(),
        };

        let scene = Scene::new(
            &gpu.device,
            gpu.surface_format,
            config,
            &shader_source,
            &vertices,
            texture,
        );

        let [r, g, b] = config.scene.clear_color;
        Ok(Self {
            scene,
            egui_renderer,
            depth_texture_view,
            clear_color: wgpu::Color { r, g, b, a: 1.0 },
            gpu,
        })
    }

    pub fn lighting(&self) -> &LightingUniforms {
        self.scene.lighting()
    }

    pub fn set_lighting(&mut self, lighting: LightingUniforms) {
        self.scene.set_lighting(lighting);
    }

    /// Resizes the surface and depth buffer. Zero sizes (a minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        self.depth_texture_view = self.gpu.create_depth_texture(width, height);
    }

    pub fn render_frame(
        &mut self,
        screen_descriptor: egui_wgpu::ScreenDescriptor,
        paint_jobs: Vec<egui::epaint::ClippedPrimitive>,
        textures_delta: egui::TexturesDelta,
        camera: &OrbitCamera,
        time: f32,
        animate: bool,
    ) {
        self.scene.update(
            &self.gpu.queue,
            camera,
            self.gpu.aspect_ratio(),
            time,
            animate,
        );

        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(&self.gpu.device, &self.gpu.queue, *id, image_delta);
        }

        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.egui_renderer.update_buffers(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        let Some(surface_texture) = self.acquire_surface_texture() else {
            return;
        };

        let surface_texture_view =
            surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor {
                    label: Some("Surface Texture View"),
                    aspect: wgpu::TextureAspect::All,
                    format: Some(self.gpu.surface_format),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_mip_level: 0,
                    mip_level_count: Some(1),
                    base_array_layer: 0,
                    array_layer_count: Some(1),
                    usage: None,
                });

        encoder.insert_debug_marker("Render scene");

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.scene.render(&mut render_pass);

            self.egui_renderer.render(
                &mut render_pass.forget_lifetime(),
                &paint_jobs,
                &screen_descriptor,
            );
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        self.gpu.poll();
    }

    /// Returns `None` when no frame can be drawn right now.
    fn acquire_surface_texture(&self) -> Option<wgpu::SurfaceTexture> {
        match self.gpu.surface.get_current_texture() {
            Ok(surface_texture) => Some(surface_texture),
            Err(error @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("Surface unavailable ({error}), reconfiguring");
                self.gpu.reconfigure();
                None
            }
            Err(error) => {
                log::warn!("Cannot acquire next surface texture: {error}");
                None
            }
        }
    }
}
