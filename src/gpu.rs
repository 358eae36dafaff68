//! # GPU Module
//!
//! The `gpu` module owns the WebGPU objects every other part of the viewer is built on: the
//! surface the window presents to, the logical device and its queue, and the surface
//! configuration.
//!
//! Setup walks the usual chain, each step depending on the previous one:
//!
//! 1. An `Instance` is created with the default backends.
//! 2. A `Surface` is created for the window.
//! 3. An `Adapter` compatible with that surface is requested.
//! 4. A `Device` and `Queue` are requested from the adapter, with limits resolved against what
//!    the adapter supports.
//! 5. The surface is configured with a non-sRGB format (egui expects linear output) and a
//!    vsync'd present mode.
//!
//! Any failure along the way is returned as an [`Error`](crate::error::Error) and ends
//! initialization. Errors raised later by the device are not returned to a caller; they are
//! logged by the handlers installed in [`Gpu::new_async`].

use wgpu::InstanceDescriptor;

use crate::error::{Error, Result};
use crate::renderer::Renderer;

/// The window surface plus the device and queue that render into it.
///
/// Fields drop in declaration order, so the surface is released before the device.
pub struct Gpu {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub surface_format: wgpu::TextureFormat,
}

impl Gpu {
    pub fn aspect_ratio(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height.max(1) as f32
    }

    /// Reconfigures the surface for a new window size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Configures the surface again with its current settings, after it was lost or outdated.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Creates a depth attachment matching the surface size.
    pub fn create_depth_texture(&self, width: u32, height: u32) -> wgpu::TextureView {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Renderer::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Depth Texture View"),
            format: Some(Renderer::DEPTH_FORMAT),
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::All,
            base_mip_level: 0,
            base_array_layer: 0,
            array_layer_count: Some(1),
            mip_level_count: Some(1),
            usage: None,
        })
    }

    /// Runs pending device callbacks without blocking.
    ///
    /// Returns `true` when the queue has no work left in flight.
    pub fn poll(&self) -> bool {
        self.device.poll(wgpu::Maintain::Poll).is_queue_empty()
    }

    pub async fn new_async(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let instance = wgpu::Instance::new(&InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        log::info!("Requesting adapter...");
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(Error::NoAdapter)?;
        log_adapter(&adapter);

        log::info!("Requesting device...");
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("WGPU Device"),
                    memory_hints: wgpu::MemoryHints::default(),
                    required_features: wgpu::Features::default(),
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                },
                None,
            )
            .await?;
        log::debug!("Device limits: {:#?}", device.limits());

        device.on_uncaptured_error(Box::new(|error| {
            log::error!("Uncaptured device error: {error}");
        }));
        device.set_device_lost_callback(|reason, message| {
            log::error!("Device lost ({reason:?}): {message}");
        });

        let surface_capabilities = surface.get_capabilities(&adapter);
        let surface_format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(Error::UnsupportedSurface)?;
        let present_mode = if surface_capabilities
            .present_modes
            .contains(&wgpu::PresentMode::Fifo)
        {
            wgpu::PresentMode::Fifo
        } else {
            surface_capabilities
                .present_modes
                .first()
                .copied()
                .ok_or(Error::UnsupportedSurface)?
        };
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        log::info!("Surface format: {surface_format:?}, present mode: {present_mode:?}");

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let gpu = Self {
            surface,
            device,
            queue,
            surface_config,
            surface_format,
        };
        gpu.submit_startup_markers();
        Ok(gpu)
    }

    /// Submits an empty, labelled command buffer so the first submission shows up in GPU
    /// debuggers, and logs once the queue has processed it.
    fn submit_startup_markers(&self) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Startup Encoder"),
            });
        encoder.insert_debug_marker("Device ready");
        encoder.insert_debug_marker("Surface configured");
        self.queue.submit(std::iter::once(encoder.finish()));
        self.queue.on_submitted_work_done(|| {
            log::debug!("Startup commands finished");
        });
        self.poll();
    }
}

fn log_adapter(adapter: &wgpu::Adapter) {
    let info = adapter.get_info();
    log::info!(
        "Adapter: {} ({:?}, {:?} backend, driver {} {})",
        info.name,
        info.device_type,
        info.backend,
        info.driver,
        info.driver_info
    );
    log::debug!("Adapter limits: {:#?}", adapter.limits());
    log::debug!("Adapter features: {:#?}", adapter.features());
}
