//! # Scene
//!
//! The `scene` module owns everything needed to draw the mesh: the vertex buffer, the two
//! uniform blocks, the texture with its sampler, the bind group tying them together and the
//! render pipeline.
//!
//! ## Bind group layout
//!
//! | binding | resource | visibility |
//! |---|---|---|
//! | 0 | [`SceneUniforms`] | vertex, fragment |
//! | 1 | base color texture (mip mapped) | fragment |
//! | 2 | filtering sampler | fragment |
//! | 3 | [`LightingUniforms`] | fragment |
//!
//! ## Example Usage
//!
//! ```ignore
//! let mut scene = Scene::new(&device, surface_format, &config, SHADER_SOURCE, &vertices, texture);
//! scene.update(&queue, &camera, aspect_ratio, time, animate);
//!
//! let mut render_pass = encoder.begin_render_pass(&render_pass_descriptor);
//! scene.render(&mut render_pass);
//! ```

use nalgebra_glm as glm;

use crate::camera::OrbitCamera;
use crate::config::ViewerConfig;
use crate::renderer::Renderer;
use crate::resources::create_shader_module;
use crate::texture::{create_sampler, LoadedTexture};
use crate::uniform_binding::UniformBinding;
use crate::uniform_buffer::{LightingUniforms, SceneUniforms};
use crate::vertex::Vertex;

pub struct Scene {
    pub model: glm::Mat4,
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    pub uniforms: UniformBinding<SceneUniforms>,
    pub lighting: UniformBinding<LightingUniforms>,
    pub texture: LoadedTexture,
    pub sampler: wgpu::Sampler,
    pub bind_group: wgpu::BindGroup,
    pub pipeline: wgpu::RenderPipeline,
    spin_speed: f32,
}

impl Scene {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        config: &ViewerConfig,
        shader_source: &str,
        vertices: &[Vertex],
        texture: LoadedTexture,
    ) -> Self {
        let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );

        let base_color = glm::Vec4::from(config.scene.base_color);
        let uniforms = UniformBinding::new(device, "Scene Uniforms", SceneUniforms::new(base_color));
        let lighting = UniformBinding::new(device, "Lighting Uniforms", config.lighting.uniforms());
        let sampler = create_sampler(device);

        let bind_group_layout = Self::create_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.binding_resource(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: lighting.binding_resource(),
                },
            ],
        });

        let shader_module = create_shader_module(device, "Scene Shader", shader_source);
        let pipeline =
            Self::create_pipeline(device, surface_format, &shader_module, &bind_group_layout);

        Self {
            model: glm::Mat4::identity(),
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            uniforms,
            lighting,
            texture,
            sampler,
            bind_group,
            pipeline,
            spin_speed: config.scene.spin_speed,
        }
    }

    pub fn lighting(&self) -> &LightingUniforms {
        self.lighting.value()
    }

    /// Replaces the lights. The new values reach the GPU on the next [`Scene::update`].
    pub fn set_lighting(&mut self, lighting: LightingUniforms) {
        if *self.lighting.value() != lighting {
            self.lighting.set(lighting);
        }
    }

    pub fn render<'rpass>(&'rpass self, renderpass: &mut wgpu::RenderPass<'rpass>) {
        renderpass.set_pipeline(&self.pipeline);
        renderpass.set_bind_group(0, &self.bind_group, &[]);
        renderpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        renderpass.draw(0..self.vertex_count, 0..1);
    }

    /// Refreshes the transforms from the camera and uploads whichever uniform blocks changed.
    ///
    /// With `animate` set the model spins around +Z; otherwise it holds its last orientation.
    pub fn update(
        &mut self,
        queue: &wgpu::Queue,
        camera: &OrbitCamera,
        aspect_ratio: f32,
        time: f32,
        animate: bool,
    ) {
        if animate {
            self.model = glm::rotate_z(&glm::Mat4::identity(), time * self.spin_speed);
        }

        let model = self.model;
        self.uniforms.modify(|uniforms| {
            uniforms.projection = OrbitCamera::projection_matrix(aspect_ratio);
            uniforms.view = camera.view_matrix();
            uniforms.model = model;
            uniforms.camera_world_position = camera.eye_position();
            uniforms.time = time;
        });

        self.uniforms.flush(queue);
        self.lighting.flush(queue);
    }

    fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: UniformBinding::<SceneUniforms>::binding_size(),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: UniformBinding::<LightingUniforms>::binding_size(),
                    },
                    count: None,
                },
            ],
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        shader_module: &wgpu::ShaderModule,
        bind_group_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader_module,
                entry_point: Some("vertex_main"),
                buffers: &[Vertex::description(&Vertex::vertex_attributes())],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Renderer::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: shader_module,
                entry_point: Some("fragment_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        })
    }
}
