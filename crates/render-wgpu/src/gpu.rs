use crate::camera::OrbitCamera;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use liftsim_assets::ModelMesh;
use liftsim_common::Rgb;
use liftsim_kernel::SimConfig;
use liftsim_render::geometry::{self, LineVertex, MeshData, MeshVertex};
use liftsim_render::FrameState;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const MODE_LIT: f32 = 0.0;
const MODE_UNLIT: f32 = 1.0;
const MODE_PLANE: f32 = 2.0;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    ambient: [f32; 4],
    boundary_center: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    tint: [f32; 4],
    params: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, tint: [f32; 4], mode: f32) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            tint,
            params: [mode, 0.0, 0.0, 0.0],
        }
    }
}

/// Static indexed mesh on the GPU.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, label: &str, mesh: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertex_buffer")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_index_buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>, instance: u32) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, instance..instance + 1);
    }
}

/// wgpu scene renderer: ground, sun, glowing boundary, plane and airflow.
pub struct WgpuRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    glow_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    ground: GpuMesh,
    sun: GpuMesh,
    plane: Option<GpuMesh>,
    boundary_buffer: wgpu::Buffer,
    boundary_vertex_count: u32,
    airflow_buffer: wgpu::Buffer,
    airflow_capacity: usize,
    depth_texture: wgpu::TextureView,
    clear_color: wgpu::Color,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: &SimConfig,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });

        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &mesh_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<MeshVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                            2 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                            8 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &mesh_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            // The plane is a thin folded sheet seen from both sides.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_state(true)),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });
        let line_pipeline = build_line_pipeline(
            device,
            &pipeline_layout,
            &line_shader,
            surface_format,
            ("vs_line", "fs_line"),
        );
        let glow_pipeline = build_line_pipeline(
            device,
            &pipeline_layout,
            &line_shader,
            surface_format,
            ("vs_glow", "fs_glow"),
        );

        let scene = &config.scene;
        let ground = GpuMesh::upload(device, "ground", &geometry::ground_mesh(scene));
        let sun_color = Rgb::from_hex(scene.sun_color).to_linear();
        let sun = GpuMesh::upload(
            device,
            "sun",
            &geometry::sphere_mesh(scene.sun_radius, 32, 16, sun_color),
        );

        let boundary = geometry::boundary_lines(&config.flight.bounds);
        let boundary_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("boundary_vertex_buffer"),
            contents: bytemuck::cast_slice(&boundary),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Ground, sun and plane.
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: 3 * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = &config.flight.airflow;
        let airflow_capacity = layout.lines * layout.points_per_line.saturating_sub(1) * 2;
        let airflow_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("airflow_vertex_buffer"),
            size: (airflow_capacity.max(1) * std::mem::size_of::<LineVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sky = Rgb::from_hex(scene.sky_color).to_linear();
        let clear_color = wgpu::Color {
            r: sky.r as f64,
            g: sky.g as f64,
            b: sky.b as f64,
            a: 1.0,
        };

        tracing::debug!(
            "scene uploaded: ground {} tris, sun {} tris, {} airflow vertices reserved",
            ground.index_count / 3,
            sun.index_count / 3,
            airflow_capacity
        );

        Self {
            mesh_pipeline,
            line_pipeline,
            glow_pipeline,
            uniform_buffer,
            uniform_bind_group,
            instance_buffer,
            ground,
            sun,
            plane: None,
            boundary_buffer,
            boundary_vertex_count: boundary.len() as u32,
            airflow_buffer,
            airflow_capacity,
            depth_texture: Self::create_depth_texture(device, width, height),
            clear_color,
        }
    }

    /// Upload the plane model. It is drawn from the next frame on.
    pub fn set_model(&mut self, device: &wgpu::Device, model: &ModelMesh) {
        if model.is_empty() {
            tracing::warn!("model '{}' has no triangles; nothing to draw", model.name);
            return;
        }
        self.plane = Some(GpuMesh::upload(device, "plane", &geometry::model_mesh(model)));
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame of the scene into `view`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &OrbitCamera,
        frame: &FrameState<'_>,
    ) {
        let env = frame.env;
        let scene = env.params();
        let center = frame.sim.params().bounds.center();
        let light = env.light_direction();
        let ambient = scene.ambient_intensity;
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: camera.view_projection().to_cols_array_2d(),
                light_dir: light.extend(scene.light_intensity).to_array(),
                ambient: [ambient, ambient, ambient, env.glow_time()],
                boundary_center: center.extend(1.0).to_array(),
            }),
        );

        let draw_plane = frame.model_loaded && self.plane.is_some();
        let plane_transform = frame.sim.transform();
        let instances = [
            InstanceData::new(Mat4::IDENTITY, [1.0; 4], MODE_LIT),
            InstanceData::new(
                Mat4::from_rotation_translation(env.sun_rotation(), scene.sun_position),
                [1.0; 4],
                MODE_UNLIT,
            ),
            InstanceData::new(plane_transform.matrix(), [1.0; 4], MODE_PLANE),
        ];
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));

        let mut airflow: Vec<LineVertex> = Vec::new();
        if draw_plane {
            if let Some(group) = frame.sim.airflow().visible() {
                airflow = geometry::airflow_lines(group, &plane_transform);
                airflow.truncate(self.airflow_capacity);
                queue.write_buffer(&self.airflow_buffer, 0, bytemuck::cast_slice(&airflow));
            }
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            // Opaque meshes first, then blended lines over them.
            pass.set_pipeline(&self.mesh_pipeline);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            self.ground.draw(&mut pass, 0);
            self.sun.draw(&mut pass, 1);
            if let Some(plane) = self.plane.as_ref().filter(|_| draw_plane) {
                plane.draw(&mut pass, 2);
            }

            pass.set_pipeline(&self.glow_pipeline);
            pass.set_vertex_buffer(0, self.boundary_buffer.slice(..));
            pass.draw(0..self.boundary_vertex_count, 0..1);

            if !airflow.is_empty() {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_vertex_buffer(0, self.airflow_buffer.slice(..));
                pass.draw(0..airflow.len() as u32, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

fn depth_state(write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: Default::default(),
        bias: Default::default(),
    }
}

/// Alpha-blended line list that tests against depth without writing it.
fn build_line_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    (vs, fs): (&str, &str),
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(vs),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x4,
                ],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::LineList,
            ..Default::default()
        },
        depth_stencil: Some(depth_state(false)),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}
