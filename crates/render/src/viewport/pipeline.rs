use egui_wgpu::wgpu;
use egui_wgpu::wgpu::util::DeviceExt as _;

use crate::mesh_cache::GpuMeshCache;

use super::mesh::{Vertex, VERTEX_ATTRIBUTES};
use super::pipeline_shaders::{create_blit_shader, create_main_shader};
use super::pipeline_targets::OffscreenTargets;

pub(super) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

const INITIAL_DRAW_CAPACITY: u64 = 64;
const INITIAL_LINE_VERTICES: u64 = 256;

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(super) struct FrameUniforms {
    pub(super) view_proj: [[f32; 4]; 4],
    pub(super) camera_pos: [f32; 3],
    pub(super) encode_srgb: f32,
    pub(super) ambient: [f32; 3],
    pub(super) _pad0: f32,
    pub(super) light_dir: [f32; 3],
    pub(super) _pad1: f32,
    pub(super) light_color: [f32; 3],
    pub(super) _pad2: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(super) struct DrawUniforms {
    pub(super) model: [[f32; 4]; 4],
    pub(super) normal_matrix: [[f32; 4]; 4],
    pub(super) color: [f32; 4],
    /// rgb emissive, w = shading kind.
    pub(super) emissive: [f32; 4],
    /// rgb specular, w = shininess.
    pub(super) specular: [f32; 4],
    /// roughness, metalness, flat shading, double sided.
    pub(super) params: [f32; 4],
}

#[derive(Clone, Copy)]
struct MeshVariant {
    transparent: bool,
    double_sided: bool,
}

const MESH_VARIANTS: [MeshVariant; 4] = [
    MeshVariant {
        transparent: false,
        double_sided: false,
    },
    MeshVariant {
        transparent: false,
        double_sided: true,
    },
    MeshVariant {
        transparent: true,
        double_sided: false,
    },
    MeshVariant {
        transparent: true,
        double_sided: true,
    },
];

pub(super) struct PipelineState {
    mesh_pipelines: Vec<wgpu::RenderPipeline>,
    pub(super) line_pipeline: wgpu::RenderPipeline,
    pub(super) blit_pipeline: wgpu::RenderPipeline,
    pub(super) blit_bind_group: wgpu::BindGroup,
    blit_bind_group_layout: wgpu::BindGroupLayout,
    blit_sampler: wgpu::Sampler,
    pub(super) targets: OffscreenTargets,
    pub(super) frame_buffer: wgpu::Buffer,
    pub(super) frame_bind_group: wgpu::BindGroup,
    draw_layout: wgpu::BindGroupLayout,
    pub(super) draw_buffer: wgpu::Buffer,
    pub(super) draw_bind_group: wgpu::BindGroup,
    draw_capacity: u64,
    pub(super) draw_stride: u64,
    pub(super) line_buffer: wgpu::Buffer,
    line_capacity: u64,
    pub(super) mesh_cache: GpuMeshCache,
    pub(super) scene_version: u64,
    pub(super) encode_srgb: bool,
}

impl PipelineState {
    pub(super) fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let shader = create_main_shader(device);

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("holoview_frame_uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms {
                view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
                camera_pos: [0.0, 2.0, 3.0],
                encode_srgb: 0.0,
                ambient: [0.0; 3],
                _pad0: 0.0,
                light_dir: [0.0, 1.0, 0.0],
                _pad1: 0.0,
                light_color: [0.0; 3],
                _pad2: 0.0,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("holoview_frame_layout"),
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
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("holoview_frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let draw_size = std::mem::size_of::<DrawUniforms>() as u64;
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("holoview_draw_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(draw_size),
                },
                count: None,
            }],
        });
        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment).max(1);
        let draw_stride = draw_size.div_ceil(alignment) * alignment;
        let draw_buffer = create_draw_buffer(device, draw_stride, INITIAL_DRAW_CAPACITY);
        let draw_bind_group = create_draw_bind_group(device, &draw_layout, &draw_buffer);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("holoview_viewport_layout"),
            bind_group_layouts: &[&frame_layout, &draw_layout],
            push_constant_ranges: &[],
        });

        let mesh_pipelines = MESH_VARIANTS
            .iter()
            .map(|variant| {
                create_scene_pipeline(
                    device,
                    &pipeline_layout,
                    &shader,
                    target_format,
                    wgpu::PrimitiveTopology::TriangleList,
                    *variant,
                )
            })
            .collect();
        let line_pipeline = create_scene_pipeline(
            device,
            &pipeline_layout,
            &shader,
            target_format,
            wgpu::PrimitiveTopology::LineList,
            MeshVariant {
                transparent: true,
                double_sided: true,
            },
        );

        let blit_shader = create_blit_shader(device);
        let blit_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("holoview_viewport_blit_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });
        let blit_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("holoview_viewport_blit_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("holoview_viewport_blit_pipeline_layout"),
            bind_group_layouts: &[&blit_bind_group_layout],
            push_constant_ranges: &[],
        });
        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("holoview_viewport_blit_pipeline"),
            layout: Some(&blit_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &blit_shader,
                entry_point: Some("vs_blit"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &blit_shader,
                entry_point: Some("fs_blit"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let targets = OffscreenTargets::new(device, target_format, 1, 1);
        let blit_bind_group = create_blit_bind_group(
            device,
            &blit_bind_group_layout,
            &targets.color_view,
            &blit_sampler,
        );

        let line_capacity = INITIAL_LINE_VERTICES * std::mem::size_of::<Vertex>() as u64;
        let line_buffer = create_line_buffer(device, line_capacity);

        Self {
            mesh_pipelines,
            line_pipeline,
            blit_pipeline,
            blit_bind_group,
            blit_bind_group_layout,
            blit_sampler,
            targets,
            frame_buffer,
            frame_bind_group,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            draw_capacity: INITIAL_DRAW_CAPACITY,
            draw_stride,
            line_buffer,
            line_capacity,
            mesh_cache: GpuMeshCache::new(),
            scene_version: 0,
            encode_srgb: !target_format.is_srgb(),
        }
    }

    pub(super) fn mesh_pipeline(&self, transparent: bool, double_sided: bool) -> &wgpu::RenderPipeline {
        let index = usize::from(transparent) * 2 + usize::from(double_sided);
        &self.mesh_pipelines[index]
    }

    /// Grows the per-draw uniform buffer to hold at least `count` slots.
    pub(super) fn ensure_draw_capacity(&mut self, device: &wgpu::Device, count: u64) {
        if count <= self.draw_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        self.draw_buffer = create_draw_buffer(device, self.draw_stride, capacity);
        self.draw_bind_group = create_draw_bind_group(device, &self.draw_layout, &self.draw_buffer);
        self.draw_capacity = capacity;
    }

    pub(super) fn ensure_line_capacity(&mut self, device: &wgpu::Device, bytes: u64) {
        if bytes <= self.line_capacity {
            return;
        }
        let capacity = bytes.next_power_of_two();
        self.line_buffer = create_line_buffer(device, capacity);
        self.line_capacity = capacity;
    }
}

fn create_scene_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    target_format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
    variant: MeshVariant,
) -> wgpu::RenderPipeline {
    let label = match (topology, variant.transparent, variant.double_sided) {
        (wgpu::PrimitiveTopology::LineList, _, _) => "holoview_viewport_lines",
        (_, false, false) => "holoview_viewport_opaque",
        (_, false, true) => "holoview_viewport_opaque_double",
        (_, true, false) => "holoview_viewport_transparent",
        (_, true, true) => "holoview_viewport_transparent_double",
    };
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &VERTEX_ATTRIBUTES,
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: if variant.double_sided {
                None
            } else {
                Some(wgpu::Face::Back)
            },
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: !variant.transparent,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_draw_buffer(device: &wgpu::Device, stride: u64, capacity: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("holoview_draw_uniforms"),
        size: stride * capacity.max(1),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_draw_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("holoview_draw_bind_group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
            }),
        }],
    })
}

fn create_line_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("holoview_line_vertices"),
        size: size.max(std::mem::size_of::<Vertex>() as u64),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_blit_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("holoview_viewport_blit_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

pub(super) fn ensure_offscreen_targets(
    device: &wgpu::Device,
    pipeline: &mut PipelineState,
    target_format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) {
    if pipeline.targets.matches(width, height) {
        return;
    }

    pipeline.targets = OffscreenTargets::new(device, target_format, width, height);
    pipeline.blit_bind_group = create_blit_bind_group(
        device,
        &pipeline.blit_bind_group_layout,
        &pipeline.targets.color_view,
        &pipeline.blit_sampler,
    );
}
