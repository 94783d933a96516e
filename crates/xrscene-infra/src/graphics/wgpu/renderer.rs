// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! Draws scene geometry into acquired swapchain images with wgpu.
//!
//! Every [`DrawItem`] is a unit cube. Pipelines are built lazily, one per
//! render state and target formats, and kept for the life of the renderer.

use std::borrow::Cow;
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use xrscene_core::graphics::device::GpuDevice;
use xrscene_core::graphics::error::{RenderError, ResourceError};
use xrscene_core::graphics::handle::{Program, Shader, UniqueHandle};
use xrscene_core::graphics::render_state::RenderState;
use xrscene_core::graphics::resource::{ShaderDescriptor, ShaderStage};
use xrscene_core::scene::{
    render_active_scenes, DrawItem, DrawList, RenderViewRequest, Scene, SceneRenderer,
    SceneResources, SceneUniforms, ShadingMode,
};
use xrscene_core::time::FrameTime;
use xrscene_core::xr::types::Viewport;

use super::conversions::{IntoWgpu, PipelineStates};
use super::device::WgpuDevice;

const CUBE_SHADER: &str = include_str!("shaders/cube.wgsl");

const DRAW_UNIFORMS_SIZE: NonZeroU64 =
    match NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64) {
        Some(size) => size,
        None => panic!("draw uniforms cannot be empty"),
    };

/// A cube vertex: position and face normal.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CubeVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Face normal.
    pub normal: [f32; 3],
}

impl CubeVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// A unit cube centred on the origin.
///
/// Faces wind clockwise seen from outside, matching the default front face.
pub fn cube_mesh() -> (Vec<CubeVertex>, Vec<u16>) {
    // (normal, u, v) with u x v = normal.
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = vertices.len() as u16;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = (normal + u * su + v * sv) * 0.5;
            vertices.push(CubeVertex {
                position: position.to_array(),
                normal: normal.to_array(),
            });
        }
        // The corners run counter-clockwise around the normal.
        indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
    }
    (vertices, indices)
}

/// Per-draw uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    /// Model-to-clip transform.
    pub mvp: [[f32; 4]; 4],
    /// Model-to-world transform.
    pub model: [[f32; 4]; 4],
    /// Flat color.
    pub color: [f32; 4],
    /// Light direction (xyz).
    pub light_direction: [f32; 4],
    /// Light color (rgb).
    pub light_color: [f32; 4],
    /// Highlight origin (xyz) and animation time (w).
    pub highlight: [f32; 4],
    /// Highlight enabled (x).
    pub params: [f32; 4],
}

impl DrawUniforms {
    /// The block of `draw` seen through `view_projection`.
    pub fn new(
        view_projection: Mat4,
        draw: &DrawItem,
        scene: &SceneUniforms,
        shading_mode: ShadingMode,
    ) -> Self {
        let [hx, hy, hz, _] = scene.highlight_position;
        let highlighted = shading_mode == ShadingMode::Highlight;
        Self {
            mvp: (view_projection * draw.transform).to_cols_array_2d(),
            model: draw.transform.to_cols_array_2d(),
            color: [draw.color.r, draw.color.g, draw.color.b, draw.color.a],
            light_direction: scene.light_direction,
            light_color: scene.light_color,
            highlight: [hx, hy, hz, scene.mip_levels_animation_time[1]],
            params: [if highlighted { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

/// Clamps `viewport` to a `width x height` target. Returns `None` when nothing is left.
pub fn clamp_viewport(viewport: Viewport, width: u32, height: u32) -> Option<Viewport> {
    let (target_width, target_height) = (width as f32, height as f32);
    let x = viewport.x.clamp(0.0, target_width);
    let y = viewport.y.clamp(0.0, target_height);
    let width = viewport.width.min(target_width - x);
    let height = viewport.height.min(target_height - y);
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let min_depth = viewport.min_depth.clamp(0.0, 1.0);
    Some(Viewport {
        x,
        y,
        width,
        height,
        min_depth,
        max_depth: viewport.max_depth.clamp(min_depth, 1.0),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    state: RenderState,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    sample_count: u32,
}

#[derive(Debug)]
struct UniformRing {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
}

/// A [`SceneRenderer`] drawing into [`WgpuDevice`] textures.
#[derive(Debug)]
pub struct WgpuSceneRenderer {
    device: Arc<WgpuDevice>,
    program: UniqueHandle<Program>,
    uniform_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    uniforms: Option<UniformRing>,
    uniform_stride: u64,
    polygon_line: bool,
}

impl WgpuSceneRenderer {
    /// Compiles the cube program and uploads the cube mesh.
    /// ## Errors
    /// * `ResourceError` - If the program cannot be created.
    pub fn new(device: Arc<WgpuDevice>) -> Result<Self, ResourceError> {
        let owner: Arc<dyn GpuDevice> = device.clone();
        let stage = |stage: ShaderStage, entry_point: &'static str| {
            UniqueHandle::<Shader>::create(owner.clone(), |d| {
                d.create_shader(&ShaderDescriptor {
                    label: Some(Cow::Borrowed(entry_point)),
                    stage,
                    source: Cow::Borrowed(CUBE_SHADER),
                    entry_point: Cow::Borrowed(entry_point),
                })
            })
        };
        // The program keeps the modules alive; the stages can go once linked.
        let vertex = stage(ShaderStage::Vertex, "vs_main")?;
        let fragment = stage(ShaderStage::Fragment, "fs_main")?;
        let program = UniqueHandle::<Program>::create(owner, |d| {
            d.create_program(vertex.get(), fragment.get(), Some("xrscene cube"))
        })?;

        let wgpu_device = device.wgpu_device();
        let uniform_layout = wgpu_device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("xrscene draw uniforms layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: Some(DRAW_UNIFORMS_SIZE),
                },
                count: None,
            }],
        });
        let pipeline_layout = wgpu_device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("xrscene cube pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            immediate_size: 0,
        });

        let (mesh_vertices, mesh_indices) = cube_mesh();
        let vertices = wgpu_device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("xrscene cube vertices"),
            contents: bytemuck::cast_slice(&mesh_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = wgpu_device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("xrscene cube indices"),
            contents: bytemuck::cast_slice(&mesh_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let alignment = u64::from(wgpu_device.limits().min_uniform_buffer_offset_alignment).max(1);
        let uniform_stride = DRAW_UNIFORMS_SIZE.get().div_ceil(alignment) * alignment;

        Ok(Self {
            polygon_line: device.supports_polygon_line(),
            device,
            program,
            uniform_layout,
            pipeline_layout,
            pipelines: HashMap::new(),
            vertices,
            indices,
            index_count: mesh_indices.len() as u32,
            uniforms: None,
            uniform_stride,
        })
    }

    /// Number of pipelines built so far.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) -> Result<(), RenderError> {
        if self.pipelines.contains_key(&key) {
            return Ok(());
        }
        let program = self
            .device
            .program(self.program.get())
            .ok_or(RenderError::ResourceError(ResourceError::InvalidHandle))?;
        let states = PipelineStates::from_render_state(key.state, self.polygon_line);

        let pipeline =
            self.device
                .wgpu_device()
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("xrscene cube pipeline"),
                    layout: Some(&self.pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &program.vertex_module,
                        entry_point: Some(program.vertex_entry.as_str()),
                        compilation_options: Default::default(),
                        buffers: &[CubeVertex::layout()],
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &program.fragment_module,
                        entry_point: Some(program.fragment_entry.as_str()),
                        compilation_options: Default::default(),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: key.color_format,
                            blend: states.blend,
                            write_mask: states.write_mask,
                        })],
                    }),
                    primitive: states.primitive,
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: key.depth_format,
                        depth_write_enabled: states.depth_write_enabled,
                        depth_compare: states.depth_compare,
                        stencil: Default::default(),
                        bias: Default::default(),
                    }),
                    multisample: wgpu::MultisampleState {
                        count: key.sample_count,
                        ..Default::default()
                    },
                    multiview_mask: None,
                    cache: None,
                });
        log::debug!("Built pipeline for {:?}", key);
        self.pipelines.insert(key, pipeline);
        Ok(())
    }

    fn ensure_uniform_capacity(&mut self, blocks: usize) {
        if self
            .uniforms
            .as_ref()
            .is_some_and(|ring| ring.capacity >= blocks)
        {
            return;
        }
        let capacity = blocks.next_power_of_two().max(16);
        let device = self.device.wgpu_device();
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("xrscene draw uniforms"),
            size: capacity as u64 * self.uniform_stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("xrscene draw uniforms"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: Some(DRAW_UNIFORMS_SIZE),
                }),
            }],
        });
        self.uniforms = Some(UniformRing {
            buffer,
            bind_group,
            capacity,
        });
    }
}

impl SceneRenderer for WgpuSceneRenderer {
    fn render_views(
        &mut self,
        request: &RenderViewRequest,
        scenes: &[Box<dyn Scene>],
        resources: &SceneResources,
        frame_time: &FrameTime,
    ) -> Result<bool, RenderError> {
        let color_info = self
            .device
            .texture_info(request.color_image)
            .ok_or(RenderError::MissingTarget("color image"))?;
        if self.device.texture_info(request.depth_image).is_none() {
            return Err(RenderError::MissingTarget("depth image"));
        }

        let mut draws = DrawList::new();
        let rendered = render_active_scenes(scenes, resources, frame_time, &mut draws);

        let color_format = request.color_format.into_wgpu();
        let depth_format = request.depth_format.into_wgpu();
        for draw in &draws {
            self.ensure_pipeline(PipelineKey {
                state: draw.state,
                color_format,
                depth_format,
                sample_count: request.sample_count,
            })?;
        }

        let block_count = request.views.len() * draws.len();
        self.ensure_uniform_capacity(block_count);
        let ring = self
            .uniforms
            .as_ref()
            .ok_or(RenderError::SubmissionFailed("no uniform buffer".to_string()))?;
        if block_count > 0 {
            let stride = self.uniform_stride as usize;
            let mut bytes = vec![0u8; block_count * stride];
            for (view_index, view) in request.views.iter().enumerate() {
                for (draw_index, draw) in draws.iter().enumerate() {
                    let block = DrawUniforms::new(
                        view.view_projection,
                        draw,
                        resources.uniforms(),
                        resources.shading_mode(),
                    );
                    let start = (view_index * draws.len() + draw_index) * stride;
                    bytes[start..start + DRAW_UNIFORMS_SIZE.get() as usize]
                        .copy_from_slice(bytemuck::bytes_of(&block));
                }
            }
            self.device.queue().write_buffer(&ring.buffer, 0, &bytes);
        }

        let [r, g, b, a] = [
            request.clear_color.r,
            request.clear_color.g,
            request.clear_color.b,
            request.clear_color.a,
        ]
        .map(f64::from);
        let mut encoder =
            self.device
                .wgpu_device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("xrscene projection layer"),
                });

        for (view_index, view) in request.views.iter().enumerate() {
            let layer = if request.double_wide {
                0
            } else {
                view.array_index
            };
            let color_view = self.device.texture_view(request.color_image, layer)?;
            let depth_view = self.device.texture_view(request.depth_image, layer)?;

            // Double-wide views share one image, cleared once by the first view.
            let clear = !request.double_wide || view_index == 0;
            let (color_load, depth_load) = if clear {
                (
                    wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    wgpu::LoadOp::Clear(request.clear_depth),
                )
            } else {
                (wgpu::LoadOp::Load, wgpu::LoadOp::Load)
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("xrscene view"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let Some(viewport) = clamp_viewport(view.viewport, color_info.width, color_info.height)
            else {
                log::warn!("View {view_index} lies outside the {}x{} image", color_info.width, color_info.height);
                continue;
            };
            if draws.is_empty() {
                continue;
            }
            pass.set_viewport(
                viewport.x,
                viewport.y,
                viewport.width,
                viewport.height,
                viewport.min_depth,
                viewport.max_depth,
            );
            pass.set_vertex_buffer(0, self.vertices.slice(..));
            pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint16);
            for (draw_index, draw) in draws.iter().enumerate() {
                let key = PipelineKey {
                    state: draw.state,
                    color_format,
                    depth_format,
                    sample_count: request.sample_count,
                };
                let Some(pipeline) = self.pipelines.get(&key) else {
                    continue;
                };
                let block = (view_index * draws.len() + draw_index) as u64;
                let offset = u32::try_from(block * self.uniform_stride).map_err(|_| {
                    RenderError::SubmissionFailed("uniform offset overflow".to_string())
                })?;
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &ring.bind_group, &[offset]);
                pass.draw_indexed(0..self.index_count, 0, 0..1);
            }
        }

        self.device.queue().submit(Some(encoder.finish()));
        Ok(rendered)
    }
}
