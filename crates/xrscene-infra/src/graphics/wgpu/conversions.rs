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


//! Conversions from the engine's graphics types into wgpu types.

use xrscene_core::graphics::render_state::RenderState;
use xrscene_core::graphics::resource::{
    AdapterDeviceType, BufferUsage, TextureFormat, TextureUsage,
};

/// A local extension trait to convert engine types into wgpu types.
///
/// It sidesteps the orphan rule while keeping an `.into_wgpu()` call syntax.
pub trait IntoWgpu<T> {
    /// Consumes self and converts it into a wgpu type.
    fn into_wgpu(self) -> T;
}

impl IntoWgpu<wgpu::TextureFormat> for TextureFormat {
    fn into_wgpu(self) -> wgpu::TextureFormat {
        match self {
            TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
            TextureFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureFormat::Bgra8Unorm => wgpu::TextureFormat::Bgra8Unorm,
            TextureFormat::Bgra8UnormSrgb => wgpu::TextureFormat::Bgra8UnormSrgb,
            TextureFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
            TextureFormat::Depth16Unorm => wgpu::TextureFormat::Depth16Unorm,
            TextureFormat::Depth24PlusStencil8 => wgpu::TextureFormat::Depth24PlusStencil8,
            TextureFormat::Depth32Float => wgpu::TextureFormat::Depth32Float,
            TextureFormat::Depth32FloatStencil8 => wgpu::TextureFormat::Depth32FloatStencil8,
        }
    }
}

impl IntoWgpu<wgpu::TextureUsages> for TextureUsage {
    fn into_wgpu(self) -> wgpu::TextureUsages {
        let mut usages = wgpu::TextureUsages::empty();
        if self.contains(TextureUsage::COPY_SRC) {
            usages |= wgpu::TextureUsages::COPY_SRC;
        }
        if self.contains(TextureUsage::COPY_DST) {
            usages |= wgpu::TextureUsages::COPY_DST;
        }
        if self.contains(TextureUsage::SAMPLED) {
            usages |= wgpu::TextureUsages::TEXTURE_BINDING;
        }
        if self.contains(TextureUsage::RENDER_TARGET) {
            usages |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }
        usages
    }
}

impl IntoWgpu<wgpu::BufferUsages> for BufferUsage {
    fn into_wgpu(self) -> wgpu::BufferUsages {
        let mut usages = wgpu::BufferUsages::empty();
        if self.contains(BufferUsage::COPY_DST) {
            usages |= wgpu::BufferUsages::COPY_DST;
        }
        if self.contains(BufferUsage::VERTEX) {
            usages |= wgpu::BufferUsages::VERTEX;
        }
        if self.contains(BufferUsage::INDEX) {
            usages |= wgpu::BufferUsages::INDEX;
        }
        if self.contains(BufferUsage::UNIFORM) {
            usages |= wgpu::BufferUsages::UNIFORM;
        }
        usages
    }
}

impl IntoWgpu<AdapterDeviceType> for wgpu::DeviceType {
    fn into_wgpu(self) -> AdapterDeviceType {
        match self {
            wgpu::DeviceType::IntegratedGpu => AdapterDeviceType::IntegratedGpu,
            wgpu::DeviceType::DiscreteGpu => AdapterDeviceType::DiscreteGpu,
            wgpu::DeviceType::VirtualGpu => AdapterDeviceType::VirtualGpu,
            wgpu::DeviceType::Cpu => AdapterDeviceType::Cpu,
            _ => AdapterDeviceType::Other,
        }
    }
}

/// Returns a human-readable name for a backend.
pub fn backend_name(backend: wgpu::Backend) -> &'static str {
    match backend {
        wgpu::Backend::Vulkan => "Vulkan",
        wgpu::Backend::Metal => "Metal",
        wgpu::Backend::Dx12 => "DirectX 12",
        wgpu::Backend::Gl => "OpenGL",
        wgpu::Backend::BrowserWebGpu => "WebGPU",
        wgpu::Backend::Noop => "No-op",
    }
}

/// The fixed-function pipeline pieces a [`RenderState`] mask selects.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStates {
    /// Color blending, `None` for opaque writes.
    pub blend: Option<wgpu::BlendState>,
    /// Color channels written.
    pub write_mask: wgpu::ColorWrites,
    /// Winding, culling and fill mode.
    pub primitive: wgpu::PrimitiveState,
    /// Depth comparison and write flag.
    pub depth_compare: wgpu::CompareFunction,
    /// Whether depth is written.
    pub depth_write_enabled: bool,
}

impl PipelineStates {
    /// Decodes `state`. `polygon_line` tells whether the device can rasterize edges only.
    pub fn from_render_state(state: RenderState, polygon_line: bool) -> Self {
        let blend = state
            .contains(RenderState::BLEND_ALPHA)
            .then_some(wgpu::BlendState::ALPHA_BLENDING);

        let mut write_mask = wgpu::ColorWrites::empty();
        if state.contains(RenderState::WRITE_R) {
            write_mask |= wgpu::ColorWrites::RED;
        }
        if state.contains(RenderState::WRITE_G) {
            write_mask |= wgpu::ColorWrites::GREEN;
        }
        if state.contains(RenderState::WRITE_B) {
            write_mask |= wgpu::ColorWrites::BLUE;
        }
        if state.contains(RenderState::WRITE_A) {
            write_mask |= wgpu::ColorWrites::ALPHA;
        }

        // Culling one winding means the other winding is the front face.
        let (front_face, cull_mode) = if state.contains(RenderState::CULL_CW) {
            (wgpu::FrontFace::Ccw, Some(wgpu::Face::Back))
        } else if state.contains(RenderState::CULL_CCW) {
            (wgpu::FrontFace::Cw, Some(wgpu::Face::Back))
        } else {
            (wgpu::FrontFace::Ccw, None)
        };

        let polygon_mode = if polygon_line && state.contains(RenderState::WIREFRAME) {
            wgpu::PolygonMode::Line
        } else {
            wgpu::PolygonMode::Fill
        };

        let depth_compare = if state.contains(RenderState::DEPTH_TEST_GREATER) {
            wgpu::CompareFunction::GreaterEqual
        } else if state.contains(RenderState::DEPTH_TEST_LESS) {
            wgpu::CompareFunction::LessEqual
        } else {
            wgpu::CompareFunction::Always
        };

        Self {
            blend,
            write_mask,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face,
                cull_mode,
                polygon_mode,
                unclipped_depth: false,
                conservative: false,
            },
            depth_compare,
            depth_write_enabled: state.contains(RenderState::WRITE_Z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrscene_core::graphics::render_state::{ResourceStateCache, StateKey};

    #[test]
    fn test_usage_mapping() {
        let usage: wgpu::TextureUsages =
            (TextureUsage::SAMPLED | TextureUsage::RENDER_TARGET).into_wgpu();
        assert_eq!(
            usage,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::RENDER_ATTACHMENT
        );
    }

    #[test]
    fn test_opaque_single_sided_state() {
        let state = ResourceStateCache::global().combine(StateKey::default());
        let decoded = PipelineStates::from_render_state(state, true);
        assert!(decoded.blend.is_none());
        assert_eq!(decoded.write_mask, wgpu::ColorWrites::ALL);
        assert_eq!(decoded.primitive.front_face, wgpu::FrontFace::Cw);
        assert_eq!(decoded.primitive.cull_mode, Some(wgpu::Face::Back));
        assert_eq!(decoded.depth_compare, wgpu::CompareFunction::LessEqual);
        assert!(decoded.depth_write_enabled);
    }

    #[test]
    fn test_reversed_blended_double_sided_state() {
        let state = ResourceStateCache::global().combine(StateKey {
            blended: true,
            double_sided: true,
            wireframe: true,
            reverse_z: true,
            disable_depth_write: true,
            ..StateKey::default()
        });
        let decoded = PipelineStates::from_render_state(state, false);
        assert_eq!(decoded.blend, Some(wgpu::BlendState::ALPHA_BLENDING));
        assert_eq!(decoded.primitive.cull_mode, None);
        // No line rasterization without device support.
        assert_eq!(decoded.primitive.polygon_mode, wgpu::PolygonMode::Fill);
        assert_eq!(decoded.depth_compare, wgpu::CompareFunction::GreaterEqual);
        assert!(!decoded.depth_write_enabled);
    }
}
