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

//! Descriptors for the GPU objects a [`GpuDevice`](super::device::GpuDevice) creates.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::xrscene_bitflags;

/// Pixel formats usable for swapchains and sampled textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFormat {
    /// 8-bit RGBA, linear.
    Rgba8Unorm,
    /// 8-bit RGBA, sRGB encoded.
    Rgba8UnormSrgb,
    /// 8-bit BGRA, linear.
    Bgra8Unorm,
    /// 8-bit BGRA, sRGB encoded.
    Bgra8UnormSrgb,
    /// 16-bit float RGBA.
    Rgba16Float,
    /// 16-bit normalized depth.
    Depth16Unorm,
    /// 24-bit depth with 8-bit stencil.
    Depth24PlusStencil8,
    /// 32-bit float depth.
    Depth32Float,
    /// 32-bit float depth with 8-bit stencil.
    Depth32FloatStencil8,
}

impl TextureFormat {
    /// `true` for depth and depth-stencil formats.
    pub const fn is_depth(self) -> bool {
        matches!(
            self,
            Self::Depth16Unorm
                | Self::Depth24PlusStencil8
                | Self::Depth32Float
                | Self::Depth32FloatStencil8
        )
    }

    /// `true` for sRGB encoded color formats.
    pub const fn is_srgb(self) -> bool {
        matches!(self, Self::Rgba8UnormSrgb | Self::Bgra8UnormSrgb)
    }

    /// Size of one texel in bytes.
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Rgba8Unorm
            | Self::Rgba8UnormSrgb
            | Self::Bgra8Unorm
            | Self::Bgra8UnormSrgb
            | Self::Depth24PlusStencil8
            | Self::Depth32Float => 4,
            Self::Rgba16Float | Self::Depth32FloatStencil8 => 8,
            Self::Depth16Unorm => 2,
        }
    }
}

xrscene_bitflags! {
    /// How a texture may be used once created.
    pub struct TextureUsage: u32 {
        /// Source of a copy.
        const COPY_SRC = 1 << 0;
        /// Destination of a copy or a `write_texture`.
        const COPY_DST = 1 << 1;
        /// Sampled from shaders.
        const SAMPLED = 1 << 2;
        /// Bound as a color or depth render target.
        const RENDER_TARGET = 1 << 3;
    }
}

xrscene_bitflags! {
    /// How a buffer may be used once created.
    pub struct BufferUsage: u32 {
        /// Destination of a copy or a `write_buffer`.
        const COPY_DST = 1 << 0;
        /// Vertex attributes.
        const VERTEX = 1 << 1;
        /// Index data.
        const INDEX = 1 << 2;
        /// Uniform block.
        const UNIFORM = 1 << 3;
    }
}

/// Parameters of a 2D (optionally layered and multisampled) texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor<'a> {
    /// Debug label.
    pub label: Option<Cow<'a, str>>,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Number of array layers, at least 1.
    pub array_layers: u32,
    /// Number of mip levels, at least 1.
    pub mip_level_count: u32,
    /// Samples per texel, 1 for single-sampled.
    pub sample_count: u32,
    /// Texel format.
    pub format: TextureFormat,
    /// Allowed usages.
    pub usage: TextureUsage,
}

impl Default for TextureDescriptor<'_> {
    fn default() -> Self {
        Self {
            label: None,
            width: 1,
            height: 1,
            array_layers: 1,
            mip_level_count: 1,
            sample_count: 1,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsage::SAMPLED | TextureUsage::COPY_DST,
        }
    }
}

/// Parameters of a GPU buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferDescriptor<'a> {
    /// Debug label.
    pub label: Option<Cow<'a, str>>,
    /// Size in bytes.
    pub size: u64,
    /// Allowed usages.
    pub usage: BufferUsage,
}

/// Pipeline stage a shader runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Fragment stage.
    Fragment,
}

/// A shader stage to compile.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderDescriptor<'a> {
    /// Debug label.
    pub label: Option<Cow<'a, str>>,
    /// Stage the module is compiled for.
    pub stage: ShaderStage,
    /// Source text in the backend's shading language.
    pub source: Cow<'a, str>,
    /// Entry point name.
    pub entry_point: Cow<'a, str>,
}

/// The data type behind a named uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// A texture sampler.
    Sampler,
    /// A four component vector.
    Vec4,
    /// A 3x3 matrix.
    Mat3,
    /// A 4x4 matrix.
    Mat4,
}

impl UniformKind {
    /// Size in bytes of one element in a uniform block, `0` for samplers.
    pub const fn byte_size(self) -> u64 {
        match self {
            Self::Sampler => 0,
            Self::Vec4 => 16,
            // std140 pads each column to a vec4
            Self::Mat3 => 48,
            Self::Mat4 => 64,
        }
    }
}

/// A named uniform slot.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDescriptor<'a> {
    /// Name the shaders refer to.
    pub name: Cow<'a, str>,
    /// Data type.
    pub kind: UniformKind,
    /// Number of array elements, 1 for scalars.
    pub count: u16,
}

/// Broad category of the physical adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdapterDeviceType {
    /// Integrated GPU.
    IntegratedGpu,
    /// Discrete GPU.
    DiscreteGpu,
    /// Virtualized GPU.
    VirtualGpu,
    /// Software rasterizer.
    Cpu,
    /// Anything else.
    #[default]
    Other,
}

/// Identification of the adapter a device was created on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdapterInfo {
    /// Adapter name reported by the driver.
    pub name: String,
    /// Backend API name (Vulkan, Metal, DX12, ...).
    pub backend: String,
    /// Adapter category.
    pub device_type: AdapterDeviceType,
}
