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


//! The wgpu implementation of [`GpuDevice`].
//!
//! Objects live in per-kind maps keyed by the index of their [`RawHandle`]. The
//! maps hold `Arc`s so the renderer can keep using an object for the frame it
//! records even if its handle is destroyed concurrently.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use xrscene_core::graphics::device::GpuDevice;
use xrscene_core::graphics::error::ResourceError;
use xrscene_core::graphics::handle::{Buffer, Program, RawHandle, Shader, Texture, Uniform};
use xrscene_core::graphics::resource::{
    AdapterInfo, BufferDescriptor, ShaderDescriptor, ShaderStage, TextureDescriptor,
    TextureFormat, UniformDescriptor, UniformKind,
};

use super::conversions::IntoWgpu;

#[derive(Debug)]
struct WgpuTextureEntry {
    texture: Arc<wgpu::Texture>,
    width: u32,
    height: u32,
    array_layers: u32,
    sample_count: u32,
    format: TextureFormat,
    size: usize,
}

#[derive(Debug)]
struct WgpuBufferEntry {
    buffer: Arc<wgpu::Buffer>,
    size: u64,
}

#[derive(Debug)]
struct WgpuShaderEntry {
    module: Arc<wgpu::ShaderModule>,
    stage: ShaderStage,
    entry_point: String,
}

/// A linked vertex and fragment stage.
#[derive(Debug, Clone)]
pub struct WgpuProgram {
    /// Module of the vertex stage.
    pub vertex_module: Arc<wgpu::ShaderModule>,
    /// Entry point of the vertex stage.
    pub vertex_entry: String,
    /// Module of the fragment stage.
    pub fragment_module: Arc<wgpu::ShaderModule>,
    /// Entry point of the fragment stage.
    pub fragment_entry: String,
}

#[derive(Debug)]
struct WgpuUniformEntry {
    name: String,
    kind: UniformKind,
    count: u16,
    sampler: Option<Arc<wgpu::Sampler>>,
}

/// Size and layout of a live texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WgpuTextureInfo {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Number of array layers.
    pub array_layers: u32,
    /// Samples per texel.
    pub sample_count: u32,
    /// Texel format.
    pub format: TextureFormat,
}

#[derive(Debug)]
struct WgpuDeviceInternal {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_info: AdapterInfo,
    textures: Mutex<HashMap<u32, WgpuTextureEntry>>,
    buffers: Mutex<HashMap<u32, WgpuBufferEntry>>,
    shaders: Mutex<HashMap<u32, WgpuShaderEntry>>,
    programs: Mutex<HashMap<u32, WgpuProgram>>,
    uniforms: Mutex<HashMap<u32, WgpuUniformEntry>>,
    next_id: AtomicU32,
    vram_allocated_bytes: AtomicUsize,
}

/// A [`GpuDevice`] backed by a `wgpu::Device` and its queue.
///
/// Cloning is cheap and every clone names the same objects.
#[derive(Debug, Clone)]
pub struct WgpuDevice {
    internal: Arc<WgpuDeviceInternal>,
}

fn lock<T>(map: &Mutex<T>) -> Result<MutexGuard<'_, T>, ResourceError> {
    map.lock()
        .map_err(|e| ResourceError::BackendError(format!("Resource map poisoned: {e}")))
}

fn creation_failed(kind: &'static str, details: impl Into<String>) -> ResourceError {
    ResourceError::CreationFailed {
        kind,
        details: details.into(),
    }
}

impl WgpuDevice {
    /// Wraps a created device and its queue.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, adapter_info: &wgpu::AdapterInfo) -> Self {
        let adapter_info = AdapterInfo {
            name: adapter_info.name.clone(),
            backend: super::conversions::backend_name(adapter_info.backend).to_string(),
            device_type: adapter_info.device_type.into_wgpu(),
        };
        Self {
            internal: Arc::new(WgpuDeviceInternal {
                device,
                queue,
                adapter_info,
                textures: Mutex::new(HashMap::new()),
                buffers: Mutex::new(HashMap::new()),
                shaders: Mutex::new(HashMap::new()),
                programs: Mutex::new(HashMap::new()),
                uniforms: Mutex::new(HashMap::new()),
                next_id: AtomicU32::new(0),
                vram_allocated_bytes: AtomicUsize::new(0),
            }),
        }
    }

    fn next_index(&self) -> u32 {
        self.internal.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// The underlying wgpu device.
    pub fn wgpu_device(&self) -> &wgpu::Device {
        &self.internal.device
    }

    /// The queue commands are submitted to.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.internal.queue
    }

    /// Whether pipelines may rasterize edges only.
    pub fn supports_polygon_line(&self) -> bool {
        self.internal
            .device
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE)
    }

    /// Bytes currently held by live textures.
    pub fn vram_allocated_bytes(&self) -> usize {
        self.internal.vram_allocated_bytes.load(Ordering::Relaxed)
    }

    /// Size and layout of a live texture.
    pub fn texture_info(&self, handle: RawHandle<Texture>) -> Option<WgpuTextureInfo> {
        let textures = self.internal.textures.lock().ok()?;
        textures.get(&handle.index()).map(|entry| WgpuTextureInfo {
            width: entry.width,
            height: entry.height,
            array_layers: entry.array_layers,
            sample_count: entry.sample_count,
            format: entry.format,
        })
    }

    /// A 2D view of one array layer of a live texture.
    /// ## Errors
    /// * `ResourceError::InvalidHandle` - If the texture is not live.
    /// * `ResourceError::OutOfBounds` - If `layer` exceeds the layer count.
    pub fn texture_view(
        &self,
        handle: RawHandle<Texture>,
        layer: u32,
    ) -> Result<wgpu::TextureView, ResourceError> {
        let textures = lock(&self.internal.textures)?;
        let entry = textures
            .get(&handle.index())
            .ok_or(ResourceError::InvalidHandle)?;
        if layer >= entry.array_layers {
            return Err(ResourceError::OutOfBounds);
        }
        Ok(entry.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("xrscene layer view"),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_array_layer: layer,
            array_layer_count: Some(1),
            ..Default::default()
        }))
    }

    /// A live buffer.
    pub fn buffer(&self, handle: RawHandle<Buffer>) -> Option<Arc<wgpu::Buffer>> {
        let buffers = self.internal.buffers.lock().ok()?;
        buffers.get(&handle.index()).map(|entry| entry.buffer.clone())
    }

    /// A live program.
    pub fn program(&self, handle: RawHandle<Program>) -> Option<WgpuProgram> {
        let programs = self.internal.programs.lock().ok()?;
        programs.get(&handle.index()).cloned()
    }

    /// The sampler behind a sampler uniform.
    pub fn sampler(&self, handle: RawHandle<Uniform>) -> Option<Arc<wgpu::Sampler>> {
        let uniforms = self.internal.uniforms.lock().ok()?;
        uniforms.get(&handle.index())?.sampler.clone()
    }

    /// Name and array size of a live uniform.
    pub fn uniform_binding(&self, handle: RawHandle<Uniform>) -> Option<(String, UniformKind, u16)> {
        let uniforms = self.internal.uniforms.lock().ok()?;
        uniforms
            .get(&handle.index())
            .map(|entry| (entry.name.clone(), entry.kind, entry.count))
    }

    fn validate_texture(&self, descriptor: &TextureDescriptor) -> Result<(), ResourceError> {
        let limits = self.internal.device.limits();
        if descriptor.width == 0
            || descriptor.height == 0
            || descriptor.array_layers == 0
            || descriptor.mip_level_count == 0
        {
            return Err(creation_failed("texture", "zero sized texture"));
        }
        if descriptor.width > limits.max_texture_dimension_2d
            || descriptor.height > limits.max_texture_dimension_2d
        {
            return Err(creation_failed(
                "texture",
                format!(
                    "{}x{} exceeds the {} texel limit",
                    descriptor.width, descriptor.height, limits.max_texture_dimension_2d
                ),
            ));
        }
        if descriptor.array_layers > limits.max_texture_array_layers {
            return Err(creation_failed(
                "texture",
                format!("{} array layers exceed the limit", descriptor.array_layers),
            ));
        }
        if !matches!(descriptor.sample_count, 1 | 4) {
            return Err(creation_failed(
                "texture",
                format!("unsupported sample count {}", descriptor.sample_count),
            ));
        }
        if descriptor.sample_count > 1
            && (descriptor.array_layers > 1 || descriptor.mip_level_count > 1)
        {
            return Err(creation_failed(
                "texture",
                "multisampled textures have a single layer and mip",
            ));
        }
        if descriptor.usage.is_empty() {
            return Err(creation_failed("texture", "no usage"));
        }
        if !self.supports_format(descriptor.format) {
            return Err(ResourceError::UnsupportedFormat(descriptor.format));
        }
        Ok(())
    }
}

impl GpuDevice for WgpuDevice {
    fn adapter_info(&self) -> AdapterInfo {
        self.internal.adapter_info.clone()
    }

    fn supports_format(&self, format: TextureFormat) -> bool {
        match format {
            TextureFormat::Depth32FloatStencil8 => self
                .internal
                .device
                .features()
                .contains(wgpu::Features::DEPTH32FLOAT_STENCIL8),
            _ => true,
        }
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
    ) -> Result<RawHandle<Texture>, ResourceError> {
        self.validate_texture(descriptor)?;

        let texture = self.internal.device.create_texture(&wgpu::TextureDescriptor {
            label: descriptor.label.as_deref(),
            size: wgpu::Extent3d {
                width: descriptor.width,
                height: descriptor.height,
                depth_or_array_layers: descriptor.array_layers,
            },
            mip_level_count: descriptor.mip_level_count,
            sample_count: descriptor.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: descriptor.format.into_wgpu(),
            usage: descriptor.usage.into_wgpu(),
            view_formats: &[],
        });

        let size = descriptor.width as usize
            * descriptor.height as usize
            * descriptor.array_layers as usize
            * descriptor.sample_count as usize
            * descriptor.format.bytes_per_pixel() as usize;
        self.internal
            .vram_allocated_bytes
            .fetch_add(size, Ordering::Relaxed);

        let index = self.next_index();
        lock(&self.internal.textures)?.insert(
            index,
            WgpuTextureEntry {
                texture: Arc::new(texture),
                width: descriptor.width,
                height: descriptor.height,
                array_layers: descriptor.array_layers,
                sample_count: descriptor.sample_count,
                format: descriptor.format,
                size,
            },
        );
        log::debug!(
            "WgpuDevice: Created texture '{}' with ID {index}, {size} bytes",
            descriptor.label.as_deref().unwrap_or_default()
        );
        Ok(RawHandle::from_index(index))
    }

    fn destroy_texture(&self, handle: RawHandle<Texture>) -> Result<(), ResourceError> {
        let entry = lock(&self.internal.textures)?
            .remove(&handle.index())
            .ok_or(ResourceError::InvalidHandle)?;
        self.internal
            .vram_allocated_bytes
            .fetch_sub(entry.size, Ordering::Relaxed);
        log::debug!("WgpuDevice: Destroyed texture with ID {}", handle.index());
        Ok(())
    }

    fn write_texture(
        &self,
        handle: RawHandle<Texture>,
        layer: u32,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        let textures = lock(&self.internal.textures)?;
        let entry = textures
            .get(&handle.index())
            .ok_or(ResourceError::InvalidHandle)?;
        let bytes_per_row = entry.width * entry.format.bytes_per_pixel();
        if layer >= entry.array_layers || data.len() != (bytes_per_row * entry.height) as usize {
            return Err(ResourceError::OutOfBounds);
        }

        self.internal.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &entry.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer,
                },
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(entry.height),
            },
            wgpu::Extent3d {
                width: entry.width,
                height: entry.height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    fn create_buffer(
        &self,
        descriptor: &BufferDescriptor,
    ) -> Result<RawHandle<Buffer>, ResourceError> {
        if descriptor.size == 0 {
            return Err(creation_failed("buffer", "zero sized buffer"));
        }
        let buffer = self.internal.device.create_buffer(&wgpu::BufferDescriptor {
            label: descriptor.label.as_deref(),
            size: descriptor.size,
            usage: descriptor.usage.into_wgpu(),
            mapped_at_creation: false,
        });
        let index = self.next_index();
        lock(&self.internal.buffers)?.insert(
            index,
            WgpuBufferEntry {
                buffer: Arc::new(buffer),
                size: descriptor.size,
            },
        );
        Ok(RawHandle::from_index(index))
    }

    fn destroy_buffer(&self, handle: RawHandle<Buffer>) -> Result<(), ResourceError> {
        lock(&self.internal.buffers)?
            .remove(&handle.index())
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn write_buffer(
        &self,
        handle: RawHandle<Buffer>,
        offset: u64,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        let buffers = lock(&self.internal.buffers)?;
        let entry = buffers
            .get(&handle.index())
            .ok_or(ResourceError::InvalidHandle)?;
        if offset + data.len() as u64 > entry.size {
            return Err(ResourceError::OutOfBounds);
        }
        self.internal.queue.write_buffer(&entry.buffer, offset, data);
        Ok(())
    }

    fn create_shader(
        &self,
        descriptor: &ShaderDescriptor,
    ) -> Result<RawHandle<Shader>, ResourceError> {
        let module = self
            .internal
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: descriptor.label.as_deref(),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(descriptor.source.as_ref())),
            });
        let index = self.next_index();
        lock(&self.internal.shaders)?.insert(
            index,
            WgpuShaderEntry {
                module: Arc::new(module),
                stage: descriptor.stage,
                entry_point: descriptor.entry_point.to_string(),
            },
        );
        Ok(RawHandle::from_index(index))
    }

    fn destroy_shader(&self, handle: RawHandle<Shader>) -> Result<(), ResourceError> {
        lock(&self.internal.shaders)?
            .remove(&handle.index())
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn create_program(
        &self,
        vertex: RawHandle<Shader>,
        fragment: RawHandle<Shader>,
        label: Option<&str>,
    ) -> Result<RawHandle<Program>, ResourceError> {
        let program = {
            let shaders = lock(&self.internal.shaders)?;
            let vs = shaders
                .get(&vertex.index())
                .ok_or(ResourceError::InvalidHandle)?;
            let fs = shaders
                .get(&fragment.index())
                .ok_or(ResourceError::InvalidHandle)?;
            if vs.stage != ShaderStage::Vertex || fs.stage != ShaderStage::Fragment {
                return Err(creation_failed(
                    "program",
                    format!("stages {:?} and {:?} cannot be linked", vs.stage, fs.stage),
                ));
            }
            WgpuProgram {
                vertex_module: vs.module.clone(),
                vertex_entry: vs.entry_point.clone(),
                fragment_module: fs.module.clone(),
                fragment_entry: fs.entry_point.clone(),
            }
        };
        let index = self.next_index();
        lock(&self.internal.programs)?.insert(index, program);
        log::debug!(
            "WgpuDevice: Linked program '{}' with ID {index}",
            label.unwrap_or_default()
        );
        Ok(RawHandle::from_index(index))
    }

    fn destroy_program(&self, handle: RawHandle<Program>) -> Result<(), ResourceError> {
        lock(&self.internal.programs)?
            .remove(&handle.index())
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn create_uniform(
        &self,
        descriptor: &UniformDescriptor,
    ) -> Result<RawHandle<Uniform>, ResourceError> {
        let sampler = (descriptor.kind == UniformKind::Sampler).then(|| {
            Arc::new(self.internal.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(descriptor.name.as_ref()),
                address_mode_u: wgpu::AddressMode::Repeat,
                address_mode_v: wgpu::AddressMode::Repeat,
                address_mode_w: wgpu::AddressMode::Repeat,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Linear,
                ..Default::default()
            }))
        });
        let index = self.next_index();
        lock(&self.internal.uniforms)?.insert(
            index,
            WgpuUniformEntry {
                name: descriptor.name.to_string(),
                kind: descriptor.kind,
                count: descriptor.count,
                sampler,
            },
        );
        Ok(RawHandle::from_index(index))
    }

    fn destroy_uniform(&self, handle: RawHandle<Uniform>) -> Result<(), ResourceError> {
        lock(&self.internal.uniforms)?
            .remove(&handle.index())
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }
}
