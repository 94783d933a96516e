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

//! The contract every graphics backend implements.

use std::fmt::Debug;

use super::error::ResourceError;
use super::handle::{Buffer, Program, RawHandle, Shader, Texture, Uniform};
use super::resource::{
    AdapterInfo, BufferDescriptor, ShaderDescriptor, TextureDescriptor, TextureFormat,
    UniformDescriptor,
};

/// A graphics device able to create and destroy GPU objects.
///
/// Objects are named by [`RawHandle`]s. Callers normally wrap them in a
/// [`UniqueHandle`](super::handle::UniqueHandle) or
/// [`SharedHandle`](super::handle::SharedHandle), which call the matching
/// `destroy_*` method exactly once.
pub trait GpuDevice: Send + Sync + Debug {
    /// Describes the adapter the device runs on.
    fn adapter_info(&self) -> AdapterInfo;

    /// Whether textures of `format` can be created and rendered to.
    fn supports_format(&self, format: TextureFormat) -> bool;

    /// Creates a texture.
    /// ## Arguments
    /// * `descriptor` - Size, layer count, sample count, format and usages.
    /// ## Errors
    /// * `ResourceError` - If the backend rejects the descriptor.
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
    ) -> Result<RawHandle<Texture>, ResourceError>;

    /// Destroys a texture.
    fn destroy_texture(&self, handle: RawHandle<Texture>) -> Result<(), ResourceError>;

    /// Uploads the full contents of one array layer of mip level 0.
    /// ## Arguments
    /// * `handle` - The texture to write.
    /// * `layer` - The array layer to fill.
    /// * `data` - Tightly packed texels, `width * height * bytes_per_pixel` bytes.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If `layer` or `data` exceed the texture.
    fn write_texture(
        &self,
        handle: RawHandle<Texture>,
        layer: u32,
        data: &[u8],
    ) -> Result<(), ResourceError>;

    /// Creates a buffer.
    fn create_buffer(&self, descriptor: &BufferDescriptor)
        -> Result<RawHandle<Buffer>, ResourceError>;

    /// Destroys a buffer.
    fn destroy_buffer(&self, handle: RawHandle<Buffer>) -> Result<(), ResourceError>;

    /// Writes `data` into a buffer at `offset`.
    fn write_buffer(
        &self,
        handle: RawHandle<Buffer>,
        offset: u64,
        data: &[u8],
    ) -> Result<(), ResourceError>;

    /// Compiles a single shader stage.
    fn create_shader(&self, descriptor: &ShaderDescriptor)
        -> Result<RawHandle<Shader>, ResourceError>;

    /// Destroys a shader stage.
    fn destroy_shader(&self, handle: RawHandle<Shader>) -> Result<(), ResourceError>;

    /// Links a vertex and a fragment stage into a program.
    /// ## Arguments
    /// * `vertex` - A live vertex stage.
    /// * `fragment` - A live fragment stage.
    /// * `label` - Debug label.
    /// ## Errors
    /// * `ResourceError::InvalidHandle` - If either stage is not live.
    fn create_program(
        &self,
        vertex: RawHandle<Shader>,
        fragment: RawHandle<Shader>,
        label: Option<&str>,
    ) -> Result<RawHandle<Program>, ResourceError>;

    /// Destroys a program.
    fn destroy_program(&self, handle: RawHandle<Program>) -> Result<(), ResourceError>;

    /// Creates a named uniform slot.
    fn create_uniform(
        &self,
        descriptor: &UniformDescriptor,
    ) -> Result<RawHandle<Uniform>, ResourceError>;

    /// Destroys a uniform slot.
    fn destroy_uniform(&self, handle: RawHandle<Uniform>) -> Result<(), ResourceError>;
}
