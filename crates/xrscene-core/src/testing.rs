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

//! A counting in-memory device for unit tests.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::graphics::device::GpuDevice;
use crate::graphics::error::ResourceError;
use crate::graphics::handle::{Buffer, Program, RawHandle, Shader, Texture, Uniform};
use crate::graphics::resource::{
    AdapterInfo, BufferDescriptor, ShaderDescriptor, TextureDescriptor, TextureFormat,
    UniformDescriptor,
};
use crate::scene::SceneResources;

#[derive(Debug, Default)]
pub(crate) struct NullDevice {
    next_id: AtomicU32,
    pub(crate) created: AtomicUsize,
    pub(crate) destroyed: AtomicUsize,
}

impl NullDevice {
    fn next<K>(&self) -> RawHandle<K> {
        self.created.fetch_add(1, Ordering::SeqCst);
        RawHandle::from_index(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn destroy(&self) -> Result<(), ResourceError> {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl GpuDevice for NullDevice {
    fn adapter_info(&self) -> AdapterInfo {
        AdapterInfo::default()
    }

    fn supports_format(&self, _format: TextureFormat) -> bool {
        true
    }

    fn create_texture(&self, _: &TextureDescriptor) -> Result<RawHandle<Texture>, ResourceError> {
        Ok(self.next())
    }

    fn destroy_texture(&self, _: RawHandle<Texture>) -> Result<(), ResourceError> {
        self.destroy()
    }

    fn write_texture(&self, _: RawHandle<Texture>, _: u32, _: &[u8]) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_buffer(&self, _: &BufferDescriptor) -> Result<RawHandle<Buffer>, ResourceError> {
        Ok(self.next())
    }

    fn destroy_buffer(&self, _: RawHandle<Buffer>) -> Result<(), ResourceError> {
        self.destroy()
    }

    fn write_buffer(&self, _: RawHandle<Buffer>, _: u64, _: &[u8]) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_shader(&self, _: &ShaderDescriptor) -> Result<RawHandle<Shader>, ResourceError> {
        Ok(self.next())
    }

    fn destroy_shader(&self, _: RawHandle<Shader>) -> Result<(), ResourceError> {
        self.destroy()
    }

    fn create_program(
        &self,
        _: RawHandle<Shader>,
        _: RawHandle<Shader>,
        _: Option<&str>,
    ) -> Result<RawHandle<Program>, ResourceError> {
        Ok(self.next())
    }

    fn destroy_program(&self, _: RawHandle<Program>) -> Result<(), ResourceError> {
        self.destroy()
    }

    fn create_uniform(&self, _: &UniformDescriptor) -> Result<RawHandle<Uniform>, ResourceError> {
        Ok(self.next())
    }

    fn destroy_uniform(&self, _: RawHandle<Uniform>) -> Result<(), ResourceError> {
        self.destroy()
    }
}

pub(crate) fn resources() -> SceneResources {
    let device: Arc<dyn GpuDevice> = Arc::new(NullDevice::default());
    SceneResources::new(device).unwrap()
}
