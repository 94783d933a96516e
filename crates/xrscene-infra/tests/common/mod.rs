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


#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use glam::{Mat4, Vec3};
use xrscene_core::graphics::error::{RenderError, ResourceError};
use xrscene_core::graphics::handle::{Buffer, Program, RawHandle, Shader, Texture, Uniform};
use xrscene_core::graphics::resource::{
    AdapterInfo, BufferDescriptor, ShaderDescriptor, TextureDescriptor, TextureFormat,
    TextureUsage, UniformDescriptor,
};
use xrscene_core::graphics::{GpuDevice, Rgba};
use xrscene_core::scene::{
    DrawItem, DrawList, RenderViewRequest, Scene, SceneRenderer, SceneResources,
};
use xrscene_core::time::FrameTime;

/// Shape of a texture created on the [`MockDevice`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureRecord {
    pub width: u32,
    pub height: u32,
    pub array_layers: u32,
    pub sample_count: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

/// A device that only keeps books of what is alive.
#[derive(Debug, Default)]
pub struct MockDevice {
    next_id: AtomicU32,
    textures: Mutex<HashMap<u32, TextureRecord>>,
    unsupported: Mutex<HashSet<TextureFormat>>,
}

impl MockDevice {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refuse_format(&self, format: TextureFormat) {
        self.unsupported.lock().unwrap().insert(format);
    }

    pub fn live_textures(&self) -> usize {
        self.textures.lock().unwrap().len()
    }

    pub fn texture(&self, handle: RawHandle<Texture>) -> Option<TextureRecord> {
        self.textures.lock().unwrap().get(&handle.index()).copied()
    }

    fn next<K>(&self) -> RawHandle<K> {
        RawHandle::from_index(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl GpuDevice for MockDevice {
    fn adapter_info(&self) -> AdapterInfo {
        AdapterInfo {
            name: "mock".to_string(),
            ..AdapterInfo::default()
        }
    }

    fn supports_format(&self, format: TextureFormat) -> bool {
        !self.unsupported.lock().unwrap().contains(&format)
    }

    fn create_texture(&self, desc: &TextureDescriptor) -> Result<RawHandle<Texture>, ResourceError> {
        if !self.supports_format(desc.format) {
            return Err(ResourceError::UnsupportedFormat(desc.format));
        }
        let handle = self.next();
        self.textures.lock().unwrap().insert(
            handle.index(),
            TextureRecord {
                width: desc.width,
                height: desc.height,
                array_layers: desc.array_layers,
                sample_count: desc.sample_count,
                format: desc.format,
                usage: desc.usage,
            },
        );
        Ok(handle)
    }

    fn destroy_texture(&self, handle: RawHandle<Texture>) -> Result<(), ResourceError> {
        self.textures
            .lock()
            .unwrap()
            .remove(&handle.index())
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn write_texture(&self, _: RawHandle<Texture>, _: u32, _: &[u8]) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_buffer(&self, _: &BufferDescriptor) -> Result<RawHandle<Buffer>, ResourceError> {
        Ok(self.next())
    }

    fn destroy_buffer(&self, _: RawHandle<Buffer>) -> Result<(), ResourceError> {
        Ok(())
    }

    fn write_buffer(&self, _: RawHandle<Buffer>, _: u64, _: &[u8]) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_shader(&self, _: &ShaderDescriptor) -> Result<RawHandle<Shader>, ResourceError> {
        Ok(self.next())
    }

    fn destroy_shader(&self, _: RawHandle<Shader>) -> Result<(), ResourceError> {
        Ok(())
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
        Ok(())
    }

    fn create_uniform(&self, _: &UniformDescriptor) -> Result<RawHandle<Uniform>, ResourceError> {
        Ok(self.next())
    }

    fn destroy_uniform(&self, _: RawHandle<Uniform>) -> Result<(), ResourceError> {
        Ok(())
    }
}

/// A row of `count` white cubes.
pub struct CubeRow {
    pub count: usize,
}

impl Scene for CubeRow {
    fn name(&self) -> &str {
        "cube row"
    }

    fn object_count(&self) -> usize {
        self.count
    }

    fn render(&self, resources: &SceneResources, _: &FrameTime, draws: &mut DrawList) {
        for i in 0..self.count {
            draws.push(DrawItem {
                transform: Mat4::from_translation(Vec3::new(i as f32 - 1.0, 1.5, -2.0)),
                color: Rgba::WHITE,
                state: resources.set_state(false, false, false, false),
            });
        }
    }
}

/// Keeps every request instead of drawing.
#[derive(Default)]
pub struct RecordingRenderer {
    pub requests: Vec<RenderViewRequest>,
}

impl SceneRenderer for RecordingRenderer {
    fn render_views(
        &mut self,
        request: &RenderViewRequest,
        scenes: &[Box<dyn Scene>],
        _: &SceneResources,
        _: &FrameTime,
    ) -> Result<bool, RenderError> {
        self.requests.push(request.clone());
        Ok(scenes.iter().any(|s| s.is_active() && s.object_count() > 0))
    }
}
