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

//! Instrumented fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use glam::Mat4;
use xrscene_core::graphics::{
    AdapterInfo, Buffer, BufferDescriptor, GpuDevice, Program, RawHandle, RenderError,
    ResourceError, Rgba, Shader, ShaderDescriptor, Texture, TextureDescriptor, TextureFormat,
    Uniform, UniformDescriptor,
};
use xrscene_core::scene::{
    render_active_scenes, DrawItem, DrawList, RenderViewRequest, Scene, SceneRenderer,
    SceneResources,
};
use xrscene_core::time::FrameTime;
use xrscene_core::xr::{
    Compositor, CompositorError, CreatedSwapchain, ExtensionSupport, SessionContext,
    SwapchainCreateInfo, Timeout, ViewConfigurationType, WaitOutcome, XrSwapchain,
};

// --- DEVICE ---

/// A device that hands out increasing ids and records every destruction.
#[derive(Debug, Default)]
pub struct MockDevice {
    next_id: AtomicU32,
    pub textures_created: AtomicUsize,
    pub uniforms_created: AtomicUsize,
    pub destroyed_textures: Mutex<Vec<u32>>,
    pub destroyed_uniforms: Mutex<Vec<u32>>,
    pub texture_writes: Mutex<Vec<(u32, Vec<u8>)>>,
    write_hook: Mutex<Option<WriteHook>>,
}

/// Runs once, on the next texture write, outside every device lock.
pub struct WriteHook(Box<dyn FnOnce() + Send>);

impl std::fmt::Debug for WriteHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WriteHook")
    }
}

impl MockDevice {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn next<K>(&self) -> RawHandle<K> {
        RawHandle::from_index(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    pub fn textures_created(&self) -> usize {
        self.textures_created.load(Ordering::SeqCst)
    }

    pub fn destroyed_textures(&self) -> Vec<u32> {
        self.destroyed_textures.lock().unwrap().clone()
    }

    pub fn on_next_texture_write(&self, hook: impl FnOnce() + Send + 'static) {
        *self.write_hook.lock().unwrap() = Some(WriteHook(Box::new(hook)));
    }
}

impl GpuDevice for MockDevice {
    fn adapter_info(&self) -> AdapterInfo {
        AdapterInfo {
            name: "mock".to_string(),
            ..Default::default()
        }
    }

    fn supports_format(&self, _format: TextureFormat) -> bool {
        true
    }

    fn create_texture(&self, _: &TextureDescriptor) -> Result<RawHandle<Texture>, ResourceError> {
        self.textures_created.fetch_add(1, Ordering::SeqCst);
        Ok(self.next())
    }

    fn destroy_texture(&self, handle: RawHandle<Texture>) -> Result<(), ResourceError> {
        self.destroyed_textures.lock().unwrap().push(handle.index());
        Ok(())
    }

    fn write_texture(
        &self,
        handle: RawHandle<Texture>,
        _layer: u32,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        self.texture_writes
            .lock()
            .unwrap()
            .push((handle.index(), data.to_vec()));
        let hook = self.write_hook.lock().unwrap().take();
        if let Some(WriteHook(hook)) = hook {
            hook();
        }
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
        self.uniforms_created.fetch_add(1, Ordering::SeqCst);
        Ok(self.next())
    }

    fn destroy_uniform(&self, handle: RawHandle<Uniform>) -> Result<(), ResourceError> {
        self.destroyed_uniforms.lock().unwrap().push(handle.index());
        Ok(())
    }
}

pub fn resources(device: &Arc<MockDevice>) -> SceneResources {
    let device: Arc<dyn GpuDevice> = device.clone();
    SceneResources::new(device).unwrap()
}

// --- COMPOSITOR ---

/// One call made to the [`MockCompositor`].
#[derive(Debug, Clone, PartialEq)]
pub enum CompositorCall {
    Create(SwapchainCreateInfo),
    Destroy(u32),
    Acquire(u32),
    Wait(u32),
    Release(u32),
}

#[derive(Debug, Default)]
struct MockSwapchain {
    format: Option<TextureFormat>,
    next_image: u32,
    acquired: u32,
}

#[derive(Debug, Default)]
struct MockCompositorState {
    next_id: u32,
    next_image_id: u32,
    swapchains: HashMap<u32, MockSwapchain>,
    calls: Vec<CompositorCall>,
    timeout_format: Option<TextureFormat>,
    fail_acquire_format: Option<TextureFormat>,
    fail_wait_format: Option<TextureFormat>,
    fail_create: bool,
}

/// A compositor with three images per swapchain that records every call.
#[derive(Debug, Default)]
pub struct MockCompositor {
    state: Mutex<MockCompositorState>,
}

pub const IMAGES_PER_SWAPCHAIN: u32 = 3;

impl MockCompositor {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<CompositorCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn created(&self) -> Vec<SwapchainCreateInfo> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                CompositorCall::Create(info) => Some(info),
                _ => None,
            })
            .collect()
    }

    pub fn destroyed(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                CompositorCall::Destroy(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn live_swapchains(&self) -> usize {
        self.state.lock().unwrap().swapchains.len()
    }

    /// Images acquired and not yet released, over every swapchain.
    pub fn outstanding_images(&self) -> u32 {
        self.state
            .lock()
            .unwrap()
            .swapchains
            .values()
            .map(|s| s.acquired)
            .sum()
    }

    /// Waits on swapchains of `format` time out.
    pub fn time_out_waits_on(&self, format: Option<TextureFormat>) {
        self.state.lock().unwrap().timeout_format = format;
    }

    /// Acquires on swapchains of `format` fail.
    pub fn fail_acquires_on(&self, format: Option<TextureFormat>) {
        self.state.lock().unwrap().fail_acquire_format = format;
    }

    /// Waits on swapchains of `format` fail.
    pub fn fail_waits_on(&self, format: Option<TextureFormat>) {
        self.state.lock().unwrap().fail_wait_format = format;
    }

    pub fn fail_creation(&self, fail: bool) {
        self.state.lock().unwrap().fail_create = fail;
    }
}

impl Compositor for MockCompositor {
    fn create_swapchain(
        &self,
        info: &SwapchainCreateInfo,
    ) -> Result<CreatedSwapchain, CompositorError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(CompositorCall::Create(info.clone()));
        if state.fail_create {
            return Err(CompositorError::SwapchainCreationFailed("scripted".into()));
        }
        let id = state.next_id;
        state.next_id += 1;
        let first_image = state.next_image_id;
        state.next_image_id += IMAGES_PER_SWAPCHAIN;
        state.swapchains.insert(
            id,
            MockSwapchain {
                format: Some(info.format),
                ..Default::default()
            },
        );
        Ok(CreatedSwapchain {
            handle: RawHandle::from_index(id),
            images: (first_image..first_image + IMAGES_PER_SWAPCHAIN)
                .map(RawHandle::from_index)
                .collect(),
        })
    }

    fn destroy_swapchain(&self, swapchain: RawHandle<XrSwapchain>) -> Result<(), CompositorError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(CompositorCall::Destroy(swapchain.index()));
        state
            .swapchains
            .remove(&swapchain.index())
            .map(|_| ())
            .ok_or(CompositorError::InvalidSwapchain)
    }

    fn acquire_image(&self, swapchain: RawHandle<XrSwapchain>) -> Result<u32, CompositorError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(CompositorCall::Acquire(swapchain.index()));
        let fail_format = state.fail_acquire_format;
        let chain = state
            .swapchains
            .get_mut(&swapchain.index())
            .ok_or(CompositorError::InvalidSwapchain)?;
        if fail_format.is_some() && chain.format == fail_format {
            return Err(CompositorError::AcquireFailed("scripted".into()));
        }
        let index = chain.next_image;
        chain.next_image = (chain.next_image + 1) % IMAGES_PER_SWAPCHAIN;
        chain.acquired += 1;
        Ok(index)
    }

    fn wait_image(
        &self,
        swapchain: RawHandle<XrSwapchain>,
        _timeout: Timeout,
    ) -> Result<WaitOutcome, CompositorError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(CompositorCall::Wait(swapchain.index()));
        let timeout_format = state.timeout_format;
        let fail_format = state.fail_wait_format;
        let chain = state
            .swapchains
            .get(&swapchain.index())
            .ok_or(CompositorError::InvalidSwapchain)?;
        if chain.acquired == 0 {
            return Err(CompositorError::WaitFailed("no image acquired".into()));
        }
        if fail_format.is_some() && chain.format == fail_format {
            return Err(CompositorError::WaitFailed("scripted".into()));
        }
        if timeout_format.is_some() && chain.format == timeout_format {
            return Ok(WaitOutcome::TimedOut);
        }
        Ok(WaitOutcome::Ready)
    }

    fn release_image(&self, swapchain: RawHandle<XrSwapchain>) -> Result<(), CompositorError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(CompositorCall::Release(swapchain.index()));
        let chain = state
            .swapchains
            .get_mut(&swapchain.index())
            .ok_or(CompositorError::InvalidSwapchain)?;
        if chain.acquired == 0 {
            return Err(CompositorError::ReleaseFailed("no image acquired".into()));
        }
        chain.acquired -= 1;
        Ok(())
    }
}

pub fn session(secondary: &[ViewConfigurationType]) -> SessionContext {
    SessionContext {
        primary_view_configuration: ViewConfigurationType::PrimaryStereo,
        enabled_secondary_view_configurations: secondary.to_vec(),
        supported_color_formats: vec![TextureFormat::Rgba8UnormSrgb, TextureFormat::Bgra8UnormSrgb],
        supported_depth_formats: vec![TextureFormat::Depth32Float, TextureFormat::Depth16Unorm],
        extensions: ExtensionSupport {
            secondary_view_configuration: !secondary.is_empty(),
            depth_info: true,
        },
    }
}

// --- SCENES ---

/// A scene drawing `count` white objects.
pub struct CountingScene {
    pub count: usize,
}

impl Scene for CountingScene {
    fn name(&self) -> &str {
        "counting"
    }

    fn object_count(&self) -> usize {
        self.count
    }

    fn render(&self, _: &SceneResources, _: &FrameTime, draws: &mut DrawList) {
        for i in 0..self.count {
            draws.push(DrawItem {
                transform: Mat4::from_translation(glam::Vec3::X * i as f32),
                color: Rgba::WHITE,
                state: Default::default(),
            });
        }
    }
}

/// A renderer that records requests instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub requests: Vec<RenderViewRequest>,
    pub fail: bool,
}

impl SceneRenderer for RecordingRenderer {
    fn render_views(
        &mut self,
        request: &RenderViewRequest,
        scenes: &[Box<dyn Scene>],
        resources: &SceneResources,
        frame_time: &FrameTime,
    ) -> Result<bool, RenderError> {
        self.requests.push(request.clone());
        if self.fail {
            return Err(RenderError::SubmissionFailed("scripted".into()));
        }
        let mut draws = DrawList::new();
        Ok(render_active_scenes(scenes, resources, frame_time, &mut draws))
    }
}
