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


//! An offscreen compositor standing in for an XR runtime.
//!
//! Swapchain images are ordinary device textures. The frame protocol is
//! enforced the way a runtime enforces it: images are acquired in ring order,
//! a wait applies to the oldest acquired image not yet waited on, and release
//! hands back the oldest acquired image.

use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use glam::{Quat, Vec3};

use xrscene_core::graphics::device::GpuDevice;
use xrscene_core::graphics::handle::{RawHandle, Texture, UniqueHandle};
use xrscene_core::graphics::resource::{TextureDescriptor, TextureFormat, TextureUsage};
use xrscene_core::layer::CompositionLayers;
use xrscene_core::time::FrameTime;
use xrscene_core::xr::compositor::{
    Compositor, CreatedSwapchain, SwapchainCreateInfo, XrSwapchain,
};
use xrscene_core::xr::error::CompositorError;
use xrscene_core::xr::session::{ExtensionSupport, SessionContext};
use xrscene_core::xr::types::{
    Extent2Df, Fov, Pose, Space, SwapchainUsageFlags, Timeout, View, ViewConfigurationType,
    ViewConfigurationView, WaitOutcome,
};

/// Color formats offered to the application, most preferred first.
pub const COLOR_FORMATS: [TextureFormat; 3] = [
    TextureFormat::Rgba8UnormSrgb,
    TextureFormat::Bgra8UnormSrgb,
    TextureFormat::Rgba8Unorm,
];

/// Depth formats offered to the application, most preferred first.
pub const DEPTH_FORMATS: [TextureFormat; 3] = [
    TextureFormat::Depth32Float,
    TextureFormat::Depth24PlusStencil8,
    TextureFormat::Depth16Unorm,
];

/// The simulated headset.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessConfig {
    /// Recommended per-eye image width.
    pub eye_width: u32,
    /// Recommended per-eye image height.
    pub eye_height: u32,
    /// Recommended observer image width.
    pub observer_width: u32,
    /// Recommended observer image height.
    pub observer_height: u32,
    /// Images per swapchain.
    pub image_count: usize,
    /// Distance between the eyes in meters.
    pub ipd: f32,
    /// Horizontal and vertical field of view of each eye, in radians.
    pub eye_fov: (f32, f32),
    /// Whether the observer view configuration is enabled.
    pub observer_enabled: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            eye_width: 1024,
            eye_height: 1024,
            observer_width: 1280,
            observer_height: 720,
            image_count: 3,
            ipd: 0.064,
            eye_fov: (1.6, 1.6),
            observer_enabled: false,
        }
    }
}

#[derive(Debug)]
struct AcquiredImage {
    index: u32,
    waited: bool,
}

#[derive(Debug)]
struct HeadlessSwapchain {
    images: Vec<UniqueHandle<Texture>>,
    next_image: u32,
    acquired: VecDeque<AcquiredImage>,
}

#[derive(Debug, Default)]
struct CompositorState {
    swapchains: HashMap<u32, HeadlessSwapchain>,
    next_id: u32,
}

/// A [`Compositor`] that renders nowhere.
#[derive(Debug)]
pub struct HeadlessCompositor {
    device: Arc<dyn GpuDevice>,
    config: HeadlessConfig,
    state: Mutex<CompositorState>,
    stalled: AtomicBool,
    frames_submitted: AtomicU64,
}

/// Maps swapchain usages onto texture usages.
pub fn texture_usage(usage: SwapchainUsageFlags) -> TextureUsage {
    let mut texture = TextureUsage::EMPTY;
    if usage.intersects(
        SwapchainUsageFlags::COLOR_ATTACHMENT | SwapchainUsageFlags::DEPTH_STENCIL_ATTACHMENT,
    ) {
        texture |= TextureUsage::RENDER_TARGET;
    }
    if usage.contains(SwapchainUsageFlags::SAMPLED) {
        texture |= TextureUsage::SAMPLED;
    }
    if usage.contains(SwapchainUsageFlags::TRANSFER_SRC) {
        texture |= TextureUsage::COPY_SRC;
    }
    if usage.contains(SwapchainUsageFlags::TRANSFER_DST) {
        texture |= TextureUsage::COPY_DST;
    }
    texture
}

impl HeadlessCompositor {
    /// A compositor creating its images on `device`.
    pub fn new(device: Arc<dyn GpuDevice>, mut config: HeadlessConfig) -> Self {
        config.image_count = config.image_count.max(1);
        Self {
            device,
            config,
            state: Mutex::new(CompositorState::default()),
            stalled: AtomicBool::new(false),
            frames_submitted: AtomicU64::new(0),
        }
    }

    /// The simulated headset.
    pub fn config(&self) -> &HeadlessConfig {
        &self.config
    }

    /// Makes every subsequent bounded wait time out, as a stalled runtime would.
    pub fn set_stalled(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::Relaxed);
    }

    /// Frames accepted by [`HeadlessCompositor::end_frame`].
    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted.load(Ordering::Relaxed)
    }

    /// Number of live swapchains.
    pub fn swapchain_count(&self) -> usize {
        self.state.lock().map(|s| s.swapchains.len()).unwrap_or(0)
    }

    /// Images of `swapchain` currently acquired.
    pub fn acquired_count(&self, swapchain: RawHandle<XrSwapchain>) -> usize {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.swapchains.get(&swapchain.index()).map(|c| c.acquired.len()))
            .unwrap_or(0)
    }

    /// The space layers are submitted in.
    pub fn reference_space(&self) -> Space {
        Space(1)
    }

    /// What the simulated session supports.
    ///
    /// Formats the device cannot create are left out.
    pub fn session_context(&self, primary: ViewConfigurationType) -> SessionContext {
        let supported = |formats: &[TextureFormat]| {
            formats
                .iter()
                .copied()
                .filter(|f| self.device.supports_format(*f))
                .collect::<Vec<_>>()
        };
        SessionContext {
            primary_view_configuration: primary,
            enabled_secondary_view_configurations: if self.config.observer_enabled {
                vec![ViewConfigurationType::SecondaryMonoFirstPersonObserver]
            } else {
                Vec::new()
            },
            supported_color_formats: supported(&COLOR_FORMATS),
            supported_depth_formats: supported(&DEPTH_FORMATS),
            extensions: ExtensionSupport {
                secondary_view_configuration: true,
                depth_info: true,
            },
        }
    }

    /// Recommended image sizes of every view of `ty`.
    pub fn view_configuration_views(&self, ty: ViewConfigurationType) -> Vec<ViewConfigurationView> {
        let view = if ty.is_secondary() {
            ViewConfigurationView::recommended(self.config.observer_width, self.config.observer_height)
        } else {
            ViewConfigurationView::recommended(self.config.eye_width, self.config.eye_height)
        };
        vec![view; ty.view_count()]
    }

    /// Poses and fields of view of the views of `ty` at `time`.
    ///
    /// The head stands at 1.6 m and sways slowly around the vertical axis. The
    /// observer stands behind it.
    pub fn locate_views(&self, ty: ViewConfigurationType, time: &FrameTime) -> Vec<View> {
        let (horizontal, vertical) = self.config.eye_fov;
        if ty.is_secondary() {
            let aspect = self.config.observer_width as f32 / self.config.observer_height.max(1) as f32;
            return vec![View {
                pose: Pose::new(Quat::from_rotation_x(-0.15), Vec3::new(0.0, 1.8, 1.5)),
                fov: Fov::symmetric(aspect, 1.0),
            }];
        }

        let yaw = (time.total_secs() * 0.5).sin() * 0.3;
        let head = Pose::new(Quat::from_rotation_y(yaw), Vec3::new(0.0, 1.6, 0.0));
        let fov = Fov::symmetric(horizontal, vertical);
        let count = ty.view_count();
        (0..count)
            .map(|i| {
                // Left eyes first; quad views repeat the pair for the inset views.
                let side = match (count, i % 2) {
                    (1, _) => 0.0,
                    (_, 0) => -0.5,
                    _ => 0.5,
                };
                let offset = head.orientation * Vec3::new(side * self.config.ipd, 0.0, 0.0);
                let fov = if i >= 2 {
                    fov.scaled(Extent2Df::new(0.5, 0.5))
                } else {
                    fov
                };
                View {
                    pose: Pose::new(head.orientation, head.position + offset),
                    fov,
                }
            })
            .collect()
    }

    /// Accepts the layers of a frame.
    ///
    /// Returns the number of projection layers submitted.
    /// ## Errors
    /// * `CompositorError::InvalidSwapchain` - If a layer names an unknown swapchain.
    /// * `CompositorError::ReleaseFailed` - If a referenced swapchain still has acquired images.
    pub fn end_frame(&self, layers: &CompositionLayers) -> Result<usize, CompositorError> {
        let state = self.lock_state(CompositorError::InvalidSwapchain)?;
        for layer in layers.projection_layers() {
            for view in &layer.views {
                let swapchains = std::iter::once(view.sub_image.swapchain)
                    .chain(view.depth_info.map(|d| d.sub_image.swapchain));
                for handle in swapchains {
                    let swapchain = state
                        .swapchains
                        .get(&handle.index())
                        .ok_or(CompositorError::InvalidSwapchain)?;
                    if !swapchain.acquired.is_empty() {
                        return Err(CompositorError::ReleaseFailed(format!(
                            "swapchain {} submitted with {} unreleased images",
                            handle.index(),
                            swapchain.acquired.len()
                        )));
                    }
                }
            }
        }
        self.frames_submitted.fetch_add(1, Ordering::Relaxed);
        log::trace!("Frame submitted with {} projection layers", layers.len());
        Ok(layers.len())
    }

    fn lock_state(
        &self,
        on_poison: CompositorError,
    ) -> Result<MutexGuard<'_, CompositorState>, CompositorError> {
        self.state.lock().map_err(|_| {
            log::error!("Headless compositor state poisoned");
            on_poison
        })
    }

    fn validate(&self, info: &SwapchainCreateInfo) -> Result<(), CompositorError> {
        let depth = info
            .usage_flags
            .contains(SwapchainUsageFlags::DEPTH_STENCIL_ATTACHMENT);
        let offered: &[TextureFormat] = if depth { &DEPTH_FORMATS } else { &COLOR_FORMATS };
        let reason = if !offered.contains(&info.format) {
            Some(format!("format {:?} is not offered", info.format))
        } else if info.width == 0 || info.height == 0 || info.array_length == 0 {
            Some(format!(
                "empty swapchain {}x{}x{}",
                info.width, info.height, info.array_length
            ))
        } else if info.sample_count > 1 && info.array_length > 1 {
            Some("multisampled array swapchains are not supported".to_string())
        } else {
            None
        };
        match reason {
            Some(reason) => Err(CompositorError::SwapchainCreationFailed(reason)),
            None => Ok(()),
        }
    }
}

impl Compositor for HeadlessCompositor {
    fn create_swapchain(
        &self,
        info: &SwapchainCreateInfo,
    ) -> Result<CreatedSwapchain, CompositorError> {
        self.validate(info)?;

        let mut state = self.lock_state(CompositorError::SwapchainCreationFailed(
            "state poisoned".to_string(),
        ))?;
        let id = state.next_id;
        let usage = texture_usage(info.usage_flags);
        let images = (0..self.config.image_count)
            .map(|i| {
                UniqueHandle::<Texture>::create(self.device.clone(), |device| {
                    device.create_texture(&TextureDescriptor {
                        label: Some(Cow::Owned(format!("swapchain {id} image {i}"))),
                        width: info.width,
                        height: info.height,
                        array_layers: info.array_length,
                        mip_level_count: 1,
                        sample_count: info.sample_count,
                        format: info.format,
                        usage,
                    })
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CompositorError::SwapchainCreationFailed(e.to_string()))?;

        state.next_id += 1;
        let raw_images = images.iter().map(UniqueHandle::get).collect();
        state.swapchains.insert(
            id,
            HeadlessSwapchain {
                images,
                next_image: 0,
                acquired: VecDeque::new(),
            },
        );
        Ok(CreatedSwapchain {
            handle: RawHandle::from_index(id),
            images: raw_images,
        })
    }

    fn destroy_swapchain(&self, swapchain: RawHandle<XrSwapchain>) -> Result<(), CompositorError> {
        let removed = self
            .lock_state(CompositorError::InvalidSwapchain)?
            .swapchains
            .remove(&swapchain.index())
            .ok_or(CompositorError::InvalidSwapchain)?;
        if !removed.acquired.is_empty() {
            log::warn!(
                "Swapchain {} destroyed with {} acquired images",
                swapchain.index(),
                removed.acquired.len()
            );
        }
        // The image handles destroy their textures here.
        drop(removed);
        Ok(())
    }

    fn acquire_image(&self, swapchain: RawHandle<XrSwapchain>) -> Result<u32, CompositorError> {
        let mut state =
            self.lock_state(CompositorError::AcquireFailed("state poisoned".to_string()))?;
        let chain = state
            .swapchains
            .get_mut(&swapchain.index())
            .ok_or(CompositorError::InvalidSwapchain)?;
        if chain.acquired.len() == chain.images.len() {
            return Err(CompositorError::AcquireFailed(
                "every image is already acquired".to_string(),
            ));
        }
        let index = chain.next_image;
        chain.next_image = (index + 1) % chain.images.len() as u32;
        chain.acquired.push_back(AcquiredImage {
            index,
            waited: false,
        });
        Ok(index)
    }

    fn wait_image(
        &self,
        swapchain: RawHandle<XrSwapchain>,
        timeout: Timeout,
    ) -> Result<WaitOutcome, CompositorError> {
        let mut state =
            self.lock_state(CompositorError::WaitFailed("state poisoned".to_string()))?;
        let chain = state
            .swapchains
            .get_mut(&swapchain.index())
            .ok_or(CompositorError::InvalidSwapchain)?;
        let image = chain
            .acquired
            .iter_mut()
            .find(|image| !image.waited)
            .ok_or_else(|| CompositorError::WaitFailed("no acquired image to wait on".to_string()))?;

        if self.stalled.load(Ordering::Relaxed) {
            return match timeout {
                Timeout::After(_) => Ok(WaitOutcome::TimedOut),
                Timeout::Infinite => Err(CompositorError::WaitFailed(
                    "stalled compositor cannot satisfy an infinite wait".to_string(),
                )),
            };
        }
        image.waited = true;
        Ok(WaitOutcome::Ready)
    }

    fn release_image(&self, swapchain: RawHandle<XrSwapchain>) -> Result<(), CompositorError> {
        let mut state =
            self.lock_state(CompositorError::ReleaseFailed("state poisoned".to_string()))?;
        let chain = state
            .swapchains
            .get_mut(&swapchain.index())
            .ok_or(CompositorError::InvalidSwapchain)?;
        let image = chain
            .acquired
            .pop_front()
            .ok_or_else(|| CompositorError::ReleaseFailed("no acquired image".to_string()))?;
        if !image.waited {
            log::debug!(
                "Swapchain {} image {} released without a successful wait",
                swapchain.index(),
                image.index
            );
        }
        Ok(())
    }
}
