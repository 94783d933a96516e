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

//! The compositor side of the frame protocol.

use std::fmt::Debug;

use crate::graphics::handle::{HandleKind, RawHandle, Texture};
use crate::graphics::resource::TextureFormat;

use super::error::CompositorError;
use super::types::{
    SwapchainCreateFlags, SwapchainUsageFlags, Timeout, ViewConfigurationType, WaitOutcome,
};

/// Handle kind of a runtime swapchain, destroyed through its [`Compositor`].
#[derive(Debug)]
pub enum XrSwapchain {}

impl HandleKind for XrSwapchain {
    type Owner = dyn Compositor;
    type Error = CompositorError;
    const NAME: &'static str = "swapchain";

    fn destroy(owner: &Self::Owner, handle: RawHandle<Self>) -> Result<(), CompositorError> {
        owner.destroy_swapchain(handle)
    }
}

/// Parameters of a swapchain.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapchainCreateInfo {
    /// Image format.
    pub format: TextureFormat,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Array layers per image.
    pub array_length: u32,
    /// Samples per pixel.
    pub sample_count: u32,
    /// Creation options.
    pub create_flags: SwapchainCreateFlags,
    /// Image usages.
    pub usage_flags: SwapchainUsageFlags,
    /// The secondary view configuration the swapchain is rendered for, if any.
    pub view_configuration: Option<ViewConfigurationType>,
}

/// A swapchain freshly created by the runtime.
#[derive(Debug)]
pub struct CreatedSwapchain {
    /// The swapchain itself.
    pub handle: RawHandle<XrSwapchain>,
    /// The ring of images, in acquire index order. Owned by the runtime.
    pub images: Vec<RawHandle<Texture>>,
}

/// An XR compositor: it owns swapchains and presents composition layers.
///
/// Every acquired image must be released before the frame ends. Waiting on an
/// image is only valid between its acquire and its release.
pub trait Compositor: Send + Sync + Debug {
    /// Creates a swapchain and enumerates its images.
    /// ## Errors
    /// * `CompositorError::SwapchainCreationFailed` - If the runtime refuses the parameters.
    fn create_swapchain(
        &self,
        info: &SwapchainCreateInfo,
    ) -> Result<CreatedSwapchain, CompositorError>;

    /// Destroys a swapchain and its images.
    fn destroy_swapchain(&self, swapchain: RawHandle<XrSwapchain>) -> Result<(), CompositorError>;

    /// Acquires the next image, returning its index in the image list.
    fn acquire_image(&self, swapchain: RawHandle<XrSwapchain>) -> Result<u32, CompositorError>;

    /// Blocks until the oldest acquired image can be written, or `timeout` expires.
    fn wait_image(
        &self,
        swapchain: RawHandle<XrSwapchain>,
        timeout: Timeout,
    ) -> Result<WaitOutcome, CompositorError>;

    /// Hands the oldest acquired image back to the compositor.
    fn release_image(&self, swapchain: RawHandle<XrSwapchain>) -> Result<(), CompositorError>;
}
