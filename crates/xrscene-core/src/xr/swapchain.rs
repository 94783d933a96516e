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

//! An owned runtime swapchain and its image ring.

use std::sync::Arc;

use crate::graphics::handle::{RawHandle, Texture, UniqueHandle};
use crate::graphics::resource::TextureFormat;

use super::compositor::{Compositor, SwapchainCreateInfo, XrSwapchain};
use super::error::CompositorError;
use super::types::{Timeout, WaitOutcome};

/// A swapchain destroyed on drop, with the properties it was created with.
#[derive(Debug)]
pub struct Swapchain {
    handle: UniqueHandle<XrSwapchain>,
    images: Vec<RawHandle<Texture>>,
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
}

impl Swapchain {
    /// Creates a swapchain on `compositor`.
    pub fn create(
        compositor: &Arc<dyn Compositor>,
        info: &SwapchainCreateInfo,
    ) -> Result<Self, CompositorError> {
        let created = compositor.create_swapchain(info)?;
        log::info!(
            "Created {:?} swapchain {}x{} (array length {}, {} samples, {} images)",
            info.format,
            info.width,
            info.height,
            info.array_length,
            info.sample_count,
            created.images.len()
        );
        Ok(Self {
            handle: UniqueHandle::new(compositor.clone(), created.handle),
            images: created.images,
            format: info.format,
            width: info.width,
            height: info.height,
            array_length: info.array_length,
            sample_count: info.sample_count,
        })
    }

    /// The runtime handle.
    pub fn handle(&self) -> RawHandle<XrSwapchain> {
        self.handle.get()
    }

    /// `true` while the runtime swapchain exists.
    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    /// The image at `index` of the ring.
    pub fn image(&self, index: u32) -> Option<RawHandle<Texture>> {
        self.images.get(index as usize).copied()
    }

    /// Number of images in the ring.
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Acquires the next image and waits for it.
    ///
    /// Returns `None` when the wait timed out; the image stays acquired and must
    /// still be released. A failed wait releases the image before returning the error,
    /// so on `Err` nothing is left acquired.
    pub fn acquire_and_wait(&self, timeout: Timeout) -> Result<Option<u32>, CompositorError> {
        let compositor = self.handle.owner();
        let index = compositor.acquire_image(self.handle())?;
        match compositor.wait_image(self.handle(), timeout) {
            Ok(WaitOutcome::Ready) => Ok(Some(index)),
            Ok(WaitOutcome::TimedOut) => {
                log::warn!("Swapchain {:?} image {index} wait timed out", self.handle());
                Ok(None)
            }
            Err(e) => {
                if let Err(release) = self.release() {
                    log::warn!(
                        "Failed to release swapchain {:?} image {index} after a failed wait: {release}",
                        self.handle()
                    );
                }
                Err(e)
            }
        }
    }

    /// Releases the oldest acquired image.
    pub fn release(&self) -> Result<(), CompositorError> {
        self.handle.owner().release_image(self.handle())
    }
}
