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

//! A pool of 1x1 textures filled with a single color.
//!
//! Flat materials sample from tiny constant textures instead of switching
//! shaders. Textures are keyed by their packed 8-bit color, created on first
//! request and kept for the lifetime of the pool.
//!
//! The lock is not held while the texture is created. Two threads missing the
//! same color at once may both create a texture. The first one committed is the
//! canonical entry: it stays in the pool and is returned to both callers, so a
//! handle already given out is never replaced. The duplicate is destroyed when
//! its last handle drops.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::color::Rgba;
use super::device::GpuDevice;
use super::error::ResourceError;
use super::handle::{SharedHandle, Texture};
use super::resource::{TextureDescriptor, TextureFormat, TextureUsage};

/// Memoized 1x1 flat color textures.
#[derive(Debug, Default)]
pub struct SolidColorTextureCache {
    textures: Mutex<HashMap<u32, SharedHandle<Texture>>>,
}

impl SolidColorTextureCache {
    /// An empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the texture for `color`, creating it on the first request.
    ///
    /// Every call for the same packed color returns a handle to the same object.
    /// ## Errors
    /// * `ResourceError` - If the texture cannot be created or filled.
    pub fn get_or_create(
        &self,
        device: &Arc<dyn GpuDevice>,
        color: Rgba,
    ) -> Result<SharedHandle<Texture>, ResourceError> {
        let texels = color.to_rgba8();
        let key = u32::from_le_bytes(texels);

        if let Some(texture) = self.lock().get(&key) {
            return Ok(texture.clone());
        }

        log::debug!("Creating solid color texture {key:#010x}");
        let texture = SharedHandle::<Texture>::create(device.clone(), |device| {
            device.create_texture(&TextureDescriptor {
                label: Some(Cow::Owned(format!("solid_color_{key:08x}"))),
                format: TextureFormat::Rgba8Unorm,
                usage: TextureUsage::SAMPLED | TextureUsage::COPY_DST,
                ..TextureDescriptor::default()
            })
        })?;
        device.write_texture(texture.get(), 0, &texels)?;

        Ok(self.lock().entry(key).or_insert(texture).clone())
    }

    /// Number of distinct colors in the pool.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` before the first texture is created.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u32, SharedHandle<Texture>>> {
        // Entries are only ever inserted whole, a poisoned map is still consistent.
        self.textures.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
