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

//! Declarative configuration of a projection layer.

use serde::{Deserialize, Serialize};

use crate::graphics::resource::TextureFormat;
use crate::xr::types::{CompositionLayerFlags, Extent2Df, NearFar, Offset2Df};

/// The desired state of one view configuration's projection layer.
///
/// The application edits the pending copy between frames; the controller
/// accepts it at the start of the next frame and recreates swapchains when a
/// field that affects them changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionLayerConfig {
    /// Format of the color swapchain.
    pub color_format: TextureFormat,
    /// Format of the depth swapchain.
    pub depth_format: TextureFormat,
    /// Pack all views side by side in one wide image instead of an array.
    pub double_wide: bool,
    /// Samples per pixel. `0` uses the runtime recommendation.
    pub sample_count: u32,
    /// Multiplier applied to the recommended image size.
    pub swapchain_size_scale: Extent2Df,
    /// Multiplier applied to each view's field of view.
    pub swapchain_fov_scale: Extent2Df,
    /// Viewport origin inside each view's image area, in pixels.
    pub viewport_offset: Offset2Df,
    /// Viewport size relative to each view's image area.
    pub viewport_size_scale: Extent2Df,
    /// Clip planes. `near > far` renders with reverse-Z.
    pub near_far: NearFar,
    /// Request protected swapchains.
    pub content_protected: bool,
    /// Flags of the submitted composition layer.
    pub layer_flags: CompositionLayerFlags,
    /// Submit depth alongside color when the runtime supports it.
    pub submit_depth_info: bool,
    /// Recreate the swapchains on the next frame even if nothing changed.
    pub force_reset: bool,
}

impl Default for ProjectionLayerConfig {
    fn default() -> Self {
        Self {
            color_format: TextureFormat::Rgba8UnormSrgb,
            depth_format: TextureFormat::Depth32Float,
            double_wide: false,
            sample_count: 0,
            swapchain_size_scale: Extent2Df::ONE,
            swapchain_fov_scale: Extent2Df::ONE,
            viewport_offset: Offset2Df::default(),
            viewport_size_scale: Extent2Df::ONE,
            near_far: NearFar::default(),
            content_protected: false,
            layer_flags: CompositionLayerFlags::EMPTY,
            submit_depth_info: true,
            force_reset: false,
        }
    }
}

impl ProjectionLayerConfig {
    /// `true` when a field that shapes the swapchains differs from `other`.
    ///
    /// Formats are not compared here; they need validating against the session.
    pub fn swapchain_shape_differs(&self, other: &Self) -> bool {
        self.force_reset
            || self.double_wide != other.double_wide
            || self.sample_count != other.sample_count
            || self.swapchain_size_scale.width != other.swapchain_size_scale.width
            || self.swapchain_size_scale.height != other.swapchain_size_scale.height
            || self.content_protected != other.content_protected
    }
}
