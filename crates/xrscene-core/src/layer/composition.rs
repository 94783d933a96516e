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

//! Composition layer records handed to the compositor at the end of a frame.

use crate::graphics::handle::RawHandle;
use crate::xr::compositor::XrSwapchain;
use crate::xr::types::{CompositionLayerFlags, Fov, Pose, Rect2Di, Space};

/// A region of one array layer of a swapchain image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SwapchainSubImage {
    /// The swapchain.
    pub swapchain: RawHandle<XrSwapchain>,
    /// Pixel rectangle.
    pub image_rect: Rect2Di,
    /// Array layer.
    pub image_array_index: u32,
}

/// Depth submitted alongside a projection view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompositionLayerDepthInfo {
    /// Depth region.
    pub sub_image: SwapchainSubImage,
    /// Depth value mapped to the viewport's near edge.
    pub min_depth: f32,
    /// Depth value mapped to the viewport's far edge.
    pub max_depth: f32,
    /// Near plane distance the depth was rendered with.
    pub near_z: f32,
    /// Far plane distance the depth was rendered with.
    pub far_z: f32,
}

/// One view of a projection layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompositionLayerProjectionView {
    /// Pose the view was rendered from.
    pub pose: Pose,
    /// Field of view the view was rendered with.
    pub fov: Fov,
    /// Color region.
    pub sub_image: SwapchainSubImage,
    /// Matching depth, when submitted.
    pub depth_info: Option<CompositionLayerDepthInfo>,
}

/// A projection layer: one record per view, in a single space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositionLayerProjection {
    /// Blending flags.
    pub flags: CompositionLayerFlags,
    /// Space the poses are expressed in.
    pub space: Space,
    /// Views of the layer.
    pub views: Vec<CompositionLayerProjectionView>,
}

/// The layers of a frame, in back to front order.
#[derive(Debug, Clone, Default)]
pub struct CompositionLayers {
    projection_layers: Vec<CompositionLayerProjection>,
}

impl CompositionLayers {
    /// No layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty projection layer and returns it for filling.
    pub fn add_projection_layer(
        &mut self,
        flags: CompositionLayerFlags,
    ) -> &mut CompositionLayerProjection {
        self.projection_layers.push(CompositionLayerProjection {
            flags,
            ..Default::default()
        });
        let last = self.projection_layers.len() - 1;
        &mut self.projection_layers[last]
    }

    /// The layers appended so far.
    pub fn projection_layers(&self) -> &[CompositionLayerProjection] {
        &self.projection_layers
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.projection_layers.len()
    }

    /// `true` when nothing will be submitted.
    pub fn is_empty(&self) -> bool {
        self.projection_layers.is_empty()
    }

    /// Drops every layer, ready for the next frame.
    pub fn clear(&mut self) {
        self.projection_layers.clear();
    }
}
