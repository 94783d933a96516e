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

//! Scenes, the resources they draw with and the renderer contract.

pub mod material;
pub mod resources;

use glam::Mat4;

use crate::graphics::color::Rgba;
use crate::graphics::error::RenderError;
use crate::graphics::handle::{RawHandle, Texture};
use crate::graphics::render_state::RenderState;
use crate::graphics::resource::TextureFormat;
use crate::time::FrameTime;
use crate::xr::types::Viewport;

pub use self::material::Material;
pub use self::resources::{FillMode, SceneResources, SceneUniforms, ShadingMode};

/// A single draw call produced by a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    /// Model-to-world transform.
    pub transform: Mat4,
    /// Flat color of the object.
    pub color: Rgba,
    /// Combined render state of the object's material.
    pub state: RenderState,
}

/// The draw calls of one frame, in submission order.
pub type DrawList = Vec<DrawItem>;

/// Something that contributes geometry to a frame.
pub trait Scene: Send {
    /// Name shown in logs.
    fn name(&self) -> &str;

    /// Inactive scenes are skipped.
    fn is_active(&self) -> bool {
        true
    }

    /// Number of objects the scene currently holds.
    fn object_count(&self) -> usize;

    /// Advances the scene's simulation.
    fn update(&mut self, _frame_time: &FrameTime) {}

    /// Appends the scene's draw calls to `draws`.
    fn render(&self, resources: &SceneResources, frame_time: &FrameTime, draws: &mut DrawList);
}

/// Collects the draws of every active scene.
///
/// Returns `true` when at least one active scene produced geometry.
pub fn render_active_scenes(
    scenes: &[Box<dyn Scene>],
    resources: &SceneResources,
    frame_time: &FrameTime,
    draws: &mut DrawList,
) -> bool {
    let before = draws.len();
    for scene in scenes.iter().filter(|s| s.is_active()) {
        scene.render(resources, frame_time, draws);
    }
    draws.len() > before
}

/// One view of a layer as the renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// World-to-clip transform.
    pub view_projection: Mat4,
    /// Pixel region of the view.
    pub viewport: Viewport,
    /// Array layer of the view.
    pub array_index: u32,
}

/// Everything the renderer needs to draw one view configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderViewRequest {
    /// The views, in view order.
    pub views: Vec<RenderView>,
    /// The acquired color image.
    pub color_image: RawHandle<Texture>,
    /// Format of the color image.
    pub color_format: TextureFormat,
    /// The acquired depth image.
    pub depth_image: RawHandle<Texture>,
    /// Format of the depth image.
    pub depth_format: TextureFormat,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Samples per pixel.
    pub sample_count: u32,
    /// Color every view is cleared to.
    pub clear_color: Rgba,
    /// Depth every view is cleared to.
    pub clear_depth: f32,
    /// Near depth is 1.
    pub reversed_z: bool,
    /// All views share one layer.
    pub double_wide: bool,
}

/// Draws scenes into acquired swapchain images.
pub trait SceneRenderer {
    /// Clears every view and draws `scenes` into it.
    ///
    /// Returns `true` when any scene produced geometry.
    /// ## Errors
    /// * `RenderError` - If a target is missing or the submission fails.
    fn render_views(
        &mut self,
        request: &RenderViewRequest,
        scenes: &[Box<dyn Scene>],
        resources: &SceneResources,
        frame_time: &FrameTime,
    ) -> Result<bool, RenderError>;
}
