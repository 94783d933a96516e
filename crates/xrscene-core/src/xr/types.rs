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

//! Plain value types exchanged with the XR runtime.

use std::time::Duration;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::xrscene_bitflags;

/// A named set of views the compositor asks to be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViewConfigurationType {
    /// A single view, e.g. a handheld display.
    PrimaryMono,
    /// Left and right eye of a head-mounted display.
    PrimaryStereo,
    /// Two eyes with an inner and outer view each.
    PrimaryQuad,
    /// A single view from a third-person observer camera.
    SecondaryMonoFirstPersonObserver,
}

impl ViewConfigurationType {
    /// Number of views in the configuration.
    pub const fn view_count(self) -> usize {
        match self {
            Self::PrimaryMono | Self::SecondaryMonoFirstPersonObserver => 1,
            Self::PrimaryStereo => 2,
            Self::PrimaryQuad => 4,
        }
    }

    /// `true` for configurations rendered alongside the primary one.
    pub const fn is_secondary(self) -> bool {
        matches!(self, Self::SecondaryMonoFirstPersonObserver)
    }
}

/// Runtime recommendations for one view of a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfigurationView {
    /// Recommended image width in pixels.
    pub recommended_image_rect_width: u32,
    /// Largest supported image width.
    pub max_image_rect_width: u32,
    /// Recommended image height in pixels.
    pub recommended_image_rect_height: u32,
    /// Largest supported image height.
    pub max_image_rect_height: u32,
    /// Recommended samples per pixel.
    pub recommended_swapchain_sample_count: u32,
    /// Largest supported sample count.
    pub max_swapchain_sample_count: u32,
}

impl ViewConfigurationView {
    /// A view recommending `width x height` single-sampled images.
    pub const fn recommended(width: u32, height: u32) -> Self {
        Self {
            recommended_image_rect_width: width,
            max_image_rect_width: width * 2,
            recommended_image_rect_height: height,
            max_image_rect_height: height * 2,
            recommended_swapchain_sample_count: 1,
            max_swapchain_sample_count: 4,
        }
    }
}

/// A 2D float extent, used for scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent2Df {
    /// Horizontal component.
    pub width: f32,
    /// Vertical component.
    pub height: f32,
}

impl Extent2Df {
    /// `(1, 1)`, the identity scale.
    pub const ONE: Self = Self::new(1.0, 1.0);

    /// Builds an extent.
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Extent2Df {
    fn default() -> Self {
        Self::ONE
    }
}

/// A 2D float offset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset2Df {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

/// An integer pixel rectangle inside a swapchain image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect2Di {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

/// A rasterizer viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Depth mapped to the near plane.
    pub min_depth: f32,
    /// Depth mapped to the far plane.
    pub max_depth: f32,
}

/// A rigid transform: rotation then translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Rotation.
    pub orientation: Quat,
    /// Translation in meters.
    pub position: Vec3,
}

impl Pose {
    /// The identity pose.
    pub const IDENTITY: Self = Self {
        orientation: Quat::IDENTITY,
        position: Vec3::ZERO,
    };

    /// Builds a pose.
    pub const fn new(orientation: Quat, position: Vec3) -> Self {
        Self {
            orientation,
            position,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Field of view as four half-angles in radians; left and down are usually negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Fov {
    /// Angle of the left edge.
    pub angle_left: f32,
    /// Angle of the right edge.
    pub angle_right: f32,
    /// Angle of the top edge.
    pub angle_up: f32,
    /// Angle of the bottom edge.
    pub angle_down: f32,
}

impl Fov {
    /// A symmetric field of view.
    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            angle_left: -horizontal * 0.5,
            angle_right: horizontal * 0.5,
            angle_up: vertical * 0.5,
            angle_down: -vertical * 0.5,
        }
    }

    /// Scales the horizontal angles by `scale.width` and the vertical ones by `scale.height`.
    pub fn scaled(self, scale: Extent2Df) -> Self {
        Self {
            angle_left: self.angle_left * scale.width,
            angle_right: self.angle_right * scale.width,
            angle_up: self.angle_up * scale.height,
            angle_down: self.angle_down * scale.height,
        }
    }
}

/// One located view: where the eye is and what it sees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct View {
    /// Eye pose in the layer space.
    pub pose: Pose,
    /// Eye field of view.
    pub fov: Fov,
}

/// Distances of the near and far clip planes.
///
/// `near > far` selects reverse-Z. Either plane, but not both, may be infinite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearFar {
    /// Near plane distance.
    pub near: f32,
    /// Far plane distance.
    pub far: f32,
}

impl NearFar {
    /// Builds a pair of planes.
    pub const fn new(near: f32, far: f32) -> Self {
        Self { near, far }
    }

    /// `true` when depth is reversed.
    pub fn is_reversed(&self) -> bool {
        self.near > self.far
    }
}

impl Default for NearFar {
    fn default() -> Self {
        Self::new(0.1, 20.0)
    }
}

/// An opaque reference space handle owned by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Space(pub u64);

xrscene_bitflags! {
    /// How the compositor blends a layer.
    pub struct CompositionLayerFlags: u64 {
        /// Correct chromatic aberration on this layer.
        const CORRECT_CHROMATIC_ABERRATION = 0x1;
        /// Blend using the layer's alpha channel.
        const BLEND_TEXTURE_SOURCE_ALPHA = 0x2;
        /// Color is not premultiplied by alpha.
        const UNPREMULTIPLIED_ALPHA = 0x4;
    }
}

xrscene_bitflags! {
    /// Swapchain creation options.
    pub struct SwapchainCreateFlags: u64 {
        /// Images hold protected content.
        const PROTECTED_CONTENT = 0x1;
        /// Images are only written once.
        const STATIC_IMAGE = 0x2;
    }
}

xrscene_bitflags! {
    /// How swapchain images are used.
    pub struct SwapchainUsageFlags: u64 {
        /// Bound as a color attachment.
        const COLOR_ATTACHMENT = 0x1;
        /// Bound as a depth-stencil attachment.
        const DEPTH_STENCIL_ATTACHMENT = 0x2;
        /// Source of a transfer.
        const TRANSFER_SRC = 0x8;
        /// Destination of a transfer.
        const TRANSFER_DST = 0x10;
        /// Sampled by shaders.
        const SAMPLED = 0x20;
    }
}

/// How long a swapchain image wait may block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Block until the image is ready.
    #[default]
    Infinite,
    /// Give up after the duration.
    After(Duration),
}

/// Result of waiting on an acquired swapchain image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The image can be rendered to.
    Ready,
    /// The timeout expired first.
    TimedOut,
}
