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

//! Errors of the projection layer controller.

use std::fmt;

use crate::graphics::error::{RenderError, ResourceError};
use crate::graphics::resource::TextureFormat;
use crate::xr::error::CompositorError;
use crate::xr::types::ViewConfigurationType;

/// Which of the two swapchains a format belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapchainKind {
    /// The color swapchain.
    Color,
    /// The depth swapchain.
    Depth,
}

impl fmt::Display for SwapchainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapchainKind::Color => write!(f, "color"),
            SwapchainKind::Depth => write!(f, "depth"),
        }
    }
}

/// A failure while preparing or rendering a projection layer.
#[derive(Debug)]
pub enum LayerError {
    /// The pending format is not supported by the session.
    UnsupportedFormat {
        /// Swapchain the format was requested for.
        kind: SwapchainKind,
        /// The rejected format.
        format: TextureFormat,
    },
    /// The view configuration was not enabled when the controller was created.
    UnknownViewConfiguration(ViewConfigurationType),
    /// The session offers no format for a swapchain.
    NoSupportedFormat(SwapchainKind),
    /// The runtime reported no usable views.
    NoViews,
    /// The located views do not match the prepared layout.
    ViewCountMismatch {
        /// Views the layer was prepared for.
        expected: usize,
        /// Views handed to the render call.
        actual: usize,
    },
    /// The layer has no swapchains yet; it must be prepared first.
    NotPrepared(ViewConfigurationType),
    /// A device object failed.
    Resource(ResourceError),
    /// A compositor call failed.
    Compositor(CompositorError),
    /// The scene renderer failed.
    Render(RenderError),
}

impl fmt::Display for LayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerError::UnsupportedFormat { kind, format } => {
                write!(f, "Unsupported {kind} swapchain format: {format:?}")
            }
            LayerError::UnknownViewConfiguration(ty) => {
                write!(f, "View configuration {ty:?} is not enabled")
            }
            LayerError::NoSupportedFormat(kind) => {
                write!(f, "The session supports no {kind} swapchain format")
            }
            LayerError::NoViews => write!(f, "The view configuration has no usable views."),
            LayerError::ViewCountMismatch { expected, actual } => {
                write!(f, "Expected {expected} views, got {actual}")
            }
            LayerError::NotPrepared(ty) => {
                write!(f, "View configuration {ty:?} has no swapchains")
            }
            LayerError::Resource(e) => write!(f, "Resource error: {e}"),
            LayerError::Compositor(e) => write!(f, "Compositor error: {e}"),
            LayerError::Render(e) => write!(f, "Render error: {e}"),
        }
    }
}

impl std::error::Error for LayerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayerError::Resource(e) => Some(e),
            LayerError::Compositor(e) => Some(e),
            LayerError::Render(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ResourceError> for LayerError {
    fn from(err: ResourceError) -> Self {
        LayerError::Resource(err)
    }
}

impl From<CompositorError> for LayerError {
    fn from(err: CompositorError) -> Self {
        LayerError::Compositor(err)
    }
}

impl From<RenderError> for LayerError {
    fn from(err: RenderError) -> Self {
        LayerError::Render(err)
    }
}
