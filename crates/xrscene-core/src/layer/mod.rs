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

//! Projection layers: configuration, layout, per view configuration state and
//! the controller that renders them.

pub mod composition;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod view_config;

pub use self::composition::{
    CompositionLayerDepthInfo, CompositionLayerProjection, CompositionLayerProjectionView,
    CompositionLayers, SwapchainSubImage,
};
pub use self::config::ProjectionLayerConfig;
pub use self::controller::{FrameRenderContext, ProjectionLayerController};
pub use self::error::{LayerError, SwapchainKind};
pub use self::geometry::{compute_layer_geometry, LayerGeometry};
pub use self::view_config::ViewConfigComponent;
