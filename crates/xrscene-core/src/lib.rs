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

//! # XRScene Core
//!
//! Backend-agnostic contracts and frame logic for rendering XR projection layers.
//!
//! The crate is split along the lines of responsibility:
//! - [`graphics`]: GPU handle ownership, the device contract, render-state tables
//!   and the solid-color texture pool.
//! - [`xr`]: the compositor contract, swapchains and view/projection math.
//! - [`layer`]: per-view-configuration state and the projection layer controller.
//! - [`scene`]: scene resources, materials and the scene renderer contract.

#![warn(missing_docs)]

pub mod graphics;
pub mod layer;
pub mod scene;
pub mod time;
pub mod utils;
pub mod xr;

#[cfg(test)]
pub(crate) mod testing;

pub use self::graphics::handle::{RawHandle, SharedHandle, UniqueHandle};
pub use self::layer::controller::{FrameRenderContext, ProjectionLayerController};
pub use self::layer::error::LayerError;
pub use self::time::FrameTime;
