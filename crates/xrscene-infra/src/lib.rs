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


//! # XRScene Infra
//!
//! Concrete implementations of the `xrscene-core` contracts:
//! - [`graphics::wgpu`]: a [`GpuDevice`](xrscene_core::graphics::GpuDevice) on wgpu,
//!   the device factory behind the fallback ladder and the scene renderer.
//! - [`xr::headless`]: an offscreen compositor simulating an XR runtime.

#![warn(missing_docs)]

pub mod graphics;
pub mod xr;

pub use self::graphics::wgpu::{
    create_wgpu_device, WgpuContext, WgpuDevice, WgpuDeviceFactory, WgpuSceneRenderer,
};
pub use self::xr::headless::{HeadlessCompositor, HeadlessConfig};
