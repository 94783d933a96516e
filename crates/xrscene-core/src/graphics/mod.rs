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

//! GPU-side contracts: handle ownership, the device trait and the shared
//! resources every draw relies on.

pub mod color;
pub mod device;
pub mod error;
pub mod factory;
pub mod handle;
pub mod render_state;
pub mod resource;
pub mod solid_color;

pub use self::color::Rgba;
pub use self::device::GpuDevice;
pub use self::error::{DeviceCreationError, RenderError, ResourceError};
pub use self::factory::{
    create_device_with_fallback, CreatedDevice, DeviceAttempt, DeviceAttemptError,
    DeviceFactory, DeviceRequest, DriverType, FeatureLevel,
};
pub use self::handle::{
    Buffer, HandleKind, Program, RawHandle, Shader, SharedHandle, Texture, Uniform, UniqueHandle,
};
pub use self::render_state::{RenderState, ResourceStateCache, StateKey};
pub use self::resource::*;
pub use self::solid_color::SolidColorTextureCache;
