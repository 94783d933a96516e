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

//! The XR runtime side: compositor contract, swapchains, session capabilities
//! and view math.

pub mod compositor;
pub mod error;
pub mod math;
pub mod session;
pub mod swapchain;
pub mod types;

pub use self::compositor::{Compositor, CreatedSwapchain, SwapchainCreateInfo, XrSwapchain};
pub use self::error::CompositorError;
pub use self::math::{compose_projection, invert_pose, ViewProjection};
pub use self::session::{ExtensionSupport, SessionContext};
pub use self::swapchain::Swapchain;
pub use self::types::*;
