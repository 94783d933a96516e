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

//! What the running XR session supports, queried once after it starts.

use crate::graphics::resource::TextureFormat;

use super::types::ViewConfigurationType;

/// Optional runtime features the layer code can take advantage of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtensionSupport {
    /// Secondary view configurations (e.g. an observer camera) can be enabled.
    pub secondary_view_configuration: bool,
    /// Depth buffers can be submitted alongside projection views.
    pub depth_info: bool,
}

/// Capabilities of the session the layers are rendered for.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    /// The configuration rendered every frame.
    pub primary_view_configuration: ViewConfigurationType,
    /// Secondary configurations the application enabled.
    pub enabled_secondary_view_configurations: Vec<ViewConfigurationType>,
    /// Color formats accepted for swapchains, most preferred first.
    pub supported_color_formats: Vec<TextureFormat>,
    /// Depth formats accepted for swapchains, most preferred first.
    pub supported_depth_formats: Vec<TextureFormat>,
    /// Optional features.
    pub extensions: ExtensionSupport,
}

impl SessionContext {
    /// The primary configuration followed by the enabled secondary ones.
    pub fn view_configurations(&self) -> impl Iterator<Item = ViewConfigurationType> + '_ {
        std::iter::once(self.primary_view_configuration)
            .chain(self.enabled_secondary_view_configurations.iter().copied())
    }
}
