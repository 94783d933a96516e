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

//! Per view configuration state of a projection layer.

use std::sync::Arc;

use crate::xr::compositor::{Compositor, SwapchainCreateInfo};
use crate::xr::session::SessionContext;
use crate::xr::swapchain::Swapchain;
use crate::xr::types::{Space, SwapchainCreateFlags, SwapchainUsageFlags, ViewConfigurationType};

use super::composition::CompositionLayerProjectionView;
use super::config::ProjectionLayerConfig;
use super::error::{LayerError, SwapchainKind};
use super::geometry::LayerGeometry;

/// Pending and accepted configuration, swapchains and derived layout of one
/// view configuration.
#[derive(Debug, Default)]
pub struct ViewConfigComponent {
    pub(crate) pending_config: ProjectionLayerConfig,
    pub(crate) current_config: ProjectionLayerConfig,
    pub(crate) color_swapchain: Option<Swapchain>,
    pub(crate) depth_swapchain: Option<Swapchain>,
    pub(crate) geometry: LayerGeometry,
    pub(crate) projection_views: Vec<CompositionLayerProjectionView>,
    pub(crate) layer_space: Space,
}

impl ViewConfigComponent {
    /// A component with no swapchain that will accept `pending` on first preparation.
    pub fn new(pending: ProjectionLayerConfig) -> Self {
        Self {
            pending_config: pending,
            ..Default::default()
        }
    }

    /// The configuration applied on the next frame.
    pub fn pending_config(&self) -> &ProjectionLayerConfig {
        &self.pending_config
    }

    /// Mutable access to the configuration applied on the next frame.
    pub fn pending_config_mut(&mut self) -> &mut ProjectionLayerConfig {
        &mut self.pending_config
    }

    /// The configuration in effect.
    pub fn current_config(&self) -> &ProjectionLayerConfig {
        &self.current_config
    }

    /// The layout derived from the current configuration.
    pub fn geometry(&self) -> &LayerGeometry {
        &self.geometry
    }

    /// The color swapchain, once created.
    pub fn color_swapchain(&self) -> Option<&Swapchain> {
        self.color_swapchain.as_ref()
    }

    /// The depth swapchain, once created.
    pub fn depth_swapchain(&self) -> Option<&Swapchain> {
        self.depth_swapchain.as_ref()
    }

    /// The view records of the last rendered frame.
    pub fn projection_views(&self) -> &[CompositionLayerProjectionView] {
        &self.projection_views
    }

    /// The space the last frame was rendered in.
    pub fn layer_space(&self) -> Space {
        self.layer_space
    }

    /// `true` when both swapchains exist.
    pub fn has_swapchains(&self) -> bool {
        let live = |s: &Option<Swapchain>| s.as_ref().is_some_and(Swapchain::is_valid);
        live(&self.color_swapchain) && live(&self.depth_swapchain)
    }

    /// Accepts the pending configuration and reports whether the swapchains must be recreated.
    ///
    /// On error nothing changes: the current configuration and the pending
    /// force-reset flag are kept.
    /// ## Errors
    /// * `LayerError::UnsupportedFormat` - If a changed format is not supported by the session.
    pub fn accept_pending_config(&mut self, session: &SessionContext) -> Result<bool, LayerError> {
        let pending = &self.pending_config;
        let current = &self.current_config;
        let mut should_reset = pending.swapchain_shape_differs(current);

        if pending.color_format != current.color_format {
            if !session.supported_color_formats.contains(&pending.color_format) {
                log::error!("Unsupported color swapchain format: {:?}", pending.color_format);
                return Err(LayerError::UnsupportedFormat {
                    kind: SwapchainKind::Color,
                    format: pending.color_format,
                });
            }
            should_reset = true;
        }

        if pending.depth_format != current.depth_format {
            if !session.supported_depth_formats.contains(&pending.depth_format) {
                log::error!("Unsupported depth swapchain format: {:?}", pending.depth_format);
                return Err(LayerError::UnsupportedFormat {
                    kind: SwapchainKind::Depth,
                    format: pending.depth_format,
                });
            }
            should_reset = true;
        }

        if !self.has_swapchains() {
            should_reset = true;
        }

        self.pending_config.force_reset = false;
        self.current_config = self.pending_config.clone();
        Ok(should_reset)
    }

    /// Replaces both swapchains with ones matching the current configuration and `geometry`.
    ///
    /// On failure both swapchains are left absent so the next frame retries.
    pub(crate) fn recreate_swapchains(
        &mut self,
        compositor: &Arc<dyn Compositor>,
        view_configuration: ViewConfigurationType,
        session: &SessionContext,
        is_primary: bool,
    ) -> Result<(), LayerError> {
        self.color_swapchain = None;
        self.depth_swapchain = None;

        let config = &self.current_config;
        let geometry = &self.geometry;
        let create_flags = if config.content_protected {
            SwapchainCreateFlags::PROTECTED_CONTENT
        } else {
            SwapchainCreateFlags::EMPTY
        };
        let hint = (session.extensions.secondary_view_configuration && !is_primary)
            .then_some(view_configuration);

        let mut info = SwapchainCreateInfo {
            format: config.color_format,
            width: geometry.swapchain_width(),
            height: geometry.swapchain_height(),
            array_length: geometry.array_length,
            sample_count: geometry.sample_count,
            create_flags,
            usage_flags: SwapchainUsageFlags::SAMPLED | SwapchainUsageFlags::COLOR_ATTACHMENT,
            view_configuration: hint,
        };
        let color = Swapchain::create(compositor, &info)?;

        info.format = config.depth_format;
        info.usage_flags = SwapchainUsageFlags::DEPTH_STENCIL_ATTACHMENT;
        let depth = Swapchain::create(compositor, &info)?;

        self.color_swapchain = Some(color);
        self.depth_swapchain = Some(depth);
        self.projection_views
            .resize(geometry.viewports.len(), CompositionLayerProjectionView::default());
        self.projection_views.truncate(geometry.viewports.len());
        Ok(())
    }
}
