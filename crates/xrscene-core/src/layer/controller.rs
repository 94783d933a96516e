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

//! Drives the projection layers of every enabled view configuration.
//!
//! Each frame, for each configuration:
//! 1. [`ProjectionLayerController::prepare_rendering`] accepts the pending
//!    configuration, recomputes the layout and recreates the swapchains when
//!    their shape changed.
//! 2. [`ProjectionLayerController::render`] acquires one color and one depth
//!    image, fills the projection views, hands everything to the scene
//!    renderer and releases both images.
//! 3. [`ProjectionLayerController::append_projection_layer`] adds the layer to
//!    the frame's composition layers when something was drawn.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::graphics::color::Rgba;
use crate::graphics::error::RenderError;
use crate::scene::resources::SceneResources;
use crate::scene::{RenderView, RenderViewRequest, Scene, SceneRenderer};
use crate::time::FrameTime;
use crate::xr::compositor::Compositor;
use crate::xr::math::ViewProjection;
use crate::xr::session::SessionContext;
use crate::xr::swapchain::Swapchain;
use crate::xr::types::{
    CompositionLayerFlags, Space, Timeout, View, ViewConfigurationType, ViewConfigurationView,
};

use super::composition::{
    CompositionLayerDepthInfo, CompositionLayerProjectionView, CompositionLayers,
    SwapchainSubImage,
};
use super::config::ProjectionLayerConfig;
use super::error::{LayerError, SwapchainKind};
use super::geometry::{compute_layer_geometry, LayerGeometry};
use super::view_config::ViewConfigComponent;

/// Background of opaque layers.
const OPAQUE_CLEAR_COLOR: Rgba = Rgba::new(0.184_313_73, 0.309_803_93, 0.309_803_93, 1.0);

/// What a render call draws with.
pub struct FrameRenderContext<'a> {
    /// Backend drawing the scenes.
    pub renderer: &'a mut dyn SceneRenderer,
    /// Scene-wide resources.
    pub resources: &'a mut SceneResources,
    /// Timing of the frame.
    pub frame_time: FrameTime,
    /// Space the views were located in.
    pub layer_space: Space,
}

/// The projection layers of a session, one per enabled view configuration.
#[derive(Debug)]
pub struct ProjectionLayerController {
    compositor: Arc<dyn Compositor>,
    session: SessionContext,
    default_view_configuration: ViewConfigurationType,
    components: BTreeMap<ViewConfigurationType, ViewConfigComponent>,
    wait_timeout: Timeout,
}

impl ProjectionLayerController {
    /// Seeds one layer per configuration of `session` with its preferred formats.
    ///
    /// Observer configurations blend over the scene behind them by default.
    /// ## Errors
    /// * `LayerError::NoSupportedFormat` - If the session lists no color or no depth format.
    pub fn new(
        compositor: Arc<dyn Compositor>,
        session: SessionContext,
    ) -> Result<Self, LayerError> {
        let color_format = *session
            .supported_color_formats
            .first()
            .ok_or(LayerError::NoSupportedFormat(SwapchainKind::Color))?;
        let depth_format = *session
            .supported_depth_formats
            .first()
            .ok_or(LayerError::NoSupportedFormat(SwapchainKind::Depth))?;

        let components = session
            .view_configurations()
            .map(|ty| {
                let mut config = ProjectionLayerConfig {
                    color_format,
                    depth_format,
                    ..Default::default()
                };
                if ty == ViewConfigurationType::SecondaryMonoFirstPersonObserver {
                    config.layer_flags = CompositionLayerFlags::BLEND_TEXTURE_SOURCE_ALPHA;
                }
                (ty, ViewConfigComponent::new(config))
            })
            .collect();

        Ok(Self {
            compositor,
            default_view_configuration: session.primary_view_configuration,
            session,
            components,
            wait_timeout: Timeout::Infinite,
        })
    }

    /// The primary configuration.
    pub fn default_view_configuration(&self) -> ViewConfigurationType {
        self.default_view_configuration
    }

    /// The capabilities the controller was created with.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// How long [`ProjectionLayerController::render`] waits for swapchain images.
    pub fn set_wait_timeout(&mut self, timeout: Timeout) {
        self.wait_timeout = timeout;
    }

    /// The state of `ty`'s layer.
    pub fn component(&self, ty: ViewConfigurationType) -> Option<&ViewConfigComponent> {
        self.components.get(&ty)
    }

    /// The configuration currently in effect for `ty`.
    pub fn config(&self, ty: ViewConfigurationType) -> Option<&ProjectionLayerConfig> {
        self.components.get(&ty).map(ViewConfigComponent::current_config)
    }

    /// The configuration `ty` switches to on its next preparation.
    pub fn pending_config_mut(
        &mut self,
        ty: ViewConfigurationType,
    ) -> Option<&mut ProjectionLayerConfig> {
        self.components
            .get_mut(&ty)
            .map(ViewConfigComponent::pending_config_mut)
    }

    /// The layout of `ty`'s layer.
    pub fn geometry(&self, ty: ViewConfigurationType) -> Option<&LayerGeometry> {
        self.components.get(&ty).map(ViewConfigComponent::geometry)
    }

    /// The views of `ty`'s last rendered frame.
    pub fn projection_views(&self, ty: ViewConfigurationType) -> &[CompositionLayerProjectionView] {
        self.components
            .get(&ty)
            .map_or(&[][..], ViewConfigComponent::projection_views)
    }

    /// The space `ty` was last rendered in.
    pub fn layer_space(&self, ty: ViewConfigurationType) -> Option<Space> {
        self.components.get(&ty).map(ViewConfigComponent::layer_space)
    }

    /// Accepts `ty`'s pending configuration and lays out `views`.
    ///
    /// Returns `true` when the swapchains were recreated.
    /// ## Errors
    /// * `LayerError::UnknownViewConfiguration` - If `ty` is not enabled.
    /// * `LayerError::UnsupportedFormat` - If a pending format is not supported.
    /// * `LayerError::NoViews` - If `views` is empty.
    /// * `LayerError::Compositor` - If a swapchain cannot be created.
    pub fn prepare_rendering(
        &mut self,
        ty: ViewConfigurationType,
        views: &[ViewConfigurationView],
    ) -> Result<bool, LayerError> {
        let component = self
            .components
            .get_mut(&ty)
            .ok_or(LayerError::UnknownViewConfiguration(ty))?;

        // Nothing is committed unless both the layout and the formats are accepted.
        let geometry = compute_layer_geometry(&component.pending_config, views)?;
        let should_reset = component.accept_pending_config(&self.session)?;
        component.geometry = geometry;

        if should_reset {
            let is_primary = ty == self.session.primary_view_configuration;
            component.recreate_swapchains(&self.compositor, ty, &self.session, is_primary)?;
        }
        Ok(should_reset)
    }

    /// Renders `scenes` into `ty`'s layer for the located `views`.
    ///
    /// Both images are released whatever happens after they were acquired.
    /// Returns `true` when the layer holds geometry and should be submitted.
    /// A timed out image wait skips rendering and returns `false`.
    /// ## Errors
    /// * `LayerError::NotPrepared` - If the swapchains do not exist.
    /// * `LayerError::ViewCountMismatch` - If `views` does not match the layout.
    /// * `LayerError::Compositor` - If an acquire, wait or release fails.
    /// * `LayerError::Render` - If the renderer fails.
    pub fn render(
        &mut self,
        ty: ViewConfigurationType,
        context: &mut FrameRenderContext<'_>,
        views: &[View],
        scenes: &[Box<dyn Scene>],
    ) -> Result<bool, LayerError> {
        let component = self
            .components
            .get_mut(&ty)
            .ok_or(LayerError::UnknownViewConfiguration(ty))?;
        let (Some(color), Some(depth)) = (&component.color_swapchain, &component.depth_swapchain)
        else {
            return Err(LayerError::NotPrepared(ty));
        };
        let expected = component.geometry.viewports.len();
        if views.len() != expected {
            return Err(LayerError::ViewCountMismatch {
                expected,
                actual: views.len(),
            });
        }

        let color_index = color.acquire_and_wait(self.wait_timeout).map_err(|e| {
            log::error!("Failed to acquire color image for {ty:?}: {e}");
            e
        })?;
        let depth_index = match depth.acquire_and_wait(self.wait_timeout) {
            Ok(index) => index,
            Err(e) => {
                log::error!("Failed to acquire depth image for {ty:?}: {e}");
                if let Err(release) = color.release() {
                    log::warn!("Failed to release color image for {ty:?}: {release}");
                }
                return Err(e.into());
            }
        };

        let rendered = match (color_index, depth_index) {
            (Some(color_index), Some(depth_index)) => {
                component.layer_space = context.layer_space;
                let layer = LayerTargets {
                    color,
                    depth,
                    color_index,
                    depth_index,
                };
                render_layer(
                    &component.current_config,
                    &component.geometry,
                    &mut component.projection_views,
                    &layer,
                    self.session.extensions.depth_info,
                    context,
                    views,
                    scenes,
                )
            }
            _ => {
                log::warn!("Skipping {ty:?} this frame, an image wait timed out");
                Ok(false)
            }
        };

        let released = color.release().and_then(|()| depth.release());
        context
            .resources
            .update_animation_time(context.frame_time.total_elapsed);

        if let Err(e) = &released {
            log::error!("Failed to release images for {ty:?}: {e}");
        }
        let rendered = rendered?;
        released?;
        Ok(rendered)
    }

    /// Appends `ty`'s last rendered frame to `layers`.
    pub fn append_projection_layer(&self, layers: &mut CompositionLayers, ty: ViewConfigurationType) {
        let Some(component) = self.components.get(&ty) else {
            log::warn!("No projection layer for {ty:?}");
            return;
        };
        let layer = layers.add_projection_layer(component.current_config.layer_flags);
        layer.space = component.layer_space;
        layer.views = component.projection_views.clone();
    }
}

struct LayerTargets<'a> {
    color: &'a Swapchain,
    depth: &'a Swapchain,
    color_index: u32,
    depth_index: u32,
}

#[allow(clippy::too_many_arguments)]
fn render_layer(
    config: &ProjectionLayerConfig,
    geometry: &LayerGeometry,
    projection_views: &mut Vec<CompositionLayerProjectionView>,
    targets: &LayerTargets<'_>,
    depth_info_supported: bool,
    context: &mut FrameRenderContext<'_>,
    views: &[View],
    scenes: &[Box<dyn Scene>],
) -> Result<bool, LayerError> {
    let reversed_z = config.near_far.is_reversed();
    context.resources.set_depth_func_reversed(reversed_z);
    let submit_depth = config.submit_depth_info && depth_info_supported;

    projection_views.clear();
    let mut render_views = Vec::with_capacity(views.len());
    for (index, view) in views.iter().enumerate() {
        let fov = view.fov.scaled(config.swapchain_fov_scale);
        let image_rect = geometry.image_rects[index];
        let image_array_index = geometry.image_array_indices[index];

        let depth_info = submit_depth.then(|| CompositionLayerDepthInfo {
            sub_image: SwapchainSubImage {
                swapchain: targets.depth.handle(),
                image_rect,
                image_array_index,
            },
            min_depth: 0.0,
            max_depth: 1.0,
            near_z: config.near_far.near,
            far_z: config.near_far.far,
        });
        projection_views.push(CompositionLayerProjectionView {
            pose: view.pose,
            fov,
            sub_image: SwapchainSubImage {
                swapchain: targets.color.handle(),
                image_rect,
                image_array_index,
            },
            depth_info,
        });

        let camera = ViewProjection {
            pose: view.pose,
            fov,
            near_far: config.near_far,
        };
        render_views.push(RenderView {
            view_projection: camera.view_projection_matrix(),
            viewport: geometry.viewports[index],
            array_index: image_array_index,
        });
    }

    if let Some(first) = projection_views.first() {
        let camera = ViewProjection {
            pose: first.pose,
            fov: first.fov,
            near_far: config.near_far,
        };
        context
            .resources
            .set_view_projection(camera.view_matrix(), camera.projection_matrix());
    }

    let clear_color = if config
        .layer_flags
        .contains(CompositionLayerFlags::BLEND_TEXTURE_SOURCE_ALPHA)
    {
        Rgba::TRANSPARENT
    } else {
        OPAQUE_CLEAR_COLOR
    };

    let request = RenderViewRequest {
        views: render_views,
        color_image: targets
            .color
            .image(targets.color_index)
            .ok_or(RenderError::MissingTarget("color image"))?,
        color_format: targets.color.format,
        depth_image: targets
            .depth
            .image(targets.depth_index)
            .ok_or(RenderError::MissingTarget("depth image"))?,
        depth_format: targets.depth.format,
        width: targets.color.width,
        height: targets.color.height,
        sample_count: targets.color.sample_count,
        clear_color,
        clear_depth: if reversed_z { 0.0 } else { 1.0 },
        reversed_z,
        double_wide: config.double_wide,
    };

    let rendered = context.renderer.render_views(
        &request,
        scenes,
        context.resources,
        &context.frame_time,
    )?;
    Ok(rendered)
}
