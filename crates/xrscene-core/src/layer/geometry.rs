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

//! Swapchain size and per-view placement for a layer configuration.
//!
//! All views of a configuration share one swapchain. In array mode each view
//! renders into its own array layer at the origin; in double-wide mode the
//! views sit side by side in a single layer that is `view_count` images wide.

use crate::xr::types::{Rect2Di, ViewConfigurationView, Viewport};

use super::config::ProjectionLayerConfig;
use super::error::LayerError;

/// Derived layout of one view configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerGeometry {
    /// Width of one view's image area in pixels.
    pub image_width: u32,
    /// Height of one view's image area in pixels.
    pub image_height: u32,
    /// Samples per pixel of both swapchains.
    pub sample_count: u32,
    /// Horizontal multiplier of the swapchain width, 2 in double-wide mode.
    pub wide_scale: u32,
    /// Array layers of both swapchains.
    pub array_length: u32,
    /// Rasterizer viewport of each view.
    pub viewports: Vec<Viewport>,
    /// Sub-image rectangle of each view, shared by color and depth.
    pub image_rects: Vec<Rect2Di>,
    /// Array layer of each view.
    pub image_array_indices: Vec<u32>,
}

impl LayerGeometry {
    /// Width of the swapchain images.
    pub fn swapchain_width(&self) -> u32 {
        self.image_width * self.wide_scale
    }

    /// Height of the swapchain images.
    pub fn swapchain_height(&self) -> u32 {
        self.image_height
    }
}

/// Computes the layout of `views` under `config`.
///
/// The image area is the largest recommended size across the views, scaled by
/// the configured size scale and rounded up.
/// ## Errors
/// * `LayerError::NoViews` - If `views` is empty or recommends a zero sized image.
pub fn compute_layer_geometry(
    config: &ProjectionLayerConfig,
    views: &[ViewConfigurationView],
) -> Result<LayerGeometry, LayerError> {
    let first = views.first().ok_or(LayerError::NoViews)?;
    let recommended_width = views
        .iter()
        .map(|v| v.recommended_image_rect_width)
        .max()
        .unwrap_or(0);
    let recommended_height = views
        .iter()
        .map(|v| v.recommended_image_rect_height)
        .max()
        .unwrap_or(0);
    if recommended_width == 0 || recommended_height == 0 {
        return Err(LayerError::NoViews);
    }

    let image_width =
        (recommended_width as f32 * config.swapchain_size_scale.width).ceil() as u32;
    let image_height =
        (recommended_height as f32 * config.swapchain_size_scale.height).ceil() as u32;

    let sample_count = if config.sample_count < 1 {
        first.recommended_swapchain_sample_count
    } else {
        config.sample_count
    };

    let view_count = views.len() as u32;
    let mut geometry = LayerGeometry {
        image_width,
        image_height,
        sample_count,
        wide_scale: if config.double_wide { view_count } else { 1 },
        array_length: if config.double_wide { 1 } else { view_count },
        viewports: Vec::with_capacity(views.len()),
        image_rects: Vec::with_capacity(views.len()),
        image_array_indices: Vec::with_capacity(views.len()),
    };

    for view_index in 0..view_count {
        let column_x = image_width * view_index;
        let (viewport_x, rect_x, array_index) = if config.double_wide {
            (column_x as f32 + config.viewport_offset.x, column_x as i32, 0)
        } else {
            (config.viewport_offset.x, 0, view_index)
        };

        geometry.viewports.push(Viewport {
            x: viewport_x,
            y: config.viewport_offset.y,
            width: image_width as f32 * config.viewport_size_scale.width,
            height: image_height as f32 * config.viewport_size_scale.height,
            min_depth: 0.0,
            max_depth: 1.0,
        });
        geometry.image_rects.push(Rect2Di {
            x: rect_x,
            y: 0,
            width: image_width as i32,
            height: image_height as i32,
        });
        geometry.image_array_indices.push(array_index);
    }

    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xr::types::{Extent2Df, Offset2Df};

    fn stereo(width: u32, height: u32) -> Vec<ViewConfigurationView> {
        vec![ViewConfigurationView::recommended(width, height); 2]
    }

    #[test]
    fn test_double_wide_places_views_side_by_side() {
        let config = ProjectionLayerConfig {
            double_wide: true,
            ..Default::default()
        };
        let geometry = compute_layer_geometry(&config, &stereo(100, 100)).unwrap();
        let xs: Vec<f32> = geometry.viewports.iter().map(|v| v.x).collect();
        assert_eq!(xs, vec![0.0, 100.0]);
        assert_eq!(geometry.swapchain_width(), 200);
        assert_eq!(geometry.array_length, 1);
        assert_eq!(geometry.image_rects[1].x, 100);
        assert_eq!(geometry.image_array_indices, vec![0, 0]);
    }

    #[test]
    fn test_array_mode_uses_one_layer_per_view() {
        let geometry =
            compute_layer_geometry(&ProjectionLayerConfig::default(), &stereo(100, 80)).unwrap();
        assert_eq!(geometry.image_rects[0].x, 0);
        assert_eq!(geometry.image_rects[1].x, 0);
        assert_eq!(geometry.image_array_indices, vec![0, 1]);
        assert_eq!(geometry.array_length, 2);
        assert_eq!(geometry.swapchain_width(), 100);
        assert_eq!(geometry.swapchain_height(), 80);
    }

    #[test]
    fn test_uses_largest_recommendation_and_rounds_up() {
        let mut views = stereo(100, 100);
        views[1].recommended_image_rect_width = 120;
        views[0].recommended_image_rect_height = 90;
        let config = ProjectionLayerConfig {
            swapchain_size_scale: Extent2Df::new(0.5, 0.333),
            ..Default::default()
        };
        let geometry = compute_layer_geometry(&config, &views).unwrap();
        assert_eq!(geometry.image_width, 60);
        assert_eq!(geometry.image_height, 34);
    }

    #[test]
    fn test_sample_count_falls_back_to_first_view() {
        let mut views = stereo(64, 64);
        views[0].recommended_swapchain_sample_count = 4;
        let geometry = compute_layer_geometry(&ProjectionLayerConfig::default(), &views).unwrap();
        assert_eq!(geometry.sample_count, 4);

        let config = ProjectionLayerConfig {
            sample_count: 2,
            ..Default::default()
        };
        assert_eq!(compute_layer_geometry(&config, &views).unwrap().sample_count, 2);
    }

    #[test]
    fn test_viewport_offset_and_scale() {
        let config = ProjectionLayerConfig {
            double_wide: true,
            viewport_offset: Offset2Df { x: 8.0, y: 4.0 },
            viewport_size_scale: Extent2Df::new(0.5, 0.25),
            ..Default::default()
        };
        let geometry = compute_layer_geometry(&config, &stereo(100, 100)).unwrap();
        let second = geometry.viewports[1];
        assert_eq!((second.x, second.y), (108.0, 4.0));
        assert_eq!((second.width, second.height), (50.0, 25.0));
    }

    #[test]
    fn test_empty_view_list_is_rejected() {
        assert!(matches!(
            compute_layer_geometry(&ProjectionLayerConfig::default(), &[]),
            Err(LayerError::NoViews)
        ));
    }
}
