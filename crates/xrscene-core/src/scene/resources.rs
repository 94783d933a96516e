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

//! Scene-wide resources shared by every material.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::graphics::color::Rgba;
use crate::graphics::device::GpuDevice;
use crate::graphics::error::ResourceError;
use crate::graphics::handle::{SharedHandle, Texture, Uniform};
use crate::graphics::render_state::{RenderState, ResourceStateCache, StateKey};
use crate::graphics::resource::{UniformDescriptor, UniformKind};
use crate::graphics::solid_color::SolidColorTextureCache;

/// Which program scenes are drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    /// Regular lit shading.
    #[default]
    Regular,
    /// The highlight pulse expanding from the highlight position.
    Highlight,
}

/// How triangles are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    /// Filled triangles.
    #[default]
    Solid,
    /// Edges only, for every material.
    Wireframe,
}

/// Per-frame scene data, laid out for a uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    /// World-to-clip transform.
    pub view_projection: [[f32; 4]; 4],
    /// Camera position in world space (xyz).
    pub eye_position: [f32; 4],
    /// Origin of the highlight pulse (xyz).
    pub highlight_position: [f32; 4],
    /// Direction the light travels (xyz).
    pub light_direction: [f32; 4],
    /// Diffuse light color (rgb).
    pub light_color: [f32; 4],
    /// Specular mip levels (x) and seconds since the highlight started (y).
    pub mip_levels_animation_time: [f32; 4],
}

impl Default for SceneUniforms {
    fn default() -> Self {
        Self {
            view_projection: Mat4::IDENTITY.to_cols_array_2d(),
            eye_position: [0.0; 4],
            highlight_position: [0.0; 4],
            light_direction: [0.0, -1.0, 0.0, 0.0],
            light_color: [1.0, 1.0, 1.0, 0.0],
            mip_levels_animation_time: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Sampler uniforms of the material texture slots, shared by every material.
#[derive(Debug, Clone, Default)]
pub struct MaterialSamplers {
    /// Base color slot.
    pub base_color: SharedHandle<Uniform>,
    /// Metallic (b) and roughness (g) slot.
    pub metallic_roughness: SharedHandle<Uniform>,
    /// Tangent-space normal slot.
    pub normal: SharedHandle<Uniform>,
    /// Ambient occlusion slot.
    pub occlusion: SharedHandle<Uniform>,
    /// Emissive slot.
    pub emissive: SharedHandle<Uniform>,
}

impl MaterialSamplers {
    fn create(device: &Arc<dyn GpuDevice>) -> Result<Self, ResourceError> {
        let sampler = |name: &'static str| {
            SharedHandle::<Uniform>::create(device.clone(), |device| {
                device.create_uniform(&UniformDescriptor {
                    name: Cow::Borrowed(name),
                    kind: UniformKind::Sampler,
                    count: 1,
                })
            })
        };
        Ok(Self {
            base_color: sampler("u_baseColorTexture")?,
            metallic_roughness: sampler("u_metallicRoughnessTexture")?,
            normal: sampler("u_normalTexture")?,
            occlusion: sampler("u_occlusionTexture")?,
            emissive: sampler("u_emissiveTexture")?,
        })
    }
}

/// Global state every scene renders with: the device, render-state tables,
/// flat color textures, camera and light uniforms and the highlight animation.
#[derive(Debug)]
pub struct SceneResources {
    device: Arc<dyn GpuDevice>,
    state_cache: &'static ResourceStateCache,
    solid_colors: SolidColorTextureCache,
    samplers: MaterialSamplers,
    uniforms: SceneUniforms,
    reverse_z: bool,
    front_counter_clockwise: bool,
    fill_mode: FillMode,
    shading_mode: ShadingMode,
    highlight_start: Duration,
}

impl SceneResources {
    /// Creates the shared samplers on `device`.
    /// ## Errors
    /// * `ResourceError` - If a sampler uniform cannot be created.
    pub fn new(device: Arc<dyn GpuDevice>) -> Result<Self, ResourceError> {
        let samplers = MaterialSamplers::create(&device)?;
        Ok(Self {
            device,
            state_cache: ResourceStateCache::global(),
            solid_colors: SolidColorTextureCache::new(),
            samplers,
            uniforms: SceneUniforms::default(),
            reverse_z: false,
            front_counter_clockwise: false,
            fill_mode: FillMode::Solid,
            shading_mode: ShadingMode::Regular,
            highlight_start: Duration::ZERO,
        })
    }

    /// The device resources are created on.
    pub fn device(&self) -> &Arc<dyn GpuDevice> {
        &self.device
    }

    /// The shared material samplers.
    pub fn samplers(&self) -> &MaterialSamplers {
        &self.samplers
    }

    /// The uniform block as last updated.
    pub fn uniforms(&self) -> &SceneUniforms {
        &self.uniforms
    }

    /// Stores the camera of the view about to be drawn.
    pub fn set_view_projection(&mut self, view: Mat4, projection: Mat4) {
        self.uniforms.view_projection = (projection * view).to_cols_array_2d();
        self.uniforms.eye_position = view.inverse().w_axis.to_array();
    }

    /// Sets the directional light.
    pub fn set_light(&mut self, direction: Vec3, diffuse_color: Vec3) {
        self.uniforms.light_direction = direction.extend(0.0).to_array();
        self.uniforms.light_color = diffuse_color.extend(0.0).to_array();
    }

    /// Restarts the highlight pulse at `location`.
    pub fn start_highlight_animation(&mut self, location: Vec3, total_elapsed: Duration) {
        self.highlight_start = total_elapsed;
        self.uniforms.mip_levels_animation_time[1] = 0.0;
        self.uniforms.highlight_position = location.extend(0.0).to_array();
    }

    /// Advances the highlight pulse to `total_elapsed`.
    pub fn update_animation_time(&mut self, total_elapsed: Duration) {
        self.uniforms.mip_levels_animation_time[1] =
            total_elapsed.saturating_sub(self.highlight_start).as_secs_f32();
    }

    /// Seconds since the highlight pulse started.
    pub fn animation_time(&self) -> f32 {
        self.uniforms.mip_levels_animation_time[1]
    }

    /// Selects the depth test direction of subsequent states.
    pub fn set_depth_func_reversed(&mut self, reverse_z: bool) {
        self.reverse_z = reverse_z;
    }

    /// `true` when depth tests pass for greater values.
    pub fn depth_func_reversed(&self) -> bool {
        self.reverse_z
    }

    /// Sets which winding is front facing.
    pub fn set_front_face_counter_clockwise(&mut self, counter_clockwise: bool) {
        self.front_counter_clockwise = counter_clockwise;
    }

    /// `true` when counter-clockwise triangles face the camera.
    pub fn front_face_counter_clockwise(&self) -> bool {
        self.front_counter_clockwise
    }

    /// Sets the fill mode of every material.
    pub fn set_fill_mode(&mut self, mode: FillMode) {
        self.fill_mode = mode;
    }

    /// The current fill mode.
    pub fn fill_mode(&self) -> FillMode {
        self.fill_mode
    }

    /// Sets the program scenes are drawn with.
    pub fn set_shading_mode(&mut self, mode: ShadingMode) {
        self.shading_mode = mode;
    }

    /// The current shading mode.
    pub fn shading_mode(&self) -> ShadingMode {
        self.shading_mode
    }

    /// The combined render state of a material under the current winding and depth direction.
    pub fn set_state(
        &self,
        blended: bool,
        double_sided: bool,
        wireframe: bool,
        disable_depth_write: bool,
    ) -> RenderState {
        self.state_cache.combine(StateKey {
            blended,
            double_sided,
            wireframe,
            front_counter_clockwise: self.front_counter_clockwise,
            reverse_z: self.reverse_z,
            disable_depth_write,
        })
    }

    /// Returns the shared 1x1 texture of `color`.
    /// ## Errors
    /// * `ResourceError` - If the texture cannot be created.
    pub fn create_solid_color_texture(
        &self,
        color: Rgba,
    ) -> Result<SharedHandle<Texture>, ResourceError> {
        self.solid_colors.get_or_create(&self.device, color)
    }

    /// The pool of flat color textures.
    pub fn solid_colors(&self) -> &SolidColorTextureCache {
        &self.solid_colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_animation_time_counts_from_highlight_start() {
        let mut resources = crate::testing::resources();
        resources.start_highlight_animation(Vec3::ONE, Duration::from_secs(2));
        resources.update_animation_time(Duration::from_millis(3500));
        assert_relative_eq!(resources.animation_time(), 1.5);
        assert_eq!(resources.uniforms().highlight_position, [1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_animation_time_never_negative() {
        let mut resources = crate::testing::resources();
        resources.start_highlight_animation(Vec3::ZERO, Duration::from_secs(5));
        resources.update_animation_time(Duration::from_secs(1));
        assert_eq!(resources.animation_time(), 0.0);
    }

    #[test]
    fn test_state_follows_depth_direction() {
        let mut resources = crate::testing::resources();
        let forward = resources.set_state(false, false, false, false);
        assert!(forward.contains(RenderState::DEPTH_TEST_LESS));

        resources.set_depth_func_reversed(true);
        let reversed = resources.set_state(false, false, false, false);
        assert!(reversed.contains(RenderState::DEPTH_TEST_GREATER));
        assert!(!reversed.contains(RenderState::DEPTH_TEST_LESS));
    }

    #[test]
    fn test_eye_position_is_camera_translation() {
        let mut resources = crate::testing::resources();
        let camera = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        resources.set_view_projection(camera.inverse(), Mat4::IDENTITY);
        let eye = resources.uniforms().eye_position;
        assert_relative_eq!(eye[0], 1.0, epsilon = 1e-5);
        assert_relative_eq!(eye[1], 2.0, epsilon = 1e-5);
        assert_relative_eq!(eye[2], 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_solid_colors_are_shared() {
        let resources = crate::testing::resources();
        let a = resources.create_solid_color_texture(Rgba::WHITE).unwrap();
        let b = resources.create_solid_color_texture(Rgba::WHITE).unwrap();
        assert!(a.ptr_eq(&b));
        assert_eq!(resources.solid_colors().len(), 1);
    }
}
