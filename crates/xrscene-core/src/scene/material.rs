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

//! Materials built from shared textures and samplers.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::graphics::color::Rgba;
use crate::graphics::error::ResourceError;
use crate::graphics::handle::{SharedHandle, Texture, Uniform};
use crate::graphics::render_state::RenderState;

use super::resources::{FillMode, MaterialSamplers, SceneResources};
use super::DrawItem;

/// Texture slots of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// Base color.
    BaseColor,
    /// Metallic and roughness.
    MetallicRoughness,
    /// Tangent-space normal.
    Normal,
    /// Ambient occlusion.
    Occlusion,
    /// Emission.
    Emissive,
}

impl TextureSlot {
    /// Every slot, in binding order.
    pub const ALL: [TextureSlot; 5] = [
        TextureSlot::BaseColor,
        TextureSlot::MetallicRoughness,
        TextureSlot::Normal,
        TextureSlot::Occlusion,
        TextureSlot::Emissive,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Material factors, laid out for a uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialParameters {
    /// Linear base color multiplier.
    pub base_color_factor: [f32; 4],
    /// Metallic (x), roughness (y), normal scale (z) and occlusion strength (w).
    pub metallic_roughness_normal_occlusion: [f32; 4],
    /// Emissive color (xyz) and alpha cutoff (w).
    pub emissive_alpha_cutoff: [f32; 4],
}

impl Default for MaterialParameters {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0; 4],
            metallic_roughness_normal_occlusion: [1.0, 1.0, 1.0, 1.0],
            emissive_alpha_cutoff: [0.0; 4],
        }
    }
}

#[derive(Debug, Clone, Default)]
struct TextureBinding {
    texture: SharedHandle<Texture>,
    sampler: SharedHandle<Uniform>,
}

/// A surface description: factors, one texture per slot and draw flags.
///
/// Cloning shares every texture and sampler with the original.
#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    parameters: MaterialParameters,
    textures: [TextureBinding; 5],
    alpha_blended: bool,
    double_sided: bool,
    wireframe: bool,
}

impl Material {
    /// A material without textures.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: MaterialParameters::default(),
            textures: Default::default(),
            alpha_blended: false,
            double_sided: false,
            wireframe: false,
        }
    }

    /// A material of uniform color, textured with the shared flat textures.
    ///
    /// A base color with alpha below one turns on alpha blending.
    /// ## Errors
    /// * `ResourceError` - If a flat texture cannot be created.
    pub fn create_flat(
        resources: &SceneResources,
        base_color: Rgba,
        roughness: f32,
        metallic: f32,
        emissive: Vec3,
    ) -> Result<Self, ResourceError> {
        let mut material = Self::new(format!("flat_{:08x}", base_color.pack()));
        if base_color.a < 1.0 {
            material.set_alpha_blended(true);
        }

        material.parameters.base_color_factor = [base_color.r, base_color.g, base_color.b, base_color.a];
        material.parameters.metallic_roughness_normal_occlusion[0] = metallic;
        material.parameters.metallic_roughness_normal_occlusion[1] = roughness;
        material.parameters.emissive_alpha_cutoff = emissive.extend(0.0).to_array();

        let samplers = resources.samplers();
        for slot in TextureSlot::ALL {
            let color = match slot {
                TextureSlot::Normal => Rgba::FLAT_NORMAL,
                _ => Rgba::WHITE,
            };
            let texture = resources.create_solid_color_texture(color)?;
            material.set_texture(slot, texture, Self::slot_sampler(samplers, slot));
        }
        Ok(material)
    }

    fn slot_sampler(samplers: &MaterialSamplers, slot: TextureSlot) -> SharedHandle<Uniform> {
        match slot {
            TextureSlot::BaseColor => samplers.base_color.clone(),
            TextureSlot::MetallicRoughness => samplers.metallic_roughness.clone(),
            TextureSlot::Normal => samplers.normal.clone(),
            TextureSlot::Occlusion => samplers.occlusion.clone(),
            TextureSlot::Emissive => samplers.emissive.clone(),
        }
    }

    /// A copy sharing every texture and sampler.
    pub fn clone_material(&self) -> Self {
        self.clone()
    }

    /// The material's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The uniform block of the material.
    pub fn parameters(&self) -> &MaterialParameters {
        &self.parameters
    }

    /// Mutable access to the material factors.
    pub fn parameters_mut(&mut self) -> &mut MaterialParameters {
        &mut self.parameters
    }

    /// The base color factor.
    pub fn base_color(&self) -> Rgba {
        let [r, g, b, a] = self.parameters.base_color_factor;
        Rgba::new(r, g, b, a)
    }

    /// Binds `texture` to `slot`, sampled through `sampler`.
    pub fn set_texture(
        &mut self,
        slot: TextureSlot,
        texture: SharedHandle<Texture>,
        sampler: SharedHandle<Uniform>,
    ) {
        self.textures[slot.index()] = TextureBinding { texture, sampler };
    }

    /// The texture bound to `slot`.
    pub fn texture(&self, slot: TextureSlot) -> &SharedHandle<Texture> {
        &self.textures[slot.index()].texture
    }

    /// The sampler of `slot`.
    pub fn sampler(&self, slot: TextureSlot) -> &SharedHandle<Uniform> {
        &self.textures[slot.index()].sampler
    }

    /// Draw back faces as well.
    pub fn set_double_sided(&mut self, double_sided: bool) {
        self.double_sided = double_sided;
    }

    /// `true` when back faces are drawn.
    pub fn double_sided(&self) -> bool {
        self.double_sided
    }

    /// Draw edges only.
    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.wireframe = wireframe;
    }

    /// `true` when edges only are drawn.
    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    /// Blend with the destination using the source alpha. Blended materials do not write depth.
    pub fn set_alpha_blended(&mut self, alpha_blended: bool) {
        self.alpha_blended = alpha_blended;
    }

    /// `true` when the material is alpha blended.
    pub fn alpha_blended(&self) -> bool {
        self.alpha_blended
    }

    /// Resolves the render state of the material under the resources' current settings.
    pub fn bind(&self, resources: &SceneResources) -> RenderState {
        let wireframe = self.wireframe || resources.fill_mode() == FillMode::Wireframe;
        resources.set_state(
            self.alpha_blended,
            self.double_sided,
            wireframe,
            self.alpha_blended,
        )
    }

    /// A draw of this material at `transform`.
    pub fn draw_item(&self, resources: &SceneResources, transform: Mat4) -> DrawItem {
        DrawItem {
            transform,
            color: self.base_color(),
            state: self.bind(resources),
        }
    }
}
