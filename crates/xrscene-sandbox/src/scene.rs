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


//! A ring of spinning cubes around the viewer.

use glam::{Mat4, Quat, Vec3};
use xrscene_core::graphics::error::ResourceError;
use xrscene_core::graphics::Rgba;
use xrscene_core::scene::{DrawList, Material, Scene, SceneResources};
use xrscene_core::time::FrameTime;

const RING_RADIUS: f32 = 2.5;
const CUBE_SIZE: f32 = 0.3;
const EYE_HEIGHT: f32 = 1.6;

pub struct CubeRing {
    materials: Vec<Material>,
    count: usize,
    angle: f32,
    speed: f32,
}

impl CubeRing {
    /// `count` cubes cycling through a small palette, one of them translucent.
    pub fn new(resources: &SceneResources, count: usize) -> Result<Self, ResourceError> {
        let palette = [
            Rgba::from_srgb(0.9, 0.3, 0.2, 1.0),
            Rgba::from_srgb(0.2, 0.7, 0.3, 1.0),
            Rgba::from_srgb(0.2, 0.4, 0.9, 1.0),
            Rgba::new(1.0, 1.0, 1.0, 0.5),
        ];
        let materials = palette
            .into_iter()
            .map(|color| Material::create_flat(resources, color, 0.6, 0.0, Vec3::ZERO))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            materials,
            count,
            angle: 0.0,
            speed: 0.4,
        })
    }

    fn transform(&self, index: usize) -> Mat4 {
        let step = std::f32::consts::TAU / self.count.max(1) as f32;
        let around = self.angle + step * index as f32;
        let position = Vec3::new(
            around.sin() * RING_RADIUS,
            EYE_HEIGHT,
            -around.cos() * RING_RADIUS,
        );
        Mat4::from_scale_rotation_translation(
            Vec3::splat(CUBE_SIZE),
            Quat::from_rotation_y(around * 2.0) * Quat::from_rotation_x(around),
            position,
        )
    }
}

impl Scene for CubeRing {
    fn name(&self) -> &str {
        "cube ring"
    }

    fn object_count(&self) -> usize {
        self.count
    }

    fn update(&mut self, frame_time: &FrameTime) {
        self.angle = (self.angle + self.speed * frame_time.elapsed_secs()) % std::f32::consts::TAU;
    }

    fn render(&self, resources: &SceneResources, _: &FrameTime, draws: &mut DrawList) {
        // Opaque cubes first so blended ones see their depth.
        let (opaque, blended): (Vec<usize>, Vec<usize>) = (0..self.count)
            .partition(|&i| !self.materials[i % self.materials.len()].alpha_blended());
        for index in opaque.into_iter().chain(blended) {
            let material = &self.materials[index % self.materials.len()];
            draws.push(material.draw_item(resources, self.transform(index)));
        }
    }
}
