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

//! Precomputed render-state masks.
//!
//! Every draw needs a single [`RenderState`] combining blending, culling,
//! fill mode and depth testing. The handful of possible combinations is
//! computed once into a [`ResourceStateCache`] and only looked up afterwards.

use std::sync::OnceLock;

use crate::xrscene_bitflags;

xrscene_bitflags! {
    /// Fixed-function state of a draw call.
    pub struct RenderState: u64 {
        /// Write the red channel.
        const WRITE_R = 1 << 0;
        /// Write the green channel.
        const WRITE_G = 1 << 1;
        /// Write the blue channel.
        const WRITE_B = 1 << 2;
        /// Write the alpha channel.
        const WRITE_A = 1 << 3;
        /// Write depth.
        const WRITE_Z = 1 << 4;
        /// Pass when the fragment is nearer with a standard depth range.
        const DEPTH_TEST_LESS = 1 << 5;
        /// Pass when the fragment is nearer with a reversed depth range.
        const DEPTH_TEST_GREATER = 1 << 6;
        /// Cull clockwise triangles.
        const CULL_CW = 1 << 7;
        /// Cull counter-clockwise triangles.
        const CULL_CCW = 1 << 8;
        /// Source-alpha over blending.
        const BLEND_ALPHA = 1 << 9;
        /// Rasterize edges only.
        const WIREFRAME = 1 << 10;
        /// Multisample rasterization.
        const MSAA = 1 << 11;
        /// All color channels.
        const WRITE_RGB = (1 << 0) | (1 << 1) | (1 << 2);
    }
}

/// The inputs of a state lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateKey {
    /// Alpha blended material.
    pub blended: bool,
    /// Both faces are drawn.
    pub double_sided: bool,
    /// Draw edges only.
    pub wireframe: bool,
    /// Front faces wind counter-clockwise.
    pub front_counter_clockwise: bool,
    /// Near depth is 1, far depth is 0.
    pub reverse_z: bool,
    /// Test depth without writing it.
    pub disable_depth_write: bool,
}

/// Lookup tables of blend, rasterizer and depth masks.
///
/// Built once, never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceStateCache {
    default_blend: RenderState,
    alpha_blend: RenderState,
    /// `[double_sided][wireframe][front_counter_clockwise]`
    rasterizer: [[[RenderState; 2]; 2]; 2],
    /// `[reverse_z][no_write]`
    depth: [[RenderState; 2]; 2],
}

impl ResourceStateCache {
    /// Builds every table entry.
    pub fn new() -> Self {
        let default_blend = RenderState::WRITE_RGB | RenderState::WRITE_A | RenderState::MSAA;
        let alpha_blend = default_blend | RenderState::BLEND_ALPHA;

        let mut rasterizer = [[[RenderState::EMPTY; 2]; 2]; 2];
        for double_sided in [false, true] {
            for wireframe in [false, true] {
                for front_ccw in [false, true] {
                    let mut state = RenderState::MSAA;
                    if !double_sided {
                        // Back faces wind opposite to the front faces.
                        state |= if front_ccw {
                            RenderState::CULL_CW
                        } else {
                            RenderState::CULL_CCW
                        };
                    }
                    state.set(RenderState::WIREFRAME, wireframe);
                    rasterizer[double_sided as usize][wireframe as usize][front_ccw as usize] =
                        state;
                }
            }
        }

        let mut depth = [[RenderState::EMPTY; 2]; 2];
        for reverse_z in [false, true] {
            for no_write in [false, true] {
                let mut state = if reverse_z {
                    RenderState::DEPTH_TEST_GREATER
                } else {
                    RenderState::DEPTH_TEST_LESS
                };
                state.set(RenderState::WRITE_Z, !no_write);
                depth[reverse_z as usize][no_write as usize] = state;
            }
        }

        Self {
            default_blend,
            alpha_blend,
            rasterizer,
            depth,
        }
    }

    /// The process-wide table, built on first use.
    pub fn global() -> &'static Self {
        static CACHE: OnceLock<ResourceStateCache> = OnceLock::new();
        CACHE.get_or_init(Self::new)
    }

    /// Blend mask for opaque or alpha-blended materials.
    pub fn blend(&self, blended: bool) -> RenderState {
        if blended {
            self.alpha_blend
        } else {
            self.default_blend
        }
    }

    /// Rasterizer mask.
    pub fn rasterizer(&self, double_sided: bool, wireframe: bool, front_ccw: bool) -> RenderState {
        self.rasterizer[double_sided as usize][wireframe as usize][front_ccw as usize]
    }

    /// Depth test and write mask.
    pub fn depth(&self, reverse_z: bool, no_write: bool) -> RenderState {
        self.depth[reverse_z as usize][no_write as usize]
    }

    /// The combined state of a draw.
    pub fn combine(&self, key: StateKey) -> RenderState {
        self.blend(key.blended)
            | self.rasterizer(key.double_sided, key.wireframe, key.front_counter_clockwise)
            | self.depth(key.reverse_z, key.disable_depth_write)
    }
}

impl Default for ResourceStateCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_keys() -> impl Iterator<Item = StateKey> {
        (0u8..64).map(|bits| StateKey {
            blended: bits & 1 != 0,
            double_sided: bits & 2 != 0,
            wireframe: bits & 4 != 0,
            front_counter_clockwise: bits & 8 != 0,
            reverse_z: bits & 16 != 0,
            disable_depth_write: bits & 32 != 0,
        })
    }

    #[test]
    fn test_lookups_are_pure() {
        let first = ResourceStateCache::new();
        let second = ResourceStateCache::new();
        for key in all_keys() {
            assert_eq!(first.combine(key), first.combine(key));
            assert_eq!(first.combine(key), second.combine(key));
            assert_eq!(first.combine(key), ResourceStateCache::global().combine(key));
        }
    }

    #[test]
    fn test_culling_only_when_single_sided() {
        let cache = ResourceStateCache::new();
        assert!(cache
            .rasterizer(false, false, true)
            .contains(RenderState::CULL_CW));
        assert!(cache
            .rasterizer(false, false, false)
            .contains(RenderState::CULL_CCW));
        for wireframe in [false, true] {
            for ccw in [false, true] {
                let state = cache.rasterizer(true, wireframe, ccw);
                assert!(!state.intersects(RenderState::CULL_CW | RenderState::CULL_CCW));
                assert_eq!(state.contains(RenderState::WIREFRAME), wireframe);
            }
        }
    }

    #[test]
    fn test_depth_direction_and_write() {
        let cache = ResourceStateCache::new();
        assert_eq!(
            cache.depth(false, false),
            RenderState::DEPTH_TEST_LESS | RenderState::WRITE_Z
        );
        assert_eq!(cache.depth(true, true), RenderState::DEPTH_TEST_GREATER);
    }

    #[test]
    fn test_blend_selection() {
        let cache = ResourceStateCache::new();
        let key = StateKey {
            blended: true,
            ..StateKey::default()
        };
        assert!(cache.combine(key).contains(RenderState::BLEND_ALPHA));
        assert!(!cache
            .combine(StateKey::default())
            .contains(RenderState::BLEND_ALPHA));
        assert!(cache.combine(key).contains(RenderState::WRITE_RGB | RenderState::WRITE_A));
    }
}
