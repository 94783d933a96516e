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


//! Runs frames on a real adapter. Every test returns early when the machine has none.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::CubeRow;
use xrscene_core::graphics::factory::DeviceRequest;
use xrscene_core::graphics::handle::{Texture, UniqueHandle};
use xrscene_core::graphics::resource::{TextureDescriptor, TextureFormat, TextureUsage};
use xrscene_core::graphics::{GpuDevice, Rgba};
use xrscene_core::layer::{CompositionLayers, FrameRenderContext, ProjectionLayerController};
use xrscene_core::scene::{Scene, SceneResources};
use xrscene_core::time::FrameTime;
use xrscene_core::xr::{Compositor, ViewConfigurationType};
use xrscene_infra::{
    create_wgpu_device, HeadlessCompositor, HeadlessConfig, WgpuDevice, WgpuDeviceFactory,
    WgpuSceneRenderer,
};

fn try_device() -> Option<Arc<WgpuDevice>> {
    let request = DeviceRequest {
        debug: false,
        ..DeviceRequest::default()
    };
    match create_wgpu_device(&WgpuDeviceFactory::default(), &request) {
        Ok(created) => Some(Arc::new(created.device)),
        Err(e) => {
            eprintln!("Skipping, no adapter available: {e:#}");
            None
        }
    }
}

#[test]
fn test_solid_color_texture_is_uploaded() {
    let Some(device) = try_device() else {
        return;
    };
    let dyn_device: Arc<dyn GpuDevice> = device.clone();
    let resources = SceneResources::new(dyn_device).unwrap();

    let texture = resources.create_solid_color_texture(Rgba::WHITE).unwrap();

    let info = device.texture_info(texture.get()).unwrap();
    assert_eq!((info.width, info.height), (1, 1));
    assert_eq!(info.format, TextureFormat::Rgba8Unorm);
    assert!(device.sampler(resources.samplers().base_color.get()).is_some());
}

#[test]
fn test_texture_is_released_with_its_handle() {
    let Some(device) = try_device() else {
        return;
    };
    let owner: Arc<dyn GpuDevice> = device.clone();
    let before = device.vram_allocated_bytes();

    let texture = UniqueHandle::<Texture>::create(owner, |d| {
        d.create_texture(&TextureDescriptor {
            label: None,
            width: 16,
            height: 16,
            array_layers: 2,
            mip_level_count: 1,
            sample_count: 1,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsage::RENDER_TARGET | TextureUsage::SAMPLED,
        })
    })
    .unwrap();
    let raw = texture.get();
    assert_eq!(device.vram_allocated_bytes(), before + 16 * 16 * 4 * 2);
    assert!(device.texture_view(raw, 1).is_ok());
    assert!(device.texture_view(raw, 2).is_err());

    drop(texture);
    assert!(device.texture_info(raw).is_none());
    assert_eq!(device.vram_allocated_bytes(), before);
}

#[test]
fn test_stereo_frame_renders_on_the_adapter() {
    // --- 1. ARRANGE ---
    let Some(device) = try_device() else {
        return;
    };
    let dyn_device: Arc<dyn GpuDevice> = device.clone();
    let compositor = Arc::new(HeadlessCompositor::new(
        dyn_device.clone(),
        HeadlessConfig {
            eye_width: 64,
            eye_height: 64,
            ..HeadlessConfig::default()
        },
    ));
    let ty = ViewConfigurationType::PrimaryStereo;
    let dyn_compositor: Arc<dyn Compositor> = compositor.clone();
    let mut controller =
        ProjectionLayerController::new(dyn_compositor, compositor.session_context(ty)).unwrap();
    let mut resources = SceneResources::new(dyn_device).unwrap();
    let mut renderer = WgpuSceneRenderer::new(device.clone()).unwrap();
    let scenes: Vec<Box<dyn Scene>> = vec![Box::new(CubeRow { count: 2 })];
    let mut layers = CompositionLayers::new();

    // --- 2. ACT ---
    for frame_index in 0..2 {
        let time = FrameTime::new(
            frame_index,
            Duration::from_millis(16),
            Duration::from_millis(16 * (frame_index + 1)),
        );
        controller
            .prepare_rendering(ty, &compositor.view_configuration_views(ty))
            .unwrap();
        let views = compositor.locate_views(ty, &time);
        let mut context = FrameRenderContext {
            renderer: &mut renderer,
            resources: &mut resources,
            frame_time: time,
            layer_space: compositor.reference_space(),
        };
        assert!(controller.render(ty, &mut context, &views, &scenes).unwrap());
        layers.clear();
        controller.append_projection_layer(&mut layers, ty);
        compositor.end_frame(&layers).unwrap();
    }

    // --- 3. ASSERT ---
    assert_eq!(compositor.frames_submitted(), 2);
    assert_eq!(renderer.pipeline_count(), 1, "Identical states share a pipeline");
}
