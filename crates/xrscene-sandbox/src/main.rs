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


// xrscene sandbox
// Drives projection layers through the headless compositor on a real wgpu device.

mod scene;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use xrscene_core::graphics::factory::DeviceRequest;
use xrscene_core::graphics::GpuDevice;
use xrscene_core::layer::{
    CompositionLayers, FrameRenderContext, ProjectionLayerConfig, ProjectionLayerController,
};
use xrscene_core::scene::{Scene, SceneResources, ShadingMode};
use xrscene_core::time::FrameClock;
use xrscene_core::xr::{Compositor, ViewConfigurationType};
use xrscene_infra::{
    create_wgpu_device, HeadlessCompositor, HeadlessConfig, WgpuDeviceFactory, WgpuSceneRenderer,
};

use crate::scene::CubeRing;

#[derive(Debug, Parser)]
#[command(name = "xrscene-sandbox", about = "Renders projection layers headlessly")]
struct Args {
    /// Number of frames to render.
    #[arg(long, default_value_t = 120)]
    frames: u64,

    /// Primary view configuration: mono, stereo or quad.
    #[arg(long, default_value = "stereo")]
    views: String,

    /// Start the primary layer in double-wide mode. It is toggled halfway through.
    #[arg(long)]
    double_wide: bool,

    /// Also render the first-person observer view.
    #[arg(long)]
    observer: bool,

    /// JSON file holding the primary layer configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip hardware adapters.
    #[arg(long)]
    software: bool,

    /// Enable the validation layer.
    #[arg(long)]
    debug: bool,

    /// Number of cubes in the ring.
    #[arg(long, default_value_t = 8)]
    cubes: usize,
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("wgpu_hal", log::LevelFilter::Error)
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .init();
}

fn primary_view_configuration(name: &str) -> Result<ViewConfigurationType> {
    match name {
        "mono" => Ok(ViewConfigurationType::PrimaryMono),
        "stereo" => Ok(ViewConfigurationType::PrimaryStereo),
        "quad" => Ok(ViewConfigurationType::PrimaryQuad),
        other => anyhow::bail!("Unknown view configuration '{other}'"),
    }
}

fn load_config(path: &Path) -> Result<ProjectionLayerConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid layer config in {}", path.display()))
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let primary = primary_view_configuration(&args.views)?;

    let factory = WgpuDeviceFactory {
        disable_hardware: args.software,
        ..WgpuDeviceFactory::default()
    };
    let request = DeviceRequest {
        debug: args.debug,
        ..DeviceRequest::default()
    };
    let created = create_wgpu_device(&factory, &request)?;
    log::info!(
        "Device created on '{}' ({}) at feature level {}",
        created.context.adapter_info.name,
        created.attempt,
        created.context.feature_level
    );
    let device = Arc::new(created.device);
    let gpu: Arc<dyn GpuDevice> = device.clone();

    let compositor = Arc::new(HeadlessCompositor::new(
        gpu.clone(),
        HeadlessConfig {
            observer_enabled: args.observer,
            ..HeadlessConfig::default()
        },
    ));
    let session = compositor.session_context(primary);
    let dyn_compositor: Arc<dyn Compositor> = compositor.clone();
    let mut controller = ProjectionLayerController::new(dyn_compositor, session.clone())
        .context("Failed to create the projection layer controller")?;

    if let Some(pending) = controller.pending_config_mut(primary) {
        if let Some(path) = &args.config {
            *pending = load_config(path)?;
        }
        pending.double_wide |= args.double_wide;
    }

    let mut resources = SceneResources::new(gpu).context("Failed to create scene resources")?;
    resources.set_light(Vec3::new(-0.3, -1.0, -0.5).normalize(), Vec3::splat(0.9));
    let mut renderer =
        WgpuSceneRenderer::new(device.clone()).context("Failed to create the scene renderer")?;
    let mut scenes: Vec<Box<dyn Scene>> = vec![Box::new(
        CubeRing::new(&resources, args.cubes).context("Failed to create the cube ring")?,
    )];

    let mut view_configurations = vec![primary];
    view_configurations.extend(session.enabled_secondary_view_configurations.iter().copied());

    let mut clock = FrameClock::new();
    let mut layers = CompositionLayers::new();
    let mut submitted_layers = 0;
    for frame in 0..args.frames {
        let frame_time = clock.tick();

        if frame == args.frames / 2 {
            if let Some(pending) = controller.pending_config_mut(primary) {
                pending.double_wide = !pending.double_wide;
                log::info!("Switching double-wide to {}", pending.double_wide);
            }
            resources.set_shading_mode(ShadingMode::Highlight);
            resources.start_highlight_animation(Vec3::new(0.0, 1.6, -2.5), frame_time.total_elapsed);
        }

        for scene in &mut scenes {
            scene.update(&frame_time);
        }

        layers.clear();
        for &ty in &view_configurations {
            if controller
                .prepare_rendering(ty, &compositor.view_configuration_views(ty))
                .with_context(|| format!("Failed to prepare {ty:?}"))?
            {
                log::info!("Swapchains for {ty:?} recreated on frame {frame}");
            }

            let views = compositor.locate_views(ty, &frame_time);
            let mut context = FrameRenderContext {
                renderer: &mut renderer,
                resources: &mut resources,
                frame_time,
                layer_space: compositor.reference_space(),
            };
            if controller
                .render(ty, &mut context, &views, &scenes)
                .with_context(|| format!("Failed to render {ty:?}"))?
            {
                controller.append_projection_layer(&mut layers, ty);
            }
        }

        submitted_layers += compositor
            .end_frame(&layers)
            .context("Failed to submit the frame")?;
    }

    log::info!(
        "Rendered {} frames, {} layers submitted, {} pipelines, {} bytes of textures",
        compositor.frames_submitted(),
        submitted_layers,
        renderer.pipeline_count(),
        device.vram_allocated_bytes()
    );
    Ok(())
}
