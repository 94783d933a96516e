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


//! The device fallback ladder mapped onto wgpu.
//!
//! The debug layer is wgpu's validation (`InstanceFlags::DEBUG | VALIDATION`);
//! when no adapter can be found with it the attempt reports the SDK component
//! as missing so the ladder retries without it. The software driver is the
//! adapter wgpu returns for `force_fallback_adapter`.

use anyhow::Context;

use xrscene_core::graphics::factory::{
    create_device_with_fallback, CreatedDevice, DeviceAttempt, DeviceAttemptError,
    DeviceFactory, DeviceRequest, DriverType, FeatureLevel,
};

use super::conversions::backend_name;
use super::device::WgpuDevice;

/// The queue and adapter a [`WgpuDevice`] was created with.
#[derive(Debug, Clone)]
pub struct WgpuContext {
    /// The device queue.
    pub queue: wgpu::Queue,
    /// The adapter the device runs on.
    pub adapter_info: wgpu::AdapterInfo,
    /// The feature level the device limits were chosen for.
    pub feature_level: FeatureLevel,
}

/// Creates [`WgpuDevice`]s, one attempt at a time.
#[derive(Debug, Clone)]
pub struct WgpuDeviceFactory {
    /// Backends adapters are looked up on.
    pub backends: wgpu::Backends,
    /// Preferred adapter class for hardware attempts.
    pub power_preference: wgpu::PowerPreference,
    /// Fail every hardware attempt, forcing the software driver.
    pub disable_hardware: bool,
}

impl Default for WgpuDeviceFactory {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            disable_hardware: false,
        }
    }
}

/// The device limits required by a feature level.
pub fn limits_for_feature_level(level: FeatureLevel) -> wgpu::Limits {
    if level >= FeatureLevel::new(11, 0) {
        wgpu::Limits::default()
    } else if level >= FeatureLevel::new(10, 0) {
        wgpu::Limits::downlevel_defaults()
    } else {
        wgpu::Limits::downlevel_webgl2_defaults()
    }
}

impl WgpuDeviceFactory {
    fn instance(&self, backends: wgpu::Backends, debug: bool) -> wgpu::Instance {
        let flags = if debug {
            wgpu::InstanceFlags::DEBUG | wgpu::InstanceFlags::VALIDATION
        } else {
            wgpu::InstanceFlags::empty()
        };
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            flags,
            ..Default::default()
        })
    }

    fn select_adapter(
        &self,
        adapter: Option<&wgpu::Adapter>,
        attempt: DeviceAttempt,
    ) -> Result<wgpu::Adapter, DeviceAttemptError> {
        match attempt.driver {
            DriverType::Hardware if self.disable_hardware => Err(DeviceAttemptError::Unsupported(
                "hardware adapters are disabled".to_string(),
            )),
            DriverType::Hardware => {
                if let (Some(adapter), false) = (adapter, attempt.debug) {
                    return Ok(adapter.clone());
                }
                // The debug layer lives on the instance, so look the adapter up again.
                let backends = adapter
                    .map(|a| wgpu::Backends::from(a.get_info().backend))
                    .unwrap_or(self.backends);
                let instance = self.instance(backends, attempt.debug);
                pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: self.power_preference,
                    compatible_surface: None,
                    force_fallback_adapter: false,
                }))
                .map_err(|e| {
                    if attempt.debug {
                        log::warn!("No adapter with the validation layer: {e}");
                        DeviceAttemptError::SdkComponentMissing
                    } else {
                        DeviceAttemptError::Unsupported(format!("no hardware adapter: {e}"))
                    }
                })
            }
            DriverType::Software => {
                let instance = self.instance(self.backends, attempt.debug);
                pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::None,
                    compatible_surface: None,
                    force_fallback_adapter: true,
                }))
                .map_err(|e| DeviceAttemptError::Unsupported(format!("no software adapter: {e}")))
            }
        }
    }
}

impl DeviceFactory for WgpuDeviceFactory {
    type Adapter = wgpu::Adapter;
    type Device = WgpuDevice;
    type Context = WgpuContext;

    fn create_device(
        &self,
        adapter: Option<&wgpu::Adapter>,
        feature_levels: &[FeatureLevel],
        single_threaded: bool,
        attempt: DeviceAttempt,
    ) -> Result<(WgpuDevice, WgpuContext), DeviceAttemptError> {
        let adapter = self.select_adapter(adapter, attempt)?;
        let adapter_info = adapter.get_info();
        let adapter_limits = adapter.limits();

        let (feature_level, required_limits) = feature_levels
            .iter()
            .map(|&level| (level, limits_for_feature_level(level)))
            .find(|(_, limits)| limits.check_limits(&adapter_limits))
            .ok_or_else(|| {
                DeviceAttemptError::Unsupported(format!(
                    "adapter '{}' meets none of the feature levels {feature_levels:?}",
                    adapter_info.name
                ))
            })?;

        let optional = wgpu::Features::POLYGON_MODE_LINE | wgpu::Features::DEPTH32FLOAT_STENCIL8;
        let required_features = adapter.features() & optional;
        if single_threaded {
            log::debug!("Single threaded device requested; wgpu devices are always shareable.");
        }

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("xrscene device"),
            required_features,
            required_limits,
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| DeviceAttemptError::Unsupported(format!("request_device failed: {e}")))?;

        log::info!(
            "Created device on \"{}\" ({}, {:?}) at feature level {feature_level}",
            adapter_info.name,
            backend_name(adapter_info.backend),
            adapter_info.device_type
        );
        let device = WgpuDevice::new(device, queue.clone(), &adapter_info);
        Ok((
            device,
            WgpuContext {
                queue,
                adapter_info,
                feature_level,
            },
        ))
    }
}

/// Runs the fallback ladder with `factory`, starting from the default hardware adapter.
/// ## Errors
/// Fails when every rung of the ladder failed.
pub fn create_wgpu_device(
    factory: &WgpuDeviceFactory,
    request: &DeviceRequest,
) -> anyhow::Result<CreatedDevice<WgpuDevice, WgpuContext>> {
    create_device_with_fallback(factory, None, request).context("Failed to create a wgpu device")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_follow_feature_level() {
        let max_default = wgpu::Limits::default().max_texture_dimension_2d;
        let max_downlevel = wgpu::Limits::downlevel_defaults().max_texture_dimension_2d;
        assert_eq!(
            limits_for_feature_level(FeatureLevel::new(12, 1)).max_texture_dimension_2d,
            max_default
        );
        assert_eq!(
            limits_for_feature_level(FeatureLevel::new(10, 1)).max_texture_dimension_2d,
            max_downlevel
        );
    }

    #[test]
    fn test_disabled_hardware_fails_without_touching_the_driver() {
        let factory = WgpuDeviceFactory {
            disable_hardware: true,
            ..WgpuDeviceFactory::default()
        };
        let err = factory
            .create_device(
                None,
                &[FeatureLevel::new(11, 0)],
                true,
                DeviceAttempt {
                    driver: DriverType::Hardware,
                    debug: false,
                },
            )
            .unwrap_err();
        assert!(matches!(err, DeviceAttemptError::Unsupported(_)));
    }
}
