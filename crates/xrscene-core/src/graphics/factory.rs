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

//! Device creation with a hardware to software fallback ladder.
//!
//! A backend implements [`DeviceFactory`] for a single creation attempt. The
//! ladder in [`create_device_with_fallback`] decides which attempts to make:
//!
//! 1. hardware, with the debug layer if requested;
//! 2. hardware without the debug layer, only when the debug layer itself is missing;
//! 3. the software driver.

use std::fmt;

use super::error::DeviceCreationError;

/// A graphics API feature level, e.g. `11.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureLevel {
    /// Major version.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
}

impl FeatureLevel {
    /// Builds a feature level.
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for FeatureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The driver a device is created on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverType {
    /// The physical adapter.
    Hardware,
    /// A CPU rasterizer.
    Software,
}

/// Everything the caller wants from the created device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRequest {
    /// Acceptable feature levels, most preferred first.
    pub feature_levels: Vec<FeatureLevel>,
    /// Lowest level the XR runtime accepts.
    pub min_feature_level: FeatureLevel,
    /// The device will only be used from one thread.
    pub single_threaded: bool,
    /// Enable the debug/validation layer.
    pub debug: bool,
}

impl Default for DeviceRequest {
    fn default() -> Self {
        Self {
            feature_levels: vec![
                FeatureLevel::new(12, 1),
                FeatureLevel::new(12, 0),
                FeatureLevel::new(11, 1),
                FeatureLevel::new(11, 0),
                FeatureLevel::new(10, 1),
                FeatureLevel::new(10, 0),
            ],
            min_feature_level: FeatureLevel::new(11, 0),
            single_threaded: true,
            debug: cfg!(debug_assertions),
        }
    }
}

/// One rung of the fallback ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceAttempt {
    /// Driver to create the device on.
    pub driver: DriverType,
    /// Whether the debug layer is enabled.
    pub debug: bool,
}

impl fmt::Display for DeviceAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}{}",
            self.driver,
            if self.debug { " (debug)" } else { "" }
        )
    }
}

/// Why a single attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceAttemptError {
    /// The debug layer is not installed.
    SdkComponentMissing,
    /// Any other failure.
    Unsupported(String),
}

impl fmt::Display for DeviceAttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceAttemptError::SdkComponentMissing => {
                write!(f, "debug layer SDK component missing")
            }
            DeviceAttemptError::Unsupported(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for DeviceAttemptError {}

/// Creates a device and its immediate context for one attempt.
pub trait DeviceFactory {
    /// The adapter type the XR runtime asks the device to be created on.
    type Adapter;
    /// The created device.
    type Device;
    /// The immediate context (queue) paired with the device.
    type Context;

    /// Makes a single attempt.
    /// ## Arguments
    /// * `adapter` - The adapter for hardware attempts, `None` for the software driver.
    /// * `feature_levels` - Acceptable levels, already filtered by the runtime minimum.
    /// * `single_threaded` - The device will only be used from one thread.
    /// * `attempt` - Driver and debug layer selection.
    fn create_device(
        &self,
        adapter: Option<&Self::Adapter>,
        feature_levels: &[FeatureLevel],
        single_threaded: bool,
        attempt: DeviceAttempt,
    ) -> Result<(Self::Device, Self::Context), DeviceAttemptError>;
}

/// The outcome of a successful ladder run.
#[derive(Debug)]
pub struct CreatedDevice<D, C> {
    /// The device.
    pub device: D,
    /// Its immediate context.
    pub context: C,
    /// The rung that succeeded.
    pub attempt: DeviceAttempt,
}

/// Runs the fallback ladder against `factory`.
///
/// ## Errors
/// * `DeviceCreationError::NoFeatureLevel` - No level in the request reaches the minimum.
/// * `DeviceCreationError::ExhaustedFallbacks` - Hardware and software attempts all failed.
pub fn create_device_with_fallback<F: DeviceFactory>(
    factory: &F,
    adapter: Option<&F::Adapter>,
    request: &DeviceRequest,
) -> Result<CreatedDevice<F::Device, F::Context>, DeviceCreationError> {
    let feature_levels: Vec<FeatureLevel> = request
        .feature_levels
        .iter()
        .copied()
        .filter(|level| *level >= request.min_feature_level)
        .collect();
    if feature_levels.is_empty() {
        log::error!(
            "None of {:?} reaches the runtime minimum feature level {}",
            request.feature_levels,
            request.min_feature_level
        );
        return Err(DeviceCreationError::NoFeatureLevel);
    }

    let mut attempts = Vec::new();
    let mut debug = request.debug;
    let hardware = DeviceAttempt {
        driver: DriverType::Hardware,
        debug,
    };
    if let Some(created) = attempt_once(
        factory,
        adapter,
        &feature_levels,
        request,
        hardware,
        &mut attempts,
    ) {
        return Ok(created);
    }

    let debug_missing = debug
        && attempts
            .last()
            .is_some_and(|(_, e)| *e == DeviceAttemptError::SdkComponentMissing);
    if debug_missing {
        log::warn!("Debug layer unavailable, retrying without it.");
        debug = false;
        let retry = DeviceAttempt {
            driver: DriverType::Hardware,
            debug,
        };
        if let Some(created) = attempt_once(
            factory,
            adapter,
            &feature_levels,
            request,
            retry,
            &mut attempts,
        ) {
            return Ok(created);
        }
    }

    log::warn!("Hardware device creation failed, falling back to the software driver.");
    let software = DeviceAttempt {
        driver: DriverType::Software,
        debug,
    };
    if let Some(created) = attempt_once(
        factory,
        None,
        &feature_levels,
        request,
        software,
        &mut attempts,
    ) {
        return Ok(created);
    }

    Err(DeviceCreationError::ExhaustedFallbacks { attempts })
}

fn attempt_once<F: DeviceFactory>(
    factory: &F,
    adapter: Option<&F::Adapter>,
    feature_levels: &[FeatureLevel],
    request: &DeviceRequest,
    attempt: DeviceAttempt,
    failures: &mut Vec<(DeviceAttempt, DeviceAttemptError)>,
) -> Option<CreatedDevice<F::Device, F::Context>> {
    log::debug!("Creating device: {attempt}");
    match factory.create_device(adapter, feature_levels, request.single_threaded, attempt) {
        Ok((device, context)) => Some(CreatedDevice {
            device,
            context,
            attempt,
        }),
        Err(e) => {
            log::warn!("Device creation failed ({attempt}): {e}");
            failures.push((attempt, e));
            None
        }
    }
}
