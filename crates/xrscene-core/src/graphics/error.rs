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

//! Error types of the graphics layer.

use std::fmt;

use super::factory::{DeviceAttempt, DeviceAttemptError};
use super::resource::TextureFormat;

/// A failure to create, update or destroy a device object.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// The handle does not name a live object.
    InvalidHandle,
    /// The device cannot create objects of this format.
    UnsupportedFormat(TextureFormat),
    /// Creation was rejected by the backend.
    CreationFailed {
        /// Kind of object being created.
        kind: &'static str,
        /// Backend message.
        details: String,
    },
    /// Data written past the end of the object.
    OutOfBounds,
    /// An error reported by the backend outside of creation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle."),
            ResourceError::UnsupportedFormat(format) => {
                write!(f, "Format {format:?} is not supported by the device.")
            }
            ResourceError::CreationFailed { kind, details } => {
                write!(f, "Failed to create {kind}: {details}")
            }
            ResourceError::OutOfBounds => write!(f, "Resource access out of bounds."),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// A failure to obtain a device from the fallback ladder.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCreationError {
    /// None of the requested feature levels reaches the runtime minimum.
    NoFeatureLevel,
    /// Every rung of the ladder failed.
    ExhaustedFallbacks {
        /// The attempts made, in order, with their failure.
        attempts: Vec<(DeviceAttempt, DeviceAttemptError)>,
    },
}

impl fmt::Display for DeviceCreationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceCreationError::NoFeatureLevel => {
                write!(f, "No requested feature level meets the runtime minimum.")
            }
            DeviceCreationError::ExhaustedFallbacks { attempts } => {
                write!(f, "Device creation failed after {} attempts", attempts.len())?;
                for (attempt, err) in attempts {
                    write!(f, "; {attempt}: {err}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for DeviceCreationError {}

/// A failure while recording or submitting the draws of a view configuration.
#[derive(Debug)]
pub enum RenderError {
    /// A target image does not exist on the device.
    MissingTarget(&'static str),
    /// A device object failed.
    ResourceError(ResourceError),
    /// Backend failure during submission.
    SubmissionFailed(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::MissingTarget(which) => write!(f, "Missing {which} render target."),
            RenderError::ResourceError(e) => write!(f, "Resource error: {e}"),
            RenderError::SubmissionFailed(msg) => write!(f, "Submission failed: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::factory::DriverType;
    use std::error::Error;

    #[test]
    fn test_render_error_exposes_resource_source() {
        let err = RenderError::from(ResourceError::InvalidHandle);
        assert!(err.source().is_some());
        assert_eq!(
            err.to_string(),
            "Resource error: Invalid resource handle."
        );
    }

    #[test]
    fn test_exhausted_fallbacks_lists_every_attempt() {
        let err = DeviceCreationError::ExhaustedFallbacks {
            attempts: vec![
                (
                    DeviceAttempt {
                        driver: DriverType::Hardware,
                        debug: false,
                    },
                    DeviceAttemptError::Unsupported("no adapter".into()),
                ),
                (
                    DeviceAttempt {
                        driver: DriverType::Software,
                        debug: false,
                    },
                    DeviceAttemptError::Unsupported("no fallback".into()),
                ),
            ],
        };
        let text = err.to_string();
        assert!(text.starts_with("Device creation failed after 2 attempts"));
        assert!(text.contains("no fallback"));
    }
}
