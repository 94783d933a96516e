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

//! Errors reported by the compositor frame protocol.

use std::fmt;

/// A failed call against the compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositorError {
    /// `acquire_image` failed.
    AcquireFailed(String),
    /// `wait_image` failed.
    WaitFailed(String),
    /// `wait_image` timed out where readiness was required.
    WaitTimedOut,
    /// `release_image` failed.
    ReleaseFailed(String),
    /// The runtime refused to create a swapchain.
    SwapchainCreationFailed(String),
    /// The swapchain handle is unknown or already destroyed.
    InvalidSwapchain,
}

impl fmt::Display for CompositorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositorError::AcquireFailed(msg) => {
                write!(f, "Failed to acquire swapchain image: {msg}")
            }
            CompositorError::WaitFailed(msg) => {
                write!(f, "Failed to wait for swapchain image: {msg}")
            }
            CompositorError::WaitTimedOut => write!(f, "Timed out waiting for swapchain image."),
            CompositorError::ReleaseFailed(msg) => {
                write!(f, "Failed to release swapchain image: {msg}")
            }
            CompositorError::SwapchainCreationFailed(msg) => {
                write!(f, "Failed to create swapchain: {msg}")
            }
            CompositorError::InvalidSwapchain => write!(f, "Invalid swapchain handle."),
        }
    }
}

impl std::error::Error for CompositorError {}
