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

//! Frame timing.

use std::time::{Duration, Instant};

/// Timing of the frame being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTime {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Time since the previous frame.
    pub elapsed: Duration,
    /// Time since the first frame.
    pub total_elapsed: Duration,
}

impl FrameTime {
    /// A snapshot with explicit values.
    pub const fn new(frame_index: u64, elapsed: Duration, total_elapsed: Duration) -> Self {
        Self {
            frame_index,
            elapsed,
            total_elapsed,
        }
    }

    /// [`FrameTime::elapsed`] in seconds.
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// [`FrameTime::total_elapsed`] in seconds.
    pub fn total_secs(&self) -> f32 {
        self.total_elapsed.as_secs_f32()
    }
}

/// Produces a [`FrameTime`] per tick.
///
/// Frame deltas are clamped so a debugger pause does not become a multi-second frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    max_elapsed: Duration,
}

impl FrameClock {
    /// Starts the clock now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
            max_elapsed: Duration::from_millis(250),
        }
    }

    /// Advances to the next frame.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let elapsed = now
            .saturating_duration_since(self.last)
            .min(self.max_elapsed);
        self.last = now;

        let time = FrameTime::new(
            self.frame_index,
            elapsed,
            now.saturating_duration_since(self.start),
        );
        self.frame_index = self.frame_index.wrapping_add(1);
        time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_counts_frames() {
        let mut clock = FrameClock::new();
        let first = clock.tick();
        let second = clock.tick();
        assert_eq!(first.frame_index, 0);
        assert_eq!(second.frame_index, 1);
        assert!(second.total_elapsed >= first.total_elapsed);
        assert!(second.elapsed <= Duration::from_millis(250));
    }
}
