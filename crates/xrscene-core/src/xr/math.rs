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

//! View and projection matrices for XR views.
//!
//! Matrices are right-handed, column-major, and map depth to `[0, 1]`.

use glam::{Mat4, Vec4};

use super::types::{Fov, NearFar, Pose};

/// The world-to-view transform of a pose.
pub fn invert_pose(pose: Pose) -> Mat4 {
    let inverse = pose.orientation.inverse();
    Mat4::from_rotation_translation(inverse, inverse * -pose.position)
}

/// An off-centre perspective projection for `fov`.
///
/// `near > far` produces a reverse-Z projection. An infinite far plane (or an
/// infinite near plane for reverse-Z) is supported. Both planes infinite is
/// meaningless and yields a non-finite matrix.
pub fn compose_projection(fov: Fov, near_far: NearFar) -> Mat4 {
    debug_assert!(
        !(near_far.near.is_infinite() && near_far.far.is_infinite()),
        "near and far planes cannot both be infinite"
    );

    let left = fov.angle_left.tan();
    let right = fov.angle_right.tan();
    let down = fov.angle_down.tan();
    let up = fov.angle_up.tan();
    let width = right - left;
    let height = up - down;

    let (n, f) = (near_far.near, near_far.far);
    let (m33, m43) = if f.is_infinite() {
        (-1.0, -n)
    } else if n.is_infinite() {
        (0.0, f)
    } else {
        let range = 1.0 / (n - f);
        (f * range, f * n * range)
    };

    Mat4::from_cols(
        Vec4::new(2.0 / width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 / height, 0.0, 0.0),
        Vec4::new((right + left) / width, (up + down) / height, m33, -1.0),
        Vec4::new(0.0, 0.0, m43, 0.0),
    )
}

/// Everything needed to render one view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewProjection {
    /// Eye pose.
    pub pose: Pose,
    /// Eye field of view.
    pub fov: Fov,
    /// Clip planes.
    pub near_far: NearFar,
}

impl ViewProjection {
    /// World-to-view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        invert_pose(self.pose)
    }

    /// View-to-clip matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        compose_projection(self.fov, self.near_far)
    }

    /// World-to-clip matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::{Quat, Vec3};

    fn depth_at(m: Mat4, distance: f32) -> f32 {
        let clip = m * Vec4::new(0.0, 0.0, -distance, 1.0);
        clip.z / clip.w
    }

    #[test]
    fn test_standard_depth_range() {
        let m = compose_projection(Fov::symmetric(1.5, 1.5), NearFar::new(0.1, 20.0));
        assert_relative_eq!(depth_at(m, 0.1), 0.0, epsilon = 1e-5);
        assert_relative_eq!(depth_at(m, 20.0), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_reverse_z_maps_near_to_one() {
        let m = compose_projection(Fov::symmetric(1.5, 1.5), NearFar::new(20.0, 0.1));
        assert_relative_eq!(depth_at(m, 0.1), 1.0, epsilon = 1e-5);
        assert_relative_eq!(depth_at(m, 20.0), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_infinite_far_plane() {
        let m = compose_projection(Fov::symmetric(1.5, 1.5), NearFar::new(0.1, f32::INFINITY));
        assert_relative_eq!(depth_at(m, 0.1), 0.0, epsilon = 1e-5);
        assert!(depth_at(m, 1.0e6) > 0.999);
    }

    #[test]
    fn test_off_centre_fov_shifts_centre() {
        let fov = Fov {
            angle_left: -0.8,
            angle_right: 0.4,
            angle_up: 0.5,
            angle_down: -0.5,
        };
        let m = compose_projection(fov, NearFar::default());
        // A point straight ahead lands right of centre when the left half-angle is wider.
        let clip = m * Vec4::new(0.0, 0.0, -1.0, 1.0);
        assert!(clip.x / clip.w > 0.0);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_invert_pose_round_trips() {
        let pose = Pose::new(
            Quat::from_rotation_y(0.7),
            Vec3::new(1.0, 2.0, -3.0),
        );
        let world = Mat4::from_rotation_translation(pose.orientation, pose.position);
        let identity = invert_pose(pose) * world;
        assert!(identity.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }
}
