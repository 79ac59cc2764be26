//! Camera component attached to a scene entity.
//!
//! The camera only holds projection parameters. Its placement comes from
//! the world transform of the entity it is attached to.

use glam::{Mat4, Vec3};
use super::projection::ProjectionParameters;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    pub parameters: ProjectionParameters,
}

impl Camera {
    pub fn new(parameters: ProjectionParameters) -> Self {
        Self { parameters }
    }

    /// View matrix of a camera placed at `transform`
    pub fn view_matrix(transform: &Mat4) -> Mat4 {
        transform.inverse()
    }

    /// Eye position of a camera placed at `transform`
    pub fn position(transform: &Mat4) -> Vec3 {
        transform.transform_point3(Vec3::ZERO)
    }

    /// Viewing direction (-Z in camera space) of a camera placed at `transform`
    pub fn forward(transform: &Mat4) -> Vec3 {
        transform.transform_vector3(Vec3::NEG_Z)
    }

    /// Normalized depth of `point` seen from a camera at `transform`
    ///
    /// 0 on the near plane, 1 on the far plane, unclamped.
    pub fn depth_of(&self, transform: &Mat4, point: Vec3) -> f32 {
        calculate_depth(point, Self::position(transform), Self::forward(transform), &self.parameters)
    }
}

/// Distance of `point` along `eye_forward`, normalized between near and far
pub fn calculate_depth(
    point: Vec3,
    eye_position: Vec3,
    eye_forward: Vec3,
    params: &ProjectionParameters,
) -> f32 {
    params.normalize_depth((point - eye_position).dot(eye_forward))
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
