//! Per-viewport matrices cached once per frame.

use glam::Mat4;
use super::camera::Camera;
use super::projection::ProjectionParameters;

/// View, projection and their product for one viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
}

impl ViewportTransform {
    /// Matrices of an eye placed at world `transform`
    pub fn from_transform(transform: &Mat4, params: &ProjectionParameters) -> Self {
        let view = Camera::view_matrix(transform);
        let projection = params.projection_matrix();
        Self {
            view,
            projection,
            view_projection: projection * view,
        }
    }
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
        }
    }
}
