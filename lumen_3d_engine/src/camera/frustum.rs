//! Frustum - six clipping planes for visibility culling.
//!
//! Each plane is a Vec4 (A, B, C, D) with a unit inward normal (A, B, C).
//! A point P is inside when `dot(plane, (P, 1)) >= 0` for every plane.

use glam::{Mat4, Vec3, Vec4};
use crate::scene::AABB;
use super::projection::ProjectionParameters;

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract planes from an OpenGL-convention view-projection matrix.
    ///
    /// Gribb & Hartmann: each plane is the sum or difference of the fourth
    /// row with one of the first three rows.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        let mut planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r3 + r2, r3 - r2];

        for plane in &mut planes {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        Self { planes }
    }

    /// Frustum of a camera or light placed at world `transform`
    pub fn from_parameters(params: &ProjectionParameters, transform: &Mat4) -> Self {
        Self::from_view_projection(&(params.projection_matrix() * transform.inverse()))
    }

    /// Conservative AABB test: false only when the box lies entirely on the
    /// negative side of at least one plane.
    ///
    /// For each plane only the corner furthest along the normal (p-vertex)
    /// is tested.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            let p_vertex = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            normal.dot(p_vertex) + plane.w >= 0.0
        })
    }

    /// Sphere test with the same contract as `intersects_aabb`
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(center) + plane.w >= -radius)
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.intersects_sphere(point, 0.0)
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
