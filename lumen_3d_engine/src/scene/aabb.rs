//! Axis-aligned bounding boxes.

use glam::{Mat4, Vec3};

/// Axis-Aligned Bounding Box
///
/// Meshes store it in local space. The render-object store keeps the
/// world-space version, recomputed whenever the owning entity moves.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of half-size `half_extents` around `center`
    pub fn from_center_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Transform this box by a matrix, returning the enclosing box.
    ///
    /// Arvo's method: each matrix axis scaled by the min/max extents,
    /// no need to transform the eight corners.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let translation = matrix.col(3).truncate();
        let mut min = translation;
        let mut max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            min += a.min(b);
            max += a.max(b);
        }

        AABB { min, max }
    }

    /// Boxes overlap or touch
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
