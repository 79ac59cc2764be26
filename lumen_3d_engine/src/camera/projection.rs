//! Projection parameters for cameras and lights.
//!
//! Matrices follow the OpenGL convention: right-handed view space looking
//! down -Z, clip-space depth in [-1, 1].

use glam::Mat4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionType {
    Perspective,
    Orthographic,
}

/// Parameters of a perspective or orthographic projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParameters {
    pub projection: ProjectionType,
    /// Vertical field of view in radians (perspective) or view height in
    /// world units (orthographic)
    pub height: f32,
    /// Width divided by height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl ProjectionParameters {
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            projection: ProjectionType::Perspective,
            height: fov_y,
            aspect,
            near,
            far,
        }
    }

    pub fn orthographic(height: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            projection: ProjectionType::Orthographic,
            height,
            aspect,
            near,
            far,
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            ProjectionType::Perspective => {
                Mat4::perspective_rh_gl(self.height, self.aspect, self.near, self.far)
            }
            ProjectionType::Orthographic => {
                let half_h = self.height * 0.5;
                let half_w = half_h * self.aspect;
                Mat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
        }
    }

    /// Normalize a view-space distance along the forward axis to [0, 1]
    /// between the near and far planes. Not clamped.
    pub fn normalize_depth(&self, distance: f32) -> f32 {
        (distance - self.near) / (self.far - self.near)
    }
}

impl Default for ProjectionParameters {
    fn default() -> Self {
        Self::perspective(std::f32::consts::FRAC_PI_3, 16.0 / 9.0, 0.1, 100.0)
    }
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod tests;
