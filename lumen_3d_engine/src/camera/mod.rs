//! Camera module - projection parameters, frustum planes, camera component
//! and per-viewport matrices.

mod camera;
mod frustum;
mod projection;
mod viewport_transform;

pub use camera::{Camera, calculate_depth};
pub use frustum::{
    Frustum,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use projection::{ProjectionParameters, ProjectionType};
pub use viewport_transform::ViewportTransform;
