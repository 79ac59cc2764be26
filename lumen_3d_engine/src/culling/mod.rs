//! Visibility culling against frustum planes.

pub mod intersect;
