//! Scene module
//!
//! Entities with world transforms, camera components, the active camera,
//! the skybox entity and transform-change notification.

mod aabb;
mod scene;
mod transform_update;

pub use aabb::AABB;
pub use scene::{Entity, Scene};
pub use transform_update::TransformUpdateReceiver;
