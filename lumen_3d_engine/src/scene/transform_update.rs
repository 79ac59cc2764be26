//! Receiver side of the per-frame transform notification.

use glam::Mat4;
use super::scene::Entity;

/// Receives world transforms of entities that moved since the last
/// notification. `entities[i]` moved to `transforms[i]`.
pub trait TransformUpdateReceiver {
    fn notify_updated_transforms(&mut self, entities: &[Entity], transforms: &[Mat4]);
}
