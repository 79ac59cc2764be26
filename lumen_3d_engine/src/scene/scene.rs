//! Scene - entities with world transforms, cameras and a skybox.
//!
//! Uses a SlotMap so entity handles carry a generation: a removed entity's
//! handle never resolves to a newer one. Hierarchies are not modelled;
//! every transform is already a world transform.

use glam::Mat4;
use rustc_hash::FxHashSet;
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use crate::camera::Camera;
use super::transform_update::TransformUpdateReceiver;

new_key_type! {
    /// Opaque (index, generation) handle of a scene entity
    pub struct Entity;
}

pub struct Scene {
    transforms: SlotMap<Entity, Mat4>,
    cameras: SecondaryMap<Entity, Camera>,
    active_camera: Option<Entity>,
    skybox: Option<Entity>,
    /// Entities whose transform changed since the last notification
    dirty_transforms: FxHashSet<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            transforms: SlotMap::with_key(),
            cameras: SecondaryMap::new(),
            active_camera: None,
            skybox: None,
            dirty_transforms: FxHashSet::default(),
        }
    }

    // ===== ENTITIES =====

    /// Create an entity placed at `transform`
    pub fn create_entity(&mut self, transform: Mat4) -> Entity {
        let entity = self.transforms.insert(transform);
        self.dirty_transforms.insert(entity);
        entity
    }

    /// Remove an entity and its components. Returns false if already gone.
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        if self.transforms.remove(entity).is_none() {
            return false;
        }
        self.cameras.remove(entity);
        self.dirty_transforms.remove(&entity);
        if self.active_camera == Some(entity) {
            self.active_camera = None;
        }
        if self.skybox == Some(entity) {
            self.skybox = None;
        }
        true
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.transforms.contains_key(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.transforms.len()
    }

    pub fn world_transform(&self, entity: Entity) -> Option<Mat4> {
        self.transforms.get(entity).copied()
    }

    /// Move an entity. Returns false if the entity does not exist.
    pub fn set_world_transform(&mut self, entity: Entity, transform: Mat4) -> bool {
        match self.transforms.get_mut(entity) {
            Some(slot) => {
                *slot = transform;
                self.dirty_transforms.insert(entity);
                true
            }
            None => false,
        }
    }

    // ===== CAMERAS =====

    /// Attach a camera component. Returns false if the entity does not exist.
    pub fn add_camera(&mut self, entity: Entity, camera: Camera) -> bool {
        if !self.contains(entity) {
            return false;
        }
        self.cameras.insert(entity, camera);
        true
    }

    pub fn camera(&self, entity: Entity) -> Option<&Camera> {
        self.cameras.get(entity)
    }

    pub fn camera_mut(&mut self, entity: Entity) -> Option<&mut Camera> {
        self.cameras.get_mut(entity)
    }

    pub fn set_active_camera(&mut self, entity: Option<Entity>) {
        self.active_camera = entity;
    }

    pub fn active_camera(&self) -> Option<Entity> {
        self.active_camera
    }

    // ===== SKYBOX =====

    pub fn set_skybox(&mut self, entity: Option<Entity>) {
        self.skybox = entity;
    }

    pub fn skybox(&self) -> Option<Entity> {
        self.skybox
    }

    // ===== TRANSFORM NOTIFICATION =====

    pub fn dirty_transform_count(&self) -> usize {
        self.dirty_transforms.len()
    }

    /// Deliver every transform changed since the last call, then forget them
    pub fn notify_updated_transforms(&mut self, receiver: &mut dyn TransformUpdateReceiver) {
        if self.dirty_transforms.is_empty() {
            return;
        }

        let entities: Vec<Entity> = self.dirty_transforms.drain().collect();
        let transforms: Vec<Mat4> = entities.iter().map(|&e| self.transforms[e]).collect();

        receiver.notify_updated_transforms(&entities, &transforms);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
