use glam::{Mat4, Vec3};
use crate::camera::{Camera, ProjectionParameters};
use super::*;

/// Records every notification it receives
#[derive(Default)]
struct RecordingReceiver {
    batches: Vec<Vec<(Entity, Mat4)>>,
}

impl TransformUpdateReceiver for RecordingReceiver {
    fn notify_updated_transforms(&mut self, entities: &[Entity], transforms: &[Mat4]) {
        self.batches.push(entities.iter().copied().zip(transforms.iter().copied()).collect());
    }
}

// ============================================================================
// Entities
// ============================================================================

#[test]
fn test_create_and_move_entity() {
    let mut scene = Scene::new();
    let e = scene.create_entity(Mat4::IDENTITY);
    let moved = Mat4::from_translation(Vec3::X);

    assert!(scene.set_world_transform(e, moved));
    assert_eq!(scene.world_transform(e), Some(moved));
    assert_eq!(scene.entity_count(), 1);
}

#[test]
fn test_removed_handle_is_stale() {
    let mut scene = Scene::new();
    let old = scene.create_entity(Mat4::IDENTITY);
    assert!(scene.remove_entity(old));
    assert!(!scene.remove_entity(old));

    let new = scene.create_entity(Mat4::IDENTITY);
    assert_ne!(old, new);
    assert!(!scene.contains(old));
    assert!(!scene.set_world_transform(old, Mat4::IDENTITY));
}

#[test]
fn test_remove_clears_camera_and_skybox() {
    let mut scene = Scene::new();
    let cam = scene.create_entity(Mat4::IDENTITY);
    let sky = scene.create_entity(Mat4::IDENTITY);
    scene.add_camera(cam, Camera::default());
    scene.set_active_camera(Some(cam));
    scene.set_skybox(Some(sky));

    scene.remove_entity(cam);
    scene.remove_entity(sky);

    assert_eq!(scene.active_camera(), None);
    assert_eq!(scene.skybox(), None);
    assert!(scene.camera(cam).is_none());
}

// ============================================================================
// Cameras
// ============================================================================

#[test]
fn test_add_camera_requires_entity() {
    let mut scene = Scene::new();
    let e = scene.create_entity(Mat4::IDENTITY);
    let params = ProjectionParameters::perspective(1.0, 1.5, 0.5, 50.0);

    assert!(scene.add_camera(e, Camera::new(params)));
    assert_eq!(scene.camera(e).unwrap().parameters, params);

    scene.remove_entity(e);
    assert!(!scene.add_camera(e, Camera::new(params)));
}

// ============================================================================
// Transform notification
// ============================================================================

#[test]
fn test_notify_delivers_changes_once() {
    let mut scene = Scene::new();
    let a = scene.create_entity(Mat4::IDENTITY);
    let b = scene.create_entity(Mat4::from_translation(Vec3::Y));
    let mut receiver = RecordingReceiver::default();

    scene.notify_updated_transforms(&mut receiver);
    assert_eq!(receiver.batches.len(), 1);
    assert_eq!(receiver.batches[0].len(), 2);
    assert!(receiver.batches[0].contains(&(b, Mat4::from_translation(Vec3::Y))));

    // Nothing changed: no second batch
    scene.notify_updated_transforms(&mut receiver);
    assert_eq!(receiver.batches.len(), 1);

    let moved = Mat4::from_translation(Vec3::Z);
    scene.set_world_transform(a, moved);
    scene.set_world_transform(a, moved);
    scene.notify_updated_transforms(&mut receiver);

    assert_eq!(receiver.batches[1], vec![(a, moved)]);
    assert_eq!(scene.dirty_transform_count(), 0);
}
