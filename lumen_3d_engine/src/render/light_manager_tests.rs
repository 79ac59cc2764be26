//! Unit tests for light_manager.rs
//!
//! Tests id assignment, growth, transform updates and frustum queries.

use glam::{Mat4, Quat, Vec3};
use crate::camera::{Frustum, ProjectionParameters};
use crate::scene::{Entity, Scene};
use super::*;

fn entities(scene: &mut Scene, count: usize) -> Vec<Entity> {
    (0..count).map(|_| scene.create_entity(Mat4::IDENTITY)).collect()
}

/// Camera at the origin looking down -Z, far plane at 100
fn forward_frustum() -> Frustum {
    let params = ProjectionParameters::perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
    Frustum::from_parameters(&params, &Mat4::IDENTITY)
}

fn point_light_at(lights: &mut LightManager, entity: Entity, position: Vec3, radius: f32) -> LightId {
    let id = lights.add_light(entity);
    lights.set_light_type(id, LightType::Point).unwrap();
    lights.set_radius(id, radius).unwrap();
    lights.notify_updated_transforms(&[entity], &[Mat4::from_translation(position)]);
    id
}

// ============================================================================
// ADD / LOOKUP
// ============================================================================

#[test]
fn test_ids_start_at_one_and_are_stable() {
    let mut scene = Scene::new();
    let mut lights = LightManager::new(2);
    let list = entities(&mut scene, 20);

    let ids = lights.add_lights(&list);

    assert_eq!(ids.first(), Some(&LightId(1)));
    assert_eq!(ids.last(), Some(&LightId(20)));
    assert_eq!(lights.len(), 20);
    assert!(lights.allocated().is_power_of_two());
    assert!(lights.allocated() >= 21);
    for (entity, id) in list.iter().zip(&ids) {
        assert_eq!(lights.lookup(*entity), *id);
        assert_eq!(lights.entity(*id), Some(*entity));
    }
    assert_eq!(lights.add_light(list[3]), ids[3]);
}

#[test]
fn test_new_light_is_white_directional() {
    let mut scene = Scene::new();
    let mut lights = LightManager::default();
    let id = lights.add_light(scene.create_entity(Mat4::IDENTITY));

    assert_eq!(lights.light_type(id), Some(LightType::Directional));
    assert_eq!(lights.color(id), Some(Vec3::ONE));
    assert_eq!(lights.is_shadow_casting(id), Some(false));
    assert!(lights.light_type(LightId::NULL).is_none());
    assert!(lights.set_radius(LightId(7), 1.0).is_err());
}

#[test]
fn test_set_color_resets_radius() {
    let mut scene = Scene::new();
    let mut lights = LightManager::default();
    let id = lights.add_light(scene.create_entity(Mat4::IDENTITY));
    lights.set_radius(id, 2.0).unwrap();

    lights.set_color(id, Vec3::new(0.5, 2.0, 1.0)).unwrap();

    let expected = (2.0f32 * 256.0 / 5.0).sqrt();
    assert!((lights.radius(id).unwrap() - expected).abs() < 1e-5);
    assert!((default_radius(Vec3::splat(5.0 / 256.0)) - 1.0).abs() < 1e-5);
}

// ============================================================================
// TRANSFORM UPDATES
// ============================================================================

#[test]
fn test_notify_moves_mapped_lights_only() {
    let mut scene = Scene::new();
    let mut lights = LightManager::default();
    let lamp = scene.create_entity(Mat4::IDENTITY);
    let other = scene.create_entity(Mat4::IDENTITY);
    let id = lights.add_light(lamp);

    let rotation = Quat::from_rotation_y(1.0);
    let transform = Mat4::from_rotation_translation(rotation, Vec3::new(1.0, 2.0, 3.0));
    lights.notify_updated_transforms(&[other, lamp], &[Mat4::IDENTITY, transform]);

    assert_eq!(lights.position(id), Some(Vec3::new(1.0, 2.0, 3.0)));
    let forward = lights.orientation(id).unwrap() * Vec3::NEG_Z;
    assert!(forward.abs_diff_eq(rotation * Vec3::NEG_Z, 1e-5));
}

// ============================================================================
// QUERIES
// ============================================================================

#[test]
fn test_frustum_query_keeps_touching_point_and_spot_lights() {
    let mut scene = Scene::new();
    let mut lights = LightManager::default();
    let list = entities(&mut scene, 5);

    let sun = lights.add_light(list[0]);
    let ahead = point_light_at(&mut lights, list[1], Vec3::new(0.0, 0.0, -10.0), 1.0);
    let behind = point_light_at(&mut lights, list[2], Vec3::new(0.0, 0.0, 10.0), 1.0);
    let straddling = point_light_at(&mut lights, list[3], Vec3::new(0.0, 0.0, 2.0), 3.0);
    let spot = point_light_at(&mut lights, list[4], Vec3::new(1.0, 0.0, -5.0), 0.5);
    lights.set_light_type(spot, LightType::Spot).unwrap();

    let mut visible = vec![LightId(99)];
    lights.non_directional_lights_within_frustum(&forward_frustum(), &mut visible);

    assert_eq!(visible, vec![ahead, straddling, spot]);
    assert!(!visible.contains(&behind));
    assert!(!visible.contains(&sun));
}

#[test]
fn test_directional_lights_are_listed_separately() {
    let mut scene = Scene::new();
    let mut lights = LightManager::default();
    let list = entities(&mut scene, 3);
    let sun = lights.add_light(list[0]);
    point_light_at(&mut lights, list[1], Vec3::ZERO, 1.0);
    let moon = lights.add_light(list[2]);

    let mut directional = Vec::new();
    lights.directional_lights(&mut directional);

    assert_eq!(directional, vec![sun, moon]);
}

#[test]
fn test_frustum_query_on_empty_store() {
    let mut lights = LightManager::default();
    let mut visible = vec![LightId(1)];

    lights.non_directional_lights_within_frustum(&forward_frustum(), &mut visible);

    assert!(visible.is_empty());
}
