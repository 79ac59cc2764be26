//! Light store
//!
//! Structure of arrays with one slot per light, laid out like the
//! render-object store: slot 0 is the null light, capacity is a power of
//! two and ids never move. Positions and orientations follow the owning
//! entity through `notify_updated_transforms`.

use glam::{Mat3, Mat4, Vec3};
use rustc_hash::FxHashMap;
use crate::camera::Frustum;
use crate::culling::intersect;
use crate::error::Result;
use crate::scene::Entity;
use crate::utils::BitPackSet;
use crate::{engine_bail, engine_debug};

/// Slots allocated by `LightManager::default`
const DEFAULT_CAPACITY: u32 = 16;

/// Dense index of a light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LightId(pub u32);

impl LightId {
    pub const NULL: LightId = LightId(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightType {
    #[default]
    Directional,
    Point,
    Spot,
}

/// Radius where a light of `color` falls below 5/256 of its peak
pub fn default_radius(color: Vec3) -> f32 {
    const THRESHOLD_INV: f32 = 256.0 / 5.0;
    (color.max_element() * THRESHOLD_INV).sqrt()
}

pub struct LightManager {
    /// Next free slot; live lights occupy 1..count
    count: u32,
    allocated: u32,

    entities: Vec<Entity>,
    types: Vec<LightType>,
    positions: Vec<Vec3>,
    orientations: Vec<Mat3>,
    colors: Vec<Vec3>,
    radii: Vec<f32>,
    /// Spot cone angle in radians
    angles: Vec<f32>,
    shadow_casting: Vec<bool>,

    entity_map: FxHashMap<Entity, LightId>,
    /// Scratch bits of the last frustum query
    intersected: BitPackSet,
}

impl LightManager {
    pub fn new(initial_capacity: u32) -> Self {
        let mut lights = Self {
            count: 1,
            allocated: 0,
            entities: Vec::new(),
            types: Vec::new(),
            positions: Vec::new(),
            orientations: Vec::new(),
            colors: Vec::new(),
            radii: Vec::new(),
            angles: Vec::new(),
            shadow_casting: Vec::new(),
            entity_map: FxHashMap::default(),
            intersected: BitPackSet::default(),
        };
        lights.reallocate(initial_capacity.max(2));
        lights
    }

    fn reallocate(&mut self, required: u32) {
        let capacity = required.next_power_of_two();
        let len = capacity as usize;

        self.entities.resize(len, Entity::default());
        self.types.resize(len, LightType::Directional);
        self.positions.resize(len, Vec3::ZERO);
        self.orientations.resize(len, Mat3::IDENTITY);
        self.colors.resize(len, Vec3::ONE);
        self.radii.resize(len, 0.0);
        self.angles.resize(len, 0.0);
        self.shadow_casting.resize(len, false);

        if self.allocated != 0 {
            engine_debug!("lumen3d::LightManager", "Light store grown from {} to {} slots", self.allocated, capacity);
        }
        self.allocated = capacity;
    }

    // ===== ADD / LOOKUP =====

    /// Add a white directional light for `entity`
    ///
    /// An entity that already has a light keeps its id.
    pub fn add_light(&mut self, entity: Entity) -> LightId {
        if let Some(&id) = self.entity_map.get(&entity) {
            return id;
        }
        if self.count + 1 > self.allocated {
            self.reallocate(self.count + 1);
        }

        let id = LightId(self.count);
        let slot = id.0 as usize;
        self.entities[slot] = entity;
        self.types[slot] = LightType::Directional;
        self.positions[slot] = Vec3::ZERO;
        self.orientations[slot] = Mat3::IDENTITY;
        self.colors[slot] = Vec3::ONE;
        self.radii[slot] = default_radius(Vec3::ONE);
        self.angles[slot] = 0.0;
        self.shadow_casting[slot] = false;
        self.entity_map.insert(entity, id);
        self.count += 1;
        id
    }

    pub fn add_lights(&mut self, entities: &[Entity]) -> Vec<LightId> {
        let required = self.count + entities.len() as u32;
        if required > self.allocated {
            self.reallocate(required);
        }
        entities.iter().map(|&entity| self.add_light(entity)).collect()
    }

    /// Light of `entity`, or the null id
    pub fn lookup(&self, entity: Entity) -> LightId {
        self.entity_map.get(&entity).copied().unwrap_or(LightId::NULL)
    }

    fn is_valid(&self, id: LightId) -> bool {
        !id.is_null() && id.0 < self.count
    }

    fn slot(&self, id: LightId) -> Result<usize> {
        if !self.is_valid(id) {
            engine_bail!("lumen3d::LightManager", "Light {} does not exist", id.0);
        }
        Ok(id.0 as usize)
    }

    /// Number of live lights
    pub fn len(&self) -> usize {
        (self.count - 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 1
    }

    pub fn allocated(&self) -> u32 {
        self.allocated
    }

    // ===== PROPERTIES =====

    pub fn entity(&self, id: LightId) -> Option<Entity> {
        self.is_valid(id).then(|| self.entities[id.0 as usize])
    }

    pub fn light_type(&self, id: LightId) -> Option<LightType> {
        self.is_valid(id).then(|| self.types[id.0 as usize])
    }

    pub fn set_light_type(&mut self, id: LightId, light_type: LightType) -> Result<()> {
        let slot = self.slot(id)?;
        self.types[slot] = light_type;
        Ok(())
    }

    pub fn color(&self, id: LightId) -> Option<Vec3> {
        self.is_valid(id).then(|| self.colors[id.0 as usize])
    }

    /// Set the color and reset the radius to `default_radius(color)`
    pub fn set_color(&mut self, id: LightId, color: Vec3) -> Result<()> {
        let slot = self.slot(id)?;
        self.colors[slot] = color;
        self.radii[slot] = default_radius(color);
        Ok(())
    }

    pub fn radius(&self, id: LightId) -> Option<f32> {
        self.is_valid(id).then(|| self.radii[id.0 as usize])
    }

    pub fn set_radius(&mut self, id: LightId, radius: f32) -> Result<()> {
        let slot = self.slot(id)?;
        self.radii[slot] = radius;
        Ok(())
    }

    pub fn spot_angle(&self, id: LightId) -> Option<f32> {
        self.is_valid(id).then(|| self.angles[id.0 as usize])
    }

    pub fn set_spot_angle(&mut self, id: LightId, angle: f32) -> Result<()> {
        let slot = self.slot(id)?;
        self.angles[slot] = angle;
        Ok(())
    }

    pub fn is_shadow_casting(&self, id: LightId) -> Option<bool> {
        self.is_valid(id).then(|| self.shadow_casting[id.0 as usize])
    }

    pub fn set_shadow_casting(&mut self, id: LightId, casting: bool) -> Result<()> {
        let slot = self.slot(id)?;
        self.shadow_casting[slot] = casting;
        Ok(())
    }

    /// World position, taken from the last transform update
    pub fn position(&self, id: LightId) -> Option<Vec3> {
        self.is_valid(id).then(|| self.positions[id.0 as usize])
    }

    /// World rotation and scale, taken from the last transform update
    pub fn orientation(&self, id: LightId) -> Option<Mat3> {
        self.is_valid(id).then(|| self.orientations[id.0 as usize])
    }

    // ===== TRANSFORM UPDATES =====

    /// Move lights of mapped entities; other entities are ignored
    pub fn notify_updated_transforms(&mut self, entities: &[Entity], transforms: &[Mat4]) {
        for (entity, transform) in entities.iter().zip(transforms) {
            let Some(&id) = self.entity_map.get(entity) else {
                continue;
            };
            let slot = id.0 as usize;
            self.positions[slot] = transform.w_axis.truncate();
            self.orientations[slot] = Mat3::from_mat4(*transform);
        }
    }

    // ===== QUERIES =====

    /// Every directional light, in id order
    pub fn directional_lights(&self, output: &mut Vec<LightId>) {
        output.clear();
        output.extend(
            (1..self.count)
                .filter(|&i| self.types[i as usize] == LightType::Directional)
                .map(LightId),
        );
    }

    /// Point and spot lights whose sphere touches `frustum`, in id order
    pub fn non_directional_lights_within_frustum(&mut self, frustum: &Frustum, output: &mut Vec<LightId>) {
        output.clear();
        let lights = self.count - 1;
        if lights == 0 {
            return;
        }

        // Bit i - 1 belongs to light i
        let end = self.count as usize;
        self.intersected.reset(lights);
        intersect::frustum_sphere(
            frustum,
            lights,
            &self.positions[1..end],
            &self.radii[1..end],
            self.intersected.packs_mut(),
        );

        output.extend(
            (1..self.count)
                .filter(|&i| self.types[i as usize] != LightType::Directional)
                .filter(|&i| self.intersected.get(i - 1))
                .map(LightId),
        );
    }
}

impl Default for LightManager {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
#[path = "light_manager_tests.rs"]
mod tests;
