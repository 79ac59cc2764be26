//! Render-object store
//!
//! Structure of arrays with one slot per render object. Slot 0 is the null
//! object and is never handed out. Slots only grow: capacity is always a
//! power of two and an entity keeps its `RenderObjectId` for the lifetime
//! of the store. Access goes through ids, never through references held
//! across an add.

use glam::Mat4;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::resource::{MeshId, MeshManager};
use crate::scene::{Entity, AABB};
use crate::{engine_bail, engine_debug};
use super::render_command::RenderPass;
use super::render_order::{RenderOrderData, CALLBACK_MATERIAL, RENDER_OBJECT};

/// Dense index of a render object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RenderObjectId(pub u32);

impl RenderObjectId {
    pub const NULL: RenderObjectId = RenderObjectId(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

pub struct RenderObjects {
    /// Next free slot; live objects occupy 1..count
    count: u32,
    allocated: u32,

    entities: Vec<Entity>,
    meshes: Vec<MeshId>,
    orders: Vec<RenderOrderData>,
    /// World-space bounds
    bounds: Vec<AABB>,
    transforms: Vec<Mat4>,

    entity_map: FxHashMap<Entity, RenderObjectId>,
}

impl RenderObjects {
    /// Empty store with room for `initial_capacity` slots
    pub fn new(initial_capacity: u32) -> Self {
        let mut objects = Self {
            count: 1,
            allocated: 0,
            entities: Vec::new(),
            meshes: Vec::new(),
            orders: Vec::new(),
            bounds: Vec::new(),
            transforms: Vec::new(),
            entity_map: FxHashMap::default(),
        };
        objects.reallocate(initial_capacity.max(2));
        objects
    }

    /// Grow every array to the next power of two holding `required` slots
    fn reallocate(&mut self, required: u32) {
        let capacity = required.next_power_of_two();
        let len = capacity as usize;

        self.entities.resize(len, Entity::default());
        self.meshes.resize(len, MeshId::NULL);
        self.orders.resize(len, RenderOrderData::default());
        self.bounds.resize(len, AABB::default());
        self.transforms.resize(len, Mat4::IDENTITY);

        let additional = len.saturating_sub(self.entity_map.len());
        self.entity_map.reserve(additional);

        if self.allocated != 0 {
            engine_debug!(
                "lumen3d::RenderObjects",
                "Render object store grown from {} to {} slots",
                self.allocated,
                capacity
            );
        }
        self.allocated = capacity;
    }

    // ===== ADD / LOOKUP =====

    /// Add one render object for `entity`
    ///
    /// An entity that already has a render object keeps its id.
    pub fn add_render_object(&mut self, entity: Entity) -> RenderObjectId {
        if let Some(&id) = self.entity_map.get(&entity) {
            return id;
        }

        let required = self.count + 1;
        if required > self.allocated {
            self.reallocate(required);
        }
        debug_assert!(
            (self.count as u64) <= RENDER_OBJECT.max_value(),
            "render object index overflows the order key"
        );

        let id = RenderObjectId(self.count);
        let slot = id.0 as usize;
        self.entities[slot] = entity;
        self.meshes[slot] = MeshId::NULL;
        self.orders[slot] = RenderOrderData::default();
        self.bounds[slot] = AABB::default();
        self.transforms[slot] = Mat4::IDENTITY;
        self.entity_map.insert(entity, id);
        self.count += 1;
        id
    }

    /// Add render objects for `entities`, growing at most once
    pub fn add_render_objects(&mut self, entities: &[Entity]) -> Vec<RenderObjectId> {
        let required = self.count + entities.len() as u32;
        if required > self.allocated {
            self.reallocate(required);
        }
        entities.iter().map(|&entity| self.add_render_object(entity)).collect()
    }

    /// Render object of `entity`, or the null id
    pub fn lookup(&self, entity: Entity) -> RenderObjectId {
        self.entity_map.get(&entity).copied().unwrap_or(RenderObjectId::NULL)
    }

    fn is_valid(&self, id: RenderObjectId) -> bool {
        !id.is_null() && id.0 < self.count
    }

    // ===== SIZES =====

    /// One past the last live slot (slot 0 included)
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Number of live render objects
    pub fn len(&self) -> usize {
        (self.count - 1) as usize
    }

    /// No render object added yet
    pub fn is_empty(&self) -> bool {
        self.count == 1
    }

    /// Slots allocated, always a power of two
    pub fn allocated(&self) -> u32 {
        self.allocated
    }

    // ===== PROPERTIES =====

    /// Entity owning `id`
    pub fn entity(&self, id: RenderObjectId) -> Option<Entity> {
        self.is_valid(id).then(|| self.entities[id.0 as usize])
    }

    /// Mesh drawn for `id`; null until `set_mesh_id`
    pub fn mesh_id(&self, id: RenderObjectId) -> Option<MeshId> {
        self.is_valid(id).then(|| self.meshes[id.0 as usize])
    }

    /// Change the mesh and refit the bounds to the current transform
    pub fn set_mesh_id(&mut self, id: RenderObjectId, mesh: MeshId, meshes: &MeshManager) -> Result<()> {
        if !self.is_valid(id) {
            engine_bail!("lumen3d::RenderObjects", "Render object {} does not exist", id.0);
        }
        let slot = id.0 as usize;
        self.meshes[slot] = mesh;
        self.bounds[slot] = Self::world_bounds(meshes, mesh, &self.transforms[slot]);
        Ok(())
    }

    /// Material and pass used to sort the draws of `id`
    pub fn order_data(&self, id: RenderObjectId) -> Option<RenderOrderData> {
        self.is_valid(id).then(|| self.orders[id.0 as usize])
    }

    /// Set the material and pass of `id`
    ///
    /// The lighting pass belongs to the renderer, and the last material id
    /// is reserved for custom renderer callbacks; both are rejected.
    pub fn set_order_data(&mut self, id: RenderObjectId, order: RenderOrderData) -> Result<()> {
        if !self.is_valid(id) {
            engine_bail!("lumen3d::RenderObjects", "Render object {} does not exist", id.0);
        }
        if order.transparency == RenderPass::OpaqueLighting {
            engine_bail!("lumen3d::RenderObjects",
                "Render object {} cannot be drawn in the lighting pass", id.0);
        }
        if order.material.0 as u64 >= CALLBACK_MATERIAL {
            engine_bail!("lumen3d::RenderObjects",
                "Material {} of render object {} is out of the order key range", order.material.0, id.0);
        }
        self.orders[id.0 as usize] = order;
        Ok(())
    }

    /// World-space bounds of `id`
    pub fn bounds(&self, id: RenderObjectId) -> Option<&AABB> {
        self.is_valid(id).then(|| &self.bounds[id.0 as usize])
    }

    /// World transform of `id`
    pub fn transform(&self, id: RenderObjectId) -> Option<&Mat4> {
        self.is_valid(id).then(|| &self.transforms[id.0 as usize])
    }

    // ===== SLICES (0..count) =====

    /// World bounds indexed by render object, null slot included
    pub fn all_bounds(&self) -> &[AABB] {
        &self.bounds[..self.count as usize]
    }

    /// World transforms indexed by render object
    pub fn all_transforms(&self) -> &[Mat4] {
        &self.transforms[..self.count as usize]
    }

    /// Order data indexed by render object
    pub fn all_orders(&self) -> &[RenderOrderData] {
        &self.orders[..self.count as usize]
    }

    /// Meshes indexed by render object
    pub fn all_meshes(&self) -> &[MeshId] {
        &self.meshes[..self.count as usize]
    }

    // ===== TRANSFORM UPDATES =====

    fn world_bounds(meshes: &MeshManager, mesh: MeshId, transform: &Mat4) -> AABB {
        meshes
            .bounding_box(mesh)
            .copied()
            .unwrap_or_default()
            .transformed(transform)
    }

    /// Store new world transforms and refit bounds of mapped entities
    ///
    /// Entities without a render object are ignored.
    pub fn notify_updated_transforms(&mut self, entities: &[Entity], transforms: &[Mat4], meshes: &MeshManager) {
        for (entity, transform) in entities.iter().zip(transforms) {
            let Some(&id) = self.entity_map.get(entity) else {
                continue;
            };
            let slot = id.0 as usize;
            self.bounds[slot] = Self::world_bounds(meshes, self.meshes[slot], transform);
            self.transforms[slot] = *transform;
        }
    }
}

impl Default for RenderObjects {
    fn default() -> Self {
        Self::new(512)
    }
}

#[cfg(test)]
#[path = "render_objects_tests.rs"]
mod tests;
