//! Mesh manager - local bounds and cached draw parameters per mesh.
//!
//! Vertex data lives on the GPU; the manager only keeps what the renderer
//! needs to cull and draw a mesh.

use crate::error::Result;
use crate::graphics_device::{IndexType, PrimitiveMode};
use crate::scene::AABB;
use super::resource_table::{resource_id, ResourceTable};

resource_id!(
    /// Handle of a mesh in the `MeshManager`
    MeshId
);

/// Everything needed to issue the indexed draw of a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshDrawData {
    pub vertex_array: u32,
    pub index_count: u32,
    pub index_type: IndexType,
    pub primitive_mode: PrimitiveMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Local-space bounds
    pub bounds: AABB,
    pub draw: MeshDrawData,
}

pub struct MeshManager {
    meshes: ResourceTable<MeshId, MeshData>,
}

impl MeshManager {
    pub fn new() -> Self {
        Self { meshes: ResourceTable::new("Mesh") }
    }

    /// Register an uploaded mesh under a unique name
    pub fn create_mesh(&mut self, name: &str, data: MeshData) -> Result<MeshId> {
        self.meshes.insert(name, data)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id)
    }

    pub fn bounding_box(&self, id: MeshId) -> Option<&AABB> {
        self.meshes.get(id).map(|mesh| &mesh.bounds)
    }

    pub fn draw_data(&self, id: MeshId) -> Option<&MeshDrawData> {
        self.meshes.get(id).map(|mesh| &mesh.draw)
    }

    pub fn id_by_name(&self, name: &str) -> Option<MeshId> {
        self.meshes.id_by_name(name)
    }

    pub fn remove_mesh(&mut self, id: MeshId) -> Option<MeshData> {
        self.meshes.remove(id)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}

impl Default for MeshManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
