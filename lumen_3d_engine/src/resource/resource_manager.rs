//! Groups the mesh, shader, texture and material managers.
//!
//! The renderer receives one `ResourceManager` at construction and reads
//! every resource through it.

use crate::error::Result;
use super::material::{MaterialDesc, MaterialId, MaterialManager};
use super::mesh::MeshManager;
use super::shader::ShaderManager;
use super::texture::TextureManager;

#[derive(Default)]
pub struct ResourceManager {
    pub meshes: MeshManager,
    pub shaders: ShaderManager,
    pub textures: TextureManager,
    pub materials: MaterialManager,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a material whose uniforms are resolved against `self.shaders`
    pub fn create_material(&mut self, name: &str, desc: MaterialDesc) -> Result<MaterialId> {
        self.materials.create_material(name, desc, &self.shaders)
    }
}
