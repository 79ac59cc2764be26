//! Resource management module
//!
//! Minimal in-memory managers for the resources the renderer consumes.
//! Lookups return `Option`; a missing resource never reaches the GPU.

mod resource_table;
mod resource_manager;
pub mod mesh;
pub mod shader;
pub mod texture;
pub mod material;

pub use resource_manager::ResourceManager;
pub use mesh::{MeshId, MeshData, MeshDrawData, MeshManager};
pub use shader::{ShaderId, ShaderDesc, ShaderData, ShaderManager, TransformUniforms};
pub use texture::{TextureData, TextureManager};
pub use material::{
    MaterialId, MaterialDesc, MaterialData, MaterialUniform, MaterialManager, UniformValue,
};
