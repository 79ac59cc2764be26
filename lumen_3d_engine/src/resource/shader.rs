//! Shader manager - linked programs and their uniform tables.
//!
//! Compilation and linking happen outside the engine; a shader is
//! registered with its driver program name and the locations of its
//! active uniforms.

use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::utils::hash_name;
use super::resource_table::{resource_id, ResourceTable};

resource_id!(
    /// Handle of a shader in the `ShaderManager`
    ShaderId
);

/// Uniform names of the standard per-draw transforms
pub const UNIFORM_MODEL: &str = "_M";
pub const UNIFORM_VIEW: &str = "_V";
pub const UNIFORM_PROJECTION: &str = "_P";
pub const UNIFORM_MODEL_VIEW: &str = "_MV";
pub const UNIFORM_VIEW_PROJECTION: &str = "_VP";
pub const UNIFORM_MODEL_VIEW_PROJECTION: &str = "_MVP";

/// Locations of the standard transform uniforms a shader declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformUniforms {
    pub m: Option<i32>,
    pub v: Option<i32>,
    pub p: Option<i32>,
    pub mv: Option<i32>,
    pub vp: Option<i32>,
    pub mvp: Option<i32>,
}

pub struct ShaderDesc {
    /// Driver program name
    pub program: u32,
    /// Active uniforms and their locations
    pub uniforms: Vec<(String, i32)>,
}

#[derive(Debug, Clone)]
pub struct ShaderData {
    pub name_hash: u32,
    pub program: u32,
    /// Uniform locations keyed by name hash
    pub uniform_locations: FxHashMap<u32, i32>,
    pub transforms: TransformUniforms,
}

impl ShaderData {
    pub fn uniform_location(&self, name: &str) -> Option<i32> {
        self.uniform_locations.get(&hash_name(name)).copied()
    }
}

pub struct ShaderManager {
    shaders: ResourceTable<ShaderId, ShaderData>,
    ids_by_hash: FxHashMap<u32, ShaderId>,
}

impl ShaderManager {
    pub fn new() -> Self {
        Self {
            shaders: ResourceTable::new("Shader"),
            ids_by_hash: FxHashMap::default(),
        }
    }

    pub fn create_shader(&mut self, name: &str, desc: ShaderDesc) -> Result<ShaderId> {
        let uniform_locations: FxHashMap<u32, i32> = desc
            .uniforms
            .iter()
            .map(|(uniform, location)| (hash_name(uniform), *location))
            .collect();

        let find = |uniform: &str| uniform_locations.get(&hash_name(uniform)).copied();
        let transforms = TransformUniforms {
            m: find(UNIFORM_MODEL),
            v: find(UNIFORM_VIEW),
            p: find(UNIFORM_PROJECTION),
            mv: find(UNIFORM_MODEL_VIEW),
            vp: find(UNIFORM_VIEW_PROJECTION),
            mvp: find(UNIFORM_MODEL_VIEW_PROJECTION),
        };

        let name_hash = hash_name(name);
        let id = self.shaders.insert(name, ShaderData {
            name_hash,
            program: desc.program,
            uniform_locations,
            transforms,
        })?;
        self.ids_by_hash.insert(name_hash, id);

        crate::engine_debug!("lumen3d::ShaderManager", "Shader '{}' registered (program {})", name, desc.program);
        Ok(id)
    }

    pub fn shader(&self, id: ShaderId) -> Option<&ShaderData> {
        self.shaders.get(id)
    }

    pub fn id_by_name(&self, name: &str) -> Option<ShaderId> {
        self.shaders.id_by_name(name)
    }

    pub fn id_by_hash(&self, name_hash: u32) -> Option<ShaderId> {
        self.ids_by_hash.get(&name_hash).copied()
    }

    pub fn uniform_location(&self, id: ShaderId, uniform: &str) -> Option<i32> {
        self.shader(id)?.uniform_location(uniform)
    }

    pub fn remove_shader(&mut self, id: ShaderId) -> Option<ShaderData> {
        let shader = self.shaders.remove(id)?;
        self.ids_by_hash.remove(&shader.name_hash);
        Some(shader)
    }

    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }
}

impl Default for ShaderManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
