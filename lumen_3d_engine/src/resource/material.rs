//! Material manager - shader reference plus typed uniform values.
//!
//! Uniform locations are resolved against the material's shader when the
//! material is created, so replay never looks names up.

use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::error::Result;
use crate::{engine_bail, engine_err};
use crate::render::render_order::CALLBACK_MATERIAL;
use crate::utils::hash_name;
use super::resource_table::{resource_id, ResourceTable};
use super::shader::{ShaderId, ShaderManager};

resource_id!(
    /// Handle of a material in the `MaterialManager`
    MaterialId
);

/// Value bound to one material uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Name hash of a 2D texture in the `TextureManager`
    Tex2D(u32),
    /// Name hash of a cube texture in the `TextureManager`
    TexCube(u32),
    Mat4x4(Mat4),
    Vec4(Vec4),
    Vec3(Vec3),
    Vec2(Vec2),
    Float(f32),
    Int(i32),
}

impl UniformValue {
    pub fn is_texture(&self) -> bool {
        matches!(self, UniformValue::Tex2D(_) | UniformValue::TexCube(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialUniform {
    pub name_hash: u32,
    pub location: i32,
    pub value: UniformValue,
}

pub struct MaterialDesc {
    pub shader: ShaderId,
    pub uniforms: Vec<(String, UniformValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub shader: ShaderId,
    pub uniforms: Vec<MaterialUniform>,
}

pub struct MaterialManager {
    materials: ResourceTable<MaterialId, MaterialData>,
}

impl MaterialManager {
    pub fn new() -> Self {
        Self { materials: ResourceTable::new("Material") }
    }

    /// Create a material, resolving every uniform against its shader
    ///
    /// Fails once every id below the callback material is taken, since the
    /// order key could no longer tell the material from a callback.
    pub fn create_material(
        &mut self,
        name: &str,
        desc: MaterialDesc,
        shaders: &ShaderManager,
    ) -> Result<MaterialId> {
        let id = self.materials.next_id();
        if id.0 as u64 >= CALLBACK_MATERIAL {
            engine_bail!("lumen3d::MaterialManager",
                "Material '{}': all {} material ids are in use", name, CALLBACK_MATERIAL - 1);
        }

        let shader = shaders.shader(desc.shader).ok_or_else(|| engine_err!(
            "lumen3d::MaterialManager",
            "Material '{}': shader {:?} not found", name, desc.shader
        ))?;

        let mut uniforms = Vec::with_capacity(desc.uniforms.len());
        for (uniform, value) in desc.uniforms {
            let Some(location) = shader.uniform_location(&uniform) else {
                engine_bail!("lumen3d::MaterialManager",
                    "Material '{}': shader has no uniform '{}'", name, uniform);
            };
            uniforms.push(MaterialUniform {
                name_hash: hash_name(&uniform),
                location,
                value,
            });
        }

        self.materials.insert(name, MaterialData { shader: desc.shader, uniforms })
    }

    pub fn material(&self, id: MaterialId) -> Option<&MaterialData> {
        self.materials.get(id)
    }

    pub fn shader_id(&self, id: MaterialId) -> Option<ShaderId> {
        self.material(id).map(|material| material.shader)
    }

    pub fn id_by_name(&self, name: &str) -> Option<MaterialId> {
        self.materials.id_by_name(name)
    }

    /// Replace the value of an existing uniform
    pub fn set_uniform(&mut self, id: MaterialId, uniform: &str, value: UniformValue) -> Result<()> {
        let name_hash = hash_name(uniform);
        let slot = self
            .materials
            .get_mut(id)
            .and_then(|material| material.uniforms.iter_mut().find(|u| u.name_hash == name_hash));

        match slot {
            Some(slot) => {
                slot.value = value;
                Ok(())
            }
            None => engine_bail!("lumen3d::MaterialManager",
                "Material {:?} has no uniform '{}'", id, uniform),
        }
    }

    pub fn remove_material(&mut self, id: MaterialId) -> Option<MaterialData> {
        self.materials.remove(id)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
