//! Texture manager - driver textures keyed by name hash.

use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::TextureTarget;
use crate::utils::hash_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureData {
    /// Driver texture name
    pub driver_id: u32,
    pub target: TextureTarget,
}

pub struct TextureManager {
    textures: FxHashMap<u32, TextureData>,
}

impl TextureManager {
    pub fn new() -> Self {
        Self { textures: FxHashMap::default() }
    }

    /// Register an uploaded texture, returning its name hash
    pub fn add_texture(&mut self, name: &str, data: TextureData) -> Result<u32> {
        let name_hash = hash_name(name);
        if self.textures.contains_key(&name_hash) {
            engine_bail!("lumen3d::TextureManager", "Texture '{}' already exists", name);
        }
        self.textures.insert(name_hash, data);
        Ok(name_hash)
    }

    pub fn texture(&self, name_hash: u32) -> Option<&TextureData> {
        self.textures.get(&name_hash)
    }

    pub fn texture_by_name(&self, name: &str) -> Option<&TextureData> {
        self.texture(hash_name(name))
    }

    pub fn remove_texture(&mut self, name_hash: u32) -> Option<TextureData> {
        self.textures.remove(&name_hash)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl Default for TextureManager {
    fn default() -> Self {
        Self::new()
    }
}
