//! 32-bit name hashes used to key uniforms and textures.

use std::hash::Hasher;
use rustc_hash::FxHasher;

/// FxHash of `name`, truncated to 32 bits
pub fn hash_name(name: &str) -> u32 {
    let mut hasher = FxHasher::default();
    hasher.write(name.as_bytes());
    hasher.finish() as u32
}
