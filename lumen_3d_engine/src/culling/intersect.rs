//! Batched frustum tests writing one visibility bit per object.
//!
//! Every index in `0..count` receives a definite bit: 1 when the bound is
//! inside or intersecting the frustum, 0 when it lies fully outside any
//! plane. Results depend only on geometry.

use glam::Vec3;
use crate::camera::Frustum;
use crate::scene::AABB;
use crate::utils::bit_pack::{self, PackWord};

/// Test `bounds[..count]` against `frustum` into `out`
///
/// `out` must hold at least `bit_pack::calculate_required(count)` packs.
pub fn frustum_aabb<W: PackWord>(frustum: &Frustum, count: u32, bounds: &[AABB], out: &mut [W]) {
    debug_assert!(bounds.len() >= count as usize);
    debug_assert!(out.len() >= bit_pack::calculate_required::<W>(count));

    for (index, aabb) in bounds[..count as usize].iter().enumerate() {
        bit_pack::set(out, index as u32, frustum.intersects_aabb(aabb));
    }
}

/// Test spheres (`positions[i]`, `radii[i]`) against `frustum` into `out`
pub fn frustum_sphere<W: PackWord>(
    frustum: &Frustum,
    count: u32,
    positions: &[Vec3],
    radii: &[f32],
    out: &mut [W],
) {
    debug_assert!(positions.len() >= count as usize && radii.len() >= count as usize);
    debug_assert!(out.len() >= bit_pack::calculate_required::<W>(count));

    let spheres = positions.iter().zip(radii).take(count as usize);
    for (index, (&center, &radius)) in spheres.enumerate() {
        bit_pack::set(out, index as u32, frustum.intersects_sphere(center, radius));
    }
}

#[cfg(test)]
#[path = "intersect_tests.rs"]
mod tests;
