//! Graphics device trait - the GPU driver binding layer
//!
//! Every control command of the renderer maps onto exactly one state
//! method here. Objects are identified by the driver's `u32` names, with
//! 0 meaning "none" (e.g. the default framebuffer).

use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::error::Result;
use super::types::{
    ClearMask, DepthFunction, FramebufferDesc, FramebufferTarget, Filter,
    IndexType, PrimitiveMode, Rect, TextureDesc, TextureTarget,
};

pub trait GraphicsDevice: Send {
    // ===== RESOURCES =====

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<u32>;

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<u32>;

    /// Completeness check of a framebuffer after its attachments are set
    fn is_framebuffer_complete(&mut self, framebuffer: u32) -> Result<bool>;

    fn delete_texture(&mut self, texture: u32) -> Result<()>;

    fn delete_framebuffer(&mut self, framebuffer: u32) -> Result<()>;

    // ===== PIPELINE STATE =====

    fn blending_enable(&mut self) -> Result<()>;
    fn blending_disable(&mut self) -> Result<()>;

    fn viewport(&mut self, rect: Rect) -> Result<()>;
    fn depth_range(&mut self, near: f64, far: f64) -> Result<()>;

    fn depth_test_enable(&mut self) -> Result<()>;
    fn depth_test_disable(&mut self) -> Result<()>;
    fn depth_test_function(&mut self, function: DepthFunction) -> Result<()>;

    fn depth_write_enable(&mut self) -> Result<()>;
    fn depth_write_disable(&mut self) -> Result<()>;

    fn cull_face_enable(&mut self) -> Result<()>;
    fn cull_face_disable(&mut self) -> Result<()>;
    fn cull_face_front(&mut self) -> Result<()>;
    fn cull_face_back(&mut self) -> Result<()>;

    /// Clear the buffers of the bound framebuffer
    fn clear(&mut self, mask: ClearMask) -> Result<()>;
    fn clear_color(&mut self, color: Vec4) -> Result<()>;
    fn clear_depth(&mut self, depth: f32) -> Result<()>;

    fn bind_framebuffer(&mut self, target: FramebufferTarget, framebuffer: u32) -> Result<()>;

    /// Copy `src` of the read framebuffer into `dst` of the draw framebuffer
    fn blit_framebuffer(&mut self, src: Rect, dst: Rect, mask: ClearMask, filter: Filter) -> Result<()>;

    // ===== DRAWING =====

    fn use_program(&mut self, program: u32) -> Result<()>;

    fn set_uniform_mat4(&mut self, location: i32, value: &Mat4) -> Result<()>;
    fn set_uniform_vec4(&mut self, location: i32, value: Vec4) -> Result<()>;
    fn set_uniform_vec3(&mut self, location: i32, value: Vec3) -> Result<()>;
    fn set_uniform_vec2(&mut self, location: i32, value: Vec2) -> Result<()>;
    fn set_uniform_float(&mut self, location: i32, value: f32) -> Result<()>;
    fn set_uniform_int(&mut self, location: i32, value: i32) -> Result<()>;

    /// Bind `texture` to texture unit `unit`
    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: u32) -> Result<()>;

    fn bind_vertex_array(&mut self, vertex_array: u32) -> Result<()>;

    /// Draw `count` indices from the bound vertex array
    fn draw_indexed(&mut self, mode: PrimitiveMode, count: u32, index_type: IndexType) -> Result<()>;
}
