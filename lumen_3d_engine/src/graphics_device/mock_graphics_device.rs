//! Recording graphics device for unit tests (no GPU required)
//!
//! Every call is appended to `calls` as a short string so tests can assert
//! the exact sequence the renderer issued.

use glam::{Mat4, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_bail;
use super::graphics_device::GraphicsDevice;
use super::types::{
    ClearMask, DepthFunction, FramebufferDesc, FramebufferTarget, Filter,
    IndexType, PrimitiveMode, Rect, TextureDesc, TextureTarget,
};

pub struct MockGraphicsDevice {
    pub calls: Vec<String>,
    /// Last matrix uploaded per uniform location
    pub mat4_uniforms: FxHashMap<i32, Mat4>,
    /// Answer of `is_framebuffer_complete`
    pub framebuffers_complete: bool,
    /// Name of a method that fails instead of recording
    pub fail_on: Option<&'static str>,
    next_id: u32,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            mat4_uniforms: FxHashMap::default(),
            framebuffers_complete: true,
            fail_on: None,
            next_id: 1,
        }
    }

    /// Calls whose name starts with `prefix`
    pub fn calls_named(&self, prefix: &str) -> Vec<&str> {
        self.calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, name: &'static str, call: String) -> Result<()> {
        if self.fail_on == Some(name) {
            engine_bail!("lumen3d::mock", "{} failed", name);
        }
        self.calls.push(call);
        Ok(())
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

pub fn mask_str(mask: ClearMask) -> String {
    let names: Vec<&str> = mask.iter_names().map(|(name, _)| name).collect();
    names.join("|")
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<u32> {
        self.record(
            "create_texture",
            format!("create_texture({}x{} {:?})", desc.width, desc.height, desc.format),
        )?;
        Ok(self.allocate())
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<u32> {
        self.record(
            "create_framebuffer",
            format!("create_framebuffer({:?}, {:?})", desc.color_attachments, desc.depth_attachment),
        )?;
        Ok(self.allocate())
    }

    fn is_framebuffer_complete(&mut self, framebuffer: u32) -> Result<bool> {
        self.record("is_framebuffer_complete", format!("is_framebuffer_complete({})", framebuffer))?;
        Ok(self.framebuffers_complete)
    }

    fn delete_texture(&mut self, texture: u32) -> Result<()> {
        self.record("delete_texture", format!("delete_texture({})", texture))
    }

    fn delete_framebuffer(&mut self, framebuffer: u32) -> Result<()> {
        self.record("delete_framebuffer", format!("delete_framebuffer({})", framebuffer))
    }

    fn blending_enable(&mut self) -> Result<()> {
        self.record("blending_enable", "blending_enable".to_string())
    }

    fn blending_disable(&mut self) -> Result<()> {
        self.record("blending_disable", "blending_disable".to_string())
    }

    fn viewport(&mut self, rect: Rect) -> Result<()> {
        self.record(
            "viewport",
            format!("viewport({}, {}, {}, {})", rect.x, rect.y, rect.width, rect.height),
        )
    }

    fn depth_range(&mut self, near: f64, far: f64) -> Result<()> {
        self.record("depth_range", format!("depth_range({}, {})", near, far))
    }

    fn depth_test_enable(&mut self) -> Result<()> {
        self.record("depth_test_enable", "depth_test_enable".to_string())
    }

    fn depth_test_disable(&mut self) -> Result<()> {
        self.record("depth_test_disable", "depth_test_disable".to_string())
    }

    fn depth_test_function(&mut self, function: DepthFunction) -> Result<()> {
        self.record("depth_test_function", format!("depth_test_function({:?})", function))
    }

    fn depth_write_enable(&mut self) -> Result<()> {
        self.record("depth_write_enable", "depth_write_enable".to_string())
    }

    fn depth_write_disable(&mut self) -> Result<()> {
        self.record("depth_write_disable", "depth_write_disable".to_string())
    }

    fn cull_face_enable(&mut self) -> Result<()> {
        self.record("cull_face_enable", "cull_face_enable".to_string())
    }

    fn cull_face_disable(&mut self) -> Result<()> {
        self.record("cull_face_disable", "cull_face_disable".to_string())
    }

    fn cull_face_front(&mut self) -> Result<()> {
        self.record("cull_face_front", "cull_face_front".to_string())
    }

    fn cull_face_back(&mut self) -> Result<()> {
        self.record("cull_face_back", "cull_face_back".to_string())
    }

    fn clear(&mut self, mask: ClearMask) -> Result<()> {
        self.record("clear", format!("clear({})", mask_str(mask)))
    }

    fn clear_color(&mut self, color: Vec4) -> Result<()> {
        self.record(
            "clear_color",
            format!("clear_color({}, {}, {}, {})", color.x, color.y, color.z, color.w),
        )
    }

    fn clear_depth(&mut self, depth: f32) -> Result<()> {
        self.record("clear_depth", format!("clear_depth({})", depth))
    }

    fn bind_framebuffer(&mut self, target: FramebufferTarget, framebuffer: u32) -> Result<()> {
        self.record("bind_framebuffer", format!("bind_framebuffer({:?}, {})", target, framebuffer))
    }

    fn blit_framebuffer(&mut self, src: Rect, dst: Rect, mask: ClearMask, filter: Filter) -> Result<()> {
        self.record(
            "blit_framebuffer",
            format!(
                "blit_framebuffer({}x{} -> {}x{}, {}, {:?})",
                src.width, src.height, dst.width, dst.height, mask_str(mask), filter
            ),
        )
    }

    fn use_program(&mut self, program: u32) -> Result<()> {
        self.record("use_program", format!("use_program({})", program))
    }

    fn set_uniform_mat4(&mut self, location: i32, value: &Mat4) -> Result<()> {
        self.record("set_uniform_mat4", format!("set_uniform_mat4({})", location))?;
        self.mat4_uniforms.insert(location, *value);
        Ok(())
    }

    fn set_uniform_vec4(&mut self, location: i32, value: Vec4) -> Result<()> {
        self.record(
            "set_uniform_vec4",
            format!("set_uniform_vec4({}, {}, {}, {}, {})", location, value.x, value.y, value.z, value.w),
        )
    }

    fn set_uniform_vec3(&mut self, location: i32, value: Vec3) -> Result<()> {
        self.record(
            "set_uniform_vec3",
            format!("set_uniform_vec3({}, {}, {}, {})", location, value.x, value.y, value.z),
        )
    }

    fn set_uniform_vec2(&mut self, location: i32, value: Vec2) -> Result<()> {
        self.record("set_uniform_vec2", format!("set_uniform_vec2({}, {}, {})", location, value.x, value.y))
    }

    fn set_uniform_float(&mut self, location: i32, value: f32) -> Result<()> {
        self.record("set_uniform_float", format!("set_uniform_float({}, {})", location, value))
    }

    fn set_uniform_int(&mut self, location: i32, value: i32) -> Result<()> {
        self.record("set_uniform_int", format!("set_uniform_int({}, {})", location, value))
    }

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: u32) -> Result<()> {
        self.record("bind_texture", format!("bind_texture({}, {:?}, {})", unit, target, texture))
    }

    fn bind_vertex_array(&mut self, vertex_array: u32) -> Result<()> {
        self.record("bind_vertex_array", format!("bind_vertex_array({})", vertex_array))
    }

    fn draw_indexed(&mut self, mode: PrimitiveMode, count: u32, index_type: IndexType) -> Result<()> {
        self.record("draw_indexed", format!("draw_indexed({:?}, {}, {:?})", mode, count, index_type))
    }
}
