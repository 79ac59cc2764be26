//! Render command vocabulary
//!
//! Passes, command types, control opcodes and the typed `ControlCommand`
//! that a control key decodes to. Control commands with a payload larger
//! than the 32-bit key data field store a `#[repr(C)]` struct in the
//! command list's byte buffer; the others keep their argument inline.

use bytemuck::{Pod, Zeroable};
use glam::Vec4;
use crate::error::{Error, Result};
use crate::engine_bail;
use crate::graphics_device::{
    ClearMask, DepthFunction, Filter, FramebufferTarget, GraphicsDevice, Rect,
};

/// Shadow-casting light viewport
pub const VIEWPORT_LIGHT: u32 = 0;
/// Fullscreen camera viewport
pub const VIEWPORT_FULLSCREEN: u32 = 1;
/// Number of viewports addressable by an order key
pub const MAX_VIEWPORTS: u32 = 8;

// ===== PASSES =====

/// Stage within a viewport, in submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u32)]
pub enum RenderPass {
    /// Geometry into the shadow map or the G-buffer
    #[default]
    OpaqueGeometry = 0,
    /// Fullscreen deferred lighting
    OpaqueLighting = 2,
    Skybox = 3,
    /// Blended geometry, back to front
    Transparent = 4,
}

impl RenderPass {
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Pass ids with any bit above the two lowest are transparent
    pub fn is_transparent_id(pass: u32) -> bool {
        pass & 0xfc != 0
    }

    pub fn is_transparent(self) -> bool {
        Self::is_transparent_id(self.id())
    }
}

impl TryFrom<u32> for RenderPass {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(RenderPass::OpaqueGeometry),
            2 => Ok(RenderPass::OpaqueLighting),
            3 => Ok(RenderPass::Skybox),
            4 => Ok(RenderPass::Transparent),
            other => Err(Error::InvalidResource(format!("Unknown render pass {}", other))),
        }
    }
}

/// Discriminant bit of an order key
///
/// Control sorts before Draw inside the same viewport and pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RenderCommandType {
    Control = 0,
    Draw = 1,
}

// ===== CONTROL OPCODES =====

/// One opcode per state operation of the graphics device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ControlOpcode {
    BlendingEnable = 0,
    BlendingDisable = 1,
    Viewport = 2,
    DepthRange = 3,
    DepthTestEnable = 4,
    DepthTestDisable = 5,
    DepthTestFunction = 6,
    DepthWriteEnable = 7,
    DepthWriteDisable = 8,
    CullFaceEnable = 9,
    CullFaceDisable = 10,
    CullFaceFront = 11,
    CullFaceBack = 12,
    Clear = 13,
    ClearColor = 14,
    ClearDepth = 15,
    BindFramebuffer = 16,
    BlitFramebuffer = 17,
}

impl TryFrom<u32> for ControlOpcode {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        use ControlOpcode::*;
        const ALL: [ControlOpcode; 18] = [
            BlendingEnable, BlendingDisable, Viewport, DepthRange,
            DepthTestEnable, DepthTestDisable, DepthTestFunction,
            DepthWriteEnable, DepthWriteDisable,
            CullFaceEnable, CullFaceDisable, CullFaceFront, CullFaceBack,
            Clear, ClearColor, ClearDepth, BindFramebuffer, BlitFramebuffer,
        ];
        ALL.get(value as usize)
            .copied()
            .ok_or_else(|| Error::InvalidResource(format!("Unknown control opcode {}", value)))
    }
}

// ===== PAYLOADS =====

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ViewportPayload {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DepthRangePayload {
    pub near: f64,
    pub far: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ClearColorPayload {
    pub rgba: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BindFramebufferPayload {
    pub target: u32,
    pub framebuffer: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BlitFramebufferPayload {
    /// x, y, width, height
    pub src: [i32; 4],
    pub dst: [i32; 4],
    pub mask: u32,
    pub filter: u32,
}

fn rect_from(values: [i32; 4]) -> Rect {
    Rect { x: values[0], y: values[1], width: values[2], height: values[3] }
}

fn rect_to(rect: Rect) -> [i32; 4] {
    [rect.x, rect.y, rect.width, rect.height]
}

/// Where a control command keeps its argument
#[derive(Debug, Clone, PartialEq)]
pub enum ControlData {
    /// Fits in the key's data field
    Inline(u32),
    /// Copied into the command list's byte buffer
    Payload(Vec<u8>),
}

// ===== CONTROL COMMAND =====

/// Decoded control command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    BlendingEnable,
    BlendingDisable,
    Viewport(Rect),
    DepthRange { near: f64, far: f64 },
    DepthTestEnable,
    DepthTestDisable,
    DepthTestFunction(DepthFunction),
    DepthWriteEnable,
    DepthWriteDisable,
    CullFaceEnable,
    CullFaceDisable,
    CullFaceFront,
    CullFaceBack,
    Clear(ClearMask),
    ClearColor(Vec4),
    ClearDepth(f32),
    BindFramebuffer { target: FramebufferTarget, framebuffer: u32 },
    BlitFramebuffer { src: Rect, dst: Rect, mask: ClearMask, filter: Filter },
}

impl ControlCommand {
    pub fn opcode(&self) -> ControlOpcode {
        match self {
            ControlCommand::BlendingEnable => ControlOpcode::BlendingEnable,
            ControlCommand::BlendingDisable => ControlOpcode::BlendingDisable,
            ControlCommand::Viewport(_) => ControlOpcode::Viewport,
            ControlCommand::DepthRange { .. } => ControlOpcode::DepthRange,
            ControlCommand::DepthTestEnable => ControlOpcode::DepthTestEnable,
            ControlCommand::DepthTestDisable => ControlOpcode::DepthTestDisable,
            ControlCommand::DepthTestFunction(_) => ControlOpcode::DepthTestFunction,
            ControlCommand::DepthWriteEnable => ControlOpcode::DepthWriteEnable,
            ControlCommand::DepthWriteDisable => ControlOpcode::DepthWriteDisable,
            ControlCommand::CullFaceEnable => ControlOpcode::CullFaceEnable,
            ControlCommand::CullFaceDisable => ControlOpcode::CullFaceDisable,
            ControlCommand::CullFaceFront => ControlOpcode::CullFaceFront,
            ControlCommand::CullFaceBack => ControlOpcode::CullFaceBack,
            ControlCommand::Clear(_) => ControlOpcode::Clear,
            ControlCommand::ClearColor(_) => ControlOpcode::ClearColor,
            ControlCommand::ClearDepth(_) => ControlOpcode::ClearDepth,
            ControlCommand::BindFramebuffer { .. } => ControlOpcode::BindFramebuffer,
            ControlCommand::BlitFramebuffer { .. } => ControlOpcode::BlitFramebuffer,
        }
    }

    /// Split into the inline value or payload bytes stored by the command list
    pub fn encode(&self) -> ControlData {
        match *self {
            ControlCommand::Viewport(rect) => ControlData::Payload(
                bytemuck::bytes_of(&ViewportPayload {
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                })
                .to_vec(),
            ),
            ControlCommand::DepthRange { near, far } => ControlData::Payload(
                bytemuck::bytes_of(&DepthRangePayload { near, far }).to_vec(),
            ),
            ControlCommand::DepthTestFunction(function) => ControlData::Inline(function as u32),
            ControlCommand::Clear(mask) => ControlData::Inline(mask.bits()),
            ControlCommand::ClearColor(color) => ControlData::Payload(
                bytemuck::bytes_of(&ClearColorPayload { rgba: color.to_array() }).to_vec(),
            ),
            ControlCommand::ClearDepth(depth) => ControlData::Inline(depth.to_bits()),
            ControlCommand::BindFramebuffer { target, framebuffer } => ControlData::Payload(
                bytemuck::bytes_of(&BindFramebufferPayload { target: target as u32, framebuffer })
                    .to_vec(),
            ),
            ControlCommand::BlitFramebuffer { src, dst, mask, filter } => ControlData::Payload(
                bytemuck::bytes_of(&BlitFramebufferPayload {
                    src: rect_to(src),
                    dst: rect_to(dst),
                    mask: mask.bits(),
                    filter: filter as u32,
                })
                .to_vec(),
            ),
            _ => ControlData::Inline(0),
        }
    }

    /// Rebuild a command from its opcode, key data and the list's byte buffer
    ///
    /// For payload opcodes `data` is a byte offset into `buffer`.
    pub fn decode(opcode: ControlOpcode, data: u32, buffer: &[u8]) -> Result<Self> {
        Ok(match opcode {
            ControlOpcode::BlendingEnable => ControlCommand::BlendingEnable,
            ControlOpcode::BlendingDisable => ControlCommand::BlendingDisable,
            ControlOpcode::Viewport => {
                let p: ViewportPayload = read_payload(buffer, data)?;
                ControlCommand::Viewport(Rect { x: p.x, y: p.y, width: p.width, height: p.height })
            }
            ControlOpcode::DepthRange => {
                let p: DepthRangePayload = read_payload(buffer, data)?;
                ControlCommand::DepthRange { near: p.near, far: p.far }
            }
            ControlOpcode::DepthTestEnable => ControlCommand::DepthTestEnable,
            ControlOpcode::DepthTestDisable => ControlCommand::DepthTestDisable,
            ControlOpcode::DepthTestFunction => {
                ControlCommand::DepthTestFunction(DepthFunction::try_from(data)?)
            }
            ControlOpcode::DepthWriteEnable => ControlCommand::DepthWriteEnable,
            ControlOpcode::DepthWriteDisable => ControlCommand::DepthWriteDisable,
            ControlOpcode::CullFaceEnable => ControlCommand::CullFaceEnable,
            ControlOpcode::CullFaceDisable => ControlCommand::CullFaceDisable,
            ControlOpcode::CullFaceFront => ControlCommand::CullFaceFront,
            ControlOpcode::CullFaceBack => ControlCommand::CullFaceBack,
            ControlOpcode::Clear => ControlCommand::Clear(ClearMask::from_bits_truncate(data)),
            ControlOpcode::ClearColor => {
                let p: ClearColorPayload = read_payload(buffer, data)?;
                ControlCommand::ClearColor(Vec4::from_array(p.rgba))
            }
            ControlOpcode::ClearDepth => ControlCommand::ClearDepth(f32::from_bits(data)),
            ControlOpcode::BindFramebuffer => {
                let p: BindFramebufferPayload = read_payload(buffer, data)?;
                ControlCommand::BindFramebuffer {
                    target: FramebufferTarget::try_from(p.target)?,
                    framebuffer: p.framebuffer,
                }
            }
            ControlOpcode::BlitFramebuffer => {
                let p: BlitFramebufferPayload = read_payload(buffer, data)?;
                ControlCommand::BlitFramebuffer {
                    src: rect_from(p.src),
                    dst: rect_from(p.dst),
                    mask: ClearMask::from_bits_truncate(p.mask),
                    filter: Filter::try_from(p.filter)?,
                }
            }
        })
    }

    /// Issue the matching device operation
    pub fn apply(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        match *self {
            ControlCommand::BlendingEnable => device.blending_enable(),
            ControlCommand::BlendingDisable => device.blending_disable(),
            ControlCommand::Viewport(rect) => device.viewport(rect),
            ControlCommand::DepthRange { near, far } => device.depth_range(near, far),
            ControlCommand::DepthTestEnable => device.depth_test_enable(),
            ControlCommand::DepthTestDisable => device.depth_test_disable(),
            ControlCommand::DepthTestFunction(function) => device.depth_test_function(function),
            ControlCommand::DepthWriteEnable => device.depth_write_enable(),
            ControlCommand::DepthWriteDisable => device.depth_write_disable(),
            ControlCommand::CullFaceEnable => device.cull_face_enable(),
            ControlCommand::CullFaceDisable => device.cull_face_disable(),
            ControlCommand::CullFaceFront => device.cull_face_front(),
            ControlCommand::CullFaceBack => device.cull_face_back(),
            ControlCommand::Clear(mask) => device.clear(mask),
            ControlCommand::ClearColor(color) => device.clear_color(color),
            ControlCommand::ClearDepth(depth) => device.clear_depth(depth),
            ControlCommand::BindFramebuffer { target, framebuffer } => {
                device.bind_framebuffer(target, framebuffer)
            }
            ControlCommand::BlitFramebuffer { src, dst, mask, filter } => {
                device.blit_framebuffer(src, dst, mask, filter)
            }
        }
    }
}

fn read_payload<T: Pod>(buffer: &[u8], offset: u32) -> Result<T> {
    let start = offset as usize;
    let end = start + std::mem::size_of::<T>();
    match buffer.get(start..end) {
        Some(bytes) => Ok(bytemuck::pod_read_unaligned(bytes)),
        None => engine_bail!(
            "lumen3d::RenderCommand",
            "Payload at offset {} overruns the command buffer ({} bytes)",
            offset,
            buffer.len()
        ),
    }
}

#[cfg(test)]
#[path = "render_command_tests.rs"]
mod tests;
