//! Plain types shared by the graphics device trait and its callers.

use crate::error::{Error, Result};

/// Comparison used by the depth test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DepthFunction {
    Never = 0,
    Less = 1,
    Equal = 2,
    LessOrEqual = 3,
    Greater = 4,
    NotEqual = 5,
    GreaterOrEqual = 6,
    Always = 7,
}

impl TryFrom<u32> for DepthFunction {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Ok(match value {
            0 => DepthFunction::Never,
            1 => DepthFunction::Less,
            2 => DepthFunction::Equal,
            3 => DepthFunction::LessOrEqual,
            4 => DepthFunction::Greater,
            5 => DepthFunction::NotEqual,
            6 => DepthFunction::GreaterOrEqual,
            7 => DepthFunction::Always,
            other => {
                return Err(Error::InvalidResource(format!("Unknown depth function {}", other)))
            }
        })
    }
}

bitflags::bitflags! {
    /// Buffers affected by a clear or a blit
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearMask: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Framebuffer binding point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum FramebufferTarget {
    /// Both read and draw
    Framebuffer = 0,
    Read = 1,
    Draw = 2,
}

impl TryFrom<u32> for FramebufferTarget {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(FramebufferTarget::Framebuffer),
            1 => Ok(FramebufferTarget::Read),
            2 => Ok(FramebufferTarget::Draw),
            other => Err(Error::InvalidResource(format!("Unknown framebuffer target {}", other))),
        }
    }
}

/// Sampling filter for blits and textures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Filter {
    Nearest = 0,
    Linear = 1,
}

impl TryFrom<u32> for Filter {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Filter::Nearest),
            1 => Ok(Filter::Linear),
            other => Err(Error::InvalidResource(format!("Unknown filter {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    U8,
    U16,
    U32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2D,
    TextureCube,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_UNORM,
    R16G16B16_SFLOAT,
    D32_FLOAT,
}

impl TextureFormat {
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::D32_FLOAT)
    }
}

/// Descriptor for a render-target texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub filter: Filter,
    /// Clamp sampling to the edges
    pub clamp_to_edge: bool,
    /// Depth textures sampled with a less-or-equal reference comparison
    pub depth_compare: bool,
}

/// Descriptor for a framebuffer built from existing textures
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FramebufferDesc {
    pub color_attachments: Vec<u32>,
    pub depth_attachment: Option<u32>,
}

/// Rectangle in framebuffer pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
