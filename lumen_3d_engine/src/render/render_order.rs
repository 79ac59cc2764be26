//! Order-key codec
//!
//! An order key is a `u64` whose bit fields, most significant first, encode
//! the submission priority of one command. Sorting raw keys ascending gives
//! the replay order: viewport, then pass, then control before draw, then
//! control order or material and depth, then render object.
//!
//! ```text
//!  63   61 60  58 57  56          41 40          21 20            0
//! [viewport][pass][T][   material   ][    depth     ][ render object ]   T = 1 (draw)
//! [viewport][pass][T][ control order ][ opcode ][    control data    ]   T = 0 (control)
//!                                   40      32 31                   0
//! ```

use crate::resource::MaterialId;
use super::render_command::{RenderCommandType, RenderPass};

/// One bit field of an order key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderField {
    pub width: u32,
    pub shift: u32,
}

impl OrderField {
    pub const fn new(width: u32, shift: u32) -> Self {
        Self { width, shift }
    }

    /// Largest value the field can hold
    pub const fn max_value(self) -> u64 {
        (1u64 << self.width) - 1
    }

    /// Field bits in key position
    pub const fn mask(self) -> u64 {
        self.max_value() << self.shift
    }

    /// Write `value` into the field of `key`
    ///
    /// Values wider than the field are truncated, which corrupts sorting;
    /// debug builds assert instead.
    pub fn assign_value(self, key: u64, value: u64) -> u64 {
        debug_assert!(
            value <= self.max_value(),
            "value {} overflows a {}-bit order field",
            value,
            self.width
        );
        (key & !self.mask()) | ((value & self.max_value()) << self.shift)
    }

    pub fn get_value(self, key: u64) -> u64 {
        (key >> self.shift) & self.max_value()
    }
}

// ===== KEY LAYOUT =====

pub const VIEWPORT: OrderField = OrderField::new(3, 61);
pub const PASS: OrderField = OrderField::new(3, 58);
pub const COMMAND_TYPE: OrderField = OrderField::new(1, 57);

// Draw layout
pub const MATERIAL: OrderField = OrderField::new(16, 41);
pub const OPAQUE_DEPTH: OrderField = OrderField::new(20, 21);
/// Same bits as `OPAQUE_DEPTH`; the pass decides which one is meant
pub const TRANSPARENT_DEPTH: OrderField = OrderField::new(20, 21);
pub const RENDER_OBJECT: OrderField = OrderField::new(21, 0);

// Control layout
pub const CONTROL_ORDER: OrderField = OrderField::new(16, 41);
pub const CONTROL_OPCODE: OrderField = OrderField::new(9, 32);
pub const CONTROL_DATA: OrderField = OrderField::new(32, 0);

pub const MAX_DEPTH: u64 = (1 << 20) - 1;

/// Material field value marking a draw served by a custom renderer
pub const CALLBACK_MATERIAL: u64 = 0xffff;

/// Quantize a normalized depth for `pass`
///
/// Opaque passes sort front to back, transparent passes back to front.
/// Depth is clamped to [0, 1] first.
pub fn quantize_depth(pass: u32, depth: f32) -> u64 {
    let depth = depth.clamp(0.0, 1.0);
    if RenderPass::is_transparent_id(pass) {
        (MAX_DEPTH as f32 * (1.0 - depth)) as u64
    } else {
        (MAX_DEPTH as f32 * depth) as u64
    }
}

/// Fields of a key, split according to its command type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedKey {
    Control {
        viewport: u32,
        pass: u32,
        order: u32,
        opcode: u32,
        data: u32,
    },
    Draw {
        viewport: u32,
        pass: u32,
        material: u32,
        depth: u32,
        render_object: u32,
    },
}

impl DecodedKey {
    pub fn decode(key: u64) -> Self {
        let viewport = VIEWPORT.get_value(key) as u32;
        let pass = PASS.get_value(key) as u32;
        if COMMAND_TYPE.get_value(key) == RenderCommandType::Draw as u64 {
            DecodedKey::Draw {
                viewport,
                pass,
                material: MATERIAL.get_value(key) as u32,
                depth: OPAQUE_DEPTH.get_value(key) as u32,
                render_object: RENDER_OBJECT.get_value(key) as u32,
            }
        } else {
            DecodedKey::Control {
                viewport,
                pass,
                order: CONTROL_ORDER.get_value(key) as u32,
                opcode: CONTROL_OPCODE.get_value(key) as u32,
                data: CONTROL_DATA.get_value(key) as u32,
            }
        }
    }

    pub fn viewport(&self) -> u32 {
        match *self {
            DecodedKey::Control { viewport, .. } | DecodedKey::Draw { viewport, .. } => viewport,
        }
    }

    pub fn pass(&self) -> u32 {
        match *self {
            DecodedKey::Control { pass, .. } | DecodedKey::Draw { pass, .. } => pass,
        }
    }
}

// ===== PER-OBJECT ORDER DATA =====

/// How a render object is sorted into the fullscreen viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOrderData {
    pub material: MaterialId,
    /// Pass the object is drawn in
    pub transparency: RenderPass,
}

impl RenderOrderData {
    pub fn new(material: MaterialId, transparency: RenderPass) -> Self {
        Self { material, transparency }
    }
}

#[cfg(test)]
#[path = "render_order_tests.rs"]
mod tests;
