//! Per-frame render command list
//!
//! Order keys plus a byte buffer for control payloads that do not fit in a
//! key. Built once per frame, sorted, replayed, then cleared: buffer offsets
//! recorded in keys are only valid until the next `clear`.

use rdst::RadixSort;
use crate::error::Result;
use crate::resource::MaterialId;
use super::render_command::{
    ControlCommand, ControlData, ControlOpcode, RenderCommandType, RenderPass,
};
use super::render_order::{
    self, CALLBACK_MATERIAL, COMMAND_TYPE, CONTROL_DATA, CONTROL_OPCODE, CONTROL_ORDER,
    MATERIAL, OPAQUE_DEPTH, PASS, RENDER_OBJECT, TRANSPARENT_DEPTH, VIEWPORT,
};

/// Payloads start on multiples of this many bytes
pub const PAYLOAD_ALIGNMENT: usize = 8;

#[derive(Debug, Default, Clone)]
pub struct RenderCommandList {
    keys: Vec<u64>,
    data: Vec<u8>,
}

impl RenderCommandList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preallocate `keys` commands and `data_bytes` of payload
    pub fn with_capacity(keys: usize, data_bytes: usize) -> Self {
        Self {
            keys: Vec::with_capacity(keys),
            data: Vec::with_capacity(data_bytes),
        }
    }

    // ===== CONTROL COMMANDS =====

    fn control_key(viewport: u32, pass: RenderPass, order: u32, opcode: ControlOpcode) -> u64 {
        let key = VIEWPORT.assign_value(0, viewport as u64);
        let key = PASS.assign_value(key, pass.id() as u64);
        let key = COMMAND_TYPE.assign_value(key, RenderCommandType::Control as u64);
        let key = CONTROL_ORDER.assign_value(key, order as u64);
        CONTROL_OPCODE.assign_value(key, opcode as u64)
    }

    /// Control command whose argument fits in the key
    pub fn add_control_inline(
        &mut self,
        viewport: u32,
        pass: RenderPass,
        order: u32,
        opcode: ControlOpcode,
        data: u32,
    ) {
        let key = Self::control_key(viewport, pass, order, opcode);
        self.keys.push(CONTROL_DATA.assign_value(key, data as u64));
    }

    /// Control command whose argument is copied into the byte buffer
    ///
    /// The payload starts on an 8-byte boundary and is zero-padded to the
    /// next one.
    pub fn add_control_payload(
        &mut self,
        viewport: u32,
        pass: RenderPass,
        order: u32,
        opcode: ControlOpcode,
        payload: &[u8],
    ) {
        let offset = self.data.len();
        debug_assert!(offset % PAYLOAD_ALIGNMENT == 0);
        debug_assert!(offset <= u32::MAX as usize, "command buffer exceeds 4 GiB");

        self.data.extend_from_slice(payload);
        let padded = payload.len().next_multiple_of(PAYLOAD_ALIGNMENT);
        self.data.resize(offset + padded, 0);

        let key = Self::control_key(viewport, pass, order, opcode);
        self.keys.push(CONTROL_DATA.assign_value(key, offset as u64));
    }

    /// Typed control command, stored inline or as a payload as needed
    pub fn add_control(&mut self, viewport: u32, pass: RenderPass, order: u32, command: ControlCommand) {
        match command.encode() {
            ControlData::Inline(value) => {
                self.add_control_inline(viewport, pass, order, command.opcode(), value)
            }
            ControlData::Payload(bytes) => {
                self.add_control_payload(viewport, pass, order, command.opcode(), &bytes)
            }
        }
    }

    // ===== DRAW COMMANDS =====

    fn draw_key(viewport: u32, pass: RenderPass, depth: f32, material: u64, render_object: u32) -> u64 {
        let key = VIEWPORT.assign_value(0, viewport as u64);
        let key = PASS.assign_value(key, pass.id() as u64);
        let key = COMMAND_TYPE.assign_value(key, RenderCommandType::Draw as u64);
        let key = MATERIAL.assign_value(key, material);
        let depth_field = if pass.is_transparent() { TRANSPARENT_DEPTH } else { OPAQUE_DEPTH };
        let key = depth_field.assign_value(key, render_order::quantize_depth(pass.id(), depth));
        RENDER_OBJECT.assign_value(key, render_object as u64)
    }

    /// Draw of one render object; `depth` is clamped to [0, 1]
    pub fn add_draw(
        &mut self,
        viewport: u32,
        pass: RenderPass,
        depth: f32,
        material: MaterialId,
        render_object: u32,
    ) {
        debug_assert!(
            (material.0 as u64) < CALLBACK_MATERIAL,
            "material {} collides with the callback material",
            material.0
        );
        self.keys.push(Self::draw_key(viewport, pass, depth, material.0 as u64, render_object));
    }

    /// Draw served by the custom renderer registered at `callback`
    pub fn add_draw_with_callback(&mut self, viewport: u32, pass: RenderPass, depth: f32, callback: u32) {
        self.keys.push(Self::draw_key(viewport, pass, depth, CALLBACK_MATERIAL, callback));
    }

    // ===== LIFECYCLE =====

    /// Sort keys ascending, which is replay order
    pub fn sort(&mut self) {
        self.keys.radix_sort_unstable();
    }

    /// Drop all keys and payloads
    pub fn clear(&mut self) {
        self.keys.clear();
        self.data.clear();
    }

    // ===== ACCESS =====

    /// Order keys, in replay order once sorted
    pub fn keys(&self) -> &[u64] {
        &self.keys
    }

    /// Payload byte buffer
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Decode the control command referenced by a key's opcode and data fields
    pub fn control_command(&self, opcode: u32, data: u32) -> Result<ControlCommand> {
        ControlCommand::decode(ControlOpcode::try_from(opcode)?, data, &self.data)
    }
}

#[cfg(test)]
#[path = "render_command_list_tests.rs"]
mod tests;
