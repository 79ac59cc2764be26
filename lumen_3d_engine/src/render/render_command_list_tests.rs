//! Unit tests for render_command_list.rs
//!
//! Tests payload alignment, draw ordering inside passes and the sort law.

use crate::graphics_device::{ClearMask, DepthFunction, FramebufferTarget, Rect};
use glam::Vec4;
use crate::resource::MaterialId;
use super::*;
use super::super::render_order::DecodedKey;

fn draw_objects(list: &RenderCommandList) -> Vec<u32> {
    list.keys()
        .iter()
        .filter_map(|&key| match DecodedKey::decode(key) {
            DecodedKey::Draw { render_object, .. } => Some(render_object),
            DecodedKey::Control { .. } => None,
        })
        .collect()
}

// ============================================================================
// PAYLOAD TESTS
// ============================================================================

#[test]
fn test_three_byte_payload_occupies_eight_bytes() {
    let mut list = RenderCommandList::new();
    list.add_control_payload(0, RenderPass::OpaqueGeometry, 0, ControlOpcode::Viewport, &[1, 2, 3]);

    assert_eq!(list.data(), &[1, 2, 3, 0, 0, 0, 0, 0]);
}

#[test]
fn test_payload_offsets_are_aligned() {
    let mut list = RenderCommandList::new();
    list.add_control_payload(0, RenderPass::OpaqueGeometry, 0, ControlOpcode::Viewport, &[7; 3]);
    list.add_control_payload(0, RenderPass::OpaqueGeometry, 1, ControlOpcode::Viewport, &[7; 17]);
    list.add_control_payload(0, RenderPass::OpaqueGeometry, 2, ControlOpcode::Viewport, &[7; 8]);

    let offsets: Vec<u32> = list
        .keys()
        .iter()
        .map(|&key| match DecodedKey::decode(key) {
            DecodedKey::Control { data, .. } => data,
            DecodedKey::Draw { .. } => panic!("unexpected draw"),
        })
        .collect();

    assert_eq!(offsets, vec![0, 8, 32]);
    assert_eq!(list.data().len(), 40);
}

#[test]
fn test_typed_control_commands_decode_back() {
    let mut list = RenderCommandList::new();
    let viewport = ControlCommand::Viewport(Rect { x: 0, y: 0, width: 1024, height: 1024 });
    let bind = ControlCommand::BindFramebuffer { target: FramebufferTarget::Framebuffer, framebuffer: 4 };
    let depth = ControlCommand::DepthTestFunction(DepthFunction::Less);

    list.add_control(0, RenderPass::OpaqueGeometry, 0, depth);
    list.add_control(0, RenderPass::OpaqueGeometry, 1, viewport);
    list.add_control(0, RenderPass::OpaqueGeometry, 2, bind);

    let decoded: Vec<ControlCommand> = list
        .keys()
        .iter()
        .map(|&key| match DecodedKey::decode(key) {
            DecodedKey::Control { opcode, data, .. } => list.control_command(opcode, data).unwrap(),
            DecodedKey::Draw { .. } => panic!("unexpected draw"),
        })
        .collect();

    assert_eq!(decoded, vec![depth, viewport, bind]);
}

// ============================================================================
// DRAW ORDER TESTS
// ============================================================================

#[test]
fn test_opaque_draws_sort_front_to_back() {
    let mut list = RenderCommandList::new();
    list.add_draw(1, RenderPass::OpaqueGeometry, 0.8, MaterialId(1), 2);
    list.add_draw(1, RenderPass::OpaqueGeometry, 0.2, MaterialId(1), 1);
    list.sort();

    assert_eq!(draw_objects(&list), vec![1, 2]);
}

#[test]
fn test_transparent_draws_sort_back_to_front() {
    let mut list = RenderCommandList::new();
    list.add_draw(1, RenderPass::Transparent, 0.2, MaterialId(1), 1);
    list.add_draw(1, RenderPass::Transparent, 0.8, MaterialId(1), 2);
    list.sort();

    assert_eq!(draw_objects(&list), vec![2, 1]);
}

#[test]
fn test_material_groups_before_depth() {
    let mut list = RenderCommandList::new();
    list.add_draw(1, RenderPass::OpaqueGeometry, 0.1, MaterialId(2), 1);
    list.add_draw(1, RenderPass::OpaqueGeometry, 0.9, MaterialId(1), 2);
    list.sort();

    assert_eq!(draw_objects(&list), vec![2, 1]);
}

#[test]
fn test_controls_precede_draws_in_same_pass() {
    let mut list = RenderCommandList::new();
    list.add_draw(1, RenderPass::Skybox, 0.0, MaterialId(1), 1);
    list.add_control(1, RenderPass::Skybox, 0, ControlCommand::DepthWriteDisable);
    list.add_control(1, RenderPass::OpaqueGeometry, 3, ControlCommand::Clear(ClearMask::COLOR));
    list.sort();

    let kinds: Vec<(u32, bool)> = list
        .keys()
        .iter()
        .map(|&key| {
            let decoded = DecodedKey::decode(key);
            (decoded.pass(), matches!(decoded, DecodedKey::Draw { .. }))
        })
        .collect();

    assert_eq!(kinds, vec![(0, false), (3, false), (3, true)]);
}

#[test]
fn test_callback_draw_uses_reserved_material() {
    let mut list = RenderCommandList::new();
    list.add_draw_with_callback(1, RenderPass::Transparent, 0.5, 3);

    match DecodedKey::decode(list.keys()[0]) {
        DecodedKey::Draw { material, render_object, pass, .. } => {
            assert_eq!(material as u64, CALLBACK_MATERIAL);
            assert_eq!(render_object, 3);
            assert_eq!(pass, RenderPass::Transparent.id());
        }
        DecodedKey::Control { .. } => panic!("expected a draw"),
    }
}

// ============================================================================
// SORT LAW
// ============================================================================

/// Decoded fields in layout order: viewport, pass, command type, then
/// (order, opcode, data) for controls or (material, depth, object) for draws
fn sort_fields(key: u64) -> (u32, u32, u32, u32, u32, u32) {
    match DecodedKey::decode(key) {
        DecodedKey::Control { viewport, pass, order, opcode, data } => {
            (viewport, pass, RenderCommandType::Control as u32, order, opcode, data)
        }
        DecodedKey::Draw { viewport, pass, material, depth, render_object } => {
            (viewport, pass, RenderCommandType::Draw as u32, material, depth, render_object)
        }
    }
}

#[test]
fn test_sort_orders_every_field_lexicographically() {
    let passes = [
        RenderPass::OpaqueGeometry,
        RenderPass::OpaqueLighting,
        RenderPass::Skybox,
        RenderPass::Transparent,
    ];
    let functions = [DepthFunction::Less, DepthFunction::Equal, DepthFunction::Always];
    let mut list = RenderCommandList::new();

    // Deterministic pseudo-random mix of draws, inline and payload controls
    let mut state: u32 = 0x9e37_79b9;
    for i in 0..800u32 {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let viewport = (state >> 8) % 3;
        let pass = passes[((state >> 16) % 4) as usize];
        let order = (state >> 12) % 8;
        match state % 4 {
            0 | 1 => {
                let depth = ((state >> 4) % 1000) as f32 / 1000.0;
                list.add_draw(viewport, pass, depth, MaterialId((state >> 20) % 6), i);
            }
            2 => {
                let function = functions[((state >> 24) % 3) as usize];
                list.add_control(viewport, pass, order, ControlCommand::DepthTestFunction(function));
            }
            _ => {
                let rgba = Vec4::splat((state >> 24) as f32 / 255.0);
                list.add_control(viewport, pass, order, ControlCommand::ClearColor(rgba));
            }
        }
    }

    list.sort();

    let mut draw_pairs_same_material = 0;
    let mut control_pairs_same_group = 0;
    for pair in list.keys().windows(2) {
        assert!(pair[0] <= pair[1]);
        let (a, b) = (sort_fields(pair[0]), sort_fields(pair[1]));
        assert!(a <= b, "{:?} replays before {:?}", a, b);

        let same_group = a.0 == b.0 && a.1 == b.1 && a.2 == b.2;
        if same_group && a.2 == RenderCommandType::Control as u32 {
            assert!(a.3 <= b.3, "control order decreases inside a pass");
            control_pairs_same_group += 1;
        }
        if same_group && a.2 == RenderCommandType::Draw as u32 {
            assert!(a.3 <= b.3, "material decreases inside a pass");
            if a.3 == b.3 {
                assert!(a.4 <= b.4, "depth decreases inside a material");
                draw_pairs_same_material += 1;
            }
        }
    }

    // The mix must actually exercise the inner fields
    assert!(control_pairs_same_group > 50);
    assert!(draw_pairs_same_material > 50);
}

// ============================================================================
// LIFECYCLE TESTS
// ============================================================================

#[test]
fn test_clear_empties_keys_and_data() {
    let mut list = RenderCommandList::with_capacity(16, 64);
    list.add_control(0, RenderPass::OpaqueGeometry, 0, ControlCommand::ClearDepth(1.0));
    list.add_control(0, RenderPass::OpaqueGeometry, 1, ControlCommand::Viewport(Rect::default()));
    list.add_draw(0, RenderPass::OpaqueGeometry, 0.5, MaterialId(1), 1);
    assert_eq!(list.len(), 3);

    list.clear();

    assert!(list.is_empty());
    assert!(list.data().is_empty());
}
