//! Unit tests for render_command.rs
//!
//! Tests pass classification, opcode decoding and control command dispatch.

use glam::Vec4;
use crate::graphics_device::{
    ClearMask, DepthFunction, Filter, FramebufferTarget, Rect,
    mock_graphics_device::MockGraphicsDevice,
};
use super::*;

fn decode_standalone(command: ControlCommand) -> ControlCommand {
    match command.encode() {
        ControlData::Inline(value) => ControlCommand::decode(command.opcode(), value, &[]).unwrap(),
        ControlData::Payload(bytes) => ControlCommand::decode(command.opcode(), 0, &bytes).unwrap(),
    }
}

// ============================================================================
// RENDER PASS TESTS
// ============================================================================

#[test]
fn test_pass_transparency_classification() {
    assert!(!RenderPass::OpaqueGeometry.is_transparent());
    assert!(!RenderPass::OpaqueLighting.is_transparent());
    assert!(!RenderPass::Skybox.is_transparent());
    assert!(RenderPass::Transparent.is_transparent());
    assert!(RenderPass::is_transparent_id(7));
    assert!(!RenderPass::is_transparent_id(1));
}

#[test]
fn test_pass_ids_follow_submission_order() {
    assert!(RenderPass::OpaqueGeometry.id() < RenderPass::OpaqueLighting.id());
    assert!(RenderPass::OpaqueLighting.id() < RenderPass::Skybox.id());
    assert!(RenderPass::Skybox.id() < RenderPass::Transparent.id());
}

#[test]
fn test_pass_try_from() {
    assert_eq!(RenderPass::try_from(3).unwrap(), RenderPass::Skybox);
    assert!(RenderPass::try_from(1).is_err());
}

// ============================================================================
// OPCODE TESTS
// ============================================================================

#[test]
fn test_opcode_try_from_matches_discriminant() {
    for value in 0..18u32 {
        assert_eq!(ControlOpcode::try_from(value).unwrap() as u32, value);
    }
    assert!(ControlOpcode::try_from(18).is_err());
}

// ============================================================================
// ENCODING TESTS
// ============================================================================

#[test]
fn test_small_arguments_stay_inline() {
    assert_eq!(
        ControlCommand::DepthTestFunction(DepthFunction::Equal).encode(),
        ControlData::Inline(2)
    );
    assert_eq!(
        ControlCommand::Clear(ClearMask::COLOR | ClearMask::DEPTH).encode(),
        ControlData::Inline(3)
    );
    assert_eq!(ControlCommand::ClearDepth(1.0).encode(), ControlData::Inline(1.0f32.to_bits()));
    assert_eq!(ControlCommand::CullFaceBack.encode(), ControlData::Inline(0));
}

#[test]
fn test_payload_sizes() {
    let viewport = ControlCommand::Viewport(Rect { x: 0, y: 0, width: 4, height: 4 });
    let bind = ControlCommand::BindFramebuffer { target: FramebufferTarget::Draw, framebuffer: 2 };

    assert!(matches!(viewport.encode(), ControlData::Payload(b) if b.len() == 16));
    assert!(matches!(bind.encode(), ControlData::Payload(b) if b.len() == 8));
}

#[test]
fn test_decode_restores_commands() {
    let commands = [
        ControlCommand::Viewport(Rect { x: 1, y: 2, width: 640, height: 480 }),
        ControlCommand::DepthRange { near: 0.25, far: 0.75 },
        ControlCommand::ClearColor(Vec4::new(0.1, 0.2, 0.3, 1.0)),
        ControlCommand::ClearDepth(0.5),
        ControlCommand::BindFramebuffer { target: FramebufferTarget::Read, framebuffer: 9 },
        ControlCommand::BlitFramebuffer {
            src: Rect { x: 0, y: 0, width: 8, height: 8 },
            dst: Rect { x: 0, y: 0, width: 4, height: 4 },
            mask: ClearMask::DEPTH,
            filter: Filter::Nearest,
        },
    ];

    for command in commands {
        assert_eq!(decode_standalone(command), command);
    }
}

#[test]
fn test_decode_rejects_payload_overrun() {
    let result = ControlCommand::decode(ControlOpcode::Viewport, 8, &[0u8; 16]);
    assert!(result.is_err());
}

#[test]
fn test_decode_rejects_unknown_depth_function() {
    assert!(ControlCommand::decode(ControlOpcode::DepthTestFunction, 99, &[]).is_err());
}

// ============================================================================
// DISPATCH TESTS
// ============================================================================

#[test]
fn test_apply_calls_matching_device_method() {
    let mut device = MockGraphicsDevice::new();

    ControlCommand::DepthTestFunction(DepthFunction::Always).apply(&mut device).unwrap();
    ControlCommand::Clear(ClearMask::COLOR | ClearMask::DEPTH).apply(&mut device).unwrap();
    ControlCommand::BindFramebuffer { target: FramebufferTarget::Framebuffer, framebuffer: 0 }
        .apply(&mut device)
        .unwrap();
    ControlCommand::BlendingEnable.apply(&mut device).unwrap();

    assert_eq!(
        device.calls,
        vec![
            "depth_test_function(Always)",
            "clear(COLOR|DEPTH)",
            "bind_framebuffer(Framebuffer, 0)",
            "blending_enable",
        ]
    );
}

#[test]
fn test_apply_propagates_device_error() {
    let mut device = MockGraphicsDevice::new();
    device.fail_on = Some("cull_face_back");

    assert!(ControlCommand::CullFaceBack.apply(&mut device).is_err());
    assert!(device.calls.is_empty());
}
