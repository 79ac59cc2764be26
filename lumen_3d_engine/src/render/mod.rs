//! Render module
//!
//! Order-key codec, per-frame command list, render-object and light stores
//! and the deferred renderer that drives them.

pub mod render_command;
pub mod render_order;
pub mod render_command_list;
pub mod render_objects;
pub mod light_manager;
pub mod custom_renderer;
pub mod renderer;

pub use render_command::{
    ControlCommand, ControlData, ControlOpcode, RenderCommandType, RenderPass,
    MAX_VIEWPORTS, VIEWPORT_FULLSCREEN, VIEWPORT_LIGHT,
};
pub use render_order::{DecodedKey, OrderField, RenderOrderData};
pub use render_command_list::RenderCommandList;
pub use render_objects::{RenderObjectId, RenderObjects};
pub use light_manager::{LightId, LightManager, LightType};
pub use custom_renderer::{CustomRenderParams, CustomRenderer, CustomRendererRegistry};
pub use renderer::{DirectionalLight, LightingAssets, Renderer, RendererConfig};
