//! Custom renderer callbacks
//!
//! A custom renderer draws something the material path cannot express
//! (debug overlays, particles). The renderer emits one callback draw per
//! registered custom renderer each frame and hands it the device when the
//! key is replayed.

use crate::camera::ViewportTransform;
use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use super::render_command::RenderPass;

/// Context of one callback draw
#[derive(Debug, Clone, Copy)]
pub struct CustomRenderParams<'a> {
    pub viewport: u32,
    pub pass: RenderPass,
    /// Index returned by `Renderer::add_custom_renderer`
    pub callback: u32,
    pub transform: &'a ViewportTransform,
}

pub trait CustomRenderer: Send {
    /// Pass of the fullscreen viewport the callback runs in
    fn pass(&self) -> RenderPass;

    fn render_custom(&mut self, params: &CustomRenderParams, device: &mut dyn GraphicsDevice) -> Result<()>;
}

/// Registered custom renderers; an index stays valid until removed
#[derive(Default)]
pub struct CustomRendererRegistry {
    slots: Vec<Option<Box<dyn CustomRenderer>>>,
}

impl CustomRendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `renderer`, reusing the first free index
    pub fn add(&mut self, renderer: Box<dyn CustomRenderer>) -> u32 {
        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(renderer);
                index as u32
            }
            None => {
                self.slots.push(Some(renderer));
                (self.slots.len() - 1) as u32
            }
        }
    }

    pub fn remove(&mut self, index: u32) -> Option<Box<dyn CustomRenderer>> {
        self.slots.get_mut(index as usize).and_then(Option::take)
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut (dyn CustomRenderer + 'static)> {
        self.slots.get_mut(index as usize)?.as_deref_mut()
    }

    /// (index, pass) of every registered renderer
    pub fn passes(&self) -> impl Iterator<Item = (u32, RenderPass)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|r| (index as u32, r.pass())))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "custom_renderer_tests.rs"]
mod tests;
