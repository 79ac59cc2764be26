//! Graphics device module - the driver binding layer and its plain types

pub mod graphics_device;
pub mod types;

pub use graphics_device::GraphicsDevice;
pub use types::*;

// Recording device for unit tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
