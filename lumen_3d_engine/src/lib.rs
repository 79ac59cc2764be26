/*!
# Lumen 3D Engine

Deferred real-time renderer built around a sortable command list.

Every frame the renderer culls render objects against the light and camera
frusta, packs each state change and draw into a 64-bit order key, radix-sorts
the keys and replays them on a `GraphicsDevice`.

## Architecture

- **GraphicsDevice**: GPU driver binding layer the renderer replays onto
- **RenderCommandList**: order keys plus a payload byte buffer
- **RenderObjects**: structure-of-arrays store of render objects
- **Renderer**: per-frame culling, command emission, sort and replay
- **ResourceManager**: meshes, shaders, textures and materials
- **Scene**: entities, world transforms, cameras and the skybox
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod utils;
pub mod camera;
pub mod culling;
pub mod graphics_device;
pub mod render;
pub mod resource;
pub mod scene;

// Main lumen3d namespace module
pub mod lumen3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging entry point
    pub use crate::engine::Engine;

    // Frame entry point
    pub use crate::render::Renderer;
    pub use crate::graphics_device::GraphicsDevice;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub mod camera {
        pub use crate::camera::*;
    }

    pub mod culling {
        pub use crate::culling::intersect;
    }

    pub mod graphics_device {
        pub use crate::graphics_device::*;
    }

    // Command list, order keys and renderer
    pub mod render {
        pub use crate::render::*;
    }

    pub mod resource {
        pub use crate::resource::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod utils {
        pub use crate::utils::*;
    }
}

// Re-export math library at crate root
pub use glam;
