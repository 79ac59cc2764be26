//! Error types for the Lumen3D engine
//!
//! This module defines the error types used throughout the engine,
//! including device calls, renderer setup, and resource lookups.

use std::fmt;

/// Result type for Lumen3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumen3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (OpenGL, Vulkan, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (mesh, material, shader, texture handle)
    InvalidResource(String),

    /// Initialization failed (renderer, framebuffers)
    InitializationFailed(String),

    /// A framebuffer failed its completeness check
    IncompleteFramebuffer(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::IncompleteFramebuffer(msg) => write!(f, "Incomplete framebuffer: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build a `BackendError` and log it at ERROR severity with file:line
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("lumen3d::Renderer", "Shader {} not found", id);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::lumen3d::Error::BackendError(message)
    }};
}

/// Log and return a `BackendError` from the current function
///
/// # Example
///
/// ```ignore
/// engine_bail!("lumen3d::Renderer", "Viewport index {} out of range", index);
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
