//! Error types
//!
//! Configuration errors are fatal and surface before the first frame. Parameter and
//! render errors are propagated to the host, which treats them as fatal as well.

use crate::SurfaceSize;

/// Mismatch between loaded assets and what the renderer expects
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// A shader does not declare a constant its role requires
    #[error("shader `{shader}` does not declare required parameter `{parameter}`")]
    MissingParameter { shader: String, parameter: &'static str },
    /// A shader asset could not be parsed
    #[error("failed to parse shader `{shader}`: {message}")]
    ShaderParse { shader: String, message: String },
    /// A shader declares a parameter the binder cannot upload
    #[error("shader `{shader}` parameter `{parameter}` is not a 32-bit scalar")]
    UnsupportedParameterType { shader: String, parameter: String },
    /// The source image has no pixels
    #[error("source image is empty ({0})")]
    EmptySource(SurfaceSize),
    /// The configured output resolution has no pixels
    #[error("output resolution is empty ({0})")]
    EmptyOutput(SurfaceSize),
    /// A surface is larger than the graphics device can allocate
    #[error("{size} exceeds the maximum texture dimension {max_dimension}")]
    SurfaceTooLarge { size: SurfaceSize, max_dimension: u32 },
}

/// Failure to set a named constant on a shader program
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    #[error("shader `{shader}` has no parameter `{parameter}`")]
    Unknown { shader: String, parameter: String },
}

/// Failure while recording or presenting a frame
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error("failed to acquire surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("draw recorded outside of a frame")]
    NoActiveFrame,
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}
