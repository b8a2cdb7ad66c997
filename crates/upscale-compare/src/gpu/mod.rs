//! wgpu implementation of [`crate::GraphicsBackend`]

mod backend;
mod reflect;
mod shader;

pub use backend::{GpuInitError, WgpuBackend, WgpuTexture};
pub use shader::WgpuShaderProgram;
