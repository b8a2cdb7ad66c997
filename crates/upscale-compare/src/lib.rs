//! Side-by-side comparison of real-time upscaling filters
//!
//! This crate renders a fixed-resolution source image into a larger output resolution
//! through one of several selectable upscaling algorithms (bilinear, Lanczos, FSR EASU,
//! FSR EASU+RCAS). It owns the mode state machine, the two-stage render-target
//! orchestration, and the shader parameter contract. Window creation, asset loading and
//! the shader programs themselves are supplied by the host.

mod config;
mod error;
mod frame_renderer;
mod input;
mod mode_selector;
mod parameters;
mod pass_table;
mod scaling_mode;
mod upscaler;

pub mod gpu;

pub use config::{ClearColors, Rgba, RgbaParseError, SurfaceSize, UpscalerConfig};
pub use error::{ConfigurationError, ParameterError, RenderError};
pub use frame_renderer::{DrawPass, FrameRenderer, GraphicsBackend, PassTarget, ShaderSet};
pub use input::{ExitSignal, InputSnapshot, Key};
pub use mode_selector::ModeSelector;
pub use parameters::{DimensionConstants, ParameterBinder, ShaderProgram, ShaderRole, TargetSizes, parameter_names};
pub use pass_table::{PassPlan, PassSpec, SamplerFilterMode};
pub use scaling_mode::ScalingMode;
pub use upscaler::{FrameControl, Upscaler};
