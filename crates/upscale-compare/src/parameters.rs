//! Shader parameter contract
//!
//! Every upscaling shader exposes a small set of named scalar constants derived from
//! the source, intermediate and output dimensions. [`ParameterBinder`] checks that a
//! shader declares everything its [`ShaderRole`] needs when it is loaded, and uploads
//! the values before each pass that runs the shader.

use crate::{ConfigurationError, ParameterError, SurfaceSize};

/// Names of the constants shared by all upscaling shaders
pub mod parameter_names {
    pub const INPUT_WIDTH: &str = "inputWidth";
    pub const INPUT_HEIGHT: &str = "inputHeight";
    pub const INPUT_RECIPROCAL_PIXEL_X: &str = "inputReciprocalPixelX";
    pub const INPUT_RECIPROCAL_PIXEL_Y: &str = "inputReciprocalPixelY";
    pub const OUTPUT_WIDTH: &str = "outputWidth";
    pub const OUTPUT_HEIGHT: &str = "outputHeight";
}

use parameter_names::*;

/// An opaque GPU program with named scalar parameters
pub trait ShaderProgram {
    /// Name used in logs and error messages
    fn label(&self) -> &str;

    /// Returns true if the program declares a parameter with this name
    fn has_parameter(&self, name: &str) -> bool;

    /// Sets a parameter for the next invocation of the program
    fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), ParameterError>;
}

/// The job a shader performs in the pass table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderRole {
    /// Single-pass Lanczos upscaler
    Lanczos,
    /// FSR edge-adaptive upsampling
    Easu,
    /// FSR contrast-adaptive sharpening, runs on the already upscaled image
    Rcas,
}

impl ShaderRole {
    pub const ALL: [ShaderRole; 3] = [ShaderRole::Lanczos, ShaderRole::Easu, ShaderRole::Rcas];

    /// Returns the parameters a shader in this role must declare
    pub fn required_parameters(&self) -> &'static [&'static str] {
        match self {
            ShaderRole::Lanczos => &[INPUT_WIDTH, INPUT_HEIGHT, INPUT_RECIPROCAL_PIXEL_X, INPUT_RECIPROCAL_PIXEL_Y],
            ShaderRole::Easu => &[INPUT_WIDTH, INPUT_HEIGHT, INPUT_RECIPROCAL_PIXEL_X, INPUT_RECIPROCAL_PIXEL_Y, OUTPUT_WIDTH, OUTPUT_HEIGHT],
            ShaderRole::Rcas => &[INPUT_WIDTH, INPUT_HEIGHT],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShaderRole::Lanczos => "Lanczos",
            ShaderRole::Easu => "FSR EASU",
            ShaderRole::Rcas => "FSR RCAS",
        }
    }
}

/// Input-size constants for a shader reading an image of a given size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionConstants {
    pub width: f32,
    pub height: f32,
    pub reciprocal_pixel_x: f32,
    pub reciprocal_pixel_y: f32,
}

impl DimensionConstants {
    pub fn new(size: SurfaceSize) -> Self {
        let width = size.width as f32;
        let height = size.height as f32;
        Self {
            width,
            height,
            reciprocal_pixel_x: 1.0 / width,
            reciprocal_pixel_y: 1.0 / height,
        }
    }
}

/// Sizes of the render targets at the time a pass is recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSizes {
    /// Actual size of the intermediate surface
    pub intermediate: SurfaceSize,
    /// Configured output resolution
    pub output: SurfaceSize,
}

/// Computes and uploads shader constants
#[derive(Debug, Clone)]
pub struct ParameterBinder {
    source_constants: DimensionConstants,
}

impl ParameterBinder {
    /// Creates a binder for a source image of the given size
    ///
    /// Source-derived constants never change afterwards and are computed here once.
    pub fn new(source_size: SurfaceSize) -> Self {
        Self {
            source_constants: DimensionConstants::new(source_size),
        }
    }

    /// Checks that a shader declares every parameter its role requires
    ///
    /// # Errors
    /// Returns [`ConfigurationError::MissingParameter`] naming the first absent parameter.
    pub fn validate<S: ShaderProgram + ?Sized>(shader: &S, role: ShaderRole) -> Result<(), ConfigurationError> {
        for &parameter in role.required_parameters() {
            if !shader.has_parameter(parameter) {
                return Err(ConfigurationError::MissingParameter {
                    shader: shader.label().to_string(),
                    parameter,
                });
            }
        }

        tracing::debug!("Shader `{}` satisfies the {} parameter contract", shader.label(), role.name());
        Ok(())
    }

    /// Uploads the constants for `role` into `shader`
    ///
    /// Output-derived values are recomputed from `targets` on every call.
    pub fn bind<S: ShaderProgram + ?Sized>(&self, shader: &mut S, role: ShaderRole, targets: &TargetSizes) -> Result<(), ParameterError> {
        match role {
            ShaderRole::Lanczos => set_input_constants(shader, &self.source_constants, true),
            ShaderRole::Easu => {
                set_input_constants(shader, &self.source_constants, true)?;
                shader.set_parameter(OUTPUT_WIDTH, targets.output.width as f32)?;
                shader.set_parameter(OUTPUT_HEIGHT, targets.output.height as f32)
            }
            // RCAS sharpens the upscaled image, so its input is the intermediate surface
            ShaderRole::Rcas => set_input_constants(shader, &DimensionConstants::new(targets.intermediate), false),
        }
    }
}

fn set_input_constants<S: ShaderProgram + ?Sized>(shader: &mut S, constants: &DimensionConstants, with_reciprocal: bool) -> Result<(), ParameterError> {
    shader.set_parameter(INPUT_WIDTH, constants.width)?;
    shader.set_parameter(INPUT_HEIGHT, constants.height)?;
    if with_reciprocal {
        shader.set_parameter(INPUT_RECIPROCAL_PIXEL_X, constants.reciprocal_pixel_x)?;
        shader.set_parameter(INPUT_RECIPROCAL_PIXEL_Y, constants.reciprocal_pixel_y)?;
    }
    Ok(())
}
