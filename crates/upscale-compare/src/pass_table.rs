//! Static render pass table
//!
//! Every frame runs two passes: Pass A draws the source image into the intermediate
//! surface, Pass B draws the intermediate surface onto the presentable surface. Which
//! shader and sampler each pass uses depends only on the active [`ScalingMode`].

use crate::parameters::ShaderRole;

/// Texture sampling filter modes
///
/// Both modes clamp to edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerFilterMode {
    /// Nearest neighbor sampling, required by the FSR stages which do their own filtering
    Nearest,
    /// Linear interpolation sampling
    Linear,
}

/// A single render pass within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSpec {
    /// Shader to run, or `None` for a plain textured copy
    pub shader: Option<ShaderRole>,
    /// Sampler used to read the pass input
    pub sampler: SamplerFilterMode,
}

impl PassSpec {
    const PASSTHROUGH: PassSpec = PassSpec {
        shader: None,
        sampler: SamplerFilterMode::Linear,
    };

    const fn shaded(role: ShaderRole, sampler: SamplerFilterMode) -> Self {
        Self { shader: Some(role), sampler }
    }
}

/// The two passes of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassPlan {
    /// Pass A: source image to intermediate surface
    pub upscale: PassSpec,
    /// Pass B: intermediate surface to presentable surface
    pub present: PassSpec,
}

/// Pass plans indexed by [`ScalingMode::index`]
pub(crate) static PASS_PLANS: [PassPlan; 4] = [
    // Bilinear
    PassPlan {
        upscale: PassSpec::PASSTHROUGH,
        present: PassSpec::PASSTHROUGH,
    },
    // Lanczos
    PassPlan {
        upscale: PassSpec::shaded(ShaderRole::Lanczos, SamplerFilterMode::Linear),
        present: PassSpec::PASSTHROUGH,
    },
    // FsrEasuOnly
    PassPlan {
        upscale: PassSpec::shaded(ShaderRole::Easu, SamplerFilterMode::Nearest),
        present: PassSpec::PASSTHROUGH,
    },
    // Fsr
    PassPlan {
        upscale: PassSpec::shaded(ShaderRole::Easu, SamplerFilterMode::Nearest),
        present: PassSpec::shaded(ShaderRole::Rcas, SamplerFilterMode::Nearest),
    },
];
