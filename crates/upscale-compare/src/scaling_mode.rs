//! Selectable upscaling algorithms
//!
//! Each mode names one row of the render pass table; see [`crate::PassPlan`].

use crate::pass_table::{self, PassPlan};

/// Upscaling algorithm used to bring the source image to output resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalingMode {
    /// Plain bilinear resize, no shader involved
    #[default]
    Bilinear,
    /// Single-pass Lanczos resampling
    Lanczos,
    /// FSR edge-adaptive upsampling without the sharpening stage
    FsrEasuOnly,
    /// FSR upsampling followed by contrast-adaptive sharpening
    Fsr,
}

impl ScalingMode {
    /// All modes in selection order
    pub const ALL: [ScalingMode; 4] = [ScalingMode::Bilinear, ScalingMode::Lanczos, ScalingMode::FsrEasuOnly, ScalingMode::Fsr];

    /// Returns the human-readable name of this mode
    pub fn name(&self) -> &'static str {
        match self {
            ScalingMode::Bilinear => "Bilinear",
            ScalingMode::Lanczos => "Lanczos",
            ScalingMode::FsrEasuOnly => "FSR (EASU only)",
            ScalingMode::Fsr => "FSR (EASU + RCAS)",
        }
    }

    /// Position of this mode in [`ScalingMode::ALL`]
    pub fn index(&self) -> usize {
        match self {
            ScalingMode::Bilinear => 0,
            ScalingMode::Lanczos => 1,
            ScalingMode::FsrEasuOnly => 2,
            ScalingMode::Fsr => 3,
        }
    }

    /// Returns the render passes this mode runs every frame
    pub fn pass_plan(&self) -> &'static PassPlan {
        &pass_table::PASS_PLANS[self.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_bilinear() {
        assert_eq!(ScalingMode::default(), ScalingMode::Bilinear);
    }

    #[test]
    fn test_index_matches_declaration_order() {
        for (i, mode) in ScalingMode::ALL.iter().enumerate() {
            assert_eq!(mode.index(), i);
        }
    }
}
