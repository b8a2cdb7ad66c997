//! Renderer configuration
//!
//! Output resolution and the debug clear colours used for the intermediate and
//! presentable surfaces. Colours parse from `#rrggbb` / `#rrggbbaa` strings so the
//! host can expose them on its command line.

use crate::ConfigurationError;
use std::fmt;
use std::str::FromStr;

/// Reference output resolution of the comparison window
pub const DEFAULT_OUTPUT_SIZE: SurfaceSize = SurfaceSize::new(1600, 1200);

/// Width and height of an image or render target in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Checks the size against a device's largest 2D texture dimension
    ///
    /// # Errors
    /// Returns [`ConfigurationError::SurfaceTooLarge`] if either side is over `max_dimension`.
    pub fn check_fits(&self, max_dimension: u32) -> Result<(), ConfigurationError> {
        if self.width > max_dimension || self.height > max_dimension {
            return Err(ConfigurationError::SurfaceTooLarge {
                size: *self,
                max_dimension,
            });
        }
        Ok(())
    }
}

impl fmt::Display for SurfaceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Linear RGBA colour with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    /// Debug colour for the intermediate surface, shows through wherever Pass A leaves a gap
    pub const PURPLE: Rgba = Rgba::from_rgb8(128, 0, 128);
    /// Debug colour for the presentable surface
    pub const CORNFLOWER_BLUE: Rgba = Rgba::from_rgb8(100, 149, 237);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0, 1.0)
    }
}

impl From<Rgba> for wgpu::Color {
    fn from(color: Rgba) -> Self {
        wgpu::Color {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        }
    }
}

impl FromStr for Rgba {
    type Err = RgbaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 && hex.len() != 8 {
            return Err(RgbaParseError::InvalidLength(hex.len()));
        }

        let mut channels = [255u8; 4];
        for (i, channel) in channels.iter_mut().enumerate().take(hex.len() / 2) {
            let digits = hex.get(i * 2..i * 2 + 2).ok_or(RgbaParseError::InvalidDigit)?;
            *channel = u8::from_str_radix(digits, 16).map_err(|_| RgbaParseError::InvalidDigit)?;
        }

        let [r, g, b, a] = channels.map(|c| c as f64 / 255.0);
        Ok(Rgba::new(r, g, b, a))
    }
}

/// Error types for colour parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RgbaParseError {
    #[error("expected 6 or 8 hex digits, got {0}")]
    InvalidLength(usize),
    #[error("invalid hex digit")]
    InvalidDigit,
}

/// Clear colours of the two render passes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearColors {
    /// Applied to the intermediate surface before Pass A
    pub intermediate: Rgba,
    /// Applied to the presentable surface before Pass B
    pub presentable: Rgba,
}

impl Default for ClearColors {
    fn default() -> Self {
        Self {
            intermediate: Rgba::PURPLE,
            presentable: Rgba::CORNFLOWER_BLUE,
        }
    }
}

/// Configuration for [`crate::FrameRenderer`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpscalerConfig {
    /// Presentation resolution; the intermediate surface always matches it
    pub output_size: SurfaceSize,
    pub clear_colors: ClearColors,
}

impl Default for UpscalerConfig {
    fn default() -> Self {
        Self {
            output_size: DEFAULT_OUTPUT_SIZE,
            clear_colors: ClearColors::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_reference_resolution() {
        let config = UpscalerConfig::default();
        assert_eq!(config.output_size, SurfaceSize::new(1600, 1200));
        assert_ne!(config.clear_colors.intermediate, config.clear_colors.presentable);
    }

    #[test]
    fn test_parse_rgb_hex() {
        let color: Rgba = "#ff0080".parse().unwrap();
        assert_eq!(color.r, 1.0);
        assert_eq!(color.g, 0.0);
        assert_eq!(color.b, 128.0 / 255.0);
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn test_parse_rgba_hex_without_prefix() {
        let color: Rgba = "00000000".parse().unwrap();
        assert_eq!(color, Rgba::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!("#fff".parse::<Rgba>(), Err(RgbaParseError::InvalidLength(3)));
        assert_eq!("#gg0000".parse::<Rgba>(), Err(RgbaParseError::InvalidDigit));
        // six bytes, but not six hex digits
        assert_eq!("#ééé".parse::<Rgba>(), Err(RgbaParseError::InvalidDigit));
    }

    #[test]
    fn test_surface_size_display() {
        assert_eq!(SurfaceSize::new(1600, 1200).to_string(), "1600x1200");
        assert!(SurfaceSize::new(0, 10).is_empty());
    }

    #[test]
    fn test_check_fits_limits_each_side() {
        assert!(SurfaceSize::new(8192, 8192).check_fits(8192).is_ok());
        for size in [SurfaceSize::new(9000, 1200), SurfaceSize::new(1600, 8193)] {
            match size.check_fits(8192) {
                Err(ConfigurationError::SurfaceTooLarge { size: reported, max_dimension }) => {
                    assert_eq!(reported, size);
                    assert_eq!(max_dimension, 8192);
                }
                other => panic!("unexpected result for {size}: {other:?}"),
            }
        }
    }
}
