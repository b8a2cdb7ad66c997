//! Edge-triggered scaling mode selection

use crate::{InputSnapshot, Key, ScalingMode};

/// Selection keys in priority order; the first key with a rising edge wins
const SELECTION_KEYS: [(Key, ScalingMode); 4] = [
    (Key::Digit(1), ScalingMode::Bilinear),
    (Key::Digit(2), ScalingMode::Lanczos),
    (Key::Digit(3), ScalingMode::FsrEasuOnly),
    (Key::Digit(4), ScalingMode::Fsr),
];

/// Tracks the active scaling mode across frames
///
/// A mode switch happens only when a selection key goes down, so holding a key
/// never retriggers.
#[derive(Debug, Clone, Default)]
pub struct ModeSelector {
    mode: ScalingMode,
}

impl ModeSelector {
    pub fn new(initial: ScalingMode) -> Self {
        Self { mode: initial }
    }

    pub fn mode(&self) -> ScalingMode {
        self.mode
    }

    /// Applies one input step and returns the mode that is active afterwards
    ///
    /// # Arguments
    /// * `current` - Keys held during this step
    /// * `previous` - Keys held during the previous step
    pub fn process_input(&mut self, current: &InputSnapshot, previous: &InputSnapshot) -> ScalingMode {
        let pressed = SELECTION_KEYS
            .iter()
            .find(|(key, _)| current.is_key_down(*key) && !previous.is_key_down(*key))
            .map(|&(_, mode)| mode);

        if let Some(mode) = pressed {
            if mode != self.mode {
                tracing::info!("Scaling mode set to: {} (was {})", mode.name(), self.mode.name());
            }
            self.mode = mode;
        }

        self.mode
    }
}
