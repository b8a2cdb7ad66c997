//! Controller polling for the viewer

use gilrs::{Button, Gilrs};
use upscale_compare::{InputSnapshot, Key};

/// Mirrors the Back button of the first connected controller into the key snapshot
pub struct GamepadInput {
    /// `None` when the platform has no usable controller backend
    gilrs: Option<Gilrs>,
}

impl GamepadInput {
    pub fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => Some(gilrs),
            // Dummy context that reports no controllers
            Err(gilrs::Error::NotImplemented(dummy)) => Some(dummy),
            Err(error) => {
                tracing::warn!("Controller input unavailable: {error}");
                None
            }
        };
        Self { gilrs }
    }

    /// Drains pending controller events and records whether Back is held
    pub fn poll(&mut self, input: &mut InputSnapshot) {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return;
        };

        while gilrs.next_event().is_some() {}

        let back_held = gilrs.gamepads().next().is_some_and(|(_, gamepad)| gamepad.is_pressed(Button::Select));
        if back_held {
            input.press(Key::GamepadBack);
        } else {
            input.release(Key::GamepadBack);
        }
    }
}
