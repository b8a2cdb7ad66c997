//! Application event handler for the viewer
//!
//! Translates winit keyboard events and the controller Back button into the held-key
//! snapshot the upscaler polls, and drives one upscaler step per redraw.

use super::context::{ViewerContext, ViewerError};
use super::gamepad::GamepadInput;
use std::path::PathBuf;
use upscale_compare::{ExitSignal, FrameControl, InputSnapshot, Key, UpscalerConfig};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowId,
};

/// Main viewer application structure
pub struct ViewerApp {
    image: PathBuf,
    shader_dir: PathBuf,
    config: UpscalerConfig,
    exit_signal: ExitSignal,
    /// Keys currently held down
    input: InputSnapshot,
    gamepad: GamepadInput,
    context: Option<ViewerContext>,
    /// First error that ended the event loop
    error: Option<ViewerError>,
}

impl ViewerApp {
    /// Creates a new viewer application instance
    ///
    /// # Arguments
    /// * `image` - Source image to upscale
    /// * `shader_dir` - Directory holding the upscaling shaders
    /// * `config` - Output size and debug clear colours
    /// * `exit_signal` - Flag raised by the Ctrl+C handler
    pub fn new(image: PathBuf, shader_dir: PathBuf, config: UpscalerConfig, exit_signal: ExitSignal) -> Self {
        Self {
            image,
            shader_dir,
            config,
            exit_signal,
            input: InputSnapshot::new(),
            gamepad: GamepadInput::new(),
            context: None,
            error: None,
        }
    }

    /// Returns the error that stopped the viewer, if any
    pub fn into_result(self) -> Result<(), ViewerError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ViewerError) {
        tracing::error!("{error}");
        self.error.get_or_insert(error);
        event_loop.exit();
    }
}

/// Maps a physical key to the upscaler's key space
///
/// Keys the upscaler never looks at are dropped.
fn translate_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Digit1 => Some(Key::Digit(1)),
        KeyCode::Digit2 => Some(Key::Digit(2)),
        KeyCode::Digit3 => Some(Key::Digit(3)),
        KeyCode::Digit4 => Some(Key::Digit(4)),
        KeyCode::Escape => Some(Key::Escape),
        _ => None,
    }
}

impl ApplicationHandler for ViewerApp {
    /// Creates the window and GPU state on first resume
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.context.is_some() {
            return;
        }

        match ViewerContext::new(event_loop, &self.image, &self.shader_dir, self.config, self.exit_signal.clone()) {
            Ok(context) => self.context = Some(context),
            Err(error) => {
                self.fail(event_loop, error);
                return;
            }
        }

        println!();
        println!("Keyboard shortcuts:");
        println!("  - 1: Bilinear");
        println!("  - 2: Lanczos");
        println!("  - 3: FSR (EASU only)");
        println!("  - 4: FSR (EASU + RCAS)");
        println!("  - Esc / controller Back: Quit");
        println!();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            // Key state is only recorded here; the upscaler looks at it once per frame
            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    state,
                    physical_key: PhysicalKey::Code(code),
                    repeat: false,
                    ..
                },
                ..
            } => {
                let Some(key) = translate_key(code) else {
                    return;
                };
                match state {
                    ElementState::Pressed => self.input.press(key),
                    ElementState::Released => self.input.release(key),
                }
            }

            WindowEvent::RedrawRequested => {
                self.gamepad.poll(&mut self.input);

                let Some(context) = self.context.as_mut() else {
                    return;
                };

                match context.step(&self.input) {
                    Ok(FrameControl::Continue) => context.request_redraw(),
                    Ok(FrameControl::Exit) => event_loop.exit(),
                    Err(error) => self.fail(event_loop, error),
                }
            }

            WindowEvent::Resized(new_size) => {
                if let Some(context) = self.context.as_mut() {
                    if let Err(error) = context.resize(new_size) {
                        self.fail(event_loop, error);
                    }
                }
            }

            _ => {}
        }
    }
}
