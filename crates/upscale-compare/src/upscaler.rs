//! Per-frame update/render interface driven by the host's frame loop

use crate::{ExitSignal, FrameRenderer, GraphicsBackend, InputSnapshot, ModeSelector, RenderError, ScalingMode};

/// What the frame loop should do after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Exit,
}

/// Mode selection plus rendering, one step per frame
///
/// The host calls [`Upscaler::update`] with the current input, then [`Upscaler::render`],
/// strictly in that order. The upscaler owns no loop itself.
pub struct Upscaler<B: GraphicsBackend> {
    selector: ModeSelector,
    renderer: FrameRenderer<B>,
    previous_input: InputSnapshot,
    exit_signal: ExitSignal,
}

impl<B: GraphicsBackend> Upscaler<B> {
    /// Creates an upscaler starting in the default mode
    pub fn new(renderer: FrameRenderer<B>, exit_signal: ExitSignal) -> Self {
        Self {
            selector: ModeSelector::default(),
            renderer,
            previous_input: InputSnapshot::default(),
            exit_signal,
        }
    }

    pub fn mode(&self) -> ScalingMode {
        self.selector.mode()
    }

    pub fn renderer(&self) -> &FrameRenderer<B> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut FrameRenderer<B> {
        &mut self.renderer
    }

    /// Processes one input step
    ///
    /// Cancellation is checked first; when it is requested the mode is left untouched.
    pub fn update(&mut self, input: &InputSnapshot) -> FrameControl {
        if self.exit_signal.is_requested() || input.is_cancel_requested() {
            tracing::info!("Exit requested");
            return FrameControl::Exit;
        }

        self.selector.process_input(input, &self.previous_input);
        self.previous_input.clone_from(input);
        FrameControl::Continue
    }

    /// Renders and presents a frame in the current mode
    pub fn render(&mut self, backend: &mut B) -> Result<(), RenderError> {
        self.renderer.render(backend, self.selector.mode())
    }

    /// Runs update then render; the frame is skipped when exiting
    pub fn step(&mut self, backend: &mut B, input: &InputSnapshot) -> Result<FrameControl, RenderError> {
        let control = self.update(input);
        if control == FrameControl::Continue {
            self.render(backend)?;
        }
        Ok(control)
    }
}
