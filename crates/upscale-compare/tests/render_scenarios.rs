//! Frame rendering scenarios driven through a recording backend

use std::collections::HashMap;
use upscale_compare::{
    ClearColors, ConfigurationError, DrawPass, ExitSignal, FrameControl, FrameRenderer, GraphicsBackend, InputSnapshot, Key, ParameterError, PassTarget,
    RenderError, Rgba, SamplerFilterMode, ScalingMode, ShaderProgram, ShaderRole, ShaderSet, SurfaceSize, Upscaler, UpscalerConfig, parameter_names,
};

const SOURCE_SIZE: SurfaceSize = SurfaceSize::new(800, 600);
const OUTPUT_SIZE: SurfaceSize = SurfaceSize::new(1600, 1200);
/// Texture limit of the recording backend, matching wgpu's default
const MAX_DIMENSION: u32 = 8192;

/// Texture handle of the recording backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TextureId {
    id: u32,
    size: SurfaceSize,
}

/// Shader double keeping every parameter it declares
#[derive(Debug, Clone)]
struct RecordingShader {
    role: ShaderRole,
    values: HashMap<String, f32>,
    declared: Vec<&'static str>,
}

impl RecordingShader {
    fn new(role: ShaderRole) -> Self {
        Self {
            role,
            values: HashMap::new(),
            declared: role.required_parameters().to_vec(),
        }
    }

    fn without(mut self, parameter: &str) -> Self {
        self.declared.retain(|&p| p != parameter);
        self
    }
}

impl ShaderProgram for RecordingShader {
    fn label(&self) -> &str {
        self.role.name()
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.declared.contains(&name)
    }

    fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), ParameterError> {
        if !self.has_parameter(name) {
            return Err(ParameterError::Unknown {
                shader: self.label().to_string(),
                parameter: name.to_string(),
            });
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }
}

/// What a draw looked like when it was recorded
#[derive(Debug, Clone, PartialEq)]
struct RecordedPass {
    label: &'static str,
    target: Option<TextureId>,
    clear_color: Rgba,
    source: TextureId,
    shader: Option<(ShaderRole, HashMap<String, f32>)>,
    sampler: SamplerFilterMode,
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    BeginFrame,
    Draw(RecordedPass),
    EndFrame,
}

#[derive(Debug)]
struct RecordingBackend {
    next_id: u32,
    max_dimension: u32,
    events: Vec<Event>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            next_id: 0,
            max_dimension: MAX_DIMENSION,
            events: Vec::new(),
        }
    }
}

impl RecordingBackend {
    fn create_source(&mut self, size: SurfaceSize) -> TextureId {
        self.next_id += 1;
        TextureId { id: self.next_id, size }
    }

    fn frames(&self) -> Vec<Vec<RecordedPass>> {
        let mut frames = Vec::new();
        let mut current = None;
        for event in &self.events {
            match event {
                Event::BeginFrame => current = Some(Vec::new()),
                Event::Draw(pass) => current.as_mut().expect("draw outside frame").push(pass.clone()),
                Event::EndFrame => frames.push(current.take().expect("end without begin")),
            }
        }
        frames
    }

    fn last_frame(&self) -> Vec<RecordedPass> {
        self.frames().pop().expect("no frame rendered")
    }
}

impl GraphicsBackend for RecordingBackend {
    type Texture = TextureId;
    type Shader = RecordingShader;

    fn texture_size(&self, texture: &TextureId) -> SurfaceSize {
        texture.size
    }

    fn max_texture_dimension(&self) -> u32 {
        self.max_dimension
    }

    fn create_render_target(&mut self, size: SurfaceSize) -> TextureId {
        self.create_source(size)
    }

    fn begin_frame(&mut self) -> Result<(), RenderError> {
        self.events.push(Event::BeginFrame);
        Ok(())
    }

    fn draw_pass(&mut self, pass: DrawPass<'_, TextureId, RecordingShader>) -> Result<(), RenderError> {
        self.events.push(Event::Draw(RecordedPass {
            label: pass.label,
            target: match pass.target {
                PassTarget::Texture(texture) => Some(*texture),
                PassTarget::Presentable => None,
            },
            clear_color: pass.clear_color,
            source: *pass.source,
            shader: pass.shader.map(|s| (s.role, s.values.clone())),
            sampler: pass.sampler,
        }));
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        self.events.push(Event::EndFrame);
        Ok(())
    }
}

fn shaders() -> ShaderSet<RecordingShader> {
    ShaderSet {
        lanczos: RecordingShader::new(ShaderRole::Lanczos),
        easu: RecordingShader::new(ShaderRole::Easu),
        rcas: RecordingShader::new(ShaderRole::Rcas),
    }
}

fn setup() -> (RecordingBackend, Upscaler<RecordingBackend>) {
    let mut backend = RecordingBackend::default();
    let source = backend.create_source(SOURCE_SIZE);
    let renderer = FrameRenderer::new(&mut backend, source, shaders(), UpscalerConfig::default()).unwrap();
    (backend, Upscaler::new(renderer, ExitSignal::new()))
}

fn press(keys: &[Key]) -> InputSnapshot {
    keys.iter().copied().collect()
}

fn param(pass: &RecordedPass, name: &str) -> f32 {
    let (_, values) = pass.shader.as_ref().expect("pass has no shader");
    values[name]
}

#[test]
fn test_default_mode_is_plain_bilinear_resize() {
    let (mut backend, mut upscaler) = setup();

    assert_eq!(upscaler.step(&mut backend, &InputSnapshot::new()).unwrap(), FrameControl::Continue);
    assert_eq!(upscaler.mode(), ScalingMode::Bilinear);

    let frame = backend.last_frame();
    assert_eq!(frame.len(), 2);
    let (upscale, present) = (&frame[0], &frame[1]);

    assert_eq!(upscale.shader, None);
    assert_eq!(upscale.sampler, SamplerFilterMode::Linear);
    assert_eq!(upscale.source.size, SOURCE_SIZE);
    assert_eq!(upscale.target.map(|t| t.size), Some(OUTPUT_SIZE));

    assert_eq!(present.shader, None);
    assert_eq!(present.sampler, SamplerFilterMode::Linear);
    assert_eq!(present.target, None);
}

#[test]
fn test_key_two_selects_lanczos() {
    let (mut backend, mut upscaler) = setup();

    upscaler.step(&mut backend, &press(&[Key::Digit(2)])).unwrap();
    assert_eq!(upscaler.mode(), ScalingMode::Lanczos);

    let frame = backend.last_frame();
    assert_eq!(frame[0].shader.as_ref().map(|(role, _)| *role), Some(ShaderRole::Lanczos));
    assert_eq!(frame[0].sampler, SamplerFilterMode::Linear);
    assert_eq!(param(&frame[0], parameter_names::INPUT_WIDTH), 800.0);
    assert_eq!(param(&frame[0], parameter_names::INPUT_RECIPROCAL_PIXEL_Y), 1.0 / 600.0);
    assert_eq!(frame[1].shader, None);
}

#[test]
fn test_holding_key_two_does_not_retrigger() {
    let (mut backend, mut upscaler) = setup();
    let held = press(&[Key::Digit(2)]);

    let mut modes = Vec::new();
    for _ in 0..5 {
        upscaler.step(&mut backend, &held).unwrap();
        modes.push(upscaler.mode());
    }

    assert_eq!(modes, vec![ScalingMode::Lanczos; 5]);
    assert_eq!(backend.frames().len(), 5);
}

#[test]
fn test_holding_does_not_undo_a_later_selection() {
    let (mut backend, mut upscaler) = setup();

    upscaler.step(&mut backend, &press(&[Key::Digit(2)])).unwrap();
    upscaler.step(&mut backend, &press(&[Key::Digit(2), Key::Digit(3)])).unwrap();
    upscaler.step(&mut backend, &press(&[Key::Digit(2), Key::Digit(3)])).unwrap();
    assert_eq!(upscaler.mode(), ScalingMode::FsrEasuOnly);
}

#[test]
fn test_key_four_runs_easu_then_rcas_on_output_size() {
    let (mut backend, mut upscaler) = setup();

    upscaler.step(&mut backend, &press(&[Key::Digit(4)])).unwrap();
    assert_eq!(upscaler.mode(), ScalingMode::Fsr);

    let frame = backend.last_frame();
    let (easu, rcas) = (&frame[0], &frame[1]);

    assert_eq!(easu.shader.as_ref().map(|(role, _)| *role), Some(ShaderRole::Easu));
    assert_eq!(easu.sampler, SamplerFilterMode::Nearest);
    assert_eq!(param(easu, parameter_names::INPUT_WIDTH), 800.0);
    assert_eq!(param(easu, parameter_names::INPUT_HEIGHT), 600.0);
    assert_eq!(param(easu, parameter_names::OUTPUT_WIDTH), 1600.0);
    assert_eq!(param(easu, parameter_names::OUTPUT_HEIGHT), 1200.0);

    assert_eq!(rcas.shader.as_ref().map(|(role, _)| *role), Some(ShaderRole::Rcas));
    assert_eq!(rcas.sampler, SamplerFilterMode::Nearest);
    assert_eq!(param(rcas, parameter_names::INPUT_WIDTH), 1600.0);
    assert_eq!(param(rcas, parameter_names::INPUT_HEIGHT), 1200.0);
}

#[test]
fn test_easu_only_presents_with_passthrough() {
    let (mut backend, mut upscaler) = setup();

    upscaler.step(&mut backend, &press(&[Key::Digit(3)])).unwrap();

    let frame = backend.last_frame();
    assert_eq!(frame[0].sampler, SamplerFilterMode::Nearest);
    assert_eq!(frame[1].shader, None);
    assert_eq!(frame[1].sampler, SamplerFilterMode::Linear);
}

#[test]
fn test_simultaneous_keys_resolve_to_lowest_index() {
    let (mut backend, mut upscaler) = setup();

    upscaler.step(&mut backend, &press(&[Key::Digit(2)])).unwrap();
    upscaler.step(&mut backend, &InputSnapshot::new()).unwrap();
    upscaler.step(&mut backend, &press(&[Key::Digit(1), Key::Digit(3)])).unwrap();

    assert_eq!(upscaler.mode(), ScalingMode::Bilinear);
}

#[test]
fn test_intermediate_written_before_read_in_every_mode() {
    for (digit, mode) in (1..=4).zip(ScalingMode::ALL) {
        let (mut backend, mut upscaler) = setup();
        upscaler.step(&mut backend, &press(&[Key::Digit(digit)])).unwrap();
        assert_eq!(upscaler.mode(), mode);

        let intermediate = *upscaler.renderer().intermediate();
        let frame = backend.last_frame();
        assert_eq!(frame.len(), 2, "{mode:?}");
        assert_eq!(frame[0].target, Some(intermediate), "{mode:?}");
        assert_ne!(frame[0].source, intermediate, "{mode:?}");
        assert_eq!(frame[1].source, intermediate, "{mode:?}");
        assert_eq!(frame[1].target, None, "{mode:?}");
    }
}

#[test]
fn test_passes_clear_to_configured_colors() {
    let mut backend = RecordingBackend::default();
    let source = backend.create_source(SOURCE_SIZE);
    let clear_colors = ClearColors {
        intermediate: Rgba::new(1.0, 0.0, 0.0, 1.0),
        presentable: Rgba::new(0.0, 1.0, 0.0, 1.0),
    };
    let config = UpscalerConfig {
        clear_colors,
        ..UpscalerConfig::default()
    };
    let mut renderer = FrameRenderer::new(&mut backend, source, shaders(), config).unwrap();

    renderer.render(&mut backend, ScalingMode::Bilinear).unwrap();

    let frame = backend.last_frame();
    assert_eq!(frame[0].clear_color, clear_colors.intermediate);
    assert_eq!(frame[1].clear_color, clear_colors.presentable);
    assert_eq!(frame[0].label, "Upscale pass");
    assert_eq!(frame[1].label, "Present pass");
}

#[test]
fn test_missing_parameter_fails_at_load() {
    let mut backend = RecordingBackend::default();
    let source = backend.create_source(SOURCE_SIZE);
    let shaders = ShaderSet {
        rcas: RecordingShader::new(ShaderRole::Rcas).without(parameter_names::INPUT_HEIGHT),
        ..shaders()
    };

    let result = FrameRenderer::new(&mut backend, source, shaders, UpscalerConfig::default());
    match result {
        Err(ConfigurationError::MissingParameter { shader, parameter }) => {
            assert_eq!(shader, "FSR RCAS");
            assert_eq!(parameter, parameter_names::INPUT_HEIGHT);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("renderer accepted an incomplete shader"),
    }
    assert!(backend.events.is_empty());
}

#[test]
fn test_empty_source_is_rejected() {
    let mut backend = RecordingBackend::default();
    let source = backend.create_source(SurfaceSize::new(0, 600));
    let result = FrameRenderer::new(&mut backend, source, shaders(), UpscalerConfig::default());
    assert!(matches!(result, Err(ConfigurationError::EmptySource(_))));
}

#[test]
fn test_resize_recreates_intermediate_and_rebinds() {
    let mut backend = RecordingBackend::default();
    let source = backend.create_source(SOURCE_SIZE);
    let mut renderer = FrameRenderer::new(&mut backend, source, shaders(), UpscalerConfig::default()).unwrap();
    let original = *renderer.intermediate();

    renderer.resize_output(&mut backend, OUTPUT_SIZE).unwrap();
    assert_eq!(*renderer.intermediate(), original);

    let smaller = SurfaceSize::new(1024, 768);
    renderer.resize_output(&mut backend, smaller).unwrap();
    assert_ne!(*renderer.intermediate(), original);
    assert_eq!(renderer.intermediate().size, smaller);

    renderer.render(&mut backend, ScalingMode::Fsr).unwrap();
    let frame = backend.last_frame();
    assert_eq!(param(&frame[0], parameter_names::OUTPUT_WIDTH), 1024.0);
    assert_eq!(param(&frame[1], parameter_names::INPUT_HEIGHT), 768.0);

    assert!(matches!(renderer.resize_output(&mut backend, SurfaceSize::new(0, 0)), Err(ConfigurationError::EmptyOutput(_))));
}

#[test]
fn test_escape_exits_without_rendering() {
    let (mut backend, mut upscaler) = setup();

    upscaler.step(&mut backend, &press(&[Key::Digit(2)])).unwrap();
    let control = upscaler.step(&mut backend, &press(&[Key::Escape, Key::Digit(4)])).unwrap();

    assert_eq!(control, FrameControl::Exit);
    assert_eq!(upscaler.mode(), ScalingMode::Lanczos);
    assert_eq!(backend.frames().len(), 1);
}

#[test]
fn test_exit_signal_stops_next_frame() {
    let mut backend = RecordingBackend::default();
    let source = backend.create_source(SOURCE_SIZE);
    let renderer = FrameRenderer::new(&mut backend, source, shaders(), UpscalerConfig::default()).unwrap();
    let signal = ExitSignal::new();
    let mut upscaler = Upscaler::new(renderer, signal.clone());

    assert_eq!(upscaler.step(&mut backend, &InputSnapshot::new()).unwrap(), FrameControl::Continue);
    signal.request();
    assert_eq!(upscaler.step(&mut backend, &InputSnapshot::new()).unwrap(), FrameControl::Exit);
    assert_eq!(backend.frames().len(), 1);
    assert_eq!(backend.events.last(), Some(&Event::EndFrame));
}

#[test]
fn test_oversized_source_is_rejected() {
    let mut backend = RecordingBackend::default();
    let source = backend.create_source(SurfaceSize::new(MAX_DIMENSION + 1, 600));

    match FrameRenderer::new(&mut backend, source, shaders(), UpscalerConfig::default()) {
        Err(ConfigurationError::SurfaceTooLarge { size, max_dimension }) => {
            assert_eq!(size, SurfaceSize::new(MAX_DIMENSION + 1, 600));
            assert_eq!(max_dimension, MAX_DIMENSION);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("renderer accepted an oversized source"),
    }
}

#[test]
fn test_oversized_output_is_rejected_before_allocation() {
    let mut backend = RecordingBackend::default();
    let source = backend.create_source(SOURCE_SIZE);
    let config = UpscalerConfig {
        output_size: SurfaceSize::new(9000, 1200),
        ..UpscalerConfig::default()
    };
    let ids_before = backend.next_id;

    let result = FrameRenderer::new(&mut backend, source, shaders(), config);

    assert!(matches!(result, Err(ConfigurationError::SurfaceTooLarge { .. })));
    assert_eq!(backend.next_id, ids_before);
}

#[test]
fn test_oversized_resize_keeps_current_target() {
    let mut backend = RecordingBackend::default();
    let source = backend.create_source(SOURCE_SIZE);
    let mut renderer = FrameRenderer::new(&mut backend, source, shaders(), UpscalerConfig::default()).unwrap();
    let original = *renderer.intermediate();

    let result = renderer.resize_output(&mut backend, SurfaceSize::new(1600, MAX_DIMENSION * 2));
    assert!(matches!(result, Err(ConfigurationError::SurfaceTooLarge { .. })));
    assert_eq!(*renderer.intermediate(), original);

    renderer.render(&mut backend, ScalingMode::Fsr).unwrap();
    let frame = backend.last_frame();
    assert_eq!(param(&frame[0], parameter_names::OUTPUT_HEIGHT), 1200.0);
}

#[test]
fn test_gamepad_back_exits_without_rendering() {
    let (mut backend, mut upscaler) = setup();

    upscaler.step(&mut backend, &InputSnapshot::new()).unwrap();
    let control = upscaler.step(&mut backend, &press(&[Key::GamepadBack])).unwrap();

    assert_eq!(control, FrameControl::Exit);
    assert_eq!(backend.frames().len(), 1);
}
