//! Two-pass frame rendering
//!
//! [`FrameRenderer`] owns the source image, the intermediate render target and the
//! upscaling shaders. Each frame it draws the source into the intermediate surface
//! (Pass A), then the intermediate surface onto the presentable surface (Pass B), using
//! the shaders and samplers listed in the active mode's [`crate::PassPlan`].
//!
//! The graphics API is hidden behind [`GraphicsBackend`]; see [`crate::gpu`] for the
//! wgpu implementation.

use crate::{
    ConfigurationError, ParameterBinder, ParameterError, RenderError, Rgba, SamplerFilterMode, ScalingMode, ShaderProgram, ShaderRole, SurfaceSize,
    TargetSizes, UpscalerConfig,
};

/// Render target of a pass
#[derive(Debug)]
pub enum PassTarget<'a, T> {
    /// An off-screen render target created by the backend
    Texture(&'a T),
    /// The surface presented at the end of the frame
    Presentable,
}

/// Everything a backend needs to record one full-target draw
#[derive(Debug)]
pub struct DrawPass<'a, T, S> {
    /// Human-readable name for debugging
    pub label: &'static str,
    /// Surface to clear and draw into
    pub target: PassTarget<'a, T>,
    /// Colour the target is cleared to before drawing
    pub clear_color: Rgba,
    /// Texture stretched over the whole target
    pub source: &'a T,
    /// Shader with parameters already bound, or `None` for a plain textured copy
    pub shader: Option<&'a S>,
    pub sampler: SamplerFilterMode,
}

/// A graphics API able to run the two render passes
pub trait GraphicsBackend {
    /// Sampled texture or render target
    type Texture;
    /// Upscaling shader program
    type Shader: ShaderProgram;

    fn texture_size(&self, texture: &Self::Texture) -> SurfaceSize;

    /// Largest width or height a texture or the presentable surface may have
    fn max_texture_dimension(&self) -> u32;

    /// Creates an off-screen render target that can later be sampled
    fn create_render_target(&mut self, size: SurfaceSize) -> Self::Texture;

    /// Starts recording a frame
    fn begin_frame(&mut self) -> Result<(), RenderError>;

    /// Clears the pass target and draws the pass source over all of it
    fn draw_pass(&mut self, pass: DrawPass<'_, Self::Texture, Self::Shader>) -> Result<(), RenderError>;

    /// Submits the recorded frame and presents it
    fn end_frame(&mut self) -> Result<(), RenderError>;
}

/// One shader program per [`ShaderRole`]
#[derive(Debug)]
pub struct ShaderSet<S> {
    pub lanczos: S,
    pub easu: S,
    pub rcas: S,
}

impl<S> ShaderSet<S> {
    pub fn get(&self, role: ShaderRole) -> &S {
        match role {
            ShaderRole::Lanczos => &self.lanczos,
            ShaderRole::Easu => &self.easu,
            ShaderRole::Rcas => &self.rcas,
        }
    }

    pub fn get_mut(&mut self, role: ShaderRole) -> &mut S {
        match role {
            ShaderRole::Lanczos => &mut self.lanczos,
            ShaderRole::Easu => &mut self.easu,
            ShaderRole::Rcas => &mut self.rcas,
        }
    }
}

/// Orchestrates the source -> intermediate -> presentable render sequence
pub struct FrameRenderer<B: GraphicsBackend> {
    /// Source image sampled by Pass A
    ///
    /// Uploaded once by the host and never written afterwards.
    source: B::Texture,

    /// Render target written by Pass A and sampled by Pass B
    ///
    /// Always sized to the current output resolution. Recreated by
    /// [`FrameRenderer::resize_output`] and cleared at the start of every Pass A, so
    /// nothing from a previous frame or mode survives into the next one.
    intermediate: B::Texture,

    /// Upscaling shaders, validated against their parameter contracts at construction
    shaders: ShaderSet<B::Shader>,

    /// Holds the source-derived constants and binds them before each shaded pass
    binder: ParameterBinder,

    /// Output resolution and debug clear colours
    ///
    /// `output_size` tracks the latest resize.
    config: UpscalerConfig,
}

impl<B: GraphicsBackend> FrameRenderer<B> {
    /// Validates the loaded assets and creates the intermediate surface
    ///
    /// # Arguments
    /// * `backend` - The backend used to create the intermediate surface
    /// * `source` - The source image, read-only from now on
    /// * `shaders` - The upscaling shaders
    /// * `config` - Output resolution and clear colours
    ///
    /// # Errors
    /// Fails if the source or output size is empty or larger than the backend can
    /// allocate, or if a shader does not declare every parameter its role requires.
    pub fn new(backend: &mut B, source: B::Texture, shaders: ShaderSet<B::Shader>, config: UpscalerConfig) -> Result<Self, ConfigurationError> {
        let source_size = backend.texture_size(&source);
        if source_size.is_empty() {
            return Err(ConfigurationError::EmptySource(source_size));
        }
        if config.output_size.is_empty() {
            return Err(ConfigurationError::EmptyOutput(config.output_size));
        }
        let max_dimension = backend.max_texture_dimension();
        source_size.check_fits(max_dimension)?;
        config.output_size.check_fits(max_dimension)?;

        for role in ShaderRole::ALL {
            ParameterBinder::validate(shaders.get(role), role)?;
        }

        let intermediate = backend.create_render_target(config.output_size);
        tracing::info!("Upscaling {source_size} source to {} output", config.output_size);

        Ok(Self {
            source,
            intermediate,
            shaders,
            binder: ParameterBinder::new(source_size),
            config,
        })
    }

    pub fn intermediate(&self) -> &B::Texture {
        &self.intermediate
    }

    /// Recreates the intermediate surface for a new output resolution
    ///
    /// Does nothing if the resolution is unchanged. On error the current intermediate
    /// surface is kept.
    pub fn resize_output(&mut self, backend: &mut B, output_size: SurfaceSize) -> Result<(), ConfigurationError> {
        if output_size.is_empty() {
            return Err(ConfigurationError::EmptyOutput(output_size));
        }
        output_size.check_fits(backend.max_texture_dimension())?;
        if output_size == self.config.output_size {
            return Ok(());
        }

        tracing::debug!("Recreating intermediate surface: {} -> {output_size}", self.config.output_size);
        self.intermediate = backend.create_render_target(output_size);
        self.config.output_size = output_size;
        Ok(())
    }

    /// Records and presents one frame for `mode`
    pub fn render(&mut self, backend: &mut B, mode: ScalingMode) -> Result<(), RenderError> {
        let plan = mode.pass_plan();
        let targets = TargetSizes {
            intermediate: backend.texture_size(&self.intermediate),
            output: self.config.output_size,
        };

        backend.begin_frame()?;

        // Pass A: source -> intermediate
        let shader = bind_pass_shader(&mut self.shaders, &self.binder, plan.upscale.shader, &targets)?;
        backend.draw_pass(DrawPass {
            label: "Upscale pass",
            target: PassTarget::Texture(&self.intermediate),
            clear_color: self.config.clear_colors.intermediate,
            source: &self.source,
            shader,
            sampler: plan.upscale.sampler,
        })?;

        // Pass B: intermediate -> presentable
        let shader = bind_pass_shader(&mut self.shaders, &self.binder, plan.present.shader, &targets)?;
        backend.draw_pass(DrawPass {
            label: "Present pass",
            target: PassTarget::Presentable,
            clear_color: self.config.clear_colors.presentable,
            source: &self.intermediate,
            shader,
            sampler: plan.present.sampler,
        })?;

        backend.end_frame()
    }
}

/// Binds the parameters of the shader a pass uses and hands it back for drawing
fn bind_pass_shader<'s, S: ShaderProgram>(
    shaders: &'s mut ShaderSet<S>,
    binder: &ParameterBinder,
    role: Option<ShaderRole>,
    targets: &TargetSizes,
) -> Result<Option<&'s S>, ParameterError> {
    let Some(role) = role else {
        return Ok(None);
    };

    let shader = shaders.get_mut(role);
    binder.bind(shader, role, targets)?;
    Ok(Some(&*shader))
}
