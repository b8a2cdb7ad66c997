//! Viewer state: window, wgpu backend and the upscaler driving it

use std::path::{Path, PathBuf};
use std::sync::Arc;
use upscale_compare::{
    ConfigurationError, ExitSignal, FrameControl, FrameRenderer, InputSnapshot, RenderError, ShaderSet, SurfaceSize, Upscaler, UpscalerConfig,
    gpu::{GpuInitError, WgpuBackend, WgpuShaderProgram},
};
use winit::{
    dpi::PhysicalSize,
    event_loop::ActiveEventLoop,
    window::{Window, WindowAttributes},
};

const WINDOW_TITLE: &str = "Upscaler comparison";

/// Shader files expected in the shader directory
const LANCZOS_SHADER: &str = "lanczos.wgsl";
const EASU_SHADER: &str = "fsr_easu.wgsl";
const RCAS_SHADER: &str = "fsr_rcas.wgsl";

/// Anything that stops the viewer
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("failed to initialize GPU: {0}")]
    Gpu(#[from] GpuInitError),
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Everything that exists once the window is up
pub struct ViewerContext {
    /// Wrapped in `Arc` to avoid lifetime issue with `wgpu::Surface`.
    window: Arc<Window>,
    backend: WgpuBackend,
    upscaler: Upscaler<WgpuBackend>,
}

impl ViewerContext {
    /// Creates the window, the GPU backend and the upscaler
    ///
    /// # Arguments
    /// * `event_loop` - The active event loop for window management
    /// * `image_path` - Source image to upscale
    /// * `shader_dir` - Directory holding the upscaling shaders
    /// * `config` - Output size and debug clear colours
    /// * `exit_signal` - Flag polled once per frame
    pub fn new(event_loop: &ActiveEventLoop, image_path: &Path, shader_dir: &Path, config: UpscalerConfig, exit_signal: ExitSignal) -> Result<Self, ViewerError> {
        let output_size = config.output_size;
        let window = Arc::new(
            event_loop.create_window(
                WindowAttributes::default()
                    .with_resizable(true)
                    .with_title(WINDOW_TITLE)
                    .with_inner_size(PhysicalSize::new(output_size.width, output_size.height)),
            )?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;
        let mut backend = pollster::block_on(WgpuBackend::new(&instance, surface, output_size))?;

        let source_image = image::open(image_path)?.to_rgba8();
        let source_size = SurfaceSize::new(source_image.width(), source_image.height());
        tracing::info!("Loaded {source_size} source image {}", image_path.display());
        let source = backend.create_texture_from_rgba8("Source image", source_size, source_image.as_raw())?;

        let shaders = ShaderSet {
            lanczos: load_shader(&backend, shader_dir, LANCZOS_SHADER)?,
            easu: load_shader(&backend, shader_dir, EASU_SHADER)?,
            rcas: load_shader(&backend, shader_dir, RCAS_SHADER)?,
        };

        let renderer = FrameRenderer::new(&mut backend, source, shaders, config)?;
        let context = Self {
            window,
            backend,
            upscaler: Upscaler::new(renderer, exit_signal),
        };

        context.update_window_title();
        context.window.request_redraw();
        Ok(context)
    }

    /// Runs one update/render step with the keys currently held
    pub fn step(&mut self, input: &InputSnapshot) -> Result<FrameControl, ViewerError> {
        let previous_mode = self.upscaler.mode();
        let control = match self.upscaler.step(&mut self.backend, input) {
            Ok(control) => control,
            // The surface went stale under us; reconfigure and try again next frame
            Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                tracing::warn!("Surface lost, reconfiguring");
                let size = self.backend.surface_size();
                self.backend.resize(size)?;
                FrameControl::Continue
            }
            Err(error) => return Err(error.into()),
        };
        if self.upscaler.mode() != previous_mode {
            self.update_window_title();
        }
        Ok(control)
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    /// Follows a window resize with both the surface and the intermediate target
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) -> Result<(), ViewerError> {
        let size = SurfaceSize::new(new_size.width, new_size.height);
        if size.is_empty() {
            return Ok(());
        }

        self.backend.resize(size)?;
        self.upscaler.renderer_mut().resize_output(&mut self.backend, size)?;
        self.window.request_redraw();
        Ok(())
    }

    fn update_window_title(&self) {
        self.window.set_title(&format!("{WINDOW_TITLE} - {}", self.upscaler.mode().name()));
    }
}

fn load_shader(backend: &WgpuBackend, shader_dir: &Path, file_name: &str) -> Result<WgpuShaderProgram, ViewerError> {
    let path = shader_dir.join(file_name);
    let source = std::fs::read_to_string(&path).map_err(|source| ViewerError::Io { path: path.clone(), source })?;
    Ok(pollster::block_on(backend.load_shader(file_name, &source))?)
}
