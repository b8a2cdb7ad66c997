//! Render pass execution on wgpu
//!
//! Every pass is a single indexed full-screen quad drawn with a render pipeline built
//! from the shared vertex stage and the pass's fragment shader.

use super::reflect::reflect_uniforms;
use super::shader::{WgpuShaderProgram, create_bind_group_layout};
use crate::{ConfigurationError, DrawPass, GraphicsBackend, PassTarget, RenderError, SamplerFilterMode, SurfaceSize};
use wgpu::util::DeviceExt;

/// Fragment entry point every pass shader must provide
const FRAGMENT_ENTRY_POINT: &str = "fs_main";

/// Vertex data structure for the full-screen quad
#[derive(Debug, Clone, Copy, bytemuck::Zeroable, bytemuck::Pod)]
#[repr(C)]
struct Vertex {
    /// 3D position coordinates (x, y, z)
    position: [f32; 3],
    /// 2D texture coordinates (u, v)
    texture_coords: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: &[wgpu::VertexAttribute] = &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: Self::ATTRIBUTES,
        array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
    };
}

/// Quad covering the whole target, texture coordinates from (0,0) top-left to (1,1)
const VERTICES: &[Vertex] = &[
    Vertex {
        position: [-1.0, 1.0, 0.0],
        texture_coords: [0.0, 0.0],
    },
    Vertex {
        position: [-1.0, -1.0, 0.0],
        texture_coords: [0.0, 1.0],
    },
    Vertex {
        position: [1.0, -1.0, 0.0],
        texture_coords: [1.0, 1.0],
    },
    Vertex {
        position: [1.0, 1.0, 0.0],
        texture_coords: [1.0, 0.0],
    },
];

const INDICES: &[u16] = &[0, 1, 3, 1, 2, 3];

/// Errors raised while setting up the GPU
#[derive(Debug, thiserror::Error)]
pub enum GpuInitError {
    #[error(transparent)]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error(transparent)]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported texture formats")]
    UnsupportedSurface,
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// A texture together with the view used to sample or render into it
#[derive(Debug)]
pub struct WgpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl WgpuTexture {
    fn new(texture: wgpu::Texture) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Resources of the frame currently being recorded
struct InFlightFrame {
    surface_texture: wgpu::SurfaceTexture,
    surface_view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

/// [`GraphicsBackend`] drawing into a window surface with wgpu
pub struct WgpuBackend {
    /// Window surface every frame is presented to
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Current surface format and size
    ///
    /// The format is also used for the intermediate render target and every pass
    /// pipeline, so all passes render into the same kind of texture.
    surface_configuration: wgpu::SurfaceConfiguration,

    /// Largest texture side the device accepts
    ///
    /// Every surface configuration and texture allocation is checked against it first.
    max_texture_dimension: u32,

    /// Vertex stage shared by every pass pipeline
    vertex_module: wgpu::ShaderModule,
    /// Full-screen quad
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    linear_sampler: wgpu::Sampler,
    nearest_sampler: wgpu::Sampler,

    /// Plain textured copy used by passes without an upscaling shader
    passthrough: WgpuShaderProgram,

    /// Frame between `begin_frame` and `end_frame`
    ///
    /// Holds the acquired surface texture and the command encoder the passes are
    /// recorded into. `None` outside of a frame.
    frame: Option<InFlightFrame>,
}

impl WgpuBackend {
    /// Creates a device for `surface` and configures the surface at `size`
    ///
    /// # Arguments
    /// * `instance` - The instance `surface` was created from
    /// * `surface` - The window surface to present to
    /// * `size` - Initial presentation size in physical pixels
    ///
    /// # Errors
    /// Fails if no adapter or device is available, or if `size` is empty or exceeds the
    /// adapter's maximum texture dimension.
    pub async fn new(instance: &wgpu::Instance, surface: wgpu::Surface<'static>, size: SurfaceSize) -> Result<Self, GpuInitError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        if size.is_empty() {
            return Err(ConfigurationError::EmptyOutput(size).into());
        }
        let adapter_limits = adapter.limits();
        size.check_fits(adapter_limits.max_texture_dimension_2d)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Upscaler device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default().using_resolution(adapter_limits),
                memory_hints: wgpu::MemoryHints::default(),
                trace: Default::default(),
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let surface_texture_format = surface_capabilities
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_capabilities.formats.first())
            .copied()
            .ok_or(GpuInitError::UnsupportedSurface)?;

        let surface_configuration = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            width: size.width,
            height: size.height,
            format: surface_texture_format,
            view_formats: vec![],
            alpha_mode: surface_capabilities.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_configuration);
        tracing::info!("Configured {size} surface with format {surface_texture_format:?}");

        let vertex_module = device.create_shader_module(wgpu::include_wgsl!("fullscreen_vertex.wgsl"));

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex buffer"),
            usage: wgpu::BufferUsages::VERTEX,
            contents: bytemuck::cast_slice(VERTICES),
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index buffer"),
            usage: wgpu::BufferUsages::INDEX,
            contents: bytemuck::cast_slice(INDICES),
        });

        let passthrough_source = include_str!("passthrough.wgsl");
        let passthrough_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Passthrough"),
            source: wgpu::ShaderSource::Wgsl(passthrough_source.into()),
        });
        let passthrough_layout = create_bind_group_layout(&device, "Passthrough", None);
        let passthrough_pipeline = create_pass_pipeline(&device, "Passthrough", &vertex_module, &passthrough_module, &passthrough_layout, surface_texture_format);
        let passthrough = WgpuShaderProgram::new(&device, "Passthrough", passthrough_pipeline, passthrough_layout, None);

        let max_texture_dimension = device.limits().max_texture_dimension_2d;
        tracing::debug!("Maximum texture dimension is {max_texture_dimension}");

        Ok(Self {
            linear_sampler: create_sampler(&device, SamplerFilterMode::Linear),
            nearest_sampler: create_sampler(&device, SamplerFilterMode::Nearest),
            surface,
            device,
            queue,
            max_texture_dimension,
            surface_configuration,
            vertex_module,
            vertex_buffer,
            index_buffer,
            passthrough,
            frame: None,
        })
    }

    pub fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.surface_configuration.width, self.surface_configuration.height)
    }

    /// Reconfigures the surface after a window resize
    ///
    /// Zero-sized requests (minimised windows) are ignored.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::SurfaceTooLarge`] and leaves the surface as it was if
    /// `size` exceeds the device limit.
    pub fn resize(&mut self, size: SurfaceSize) -> Result<(), ConfigurationError> {
        if size.is_empty() {
            return Ok(());
        }
        size.check_fits(self.max_texture_dimension)?;

        self.surface_configuration.width = size.width;
        self.surface_configuration.height = size.height;
        self.surface.configure(&self.device, &self.surface_configuration);
        Ok(())
    }

    /// Compiles a WGSL fragment shader into a pass program
    ///
    /// The shader reads its input through `@group(0) @binding(0)` (texture) and
    /// `@group(0) @binding(1)` (sampler), takes `@location(0) uv: vec2<f32>` in
    /// `fs_main`, and exposes its parameters as scalar members of one uniform block.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::ShaderParse`] if the source does not parse or wgpu
    /// rejects the resulting pipeline.
    pub async fn load_shader(&self, label: &str, source: &str) -> Result<WgpuShaderProgram, ConfigurationError> {
        let layout = reflect_uniforms(label, source)?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let bind_group_layout = create_bind_group_layout(&self.device, label, layout.as_ref());
        let pipeline = create_pass_pipeline(&self.device, label, &self.vertex_module, &module, &bind_group_layout, self.surface_configuration.format);

        if let Some(error) = self.device.pop_error_scope().await {
            return Err(ConfigurationError::ShaderParse {
                shader: label.to_string(),
                message: error.to_string(),
            });
        }

        if let Some(layout) = &layout {
            tracing::debug!("Loaded shader `{label}` with {} parameters", layout.members.len());
        }

        Ok(WgpuShaderProgram::new(&self.device, label, pipeline, bind_group_layout, layout))
    }

    /// Uploads tightly packed 8-bit RGBA pixels into a sampled texture
    ///
    /// # Errors
    /// Fails if the image is empty or larger than the device can allocate.
    pub fn create_texture_from_rgba8(&self, label: &str, size: SurfaceSize, pixels: &[u8]) -> Result<WgpuTexture, ConfigurationError> {
        if size.is_empty() {
            return Err(ConfigurationError::EmptySource(size));
        }
        size.check_fits(self.max_texture_dimension)?;

        let extent = wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: extent,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            pixels,
        );

        Ok(WgpuTexture::new(texture))
    }
}

impl GraphicsBackend for WgpuBackend {
    type Texture = WgpuTexture;
    type Shader = WgpuShaderProgram;

    fn texture_size(&self, texture: &WgpuTexture) -> SurfaceSize {
        SurfaceSize::new(texture.texture.width(), texture.texture.height())
    }

    fn max_texture_dimension(&self) -> u32 {
        self.max_texture_dimension
    }

    fn create_render_target(&mut self, size: SurfaceSize) -> WgpuTexture {
        tracing::debug!("Creating {size} render target");
        WgpuTexture::new(self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Intermediate render target"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.surface_configuration.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        }))
    }

    fn begin_frame(&mut self) -> Result<(), RenderError> {
        // A frame left over from a failed render is dropped unsubmitted
        self.frame = None;

        let surface_texture = self.surface.get_current_texture()?;
        let surface_view = surface_texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Frame encoder") });

        self.frame = Some(InFlightFrame {
            surface_texture,
            surface_view,
            encoder,
        });
        Ok(())
    }

    fn draw_pass(&mut self, pass: DrawPass<'_, WgpuTexture, WgpuShaderProgram>) -> Result<(), RenderError> {
        let frame = self.frame.as_mut().ok_or(RenderError::NoActiveFrame)?;

        let program = pass.shader.unwrap_or(&self.passthrough);
        program.upload(&self.queue);

        let sampler = match pass.sampler {
            SamplerFilterMode::Nearest => &self.nearest_sampler,
            SamplerFilterMode::Linear => &self.linear_sampler,
        };
        let bind_group = program.create_bind_group(&self.device, &pass.source.view, sampler);

        let target_view = match pass.target {
            PassTarget::Texture(texture) => &texture.view,
            PassTarget::Presentable => &frame.surface_view,
        };

        let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(pass.label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(pass.clear_color.into()),
                    store: wgpu::StoreOp::Store,
                },
            })],
            ..Default::default()
        });

        render_pass.set_pipeline(program.pipeline());
        render_pass.set_bind_group(0, &bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..INDICES.len() as u32, 0, 0..1);

        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        let frame = self.frame.take().ok_or(RenderError::NoActiveFrame)?;

        self.queue.submit(Some(frame.encoder.finish()));
        frame.surface_texture.present();

        Ok(())
    }
}

/// Creates a clamp-to-edge sampler with the given filter mode
fn create_sampler(device: &wgpu::Device, filter_mode: SamplerFilterMode) -> wgpu::Sampler {
    let filter = match filter_mode {
        SamplerFilterMode::Nearest => wgpu::FilterMode::Nearest,
        SamplerFilterMode::Linear => wgpu::FilterMode::Linear,
    };

    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(&format!("Sampler {filter_mode:?}")),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: wgpu::FilterMode::Nearest,
        lod_min_clamp: 0.0,
        lod_max_clamp: 0.0,
        compare: None,
        anisotropy_clamp: 1,
        border_color: None,
    })
}

/// Builds the full-screen render pipeline for one fragment shader
fn create_pass_pipeline(
    device: &wgpu::Device,
    label: &str,
    vertex_module: &wgpu::ShaderModule,
    fragment_module: &wgpu::ShaderModule,
    bind_group_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        cache: None,
        vertex: wgpu::VertexState {
            module: vertex_module,
            buffers: &[Vertex::LAYOUT],
            compilation_options: Default::default(),
            entry_point: Some("vs_main"),
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment_module,
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
            entry_point: Some(FRAGMENT_ENTRY_POINT),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            cull_mode: Some(wgpu::Face::Back),
            front_face: wgpu::FrontFace::Ccw,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
            unclipped_depth: false,
        },
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        depth_stencil: None,
    })
}
