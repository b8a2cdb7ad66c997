//! wgpu-backed shader programs

use super::reflect::{SAMPLER_BINDING, ScalarKind, TEXTURE_BINDING, UniformLayout};
use crate::{ParameterError, ShaderProgram};

/// CPU-side copy of a uniform block, laid out as the shader declares it
#[derive(Debug)]
struct UniformStaging {
    layout: UniformLayout,
    bytes: Vec<u8>,
}

impl UniformStaging {
    fn new(layout: UniformLayout) -> Self {
        Self {
            bytes: vec![0; layout.size as usize],
            layout,
        }
    }

    /// Writes `value` at the member's offset, converted to the member's scalar type
    ///
    /// # Errors
    /// Returns [`ParameterError::Unknown`] for `shader` if the block has no member
    /// called `name`.
    fn write(&mut self, shader: &str, name: &str, value: f32) -> Result<(), ParameterError> {
        let member = self.layout.member(name).ok_or_else(|| unknown_parameter(shader, name))?;

        let encoded = match member.kind {
            ScalarKind::Float => value.to_le_bytes(),
            ScalarKind::Sint => (value as i32).to_le_bytes(),
            ScalarKind::Uint => (value as u32).to_le_bytes(),
        };
        let offset = member.offset as usize;
        self.bytes[offset..offset + encoded.len()].copy_from_slice(&encoded);
        Ok(())
    }
}

fn unknown_parameter(shader: &str, name: &str) -> ParameterError {
    ParameterError::Unknown {
        shader: shader.to_string(),
        parameter: name.to_string(),
    }
}

/// Uniform block of a shader and the GPU buffer it is uploaded to
#[derive(Debug)]
struct UniformBlock {
    staging: UniformStaging,
    buffer: wgpu::Buffer,
}

/// A fragment shader compiled into a full-screen render pipeline
///
/// Parameters are written into a staging copy of the uniform block by
/// [`ShaderProgram::set_parameter`] and uploaded right before each draw.
#[derive(Debug)]
pub struct WgpuShaderProgram {
    label: String,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniforms: Option<UniformBlock>,
}

impl WgpuShaderProgram {
    pub(crate) fn new(
        device: &wgpu::Device,
        label: &str,
        pipeline: wgpu::RenderPipeline,
        bind_group_layout: wgpu::BindGroupLayout,
        layout: Option<UniformLayout>,
    ) -> Self {
        let uniforms = layout.map(|layout| {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{label} uniforms")),
                size: layout.size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            UniformBlock {
                staging: UniformStaging::new(layout),
                buffer,
            }
        });

        Self {
            label: label.to_string(),
            pipeline,
            bind_group_layout,
            uniforms,
        }
    }

    pub(crate) fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Copies the staged parameter values into the uniform buffer
    pub(crate) fn upload(&self, queue: &wgpu::Queue) {
        if let Some(uniforms) = &self.uniforms {
            queue.write_buffer(&uniforms.buffer, 0, &uniforms.staging.bytes);
        }
    }

    /// Creates the bind group for one draw reading `input`
    pub(crate) fn create_bind_group(&self, device: &wgpu::Device, input: &wgpu::TextureView, sampler: &wgpu::Sampler) -> wgpu::BindGroup {
        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: TEXTURE_BINDING,
                resource: wgpu::BindingResource::TextureView(input),
            },
            wgpu::BindGroupEntry {
                binding: SAMPLER_BINDING,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ];

        if let Some(uniforms) = &self.uniforms {
            entries.push(wgpu::BindGroupEntry {
                binding: uniforms.staging.layout.binding,
                resource: uniforms.buffer.as_entire_binding(),
            });
        }

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&self.label),
            layout: &self.bind_group_layout,
            entries: &entries,
        })
    }
}

impl ShaderProgram for WgpuShaderProgram {
    fn label(&self) -> &str {
        &self.label
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.uniforms.as_ref().is_some_and(|u| u.staging.layout.member(name).is_some())
    }

    fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), ParameterError> {
        match self.uniforms.as_mut() {
            Some(uniforms) => uniforms.staging.write(&self.label, name, value),
            None => Err(unknown_parameter(&self.label, name)),
        }
    }
}

/// Creates the bind group layout for a pass shader
///
/// Binding 0 is the input texture, binding 1 its sampler, and the uniform block (if
/// any) sits at the binding the shader declares.
pub(crate) fn create_bind_group_layout(device: &wgpu::Device, label: &str, layout: Option<&UniformLayout>) -> wgpu::BindGroupLayout {
    let mut entries = vec![
        wgpu::BindGroupLayoutEntry {
            binding: TEXTURE_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: SAMPLER_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ];

    if let Some(layout) = layout {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: layout.binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
    }

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &entries,
    })
}
