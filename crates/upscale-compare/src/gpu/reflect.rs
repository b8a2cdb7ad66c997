//! Uniform block reflection for WGSL fragment shaders
//!
//! Shader parameters are the members of the single `var<uniform>` in group 0. The
//! layout (member names, byte offsets, scalar kinds) is read from the parsed module so
//! the host never has to describe it by hand.

use crate::ConfigurationError;

/// Bindings reserved for the pass input texture and sampler
pub(crate) const TEXTURE_BINDING: u32 = 0;
pub(crate) const SAMPLER_BINDING: u32 = 1;

/// Uniform buffers are sized in multiples of this
const UNIFORM_ALIGNMENT: u64 = 16;

/// Scalar type of a uniform member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarKind {
    Float,
    Sint,
    Uint,
}

/// One named scalar inside the uniform block
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UniformMember {
    pub name: String,
    pub offset: u32,
    pub kind: ScalarKind,
}

/// Layout of a shader's uniform block
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UniformLayout {
    /// Binding index within group 0
    pub binding: u32,
    /// Buffer size in bytes, padded to the uniform alignment
    pub size: u64,
    pub members: Vec<UniformMember>,
}

impl UniformLayout {
    pub fn member(&self, name: &str) -> Option<&UniformMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Parses `source` and extracts its uniform block, if it has one
///
/// # Errors
/// Fails if the source does not parse, if the uniform block is outside group 0 or
/// collides with the texture/sampler bindings, if there is more than one uniform block,
/// or if a member is not a 32-bit scalar.
pub(crate) fn reflect_uniforms(label: &str, source: &str) -> Result<Option<UniformLayout>, ConfigurationError> {
    let parse_error = |message: String| ConfigurationError::ShaderParse {
        shader: label.to_string(),
        message,
    };

    let module = naga::front::wgsl::parse_str(source).map_err(|e| parse_error(e.emit_to_string(source)))?;

    let mut uniforms = module.global_variables.iter().map(|(_, var)| var).filter(|var| var.space == naga::AddressSpace::Uniform);
    let Some(global) = uniforms.next() else {
        return Ok(None);
    };
    if uniforms.next().is_some() {
        return Err(parse_error("expected at most one uniform block".to_string()));
    }

    let binding = match &global.binding {
        Some(naga::ResourceBinding { group: 0, binding }) if *binding != TEXTURE_BINDING && *binding != SAMPLER_BINDING => *binding,
        Some(naga::ResourceBinding { group, binding }) => {
            return Err(parse_error(format!(
                "uniform block at @group({group}) @binding({binding}) must be in group 0 and avoid bindings {TEXTURE_BINDING} and {SAMPLER_BINDING}"
            )));
        }
        None => return Err(parse_error("uniform block has no binding".to_string())),
    };

    let scalar_kind = |name: &str, ty: naga::Handle<naga::Type>| match module.types[ty].inner {
        naga::TypeInner::Scalar(naga::Scalar { kind, width: 4 }) => match kind {
            naga::ScalarKind::Float => Ok(ScalarKind::Float),
            naga::ScalarKind::Sint => Ok(ScalarKind::Sint),
            naga::ScalarKind::Uint => Ok(ScalarKind::Uint),
            _ => Err(ConfigurationError::UnsupportedParameterType {
                shader: label.to_string(),
                parameter: name.to_string(),
            }),
        },
        _ => Err(ConfigurationError::UnsupportedParameterType {
            shader: label.to_string(),
            parameter: name.to_string(),
        }),
    };

    let (members, span) = match &module.types[global.ty].inner {
        naga::TypeInner::Struct { members, span } => {
            let members = members
                .iter()
                .map(|member| {
                    let name = member.name.clone().unwrap_or_default();
                    let kind = scalar_kind(&name, member.ty)?;
                    Ok(UniformMember {
                        name,
                        offset: member.offset,
                        kind,
                    })
                })
                .collect::<Result<Vec<_>, ConfigurationError>>()?;
            (members, *span)
        }
        // A lone `var<uniform> name: f32` is a block with one member
        _ => {
            let name = global.name.clone().unwrap_or_default();
            let kind = scalar_kind(&name, global.ty)?;
            (vec![UniformMember { name, offset: 0, kind }], 4)
        }
    };

    Ok(Some(UniformLayout {
        binding,
        size: (span as u64).div_ceil(UNIFORM_ALIGNMENT) * UNIFORM_ALIGNMENT,
        members,
    }))
}
