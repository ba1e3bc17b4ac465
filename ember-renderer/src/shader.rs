//! Shader compiler (C2): textual GLSL-like source -> SPIR-V shader modules.
//!
//! Grounded on the donor's `compile_wgsl_to_spirv` helper (lume-examples),
//! with the front end swapped from WGSL to GLSL per SPEC_FULL.md §0/§4.2
//! ("text in (GLSL-like), SPIR-V-like binary out").

use crate::error::{EngineError, ShaderStageKind};
use ember_rhi::ShaderStage as RhiShaderStage;
use naga::ShaderStage as NagaStage;
use naga::valid::{Capabilities, ValidationFlags, Validator};

fn to_naga_stage(stage: ShaderStageKind) -> Result<NagaStage, EngineError> {
    match stage {
        ShaderStageKind::Vertex => Ok(NagaStage::Vertex),
        ShaderStageKind::Fragment => Ok(NagaStage::Fragment),
        ShaderStageKind::Compute => Ok(NagaStage::Compute),
        other => Err(EngineError::ShaderCompile {
            stage: other,
            message: "geometry/tessellation stages are not supported by this GLSL front end"
                .to_string(),
        }),
    }
}

/// Compile one stage's GLSL-like source to SPIR-V bytes at the engine's fixed
/// optimization level (performance; spec §4.2). `entry_point` is almost
/// always `"main"` for GLSL-style sources.
pub fn compile_stage(
    stage: ShaderStageKind,
    source: &str,
    entry_point: &str,
) -> Result<RhiShaderStage, EngineError> {
    let naga_stage = to_naga_stage(stage)?;
    let mut frontend = naga::front::glsl::Frontend::default();
    let options = naga::front::glsl::Options { stage: naga_stage, defines: Default::default() };
    let module = frontend.parse(&options, source).map_err(|errors| EngineError::ShaderCompile {
        stage,
        message: errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; "),
    })?;

    let info = Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| EngineError::ShaderCompile { stage, message: e.to_string() })?;

    let mut spv_options = naga::back::spv::Options::default();
    // "performance" optimization level: skip debug symbols, allow the backend
    // to pick its fastest lowering (spec §4.2).
    spv_options.flags.remove(naga::back::spv::WriterFlags::DEBUG);
    let pipeline_options = naga::back::spv::PipelineOptions {
        shader_stage: naga_stage,
        entry_point: entry_point.to_string(),
    };
    let words = naga::back::spv::write_vec(&module, &info, &spv_options, Some(&pipeline_options))
        .map_err(|e| EngineError::ShaderCompile { stage, message: e.to_string() })?;

    let bytes = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    Ok(RhiShaderStage { source: bytes, entry_point: entry_point.to_string() })
}

/// Compile a vertex + fragment pair in one call, the common case for every
/// pass factory in `passes/`.
pub fn compile_vertex_fragment(
    vertex_source: &str,
    fragment_source: &str,
) -> Result<(RhiShaderStage, RhiShaderStage), EngineError> {
    let vertex = compile_stage(ShaderStageKind::Vertex, vertex_source, "main")?;
    let fragment = compile_stage(ShaderStageKind::Fragment, fragment_source, "main")?;
    Ok((vertex, fragment))
}
