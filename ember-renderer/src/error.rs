//! Error taxonomy. See spec §7 and SPEC_FULL.md §7.1.

/// Stage a shader compile failed at, for `EngineError::ShaderCompile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStageKind {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEvaluation,
    Compute,
}

impl std::fmt::Display for ShaderStageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ShaderStageKind::Vertex => "vertex",
            ShaderStageKind::Fragment => "fragment",
            ShaderStageKind::Geometry => "geometry",
            ShaderStageKind::TessControl => "tess_control",
            ShaderStageKind::TessEvaluation => "tess_evaluation",
            ShaderStageKind::Compute => "compute",
        };
        f.write_str(s)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("no suitable GPU found")]
    NoSuitableGpu,
    #[error("required validation layer(s) missing: {0:?}")]
    LayersMissing(Vec<String>),
    #[error("required extension(s) missing: {0:?}")]
    ExtensionsMissing(Vec<String>),
    #[error("shader compile error ({stage}): {message}")]
    ShaderCompile { stage: ShaderStageKind, message: String },
    #[error("GPU out of memory during {operation}")]
    GpuOutOfMemory { operation: &'static str },
    #[error("swapchain out of date")]
    SwapchainOutOfDate,
    #[error("swapchain suboptimal")]
    SwapchainSuboptimal,
    #[error("model file not found: {0}")]
    ModelFileMissing(std::path::PathBuf),
    #[error("model parse failed: {0}")]
    ModelParseFailed(String),
    #[error("texture load failed: {0}")]
    TextureLoadFailed(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// `ember_rhi`'s trait surface reports backend failures as `Result<T, String>`
/// (see SPEC_FULL.md's ember-rhi audit); fold those into the typed taxonomy
/// at the boundary instead of propagating bare strings through the renderer.
impl From<String> for EngineError {
    fn from(message: String) -> Self {
        EngineError::Backend(message)
    }
}

