//! Ember RHI: Backend-agnostic Rendering Hardware Interface.
//! This crate defines the traits and types required to abstract over a single
//! Vulkan-class GPU API. There is exactly one backend (`vulkan`, behind the
//! `vulkan` feature); the trait split exists so the deferred renderer above it
//! never touches `ash` directly.

use std::any::Any;
use std::fmt::Debug;

/// Unique identifier for a GPU resource.
pub type ResourceId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Vertex,
    Index,
    Uniform,
    Storage,
    CopySrc,
    CopyDst,
    Indirect,
}

impl BufferUsage {
    pub const COPY_SRC: BufferUsage = BufferUsage::CopySrc;
    pub const COPY_DST: BufferUsage = BufferUsage::CopyDst;
}

/// Whether a buffer's backing memory is mappable from the CPU or device-local only.
/// Host-visible buffers can be written directly via `Device::write_buffer`; device-local
/// buffers require a staging copy via `Device::upload_to_buffer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferMemoryPreference {
    HostVisible,
    #[default]
    DeviceLocal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgba8Unorm,
    Bgra8Unorm,
    R32Float,
    Rgba16Float,
    D32Float,
    R16Float,
    Rgba32Float,
    Rgba8Srgb,
    R8Unorm,
}

/// Texture dimension / type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureDimension {
    #[default]
    D2,
    D2Array,
    D3,
    Cube,
}

/// The core device trait that all backends must implement.
///
/// A `Device` owns exactly one physical/logical device pairing and one primary
/// queue family; multi-GPU and multi-device fan-out are out of scope.
pub trait Device: Send + Sync + Debug {
    fn create_buffer(&self, desc: &BufferDescriptor) -> Result<Box<dyn Buffer>, String>;
    fn create_texture(&self, desc: &TextureDescriptor) -> Result<Box<dyn Texture>, String>;
    fn create_sampler(&self, desc: &SamplerDescriptor) -> Result<Box<dyn Sampler>, String>;
    fn create_compute_pipeline(&self, desc: &ComputePipelineDescriptor) -> Result<Box<dyn ComputePipeline>, String>;
    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDescriptor) -> Result<Box<dyn GraphicsPipeline>, String>;
    fn create_descriptor_set_layout(&self, bindings: &[DescriptorSetLayoutBinding]) -> Result<Box<dyn DescriptorSetLayout>, String>;
    /// Create a descriptor pool sized for `max_sets` sets with a default mix of descriptor types.
    fn create_descriptor_pool(&self, max_sets: u32) -> Result<Box<dyn DescriptorPool>, String>;
    /// Create a descriptor pool with explicit per-type sizing.
    fn create_descriptor_pool_with_descriptor(&self, desc: &DescriptorPoolDescriptor) -> Result<Box<dyn DescriptorPool>, String>;

    /// Create a command encoder for recording GPU commands.
    fn create_command_encoder(&self) -> Result<Box<dyn CommandEncoder>, String>;

    /// Submit command buffers to the default queue. Does not block; use wait_idle or Fence to synchronize.
    fn submit(&self, command_buffers: Vec<Box<dyn CommandBuffer>>) -> Result<(), String>;

    /// Get the main queue (graphics+compute) for submissions.
    fn queue(&self) -> Result<Box<dyn Queue>, String>;

    /// Get a dedicated transfer-only queue, if the device exposes one. Used for
    /// asynchronous uploads that should not contend with graphics submission.
    fn transfer_queue(&self) -> Option<Box<dyn Queue>>;

    /// Write data into a buffer (CPU to GPU). Buffer must have been created as host-visible.
    fn write_buffer(&self, buffer: &dyn Buffer, offset: u64, data: &[u8]) -> Result<(), String>;

    /// Upload data into a buffer regardless of its memory preference. For host-visible
    /// buffers this is a direct map/copy; for device-local buffers this stages through a
    /// temporary host-visible buffer and a one-shot copy, blocking until complete.
    fn upload_to_buffer(&self, buffer: &dyn Buffer, offset: u64, data: &[u8]) -> Result<(), String>;

    /// Same as `upload_to_buffer` but records the copy on the transfer queue when available
    /// and returns once the copy is submitted; `signal_fence`, if given, is signaled on
    /// completion instead of blocking the caller. Used by the one-shot upload context so
    /// many uploads can be issued back to back before a single wait.
    fn upload_to_buffer_async(
        &self,
        buffer: &dyn Buffer,
        offset: u64,
        data: &[u8],
        signal_fence: Option<&dyn Fence>,
    ) -> Result<(), String>;

    /// Record and submit a device-to-device buffer copy, signaling `signal_fence` on completion.
    fn submit_buffer_copy(
        &self,
        src: &dyn Buffer,
        src_offset: u64,
        dst: &dyn Buffer,
        dst_offset: u64,
        size: u64,
        signal_fence: Option<&dyn Fence>,
    ) -> Result<(), String>;

    /// Wait for the device to become idle (all submitted work finished).
    fn wait_idle(&self) -> Result<(), String>;

    /// Create a fence for CPU-GPU synchronization.
    fn create_fence(&self, signaled: bool) -> Result<Box<dyn Fence>, String>;
    /// Create a semaphore for GPU-GPU synchronization.
    fn create_semaphore(&self) -> Result<Box<dyn Semaphore>, String>;

    /// Create a swapchain for presentation (only supported when device was created with a
    /// window/surface). Pass the previous swapchain when rebuilding after a resize or an
    /// OUT_OF_DATE/SUBOPTIMAL result so the backend can hand it off as `oldSwapchain`.
    /// `vsync` selects FIFO present mode when true, IMMEDIATE (falling back to
    /// MAILBOX then FIFO if IMMEDIATE is unsupported) when false. `requested_image_count`
    /// is the caller's `{Double=2, Triple=3}` hint (§4.5); the backend clamps it to
    /// `[min_image_count + 1, max_image_count]` and the resulting swapchain reports its
    /// actual image count via `Swapchain::image_count`, independent of frames-in-flight.
    #[cfg(feature = "window")]
    fn create_swapchain(
        &self,
        extent: (u32, u32),
        vsync: bool,
        requested_image_count: u32,
        old_swapchain: Option<&dyn Swapchain>,
    ) -> Result<Box<dyn Swapchain>, String>;
}

/// Fence: CPU can wait for GPU to complete submitted work.
pub trait Fence: Send + Sync + Debug {
    fn wait(&self, timeout_ns: u64) -> Result<(), String>;
    fn reset(&self) -> Result<(), String>;
    fn as_any(&self) -> &dyn Any;
}

/// Semaphore: GPU-GPU synchronization between queues or passes.
pub trait Semaphore: Send + Sync + Debug {
    fn as_any(&self) -> &dyn Any;
}

/// Queue for submitting work. Supports non-blocking submit with semaphores and fence.
pub trait Queue: Send + Sync + Debug {
    fn submit(
        &self,
        command_buffers: &[&dyn CommandBuffer],
        wait_semaphores: &[&dyn Semaphore],
        signal_semaphores: &[&dyn Semaphore],
        signal_fence: Option<&dyn Fence>,
    ) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy)]
pub struct BufferDescriptor {
    pub label: Option<&'static str>,
    pub size: u64,
    pub usage: BufferUsage,
    pub memory: BufferMemoryPreference,
}

pub trait Buffer: Send + Sync + Debug {
    fn id(&self) -> ResourceId;
    fn size(&self) -> u64;
    /// True when the buffer's memory is CPU-mappable (created with `BufferMemoryPreference::HostVisible`).
    fn host_visible(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Clone)]
pub struct TextureDescriptor {
    pub label: Option<&'static str>,
    /// (width, height, depth_or_layers). For 2D: depth=1. For 2DArray: depth=array_layers. For 3D: depth=depth.
    pub size: (u32, u32, u32),
    pub format: TextureFormat,
    pub usage: TextureUsage,
    pub dimension: TextureDimension,
    pub mip_level_count: u32,
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            size: (1, 1, 1),
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsage::empty(),
            dimension: TextureDimension::D2,
            mip_level_count: 1,
        }
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct TextureUsage: u32 {
        const COPY_SRC = 1 << 0;
        const COPY_DST = 1 << 1;
        const TEXTURE_BINDING = 1 << 2;
        const STORAGE_BINDING = 1 << 3;
        const RENDER_ATTACHMENT = 1 << 4;
    }
}

pub trait Texture: Send + Sync + Debug {
    fn id(&self) -> ResourceId;
    fn format(&self) -> TextureFormat;
    fn size(&self) -> (u32, u32, u32);
    fn dimension(&self) -> TextureDimension;
    fn mip_level_count(&self) -> u32;
    fn as_any(&self) -> &dyn Any;
}

/// Texture sampler: filtering and addressing for sampled-image reads in shaders.
pub trait Sampler: Send + Sync + Debug {
    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

#[derive(Debug, Clone, Copy)]
pub struct SamplerDescriptor {
    pub label: Option<&'static str>,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub address_mode_w: AddressMode,
    /// Requested max anisotropy. The backend clamps this to the device's reported
    /// `maxSamplerAnisotropy` and logs a warning when the request had to be reduced.
    pub anisotropy_clamp: Option<f32>,
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            address_mode_w: AddressMode::Repeat,
            anisotropy_clamp: None,
        }
    }
}

pub trait ComputePipeline: Send + Sync + Debug {
    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Clone, Default)]
pub struct ComputePipelineDescriptor {
    pub label: Option<&'static str>,
    pub shader_source: String,
    pub entry_point: String,
    pub layout_bindings: Vec<DescriptorSetLayoutBinding>,
}

/// Graphics pipeline for rasterization (vertex + fragment).
pub trait GraphicsPipeline: Send + Sync + Debug {
    fn as_any(&self) -> &dyn Any;
}

/// Descriptor for creating a graphics pipeline.
///
/// `set_layouts[i]` becomes descriptor set `i` in the pipeline layout, so a
/// pipeline that binds a per-frame global UBO at set 0 and a per-material
/// sampler/texture set at set 1 passes `vec![global_bindings, material_bindings]`.
#[derive(Debug, Clone, Default)]
pub struct GraphicsPipelineDescriptor {
    pub label: Option<&'static str>,
    pub vertex_shader: ShaderStage,
    pub fragment_shader: Option<ShaderStage>,
    pub vertex_input: VertexInputDescriptor,
    pub primitive_topology: PrimitiveTopology,
    pub rasterization: RasterizationState,
    pub color_targets: Vec<ColorTargetState>,
    pub depth_stencil: Option<DepthStencilState>,
    pub set_layouts: Vec<Vec<DescriptorSetLayoutBinding>>,
    pub push_constant_ranges: Vec<PushConstantRange>,
}

/// A push-constant range in the pipeline layout, e.g. a single mat4 model matrix
/// visible to the vertex stage at offset 0.
#[derive(Debug, Clone, Copy)]
pub struct PushConstantRange {
    pub stages: ShaderStages,
    pub offset: u32,
    pub size: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ShaderStage {
    pub source: Vec<u8>, // SPIR-V bytes
    pub entry_point: String,
}

#[derive(Debug, Clone, Default)]
pub struct VertexInputDescriptor {
    pub attributes: Vec<VertexAttribute>,
    pub bindings: Vec<VertexBinding>,
}

#[derive(Debug, Clone)]
pub struct VertexAttribute {
    pub location: u32,
    pub binding: u32,
    pub format: VertexFormat,
    pub offset: u32,
}

#[derive(Debug, Clone)]
pub struct VertexBinding {
    pub binding: u32,
    pub stride: u32,
    pub input_rate: VertexInputRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexInputRate {
    Vertex,
    Instance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexFormat {
    #[default]
    Float32x3,
    Float32x2,
    Float32x4,
    Uint32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveTopology {
    #[default]
    TriangleList,
    TriangleStrip,
    LineList,
    PointList,
}

#[derive(Debug, Clone, Default)]
pub struct RasterizationState {
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub polygon_mode: PolygonMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    None,
    #[default]
    Back,
    Front,
    FrontAndBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrontFace {
    #[default]
    CounterClockwise,
    Clockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
    Point,
}

#[derive(Debug, Clone)]
pub struct ColorTargetState {
    pub format: TextureFormat,
    pub blend: Option<BlendState>,
}

#[derive(Debug, Clone)]
pub struct BlendState {
    pub color: BlendComponent,
    pub alpha: BlendComponent,
}

#[derive(Debug, Clone, Copy)]
pub struct BlendComponent {
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
    pub operation: BlendOp,
}

#[derive(Debug, Clone, Copy)]
pub enum BlendFactor {
    One,
    Zero,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

#[derive(Debug, Clone, Copy)]
pub enum BlendOp {
    Add,
    Subtract,
}

#[derive(Debug, Clone)]
pub struct DepthStencilState {
    pub format: TextureFormat,
    pub depth_write_enabled: bool,
    pub depth_compare: CompareOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

/// Render pass descriptor for begin_render_pass.
#[derive(Debug, Clone)]
pub struct RenderPassDescriptor<'a> {
    pub label: Option<&'static str>,
    pub color_attachments: Vec<ColorAttachment<'a>>,
    pub depth_stencil_attachment: Option<DepthStencilAttachment<'a>>,
}

#[derive(Debug, Clone)]
pub struct ColorAttachment<'a> {
    pub texture: &'a dyn Texture,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub clear_value: Option<ClearColor>,
    /// Layout the texture is known to be in when the pass begins. Lets the render-pass
    /// cache key on the real initial layout instead of assuming `Undefined` every time,
    /// which matters for attachments that are also sampled by a later pass (e.g. the
    /// composition output read by the skybox pass with LOAD/STORE).
    pub initial_layout: Option<ImageLayout>,
}

#[derive(Debug, Clone, Copy)]
pub struct ClearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Debug, Clone)]
pub struct DepthStencilAttachment<'a> {
    pub texture: &'a dyn Texture,
    pub depth_load_op: LoadOp,
    pub depth_store_op: StoreOp,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
    pub clear_depth: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOp {
    Load,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Store,
    DontCare,
}

pub trait CommandEncoder: Debug {
    fn begin_compute_pass(&mut self) -> Box<dyn ComputePass>;
    fn begin_render_pass<'a>(&mut self, desc: RenderPassDescriptor<'a>) -> Result<Box<dyn RenderPass>, String>;
    fn copy_buffer_to_buffer(
        &mut self,
        src: &dyn Buffer,
        src_offset: u64,
        dst: &dyn Buffer,
        dst_offset: u64,
        size: u64,
    );
    fn copy_buffer_to_texture(
        &mut self,
        src: &dyn Buffer,
        src_offset: u64,
        dst: &dyn Texture,
        dst_mip: u32,
        dst_origin: (u32, u32, u32),
        size: (u32, u32, u32),
    );
    /// Insert a pipeline barrier for a texture layout transition and the accompanying
    /// stage/access synchronization.
    fn pipeline_barrier_texture(
        &mut self,
        texture: &dyn Texture,
        old_layout: ImageLayout,
        new_layout: ImageLayout,
    );
    /// Insert a pipeline barrier for a buffer written by one pass and read by the next
    /// (e.g. a compute-populated storage buffer consumed as a vertex/fragment input).
    fn pipeline_barrier_buffer(&mut self, buffer: &dyn Buffer, offset: u64, size: u64);
    /// Transition a single mip level of a texture, leaving the rest of the
    /// mip chain's layout untouched. Needed while generating a mip chain one
    /// level at a time, where sibling levels sit in different layouts at the
    /// same instant (source level: `TransferSrc`, level being written:
    /// `TransferDst`, levels not yet reached: `Undefined`).
    fn pipeline_barrier_texture_mip(
        &mut self,
        texture: &dyn Texture,
        mip: u32,
        old_layout: ImageLayout,
        new_layout: ImageLayout,
    );
    /// Blit `src_mip` of `texture` into `dst_mip` of the same texture with
    /// linear filtering, scaling from `src_size` to `dst_size`. The caller is
    /// responsible for placing `src_mip` in `TransferSrc` and `dst_mip` in
    /// `TransferDst` beforehand via `pipeline_barrier_texture_mip`.
    fn blit_texture_mip(
        &mut self,
        texture: &dyn Texture,
        src_mip: u32,
        dst_mip: u32,
        src_size: (u32, u32),
        dst_size: (u32, u32),
    );
    fn finish(self: Box<Self>) -> Result<Box<dyn CommandBuffer>, String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageLayout {
    Undefined,
    TransferDst,
    TransferSrc,
    ShaderReadOnly,
    ColorAttachment,
    DepthStencilAttachment,
    General,
    PresentSrc,
}

/// Render pass for recording draw calls.
pub trait RenderPass: Debug {
    fn set_pipeline(&mut self, pipeline: &dyn GraphicsPipeline);
    /// Bind a descriptor set for the currently bound graphics pipeline (set_index must
    /// match layout). `dynamic_offsets` supplies one offset per `DynamicUniformBuffer`
    /// binding in the set, in binding order; pass an empty slice when the set has none.
    fn bind_descriptor_set(&mut self, set_index: u32, set: &dyn DescriptorSet, dynamic_offsets: &[u32]);
    /// Push inline constant data (e.g. the per-draw model matrix) visible to `stages`.
    fn push_constants(&mut self, stages: ShaderStages, offset: u32, data: &[u8]);
    fn set_vertex_buffer(&mut self, index: u32, buffer: &dyn Buffer, offset: u64);
    fn set_index_buffer(&mut self, buffer: &dyn Buffer, offset: u64, index_format: IndexFormat);
    fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32);
    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    );
    fn draw_indexed_indirect(&mut self, buffer: &dyn Buffer, offset: u64);
    fn end(self: Box<Self>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

pub trait ComputePass: Debug {
    fn set_pipeline(&mut self, pipeline: &dyn ComputePipeline);
    fn bind_descriptor_set(&mut self, set_index: u32, set: &dyn DescriptorSet);
    fn dispatch(&mut self, x: u32, y: u32, z: u32);
    fn dispatch_indirect(&mut self, buffer: &dyn Buffer, offset: u64);
}

/// Descriptor binding type for layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    UniformBuffer,
    /// A uniform buffer bound with a runtime offset supplied at bind time
    /// (`RenderPass::bind_descriptor_set`'s `dynamic_offsets`), used for the single
    /// linear per-frame UBO allocation sliced into frames-in-flight regions.
    DynamicUniformBuffer,
    StorageBuffer,
    StorageImage,
    SampledImage,
    CombinedImageSampler,
}

/// Descriptor set layout binding.
#[derive(Debug, Clone)]
pub struct DescriptorSetLayoutBinding {
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    pub count: u32,
    pub stages: ShaderStages,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShaderStages: u32 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 1;
        const COMPUTE = 1 << 2;
    }
}

/// Descriptor set layout.
pub trait DescriptorSetLayout: Send + Sync + Debug {
    fn as_any(&self) -> &dyn Any;
}

/// Explicit per-descriptor-type sizing for a descriptor pool. Types absent from
/// `pool_sizes` fall back to a default multiple of `max_sets`.
#[derive(Debug, Clone, Default)]
pub struct DescriptorPoolDescriptor {
    pub max_sets: u32,
    pub pool_sizes: Vec<(DescriptorType, u32)>,
}

/// Descriptor pool for allocating sets.
pub trait DescriptorPool: Send + Sync + Debug {
    fn allocate_set(&self, layout: &dyn DescriptorSetLayout) -> Result<Box<dyn DescriptorSet>, String>;
}

/// Descriptor set for binding resources.
pub trait DescriptorSet: Send + Sync + Debug {
    fn write_buffer(&mut self, binding: u32, buffer: &dyn Buffer, offset: u64, size: u64) -> Result<(), String>;
    fn write_texture(&mut self, binding: u32, texture: &dyn Texture) -> Result<(), String>;
    fn write_sampled_image(&mut self, binding: u32, texture: &dyn Texture, sampler: &dyn Sampler) -> Result<(), String>;
    /// Array-element-aware variants, for bindings declared with `count > 1` (texture arrays).
    fn write_buffer_at(&mut self, binding: u32, array_element: u32, buffer: &dyn Buffer, offset: u64, size: u64) -> Result<(), String>;
    fn write_texture_at(&mut self, binding: u32, array_element: u32, texture: &dyn Texture) -> Result<(), String>;
    fn write_sampled_image_at(&mut self, binding: u32, array_element: u32, texture: &dyn Texture, sampler: &dyn Sampler) -> Result<(), String>;
    fn as_any(&self) -> &dyn Any;
}

pub trait CommandBuffer: Send + Sync + Debug {
    fn as_any(&self) -> &dyn Any;
}

/// One swapchain image available for rendering this frame.
pub struct SwapchainFrame<'a> {
    pub image_index: u32,
    pub texture: &'a dyn Texture,
    /// True if the backend reports the swapchain is still usable this frame but
    /// should be rebuilt (via `Device::create_swapchain` with this swapchain as
    /// `old_swapchain`) before the next acquire.
    pub suboptimal: bool,
}

/// Swapchain for presenting to a window. Acquire an image, render to it, then present.
pub trait Swapchain: Send + Sync + Debug {
    /// Acquire the next image. Returns (image_index, texture to use as color attachment).
    /// Wait semaphore will be signaled when the image is available.
    ///
    /// Returns `Err(SwapchainError::OutOfDate)` when the swapchain no longer matches the
    /// surface (e.g. after a resize) and must be rebuilt before acquiring again.
    fn acquire_next_image(&mut self, wait_semaphore: Option<&dyn Semaphore>) -> Result<SwapchainFrame<'_>, SwapchainError>;
    /// Present the image. Wait semaphore should be signaled when rendering to that image is done.
    fn present(&self, image_index: u32, wait_semaphore: Option<&dyn Semaphore>) -> Result<(), SwapchainError>;
    /// Current extent (width, height). May change on resize.
    fn extent(&self) -> (u32, u32);
    /// Number of presentable images this swapchain actually holds (K in §3's data model,
    /// `K >= F`). Driven by the surface's min/max image count, independent of the caller's
    /// requested hint and of the frame orchestrator's frames-in-flight count.
    fn image_count(&self) -> u32;
    fn as_any(&self) -> &dyn Any;
}

/// Swapchain-specific failure, distinguishing the recoverable "please rebuild me"
/// case from a hard backend error.
#[derive(Debug)]
pub enum SwapchainError {
    /// The swapchain is stale (resized surface, lost surface) and must be recreated
    /// via `Device::create_swapchain(extent, vsync, requested_image_count, Some(&old))`.
    OutOfDate,
    Other(String),
}

impl std::fmt::Display for SwapchainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwapchainError::OutOfDate => write!(f, "swapchain out of date"),
            SwapchainError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for SwapchainError {}

#[cfg(feature = "vulkan")]
pub mod vulkan;

#[cfg(feature = "vulkan")]
pub use vulkan::VulkanDevice;
