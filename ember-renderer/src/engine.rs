//! Renderer facade (C11): owns every other component and drives the fixed
//! per-frame sequence of §4.11. This is where the `engine_*` public API
//! surface of §6 lives, as inherent methods on [`Engine`] instead of a C ABI
//! `Engine*` handle (idiomatic ownership replaces the handle, SPEC_FULL.md
//! §9). Grounded on `lumelite-renderer/src/lib.rs`'s `Renderer`
//! (`ensure_frame_resources`/`encode_frame`/`encode_present_to`/
//! `render_frame`/`submit` as the per-frame driving sequence), generalized
//! from wgpu's automatic-layout model to this engine's explicit
//! frame-orchestrator/pass-graph split.

use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::draw;
use crate::entity::{Entity, EntityId};
use crate::error::{EngineError, EngineResult};
use crate::frame::FrameOrchestrator;
use crate::material::{self, TextureKind};
use crate::math::{Mat4, Vec3};
use crate::model::{self, Model};
use crate::passes::{geometry, CompositionPass, GeometryPass, SkyboxPass, UiPass};
use crate::scene::SceneUniform;
use crate::shader::compile_vertex_fragment;
use crate::shaders;
use crate::vertex::Vertex;
use ember_rhi::{
    BufferDescriptor, BufferMemoryPreference, BufferUsage, ColorTargetState, CompareOp,
    DescriptorPool, DescriptorSet, DescriptorSetLayout, DescriptorSetLayoutBinding,
    DescriptorType, Device, DepthStencilState, GraphicsPipeline, GraphicsPipelineDescriptor,
    PolygonMode, PrimitiveTopology, PushConstantRange, RasterizationState, RenderPass, Sampler,
    ShaderStages, Swapchain, TextureFormat, VertexInputDescriptor, VulkanDevice,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Region stride for the camera dynamic UBO: a fixed, conservative multiple
/// of every GPU's `minUniformBufferOffsetAlignment` (typically 64 or 256).
/// `ember_rhi::Device` has no alignment query (SPEC_FULL.md's ember-rhi
/// audit), so this follows the workspace's own example convention of a flat
/// 256-byte region (see `ubo_triangle.rs`'s "Use 256 bytes to satisfy
/// minUniformBufferOffsetAlignment").
const CAMERA_UBO_STRIDE: u64 = 256;

/// Swapchain color format used for the present pipeline's color target.
/// `ember_rhi::TextureFormat` has no non-linear BGRA variant, so the
/// sRGB-encoding half of spec §4.5's `B8G8R8A8_SRGB` contract is carried by
/// the backend's swapchain creation (best-effort) rather than expressible
/// here; see DESIGN.md.
const SWAPCHAIN_COLOR_FORMAT: TextureFormat = TextureFormat::Bgra8Unorm;

/// `engine_set_render_mode`: 0 = solid, 1 = wireframe (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Solid = 0,
    Wireframe = 1,
}

impl RenderMode {
    pub fn from_u8(value: u8) -> Self {
        if value == 1 {
            RenderMode::Wireframe
        } else {
            RenderMode::Solid
        }
    }
}

/// One entry per swapchain image: the composition pass reads the G-buffer
/// through these, the present pass reads the composition output through
/// `present_sets`. Rebuilt whenever the attachment images they reference are
/// (re)built (initial construction and swapchain resize).
struct PerImageSets {
    composition: Vec<Box<dyn DescriptorSet>>,
    present: Vec<Box<dyn DescriptorSet>>,
}

/// The renderer facade. Owns the device, swapchain, frame orchestrator, the
/// four pass factories, every GPU-side descriptor/pipeline object, and the
/// host-level model/entity/camera state (§3, §6).
pub struct Engine {
    device: Arc<dyn Device>,
    swapchain: Box<dyn Swapchain>,
    frame: FrameOrchestrator,
    last_rebuild_count: u64,
    /// K: the swapchain's actual reported image count (`Swapchain::image_count`),
    /// sizing the geometry/composition passes' per-image attachments and the
    /// `per_image` descriptor sets. Re-read from the swapchain after every
    /// rebuild since the driver is free to hand back a different count. Kept
    /// deliberately separate from `frame.frames_in_flight()` (F), which sizes
    /// the camera UBO and never changes after `initialize`.
    image_count: u32,

    geometry: GeometryPass,
    composition: CompositionPass,
    skybox: SkyboxPass,
    present: UiPass,

    camera_ubo: Box<dyn ember_rhi::Buffer>,
    scene_ubo: Box<dyn ember_rhi::Buffer>,
    camera_set: Box<dyn DescriptorSet>,
    per_image: PerImageSets,

    material_layout: Box<dyn DescriptorSetLayout>,
    material_sampler: Box<dyn Sampler>,
    descriptor_pool: Box<dyn DescriptorPool>,

    geometry_pipeline_solid: Box<dyn GraphicsPipeline>,
    geometry_pipeline_wireframe: Box<dyn GraphicsPipeline>,
    composition_pipeline: Box<dyn GraphicsPipeline>,
    skybox_pipeline: Box<dyn GraphicsPipeline>,
    present_pipeline: Box<dyn GraphicsPipeline>,

    render_mode: RenderMode,
    vsync: bool,

    config: EngineConfig,
    created_at: Instant,

    camera: Option<Camera>,
    camera_speed: f32,

    models: Vec<Option<Model>>,
    entities: Vec<Entity>,
    next_entity_id: EntityId,
    skybox_model: Option<usize>,

    ambient: f32,
    specular_strength: f32,
    specular_shininess: f32,
    sun_dir: Vec3,
    sun_pos: Vec3,
}

fn camera_set_bindings() -> [DescriptorSetLayoutBinding; 1] {
    [DescriptorSetLayoutBinding {
        binding: 0,
        descriptor_type: DescriptorType::DynamicUniformBuffer,
        count: 1,
        stages: ShaderStages::VERTEX,
    }]
}

fn composition_set_bindings() -> [DescriptorSetLayoutBinding; 5] {
    let mut bindings: Vec<DescriptorSetLayoutBinding> = (0..4u32)
        .map(|binding| DescriptorSetLayoutBinding {
            binding,
            descriptor_type: DescriptorType::CombinedImageSampler,
            count: 1,
            stages: ShaderStages::FRAGMENT,
        })
        .collect();
    bindings.push(DescriptorSetLayoutBinding {
        binding: 4,
        descriptor_type: DescriptorType::UniformBuffer,
        count: 1,
        stages: ShaderStages::FRAGMENT,
    });
    bindings.try_into().unwrap_or_else(|_| unreachable!())
}

fn present_set_bindings() -> [DescriptorSetLayoutBinding; 1] {
    [DescriptorSetLayoutBinding {
        binding: 0,
        descriptor_type: DescriptorType::CombinedImageSampler,
        count: 1,
        stages: ShaderStages::FRAGMENT,
    }]
}

fn depth_stencil_reversed_z() -> DepthStencilState {
    DepthStencilState {
        format: geometry::DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: CompareOp::GreaterOrEqual,
    }
}

impl Engine {
    /// `engine_initialize(name, w, h)` (§6). `window` is the window
    /// collaborator's handle (§6 "Window collaborator: provides `{handle,
    /// width, height, name}`"); this engine has exactly one backend
    /// (SPEC_FULL.md §0), so the facade is free to name `VulkanDevice`
    /// concretely instead of going through a backend-agnostic constructor.
    pub fn initialize(
        window: &dyn raw_window_handle::HasWindowHandle,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        let device: Arc<dyn Device> = VulkanDevice::new_with_surface(window)?;
        let extent = (config.width.max(1), config.height.max(1));
        // The host's `{Double, Triple}` hint drives both F (frame-in-flight
        // slots) and the requested K (swapchain image count), but the
        // backend is free to hand back more images than requested (§4.5);
        // `swapchain.image_count()` afterward is the authoritative K.
        let requested_image_count = config.frames_in_flight.as_u32();
        let swapchain = device.create_swapchain(extent, config.vsync, requested_image_count, None)?;
        let image_count = swapchain.image_count();

        let frames_in_flight = requested_image_count;
        let frame = FrameOrchestrator::new(device.as_ref(), frames_in_flight, config.vsync, requested_image_count)?;

        let geometry = GeometryPass::new(device.as_ref(), image_count, extent)?;
        let composition = CompositionPass::new(device.as_ref(), image_count, extent)?;
        let skybox = SkyboxPass::new();
        let present = UiPass::new(extent);

        let descriptor_pool = device.create_descriptor_pool(1000)?;
        let material_layout = material::material_descriptor_set_layout(device.as_ref())?;
        let material_sampler = material::create_material_sampler(device.as_ref())?;

        let camera_ubo = device.create_buffer(&BufferDescriptor {
            label: Some("camera_ubo"),
            size: CAMERA_UBO_STRIDE * frames_in_flight as u64,
            usage: BufferUsage::Uniform,
            memory: BufferMemoryPreference::HostVisible,
        })?;
        let scene_ubo = device.create_buffer(&BufferDescriptor {
            label: Some("scene_ubo"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: BufferUsage::Uniform,
            memory: BufferMemoryPreference::HostVisible,
        })?;

        let camera_layout = device.create_descriptor_set_layout(&camera_set_bindings())?;
        let mut camera_set = descriptor_pool.allocate_set(camera_layout.as_ref())?;
        camera_set.write_buffer(0, camera_ubo.as_ref(), 0, CAMERA_UBO_STRIDE)?;

        let composition_layout = device.create_descriptor_set_layout(&composition_set_bindings())?;
        let present_layout = device.create_descriptor_set_layout(&present_set_bindings())?;
        let per_image = build_per_image_sets(
            device.as_ref(),
            descriptor_pool.as_ref(),
            composition_layout.as_ref(),
            present_layout.as_ref(),
            material_sampler.as_ref(),
            scene_ubo.as_ref(),
            &geometry,
            &composition,
            image_count,
        )?;

        let (geometry_pipeline_solid, geometry_pipeline_wireframe) =
            build_geometry_pipelines(device.as_ref())?;
        let composition_pipeline = build_composition_pipeline(device.as_ref())?;
        let skybox_pipeline = build_skybox_pipeline(device.as_ref())?;
        let present_pipeline = build_present_pipeline(device.as_ref())?;

        Ok(Self {
            device,
            swapchain,
            frame,
            last_rebuild_count: 0,
            image_count,
            geometry,
            composition,
            skybox,
            present,
            camera_ubo,
            scene_ubo,
            camera_set,
            per_image,
            material_layout,
            material_sampler,
            descriptor_pool,
            geometry_pipeline_solid,
            geometry_pipeline_wireframe,
            composition_pipeline,
            skybox_pipeline,
            present_pipeline,
            render_mode: RenderMode::Solid,
            vsync: config.vsync,
            ambient: config.ambient,
            specular_strength: config.specular_strength,
            specular_shininess: config.specular_shininess,
            config,
            created_at: Instant::now(),
            camera: None,
            camera_speed: 1.0,
            models: Vec::new(),
            entities: Vec::new(),
            next_entity_id: 1,
            skybox_model: None,
            sun_dir: Vec3::new(-0.3, -1.0, -0.3).normalized(),
            sun_pos: Vec3::new(100.0, 100.0, 100.0),
        })
    }

    /// `engine_update`: advances host-side bookkeeping. Input/windowing are
    /// external collaborators (§1 non-goal), so there is nothing for this
    /// engine to poll; it always reports "keep running" and leaves exit
    /// decisions to the window collaborator's own event loop.
    pub fn update(&mut self) -> bool {
        true
    }

    /// `engine_update_input`: no-op hook point, input is an external
    /// collaborator (§1).
    pub fn update_input(&mut self) {}

    /// `engine_begin_render`: reports whether the surface is currently
    /// drawable (non-zero extent). The GPU-side acquire happens inside
    /// [`Engine::render`] itself: Rust's borrow checker does not allow a
    /// swapchain image acquired here to be held across a separate method
    /// call without unsafe self-referential storage, so `begin_render`,
    /// `render`, and `present` do not split the frame the way the original
    /// three-call C ABI did (SPEC_FULL.md §9).
    pub fn begin_render(&self) -> bool {
        let (w, h) = self.swapchain.extent();
        w != 0 && h != 0
    }

    /// `engine_render` + `engine_present` folded into one call: acquire,
    /// record the fixed pass sequence of §4.11, submit, and present. See
    /// [`Engine::render_with_ui`] to additionally record UI draws into the
    /// same final pass.
    pub fn render(&mut self) -> EngineResult<()> {
        self.render_with_ui(|_pass| {})
    }

    /// `engine_present`: a no-op. [`FrameOrchestrator::submit_and_present`]
    /// bundles submit and present into one call (frame.rs, grounded on the
    /// donor's single acquire/submit/present sequence), so there is no
    /// separate present step to perform here; kept only for API-surface
    /// fidelity with §6.
    pub fn present(&mut self) -> EngineResult<()> {
        Ok(())
    }

    /// Runs the full §4.11 per-frame sequence, handing the final
    /// swapchain-writing pass to `ui_draw` right after this engine's own
    /// present-blit triangle so an external UI collaborator can layer its
    /// own draws before the pass ends (§4.11 step 7, §6 "Window
    /// collaborator").
    pub fn render_with_ui(&mut self, ui_draw: impl FnOnce(&mut dyn RenderPass)) -> EngineResult<()> {
        let (w, h) = self.swapchain.extent();
        if w == 0 || h == 0 {
            return Ok(());
        }

        // §4.6 step 1 (begin_frame's fence wait) must complete before step 5
        // (writing this slot's UBO region) - otherwise a still-in-flight GPU
        // read of the previous frame using this same slot could race the host
        // write.
        let acquired = self.frame.begin_frame(self.device.as_ref(), &mut self.swapchain)?;
        self.write_frame_uniforms()?;
        let frame_index = acquired.frame_index;
        let image_index = acquired.swapchain_frame.image_index as usize;
        let swapchain_texture = acquired.swapchain_frame.texture;
        let camera_offset = (frame_index as u64 * CAMERA_UBO_STRIDE) as u32;

        let mut encoder = self.device.create_command_encoder()?;

        {
            let geometry_pipeline = match self.render_mode {
                RenderMode::Solid => self.geometry_pipeline_solid.as_ref(),
                RenderMode::Wireframe => self.geometry_pipeline_wireframe.as_ref(),
            };
            let mut pass = self.geometry.begin(encoder.as_mut(), image_index)?;
            pass.set_pipeline(geometry_pipeline);
            pass.bind_descriptor_set(0, self.camera_set.as_ref(), &[camera_offset]);
            for entity in &self.entities {
                let Some(Some(model)) = self.models.get(entity.model_index) else {
                    continue;
                };
                let matrix = entity.compose_matrix();
                draw::render_model(model, &matrix, pass.as_mut());
            }
            pass.end();
        }

        {
            let mut pass = self.composition.begin(encoder.as_mut(), image_index)?;
            pass.set_pipeline(self.composition_pipeline.as_ref());
            pass.bind_descriptor_set(0, self.per_image.composition[image_index].as_ref(), &[]);
            pass.draw(3, 1, 0, 0);
            pass.end();
        }

        if let Some(index) = self.skybox_model {
            if let Some(Some(model)) = self.models.get(index) {
                let target = self.composition.color_texture(image_index);
                let mut pass = self.skybox.begin(encoder.as_mut(), target)?;
                pass.set_pipeline(self.skybox_pipeline.as_ref());
                pass.bind_descriptor_set(0, self.camera_set.as_ref(), &[camera_offset]);
                draw::render_model(model, &Mat4::IDENTITY, pass.as_mut());
                pass.end();
            }
        }

        {
            let mut pass = self.present.begin(encoder.as_mut(), swapchain_texture)?;
            pass.set_pipeline(self.present_pipeline.as_ref());
            pass.bind_descriptor_set(0, self.per_image.present[image_index].as_ref(), &[]);
            pass.draw(3, 1, 0, 0);
            ui_draw(pass.as_mut());
            pass.end();
        }

        let command_buffer = encoder.finish()?;
        drop(acquired);

        self.frame.submit_and_present(
            self.device.as_ref(),
            &mut self.swapchain,
            image_index as u32,
            command_buffer,
        )?;

        if self.frame.rebuild_count() != self.last_rebuild_count {
            self.last_rebuild_count = self.frame.rebuild_count();
            self.handle_swapchain_rebuild()?;
        }

        Ok(())
    }

    fn write_frame_uniforms(&self) -> EngineResult<()> {
        let frame_index = self.frame.current_frame_index() as u64;
        if let Some(camera) = &self.camera {
            let offset = frame_index * CAMERA_UBO_STRIDE;
            let bytes = camera.view_proj().to_bytes();
            self.device.write_buffer(self.camera_ubo.as_ref(), offset, &bytes)?;
        }

        let camera_pos = self.camera.as_ref().map(|c| c.position).unwrap_or(Vec3::ZERO);
        let scene = SceneUniform::new(
            self.ambient,
            self.specular_strength,
            self.specular_shininess,
            camera_pos,
            self.sun_dir,
            self.sun_pos,
        );
        self.device.write_buffer(self.scene_ubo.as_ref(), 0, bytemuck::bytes_of(&scene))?;
        Ok(())
    }

    /// §4.5: rebuild every pass's attachments at the new surface extent, and
    /// refresh the camera's aspect ratio and the descriptor sets that
    /// reference the rebuilt G-buffer/composition images.
    fn handle_swapchain_rebuild(&mut self) -> EngineResult<()> {
        let extent = self.swapchain.extent();
        // K can change across a rebuild (the driver is not bound to honor
        // the original request a second time), so re-read it rather than
        // reusing the stale count from `initialize`.
        self.image_count = self.swapchain.image_count();
        self.geometry.resize(self.device.as_ref(), self.image_count, extent)?;
        self.composition.resize(self.device.as_ref(), self.image_count, extent)?;
        self.present.resize(extent);
        if let Some(camera) = &mut self.camera {
            camera.update_projection(extent.0, extent.1);
        }

        let composition_layout = self.device.create_descriptor_set_layout(&composition_set_bindings())?;
        let present_layout = self.device.create_descriptor_set_layout(&present_set_bindings())?;
        self.per_image = build_per_image_sets(
            self.device.as_ref(),
            self.descriptor_pool.as_ref(),
            composition_layout.as_ref(),
            present_layout.as_ref(),
            self.material_sampler.as_ref(),
            self.scene_ubo.as_ref(),
            &self.geometry,
            &self.composition,
            self.image_count,
        )?;
        Ok(())
    }

    /// `engine_terminate`: blocks until the GPU is idle. Resources are then
    /// released by `Drop` as the `Engine` is dropped (idiomatic ownership
    /// replaces the explicit C ABI teardown call, SPEC_FULL.md §9).
    pub fn terminate(&mut self) -> EngineResult<()> {
        self.device.wait_idle().map_err(EngineError::from)
    }

    /// `engine_load_model(path, flip_uv)` -> model index.
    pub fn load_model(&mut self, path: &Path, flip_uv: bool) -> EngineResult<usize> {
        let model = model::load_obj(
            self.device.as_ref(),
            self.descriptor_pool.as_ref(),
            self.material_layout.as_ref(),
            self.material_sampler.as_ref(),
            path,
            flip_uv,
        )?;
        self.models.push(Some(model));
        Ok(self.models.len() - 1)
    }

    /// `engine_add_model(bytes, size, flip_uv)` -> model index. `size` is
    /// folded into the Rust slice length; it exists in §6 only because the C
    /// ABI has no fat pointers.
    pub fn add_model(&mut self, name: &str, bytes: &[u8], flip_uv: bool) -> EngineResult<usize> {
        let model = model::load_obj_from_memory(
            self.device.as_ref(),
            self.descriptor_pool.as_ref(),
            self.material_layout.as_ref(),
            self.material_sampler.as_ref(),
            name,
            bytes,
            flip_uv,
        )?;
        self.models.push(Some(model));
        Ok(self.models.len() - 1)
    }

    /// `engine_remove_model(index)`: tombstones the slot so other models'
    /// indices stay stable; entities still pointing at it are skipped by
    /// `render_with_ui` instead of panicking.
    pub fn remove_model(&mut self, index: usize) {
        if let Some(slot) = self.models.get_mut(index) {
            *slot = None;
        }
    }

    /// Designates `index` as the environment model rendered by the optional
    /// skybox pass (§4.7/§4.11 step 6). Not part of §6's explicit list, but
    /// the per-frame sequence's "if environment enabled" branch needs
    /// something to gate on.
    pub fn set_skybox_model(&mut self, index: Option<usize>) {
        self.skybox_model = index;
    }

    /// `engine_add_entity(model_index, x, y, z)` -> id.
    pub fn add_entity(&mut self, model_index: usize, x: f32, y: f32, z: f32) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        self.entities.push(Entity::new(id, format!("entity_{id}"), model_index, Vec3::new(x, y, z)));
        id
    }

    /// `engine_remove_instance(index)`. Despite the §6 name this is keyed by
    /// entity id, the only stable handle `add_entity` hands back.
    pub fn remove_instance(&mut self, id: EntityId) {
        self.entities.retain(|e| e.id != id);
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn set_instance_position(&mut self, id: EntityId, position: Vec3) {
        if let Some(e) = self.entity_mut(id) {
            e.set_position(position);
        }
    }

    pub fn set_instance_rotation(&mut self, id: EntityId, rotation: Vec3) {
        if let Some(e) = self.entity_mut(id) {
            e.set_rotation(rotation);
        }
    }

    pub fn set_instance_scale(&mut self, id: EntityId, scale: Vec3) {
        if let Some(e) = self.entity_mut(id) {
            e.set_scale(scale);
        }
    }

    /// `engine_create_camera(fov, speed)`. `speed` has no internal use (input
    /// is an external collaborator, §1) but is retained for a host-side
    /// camera controller to read back via [`Engine::camera_speed`].
    pub fn create_camera(&mut self, fov_y_rad: f32, speed: f32) {
        let extent = self.swapchain.extent();
        self.camera = Some(Camera::new(Vec3::ZERO, fov_y_rad, extent.0.max(1), extent.1.max(1)));
        self.camera_speed = speed;
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    pub fn camera_speed(&self) -> f32 {
        self.camera_speed
    }

    /// `engine_update_camera_view`.
    pub fn update_camera_view(&mut self) {
        if let Some(camera) = &mut self.camera {
            camera.update_view();
        }
    }

    /// `engine_update_camera_projection(w, h)`.
    pub fn update_camera_projection(&mut self, width: u32, height: u32) {
        if let Some(camera) = &mut self.camera {
            camera.update_projection(width, height);
        }
    }

    /// `engine_set_render_mode(0=solid, 1=wireframe)`.
    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.render_mode = mode;
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    /// `engine_set_vsync`.
    pub fn set_vsync(&mut self, vsync: bool) -> EngineResult<()> {
        self.vsync = vsync;
        self.frame.set_vsync(self.device.as_ref(), &mut self.swapchain, vsync)
    }

    pub fn vsync(&self) -> bool {
        self.vsync
    }

    pub fn set_sun_direction(&mut self, direction: Vec3) {
        self.sun_dir = direction.normalized();
    }

    pub fn set_sun_position(&mut self, position: Vec3) {
        self.sun_pos = position;
    }

    /// Uptime accessor (§6 "uptime ... accessors").
    pub fn uptime(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[allow(clippy::too_many_arguments)]
fn build_per_image_sets(
    device: &dyn Device,
    pool: &dyn DescriptorPool,
    composition_layout: &dyn DescriptorSetLayout,
    present_layout: &dyn DescriptorSetLayout,
    sampler: &dyn Sampler,
    scene_ubo: &dyn ember_rhi::Buffer,
    geometry: &GeometryPass,
    composition: &CompositionPass,
    image_count: u32,
) -> EngineResult<PerImageSets> {
    let mut composition_sets = Vec::with_capacity(image_count as usize);
    let mut present_sets = Vec::with_capacity(image_count as usize);

    for image_index in 0..image_count as usize {
        let mut set = pool.allocate_set(composition_layout)?;
        set.write_sampled_image(0, geometry.position_texture(image_index), sampler)?;
        set.write_sampled_image(1, geometry.normal_texture(image_index), sampler)?;
        set.write_sampled_image(2, geometry.albedo_texture(image_index), sampler)?;
        set.write_sampled_image(3, geometry.specular_texture(image_index), sampler)?;
        set.write_buffer(4, scene_ubo, 0, std::mem::size_of::<SceneUniform>() as u64)?;
        composition_sets.push(set);

        let mut present_set = pool.allocate_set(present_layout)?;
        present_set.write_sampled_image(0, composition.color_texture(image_index), sampler)?;
        present_sets.push(present_set);
    }

    Ok(PerImageSets { composition: composition_sets, present: present_sets })
}

fn build_geometry_pipelines(
    device: &dyn Device,
) -> EngineResult<(Box<dyn GraphicsPipeline>, Box<dyn GraphicsPipeline>)> {
    let (vertex, fragment) = compile_vertex_fragment(shaders::GEOMETRY_VERTEX, shaders::GEOMETRY_FRAGMENT)?;
    let set_layouts = vec![camera_set_bindings().to_vec(), material::material_set_bindings().to_vec()];
    let push_constant_ranges = vec![PushConstantRange { stages: ShaderStages::VERTEX, offset: 0, size: 64 }];
    let color_targets = vec![
        ColorTargetState { format: geometry::POSITION_FORMAT, blend: None },
        ColorTargetState { format: geometry::NORMAL_FORMAT, blend: None },
        ColorTargetState { format: geometry::ALBEDO_FORMAT, blend: None },
        ColorTargetState { format: geometry::SPECULAR_FORMAT, blend: None },
    ];

    let solid = device.create_graphics_pipeline(&GraphicsPipelineDescriptor {
        label: Some("geometry_solid"),
        vertex_shader: vertex.clone(),
        fragment_shader: Some(fragment.clone()),
        vertex_input: Vertex::input_descriptor(),
        primitive_topology: PrimitiveTopology::TriangleList,
        rasterization: RasterizationState { polygon_mode: PolygonMode::Fill, ..Default::default() },
        color_targets: color_targets.clone(),
        depth_stencil: Some(depth_stencil_reversed_z()),
        set_layouts: set_layouts.clone(),
        push_constant_ranges: push_constant_ranges.clone(),
    })?;

    let wireframe = device.create_graphics_pipeline(&GraphicsPipelineDescriptor {
        label: Some("geometry_wireframe"),
        vertex_shader: vertex,
        fragment_shader: Some(fragment),
        vertex_input: Vertex::input_descriptor(),
        primitive_topology: PrimitiveTopology::TriangleList,
        rasterization: RasterizationState { polygon_mode: PolygonMode::Line, ..Default::default() },
        color_targets,
        depth_stencil: Some(depth_stencil_reversed_z()),
        set_layouts,
        push_constant_ranges,
    })?;

    Ok((solid, wireframe))
}

fn build_composition_pipeline(device: &dyn Device) -> EngineResult<Box<dyn GraphicsPipeline>> {
    let (vertex, fragment) =
        compile_vertex_fragment(shaders::FULLSCREEN_TRIANGLE_VERTEX, shaders::COMPOSITION_FRAGMENT)?;
    device
        .create_graphics_pipeline(&GraphicsPipelineDescriptor {
            label: Some("composition"),
            vertex_shader: vertex,
            fragment_shader: Some(fragment),
            vertex_input: VertexInputDescriptor::default(),
            primitive_topology: PrimitiveTopology::TriangleList,
            rasterization: RasterizationState { cull_mode: ember_rhi::CullMode::None, ..Default::default() },
            color_targets: vec![ColorTargetState {
                format: crate::passes::composition::COLOR_FORMAT,
                blend: None,
            }],
            depth_stencil: None,
            set_layouts: vec![composition_set_bindings().to_vec()],
            push_constant_ranges: vec![],
        })
        .map_err(EngineError::from)
}

fn build_skybox_pipeline(device: &dyn Device) -> EngineResult<Box<dyn GraphicsPipeline>> {
    let (vertex, fragment) = compile_vertex_fragment(shaders::SKYBOX_VERTEX, shaders::SKYBOX_FRAGMENT)?;
    device
        .create_graphics_pipeline(&GraphicsPipelineDescriptor {
            label: Some("skybox"),
            vertex_shader: vertex,
            fragment_shader: Some(fragment),
            vertex_input: Vertex::input_descriptor(),
            primitive_topology: PrimitiveTopology::TriangleList,
            rasterization: RasterizationState { cull_mode: ember_rhi::CullMode::None, ..Default::default() },
            color_targets: vec![ColorTargetState {
                format: crate::passes::composition::COLOR_FORMAT,
                blend: None,
            }],
            depth_stencil: None,
            set_layouts: vec![camera_set_bindings().to_vec(), material::material_set_bindings().to_vec()],
            push_constant_ranges: vec![PushConstantRange { stages: ShaderStages::VERTEX, offset: 0, size: 64 }],
        })
        .map_err(EngineError::from)
}

fn build_present_pipeline(device: &dyn Device) -> EngineResult<Box<dyn GraphicsPipeline>> {
    let (vertex, fragment) =
        compile_vertex_fragment(shaders::FULLSCREEN_TRIANGLE_VERTEX, shaders::PRESENT_FRAGMENT)?;
    device
        .create_graphics_pipeline(&GraphicsPipelineDescriptor {
            label: Some("present"),
            vertex_shader: vertex,
            fragment_shader: Some(fragment),
            vertex_input: VertexInputDescriptor::default(),
            primitive_topology: PrimitiveTopology::TriangleList,
            rasterization: RasterizationState { cull_mode: ember_rhi::CullMode::None, ..Default::default() },
            color_targets: vec![ColorTargetState { format: SWAPCHAIN_COLOR_FORMAT, blend: None }],
            depth_stencil: None,
            set_layouts: vec![present_set_bindings().to_vec()],
            push_constant_ranges: vec![],
        })
        .map_err(EngineError::from)
}
