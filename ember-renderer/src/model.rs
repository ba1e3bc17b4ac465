//! Mesh-file ingestion (C10): OBJ parsing via `tobj`, per-model texture
//! dedup by source path, GPU upload of vertex/index data and material
//! descriptor sets. See §4.10 and §4.10.1.

use crate::error::EngineError;
use crate::material::{self, TextureKind};
use crate::vertex::{Vertex, VertexArray};
use ember_rhi::{
    BufferDescriptor, BufferMemoryPreference, BufferUsage, DescriptorPool, DescriptorSet,
    DescriptorSetLayout, Device, Sampler, Texture,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// `{ name, vertices, indices, texture_indices, vertex_array,
/// material_descriptor_set }` (§3). `vertices`/`indices` are consumed by the
/// GPU upload and not retained afterward, this engine never re-reads CPU
/// mesh data after the initial load.
pub struct Mesh {
    pub name: String,
    pub vertex_array: VertexArray,
    /// Indices into the owning `Model::unique_textures`, in `{albedo, normal,
    /// specular}` order.
    pub texture_indices: [usize; 3],
    pub material_descriptor_set: Box<dyn DescriptorSet>,
}

/// `{ name, source_path, unique_textures, unique_texture_paths, meshes }`
/// (§3). Never mutated after load; lives until the owning scene discards it.
pub struct Model {
    pub name: String,
    pub source_path: PathBuf,
    pub unique_textures: Vec<Box<dyn Texture>>,
    pub unique_texture_paths: Vec<Option<PathBuf>>,
    pub meshes: Vec<Mesh>,
}

/// Dedup key: a missing texture and a present texture never alias even if
/// both resolve to "no path", because the key also carries which of the
/// three slots asked for it (a missing albedo and a missing normal fall
/// back to different pixel values, so they must stay distinct textures).
#[derive(PartialEq, Eq, Hash)]
enum TextureKey {
    Path(PathBuf),
    MissingAlbedo,
    MissingNormal,
    MissingSpecular,
}

fn texture_key(path: Option<&Path>, kind: TextureKind) -> TextureKey {
    match path {
        Some(p) => TextureKey::Path(p.to_path_buf()),
        None => match kind {
            TextureKind::Albedo => TextureKey::MissingAlbedo,
            TextureKind::Normal => TextureKey::MissingNormal,
            TextureKind::Specular => TextureKey::MissingSpecular,
        },
    }
}

struct TextureTable {
    seen: HashMap<TextureKey, usize>,
    textures: Vec<Box<dyn Texture>>,
    paths: Vec<Option<PathBuf>>,
}

impl TextureTable {
    fn new() -> Self {
        Self { seen: HashMap::new(), textures: Vec::new(), paths: Vec::new() }
    }

    fn get_or_load(
        &mut self,
        device: &dyn Device,
        path: Option<&Path>,
        kind: TextureKind,
    ) -> Result<usize, EngineError> {
        let key = texture_key(path, kind);
        if let Some(&index) = self.seen.get(&key) {
            return Ok(index);
        }
        let texture = material::load_or_fallback(device, path, kind)?;
        let index = self.textures.len();
        self.textures.push(texture);
        self.paths.push(path.map(Path::to_path_buf));
        self.seen.insert(key, index);
        Ok(index)
    }
}

/// Loads `path` as a Wavefront OBJ model. `tobj::GPU_LOAD_OPTIONS` stands in
/// for the fixed import flags of §4.10 (triangulate, single-index so
/// position/normal/uv share one index per vertex, the equivalent of
/// "optimize mesh/graph, improve cache locality" for this backend). Tangents
/// are always zero: `tobj` does not compute or carry a tangent channel, and
/// neither flip-winding nor make-left-handed apply to single-indexed,
/// right-handed OBJ data loaded for this engine's own right-handed,
/// reversed-Z convention. `flip_uv` flips the V coordinate (`engine_load_model`'s
/// "flip_uv" flag, §6), for texture atlases authored with the opposite origin.
pub fn load_obj(
    device: &dyn Device,
    pool: &dyn DescriptorPool,
    layout: &dyn DescriptorSetLayout,
    sampler: &dyn Sampler,
    path: &Path,
    flip_uv: bool,
) -> Result<Model, EngineError> {
    if !path.exists() {
        return Err(EngineError::ModelFileMissing(path.to_path_buf()));
    }

    let (tobj_models, tobj_materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
        .map_err(|e| EngineError::ModelParseFailed(e.to_string()))?;
    let tobj_materials = tobj_materials.unwrap_or_default();
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();

    build_model(device, pool, layout, sampler, name, path.to_path_buf(), Some(base_dir), tobj_models, tobj_materials, flip_uv)
}

/// Loads an OBJ model already resident in memory (`engine_add_model`, §6): no
/// filesystem access happens, so any referenced `.mtl`/texture paths cannot be
/// resolved and every mesh falls back to the untextured material (§4.10's
/// fallback-substitution path covers this the same way it covers a missing
/// texture file).
pub fn load_obj_from_memory(
    device: &dyn Device,
    pool: &dyn DescriptorPool,
    layout: &dyn DescriptorSetLayout,
    sampler: &dyn Sampler,
    name: &str,
    bytes: &[u8],
    flip_uv: bool,
) -> Result<Model, EngineError> {
    let mut reader = std::io::BufReader::new(bytes);
    let (tobj_models, tobj_materials) =
        tobj::load_obj_buf(&mut reader, &tobj::GPU_LOAD_OPTIONS, |_| {
            Ok((Vec::new(), HashMap::new()))
        })
        .map_err(|e| EngineError::ModelParseFailed(e.to_string()))?;

    build_model(
        device,
        pool,
        layout,
        sampler,
        name.to_string(),
        PathBuf::from(name),
        None,
        tobj_models,
        tobj_materials.unwrap_or_default(),
        flip_uv,
    )
}

#[allow(clippy::too_many_arguments)]
fn build_model(
    device: &dyn Device,
    pool: &dyn DescriptorPool,
    layout: &dyn DescriptorSetLayout,
    sampler: &dyn Sampler,
    name: String,
    source_path: PathBuf,
    base_dir: Option<&Path>,
    tobj_models: Vec<tobj::Model>,
    tobj_materials: Vec<tobj::Material>,
    flip_uv: bool,
) -> Result<Model, EngineError> {
    let mut table = TextureTable::new();
    let mut meshes = Vec::with_capacity(tobj_models.len());

    for tobj_model in tobj_models {
        let mesh = tobj_model.mesh;
        let vertex_count = mesh.positions.len() / 3;
        let has_normals = mesh.normals.len() == mesh.positions.len();
        let has_uvs = mesh.texcoords.len() / 2 == vertex_count;

        let mut vertices = Vec::with_capacity(vertex_count);
        for i in 0..vertex_count {
            let position = [mesh.positions[i * 3], mesh.positions[i * 3 + 1], mesh.positions[i * 3 + 2]];
            let normal = if has_normals {
                [mesh.normals[i * 3], mesh.normals[i * 3 + 1], mesh.normals[i * 3 + 2]]
            } else {
                [0.0, 0.0, 0.0]
            };
            let mut uv = if has_uvs {
                [mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1]]
            } else {
                [0.0, 0.0]
            };
            if flip_uv {
                uv[1] = 1.0 - uv[1];
            }
            vertices.push(Vertex { position, normal, uv, tangent: [0.0, 0.0, 0.0] });
        }

        let material = mesh.material_id.and_then(|id| tobj_materials.get(id));
        let resolve = |name: &Option<String>| {
            base_dir.zip(name.as_ref()).map(|(dir, n)| dir.join(n))
        };
        let albedo_path = material.and_then(|m| resolve(&m.diffuse_texture));
        let normal_path = material.and_then(|m| resolve(&m.normal_texture));
        let specular_path = material.and_then(|m| resolve(&m.specular_texture));

        let albedo_index = table.get_or_load(device, albedo_path.as_deref(), TextureKind::Albedo)?;
        let normal_index = table.get_or_load(device, normal_path.as_deref(), TextureKind::Normal)?;
        let specular_index = table.get_or_load(device, specular_path.as_deref(), TextureKind::Specular)?;

        let vertex_array = upload_vertex_array(device, &vertices, &mesh.indices)?;

        let mut descriptor_set = pool.allocate_set(layout).map_err(EngineError::from)?;
        descriptor_set.write_sampled_image(0, table.textures[albedo_index].as_ref(), sampler).map_err(EngineError::from)?;
        descriptor_set.write_sampled_image(1, table.textures[normal_index].as_ref(), sampler).map_err(EngineError::from)?;
        descriptor_set.write_sampled_image(2, table.textures[specular_index].as_ref(), sampler).map_err(EngineError::from)?;

        meshes.push(Mesh {
            name: tobj_model.name,
            vertex_array,
            texture_indices: [albedo_index, normal_index, specular_index],
            material_descriptor_set: descriptor_set,
        });
    }

    Ok(Model {
        name,
        source_path,
        unique_textures: table.textures,
        unique_texture_paths: table.paths,
        meshes,
    })
}

fn upload_vertex_array(device: &dyn Device, vertices: &[Vertex], indices: &[u32]) -> Result<VertexArray, EngineError> {
    let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
    let index_bytes: &[u8] = bytemuck::cast_slice(indices);

    let vertex_buffer = device
        .create_buffer(&BufferDescriptor {
            label: Some("mesh_vertex_buffer"),
            size: vertex_bytes.len().max(1) as u64,
            usage: BufferUsage::Vertex,
            memory: BufferMemoryPreference::DeviceLocal,
        })
        .map_err(EngineError::from)?;
    device.upload_to_buffer(vertex_buffer.as_ref(), 0, vertex_bytes).map_err(EngineError::from)?;

    let index_buffer = device
        .create_buffer(&BufferDescriptor {
            label: Some("mesh_index_buffer"),
            size: index_bytes.len().max(1) as u64,
            usage: BufferUsage::Index,
            memory: BufferMemoryPreference::DeviceLocal,
        })
        .map_err(EngineError::from)?;
    device.upload_to_buffer(index_buffer.as_ref(), 0, index_bytes).map_err(EngineError::from)?;

    Ok(VertexArray { vertex_buffer, index_buffer, index_count: indices.len() as u32 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_keys_stay_distinct_per_slot() {
        // Property 7 (fallback substitution): three meshes each missing a
        // different slot must not collide into one fallback texture.
        let a = texture_key(None, TextureKind::Albedo);
        let n = texture_key(None, TextureKind::Normal);
        let s = texture_key(None, TextureKind::Specular);
        assert!(a != n && n != s && a != s);
    }

    #[test]
    fn same_path_is_the_same_key_regardless_of_slot_guess() {
        // Property 6 (dedup by source path): two meshes referencing the same
        // texture file must collapse to one table entry.
        let p = PathBuf::from("/models/chair/albedo.png");
        let first = texture_key(Some(&p), TextureKind::Albedo);
        let second = texture_key(Some(&p), TextureKind::Albedo);
        assert!(first == second);
    }
}
