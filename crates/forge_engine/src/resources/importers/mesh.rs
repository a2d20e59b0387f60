//! Mesh resources and their private binary layout
//!
//! Layout: a five-field `u32` header (vertex, normal, tex-coord, index and
//! bone counts) followed by the tightly packed buffers in that order, then
//! a variable-length bone section. Bones carry a length-prefixed name,
//! their vertex weights and a column-major 4x4 offset matrix.

use crate::resources::importer::{ImportError, Importer};
use crate::resources::resource::{Resource, ResourcePayload, ResourceType};

use super::{ByteReader, ByteWriter};

/// One vertex weight of a bone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneWeight {
    /// Index into the mesh's vertex buffer
    pub vertex: u32,
    /// Influence of the bone on that vertex
    pub weight: f32,
}

/// Skeletal bone attached to a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    /// Bone name (matches animation channel names)
    pub name: String,
    /// Per-vertex influences
    pub weights: Vec<BoneWeight>,
    /// Column-major inverse-bind matrix
    pub offset: [f32; 16],
}

/// Mesh buffers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    /// Vertex positions
    pub vertices: Vec<[f32; 3]>,
    /// Per-vertex normals (parallel to `vertices`, may be empty)
    pub normals: Vec<[f32; 3]>,
    /// Per-vertex texture coordinates (parallel to `vertices`, may be empty)
    pub tex_coords: Vec<[f32; 2]>,
    /// Triangle list indices
    pub indices: Vec<u32>,
    /// Skeletal bones (empty for static meshes)
    pub bones: Vec<Bone>,
}

/// Mesh importer
pub struct MeshImporter;

impl Importer for MeshImporter {
    fn empty_payload(&self) -> ResourcePayload {
        ResourcePayload::Mesh(MeshData::default())
    }

    fn import(&self, _bytes: &[u8], _resource: &mut Resource) -> Result<(), ImportError> {
        Err(ImportError::NotAStandaloneFormat(ResourceType::Mesh))
    }

    fn save(&self, resource: &Resource) -> Result<Vec<u8>, ImportError> {
        let ResourcePayload::Mesh(mesh) = &resource.payload else {
            return Err(ImportError::WrongPayload { expected: "Mesh" });
        };

        let mut writer = ByteWriter::new();
        writer.write_u32(u32::try_from(mesh.vertices.len()).unwrap_or(u32::MAX));
        writer.write_u32(u32::try_from(mesh.normals.len()).unwrap_or(u32::MAX));
        writer.write_u32(u32::try_from(mesh.tex_coords.len()).unwrap_or(u32::MAX));
        writer.write_u32(u32::try_from(mesh.indices.len()).unwrap_or(u32::MAX));
        writer.write_u32(u32::try_from(mesh.bones.len()).unwrap_or(u32::MAX));

        writer.write_pod_slice(&mesh.vertices);
        writer.write_pod_slice(&mesh.normals);
        writer.write_pod_slice(&mesh.tex_coords);
        writer.write_pod_slice(&mesh.indices);

        for bone in &mesh.bones {
            writer.write_string(&bone.name);
            writer.write_u32(u32::try_from(bone.weights.len()).unwrap_or(u32::MAX));
            for weight in &bone.weights {
                writer.write_u32(weight.vertex);
                writer.write_f32(weight.weight);
            }
            writer.write_pod_slice(&bone.offset);
        }

        Ok(writer.into_inner())
    }

    fn load(&self, bytes: &[u8], resource: &mut Resource) -> Result<(), ImportError> {
        let mut reader = ByteReader::new(bytes);
        let vertex_count = reader.read_u32()? as usize;
        let normal_count = reader.read_u32()? as usize;
        let tex_coord_count = reader.read_u32()? as usize;
        let index_count = reader.read_u32()? as usize;
        let bone_count = reader.read_u32()? as usize;

        let vertices = reader.read_pod_vec::<[f32; 3]>(vertex_count)?;
        let normals = reader.read_pod_vec::<[f32; 3]>(normal_count)?;
        let tex_coords = reader.read_pod_vec::<[f32; 2]>(tex_coord_count)?;
        let indices = reader.read_pod_vec::<u32>(index_count)?;

        let mut bones = Vec::with_capacity(bone_count.min(256));
        for _ in 0..bone_count {
            let name = reader.read_string()?;
            let weight_count = reader.read_u32()? as usize;
            let mut weights = Vec::with_capacity(weight_count.min(4096));
            for _ in 0..weight_count {
                weights.push(BoneWeight {
                    vertex: reader.read_u32()?,
                    weight: reader.read_f32()?,
                });
            }
            let offset_values = reader.read_pod_vec::<f32>(16)?;
            let mut offset = [0.0f32; 16];
            offset.copy_from_slice(&offset_values);
            bones.push(Bone {
                name,
                weights,
                offset,
            });
        }

        resource.payload = ResourcePayload::Mesh(MeshData {
            vertices,
            normals,
            tex_coords,
            indices,
            bones,
        });
        Ok(())
    }
}
