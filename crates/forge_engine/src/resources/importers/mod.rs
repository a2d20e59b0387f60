//! Built-in format importers, one module per resource type

mod animation;
mod animator;
mod folder;
mod material;
mod mesh;
mod model;
mod particles;
mod shader;
mod texture;

pub use animation::{AnimationData, AnimationImporter, Channel, QuatKey, VectorKey};
pub use animator::{AnimatorClip, AnimatorControllerData, AnimatorControllerImporter};
pub use folder::{FolderData, FolderImporter};
pub use material::{MaterialData, MaterialImporter};
pub use mesh::{Bone, BoneWeight, MeshData, MeshImporter};
pub use model::{parse_mtl, parse_obj, ModelNode, MtlMaterial, ParsedModel, ParsedObject, PrefabData, PrefabImporter};
pub use particles::{EmitterData, ParticleModule, ParticleSystemData, ParticleSystemImporter};
pub use shader::{ShaderData, ShaderImporter};
pub use texture::{TextureData, TextureImporter};

use bytemuck::{AnyBitPattern, NoUninit};

use super::importer::ImportError;

/// Append-only writer for the engine's private binary layouts
pub(crate) struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Bulk-append a packed array
    pub fn write_pod_slice<T: NoUninit>(&mut self, values: &[T]) {
        self.buffer.extend_from_slice(bytemuck::cast_slice(values));
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Length-prefixed UTF-8 string
    pub fn write_string(&mut self, value: &str) {
        self.write_u32(u32::try_from(value.len()).unwrap_or(u32::MAX));
        self.buffer.extend_from_slice(value.as_bytes());
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

/// Cursor over a private binary layout; every read is bounds-checked
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ImportError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| ImportError::Malformed("unexpected end of buffer".to_string()))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub fn read_u32(&mut self) -> Result<u32, ImportError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_f32(&mut self) -> Result<f32, ImportError> {
        let bytes = self.take(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Bulk-read `count` packed values
    pub fn read_pod_vec<T: AnyBitPattern>(&mut self, count: usize) -> Result<Vec<T>, ImportError> {
        let size = std::mem::size_of::<T>();
        let total = count
            .checked_mul(size)
            .ok_or_else(|| ImportError::Malformed("element count overflow".to_string()))?;
        let bytes = self.take(total)?;
        Ok(bytes
            .chunks_exact(size)
            .map(bytemuck::pod_read_unaligned)
            .collect())
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ImportError> {
        self.take(len)
    }

    /// Inverse of [`ByteWriter::write_string`]
    pub fn read_string(&mut self) -> Result<String, ImportError> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| ImportError::Malformed("invalid UTF-8 in string field".to_string()))
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }
}
