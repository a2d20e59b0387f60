//! Animation resources and their private binary layout
//!
//! Layout: duration and tick-rate header, channel count, then per channel a
//! length-prefixed name and three key arrays (position, rotation, scale).

use crate::resources::importer::{ImportError, Importer};
use crate::resources::resource::{Resource, ResourcePayload, ResourceType};

use super::{ByteReader, ByteWriter};

/// Timed vector key (position or scale)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorKey {
    /// Key time in ticks
    pub time: f32,
    /// Key value
    pub value: [f32; 3],
}

/// Timed rotation key
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuatKey {
    /// Key time in ticks
    pub time: f32,
    /// Quaternion as (x, y, z, w)
    pub value: [f32; 4],
}

/// Keyframe track for a single node/bone
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Channel {
    /// Target node name
    pub name: String,
    /// Position keys
    pub position_keys: Vec<VectorKey>,
    /// Rotation keys
    pub rotation_keys: Vec<QuatKey>,
    /// Scale keys
    pub scale_keys: Vec<VectorKey>,
}

/// Animation clip
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationData {
    /// Clip length in ticks
    pub duration: f32,
    /// Ticks per second (0 means unspecified)
    pub ticks_per_second: f32,
    /// Per-node tracks
    pub channels: Vec<Channel>,
}

/// Animation importer
pub struct AnimationImporter;

impl AnimationImporter {
    fn write_vector_keys(writer: &mut ByteWriter, keys: &[VectorKey]) {
        writer.write_u32(u32::try_from(keys.len()).unwrap_or(u32::MAX));
        for key in keys {
            writer.write_f32(key.time);
            writer.write_pod_slice(&key.value);
        }
    }

    fn read_vector_keys(reader: &mut ByteReader<'_>) -> Result<Vec<VectorKey>, ImportError> {
        let count = reader.read_u32()? as usize;
        let mut keys = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            let time = reader.read_f32()?;
            let values = reader.read_pod_vec::<f32>(3)?;
            keys.push(VectorKey {
                time,
                value: [values[0], values[1], values[2]],
            });
        }
        Ok(keys)
    }
}

impl Importer for AnimationImporter {
    fn empty_payload(&self) -> ResourcePayload {
        ResourcePayload::Animation(AnimationData::default())
    }

    fn import(&self, _bytes: &[u8], _resource: &mut Resource) -> Result<(), ImportError> {
        Err(ImportError::NotAStandaloneFormat(ResourceType::Animation))
    }

    fn save(&self, resource: &Resource) -> Result<Vec<u8>, ImportError> {
        let ResourcePayload::Animation(animation) = &resource.payload else {
            return Err(ImportError::WrongPayload {
                expected: "Animation",
            });
        };

        let mut writer = ByteWriter::new();
        writer.write_f32(animation.duration);
        writer.write_f32(animation.ticks_per_second);
        writer.write_u32(u32::try_from(animation.channels.len()).unwrap_or(u32::MAX));

        for channel in &animation.channels {
            writer.write_string(&channel.name);
            Self::write_vector_keys(&mut writer, &channel.position_keys);

            writer.write_u32(u32::try_from(channel.rotation_keys.len()).unwrap_or(u32::MAX));
            for key in &channel.rotation_keys {
                writer.write_f32(key.time);
                writer.write_pod_slice(&key.value);
            }

            Self::write_vector_keys(&mut writer, &channel.scale_keys);
        }

        Ok(writer.into_inner())
    }

    fn load(&self, bytes: &[u8], resource: &mut Resource) -> Result<(), ImportError> {
        let mut reader = ByteReader::new(bytes);
        let duration = reader.read_f32()?;
        let ticks_per_second = reader.read_f32()?;
        let channel_count = reader.read_u32()? as usize;

        let mut channels = Vec::with_capacity(channel_count.min(1024));
        for _ in 0..channel_count {
            let name = reader.read_string()?;
            let position_keys = Self::read_vector_keys(&mut reader)?;

            let rotation_count = reader.read_u32()? as usize;
            let mut rotation_keys = Vec::with_capacity(rotation_count.min(4096));
            for _ in 0..rotation_count {
                let time = reader.read_f32()?;
                let values = reader.read_pod_vec::<f32>(4)?;
                rotation_keys.push(QuatKey {
                    time,
                    value: [values[0], values[1], values[2], values[3]],
                });
            }

            let scale_keys = Self::read_vector_keys(&mut reader)?;
            channels.push(Channel {
                name,
                position_keys,
                rotation_keys,
                scale_keys,
            });
        }

        resource.payload = ResourcePayload::Animation(AnimationData {
            duration,
            ticks_per_second,
            channels,
        });
        Ok(())
    }
}
