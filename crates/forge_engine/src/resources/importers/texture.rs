//! Texture resources: authored images decoded to RGBA8
//!
//! Import accepts anything the `image` crate can decode with the enabled
//! features (PNG, JPEG, TGA). The library payload is a small header plus
//! the raw pixel block so loading never touches a codec again.

use crate::resources::importer::{ImportError, Importer};
use crate::resources::resource::{Resource, ResourcePayload};

use super::{ByteReader, ByteWriter};

/// Decoded image ready for upload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextureData {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Channels per pixel (4 after RGBA8 conversion)
    pub channels: u32,
    /// Tightly packed pixel data
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Size of the pixel block in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.pixels.len()
    }
}

/// Texture importer
pub struct TextureImporter;

impl Importer for TextureImporter {
    fn empty_payload(&self) -> ResourcePayload {
        ResourcePayload::Texture(TextureData::default())
    }

    fn import(&self, bytes: &[u8], resource: &mut Resource) -> Result<(), ImportError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| ImportError::Malformed(format!("image decode failed: {e}")))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        log::debug!("Decoded image {}x{} for '{}'", width, height, resource.name);

        resource.payload = ResourcePayload::Texture(TextureData {
            width,
            height,
            channels: 4,
            pixels: rgba.into_raw(),
        });
        Ok(())
    }

    fn save(&self, resource: &Resource) -> Result<Vec<u8>, ImportError> {
        let ResourcePayload::Texture(data) = &resource.payload else {
            return Err(ImportError::WrongPayload { expected: "Texture" });
        };

        let mut writer = ByteWriter::new();
        writer.write_u32(data.width);
        writer.write_u32(data.height);
        writer.write_u32(data.channels);
        writer.write_bytes(&data.pixels);
        Ok(writer.into_inner())
    }

    fn load(&self, bytes: &[u8], resource: &mut Resource) -> Result<(), ImportError> {
        let mut reader = ByteReader::new(bytes);
        let width = reader.read_u32()?;
        let height = reader.read_u32()?;
        let channels = reader.read_u32()?;

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels as usize))
            .ok_or_else(|| ImportError::Malformed("texture dimensions overflow".to_string()))?;
        if reader.remaining() != expected {
            return Err(ImportError::Malformed(format!(
                "texture payload holds {} pixel bytes, header promises {expected}",
                reader.remaining()
            )));
        }

        let pixels = reader.read_bytes(expected)?.to_vec();
        resource.payload = ResourcePayload::Texture(TextureData {
            width,
            height,
            channels,
            pixels,
        });
        Ok(())
    }
}
