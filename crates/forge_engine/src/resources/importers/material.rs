//! Material resources: surface parameters referencing a shader and texture
//!
//! Materials are extracted from model containers (never imported from a
//! standalone file) and are the one resource kind routinely edited at
//! runtime, which is what the registry's dirty-flush pass exists for.

use serde::{Deserialize, Serialize};

use crate::resources::ids::ResourceId;
use crate::resources::importer::{ImportError, Importer};
use crate::resources::resource::{Resource, ResourcePayload, ResourceType};

use super::model::MtlMaterial;

/// Material parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialData {
    /// Diffuse RGBA color
    pub diffuse: [f32; 4],
    /// Shader resource driving this material
    pub shader: ResourceId,
    /// Optional diffuse texture resource
    pub texture: Option<ResourceId>,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            diffuse: [1.0, 1.0, 1.0, 1.0],
            shader: ResourceId(0),
            texture: None,
        }
    }
}

impl MaterialData {
    /// Build material parameters from a parsed MTL entry
    ///
    /// `shader` is the engine default shader; a material with no shader id
    /// falls back to it when resolved.
    #[must_use]
    pub fn from_mtl(mtl: &MtlMaterial, shader: ResourceId) -> Self {
        Self {
            diffuse: [mtl.diffuse[0], mtl.diffuse[1], mtl.diffuse[2], mtl.dissolve],
            shader,
            texture: None,
        }
    }
}

/// Material importer (library payload only)
pub struct MaterialImporter;

impl Importer for MaterialImporter {
    fn empty_payload(&self) -> ResourcePayload {
        ResourcePayload::Material(MaterialData::default())
    }

    fn import(&self, _bytes: &[u8], _resource: &mut Resource) -> Result<(), ImportError> {
        Err(ImportError::NotAStandaloneFormat(ResourceType::Material))
    }

    fn save(&self, resource: &Resource) -> Result<Vec<u8>, ImportError> {
        let ResourcePayload::Material(data) = &resource.payload else {
            return Err(ImportError::WrongPayload {
                expected: "Material",
            });
        };
        let text = ron::ser::to_string_pretty(data, ron::ser::PrettyConfig::default())
            .map_err(|e| ImportError::Serialize(e.to_string()))?;
        Ok(text.into_bytes())
    }

    fn load(&self, bytes: &[u8], resource: &mut Resource) -> Result<(), ImportError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| ImportError::Malformed("material payload is not UTF-8".to_string()))?;
        let data: MaterialData =
            ron::from_str(text).map_err(|e| ImportError::Malformed(e.to_string()))?;
        resource.payload = ResourcePayload::Material(data);
        Ok(())
    }
}
