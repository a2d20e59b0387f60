//! Shader resources: authored `.shader` text kept verbatim
//!
//! The library payload is the source text itself, so saving a shader can
//! mirror it straight back into the asset tree and the file stays
//! hand-editable.

use crate::resources::importer::{ImportError, Importer};
use crate::resources::resource::{Resource, ResourcePayload};

/// Shader source text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShaderData {
    /// Full shader source (all stages in one document)
    pub source: String,
}

/// Shader importer
pub struct ShaderImporter;

impl ShaderImporter {
    fn parse(bytes: &[u8]) -> Result<ShaderData, ImportError> {
        let source = std::str::from_utf8(bytes)
            .map_err(|_| ImportError::Malformed("shader source is not UTF-8".to_string()))?;
        if source.trim().is_empty() {
            return Err(ImportError::Malformed("shader source is empty".to_string()));
        }
        Ok(ShaderData {
            source: source.to_string(),
        })
    }
}

impl Importer for ShaderImporter {
    fn empty_payload(&self) -> ResourcePayload {
        ResourcePayload::Shader(ShaderData::default())
    }

    fn import(&self, bytes: &[u8], resource: &mut Resource) -> Result<(), ImportError> {
        resource.payload = ResourcePayload::Shader(Self::parse(bytes)?);
        Ok(())
    }

    fn save(&self, resource: &Resource) -> Result<Vec<u8>, ImportError> {
        let ResourcePayload::Shader(data) = &resource.payload else {
            return Err(ImportError::WrongPayload { expected: "Shader" });
        };
        Ok(data.source.clone().into_bytes())
    }

    fn load(&self, bytes: &[u8], resource: &mut Resource) -> Result<(), ImportError> {
        self.import(bytes, resource)
    }
}
