//! Folder resources: directory nodes that collect the ids imported below them

use serde::{Deserialize, Serialize};

use crate::resources::ids::ResourceId;
use crate::resources::importer::{ImportError, Importer};
use crate::resources::resource::{Resource, ResourcePayload};

/// Contents of a folder resource
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FolderData {
    /// Ids of the resources imported from files directly inside the folder
    pub contained: Vec<ResourceId>,
}

impl FolderData {
    /// Record a child id, ignoring duplicates
    pub fn add(&mut self, id: ResourceId) {
        if !self.contained.contains(&id) {
            self.contained.push(id);
        }
    }
}

/// Folder importer (library payload only; folders have no foreign format)
pub struct FolderImporter;

impl Importer for FolderImporter {
    fn empty_payload(&self) -> ResourcePayload {
        ResourcePayload::Folder(FolderData::default())
    }

    fn import(&self, _bytes: &[u8], resource: &mut Resource) -> Result<(), ImportError> {
        // A directory has no source bytes; importing one just resets it.
        resource.payload = self.empty_payload();
        Ok(())
    }

    fn save(&self, resource: &Resource) -> Result<Vec<u8>, ImportError> {
        let ResourcePayload::Folder(data) = &resource.payload else {
            return Err(ImportError::WrongPayload { expected: "Folder" });
        };
        let text = ron::ser::to_string_pretty(data, ron::ser::PrettyConfig::default())
            .map_err(|e| ImportError::Serialize(e.to_string()))?;
        Ok(text.into_bytes())
    }

    fn load(&self, bytes: &[u8], resource: &mut Resource) -> Result<(), ImportError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| ImportError::Malformed("folder payload is not UTF-8".to_string()))?;
        let data: FolderData =
            ron::from_str(text).map_err(|e| ImportError::Malformed(e.to_string()))?;
        resource.payload = ResourcePayload::Folder(data);
        Ok(())
    }
}
