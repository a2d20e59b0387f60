//! Animator controller resources: named clip tables
//!
//! Authored as `.animator` text files in the asset tree; the library payload
//! uses the same document, so controllers mirror back on save.

use serde::{Deserialize, Serialize};

use crate::resources::ids::ResourceId;
use crate::resources::importer::{ImportError, Importer};
use crate::resources::resource::{Resource, ResourcePayload};

/// One entry of an animator controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimatorClip {
    /// Clip name referenced by gameplay code
    pub name: String,
    /// Animation resource played for this clip
    pub animation: ResourceId,
}

/// Clip collection driving an animated object
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnimatorControllerData {
    /// Available clips
    pub clips: Vec<AnimatorClip>,
    /// Clip started when the controller activates
    #[serde(default)]
    pub default_clip: Option<String>,
}

/// Animator controller importer
pub struct AnimatorControllerImporter;

impl AnimatorControllerImporter {
    fn parse(bytes: &[u8]) -> Result<AnimatorControllerData, ImportError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| ImportError::Malformed("animator document is not UTF-8".to_string()))?;
        ron::from_str(text).map_err(|e| ImportError::Malformed(e.to_string()))
    }
}

impl Importer for AnimatorControllerImporter {
    fn empty_payload(&self) -> ResourcePayload {
        ResourcePayload::AnimatorController(AnimatorControllerData::default())
    }

    fn import(&self, bytes: &[u8], resource: &mut Resource) -> Result<(), ImportError> {
        resource.payload = ResourcePayload::AnimatorController(Self::parse(bytes)?);
        Ok(())
    }

    fn save(&self, resource: &Resource) -> Result<Vec<u8>, ImportError> {
        let ResourcePayload::AnimatorController(data) = &resource.payload else {
            return Err(ImportError::WrongPayload {
                expected: "AnimatorController",
            });
        };
        let text = ron::ser::to_string_pretty(data, ron::ser::PrettyConfig::default())
            .map_err(|e| ImportError::Serialize(e.to_string()))?;
        Ok(text.into_bytes())
    }

    fn load(&self, bytes: &[u8], resource: &mut Resource) -> Result<(), ImportError> {
        self.import(bytes, resource)
    }
}
