//! Importer contract and the type → implementation table
//!
//! Every resource type plugs into the registry through the same
//! three-operation surface: `import` a foreign format, `save` to the
//! engine's private layout, `load` it back. Adding a type is a one-place
//! registration in [`ImporterRegistry::with_defaults`] rather than a new
//! arm in every registry operation.

use std::collections::HashMap;

use thiserror::Error;

use super::resource::{Resource, ResourcePayload, ResourceType};

/// Importer failures
#[derive(Debug, Error)]
pub enum ImportError {
    /// Source bytes do not match the expected foreign format
    #[error("Malformed source data: {0}")]
    Malformed(String),

    /// This type is only produced while expanding a container
    #[error("{0:?} resources are extracted from containers, not imported from files")]
    NotAStandaloneFormat(ResourceType),

    /// Resource payload variant does not match the importer
    #[error("Payload mismatch: expected {expected}")]
    WrongPayload {
        /// Variant the importer works on
        expected: &'static str,
    },

    /// Private-format serialization failed
    #[error("Serialization failed: {0}")]
    Serialize(String),
}

/// Per-type Import/Save/Load transformations
///
/// `load` must be the exact inverse of `save` for the same type: a saved
/// resource loads back with identical payload fields.
pub trait Importer: Send + Sync {
    /// Fresh payload shell for this type
    fn empty_payload(&self) -> ResourcePayload;

    /// Parse a foreign/raw format into the resource's payload
    fn import(&self, bytes: &[u8], resource: &mut Resource) -> Result<(), ImportError>;

    /// Serialize the payload into the engine's private layout
    fn save(&self, resource: &Resource) -> Result<Vec<u8>, ImportError>;

    /// Deserialize the private layout back into the payload
    fn load(&self, bytes: &[u8], resource: &mut Resource) -> Result<(), ImportError>;

    /// Drop the in-memory payload (called on unload/delete)
    fn release(&self, resource: &mut Resource) {
        resource.payload = ResourcePayload::Empty;
    }
}

/// Type → importer table
pub struct ImporterRegistry {
    table: HashMap<ResourceType, Box<dyn Importer>>,
}

impl ImporterRegistry {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Table with every built-in importer registered
    #[must_use]
    pub fn with_defaults() -> Self {
        use super::importers::{
            AnimationImporter, AnimatorControllerImporter, FolderImporter, MaterialImporter,
            MeshImporter, ParticleSystemImporter, PrefabImporter, ShaderImporter, TextureImporter,
        };

        let mut registry = Self::new();
        registry.register(ResourceType::Folder, Box::new(FolderImporter));
        registry.register(ResourceType::Mesh, Box::new(MeshImporter));
        registry.register(ResourceType::Texture, Box::new(TextureImporter));
        registry.register(ResourceType::Material, Box::new(MaterialImporter));
        registry.register(ResourceType::Animation, Box::new(AnimationImporter));
        registry.register(
            ResourceType::AnimatorController,
            Box::new(AnimatorControllerImporter),
        );
        registry.register(ResourceType::Prefab, Box::new(PrefabImporter));
        registry.register(ResourceType::ParticleSystem, Box::new(ParticleSystemImporter));
        registry.register(ResourceType::Shader, Box::new(ShaderImporter));
        registry
    }

    /// Register (or replace) the importer for a type
    pub fn register(&mut self, ty: ResourceType, importer: Box<dyn Importer>) {
        self.table.insert(ty, importer);
    }

    /// Importer for a type, if registered
    #[must_use]
    pub fn get(&self, ty: ResourceType) -> Option<&dyn Importer> {
        self.table.get(&ty).map(|importer| &**importer)
    }
}

impl Default for ImporterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
