//! Meta store and `.meta` sidecar documents
//!
//! The meta store is the in-memory index of every resource the project has
//! ever imported, loaded or not. It is hydrated at startup from the sidecar
//! files sitting next to each authored asset and kept current by the
//! registry as imports happen.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ids::ResourceId;
use super::resource::{Resource, ResourceType};

/// Identity record of a known resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMeta {
    /// Stable identifier
    pub id: ResourceId,
    /// Content type
    pub ty: ResourceType,
    /// Display name
    pub name: String,
    /// Source path in the asset tree
    pub original_file: String,
}

impl ResourceMeta {
    /// Build the identity record for a resource
    #[must_use]
    pub fn of(resource: &Resource) -> Self {
        Self {
            id: resource.id,
            ty: resource.ty,
            name: resource.name.clone(),
            original_file: resource.original_file.clone(),
        }
    }

    /// Identity comparison used for re-import detection
    #[must_use]
    pub fn matches(&self, file: &str, name: &str, ty: ResourceType) -> bool {
        self.original_file == file && self.name == name && self.ty == ty
    }
}

/// In-memory index of all known resources, keyed by id
#[derive(Default)]
pub struct MetaStore {
    entries: HashMap<ResourceId, ResourceMeta>,
}

impl MetaStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or refresh) an identity record
    ///
    /// Re-inserting the same identity is the normal re-import path. A
    /// colliding id with a *different* identity is logged and the first
    /// entry wins; continuing with the original match mirrors how duplicate
    /// uids behave throughout the engine.
    pub fn insert(&mut self, meta: ResourceMeta) {
        if let Some(existing) = self.entries.get(&meta.id) {
            if !existing.matches(&meta.original_file, &meta.name, meta.ty) {
                log::warn!(
                    "Duplicate resource id {} ('{}' vs '{}'); keeping the first entry",
                    meta.id,
                    existing.original_file,
                    meta.original_file
                );
                return;
            }
        }
        self.entries.insert(meta.id, meta);
    }

    /// Look up by id
    #[must_use]
    pub fn get(&self, id: ResourceId) -> Option<&ResourceMeta> {
        self.entries.get(&id)
    }

    /// Whether an id is known
    #[must_use]
    pub fn contains(&self, id: ResourceId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Forget an id; returns the removed record
    pub fn remove(&mut self, id: ResourceId) -> Option<ResourceMeta> {
        self.entries.remove(&id)
    }

    /// Find a prior import of the same (path, name, type) triple
    #[must_use]
    pub fn find(&self, file: &str, name: &str, ty: ResourceType) -> Option<&ResourceMeta> {
        self.entries
            .values()
            .find(|meta| meta.matches(file, name, ty))
    }

    /// Find any resource imported from the given source path
    #[must_use]
    pub fn find_by_path(&self, file: &str) -> Option<&ResourceMeta> {
        self.entries
            .values()
            .find(|meta| meta.original_file == file)
    }

    /// All records of a given type
    #[must_use]
    pub fn of_type(&self, ty: ResourceType) -> Vec<&ResourceMeta> {
        self.entries.values().filter(|meta| meta.ty == ty).collect()
    }

    /// Number of known resources
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate all records
    pub fn iter(&self) -> impl Iterator<Item = &ResourceMeta> {
        self.entries.values()
    }
}

/// Serialized form of a `.meta` sidecar
///
/// Written next to each authored asset as `<source>.meta`. `date` is the
/// source file's modification time at import; the scanner compares it
/// against the live file to detect staleness. Container metas carry the
/// identities of everything extracted from them so the store can be
/// hydrated without re-parsing the container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    /// Resource id
    pub id: u64,
    /// Display name
    pub name: String,
    /// Integer type tag ([`ResourceType::index`])
    pub ty: u32,
    /// Source modification time (nanoseconds since the Unix epoch)
    pub date: u64,
    /// Identities of resources extracted from this container
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contained: Vec<ContainedEntry>,
}

/// Identity of a resource nested inside a container meta
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainedEntry {
    /// Resource id
    pub id: u64,
    /// Display name
    pub name: String,
    /// Integer type tag
    pub ty: u32,
}

impl MetaFile {
    /// Serialize to the sidecar text format
    pub fn to_text(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Parse a sidecar document
    pub fn parse(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }
}

/// Sidecar path for a source file
#[must_use]
pub fn meta_path(source: &str) -> String {
    format!("{source}.meta")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: u64, file: &str, name: &str, ty: ResourceType) -> ResourceMeta {
        ResourceMeta {
            id: ResourceId(id),
            ty,
            name: name.to_string(),
            original_file: file.to_string(),
        }
    }

    #[test]
    fn test_find_matches_full_triple() {
        let mut store = MetaStore::new();
        store.insert(meta(1, "Assets/a.png", "a.png", ResourceType::Texture));

        assert!(store
            .find("Assets/a.png", "a.png", ResourceType::Texture)
            .is_some());
        // Same path, wrong type: no match
        assert!(store
            .find("Assets/a.png", "a.png", ResourceType::Mesh)
            .is_none());
        assert!(store
            .find("Assets/b.png", "a.png", ResourceType::Texture)
            .is_none());
    }

    #[test]
    fn test_reinsert_same_identity_refreshes() {
        let mut store = MetaStore::new();
        store.insert(meta(1, "Assets/a.png", "a.png", ResourceType::Texture));
        store.insert(meta(1, "Assets/a.png", "a.png", ResourceType::Texture));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_conflicting_id_keeps_first() {
        let mut store = MetaStore::new();
        store.insert(meta(1, "Assets/a.png", "a.png", ResourceType::Texture));
        store.insert(meta(1, "Assets/other.png", "other.png", ResourceType::Texture));

        let kept = store.get(ResourceId(1)).unwrap();
        assert_eq!(kept.original_file, "Assets/a.png");
    }

    #[test]
    fn test_of_type_filters() {
        let mut store = MetaStore::new();
        store.insert(meta(1, "Assets/a.png", "a.png", ResourceType::Texture));
        store.insert(meta(2, "Assets/m.obj", "m", ResourceType::Prefab));
        store.insert(meta(3, "Assets/b.png", "b.png", ResourceType::Texture));

        assert_eq!(store.of_type(ResourceType::Texture).len(), 2);
        assert_eq!(store.of_type(ResourceType::Prefab).len(), 1);
        assert!(store.of_type(ResourceType::Shader).is_empty());
    }

    #[test]
    fn test_meta_file_roundtrip() {
        let file = MetaFile {
            id: 77,
            name: "cube".to_string(),
            ty: ResourceType::Prefab.index(),
            date: 123_456_789,
            contained: vec![ContainedEntry {
                id: 78,
                name: "cube_mesh0".to_string(),
                ty: ResourceType::Mesh.index(),
            }],
        };

        let text = file.to_text().unwrap();
        let parsed = MetaFile::parse(&text).unwrap();
        assert_eq!(parsed.id, 77);
        assert_eq!(parsed.date, 123_456_789);
        assert_eq!(parsed.contained.len(), 1);
        assert_eq!(parsed.contained[0].name, "cube_mesh0");
    }

    #[test]
    fn test_meta_file_without_contained_parses() {
        let file = MetaFile {
            id: 5,
            name: "tex.png".to_string(),
            ty: ResourceType::Texture.index(),
            date: 42,
            contained: Vec::new(),
        };
        let text = file.to_text().unwrap();
        assert!(!text.contains("contained"));
        assert!(MetaFile::parse(&text).unwrap().contained.is_empty());
    }

    #[test]
    fn test_meta_path_appends_suffix() {
        assert_eq!(meta_path("Assets/tex.png"), "Assets/tex.png.meta");
    }
}
