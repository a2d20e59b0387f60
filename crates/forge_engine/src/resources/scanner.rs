//! Asset scanner: reconciles the asset tree with the meta store
//!
//! Two passes over the same tree, both driven from the registry:
//!
//! - **Hydration** (startup): read every `.meta` sidecar into the meta
//!   store. No importing, no payload IO; afterwards any `get_resource`
//!   resolves without walking the tree again.
//! - **Reconcile** (startup + periodic): visit every source file. No
//!   sidecar means a first import; a sidecar whose recorded date disagrees
//!   with the live modification time means a re-import with identity
//!   preserved. Folders collect the ids imported below them and are
//!   re-saved only when something actually changed.

use super::ids::ResourceId;
use super::meta::{meta_path, MetaFile, ResourceMeta};
use super::registry::ResourceRegistry;
use super::resource::{ResourcePayload, ResourceType};
use crate::vfs::{FileSystem, PathNode};

impl ResourceRegistry {
    /// Hydrate the meta store from the `.meta` sidecars of all asset roots
    pub fn load_resources_data(&mut self) {
        for root in self.settings.asset_roots.clone() {
            // The root folder's own sidecar sits beside the root, outside
            // the walk below.
            if self.fs.exists(&meta_path(&root)) {
                self.load_resource_info(&root);
            }
            match self.fs.all_files(&root, Some(&["meta"]), None) {
                Ok(node) => self.load_meta_from_folder(&node),
                Err(e) => log::debug!("Asset root '{root}' not scanned: {e}"),
            }
        }
        log::info!(
            "Hydrated {} resource record(s) from meta sidecars",
            self.metas.len()
        );
    }

    fn load_meta_from_folder(&mut self, node: &PathNode) {
        if node.is_file {
            if let Some(source) = node.path.strip_suffix(".meta") {
                self.load_resource_info(source);
            }
        }
        for child in &node.children {
            self.load_meta_from_folder(child);
        }
    }

    /// Read one sidecar into the meta store
    ///
    /// Container sidecars also register every contained resource, so the
    /// expensive container format never has to be re-parsed just to learn
    /// what is inside it.
    fn load_resource_info(&mut self, source_path: &str) {
        let Ok(bytes) = self.fs.load(&meta_path(source_path)) else {
            return;
        };
        let Ok(text) = String::from_utf8(bytes) else {
            log::warn!("Meta sidecar for '{source_path}' is not UTF-8");
            return;
        };

        match MetaFile::parse(&text) {
            Ok(file) => {
                self.metas.insert(ResourceMeta {
                    id: ResourceId(file.id),
                    ty: ResourceType::from_index(file.ty),
                    name: file.name.clone(),
                    original_file: source_path.to_string(),
                });
                for entry in &file.contained {
                    self.metas.insert(ResourceMeta {
                        id: ResourceId(entry.id),
                        ty: ResourceType::from_index(entry.ty),
                        name: entry.name.clone(),
                        original_file: source_path.to_string(),
                    });
                }
            }
            Err(e) => log::warn!("Unreadable meta sidecar for '{source_path}': {e}"),
        }
    }

    /// Reconcile every asset root against the meta store
    pub fn update_assets_import(&mut self) {
        for root in self.settings.asset_roots.clone() {
            match self.fs.all_files(&root, None, Some(&["meta"])) {
                Ok(node) => {
                    self.update_assets_folder(&node);
                }
                Err(e) => log::debug!("Asset root '{root}' not scanned: {e}"),
            }
        }
    }

    /// Reconcile one directory subtree; returns the subtree's folder id
    pub fn update_assets_folder(&mut self, node: &PathNode) -> Option<ResourceId> {
        self.scan_node(node).0
    }

    /// Returns (resource id for this node, whether anything below changed)
    fn scan_node(&mut self, node: &PathNode) -> (Option<ResourceId>, bool) {
        if node.is_file {
            if !self.fs.exists(&meta_path(&node.path)) {
                let id = self.import_file_from_assets(&node.path);
                return (id, id.is_some());
            }
            if self.is_file_modified(&node.path) {
                log::info!("File modified: {}", node.path);
                let id = self.import_file_from_assets(&node.path);
                return (id, id.is_some());
            }
            // Unchanged file: report the known id so folders can aggregate it
            return (self.metas.find_by_path(&node.path).map(|m| m.id), false);
        }

        let mut changed = false;
        let folder_id = if self.fs.exists(&meta_path(&node.path)) {
            match self.metas.find_by_path(&node.path).map(|m| m.id) {
                Some(id) => id,
                None => {
                    // Sidecar exists but was never hydrated (e.g. hand-copied tree)
                    changed = true;
                    self.import_folder_from_assets(&node.path)
                }
            }
        } else {
            changed = true;
            self.import_folder_from_assets(&node.path)
        };

        let mut child_ids = Vec::new();
        for child in &node.children {
            let (child_id, child_changed) = self.scan_node(child);
            changed |= child_changed;
            if let Some(child_id) = child_id {
                child_ids.push(child_id);
            }
        }

        // Folder resources aggregate their children while resident
        if self.get_resource(folder_id).is_none() && !self.is_loaded(folder_id) {
            self.import_folder_from_assets(&node.path);
        }
        if let Some(resource) = self.get_resource_mut(folder_id) {
            if let ResourcePayload::Folder(data) = &mut resource.payload {
                for child_id in child_ids {
                    data.add(child_id);
                }
            }
        }

        if changed {
            self.persist_folder(folder_id);
        }
        (Some(folder_id), changed)
    }

    fn persist_folder(&mut self, id: ResourceId) {
        if let Some(mut resource) = self.take_loaded(id) {
            if let Err(e) = self.save_resource(&mut resource) {
                log::warn!("Could not persist folder resource {id}: {e}");
            }
            if let Err(e) = self.save_meta_info(&resource) {
                log::warn!("Could not write folder meta for {id}: {e}");
            }
            self.metas.insert(ResourceMeta::of(&resource));
            self.put_loaded(id, resource);
        }
    }

    /// Compare the live modification time against the sidecar's recorded date
    ///
    /// Any disagreement counts, not just "newer": a file reverted to an
    /// older copy must re-import too.
    #[must_use]
    pub fn is_file_modified(&self, path: &str) -> bool {
        let Ok(bytes) = self.fs.load(&meta_path(path)) else {
            return false;
        };
        let Ok(text) = String::from_utf8(bytes) else {
            return false;
        };
        let Ok(meta) = MetaFile::parse(&text) else {
            return false;
        };
        let Ok(live) = self.fs.last_mod_time(path) else {
            return false;
        };
        live != meta.date
    }

    /// Dev reset: remove every sidecar and the whole library, then recreate
    /// the empty bucket directories
    pub fn clear_meta_data(&mut self) {
        for root in self.settings.asset_roots.clone() {
            if let Ok(node) = self.fs.all_files(&root, Some(&["meta"]), None) {
                self.remove_meta_from_folder(&node);
            }
            let _ = self.fs.remove(&meta_path(&root));
        }
        let _ = self.fs.remove_dir(&self.settings.library_root);
        self.create_library_directories();
        log::info!("Cleared meta data and library");
    }

    fn remove_meta_from_folder(&self, node: &PathNode) {
        if node.is_file {
            if let Err(e) = self.fs.remove(&node.path) {
                log::warn!("Could not remove sidecar '{}': {e}", node.path);
            }
        }
        for child in &node.children {
            self.remove_meta_from_folder(child);
        }
    }

    /// Create the per-type library bucket directories
    pub fn create_library_directories(&self) {
        for ty in [
            ResourceType::Folder,
            ResourceType::Mesh,
            ResourceType::Texture,
            ResourceType::Material,
            ResourceType::Animation,
            ResourceType::Prefab,
            ResourceType::ParticleSystem,
            ResourceType::Shader,
        ] {
            let path = format!("{}/{}", self.settings.library_root, ty.bucket());
            if let Err(e) = self.fs.make_dirs(&path) {
                log::warn!("Could not create library directory '{path}': {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceSettings;
    use crate::resources::test_support::{make_registry as registry, sample_png, CUBE_MTL, CUBE_OBJ};
    use crate::vfs::DiskFileSystem;
    use std::sync::Arc;

    #[test]
    fn test_first_scan_imports_everything() {
        let (_dir, mut registry) = registry();
        registry.fs.save("Assets/tex.png", &sample_png()).unwrap();
        registry
            .fs
            .save("Assets/Shaders/flat.shader", b"#vertex\n#fragment\n")
            .unwrap();

        registry.update_assets_import();

        assert_eq!(registry.all_metas_of_type(ResourceType::Texture).len(), 1);
        assert_eq!(registry.all_metas_of_type(ResourceType::Shader).len(), 1);
        // Root + Shaders subfolder for the "Assets" root
        assert_eq!(registry.all_metas_of_type(ResourceType::Folder).len(), 2);
        assert!(registry.fs.exists("Assets/tex.png.meta"));
        assert!(registry.fs.exists("Assets.meta"));
    }

    #[test]
    fn test_second_scan_is_idempotent() {
        let (_dir, mut registry) = registry();
        registry.fs.save("Assets/tex.png", &sample_png()).unwrap();

        registry.update_assets_import();
        let id = registry.metas().find_by_path("Assets/tex.png").unwrap().id;
        let meta_text = registry.fs.load("Assets/tex.png.meta").unwrap();

        registry.update_assets_import();
        assert_eq!(
            registry.metas().find_by_path("Assets/tex.png").unwrap().id,
            id
        );
        // Sidecar untouched: no re-import happened
        assert_eq!(registry.fs.load("Assets/tex.png.meta").unwrap(), meta_text);
    }

    #[test]
    fn test_modified_file_reimports_once_with_same_id() {
        let (_dir, mut registry) = registry();
        registry.fs.save("Assets/tex.png", &sample_png()).unwrap();
        registry.update_assets_import();
        let id = registry.metas().find_by_path("Assets/tex.png").unwrap().id;

        std::thread::sleep(std::time::Duration::from_millis(20));
        registry.fs.save("Assets/tex.png", &sample_png()).unwrap();
        assert!(registry.is_file_modified("Assets/tex.png"));

        registry.update_assets_import();
        assert_eq!(
            registry.metas().find_by_path("Assets/tex.png").unwrap().id,
            id
        );
        // Sidecar now records the new date, so the next scan is quiet again
        assert!(!registry.is_file_modified("Assets/tex.png"));
    }

    #[test]
    fn test_hydration_restores_meta_store_without_importing() {
        let (dir, mut registry) = registry();
        registry.fs.save("Assets/tex.png", &sample_png()).unwrap();
        registry.update_assets_import();
        let id = registry.metas().find_by_path("Assets/tex.png").unwrap().id;
        drop(registry);

        // Fresh registry over the same tree: only sidecars are read
        let fs = Arc::new(DiskFileSystem::new(dir.path()));
        let mut fresh = ResourceRegistry::new(fs, ResourceSettings::default());
        fresh.load_resources_data();

        assert_eq!(fresh.metas().find_by_path("Assets/tex.png").unwrap().id, id);
        assert_eq!(fresh.loaded_count(), 0);
        assert!(fresh.get_resource(id).is_some());
    }

    #[test]
    fn test_hydration_registers_contained_resources() {
        let (dir, mut registry) = registry();
        registry.fs.save("Assets/cube.obj", CUBE_OBJ.as_bytes()).unwrap();
        registry.fs.save("Assets/cube.mtl", CUBE_MTL.as_bytes()).unwrap();
        registry.update_assets_import();
        let known = registry.metas().len();
        drop(registry);

        let fs = Arc::new(DiskFileSystem::new(dir.path()));
        let mut fresh = ResourceRegistry::new(fs, ResourceSettings::default());
        fresh.load_resources_data();

        // Prefab + mesh + material all come back from the container's sidecar
        assert_eq!(fresh.metas().len(), known);
        assert_eq!(fresh.all_metas_of_type(ResourceType::Mesh).len(), 1);
        assert_eq!(fresh.all_metas_of_type(ResourceType::Material).len(), 1);
    }

    #[test]
    fn test_folder_aggregates_children() {
        let (_dir, mut registry) = registry();
        registry
            .fs
            .save("Assets/Textures/tex.png", &sample_png())
            .unwrap();
        registry.update_assets_import();

        let folder_id = registry
            .metas()
            .find_by_path("Assets/Textures")
            .unwrap()
            .id;
        let texture_id = registry
            .metas()
            .find_by_path("Assets/Textures/tex.png")
            .unwrap()
            .id;

        let folder = registry.get_resource(folder_id).unwrap();
        let ResourcePayload::Folder(data) = &folder.payload else {
            panic!("expected folder payload");
        };
        assert!(data.contained.contains(&texture_id));
    }

    #[test]
    fn test_clear_meta_data_wipes_sidecars_and_library() {
        let (_dir, mut registry) = registry();
        registry.fs.save("Assets/tex.png", &sample_png()).unwrap();
        registry.update_assets_import();
        assert!(registry.fs.exists("Assets/tex.png.meta"));

        registry.clear_meta_data();
        assert!(!registry.fs.exists("Assets/tex.png.meta"));
        assert!(!registry.fs.exists("Assets.meta"));
        assert!(registry.fs.exists("Library/Meshes"));
        assert!(!registry.fs.exists("Library/Textures/0"));
    }

    #[test]
    fn test_untouched_meta_means_not_modified() {
        let (_dir, mut registry) = registry();
        registry.fs.save("Assets/tex.png", &sample_png()).unwrap();
        // No sidecar yet: cannot be "modified"
        assert!(!registry.is_file_modified("Assets/tex.png"));
    }
}
