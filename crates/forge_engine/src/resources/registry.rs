//! Resource Registry - resource identity, lifetime, and caching
//!
//! The registry is the single authority over resources: it assigns ids,
//! owns every loaded instance, mediates import/load/save/delete, and keeps
//! the meta store in sync with what is on disk. Collaborators never hold a
//! resource pointer across frames; they hold a [`ResourceId`] and resolve
//! it here on demand.
//!
//! **Ownership**: one registry instance per engine, owned by the main loop
//! and passed by reference to collaborators. There is no global state.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::config::ResourceSettings;
use crate::foundation::math::Transform;
use crate::foundation::time::Stopwatch;
use crate::vfs::{split_file_path, FileSystem, VfsError};

use super::ids::{IdGenerator, ResourceId};
use super::importer::{ImportError, ImporterRegistry};
use super::importers::{
    parse_mtl, parse_obj, MaterialData, ModelNode, PrefabData,
};
use super::meta::{meta_path, ContainedEntry, MetaFile, MetaStore, ResourceMeta};
use super::resource::{Resource, ResourcePayload, ResourceType};

/// Registry operation failures
///
/// "Not found" is deliberately absent: a missing resource is an expected
/// condition surfaced as `None`/`0`, never as an error.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No importer is registered for the resource type
    #[error("No importer registered for {0:?}")]
    NoImporter(ResourceType),

    /// Importer rejected the data
    #[error(transparent)]
    Import(#[from] ImportError),

    /// File service failure
    #[error(transparent)]
    Vfs(#[from] VfsError),

    /// Meta sidecar could not be produced
    #[error("Meta sidecar error: {0}")]
    Meta(String),
}

/// Single authority for resource identity, lifetime, and caching
pub struct ResourceRegistry {
    pub(super) fs: Arc<dyn FileSystem>,
    pub(super) settings: ResourceSettings,
    importers: ImporterRegistry,
    /// Loaded instances; boxed so references stay stable while the map grows
    pub(super) loaded: HashMap<ResourceId, Box<Resource>>,
    pub(super) metas: MetaStore,
    ids: IdGenerator,
    scan_timer: Stopwatch,
    save_timer: Stopwatch,
}

impl ResourceRegistry {
    /// Create a registry over a file service
    pub fn new(fs: Arc<dyn FileSystem>, settings: ResourceSettings) -> Self {
        log::info!(
            "Creating ResourceRegistry over roots {:?}",
            settings.asset_roots
        );
        Self {
            fs,
            settings,
            importers: ImporterRegistry::with_defaults(),
            loaded: HashMap::new(),
            metas: MetaStore::new(),
            ids: IdGenerator::new(),
            scan_timer: Stopwatch::new(),
            save_timer: Stopwatch::new(),
        }
    }

    /// Startup: hydrate the meta store from sidecars, then reconcile the
    /// asset tree once so new/modified files are imported immediately
    pub fn start(&mut self) {
        self.load_resources_data();
        self.update_assets_import();
        self.scan_timer.restart();
        self.save_timer.reset();
    }

    /// Cooperative maintenance tick
    ///
    /// Runs the periodic asset re-scan and the dirty-resource flush off two
    /// interval timers. The save timer starts a few seconds after the scan
    /// timer so the two passes stay offset instead of spiking the same
    /// frame.
    pub fn update(&mut self) {
        if !self.save_timer.is_running()
            && self.scan_timer.elapsed_secs() > self.settings.maintenance_offset_secs
        {
            self.save_timer.start();
        }

        if self.scan_timer.elapsed_secs() > self.settings.scan_interval_secs {
            self.update_assets_import();
            self.scan_timer.restart();
        }

        if self.save_timer.is_running()
            && self.save_timer.elapsed_secs() > self.settings.save_interval_secs
        {
            self.save_changed_resources();
            self.save_timer.restart();
        }
    }

    // ========================================================================
    // LOOKUP AND LOADING
    // ========================================================================

    /// Get a resource, loading it from the library on first access
    ///
    /// Returns `None` when the id has no meta record or its payload file is
    /// missing/empty; callers treat that as "resource absent", never as
    /// fatal.
    pub fn get_resource(&mut self, id: ResourceId) -> Option<&Resource> {
        if !self.loaded.contains_key(&id) {
            self.load_into_memory(id)?;
        }
        self.loaded.get(&id).map(|resource| &**resource)
    }

    /// Mutable variant of [`get_resource`](Self::get_resource)
    ///
    /// Callers mutating a resource set its `needs_save` flag; the next
    /// maintenance tick flushes it to disk.
    pub fn get_resource_mut(&mut self, id: ResourceId) -> Option<&mut Resource> {
        if !self.loaded.contains_key(&id) {
            self.load_into_memory(id)?;
        }
        self.loaded.get_mut(&id).map(|resource| &mut **resource)
    }

    /// Whether a resource is currently resident in memory
    #[must_use]
    pub fn is_loaded(&self, id: ResourceId) -> bool {
        self.loaded.contains_key(&id)
    }

    /// Temporarily take ownership of a loaded resource (scanner support)
    pub(super) fn take_loaded(&mut self, id: ResourceId) -> Option<Box<Resource>> {
        self.loaded.remove(&id)
    }

    /// Return a resource taken with [`take_loaded`](Self::take_loaded)
    pub(super) fn put_loaded(&mut self, id: ResourceId, resource: Box<Resource>) {
        self.loaded.insert(id, resource);
    }

    fn load_into_memory(&mut self, id: ResourceId) -> Option<()> {
        let meta = self.metas.get(id)?.clone();
        let mut resource = Box::new(self.create_resource_base(
            &meta.original_file,
            meta.ty,
            Some(&meta.name),
            Some(id),
        ));

        let bytes = match self.fs.load(&resource.resource_file) {
            Ok(bytes) if !bytes.is_empty() => bytes,
            _ => {
                log::debug!(
                    "Resource {id} ('{}') has no library payload",
                    meta.original_file
                );
                return None;
            }
        };

        let importer = self.importers.get(meta.ty)?;
        if let Err(e) = importer.load(&bytes, &mut resource) {
            log::warn!("Failed to load resource {id} from '{}': {e}", resource.resource_file);
            return None;
        }

        // Prefabs learn what they contain from their meta sidecar; the
        // container itself is never re-parsed just to answer that.
        if let ResourcePayload::Prefab(_) = &resource.payload {
            let contained = self.contained_ids_from_sidecar(&meta.original_file);
            if let ResourcePayload::Prefab(data) = &mut resource.payload {
                data.containing_resources = contained;
            }
        }

        self.loaded.insert(id, resource);
        Some(())
    }

    fn contained_ids_from_sidecar(&self, original_file: &str) -> Vec<ResourceId> {
        let Ok(bytes) = self.fs.load(&meta_path(original_file)) else {
            return Vec::new();
        };
        let Ok(text) = String::from_utf8(bytes) else {
            return Vec::new();
        };
        match MetaFile::parse(&text) {
            Ok(file) => file.contained.iter().map(|c| ResourceId(c.id)).collect(),
            Err(_) => Vec::new(),
        }
    }

    // ========================================================================
    // IMPORT
    // ========================================================================

    /// Import (or re-import) a file living in the asset tree
    ///
    /// The type is picked from the extension; a prior import of the same
    /// (path, name, type) triple keeps its id, with the stale copy evicted
    /// first and the old instance count carried over. Unknown extensions and
    /// unreadable/empty files yield `None`.
    pub fn import_file_from_assets(&mut self, path: &str) -> Option<ResourceId> {
        let ty = ResourceType::from_path(path);
        if self.importers.get(ty).is_none() {
            log::debug!("No importer for '{path}' ({ty:?}); skipping");
            return None;
        }

        let bytes = match self.fs.load(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::debug!("'{path}' could not be read: {e}");
                return None;
            }
        };
        if bytes.is_empty() {
            log::warn!("'{path}' has no readable bytes; skipping import");
            return None;
        }

        let mut resource = self.create_resource_base(path, ty, None, None);
        if let Some(prior) = self.metas.find(path, &resource.name, ty).map(|m| m.id) {
            resource.id = prior;
            resource.resource_file = self.library_path(ty, prior);
            resource.instances = self.delete_resource(prior);
        }

        let imported = if ty == ResourceType::Prefab {
            self.import_model(&bytes, &mut resource)
        } else {
            let importer = self.importers.get(ty)?;
            importer
                .import(&bytes, &mut resource)
                .map_err(RegistryError::from)
        };
        if let Err(e) = imported {
            log::warn!("Import of '{path}' failed: {e}");
            return None;
        }

        if let Err(e) = self.save_resource(&mut resource) {
            log::warn!("Could not persist '{path}': {e}");
            return None;
        }

        let id = resource.id;
        self.metas.insert(ResourceMeta::of(&resource));
        if let Err(e) = self.save_meta_info(&resource) {
            log::warn!("Could not write meta sidecar for '{path}': {e}");
        }

        // A re-import that superseded a resource with live consumers stays
        // resident so the carried instance count survives.
        if resource.instances > 0 {
            self.loaded.insert(id, Box::new(resource));
        }

        log::info!("Imported '{path}' as {ty:?} {id}");
        Some(id)
    }

    /// Import a directory node of the asset tree as a Folder resource
    ///
    /// The folder starts empty and stays resident; the scanner fills in the
    /// child ids and saves it once something below it changed.
    pub fn import_folder_from_assets(&mut self, path: &str) -> ResourceId {
        let mut resource = self.create_resource_base(path, ResourceType::Folder, None, None);
        if let Some(prior) = self
            .metas
            .find(path, &resource.name, ResourceType::Folder)
            .map(|m| m.id)
        {
            resource.id = prior;
            resource.resource_file = self.library_path(ResourceType::Folder, prior);
            resource.instances = self.delete_resource(prior);
        }

        let id = resource.id;
        self.metas.insert(ResourceMeta::of(&resource));
        self.loaded.insert(id, Box::new(resource));
        id
    }

    /// Copy a file from outside the project into the asset tree, then import
    pub fn import_file_from_explorer(
        &mut self,
        external_path: &str,
        dest_dir: &str,
    ) -> Option<ResourceId> {
        match self.fs.duplicate_file(external_path, dest_dir) {
            Ok(final_path) => self.import_file_from_assets(&final_path),
            Err(e) => {
                log::warn!("Could not bring '{external_path}' into the project: {e}");
                None
            }
        }
    }

    /// Duplicate an asset under a unique name in `dest_dir` and import the copy
    pub fn create_copy_resource(&mut self, src: &str, dest_dir: &str) -> Option<ResourceId> {
        let (_, stem, ext) = split_file_path(src);
        let file_name = if ext.is_empty() {
            stem
        } else {
            format!("{stem}.{ext}")
        };
        let unique = self.fs.unique_name(dest_dir, &file_name);

        let bytes = match self.fs.load(src) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Could not read '{src}' for copying: {e}");
                return None;
            }
        };
        let dest = format!("{dest_dir}/{unique}");
        if let Err(e) = self.fs.save(&dest, &bytes) {
            log::warn!("Could not write copy '{dest}': {e}");
            return None;
        }
        self.import_file_from_assets(&dest)
    }

    /// Expand a model container into its prefab node graph
    ///
    /// Every MTL material and every OBJ object becomes its own internal
    /// resource, imported through the regular identity-reuse path and
    /// recorded in the prefab's containment list. Mesh names are
    /// synthesized (`<container>_mesh<N>`) since containers routinely ship
    /// unnamed or colliding object names.
    fn import_model(&mut self, bytes: &[u8], resource: &mut Resource) -> Result<(), RegistryError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| ImportError::Malformed("model container is not UTF-8".to_string()))?;
        let parsed = parse_obj(text)?;
        let (dir, _, _) = split_file_path(&resource.original_file);

        let default_shader = self
            .metas
            .find_by_path(&self.settings.default_shader)
            .map_or(ResourceId(0), |m| m.id);

        let mut materials_by_name: HashMap<String, ResourceId> = HashMap::new();
        let mut containing: Vec<ResourceId> = Vec::new();

        for lib in &parsed.mtl_libs {
            let lib_path = format!("{dir}{lib}");
            let mtl_bytes = match self.fs.load(&lib_path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::warn!(
                        "Material library '{lib_path}' referenced by '{}' could not be read: {e}",
                        resource.original_file
                    );
                    continue;
                }
            };
            let mtl_text = String::from_utf8_lossy(&mtl_bytes);
            match parse_mtl(&mtl_text) {
                Ok(entries) => {
                    for entry in entries {
                        let payload = ResourcePayload::Material(MaterialData::from_mtl(
                            &entry,
                            default_shader,
                        ));
                        let id = self.import_resource_from_container(
                            &resource.original_file,
                            &entry.name,
                            ResourceType::Material,
                            payload,
                        )?;
                        materials_by_name.insert(entry.name, id);
                        containing.push(id);
                    }
                }
                Err(e) => log::warn!("Skipping malformed material library '{lib_path}': {e}"),
            }
        }

        let mut nodes = vec![ModelNode {
            id: 1,
            name: resource.name.clone(),
            transform: Transform::identity(),
            parent: 0,
            mesh: None,
            material: None,
        }];

        for (i, object) in parsed.objects.into_iter().enumerate() {
            let mesh_name = format!("{}_mesh{i}", resource.name);
            let material = object
                .material
                .as_deref()
                .and_then(|name| materials_by_name.get(name))
                .copied();

            let mesh_id = self.import_resource_from_container(
                &resource.original_file,
                &mesh_name,
                ResourceType::Mesh,
                ResourcePayload::Mesh(object.mesh),
            )?;
            containing.push(mesh_id);

            let display_name = if object.name.is_empty() {
                mesh_name
            } else {
                object.name
            };
            nodes.push(ModelNode {
                id: u32::try_from(i).unwrap_or(u32::MAX - 2) + 2,
                name: display_name,
                transform: Transform::identity(),
                parent: 1,
                mesh: Some(mesh_id),
                material,
            });
        }

        resource.payload = ResourcePayload::Prefab(PrefabData {
            nodes,
            containing_resources: containing,
        });
        Ok(())
    }

    /// Register one resource extracted from a container
    ///
    /// Shares the container's source path; identity reuse matches on the
    /// (path, name, type) triple so re-importing the container keeps every
    /// nested id stable.
    fn import_resource_from_container(
        &mut self,
        file: &str,
        name: &str,
        ty: ResourceType,
        payload: ResourcePayload,
    ) -> Result<ResourceId, RegistryError> {
        let mut resource = self.create_resource_base(file, ty, Some(name), None);
        if let Some(prior) = self.metas.find(file, name, ty).map(|m| m.id) {
            resource.id = prior;
            resource.resource_file = self.library_path(ty, prior);
            // Evict the stale in-memory copy; the next get re-reads the new payload
            if let Some(mut old) = self.loaded.remove(&prior) {
                resource.instances = old.instances;
                if let Some(importer) = self.importers.get(ty) {
                    importer.release(&mut old);
                }
            }
        }
        resource.is_internal = true;
        resource.payload = payload;

        self.save_resource(&mut resource)?;
        self.metas.insert(ResourceMeta::of(&resource));
        Ok(resource.id)
    }

    /// Build a resource shell: name from the path (or given), fresh or
    /// forced id, derived library path, type-appropriate empty payload
    pub(super) fn create_resource_base(
        &mut self,
        path: &str,
        ty: ResourceType,
        name: Option<&str>,
        force_id: Option<ResourceId>,
    ) -> Resource {
        let name = name.map_or_else(
            || {
                let (_, stem, ext) = split_file_path(path);
                // Textures keep the extension in the display name so
                // "crate.png" and "crate.tga" stay distinguishable.
                if ty == ResourceType::Texture && !ext.is_empty() {
                    format!("{stem}.{ext}")
                } else {
                    stem
                }
            },
            ToString::to_string,
        );

        let id = force_id.unwrap_or_else(|| {
            let metas = &self.metas;
            let loaded = &self.loaded;
            self.ids
                .generate(|candidate| metas.contains(candidate) || loaded.contains_key(&candidate))
        });

        let mut resource = Resource::new(id, ty, name, path, self.library_path(ty, id));
        resource.is_internal = ty.is_container_extracted();
        if let Some(importer) = self.importers.get(ty) {
            resource.payload = importer.empty_payload();
        }
        resource
    }

    /// Library payload path for a (type, id) pair
    #[must_use]
    pub fn library_path(&self, ty: ResourceType, id: ResourceId) -> String {
        format!("{}/{}/{id}", self.settings.library_root, ty.bucket())
    }

    // ========================================================================
    // PERSISTENCE AND DELETION
    // ========================================================================

    /// Serialize a resource to its library file
    ///
    /// Resources whose library format *is* the authored format (shaders,
    /// particle systems, animator controllers) are mirrored back to their
    /// source file as well, unless they are internal.
    pub fn save_resource(&self, resource: &mut Resource) -> Result<(), RegistryError> {
        let importer = self
            .importers
            .get(resource.ty)
            .ok_or(RegistryError::NoImporter(resource.ty))?;
        let bytes = importer.save(resource)?;
        if bytes.is_empty() {
            return Ok(());
        }

        self.fs.save(&resource.resource_file, &bytes)?;
        if !resource.is_internal && resource.ty.matches_authored_format() {
            self.fs.save(&resource.original_file, &bytes)?;
        }
        resource.needs_save = false;
        Ok(())
    }

    /// Write the resource's `.meta` sidecar
    ///
    /// Records id, name, type tag and the source file's current
    /// modification time; prefab sidecars additionally list the identity of
    /// every contained resource.
    pub fn save_meta_info(&self, resource: &Resource) -> Result<(), RegistryError> {
        let date = self.fs.last_mod_time(&resource.original_file).unwrap_or(0);

        let contained = if let ResourcePayload::Prefab(data) = &resource.payload {
            data.containing_resources
                .iter()
                .filter_map(|id| self.metas.get(*id))
                .map(|meta| ContainedEntry {
                    id: meta.id.raw(),
                    name: meta.name.clone(),
                    ty: meta.ty.index(),
                })
                .collect()
        } else {
            Vec::new()
        };

        let file = MetaFile {
            id: resource.id.raw(),
            name: resource.name.clone(),
            ty: resource.ty.index(),
            date,
            contained,
        };
        let text = file
            .to_text()
            .map_err(|e| RegistryError::Meta(e.to_string()))?;
        self.fs
            .save(&meta_path(&resource.original_file), text.as_bytes())?;
        Ok(())
    }

    /// Flush every loaded resource whose `needs_save` flag is set
    pub fn save_changed_resources(&mut self) {
        let dirty: Vec<ResourceId> = self
            .loaded
            .values()
            .filter(|resource| resource.needs_save)
            .map(|resource| resource.id)
            .collect();

        for id in &dirty {
            if let Some(mut resource) = self.loaded.remove(id) {
                if let Err(e) = self.save_resource(&mut resource) {
                    log::warn!("Could not flush modified resource {id}: {e}");
                }
                self.loaded.insert(*id, resource);
            }
        }

        if !dirty.is_empty() {
            log::debug!("Flushed {} modified resource(s)", dirty.len());
        }
    }

    /// Delete a resource: unload it, remove its library payload, forget its
    /// meta record
    ///
    /// Returns the instance count held immediately before deletion so the
    /// caller can migrate or carry over references (re-import does exactly
    /// that).
    pub fn delete_resource(&mut self, id: ResourceId) -> u32 {
        let ty = self
            .metas
            .get(id)
            .map(|meta| meta.ty)
            .or_else(|| self.loaded.get(&id).map(|resource| resource.ty));

        let mut instances = 0;
        if let Some(mut resource) = self.loaded.remove(&id) {
            instances = resource.instances;
            if let Some(importer) = self.importers.get(resource.ty) {
                importer.release(&mut resource);
            }
        }

        if let Some(ty) = ty {
            let payload_path = self.library_path(ty, id);
            if self.fs.remove(&payload_path).is_err() {
                log::debug!("No library payload to remove for {id}");
            }
        }
        self.metas.remove(id);
        instances
    }

    // ========================================================================
    // CONSUMER-FACING HELPERS
    // ========================================================================

    /// Instantiate a prefab: returns its node graph and counts the new consumer
    ///
    /// The caller (the scene layer) walks the nodes and resolves mesh and
    /// material ids back through the registry.
    pub fn load_prefab(&mut self, id: ResourceId) -> Option<PrefabData> {
        self.get_resource(id)?;
        let resource = self.loaded.get_mut(&id)?;
        let ResourcePayload::Prefab(data) = &resource.payload else {
            log::warn!("Resource {id} is not a prefab");
            return None;
        };
        let data = data.clone();
        resource.instances += 1;
        Some(data)
    }

    /// Register a consumer of a resource; returns the new instance count
    pub fn add_instance(&mut self, id: ResourceId) -> Option<u32> {
        self.get_resource(id)?;
        let resource = self.loaded.get_mut(&id)?;
        resource.instances += 1;
        Some(resource.instances)
    }

    /// Drop one consumer of a resource; returns the new instance count
    ///
    /// Each consumer must release exactly once; counts never go below zero.
    pub fn release_instance(&mut self, id: ResourceId) -> Option<u32> {
        let resource = self.loaded.get_mut(&id)?;
        resource.instances = resource.instances.saturating_sub(1);
        Some(resource.instances)
    }

    /// Identity records of every known resource of a type
    #[must_use]
    pub fn all_metas_of_type(&self, ty: ResourceType) -> Vec<&ResourceMeta> {
        self.metas.of_type(ty)
    }

    /// The meta store (read-only)
    #[must_use]
    pub fn metas(&self) -> &MetaStore {
        &self.metas
    }

    /// Number of resources currently resident in memory
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Active settings
    #[must_use]
    pub fn settings(&self) -> &ResourceSettings {
        &self.settings
    }
}

impl Drop for ResourceRegistry {
    fn drop(&mut self) {
        self.save_changed_resources();
        let ids: Vec<ResourceId> = self.loaded.keys().copied().collect();
        for id in ids {
            if let Some(mut resource) = self.loaded.remove(&id) {
                if let Some(importer) = self.importers.get(resource.ty) {
                    importer.release(&mut resource);
                }
            }
        }
    }
}
