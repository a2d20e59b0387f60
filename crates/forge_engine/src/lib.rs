//! # Forge Engine
//!
//! A modular game engine core built around a content-addressed resource
//! pipeline.
//!
//! ## Features
//!
//! - **Resource Registry**: single authority for resource identity, lifetime
//!   and in-memory caching
//! - **Meta Store**: persistent identity records (`.meta` sidecars) for
//!   re-import detection
//! - **Format Importers**: per-type Import/Save/Load transformations between
//!   authored assets and the engine's library formats
//! - **Asset Scanner**: reconciles the asset tree against the meta store and
//!   drives import/re-import
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use forge_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     forge_engine::foundation::logging::init();
//!
//!     let fs = Arc::new(DiskFileSystem::new("."));
//!     let mut registry = ResourceRegistry::new(fs, ResourceSettings::default());
//!     registry.start();
//!
//!     if let Some(id) = registry.import_file_from_assets("Assets/crate.png") {
//!         let texture = registry.get_resource(id);
//!         assert!(texture.is_some());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod resources;
pub mod vfs;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::ResourceSettings,
        foundation::math::{Mat4, Quat, Transform, Vec3},
        resources::{
            ComponentKind, Resource, ResourceId, ResourcePayload, ResourceRegistry, ResourceType,
        },
        vfs::{DiskFileSystem, FileSystem, PathNode},
    };
}
