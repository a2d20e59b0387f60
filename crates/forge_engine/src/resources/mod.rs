//! Resource management core
//!
//! Everything the engine knows about content flows through here: the
//! [`ResourceRegistry`] owns loaded resources and mediates all access, the
//! [`MetaStore`] remembers every import ever made, the scanner keeps the
//! asset tree and the store reconciled, and the per-type importers
//! translate between authored formats and the engine's library layouts.

mod ids;
mod importer;
pub mod importers;
mod meta;
mod registry;
mod resource;
mod scanner;

#[cfg(test)]
mod test_import_pipeline;
#[cfg(test)]
pub(crate) mod test_support;

pub use ids::{IdGenerator, ResourceId};
pub use importer::{ImportError, Importer, ImporterRegistry};
pub use meta::{meta_path, ContainedEntry, MetaFile, MetaStore, ResourceMeta};
pub use registry::{RegistryError, ResourceRegistry};
pub use resource::{
    resource_to_component_type, ComponentKind, Resource, ResourcePayload, ResourceType,
};
