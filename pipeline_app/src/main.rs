//! Asset pipeline demo application
//!
//! Points the resource registry at a project directory, runs a full
//! hydrate-and-scan round, and reports what the library now knows about.
//! Useful for inspecting a project without booting the whole engine.

use std::sync::Arc;

use forge_engine::config::Config;
use forge_engine::prelude::*;

fn main() {
    forge_engine::foundation::logging::init();

    let project_root = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    log::info!("Opening project at '{project_root}'");

    let settings_path = format!("{project_root}/resources.toml");
    let settings = if std::path::Path::new(&settings_path).exists() {
        match ResourceSettings::load_from_file(&settings_path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Could not read '{settings_path}' ({e}); using defaults");
                ResourceSettings::default()
            }
        }
    } else {
        ResourceSettings::default()
    };

    let fs = Arc::new(DiskFileSystem::new(&project_root));
    let mut registry = ResourceRegistry::new(fs, settings);
    registry.start();

    let types = [
        ResourceType::Folder,
        ResourceType::Prefab,
        ResourceType::Mesh,
        ResourceType::Material,
        ResourceType::Texture,
        ResourceType::Animation,
        ResourceType::AnimatorController,
        ResourceType::ParticleSystem,
        ResourceType::Shader,
    ];
    for ty in types {
        let metas = registry.all_metas_of_type(ty);
        if metas.is_empty() {
            continue;
        }
        log::info!("{ty:?}: {} resource(s)", metas.len());
        for meta in metas {
            log::info!("  {} '{}' <- {}", meta.id, meta.name, meta.original_file);
        }
    }

    log::info!(
        "{} resource(s) known, {} loaded in memory",
        registry.metas().len(),
        registry.loaded_count()
    );
}
