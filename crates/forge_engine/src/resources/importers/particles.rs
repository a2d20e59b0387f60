//! Particle system resources
//!
//! Authored `.particles` files and the library payload share the same RON
//! document: a list of emitters, each stacking the modules that drive
//! spawning and per-particle behavior.

use serde::{Deserialize, Serialize};

use crate::resources::ids::ResourceId;
use crate::resources::importer::{ImportError, Importer};
use crate::resources::resource::{Resource, ResourcePayload};

/// One behavior module of an emitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParticleModule {
    /// Emission origin relative to the owning object
    EmitterBase {
        /// Spawn origin offset
        origin: [f32; 3],
    },
    /// Spawn cadence
    EmitterSpawn {
        /// Seconds between spawns
        spawn_ratio: f32,
    },
    /// Particle lifetime assignment
    ParticleLifetime {
        /// Lifetime in seconds
        initial: f32,
    },
    /// Initial velocity assignment
    ParticleVelocity {
        /// Direction at spawn
        initial: [f32; 3],
        /// Speed magnitude
        speed: f32,
    },
    /// Size over lifetime
    ParticleSize {
        /// Size at spawn
        initial: f32,
        /// Size at death
        final_size: f32,
    },
    /// Color over lifetime
    ParticleColor {
        /// Color at spawn
        initial: [f32; 4],
        /// Color at death
        final_color: [f32; 4],
    },
}

/// One emitter of a particle system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterData {
    /// Display name
    pub name: String,
    /// Material rendered per particle
    pub material: ResourceId,
    /// Particle pool size
    pub max_particles: u32,
    /// Module stack, applied in order
    pub modules: Vec<ParticleModule>,
}

impl Default for EmitterData {
    fn default() -> Self {
        Self {
            name: "Particle Emitter".to_string(),
            material: ResourceId(0),
            max_particles: 100,
            modules: vec![
                ParticleModule::EmitterBase {
                    origin: [0.0, 0.0, 0.0],
                },
                ParticleModule::EmitterSpawn { spawn_ratio: 0.1 },
                ParticleModule::ParticleLifetime { initial: 1.0 },
                ParticleModule::ParticleVelocity {
                    initial: [0.0, 1.0, 0.0],
                    speed: 1.0,
                },
                ParticleModule::ParticleSize {
                    initial: 1.0,
                    final_size: 1.0,
                },
                ParticleModule::ParticleColor {
                    initial: [1.0, 1.0, 1.0, 1.0],
                    final_color: [1.0, 1.0, 1.0, 0.0],
                },
            ],
        }
    }
}

/// Particle system definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticleSystemData {
    /// Emitters owned by this system
    pub emitters: Vec<EmitterData>,
}

impl ParticleSystemData {
    /// System with a single default emitter, used for newly created assets
    #[must_use]
    pub fn default_system() -> Self {
        Self {
            emitters: vec![EmitterData::default()],
        }
    }
}

/// Particle system importer
pub struct ParticleSystemImporter;

impl ParticleSystemImporter {
    fn parse(bytes: &[u8]) -> Result<ParticleSystemData, ImportError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| ImportError::Malformed("particle document is not UTF-8".to_string()))?;
        ron::from_str(text).map_err(|e| ImportError::Malformed(e.to_string()))
    }
}

impl Importer for ParticleSystemImporter {
    fn empty_payload(&self) -> ResourcePayload {
        ResourcePayload::ParticleSystem(ParticleSystemData::default())
    }

    fn import(&self, bytes: &[u8], resource: &mut Resource) -> Result<(), ImportError> {
        resource.payload = ResourcePayload::ParticleSystem(Self::parse(bytes)?);
        Ok(())
    }

    fn save(&self, resource: &Resource) -> Result<Vec<u8>, ImportError> {
        let ResourcePayload::ParticleSystem(data) = &resource.payload else {
            return Err(ImportError::WrongPayload {
                expected: "ParticleSystem",
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::resource::ResourceType;

    fn particle_resource(data: ParticleSystemData) -> Resource {
        let mut resource = Resource::new(
            ResourceId(61),
            ResourceType::ParticleSystem,
            "sparks",
            "Assets/sparks.particles",
            "Library/Particles/61",
        );
        resource.payload = ResourcePayload::ParticleSystem(data);
        resource
    }

    #[test]
    fn test_default_system_has_full_module_stack() {
        let system = ParticleSystemData::default_system();
        assert_eq!(system.emitters.len(), 1);
        assert_eq!(system.emitters[0].modules.len(), 6);
        assert_eq!(system.emitters[0].max_particles, 100);
    }

    #[test]
    fn test_roundtrip() {
        let mut system = ParticleSystemData::default_system();
        system.emitters[0].name = "smoke".to_string();
        system.emitters[0].material = ResourceId(77);

        let importer = ParticleSystemImporter;
        let bytes = importer.save(&particle_resource(system.clone())).unwrap();

        let mut loaded = particle_resource(ParticleSystemData::default());
        importer.load(&bytes, &mut loaded).unwrap();
        assert_eq!(loaded.payload, ResourcePayload::ParticleSystem(system));
    }

    #[test]
    fn test_import_parses_authored_document() {
        let authored = r#"(
    emitters: [
        (
            name: "embers",
            material: 12,
            max_particles: 64,
            modules: [
                EmitterSpawn(spawn_ratio: 0.25),
                ParticleLifetime(initial: 2.0),
            ],
        ),
    ],
)"#;
        let importer = ParticleSystemImporter;
        let mut resource = particle_resource(ParticleSystemData::default());
        importer.import(authored.as_bytes(), &mut resource).unwrap();

        let ResourcePayload::ParticleSystem(data) = &resource.payload else {
            panic!("expected particle payload");
        };
        assert_eq!(data.emitters.len(), 1);
        assert_eq!(data.emitters[0].max_particles, 64);
        assert_eq!(data.emitters[0].modules.len(), 2);
    }

    #[test]
    fn test_malformed_document_rejected() {
        let importer = ParticleSystemImporter;
        let mut resource = particle_resource(ParticleSystemData::default());
        assert!(matches!(
            importer.import(b"emitters = broken", &mut resource),
            Err(ImportError::Malformed(_))
        ));
    }
}
