//! Resource identity and in-memory representation
//!
//! A [`Resource`] is the unit of managed content: a stable id, a type, the
//! authored file it came from, the library file it was imported to, and the
//! in-memory payload when loaded. The registry exclusively owns loaded
//! resources; everyone else refers to them by [`ResourceId`].

use super::ids::ResourceId;
use super::importers::{
    AnimationData, AnimatorControllerData, FolderData, MaterialData, MeshData, ParticleSystemData,
    PrefabData, ShaderData, TextureData,
};
use crate::vfs;

/// Kind of content a resource holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// Directory node of the asset tree
    Folder,
    /// Triangle mesh extracted from a model container
    Mesh,
    /// Decoded image
    Texture,
    /// Surface description (color, shader, texture)
    Material,
    /// Keyframed animation clip extracted from a model container
    Animation,
    /// Clip collection driving an animated object
    AnimatorController,
    /// Model container: node graph plus contained meshes/materials
    Prefab,
    /// Particle system definition
    ParticleSystem,
    /// Shader source
    Shader,
    /// Authored scene file
    Scene,
    /// Anything the pipeline does not understand
    Unknown,
}

impl ResourceType {
    /// Stable integer tag used by meta sidecars
    #[must_use]
    pub const fn index(self) -> u32 {
        match self {
            Self::Folder => 0,
            Self::Mesh => 1,
            Self::Texture => 2,
            Self::Material => 3,
            Self::Animation => 4,
            Self::AnimatorController => 5,
            Self::Prefab => 6,
            Self::ParticleSystem => 7,
            Self::Shader => 8,
            Self::Scene => 9,
            Self::Unknown => 10,
        }
    }

    /// Inverse of [`index`](Self::index); out-of-range tags map to `Unknown`
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        match index {
            0 => Self::Folder,
            1 => Self::Mesh,
            2 => Self::Texture,
            3 => Self::Material,
            4 => Self::Animation,
            5 => Self::AnimatorController,
            6 => Self::Prefab,
            7 => Self::ParticleSystem,
            8 => Self::Shader,
            9 => Self::Scene,
            _ => Self::Unknown,
        }
    }

    /// Library bucket directory for this type (relative to the library root)
    #[must_use]
    pub const fn bucket(self) -> &'static str {
        match self {
            Self::Folder => "Folders",
            Self::Mesh => "Meshes",
            Self::Texture => "Textures",
            Self::Material => "Materials",
            Self::Animation | Self::AnimatorController => "Animations",
            Self::Prefab => "GameObjects",
            Self::ParticleSystem => "Particles",
            Self::Shader => "Shaders",
            Self::Scene | Self::Unknown => "Scenes",
        }
    }

    /// Classify an asset path by its file extension
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        match vfs::extension(path).as_str() {
            "obj" | "fbx" => Self::Prefab,
            "png" | "jpg" | "jpeg" | "tga" => Self::Texture,
            "shader" => Self::Shader,
            "particles" => Self::ParticleSystem,
            "anim" => Self::Animation,
            "animator" => Self::AnimatorController,
            "scene" => Self::Scene,
            _ => Self::Unknown,
        }
    }

    /// Whether the library payload for this type uses the authored format
    ///
    /// Only these resources can be mirrored back into the asset tree on
    /// save; for every other type the library holds a private layout that
    /// would corrupt the source file.
    #[must_use]
    pub const fn matches_authored_format(self) -> bool {
        matches!(
            self,
            Self::Shader | Self::ParticleSystem | Self::AnimatorController
        )
    }

    /// Whether resources of this type only ever come out of a container
    ///
    /// Such resources are internal from birth: their `original_file` is the
    /// container, and nothing is ever synced back to the asset tree for
    /// them.
    #[must_use]
    pub const fn is_container_extracted(self) -> bool {
        matches!(self, Self::Mesh | Self::Material | Self::Animation)
    }
}

/// In-memory payload of a loaded resource, one variant per type
#[derive(Debug, Clone, PartialEq)]
pub enum ResourcePayload {
    /// Nothing loaded (shell state, or released)
    Empty,
    /// Folder contents
    Folder(FolderData),
    /// Mesh buffers
    Mesh(MeshData),
    /// Decoded texture
    Texture(TextureData),
    /// Material parameters
    Material(MaterialData),
    /// Animation channels
    Animation(AnimationData),
    /// Animator clip table
    AnimatorController(AnimatorControllerData),
    /// Prefab node graph
    Prefab(PrefabData),
    /// Particle emitters
    ParticleSystem(ParticleSystemData),
    /// Shader source text
    Shader(ShaderData),
}

/// An engine-managed, re-loadable unit of content
#[derive(Debug, Clone)]
pub struct Resource {
    /// Stable 64-bit identifier
    pub id: ResourceId,
    /// Content type
    pub ty: ResourceType,
    /// Display name (may differ from the file name)
    pub name: String,
    /// Source path in the asset tree
    pub original_file: String,
    /// Imported payload path in the library (`<bucket>/<id>`)
    pub resource_file: String,
    /// Live consumer count; gates permanent deletion
    pub instances: u32,
    /// By-product of a container import; never mirrored back to the tree
    pub is_internal: bool,
    /// Mutated at runtime and awaiting a flush to disk
    pub needs_save: bool,
    /// Type-specific in-memory data
    pub payload: ResourcePayload,
}

impl Resource {
    /// Build a resource shell; the payload starts out [`ResourcePayload::Empty`]
    #[must_use]
    pub fn new(
        id: ResourceId,
        ty: ResourceType,
        name: impl Into<String>,
        original_file: impl Into<String>,
        resource_file: impl Into<String>,
    ) -> Self {
        Self {
            id,
            ty,
            name: name.into(),
            original_file: original_file.into(),
            resource_file: resource_file.into(),
            instances: 0,
            is_internal: false,
            needs_save: false,
            payload: ResourcePayload::Empty,
        }
    }
}

/// Component slot a resource plugs into on a game object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// Mesh renderer component
    Mesh,
    /// Material component
    Material,
    /// Particle system component
    ParticleSystem,
    /// Animator component
    Animator,
}

/// Map a resource type to the component type that should hold it
#[must_use]
pub const fn resource_to_component_type(ty: ResourceType) -> Option<ComponentKind> {
    match ty {
        ResourceType::Mesh => Some(ComponentKind::Mesh),
        ResourceType::Texture | ResourceType::Material => Some(ComponentKind::Material),
        ResourceType::ParticleSystem => Some(ComponentKind::ParticleSystem),
        ResourceType::Animation | ResourceType::AnimatorController => {
            Some(ComponentKind::Animator)
        }
        _ => None,
    }
}
