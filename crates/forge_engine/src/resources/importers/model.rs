//! Model containers: OBJ/MTL parsing and prefab resources
//!
//! A model file is a *container*: importing one produces a Prefab resource
//! plus one Mesh per object and one internal Material per MTL entry, all
//! registered individually. The parsing half lives here as pure functions;
//! the registry drives the per-resource registration.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Transform;
use crate::resources::ids::ResourceId;
use crate::resources::importer::{ImportError, Importer};
use crate::resources::resource::{Resource, ResourcePayload, ResourceType};

use super::mesh::MeshData;

/// One node of a prefab's object graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelNode {
    /// Node id, unique within the prefab (root is 1, 0 means "no parent")
    pub id: u32,
    /// Node name
    pub name: String,
    /// Local transform
    pub transform: Transform,
    /// Parent node id
    pub parent: u32,
    /// Mesh resource rendered at this node
    pub mesh: Option<ResourceId>,
    /// Material applied to the mesh
    pub material: Option<ResourceId>,
}

/// Prefab payload: the node graph of an imported container
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PrefabData {
    /// Object graph, root first
    pub nodes: Vec<ModelNode>,
    /// Ids of the resources extracted from this container
    ///
    /// Persisted in the container's meta sidecar, not in the payload, so
    /// it is re-hydrated from there on load.
    #[serde(skip)]
    pub containing_resources: Vec<ResourceId>,
}

/// Parsed MTL entry (the subset the material importer consumes)
#[derive(Debug, Clone, PartialEq)]
pub struct MtlMaterial {
    /// Material name (`newmtl`)
    pub name: String,
    /// Diffuse color (`Kd`)
    pub diffuse: [f32; 3],
    /// Opacity (`d`, inverted `Tr`)
    pub dissolve: f32,
    /// Diffuse texture map (`map_Kd`)
    pub diffuse_map: Option<String>,
}

impl Default for MtlMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            diffuse: [0.8, 0.8, 0.8],
            dissolve: 1.0,
            diffuse_map: None,
        }
    }
}

/// One object extracted from an OBJ container
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedObject {
    /// Object name (`o`/`g` line), empty when the file declares none
    pub name: String,
    /// Assembled mesh buffers
    pub mesh: MeshData,
    /// Material name from the object's `usemtl` line
    pub material: Option<String>,
}

/// Result of parsing an OBJ container
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedModel {
    /// Referenced material libraries (`mtllib` lines)
    pub mtl_libs: Vec<String>,
    /// Objects in declaration order
    pub objects: Vec<ParsedObject>,
}

fn parse_float(token: &str, line_num: usize, what: &str) -> Result<f32, ImportError> {
    token.parse::<f32>().map_err(|_| {
        ImportError::Malformed(format!("line {}: invalid {what} '{token}'", line_num + 1))
    })
}

struct ObjObjectBuilder {
    name: String,
    material: Option<String>,
    mesh: MeshData,
}

impl ObjObjectBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            material: None,
            mesh: MeshData::default(),
        }
    }

    fn finish(self, out: &mut Vec<ParsedObject>) {
        if !self.mesh.vertices.is_empty() {
            out.push(ParsedObject {
                name: self.name,
                mesh: self.mesh,
                material: self.material,
            });
        }
    }
}

/// Parse OBJ text into per-object mesh buffers
///
/// Faces are fan-triangulated; position/normal/tex-coord references are
/// resolved against the file-global pools, producing unindexed-then-indexed
/// buffers per object (no vertex dedup).
pub fn parse_obj(contents: &str) -> Result<ParsedModel, ImportError> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();

    let mut model = ParsedModel::default();
    let mut current = ObjObjectBuilder::new("");

    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "mtllib" => {
                if let Some(lib) = parts.get(1) {
                    model.mtl_libs.push((*lib).to_string());
                }
            }
            "o" | "g" => {
                let name = parts.get(1).copied().unwrap_or("");
                let previous = std::mem::replace(&mut current, ObjObjectBuilder::new(name));
                previous.finish(&mut model.objects);
            }
            "usemtl" => {
                if let Some(material) = parts.get(1) {
                    current.material = Some((*material).to_string());
                }
            }
            "v" => {
                if parts.len() >= 4 {
                    positions.push([
                        parse_float(parts[1], line_num, "vertex x")?,
                        parse_float(parts[2], line_num, "vertex y")?,
                        parse_float(parts[3], line_num, "vertex z")?,
                    ]);
                }
            }
            "vn" => {
                if parts.len() >= 4 {
                    normals.push([
                        parse_float(parts[1], line_num, "normal x")?,
                        parse_float(parts[2], line_num, "normal y")?,
                        parse_float(parts[3], line_num, "normal z")?,
                    ]);
                }
            }
            "vt" => {
                if parts.len() >= 3 {
                    tex_coords.push([
                        parse_float(parts[1], line_num, "tex coord u")?,
                        parse_float(parts[2], line_num, "tex coord v")?,
                    ]);
                }
            }
            "f" => {
                if parts.len() < 4 {
                    continue;
                }
                let mut face_indices = Vec::with_capacity(parts.len() - 1);
                for vertex_ref in &parts[1..] {
                    let refs: Vec<&str> = vertex_ref.split('/').collect();

                    // OBJ indices are 1-based
                    let pos_idx: usize = refs[0].parse().map_err(|_| {
                        ImportError::Malformed(format!(
                            "line {}: invalid position index '{}'",
                            line_num + 1,
                            refs[0]
                        ))
                    })?;
                    let position = pos_idx
                        .checked_sub(1)
                        .and_then(|i| positions.get(i))
                        .ok_or_else(|| {
                            ImportError::Malformed(format!(
                                "line {}: position index {pos_idx} out of bounds",
                                line_num + 1
                            ))
                        })?;

                    let tex_coord = refs
                        .get(1)
                        .filter(|r| !r.is_empty())
                        .and_then(|r| r.parse::<usize>().ok())
                        .and_then(|i| i.checked_sub(1))
                        .and_then(|i| tex_coords.get(i))
                        .copied()
                        .unwrap_or([0.0, 0.0]);

                    let normal = refs
                        .get(2)
                        .filter(|r| !r.is_empty())
                        .and_then(|r| r.parse::<usize>().ok())
                        .and_then(|i| i.checked_sub(1))
                        .and_then(|i| normals.get(i))
                        .copied()
                        .unwrap_or([0.0, 1.0, 0.0]);

                    current.mesh.vertices.push(*position);
                    current.mesh.normals.push(normal);
                    current.mesh.tex_coords.push(tex_coord);
                    face_indices.push(u32::try_from(current.mesh.vertices.len() - 1).unwrap_or(0));
                }

                // Fan triangulation
                for i in 1..face_indices.len() - 1 {
                    current.mesh.indices.push(face_indices[0]);
                    current.mesh.indices.push(face_indices[i]);
                    current.mesh.indices.push(face_indices[i + 1]);
                }
            }
            _ => {}
        }
    }

    current.finish(&mut model.objects);

    if model.objects.is_empty() {
        return Err(ImportError::Malformed(
            "no geometry found in model container".to_string(),
        ));
    }
    Ok(model)
}

/// Parse MTL text into its material entries, in declaration order
pub fn parse_mtl(contents: &str) -> Result<Vec<MtlMaterial>, ImportError> {
    let mut materials: Vec<MtlMaterial> = Vec::new();
    let mut current: Option<MtlMaterial> = None;

    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "newmtl" => {
                if let Some(material) = current.take() {
                    materials.push(material);
                }
                let name = parts.get(1).ok_or_else(|| {
                    ImportError::Malformed(format!(
                        "line {}: newmtl missing material name",
                        line_num + 1
                    ))
                })?;
                current = Some(MtlMaterial {
                    name: (*name).to_string(),
                    ..Default::default()
                });
            }
            "Kd" => {
                if let Some(ref mut material) = current {
                    if parts.len() >= 4 {
                        material.diffuse = [
                            parse_float(parts[1], line_num, "Kd r")?,
                            parse_float(parts[2], line_num, "Kd g")?,
                            parse_float(parts[3], line_num, "Kd b")?,
                        ];
                    }
                }
            }
            "d" => {
                if let Some(ref mut material) = current {
                    if let Some(value) = parts.get(1) {
                        material.dissolve = parse_float(value, line_num, "dissolve")?;
                    }
                }
            }
            "Tr" => {
                if let Some(ref mut material) = current {
                    if let Some(value) = parts.get(1) {
                        material.dissolve = 1.0 - parse_float(value, line_num, "transparency")?;
                    }
                }
            }
            "map_Kd" => {
                if let Some(ref mut material) = current {
                    if let Some(path) = parts.get(1) {
                        material.diffuse_map = Some((*path).to_string());
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(material) = current {
        materials.push(material);
    }
    Ok(materials)
}

/// Prefab importer
///
/// Only `save`/`load` run here; the container expansion itself (meshes,
/// materials, containment bookkeeping) happens in the registry, which owns
/// the id handling the nested imports need.
pub struct PrefabImporter;

impl Importer for PrefabImporter {
    fn empty_payload(&self) -> ResourcePayload {
        ResourcePayload::Prefab(PrefabData::default())
    }

    fn import(&self, _bytes: &[u8], _resource: &mut Resource) -> Result<(), ImportError> {
        Err(ImportError::NotAStandaloneFormat(ResourceType::Prefab))
    }

    fn save(&self, resource: &Resource) -> Result<Vec<u8>, ImportError> {
        let ResourcePayload::Prefab(data) = &resource.payload else {
            return Err(ImportError::WrongPayload { expected: "Prefab" });
        };
        let text = ron::ser::to_string_pretty(data, ron::ser::PrettyConfig::default())
            .map_err(|e| ImportError::Serialize(e.to_string()))?;
        Ok(text.into_bytes())
    }

    fn load(&self, bytes: &[u8], resource: &mut Resource) -> Result<(), ImportError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| ImportError::Malformed("prefab payload is not UTF-8".to_string()))?;
        let data: PrefabData =
            ron::from_str(text).map_err(|e| ImportError::Malformed(e.to_string()))?;
        resource.payload = ResourcePayload::Prefab(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBE_OBJ: &str = "\
mtllib cube.mtl
o Cube
v -1.0 -1.0 1.0
v 1.0 -1.0 1.0
v 1.0 1.0 1.0
v -1.0 1.0 1.0
vn 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
usemtl CubeMat
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_parse_obj_quad_fan_triangulates() {
        let model = parse_obj(CUBE_OBJ).unwrap();
        assert_eq!(model.mtl_libs, vec!["cube.mtl"]);
        assert_eq!(model.objects.len(), 1);

        let object = &model.objects[0];
        assert_eq!(object.name, "Cube");
        assert_eq!(object.material.as_deref(), Some("CubeMat"));
        // 4 face vertices, 2 triangles
        assert_eq!(object.mesh.vertices.len(), 4);
        assert_eq!(object.mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(object.mesh.normals[0], [0.0, 0.0, 1.0]);
        assert_eq!(object.mesh.tex_coords[2], [1.0, 1.0]);
    }

    #[test]
    fn test_parse_obj_multiple_objects() {
        let contents = "\
o First
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o Second
v 0 0 1
v 1 0 1
v 0 1 1
f 4 5 6
";
        let model = parse_obj(contents).unwrap();
        assert_eq!(model.objects.len(), 2);
        assert_eq!(model.objects[0].name, "First");
        assert_eq!(model.objects[1].name, "Second");
        assert_eq!(model.objects[1].mesh.vertices.len(), 3);
    }

    #[test]
    fn test_parse_obj_without_geometry_fails() {
        assert!(matches!(
            parse_obj("# just a comment\n"),
            Err(ImportError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_obj_index_out_of_bounds() {
        let contents = "v 0 0 0\nf 1 2 3\n";
        assert!(parse_obj(contents).is_err());
    }

    #[test]
    fn test_parse_mtl_entries() {
        let contents = "\
newmtl CubeMat
Kd 0.8 0.1 0.1
d 0.9
map_Kd crate.png

newmtl Glass
Kd 0.2 0.2 1.0
Tr 0.4
";
        let materials = parse_mtl(contents).unwrap();
        assert_eq!(materials.len(), 2);
        assert_eq!(materials[0].name, "CubeMat");
        assert_eq!(materials[0].diffuse, [0.8, 0.1, 0.1]);
        assert_eq!(materials[0].diffuse_map.as_deref(), Some("crate.png"));
        assert!((materials[1].dissolve - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_prefab_payload_roundtrip() {
        let data = PrefabData {
            nodes: vec![
                ModelNode {
                    id: 1,
                    name: "cube".to_string(),
                    transform: Transform::identity(),
                    parent: 0,
                    mesh: None,
                    material: None,
                },
                ModelNode {
                    id: 2,
                    name: "cube_mesh0".to_string(),
                    transform: Transform::identity(),
                    parent: 1,
                    mesh: Some(ResourceId(70)),
                    material: Some(ResourceId(71)),
                },
            ],
            containing_resources: vec![ResourceId(70), ResourceId(71)],
        };

        let importer = PrefabImporter;
        let mut resource = Resource::new(
            ResourceId(69),
            ResourceType::Prefab,
            "cube",
            "Assets/cube.obj",
            "Library/GameObjects/69",
        );
        resource.payload = ResourcePayload::Prefab(data.clone());

        let bytes = importer.save(&resource).unwrap();
        let mut loaded = resource.clone();
        loaded.payload = ResourcePayload::Empty;
        importer.load(&bytes, &mut loaded).unwrap();

        let ResourcePayload::Prefab(loaded_data) = &loaded.payload else {
            panic!("expected prefab payload");
        };
        assert_eq!(loaded_data.nodes, data.nodes);
        // The containment list lives in the meta sidecar, not the payload.
        assert!(loaded_data.containing_resources.is_empty());
    }
}
