//! End-to-end import pipeline tests
//!
//! Exercises the full container scenario: one OBJ/MTL pair in, a prefab
//! plus its extracted mesh and material out, with the containment recorded
//! in the prefab's sidecar and every payload sitting in its library bucket.

use super::importers::PrefabData;
use super::meta::MetaFile;
use super::resource::{ResourcePayload, ResourceType};
use super::test_support::{make_registry, sample_png, CUBE_MTL, CUBE_OBJ};
use crate::vfs::FileSystem;

#[test]
fn test_container_import_produces_three_resources() {
    let (_dir, mut registry) = make_registry();
    registry.fs.save("Assets/cube.obj", CUBE_OBJ.as_bytes()).unwrap();
    registry.fs.save("Assets/cube.mtl", CUBE_MTL.as_bytes()).unwrap();

    let prefab_id = registry.import_file_from_assets("Assets/cube.obj").unwrap();

    let meshes = registry.all_metas_of_type(ResourceType::Mesh);
    let materials = registry.all_metas_of_type(ResourceType::Material);
    assert_eq!(meshes.len(), 1);
    assert_eq!(materials.len(), 1);
    let mesh_id = meshes[0].id;
    let material_id = materials[0].id;

    // All three payloads land in their type buckets, named by id
    assert!(registry
        .fs
        .exists(&format!("Library/GameObjects/{prefab_id}")));
    assert!(registry.fs.exists(&format!("Library/Meshes/{mesh_id}")));
    assert!(registry
        .fs
        .exists(&format!("Library/Materials/{material_id}")));

    // The prefab sidecar lists both contained resources
    let sidecar = registry.fs.load("Assets/cube.obj.meta").unwrap();
    let meta = MetaFile::parse(std::str::from_utf8(&sidecar).unwrap()).unwrap();
    assert_eq!(meta.id, prefab_id.raw());
    let contained_ids: Vec<u64> = meta.contained.iter().map(|c| c.id).collect();
    assert!(contained_ids.contains(&mesh_id.raw()));
    assert!(contained_ids.contains(&material_id.raw()));
}

#[test]
fn test_container_reimport_keeps_nested_ids() {
    let (_dir, mut registry) = make_registry();
    registry.fs.save("Assets/cube.obj", CUBE_OBJ.as_bytes()).unwrap();
    registry.fs.save("Assets/cube.mtl", CUBE_MTL.as_bytes()).unwrap();

    let prefab_id = registry.import_file_from_assets("Assets/cube.obj").unwrap();
    let mesh_id = registry.all_metas_of_type(ResourceType::Mesh)[0].id;
    let material_id = registry.all_metas_of_type(ResourceType::Material)[0].id;

    let again = registry.import_file_from_assets("Assets/cube.obj").unwrap();
    assert_eq!(again, prefab_id);
    assert_eq!(registry.all_metas_of_type(ResourceType::Mesh)[0].id, mesh_id);
    assert_eq!(
        registry.all_metas_of_type(ResourceType::Material)[0].id,
        material_id
    );
}

#[test]
fn test_prefab_loads_with_linked_nodes() {
    let (_dir, mut registry) = make_registry();
    registry.fs.save("Assets/cube.obj", CUBE_OBJ.as_bytes()).unwrap();
    registry.fs.save("Assets/cube.mtl", CUBE_MTL.as_bytes()).unwrap();

    let prefab_id = registry.import_file_from_assets("Assets/cube.obj").unwrap();
    let mesh_id = registry.all_metas_of_type(ResourceType::Mesh)[0].id;
    let material_id = registry.all_metas_of_type(ResourceType::Material)[0].id;

    let prefab: PrefabData = registry.load_prefab(prefab_id).unwrap();
    assert_eq!(prefab.nodes.len(), 2);
    assert_eq!(prefab.nodes[0].parent, 0);
    assert_eq!(prefab.nodes[1].mesh, Some(mesh_id));
    assert_eq!(prefab.nodes[1].material, Some(material_id));
    assert!(prefab.containing_resources.contains(&mesh_id));

    // load_prefab counted the consumer
    assert_eq!(registry.get_resource(prefab_id).unwrap().instances, 1);
}

#[test]
fn test_extracted_mesh_loads_from_library() {
    let (_dir, mut registry) = make_registry();
    registry.fs.save("Assets/cube.obj", CUBE_OBJ.as_bytes()).unwrap();
    registry.fs.save("Assets/cube.mtl", CUBE_MTL.as_bytes()).unwrap();
    registry.import_file_from_assets("Assets/cube.obj").unwrap();

    let mesh_id = registry.all_metas_of_type(ResourceType::Mesh)[0].id;
    let mesh = registry.get_resource(mesh_id).unwrap();
    assert!(mesh.is_internal);

    let ResourcePayload::Mesh(data) = &mesh.payload else {
        panic!("expected mesh payload");
    };
    // One quad, fan-triangulated
    assert_eq!(data.vertices.len(), 4);
    assert_eq!(data.indices, vec![0, 1, 2, 0, 2, 3]);
}

#[test]
fn test_extracted_material_uses_default_shader() {
    let (_dir, mut registry) = make_registry();
    registry
        .fs
        .save(
            "Engine/Assets/Defaults/Default Shader.shader",
            b"#vertex\n#fragment\n",
        )
        .unwrap();
    registry.fs.save("Assets/cube.obj", CUBE_OBJ.as_bytes()).unwrap();
    registry.fs.save("Assets/cube.mtl", CUBE_MTL.as_bytes()).unwrap();

    // Scan everything so the default shader is registered before the
    // container that wants to reference it
    registry.start();

    let shader_id = registry
        .metas()
        .find_by_path("Engine/Assets/Defaults/Default Shader.shader")
        .unwrap()
        .id;
    let material_id = registry.all_metas_of_type(ResourceType::Material)[0].id;
    let material = registry.get_resource(material_id).unwrap();
    let ResourcePayload::Material(data) = &material.payload else {
        panic!("expected material payload");
    };
    assert_eq!(data.shader, shader_id);
    assert_eq!(&data.diffuse[..3], &[0.8, 0.1, 0.1]);
}

#[test]
fn test_full_startup_round() {
    let (dir, mut registry) = make_registry();
    registry.fs.save("Assets/tex.png", &sample_png()).unwrap();
    registry.fs.save("Assets/cube.obj", CUBE_OBJ.as_bytes()).unwrap();
    registry.fs.save("Assets/cube.mtl", CUBE_MTL.as_bytes()).unwrap();
    registry
        .fs
        .save("Assets/fx/sparks.particles", b"(emitters: [])")
        .unwrap();

    registry.start();
    let known = registry.metas().len();
    // texture + prefab + mesh + material + particles + 2 folders
    assert_eq!(known, 7);
    drop(registry);

    // A second engine run over the same project hydrates, re-scans, and
    // finds nothing new to do.
    let fs = std::sync::Arc::new(crate::vfs::DiskFileSystem::new(dir.path()));
    let mut second = super::registry::ResourceRegistry::new(
        fs,
        crate::config::ResourceSettings::default(),
    );
    second.start();
    assert_eq!(second.metas().len(), known);
}

#[test]
fn test_shader_saves_mirror_to_asset_tree() {
    let (_dir, mut registry) = make_registry();
    registry
        .fs
        .save("Assets/flat.shader", b"#vertex\nold\n")
        .unwrap();
    let id = registry.import_file_from_assets("Assets/flat.shader").unwrap();

    {
        let shader = registry.get_resource_mut(id).unwrap();
        let ResourcePayload::Shader(data) = &mut shader.payload else {
            panic!("expected shader payload");
        };
        data.source = "#vertex\nnew\n".to_string();
        shader.needs_save = true;
    }
    registry.save_changed_resources();

    // The hand-authored file was updated in place
    assert_eq!(
        registry.fs.load("Assets/flat.shader").unwrap(),
        b"#vertex\nnew\n"
    );
}

#[test]
fn test_internal_material_never_touches_the_container() {
    let (_dir, mut registry) = make_registry();
    registry.fs.save("Assets/cube.obj", CUBE_OBJ.as_bytes()).unwrap();
    registry.fs.save("Assets/cube.mtl", CUBE_MTL.as_bytes()).unwrap();
    registry.import_file_from_assets("Assets/cube.obj").unwrap();

    let container_before = registry.fs.load("Assets/cube.obj").unwrap();
    let material_id = registry.all_metas_of_type(ResourceType::Material)[0].id;
    {
        let material = registry.get_resource_mut(material_id).unwrap();
        material.needs_save = true;
    }
    registry.save_changed_resources();

    assert_eq!(registry.fs.load("Assets/cube.obj").unwrap(), container_before);
}
