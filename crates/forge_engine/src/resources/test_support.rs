//! Shared fixtures for resource-pipeline tests

use std::sync::Arc;

use tempfile::TempDir;

use crate::config::ResourceSettings;
use crate::vfs::DiskFileSystem;

use super::registry::ResourceRegistry;

/// OBJ container with one object and one material reference
pub const CUBE_OBJ: &str = "\
mtllib cube.mtl
o Cube
v -1.0 -1.0 1.0
v 1.0 -1.0 1.0
v 1.0 1.0 1.0
v -1.0 1.0 1.0
vn 0.0 0.0 1.0
usemtl CubeMat
f 1//1 2//1 3//1 4//1
";

/// MTL library matching [`CUBE_OBJ`]
pub const CUBE_MTL: &str = "\
newmtl CubeMat
Kd 0.8 0.1 0.1
";

/// Registry over a throwaway project directory
pub fn make_registry() -> (TempDir, ResourceRegistry) {
    let dir = TempDir::new().unwrap();
    let fs = Arc::new(DiskFileSystem::new(dir.path()));
    let registry = ResourceRegistry::new(fs, ResourceSettings::default());
    (dir, registry)
}

/// Tiny valid PNG, encoded in memory
pub fn sample_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 255, 0, 255]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}
