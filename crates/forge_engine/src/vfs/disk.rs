//! Disk-backed implementation of the file service

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use super::{split_file_path, FileSystem, PathNode, VfsError};

/// File service over a real directory tree
///
/// All relative paths resolve against `root`; absolute paths bypass the root
/// so external files (explorer imports) remain reachable.
pub struct DiskFileSystem {
    root: PathBuf,
}

impl DiskFileSystem {
    /// Create a file service rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }

    fn io_err(path: &str, source: std::io::Error) -> VfsError {
        if source.kind() == std::io::ErrorKind::NotFound {
            VfsError::NotFound(path.to_string())
        } else {
            VfsError::Io {
                path: path.to_string(),
                source,
            }
        }
    }

    fn collect(
        &self,
        path: &str,
        include_ext: Option<&[&str]>,
        exclude_ext: Option<&[&str]>,
    ) -> Result<PathNode, VfsError> {
        let mut children = Vec::new();
        let mut entries: Vec<_> = fs::read_dir(self.resolve(path))
            .map_err(|e| Self::io_err(path, e))?
            .filter_map(Result::ok)
            .collect();
        // Stable ordering so scan results are reproducible across runs
        entries.sort_by_key(std::fs::DirEntry::file_name);

        for entry in entries {
            let name = entry.file_name().to_string_lossy().into_owned();
            let child_path = format!("{path}/{name}");
            let file_type = entry.file_type().map_err(|e| Self::io_err(&child_path, e))?;

            if file_type.is_dir() {
                children.push(self.collect(&child_path, include_ext, exclude_ext)?);
            } else if file_type.is_file() {
                let ext = super::extension(&name);
                if let Some(included) = include_ext {
                    if !included.iter().any(|e| e.eq_ignore_ascii_case(&ext)) {
                        continue;
                    }
                }
                if let Some(excluded) = exclude_ext {
                    if excluded.iter().any(|e| e.eq_ignore_ascii_case(&ext)) {
                        continue;
                    }
                }
                children.push(PathNode::file(child_path));
            }
        }

        Ok(PathNode::directory(path, children))
    }
}

impl FileSystem for DiskFileSystem {
    fn load(&self, path: &str) -> Result<Vec<u8>, VfsError> {
        fs::read(self.resolve(path)).map_err(|e| Self::io_err(path, e))
    }

    fn save(&self, path: &str, data: &[u8]) -> Result<(), VfsError> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::io_err(path, e))?;
        }
        fs::write(full, data).map_err(|e| Self::io_err(path, e))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }

    fn remove(&self, path: &str) -> Result<(), VfsError> {
        fs::remove_file(self.resolve(path)).map_err(|e| Self::io_err(path, e))
    }

    fn remove_dir(&self, path: &str) -> Result<(), VfsError> {
        fs::remove_dir_all(self.resolve(path)).map_err(|e| Self::io_err(path, e))
    }

    fn make_dirs(&self, path: &str) -> Result<(), VfsError> {
        fs::create_dir_all(self.resolve(path)).map_err(|e| Self::io_err(path, e))
    }

    fn last_mod_time(&self, path: &str) -> Result<u64, VfsError> {
        let metadata = fs::metadata(self.resolve(path)).map_err(|e| Self::io_err(path, e))?;
        let modified = metadata
            .modified()
            .map_err(|_| VfsError::NoModTime(path.to_string()))?;
        let since_epoch = modified
            .duration_since(UNIX_EPOCH)
            .map_err(|_| VfsError::NoModTime(path.to_string()))?;
        Ok(u64::try_from(since_epoch.as_nanos()).unwrap_or(u64::MAX))
    }

    fn duplicate_file(&self, src: &str, dest_dir: &str) -> Result<String, VfsError> {
        let data = self.load(src)?;
        let file_name = src.rsplit(['/', '\\']).next().unwrap_or(src);
        let dest = format!("{dest_dir}/{file_name}");
        self.save(&dest, &data)?;
        Ok(dest)
    }

    fn unique_name(&self, dir: &str, name: &str) -> String {
        if !self.exists(&format!("{dir}/{name}")) {
            return name.to_string();
        }
        let (_, stem, ext) = split_file_path(name);
        let mut counter = 1;
        loop {
            let candidate = if ext.is_empty() {
                format!("{stem} ({counter})")
            } else {
                format!("{stem} ({counter}).{ext}")
            };
            if !self.exists(&format!("{dir}/{candidate}")) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn all_files(
        &self,
        root: &str,
        include_ext: Option<&[&str]>,
        exclude_ext: Option<&[&str]>,
    ) -> Result<PathNode, VfsError> {
        self.collect(root, include_ext, exclude_ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn disk() -> (TempDir, DiskFileSystem) {
        let dir = TempDir::new().unwrap();
        let fs = DiskFileSystem::new(dir.path());
        (dir, fs)
    }

    #[test]
    fn test_save_load_roundtrip() {
        let (_dir, fs) = disk();
        fs.save("Assets/notes.txt", b"hello").unwrap();
        assert!(fs.exists("Assets/notes.txt"));
        assert_eq!(fs.load("Assets/notes.txt").unwrap(), b"hello");
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let (_dir, fs) = disk();
        match fs.load("Assets/nope.png") {
            Err(VfsError::NotFound(path)) => assert_eq!(path, "Assets/nope.png"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_remove_file() {
        let (_dir, fs) = disk();
        fs.save("Assets/tmp.bin", &[1, 2, 3]).unwrap();
        fs.remove("Assets/tmp.bin").unwrap();
        assert!(!fs.exists("Assets/tmp.bin"));
    }

    #[test]
    fn test_last_mod_time_advances_on_rewrite() {
        let (_dir, fs) = disk();
        fs.save("Assets/tex.png", b"v1").unwrap();
        let first = fs.last_mod_time("Assets/tex.png").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        fs.save("Assets/tex.png", b"v2").unwrap();
        let second = fs.last_mod_time("Assets/tex.png").unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_all_files_include_filter() {
        let (_dir, fs) = disk();
        fs.save("Assets/a.png", b"x").unwrap();
        fs.save("Assets/a.png.meta", b"x").unwrap();
        fs.save("Assets/Sub/b.obj", b"x").unwrap();

        let metas = fs.all_files("Assets", Some(&["meta"]), None).unwrap();
        assert_eq!(metas.files(), vec!["Assets/a.png.meta"]);

        let sources = fs.all_files("Assets", None, Some(&["meta"])).unwrap();
        assert_eq!(sources.files(), vec!["Assets/Sub/b.obj", "Assets/a.png"]);
    }

    #[test]
    fn test_duplicate_file_keeps_name() {
        let (_dir, fs) = disk();
        fs.save("Downloads/rock.png", b"pixels").unwrap();
        let dest = fs.duplicate_file("Downloads/rock.png", "Assets").unwrap();
        assert_eq!(dest, "Assets/rock.png");
        assert_eq!(fs.load(&dest).unwrap(), b"pixels");
    }

    #[test]
    fn test_unique_name_counts_up() {
        let (_dir, fs) = disk();
        assert_eq!(fs.unique_name("Assets", "rock.png"), "rock.png");
        fs.save("Assets/rock.png", b"x").unwrap();
        assert_eq!(fs.unique_name("Assets", "rock.png"), "rock (1).png");
        fs.save("Assets/rock (1).png", b"x").unwrap();
        assert_eq!(fs.unique_name("Assets", "rock.png"), "rock (2).png");
    }
}
