//! Virtual file service for the asset tree and resource library
//!
//! The resource core never touches `std::fs` directly; everything goes
//! through the [`FileSystem`] trait so the registry and scanner stay
//! storage-agnostic and tests can run against a throwaway root.

mod disk;
mod path_node;

pub use disk::DiskFileSystem;
pub use path_node::PathNode;

use thiserror::Error;

/// File service errors
#[derive(Debug, Error)]
pub enum VfsError {
    /// Path does not exist
    #[error("Path not found: {0}")]
    NotFound(String),

    /// Underlying IO failure
    #[error("IO error on '{path}': {source}")]
    Io {
        /// Path the operation was addressing
        path: String,
        /// Originating IO error
        source: std::io::Error,
    },

    /// Modification time could not be read
    #[error("No modification time available for: {0}")]
    NoModTime(String),
}

/// Narrow file-service contract consumed by the resource core
///
/// Paths are forward-slash strings relative to the service root (the project
/// directory); absolute paths are passed through untouched so files can be
/// pulled in from outside the project (explorer drag-and-drop).
pub trait FileSystem: Send + Sync {
    /// Read the full contents of a file
    fn load(&self, path: &str) -> Result<Vec<u8>, VfsError>;

    /// Write a buffer to a file, creating parent directories as needed
    fn save(&self, path: &str, data: &[u8]) -> Result<(), VfsError>;

    /// Check whether a file or directory exists
    fn exists(&self, path: &str) -> bool;

    /// Remove a single file
    fn remove(&self, path: &str) -> Result<(), VfsError>;

    /// Remove a directory and everything below it
    fn remove_dir(&self, path: &str) -> Result<(), VfsError>;

    /// Create a directory (and parents)
    fn make_dirs(&self, path: &str) -> Result<(), VfsError>;

    /// Last modification time as nanoseconds since the Unix epoch
    ///
    /// Nanosecond resolution so that re-saving a file in quick succession is
    /// still observable as a modification.
    fn last_mod_time(&self, path: &str) -> Result<u64, VfsError>;

    /// Copy `src` into `dest_dir` keeping the file name; returns the new path
    fn duplicate_file(&self, src: &str, dest_dir: &str) -> Result<String, VfsError>;

    /// Produce a file name that does not collide with anything in `dir`
    ///
    /// Returns `name` unchanged when free, otherwise appends ` (n)` before
    /// the extension.
    fn unique_name(&self, dir: &str, name: &str) -> String;

    /// Snapshot the directory tree under `root`
    ///
    /// `include_ext` keeps only files with one of the given extensions;
    /// `exclude_ext` drops files with one of them. Directories are always
    /// traversed.
    fn all_files(
        &self,
        root: &str,
        include_ext: Option<&[&str]>,
        exclude_ext: Option<&[&str]>,
    ) -> Result<PathNode, VfsError>;
}

/// Split a path into (directory, file stem, extension)
///
/// All three parts may be empty. The directory keeps its trailing slash so
/// `dir + name + "." + ext` reassembles the input.
#[must_use]
pub fn split_file_path(full_path: &str) -> (String, String, String) {
    let (dir, file) = match full_path.rfind('/') {
        Some(pos) => (&full_path[..=pos], &full_path[pos + 1..]),
        None => ("", full_path),
    };

    let (stem, ext) = match file.rfind('.') {
        Some(0) | None => (file, ""),
        Some(pos) => (&file[..pos], &file[pos + 1..]),
    };

    (dir.to_string(), stem.to_string(), ext.to_string())
}

/// Extension of a path, lower-cased ("" when absent)
#[must_use]
pub fn extension(path: &str) -> String {
    split_file_path(path).2.to_ascii_lowercase()
}
