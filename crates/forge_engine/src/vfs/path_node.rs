//! Directory-tree snapshots handed to the asset scanner

/// One node of a directory tree snapshot
///
/// Produced by [`FileSystem::all_files`](super::FileSystem::all_files); the
/// scanner walks these instead of hitting the file service for every visit.
#[derive(Debug, Clone)]
pub struct PathNode {
    /// Full path relative to the service root
    pub path: String,
    /// File or directory name (last path component)
    pub name: String,
    /// True for files, false for directories
    pub is_file: bool,
    /// Child nodes (empty for files and empty directories)
    pub children: Vec<PathNode>,
}

impl PathNode {
    /// Create a file node
    #[must_use]
    pub fn file(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self {
            path,
            name,
            is_file: true,
            children: Vec::new(),
        }
    }

    /// Create a directory node
    #[must_use]
    pub fn directory(path: impl Into<String>, children: Vec<PathNode>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self {
            path,
            name,
            is_file: false,
            children,
        }
    }

    /// True when the node has no children (every file, plus empty dirs)
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Count all file nodes in this subtree
    #[must_use]
    pub fn file_count(&self) -> usize {
        if self.is_file {
            1
        } else {
            self.children.iter().map(Self::file_count).sum()
        }
    }

    /// Depth-first iteration over every file path in this subtree
    pub fn files(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_files(&mut out);
        out
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a str>) {
        if self.is_file {
            out.push(&self.path);
        }
        for child in &self.children {
            child.collect_files(out);
        }
    }
}
