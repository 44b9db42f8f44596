//! Directory listing and glob expansion capabilities
//!
//! The compiler never touches the disk directly; it asks a [`ListFiles`] for
//! source files and a [`GlobMatch`] for file-list patterns. [`DiskFiles`] is
//! the real implementation, [`crate::MemoryFiles`] the in-memory one.

use crate::{Error, NormalizedPath, Result};
use globset::{GlobBuilder, GlobMatcher};
use walkdir::WalkDir;

/// Recursive file listing.
pub trait ListFiles {
    /// List every file below `dir`, as forward-slash paths relative to `dir`,
    /// sorted lexicographically. A missing directory yields an empty list.
    fn list_files(&self, dir: &NormalizedPath) -> Result<Vec<String>>;
}

/// Glob expansion relative to a base directory.
pub trait GlobMatch {
    /// Expand `pattern` below `base`, returning sorted paths relative to `base`.
    fn glob(&self, base: &NormalizedPath, pattern: &str) -> Result<Vec<String>>;
}

/// Build a matcher where `*` never crosses a `/` and `**` does.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| Error::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })
}

/// Filter a sorted listing down to the entries matching `pattern`.
pub fn glob_in(listing: &[String], pattern: &str) -> Result<Vec<String>> {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    let matcher = compile_glob(pattern)?;
    Ok(listing
        .iter()
        .filter(|candidate| matcher.is_match(candidate.as_str()))
        .cloned()
        .collect())
}

/// Filesystem-backed listing and globbing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskFiles;

impl DiskFiles {
    pub fn new() -> Self {
        Self
    }
}

impl ListFiles for DiskFiles {
    fn list_files(&self, dir: &NormalizedPath) -> Result<Vec<String>> {
        let root = dir.to_native();
        if !root.is_dir() {
            tracing::debug!(dir = %dir, "source directory does not exist");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&root).follow_links(true) {
            let entry = entry.map_err(|e| Error::Walk {
                path: root.clone(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&root) else {
                continue;
            };
            files.push(relative.to_string_lossy().replace('\\', "/"));
        }
        files.sort();
        Ok(files)
    }
}

impl GlobMatch for DiskFiles {
    fn glob(&self, base: &NormalizedPath, pattern: &str) -> Result<Vec<String>> {
        let listing = self.list_files(base)?;
        glob_in(&listing, pattern)
    }
}
