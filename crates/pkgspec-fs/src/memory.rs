//! In-memory file tree
//!
//! Implements the same capabilities as [`crate::DiskFiles`] over a fixed set
//! of paths so compilation can run without touching the disk.

use crate::listing::{GlobMatch, ListFiles, glob_in};
use crate::{NormalizedPath, Result};
use std::collections::BTreeMap;

/// A fixed set of files with optional contents.
#[derive(Debug, Default, Clone)]
pub struct MemoryFiles {
    files: BTreeMap<String, String>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from paths with empty contents.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut files = Self::new();
        for path in paths {
            files.insert(path.as_ref(), "");
        }
        files
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: &str, content: &str) -> &mut Self {
        self.files
            .insert(NormalizedPath::new(path).as_str().to_string(), content.to_string());
        self
    }

    /// Contents of a file, if present.
    pub fn read(&self, path: &NormalizedPath) -> Option<&str> {
        self.files.get(path.as_str()).map(String::as_str)
    }
}

impl ListFiles for MemoryFiles {
    fn list_files(&self, dir: &NormalizedPath) -> Result<Vec<String>> {
        let files = self.files.keys();
        if dir.as_str() == "." {
            return Ok(files.cloned().collect());
        }
        let prefix = format!("{}/", dir.as_str().trim_end_matches('/'));
        Ok(files
            .filter_map(|path| path.strip_prefix(&prefix))
            .map(str::to_string)
            .collect())
    }
}

impl GlobMatch for MemoryFiles {
    fn glob(&self, base: &NormalizedPath, pattern: &str) -> Result<Vec<String>> {
        let listing = self.list_files(base)?;
        glob_in(&listing, pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_relative_to_directory() {
        let files = MemoryFiles::from_paths(["src/Foo.hs", "src/Foo/Bar.hs", "app/Main.hs"]);
        assert_eq!(
            files.list_files(&NormalizedPath::new("src")).unwrap(),
            vec!["Foo.hs", "Foo/Bar.hs"]
        );
        assert_eq!(files.list_files(&NormalizedPath::new(".")).unwrap().len(), 3);
    }

    #[test]
    fn does_not_match_sibling_prefixes() {
        let files = MemoryFiles::from_paths(["src/Foo.hs", "src-extra/Bar.hs"]);
        assert_eq!(
            files.list_files(&NormalizedPath::new("src")).unwrap(),
            vec!["Foo.hs"]
        );
    }

    #[test]
    fn globs_against_base() {
        let files = MemoryFiles::from_paths(["README.md", "CHANGELOG.md", "docs/guide.md"]);
        assert_eq!(
            files.glob(&NormalizedPath::new("."), "*.md").unwrap(),
            vec!["CHANGELOG.md", "README.md"]
        );
    }
}
