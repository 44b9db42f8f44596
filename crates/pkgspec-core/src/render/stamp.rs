//! Generated-file comment block and body hash
//!
//! The comment block sits after the `cabal-version` line. The optional hash
//! covers the file with the comment block (and the blank line after it)
//! removed, so re-hashing an existing file detects manual edits.

use crate::package::CabalVersion;
use pkgspec_fs::checksum::content_hash;

const GENERATED_PREFIX: &str = "-- This file has been generated from package.yaml by pkgspec version ";
const HASH_PREFIX: &str = "-- hash: ";

/// Comment lines announcing the generator, with an optional body hash.
pub fn generated_comment(version: &str, hash: Option<&str>) -> Vec<String> {
    let mut lines = vec![
        format!("{GENERATED_PREFIX}{version}."),
        "--".to_string(),
        "-- see: https://github.com/user/pkgspec".to_string(),
    ];
    if let Some(hash) = hash {
        lines.push("--".to_string());
        lines.push(format!("{HASH_PREFIX}{hash}"));
    }
    lines
}

/// Remove the first run of comment lines and one blank line following it.
pub fn strip_comment_block(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let Some(start) = lines.iter().position(|line| line.starts_with("--")) else {
        return text.to_string();
    };
    let mut end = start;
    while end < lines.len() && lines[end].starts_with("--") {
        end += 1;
    }
    if end < lines.len() && lines[end].is_empty() && end + 1 < lines.len() {
        end += 1;
    }
    lines[..start]
        .iter()
        .chain(&lines[end..])
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hash of a manifest body as embedded in the `-- hash:` line.
pub fn body_hash(text: &str) -> String {
    content_hash(&strip_comment_block(text))
}

/// What an existing manifest says about how it was generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stamp {
    pub version: Option<String>,
    pub hash: Option<String>,
}

impl Stamp {
    pub fn read(text: &str) -> Self {
        let mut stamp = Self::default();
        let comment = text
            .lines()
            .skip_while(|line| !line.starts_with("--"))
            .take_while(|line| line.starts_with("--"));
        for line in comment {
            if let Some(rest) = line.strip_prefix(GENERATED_PREFIX) {
                stamp.version = Some(rest.trim_end_matches('.').trim().to_string());
            } else if let Some(rest) = line.strip_prefix(HASH_PREFIX) {
                stamp.hash = Some(rest.trim().to_string());
            }
        }
        stamp
    }

    /// An embedded hash that no longer matches the body.
    pub fn is_modified(&self, text: &str) -> bool {
        self.hash.as_deref().is_some_and(|hash| hash != body_hash(text))
    }

    /// Written by a later generator than `current`.
    pub fn is_newer_than(&self, current: &str) -> bool {
        let Some(version) = self.version.as_deref().and_then(CabalVersion::parse) else {
            return false;
        };
        CabalVersion::parse(current).is_some_and(|current| version > current)
    }
}
