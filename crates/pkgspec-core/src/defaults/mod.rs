//! Defaults inheritance
//!
//! A `defaults` entry names another document, either in a GitHub repository
//! or on the local filesystem, whose fields are merged underneath the
//! referencing document. Defaults may nest; cycles are rejected.

pub mod cache;
pub mod fetch;
pub mod merge;
pub mod resolver;

pub use cache::DefaultsCache;
pub use fetch::{Fetch, MemoryFetcher, StandardFetcher};
pub use merge::merge_documents;
pub use resolver::DefaultsResolver;

use crate::error::{Error, Result};
use crate::value::{JsonPath, Value};
use pkgspec_fs::NormalizedPath;
use std::fmt;

/// File name used when a GitHub reference names no path.
pub const DEFAULT_PATH: &str = "defaults.yaml";

/// A document stored in a GitHub repository at a fixed revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GithubRef {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub revision: String,
}

impl GithubRef {
    /// Raw download URL; doubles as the canonical id.
    pub fn url(&self) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/{}/{}",
            self.owner, self.repo, self.revision, self.path
        )
    }
}

impl fmt::Display for GithubRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// One entry of a `defaults` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultsRef {
    Github(GithubRef),
    Local { path: String },
}

impl DefaultsRef {
    /// Decode a `defaults` value: a single reference or a list of them.
    pub fn parse_all(value: &Value, origin: &str, path: &JsonPath) -> Result<Vec<Self>> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| Self::parse(item, origin, &path.index(index)))
                .collect(),
            single => Ok(vec![Self::parse(single, origin, path)?]),
        }
    }

    /// Decode one reference.
    ///
    /// Accepts `owner/repo@revision`, `owner/repo/some/path.yaml@revision`,
    /// `{ github: owner/repo, ref: revision, path: ... }` or `{ local: path }`.
    pub fn parse(value: &Value, origin: &str, path: &JsonPath) -> Result<Self> {
        match value {
            Value::String(shorthand) => parse_shorthand(shorthand).ok_or_else(|| {
                Error::parse(
                    origin,
                    path,
                    format!("invalid value \"{shorthand}\", expected owner/repo@revision"),
                )
            }),
            Value::Object(object) => {
                let github = object.get("github");
                let local = object.get("local");
                match (github, local) {
                    (Some(_), Some(_)) => Err(Error::ConflictingDefaultsSource {
                        origin: origin.to_string(),
                        path: path.to_string(),
                    }),
                    (None, Some(local)) => {
                        let local = expect_string(local, origin, &path.key("local"))?;
                        Ok(Self::Local { path: local })
                    }
                    (Some(github), None) => {
                        let github = expect_string(github, origin, &path.key("github"))?;
                        let (owner, repo) = split_owner_repo(&github).ok_or_else(|| {
                            Error::parse(
                                origin,
                                path.key("github"),
                                format!("invalid value \"{github}\", expected owner/repo"),
                            )
                        })?;
                        let revision = object
                            .get("ref")
                            .ok_or_else(|| Error::parse(origin, path, "key \"ref\" not present"))
                            .and_then(|value| expect_string(value, origin, &path.key("ref")))?;
                        let file = match object.get("path") {
                            Some(value) => expect_string(value, origin, &path.key("path"))?,
                            None => DEFAULT_PATH.to_string(),
                        };
                        Ok(Self::Github(GithubRef {
                            owner,
                            repo,
                            path: file,
                            revision,
                        }))
                    }
                    (None, None) => Err(Error::parse(
                        origin,
                        path,
                        "neither key \"github\" nor key \"local\" present",
                    )),
                }
            }
            other => Err(Error::parse(
                origin,
                path,
                format!(
                    "expected Object or String, but encountered {}",
                    crate::value::shape(other)
                ),
            )),
        }
    }
}

fn parse_shorthand(shorthand: &str) -> Option<DefaultsRef> {
    let (location, revision) = shorthand.rsplit_once('@')?;
    let mut parts = location.splitn(3, '/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    let file = parts.next().unwrap_or(DEFAULT_PATH);
    if revision.is_empty() || file.is_empty() {
        return None;
    }
    Some(DefaultsRef::Github(GithubRef {
        owner: owner.to_string(),
        repo: repo.to_string(),
        path: file.to_string(),
        revision: revision.to_string(),
    }))
}

fn split_owner_repo(github: &str) -> Option<(String, String)> {
    let (owner, repo) = github.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

fn expect_string(value: &Value, origin: &str, path: &JsonPath) -> Result<String> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        Error::parse(
            origin,
            path,
            format!(
                "expected String, but encountered {}",
                crate::value::shape(value)
            ),
        )
    })
}

/// Where a document lives once a reference has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(NormalizedPath),
    Remote(GithubRef),
}

impl Location {
    /// Identity used for cycle detection and caching: the normalized path
    /// or the raw URL, compared as exact strings.
    pub fn canonical_id(&self) -> String {
        match self {
            Self::Local(path) => path.as_str().to_string(),
            Self::Remote(github) => github.url(),
        }
    }

    /// Resolve a reference made from the document at `self`.
    ///
    /// Local references are relative to the referencing document's
    /// directory; inside a remote document that directory is in the same
    /// repository at the same revision.
    pub fn locate(&self, reference: &DefaultsRef) -> Location {
        match (self, reference) {
            (_, DefaultsRef::Github(github)) => Self::Remote(github.clone()),
            (Self::Local(document), DefaultsRef::Local { path }) => {
                Self::Local(directory_of(document).join(path))
            }
            (Self::Remote(document), DefaultsRef::Local { path }) => {
                let directory = directory_of(&NormalizedPath::new(&document.path));
                Self::Remote(GithubRef {
                    path: directory.join(path).as_str().to_string(),
                    ..document.clone()
                })
            }
        }
    }
}

fn directory_of(document: &NormalizedPath) -> NormalizedPath {
    document
        .parent()
        .unwrap_or_else(|| NormalizedPath::new("."))
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_id())
    }
}
