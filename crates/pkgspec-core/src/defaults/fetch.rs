//! Retrieval of defaults documents
//!
//! The resolver only sees the [`Fetch`] trait. [`StandardFetcher`] reads the
//! local filesystem and downloads GitHub documents into an on-disk cache;
//! [`MemoryFetcher`] serves fixed documents for tests.

use super::GithubRef;
use crate::error::{Error, Result};
use pkgspec_fs::{NormalizedPath, io};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Source of defaults document text. Absent documents are `Ok(None)`.
pub trait Fetch {
    fn fetch_local(&self, path: &NormalizedPath) -> Result<Option<String>>;
    fn fetch_remote(&self, reference: &GithubRef) -> Result<Option<String>>;
}

/// Filesystem plus HTTPS fetcher with a persistent download cache.
#[derive(Debug, Clone)]
pub struct StandardFetcher {
    cache_dir: Option<PathBuf>,
    timeout: Duration,
}

impl Default for StandardFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardFetcher {
    /// Cache under `~/.pkgspec/defaults`; no cache when there is no home
    /// directory.
    pub fn new() -> Self {
        Self {
            cache_dir: dirs::home_dir().map(|home| home.join(".pkgspec").join("defaults")),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn cache_path(&self, reference: &GithubRef) -> Option<NormalizedPath> {
        let dir = self.cache_dir.as_ref()?;
        Some(
            NormalizedPath::new(dir)
                .join(&reference.owner)
                .join(&reference.repo)
                .join(&reference.revision)
                .join(&reference.path),
        )
    }

    fn download(&self, reference: &GithubRef) -> Result<Option<String>> {
        let url = reference.url();
        let fetch_error = |message: String| Error::Fetch {
            location: url.clone(),
            message,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| fetch_error(format!("failed to build HTTP client: {e}")))?;
        let response = client.get(&url).send().map_err(|e| fetch_error(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(fetch_error(format!("server returned {}", response.status())));
        }
        response
            .text()
            .map(Some)
            .map_err(|e| fetch_error(e.to_string()))
    }
}

impl Fetch for StandardFetcher {
    fn fetch_local(&self, path: &NormalizedPath) -> Result<Option<String>> {
        Ok(io::read_text_if_exists(path)?)
    }

    fn fetch_remote(&self, reference: &GithubRef) -> Result<Option<String>> {
        let cache_path = self.cache_path(reference);
        if let Some(path) = &cache_path {
            if let Some(text) = io::read_text_if_exists(path)? {
                tracing::debug!(url = %reference, cache = %path, "defaults served from disk cache");
                return Ok(Some(text));
            }
        }

        tracing::debug!(url = %reference, "downloading defaults");
        let text = self.download(reference)?;
        if let (Some(text), Some(path)) = (&text, &cache_path) {
            io::write_text(path, text)?;
        }
        Ok(text)
    }
}

/// Fixed in-memory documents, recording every remote request.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    local: BTreeMap<String, String>,
    remote: BTreeMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local(mut self, path: &str, text: &str) -> Self {
        self.local
            .insert(NormalizedPath::new(path).as_str().to_string(), text.to_string());
        self
    }

    pub fn with_remote(mut self, reference: &GithubRef, text: &str) -> Self {
        self.remote.insert(reference.url(), text.to_string());
        self
    }

    /// URLs requested so far, in order.
    pub fn remote_requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Fetch for MemoryFetcher {
    fn fetch_local(&self, path: &NormalizedPath) -> Result<Option<String>> {
        Ok(self.local.get(path.as_str()).cloned())
    }

    fn fetch_remote(&self, reference: &GithubRef) -> Result<Option<String>> {
        let url = reference.url();
        self.requests.borrow_mut().push(url.clone());
        Ok(self.remote.get(&url).cloned())
    }
}
