//! SHA-256 content hashing
//!
//! Generated manifests may embed a `-- hash: <hex>` line computed over their
//! body; re-hashing the body later tells whether the file was edited by hand.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 digest of string content.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
