//! Filesystem capabilities for pkgspec
//!
//! Provides normalized paths, recursive listing, glob expansion, and safe
//! I/O. Listing and globbing are traits so the compiler can run against the
//! real disk ([`DiskFiles`]) or an in-memory tree ([`MemoryFiles`]).

pub mod checksum;
pub mod error;
pub mod io;
pub mod listing;
pub mod memory;
pub mod path;

pub use error::{Error, Result};
pub use listing::{DiskFiles, GlobMatch, ListFiles};
pub use memory::MemoryFiles;
pub use path::NormalizedPath;
