//! Package description compiler for pkgspec
//!
//! Turns a `package.yaml` description into a Cabal package description,
//! implementing:
//!
//! - **Defaults inheritance**: recursive local and GitHub-hosted `defaults`
//!   documents with cycle detection
//! - **Section merging**: global fields and conditionals merged into every
//!   build section with fixed precedence
//! - **Module inference**: exposed/other/autogen module lists discovered from
//!   source directories, never re-declaring anything already listed
//! - **Formatting-preserving rendering**: field order and alignment of the
//!   previous output are kept for stable diffs
//!
//! # Architecture
//!
//! ```text
//!                    pkgspec-cli
//!                        |
//!                   pkgspec-core
//!                        |
//!                   pkgspec-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pkgspec_core::{Compiler, MemoryFetcher};
//! use pkgspec_fs::{MemoryFiles, NormalizedPath};
//!
//! let fetch = MemoryFetcher::new();
//! let files = MemoryFiles::from_paths(["src/Foo.hs"]);
//! let mut compiler = Compiler::new(&fetch, &files);
//! let compiled = compiler.compile(
//!     &NormalizedPath::new("package.yaml"),
//!     "name: foo\nlibrary:\n  source-dirs: src\n",
//!     None,
//! )?;
//! println!("{}", compiled.text);
//! ```

pub mod compile;
pub mod conditional;
pub mod config;
pub mod defaults;
pub mod error;
pub mod expand;
pub mod fields;
pub mod inference;
pub mod merge;
pub mod package;
pub mod render;
pub mod schema;
pub mod value;
pub mod verbatim;
pub mod warning;

pub use compile::{CompileOptions, Compiled, Compiler};
pub use conditional::{ConditionalNode, ConditionalTree};
pub use config::{PackageConfig, SectionConfig, Verbatim};
pub use defaults::{
    DefaultsCache, DefaultsRef, DefaultsResolver, Fetch, GithubRef, Location, MemoryFetcher,
    StandardFetcher,
};
pub use error::{Error, Result};
pub use fields::{Dependency, FieldSet, FieldValue};
pub use inference::InferenceOptions;
pub use package::{CabalVersion, Modules, Package, Section, SectionKind};
pub use render::{FormattingHints, RenderOptions, Stamp, render_package, sniff_hints};
pub use value::{JsonPath, Value, parse_document};
pub use warning::{Warning, Warnings};
