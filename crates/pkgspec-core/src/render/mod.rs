//! Manifest rendering
//!
//! A [`Package`] becomes an element tree ([`Document`]), verbatim overrides
//! are applied to the tree, fields are ordered by the [`FormattingHints`]
//! sniffed from the previous output, and the tree is laid out as text.
//! Rendering with the hints sniffed from a rendering reproduces it exactly.

mod document;
mod element;
mod hints;
mod stamp;

pub use document::build_document;
pub use element::{Document, Element, Field, Layout, RenderValue, Stanza};
pub use hints::{FormattingHints, sniff_hints, sort_fields};
pub use stamp::{Stamp, body_hash, generated_comment, strip_comment_block};

use crate::package::Package;
use pkgspec_fs::checksum::content_hash;

/// Output options independent of the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Version named in the generated-file comment
    pub generator_version: String,
    /// Embed a `-- hash:` line over the body
    pub emit_hash: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            emit_hash: false,
        }
    }
}

/// Render `package` to manifest text, ending in a newline.
pub fn render_package(package: &Package, hints: &FormattingHints, options: &RenderOptions) -> String {
    let document = build_document(package, hints);
    let mut lines = document.lines(&hints.layout());
    let body = lines.join("\n") + "\n";
    let hash = options.emit_hash.then(|| content_hash(&body));

    let position = if document.cabal_version.is_some() {
        2.min(lines.len())
    } else {
        0
    };
    let mut comment = generated_comment(&options.generator_version, hash.as_deref());
    comment.push(String::new());
    lines.splice(position..position, comment);

    tracing::debug!(
        package = %package.header.name,
        stanzas = document.stanzas.len(),
        hashed = options.emit_hash,
        "rendered manifest"
    );
    lines.join("\n") + "\n"
}
