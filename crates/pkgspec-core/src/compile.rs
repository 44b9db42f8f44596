//! Compilation pipeline
//!
//! ```text
//! parse -> scrub -> resolve defaults -> decode -> merge -> globs -> inference -> render
//! ```
//!
//! Fatal errors abort with no output. Warnings from every stage are
//! collected in order and returned with the rendered text.

use crate::config::PackageConfig;
use crate::defaults::{DefaultsCache, DefaultsResolver, Fetch, Location};
use crate::error::{Error, Result};
use crate::expand::expand_globs;
use crate::inference::{InferenceOptions, infer_package};
use crate::merge::merge_package;
use crate::package::CabalVersion;
use crate::render::{FormattingHints, RenderOptions, render_package, sniff_hints};
use crate::schema::scrub;
use crate::value::parse_document;
use crate::warning::{Warning, Warnings};
use pkgspec_fs::{GlobMatch, ListFiles, NormalizedPath};

/// Behaviour switches for one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub inference: InferenceOptions,
    pub emit_hash: bool,
    /// Version of the running generator, checked against `spec-version`
    pub generator_version: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            inference: InferenceOptions::default(),
            emit_hash: false,
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl CompileOptions {
    pub fn with_inference(mut self, inference: InferenceOptions) -> Self {
        self.inference = inference;
        self
    }

    pub fn with_hash(mut self, emit_hash: bool) -> Self {
        self.emit_hash = emit_hash;
        self
    }

    pub fn with_generator_version(mut self, version: impl Into<String>) -> Self {
        self.generator_version = version.into();
        self
    }
}

/// Result of a successful compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    /// Package name, used for the output file name
    pub name: String,
    pub text: String,
    pub warnings: Vec<Warning>,
    pub cabal_version: CabalVersion,
}

/// Drives one manifest through the pipeline.
///
/// The defaults cache lives as long as the compiler, so compiling several
/// manifests with one compiler fetches each remote document once.
pub struct Compiler<'a> {
    fetch: &'a dyn Fetch,
    list: &'a dyn ListFiles,
    glob: &'a dyn GlobMatch,
    options: CompileOptions,
    cache: DefaultsCache,
}

impl<'a> Compiler<'a> {
    pub fn new<F>(fetch: &'a dyn Fetch, files: &'a F) -> Self
    where
        F: ListFiles + GlobMatch,
    {
        Self {
            fetch,
            list: files,
            glob: files,
            options: CompileOptions::default(),
            cache: DefaultsCache::new(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile the manifest at `manifest` whose contents are `text`.
    ///
    /// `previous` is the earlier output, if any; its layout and ordering are
    /// kept.
    pub fn compile(
        &mut self,
        manifest: &NormalizedPath,
        text: &str,
        previous: Option<&str>,
    ) -> Result<Compiled> {
        let origin = manifest.as_str();
        let mut warnings = Warnings::new();

        let mut document = parse_document(text, origin)?;
        scrub(&mut document, origin, &mut warnings);
        let resolved = DefaultsResolver::new(self.fetch, &mut self.cache).resolve_manifest(
            document,
            &Location::Local(manifest.clone()),
            &mut warnings,
        )?;

        let config = PackageConfig::decode(&resolved, origin)?;
        if let Some(required) = &config.header.spec_version {
            self.check_spec_version(origin, required)?;
        }

        let mut package = merge_package(config);
        let root = manifest
            .parent()
            .unwrap_or_else(|| NormalizedPath::new("."));
        expand_globs(&mut package, &root, self.glob, &mut warnings)?;

        let hints = previous.map(sniff_hints).unwrap_or_else(FormattingHints::default);
        infer_package(&mut package, &root, self.list, &self.options.inference, &hints)?;

        let render_options = RenderOptions {
            generator_version: self.options.generator_version.clone(),
            emit_hash: self.options.emit_hash,
        };
        let text = render_package(&package, &hints, &render_options);
        tracing::debug!(
            manifest = %manifest,
            package = %package.header.name,
            warnings = warnings.len(),
            "compiled manifest"
        );
        Ok(Compiled {
            name: package.header.name.clone(),
            text,
            warnings: warnings.into_vec(),
            cabal_version: package.cabal_version(),
        })
    }

    fn check_spec_version(&self, origin: &str, required: &str) -> Result<()> {
        let current = &self.options.generator_version;
        let newer = match (CabalVersion::parse(required), CabalVersion::parse(current)) {
            (Some(required), Some(current)) => required > current,
            _ => false,
        };
        if newer {
            return Err(Error::UnsupportedSpecVersion {
                origin: origin.to_string(),
                required: required.to_string(),
                current: current.clone(),
            });
        }
        Ok(())
    }
}
