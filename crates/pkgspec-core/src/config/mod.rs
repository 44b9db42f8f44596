//! Typed package configuration
//!
//! A resolved and scrubbed document decodes into a [`PackageConfig`]: the
//! package header, the global section (top-level fields and `when`), flags
//! and every build section. Shape mismatches are [`crate::Error::Parse`]
//! errors citing the exact path.

mod decode;
mod section;

pub use decode::Decoder;
pub use section::{SectionConfig, Verbatim, decode_fields, decode_when};

use crate::error::{Error, Result};
use crate::schema::Scope;
use crate::value::{JsonPath, Value};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;

/// How the package is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildType {
    Simple,
    Configure,
    Make,
    Custom,
}

impl BuildType {
    pub const ALL: [BuildType; 4] = [Self::Simple, Self::Configure, Self::Make, Self::Custom];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "Simple",
            Self::Configure => "Configure",
            Self::Make => "Make",
            Self::Custom => "Custom",
        }
    }

    fn parse(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|build_type| build_type.as_str() == text)
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `github: owner/repo[/subdir]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubRepo {
    pub owner: String,
    pub repo: String,
    pub subdir: Option<String>,
}

impl GithubRepo {
    fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim_matches('/').splitn(3, '/');
        let owner = parts.next().filter(|part| !part.is_empty())?;
        let repo = parts.next().filter(|part| !part.is_empty())?;
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            subdir: parts.next().map(str::to_string),
        })
    }

    pub fn url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

/// A `flags` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlagConfig {
    #[serde(default)]
    pub description: Option<String>,
    pub manual: bool,
    pub default: bool,
}

/// Package-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageHeader {
    pub name: String,
    pub version: String,
    pub synopsis: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub stability: Option<String>,
    pub homepage: Option<String>,
    pub bug_reports: Option<String>,
    pub author: Vec<String>,
    pub maintainer: Vec<String>,
    pub copyright: Option<String>,
    pub license: Option<String>,
    pub license_files: Vec<String>,
    pub tested_with: Vec<String>,
    pub build_type: Option<BuildType>,
    pub extra_source_files: Vec<String>,
    pub extra_doc_files: Vec<String>,
    pub data_files: Vec<String>,
    pub data_dir: Option<String>,
    pub github: Option<GithubRepo>,
    pub git: Option<String>,
    pub spec_version: Option<String>,
}

/// A fully decoded package description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageConfig {
    pub header: PackageHeader,
    /// Top-level fields and `when`, merged into every build section
    pub global: SectionConfig,
    pub flags: IndexMap<String, FlagConfig>,
    pub custom_setup: Option<SectionConfig>,
    pub library: Option<SectionConfig>,
    pub internal_libraries: IndexMap<String, SectionConfig>,
    pub executables: IndexMap<String, SectionConfig>,
    pub tests: IndexMap<String, SectionConfig>,
    pub benchmarks: IndexMap<String, SectionConfig>,
    pub verbatim: Option<Verbatim>,
}

impl PackageConfig {
    pub fn decode(document: &Value, origin: &str) -> Result<Self> {
        Self::decode_with(document, origin, true)
    }

    /// Shape-check a defaults document on its own, citing `origin` in any
    /// error. A package-level fragment needs no `name`.
    pub fn check_fragment(document: &Value, scope: Scope, origin: &str) -> Result<()> {
        match scope {
            Scope::Package => Self::decode_with(document, origin, false).map(drop),
            _ => {
                let decoder = Decoder::new(origin);
                SectionConfig::decode(&decoder, document, &JsonPath::root()).map(drop)
            }
        }
    }

    fn decode_with(document: &Value, origin: &str, name_required: bool) -> Result<Self> {
        let decoder = Decoder::new(origin);
        let root = JsonPath::root();
        let object = decoder.object(document, &root)?;

        let header = decode_header(&decoder, object, &root, name_required)?;

        let global = SectionConfig {
            fields: decode_fields(&decoder, object, &root)?,
            conditionals: match object.get("when") {
                Some(when) => decode_when(&decoder, when, &root.key("when"))?,
                None => Default::default(),
            },
            verbatim: None,
        };

        let section = |key: &str| -> Result<Option<SectionConfig>> {
            object
                .get(key)
                .map(|value| SectionConfig::decode(&decoder, value, &root.key(key)))
                .transpose()
        };
        let sections = |key: &str| -> Result<IndexMap<String, SectionConfig>> {
            match object.get(key) {
                Some(value) => decoder.named(value, &root.key(key), |entry, path| {
                    SectionConfig::decode(&decoder, entry, path)
                }),
                None => Ok(IndexMap::new()),
            }
        };

        // The singular form is named after the package and wins a name clash.
        let mut executables = IndexMap::new();
        let single = section("executable")?;
        let many = sections("executables")?;
        if let Some(single) = single {
            if many.contains_key(&header.name) {
                tracing::warn!(
                    origin,
                    name = %header.name,
                    "executables entry shadowed by executable"
                );
            }
            executables.insert(header.name.clone(), single);
        }
        for (name, entry) in many {
            executables.entry(name).or_insert(entry);
        }

        let flags = match object.get("flags") {
            Some(value) => decoder.named(value, &root.key("flags"), |entry, path| {
                serde_json::from_value::<FlagConfig>(entry.clone())
                    .map_err(|e| Error::parse(origin, path, e.to_string()))
            })?,
            None => IndexMap::new(),
        };

        let verbatim = object
            .get("verbatim")
            .map(|value| Verbatim::decode(&decoder, value, &root.key("verbatim")))
            .transpose()?;

        let config = Self {
            global,
            flags,
            custom_setup: section("custom-setup")?,
            library: section("library")?,
            internal_libraries: sections("internal-libraries")?,
            executables,
            tests: sections("tests")?,
            benchmarks: sections("benchmarks")?,
            verbatim,
            header,
        };
        tracing::debug!(
            package = %config.header.name,
            executables = config.executables.len(),
            tests = config.tests.len(),
            "decoded package configuration"
        );
        Ok(config)
    }
}

fn decode_header(
    decoder: &Decoder<'_>,
    object: &serde_json::Map<String, Value>,
    root: &JsonPath,
    name_required: bool,
) -> Result<PackageHeader> {
    let text = |key: &str| -> Result<Option<String>> {
        object
            .get(key)
            .map(|value| decoder.scalar(value, &root.key(key)))
            .transpose()
    };
    let list = |key: &str| -> Result<Vec<String>> {
        match object.get(key) {
            Some(value) => decoder.list(value, &root.key(key)),
            None => Ok(Vec::new()),
        }
    };

    let name = match object.get("name") {
        Some(value) => decoder.scalar(value, &root.key("name"))?,
        None if name_required => return Err(decoder.missing(root, "name")),
        None => String::new(),
    };

    let build_type = match text("build-type")? {
        Some(value) => Some(BuildType::parse(&value).ok_or_else(|| Error::InvalidEnumValue {
            origin: decoder.origin.to_string(),
            path: root.key("build-type").to_string(),
            value,
            expected: BuildType::ALL
                .iter()
                .map(|build_type| build_type.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })?),
        None => None,
    };

    let github = match text("github")? {
        Some(value) => Some(GithubRepo::parse(&value).ok_or_else(|| {
            Error::parse(
                decoder.origin,
                root.key("github"),
                format!("invalid value \"{value}\", expected owner/repo"),
            )
        })?),
        None => None,
    };

    Ok(PackageHeader {
        name,
        version: text("version")?.unwrap_or_else(|| "0.0.0".to_string()),
        synopsis: text("synopsis")?,
        description: text("description")?,
        category: text("category")?,
        stability: text("stability")?,
        homepage: text("homepage")?,
        bug_reports: text("bug-reports")?,
        author: list("author")?,
        maintainer: list("maintainer")?,
        copyright: text("copyright")?,
        license: text("license")?,
        license_files: list("license-file")?,
        tested_with: list("tested-with")?,
        build_type,
        extra_source_files: list("extra-source-files")?,
        extra_doc_files: list("extra-doc-files")?,
        data_files: list("data-files")?,
        data_dir: text("data-dir")?,
        github,
        git: text("git")?,
        spec_version: text("spec-version")?,
    })
}
