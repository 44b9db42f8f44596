//! The merged package, ready for inference and rendering

use crate::conditional::ConditionalTree;
use crate::config::{BuildType, FlagConfig, PackageHeader, Verbatim};
use crate::fields::{self, FieldSet, FieldValue};
use indexmap::IndexMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    CustomSetup,
    Library,
    InternalLibrary,
    Executable,
    Test,
    Benchmark,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        Self::CustomSetup,
        Self::Library,
        Self::InternalLibrary,
        Self::Executable,
        Self::Test,
        Self::Benchmark,
    ];

    /// Stanza keyword in the rendered manifest.
    pub fn stanza(self) -> &'static str {
        match self {
            Self::CustomSetup => "custom-setup",
            Self::Library | Self::InternalLibrary => "library",
            Self::Executable => "executable",
            Self::Test => "test-suite",
            Self::Benchmark => "benchmark",
        }
    }

    pub fn is_library(self) -> bool {
        matches!(self, Self::Library | Self::InternalLibrary)
    }

    /// Sections built from Haskell modules.
    pub fn has_modules(self) -> bool {
        self != Self::CustomSetup
    }
}

/// Modules decided by inference, final and in render order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modules {
    pub exposed: Vec<String>,
    pub other: Vec<String>,
    pub autogen: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    /// `None` only for the main library and custom-setup
    pub name: Option<String>,
    pub fields: FieldSet,
    pub conditionals: ConditionalTree,
    pub verbatim: Option<Verbatim>,
    pub modules: Modules,
}

impl Section {
    /// The stanza header line, e.g. `test-suite spec`.
    pub fn title(&self) -> String {
        match &self.name {
            Some(name) => format!("{} {}", self.kind.stanza(), name),
            None => self.kind.stanza().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRepository {
    pub location: String,
    pub subdir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub header: PackageHeader,
    pub build_type: BuildType,
    pub source_repository: Option<SourceRepository>,
    pub flags: IndexMap<String, FlagConfig>,
    /// custom-setup, library, internal libraries, executables, tests, benchmarks
    pub sections: Vec<Section>,
    pub verbatim: Option<Verbatim>,
}

/// A dotted Cabal spec version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CabalVersion(pub Vec<u32>);

impl CabalVersion {
    pub fn new(components: &[u32]) -> Self {
        Self(components.to_vec())
    }

    /// Parse `1.12` or `>= 1.10`; non-numeric input yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let digits = text.trim().trim_start_matches(|c: char| !c.is_ascii_digit());
        let components = digits
            .split('.')
            .map(|part| part.trim().parse::<u32>().ok())
            .collect::<Option<Vec<_>>>()?;
        Some(Self(components))
    }
}

impl fmt::Display for CabalVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

impl Package {
    /// Sections of one kind, in declaration order.
    pub fn sections_of(&self, kind: SectionKind) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |section| section.kind == kind)
    }

    /// Lowest spec version able to express every feature in use.
    pub fn cabal_version(&self) -> CabalVersion {
        let mut version = CabalVersion::new(&[1, 12]);
        let mut require = |components: &[u32]| {
            let needed = CabalVersion::new(components);
            if needed > version {
                version = needed;
            }
        };

        if !self.header.extra_doc_files.is_empty() {
            require(&[1, 18]);
        }
        if self.header.license_files.len() > 1 {
            require(&[1, 20]);
        }
        for section in &self.sections {
            match section.kind {
                SectionKind::CustomSetup => require(&[1, 24]),
                SectionKind::InternalLibrary => require(&[2, 0]),
                _ => {}
            }
            let field_sets =
                std::iter::once(&section.fields).chain(section.conditionals.all_field_sets());
            for set in field_sets {
                if has_entries(set, "reexported-modules") {
                    require(&[1, 22]);
                }
                if has_entries(set, fields::GENERATED_EXPOSED_MODULES)
                    || has_entries(set, fields::GENERATED_OTHER_MODULES)
                    || has_entries(set, "signatures")
                {
                    require(&[2, 0]);
                }
                if set.contains("visibility") {
                    require(&[3, 0]);
                }
            }
        }
        version
    }
}

fn has_entries(fields: &FieldSet, key: &str) -> bool {
    matches!(fields.get(key), Some(FieldValue::List(items)) if !items.is_empty())
}
