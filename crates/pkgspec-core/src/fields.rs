//! Known section fields
//!
//! One table drives unknown-key detection, decoding, merging and rendering.
//! Table order is the canonical render order inside a stanza.

use indexmap::IndexMap;
use std::fmt;

/// Value shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// Scalar or list of scalars, normalized to a list
    List,
    /// Package dependencies, list or object form
    Dependencies,
    /// Single scalar rendered as text
    Text,
    Bool,
}

/// How a field renders in the target manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// `field: value`
    Line,
    /// one item per line
    Lines,
    /// items joined by spaces on one line
    Words,
    /// one item per line with leading commas
    Commas,
    /// rendered through the module lists, never directly
    Modules,
}

/// Which sections recognize a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applies {
    /// every build section, the top level and conditionals
    Common,
    /// libraries and internal libraries
    Library,
    /// executables, tests and benchmarks
    Component,
    /// libraries and components
    Modules,
}

#[derive(Debug)]
pub struct FieldSpec {
    pub key: &'static str,
    pub cabal: &'static str,
    pub shape: FieldShape,
    pub style: Style,
    pub applies: Applies,
    /// entries are glob patterns expanded against the package root
    pub glob: bool,
}

const fn field(
    key: &'static str,
    cabal: &'static str,
    shape: FieldShape,
    style: Style,
    applies: Applies,
) -> FieldSpec {
    FieldSpec {
        key,
        cabal,
        shape,
        style,
        applies,
        glob: false,
    }
}

const fn globbed(key: &'static str) -> FieldSpec {
    FieldSpec {
        key,
        cabal: key,
        shape: FieldShape::List,
        style: Style::Lines,
        applies: Applies::Common,
        glob: true,
    }
}

use Applies::{Common, Component, Library, Modules};
use FieldShape::{Bool, Dependencies, List, Text};

pub const EXPOSED_MODULES: &str = "exposed-modules";
pub const OTHER_MODULES: &str = "other-modules";
pub const GENERATED_EXPOSED_MODULES: &str = "generated-exposed-modules";
pub const GENERATED_OTHER_MODULES: &str = "generated-other-modules";
pub const SOURCE_DIRS: &str = "source-dirs";
pub const DEPENDENCIES: &str = "dependencies";
pub const GHC_OPTIONS: &str = "ghc-options";
pub const MAIN: &str = "main";
pub const LANGUAGE: &str = "language";

pub static FIELDS: &[FieldSpec] = &[
    field("exposed", "exposed", Bool, Style::Line, Library),
    field("visibility", "visibility", Text, Style::Line, Library),
    field(MAIN, "main-is", Text, Style::Line, Component),
    field(EXPOSED_MODULES, "exposed-modules", List, Style::Modules, Library),
    field(OTHER_MODULES, "other-modules", List, Style::Modules, Modules),
    field(GENERATED_EXPOSED_MODULES, "exposed-modules", List, Style::Modules, Library),
    field(GENERATED_OTHER_MODULES, "other-modules", List, Style::Modules, Modules),
    field("reexported-modules", "reexported-modules", List, Style::Commas, Library),
    field("signatures", "signatures", List, Style::Lines, Library),
    field(SOURCE_DIRS, "hs-source-dirs", List, Style::Lines, Common),
    field("default-extensions", "default-extensions", List, Style::Lines, Common),
    field("other-extensions", "other-extensions", List, Style::Lines, Common),
    field(GHC_OPTIONS, "ghc-options", List, Style::Words, Common),
    field("ghc-prof-options", "ghc-prof-options", List, Style::Words, Common),
    field("ghc-shared-options", "ghc-shared-options", List, Style::Words, Common),
    field("ghcjs-options", "ghcjs-options", List, Style::Words, Common),
    field("cpp-options", "cpp-options", List, Style::Words, Common),
    field("cc-options", "cc-options", List, Style::Words, Common),
    globbed("c-sources"),
    field("cxx-options", "cxx-options", List, Style::Words, Common),
    globbed("cxx-sources"),
    globbed("js-sources"),
    field("extra-lib-dirs", "extra-lib-dirs", List, Style::Lines, Common),
    field("extra-libraries", "extra-libraries", List, Style::Lines, Common),
    field("extra-frameworks-dirs", "extra-frameworks-dirs", List, Style::Lines, Common),
    field("frameworks", "frameworks", List, Style::Lines, Common),
    field("include-dirs", "include-dirs", List, Style::Lines, Common),
    field("install-includes", "install-includes", List, Style::Lines, Common),
    field("ld-options", "ld-options", List, Style::Words, Common),
    field("pkg-config-dependencies", "pkgconfig-depends", List, Style::Commas, Common),
    field("build-tools", "build-tools", List, Style::Commas, Common),
    field(DEPENDENCIES, "build-depends", Dependencies, Style::Commas, Common),
    field("buildable", "buildable", Bool, Style::Line, Common),
    field(LANGUAGE, "default-language", Text, Style::Line, Common),
];

/// Package-level fields that hold lists; merged by concatenation.
pub static PACKAGE_LIST_FIELDS: &[&str] = &[
    "author",
    "maintainer",
    "license-file",
    "tested-with",
    "extra-source-files",
    "extra-doc-files",
    "data-files",
];

/// Package-level scalar fields.
pub static PACKAGE_TEXT_FIELDS: &[&str] = &[
    "name",
    "version",
    "synopsis",
    "description",
    "category",
    "stability",
    "homepage",
    "bug-reports",
    "copyright",
    "license",
    "build-type",
    "data-dir",
    "github",
    "git",
    "spec-version",
];

/// Keys with structure of their own at the package level.
pub static PACKAGE_STRUCTURE_FIELDS: &[&str] = &[
    "flags",
    "custom-setup",
    "library",
    "internal-libraries",
    "executable",
    "executables",
    "tests",
    "benchmarks",
    "verbatim",
    "defaults",
    "when",
];

pub fn lookup(key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.key == key)
}

/// A dependency entry: a package name with an optional version constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub constraint: Option<String>,
}

impl Dependency {
    /// Split `"base >=4 && <5"` or `"base>=4"` into name and constraint.
    pub fn parse(entry: &str) -> Self {
        let entry = entry.trim();
        let split = entry
            .find(|c: char| c.is_whitespace() || matches!(c, '<' | '>' | '=' | '^'))
            .unwrap_or(entry.len());
        let (name, rest) = entry.split_at(split);
        let rest = rest.trim();
        Self {
            name: name.to_string(),
            constraint: (!rest.is_empty()).then(|| rest.to_string()),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(constraint) => write!(f, "{} {}", self.name, constraint),
            None => f.write_str(&self.name),
        }
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    List(Vec<String>),
    Dependencies(Vec<Dependency>),
    Text(String),
    Bool(bool),
}

/// Ordered set of known fields for one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    values: IndexMap<&'static str, FieldValue>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: FieldValue) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.values.shift_remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.values.iter().map(|(key, value)| (*key, value))
    }

    /// The list stored under `key`, if the field is present.
    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.values.get(key) {
            Some(FieldValue::List(items)) => Some(items),
            _ => None,
        }
    }

    /// The list stored under `key`, empty when absent.
    pub fn list_or_empty(&self, key: &str) -> &[String] {
        self.list(key).unwrap_or(&[])
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(FieldValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn dependencies(&self) -> &[Dependency] {
        match self.values.get(DEPENDENCIES) {
            Some(FieldValue::Dependencies(deps)) => deps,
            _ => &[],
        }
    }

    /// Append items to a list field, creating it when absent.
    pub fn extend_list(&mut self, key: &'static str, items: impl IntoIterator<Item = String>) {
        let entry = self
            .values
            .entry(key)
            .or_insert_with(|| FieldValue::List(Vec::new()));
        if let FieldValue::List(list) = entry {
            list.extend(items);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("base", "base", None)]
    #[case("base >= 4 && < 5", "base", Some(">= 4 && < 5"))]
    #[case("text>=1.2", "text", Some(">=1.2"))]
    #[case("  containers ^>=0.6 ", "containers", Some("^>=0.6"))]
    fn parses_dependency_entries(
        #[case] entry: &str,
        #[case] name: &str,
        #[case] constraint: Option<&str>,
    ) {
        let dependency = Dependency::parse(entry);
        assert_eq!(dependency.name, name);
        assert_eq!(dependency.constraint.as_deref(), constraint);
    }

    #[test]
    fn every_key_is_unique() {
        for (index, spec) in FIELDS.iter().enumerate() {
            assert!(
                FIELDS[index + 1..].iter().all(|other| other.key != spec.key),
                "duplicate field {}",
                spec.key
            );
        }
    }

    #[test]
    fn extend_list_creates_and_appends() {
        let mut fields = FieldSet::new();
        fields.extend_list(OTHER_MODULES, ["Foo".to_string()]);
        fields.extend_list(OTHER_MODULES, ["Bar".to_string()]);
        assert_eq!(fields.list_or_empty(OTHER_MODULES), ["Foo", "Bar"]);
    }
}
