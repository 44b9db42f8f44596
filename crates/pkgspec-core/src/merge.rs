//! Global-into-section merging
//!
//! Top-level fields apply to every build section. Precedence, lowest first:
//! inherited defaults (already spliced into the document), global fields,
//! section fields; verbatim overrides are applied later at render time.

use crate::conditional::ConditionalTree;
use crate::config::{BuildType, PackageConfig, SectionConfig};
use crate::fields::{self, FieldSet, FieldValue};
use crate::package::{Modules, Package, Section, SectionKind, SourceRepository};

/// `default-language` when none is given.
pub const DEFAULT_LANGUAGE: &str = "Haskell2010";

/// Merge a section's fields over the global ones.
///
/// Lists concatenate global first, duplicates kept. Scalars are replaced by
/// the section's value.
pub fn merge_fields(global: &FieldSet, section: &FieldSet) -> FieldSet {
    let mut merged = global.clone();
    for (key, value) in section.iter() {
        let combined = match (merged.get(key), value) {
            (Some(FieldValue::List(inherited)), FieldValue::List(own)) => {
                FieldValue::List(inherited.iter().chain(own).cloned().collect())
            }
            (Some(FieldValue::Dependencies(inherited)), FieldValue::Dependencies(own)) => {
                FieldValue::Dependencies(inherited.iter().chain(own).cloned().collect())
            }
            _ => value.clone(),
        };
        merged.insert(key, combined);
    }
    merged
}

/// Turn a decoded configuration into a package with one entry per section.
pub fn merge_package(config: PackageConfig) -> Package {
    let PackageConfig {
        mut header,
        global,
        flags,
        custom_setup,
        library,
        internal_libraries,
        executables,
        tests,
        benchmarks,
        verbatim,
    } = config;

    let mut sections = Vec::new();
    if let Some(setup) = custom_setup {
        sections.push(Section {
            kind: SectionKind::CustomSetup,
            name: None,
            fields: setup.fields,
            conditionals: ConditionalTree::new(),
            verbatim: setup.verbatim,
            modules: Modules::default(),
        });
    }
    if let Some(library) = library {
        sections.push(build_section(&global, SectionKind::Library, None, library));
    }
    let named = [
        (SectionKind::InternalLibrary, internal_libraries),
        (SectionKind::Executable, executables),
        (SectionKind::Test, tests),
        (SectionKind::Benchmark, benchmarks),
    ];
    for (kind, entries) in named {
        for (name, section) in entries {
            sections.push(build_section(&global, kind, Some(name), section));
        }
    }

    let source_repository = match (&header.github, &header.git) {
        (Some(github), _) => {
            let url = github.url();
            header.homepage.get_or_insert_with(|| format!("{url}#readme"));
            header.bug_reports.get_or_insert_with(|| format!("{url}/issues"));
            Some(SourceRepository {
                location: url,
                subdir: github.subdir.clone(),
            })
        }
        (None, Some(git)) => Some(SourceRepository {
            location: git.clone(),
            subdir: None,
        }),
        (None, None) => None,
    };

    let build_type = header.build_type.unwrap_or(
        if sections.iter().any(|section| section.kind == SectionKind::CustomSetup) {
            BuildType::Custom
        } else {
            BuildType::Simple
        },
    );

    tracing::debug!(
        package = %header.name,
        sections = sections.len(),
        "merged global fields into sections"
    );

    Package {
        header,
        build_type,
        source_repository,
        flags,
        sections,
        verbatim,
    }
}

fn build_section(
    global: &SectionConfig,
    kind: SectionKind,
    name: Option<String>,
    section: SectionConfig,
) -> Section {
    let mut fields = merge_fields(&global.fields, &section.fields);
    let mut conditionals = global.conditionals.clone().concat(section.conditionals);

    if !kind.is_library() {
        expand_main_module(&mut fields);
        conditionals.for_each_field_set_mut(&mut expand_main_module);
    }
    if !fields.contains(fields::LANGUAGE) {
        fields.insert(fields::LANGUAGE, FieldValue::Text(DEFAULT_LANGUAGE.to_string()));
    }

    Section {
        kind,
        name,
        fields,
        conditionals,
        verbatim: section.verbatim,
        modules: Modules::default(),
    }
}

/// `main: Foo.Bar` names a module: it becomes `main-is: Foo/Bar.hs` plus
/// `-main-is Foo.Bar`. A file name is left alone.
fn expand_main_module(fields: &mut FieldSet) {
    let Some(main) = fields.text(fields::MAIN) else {
        return;
    };
    if !is_module_name(main) {
        return;
    }
    let module = main.to_string();
    let file = format!("{}.hs", module.replace('.', "/"));
    fields.insert(fields::MAIN, FieldValue::Text(file));
    if module != "Main" {
        fields.extend_list(fields::GHC_OPTIONS, [format!("-main-is {module}")]);
    }
}

/// `Foo.Bar` style: dot-separated components starting with an uppercase
/// letter. `Main.hs` fails because `hs` is lowercase.
pub fn is_module_name(text: &str) -> bool {
    !text.is_empty() && text.split('.').all(is_module_component)
}

pub fn is_module_component(part: &str) -> bool {
    let mut chars = part.chars();
    chars.next().is_some_and(|first| first.is_ascii_uppercase())
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '\'')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PackageConfig;
    use crate::fields::Dependency;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn package(value: serde_json::Value) -> Package {
        merge_package(PackageConfig::decode(&value, "package.yaml").unwrap())
    }

    #[test]
    fn section_scalar_wins_and_lists_put_global_first() {
        let package = package(json!({
            "name": "foo",
            "language": "Haskell98",
            "ghc-options": "-Wall",
            "dependencies": "base",
            "library": {"language": "GHC2021", "ghc-options": "-O2", "dependencies": "text"}
        }));
        let library = &package.sections[0].fields;
        assert_eq!(library.text("language"), Some("GHC2021"));
        assert_eq!(library.list_or_empty("ghc-options"), ["-Wall", "-O2"]);
        let names: Vec<&str> = library.dependencies().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["base", "text"]);
    }

    #[test]
    fn duplicate_dependencies_are_kept() {
        let package = package(json!({
            "name": "foo",
            "dependencies": "base",
            "executables": {"app": {"main": "Main.hs", "dependencies": "base"}}
        }));
        assert_eq!(
            package.sections[0].fields.dependencies(),
            [
                Dependency { name: "base".into(), constraint: None },
                Dependency { name: "base".into(), constraint: None },
            ]
        );
    }

    #[test]
    fn global_conditionals_come_first() {
        let package = package(json!({
            "name": "foo",
            "when": {"condition": "os(windows)", "cpp-options": "-DWIN"},
            "library": {"when": {"condition": "flag(dev)", "ghc-options": "-O0"}}
        }));
        let conditions: Vec<&str> = package.sections[0]
            .conditionals
            .nodes
            .iter()
            .filter_map(|node| match node {
                crate::conditional::ConditionalNode::Branch { condition, .. } => Some(condition.as_str()),
                crate::conditional::ConditionalNode::Leaf(_) => None,
            })
            .collect();
        assert_eq!(conditions, vec!["os(windows)", "flag(dev)"]);
    }

    #[test]
    fn custom_setup_gets_no_global_fields() {
        let package = package(json!({
            "name": "foo",
            "dependencies": "base",
            "custom-setup": {"dependencies": "Cabal"}
        }));
        let setup = &package.sections[0];
        assert_eq!(setup.kind, SectionKind::CustomSetup);
        assert_eq!(setup.fields.dependencies().len(), 1);
        assert_eq!(package.build_type, BuildType::Custom);
    }

    #[test]
    fn main_module_form_expands() {
        let package = package(json!({
            "name": "foo",
            "executables": {
                "a": {"main": "Foo.Bar"},
                "b": {"main": "Main"},
                "c": {"main": "app/Main.hs"}
            }
        }));
        let a = &package.sections[0].fields;
        assert_eq!(a.text("main"), Some("Foo/Bar.hs"));
        assert_eq!(a.list_or_empty("ghc-options"), ["-main-is Foo.Bar"]);
        let b = &package.sections[1].fields;
        assert_eq!(b.text("main"), Some("Main.hs"));
        assert!(!b.contains("ghc-options"));
        assert_eq!(package.sections[2].fields.text("main"), Some("app/Main.hs"));
    }

    #[test]
    fn language_defaults_to_haskell2010() {
        let package = package(json!({"name": "foo", "library": {}}));
        assert_eq!(package.sections[0].fields.text("language"), Some("Haskell2010"));
    }

    #[test]
    fn github_fills_homepage_and_bug_reports() {
        let package = package(json!({"name": "foo", "github": "sol/foo"}));
        assert_eq!(
            package.header.homepage.as_deref(),
            Some("https://github.com/sol/foo#readme")
        );
        assert_eq!(
            package.header.bug_reports.as_deref(),
            Some("https://github.com/sol/foo/issues")
        );
        assert_eq!(
            package.source_repository.unwrap().location,
            "https://github.com/sol/foo"
        );
    }
}
