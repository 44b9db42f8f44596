//! Module inference
//!
//! Source directories are scanned for Haskell sources and every module not
//! declared anywhere in the section (explicit lists, generated lists, the
//! main module, any conditional branch) is assigned to `exposed-modules` or
//! `other-modules`. Branches with their own `source-dirs` infer their own
//! `other-modules`.

use crate::conditional::{ConditionalNode, ConditionalTree};
use crate::error::Result;
use crate::fields::{self, FieldSet};
use crate::merge::is_module_component;
use crate::package::{CabalVersion, Modules, Package, Section, SectionKind};
use crate::render::FormattingHints;
use pkgspec_fs::{ListFiles, NormalizedPath};
use std::collections::HashSet;

/// Extensions recognized as Haskell module sources.
pub const SOURCE_EXTENSIONS: &[&str] = &["hs", "lhs", "chs", "hsc", "y", "ly", "x"];

/// Knobs for inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceOptions {
    /// Section kinds that get a `Paths_<package>` module whenever their
    /// `other-modules` is left undeclared.
    pub paths_module: Vec<SectionKind>,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            paths_module: SectionKind::ALL.to_vec(),
        }
    }
}

impl InferenceOptions {
    pub fn without_paths_module() -> Self {
        Self {
            paths_module: Vec::new(),
        }
    }
}

/// Module lists a section declares itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitModules {
    pub exposed: Option<Vec<String>>,
    pub other: Option<Vec<String>>,
    pub generated_exposed: Vec<String>,
    pub generated_other: Vec<String>,
    pub main: Option<String>,
}

impl ExplicitModules {
    pub fn from_fields(set: &FieldSet) -> Self {
        Self {
            exposed: set.list(fields::EXPOSED_MODULES).map(<[String]>::to_vec),
            other: set.list(fields::OTHER_MODULES).map(<[String]>::to_vec),
            generated_exposed: set.list_or_empty(fields::GENERATED_EXPOSED_MODULES).to_vec(),
            generated_other: set.list_or_empty(fields::GENERATED_OTHER_MODULES).to_vec(),
            main: set.text(fields::MAIN).and_then(module_of_path),
        }
    }

    fn all(&self) -> impl Iterator<Item = &String> {
        self.exposed
            .iter()
            .flatten()
            .chain(self.other.iter().flatten())
            .chain(&self.generated_exposed)
            .chain(&self.generated_other)
            .chain(&self.main)
    }
}

/// Dotted module name of a source path relative to its source directory,
/// e.g. `Foo/Bar.hs` -> `Foo.Bar`. `None` for non-sources and for paths with
/// components that are not valid module name components.
pub fn module_of_path(path: &str) -> Option<String> {
    let (stem, extension) = path.rsplit_once('.')?;
    if !SOURCE_EXTENSIONS.contains(&extension) {
        return None;
    }
    let components: Vec<&str> = stem.split('/').collect();
    if !components.iter().all(|part| is_module_component(part)) {
        return None;
    }
    Some(components.join("."))
}

/// `Paths_<name>` with `-` replaced by `_`.
pub fn paths_module_name(package: &str) -> String {
    format!("Paths_{}", package.replace('-', "_"))
}

/// Runs inference over a package.
pub struct Inference<'a> {
    files: &'a dyn ListFiles,
    root: &'a NormalizedPath,
    options: &'a InferenceOptions,
    paths_module: String,
    autogen_paths: bool,
}

impl<'a> Inference<'a> {
    pub fn new(
        files: &'a dyn ListFiles,
        root: &'a NormalizedPath,
        options: &'a InferenceOptions,
        package_name: &str,
        cabal_version: &CabalVersion,
    ) -> Self {
        Self {
            files,
            root,
            options,
            paths_module: paths_module_name(package_name),
            autogen_paths: *cabal_version >= CabalVersion::new(&[2, 0]),
        }
    }

    /// Every module found in `source_dirs`, scan order, first occurrence wins.
    pub fn discover(&self, source_dirs: &[String]) -> Result<Vec<String>> {
        let mut modules: Vec<String> = Vec::new();
        for dir in source_dirs {
            let listing = self.files.list_files(&self.root.join(dir))?;
            for module in listing.iter().filter_map(|path| module_of_path(path)) {
                if !modules.contains(&module) {
                    modules.push(module);
                }
            }
        }
        Ok(modules)
    }

    /// Decide the module lists of one section and fill branch-local
    /// `other-modules` in its conditional tree.
    pub fn infer_section(&self, section: &mut Section, module_order: Option<&[String]>) -> Result<()> {
        if !section.kind.has_modules() {
            return Ok(());
        }
        let explicit = ExplicitModules::from_fields(&section.fields);

        let mut excluded: HashSet<String> = explicit.all().cloned().collect();
        excluded.extend(declared_in_tree(&section.conditionals));
        excluded.extend(self.discovered_in_branches(&section.conditionals)?);

        let source_dirs = section.fields.list_or_empty(fields::SOURCE_DIRS).to_vec();
        let mut unclaimed: Vec<String> = self
            .discover(&source_dirs)?
            .into_iter()
            .filter(|module| !excluded.contains(module))
            .collect();
        if let Some(order) = module_order {
            sort_by_observed(&mut unclaimed, order);
        }

        let modules = self.infer(section.kind, &explicit, unclaimed, &excluded);
        tracing::debug!(
            section = %section.title(),
            exposed = modules.exposed.len(),
            other = modules.other.len(),
            "inferred modules"
        );

        let outer: HashSet<String> = modules
            .exposed
            .iter()
            .chain(&modules.other)
            .chain(explicit.all())
            .cloned()
            .collect();
        self.infer_branches(&mut section.conditionals, &outer)?;
        section.modules = modules;
        Ok(())
    }

    /// Apply the assignment policy to the unclaimed modules.
    pub fn infer(
        &self,
        kind: SectionKind,
        explicit: &ExplicitModules,
        unclaimed: Vec<String>,
        declared: &HashSet<String>,
    ) -> Modules {
        let (inferred_exposed, inferred_other) = match (&explicit.exposed, &explicit.other) {
            (Some(_), Some(_)) => (None, None),
            (Some(_), None) => (None, Some(unclaimed)),
            (None, Some(_)) if kind.is_library() => (Some(unclaimed), None),
            (None, Some(_)) => (None, None),
            (None, None) if kind.is_library() => (Some(unclaimed), None),
            (None, None) => (None, Some(unclaimed)),
        };

        let mut autogen: Vec<String> = explicit
            .generated_exposed
            .iter()
            .chain(&explicit.generated_other)
            .cloned()
            .collect();

        // Paths joins `other` unless the section declared `other` itself.
        let paths_slot = explicit.other.is_none();
        let mut other = match inferred_other {
            Some(inferred) => inferred,
            None => explicit.other.clone().unwrap_or_default(),
        };
        if paths_slot
            && self.options.paths_module.contains(&kind)
            && !declared.contains(&self.paths_module)
            && !other.contains(&self.paths_module)
        {
            other.push(self.paths_module.clone());
            if self.autogen_paths {
                autogen.push(self.paths_module.clone());
            }
        }
        other.extend(explicit.generated_other.iter().cloned());

        let mut exposed = match inferred_exposed {
            Some(inferred) => inferred,
            None => explicit.exposed.clone().unwrap_or_default(),
        };
        exposed.extend(explicit.generated_exposed.iter().cloned());

        Modules {
            exposed,
            other,
            autogen,
        }
    }

    /// Modules reachable from branch-local `source-dirs`, at any depth.
    fn discovered_in_branches(&self, tree: &ConditionalTree) -> Result<Vec<String>> {
        let mut found = Vec::new();
        for set in tree.all_field_sets() {
            if let Some(dirs) = set.list(fields::SOURCE_DIRS) {
                found.extend(self.discover(dirs)?);
            }
        }
        Ok(found)
    }

    fn infer_branches(&self, tree: &mut ConditionalTree, outer: &HashSet<String>) -> Result<()> {
        for node in &mut tree.nodes {
            if let ConditionalNode::Branch {
                then, otherwise, ..
            } = node
            {
                self.infer_arm(then, outer)?;
                if let Some(otherwise) = otherwise {
                    self.infer_arm(otherwise, outer)?;
                }
            }
        }
        Ok(())
    }

    fn infer_arm(&self, arm: &mut ConditionalTree, outer: &HashSet<String>) -> Result<()> {
        let declared = declared_in_tree(arm);
        let mut claimed = outer.clone();
        claimed.extend(declared.iter().cloned());

        let local_dirs = arm
            .own_fields()
            .and_then(|own| own.list(fields::SOURCE_DIRS))
            .map(<[String]>::to_vec);
        if let Some(dirs) = local_dirs {
            let inferred: Vec<String> = self
                .discover(&dirs)?
                .into_iter()
                .filter(|module| !claimed.contains(module))
                .collect();
            if let Some(own) = arm.own_fields_mut() {
                if !own.contains(fields::OTHER_MODULES) && !inferred.is_empty() {
                    claimed.extend(inferred.iter().cloned());
                    own.extend_list(fields::OTHER_MODULES, inferred);
                }
            }
        }
        self.infer_branches(arm, &claimed)
    }
}

/// Every module named by a module list anywhere in `tree`.
fn declared_in_tree(tree: &ConditionalTree) -> Vec<String> {
    let keys = [
        fields::EXPOSED_MODULES,
        fields::OTHER_MODULES,
        fields::GENERATED_EXPOSED_MODULES,
        fields::GENERATED_OTHER_MODULES,
    ];
    tree.all_field_sets()
        .into_iter()
        .flat_map(|set| keys.iter().flat_map(move |key| set.list_or_empty(key)))
        .cloned()
        .collect()
}

/// Stable re-order: modules seen in `order` first, in that order, then the
/// rest in scan order.
pub fn sort_by_observed(modules: &mut [String], order: &[String]) {
    modules.sort_by_key(|module| {
        order
            .iter()
            .position(|seen| seen == module)
            .unwrap_or(usize::MAX)
    });
}

/// Infer the modules of every section of `package`.
pub fn infer_package(
    package: &mut Package,
    root: &NormalizedPath,
    files: &dyn ListFiles,
    options: &InferenceOptions,
    hints: &FormattingHints,
) -> Result<()> {
    let cabal_version = package.cabal_version();
    let inference = Inference::new(files, root, options, &package.header.name, &cabal_version);
    for section in &mut package.sections {
        let order = hints.module_order.get(&section.title()).map(Vec::as_slice);
        inference.infer_section(section, order)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PackageConfig;
    use crate::merge::merge_package;
    use pkgspec_fs::MemoryFiles;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn inferred(value: serde_json::Value, files: &[&str]) -> Package {
        inferred_with(value, files, &InferenceOptions::default())
    }

    fn inferred_with(value: serde_json::Value, files: &[&str], options: &InferenceOptions) -> Package {
        let mut package = merge_package(PackageConfig::decode(&value, "package.yaml").unwrap());
        let files = MemoryFiles::from_paths(files);
        infer_package(
            &mut package,
            &NormalizedPath::new("."),
            &files,
            options,
            &FormattingHints::default(),
        )
        .unwrap();
        package
    }

    #[rstest]
    #[case("Foo.hs", Some("Foo"))]
    #[case("Foo/Bar.lhs", Some("Foo.Bar"))]
    #[case("Parser.y", Some("Parser"))]
    #[case("Lexer.x", Some("Lexer"))]
    #[case("foo/Bar.hs", None)]
    #[case("Foo.txt", None)]
    #[case("Foo-Bar.hs", None)]
    fn maps_paths_to_modules(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(module_of_path(path).as_deref(), expected);
    }

    #[test]
    fn exposed_given_rest_becomes_other_with_paths_module() {
        let package = inferred(
            json!({"name": "my-pkg", "library": {"source-dirs": "src", "exposed-modules": "Foo"}}),
            &["src/Bar.hs", "src/Foo.hs"],
        );
        let modules = &package.sections[0].modules;
        assert_eq!(modules.exposed, vec!["Foo"]);
        assert_eq!(modules.other, vec!["Bar", "Paths_my_pkg"]);
        assert!(modules.autogen.is_empty());
    }

    #[test]
    fn nothing_given_library_exposes_everything() {
        let package = inferred(
            json!({"name": "foo", "library": {"source-dirs": "src"}}),
            &["src/A.hs", "src/B/C.hs"],
        );
        let modules = &package.sections[0].modules;
        assert_eq!(modules.exposed, vec!["A", "B.C"]);
        assert_eq!(modules.other, vec!["Paths_foo"]);
        assert!(modules.autogen.is_empty());
    }

    #[test]
    fn nothing_given_library_gets_autogen_paths_module_from_cabal_2() {
        let package = inferred(
            json!({"name": "foo", "library": {
                "source-dirs": "src",
                "generated-exposed-modules": "Gen"
            }}),
            &["src/A.hs"],
        );
        let modules = &package.sections[0].modules;
        assert_eq!(modules.exposed, vec!["A", "Gen"]);
        assert_eq!(modules.other, vec!["Paths_foo"]);
        assert_eq!(modules.autogen, vec!["Gen", "Paths_foo"]);
    }

    #[test]
    fn other_given_rest_becomes_exposed() {
        let package = inferred(
            json!({"name": "foo", "library": {"source-dirs": "src", "other-modules": "B"}}),
            &["src/A.hs", "src/B.hs"],
        );
        let modules = &package.sections[0].modules;
        assert_eq!(modules.exposed, vec!["A"]);
        assert_eq!(modules.other, vec!["B"]);
    }

    #[test]
    fn executables_infer_other_modules_and_skip_main() {
        let package = inferred(
            json!({"name": "foo", "executables": {"app": {"main": "Main.hs", "source-dirs": "app"}}}),
            &["app/Main.hs", "app/Util.hs"],
        );
        assert_eq!(package.sections[0].modules.other, vec!["Util", "Paths_foo"]);
    }

    #[test]
    fn duplicate_sources_collapse_to_first() {
        let package = inferred(
            json!({"name": "foo", "library": {"source-dirs": ["src", "gen"]}}),
            &["gen/Foo.hs", "src/Foo.hsc", "src/Foo.hs"],
        );
        assert_eq!(package.sections[0].modules.exposed, vec!["Foo"]);
    }

    #[test]
    fn paths_module_can_be_disabled() {
        let package = inferred_with(
            json!({"name": "foo", "executables": {"app": {"main": "Main.hs", "source-dirs": "app"}}}),
            &["app/Main.hs", "app/Util.hs"],
            &InferenceOptions::without_paths_module(),
        );
        assert_eq!(package.sections[0].modules.other, vec!["Util"]);
    }

    #[test]
    fn generated_modules_are_appended_and_autogen() {
        let package = inferred(
            json!({"name": "foo", "library": {
                "source-dirs": "src",
                "exposed-modules": "Foo",
                "generated-other-modules": "Build_foo"
            }}),
            &["src/Foo.hs", "src/Build_foo.hs", "src/Bar.hs"],
        );
        let modules = &package.sections[0].modules;
        assert_eq!(modules.other, vec!["Bar", "Paths_foo", "Build_foo"]);
        assert_eq!(modules.autogen, vec!["Build_foo", "Paths_foo"]);
    }

    #[test]
    fn modules_declared_in_conditionals_are_excluded_at_any_depth() {
        let package = inferred(
            json!({"name": "foo", "library": {
                "source-dirs": "src",
                "when": {"condition": "os(windows)", "then": {}, "else": {
                    "when": {"condition": "os(darwin)", "other-modules": "Deep"}
                }}
            }}),
            &["src/Deep.hs", "src/Top.hs"],
        );
        assert_eq!(package.sections[0].modules.exposed, vec!["Top"]);
    }

    #[test]
    fn branch_source_dirs_infer_branch_other_modules() {
        let package = inferred(
            json!({"name": "foo", "library": {
                "source-dirs": "src",
                "when": {
                    "condition": "os(windows)",
                    "then": {"source-dirs": "win"},
                    "else": {"source-dirs": "unix"}
                }
            }}),
            &["src/Lib.hs", "win/Platform.hs", "unix/Platform.hs", "unix/Posix.hs"],
        );
        let library = &package.sections[0];
        assert_eq!(library.modules.exposed, vec!["Lib"]);
        let ConditionalNode::Branch { then, otherwise, .. } = &library.conditionals.nodes[0] else {
            panic!("expected a branch");
        };
        assert_eq!(
            then.own_fields().unwrap().list_or_empty(fields::OTHER_MODULES),
            ["Platform"]
        );
        assert_eq!(
            otherwise.as_ref().unwrap().own_fields().unwrap().list_or_empty(fields::OTHER_MODULES),
            ["Platform", "Posix"]
        );
    }

    #[test]
    fn observed_order_reorders_inferred_modules() {
        let mut modules = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        sort_by_observed(&mut modules, &["C".to_string(), "A".to_string()]);
        assert_eq!(modules, vec!["C", "A", "B"]);
    }
}
