//! Unknown-key detection
//!
//! Walks a raw document, records a warning for every mapping key that is not
//! recognized in its scope, and removes it. Keys starting with `_` are
//! dropped silently (they are the conventional home of YAML anchors).
//! Shapes are not checked here; decoding reports those.

use crate::fields::{self, Applies, FieldSpec};
use crate::value::{JsonPath, Value};
use crate::warning::Warnings;

/// The kind of mapping being scrubbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Top level of a manifest or defaults document
    Package,
    Library,
    /// Executable, test or benchmark
    Component,
    CustomSetup,
}

impl Scope {
    fn accepts(self, spec: &FieldSpec) -> bool {
        match (self, spec.applies) {
            (Scope::CustomSetup, _) => spec.key == fields::DEPENDENCIES,
            (_, Applies::Common) => true,
            (Scope::Library, Applies::Library | Applies::Modules) => true,
            (Scope::Component, Applies::Component | Applies::Modules) => true,
            _ => false,
        }
    }

    fn accepts_key(self, key: &str) -> bool {
        fields::lookup(key).is_some_and(|spec| self.accepts(spec))
    }
}

const FLAG_KEYS: &[&str] = &["description", "manual", "default"];

/// Remove unrecognized keys from a top-level document.
pub fn scrub(document: &mut Value, origin: &str, warnings: &mut Warnings) {
    scrub_as(document, Scope::Package, origin, warnings);
}

/// Remove unrecognized keys from a document of the given scope. Section
/// scopes are used for defaults documents referenced from inside a section.
pub fn scrub_as(document: &mut Value, scope: Scope, origin: &str, warnings: &mut Warnings) {
    let mut scrubber = Scrubber { origin, warnings };
    let root = JsonPath::root();
    match scope {
        Scope::Package => scrubber.package(document, &root),
        section => scrubber.section(document, &root, section),
    }
}

struct Scrubber<'a> {
    origin: &'a str,
    warnings: &'a mut Warnings,
}

impl Scrubber<'_> {
    fn package(&mut self, value: &mut Value, path: &JsonPath) {
        self.object(value, path, |scrubber, key, child, child_path| {
            match key {
                "flags" => scrubber.flags(child, child_path),
                "custom-setup" => scrubber.section(child, child_path, Scope::CustomSetup),
                "library" => scrubber.section(child, child_path, Scope::Library),
                "executable" => scrubber.section(child, child_path, Scope::Component),
                "internal-libraries" => scrubber.section_map(child, child_path, Scope::Library),
                "executables" | "tests" | "benchmarks" => {
                    scrubber.section_map(child, child_path, Scope::Component)
                }
                "when" => scrubber.conditionals(child, child_path, Scope::Package),
                _ => return is_package_key(key) || Scope::Package.accepts_key(key),
            }
            true
        });
    }

    fn section(&mut self, value: &mut Value, path: &JsonPath, scope: Scope) {
        self.object(value, path, |scrubber, key, child, child_path| match key {
            "defaults" => true,
            "verbatim" => scope != Scope::CustomSetup,
            "when" if scope != Scope::CustomSetup => {
                scrubber.conditionals(child, child_path, scope);
                true
            }
            _ => scope.accepts_key(key),
        });
    }

    fn section_map(&mut self, value: &mut Value, path: &JsonPath, scope: Scope) {
        if let Value::Object(sections) = value {
            for (name, section) in sections.iter_mut() {
                self.section(section, &path.key(name), scope);
            }
        }
    }

    fn flags(&mut self, value: &mut Value, path: &JsonPath) {
        if let Value::Object(flags) = value {
            for (name, flag) in flags.iter_mut() {
                self.object(flag, &path.key(name), |_, key, _, _| FLAG_KEYS.contains(&key));
            }
        }
    }

    /// `when` holds one conditional or a list of them.
    fn conditionals(&mut self, value: &mut Value, path: &JsonPath, scope: Scope) {
        match value {
            Value::Array(items) => {
                for (index, item) in items.iter_mut().enumerate() {
                    self.conditional(item, &path.index(index), scope);
                }
            }
            other => self.conditional(other, path, scope),
        }
    }

    fn conditional(&mut self, value: &mut Value, path: &JsonPath, scope: Scope) {
        self.object(value, path, |scrubber, key, child, child_path| match key {
            "condition" => true,
            "then" | "else" => {
                scrubber.branch(child, child_path, scope);
                true
            }
            _ => scrubber.branch_key(key, child, child_path, scope),
        });
    }

    fn branch(&mut self, value: &mut Value, path: &JsonPath, scope: Scope) {
        self.object(value, path, |scrubber, key, child, child_path| {
            scrubber.branch_key(key, child, child_path, scope)
        });
    }

    fn branch_key(&mut self, key: &str, child: &mut Value, path: &JsonPath, scope: Scope) -> bool {
        if key == "when" {
            self.conditionals(child, path, scope);
            return true;
        }
        scope.accepts_key(key)
    }

    /// Visit every key of an object. `keep` recurses into the child and says
    /// whether the key is recognized; unrecognized keys are reported and
    /// removed. Non-objects are left for the decoder to reject.
    fn object<F>(&mut self, value: &mut Value, path: &JsonPath, mut keep: F)
    where
        F: FnMut(&mut Self, &str, &mut Value, &JsonPath) -> bool,
    {
        let Value::Object(object) = value else {
            return;
        };
        let mut rejected = Vec::new();
        for (key, child) in object.iter_mut() {
            if key.starts_with('_') {
                rejected.push(key.clone());
                continue;
            }
            let child_path = path.key(key);
            if !keep(self, key, child, &child_path) {
                self.warnings.unrecognized(self.origin, &child_path);
                rejected.push(key.clone());
            }
        }
        if !rejected.is_empty() {
            object.retain(|key, _| !rejected.contains(key));
        }
    }
}

fn is_package_key(key: &str) -> bool {
    fields::PACKAGE_LIST_FIELDS.contains(&key)
        || fields::PACKAGE_TEXT_FIELDS.contains(&key)
        || fields::PACKAGE_STRUCTURE_FIELDS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn scrubbed(mut value: Value) -> (Value, Vec<String>) {
        let mut warnings = Warnings::new();
        scrub(&mut value, "package.yaml", &mut warnings);
        let messages = warnings.iter().map(ToString::to_string).collect();
        (value, messages)
    }

    #[test]
    fn unknown_top_level_key_is_reported_and_removed() {
        let (value, warnings) = scrubbed(json!({"name": "foo", "bar": 23}));
        assert_eq!(value, json!({"name": "foo"}));
        assert_eq!(warnings, vec!["package.yaml: Ignoring unrecognized field $.bar"]);
    }

    #[test]
    fn underscore_keys_are_dropped_silently() {
        let (value, warnings) = scrubbed(json!({"name": "foo", "_common": {"a": 1}}));
        assert_eq!(value, json!({"name": "foo"}));
        assert!(warnings.is_empty());
    }

    #[test]
    fn nested_conditional_paths_are_exact() {
        let (_, warnings) = scrubbed(json!({
            "when": [
                {"condition": "os(windows)", "dependencies": "Win32"},
                {"condition": "impl(ghc)", "baz": 1}
            ],
            "library": {
                "when": {
                    "condition": "flag(dev)",
                    "then": {"ghc-options": "-O0"},
                    "else": {"when": {"condition": "os(darwin)", "then": {}, "else": {"baz": 2}}}
                }
            }
        }));
        assert_eq!(
            warnings,
            vec![
                "package.yaml: Ignoring unrecognized field $.when[1].baz",
                "package.yaml: Ignoring unrecognized field $.library.when.else.when.else.baz",
            ]
        );
    }

    #[test]
    fn component_fields_are_not_library_fields() {
        let (value, warnings) = scrubbed(json!({
            "library": {"main": "Main.hs", "exposed-modules": ["Foo"]},
            "executables": {"app": {"main": "Main.hs", "exposed-modules": ["Foo"]}}
        }));
        assert_eq!(
            value,
            json!({
                "library": {"exposed-modules": ["Foo"]},
                "executables": {"app": {"main": "Main.hs"}}
            })
        );
        assert_eq!(
            warnings,
            vec![
                "package.yaml: Ignoring unrecognized field $.library.main",
                "package.yaml: Ignoring unrecognized field $.executables.app.exposed-modules",
            ]
        );
    }

    #[test]
    fn flags_and_custom_setup_have_closed_key_sets() {
        let (_, warnings) = scrubbed(json!({
            "flags": {"dev": {"manual": true, "default": false, "colour": "red"}},
            "custom-setup": {"dependencies": ["base"], "ghc-options": "-Wall"}
        }));
        assert_eq!(
            warnings,
            vec![
                "package.yaml: Ignoring unrecognized field $.flags.dev.colour",
                "package.yaml: Ignoring unrecognized field $.custom-setup.ghc-options",
            ]
        );
    }

    #[test]
    fn module_lists_are_not_global_fields() {
        let (_, warnings) = scrubbed(json!({"exposed-modules": ["Foo"], "source-dirs": "src"}));
        assert_eq!(
            warnings,
            vec!["package.yaml: Ignoring unrecognized field $.exposed-modules"]
        );
    }
}
