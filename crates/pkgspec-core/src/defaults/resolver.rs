//! Recursive defaults resolution

use super::{DefaultsCache, DefaultsRef, Fetch, Location, merge_documents};
use crate::config::PackageConfig;
use crate::error::{Error, Result};
use crate::schema::{self, Scope};
use crate::value::{self, JsonPath, Value};
use crate::warning::Warnings;

/// Section keys holding a single section, with their scope.
const SINGLE_SECTIONS: &[(&str, Scope)] = &[
    ("custom-setup", Scope::CustomSetup),
    ("library", Scope::Library),
    ("executable", Scope::Component),
];

/// Section keys holding a map of named sections, with their scope.
const NAMED_SECTIONS: &[(&str, Scope)] = &[
    ("internal-libraries", Scope::Library),
    ("executables", Scope::Component),
    ("tests", Scope::Component),
    ("benchmarks", Scope::Component),
];

/// Splices `defaults` documents into the documents that reference them.
///
/// Cycle detection follows the current depth-first path only: a document
/// reachable along two disjoint paths is resolved twice, which is not a
/// cycle.
pub struct DefaultsResolver<'a> {
    fetch: &'a dyn Fetch,
    cache: &'a mut DefaultsCache,
}

impl<'a> DefaultsResolver<'a> {
    pub fn new(fetch: &'a dyn Fetch, cache: &'a mut DefaultsCache) -> Self {
        Self { fetch, cache }
    }

    /// Resolve every `defaults` reference of a root manifest.
    pub fn resolve_manifest(
        &mut self,
        document: Value,
        location: &Location,
        warnings: &mut Warnings,
    ) -> Result<Value> {
        let mut visited = vec![location.canonical_id()];
        self.expand(document, location, Scope::Package, &mut visited, warnings)
    }

    /// Expand the `defaults` of `document`, which lives at `location`.
    ///
    /// Section-level references are expanded first, then the document's own
    /// references; later references override earlier ones and the
    /// document's own fields override all of them.
    pub fn expand(
        &mut self,
        document: Value,
        location: &Location,
        scope: Scope,
        visited: &mut Vec<String>,
        warnings: &mut Warnings,
    ) -> Result<Value> {
        let Value::Object(mut object) = document else {
            return Ok(document);
        };
        let origin = location.canonical_id();

        if scope == Scope::Package {
            for (key, section_scope) in SINGLE_SECTIONS {
                if let Some(section) = object.get_mut(*key) {
                    let path = JsonPath::root().key(key);
                    let taken = std::mem::take(section);
                    *section = self.expand_section(
                        taken,
                        location,
                        *section_scope,
                        &path,
                        visited,
                        warnings,
                    )?;
                }
            }
            for (key, section_scope) in NAMED_SECTIONS {
                if let Some(Value::Object(sections)) = object.get_mut(*key) {
                    for (name, section) in sections.iter_mut() {
                        let path = JsonPath::root().key(key).key(name);
                        let taken = std::mem::take(section);
                        *section = self.expand_section(
                            taken,
                            location,
                            *section_scope,
                            &path,
                            visited,
                            warnings,
                        )?;
                    }
                }
            }
        }

        let Some(references) = take_defaults(&mut object) else {
            return Ok(Value::Object(object));
        };
        let references =
            DefaultsRef::parse_all(&references, &origin, &JsonPath::root().key("defaults"))?;
        self.apply(Value::Object(object), &references, location, scope, visited, warnings)
    }

    /// Expand the `defaults` of one section of a package document.
    fn expand_section(
        &mut self,
        section: Value,
        location: &Location,
        scope: Scope,
        path: &JsonPath,
        visited: &mut Vec<String>,
        warnings: &mut Warnings,
    ) -> Result<Value> {
        let Value::Object(mut object) = section else {
            return Ok(section);
        };
        let Some(references) = take_defaults(&mut object) else {
            return Ok(Value::Object(object));
        };
        let origin = location.canonical_id();
        let references = DefaultsRef::parse_all(&references, &origin, &path.key("defaults"))?;
        self.apply(Value::Object(object), &references, location, scope, visited, warnings)
    }

    fn apply(
        &mut self,
        document: Value,
        references: &[DefaultsRef],
        location: &Location,
        scope: Scope,
        visited: &mut Vec<String>,
        warnings: &mut Warnings,
    ) -> Result<Value> {
        let mut base = Value::Object(Default::default());
        for reference in references {
            let inherited = self.resolve(reference, location, scope, visited, warnings)?;
            base = merge_documents(base, inherited, scope);
        }
        Ok(merge_documents(base, document, scope))
    }

    /// Fetch, scrub and fully expand the document `reference` points at,
    /// as seen from the document at `from`.
    pub fn resolve(
        &mut self,
        reference: &DefaultsRef,
        from: &Location,
        scope: Scope,
        visited: &mut Vec<String>,
        warnings: &mut Warnings,
    ) -> Result<Value> {
        let location = from.locate(reference);
        let id = location.canonical_id();

        if let Some(start) = visited.iter().position(|seen| *seen == id) {
            let mut cycle = visited[start..].to_vec();
            cycle.push(id);
            return Err(Error::CyclicDefaults { cycle });
        }

        let text = self
            .fetch_text(&location, &id)?
            .ok_or_else(|| Error::MissingDefaults {
                location: id.clone(),
            })?;
        tracing::debug!(defaults = %id, "resolving defaults document");

        let mut document = value::parse_document(&text, &id)?;
        schema::scrub_as(&mut document, scope, &id, warnings);
        PackageConfig::check_fragment(&document, scope, &id)?;

        visited.push(id);
        let expanded = self.expand(document, &location, scope, visited, warnings)?;
        visited.pop();
        Ok(expanded)
    }

    fn fetch_text(&mut self, location: &Location, id: &str) -> Result<Option<String>> {
        match location {
            Location::Local(path) => self.fetch.fetch_local(path),
            Location::Remote(github) => {
                if let Some(text) = self.cache.get(id) {
                    tracing::debug!(defaults = %id, "defaults cache hit");
                    return Ok(Some(text.to_string()));
                }
                let text = self.fetch.fetch_remote(github)?;
                if let Some(text) = &text {
                    self.cache.insert(id, text.clone());
                }
                Ok(text)
            }
        }
    }
}

/// Remove the `defaults` key, keeping the order of the remaining keys.
fn take_defaults(object: &mut serde_json::Map<String, Value>) -> Option<Value> {
    let references = object.get("defaults").cloned()?;
    object.retain(|key, _| key != "defaults");
    Some(references)
}
