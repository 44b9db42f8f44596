//! File-list glob expansion
//!
//! Entries of `extra-source-files`, `extra-doc-files`, `data-files` (relative
//! to `data-dir`) and the C, C++ and JavaScript source lists are patterns.
//! Each expands to the sorted files it matches; a pattern matching nothing
//! contributes no entries and one warning.

use crate::error::Result;
use crate::fields::{FIELDS, FieldSet, FieldValue};
use crate::package::Package;
use crate::warning::{Warning, Warnings};
use pkgspec_fs::{GlobMatch, NormalizedPath};

/// Expand every pattern field of `package` against the package root.
pub fn expand_globs(
    package: &mut Package,
    root: &NormalizedPath,
    files: &dyn GlobMatch,
    warnings: &mut Warnings,
) -> Result<()> {
    let mut expander = Expander { files, warnings };

    let header = &mut package.header;
    header.extra_source_files =
        expander.expand(root, "extra-source-files", &header.extra_source_files)?;
    header.extra_doc_files = expander.expand(root, "extra-doc-files", &header.extra_doc_files)?;
    let data_root = match &header.data_dir {
        Some(dir) => root.join(dir),
        None => root.clone(),
    };
    header.data_files = expander.expand(&data_root, "data-files", &header.data_files)?;

    for section in &mut package.sections {
        expander.expand_fields(root, &mut section.fields)?;
        let mut failure = None;
        section.conditionals.for_each_field_set_mut(&mut |fields| {
            if failure.is_none() {
                if let Err(e) = expander.expand_fields(root, fields) {
                    failure = Some(e);
                }
            }
        });
        if let Some(e) = failure {
            return Err(e);
        }
    }
    Ok(())
}

struct Expander<'a> {
    files: &'a dyn GlobMatch,
    warnings: &'a mut Warnings,
}

impl Expander<'_> {
    fn expand_fields(&mut self, root: &NormalizedPath, fields: &mut FieldSet) -> Result<()> {
        for spec in FIELDS.iter().filter(|spec| spec.glob) {
            let Some(patterns) = fields.list(spec.key) else {
                continue;
            };
            let expanded = self.expand(root, spec.key, patterns)?;
            fields.insert(spec.key, FieldValue::List(expanded));
        }
        Ok(())
    }

    fn expand(&mut self, base: &NormalizedPath, field: &str, patterns: &[String]) -> Result<Vec<String>> {
        let mut expanded: Vec<String> = Vec::new();
        for pattern in patterns {
            let matches = self.files.glob(base, pattern)?;
            if matches.is_empty() {
                self.warnings.push(Warning::EmptyGlobMatch {
                    field: field.to_string(),
                    pattern: pattern.clone(),
                });
                continue;
            }
            for found in matches {
                if !expanded.contains(&found) {
                    expanded.push(found);
                }
            }
        }
        tracing::debug!(field, patterns = patterns.len(), files = expanded.len(), "expanded globs");
        Ok(expanded)
    }
}
