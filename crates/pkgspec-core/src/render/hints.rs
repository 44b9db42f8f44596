//! Formatting hints sniffed from a previously generated manifest
//!
//! Hints are advisory. A malformed or hand-edited previous file yields
//! whatever could be recognized and defaults for the rest.

use super::element::{Element, Layout};
use crate::fields::{self, Style};
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static FIELD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)([A-Za-z][A-Za-z0-9-]*):(.*)$").unwrap());

const MODULE_FIELDS: [&str; 2] = ["exposed-modules", "other-modules"];

/// Rendered fields, outside the section table, that put one item per line.
const EXTRA_LIST_FIELDS: [&str; 6] = [
    "license-files",
    "extra-source-files",
    "extra-doc-files",
    "data-files",
    "setup-depends",
    "autogen-modules",
];

/// Whether an empty-valued `name:` line opens a list whose items can
/// reveal the list indent. Free text continuations (a `description:` block)
/// do not.
fn opens_list(name: &str) -> bool {
    EXTRA_LIST_FIELDS.contains(&name)
        || fields::FIELDS.iter().any(|spec| {
            spec.cabal == name && matches!(spec.style, Style::Lines | Style::Commas | Style::Modules)
        })
}

/// Layout and ordering observed in an existing manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattingHints {
    /// Column at which header values start
    pub alignment: Option<usize>,
    /// Indent of fields inside a stanza
    pub section_indent: Option<usize>,
    /// Indent of list items relative to their field
    pub list_indent: Option<usize>,
    /// Header field names in order of appearance
    pub header_order: Vec<String>,
    /// Stanza title to its first-level field names
    pub stanza_order: IndexMap<String, Vec<String>>,
    /// Stanza title to the module names listed in it
    pub module_order: IndexMap<String, Vec<String>>,
}

impl FormattingHints {
    pub fn layout(&self) -> Layout {
        let defaults = Layout::default();
        Layout {
            alignment: self.alignment.unwrap_or(defaults.alignment),
            section_indent: self
                .section_indent
                .filter(|indent| *indent > 0)
                .unwrap_or(defaults.section_indent),
            list_indent: self
                .list_indent
                .filter(|indent| *indent >= 2)
                .unwrap_or(defaults.list_indent),
        }
    }
}

struct OpenList {
    name: String,
    indent: usize,
}

/// Recover formatting hints from the text of a previous manifest.
pub fn sniff_hints(text: &str) -> FormattingHints {
    let mut hints = FormattingHints::default();
    let mut columns: HashMap<usize, usize> = HashMap::new();
    let mut unpadded = false;
    let mut stanza: Option<String> = None;
    let mut open: Option<OpenList> = None;
    let mut awaiting_item: Option<usize> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        let indent = line.len() - trimmed.len();

        if let Some(field_indent) = awaiting_item.take() {
            if indent > field_indent && hints.list_indent.is_none() {
                hints.list_indent = Some(indent - field_indent);
            }
        }
        if let Some(list) = &open {
            if indent > list.indent {
                if let Some(title) = &stanza {
                    if MODULE_FIELDS.contains(&list.name.as_str()) {
                        let module = trimmed.trim_start_matches(',').trim();
                        let modules = hints.module_order.entry(title.clone()).or_default();
                        if !module.is_empty() && !modules.iter().any(|seen| seen == module) {
                            modules.push(module.to_string());
                        }
                    }
                }
                continue;
            }
            open = None;
        }

        let field = FIELD_LINE.captures(line);
        if indent == 0 {
            match field {
                Some(captures) => {
                    let name = captures[2].to_string();
                    let value = &captures[3];
                    if name != "cabal-version" {
                        record_alignment(&name, value, &mut columns, &mut unpadded);
                        if !hints.header_order.contains(&name) {
                            hints.header_order.push(name.clone());
                        }
                    }
                    if value.trim().is_empty() {
                        if opens_list(&name) {
                            awaiting_item = Some(0);
                        }
                        open = Some(OpenList { name, indent: 0 });
                    }
                }
                None => {
                    let title = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
                    hints.stanza_order.entry(title.clone()).or_default();
                    stanza = Some(title);
                }
            }
            continue;
        }

        let Some(title) = &stanza else {
            continue;
        };
        if hints.section_indent.is_none() {
            hints.section_indent = Some(indent);
        }
        let Some(captures) = field else {
            continue;
        };
        let name = captures[2].to_string();
        if Some(indent) == hints.section_indent {
            let order = hints.stanza_order.entry(title.clone()).or_default();
            if !order.contains(&name) {
                order.push(name.clone());
            }
        }
        if captures[3].trim().is_empty() {
            if opens_list(&name) {
                awaiting_item = Some(indent);
            }
            open = Some(OpenList { name, indent });
        }
    }

    hints.alignment = columns
        .into_iter()
        .max_by_key(|(column, count)| (*count, *column))
        .map(|(column, _)| column)
        .or(if unpadded { Some(0) } else { None });
    tracing::debug!(
        alignment = ?hints.alignment,
        stanzas = hints.stanza_order.len(),
        "sniffed formatting hints"
    );
    hints
}

/// Values padded past `name: ` pin the alignment column exactly. A single
/// space is compatible with any alignment up to the label width.
fn record_alignment(name: &str, value: &str, columns: &mut HashMap<usize, usize>, unpadded: &mut bool) {
    let content = value.trim_start();
    if content.is_empty() {
        return;
    }
    let spaces = value.len() - content.len();
    if spaces > 1 {
        *columns.entry(name.len() + 1 + spaces).or_default() += 1;
    } else {
        *unpadded = true;
    }
}

/// Reorder the fields among `elements` by an observed order.
///
/// A field keeps its canonical position relative to the nearest observed
/// field before it; unobserved leading fields stay first. Conditionals and
/// raw text keep their relative order after the fields.
pub fn sort_fields(elements: Vec<Element>, observed: &[String]) -> Vec<Element> {
    if observed.is_empty() {
        return elements;
    }
    let (fields, rest): (Vec<Element>, Vec<Element>) = elements
        .into_iter()
        .partition(|element| element.field_name().is_some());

    let mut last_seen: isize = -1;
    let mut keyed: Vec<((isize, usize), Element)> = fields
        .into_iter()
        .enumerate()
        .map(|(position, element)| {
            let seen = element
                .field_name()
                .and_then(|name| observed.iter().position(|field| field == name));
            if let Some(index) = seen {
                last_seen = index as isize;
            }
            ((last_seen, position), element)
        })
        .collect();
    keyed.sort_by_key(|(key, _)| *key);
    keyed
        .into_iter()
        .map(|(_, element)| element)
        .chain(rest)
        .collect()
}
