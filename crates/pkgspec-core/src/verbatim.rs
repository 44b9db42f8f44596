//! Verbatim overrides
//!
//! Applied to the rendered element tree, after merging and inference, so a
//! verbatim value wins over everything the package description produced.

use crate::config::Verbatim;
use crate::render::{Document, Element, RenderValue};

/// Apply a section's verbatim block to its stanza elements.
///
/// Fields replace a same-named field in place, are added after the last
/// field otherwise, and `null` removes the field. Text is appended as raw
/// lines at the end of the scope.
pub fn apply_verbatim(elements: &mut Vec<Element>, verbatim: &Verbatim) {
    match verbatim {
        Verbatim::Text(text) => {
            elements.push(Element::Raw(
                text.trim_end_matches('\n').split('\n').map(str::to_string).collect(),
            ));
        }
        Verbatim::Fields(entries) => {
            for (name, value) in entries {
                let existing = elements
                    .iter()
                    .position(|element| element.field_name() == Some(name.as_str()));
                match (existing, value) {
                    (Some(index), None) => {
                        elements.remove(index);
                    }
                    (None, None) => {}
                    (Some(index), Some(value)) => {
                        elements[index] = Element::field(name.clone(), RenderValue::literal(value));
                    }
                    (None, Some(value)) => {
                        let after_fields = elements
                            .iter()
                            .rposition(|element| element.field_name().is_some())
                            .map_or(0, |index| index + 1);
                        elements.insert(
                            after_fields,
                            Element::field(name.clone(), RenderValue::literal(value)),
                        );
                    }
                }
            }
        }
    }
}

/// Apply the top-level verbatim block. It touches only the package header;
/// a `cabal-version` entry replaces (or with `null` removes) the version line.
pub fn apply_header_verbatim(document: &mut Document, verbatim: &Verbatim) {
    match verbatim {
        Verbatim::Fields(entries) => {
            let mut header_entries = entries.clone();
            if let Some(version) = header_entries.shift_remove("cabal-version") {
                document.cabal_version = version;
            }
            apply_verbatim(&mut document.header, &Verbatim::Fields(header_entries));
        }
        Verbatim::Text(_) => apply_verbatim(&mut document.header, verbatim),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn fields(entries: &[(&str, Option<&str>)]) -> Verbatim {
        Verbatim::Fields(
            entries
                .iter()
                .map(|(name, value)| (name.to_string(), value.map(str::to_string)))
                .collect::<IndexMap<_, _>>(),
        )
    }

    fn stanza() -> Vec<Element> {
        vec![
            Element::field("main-is", RenderValue::Line("Main.hs".into())),
            Element::field("ghc-options", RenderValue::Line("-Wall".into())),
            Element::Conditional {
                condition: "os(windows)".into(),
                then: Vec::new(),
                otherwise: None,
            },
        ]
    }

    #[test]
    fn replaces_in_place_removes_and_appends_after_fields() {
        let mut elements = stanza();
        apply_verbatim(
            &mut elements,
            &fields(&[
                ("main-is", None),
                ("ghc-options", Some("-O2")),
                ("x-custom", Some("yes")),
            ]),
        );
        assert_eq!(
            elements,
            vec![
                Element::field("ghc-options", RenderValue::Line("-O2".into())),
                Element::field("x-custom", RenderValue::Line("yes".into())),
                Element::Conditional {
                    condition: "os(windows)".into(),
                    then: Vec::new(),
                    otherwise: None,
                },
            ]
        );
    }

    #[test]
    fn multi_line_values_become_blocks() {
        let mut elements = Vec::new();
        apply_verbatim(&mut elements, &fields(&[("description", Some("one\ntwo\n"))]));
        assert_eq!(
            elements,
            vec![Element::field(
                "description",
                RenderValue::Block(vec!["one".into(), "two".into()])
            )]
        );
    }

    #[test]
    fn text_is_appended_raw() {
        let mut elements = stanza();
        apply_verbatim(&mut elements, &Verbatim::Text("x-a: 1\nx-b: 2\n".into()));
        assert_eq!(
            elements.last(),
            Some(&Element::Raw(vec!["x-a: 1".into(), "x-b: 2".into()]))
        );
    }

    #[test]
    fn header_verbatim_controls_the_version_line() {
        let mut document = Document {
            cabal_version: Some("1.12".into()),
            header: vec![Element::field("name", RenderValue::Line("foo".into()))],
            stanzas: Vec::new(),
        };
        apply_header_verbatim(&mut document, &fields(&[("cabal-version", Some(">= 1.10"))]));
        assert_eq!(document.cabal_version.as_deref(), Some(">= 1.10"));
        apply_header_verbatim(&mut document, &fields(&[("cabal-version", None)]));
        assert_eq!(document.cabal_version, None);
        assert_eq!(document.header.len(), 1);
    }
}
