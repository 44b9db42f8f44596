//! Package to element tree

use super::element::{Document, Element, RenderValue, Stanza};
use super::hints::{FormattingHints, sort_fields};
use crate::conditional::{ConditionalNode, ConditionalTree};
use crate::config::FlagConfig;
use crate::fields::{self, FIELDS, FieldSet, FieldValue, Style};
use crate::package::{Modules, Package, Section, SectionKind};
use crate::verbatim::{apply_header_verbatim, apply_verbatim};

/// Build the element tree for `package`, with verbatim overrides applied and
/// fields ordered by `hints`.
pub fn build_document(package: &Package, hints: &FormattingHints) -> Document {
    let mut document = Document {
        cabal_version: Some(package.cabal_version().to_string()),
        header: header_elements(package),
        stanzas: Vec::new(),
    };
    if let Some(verbatim) = &package.verbatim {
        apply_header_verbatim(&mut document, verbatim);
    }
    document.header = sort_fields(document.header, &hints.header_order);

    let mut stanzas = Vec::new();
    if let Some(repository) = &package.source_repository {
        let mut elements = vec![
            line("type", "git"),
            line("location", &repository.location),
        ];
        if let Some(subdir) = &repository.subdir {
            elements.push(line("subdir", subdir));
        }
        stanzas.push(Stanza {
            title: "source-repository head".to_string(),
            elements,
        });
    }
    for section in package.sections_of(SectionKind::CustomSetup) {
        stanzas.push(section_stanza(section));
    }
    for (name, flag) in &package.flags {
        stanzas.push(flag_stanza(name, flag));
    }
    for kind in SectionKind::ALL.into_iter().filter(|kind| kind.has_modules()) {
        for section in package.sections_of(kind) {
            stanzas.push(section_stanza(section));
        }
    }

    document.stanzas = stanzas
        .into_iter()
        .map(|stanza| {
            let elements = match hints.stanza_order.get(&stanza.title) {
                Some(order) => sort_fields(stanza.elements, order),
                None => stanza.elements,
            };
            Stanza {
                title: stanza.title,
                elements,
            }
        })
        .collect();
    document
}

fn line(name: &str, value: &str) -> Element {
    Element::field(name, RenderValue::Line(value.to_string()))
}

fn header_elements(package: &Package) -> Vec<Element> {
    let header = &package.header;
    let mut elements = vec![line("name", &header.name), line("version", &header.version)];
    let optional = [
        ("synopsis", &header.synopsis),
        ("description", &header.description),
        ("category", &header.category),
        ("stability", &header.stability),
        ("homepage", &header.homepage),
        ("bug-reports", &header.bug_reports),
    ];
    elements.extend(
        optional
            .into_iter()
            .filter_map(|(name, value)| value.as_deref().map(|value| line(name, value))),
    );
    for (name, people) in [("author", &header.author), ("maintainer", &header.maintainer)] {
        if !people.is_empty() {
            elements.push(line(name, &people.join(", ")));
        }
    }
    for (name, value) in [("copyright", &header.copyright), ("license", &header.license)] {
        if let Some(value) = value {
            elements.push(line(name, value));
        }
    }
    match header.license_files.as_slice() {
        [] => {}
        [single] => elements.push(line("license-file", single)),
        several => elements.push(Element::field(
            "license-files",
            RenderValue::Lines(several.to_vec()),
        )),
    }
    if !header.tested_with.is_empty() {
        elements.push(line("tested-with", &header.tested_with.join(", ")));
    }
    elements.push(line("build-type", package.build_type.as_str()));
    for (name, files) in [
        ("extra-source-files", &header.extra_source_files),
        ("extra-doc-files", &header.extra_doc_files),
        ("data-files", &header.data_files),
    ] {
        if !files.is_empty() {
            elements.push(Element::field(name, RenderValue::Lines(files.clone())));
        }
    }
    if let Some(dir) = &header.data_dir {
        elements.push(line("data-dir", dir));
    }
    elements
}

fn flag_stanza(name: &str, flag: &FlagConfig) -> Stanza {
    let mut elements = Vec::new();
    if let Some(description) = &flag.description {
        elements.push(line("description", description));
    }
    elements.push(line("manual", bool_text(flag.manual)));
    elements.push(line("default", bool_text(flag.default)));
    Stanza {
        title: format!("flag {name}"),
        elements,
    }
}

fn bool_text(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

fn section_stanza(section: &Section) -> Stanza {
    let mut elements = Vec::new();
    match section.kind {
        SectionKind::CustomSetup => {
            let setup_depends: Vec<String> =
                section.fields.dependencies().iter().map(ToString::to_string).collect();
            if !setup_depends.is_empty() {
                elements.push(Element::field("setup-depends", RenderValue::Commas(setup_depends)));
            }
        }
        kind => {
            if matches!(kind, SectionKind::Test | SectionKind::Benchmark) {
                elements.push(line("type", "exitcode-stdio-1.0"));
            }
            elements.extend(field_elements(&section.fields, &section.modules));
            elements.extend(tree_elements(&section.conditionals));
        }
    }
    if let Some(verbatim) = &section.verbatim {
        apply_verbatim(&mut elements, verbatim);
    }
    Stanza {
        title: section.title(),
        elements,
    }
}

/// Fields in canonical order; the module lists render where
/// `exposed-modules` sits in the field table.
fn field_elements(set: &FieldSet, modules: &Modules) -> Vec<Element> {
    let mut elements = Vec::new();
    for spec in FIELDS {
        if spec.style == Style::Modules {
            if spec.key == fields::EXPOSED_MODULES {
                for (name, list) in [
                    ("exposed-modules", &modules.exposed),
                    ("other-modules", &modules.other),
                    ("autogen-modules", &modules.autogen),
                ] {
                    if !list.is_empty() {
                        elements.push(Element::field(name, RenderValue::Lines(list.clone())));
                    }
                }
            }
            continue;
        }
        let Some(value) = set.get(spec.key) else {
            continue;
        };
        let rendered = match (value, spec.style) {
            (FieldValue::Text(text), _) => Some(RenderValue::Line(text.clone())),
            (FieldValue::Bool(flag), _) => Some(RenderValue::Line(bool_text(*flag).to_string())),
            (FieldValue::List(items), _) if items.is_empty() => None,
            (FieldValue::List(items), Style::Words) => Some(RenderValue::Line(items.join(" "))),
            (FieldValue::List(items), Style::Commas) => Some(RenderValue::Commas(items.clone())),
            (FieldValue::List(items), _) => Some(RenderValue::Lines(items.clone())),
            (FieldValue::Dependencies(deps), _) if deps.is_empty() => None,
            (FieldValue::Dependencies(deps), _) => Some(RenderValue::Commas(
                deps.iter().map(ToString::to_string).collect(),
            )),
        };
        if let Some(rendered) = rendered {
            elements.push(Element::field(spec.cabal, rendered));
        }
    }
    elements
}

/// Module lists declared inside a conditional body.
fn declared_modules(set: &FieldSet) -> Modules {
    let generated_exposed = set.list_or_empty(fields::GENERATED_EXPOSED_MODULES);
    let generated_other = set.list_or_empty(fields::GENERATED_OTHER_MODULES);
    Modules {
        exposed: [set.list_or_empty(fields::EXPOSED_MODULES), generated_exposed].concat(),
        other: [set.list_or_empty(fields::OTHER_MODULES), generated_other].concat(),
        autogen: [generated_exposed, generated_other].concat(),
    }
}

fn tree_elements(tree: &ConditionalTree) -> Vec<Element> {
    let mut elements = Vec::new();
    for node in &tree.nodes {
        match node {
            ConditionalNode::Leaf(set) => {
                elements.extend(field_elements(set, &declared_modules(set)));
            }
            ConditionalNode::Branch {
                condition,
                then,
                otherwise,
            } => elements.push(Element::Conditional {
                condition: condition.clone(),
                then: tree_elements(then),
                otherwise: otherwise.as_ref().map(tree_elements),
            }),
        }
    }
    elements
}
