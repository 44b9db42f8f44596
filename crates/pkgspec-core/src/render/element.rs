//! Rendered document tree and its text layout

/// Value of a rendered field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderValue {
    /// `name: value`; embedded newlines continue at the value column
    Line(String),
    /// one item per line below the field name
    Lines(Vec<String>),
    /// one item per line with leading commas
    Commas(Vec<String>),
    /// lines below the field name, verbatim
    Block(Vec<String>),
}

impl RenderValue {
    /// A verbatim override value: multi-line text becomes a block.
    pub fn literal(text: &str) -> Self {
        if text.contains('\n') {
            Self::Block(text.trim_end().lines().map(str::to_string).collect())
        } else {
            Self::Line(text.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: RenderValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Field(Field),
    Conditional {
        condition: String,
        then: Vec<Element>,
        otherwise: Option<Vec<Element>>,
    },
    /// Verbatim text, one entry per line
    Raw(Vec<String>),
}

impl Element {
    pub fn field(name: impl Into<String>, value: RenderValue) -> Self {
        Self::Field(Field {
            name: name.into(),
            value,
        })
    }

    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::Field(field) => Some(&field.name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stanza {
    pub title: String,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// `None` when a verbatim override removed the line
    pub cabal_version: Option<String>,
    pub header: Vec<Element>,
    pub stanzas: Vec<Stanza>,
}

/// Resolved layout settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// header value column
    pub alignment: usize,
    /// stanza field indent
    pub section_indent: usize,
    /// list item indent relative to its field
    pub list_indent: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            alignment: 16,
            section_indent: 2,
            list_indent: 4,
        }
    }
}

impl Document {
    /// Lay out the document body, without the generated-file comment.
    pub fn lines(&self, layout: &Layout) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(version) = &self.cabal_version {
            out.push(format!("cabal-version: {version}"));
            out.push(String::new());
        }
        render_elements(&mut out, &self.header, 0, Some(layout.alignment), layout);
        for stanza in &self.stanzas {
            if !out.is_empty() && out.last().is_some_and(|line| !line.is_empty()) {
                out.push(String::new());
            }
            out.push(stanza.title.clone());
            render_elements(&mut out, &stanza.elements, layout.section_indent, None, layout);
        }
        while out.last().is_some_and(String::is_empty) {
            out.pop();
        }
        out
    }
}

fn render_elements(
    out: &mut Vec<String>,
    elements: &[Element],
    indent: usize,
    alignment: Option<usize>,
    layout: &Layout,
) {
    let pad = " ".repeat(indent);
    for element in elements {
        match element {
            Element::Field(field) => render_field(out, field, indent, alignment, layout),
            Element::Conditional {
                condition,
                then,
                otherwise,
            } => {
                out.push(format!("{pad}if {condition}"));
                render_elements(out, then, indent + layout.section_indent, None, layout);
                if let Some(otherwise) = otherwise {
                    out.push(format!("{pad}else"));
                    render_elements(out, otherwise, indent + layout.section_indent, None, layout);
                }
            }
            Element::Raw(lines) => {
                out.extend(lines.iter().map(|line| {
                    if line.is_empty() {
                        String::new()
                    } else {
                        format!("{pad}{line}")
                    }
                }));
            }
        }
    }
}

fn render_field(
    out: &mut Vec<String>,
    field: &Field,
    indent: usize,
    alignment: Option<usize>,
    layout: &Layout,
) {
    let pad = " ".repeat(indent);
    let label = format!("{}:", field.name);
    let item_pad = " ".repeat(indent + layout.list_indent);
    match &field.value {
        RenderValue::Line(value) => {
            let width = alignment
                .unwrap_or(0)
                .max(label.len() + 1);
            let mut lines = value.lines();
            let first = lines.next().unwrap_or("");
            out.push(format!("{pad}{label:<width$}{first}"));
            let continuation = " ".repeat(indent + width);
            for line in lines {
                let line = if line.trim().is_empty() { "." } else { line };
                out.push(format!("{continuation}{line}"));
            }
        }
        RenderValue::Lines(items) | RenderValue::Block(items) => {
            out.push(format!("{pad}{label}"));
            out.extend(items.iter().map(|item| format!("{item_pad}{item}")));
        }
        RenderValue::Commas(items) => {
            out.push(format!("{pad}{label}"));
            let comma_pad = " ".repeat(indent + layout.list_indent.saturating_sub(2));
            for (index, item) in items.iter().enumerate() {
                if index == 0 {
                    out.push(format!("{item_pad}{item}"));
                } else {
                    out.push(format!("{comma_pad}, {item}"));
                }
            }
        }
    }
}
