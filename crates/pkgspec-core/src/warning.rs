//! Non-fatal diagnostics
//!
//! Every pass receives a `&mut Warnings` and appends to it; nothing is kept in
//! global state. Exact duplicates collapse (the same defaults document reached
//! along two paths reports its unknown fields once).

use std::fmt;

/// A non-fatal diagnostic surfaced alongside successful output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Warning {
    /// A mapping key the schema does not know, attributed to the file it came from
    UnrecognizedField { origin: String, path: String },

    /// A file-list pattern that matched nothing
    EmptyGlobMatch { field: String, pattern: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedField { origin, path } => {
                write!(f, "{origin}: Ignoring unrecognized field {path}")
            }
            Self::EmptyGlobMatch { field, pattern } => {
                write!(
                    f,
                    "Specified pattern \"{pattern}\" for {field} does not match any files"
                )
            }
        }
    }
}

/// Ordered warning collector.
#[derive(Debug, Default, Clone)]
pub struct Warnings {
    items: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        if !self.items.contains(&warning) {
            tracing::debug!(%warning, "warning recorded");
            self.items.push(warning);
        }
    }

    pub fn unrecognized(&mut self, origin: &str, path: impl ToString) {
        self.push(Warning::UnrecognizedField {
            origin: origin.to_string(),
            path: path.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.items
    }
}
