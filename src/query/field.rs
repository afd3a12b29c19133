// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

/// A selected field of a query, either a plain field or a field with nested selections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Scalar field selected by its name.
    Simple(String),

    /// Object field with its own selection set, e.g. `author{firstName lastName}`.
    SubSelection {
        /// Name of the object field.
        name: String,

        /// Selected fields of the object, in order.
        fields: Vec<Field>,
    },
}

impl Field {
    /// Returns a new plain field.
    pub fn new(name: &str) -> Self {
        Self::Simple(name.to_string())
    }

    /// Returns the selection set fragment of this field.
    pub fn to_query_fragment(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Simple(name) => write!(f, "{}", name),
            Field::SubSelection { name, fields } => {
                write!(f, "{}{{", name)?;
                for (index, field) in fields.iter().enumerate() {
                    if index > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", field)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Field {
    fn from(name: String) -> Self {
        Self::Simple(name)
    }
}

/// Builds a [`Field::SubSelection`] top-down.
///
/// Nested selections are passed in as finished values, so a selection can only ever have one
/// parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubSelection {
    name: String,
    fields: Vec<Field>,
}

impl SubSelection {
    /// Returns an empty selection for the given object field.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    /// Adds a plain field or a nested selection.
    pub fn field(mut self, field: impl Into<Field>) -> Self {
        self.fields.push(field.into());
        self
    }
}

impl From<SubSelection> for Field {
    fn from(selection: SubSelection) -> Self {
        Field::SubSelection {
            name: selection.name,
            fields: selection.fields,
        }
    }
}

/// Shorthand for [`SubSelection::new`].
pub fn sub_selection(name: &str) -> SubSelection {
    SubSelection::new(name)
}
