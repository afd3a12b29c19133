// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

use serde_json::Value;

/// Comparison operators supported by content fragment model filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `EQUALS`, exact match.
    Equals,
    /// `EQUALS_NOT`, anything but an exact match.
    EqualsNot,
    /// `CONTAINS`, value is a substring.
    Contains,
    /// `CONTAINS_NOT`, value is no substring.
    ContainsNot,
    /// `STARTS_WITH`, value is a prefix.
    StartsWith,
    /// `GREATER`
    Greater,
    /// `GREATER_EQUAL`
    GreaterEqual,
    /// `LOWER`
    Lower,
    /// `LOWER_EQUAL`
    LowerEqual,
    /// `AT`, same date or time.
    At,
    /// `NOT_AT`
    NotAt,
    /// `BEFORE`
    Before,
    /// `AT_OR_BEFORE`
    AtOrBefore,
    /// `AFTER`
    After,
    /// `AT_OR_AFTER`
    AtOrAfter,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operator::Equals => "EQUALS",
            Operator::EqualsNot => "EQUALS_NOT",
            Operator::Contains => "CONTAINS",
            Operator::ContainsNot => "CONTAINS_NOT",
            Operator::StartsWith => "STARTS_WITH",
            Operator::Greater => "GREATER",
            Operator::GreaterEqual => "GREATER_EQUAL",
            Operator::Lower => "LOWER",
            Operator::LowerEqual => "LOWER_EQUAL",
            Operator::At => "AT",
            Operator::NotAt => "NOT_AT",
            Operator::Before => "BEFORE",
            Operator::AtOrBefore => "AT_OR_BEFORE",
            Operator::After => "AFTER",
            Operator::AtOrAfter => "AT_OR_AFTER",
        };
        write!(f, "{}", name)
    }
}

/// GraphQL types a filter variable can be declared with.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    /// GraphQL `Int`.
    Int,
    /// GraphQL `Float`.
    Float,
    /// GraphQL `String`.
    String,
    /// GraphQL `Boolean`.
    Boolean,
    /// GraphQL `ID`.
    ID,
    /// GraphQL `Date`.
    Date,
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariableType::Int => "Int",
            VariableType::Float => "Float",
            VariableType::String => "String",
            VariableType::Boolean => "Boolean",
            VariableType::ID => "ID",
            VariableType::Date => "Date",
        };
        write!(f, "{}", name)
    }
}

/// Pre-rendered option fragment placed inside a filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption(String);

impl FilterOption {
    /// Wraps an arbitrary fragment, e.g. `_apply: AT_LEAST_ONCE`.
    pub fn new(fragment: &str) -> Self {
        Self(fragment.to_string())
    }
}

impl fmt::Display for FilterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compare strings case-insensitively.
pub fn ignore_case() -> FilterOption {
    FilterOption::new("_ignoreCase: true")
}

/// Tolerance used when comparing floating point values.
pub fn sensitiveness(value: f64) -> FilterOption {
    FilterOption(format!("_sensitiveness: {}", value))
}

/// Quotes and escapes text as a GraphQL string literal.
///
/// JSON string escaping is a subset of what GraphQL accepts inside `"..."`.
pub(crate) fn string_literal(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

/// What a filter compares against.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Literal value written into the query text.
    Static(Value),

    /// Reference to a query variable which gets declared with the given type.
    Variable {
        /// Variable name without the `$` prefix.
        name: String,

        /// Declared GraphQL type of the variable.
        var_type: VariableType,
    },
}

impl FilterValue {
    /// Renders the value as it appears behind `value:` in a filter expression.
    ///
    /// Numbers and booleans stay bare, everything else becomes a string literal.
    pub(crate) fn render(&self) -> String {
        match self {
            FilterValue::Static(Value::Number(number)) => number.to_string(),
            FilterValue::Static(Value::Bool(flag)) => flag.to_string(),
            FilterValue::Static(Value::String(text)) => string_literal(text),
            FilterValue::Static(other) => string_literal(&other.to_string()),
            FilterValue::Variable { name, .. } => format!("${}", name),
        }
    }
}

/// A filter which is not yet bound to a field.
///
/// Pass it to [`QueryBuilder::field_with_filter`](crate::query::QueryBuilder::field_with_filter)
/// or [`QueryBuilder::filter_with`](crate::query::QueryBuilder::filter_with), the builder binds
/// it to the field name.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    operator: Operator,
    value: FilterValue,
    options: Vec<FilterOption>,
}

impl Filter {
    /// Compares against a literal value.
    pub fn new(operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            operator,
            value: FilterValue::Static(value.into()),
            options: Vec::new(),
        }
    }

    /// Compares against the query variable `$name` of the given type.
    pub fn variable(operator: Operator, var_type: VariableType, name: &str) -> Self {
        Self {
            operator,
            value: FilterValue::Variable {
                name: name.to_string(),
                var_type,
            },
            options: Vec::new(),
        }
    }

    /// Adds an option like [`ignore_case`] to the filter expression.
    pub fn option(mut self, option: FilterOption) -> Self {
        self.options.push(option);
        self
    }

    pub(crate) fn bind(self, field_name: &str) -> FieldFilter {
        FieldFilter {
            field_name: field_name.to_string(),
            filter: self,
        }
    }
}

/// Shorthand for [`Filter::new`].
pub fn filter(operator: Operator, value: impl Into<Value>) -> Filter {
    Filter::new(operator, value)
}

/// Shorthand for [`Filter::variable`].
pub fn filter_var(operator: Operator, var_type: VariableType, name: &str) -> Filter {
    Filter::variable(operator, var_type, name)
}

/// Filter bound to the field it applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    field_name: String,
    filter: Filter,
}

impl FieldFilter {
    /// Name of the filtered field.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Comparison operator.
    pub fn operator(&self) -> Operator {
        self.filter.operator
    }

    /// Value the field is compared against.
    pub fn value(&self) -> &FilterValue {
        &self.filter.value
    }

    /// Options rendered before the value.
    pub fn options(&self) -> &[FilterOption] {
        &self.filter.options
    }

    /// Variable this filter declares, if it compares against one.
    pub(crate) fn variable_declaration(&self) -> Option<(String, String)> {
        match &self.filter.value {
            FilterValue::Variable { name, var_type } => {
                Some((format!("${}", name), var_type.to_string()))
            }
            FilterValue::Static(_) => None,
        }
    }

    /// Renders `<field>: { _expressions: [ { _operator: <OP>, ..., value: <v>}]}`.
    pub(crate) fn to_clause(&self) -> String {
        let mut clause = format!(
            "{}: {{ _expressions: [ {{ _operator: {}, ",
            self.field_name, self.filter.operator
        );

        if !self.filter.options.is_empty() {
            let options: Vec<String> = self
                .filter
                .options
                .iter()
                .map(|option| option.to_string())
                .collect();
            clause.push_str(&options.join(",\n"));
            clause.push_str(", ");
        }

        clause.push_str("value: ");
        clause.push_str(&self.filter.value.render());
        clause.push_str("}]}");
        clause
    }
}
