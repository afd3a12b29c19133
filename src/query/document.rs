// SPDX-License-Identifier: AGPL-3.0-or-later

use serde_json::Value;

use crate::query::builder::QueryBuilder;
use crate::query::filter::string_literal;
use crate::query::variables::{
    QUERY_VAR_AFTER, QUERY_VAR_FILTER, QUERY_VAR_FIRST, QUERY_VAR_LIMIT, QUERY_VAR_OFFSET,
};
use crate::query::{Field, FieldFilter, SortBy};

const SUFFIX_MODEL_FILTER: &str = "ModelFilter";

/// How a query pages through its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationType {
    /// Return all results as a flat `items` list.
    None,

    /// Relay-style `edges` / `pageInfo` connection queried with `$after` and `$first`.
    Cursor,

    /// Flat `items` list windowed with `$offset` and `$limit`.
    OffsetLimit,
}

impl PaginationType {
    /// Returns true for cursor based pagination.
    pub fn is_cursor(&self) -> bool {
        matches!(self, PaginationType::Cursor)
    }
}

impl Default for PaginationType {
    fn default() -> Self {
        Self::None
    }
}

/// A GraphQL query against a content fragment model, assembled by [`QueryBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub(crate) model_name: String,
    pub(crate) pagination: PaginationType,
    pub(crate) fields: Vec<Field>,
    pub(crate) sorting: Vec<SortBy>,
    pub(crate) filters: Vec<FieldFilter>,
    pub(crate) declare_filter: bool,
}

impl Query {
    /// Returns a builder to configure a new query.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Name of the queried content fragment model.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Pagination mode of the query.
    pub fn pagination(&self) -> PaginationType {
        self.pagination
    }

    /// Selected fields, in order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Sort clauses, in order.
    pub fn sorting(&self) -> &[SortBy] {
        &self.sorting
    }

    /// Field filters, in registration order.
    pub fn filters(&self) -> &[FieldFilter] {
        &self.filters
    }

    /// Type name of the generic model filter, `adventure` becomes `AdventureModelFilter`.
    pub fn model_filter_type(&self) -> String {
        let mut chars = self.model_name.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("{}{}", capitalized, SUFFIX_MODEL_FILTER)
    }

    /// Returns the GraphQL document text of this query.
    ///
    /// Variable declarations and top-level arguments follow insertion order: pagination first,
    /// then sorting, then filtering.
    pub fn generate_query(&self) -> String {
        let mut declarations = Declarations::default();
        let mut arguments: Vec<(&str, Value)> = Vec::new();

        match self.pagination {
            PaginationType::Cursor => {
                declarations.declare(&format!("${}", QUERY_VAR_AFTER), "String");
                declarations.declare(&format!("${}", QUERY_VAR_FIRST), "Int");
                arguments.push((QUERY_VAR_AFTER, format!("${}", QUERY_VAR_AFTER).into()));
                arguments.push((QUERY_VAR_FIRST, format!("${}", QUERY_VAR_FIRST).into()));
            }
            PaginationType::OffsetLimit => {
                declarations.declare(&format!("${}", QUERY_VAR_OFFSET), "Int");
                declarations.declare(&format!("${}", QUERY_VAR_LIMIT), "Int");
                arguments.push((QUERY_VAR_OFFSET, format!("${}", QUERY_VAR_OFFSET).into()));
                arguments.push((QUERY_VAR_LIMIT, format!("${}", QUERY_VAR_LIMIT).into()));
            }
            PaginationType::None => (),
        }

        if !self.sorting.is_empty() {
            let sort: Vec<String> = self.sorting.iter().map(SortBy::to_string).collect();
            arguments.push(("sort", sort.join(", ").into()));
        }

        if self.declare_filter {
            if self.filters.is_empty() {
                let var_filter = format!("${}", QUERY_VAR_FILTER);
                declarations.declare(&var_filter, &self.model_filter_type());
                arguments.push((QUERY_VAR_FILTER, var_filter.into()));
            } else {
                let mut clauses = Vec::with_capacity(self.filters.len());
                for filter in &self.filters {
                    if let Some((name, var_type)) = filter.variable_declaration() {
                        declarations.declare(&name, &var_type);
                    }
                    clauses.push(filter.to_clause());
                }
                let block = format!("{{\n{}\n}}", clauses.join(",\n"));
                arguments.push((QUERY_VAR_FILTER, block.into()));
            }
        }

        let mut buf = String::from("query ");

        if !declarations.is_empty() {
            buf.push_str(&format!("({})", declarations.render()));
        }

        buf.push_str(" { \n");
        buf.push_str("  ");
        buf.push_str(&self.model_name);
        buf.push_str(if self.pagination.is_cursor() {
            "Paginated"
        } else {
            "List"
        });

        if !arguments.is_empty() {
            let rendered: Vec<String> = arguments
                .iter()
                .map(|(name, value)| format!("{}: {}", name, render_argument(value)))
                .collect();
            buf.push_str(&format!("({})", rendered.join(", ")));
        }
        buf.push_str(" {\n");

        let fields: Vec<String> = self.fields.iter().map(Field::to_query_fragment).collect();
        let fields = format!("      {}\n", fields.join("\n      "));
        if self.pagination.is_cursor() {
            buf.push_str("    edges { node {\n");
            buf.push_str(&fields);
            buf.push_str("    }}\n    pageInfo { hasNextPage endCursor }\n");
        } else {
            buf.push_str("    items {\n");
            buf.push_str(&fields);
            buf.push_str("    }\n");
        }

        buf.push_str("  }\n");
        buf.push_str("}\n");
        buf
    }
}

/// Insertion-ordered `$name: Type` declarations, re-declaring keeps the first position.
#[derive(Debug, Default)]
struct Declarations(Vec<(String, String)>);

impl Declarations {
    fn declare(&mut self, name: &str, var_type: &str) {
        match self.0.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = var_type.to_string(),
            None => self.0.push((name.to_string(), var_type.to_string())),
        }
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn render(&self) -> String {
        let declarations: Vec<String> = self
            .0
            .iter()
            .map(|(name, var_type)| format!("{}: {}", name, var_type))
            .collect();
        declarations.join(", ")
    }
}

/// Numbers, variable references and pre-rendered `{...}` blocks are written as they are, all
/// other values are quoted.
fn render_argument(value: &Value) -> String {
    match value {
        Value::Number(number) => number.to_string(),
        Value::String(text)
            if text.starts_with('$') || (text.starts_with('{') && text.ends_with('}')) =>
        {
            text.clone()
        }
        Value::String(text) => string_literal(text),
        other => string_literal(&other.to_string()),
    }
}
