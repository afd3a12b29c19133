// SPDX-License-Identifier: AGPL-3.0-or-later

use serde_json::Value;

use crate::errors::QueryError;
use crate::query::{
    Field, FieldFilter, Filter, Operator, PaginationType, Query, SortBy, SortingOrder,
    VariableType,
};

/// Collects the parts of a [`Query`] before it gets built.
#[derive(Debug, Default)]
struct Draft {
    model_name: Option<String>,
    pagination: Option<PaginationType>,
    fields: Vec<Field>,
    sorting: Vec<SortBy>,
    filters: Vec<FieldFilter>,
    declare_filter: bool,
    sort_error: Option<QueryError>,
}

#[derive(Debug)]
enum State {
    Open(Draft),
    Sealed,
}

/// Single-use builder for [`Query`].
///
/// All mutators return the builder for chaining. Once [`QueryBuilder::build`] was called the
/// builder is sealed. Every mutator checks the seal and leaves a sealed builder untouched, the
/// misuse is reported as [`QueryError::BuilderReused`] by the next call to
/// [`QueryBuilder::build`] or [`QueryBuilder::generate`]. The builder is meant for a single
/// owner, it is not synchronized.
#[derive(Debug)]
pub struct QueryBuilder {
    state: State,
}

impl QueryBuilder {
    /// Creates an empty, open builder.
    pub fn new() -> Self {
        Self {
            state: State::Open(Draft::default()),
        }
    }

    /// Returns true once [`QueryBuilder::build`] was called.
    pub fn is_sealed(&self) -> bool {
        matches!(self.state, State::Sealed)
    }

    fn update<F: FnOnce(&mut Draft)>(&mut self, update: F) -> &mut Self {
        if let State::Open(draft) = &mut self.state {
            update(draft);
        }
        self
    }

    /// Name of the content fragment model to query, e.g. `adventure`.
    pub fn content_fragment_model_name(&mut self, name: &str) -> &mut Self {
        self.update(|draft| draft.model_name = Some(name.to_string()))
    }

    /// Selects a field or a sub-selection.
    pub fn field(&mut self, field: impl Into<Field>) -> &mut Self {
        let field = field.into();
        self.update(|draft| draft.fields.push(field))
    }

    /// Selects a plain field and filters the results by it.
    pub fn field_with_filter(&mut self, name: &str, filter: Filter) -> &mut Self {
        self.field(name).filter_with(name, filter)
    }

    /// Filters by a field against a literal value.
    pub fn filter(&mut self, field: &str, operator: Operator, value: impl Into<Value>) -> &mut Self {
        self.filter_with(field, Filter::new(operator, value))
    }

    /// Filters by a field against the query variable `$name`.
    pub fn filter_var(
        &mut self,
        field: &str,
        operator: Operator,
        var_type: VariableType,
        name: &str,
    ) -> &mut Self {
        self.filter_with(field, Filter::variable(operator, var_type, name))
    }

    /// Filters by a field with a fully configured [`Filter`].
    pub fn filter_with(&mut self, field: &str, filter: Filter) -> &mut Self {
        let field_filter = filter.bind(field);
        self.update(|draft| {
            draft.filters.push(field_filter);
            draft.declare_filter = true;
        })
    }

    /// Declares the generic `$filter` variable typed by the model's filter type.
    ///
    /// The filter itself is passed at execution time with
    /// [`QueryVariables::filter`](crate::query::QueryVariables::filter). Explicitly registered
    /// field filters take precedence over the generic variable.
    pub fn use_filter(&mut self) -> &mut Self {
        self.update(|draft| draft.declare_filter = true)
    }

    /// Turns on cursor based pagination.
    pub fn paginated(&mut self) -> &mut Self {
        self.paginated_with(PaginationType::Cursor)
    }

    /// Sets the pagination mode, [`PaginationType::None`] by default.
    pub fn paginated_with(&mut self, pagination: PaginationType) -> &mut Self {
        self.update(|draft| draft.pagination = Some(pagination))
    }

    /// Adds a sort clause.
    pub fn sort_by(&mut self, field: &str, order: SortingOrder) -> &mut Self {
        let sort_by = SortBy::new(field, order);
        self.update(|draft| draft.sorting.push(sort_by))
    }

    /// Adds sort clauses in the form `"field [ASC|DESC]"`.
    ///
    /// Clauses which fail to parse are reported by [`QueryBuilder::build`].
    pub fn sort_by_clauses(&mut self, clauses: &[&str]) -> &mut Self {
        self.update(|draft| {
            for clause in clauses {
                match clause.parse::<SortBy>() {
                    Ok(sort_by) => draft.sorting.push(sort_by),
                    Err(err) => {
                        if draft.sort_error.is_none() {
                            draft.sort_error = Some(err);
                        }
                    }
                }
            }
        })
    }

    /// Returns the built query and seals the builder.
    pub fn build(&mut self) -> Result<Query, QueryError> {
        let draft = match std::mem::replace(&mut self.state, State::Sealed) {
            State::Open(draft) => draft,
            State::Sealed => return Err(QueryError::BuilderReused),
        };

        if let Some(err) = draft.sort_error {
            return Err(err);
        }

        let model_name = draft.model_name.ok_or(QueryError::MissingModelName)?;

        Ok(Query {
            model_name,
            pagination: draft.pagination.unwrap_or_default(),
            fields: draft.fields,
            sorting: draft.sorting,
            filters: draft.filters,
            declare_filter: draft.declare_filter,
        })
    }

    /// Builds the query and returns its GraphQL text.
    pub fn generate(&mut self) -> Result<String, QueryError> {
        Ok(self.build()?.generate_query())
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::QueryError;
    use crate::query::{
        filter, Field, Operator, PaginationType, Query, QueryBuilder, SortBy, SortingOrder,
    };

    #[test]
    fn build_twice_fails() {
        let mut builder = Query::builder();
        builder.content_fragment_model_name("article").field("title");

        assert!(builder.build().is_ok());
        assert!(matches!(builder.build(), Err(QueryError::BuilderReused)));
    }

    #[test]
    fn mutations_after_build_are_ignored() {
        let mut builder = QueryBuilder::new();
        builder.content_fragment_model_name("article").field("title");
        assert!(!builder.is_sealed());
        let query = builder.build().unwrap();
        assert!(builder.is_sealed());

        builder.field("_path").paginated();
        assert!(builder.is_sealed());

        assert_eq!(query.fields(), &[Field::new("title")]);
        assert_eq!(query.pagination(), PaginationType::None);
        assert!(matches!(builder.generate(), Err(QueryError::BuilderReused)));
    }

    #[test]
    fn failed_build_seals_builder() {
        let mut builder = QueryBuilder::new();
        builder.field("title");

        assert!(matches!(builder.build(), Err(QueryError::MissingModelName)));
        builder.content_fragment_model_name("article");
        assert!(matches!(builder.build(), Err(QueryError::BuilderReused)));
    }

    #[test]
    fn model_name_is_required() {
        let result = Query::builder().field("title").build();
        assert!(matches!(result, Err(QueryError::MissingModelName)));
    }

    #[test]
    fn invalid_sort_clause_fails_on_build() {
        let result = Query::builder()
            .content_fragment_model_name("article")
            .sort_by_clauses(&["title ASC", "_path SIDEWAYS"])
            .build();

        assert!(matches!(
            result,
            Err(QueryError::InvalidSortingOrder(order)) if order == "SIDEWAYS"
        ));
    }

    #[test]
    fn collects_parts_in_order() {
        let query = Query::builder()
            .content_fragment_model_name("adventure")
            .field("title")
            .field_with_filter("price", filter(Operator::Greater, 10))
            .sort_by("price", SortingOrder::Desc)
            .sort_by_clauses(&["title"])
            .paginated()
            .build()
            .unwrap();

        assert_eq!(query.model_name(), "adventure");
        assert_eq!(query.pagination(), PaginationType::Cursor);
        assert_eq!(query.fields(), &[Field::new("title"), Field::new("price")]);
        assert_eq!(
            query.sorting(),
            &[
                SortBy::new("price", SortingOrder::Desc),
                SortBy::new("title", SortingOrder::Asc)
            ]
        );
        assert_eq!(query.filters().len(), 1);
        assert_eq!(query.filters()[0].field_name(), "price");
        assert_eq!(query.filters()[0].operator(), Operator::Greater);
    }

    #[test]
    fn generate_builds_query_text() {
        let text = Query::builder()
            .content_fragment_model_name("adventure")
            .field("title")
            .generate()
            .unwrap();

        assert_eq!(
            text,
            "query  { \n  adventureList {\n    items {\n      title\n    }\n  }\n}\n"
        );
    }
}
