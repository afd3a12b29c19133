// SPDX-License-Identifier: AGPL-3.0-or-later

//! Typed model of a content fragment GraphQL query and the generator of its text.
mod builder;
mod document;
mod field;
mod filter;
mod order;
mod variables;

pub use builder::QueryBuilder;
pub use document::{PaginationType, Query};
pub use field::{sub_selection, Field, SubSelection};
pub use filter::{
    filter, filter_var, ignore_case, sensitiveness, FieldFilter, Filter, FilterOption,
    FilterValue, Operator, VariableType,
};
pub use order::{SortBy, SortingOrder};
pub use variables::{check_query_for_vars, QueryVariables};
