// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::QueryError;

pub(crate) const QUERY_VAR_AFTER: &str = "after";
pub(crate) const QUERY_VAR_FIRST: &str = "first";
pub(crate) const QUERY_VAR_OFFSET: &str = "offset";
pub(crate) const QUERY_VAR_LIMIT: &str = "limit";
pub(crate) const QUERY_VAR_FILTER: &str = "filter";

/// Variables sent along with a GraphQL query.
///
/// Keys keep their insertion order so the serialized `variables` object is stable. The reserved
/// pagination and filter keys have their own setters, everything else goes through
/// [`QueryVariables::add_var`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryVariables(Map<String, Value>);

impl QueryVariables {
    /// Returns an empty set of variables.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Cursor after which the next page starts, `None` is sent as `null` to fetch the first page.
    pub fn after(&mut self, after: Option<&str>) -> &mut Self {
        let value = after.map_or(Value::Null, Value::from);
        self.0.insert(QUERY_VAR_AFTER.to_string(), value);
        self
    }

    /// Sets the page size of cursor based pagination.
    pub fn first(&mut self, first: u32) -> &mut Self {
        self.0.insert(QUERY_VAR_FIRST.to_string(), first.into());
        self
    }

    /// Sets the number of items to skip.
    pub fn offset(&mut self, offset: u32) -> &mut Self {
        self.0.insert(QUERY_VAR_OFFSET.to_string(), offset.into());
        self
    }

    /// Sets the maximum number of items to return.
    pub fn limit(&mut self, limit: u32) -> &mut Self {
        self.0.insert(QUERY_VAR_LIMIT.to_string(), limit.into());
        self
    }

    /// Value of the generic `$filter` variable declared by
    /// [`QueryBuilder::use_filter`](crate::query::QueryBuilder::use_filter).
    pub fn filter(&mut self, filter: Value) -> &mut Self {
        self.0.insert(QUERY_VAR_FILTER.to_string(), filter);
        self
    }

    /// Adds or replaces an arbitrary variable.
    pub fn add_var(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    /// Adds all variables of `other`, overwriting existing keys.
    pub fn merge(&mut self, other: &QueryVariables) -> &mut Self {
        for (name, value) in other.iter() {
            self.0.insert(name.clone(), value.clone());
        }
        self
    }

    /// Returns the value of the variable `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no variable is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Variable names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Variables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for QueryVariables {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Very simple sanity check that every required variable is mentioned in the query text.
///
/// This is no GraphQL parsing, it only looks for the `$name` substring.
pub fn check_query_for_vars<'a, I>(query: &str, required_names: I) -> Result<(), QueryError>
where
    I: IntoIterator<Item = &'a String>,
{
    for name in required_names {
        if !query.contains(&format!("${}", name)) {
            return Err(QueryError::MissingVariable(
                name.to_owned(),
                query.to_owned(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use crate::errors::QueryError;

    use super::{check_query_for_vars, QueryVariables};

    #[test]
    fn pagination_setters() {
        let mut cursor_vars = QueryVariables::new();
        cursor_vars.after(Some("x")).first(1);
        assert_eq!(cursor_vars.len(), 2);
        assert_eq!(cursor_vars.get("after"), Some(&json!("x")));
        assert_eq!(cursor_vars.get("first"), Some(&json!(1)));

        let mut offset_vars = QueryVariables::new();
        offset_vars.limit(10).offset(5);
        assert_eq!(offset_vars.len(), 2);
        assert_eq!(offset_vars.get("limit"), Some(&json!(10)));
        assert_eq!(offset_vars.get("offset"), Some(&json!(5)));

        let mut custom_vars = QueryVariables::new();
        custom_vars.add_var("var", "val");
        assert_eq!(custom_vars.len(), 1);
        assert_eq!(custom_vars.get("var"), Some(&json!("val")));
    }

    #[test]
    fn first_page_sends_null_cursor() {
        let mut vars = QueryVariables::new();
        vars.first(10).after(None);

        assert_eq!(
            serde_json::to_string(&vars).unwrap(),
            r#"{"first":10,"after":null}"#
        );
    }

    #[test]
    fn serializes_in_insertion_order() {
        let mut vars = QueryVariables::new();
        vars.add_var("zebra", 1)
            .add_var("apple", true)
            .filter(json!({ "title": { "_expressions": [] } }));

        assert_eq!(
            serde_json::to_string(&vars).unwrap(),
            r#"{"zebra":1,"apple":true,"filter":{"title":{"_expressions":[]}}}"#
        );
    }

    #[test]
    fn merge_overwrites_existing_keys() {
        let mut base = QueryVariables::new();
        base.add_var("locale", "en").first(5);

        let mut page = QueryVariables::new();
        page.first(20).after(Some("abc"));

        base.merge(&page);

        assert_eq!(base.len(), 3);
        assert_eq!(base.get("first"), Some(&json!(20)));
        assert_eq!(
            base.names().collect::<Vec<_>>(),
            vec!["locale", "first", "after"]
        );
    }

    #[rstest]
    #[case("query($after: String, $first: Int) {}", &["after", "first"])]
    #[case("query($offset: Int, $limit: Int) {}", &["offset", "limit"])]
    #[case("query {}", &[])]
    fn query_declares_vars(#[case] query: &str, #[case] names: &[&str]) {
        let names: Vec<String> = names.iter().map(|name| name.to_string()).collect();
        assert!(check_query_for_vars(query, &names).is_ok());
    }

    #[test]
    fn query_misses_var() {
        let names = vec!["offset".to_string(), "limit".to_string()];
        let result = check_query_for_vars("query {}", &names);

        assert!(matches!(
            result,
            Err(QueryError::MissingVariable(name, _)) if name == "offset"
        ));
    }
}
