// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;
use std::str::FromStr;

use crate::errors::QueryError;

/// Options to determine the direction of the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortingOrder {
    /// Arrange items from smallest to largest value.
    Asc,

    /// Arrange items from largest to smallest value.
    Desc,
}

impl Default for SortingOrder {
    fn default() -> Self {
        Self::Asc
    }
}

impl fmt::Display for SortingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortingOrder::Asc => write!(f, "ASC"),
            SortingOrder::Desc => write!(f, "DESC"),
        }
    }
}

impl FromStr for SortingOrder {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_uppercase().as_str() {
            "ASC" => Ok(SortingOrder::Asc),
            "DESC" => Ok(SortingOrder::Desc),
            _ => Err(QueryError::InvalidSortingOrder(value.to_string())),
        }
    }
}

/// Sorts the results by one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortBy {
    field: String,
    order: SortingOrder,
}

impl SortBy {
    /// Returns a sort clause for `field`.
    pub fn new(field: &str, order: SortingOrder) -> Self {
        Self {
            field: field.to_string(),
            order,
        }
    }

    /// Name of the sorted field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Sort direction.
    pub fn order(&self) -> SortingOrder {
        self.order
    }
}

/// Parses clauses like `"title DESC"`; the order defaults to ascending when omitted.
impl FromStr for SortBy {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.splitn(2, ' ');
        let field = parts.next().unwrap_or_default();
        let order = match parts.next() {
            Some(order) => order.parse()?,
            None => SortingOrder::default(),
        };

        Ok(Self::new(field, order))
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.order)
    }
}
