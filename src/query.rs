//! Queries: predicate column name mapped to the string form of the expected value.
//!
//! A [`Query`] is kept in a `BTreeMap`, so iterating it always yields the
//! pairs sorted by column name. That sorted form is what the match cache keys
//! on, which makes the order a caller supplied the keys in irrelevant.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::Value;

use crate::error::{MatchError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Query {
    predicates: BTreeMap<String, String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }
    /// Adds (or replaces) one predicate; the value is compared by its string form.
    pub fn with(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.insert(column, value);
        self
    }
    pub fn insert(&mut self, column: impl Into<String>, value: impl ToString) {
        self.predicates.insert(column.into(), value.to_string());
    }
    pub fn get(&self, column: &str) -> Option<&str> {
        self.predicates.get(column).map(String::as_str)
    }
    pub fn keys(&self) -> BTreeSet<String> {
        self.predicates.keys().cloned().collect()
    }
    pub fn len(&self) -> usize {
        self.predicates.len()
    }
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
    /// The predicates sorted by column name, values already coerced to strings.
    pub fn normalized(&self) -> Vec<(String, String)> {
        self.predicates
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
    /// Expected values laid out in the given column order.
    pub(crate) fn values_in(&self, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .map(|c| self.predicates.get(c).cloned().unwrap_or_default())
            .collect()
    }

    /// Builds a query from a JSON object whose values are scalars.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            MatchError::InvalidArgument(format!("query must be a JSON object, got {}", kind(value)))
        })?;
        let mut query = Query::new();
        for (column, v) in object {
            let text = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(MatchError::InvalidArgument(format!(
                        "value for '{column}' must be a scalar, got {}",
                        kind(other)
                    )));
                }
            };
            query.predicates.insert(column.clone(), text);
        }
        Ok(query)
    }
}

/// Builds a batch from a JSON array of query objects.
pub fn queries_from_json(value: &Value) -> Result<Vec<Query>> {
    let items = value.as_array().ok_or_else(|| {
        MatchError::InvalidArgument(format!("queries must be a JSON array, got {}", kind(value)))
    })?;
    items.iter().map(Query::from_json).collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (k, v) in iter {
            query.insert(k, v);
        }
        query
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let pairs: Vec<String> = self
            .predicates
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}
