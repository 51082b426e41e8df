//! Clause model for table queries.
//!
//! A query is a tree of directive-keyed objects, lists and literals, exactly
//! as it appears in a MOSDEX document:
//!
//! ```json
//! {
//!   "SELECT": ["routes.origin AS Origin -- STRING", "routes.capacity AS Cap -- DOUBLE"],
//!   "FROM": ["routes"],
//!   "JOIN#1": ["capacity"],
//!   "ON": ["routes.id = capacity.id"]
//! }
//! ```
//!
//! Object keys keep their `#n` suffix in storage so that keys stay unique;
//! use [`directive_name`] to interpret them.

mod directive;

pub use directive::{directive_name, is_dependency_directive, DEPENDENCY_DIRECTIVES};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{MosdexError, MosdexResult};

/// A node in a query clause tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Query {
    /// A literal SQL fragment.
    Literal(String),
    /// An ordered sequence of literals and subqueries.
    List(Vec<Query>),
    /// A subquery: raw directive keys mapped to predicates, in insertion order.
    Object(IndexMap<String, Query>),
}

impl Query {
    /// Create a literal node.
    pub fn literal(text: impl Into<String>) -> Self {
        Query::Literal(text.into())
    }

    /// Create a list node.
    pub fn list(items: impl IntoIterator<Item = Query>) -> Self {
        Query::List(items.into_iter().collect())
    }

    /// Create an object node from `(raw key, predicate)` pairs.
    ///
    /// Later pairs with a key already present replace the earlier predicate,
    /// mirroring JSON object semantics.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Query)>) -> Self {
        Query::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Convert a JSON value into a clause tree.
    ///
    /// Numbers and booleans become literals of their JSON text. `null` has no
    /// SQL rendering and is rejected.
    pub fn from_json(value: &Value) -> MosdexResult<Self> {
        match value {
            Value::String(s) => Ok(Query::Literal(s.clone())),
            Value::Number(n) => Ok(Query::Literal(n.to_string())),
            Value::Bool(b) => Ok(Query::Literal(b.to_string())),
            Value::Array(items) => items
                .iter()
                .map(Query::from_json)
                .collect::<MosdexResult<Vec<_>>>()
                .map(Query::List),
            Value::Object(map) => {
                let mut entries = IndexMap::with_capacity(map.len());
                for (key, predicate) in map {
                    entries.insert(key.clone(), Query::from_json(predicate)?);
                }
                Ok(Query::Object(entries))
            }
            Value::Null => Err(MosdexError::format("null is not a valid query clause")),
        }
    }

    /// Parse a clause tree from JSON text.
    pub fn from_json_str(json: &str) -> MosdexResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Query::from_json(&value)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Query::Literal(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Query::List(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Query::Object(_))
    }

    /// Get the literal text, if this is a literal.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Query::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// Get the list elements, if this is a list.
    pub fn as_list(&self) -> Option<&[Query]> {
        match self {
            Query::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the raw-keyed entries, if this is an object.
    pub fn as_object(&self) -> Option<&IndexMap<String, Query>> {
        match self {
            Query::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Iterate `(directive, predicate)` pairs of an object in insertion order,
    /// with `#n` suffixes stripped. Empty for literals and lists.
    ///
    /// Several entries may share a directive name.
    pub fn clauses(&self) -> impl Iterator<Item = (&str, &Query)> {
        self.as_object()
            .into_iter()
            .flat_map(|entries| entries.iter())
            .map(|(key, predicate)| (directive_name(key), predicate))
    }

    /// The predicate of the first `SELECT` directive, if any.
    pub fn select(&self) -> Option<&Query> {
        self.clauses()
            .find(|(directive, _)| *directive == "SELECT")
            .map(|(_, predicate)| predicate)
    }

    /// Short description of the node kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Query::Literal(_) => "literal",
            Query::List(_) => "list",
            Query::Object(_) => "object",
        }
    }
}

impl<'de> Deserialize<'de> for Query {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Query::from_json(&value).map_err(serde::de::Error::custom)
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::literal(text)
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Query::Literal(text)
    }
}
