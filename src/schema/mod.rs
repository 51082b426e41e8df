//! Table schemas and their derivation from SELECT clauses.
//!
//! A schema is an ordered map from field name to [`FieldType`]. It is either
//! declared on a table or derived from the inline annotations of the table
//! query's SELECT list:
//!
//! ```text
//! "'ship' AS Name -- STRING"                    -> Name: STRING
//! "routes.capacity AS UpperBound -- DOUBLE"     -> UpperBound: DOUBLE
//! ```

use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{MosdexError, MosdexResult};
use crate::query::Query;

/// `<name> -- <TYPE>` at the end of a SELECT item.
static ANNOTATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_$][A-Za-z0-9_$]*)\s+--\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*$")
        .expect("annotation pattern is valid")
});

/// Semantic type of a table field.
///
/// The `*_FUNCTION` variants mark columns whose values are placeholders for
/// deferred solver calls rather than data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "STRING")]
    String,
    #[serde(rename = "INTEGER")]
    Integer,
    #[serde(rename = "DOUBLE")]
    Double,
    #[serde(rename = "IEEEDOUBLE")]
    IeeeDouble,
    #[serde(rename = "STRING_FUNCTION")]
    StringFunction,
    #[serde(rename = "INTEGER_FUNCTION")]
    IntegerFunction,
    #[serde(rename = "DOUBLE_FUNCTION")]
    DoubleFunction,
    #[serde(rename = "IEEEDOUBLE_FUNCTION")]
    IeeeDoubleFunction,
}

impl FieldType {
    /// Every supported type keyword.
    pub const ALL: [FieldType; 8] = [
        FieldType::String,
        FieldType::Integer,
        FieldType::Double,
        FieldType::IeeeDouble,
        FieldType::StringFunction,
        FieldType::IntegerFunction,
        FieldType::DoubleFunction,
        FieldType::IeeeDoubleFunction,
    ];

    /// Parse a type keyword. Keywords are case-sensitive.
    pub fn parse(keyword: &str) -> MosdexResult<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == keyword)
            .ok_or_else(|| MosdexError::format(format!("unsupported field type '{}'", keyword)))
    }

    /// The keyword for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "STRING",
            FieldType::Integer => "INTEGER",
            FieldType::Double => "DOUBLE",
            FieldType::IeeeDouble => "IEEEDOUBLE",
            FieldType::StringFunction => "STRING_FUNCTION",
            FieldType::IntegerFunction => "INTEGER_FUNCTION",
            FieldType::DoubleFunction => "DOUBLE_FUNCTION",
            FieldType::IeeeDoubleFunction => "IEEEDOUBLE_FUNCTION",
        }
    }

    /// Is this a deferred solver-call placeholder?
    pub fn is_function(&self) -> bool {
        matches!(
            self,
            FieldType::StringFunction
                | FieldType::IntegerFunction
                | FieldType::DoubleFunction
                | FieldType::IeeeDoubleFunction
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered field name to type mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: IndexMap<String, FieldType>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from parallel name and type-keyword lists.
    pub fn from_declaration(names: &[String], types: &[String]) -> MosdexResult<Self> {
        if names.len() != types.len() {
            return Err(MosdexError::format(format!(
                "schema declares {} field names but {} field types",
                names.len(),
                types.len()
            )));
        }

        let mut schema = Schema::new();
        for (name, keyword) in names.iter().zip(types) {
            schema.insert(name.clone(), FieldType::parse(keyword)?)?;
        }
        Ok(schema)
    }

    /// Append a field. Field names must be unique.
    pub fn insert(&mut self, name: impl Into<String>, field_type: FieldType) -> MosdexResult<()> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(MosdexError::format(format!("duplicate field name '{}'", name)));
        }
        self.fields.insert(name, field_type);
        Ok(())
    }

    /// Builder-style [`Schema::insert`] for known-good field lists.
    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> MosdexResult<Self> {
        self.insert(name, field_type)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).copied()
    }

    /// Iterate fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(name, t)| (name.as_str(), *t))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Same field names with the same types, ignoring order.
    pub fn matches(&self, other: &Schema) -> bool {
        self.len() == other.len()
            && self
                .fields
                .iter()
                .all(|(name, t)| other.fields.get(name) == Some(t))
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, field_type)) in self.fields().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", name, field_type)?;
        }
        Ok(())
    }
}

/// Derive a schema from the annotations of a query's SELECT list.
///
/// Every SELECT item must end in `<name> -- <TYPE>`; anything before the
/// name (an expression, an `AS` keyword) is ignored.
pub fn extract_schema(query: &Query) -> MosdexResult<Schema> {
    let select = query
        .select()
        .ok_or_else(|| MosdexError::format("query has no SELECT clause"))?;

    let items: &[Query] = match select {
        Query::List(items) => items,
        single @ Query::Literal(_) => std::slice::from_ref(single),
        Query::Object(_) => {
            return Err(MosdexError::format(
                "SELECT must list literal fields, found a subquery",
            ))
        }
    };

    let mut schema = Schema::new();
    for item in items {
        let text = item.as_literal().ok_or_else(|| {
            MosdexError::format(format!(
                "SELECT item must be a literal, found a {}",
                item.kind_name()
            ))
        })?;
        let (name, field_type) = parse_annotation(text)?;
        schema.insert(name, field_type)?;
    }

    Ok(schema)
}

fn parse_annotation(item: &str) -> MosdexResult<(&str, FieldType)> {
    let captures = ANNOTATION_PATTERN.captures(item).ok_or_else(|| {
        MosdexError::format(format!(
            "SELECT item '{}' lacks a '<name> -- <TYPE>' annotation",
            item
        ))
    })?;

    match (captures.get(1), captures.get(2)) {
        (Some(name), Some(keyword)) => Ok((name.as_str(), FieldType::parse(keyword.as_str())?)),
        _ => Err(MosdexError::format(format!(
            "SELECT item '{}' lacks a '<name> -- <TYPE>' annotation",
            item
        ))),
    }
}
