// src/model/table.rs
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MosdexError, MosdexResult};
use crate::query::Query;
use crate::schema::Schema;

/// Role of a table in an optimization model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TableClass {
    Data,
    Variable,
    Constraint,
    Objective,
    Term,
    /// Any other class keyword, kept as written.
    Other(String),
}

impl TableClass {
    pub fn as_str(&self) -> &str {
        match self {
            TableClass::Data => "DATA",
            TableClass::Variable => "VARIABLE",
            TableClass::Constraint => "CONSTRAINT",
            TableClass::Objective => "OBJECTIVE",
            TableClass::Term => "TERM",
            TableClass::Other(name) => name,
        }
    }
}

impl From<&str> for TableClass {
    fn from(s: &str) -> Self {
        match s {
            "DATA" => TableClass::Data,
            "VARIABLE" => TableClass::Variable,
            "CONSTRAINT" => TableClass::Constraint,
            "OBJECTIVE" => TableClass::Objective,
            "TERM" => TableClass::Term,
            other => TableClass::Other(other.to_string()),
        }
    }
}

impl From<String> for TableClass {
    fn from(s: String) -> Self {
        TableClass::from(s.as_str())
    }
}

impl From<TableClass> for String {
    fn from(class: TableClass) -> Self {
        class.as_str().to_string()
    }
}

impl fmt::Display for TableClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Materialized rows of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub schema: Schema,
    pub rows: Vec<Vec<Value>>,
}

impl Instance {
    /// Create an instance; every row must have one value per schema field.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> MosdexResult<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != schema.len())
        {
            return Err(MosdexError::format(format!(
                "row {} has {} values but the schema has {} fields",
                i,
                row.len(),
                schema.len()
            )));
        }
        Ok(Self { schema, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// What a table currently holds. A table never holds both rows and a query.
#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    /// Declared only (e.g. an output table to be filled by the solver).
    Empty,
    Instance(Instance),
    /// To be executed to produce an instance.
    Query(Query),
}

/// A named table of a MOSDEX model.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    class: TableClass,
    kind: String,
    module: Option<String>,
    schema: Option<Schema>,
    body: TableBody,
}

impl Table {
    pub fn new(name: impl Into<String>, class: impl Into<TableClass>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            kind: kind.into(),
            module: None,
            schema: None,
            body: TableBody::Empty,
        }
    }

    /// Record the module that declared this table.
    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Give the table rows; its schema becomes the instance schema.
    pub fn with_instance(mut self, instance: Instance) -> Self {
        self.schema = Some(instance.schema.clone());
        self.body = TableBody::Instance(instance);
        self
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.body = TableBody::Query(query);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> &TableClass {
        &self.class
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    pub fn body(&self) -> &TableBody {
        &self.body
    }

    pub fn query(&self) -> Option<&Query> {
        match &self.body {
            TableBody::Query(query) => Some(query),
            _ => None,
        }
    }

    pub fn instance(&self) -> Option<&Instance> {
        match &self.body {
            TableBody::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn has_query(&self) -> bool {
        matches!(self.body, TableBody::Query(_))
    }

    pub fn has_instance(&self) -> bool {
        matches!(self.body, TableBody::Instance(_))
    }

    /// Replace the table's query with the rows it produced.
    ///
    /// Returns the consumed query. Fails if the table holds no query; a
    /// materialized table never goes back to being query-defined.
    pub fn materialize(&mut self, instance: Instance) -> MosdexResult<Query> {
        match std::mem::replace(&mut self.body, TableBody::Empty) {
            TableBody::Query(query) => {
                self.schema = Some(instance.schema.clone());
                self.body = TableBody::Instance(instance);
                Ok(query)
            }
            other => {
                self.body = other;
                Err(MosdexError::format(format!(
                    "table '{}' has no query to materialize",
                    self.name
                )))
            }
        }
    }
}

/// All tables of an application, across modules, keyed by unique name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCollection {
    tables: IndexMap<String, Table>,
}

impl TableCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table. Names must be unique across the whole collection.
    pub fn insert(&mut self, table: Table) -> MosdexResult<()> {
        if self.tables.contains_key(table.name()) {
            return Err(MosdexError::format(format!(
                "table '{}' is declared more than once",
                table.name()
            )));
        }
        self.tables.insert(table.name().to_string(), table);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// Look up a table, failing with [`MosdexError::UnknownTable`].
    pub fn require(&self, name: &str) -> MosdexResult<&Table> {
        self.get(name)
            .ok_or_else(|| MosdexError::UnknownTable(name.to_string()))
    }

    /// Tables in insertion order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
