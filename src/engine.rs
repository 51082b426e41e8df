//! Materialization of query-defined tables through an external SQL engine.
//!
//! ```text
//! TableCollection ──► TableResolver ──► execution order
//!                                            │
//!                     for each query table:  ▼
//!          translate + extract_schema ──► SqlEngine::execute ──► Instance
//! ```
//!
//! The engine is whatever can run the translated statements: a dataframe
//! engine, an embedded database, or a test double. It only sees tables whose
//! dependencies have already been materialized and registered with it.

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Limits, MosdexError, MosdexResult};
use crate::model::{Instance, TableCollection};
use crate::resolver::TableResolver;
use crate::schema::{extract_schema, Schema};
use crate::sql::translate_with;

/// An engine that can execute translated table queries.
pub trait SqlEngine {
    type Error: std::fmt::Display;

    /// Make a table's rows available to later statements under its name.
    fn register_instance(&mut self, table: &str, instance: &Instance) -> Result<(), Self::Error>;

    /// Run `sql` and return its rows, one value per field of `schema`.
    fn execute(&mut self, table: &str, sql: &str, schema: &Schema)
        -> Result<Vec<Vec<Value>>, Self::Error>;
}

/// A translated table query, ready to hand to an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedStatement {
    pub table: String,
    pub sql: String,
    pub schema: Schema,
}

/// Resolve the collection and return the execution order.
pub fn resolution_order(collection: &TableCollection, limits: &Limits) -> MosdexResult<Vec<String>> {
    TableResolver::new(collection.tables())?
        .with_limits(*limits)
        .resolve()
}

/// Translate every query table, in execution order, without running anything.
pub fn plan(collection: &TableCollection, limits: &Limits) -> MosdexResult<Vec<PlannedStatement>> {
    let order = resolution_order(collection, limits)?;

    let mut statements = Vec::new();
    for name in order {
        let Some(query) = collection.get(&name).and_then(|t| t.query()) else {
            continue;
        };
        statements.push(PlannedStatement {
            sql: translate_with(query, limits)?,
            schema: extract_schema(query)?,
            table: name,
        });
    }
    Ok(statements)
}

/// Execute every query table in dependency order, replacing each query with
/// the rows it produced.
///
/// Tables that already hold rows are registered with the engine first. Each
/// new instance is registered before the next statement runs. Returns the
/// names of the tables materialized, in execution order.
///
/// The first error aborts the pass and leaves `collection` untouched: new
/// instances are staged and only swapped into their tables once every
/// statement has run. The engine itself may still hold instances registered
/// before the failure.
pub fn materialize<E: SqlEngine>(
    collection: &mut TableCollection,
    engine: &mut E,
    limits: &Limits,
) -> MosdexResult<Vec<String>> {
    let order = resolution_order(collection, limits)?;

    for table in collection.tables() {
        if let Some(instance) = table.instance() {
            engine
                .register_instance(table.name(), instance)
                .map_err(|e| engine_error(table.name(), e))?;
        }
    }

    let mut staged = Vec::new();
    for name in order {
        let Some(table) = collection.get(&name) else {
            debug!(table = %name, "referenced name is not a table, skipping");
            continue;
        };
        let Some(query) = table.query() else {
            continue;
        };

        let sql = translate_with(query, limits)?;
        let schema = extract_schema(query)?;
        let rows = engine
            .execute(&name, &sql, &schema)
            .map_err(|e| engine_error(&name, e))?;

        let instance = Instance::new(schema, rows)?;
        engine
            .register_instance(&name, &instance)
            .map_err(|e| engine_error(&name, e))?;

        debug!(table = %name, rows = instance.row_count(), "executed table query");
        staged.push((name, instance));
    }

    let mut materialized = Vec::with_capacity(staged.len());
    for (name, instance) in staged {
        let table = collection
            .get_mut(&name)
            .ok_or_else(|| MosdexError::UnknownTable(name.clone()))?;
        info!(table = %name, rows = instance.row_count(), "materialized table");
        table.materialize(instance)?;
        materialized.push(name);
    }

    Ok(materialized)
}

fn engine_error(table: &str, err: impl std::fmt::Display) -> MosdexError {
    MosdexError::Engine {
        table: table.to_string(),
        message: err.to_string(),
    }
}
