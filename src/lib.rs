//! # MOSDEX
//!
//! Query dependency resolution and SQL translation for MOSDEX
//! optimization-model data.
//!
//! ## Architecture
//!
//! Tables in a MOSDEX document either carry their rows or a query that
//! derives them from other tables. This crate works out the order in which
//! query-defined tables can be produced and turns each query into SQL:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              MOSDEX document (JSON modules)              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [model::loader]
//! ┌─────────────────────────────────────────────────────────┐
//! │        TableCollection (rows | query clause trees)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolver: scan + topological order]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Execution order                       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::translate, schema::extract_schema]
//! ┌─────────────────────────────────────────────────────────┐
//! │         SQL + schema per table ──► engine::SqlEngine     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod query;
pub mod resolver;
pub mod schema;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::engine::{materialize, plan, PlannedStatement, SqlEngine};
    pub use crate::error::{Limits, MosdexError, MosdexResult};
    pub use crate::model::{Instance, Table, TableBody, TableClass, TableCollection};
    pub use crate::query::{directive_name, Query};
    pub use crate::resolver::{find_dependencies, DependencyGraph, TableResolver};
    pub use crate::schema::{extract_schema, FieldType, Schema};
    pub use crate::sql::{translate, translate_with};
}

// Also export at crate root for convenience
pub use error::{Limits, MosdexError, MosdexResult};
pub use query::Query;
pub use resolver::TableResolver;
pub use schema::{extract_schema, FieldType, Schema};
pub use sql::translate;
