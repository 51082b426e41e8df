//! Ingestion of MOSDEX JSON documents.
//!
//! A document groups tables into modules:
//!
//! ```json
//! {
//!   "SYNTAX": "MOSDEX/v2-0",
//!   "MODULES": [{
//!     "NAME": "shipping", "CLASS": "MODULE", "KIND": "INPUT",
//!     "TABLES": [
//!       {"NAME": "routes", "CLASS": "DATA", "KIND": "INPUT",
//!        "SCHEMA": {"KEYS": ["Origin", "Capacity"], "TYPES": ["STRING", "DOUBLE"]},
//!        "INSTANCE": [["Seattle", 350.0]]},
//!       {"NAME": "flow", "CLASS": "VARIABLE", "KIND": "CONTINUOUS",
//!        "QUERY": {"SELECT": ["routes.Origin AS Origin -- STRING"], "FROM": ["routes"]}}
//!     ]
//!   }]
//! }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use mosdex::model::loader::load_file;
//!
//! let document = load_file("shipping.json")?;
//! println!("{} tables", document.tables.len());
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{Instance, Table, TableClass, TableCollection};
use crate::error::{MosdexError, MosdexResult};
use crate::query::Query;
use crate::schema::{extract_schema, Schema};

/// A loaded document: module headers plus every table across all modules.
#[derive(Debug, Clone)]
pub struct Document {
    pub syntax: Option<String>,
    pub modules: Vec<ModuleInfo>,
    pub tables: TableCollection,
}

/// Header of one module and the names of the tables it declared.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInfo {
    pub name: String,
    pub class: Option<String>,
    pub kind: Option<String>,
    pub tables: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "SYNTAX", default)]
    syntax: Option<String>,
    #[serde(rename = "MODULES", default)]
    modules: Vec<RawModule>,
}

#[derive(Debug, Deserialize)]
struct RawModule {
    #[serde(rename = "NAME")]
    name: String,
    #[serde(rename = "CLASS", default)]
    class: Option<String>,
    #[serde(rename = "KIND", default)]
    kind: Option<String>,
    #[serde(rename = "TABLES", default)]
    tables: Vec<RawTable>,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(rename = "NAME")]
    name: String,
    #[serde(rename = "CLASS", default = "default_class")]
    class: String,
    #[serde(rename = "KIND", default)]
    kind: String,
    #[serde(rename = "SCHEMA", default)]
    schema: Option<RawSchema>,
    #[serde(rename = "INSTANCE", default)]
    instance: Option<Vec<Vec<Value>>>,
    #[serde(rename = "QUERY", default)]
    query: Option<Query>,
}

#[derive(Debug, Deserialize)]
struct RawSchema {
    #[serde(rename = "KEYS", alias = "FIELD_NAMES")]
    keys: Vec<String>,
    #[serde(rename = "TYPES", alias = "FIELD_TYPES")]
    types: Vec<String>,
}

fn default_class() -> String {
    "DATA".to_string()
}

/// Load a document from a file.
pub fn load_file<P: AsRef<Path>>(path: P) -> MosdexResult<Document> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading MOSDEX document");
    let content = fs::read_to_string(path)?;
    load_document(&content)
}

/// Load a document from JSON text.
pub fn load_document(json: &str) -> MosdexResult<Document> {
    let raw: RawDocument = serde_json::from_str(json)?;

    let mut tables = TableCollection::new();
    let mut modules = Vec::with_capacity(raw.modules.len());

    for module in raw.modules {
        let mut names = Vec::with_capacity(module.tables.len());
        for raw_table in module.tables {
            let table = ingest_table(raw_table, &module.name)?;
            names.push(table.name().to_string());
            tables.insert(table)?;
        }
        modules.push(ModuleInfo {
            name: module.name,
            class: module.class,
            kind: module.kind,
            tables: names,
        });
    }

    info!(
        modules = modules.len(),
        tables = tables.len(),
        "loaded MOSDEX document"
    );

    Ok(Document {
        syntax: raw.syntax,
        modules,
        tables,
    })
}

fn ingest_table(raw: RawTable, module: &str) -> MosdexResult<Table> {
    let name = raw.name;
    let in_table = |err: MosdexError| match err {
        MosdexError::Format(message) => {
            MosdexError::Format(format!("table '{}': {}", name, message))
        }
        other => other,
    };

    let declared = raw
        .schema
        .map(|s| Schema::from_declaration(&s.keys, &s.types))
        .transpose()
        .map_err(in_table)?;

    let table = Table::new(name.clone(), TableClass::from(raw.class), raw.kind).in_module(module);

    match (raw.instance, raw.query) {
        (Some(_), Some(_)) => Err(in_table(MosdexError::format(
            "declares both an INSTANCE and a QUERY",
        ))),
        (Some(rows), None) => {
            let schema = declared
                .ok_or_else(|| in_table(MosdexError::format("INSTANCE requires a SCHEMA")))?;
            let instance = Instance::new(schema, rows).map_err(in_table)?;
            Ok(table.with_instance(instance))
        }
        (None, Some(query)) => {
            let derived = extract_schema(&query).map_err(in_table)?;
            let schema = match declared {
                Some(declared) if !declared.matches(&derived) => {
                    return Err(MosdexError::SchemaMismatch {
                        table: name.clone(),
                        declared: declared.to_string(),
                        derived: derived.to_string(),
                    });
                }
                Some(declared) => declared,
                None => derived,
            };
            Ok(table.with_schema(schema).with_query(query))
        }
        (None, None) => Ok(match declared {
            Some(schema) => table.with_schema(schema),
            None => table,
        }),
    }
}
