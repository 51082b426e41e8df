//! MOSDEX table model.
//!
//! Tables are declared inside modules but share one namespace: a
//! [`TableCollection`] holds every table of an application, keyed by its
//! unique name. A table holds either materialized rows or a query that
//! produces them, never both.

pub mod loader;
pub mod table;

pub use loader::{load_document, load_file, Document, ModuleInfo};
pub use table::{Instance, Table, TableBody, TableClass, TableCollection};
