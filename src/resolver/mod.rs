//! Execution ordering of query-defined tables.
//!
//! A table defined by a query can only be materialized once every table its
//! query reads from has been materialized. The resolver:
//!
//! 1. scans each table's query for the tables it references
//!    ([`TableResolver::find_dependencies`]),
//! 2. walks the resulting dependency map depth-first, appending a table to
//!    the resolution order once all of its dependencies are in it
//!    ([`TableResolver::resolve_dependencies`]),
//! 3. hands back that order ([`TableResolver::resolution_order`]).
//!
//! Each table moves through `NotYetConsidered -> Unresolved -> Resolved`.
//! Meeting an `Unresolved` table again while walking its own dependencies
//! means the tables form a cycle, which fails the whole pass.
//!
//! # Example
//!
//! ```ignore
//! let mut resolver = TableResolver::new(collection.tables())?;
//! resolver.find_dependencies()?;
//! resolver.resolve_dependencies()?;
//! for name in resolver.resolution_order() {
//!     // translate and execute `name`
//! }
//! ```

mod graph;
mod scanner;

pub use graph::DependencyGraph;
pub use scanner::find_dependencies;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use crate::error::{Limits, MosdexError, MosdexResult};
use crate::model::Table;
use crate::query::Query;

/// Where a table stands in the current resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    NotYetConsidered,
    /// On the active path of the depth-first walk.
    Unresolved,
    /// All dependencies satisfied; its place in the order is fixed.
    Resolved,
}

/// Mutable state of a resolution pass.
///
/// A name is never in both sets. After a successful pass `unresolved` is
/// empty and the order of `resolved` is the execution order.
#[derive(Debug, Clone, Default)]
pub struct ResolutionState {
    resolved: IndexSet<String>,
    unresolved: IndexSet<String>,
}

impl ResolutionState {
    pub fn status(&self, table: &str) -> TableState {
        if self.resolved.contains(table) {
            TableState::Resolved
        } else if self.unresolved.contains(table) {
            TableState::Unresolved
        } else {
            TableState::NotYetConsidered
        }
    }

    pub fn is_resolved(&self, table: &str) -> bool {
        self.resolved.contains(table)
    }

    /// Tables in the order they became resolved.
    pub fn resolved(&self) -> impl Iterator<Item = &str> {
        self.resolved.iter().map(String::as_str)
    }

    /// Tables currently on the active path, outermost first.
    pub fn active_path(&self) -> impl Iterator<Item = &str> {
        self.unresolved.iter().map(String::as_str)
    }

    fn mark_unresolved(&mut self, table: &str) {
        self.unresolved.insert(table.to_string());
    }

    fn mark_resolved(&mut self, table: &str) {
        self.unresolved.shift_remove(table);
        self.resolved.insert(table.to_string());
    }

    /// The active path from `dependency` to its end, closed back at
    /// `dependency`.
    fn cycle_through(&self, dependency: &str) -> Vec<String> {
        let start = self.unresolved.get_index_of(dependency).unwrap_or(0);
        let mut cycle: Vec<String> = self.unresolved.iter().skip(start).cloned().collect();
        cycle.push(dependency.to_string());
        cycle
    }
}

/// Computes a valid execution order for a set of tables.
///
/// The resolver only considers the tables it is given; callers that want to
/// skip tables of some class filter them before construction.
#[derive(Debug, Clone)]
pub struct TableResolver<'a> {
    /// Every table under consideration, in input order, with its query.
    tables: IndexMap<&'a str, Option<&'a Query>>,
    limits: Limits,
    /// Dependency sets of the tables that have a query.
    dependencies: IndexMap<String, IndexSet<String>>,
    state: ResolutionState,
}

impl<'a> TableResolver<'a> {
    /// Create a resolver over `tables`, in their iteration order.
    ///
    /// Fails with a format error if two tables share a name.
    pub fn new(tables: impl IntoIterator<Item = &'a Table>) -> MosdexResult<Self> {
        Self::from_queries(tables.into_iter().map(|t| (t.name(), t.query())))
    }

    /// Create a resolver from `(name, query)` pairs. Names must be unique.
    pub fn from_queries(
        tables: impl IntoIterator<Item = (&'a str, Option<&'a Query>)>,
    ) -> MosdexResult<Self> {
        let mut by_name = IndexMap::new();
        for (name, query) in tables {
            if by_name.insert(name, query).is_some() {
                return Err(MosdexError::format(format!(
                    "table '{}' is declared more than once",
                    name
                )));
            }
        }

        Ok(Self {
            tables: by_name,
            limits: Limits::default(),
            dependencies: IndexMap::new(),
            state: ResolutionState::default(),
        })
    }

    /// Set the recursion ceiling used by scanning and resolution.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Scan every table that has a query and record its dependency set.
    ///
    /// Replaces whatever a previous call recorded.
    pub fn find_dependencies(&mut self) -> MosdexResult<()> {
        let mut dependencies = IndexMap::new();

        for (name, query) in &self.tables {
            let Some(query) = query else {
                continue;
            };
            let deps = scanner::find_dependencies(query, 0, &self.limits)?;
            debug!(table = %name, dependencies = ?deps, "scanned table query");
            dependencies.insert(name.to_string(), deps);
        }

        self.dependencies = dependencies;
        Ok(())
    }

    /// Resolve every table in input order.
    ///
    /// Tables already resolved by an earlier call are skipped, so calling
    /// this twice leaves the order unchanged. On error nothing from this
    /// call is kept.
    pub fn resolve_dependencies(&mut self) -> MosdexResult<()> {
        let mut state = self.state.clone();

        for name in self.tables.keys() {
            if !state.is_resolved(name) {
                resolve_table(&self.dependencies, &mut state, name, 0, &self.limits)?;
            }
        }

        debug!(order = ?state.resolved, "resolved table order");
        self.state = state;
        Ok(())
    }

    /// Resolve one table, and everything it depends on, starting at `depth`.
    pub fn resolve_dependencies_for(&mut self, table: &str, depth: usize) -> MosdexResult<()> {
        let mut state = self.state.clone();
        resolve_table(&self.dependencies, &mut state, table, depth, &self.limits)?;
        self.state = state;
        Ok(())
    }

    /// Scan and resolve in one step, returning the execution order.
    pub fn resolve(&mut self) -> MosdexResult<Vec<String>> {
        self.find_dependencies()?;
        self.resolve_dependencies()?;
        Ok(self.resolution_order().map(str::to_string).collect())
    }

    /// Tables in execution order: every table comes after all of its
    /// dependencies. Ties are broken by input order.
    ///
    /// Referenced names that are not among the resolver's tables appear
    /// too, ahead of the tables that reference them.
    pub fn resolution_order(&self) -> impl Iterator<Item = &str> {
        self.state.resolved()
    }

    /// Dependency sets recorded by [`TableResolver::find_dependencies`].
    pub fn table_dependencies(&self) -> &IndexMap<String, IndexSet<String>> {
        &self.dependencies
    }

    /// Dependencies of one table; empty if it has no query.
    pub fn dependencies_of(&self, table: &str) -> impl Iterator<Item = &str> {
        self.dependencies
            .get(table)
            .into_iter()
            .flat_map(|deps| deps.iter().map(String::as_str))
    }

    pub fn state(&self) -> &ResolutionState {
        &self.state
    }

    /// Graph view of the recorded dependencies.
    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::from_dependencies(&self.dependencies)
    }
}

fn resolve_table(
    dependencies: &IndexMap<String, IndexSet<String>>,
    state: &mut ResolutionState,
    table: &str,
    depth: usize,
    limits: &Limits,
) -> MosdexResult<()> {
    limits.check(depth, || {
        format!("dependency resolution of table '{}' at depth {}", table, depth)
    })?;

    if state.is_resolved(table) {
        return Ok(());
    }
    state.mark_unresolved(table);

    if let Some(deps) = dependencies.get(table) {
        for dep in deps {
            match state.status(dep) {
                TableState::Resolved => continue,
                TableState::Unresolved => {
                    return Err(MosdexError::CircularReference {
                        table: table.to_string(),
                        dependency: dep.clone(),
                        cycle: state.cycle_through(dep),
                    });
                }
                TableState::NotYetConsidered => {
                    resolve_table(dependencies, state, dep, depth + 1, limits)?;
                }
            }
        }
    }

    state.mark_resolved(table);
    trace!(table, depth, "table resolved");
    Ok(())
}
