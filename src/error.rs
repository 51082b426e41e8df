//! Error types shared by the query, schema, resolver and ingestion layers.
//!
//! Every error is fatal for the call that produced it. Nothing in the crate
//! recovers from one of these and carries on with a partial result; callers
//! that want best-effort behavior decide table by table at the call boundary.

use std::io;

use thiserror::Error;

/// Result type for MOSDEX operations.
pub type MosdexResult<T> = Result<T, MosdexError>;

/// Errors raised while translating, scanning, resolving or ingesting tables.
#[derive(Error, Debug)]
pub enum MosdexError {
    /// Malformed clause shape or table declaration.
    #[error("format error: {0}")]
    Format(String),

    /// A recursive traversal went deeper than the configured ceiling.
    #[error("{context}: nesting exceeds the depth limit of {limit}")]
    DepthLimit {
        /// Which traversal hit the limit, and where.
        context: String,
        /// The ceiling that was exceeded.
        limit: usize,
    },

    /// A table is reachable from itself through its dependencies.
    #[error("circular reference: table '{table}' depends on '{dependency}' ({})", .cycle.join(" -> "))]
    CircularReference {
        /// The table whose dependency closed the cycle.
        table: String,
        /// The dependency that was already on the active path.
        dependency: String,
        /// The active path from `dependency` back around to itself.
        cycle: Vec<String>,
    },

    /// A declared schema disagrees with the schema derived from the query.
    #[error("schema mismatch for table '{table}': declared [{declared}], query selects [{derived}]")]
    SchemaMismatch {
        table: String,
        declared: String,
        derived: String,
    },

    /// No table with this name exists in the collection.
    #[error("unknown table: '{0}'")]
    UnknownTable(String),

    /// The external SQL engine rejected a statement.
    #[error("engine failed to execute query for table '{table}': {message}")]
    Engine { table: String, message: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl MosdexError {
    /// Create a format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Create a depth-limit error.
    pub fn depth_limit(context: impl Into<String>, limit: usize) -> Self {
        Self::DepthLimit {
            context: context.into(),
            limit,
        }
    }

    /// Check if this error is a circular reference between tables.
    pub fn is_circular_reference(&self) -> bool {
        matches!(self, Self::CircularReference { .. })
    }

    /// Check if this error came from a depth ceiling.
    pub fn is_depth_limit(&self) -> bool {
        matches!(self, Self::DepthLimit { .. })
    }

    /// Check if this error is a format error.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}

/// Recursion ceilings applied by every recursive traversal in the crate.
///
/// The translator, the dependency scanner and the resolver all count object
/// nesting the same way and fail once it passes `max_depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_depth: usize,
}

impl Limits {
    /// The fixed ceiling used when nothing else is configured.
    pub const DEFAULT_MAX_DEPTH: usize = 7;

    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Fail with a depth-limit error if `depth` is past the ceiling.
    pub fn check(&self, depth: usize, context: impl FnOnce() -> String) -> MosdexResult<()> {
        if depth > self.max_depth {
            return Err(MosdexError::depth_limit(context(), self.max_depth));
        }
        Ok(())
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}
