//! Discovery of the tables a query reads from.
//!
//! Only literals that sit directly under a dependency-bearing directive
//! (`FROM`, `JOIN` and the other join forms) count as table references.
//! Predicates of every other directive are still walked, since they may hold
//! subqueries that do read from tables, but their literals are never
//! references: `otherTable.flag = 1` under `WHERE` is not a dependency.

use indexmap::IndexSet;

use crate::error::{Limits, MosdexError, MosdexResult};
use crate::query::{directive_name, is_dependency_directive, Query};

/// Collect the names of the tables `query` references, in first-seen order.
///
/// `depth` is the object nesting level of `query`; top-level queries start
/// at 0. Subqueries given directly as a predicate count one level deeper,
/// subqueries inside a list stay at the level of the list's owner. The scan
/// fails once the depth passes `limits.max_depth`, or on any node that is
/// not a directive-keyed object where one is required.
pub fn find_dependencies(
    query: &Query,
    depth: usize,
    limits: &Limits,
) -> MosdexResult<IndexSet<String>> {
    let mut dependencies = IndexSet::new();
    scan(query, depth, limits, &mut dependencies)?;
    Ok(dependencies)
}

fn scan(
    query: &Query,
    depth: usize,
    limits: &Limits,
    dependencies: &mut IndexSet<String>,
) -> MosdexResult<()> {
    limits.check(depth, || {
        format!("dependency scan of subquery at depth {}", depth)
    })?;

    let entries = query.as_object().ok_or_else(|| {
        MosdexError::format(format!(
            "query must be an object of directives, found a {}",
            query.kind_name()
        ))
    })?;

    for (key, predicate) in entries {
        let directive = directive_name(key);

        match predicate {
            Query::Literal(text) => {
                record(directive, text, dependencies);
            }
            Query::Object(_) => scan(predicate, depth + 1, limits, dependencies)?,
            Query::List(items) => {
                for item in items {
                    match item {
                        Query::Object(_) => scan(item, depth, limits, dependencies)?,
                        Query::Literal(text) => {
                            record(directive, text, dependencies);
                        }
                        Query::List(_) => {
                            return Err(MosdexError::format(format!(
                                "'{}' predicate holds a nested list",
                                key
                            )))
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// Record `text` as a dependency if `directive` names tables.
///
/// Returns whether it was recorded.
fn record(directive: &str, text: &str, dependencies: &mut IndexSet<String>) -> bool {
    if !is_dependency_directive(directive) {
        return false;
    }
    let name = text.trim();
    if name.is_empty() {
        return false;
    }
    dependencies.insert(name.to_string());
    true
}
