//! Rendering of clause trees into SQL text.
//!
//! Each node kind renders on its own:
//!
//! - literal: verbatim, with a comma placed before an inline `-- TYPE`
//!   annotation so the annotated field stays separated from the next one
//! - list: elements joined by `", "`, or by a newline once the list text so
//!   far holds an annotation (its comma is already in place), then a newline
//! - object: `(`, one `DIRECTIVE predicate` per entry on its own line, `)`
//!
//! The top-level call drops the outermost parentheses and one trailing
//! newline, so `{"SELECT": ["'x' AS Y -- STRING"], "FROM": ["routes"]}`
//! renders as
//!
//! ```text
//! SELECT 'x' AS Y, -- STRING
//! FROM routes
//! ```

use tracing::trace;

use crate::error::{Limits, MosdexResult};
use crate::query::{directive_name, Query};

/// Delimiter between a SELECT expression and its type annotation.
const TYPE_COMMENT: &str = " --";

/// A type annotation with its separating comma in place.
const SEPARATED_TYPE_COMMENT: &str = ", --";

/// Translate a clause tree into one SQL statement using the default
/// depth ceiling.
pub fn translate(query: &Query) -> MosdexResult<String> {
    translate_with(query, &Limits::default())
}

/// Translate a clause tree into one SQL statement.
///
/// Fails with a depth-limit error when subqueries nest deeper than
/// `limits.max_depth` objects (list levels do not count).
pub fn translate_with(query: &Query, limits: &Limits) -> MosdexResult<String> {
    let mut sql = render(query, 0, limits)?;

    if sql.ends_with('\n') {
        sql.pop();
    }
    // Only an object root carries parentheses added by `render_object`.
    if query.is_object() && sql.starts_with('(') && sql.ends_with(')') {
        sql = sql[1..sql.len() - 1].to_string();
    }

    trace!(%sql, "translated query");
    Ok(sql)
}

fn render(node: &Query, depth: usize, limits: &Limits) -> MosdexResult<String> {
    match node {
        Query::Literal(text) => Ok(render_literal(text)),
        Query::List(items) => render_list(items, depth, limits),
        Query::Object(_) => render_object(node, depth, limits),
    }
}

fn render_literal(text: &str) -> String {
    if text.contains(SEPARATED_TYPE_COMMENT) {
        // Already separated by the author.
        return text.to_string();
    }
    text.replace(TYPE_COMMENT, SEPARATED_TYPE_COMMENT)
}

fn render_list(items: &[Query], depth: usize, limits: &Limits) -> MosdexResult<String> {
    let mut out = String::new();

    for (i, item) in items.iter().enumerate() {
        let text = render(item, depth, limits)?;
        out.push_str(&text);

        if i + 1 < items.len() {
            if out.contains(SEPARATED_TYPE_COMMENT) {
                out.push('\n');
            } else {
                out.push_str(", ");
            }
        }
    }

    out.push('\n');
    Ok(out)
}

fn render_object(node: &Query, depth: usize, limits: &Limits) -> MosdexResult<String> {
    limits.check(depth, || format!("SQL translation of subquery at depth {}", depth))?;

    let Some(entries) = node.as_object() else {
        return Ok(String::new());
    };

    let mut out = String::from("(");
    for (i, (key, predicate)) in entries.iter().enumerate() {
        let child_depth = if predicate.is_object() { depth + 1 } else { depth };

        out.push_str(directive_name(key));
        out.push(' ');
        out.push_str(&render(predicate, child_depth, limits)?);

        if i + 1 < entries.len() && !out.ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str(")\n");

    Ok(out)
}
