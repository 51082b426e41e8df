//! SQL generation from table queries.
//!
//! Clause trees are rendered textually: directive keys become SQL keywords
//! as written, literals are passed through, and inline `-- TYPE` annotations
//! on SELECT items are kept so the statement can be handed verbatim to an
//! engine that accepts ANSI-flavored SQL with line comments.

mod translate;

pub use translate::{translate, translate_with};
