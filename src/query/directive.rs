//! Directive keys.
//!
//! A clause key is a directive such as `FROM` or `JOIN`, optionally followed
//! by `#n` so that a JSON object can hold the same directive more than once
//! (`JOIN#1`, `JOIN#2`). Everything that interprets a key goes through
//! [`directive_name`] so the suffix is stripped in exactly one place.

/// Directives whose literal predicates name another table.
///
/// Matching is exact: case and spacing must be as written here.
pub const DEPENDENCY_DIRECTIVES: [&str; 7] = [
    "FROM",
    "JOIN",
    "NATURAL JOIN",
    "LEFT OUTER JOIN",
    "RIGHT OUTER JOIN",
    "FULL OUTER JOIN",
    "CROSS JOIN",
];

/// The directive a raw key stands for: everything before the first `#`.
///
/// The suffix is not validated; `JOIN#`, `JOIN#x` and `JOIN#1#2` all
/// yield `JOIN`.
pub fn directive_name(key: &str) -> &str {
    match key.split_once('#') {
        Some((name, _)) => name,
        None => key,
    }
}

/// Does a literal under this directive reference another table?
pub fn is_dependency_directive(directive: &str) -> bool {
    DEPENDENCY_DIRECTIVES.contains(&directive)
}
