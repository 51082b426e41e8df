use mosdex::resolver::find_dependencies;
use mosdex::{Limits, Query};

fn query(json: &str) -> Query {
    Query::from_json_str(json).unwrap()
}

fn deps(q: &Query) -> Vec<String> {
    find_dependencies(q, 0, &Limits::default())
        .unwrap()
        .into_iter()
        .collect()
}

fn nested(levels: usize) -> Query {
    let mut q = Query::object([
        ("SELECT", Query::list([Query::literal("x")])),
        ("FROM", Query::list([Query::literal("base")])),
    ]);
    for _ in 0..levels {
        q = Query::object([("SELECT", Query::list([Query::literal("x")])), ("FROM", q)]);
    }
    q
}

#[test]
fn test_from_and_join_are_dependencies() {
    let q = query(
        r#"{"SELECT": ["a"], "FROM": ["routes"], "LEFT OUTER JOIN": ["plants"],
            "ON": ["routes.Origin = plants.Name"]}"#,
    );
    assert_eq!(deps(&q), vec!["routes", "plants"]);
}

#[test]
fn test_where_literals_are_ignored() {
    let q = query(r#"{"SELECT": ["a -- STRING"], "WHERE": ["otherTable.flag = 1"]}"#);
    assert!(deps(&q).is_empty());
}

#[test]
fn test_suffixed_joins_match_plain_joins() {
    let suffixed = query(r#"{"SELECT": ["a"], "FROM": ["x"], "JOIN#1": ["y"], "JOIN#2": ["z"]}"#);
    let plain = Query::object([
        ("SELECT", Query::list([Query::literal("a")])),
        ("FROM", Query::list([Query::literal("x")])),
        ("JOIN", Query::list([Query::literal("y")])),
    ]);

    assert_eq!(deps(&suffixed), vec!["x", "y", "z"]);
    assert_eq!(deps(&plain), vec!["x", "y"]);
}

#[test]
fn test_subquery_dependencies_are_collected() {
    let q = query(
        r#"{"SELECT": ["a"],
            "FROM": {"SELECT": ["b"], "FROM": ["routes"]},
            "WHERE": [{"SELECT": ["c"], "FROM": ["plants"]}]}"#,
    );
    assert_eq!(deps(&q), vec!["routes", "plants"]);
}

#[test]
fn test_repeated_and_blank_names() {
    let q = query(r#"{"FROM": [" routes ", "routes", ""], "JOIN": "routes"}"#);
    assert_eq!(deps(&q), vec!["routes"]);
}

#[test]
fn test_top_level_must_be_an_object() {
    let err = find_dependencies(&Query::literal("routes"), 0, &Limits::default()).unwrap_err();
    assert!(err.is_format());

    let err = find_dependencies(&Query::list([]), 0, &Limits::default()).unwrap_err();
    assert!(err.is_format());
}

#[test]
fn test_nested_list_is_a_format_error() {
    let q = query(r#"{"FROM": [["routes"]]}"#);
    assert!(find_dependencies(&q, 0, &Limits::default()).unwrap_err().is_format());
}

#[test]
fn test_depth_fuse() {
    assert_eq!(deps(&nested(7)), vec!["base"]);

    let err = find_dependencies(&nested(8), 0, &Limits::default()).unwrap_err();
    assert!(err.is_depth_limit());
}

#[test]
fn test_depth_counts_from_the_given_start() {
    let err = find_dependencies(&nested(3), 5, &Limits::default()).unwrap_err();
    assert!(err.is_depth_limit());
}
