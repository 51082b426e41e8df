use mosdex::model::{load_document, load_file, TableBody, TableClass};
use mosdex::{FieldType, MosdexError};

fn fixture() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/shipping.json")
}

fn one_table(table: &str) -> String {
    format!(r#"{{"MODULES": [{{"NAME": "m", "TABLES": [{}]}}]}}"#, table)
}

#[test]
fn test_load_fixture() {
    let document = load_file(fixture()).unwrap();

    assert_eq!(document.syntax.as_deref(), Some("MOSDEX/v2-0"));
    assert_eq!(document.modules.len(), 2);
    assert_eq!(document.modules[0].tables, vec!["routes", "plants"]);
    assert_eq!(
        document.tables.names().collect::<Vec<_>>(),
        vec!["routes", "plants", "supply", "flow", "cost", "solution"]
    );

    let routes = document.tables.get("routes").unwrap();
    assert_eq!(routes.class(), &TableClass::Data);
    assert_eq!(routes.instance().unwrap().row_count(), 4);

    let plants = document.tables.get("plants").unwrap();
    assert_eq!(plants.schema().unwrap().get("Capacity"), Some(FieldType::Double));

    let supply = document.tables.get("supply").unwrap();
    assert_eq!(supply.class(), &TableClass::Constraint);
    assert_eq!(supply.kind(), "LINEAR");
    assert_eq!(supply.module(), Some("shipping_model"));
    assert_eq!(
        supply.schema().unwrap().names().collect::<Vec<_>>(),
        vec!["Name", "UpperBound"]
    );

    let solution = document.tables.get("solution").unwrap();
    assert_eq!(solution.body(), &TableBody::Empty);
}

#[test]
fn test_class_defaults_to_data() {
    let document = load_document(&one_table(r#"{"NAME": "t", "KIND": "INPUT"}"#)).unwrap();
    assert_eq!(document.tables.get("t").unwrap().class(), &TableClass::Data);
}

#[test]
fn test_unknown_class_is_kept() {
    let document = load_document(&one_table(r#"{"NAME": "t", "CLASS": "LAGRANGIAN"}"#)).unwrap();
    assert_eq!(
        document.tables.get("t").unwrap().class(),
        &TableClass::Other("LAGRANGIAN".to_string())
    );
}

#[test]
fn test_instance_and_query_are_exclusive() {
    let err = load_document(&one_table(
        r#"{"NAME": "t",
            "SCHEMA": {"KEYS": ["X"], "TYPES": ["STRING"]},
            "INSTANCE": [["a"]],
            "QUERY": {"SELECT": ["x AS X -- STRING"], "FROM": ["r"]}}"#,
    ))
    .unwrap_err();
    assert!(err.is_format());
}

#[test]
fn test_instance_row_width_checked() {
    let err = load_document(&one_table(
        r#"{"NAME": "t", "SCHEMA": {"KEYS": ["X", "Y"], "TYPES": ["STRING", "DOUBLE"]},
            "INSTANCE": [["a", 1.0], ["b"]]}"#,
    ))
    .unwrap_err();
    assert!(err.to_string().contains("table 't'"), "{err}");
}

#[test]
fn test_declared_schema_must_match_query() {
    let err = load_document(&one_table(
        r#"{"NAME": "flow",
            "SCHEMA": {"KEYS": ["Name"], "TYPES": ["DOUBLE"]},
            "QUERY": {"SELECT": ["'x' AS Name -- STRING"], "FROM": ["routes"]}}"#,
    ))
    .unwrap_err();

    match err {
        MosdexError::SchemaMismatch {
            table,
            declared,
            derived,
        } => {
            assert_eq!(table, "flow");
            assert_eq!(declared, "Name DOUBLE");
            assert_eq!(derived, "Name STRING");
        }
        other => panic!("expected a schema mismatch, got {other}"),
    }
}

#[test]
fn test_declared_schema_order_wins_when_it_matches() {
    let document = load_document(&one_table(
        r#"{"NAME": "flow",
            "SCHEMA": {"KEYS": ["Cost", "Name"], "TYPES": ["DOUBLE", "STRING"]},
            "QUERY": {"SELECT": ["'x' AS Name -- STRING", "1.0 AS Cost -- DOUBLE"],
                      "FROM": ["routes"]}}"#,
    ))
    .unwrap();

    let schema = document.tables.get("flow").unwrap().schema().unwrap();
    assert_eq!(schema.names().collect::<Vec<_>>(), vec!["Cost", "Name"]);
}

#[test]
fn test_duplicate_table_names_across_modules() {
    let err = load_document(
        r#"{"MODULES": [
            {"NAME": "a", "TABLES": [{"NAME": "t"}]},
            {"NAME": "b", "TABLES": [{"NAME": "t"}]}
        ]}"#,
    )
    .unwrap_err();
    assert!(err.is_format());
}

#[test]
fn test_null_clause_rejected() {
    let err = load_document(&one_table(
        r#"{"NAME": "t", "QUERY": {"SELECT": ["x AS X -- STRING"], "FROM": null}}"#,
    ))
    .unwrap_err();
    assert!(matches!(err, MosdexError::Json(_)));
}

#[test]
fn test_invalid_json() {
    assert!(matches!(
        load_document("{\"MODULES\": [").unwrap_err(),
        MosdexError::Json(_)
    ));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        load_file("/nonexistent/model.json").unwrap_err(),
        MosdexError::Io(_)
    ));
}
