use mosdex::{extract_schema, FieldType, MosdexError, Query, Schema};

fn select(items: &[&str]) -> Query {
    Query::object([
        ("SELECT", Query::list(items.iter().map(|s| Query::literal(*s)))),
        ("FROM", Query::list([Query::literal("routes")])),
    ])
}

#[test]
fn test_extract_schema_in_select_order() {
    let schema = extract_schema(&select(&[
        "'ship' AS Name -- STRING",
        "routes.capacity AS UpperBound -- DOUBLE",
    ]))
    .unwrap();

    let fields: Vec<(&str, FieldType)> = schema.fields().collect();
    assert_eq!(
        fields,
        vec![("Name", FieldType::String), ("UpperBound", FieldType::Double)]
    );
    assert_eq!(schema.to_string(), "Name STRING, UpperBound DOUBLE");
}

#[test]
fn test_extract_schema_duplicate_field() {
    let err = extract_schema(&select(&["a AS Name -- STRING", "b AS Name -- DOUBLE"])).unwrap_err();
    assert!(matches!(err, MosdexError::Format(_)));
}

#[test]
fn test_extract_schema_unannotated_field() {
    let err = extract_schema(&select(&["'ship' AS Name -- STRING", "routes.capacity"])).unwrap_err();
    assert!(err.is_format());
}

#[test]
fn test_extract_schema_unknown_type() {
    let err = extract_schema(&select(&["x AS Name -- VARCHAR"])).unwrap_err();
    assert!(err.is_format());
    assert!(err.to_string().contains("VARCHAR"));
}

#[test]
fn test_extract_schema_function_types() {
    let schema = extract_schema(&select(&[
        "NULL AS Activity -- DOUBLE_FUNCTION",
        "NULL AS Dual -- IEEEDOUBLE_FUNCTION",
        "1 AS Count -- INTEGER",
    ]))
    .unwrap();

    assert!(schema.get("Activity").unwrap().is_function());
    assert_eq!(schema.get("Dual"), Some(FieldType::IeeeDoubleFunction));
    assert!(!schema.get("Count").unwrap().is_function());
}

#[test]
fn test_extract_schema_single_literal_select() {
    let q = Query::object([
        ("SELECT", Query::literal("routes.Origin AS Origin -- STRING")),
        ("FROM", Query::literal("routes")),
    ]);
    let schema = extract_schema(&q).unwrap();
    assert_eq!(schema.len(), 1);
}

#[test]
fn test_extract_schema_requires_select() {
    let q = Query::object([("FROM", Query::literal("routes"))]);
    assert!(extract_schema(&q).unwrap_err().is_format());
}

#[test]
fn test_schema_matches_ignores_field_order() {
    let declared = Schema::from_declaration(
        &["Cost".to_string(), "Name".to_string()],
        &["DOUBLE".to_string(), "STRING".to_string()],
    )
    .unwrap();
    let derived = extract_schema(&select(&["n AS Name -- STRING", "c AS Cost -- DOUBLE"])).unwrap();

    assert!(declared.matches(&derived));
    assert_ne!(
        declared.names().collect::<Vec<_>>(),
        derived.names().collect::<Vec<_>>()
    );
}

#[test]
fn test_schema_declaration_length_mismatch() {
    let err = Schema::from_declaration(&["Name".to_string()], &[]).unwrap_err();
    assert!(err.is_format());
}
