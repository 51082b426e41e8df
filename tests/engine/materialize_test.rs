use mosdex::engine::{materialize, plan, SqlEngine};
use mosdex::model::{load_file, Instance, Table, TableCollection};
use mosdex::{Limits, MosdexError, Query, Schema};
use serde_json::{json, Value};

fn fixture() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/shipping.json")
}

/// Records every call and answers each statement with one row naming the
/// table that asked for it.
#[derive(Default)]
struct RecordingEngine {
    registered: Vec<String>,
    executed: Vec<(String, String)>,
    fail_on: Option<String>,
}

impl SqlEngine for RecordingEngine {
    type Error = String;

    fn register_instance(&mut self, table: &str, _instance: &Instance) -> Result<(), String> {
        self.registered.push(table.to_string());
        Ok(())
    }

    fn execute(&mut self, table: &str, sql: &str, schema: &Schema) -> Result<Vec<Vec<Value>>, String> {
        if self.fail_on.as_deref() == Some(table) {
            return Err("no such column: plants.Capacity".to_string());
        }
        // Everything a statement reads must already be registered.
        for name in ["routes", "plants", "flow"] {
            if sql.contains(&format!("FROM {}", name)) || sql.contains(&format!("JOIN {}", name)) {
                assert!(self.registered.iter().any(|r| r == name), "{table} ran before {name}");
            }
        }
        self.executed.push((table.to_string(), sql.to_string()));
        Ok(vec![schema.names().map(|_| json!(table)).collect()])
    }
}

#[test]
fn test_materialize_fixture_in_dependency_order() {
    let mut tables = load_file(fixture()).unwrap().tables;
    let mut engine = RecordingEngine::default();

    let materialized = materialize(&mut tables, &mut engine, &Limits::default()).unwrap();

    assert_eq!(materialized, vec!["flow", "supply", "cost"]);
    assert_eq!(
        engine.registered,
        vec!["routes", "plants", "flow", "supply", "cost"]
    );
    assert_eq!(engine.executed[0].1, "SELECT 'x_' || routes.Origin || '_' || routes.Destination AS Name, -- STRING\nroutes.Origin AS Origin, -- STRING\n0.0 AS LowerBound, -- DOUBLE\nroutes.Cost AS Cost, -- DOUBLE\nFROM routes\n");

    for name in &materialized {
        let table = tables.get(name).unwrap();
        assert!(!table.has_query());
        assert_eq!(table.instance().unwrap().row_count(), 1);
    }
}

#[test]
fn test_engine_failure_names_the_table() {
    let mut tables = load_file(fixture()).unwrap().tables;
    let mut engine = RecordingEngine {
        fail_on: Some("supply".to_string()),
        ..Default::default()
    };

    match materialize(&mut tables, &mut engine, &Limits::default()).unwrap_err() {
        MosdexError::Engine { table, message } => {
            assert_eq!(table, "supply");
            assert!(message.contains("plants.Capacity"));
        }
        other => panic!("expected an engine error, got {other}"),
    }

    // flow ran before the failure, but nothing is swapped in.
    assert_eq!(engine.executed.len(), 1);
    assert_eq!(tables, load_file(fixture()).unwrap().tables);
    for name in ["flow", "supply", "cost"] {
        assert!(tables.get(name).unwrap().has_query(), "{name}");
    }
}

#[test]
fn test_cycle_stops_before_any_execution() {
    let mut tables = TableCollection::new();
    for (name, reads) in [("a", "b"), ("b", "a")] {
        let query = Query::from_json(&json!({"SELECT": ["x AS X -- STRING"], "FROM": [reads]})).unwrap();
        tables
            .insert(Table::new(name, "VARIABLE", "CONTINUOUS").with_query(query))
            .unwrap();
    }
    let mut engine = RecordingEngine::default();

    let err = materialize(&mut tables, &mut engine, &Limits::default()).unwrap_err();
    assert!(err.is_circular_reference());
    assert!(engine.executed.is_empty());
}

#[test]
fn test_plan_lists_query_tables_in_order() {
    let tables = load_file(fixture()).unwrap().tables;
    let statements = plan(&tables, &Limits::default()).unwrap();

    let names: Vec<&str> = statements.iter().map(|s| s.table.as_str()).collect();
    assert_eq!(names, vec!["flow", "supply", "cost"]);
    assert_eq!(statements[2].schema.to_string(), "Name STRING, Sense STRING");
    assert!(statements[1].sql.contains("JOIN flow"));
    assert!(!statements[1].sql.starts_with('('));
}
