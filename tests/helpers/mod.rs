#![allow(dead_code)]

use serde_json::{Value, json};

use formbind::data::{FormState, QueryResultItem, Session, SqlQueryResult};
use formbind::process::{ProcessContext, ProcessMode, ProcessReport, process_components};
use formbind::schema::{Component, FormSchema};

// =============================================================================
// Schema builders
// =============================================================================

pub fn component(value: Value) -> Component {
    serde_json::from_value(value).unwrap()
}

pub fn schema_of(components: Vec<Value>) -> FormSchema {
    serde_json::from_value(json!({ "components": components })).unwrap()
}

pub fn select(key: &str, table: &str) -> Value {
    json!({"key": key, "type": "select", "table": table})
}

pub fn datagrid(key: &str, children: Vec<Value>) -> Value {
    json!({"key": key, "type": "datagrid", "components": children})
}

pub fn field(key: &str, table: &str) -> Value {
    json!({"key": key, "type": "textfield", "table": table})
}

// =============================================================================
// Event input builders
// =============================================================================

pub fn sql(table: &str, rows: Value) -> QueryResultItem {
    QueryResultItem::SqlQuery(SqlQueryResult {
        table: table.into(),
        data: rows.as_array().unwrap().clone(),
    })
}

pub fn graph(value: Value) -> QueryResultItem {
    QueryResultItem::Graph(value)
}

pub fn state_with_api(source: &str, items: Value) -> FormState {
    let mut state = FormState::default();
    let items = match items {
        Value::Array(items) => items,
        other => vec![other],
    };
    state.api_results.insert(source.into(), items);
    state
}

// =============================================================================
// Dispatcher drivers
// =============================================================================

pub fn render(
    schema: &mut FormSchema,
    query_data: &[QueryResultItem],
    form_state: &mut FormState,
) -> ProcessReport {
    run(schema, query_data, form_state, None, ProcessMode::Render)
}

pub fn change(
    schema: &mut FormSchema,
    query_data: &[QueryResultItem],
    form_state: &mut FormState,
    changed_key: &str,
) -> ProcessReport {
    run(
        schema,
        query_data,
        form_state,
        None,
        ProcessMode::Change {
            changed_key: changed_key.into(),
        },
    )
}

pub fn run(
    schema: &mut FormSchema,
    query_data: &[QueryResultItem],
    form_state: &mut FormState,
    session: Option<&Session>,
    mode: ProcessMode,
) -> ProcessReport {
    let mut ctx = ProcessContext {
        query_data,
        form_state,
        session,
        mode,
    };
    process_components(schema, &mut ctx)
}

// =============================================================================
// Assertions on grid output
// =============================================================================

pub fn grid_rows(component: &Component) -> Vec<serde_json::Map<String, Value>> {
    component
        .default_value
        .as_array()
        .expect("grid defaultValue is an array")
        .iter()
        .map(|row| row.as_object().expect("grid row is an object").clone())
        .collect()
}
