//! Option builders for select, editgrid and selectboxes components.
//!
//! Options come from, in priority order: query data matching `table`,
//! external `apiSource` items, then the authored `defaultValue`.

use serde_json::{Map, Value};

use crate::data::{Session, display_string, find_rows};
use crate::error::EngineError;
use crate::schema::{Component, OptionPair, SelectData};

use super::ProcessContext;

pub fn process_select(
    component: &mut Component,
    ctx: &mut ProcessContext<'_>,
) -> Result<(), EngineError> {
    let rows = source_rows(component, ctx);
    if !rows.is_empty() {
        let mut options = build_options(&rows, component);
        dedup_by_value(&mut options);
        if component.sort {
            sort_by_label(&mut options);
        }
        let data = component.data.get_or_insert_with(SelectData::default);
        data.values = options;
    }
    // No source rows: authored `data.values` stays as-is.

    publish_default(component, ctx);
    Ok(())
}

pub fn process_editgrid(
    component: &mut Component,
    ctx: &mut ProcessContext<'_>,
) -> Result<(), EngineError> {
    if component.children().is_empty() {
        return Err(EngineError::process(
            "C101",
            format!("Grid '{}' declares no sub-components", component.key),
            Some(component.key.clone()),
        ));
    }

    let rows = source_rows(component, ctx);
    let mut options = build_options(&rows, component);
    if component.sort {
        sort_by_label(&mut options);
    }

    // Editgrid renderers read a top-level `values` list.
    let values = serde_json::to_value(options).unwrap_or(Value::Array(vec![]));
    component.extra.insert("values".into(), values);

    publish_default(component, ctx);
    Ok(())
}

pub fn process_selectboxes(
    component: &mut Component,
    ctx: &mut ProcessContext<'_>,
) -> Result<(), EngineError> {
    let rows = source_rows(component, ctx);
    let allowed: Vec<Value> = rows
        .into_iter()
        .filter(|row| role_allows(row, ctx.session))
        .collect();

    let mut options = build_options(&allowed, component);
    if component.sort {
        sort_by_label(&mut options);
    }

    // Checked state: carry existing true marks forward for surviving
    // options, everything else defaults unchecked.
    let existing = component.default_value.as_object().cloned().unwrap_or_default();
    let mut checked = Map::new();
    for option in &options {
        let key = display_string(&option.value);
        let was_checked = existing.get(&key).and_then(Value::as_bool).unwrap_or(false);
        checked.insert(key, Value::Bool(was_checked));
    }
    component.default_value = Value::Object(checked);

    let data = component.data.get_or_insert_with(SelectData::default);
    data.values = options;
    Ok(())
}

/// Default handler for leaf and unknown component types: pull the
/// current value out of the form state.
pub fn process_default(
    component: &mut Component,
    ctx: &mut ProcessContext<'_>,
) -> Result<(), EngineError> {
    if let Some(value) = ctx.form_state.data.get(&component.key) {
        component.default_value = value.clone();
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Source selection and option mapping
// ---------------------------------------------------------------------------

fn source_rows(component: &Component, ctx: &ProcessContext<'_>) -> Vec<Value> {
    if let Some(table) = &component.table {
        if let Some(rows) = find_rows(ctx.query_data, table) {
            if !rows.is_empty() {
                return rows.to_vec();
            }
        }
    }
    if let Some(api) = &component.api_source {
        if let Some(items) = ctx.form_state.items_for(api) {
            if !items.is_empty() {
                return items;
            }
        }
    }
    match &component.default_value {
        Value::Array(rows) => rows.clone(),
        _ => Vec::new(),
    }
}

fn build_options(rows: &[Value], component: &Component) -> Vec<OptionPair> {
    let label_key = component.label_property.as_deref().unwrap_or("name");
    let value_key = component.value_property.as_deref().unwrap_or("id");

    rows.iter()
        .map(|row| {
            let value = row
                .get(value_key)
                .or_else(|| row.get("value"))
                .cloned()
                .unwrap_or(Value::Null);
            let label = row
                .get(label_key)
                .or_else(|| row.get("label"))
                .cloned()
                .unwrap_or_else(|| value.clone());
            OptionPair { label, value }
        })
        .collect()
}

fn dedup_by_value(options: &mut Vec<OptionPair>) {
    let mut seen: Vec<Value> = Vec::new();
    options.retain(|option| {
        if seen.contains(&option.value) {
            false
        } else {
            seen.push(option.value.clone());
            true
        }
    });
}

fn sort_by_label(options: &mut [OptionPair]) {
    options.sort_by_key(|option| display_string(&option.label));
}

/// An option row may restrict itself to a role (`requiredRole`) or a
/// minimum rank on the session's ladder (`minRole`).
fn role_allows(row: &Value, session: Option<&Session>) -> bool {
    let required = row.get("requiredRole").and_then(Value::as_str);
    let min = row.get("minRole").and_then(Value::as_str);
    if required.is_none() && min.is_none() {
        return true;
    }
    let Some(session) = session else {
        return false;
    };
    if let Some(role) = required {
        if !session.has_role(role) {
            return false;
        }
    }
    if let Some(role) = min {
        if !session.satisfies_min(role) {
            return false;
        }
    }
    true
}

fn publish_default(component: &Component, ctx: &mut ProcessContext<'_>) {
    if !component.default_value.is_null() && !component.key.is_empty() {
        ctx.form_state
            .data
            .insert(component.key.clone(), component.default_value.clone());
    }
}
