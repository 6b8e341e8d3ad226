//! DataGrid row materialization.
//!
//! For each primary-path group a grid's children declare, every source
//! row becomes one output row: all source fields copied verbatim,
//! deeper-declared sibling fields overlaid, co-located content rendered,
//! and the image sentinel enforced. Rows then pass through API
//! reconciliation and nested-grid attachment.

use serde_json::{Map, Value};

use crate::data::grouping::{group_table_paths, primary_paths};
use crate::data::resolve::get_nested_data;
use crate::data::{find_rows, is_empty_value};
use crate::error::EngineError;
use crate::schema::{Component, ComponentType};

use super::content::expand_row_template;
use super::{ProcessContext, nested, reconcile};

/// Placeholder for an unresolved image field: "no evidence present",
/// as opposed to "not yet processed".
pub const UNKNOWN_IMAGE: &str = "unknown";

pub fn process_datagrid(
    component: &mut Component,
    ctx: &mut ProcessContext<'_>,
) -> Result<(), EngineError> {
    let children = match &component.components {
        Some(children) if !children.is_empty() => children.clone(),
        _ => {
            return Err(EngineError::process(
                "C101",
                format!("Grid '{}' declares no sub-components", component.key),
                Some(component.key.clone()),
            ));
        }
    };

    let declared: Vec<String> = children
        .iter()
        .filter(|c| c.component_type != ComponentType::Content)
        .filter_map(|c| c.table.clone())
        .collect();
    let groups = group_table_paths(&declared);

    let mut rows: Vec<Map<String, Value>> = Vec::new();
    for primary in primary_paths(&declared, &groups) {
        let Some(source_rows) = find_rows(ctx.query_data, &primary) else {
            log::debug!(
                "grid '{}': no dataset for table path '{}'",
                component.key,
                primary
            );
            continue;
        };
        for item in source_rows {
            rows.push(materialize_row(item, &primary, &children, &groups));
        }
    }

    reconcile::overlay_api_data(&mut rows, &children, ctx.form_state);

    for row in &mut rows {
        nested::attach_nested_grids(row, &children);
    }

    if rows.is_empty() {
        rows = fallback_rows(component, &children);
    }

    let value = Value::Array(rows.into_iter().map(Value::Object).collect());
    component.default_value = value.clone();
    ctx.form_state.data.insert(component.key.clone(), value);
    Ok(())
}

/// Build one output row from one source item.
fn materialize_row(
    item: &Value,
    primary: &str,
    children: &[Component],
    groups: &std::collections::HashMap<String, String>,
) -> Map<String, Value> {
    let mut row = item.as_object().cloned().unwrap_or_default();

    // Overlay sibling fields declared deeper than the primary path.
    for child in children {
        if child.component_type == ComponentType::Content {
            continue;
        }
        let Some(declared) = &child.table else {
            continue;
        };
        if declared == primary || groups.get(declared).map(String::as_str) != Some(primary) {
            continue;
        }
        let Some(suffix) = declared.strip_prefix(&format!("{primary}.")) else {
            continue;
        };

        let resolved = match get_nested_data(item, suffix) {
            Some(Value::Array(deeper)) => deeper.first(),
            other => other,
        };
        match resolved {
            Some(Value::Object(deep)) => {
                if let Some(value) = deep.get(&child.key) {
                    row.insert(child.key.clone(), value.clone());
                } else {
                    // The component's key isn't there: merge the deeper
                    // object's fields that the row doesn't already have.
                    for (key, value) in deep {
                        if !row.contains_key(key) {
                            row.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
            Some(scalar) => {
                row.insert(child.key.clone(), scalar.clone());
            }
            None => {}
        }
    }

    // Co-located content renders against the finished row fields.
    for child in children {
        if child.component_type != ComponentType::Content {
            continue;
        }
        if let Some(template) = &child.html {
            let html = expand_row_template(template, &row);
            row.insert(child.key.clone(), Value::String(html));
        }
    }

    ensure_image_sentinel(&mut row, children);
    row
}

/// Every row carrying a declared image component leaves with a real
/// value or the sentinel, never null/absent/empty.
pub(crate) fn ensure_image_sentinel(row: &mut Map<String, Value>, children: &[Component]) {
    if !children.iter().any(|c| c.key == "image") {
        return;
    }
    let missing = row.get("image").is_none_or(is_empty_value);
    if missing {
        row.insert("image".into(), Value::String(UNKNOWN_IMAGE.into()));
    }
}

/// No rows materialized: reuse the authored default rows if any,
/// otherwise synthesize one empty row so the renderer always has one.
fn fallback_rows(component: &Component, children: &[Component]) -> Vec<Map<String, Value>> {
    if let Value::Array(existing) = &component.default_value {
        let reused: Vec<Map<String, Value>> = existing
            .iter()
            .filter_map(Value::as_object)
            .cloned()
            .map(|mut row| {
                ensure_image_sentinel(&mut row, children);
                row
            })
            .collect();
        // Non-object entries drop out; an all-dropped array still needs
        // the synthesized row below.
        if !reused.is_empty() {
            return reused;
        }
    }

    let mut row = Map::new();
    for child in children {
        if child.component_type == ComponentType::Content || child.key.is_empty() {
            continue;
        }
        row.insert(child.key.clone(), Value::Null);
    }
    ensure_image_sentinel(&mut row, children);
    vec![row]
}
