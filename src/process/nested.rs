//! Nested grid recursion.
//!
//! A datagrid's children may themselves be datagrids. After the parent's
//! rows are materialized, each nested grid reads its own source rows from
//! an array field of the parent row and maps them with the same
//! copy-all-fields-plus-override rules, depth-first, parent before
//! children.

use serde_json::{Map, Value};

use crate::schema::{Component, ComponentType};

use super::content::expand_row_template;
use super::datagrid::ensure_image_sentinel;

/// Attach every nested grid child's rows under its key in the parent row.
pub fn attach_nested_grids(row: &mut Map<String, Value>, children: &[Component]) {
    for child in children {
        if child.component_type != ComponentType::Datagrid || child.key.is_empty() {
            continue;
        }
        let sub_components = child.children();
        let nested_rows = match find_source_items(row, sub_components) {
            Some(items) => items
                .iter()
                .map(|item| map_nested_row(item, sub_components))
                .collect(),
            None => vec![empty_nested_row(sub_components)],
        };
        row.insert(
            child.key.clone(),
            Value::Array(nested_rows.into_iter().map(Value::Object).collect()),
        );
    }
}

/// Locate the parent-row array the nested grid reads from.
///
/// Discovery is by name: the candidates are the last dot-segments of the
/// nested grid's declared table paths, and the first parent field holding
/// a non-empty array under a candidate name wins. Kept as one function so
/// an explicit source mapping can replace it without touching the
/// recursion.
fn find_source_items<'a>(
    row: &'a Map<String, Value>,
    sub_components: &[Component],
) -> Option<&'a Vec<Value>> {
    for name in candidate_source_names(sub_components) {
        if let Some(Value::Array(items)) = row.get(name) {
            if !items.is_empty() {
                return Some(items);
            }
        }
    }
    None
}

fn candidate_source_names(sub_components: &[Component]) -> impl Iterator<Item = &str> {
    sub_components
        .iter()
        .filter(|c| c.component_type != ComponentType::Content)
        .filter_map(|c| c.table.as_deref())
        .filter_map(|table| table.rsplit('.').next())
}

/// Same per-row mapping as the parent materializer: copy all source
/// fields, overlay per-component values, render content templates
/// (template-only, never matched against the array), enforce the image
/// sentinel, then recurse for deeper grids.
fn map_nested_row(item: &Value, sub_components: &[Component]) -> Map<String, Value> {
    let mut row = item.as_object().cloned().unwrap_or_default();

    for sub in sub_components {
        match sub.component_type {
            ComponentType::Content => {
                if let Some(template) = &sub.html {
                    let html = expand_row_template(template, &row);
                    row.insert(sub.key.clone(), Value::String(html));
                }
            }
            ComponentType::Datagrid => {}
            _ => {
                if !sub.key.is_empty() && !row.contains_key(&sub.key) {
                    row.insert(sub.key.clone(), Value::Null);
                }
            }
        }
    }

    ensure_image_sentinel(&mut row, sub_components);
    attach_nested_grids(&mut row, sub_components);
    row
}

/// No matching array in the parent row: one row, all fields null.
fn empty_nested_row(sub_components: &[Component]) -> Map<String, Value> {
    let mut row = Map::new();
    for sub in sub_components {
        if sub.component_type == ComponentType::Content || sub.key.is_empty() {
            continue;
        }
        row.insert(sub.key.clone(), Value::Null);
    }
    row
}
