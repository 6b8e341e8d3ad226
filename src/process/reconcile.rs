//! API reconciliation: overlay externally-fetched items onto rows.
//!
//! Source systems expose different identifying keys per relationship and
//! schemas rarely say which applies, so rows are matched to API items by
//! an ordered cascade, first match wins. The cascade order is load-bearing
//! observable behavior; each step is a named function so the order reads
//! as policy.

use serde_json::{Map, Value};

use crate::data::{FormState, is_empty_value, loose_eq};
use crate::schema::Component;

/// Overlay API-sourced values onto already-materialized rows, one pass
/// per child component that declares an `apiSource`.
pub fn overlay_api_data(
    rows: &mut [Map<String, Value>],
    children: &[Component],
    state: &FormState,
) {
    for child in children {
        let Some(api) = &child.api_source else {
            continue;
        };
        let Some(items) = state.items_for(api) else {
            log::debug!(
                "component '{}': api source '{}' not present in form state",
                child.key,
                api.source
            );
            continue;
        };
        if items.is_empty() {
            continue;
        }

        let value_key = api.value_key.as_deref().unwrap_or(&child.key);
        for (index, row) in rows.iter_mut().enumerate() {
            let Some((item, strategy)) = match_item(row, &items, &api.source, index) else {
                // A miss leaves the row's query-derived values intact.
                continue;
            };
            if strategy == "positional" {
                log::warn!(
                    "component '{}': row {} matched api source '{}' only by position",
                    child.key,
                    index,
                    api.source
                );
            } else {
                log::debug!(
                    "component '{}': row {} matched api source '{}' via {}",
                    child.key,
                    index,
                    api.source,
                    strategy
                );
            }

            let Some(value) = item.get(value_key) else {
                continue;
            };
            if child.key == "image" {
                // Never downgrade a resolved image back to the sentinel.
                if is_empty_value(value) {
                    continue;
                }
            }
            row.insert(child.key.clone(), value.clone());
        }
    }
}

/// The matching cascade. Returns the item and the strategy that found it.
fn match_item<'a>(
    row: &Map<String, Value>,
    items: &'a [Value],
    source: &str,
    row_index: usize,
) -> Option<(&'a Value, &'static str)> {
    if let Some(item) = match_by_pk(row, items) {
        return Some((item, "pk"));
    }
    if let Some(item) = match_by_sub_part(row, items) {
        return Some((item, "sub_part_id"));
    }
    if let Some(item) = match_by_field_scan(row, items) {
        return Some((item, "field scan"));
    }
    if let Some(item) = match_by_source_rule(row, items, source) {
        return Some((item, "source rule"));
    }
    items.get(row_index).map(|item| (item, "positional"))
}

fn match_by_pk<'a>(row: &Map<String, Value>, items: &'a [Value]) -> Option<&'a Value> {
    let pk = row.get("pk")?;
    items.iter().find(|item| {
        item.get("pk")
            .is_some_and(|candidate| loose_eq(candidate, pk))
    })
}

fn match_by_sub_part<'a>(row: &Map<String, Value>, items: &'a [Value]) -> Option<&'a Value> {
    let sub_part_id = row.get("sub_part_id")?;
    items.iter().find(|item| {
        item.get("sub_part")
            .is_some_and(|candidate| loose_eq(candidate, sub_part_id))
    })
}

/// Scan the row's scalar fields (image fields excluded) against each
/// item's identifying keys. First hit wins, in row field order.
fn match_by_field_scan<'a>(row: &Map<String, Value>, items: &'a [Value]) -> Option<&'a Value> {
    for (field, value) in row {
        if field == "image" {
            continue;
        }
        if !matches!(value, Value::String(_) | Value::Number(_)) {
            continue;
        }
        let hit = items.iter().find(|item| {
            ["pk", "sub_part"].iter().any(|id_key| {
                item.get(*id_key)
                    .is_some_and(|candidate| loose_eq(candidate, value))
            })
        });
        if hit.is_some() {
            return hit;
        }
    }
    None
}

/// Per-source hard rules: a bill-of-materials collection identifies rows
/// by `sub_part`, a flat component list by `pk`.
fn match_by_source_rule<'a>(
    row: &Map<String, Value>,
    items: &'a [Value],
    source: &str,
) -> Option<&'a Value> {
    let pk = row.get("pk")?;
    let item_key = match source {
        "bom" => "sub_part",
        "partComponents" => "pk",
        _ => return None,
    };
    items.iter().find(|item| {
        item.get(item_key)
            .is_some_and(|candidate| loose_eq(candidate, pk))
    })
}
