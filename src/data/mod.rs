//! Event inputs: fetched query datasets, per-event form state, session.

pub mod grouping;
pub mod resolve;

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::schema::ApiSource;

// =============================================================================
// QUERY RESULTS
// =============================================================================

/// One fetched dataset. Exactly one shape per item: a flat SQL result
/// set tagged with its table name, or an arbitrarily nested graph
/// response where any key may hold row arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryResultItem {
    SqlQuery(SqlQueryResult),
    Graph(Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlQueryResult {
    pub table: String,
    #[serde(default)]
    pub data: Vec<Value>,
}

/// Find the row collection a table path denotes.
///
/// SQL datasets match by exact table string only; graph datasets match
/// by nested-path resolution first, then by the whole path as a literal
/// top-level key (authors sometimes store dotted keys verbatim).
pub fn find_rows<'a>(query_data: &'a [QueryResultItem], table_path: &str) -> Option<&'a [Value]> {
    for item in query_data {
        match item {
            QueryResultItem::SqlQuery(sql) => {
                if sql.table == table_path {
                    return Some(&sql.data);
                }
            }
            QueryResultItem::Graph(graph) => {
                if let Some(rows) =
                    resolve::get_nested_data(graph, table_path).and_then(Value::as_array)
                {
                    return Some(rows);
                }
                if let Some(rows) = graph.get(table_path).and_then(Value::as_array) {
                    return Some(rows);
                }
            }
        }
    }
    None
}

// =============================================================================
// FORM STATE
// =============================================================================

/// Process-scoped mutable context for one render/change event.
/// Constructed fresh per event, discarded after the response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Externally-fetched API results keyed by source name. Single
    /// objects are normalized to one-element arrays at ingestion.
    #[serde(default, deserialize_with = "de_api_results")]
    pub api_results: HashMap<String, Vec<Value>>,
    /// field → fields that must be refreshed when it changes.
    #[serde(default)]
    pub dependencies: HashMap<String, Vec<String>>,
}

fn de_api_results<'de, D>(deserializer: D) -> Result<HashMap<String, Vec<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = HashMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(source, value)| {
            let items = match value {
                Value::Array(items) => items,
                other => vec![other],
            };
            (source, items)
        })
        .collect())
}

impl FormState {
    /// The API items a component's `apiSource` refers to, with the
    /// optional `dataPath` applied to each raw entry.
    pub fn items_for(&self, api: &ApiSource) -> Option<Vec<Value>> {
        let raw = self.api_results.get(&api.source)?;
        let path = match &api.data_path {
            Some(segments) if !segments.is_empty() => segments.join("."),
            _ => return Some(raw.clone()),
        };

        let mut items = Vec::new();
        for entry in raw {
            match resolve::get_nested_data(entry, &path) {
                Some(Value::Array(found)) => items.extend(found.iter().cloned()),
                Some(found) => items.push(found.clone()),
                None => {}
            }
        }
        Some(items)
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// The current user's roles, consulted by the selectboxes role filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub roles: Vec<String>,
    /// Role ladder from least to most privileged, used by `minRole` checks.
    #[serde(default)]
    pub role_order: Vec<String>,
}

impl Session {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// True when any held role ranks at or above `min` on the ladder.
    /// Roles missing from the ladder fall back to exact membership.
    pub fn satisfies_min(&self, min: &str) -> bool {
        let Some(min_rank) = self.role_order.iter().position(|r| r == min) else {
            return self.has_role(min);
        };
        self.roles.iter().any(|held| {
            self.role_order
                .iter()
                .position(|r| r == held)
                .is_some_and(|rank| rank >= min_rank)
        })
    }
}

// =============================================================================
// VALUE HELPERS
// =============================================================================

/// Render a scalar for HTML/label output; nulls become empty strings.
pub(crate) fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn is_empty_value(value: &Value) -> bool {
    matches!(value, Value::Null) || matches!(value, Value::String(s) if s.is_empty())
}

/// Equality across the string/number boundary, matching how the wire
/// data mixes `"1"` and `1` for the same identifier.
pub(crate) fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return !a.is_null();
    }
    let scalar = |v: &Value| matches!(v, Value::String(_) | Value::Number(_));
    scalar(a) && scalar(b) && display_string(a) == display_string(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sql_rows_match_by_exact_table_string() {
        let data = vec![QueryResultItem::SqlQuery(SqlQueryResult {
            table: "products".into(),
            data: vec![json!({"id": 1})],
        })];
        assert!(find_rows(&data, "products").is_some());
        assert!(find_rows(&data, "product").is_none());
        assert!(find_rows(&data, "products.detail").is_none());
    }

    #[test]
    fn graph_rows_match_by_nested_path() {
        let data = vec![QueryResultItem::Graph(json!({
            "order": {"items": [{"id": 1}, {"id": 2}]}
        }))];
        let rows = find_rows(&data, "order.items").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn graph_rows_fall_back_to_literal_dotted_key() {
        let data = vec![QueryResultItem::Graph(json!({
            "order.items": [{"id": 7}]
        }))];
        let rows = find_rows(&data, "order.items").unwrap();
        assert_eq!(rows[0]["id"], 7);
    }

    #[test]
    fn single_api_object_normalizes_to_one_element_array() {
        let state: FormState = serde_json::from_value(json!({
            "apiResults": {"part": {"pk": 9}}
        }))
        .unwrap();
        assert_eq!(state.api_results["part"], vec![json!({"pk": 9})]);
    }

    #[test]
    fn data_path_drills_into_api_entries() {
        let state: FormState = serde_json::from_value(json!({
            "apiResults": {"stock": {"results": {"items": [{"pk": 1}, {"pk": 2}]}}}
        }))
        .unwrap();
        let api = ApiSource {
            source: "stock".into(),
            value_key: None,
            data_path: Some(vec!["results".into(), "items".into()]),
            link: None,
        };
        let items = state.items_for(&api).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn loose_eq_crosses_string_number_boundary() {
        assert!(loose_eq(&json!(1), &json!("1")));
        assert!(loose_eq(&json!("a"), &json!("a")));
        assert!(!loose_eq(&json!(null), &json!(null)));
        assert!(!loose_eq(&json!(1), &json!(2)));
    }

    #[test]
    fn min_role_uses_the_ladder() {
        let session = Session {
            roles: vec!["supervisor".into()],
            role_order: vec!["operator".into(), "supervisor".into(), "admin".into()],
        };
        assert!(session.satisfies_min("operator"));
        assert!(session.satisfies_min("supervisor"));
        assert!(!session.satisfies_min("admin"));
        // not on the ladder: exact membership decides
        assert!(!session.satisfies_min("auditor"));
    }
}
