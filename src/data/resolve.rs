//! Dot-path resolution against heterogeneous nested data.
//!
//! The same walk serves SQL rows, nested graph responses, and REST
//! payloads. Absence is always `None`; nothing here errors.

use serde_json::Value;

/// Resolve a dot-separated path against a nested value.
///
/// Objects are descended by key. When an array sits mid-path (segments
/// remain), the walk continues into its **first** element; multi-row
/// expansion belongs to the row materializer, not here. An empty array,
/// missing key, or non-object intermediate yields `None`. A trailing
/// array is returned whole.
pub fn get_nested_data<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        while let Value::Array(items) = current {
            current = items.first()?;
        }
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn walks_plain_objects() {
        let data = json!({"a": {"b": {"c": 42}}});
        assert_eq!(get_nested_data(&data, "a.b.c"), Some(&json!(42)));
    }

    #[test]
    fn takes_first_array_element_mid_path() {
        let data = json!({"a": {"b": [{"c": 1}, {"c": 2}]}});
        assert_eq!(get_nested_data(&data, "a.b.c"), Some(&json!(1)));
    }

    #[test]
    fn empty_array_mid_path_is_none() {
        let data = json!({"a": {"b": []}});
        assert_eq!(get_nested_data(&data, "a.b.c"), None);
    }

    #[test]
    fn missing_key_is_none() {
        let data = json!({"a": {"b": 1}});
        assert_eq!(get_nested_data(&data, "a.x"), None);
    }

    #[test]
    fn scalar_intermediate_is_none() {
        let data = json!({"a": 5});
        assert_eq!(get_nested_data(&data, "a.b"), None);
    }

    #[test]
    fn trailing_array_is_returned_whole() {
        let data = json!({"a": {"items": [{"id": 1}, {"id": 2}]}});
        let found = get_nested_data(&data, "a.items").unwrap();
        assert_eq!(found.as_array().unwrap().len(), 2);
    }

    #[test]
    fn single_segment_lookup() {
        let data = json!({"products": [{"id": 1}]});
        assert!(get_nested_data(&data, "products").is_some());
    }

    #[test]
    fn nested_arrays_chain_through_first_elements() {
        let data = json!({"a": [[{"b": 3}]]});
        assert_eq!(get_nested_data(&data, "a.b"), Some(&json!(3)));
    }
}
