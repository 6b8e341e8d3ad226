//! Schema-level validation pass (pre-processing).
//!
//! Advisory lint over the authored schema tree: callers may still
//! process a schema that carries warnings, and the studio UI surfaces
//! the list to authors.

use std::collections::HashSet;

use crate::error::EngineError;
use crate::schema::{Component, ComponentType, FormSchema};

/// Validate a form schema. Returns all findings.
pub fn validate_schema(schema: &FormSchema) -> Vec<EngineError> {
    let mut errors = Vec::new();
    validate_scope(&schema.components, &mut errors);
    errors
}

fn validate_scope(components: &[Component], errors: &mut Vec<EngineError>) {
    let mut seen = HashSet::new();

    for component in components {
        if !component.key.is_empty() && !seen.insert(component.key.as_str()) {
            errors.push(EngineError::validate(
                "V001",
                format!("Duplicate component key '{}'", component.key),
                Some(component.key.clone()),
            ));
        }

        if component.component_type.is_grid() && component.children().is_empty() {
            errors.push(EngineError::validate(
                "V002",
                format!(
                    "Grid component '{}' declares no sub-components",
                    component.key
                ),
                Some(component.key.clone()),
            ));
        }

        if let Some(api) = &component.api_source {
            if api.source.is_empty() {
                errors.push(EngineError::validate(
                    "V003",
                    format!("Component '{}' has an empty apiSource name", component.key),
                    Some(component.key.clone()),
                ));
            }
        }

        if let Some(table) = &component.table {
            if table.is_empty() || table.split('.').any(str::is_empty) {
                errors.push(EngineError::validate(
                    "V004",
                    format!(
                        "Component '{}' has a malformed table path '{}'",
                        component.key, table
                    ),
                    Some(component.key.clone()),
                ));
            }
        }

        // Each grid opens its own key scope.
        validate_scope(component.children(), errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> FormSchema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn clean_schema_passes() {
        let s = schema(json!({"components": [
            {"key": "name", "type": "textfield"},
            {"key": "product", "type": "select", "table": "products"}
        ]}));
        assert!(validate_schema(&s).is_empty());
    }

    #[test]
    fn duplicate_keys_in_one_scope_flagged() {
        let s = schema(json!({"components": [
            {"key": "name", "type": "textfield"},
            {"key": "name", "type": "select"}
        ]}));
        let errors = validate_schema(&s);
        assert!(errors.iter().any(|e| e.code == "V001"));
    }

    #[test]
    fn same_key_in_different_scopes_allowed() {
        let s = schema(json!({"components": [
            {"key": "name", "type": "textfield"},
            {"key": "grid", "type": "datagrid", "components": [
                {"key": "name", "type": "textfield", "table": "items"}
            ]}
        ]}));
        assert!(validate_schema(&s).is_empty());
    }

    #[test]
    fn grid_without_children_flagged() {
        let s = schema(json!({"components": [
            {"key": "grid", "type": "datagrid"}
        ]}));
        let errors = validate_schema(&s);
        assert!(errors.iter().any(|e| e.code == "V002"));
    }

    #[test]
    fn empty_api_source_name_flagged() {
        let s = schema(json!({"components": [
            {"key": "part", "type": "select", "apiSource": {"source": ""}}
        ]}));
        let errors = validate_schema(&s);
        assert!(errors.iter().any(|e| e.code == "V003"));
    }

    #[test]
    fn malformed_table_path_flagged() {
        let s = schema(json!({"components": [
            {"key": "a", "type": "select", "table": "order..items"},
            {"key": "b", "type": "select", "table": ".items"}
        ]}));
        let errors = validate_schema(&s);
        assert_eq!(errors.iter().filter(|e| e.code == "V004").count(), 2);
    }
}
