//! Parse phase: JSON → typed schema tree and event inputs.

pub mod deps;
pub mod types;

pub use deps::DependencyGraph;
pub use types::*;

use crate::data::{FormState, QueryResultItem};
use crate::error::EngineError;

/// Deserialize a form schema JSON string into a `FormSchema`.
pub fn parse_schema(json: &str) -> Result<FormSchema, Vec<EngineError>> {
    serde_json::from_str::<FormSchema>(json).map_err(|e| {
        vec![EngineError::parse(
            "P001",
            format!("Failed to parse form schema JSON: {}", e),
        )]
    })
}

/// Deserialize pre-fetched query results (`sqlQuery`/`graph` items).
pub fn parse_query_data(json: &str) -> Result<Vec<QueryResultItem>, Vec<EngineError>> {
    serde_json::from_str::<Vec<QueryResultItem>>(json).map_err(|e| {
        vec![EngineError::parse(
            "P002",
            format!("Failed to parse query data JSON: {}", e),
        )]
    })
}

/// Deserialize the per-event form state.
pub fn parse_form_state(json: &str) -> Result<FormState, Vec<EngineError>> {
    serde_json::from_str::<FormState>(json).map_err(|e| {
        vec![EngineError::parse(
            "P003",
            format!("Failed to parse form state JSON: {}", e),
        )]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Phase;

    #[test]
    fn valid_schema_parses() {
        let schema = parse_schema(r#"{"components": [{"key": "a", "type": "textfield"}]}"#);
        assert_eq!(schema.unwrap().components.len(), 1);
    }

    #[test]
    fn malformed_schema_yields_p001() {
        let errors = parse_schema("{not json").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "P001");
        assert_eq!(errors[0].phase, Phase::Parse);
    }

    #[test]
    fn malformed_query_data_yields_p002() {
        // An object where the list of items is expected.
        let errors = parse_query_data(r#"{"table": "x"}"#).unwrap_err();
        assert_eq!(errors[0].code, "P002");
        assert_eq!(errors[0].phase, Phase::Parse);
    }

    #[test]
    fn malformed_form_state_yields_p003() {
        let errors = parse_form_state(r#"[1, 2]"#).unwrap_err();
        assert_eq!(errors[0].code, "P003");
        assert_eq!(errors[0].phase, Phase::Parse);
    }

    #[test]
    fn query_data_parses_both_item_shapes() {
        let items = parse_query_data(
            r#"[
                {"sqlQuery": {"table": "products", "data": [{"id": 1}]}},
                {"graph": {"order": {"items": []}}}
            ]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 2);
    }
}
