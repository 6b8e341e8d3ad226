//! WASM entry points for browser use.

use wasm_bindgen::prelude::*;

use crate::data::{FormState, Session};
use crate::error::EngineError;
use crate::process::{self, ProcessContext, ProcessMode, ProcessReport};

/// Validate a form schema JSON: parse + schema lint.
/// Returns a JSON array of EngineError objects.
#[wasm_bindgen]
pub fn validate_schema(schema_json: &str) -> JsValue {
    let result = validate_schema_inner(schema_json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn validate_schema_inner(schema_json: &str) -> Vec<ErrorDto> {
    let schema = match crate::schema::parse_schema(schema_json) {
        Ok(s) => s,
        Err(errors) => return errors.into_iter().map(ErrorDto::from).collect(),
    };

    let errors = crate::validate::validate_schema(&schema);
    errors.into_iter().map(ErrorDto::from).collect()
}

/// Full pipeline for one render/change event: parse inputs → process
/// the schema → return the mutated schema plus the processing report.
/// A non-empty `changed_key` selects change mode.
#[wasm_bindgen]
pub fn process_schema(
    schema_json: &str,
    query_json: &str,
    state_json: &str,
    session_json: Option<String>,
    changed_key: Option<String>,
) -> JsValue {
    let result = process_schema_inner(
        schema_json,
        query_json,
        state_json,
        session_json.as_deref(),
        changed_key,
    );
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn process_schema_inner(
    schema_json: &str,
    query_json: &str,
    state_json: &str,
    session_json: Option<&str>,
    changed_key: Option<String>,
) -> ProcessResult {
    // 1. Parse the schema
    let mut schema = match crate::schema::parse_schema(schema_json) {
        Ok(s) => s,
        Err(errors) => {
            return ProcessResult::Errors { errors: errors.into_iter().map(ErrorDto::from).collect() };
        }
    };

    // 2. Parse event inputs
    let query_data = match crate::schema::parse_query_data(query_json) {
        Ok(q) => q,
        Err(errors) => {
            return ProcessResult::Errors { errors: errors.into_iter().map(ErrorDto::from).collect() };
        }
    };
    let mut form_state: FormState = match crate::schema::parse_form_state(state_json) {
        Ok(s) => s,
        Err(errors) => {
            return ProcessResult::Errors { errors: errors.into_iter().map(ErrorDto::from).collect() };
        }
    };
    let session: Option<Session> = match session_json {
        Some(json) => match serde_json::from_str(json) {
            Ok(s) => Some(s),
            Err(e) => {
                return ProcessResult::Errors {
                    errors: vec![ErrorDto::from(EngineError::parse(
                        "P004",
                        format!("Failed to parse session JSON: {}", e),
                    ))],
                };
            }
        },
        None => None,
    };

    // 3. Process
    let mode = match changed_key {
        Some(key) => ProcessMode::Change { changed_key: key },
        None => ProcessMode::Render,
    };
    let mut ctx = ProcessContext {
        query_data: &query_data,
        form_state: &mut form_state,
        session: session.as_ref(),
        mode,
    };
    let report = process::process_components(&mut schema, &mut ctx);

    let schema_value = match serde_json::to_value(&schema) {
        Ok(v) => v,
        Err(e) => {
            return ProcessResult::Errors {
                errors: vec![ErrorDto::from(EngineError::process(
                    "X001",
                    format!("Failed to serialize processed schema: {}", e),
                    None,
                ))],
            };
        }
    };

    ProcessResult::Success {
        schema: schema_value,
        report,
    }
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(serde::Serialize, serde::Deserialize)]
struct ErrorDto {
    code: String,
    phase: String,
    message: String,
    component_key: Option<String>,
}

impl From<EngineError> for ErrorDto {
    fn from(e: EngineError) -> Self {
        ErrorDto {
            code: e.code.to_string(),
            phase: e.phase.to_string(),
            message: e.message,
            component_key: e.component_key,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(tag = "status")]
enum ProcessResult {
    #[serde(rename = "success")]
    Success {
        schema: serde_json::Value,
        report: ProcessReport,
    },
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}
