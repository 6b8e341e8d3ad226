//! Unified engine error type used across all phases.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Validate,
    Process,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Validate => write!(f, "Validate"),
            Phase::Process => write!(f, "Process"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("[{phase}:{code}] {message}")]
pub struct EngineError {
    pub code: &'static str,
    pub phase: Phase,
    pub message: String,
    /// The component key the error is attached to, if any.
    pub component_key: Option<String>,
}

impl EngineError {
    pub fn parse(code: &'static str, message: impl Into<String>) -> Self {
        EngineError {
            code,
            phase: Phase::Parse,
            message: message.into(),
            component_key: None,
        }
    }

    pub fn validate(
        code: &'static str,
        message: impl Into<String>,
        component_key: Option<String>,
    ) -> Self {
        EngineError {
            code,
            phase: Phase::Validate,
            message: message.into(),
            component_key,
        }
    }

    pub fn process(
        code: &'static str,
        message: impl Into<String>,
        component_key: Option<String>,
    ) -> Self {
        EngineError {
            code,
            phase: Phase::Process,
            message: message.into(),
            component_key,
        }
    }
}
