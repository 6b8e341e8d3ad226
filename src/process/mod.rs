//! Processing pass: walk the schema tree and fill component outputs.
//!
//! Public API: `process_components(schema, ctx) -> ProcessReport`
//!
//! Components are classified into three ordered batches. Fast-sync
//! components run first, then content components (order-independent,
//! failure-isolated), then the sequential batch, which runs in schema
//! order because later components read form-state mutations made by
//! earlier ones. One component failing never aborts its siblings.

pub mod content;
pub mod datagrid;
pub mod nested;
pub mod reconcile;
pub mod select;

use serde::{Deserialize, Serialize};

use crate::data::{FormState, QueryResultItem, Session};
use crate::error::EngineError;
use crate::schema::{Component, ComponentType, DependencyGraph, FormSchema};

// =============================================================================
// CONTEXT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessMode {
    Render,
    Change { changed_key: String },
}

pub struct ProcessContext<'a> {
    pub query_data: &'a [QueryResultItem],
    pub form_state: &'a mut FormState,
    pub session: Option<&'a Session>,
    pub mode: ProcessMode,
}

// =============================================================================
// REPORT
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentError {
    pub key: String,
    pub component_type: String,
    pub message: String,
    pub processing_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentOutcome {
    pub key: String,
    pub component_type: String,
    pub processing_type: String,
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessReport {
    pub success: bool,
    pub processed_count: usize,
    pub total_components: usize,
    pub errors: Vec<ComponentError>,
    pub components: Vec<ComponentOutcome>,
    pub elapsed_ms: f64,
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessingKind {
    FastSync,
    Content,
    Sequential,
}

impl ProcessingKind {
    fn as_str(self) -> &'static str {
        match self {
            ProcessingKind::FastSync => "fast-sync",
            ProcessingKind::Content => "parallel",
            ProcessingKind::Sequential => "sequential",
        }
    }
}

fn classify(component_type: &ComponentType) -> ProcessingKind {
    match component_type {
        ComponentType::Textfield
        | ComponentType::Checkbox
        | ComponentType::Button
        | ComponentType::Hidden
        | ComponentType::Htmlelement => ProcessingKind::FastSync,
        ComponentType::Content => ProcessingKind::Content,
        ComponentType::Select
        | ComponentType::Selectboxes
        | ComponentType::Datagrid
        | ComponentType::Editgrid
        | ComponentType::Other(_) => ProcessingKind::Sequential,
    }
}

// =============================================================================
// DISPATCHER
// =============================================================================

/// Process every component in the schema, in batch order, mutating the
/// schema in place and collecting per-component outcomes.
pub fn process_components(schema: &mut FormSchema, ctx: &mut ProcessContext<'_>) -> ProcessReport {
    let stopwatch = Stopwatch::start();

    if let ProcessMode::Change { changed_key } = ctx.mode.clone() {
        clear_for_change(schema, ctx.form_state, &changed_key);
    }

    let total_components = schema.components.len();
    let mut errors = Vec::new();
    let mut components = Vec::new();
    let mut processed_count = 0;

    for kind in [
        ProcessingKind::FastSync,
        ProcessingKind::Content,
        ProcessingKind::Sequential,
    ] {
        for component in &mut schema.components {
            if classify(&component.component_type) != kind {
                continue;
            }
            let result = run_processor(kind, component, ctx);
            let ok = result.is_ok();
            if let Err(error) = result {
                log::warn!("component '{}' failed: {}", component.key, error);
                errors.push(ComponentError {
                    key: component.key.clone(),
                    component_type: component.component_type.to_string(),
                    message: error.to_string(),
                    processing_type: kind.as_str().to_string(),
                });
            } else {
                processed_count += 1;
            }
            components.push(ComponentOutcome {
                key: component.key.clone(),
                component_type: component.component_type.to_string(),
                processing_type: kind.as_str().to_string(),
                ok,
            });
        }
    }

    ProcessReport {
        success: errors.is_empty(),
        processed_count,
        total_components,
        errors,
        components,
        elapsed_ms: stopwatch.elapsed_ms(),
    }
}

fn run_processor(
    kind: ProcessingKind,
    component: &mut Component,
    ctx: &mut ProcessContext<'_>,
) -> Result<(), EngineError> {
    match kind {
        ProcessingKind::FastSync => select::process_default(component, ctx),
        ProcessingKind::Content => content::process_content(component, ctx),
        ProcessingKind::Sequential => match component.component_type {
            ComponentType::Select => select::process_select(component, ctx),
            ComponentType::Selectboxes => select::process_selectboxes(component, ctx),
            ComponentType::Datagrid => datagrid::process_datagrid(component, ctx),
            ComponentType::Editgrid => select::process_editgrid(component, ctx),
            _ => select::process_default(component, ctx),
        },
    }
}

/// Selective state clearing before reprocessing a change event.
///
/// Dynamic-source selects reached by the changed field lose their
/// fetched state; static selects keep user-entered values. Without
/// dependency information every dynamic select is cleared.
fn clear_for_change(schema: &mut FormSchema, state: &FormState, changed_key: &str) {
    let graph = DependencyGraph::build(&state.dependencies);
    let affected = graph.dependents_of(changed_key);

    for component in &mut schema.components {
        if component.component_type != ComponentType::Select {
            continue;
        }
        if !component.has_dynamic_source() {
            continue;
        }
        if !graph.is_empty() && !affected.contains(&component.key) {
            continue;
        }
        component.data = None;
        component.value = serde_json::Value::Null;
        component.html = None;
    }
}

// =============================================================================
// TIMING
// =============================================================================

/// Wall-clock stopwatch that also works under wasm32, where
/// `std::time::Instant` is unavailable at runtime.
struct Stopwatch {
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
    #[cfg(target_arch = "wasm32")]
    start: f64,
}

impl Stopwatch {
    fn start() -> Self {
        Stopwatch {
            #[cfg(not(target_arch = "wasm32"))]
            start: std::time::Instant::now(),
            #[cfg(target_arch = "wasm32")]
            start: js_sys::Date::now(),
        }
    }

    fn elapsed_ms(&self) -> f64 {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.start.elapsed().as_secs_f64() * 1000.0
        }
        #[cfg(target_arch = "wasm32")]
        {
            js_sys::Date::now() - self.start
        }
    }
}
