//! Rust types mirroring the renderer's form schema JSON.
//!
//! These types are the serde target for the low-code form definition.
//! Components are an open schema: authored fields the engine does not
//! interpret round-trip untouched through `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// TOP-LEVEL SCHEMA
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSchema {
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// COMPONENT
// =============================================================================

/// One node in the form definition tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(default)]
    pub key: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    /// Dot-path into fetched query data; the final segment names the
    /// row collection, earlier segments are relationship traversals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_source: Option<ApiSource>,
    /// Per-row child fields of `datagrid`/`editgrid`; may itself
    /// contain nested grids at arbitrary depth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Component>>,

    // Output slots, mutated in place by the processors.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub default_value: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SelectData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    // Presentation hints consumed by the option builders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_property: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sort: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Component {
    /// True when the component pulls its options/rows from outside the
    /// schema itself (query data or an external API).
    pub fn has_dynamic_source(&self) -> bool {
        self.table.is_some() || self.api_source.is_some()
    }

    pub fn children(&self) -> &[Component] {
        self.components.as_deref().unwrap_or_default()
    }
}

/// Identifies an externally-fetched API result to merge in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSource {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Options container for `select` components.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectData {
    #[serde(default)]
    pub values: Vec<OptionPair>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionPair {
    pub label: Value,
    pub value: Value,
}

// =============================================================================
// COMPONENT TYPE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentType {
    Textfield,
    Select,
    Selectboxes,
    Datagrid,
    Editgrid,
    Content,
    Checkbox,
    Button,
    Hidden,
    Htmlelement,
    /// Any component type the engine has no special handling for. The
    /// authored string is kept so it round-trips back to the renderer.
    Other(String),
}

impl ComponentType {
    pub fn as_str(&self) -> &str {
        match self {
            ComponentType::Textfield => "textfield",
            ComponentType::Select => "select",
            ComponentType::Selectboxes => "selectboxes",
            ComponentType::Datagrid => "datagrid",
            ComponentType::Editgrid => "editgrid",
            ComponentType::Content => "content",
            ComponentType::Checkbox => "checkbox",
            ComponentType::Button => "button",
            ComponentType::Hidden => "hidden",
            ComponentType::Htmlelement => "htmlelement",
            ComponentType::Other(name) => name,
        }
    }

    pub fn is_grid(&self) -> bool {
        matches!(self, ComponentType::Datagrid | ComponentType::Editgrid)
    }
}

impl Serialize for ComponentType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ComponentType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "textfield" => ComponentType::Textfield,
            "select" => ComponentType::Select,
            "selectboxes" => ComponentType::Selectboxes,
            "datagrid" => ComponentType::Datagrid,
            "editgrid" => ComponentType::Editgrid,
            "content" => ComponentType::Content,
            "checkbox" => ComponentType::Checkbox,
            "button" => ComponentType::Button,
            "hidden" => ComponentType::Hidden,
            "htmlelement" => ComponentType::Htmlelement,
            _ => ComponentType::Other(raw),
        })
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_round_trip() {
        let json = r#"{
            "key": "product",
            "type": "select",
            "table": "products",
            "placeholder": "Pick one",
            "customClass": "wide"
        }"#;
        let component: Component = serde_json::from_str(json).unwrap();
        assert_eq!(component.component_type, ComponentType::Select);
        assert_eq!(component.extra["placeholder"], "Pick one");

        let back = serde_json::to_value(&component).unwrap();
        assert_eq!(back["customClass"], "wide");
        assert_eq!(back["table"], "products");
    }

    #[test]
    fn unknown_component_type_keeps_its_name() {
        let json = r#"{"key": "sig", "type": "signature"}"#;
        let component: Component = serde_json::from_str(json).unwrap();
        assert_eq!(
            component.component_type,
            ComponentType::Other("signature".into())
        );

        let back = serde_json::to_value(&component).unwrap();
        assert_eq!(back["type"], "signature");
    }

    #[test]
    fn empty_output_slots_are_omitted() {
        let json = r#"{"key": "x", "type": "textfield"}"#;
        let component: Component = serde_json::from_str(json).unwrap();
        let back = serde_json::to_value(&component).unwrap();
        assert!(back.get("defaultValue").is_none());
        assert!(back.get("data").is_none());
        assert!(back.get("html").is_none());
    }
}
