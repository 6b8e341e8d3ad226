//! Content component processing: HTML template expansion.
//!
//! Table-driven content expands `{{row.field}}` placeholders once per
//! matched source row; API-driven content builds `<img>` tags from an
//! external collection. Content never blocks the rest of a row.

use serde_json::{Map, Value};

use crate::data::{display_string, find_rows};
use crate::error::EngineError;
use crate::schema::{ApiSource, Component};

use super::ProcessContext;

pub(crate) const NO_IMAGE_HTML: &str = "<p>No Image Available</p>";
pub(crate) const NO_API_DATA_HTML: &str = "<p>API Data Not Available</p>";

pub fn process_content(
    component: &mut Component,
    ctx: &ProcessContext<'_>,
) -> Result<(), EngineError> {
    let template = component.html.clone().unwrap_or_default();

    if let Some(table) = &component.table {
        let rows = find_rows(ctx.query_data, table).unwrap_or_default();
        if rows.is_empty() {
            component.html = Some(NO_API_DATA_HTML.to_string());
            return Ok(());
        }
        let html: String = rows
            .iter()
            .filter_map(Value::as_object)
            .map(|row| expand_row_template(&template, row))
            .collect();
        component.html = Some(html);
        return Ok(());
    }

    if let Some(api) = component.api_source.clone() {
        let items = ctx.form_state.items_for(&api).unwrap_or_default();
        if items.is_empty() {
            component.html = Some(if api.link.is_some() {
                NO_IMAGE_HTML.to_string()
            } else {
                NO_API_DATA_HTML.to_string()
            });
            return Ok(());
        }
        component.html = Some(expand_api_template(&template, &api, &component.key, &items));
        return Ok(());
    }

    // Static content stays as authored.
    Ok(())
}

/// Expand `{{row.field}}` placeholders against one source row.
/// Unresolved fields expand to the empty string; a placeholder left
/// unterminated is kept as literal text.
pub fn expand_row_template(template: &str, row: &Map<String, Value>) -> String {
    let mut out = String::new();
    let mut remaining = template;

    while let Some(start) = remaining.find("{{") {
        out.push_str(&remaining[..start]);
        let after_open = &remaining[start + 2..];
        match after_open.find("}}") {
            Some(end) => {
                let inner = after_open[..end].trim();
                let field = inner.strip_prefix("row.").unwrap_or(inner);
                if let Some(value) = row.get(field) {
                    out.push_str(&display_string(value));
                }
                remaining = &after_open[end + 2..];
            }
            None => {
                out.push_str(&remaining[start..]);
                return out;
            }
        }
    }

    out.push_str(remaining);
    out
}

/// Build one tag per API item by substituting the `${...}` placeholder
/// with `link + item[valueKey]`. Templates without a placeholder fall
/// back to a plain `<img>` tag.
fn expand_api_template(
    template: &str,
    api: &ApiSource,
    component_key: &str,
    items: &[Value],
) -> String {
    let link = api.link.as_deref().unwrap_or("");
    let value_key = api.value_key.as_deref().unwrap_or(component_key);

    items
        .iter()
        .map(|item| {
            let value = item.get(value_key).map(display_string).unwrap_or_default();
            let url = format!("{link}{value}");
            match split_placeholder(template) {
                Some((before, after)) => format!("{before}{url}{after}"),
                None => format!(r#"<img src="{url}" />"#),
            }
        })
        .collect()
}

fn split_placeholder(template: &str) -> Option<(&str, &str)> {
    let start = template.find("${")?;
    let end = template[start..].find('}')? + start;
    Some((&template[..start], &template[end + 1..]))
}
