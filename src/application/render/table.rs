//! Table interpretation.
//!
//! Authors mark a table as structured data by merging its first row into one
//! cell whose text contains the word `data` (e.g. "Team data"). Such tables
//! render as a JSON array inside `<code data-id="Team">`; every other table
//! renders as nested `div.row` / `div.cell` markup.

use serde_json::{Map, Value};

use crate::domain::document::{Table, TableCell};

use super::markup::{MarkupRenderer, RenderOptions};
use super::{escape_attribute, placeholder, strip_tags};

const DATA_MARKER: &str = "data";

pub(crate) fn render_table(renderer: &MarkupRenderer, table: &Table) -> String {
    let label = classification_label(renderer, table);
    match label.as_deref().and_then(data_table_id) {
        Some(data_id) => render_data_table(renderer, table, &data_id),
        None => render_visual_table(renderer, table, label.as_deref()),
    }
}

/// Text of a first-row cell spanning the whole row, if present and non-empty.
fn classification_label(renderer: &MarkupRenderer, table: &Table) -> Option<String> {
    let row = table.rows.first()?;
    let cell = row.cells.first()?;
    let span = cell.column_span?;
    if usize::try_from(span).ok()? != row.cells.len() {
        return None;
    }
    let first = cell.content.first()?;
    let rendered = placeholder::strip_tokens(&renderer.render(first, RenderOptions::BARE));
    let label = strip_tags(&rendered).trim().to_string();
    (!label.is_empty()).then_some(label)
}

/// Correlation id for a data table: the label minus its `data` token.
fn data_table_id(label: &str) -> Option<String> {
    let tokens: Vec<&str> = label.split_whitespace().collect();
    let marker = tokens.iter().position(|token| *token == DATA_MARKER)?;
    let remaining: Vec<&str> = tokens
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != marker)
        .map(|(_, token)| *token)
        .collect();
    Some(remaining.join(" "))
}

fn render_data_table(renderer: &MarkupRenderer, table: &Table, data_id: &str) -> String {
    let keys: Vec<String> = table
        .rows
        .get(1)
        .map(|row| {
            row.cells
                .iter()
                .map(|cell| field_key(renderer, cell))
                .collect()
        })
        .unwrap_or_default();

    let records: Vec<Value> = table
        .rows
        .iter()
        .skip(2)
        .map(|row| {
            let mut record = Map::new();
            for (key, cell) in keys.iter().zip(&row.cells) {
                record.insert(key.clone(), Value::String(data_cell(renderer, cell)));
            }
            Value::Object(record)
        })
        .collect();

    format!(
        "<code data-id=\"{}\">{}</code>",
        escape_attribute(data_id),
        Value::Array(records)
    )
}

/// Lower-cased, hyphenated key from the first element of a header cell.
fn field_key(renderer: &MarkupRenderer, cell: &TableCell) -> String {
    let text = cell
        .content
        .first()
        .map(|element| strip_tags(&renderer.render(element, RenderOptions::BARE)))
        .unwrap_or_default()
        .to_lowercase();

    let mut key = String::with_capacity(text.len());
    let mut in_separator = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            key.push(ch);
            in_separator = false;
        } else if !in_separator {
            key.push('-');
            in_separator = true;
        }
    }
    key
}

fn data_cell(renderer: &MarkupRenderer, cell: &TableCell) -> String {
    let html: String = cell
        .content
        .iter()
        .map(|element| renderer.render(element, RenderOptions::BARE))
        .collect();
    placeholder::requote(&html)
}

fn render_visual_table(renderer: &MarkupRenderer, table: &Table, label: Option<&str>) -> String {
    let mut html = match label {
        Some(label) => format!("<div class=\"table {}\">", escape_attribute(label)),
        None => "<div class=\"table\">".to_string(),
    };

    let skip = usize::from(label.is_some());
    for row in table.rows.iter().skip(skip) {
        html.push_str("<div class=\"row\">");
        for cell in &row.cells {
            html.push_str("<div class=\"cell\">");
            for element in &cell.content {
                html.push_str(&renderer.render(element, RenderOptions::BARE));
            }
            html.push_str("</div>");
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}
