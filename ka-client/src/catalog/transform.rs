//! Raw SKU rows → grouped catalog items

use super::CatalogError;
use super::sizes::sort_sizes;
use serde_json::Value;
use shared::{CatalogItem, SkuRow};
use std::collections::HashMap;

/// Validate the remote payload and decode it into SKU rows
///
/// The payload must be a non-empty array. `null` holes (left behind by deleted
/// array entries) are skipped; any other non-object element is rejected.
pub fn parse_rows(payload: Value) -> Result<Vec<SkuRow>, CatalogError> {
    let entries = match payload {
        Value::Null => return Err(CatalogError::EmptyRemoteData),
        Value::Array(entries) => entries,
        other => {
            return Err(CatalogError::InvalidShape(format!(
                "expected an array of rows, got {}",
                json_kind(&other)
            )));
        }
    };

    let mut rows = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match entry {
            Value::Null => continue,
            Value::Object(_) => {
                let row: SkuRow = serde_json::from_value(entry).map_err(|e| {
                    CatalogError::InvalidShape(format!("row {}: {}", index, e))
                })?;
                rows.push(row);
            }
            other => {
                return Err(CatalogError::InvalidShape(format!(
                    "row {} is {}",
                    index,
                    json_kind(&other)
                )));
            }
        }
    }

    if rows.is_empty() {
        return Err(CatalogError::EmptyRemoteData);
    }
    Ok(rows)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Group rows by style
///
/// Styles keep first-seen order, sizes and colors are deduplicated, and each
/// color gets one `"{code} : {name}, {mrp}"` entry built from the first row
/// carrying it. Rows without a style are skipped.
pub fn transform(rows: &[SkuRow]) -> Vec<CatalogItem> {
    let mut items: Vec<CatalogItem> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let Some(style) = non_empty(&row.style) else {
            continue;
        };

        let slot = *index.entry(style).or_insert_with(|| {
            items.push(CatalogItem::new(style));
            items.len() - 1
        });
        let item = &mut items[slot];

        if let Some(size) = non_empty(&row.size)
            && !item.has_size(size)
        {
            item.sizes.push(size.to_string());
        }

        if let Some(color) = non_empty(&row.color)
            && !item.has_color(color)
        {
            item.colors.push(color.to_string());
            item.color_meta.push(color_entry(color, row));
        }
    }

    for item in &mut items {
        sort_sizes(&mut item.sizes);
    }

    items
}

fn color_entry(color: &str, row: &SkuRow) -> String {
    let name = non_empty(&row.color_name).unwrap_or(color);
    let mrp = row.mrp.as_deref().map(str::trim).unwrap_or("");
    format!("{} : {}, {}", color, name, mrp)
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
