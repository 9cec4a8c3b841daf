//! Per-tab views
//!
//! The dataset-backed views read rows from the `raw_data_parsed` payload,
//! which the backend sends as an array of flat JSON objects.

pub mod charts;
pub mod history;
pub mod login;
pub mod summary;
pub mod table;
pub mod upload;

use serde_json::Value;

/// Column names in first-seen order across all rows
pub fn columns_of(rows: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        if let Some(object) = row.as_object() {
            for key in object.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    columns
}

/// Numeric value of a cell; numeric strings count too
pub fn numeric_cell(row: &Value, column: &str) -> Option<f64> {
    match row.get(column)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Columns where every present, non-null cell is numeric
pub fn numeric_columns(rows: &[Value]) -> Vec<String> {
    columns_of(rows)
        .into_iter()
        .filter(|column| {
            let mut seen = false;
            let all_numeric = rows.iter().all(|row| match row.get(column.as_str()) {
                None | Some(Value::Null) => true,
                Some(_) => {
                    seen = true;
                    numeric_cell(row, column).is_some()
                }
            });
            all_numeric && seen
        })
        .collect()
}

/// Text shown in a table cell
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
