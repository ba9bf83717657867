// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Row-sets
//!
//! In-memory tabular results as returned by a connectivity adapter: named,
//! typed columns and ordered rows of scalar cells.

use serde::{Deserialize, Serialize};

/// A single cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Textual rendering; `None` for NULL
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Text(s) => Some(s.clone()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Column schema of a row-set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(default)]
    pub type_name: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<i64>,
}

fn default_nullable() -> bool {
    true
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: String::new(),
            nullable: true,
            size: None,
            precision: None,
            scale: None,
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_precision(mut self, precision: i64, scale: i64) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }
}

impl From<&str> for ColumnDescriptor {
    fn from(name: &str) -> Self {
        ColumnDescriptor::new(name)
    }
}

/// Tabular result: named columns and ordered rows
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new<C: Into<ColumnDescriptor>>(columns: impl IntoIterator<Item = C>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Builder form of [`RowSet::push_row`]
    pub fn with_row<V: Into<Value>>(mut self, row: impl IntoIterator<Item = V>) -> Self {
        self.push_row(row);
        self
    }

    /// Append a row; short rows are padded with NULL, long rows truncated
    pub fn push_row<V: Into<Value>>(&mut self, row: impl IntoIterator<Item = V>) {
        let mut cells: Vec<Value> = row.into_iter().map(Into::into).collect();
        cells.resize(self.columns.len(), Value::Null);
        self.rows.push(cells);
    }

    /// Index of a column: exact name first, then ASCII case-insensitive
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(name))
            })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn value(&self, row: usize, column: usize) -> &Value {
        const NULL: &Value = &Value::Null;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(NULL)
    }

    pub fn is_null(&self, row: usize, column: usize) -> bool {
        self.value(row, column).is_null()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep the rows matching `predicate`
    pub fn retain_rows<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        self.rows.retain(|row| predicate(row));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_row_pads_missing_cells() {
        let rs = RowSet::new(["A", "B", "C"]).with_row([Value::from("x")]);
        assert_eq!(rs.rows[0].len(), 3);
        assert!(rs.is_null(0, 2));
    }

    #[test]
    fn test_column_index_prefers_exact_match() {
        let rs = RowSet::new(["name", "NAME"]);
        assert_eq!(rs.column_index("NAME"), Some(1));
        assert_eq!(rs.column_index("Name"), Some(0));
        assert_eq!(rs.column_index("missing"), None);
    }

    #[test]
    fn test_value_out_of_range_is_null() {
        let rs = RowSet::new(["A"]);
        assert!(rs.value(5, 0).is_null());
    }

    #[test]
    fn test_untagged_value_deserialization() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, true, 3, 1.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(3),
                Value::Float(1.5),
                Value::Text("x".to_string())
            ]
        );
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some(4i64)), Value::Int(4));
    }
}
