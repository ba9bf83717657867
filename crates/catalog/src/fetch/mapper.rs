// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Row-set field mapper
//!
//! Extracts scalar attributes from a row-set by candidate column names.
//! A candidate list is resolved once per row-set; the first candidate that
//! exists in the row-set's columns wins. SQL NULL always maps to "absent",
//! never to a default value.

use crate::config::ColumnCandidates;
use crate::rowset::{RowSet, Value};

/// Reads typed attributes out of one row-set
#[derive(Debug, Clone, Copy)]
pub struct RowMapper<'a> {
    rowset: &'a RowSet,
    trim: bool,
}

impl<'a> RowMapper<'a> {
    pub fn new(rowset: &'a RowSet, trim: bool) -> Self {
        Self { rowset, trim }
    }

    pub fn rowset(&self) -> &'a RowSet {
        self.rowset
    }

    pub fn row_count(&self) -> usize {
        self.rowset.row_count()
    }

    /// Column index of the first candidate present in the row-set
    pub fn resolve(&self, candidates: &ColumnCandidates) -> Option<usize> {
        candidates
            .names()
            .iter()
            .find_map(|name| self.rowset.column_index(name))
    }

    fn cell(&self, row: usize, column: Option<usize>) -> Option<&'a Value> {
        let value = self.rowset.value(row, column?);
        (!value.is_null()).then_some(value)
    }

    /// Text value, trimmed when the mapper was built with trimming
    pub fn text(&self, row: usize, column: Option<usize>) -> Option<String> {
        let text = self.cell(row, column)?.as_text()?;
        if self.trim {
            Some(text.trim().to_string())
        } else {
            Some(text)
        }
    }

    pub fn int(&self, row: usize, column: Option<usize>) -> Option<i64> {
        coerce_int(self.cell(row, column)?)
    }

    pub fn bool(&self, row: usize, column: Option<usize>) -> Option<bool> {
        coerce_bool(self.cell(row, column)?)
    }
}

/// Interpret a cell as a boolean (`1`/`0`, `Y`/`N`, `YES`/`NO`, `TRUE`/`FALSE`)
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Int(i) => Some(*i != 0),
        Value::Float(f) => Some(*f != 0.0),
        Value::Text(s) => parse_bool(s),
    }
}

pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    let truthy = ["1", "Y", "YES", "T", "TRUE"];
    let falsy = ["0", "N", "NO", "F", "FALSE"];
    if truthy.iter().any(|t| t.eq_ignore_ascii_case(text)) {
        Some(true)
    } else if falsy.iter().any(|f| f.eq_ignore_ascii_case(text)) {
        Some(false)
    } else {
        None
    }
}

/// Interpret a cell as an integer; fractional values are truncated
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Int(i) => Some(*i),
        Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        Value::Float(_) => None,
        Value::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RowSet {
        RowSet::new(["TABLE_QUALIFIER", "TABLE_NAME", "NULLABLE", "SIZE"])
            .with_row([
                Value::from("  legacy  "),
                Value::from("Emp"),
                Value::from("YES"),
                Value::from("12"),
            ])
            .with_row([Value::Null, Value::from("Dept"), Value::Int(0), Value::Float(4.0)])
    }

    #[test]
    fn test_first_present_candidate_wins() {
        let rs = sample();
        let mapper = RowMapper::new(&rs, false);
        let column = mapper.resolve(&ColumnCandidates::from(["TABLE_CAT", "TABLE_QUALIFIER"]));
        assert_eq!(column, Some(0));
        assert_eq!(mapper.resolve(&ColumnCandidates::from(["MISSING"])), None);
        assert_eq!(mapper.resolve(&ColumnCandidates::none()), None);
    }

    #[test]
    fn test_null_maps_to_absent() {
        let rs = sample();
        let mapper = RowMapper::new(&rs, true);
        assert_eq!(mapper.text(1, Some(0)), None);
        assert_eq!(mapper.text(0, None), None);
    }

    #[test]
    fn test_trimming_is_configurable() {
        let rs = sample();
        assert_eq!(RowMapper::new(&rs, true).text(0, Some(0)).as_deref(), Some("legacy"));
        assert_eq!(
            RowMapper::new(&rs, false).text(0, Some(0)).as_deref(),
            Some("  legacy  ")
        );
    }

    #[test]
    fn test_type_coercion() {
        let rs = sample();
        let mapper = RowMapper::new(&rs, false);
        assert_eq!(mapper.bool(0, Some(2)), Some(true));
        assert_eq!(mapper.bool(1, Some(2)), Some(false));
        assert_eq!(mapper.int(0, Some(3)), Some(12));
        assert_eq!(mapper.int(1, Some(3)), Some(4));
        assert_eq!(coerce_bool(&Value::from("maybe")), None);
        assert_eq!(coerce_int(&Value::from("abc")), None);
        assert_eq!(coerce_int(&Value::from("7.9")), Some(7));
    }
}
