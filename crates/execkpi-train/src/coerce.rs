//! Cell-level numeric coercion for heterogeneous feature tables.
//!
//! Upstream tabular sources deliver scalars boxed and stringified
//! inconsistently: plain numbers, `"0.687"`, `"[6.87E-1]"`, `[3]`, nulls.
//! Training must never fail on a single malformed cell, so coercion trades
//! strictness for robustness and substitutes 0.0 where parsing fails. The
//! substitutions are counted per column in a [`CoercionReport`] so silent
//! zeros stay observable; the report cannot tell a substituted zero apart
//! from a legitimate one after the fact, only how many substitutions
//! happened.

use std::collections::BTreeMap;

use execkpi_core::FeatureTable;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attempts strict numeric coercion of one raw cell.
///
/// Rules, in order: null -> 0.0; numeric -> float; singleton sequence ->
/// recurse into the element, empty sequence -> 0.0; string -> strip one
/// enclosing `[...]` layer and parse (scientific notation included).
/// Returns `None` for everything unparsable, including non-finite parses.
pub fn coerce_cell(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Number(number) => number.as_f64(),
        Value::Array(items) => match items.as_slice() {
            [] => Some(0.0),
            [only] => coerce_cell(only),
            _ => None,
        },
        Value::String(text) => parse_numeric_text(text),
        Value::Bool(_) | Value::Object(_) => None,
    }
}

/// Lossy variant applying the fallback-to-zero policy.
pub fn coerce_or_zero(value: &Value) -> f64 {
    coerce_cell(value).unwrap_or(0.0)
}

fn parse_numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let unboxed = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed);
    let parsed = unboxed.trim().parse::<f64>().ok()?;
    parsed.is_finite().then_some(parsed)
}

/// Per-run tally of cells that fell back to 0.0 because they failed to
/// parse. Genuine nulls and zeros are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionReport {
    /// Total feature cells processed.
    pub cells: u64,
    /// Cells substituted with 0.0 after a failed parse.
    pub fallbacks: u64,
    /// Failed-parse counts keyed by column name.
    #[serde(default)]
    pub fallbacks_by_column: BTreeMap<String, u64>,
}

/// Coerces the selected feature columns of a table into a dense row-major
/// design matrix, recording parse failures along the way.
pub fn coerce_columns(
    table: &FeatureTable,
    feature_indices: &[usize],
) -> (Vec<Vec<f64>>, CoercionReport) {
    let mut report = CoercionReport::default();
    let mut matrix = Vec::with_capacity(table.len());
    for row in &table.rows {
        let mut coerced = Vec::with_capacity(feature_indices.len());
        for &idx in feature_indices {
            report.cells += 1;
            match coerce_cell(&row[idx]) {
                Some(value) => coerced.push(value),
                None => {
                    report.fallbacks += 1;
                    *report
                        .fallbacks_by_column
                        .entry(table.columns[idx].clone())
                        .or_insert(0) += 1;
                    coerced.push(0.0);
                }
            }
        }
        matrix.push(coerced);
    }
    (matrix, report)
}
