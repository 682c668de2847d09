//! Feature-table sourcing boundary.
//!
//! The engine trains on whatever queryable tabular source the deployment
//! provides. This crate specifies that interface and ships a CSV-directory
//! implementation for local runs and tests. Resolution probes a list of
//! candidate table names in order because upstream builders publish the
//! feature table under dataset-dependent names; each name is probed exactly
//! once, with no retries.

use std::path::PathBuf;

use execkpi_core::errors::{ErrorInfo, KpiError};
use execkpi_core::FeatureTable;
use serde_json::Value;

/// A queryable source of named feature tables.
pub trait FeatureSource {
    /// Fetches the full contents of one logical table.
    fn fetch(&self, table: &str) -> Result<FeatureTable, KpiError>;
}

/// Filesystem source reading `<root>/<table>.csv`.
///
/// Cells are parsed leniently: numeric text becomes a number, empty text
/// becomes null, everything else stays a string for downstream coercion.
#[derive(Debug, Clone)]
pub struct CsvFeatureSource {
    root: PathBuf,
}

impl CsvFeatureSource {
    /// Creates a source rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{}.csv", table))
    }
}

fn parse_cell(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    match text.parse::<f64>() {
        Ok(number) if number.is_finite() => serde_json::Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(text.to_string())),
        _ => Value::String(text.to_string()),
    }
}

impl FeatureSource for CsvFeatureSource {
    fn fetch(&self, table: &str) -> Result<FeatureTable, KpiError> {
        let path = self.table_path(table);
        if !path.exists() {
            return Err(KpiError::Source(
                ErrorInfo::new("table-not-found", "no such table")
                    .with_context("table", table)
                    .with_context("path", path.display().to_string()),
            ));
        }
        let read_error = |err: csv::Error| {
            KpiError::Source(
                ErrorInfo::new("table-read-failed", err.to_string()).with_context("table", table),
            )
        };
        let mut reader = csv::Reader::from_path(&path).map_err(read_error)?;
        let columns: Vec<String> = reader
            .headers()
            .map_err(read_error)?
            .iter()
            .map(str::to_string)
            .collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(read_error)?;
            rows.push(record.iter().map(parse_cell).collect());
        }
        FeatureTable::new(table, columns, rows)
    }
}

/// Probes candidate table names in order and returns the first table that
/// exists and holds rows.
///
/// Exhausting the list is a `Source` error carrying every probed name; the
/// caller decides whether to rebuild the upstream tables or fix the
/// configured name.
pub fn resolve_feature_table(
    source: &dyn FeatureSource,
    candidates: &[String],
) -> Result<FeatureTable, KpiError> {
    for candidate in candidates {
        match source.fetch(candidate) {
            Ok(table) if !table.is_empty() => return Ok(table),
            Ok(_) | Err(_) => continue,
        }
    }
    Err(KpiError::Source(
        ErrorInfo::new(
            "source-unavailable",
            "no candidate feature table exists with rows",
        )
        .with_context("probed", candidates.join(","))
        .with_hint("rebuild the upstream feature tables or set the exact table name"),
    ))
}
