use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ErrorInfo, KpiError};

/// Column name conventionally holding the row identifier.
///
/// The identifier column is excluded from the feature set before any model
/// sees the data, together with the designated target column.
pub const DEFAULT_ID_COLUMN: &str = "user_id";

/// Ordered tabular feature data with raw, heterogeneous cells.
///
/// Rows share one column set; cells are JSON values because upstream sources
/// deliver numbers, stringified numbers, singleton arrays and nulls
/// inconsistently. Numeric normalization happens downstream, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    /// Fully qualified name of the logical table the data came from.
    pub name: String,
    /// Column names, in source order.
    pub columns: Vec<String>,
    /// Row-major cell data; every row has exactly `columns.len()` cells.
    pub rows: Vec<Vec<Value>>,
}

impl FeatureTable {
    /// Validates row widths and creates a table.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, KpiError> {
        let name = name.into();
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(KpiError::Schema(
                    ErrorInfo::new("ragged-row", "row width does not match column count")
                        .with_context("table", name.clone())
                        .with_context("row", idx.to_string())
                        .with_context("expected", columns.len().to_string())
                        .with_context("actual", row.len().to_string()),
                ));
            }
        }
        Ok(Self {
            name,
            columns,
            rows,
        })
    }

    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the named column, if present.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    /// Column positions remaining after dropping the target and identifier
    /// columns, preserving source order.
    pub fn feature_indices(&self, target_column: &str, id_column: &str) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, name)| name.as_str() != target_column && name.as_str() != id_column)
            .map(|(idx, _)| idx)
            .collect()
    }
}
