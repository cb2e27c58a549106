//! Table profiling data models.

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Aggregate statistics for a single column.
///
/// Numeric columns additionally carry min/max/avg; a column whose aggregates
/// failed carries only the name, type, and an error marker.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ColumnProfile {
    pub column: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distinct_count: Option<i64>,
    /// Present (possibly null) for numeric columns only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<JsonValue>,
    /// Rounded to 2 decimal places; 0 when the driver reports a null average
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ColumnProfile {
    /// Create a profile entry with base statistics.
    pub fn new(
        column: impl Into<String>,
        data_type: impl Into<String>,
        null_count: i64,
        null_pct: f64,
        distinct_count: i64,
    ) -> Self {
        Self {
            column: column.into(),
            data_type: data_type.into(),
            null_count: Some(null_count),
            null_pct: Some(null_pct),
            distinct_count: Some(distinct_count),
            min: None,
            max: None,
            avg: None,
            error: None,
        }
    }

    /// Create a degraded entry for a column whose aggregates failed.
    pub fn failed(
        column: impl Into<String>,
        data_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            data_type: data_type.into(),
            null_count: None,
            null_pct: None,
            distinct_count: None,
            min: None,
            max: None,
            avg: None,
            error: Some(message.into()),
        }
    }
}

/// Profile of a whole table.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TableProfile {
    pub table: String,
    pub row_count: i64,
    /// Total columns in the table, including any beyond the profiling cap
    pub column_count: usize,
    pub columns: Vec<ColumnProfile>,
}
