//! Table profiling tool.
//!
//! This module implements the `profile_table` MCP tool: row count plus
//! per-column null/distinct counts, with min/max/avg for numeric columns.
//! Table and column names are structured identifiers supplied by a trusted
//! caller; they cannot be bound as parameters and are interpolated into the
//! aggregate statements.

use crate::db::{Row, SchemaIntrospector, SessionManager};
use crate::error::{DbError, DbResult};
use crate::models::{ColumnDescriptor, ColumnProfile, TableProfile};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{info, warn};

/// Declared types that get min/max/avg aggregates, in each backend's own
/// spelling. Exact, case-sensitive matches only.
pub const NUMERIC_TYPES: [&str; 10] = [
    "integer",
    "bigint",
    "smallint",
    "decimal",
    "numeric",
    "real",
    "double precision",
    "int",
    "float",
    "double",
];

/// Columns beyond this cap are omitted from the profile entirely.
pub const MAX_PROFILED_COLUMNS: usize = 20;

/// Check whether a declared column type is eligible for numeric aggregates.
pub fn is_numeric_type(data_type: &str) -> bool {
    NUMERIC_TYPES.contains(&data_type)
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Pull a numeric value out of a decoded JSON cell. Decimal columns come
/// back as strings and need parsing.
fn numeric_value(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read an i64 scalar from the first row of a result, defaulting to 0.
fn scalar_i64(rows: &[Row], key: &str) -> i64 {
    rows.first()
        .and_then(|row| row.get(key))
        .and_then(numeric_value)
        .map(|v| v as i64)
        .unwrap_or(0)
}

/// Input for the profile_table tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ProfileTableInput {
    /// Table name to profile
    pub table: String,
    /// Schema name (optional)
    #[serde(default)]
    pub schema: Option<String>,
}

/// Handler for table profiling.
pub struct ProfileToolHandler {
    session: Arc<SessionManager>,
}

impl ProfileToolHandler {
    /// Create a new profile tool handler.
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Handle the profile_table tool call.
    ///
    /// A failure while profiling a single column degrades that column to an
    /// error-marker entry and profiling continues; only failures before the
    /// per-column loop (row count, describe) abort the whole call.
    pub async fn profile_table(&self, input: ProfileTableInput) -> DbResult<TableProfile> {
        let full_table = match &input.schema {
            Some(schema) => format!("{}.{}", schema, input.table),
            None => input.table.clone(),
        };

        let count_rows = self
            .session
            .execute(&format!("SELECT COUNT(*) AS cnt FROM {}", full_table), &[])
            .await?;
        let row_count = scalar_i64(&count_rows, "cnt");

        let pool = self.session.pool().await?;
        let columns =
            SchemaIntrospector::describe_table(&pool, &input.table, input.schema.as_deref())
                .await?;
        let column_count = columns.len();

        let mut profiles = Vec::with_capacity(columns.len().min(MAX_PROFILED_COLUMNS));
        for descriptor in columns.iter().take(MAX_PROFILED_COLUMNS) {
            match self.profile_column(&full_table, descriptor, row_count).await {
                Ok(profile) => profiles.push(profile),
                Err(e) => {
                    let err = DbError::profiling(&descriptor.name, e.to_string());
                    warn!(error = %err, "Column profiling failed");
                    profiles.push(ColumnProfile::failed(
                        &descriptor.name,
                        &descriptor.data_type,
                        "Could not profile",
                    ));
                }
            }
        }

        info!(
            table = %input.table,
            row_count,
            column_count,
            profiled = profiles.len(),
            "Profiled table"
        );

        Ok(TableProfile {
            table: input.table,
            row_count,
            column_count,
            columns: profiles,
        })
    }

    async fn profile_column(
        &self,
        full_table: &str,
        descriptor: &ColumnDescriptor,
        row_count: i64,
    ) -> DbResult<ColumnProfile> {
        let column = &descriptor.name;

        let null_rows = self
            .session
            .execute(
                &format!(
                    "SELECT COUNT(*) AS cnt FROM {} WHERE {} IS NULL",
                    full_table, column
                ),
                &[],
            )
            .await?;
        let null_count = scalar_i64(&null_rows, "cnt");

        let distinct_rows = self
            .session
            .execute(
                &format!(
                    "SELECT COUNT(DISTINCT {}) AS cnt FROM {}",
                    column, full_table
                ),
                &[],
            )
            .await?;
        let distinct_count = scalar_i64(&distinct_rows, "cnt");

        let null_pct = if row_count > 0 {
            round2(100.0 * null_count as f64 / row_count as f64)
        } else {
            0.0
        };

        let mut profile = ColumnProfile::new(
            column,
            &descriptor.data_type,
            null_count,
            null_pct,
            distinct_count,
        );

        if is_numeric_type(&descriptor.data_type) {
            let stats_rows = self
                .session
                .execute(
                    &format!(
                        "SELECT MIN({c}) AS min_val, MAX({c}) AS max_val, AVG({c}) AS avg_val FROM {t}",
                        c = column,
                        t = full_table
                    ),
                    &[],
                )
                .await?;

            if let Some(stats) = stats_rows.first() {
                profile.min = Some(stats.get("min_val").cloned().unwrap_or(JsonValue::Null));
                profile.max = Some(stats.get("max_val").cloned().unwrap_or(JsonValue::Null));
                let avg = stats
                    .get("avg_val")
                    .and_then(numeric_value)
                    .unwrap_or(0.0);
                profile.avg = Some(round2(avg));
            }
        }

        Ok(profile)
    }
}
