//! Free-form query tool with read-only validation.
//!
//! This module implements the `run_query` MCP tool. Validation is keyword
//! based, not a real SQL parser: it rejects anything that does not start
//! with SELECT, rejects statements containing a denylisted keyword anywhere
//! in the text, and bounds unlimited SELECTs by appending a LIMIT. The
//! denylist is a substring check, so harmless occurrences inside string
//! literals or identifiers (e.g. a column named `update_time`) are also
//! rejected - a simple guard, not a SQL firewall.

use crate::db::{Row, SessionManager};
use crate::error::{DbError, DbResult};
use crate::models::DEFAULT_ROW_LIMIT;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Keywords that cause a statement to be rejected wherever they appear.
pub const FORBIDDEN_KEYWORDS: [&str; 9] = [
    "DROP", "DELETE", "UPDATE", "INSERT", "ALTER", "TRUNCATE", "CREATE", "GRANT", "REVOKE",
];

/// Validate a caller-supplied statement and rewrite it for bounded execution.
///
/// The uppercased copy is used for inspection only; the returned statement
/// preserves the original casing. Statements without a LIMIT get trailing
/// whitespace and `;` stripped and ` LIMIT 100` appended; statements that
/// already contain LIMIT pass through unmodified.
pub fn prepare_query(sql: &str) -> DbResult<String> {
    let upper = sql.trim().to_uppercase();

    if !upper.starts_with("SELECT") {
        return Err(DbError::query_rejected(
            "Only SELECT queries are allowed for safety",
        ));
    }

    for keyword in FORBIDDEN_KEYWORDS {
        if upper.contains(keyword) {
            return Err(DbError::query_rejected(format!(
                "Query contains forbidden keyword: {}",
                keyword
            )));
        }
    }

    if upper.contains("LIMIT") {
        Ok(sql.to_string())
    } else {
        let trimmed = sql.trim_end().trim_end_matches(';').trim_end();
        Ok(format!("{} LIMIT {}", trimmed, DEFAULT_ROW_LIMIT))
    }
}

/// Input for the run_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RunQueryInput {
    /// SQL SELECT statement to execute. Results are capped at 100 rows
    /// unless the statement carries its own LIMIT.
    pub query: String,
}

/// Output from the run_query tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct RunQueryOutput {
    /// Result rows as column-name -> value maps, in driver column order
    pub rows: Vec<Row>,
    /// Number of rows returned
    pub row_count: usize,
}

/// Handler for validated query execution.
pub struct QueryToolHandler {
    session: Arc<SessionManager>,
}

impl QueryToolHandler {
    /// Create a new query tool handler.
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Validate, rewrite, and run a caller-supplied SELECT.
    pub async fn run_query(&self, input: RunQueryInput) -> DbResult<RunQueryOutput> {
        let statement = prepare_query(&input.query)?;
        let rows = self.session.execute(&statement, &[]).await?;
        let row_count = rows.len();

        info!(row_count, "Query executed");

        Ok(RunQueryOutput { rows, row_count })
    }
}
