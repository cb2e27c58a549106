//! Schema introspection tools.
//!
//! This module implements the `list_tables` and `describe_table` MCP tools.

use crate::db::{SchemaIntrospector, SessionManager};
use crate::error::DbResult;
use crate::models::{ColumnDescriptor, TableEntry};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Input for the list_tables tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTablesInput {
    /// Schema name (default: public for PostgreSQL; ignored for MySQL,
    /// which lists the current database)
    #[serde(default)]
    pub schema: Option<String>,
}

/// Output from the list_tables tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListTablesOutput {
    /// Tables and views, ordered by name
    pub tables: Vec<TableEntry>,
    /// Number of entries returned
    pub count: usize,
}

/// Input for the describe_table tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DescribeTableInput {
    /// Table name
    pub table: String,
    /// Schema name (optional)
    #[serde(default)]
    pub schema: Option<String>,
}

/// Output from the describe_table tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DescribeTableOutput {
    /// Name of the described table
    pub table: String,
    /// Column definitions in ordinal order. Empty when the table does not
    /// exist - there is no separate not-found signal.
    pub columns: Vec<ColumnDescriptor>,
    /// Number of columns returned
    pub column_count: usize,
}

/// Handler for schema introspection tools.
pub struct SchemaToolHandler {
    session: Arc<SessionManager>,
}

impl SchemaToolHandler {
    /// Create a new schema tool handler.
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Handle the list_tables tool call.
    pub async fn list_tables(&self, input: ListTablesInput) -> DbResult<ListTablesOutput> {
        let pool = self.session.pool().await?;
        let tables = SchemaIntrospector::list_tables(&pool, input.schema.as_deref()).await?;
        let count = tables.len();

        info!(count, "Listed tables");

        Ok(ListTablesOutput { tables, count })
    }

    /// Handle the describe_table tool call.
    pub async fn describe_table(
        &self,
        input: DescribeTableInput,
    ) -> DbResult<DescribeTableOutput> {
        let pool = self.session.pool().await?;
        let columns =
            SchemaIntrospector::describe_table(&pool, &input.table, input.schema.as_deref())
                .await?;
        let column_count = columns.len();

        info!(table = %input.table, column_count, "Described table");

        Ok(DescribeTableOutput {
            table: input.table,
            columns,
            column_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_tables_input_schema_optional() {
        let input: ListTablesInput = serde_json::from_str("{}").unwrap();
        assert!(input.schema.is_none());

        let input: ListTablesInput = serde_json::from_str(r#"{"schema": "reporting"}"#).unwrap();
        assert_eq!(input.schema.as_deref(), Some("reporting"));
    }

    #[test]
    fn test_describe_table_input_requires_table() {
        assert!(serde_json::from_str::<DescribeTableInput>("{}").is_err());

        let input: DescribeTableInput =
            serde_json::from_str(r#"{"table": "users"}"#).unwrap();
        assert_eq!(input.table, "users");
        assert!(input.schema.is_none());
    }

    #[test]
    fn test_empty_describe_output_shape() {
        let output = DescribeTableOutput {
            table: "missing_table".to_string(),
            columns: Vec::new(),
            column_count: 0,
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["table"], "missing_table");
        assert_eq!(json["column_count"], 0);
        assert!(json["columns"].as_array().unwrap().is_empty());
    }
}
