//! MCP service implementation using rmcp.
//!
//! This module defines the DbService struct with all database tools exposed
//! via the MCP protocol using the rmcp framework's macros.
//!
//! Every tool converts internal failures into a structured
//! `{"error": <message>}` JSON result at this boundary - the MCP caller only
//! ever sees structured JSON, never a protocol-level failure.

use crate::db::SessionManager;
use crate::error::{DbError, DbResult};
use crate::tools::profile::{ProfileTableInput, ProfileToolHandler};
use crate::tools::query::{QueryToolHandler, RunQueryInput};
use crate::tools::schema::{DescribeTableInput, ListTablesInput, SchemaToolHandler};
use rmcp::{
    Json, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde::Serialize;
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;

/// Convert a tool result into the structured JSON the caller expects.
fn respond<T: Serialize>(result: DbResult<T>) -> Json<JsonValue> {
    Json(match result {
        Ok(value) => serde_json::to_value(value)
            .unwrap_or_else(|e| json!({ "error": format!("Failed to serialize result: {}", e) })),
        Err(e) => json!({ "error": e.to_string() }),
    })
}

#[derive(Clone)]
pub struct DbService {
    /// Shared session holding the single live database connection
    session: Arc<SessionManager>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl DbService {
    /// Create a new DbService instance.
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            tool_router: Self::tool_router(),
        }
    }

    /// Make sure a connection exists before a query operation.
    ///
    /// When disconnected, one implicit connect-from-environment is attempted;
    /// if that also fails the operation reports NotConnected.
    async fn ensure_connected(&self) -> DbResult<()> {
        if self.session.is_connected().await {
            return Ok(());
        }
        match self.session.connect_from_env().await {
            Ok(_) => Ok(()),
            Err(e) => Err(DbError::not_connected(format!(
                "Not connected to database and auto-connect failed: {}",
                e
            ))),
        }
    }
}

#[tool_router]
impl DbService {
    #[tool(
        description = "Connect to the database using environment variables (DATABASE_URL or DB_HOST/DB_NAME/etc)."
    )]
    async fn connect(&self) -> Json<JsonValue> {
        Json(match self.session.connect_from_env().await {
            Ok(kind) => json!({ "success": true, "db_type": kind }),
            Err(e) => json!({ "success": false, "error": e.to_string() }),
        })
    }

    #[tool(
        description = "List all tables and views in the connected database.\nSchema defaults to 'public' for PostgreSQL; MySQL always lists the current database."
    )]
    async fn list_tables(
        &self,
        Parameters(input): Parameters<ListTablesInput>,
    ) -> Json<JsonValue> {
        let result = async {
            self.ensure_connected().await?;
            SchemaToolHandler::new(self.session.clone())
                .list_tables(input)
                .await
        }
        .await;
        respond(result)
    }

    #[tool(
        description = "Get the schema (columns, types, nullability, defaults) for a table.\nA missing table yields an empty column list."
    )]
    async fn describe_table(
        &self,
        Parameters(input): Parameters<DescribeTableInput>,
    ) -> Json<JsonValue> {
        let result = async {
            self.ensure_connected().await?;
            SchemaToolHandler::new(self.session.clone())
                .describe_table(input)
                .await
        }
        .await;
        respond(result)
    }

    #[tool(
        description = "Execute a SELECT query (read-only). Returns up to 100 rows unless the query carries its own LIMIT.\nStatements containing write keywords are rejected."
    )]
    async fn run_query(&self, Parameters(input): Parameters<RunQueryInput>) -> Json<JsonValue> {
        let result = async {
            self.ensure_connected().await?;
            QueryToolHandler::new(self.session.clone())
                .run_query(input)
                .await
        }
        .await;
        respond(result)
    }

    #[tool(
        description = "Profile a table: row count plus per-column null counts, distinct counts, and min/max/avg for numeric columns.\nAt most the first 20 columns are profiled."
    )]
    async fn profile_table(
        &self,
        Parameters(input): Parameters<ProfileTableInput>,
    ) -> Json<JsonValue> {
        let result = async {
            self.ensure_connected().await?;
            ProfileToolHandler::new(self.session.clone())
                .profile_table(input)
                .await
        }
        .await;
        respond(result)
    }
}

#[tool_handler]
impl ServerHandler for DbService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "db-analyst-mcp".to_owned(),
                title: Some("DB Analyst MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Read-only database inspection tools for PostgreSQL and MySQL.\n\
                \n\
                ## Workflow\n\
                1. Call `connect` to open a connection from environment variables\n\
                   (DATABASE_URL, DB_URL, or DB_TYPE/DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASSWORD)\n\
                2. Call `list_tables` to discover tables, then `describe_table` for columns\n\
                3. Use `run_query` for ad-hoc SELECTs (bounded to 100 rows by default)\n\
                4. Use `profile_table` for per-column statistics\n\
                \n\
                Tools other than `connect` attempt the environment connection\n\
                automatically when no session is open.\n\
                \n\
                All tools return structured JSON; failures come back as\n\
                {\"error\": \"<message>\"} rather than protocol errors."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> DbService {
        DbService::new(Arc::new(SessionManager::new()))
    }

    #[test]
    fn test_db_service_creation() {
        let _service = create_test_service();
    }

    #[test]
    fn test_server_info() {
        let service = create_test_service();
        let info = service.get_info();
        assert!(!info.server_info.name.is_empty());
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_respond_converts_errors_to_structured_json() {
        let result: DbResult<()> = Err(DbError::query_rejected(
            "Query contains forbidden keyword: DROP",
        ));
        let Json(value) = respond(result);
        assert_eq!(value["error"], "Query contains forbidden keyword: DROP");
    }

    #[test]
    fn test_respond_passes_success_values_through() {
        #[derive(Serialize)]
        struct Out {
            row_count: usize,
        }
        let Json(value) = respond(Ok(Out { row_count: 3 }));
        assert_eq!(value["row_count"], 3);
        assert!(value.get("error").is_none());
    }
}
