//! Configuration handling for the DB Analyst MCP Server.
//!
//! Server options come from CLI arguments and environment variables via clap.
//! Database connection settings are resolved separately from `DATABASE_URL`-
//! style variables, through an injectable lookup so tests never have to
//! mutate the process environment.

use crate::error::{DbError, DbResult};
use crate::models::{ConnectionSettings, DatabaseKind};
use clap::{Parser, ValueEnum};

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_MCP_ENDPOINT: &str = "/";
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_TYPE: &str = "postgresql";

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// HTTP with streaming responses (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Server configuration parsed from command line and environment.
#[derive(Debug, Parser)]
#[command(
    name = "db-analyst-mcp",
    version,
    about = "MCP server for read-only database inspection"
)]
pub struct Config {
    /// Transport to serve the MCP protocol over
    #[arg(long, value_enum, default_value_t = TransportMode::Stdio, env = "MCP_TRANSPORT")]
    pub transport: TransportMode,

    /// Host to bind the HTTP transport to
    #[arg(long, default_value = DEFAULT_HTTP_HOST, env = "MCP_HTTP_HOST")]
    pub http_host: String,

    /// Port to bind the HTTP transport to
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT, env = "MCP_HTTP_PORT")]
    pub http_port: u16,

    /// Path the MCP endpoint is served under (HTTP transport)
    #[arg(long, default_value = DEFAULT_MCP_ENDPOINT, env = "MCP_ENDPOINT")]
    pub mcp_endpoint: String,

    /// Log level filter used when RUST_LOG is not set
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false, env = "JSON_LOGS")]
    pub json_logs: bool,
}

/// How to open the database connection, as resolved from the environment.
#[derive(Debug, Clone)]
pub enum ConnectSpec {
    /// A full connection URL (DATABASE_URL / DB_URL)
    Url(String),
    /// Discrete DB_* variables
    Params(ConnectionSettings),
}

/// Resolve connection settings from environment-style variables.
///
/// First match wins: `DATABASE_URL`, `DB_URL`, then the discrete variables
/// `DB_TYPE` (default postgresql), `DB_HOST` (default localhost), `DB_PORT`,
/// `DB_NAME`/`DB_DATABASE`, `DB_USER`, `DB_PASSWORD`.
pub fn resolve_connect_spec<F>(get: F) -> DbResult<ConnectSpec>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = get("DATABASE_URL").or_else(|| get("DB_URL")) {
        return Ok(ConnectSpec::Url(url));
    }

    let database = get("DB_NAME").or_else(|| get("DB_DATABASE")).ok_or_else(|| {
        DbError::configuration("No database configured. Set DATABASE_URL or DB_NAME")
    })?;

    let type_name = get("DB_TYPE").unwrap_or_else(|| DEFAULT_DB_TYPE.to_string());
    let kind = DatabaseKind::from_type_name(&type_name)
        .ok_or_else(|| DbError::unsupported_backend(type_name))?;

    let port = match get("DB_PORT") {
        Some(raw) => Some(raw.trim().parse::<u16>().map_err(|e| {
            DbError::configuration(format!("Invalid DB_PORT value '{}': {}", raw, e))
        })?),
        None => None,
    };

    Ok(ConnectSpec::Params(ConnectionSettings {
        kind,
        host: get("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
        port,
        database,
        user: get("DB_USER"),
        password: get("DB_PASSWORD"),
    }))
}

/// Resolve the connect spec from the process environment.
pub fn connect_spec_from_env() -> DbResult<ConnectSpec> {
    resolve_connect_spec(|key| std::env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_database_url_wins_over_everything() {
        let spec = resolve_connect_spec(lookup(&[
            ("DATABASE_URL", "postgresql://u:p@h:5432/db"),
            ("DB_URL", "mysql://other"),
            ("DB_NAME", "ignored"),
        ]))
        .unwrap();
        assert!(matches!(spec, ConnectSpec::Url(url) if url == "postgresql://u:p@h:5432/db"));
    }

    #[test]
    fn test_db_url_is_second_choice() {
        let spec = resolve_connect_spec(lookup(&[("DB_URL", "mysql://u@h/db")])).unwrap();
        assert!(matches!(spec, ConnectSpec::Url(url) if url == "mysql://u@h/db"));
    }

    #[test]
    fn test_discrete_defaults() {
        let spec = resolve_connect_spec(lookup(&[("DB_NAME", "analytics")])).unwrap();
        let ConnectSpec::Params(settings) = spec else {
            panic!("expected discrete params");
        };
        assert_eq!(settings.kind, DatabaseKind::PostgreSQL);
        assert_eq!(settings.host, "localhost");
        assert_eq!(settings.port, None);
        assert_eq!(settings.database, "analytics");
        assert_eq!(settings.user, None);
    }

    #[test]
    fn test_db_database_alias() {
        let spec = resolve_connect_spec(lookup(&[("DB_DATABASE", "sales")])).unwrap();
        let ConnectSpec::Params(settings) = spec else {
            panic!("expected discrete params");
        };
        assert_eq!(settings.database, "sales");
    }

    #[test]
    fn test_missing_database_is_configuration_error() {
        let err = resolve_connect_spec(lookup(&[("DB_HOST", "db.internal")])).unwrap_err();
        assert!(matches!(err, DbError::Configuration { .. }));
        assert!(err.to_string().contains("DATABASE_URL or DB_NAME"));
    }

    #[test]
    fn test_unknown_db_type_rejected() {
        let err = resolve_connect_spec(lookup(&[("DB_NAME", "db"), ("DB_TYPE", "mongodb")]))
            .unwrap_err();
        assert!(matches!(err, DbError::UnsupportedBackend { .. }));
    }

    #[test]
    fn test_mysql_type_with_port() {
        let spec = resolve_connect_spec(lookup(&[
            ("DB_NAME", "db"),
            ("DB_TYPE", "mysql"),
            ("DB_PORT", "3307"),
            ("DB_USER", "root"),
            ("DB_PASSWORD", "secret"),
        ]))
        .unwrap();
        let ConnectSpec::Params(settings) = spec else {
            panic!("expected discrete params");
        };
        assert_eq!(settings.kind, DatabaseKind::MySQL);
        assert_eq!(settings.port, Some(3307));
        assert_eq!(settings.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_garbage_port_rejected() {
        let err = resolve_connect_spec(lookup(&[("DB_NAME", "db"), ("DB_PORT", "not-a-port")]))
            .unwrap_err();
        assert!(matches!(err, DbError::Configuration { .. }));
    }
}
