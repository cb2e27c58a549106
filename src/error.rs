//! Error types for the DB Analyst MCP Server.
//!
//! This module defines all error types using `thiserror` for ergonomic error
//! handling. Tool handlers convert these into a structured `{"error": ...}`
//! JSON result at the MCP boundary, so callers never observe a raw failure.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// No database could be resolved from the environment.
    #[error("{message}")]
    Configuration { message: String },

    /// The URL scheme or DB_TYPE value names a backend we do not support.
    #[error("Unsupported database backend: {backend}. Use postgresql:// or mysql://")]
    UnsupportedBackend { backend: String },

    /// The driver for the requested backend is not available in this build.
    #[error("Database driver unavailable: {message}")]
    DriverUnavailable { message: String },

    /// Handshake, authentication, or network failure. The driver's message is
    /// passed through unmasked.
    #[error("Connection failed: {message}")]
    Connection { message: String },

    /// An operation was attempted before a successful connect and the
    /// implicit connect-from-environment also failed.
    #[error("{message}")]
    NotConnected { message: String },

    /// The statement failed read-only validation.
    #[error("{reason}")]
    QueryRejected { reason: String },

    /// A single column's aggregates failed during table profiling. Non-fatal:
    /// the profile degrades to a partial entry for that column.
    #[error("Could not profile column '{column}': {message}")]
    Profiling { column: String, message: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an unsupported backend error.
    pub fn unsupported_backend(backend: impl Into<String>) -> Self {
        Self::UnsupportedBackend {
            backend: backend.into(),
        }
    }

    /// Create a driver unavailable error.
    pub fn driver_unavailable(message: impl Into<String>) -> Self {
        Self::DriverUnavailable {
            message: message.into(),
        }
    }

    /// Create a connection error carrying the driver's message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a not connected error.
    pub fn not_connected(message: impl Into<String>) -> Self {
        Self::NotConnected {
            message: message.into(),
        }
    }

    /// Create a query rejected error.
    pub fn query_rejected(reason: impl Into<String>) -> Self {
        Self::QueryRejected {
            reason: reason.into(),
        }
    }

    /// Create a profiling error for a single column.
    pub fn profiling(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Profiling {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the SQLSTATE code for this error, if the driver reported one.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Database { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(msg.to_string()),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::database(db_err.message(), code)
            }
            sqlx::Error::PoolClosed => {
                DbError::not_connected("Not connected to database: connection closed")
            }
            sqlx::Error::Io(io_err) => DbError::connection(format!("I/O error: {}", io_err)),
            sqlx::Error::Tls(tls_err) => DbError::connection(format!("TLS error: {}", tls_err)),
            sqlx::Error::Protocol(msg) => DbError::connection(format!("Protocol error: {}", msg)),
            sqlx::Error::AnyDriverError(err) => {
                DbError::driver_unavailable(format!("Driver error: {}", err))
            }
            sqlx::Error::ColumnNotFound(col) => {
                DbError::internal(format!("Column not found: {}", col))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => DbError::internal(format!(
                "Column index {} out of bounds (len: {})",
                index, len
            )),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("Decode error: {}", source)),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        let err = DbError::connection("connection refused");
        assert!(err.to_string().contains("Connection failed"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_query_rejected_displays_reason_verbatim() {
        let err = DbError::query_rejected("Query contains forbidden keyword: DROP");
        assert_eq!(err.to_string(), "Query contains forbidden keyword: DROP");
    }

    #[test]
    fn test_configuration_displays_message_verbatim() {
        let err = DbError::configuration("No database configured. Set DATABASE_URL or DB_NAME");
        assert_eq!(
            err.to_string(),
            "No database configured. Set DATABASE_URL or DB_NAME"
        );
    }

    #[test]
    fn test_unsupported_backend_names_scheme() {
        let err = DbError::unsupported_backend("sqlite");
        assert!(err.to_string().contains("sqlite"));
        assert!(err.to_string().contains("postgresql://"));
    }

    #[test]
    fn test_sql_state_only_on_database_errors() {
        let err = DbError::database("relation does not exist", Some("42P01".to_string()));
        assert_eq!(err.sql_state(), Some("42P01"));
        assert_eq!(DbError::internal("oops").sql_state(), None);
    }

    #[test]
    fn test_profiling_error_names_column() {
        let err = DbError::profiling("price", "aggregate failed");
        assert!(err.to_string().contains("price"));
    }
}
