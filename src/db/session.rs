//! Connection lifecycle and the execute primitive.
//!
//! A session owns at most one live connection to either backend. State moves
//! Disconnected -> Connected -> Closed; every query operation requires
//! Connected. The underlying sqlx pool is capped at a single connection, so
//! in-flight operations serialize at acquire time without any further
//! locking in the query path.

use crate::config::ConnectSpec;
use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::models::{ConnectionSettings, DatabaseKind, QueryParam, masked_url};
use futures_util::TryStreamExt;
use sqlx::{
    MySqlPool, PgPool,
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    postgres::{PgConnectOptions, PgPoolOptions},
};
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// A result row: column name -> JSON value, in driver column order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Backend-specific connection pool, selected once at connect time.
#[derive(Debug, Clone)]
pub enum DbPool {
    Postgres(PgPool),
    MySql(MySqlPool),
}

impl DbPool {
    /// Get the backend kind for this pool.
    pub fn kind(&self) -> DatabaseKind {
        match self {
            DbPool::Postgres(_) => DatabaseKind::PostgreSQL,
            DbPool::MySql(_) => DatabaseKind::MySQL,
        }
    }

    /// Close the underlying connection.
    pub async fn close(&self) {
        match self {
            DbPool::Postgres(pool) => pool.close().await,
            DbPool::MySql(pool) => pool.close().await,
        }
    }
}

/// Session lifecycle state.
#[derive(Debug)]
enum SessionState {
    Disconnected,
    Connected { pool: DbPool, kind: DatabaseKind },
    Closed,
}

/// Owns the single live connection for one caller session.
///
/// Shared by `Arc` into every tool handler rather than living in process
/// globals, so multiple sessions can coexist in tests.
#[derive(Debug)]
pub struct SessionManager {
    state: Mutex<SessionState>,
}

impl SessionManager {
    /// Create a new disconnected session.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::Disconnected),
        }
    }

    /// Check whether the session currently holds a live connection.
    pub async fn is_connected(&self) -> bool {
        matches!(&*self.state.lock().await, SessionState::Connected { .. })
    }

    /// Get the backend kind of the live connection, if any.
    pub async fn backend_kind(&self) -> Option<DatabaseKind> {
        match &*self.state.lock().await {
            SessionState::Connected { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Connect using environment variables (DATABASE_URL or DB_HOST/DB_NAME/etc).
    pub async fn connect_from_env(&self) -> DbResult<DatabaseKind> {
        self.connect_with(crate::config::connect_spec_from_env()?)
            .await
    }

    /// Connect using an already-resolved spec.
    pub async fn connect_with(&self, spec: ConnectSpec) -> DbResult<DatabaseKind> {
        match spec {
            ConnectSpec::Url(url) => self.connect_from_url(&url).await,
            ConnectSpec::Params(settings) => self.connect(settings).await,
        }
    }

    /// Parse a connection URL and connect.
    ///
    /// `postgresql://`/`postgres://` select the Postgres backend, `mysql://`
    /// selects MySQL; any other scheme is rejected. Driver failures surface
    /// with the driver's own message.
    pub async fn connect_from_url(&self, url: &str) -> DbResult<DatabaseKind> {
        let kind = DatabaseKind::from_url_scheme(url).ok_or_else(|| {
            let scheme = url.split("://").next().unwrap_or(url);
            DbError::unsupported_backend(scheme)
        })?;

        info!(db_type = %kind, url = %masked_url(url), "Connecting to database");

        let pool = match kind {
            DatabaseKind::PostgreSQL => {
                let pool = PgPoolOptions::new()
                    .max_connections(1)
                    .connect(url)
                    .await
                    .map_err(|e| DbError::connection(e.to_string()))?;
                DbPool::Postgres(pool)
            }
            DatabaseKind::MySQL => {
                let options = MySqlConnectOptions::from_str(url)
                    .map_err(|e| {
                        DbError::connection(format!("Invalid MySQL connection string: {}", e))
                    })?
                    .charset("utf8mb4");
                let pool = MySqlPoolOptions::new()
                    .max_connections(1)
                    .connect_with(options)
                    .await
                    .map_err(|e| DbError::connection(e.to_string()))?;
                DbPool::MySql(pool)
            }
        };

        self.install(pool, kind).await
    }

    /// Connect with discrete parameters; the port falls back to the backend
    /// default (5432/3306) when unset.
    pub async fn connect(&self, settings: ConnectionSettings) -> DbResult<DatabaseKind> {
        let kind = settings.kind;
        let port = settings.port.unwrap_or_else(|| kind.default_port());

        info!(
            db_type = %kind,
            host = %settings.host,
            port = port,
            database = %settings.database,
            "Connecting to database"
        );

        let pool = match kind {
            DatabaseKind::PostgreSQL => {
                let mut options = PgConnectOptions::new()
                    .host(&settings.host)
                    .port(port)
                    .database(&settings.database);
                if let Some(user) = &settings.user {
                    options = options.username(user);
                }
                if let Some(password) = &settings.password {
                    options = options.password(password);
                }
                let pool = PgPoolOptions::new()
                    .max_connections(1)
                    .connect_with(options)
                    .await
                    .map_err(|e| DbError::connection(e.to_string()))?;
                DbPool::Postgres(pool)
            }
            DatabaseKind::MySQL => {
                let mut options = MySqlConnectOptions::new()
                    .host(&settings.host)
                    .port(port)
                    .database(&settings.database)
                    .charset("utf8mb4");
                if let Some(user) = &settings.user {
                    options = options.username(user);
                }
                if let Some(password) = &settings.password {
                    options = options.password(password);
                }
                let pool = MySqlPoolOptions::new()
                    .max_connections(1)
                    .connect_with(options)
                    .await
                    .map_err(|e| DbError::connection(e.to_string()))?;
                DbPool::MySql(pool)
            }
        };

        self.install(pool, kind).await
    }

    /// Record a freshly opened connection, replacing any previous one.
    /// On connect failure the state is never touched, so a failed attempt
    /// leaves an existing connection usable.
    async fn install(&self, pool: DbPool, kind: DatabaseKind) -> DbResult<DatabaseKind> {
        let mut state = self.state.lock().await;
        if let SessionState::Connected { pool: old, .. } = &*state {
            old.close().await;
        }
        *state = SessionState::Connected { pool, kind };
        info!(db_type = %kind, "Connected successfully");
        Ok(kind)
    }

    /// Get the live pool, or fail when not connected.
    pub async fn pool(&self) -> DbResult<DbPool> {
        match &*self.state.lock().await {
            SessionState::Connected { pool, .. } => Ok(pool.clone()),
            _ => Err(DbError::not_connected("Not connected to database")),
        }
    }

    /// Run a statement and collect its result rows.
    ///
    /// Rows come back as column-name -> value maps in driver column order;
    /// statements with no result-set shape yield an empty sequence.
    pub async fn execute(&self, sql: &str, params: &[QueryParam]) -> DbResult<Vec<Row>> {
        let pool = self.pool().await?;

        debug!(sql = %sql, params = params.len(), "Executing statement");

        match &pool {
            DbPool::Postgres(p) => postgres::fetch_rows(p, sql, params).await,
            DbPool::MySql(p) => mysql::fetch_rows(p, sql, params).await,
        }
    }

    /// Release the underlying connection and transition to Closed. Idempotent.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if let SessionState::Connected { pool, .. } = &*state {
            pool.close().await;
            info!("Database connection closed");
        }
        *state = SessionState::Closed;
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================
//
// Each module below provides the same interface adapted to its database type.
// The code structure is intentionally parallel to make differences obvious.

mod postgres {
    use super::*;
    use sqlx::postgres::{PgArguments, PgRow};

    pub async fn fetch_rows(
        pool: &PgPool,
        sql: &str,
        params: &[QueryParam],
    ) -> DbResult<Vec<Row>> {
        // When params is empty, use raw SQL to avoid prepared statement issues
        let rows: Vec<PgRow> = if params.is_empty() {
            use sqlx::Executor;
            pool.fetch(sql).try_collect().await.map_err(DbError::from)?
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            query
                .fetch(pool)
                .try_collect()
                .await
                .map_err(DbError::from)?
        };

        Ok(rows.iter().map(|r| r.to_json_map()).collect())
    }

    fn bind_param<'q>(
        query: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
        param: &'q QueryParam,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
        match param {
            QueryParam::Null => query.bind(None::<String>),
            QueryParam::Bool(v) => query.bind(*v),
            QueryParam::Int(v) => query.bind(*v),
            QueryParam::Float(v) => query.bind(*v),
            QueryParam::String(v) => query.bind(v.as_str()),
        }
    }
}

mod mysql {
    use super::*;
    use sqlx::mysql::{MySqlArguments, MySqlRow};

    pub async fn fetch_rows(
        pool: &MySqlPool,
        sql: &str,
        params: &[QueryParam],
    ) -> DbResult<Vec<Row>> {
        let rows: Vec<MySqlRow> = if params.is_empty() {
            use sqlx::Executor;
            pool.fetch(sql).try_collect().await.map_err(DbError::from)?
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            query
                .fetch(pool)
                .try_collect()
                .await
                .map_err(DbError::from)?
        };

        Ok(rows.iter().map(|r| r.to_json_map()).collect())
    }

    fn bind_param<'q>(
        query: sqlx::query::Query<'q, sqlx::MySql, MySqlArguments>,
        param: &'q QueryParam,
    ) -> sqlx::query::Query<'q, sqlx::MySql, MySqlArguments> {
        match param {
            QueryParam::Null => query.bind(None::<String>),
            QueryParam::Bool(v) => query.bind(*v),
            QueryParam::Int(v) => query.bind(*v),
            QueryParam::Float(v) => query.bind(*v),
            QueryParam::String(v) => query.bind(v.as_str()),
        }
    }
}
