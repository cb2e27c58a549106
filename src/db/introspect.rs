//! Schema introspection module.
//!
//! Lists tables and describes columns against each backend's
//! `information_schema` catalog.
//!
//! # Architecture
//!
//! SQL queries are organized in the `queries` submodule with constants for
//! each database type. Database-specific implementations are in their
//! respective submodules (postgres, mysql), each providing the same
//! interface.

use crate::db::session::DbPool;
use crate::error::DbResult;
use crate::models::{ColumnDescriptor, TableEntry};
use tracing::debug;

/// Schema inspector for database introspection.
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// List tables and views, ordered by name.
    ///
    /// For Postgres the schema defaults to `public`. MySQL conflates schema
    /// and database, so the schema argument is ignored there and the current
    /// database is listed.
    pub async fn list_tables(pool: &DbPool, schema: Option<&str>) -> DbResult<Vec<TableEntry>> {
        match pool {
            DbPool::Postgres(p) => postgres::list_tables(p, schema).await,
            DbPool::MySql(p) => mysql::list_tables(p).await,
        }
    }

    /// Describe a table's columns in ordinal order.
    ///
    /// A table that does not exist yields an empty column list rather than a
    /// not-found error; callers see `column_count: 0`.
    pub async fn describe_table(
        pool: &DbPool,
        table_name: &str,
        schema: Option<&str>,
    ) -> DbResult<Vec<ColumnDescriptor>> {
        match pool {
            DbPool::Postgres(p) => postgres::describe_table(p, table_name, schema).await,
            DbPool::MySql(p) => mysql::describe_table(p, table_name).await,
        }
    }
}

// =============================================================================
// SQL Query Templates
// =============================================================================
//
// Centralized SQL queries for schema introspection. The explicit casts on the
// Postgres side flatten information_schema domain types (sql_identifier,
// cardinal_number) into plain text/int for the driver.

mod queries {
    pub mod postgres {
        pub const LIST_TABLES: &str = r#"
            SELECT
                table_name::text AS table_name,
                table_type::text AS table_type
            FROM information_schema.tables
            WHERE table_schema = $1
            ORDER BY table_name
            "#;

        pub const DESCRIBE_COLUMNS: &str = r#"
            SELECT
                column_name::text AS column_name,
                data_type::text AS data_type,
                is_nullable::text AS is_nullable,
                column_default::text AS column_default,
                character_maximum_length::bigint AS character_maximum_length,
                ordinal_position::int AS ordinal_position
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
            "#;
    }

    pub mod mysql {
        pub const LIST_TABLES: &str = r#"
            SELECT
                CONVERT(TABLE_NAME USING utf8) AS TABLE_NAME,
                CONVERT(TABLE_TYPE USING utf8) AS TABLE_TYPE
            FROM information_schema.TABLES
            WHERE TABLE_SCHEMA = DATABASE()
            ORDER BY TABLE_NAME
            "#;

        pub const DESCRIBE_COLUMNS: &str = r#"
            SELECT
                CONVERT(COLUMN_NAME USING utf8) AS COLUMN_NAME,
                CONVERT(DATA_TYPE USING utf8) AS DATA_TYPE,
                CONVERT(IS_NULLABLE USING utf8) AS IS_NULLABLE,
                CONVERT(COLUMN_DEFAULT USING utf8) AS COLUMN_DEFAULT,
                CHARACTER_MAXIMUM_LENGTH,
                ORDINAL_POSITION
            FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
            "#;
    }
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================

mod postgres {
    use super::*;
    use sqlx::{PgPool, Row};

    pub async fn list_tables(pool: &PgPool, schema: Option<&str>) -> DbResult<Vec<TableEntry>> {
        let schema_name = schema.unwrap_or("public");

        let rows = sqlx::query(queries::postgres::LIST_TABLES)
            .bind(schema_name)
            .fetch_all(pool)
            .await?;

        let tables = rows
            .iter()
            .map(|row| TableEntry {
                table_name: row.get("table_name"),
                table_type: row.get("table_type"),
            })
            .collect::<Vec<_>>();

        debug!(
            count = tables.len(),
            schema = schema_name,
            "Listed PostgreSQL tables"
        );
        Ok(tables)
    }

    pub async fn describe_table(
        pool: &PgPool,
        table_name: &str,
        schema: Option<&str>,
    ) -> DbResult<Vec<ColumnDescriptor>> {
        let schema_name = schema.unwrap_or("public");

        let rows = sqlx::query(queries::postgres::DESCRIBE_COLUMNS)
            .bind(schema_name)
            .bind(table_name)
            .fetch_all(pool)
            .await?;

        let columns = rows
            .iter()
            .map(|row| {
                let name: String = row.get("column_name");
                let data_type: String = row.get("data_type");
                let nullable: String = row.get("is_nullable");
                let default_value: Option<String> = row.try_get("column_default").ok().flatten();
                let max_length: Option<i64> =
                    row.try_get("character_maximum_length").ok().flatten();
                let ordinal: i32 = row.get("ordinal_position");

                let mut col = ColumnDescriptor::new(&name, &data_type, nullable == "YES", ordinal);
                if let Some(def) = default_value {
                    col = col.with_default(def);
                }
                if let Some(len) = max_length {
                    col = col.with_max_length(len);
                }
                col
            })
            .collect::<Vec<_>>();

        debug!(
            count = columns.len(),
            table = table_name,
            schema = schema_name,
            "Described PostgreSQL table"
        );
        Ok(columns)
    }
}

mod mysql {
    use super::*;
    use sqlx::MySqlPool;

    /// Safely get a string from a MySQL row.
    /// MySQL may return VARBINARY instead of VARCHAR depending on charset configuration.
    fn get_string(row: &sqlx::mysql::MySqlRow, column: &str) -> String {
        use sqlx::Row;
        row.try_get::<String, _>(column)
            .ok()
            .or_else(|| {
                row.try_get::<Vec<u8>, _>(column)
                    .ok()
                    .and_then(|bytes| String::from_utf8(bytes).ok())
            })
            .unwrap_or_default()
    }

    /// Safely get an optional string from a MySQL row.
    fn get_optional_string(row: &sqlx::mysql::MySqlRow, column: &str) -> Option<String> {
        use sqlx::Row;
        row.try_get::<Option<String>, _>(column)
            .ok()
            .flatten()
            .or_else(|| {
                row.try_get::<Option<Vec<u8>>, _>(column)
                    .ok()
                    .flatten()
                    .and_then(|bytes| String::from_utf8(bytes).ok())
            })
    }

    /// Try to get an integer value, handling MySQL version differences.
    /// MySQL 5.x may return BIGINT (i64), MySQL 8.x returns BIGINT UNSIGNED (u64).
    fn try_get_i64(row: &sqlx::mysql::MySqlRow, column: &str) -> Option<i64> {
        use sqlx::Row;
        if let Ok(Some(v)) = row.try_get::<Option<u64>, _>(column) {
            return i64::try_from(v).ok();
        }
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(column) {
            return Some(v);
        }
        None
    }

    pub async fn list_tables(pool: &MySqlPool) -> DbResult<Vec<TableEntry>> {
        let rows = sqlx::query(queries::mysql::LIST_TABLES)
            .fetch_all(pool)
            .await?;

        let tables = rows
            .iter()
            .filter_map(|row| {
                let name = get_string(row, "TABLE_NAME");
                if name.is_empty() {
                    return None;
                }
                Some(TableEntry {
                    table_name: name,
                    table_type: get_string(row, "TABLE_TYPE"),
                })
            })
            .collect::<Vec<_>>();

        debug!(count = tables.len(), "Listed MySQL tables");
        Ok(tables)
    }

    pub async fn describe_table(
        pool: &MySqlPool,
        table_name: &str,
    ) -> DbResult<Vec<ColumnDescriptor>> {
        let rows = sqlx::query(queries::mysql::DESCRIBE_COLUMNS)
            .bind(table_name)
            .fetch_all(pool)
            .await?;

        let columns = rows
            .iter()
            .map(|row| {
                let name = get_string(row, "COLUMN_NAME");
                let data_type = get_string(row, "DATA_TYPE");
                let nullable = get_string(row, "IS_NULLABLE");
                let default_value = get_optional_string(row, "COLUMN_DEFAULT");
                let max_length = try_get_i64(row, "CHARACTER_MAXIMUM_LENGTH");
                let ordinal = try_get_i64(row, "ORDINAL_POSITION").unwrap_or(0) as i32;

                let mut col = ColumnDescriptor::new(&name, &data_type, nullable == "YES", ordinal);
                if let Some(def) = default_value {
                    col = col.with_default(def);
                }
                if let Some(len) = max_length {
                    col = col.with_max_length(len);
                }
                col
            })
            .collect::<Vec<_>>();

        debug!(
            count = columns.len(),
            table = table_name,
            "Described MySQL table"
        );
        Ok(columns)
    }
}
