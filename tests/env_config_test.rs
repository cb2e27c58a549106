//! Integration tests for environment-based connection resolution.

use db_analyst_mcp::config::{ConnectSpec, resolve_connect_spec};
use db_analyst_mcp::error::DbError;
use db_analyst_mcp::models::DatabaseKind;
use std::collections::HashMap;

fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
    vars.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn resolve(vars: &[(&str, &str)]) -> Result<ConnectSpec, DbError> {
    let map = env(vars);
    resolve_connect_spec(|key| map.get(key).cloned())
}

/// DATABASE_URL takes precedence and its scheme selects the backend.
#[test]
fn test_database_url_selects_postgres_backend() {
    let spec = resolve(&[("DATABASE_URL", "postgresql://u:p@h:5432/db")]).unwrap();
    let ConnectSpec::Url(url) = spec else {
        panic!("expected URL spec");
    };
    assert_eq!(
        DatabaseKind::from_url_scheme(&url),
        Some(DatabaseKind::PostgreSQL)
    );
}

/// The short postgres:// scheme is accepted too.
#[test]
fn test_short_postgres_scheme_accepted() {
    let spec = resolve(&[("DB_URL", "postgres://u:p@h/db")]).unwrap();
    let ConnectSpec::Url(url) = spec else {
        panic!("expected URL spec");
    };
    assert_eq!(
        DatabaseKind::from_url_scheme(&url),
        Some(DatabaseKind::PostgreSQL)
    );
}

/// mysql:// maps to the MySQL backend.
#[test]
fn test_mysql_scheme_selects_mysql_backend() {
    let spec = resolve(&[("DATABASE_URL", "mysql://root@localhost/app")]).unwrap();
    let ConnectSpec::Url(url) = spec else {
        panic!("expected URL spec");
    };
    assert_eq!(
        DatabaseKind::from_url_scheme(&url),
        Some(DatabaseKind::MySQL)
    );
}

/// Unknown schemes are not silently accepted anywhere in the pipeline.
#[test]
fn test_unknown_scheme_maps_to_no_backend() {
    assert_eq!(DatabaseKind::from_url_scheme("oracle://h/db"), None);
    assert_eq!(DatabaseKind::from_url_scheme("sqlite::memory:"), None);
}

/// With no URL, discrete variables are used with documented defaults.
#[test]
fn test_discrete_variables_with_defaults() {
    let spec = resolve(&[("DB_NAME", "warehouse")]).unwrap();
    let ConnectSpec::Params(settings) = spec else {
        panic!("expected discrete params");
    };
    assert_eq!(settings.kind, DatabaseKind::PostgreSQL);
    assert_eq!(settings.host, "localhost");
    assert_eq!(settings.port, None);
    assert_eq!(settings.database, "warehouse");
}

/// Backend default ports apply when DB_PORT is unset.
#[test]
fn test_backend_default_ports() {
    assert_eq!(DatabaseKind::PostgreSQL.default_port(), 5432);
    assert_eq!(DatabaseKind::MySQL.default_port(), 3306);
}

/// Nothing resolvable -> configuration error naming the fix.
#[test]
fn test_no_database_is_configuration_error() {
    let err = resolve(&[]).unwrap_err();
    assert!(matches!(err, DbError::Configuration { .. }));
    assert_eq!(
        err.to_string(),
        "No database configured. Set DATABASE_URL or DB_NAME"
    );
}

/// An unknown DB_TYPE is an unsupported-backend error, not a fallback.
#[test]
fn test_unknown_db_type_is_unsupported_backend() {
    let err = resolve(&[("DB_NAME", "db"), ("DB_TYPE", "cassandra")]).unwrap_err();
    assert!(matches!(err, DbError::UnsupportedBackend { .. }));
    assert!(err.to_string().contains("cassandra"));
}

/// DB_TYPE accepts the postgres alias, case-insensitively.
#[test]
fn test_db_type_postgres_alias() {
    let spec = resolve(&[("DB_NAME", "db"), ("DB_TYPE", "Postgres")]).unwrap();
    let ConnectSpec::Params(settings) = spec else {
        panic!("expected discrete params");
    };
    assert_eq!(settings.kind, DatabaseKind::PostgreSQL);
}
