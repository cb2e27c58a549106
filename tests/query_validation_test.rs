//! Integration tests for the query-safety gate.
//!
//! These tests verify that run_query validation rejects non-SELECT and
//! keyword-bearing statements before anything reaches the backend, and that
//! the LIMIT rewrite is applied exactly.

use db_analyst_mcp::error::DbError;
use db_analyst_mcp::tools::prepare_query;

/// Anything not beginning with SELECT is rejected.
#[test]
fn test_non_select_statements_rejected() {
    for sql in [
        "SHOW TABLES",
        "EXPLAIN SELECT 1",
        "WITH x AS (SELECT 1) SELECT * FROM x",
        "DESCRIBE users",
        "VACUUM",
    ] {
        let result = prepare_query(sql);
        assert!(result.is_err(), "{:?} should be rejected", sql);
        let err = result.unwrap_err();
        assert!(
            matches!(err, DbError::QueryRejected { .. }),
            "Should be QueryRejected, got: {:?}",
            err
        );
    }
}

/// Rejection happens regardless of leading whitespace or casing.
#[test]
fn test_select_detection_is_case_insensitive() {
    assert!(prepare_query("  select 1").is_ok());
    assert!(prepare_query("\tSELECT 1").is_ok());
    assert!(prepare_query("insert into t values (1)").is_err());
}

/// Each denylisted keyword is rejected and named in the error, even as a
/// substring inside literals or identifiers.
#[test]
fn test_forbidden_keywords_rejected_as_substrings() {
    let cases = [
        ("SELECT * FROM t WHERE note = 'DROP it'", "DROP"),
        ("SELECT deleted_at FROM t", "DELETE"),
        ("SELECT update_time FROM t", "UPDATE"),
        ("SELECT * FROM inserted_rows", "INSERT"),
        ("SELECT altered FROM t", "ALTER"),
        ("SELECT * FROM t WHERE op = 'TRUNCATE'", "TRUNCATE"),
        ("SELECT created_at FROM t", "CREATE"),
        ("SELECT * FROM grants_table", "GRANT"),
        ("SELECT revoked FROM t", "REVOKE"),
    ];

    for (sql, keyword) in cases {
        let err = prepare_query(sql).unwrap_err();
        assert!(
            err.to_string().contains(keyword),
            "{:?} should be rejected naming {}: {}",
            sql,
            keyword,
            err
        );
    }
}

/// A SELECT without LIMIT equals the input with trailing `;`/whitespace
/// stripped and ` LIMIT 100` appended.
#[test]
fn test_limit_appended_exactly() {
    assert_eq!(
        prepare_query("SELECT id FROM users").unwrap(),
        "SELECT id FROM users LIMIT 100"
    );
    assert_eq!(
        prepare_query("SELECT id FROM users;").unwrap(),
        "SELECT id FROM users LIMIT 100"
    );
    assert_eq!(
        prepare_query("SELECT id FROM users ;  \n").unwrap(),
        "SELECT id FROM users LIMIT 100"
    );
}

/// A SELECT already containing LIMIT runs unmodified, casing included.
#[test]
fn test_statement_with_limit_unmodified() {
    let sql = "SELECT id FROM users LIMIT 10;";
    assert_eq!(prepare_query(sql).unwrap(), sql);

    let sql = "select id from users limit 10 offset 5";
    assert_eq!(prepare_query(sql).unwrap(), sql);
}

/// The rewrite preserves the caller's original casing.
#[test]
fn test_rewrite_preserves_original_casing() {
    assert_eq!(
        prepare_query("select Id, Name from Customers").unwrap(),
        "select Id, Name from Customers LIMIT 100"
    );
}
