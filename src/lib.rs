//! DB Analyst MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools for AI assistants
//! to inspect SQL databases (PostgreSQL, MySQL) read-only: browse schemas,
//! run bounded SELECT queries, and profile tables.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use db::SessionManager;
pub use error::DbError;
pub use mcp::DbService;
