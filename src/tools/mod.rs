//! MCP tool implementations.
//!
//! This module contains all database tool handlers:
//! - `query`: Execute validated, bounded SELECT queries
//! - `schema`: List tables and describe table columns
//! - `profile`: Aggregate per-column statistics for a table

pub mod profile;
pub mod query;
pub mod schema;

pub use profile::{ProfileTableInput, ProfileToolHandler};
pub use query::{QueryToolHandler, RunQueryInput, RunQueryOutput, prepare_query};
pub use schema::{
    DescribeTableInput, DescribeTableOutput, ListTablesInput, ListTablesOutput, SchemaToolHandler,
};
