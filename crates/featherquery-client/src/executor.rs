//! SQL executor boundary
//!
//! The SDK only produces SQL strings; running them is the job of an
//! external engine (Hive, JDBC, anything that accepts qualified
//! `alias.column` identifiers in SELECT/JOIN/ON clauses). Implementations
//! of this trait bridge to that engine; the SDK ships none beyond test
//! doubles.

use async_trait::async_trait;

use featherquery_core::{QueryResult, Result};

/// Executes a SQL string against a target database/schema and returns the
/// tabular result
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Runs `sql` against `database` (the feature store's database name).
    ///
    /// Column names may come back qualified (`alias.column`); the client
    /// strips qualifiers before results reach the caller.
    async fn execute(&self, sql: &str, database: &str) -> Result<QueryResult>;
}
