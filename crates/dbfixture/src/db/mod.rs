//! Database connection provider.
//!
//! Everything above this module talks to the database through the
//! [`DatabaseHandle`] trait, which covers the three things the commands
//! need: metadata enumeration, text-protocol queries, and raw statement
//! execution. One connection is acquired per command run, held for the
//! whole run, and released when the handle drops.

mod postgres;

#[cfg(test)]
pub(crate) mod fake;

pub use postgres::PgHandle;

use async_trait::async_trait;

use crate::error::Result;

/// A text result set: column names plus rows of nullable string cells.
///
/// Dataset files are text snapshots, so every cell travels as the
/// database's text rendering of the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRows {
    /// Column names in SELECT order.
    pub columns: Vec<String>,
    /// One entry per row; `None` is SQL NULL.
    pub rows: Vec<Vec<Option<String>>>,
}

/// The database surface consumed by the export and operation commands.
#[async_trait]
pub trait DatabaseHandle: Send {
    /// Names of all base tables in the configured schema, in the
    /// driver's metadata scan order.
    async fn list_tables(&mut self) -> Result<Vec<String>>;

    /// Column names for a table, in metadata (ordinal) order.
    async fn list_columns(&mut self, table: &str) -> Result<Vec<String>>;

    /// Primary key column names for a table, in key order. Empty when
    /// the table has no primary key.
    async fn primary_key(&mut self, table: &str) -> Result<Vec<String>>;

    /// Foreign key edges in the configured schema as
    /// `(referencing table, referenced table)` pairs.
    async fn foreign_keys(&mut self) -> Result<Vec<(String, String)>>;

    /// `SELECT COUNT(*)` for a table. The identifier is interpolated
    /// unquoted; callers own table names that need no quoting.
    async fn count_rows(&mut self, table: &str) -> Result<i64>;

    /// Run a SELECT and collect the result set as text.
    async fn query(&mut self, sql: &str) -> Result<QueryRows>;

    /// Execute a mutating statement, returning the affected row count.
    async fn execute(&mut self, sql: &str) -> Result<u64>;

    /// Open an explicit transaction on this connection.
    async fn begin(&mut self) -> Result<()>;

    /// Commit the open transaction.
    async fn commit(&mut self) -> Result<()>;

    /// Roll back the open transaction.
    async fn rollback(&mut self) -> Result<()>;
}
