//! # dbfixture
//!
//! Build-time test fixture management for relational databases.
//!
//! Two commands share one connection provider and a small data model:
//!
//! - **Export**: snapshot a database (or a configured subset of
//!   tables/queries) into a dataset file. Without explicit
//!   configuration, tables are discovered from metadata, filtered by
//!   regex exclusion rules and an optional empty-table check, and each
//!   surviving table is extracted with a synthesized `SELECT` listing
//!   its columns in alphabetical order.
//! - **Operation**: replay one or more dataset files against a
//!   database with a DML-style operation (INSERT, CLEAN_INSERT,
//!   REFRESH, ...), optionally inside a transaction per source,
//!   optionally after truncating every table.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dbfixture::{run_export, Config};
//!
//! #[tokio::main]
//! async fn main() -> dbfixture::Result<()> {
//!     let config = Config::load("dbfixture.yaml")?;
//!     let export = config.export.expect("export section");
//!     let summary = run_export(&config.connection, &export).await?;
//!     println!("Exported {} tables", summary.tables_exported);
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod core;
pub mod dataset;
pub mod db;
pub mod error;

// Re-exports for convenient access
pub use command::{run_export, run_operation, ExportSummary, OperationSummary};
pub use config::{Config, ConnectionConfig, ExportConfig, ExportMode, OperationConfig};
pub use core::{discover_tables, ExcludeFilter, ExportTable, QuerySpec, TableSpec};
pub use dataset::{DataSet, DatasetFormat, OperationType, TableData};
pub use db::{DatabaseHandle, PgHandle, QueryRows};
pub use error::{FixtureError, Result};
