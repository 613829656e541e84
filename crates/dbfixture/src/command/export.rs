//! Export command orchestration.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::{ConnectionConfig, ExportConfig, ExportMode};
use crate::core::discover_tables;
use crate::dataset::{export_dataset, ExportRequest};
use crate::db::{DatabaseHandle, PgHandle};
use crate::error::{FixtureError, Result};

/// Result of an export run.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    /// True when the skip flag short-circuited the command.
    pub skipped: bool,

    /// Number of tables written to the dataset.
    pub tables_exported: usize,

    /// Destination the dataset was written to.
    pub dest: PathBuf,

    /// When the export started.
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,
}

/// Run the export command against a live database.
///
/// With `skip` set, nothing happens: no directories are created and no
/// connection is opened. Every other failure, from directory creation
/// to the final write, surfaces as one fatal export error carrying the
/// cause. The connection is released on every exit path.
pub async fn run_export(
    connection: &ConnectionConfig,
    config: &ExportConfig,
) -> Result<ExportSummary> {
    let started_at = Utc::now();

    if config.skip {
        info!("Skip export execution");
        return Ok(ExportSummary {
            skipped: true,
            tables_exported: 0,
            dest: config.dest.clone(),
            started_at,
            duration_seconds: 0.0,
        });
    }

    let timer = Instant::now();
    let outcome = async {
        if let Some(parent) = config.dest.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut db = PgHandle::connect(connection).await?;
        execute_export(&mut db, config).await
    }
    .await;

    match outcome {
        Ok(tables_exported) => Ok(ExportSummary {
            skipped: false,
            tables_exported,
            dest: config.dest.clone(),
            started_at,
            duration_seconds: timer.elapsed().as_secs_f64(),
        }),
        Err(e) => Err(FixtureError::export(e)),
    }
}

/// Export against an already-open handle. Returns the number of
/// exported tables.
///
/// Explicit tables/queries pass through verbatim; otherwise discovery
/// and synthesis produce the query list.
pub async fn execute_export(db: &mut dyn DatabaseHandle, config: &ExportConfig) -> Result<usize> {
    let (queries, tables) = match config.mode() {
        ExportMode::Discover {
            excludes,
            exclude_empty_tables,
        } => {
            let discovered = discover_tables(db, excludes, exclude_empty_tables).await?;
            let queries = discovered
                .iter()
                .map(|table| table.extract_query())
                .collect::<Result<Vec<_>>>()?;
            (queries, Vec::new())
        }
        ExportMode::Explicit { tables, queries } => (queries.to_vec(), tables.to_vec()),
    };

    let request = ExportRequest {
        dest: config.dest.clone(),
        format: config.format,
        doctype: config.doctype.clone(),
        encoding: config.encoding.clone(),
        ordered: config.ordered,
        queries,
        tables,
    };

    export_dataset(db, &request).await
}
