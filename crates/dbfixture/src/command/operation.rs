//! Operation command orchestration.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ConnectionConfig, OperationConfig};
use crate::dataset::{apply_operation, OperationRequest};
use crate::db::{DatabaseHandle, PgHandle};
use crate::error::{FixtureError, Result};

/// Result of an operation run.
#[derive(Debug, Clone, Serialize)]
pub struct OperationSummary {
    /// True when the skip flag short-circuited the command.
    pub skipped: bool,

    /// Operation type as configured.
    pub op_type: String,

    /// Number of dataset sources applied.
    pub sources_applied: usize,

    /// Total rows affected across all sources.
    pub rows_affected: u64,

    /// When the operation started.
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,
}

/// Run the operation command against a live database.
///
/// With `skip` set there is no database contact at all. Every failure
/// surfaces as one fatal operation error naming the configured type and
/// carrying the cause. The connection is released on every exit path.
pub async fn run_operation(
    connection: &ConnectionConfig,
    config: &OperationConfig,
) -> Result<OperationSummary> {
    let started_at = Utc::now();

    if config.skip {
        info!("Skip operation: {} execution", config.r#type);
        return Ok(OperationSummary {
            skipped: true,
            op_type: config.r#type.clone(),
            sources_applied: 0,
            rows_affected: 0,
            started_at,
            duration_seconds: 0.0,
        });
    }

    let timer = Instant::now();
    let outcome = async {
        let mut db = PgHandle::connect(connection).await?;
        execute_operation(&mut db, config).await
    }
    .await;

    match outcome {
        Ok((sources_applied, rows_affected)) => Ok(OperationSummary {
            skipped: false,
            op_type: config.r#type.clone(),
            sources_applied,
            rows_affected,
            started_at,
            duration_seconds: timer.elapsed().as_secs_f64(),
        }),
        Err(e) => Err(FixtureError::operation(config.r#type.clone(), e)),
    }
}

/// Apply the operation against an already-open handle. Returns the
/// number of sources applied and the total affected row count.
///
/// When `clear_all_tables` is set, every table in the schema is
/// truncated first, in metadata scan order, with no exclusion
/// filtering and no transaction around the batch: a failure midway
/// leaves earlier truncations in place. Sources then apply in order;
/// the first failure aborts the rest.
pub async fn execute_operation(
    db: &mut dyn DatabaseHandle,
    config: &OperationConfig,
) -> Result<(usize, u64)> {
    if config.clear_all_tables {
        for name in db.list_tables().await? {
            debug!("Truncating {}", name);
            db.execute(&format!("TRUNCATE {};", name)).await?;
        }
    }

    let sources = config.concatenated_sources();
    let mut rows_affected = 0;
    for src in &sources {
        let request = OperationRequest {
            op_type: config.r#type.clone(),
            format: config.format,
            src: src.clone(),
            transaction: config.transaction,
        };
        rows_affected += apply_operation(db, &request).await?;
    }

    Ok((sources.len(), rows_affected))
}
