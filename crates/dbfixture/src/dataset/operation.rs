//! Dataset replay: apply one dataset file to the database.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::db::DatabaseHandle;
use crate::error::{FixtureError, Result};

use super::{read_dataset, DataSet, DatasetFormat, TableData};

/// The recognized operation vocabulary.
///
/// Parsing happens here, not at the configuration layer; an
/// unrecognized name fails the operation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    /// Insert every dataset row.
    Insert,
    /// Update rows matched by primary key.
    Update,
    /// Delete rows matched by primary key, tables in reverse order.
    Delete,
    /// Delete all rows of every dataset table, reverse order.
    DeleteAll,
    /// Update rows that exist, insert rows that don't.
    Refresh,
    /// DELETE_ALL followed by INSERT.
    CleanInsert,
    /// Truncate every dataset table, reverse order.
    TruncateTable,
    /// Parse the dataset but execute nothing.
    None,
}

impl FromStr for OperationType {
    type Err = FixtureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INSERT" => Ok(OperationType::Insert),
            "UPDATE" => Ok(OperationType::Update),
            "DELETE" => Ok(OperationType::Delete),
            "DELETE_ALL" => Ok(OperationType::DeleteAll),
            "REFRESH" => Ok(OperationType::Refresh),
            "CLEAN_INSERT" => Ok(OperationType::CleanInsert),
            "TRUNCATE_TABLE" => Ok(OperationType::TruncateTable),
            "NONE" => Ok(OperationType::None),
            _ => Err(FixtureError::UnknownOperation(s.to_string())),
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationType::Insert => "INSERT",
            OperationType::Update => "UPDATE",
            OperationType::Delete => "DELETE",
            OperationType::DeleteAll => "DELETE_ALL",
            OperationType::Refresh => "REFRESH",
            OperationType::CleanInsert => "CLEAN_INSERT",
            OperationType::TruncateTable => "TRUNCATE_TABLE",
            OperationType::None => "NONE",
        };
        f.write_str(name)
    }
}

/// One dataset source to replay.
#[derive(Debug, Clone)]
pub struct OperationRequest {
    /// Operation type name as configured; parsed here.
    pub op_type: String,
    /// Dataset file format.
    pub format: DatasetFormat,
    /// Dataset file (or directory, for csv).
    pub src: PathBuf,
    /// Apply this source inside one transaction.
    pub transaction: bool,
}

/// Apply one dataset source. Returns the number of affected rows.
///
/// With `transaction` set, the source commits as a unit and rolls back
/// on failure. Failures propagate; there is no per-row recovery.
pub async fn apply_operation(
    db: &mut dyn DatabaseHandle,
    request: &OperationRequest,
) -> Result<u64> {
    let op: OperationType = request.op_type.parse()?;
    let dataset = read_dataset(&request.src, request.format)?;

    debug!(
        "Applying {} from {} ({} tables)",
        op,
        request.src.display(),
        dataset.tables.len()
    );

    if op == OperationType::None {
        return Ok(0);
    }

    if request.transaction {
        db.begin().await?;
    }

    let result = apply(db, op, &dataset).await;

    if request.transaction {
        match &result {
            Ok(_) => db.commit().await?,
            Err(_) => {
                if let Err(e) = db.rollback().await {
                    warn!("Rollback failed: {}", e);
                }
            }
        }
    }

    result
}

async fn apply(db: &mut dyn DatabaseHandle, op: OperationType, dataset: &DataSet) -> Result<u64> {
    match op {
        OperationType::Insert => insert_all(db, dataset).await,
        OperationType::Update => update_all(db, dataset).await,
        OperationType::Delete => delete_keyed(db, dataset).await,
        OperationType::DeleteAll => delete_all(db, dataset).await,
        OperationType::Refresh => refresh_all(db, dataset).await,
        OperationType::CleanInsert => {
            let deleted = delete_all(db, dataset).await?;
            let inserted = insert_all(db, dataset).await?;
            Ok(deleted + inserted)
        }
        OperationType::TruncateTable => truncate_all(db, dataset).await,
        OperationType::None => Ok(0),
    }
}

async fn insert_all(db: &mut dyn DatabaseHandle, dataset: &DataSet) -> Result<u64> {
    let mut affected = 0;
    for table in &dataset.tables {
        for row in &table.rows {
            affected += db.execute(&insert_statement(table, row)).await?;
        }
    }
    Ok(affected)
}

async fn update_all(db: &mut dyn DatabaseHandle, dataset: &DataSet) -> Result<u64> {
    let mut affected = 0;
    for table in &dataset.tables {
        let key = key_columns(db, table).await?;
        for row in &table.rows {
            let statement = update_statement(table, row, &key)?;
            affected += db.execute(&statement).await?;
        }
    }
    Ok(affected)
}

async fn delete_keyed(db: &mut dyn DatabaseHandle, dataset: &DataSet) -> Result<u64> {
    let mut affected = 0;
    for table in dataset.tables.iter().rev() {
        let key = key_columns(db, table).await?;
        for row in &table.rows {
            let statement = format!(
                "DELETE FROM {} WHERE {};",
                table.name,
                key_predicate(row, &key)
            );
            affected += db.execute(&statement).await?;
        }
    }
    Ok(affected)
}

async fn delete_all(db: &mut dyn DatabaseHandle, dataset: &DataSet) -> Result<u64> {
    let mut affected = 0;
    for table in dataset.tables.iter().rev() {
        affected += db.execute(&format!("DELETE FROM {};", table.name)).await?;
    }
    Ok(affected)
}

async fn truncate_all(db: &mut dyn DatabaseHandle, dataset: &DataSet) -> Result<u64> {
    for table in dataset.tables.iter().rev() {
        db.execute(&format!("TRUNCATE {};", table.name)).await?;
    }
    Ok(0)
}

/// Update rows that exist, insert the ones that don't. Existence is
/// probed per row by primary key.
async fn refresh_all(db: &mut dyn DatabaseHandle, dataset: &DataSet) -> Result<u64> {
    let mut affected = 0;
    for table in &dataset.tables {
        let key = key_columns(db, table).await?;
        for row in &table.rows {
            let probe = format!(
                "SELECT {} FROM {} WHERE {};",
                key[0].0,
                table.name,
                key_predicate(row, &key)
            );
            let exists = !db.query(&probe).await?.rows.is_empty();

            if exists {
                affected += db.execute(&update_statement(table, row, &key)?).await?;
            } else {
                affected += db.execute(&insert_statement(table, row)).await?;
            }
        }
    }
    Ok(affected)
}

/// Primary key columns resolved to their dataset column indices.
async fn key_columns(
    db: &mut dyn DatabaseHandle,
    table: &TableData,
) -> Result<Vec<(String, usize)>> {
    let pk = db.primary_key(&table.name).await?;
    if pk.is_empty() {
        return Err(FixtureError::NoPrimaryKey(table.name.clone()));
    }

    pk.into_iter()
        .map(|column| {
            table
                .columns
                .iter()
                .position(|c| *c == column)
                .map(|index| (column.clone(), index))
                .ok_or_else(|| {
                    FixtureError::Dataset(format!(
                        "dataset for {} is missing key column {}",
                        table.name, column
                    ))
                })
        })
        .collect()
}

fn insert_statement(table: &TableData, row: &[Option<String>]) -> String {
    let values = row.iter().map(sql_literal).collect::<Vec<_>>().join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        table.name,
        table.columns.join(", "),
        values
    )
}

fn update_statement(
    table: &TableData,
    row: &[Option<String>],
    key: &[(String, usize)],
) -> Result<String> {
    let assignments = table
        .columns
        .iter()
        .enumerate()
        .filter(|(i, _)| !key.iter().any(|(_, k)| k == i))
        .map(|(i, column)| format!("{} = {}", column, sql_literal(&row[i])))
        .collect::<Vec<_>>();

    if assignments.is_empty() {
        return Err(FixtureError::Dataset(format!(
            "table {} has no non-key columns to update",
            table.name
        )));
    }

    Ok(format!(
        "UPDATE {} SET {} WHERE {};",
        table.name,
        assignments.join(", "),
        key_predicate(row, key)
    ))
}

fn key_predicate(row: &[Option<String>], key: &[(String, usize)]) -> String {
    key.iter()
        .map(|(column, index)| match &row[*index] {
            Some(_) => format!("{} = {}", column, sql_literal(&row[*index])),
            None => format!("{} IS NULL", column),
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Render a cell as a SQL literal; single quotes are doubled.
fn sql_literal(cell: &Option<String>) -> String {
    match cell {
        Some(value) => format!("'{}'", value.replace('\'', "''")),
        None => "NULL".to_string(),
    }
}
