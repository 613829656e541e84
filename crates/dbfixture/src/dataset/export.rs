//! Dataset export: run extraction queries and write the artifact.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::core::{QuerySpec, TableSpec};
use crate::db::DatabaseHandle;
use crate::error::Result;

use super::{write_dataset, DataSet, DatasetFormat, TableData, WriteOptions};

/// Everything the export collaborator needs: destination, format
/// options, and the ordered list of query and table specs to extract.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub dest: PathBuf,
    pub format: DatasetFormat,
    pub doctype: Option<String>,
    pub encoding: String,
    pub ordered: bool,
    pub queries: Vec<QuerySpec>,
    pub tables: Vec<TableSpec>,
}

/// Execute every spec in the request and write the dataset file.
/// Returns the number of exported tables.
pub async fn export_dataset(
    db: &mut dyn DatabaseHandle,
    request: &ExportRequest,
) -> Result<usize> {
    let mut dataset = DataSet::default();

    for query in &request.queries {
        debug!("{} : {}", query.name, query.sql);
        let result = db.query(&query.sql).await?;
        dataset.tables.push(TableData {
            name: query.name.clone(),
            columns: result.columns,
            rows: result.rows,
        });
    }

    for table in &request.tables {
        let sql = format!("SELECT * FROM {};", table.name);
        debug!("{} : {}", table.name, sql);
        let result = db.query(&sql).await?;
        dataset.tables.push(TableData {
            name: table.name.clone(),
            columns: result.columns,
            rows: result.rows,
        });
    }

    if request.ordered {
        let fks = db.foreign_keys().await?;
        order_by_dependencies(&mut dataset.tables, &fks);
    }

    write_dataset(
        &dataset,
        &request.dest,
        request.format,
        &WriteOptions {
            doctype: request.doctype.as_deref(),
            encoding: &request.encoding,
        },
    )?;

    info!(
        "Exported {} tables to {}",
        dataset.tables.len(),
        request.dest.display()
    );
    Ok(dataset.tables.len())
}

/// Reorder tables so referenced (parent) tables come before their
/// referencing (child) tables, stable with respect to the incoming
/// order. Self-references are ignored; on a reference cycle the
/// remaining tables keep their incoming order.
fn order_by_dependencies(tables: &mut Vec<TableData>, fks: &[(String, String)]) {
    let exported: HashSet<String> = tables.iter().map(|t| t.name.clone()).collect();

    let mut remaining: Vec<TableData> = std::mem::take(tables);
    let mut placed: HashSet<String> = HashSet::new();

    while !remaining.is_empty() {
        let next = remaining.iter().position(|table| {
            fks.iter().all(|(child, parent)| {
                child != &table.name
                    || parent == &table.name
                    || !exported.contains(parent.as_str())
                    || placed.contains(parent)
            })
        });

        match next {
            Some(index) => {
                let table = remaining.remove(index);
                placed.insert(table.name.clone());
                tables.push(table);
            }
            None => {
                warn!(
                    "Foreign-key cycle among {:?}; keeping export order for the remainder",
                    remaining.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()
                );
                tables.append(&mut remaining);
            }
        }
    }
}
