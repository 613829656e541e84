//! CSV dataset format: a directory of per-table files.
//!
//! The directory holds one `<table>.csv` per table (header row plus
//! data rows) and a `table-ordering.txt` naming the tables in dataset
//! order. Empty cells read back as NULL; the format cannot distinguish
//! NULL from the empty string.

use std::path::Path;

use crate::error::{FixtureError, Result};

use super::{DataSet, TableData};

const ORDERING_FILE: &str = "table-ordering.txt";

pub fn write(dataset: &DataSet, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)?;

    let ordering = dataset
        .tables
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    std::fs::write(dest.join(ORDERING_FILE), ordering + "\n")?;

    for table in &dataset.tables {
        let mut writer = ::csv::Writer::from_path(dest.join(format!("{}.csv", table.name)))?;
        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        writer.flush()?;
    }

    Ok(())
}

pub fn read(src: &Path) -> Result<DataSet> {
    let ordering_path = src.join(ORDERING_FILE);
    let ordering = std::fs::read_to_string(&ordering_path).map_err(|e| {
        FixtureError::Dataset(format!(
            "missing {} in csv dataset {}: {}",
            ORDERING_FILE,
            src.display(),
            e
        ))
    })?;

    let mut dataset = DataSet::default();
    for name in ordering.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mut reader = ::csv::Reader::from_path(src.join(format!("{}.csv", name)))?;
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|cell| {
                        if cell.is_empty() {
                            None
                        } else {
                            Some(cell.to_string())
                        }
                    })
                    .collect(),
            );
        }

        dataset.tables.push(TableData {
            name: name.to_string(),
            columns,
            rows,
        });
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_directory_layout() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("dataset");

        let dataset = DataSet {
            tables: vec![
                TableData {
                    name: "USERS".to_string(),
                    columns: vec!["id".to_string(), "name".to_string()],
                    rows: vec![vec![Some("1".to_string()), None]],
                },
                TableData {
                    name: "ORDERS".to_string(),
                    columns: vec!["id".to_string()],
                    rows: vec![],
                },
            ],
        };
        write(&dataset, &dest).unwrap();

        assert!(dest.join("USERS.csv").exists());
        assert!(dest.join("ORDERS.csv").exists());
        let ordering = std::fs::read_to_string(dest.join(ORDERING_FILE)).unwrap();
        assert_eq!(ordering, "USERS\nORDERS\n");
    }

    #[test]
    fn test_read_preserves_table_order_and_nulls() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("dataset");

        let dataset = DataSet {
            tables: vec![
                TableData {
                    name: "B".to_string(),
                    columns: vec!["x".to_string()],
                    rows: vec![vec![None]],
                },
                TableData {
                    name: "A".to_string(),
                    columns: vec!["y".to_string()],
                    rows: vec![vec![Some("1".to_string())]],
                },
            ],
        };
        write(&dataset, &dest).unwrap();

        let read_back = read(&dest).unwrap();
        assert_eq!(read_back, dataset);
    }

    #[test]
    fn test_missing_ordering_file_rejected() {
        let dir = tempdir().unwrap();
        assert!(read(dir.path()).is_err());
    }
}
