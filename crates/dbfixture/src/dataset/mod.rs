//! Dataset model, file formats, export assembly and replay.
//!
//! A dataset is a text snapshot of table rows. Cells are strings as the
//! database rendered them; `None` is SQL NULL. The format modules
//! serialize the same in-memory model to and from the supported file
//! shapes.

mod csv;
mod dtd;
mod export;
mod flat;
mod format;
mod operation;
mod xml;

pub use export::{export_dataset, ExportRequest};
pub use format::DatasetFormat;
pub use operation::{apply_operation, OperationRequest, OperationType};

use std::path::Path;

use crate::error::{FixtureError, Result};

/// An in-memory dataset: tables in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSet {
    /// Tables in the order they appear in the dataset file.
    pub tables: Vec<TableData>,
}

impl DataSet {
    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&TableData> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// One table's snapshot: column names and rows of nullable text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableData {
    /// Table name.
    pub name: String,

    /// Column names in dataset order.
    pub columns: Vec<String>,

    /// Rows; each cell aligns with `columns`, `None` is NULL.
    pub rows: Vec<Vec<Option<String>>>,
}

/// Options applied when writing a dataset file.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions<'a> {
    /// DOCTYPE system identifier for XML formats.
    pub doctype: Option<&'a str>,
    /// Encoding declared in the XML prolog.
    pub encoding: &'a str,
}

/// Write a dataset to `dest` in the given format.
pub fn write_dataset(
    dataset: &DataSet,
    dest: &Path,
    format: DatasetFormat,
    options: &WriteOptions<'_>,
) -> Result<()> {
    match format {
        DatasetFormat::Xml => xml::write(dataset, dest, options),
        DatasetFormat::Flat => flat::write(dataset, dest, options),
        DatasetFormat::Csv => csv::write(dataset, dest),
        DatasetFormat::Dtd => dtd::write(dataset, dest),
    }
}

/// Read a dataset file in the given format.
pub fn read_dataset(src: &Path, format: DatasetFormat) -> Result<DataSet> {
    match format {
        DatasetFormat::Xml => xml::read(src),
        DatasetFormat::Flat => flat::read(src),
        DatasetFormat::Csv => csv::read(src),
        DatasetFormat::Dtd => Err(FixtureError::Dataset(
            "dtd datasets describe structure only and cannot be applied".into(),
        )),
    }
}
