//! Table representation with alphabetically ordered columns and
//! extraction-query synthesis.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FixtureError, Result};

/// A table selected for export, carrying its column names.
///
/// Columns iterate in lexicographic order no matter the order they were
/// added in; duplicates collapse. Insertion order is metadata scan order,
/// which is database-dependent, so the container re-sorts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    name: String,
    columns: BTreeSet<String>,
}

impl ExportTable {
    /// Create a table with no columns yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: BTreeSet::new(),
        }
    }

    /// Table name as discovered from metadata.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a column by name. Adding the same name twice is a no-op.
    pub fn add_column(&mut self, column: impl Into<String>) {
        self.columns.insert(column.into());
    }

    /// Column names in ascending order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// True when no column metadata was found for this table.
    pub fn has_no_columns(&self) -> bool {
        self.columns.is_empty()
    }

    /// Synthesize the extraction query for this table.
    ///
    /// The column clause lists every column in strictly alphabetical
    /// order, comma-space separated, and the statement ends with `;`.
    /// A table without columns cannot produce a well-formed statement.
    pub fn extract_query(&self) -> Result<QuerySpec> {
        if self.columns.is_empty() {
            return Err(FixtureError::Metadata(format!(
                "table {} has no columns to extract",
                self.name
            )));
        }

        let joined = self
            .columns
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        Ok(QuerySpec {
            name: self.name.clone(),
            sql: format!("SELECT {} FROM {};", joined, self.name),
        })
    }
}

impl fmt::Display for ExportTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .columns
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}[{}]", self.name, joined)
    }
}

/// A named extraction query, either synthesized from discovery or
/// configured explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Dataset table name the result set is stored under.
    pub name: String,

    /// The SELECT statement to run.
    pub sql: String,
}

/// An explicitly configured table to export in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Table name, exported as `SELECT * FROM <name>`.
    pub name: String,
}
