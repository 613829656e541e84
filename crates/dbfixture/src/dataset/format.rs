//! Dataset file format tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FixtureError;

/// Supported dataset serialization formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    /// Structured XML: explicit column list, one `value`/`null` element
    /// per cell.
    #[default]
    Xml,

    /// Flat XML: one element per row, columns as attributes, NULLs
    /// omitted.
    Flat,

    /// A directory of per-table CSV files plus `table-ordering.txt`.
    Csv,

    /// A DTD describing the flat-XML shape of the dataset. Export only.
    Dtd,
}

impl FromStr for DatasetFormat {
    type Err = FixtureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xml" => Ok(DatasetFormat::Xml),
            "flat" => Ok(DatasetFormat::Flat),
            "csv" => Ok(DatasetFormat::Csv),
            "dtd" => Ok(DatasetFormat::Dtd),
            other => Err(FixtureError::Config(format!(
                "unknown dataset format '{}' (expected xml, flat, csv or dtd)",
                other
            ))),
        }
    }
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            DatasetFormat::Xml => "xml",
            DatasetFormat::Flat => "flat",
            DatasetFormat::Csv => "csv",
            DatasetFormat::Dtd => "dtd",
        };
        f.write_str(tag)
    }
}
