//! DTD export: a document type definition describing the flat-XML
//! shape of the exported tables. Export only; there is nothing to
//! apply from a DTD.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::Result;

use super::DataSet;

pub fn write(dataset: &DataSet, dest: &Path) -> Result<()> {
    let mut out = String::new();

    let children = dataset
        .tables
        .iter()
        .map(|t| format!("{}*", t.name))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "<!ELEMENT dataset ({})>", children);

    for table in &dataset.tables {
        let _ = writeln!(out);
        let _ = writeln!(out, "<!ELEMENT {} EMPTY>", table.name);
        let _ = writeln!(out, "<!ATTLIST {}", table.name);
        for column in &table.columns {
            let _ = writeln!(out, "    {} CDATA #IMPLIED", column);
        }
        let _ = writeln!(out, ">");
    }

    std::fs::write(dest, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::TableData;
    use tempfile::tempdir;

    #[test]
    fn test_dtd_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dataset.dtd");

        let dataset = DataSet {
            tables: vec![TableData {
                name: "USERS".to_string(),
                columns: vec!["id".to_string(), "name".to_string()],
                rows: vec![],
            }],
        };
        write(&dataset, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<!ELEMENT dataset (USERS*)>"));
        assert!(content.contains("<!ELEMENT USERS EMPTY>"));
        assert!(content.contains("id CDATA #IMPLIED"));
        assert!(content.contains("name CDATA #IMPLIED"));
    }
}
