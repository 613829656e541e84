//! Flat XML dataset format.
//!
//! One element per row, named after the table, with columns as
//! attributes. NULL cells are omitted. An element without attributes
//! declares a table with no rows:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <dataset>
//!   <USERS id="1" name="ada"/>
//!   <USERS id="2"/>
//!   <SESSIONS/>
//! </dataset>
//! ```
//!
//! When reading, a table's column set is the union of attributes seen
//! across its rows, in first-seen order; attributes absent from a row
//! read back as NULL.

use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::Result;

use super::{DataSet, TableData, WriteOptions};

pub fn write(dataset: &DataSet, dest: &Path, options: &WriteOptions<'_>) -> Result<()> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new(
        "1.0",
        Some(options.encoding),
        None,
    )))?;
    if let Some(doctype) = options.doctype {
        writer.write_event(Event::DocType(BytesText::from_escaped(format!(
            r#"dataset SYSTEM "{}""#,
            doctype
        ))))?;
    }

    writer.write_event(Event::Start(BytesStart::new("dataset")))?;
    for table in &dataset.tables {
        if table.rows.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new(table.name.as_str())))?;
            continue;
        }

        for row in &table.rows {
            let mut element = BytesStart::new(table.name.as_str());
            for (column, cell) in table.columns.iter().zip(row) {
                if let Some(value) = cell {
                    element.push_attribute((column.as_str(), value.as_str()));
                }
            }
            writer.write_event(Event::Empty(element))?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new("dataset")))?;

    std::fs::write(dest, writer.into_inner())?;
    Ok(())
}

pub fn read(src: &Path) -> Result<DataSet> {
    let content = std::fs::read_to_string(src)?;
    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    // Rows are kept as (column, value) pairs until the full column
    // union per table is known.
    let mut dataset = DataSet::default();
    let mut pending: Vec<Vec<Vec<(String, String)>>> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == "dataset" {
                    continue;
                }

                let index = match dataset.tables.iter().position(|t| t.name == name) {
                    Some(i) => i,
                    None => {
                        dataset.tables.push(TableData {
                            name,
                            ..TableData::default()
                        });
                        pending.push(Vec::new());
                        dataset.tables.len() - 1
                    }
                };

                let mut cells = Vec::new();
                for attr in e.attributes() {
                    let attr = attr.map_err(quick_xml::Error::from)?;
                    let column = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let value = attr.unescape_value()?.into_owned();
                    let table = &mut dataset.tables[index];
                    if !table.columns.contains(&column) {
                        table.columns.push(column.clone());
                    }
                    cells.push((column, value));
                }

                // A bare element only declares the table.
                if !cells.is_empty() {
                    pending[index].push(cells);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(e.into()),
        }
    }

    for (table, rows) in dataset.tables.iter_mut().zip(pending) {
        for cells in rows {
            let row = table
                .columns
                .iter()
                .map(|column| {
                    cells
                        .iter()
                        .find(|(c, _)| c == column)
                        .map(|(_, v)| v.clone())
                })
                .collect();
            table.rows.push(row);
        }
    }

    Ok(dataset)
}
