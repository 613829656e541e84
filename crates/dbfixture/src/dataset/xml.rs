//! Structured XML dataset format.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <dataset>
//!   <table name="USERS">
//!     <column>id</column>
//!     <column>name</column>
//!     <row>
//!       <value>1</value>
//!       <null/>
//!     </row>
//!   </table>
//! </dataset>
//! ```

use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{FixtureError, Result};

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
        let mut start = BytesStart::new("table");
        start.push_attribute(("name", table.name.as_str()));
        writer.write_event(Event::Start(start))?;

        for column in &table.columns {
            writer.write_event(Event::Start(BytesStart::new("column")))?;
            writer.write_event(Event::Text(BytesText::new(column)))?;
            writer.write_event(Event::End(BytesEnd::new("column")))?;
        }

        for row in &table.rows {
            writer.write_event(Event::Start(BytesStart::new("row")))?;
            for cell in row {
                match cell {
                    Some(value) => {
                        writer.write_event(Event::Start(BytesStart::new("value")))?;
                        writer.write_event(Event::Text(BytesText::new(value)))?;
                        writer.write_event(Event::End(BytesEnd::new("value")))?;
                    }
                    None => {
                        writer.write_event(Event::Empty(BytesStart::new("null")))?;
                    }
                }
            }
            writer.write_event(Event::End(BytesEnd::new("row")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("table")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("dataset")))?;

    std::fs::write(dest, writer.into_inner())?;
    Ok(())
}

pub fn read(src: &Path) -> Result<DataSet> {
    let content = std::fs::read_to_string(src)?;
    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    let mut dataset = DataSet::default();
    let mut table: Option<TableData> = None;
    let mut row: Option<Vec<Option<String>>> = None;
    // True while inside a <column> or <value> element.
    let mut capturing = false;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"dataset" => {}
                b"table" => {
                    let mut name = String::new();
                    for attr in e.attributes() {
                        let attr = attr.map_err(quick_xml::Error::from)?;
                        if attr.key.as_ref() == b"name" {
                            name = attr.unescape_value()?.into_owned();
                        }
                    }
                    if name.is_empty() {
                        return Err(FixtureError::Dataset(
                            "table element without a name attribute".into(),
                        ));
                    }
                    table = Some(TableData {
                        name,
                        ..TableData::default()
                    });
                }
                b"column" | b"value" => {
                    capturing = true;
                    text.clear();
                }
                b"row" => row = Some(Vec::new()),
                other => {
                    return Err(FixtureError::Dataset(format!(
                        "unexpected element <{}> in xml dataset",
                        String::from_utf8_lossy(other)
                    )));
                }
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"null" => {
                    if let Some(row) = row.as_mut() {
                        row.push(None);
                    }
                }
                b"value" => {
                    if let Some(row) = row.as_mut() {
                        row.push(Some(String::new()));
                    }
                }
                other => {
                    return Err(FixtureError::Dataset(format!(
                        "unexpected element <{}/> in xml dataset",
                        String::from_utf8_lossy(other)
                    )));
                }
            },
            Ok(Event::Text(ref t)) => {
                if capturing {
                    text.push_str(&t.unescape()?);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"column" => {
                    if let Some(table) = table.as_mut() {
                        table.columns.push(std::mem::take(&mut text));
                    }
                    capturing = false;
                }
                b"value" => {
                    if let Some(row) = row.as_mut() {
                        row.push(Some(std::mem::take(&mut text)));
                    }
                    capturing = false;
                }
                b"row" => {
                    if let (Some(table), Some(cells)) = (table.as_mut(), row.take()) {
                        table.rows.push(cells);
                    }
                }
                b"table" => {
                    if let Some(done) = table.take() {
                        dataset.tables.push(done);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> DataSet {
        DataSet {
            tables: vec![TableData {
                name: "USERS".to_string(),
                columns: vec!["id".to_string(), "name".to_string()],
                rows: vec![
                    vec![Some("1".to_string()), Some("ada".to_string())],
                    vec![Some("2".to_string()), None],
                ],
            }],
        }
    }

    fn utf8_options() -> WriteOptions<'static> {
        WriteOptions {
            doctype: None,
            encoding: "UTF-8",
        }
    }

    #[test]
    fn test_write_then_read_preserves_nulls() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xml");

        write(&sample(), &path, &utf8_options()).unwrap();
        let read_back = read(&path).unwrap();
        assert_eq!(read_back, sample());
    }

    #[test]
    fn test_doctype_and_encoding_in_prolog() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xml");

        let options = WriteOptions {
            doctype: Some("dataset.dtd"),
            encoding: "UTF-8",
        };
        write(&sample(), &path, &options).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(content.contains(r#"<!DOCTYPE dataset SYSTEM "dataset.dtd">"#));
    }

    #[test]
    fn test_special_characters_escaped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xml");

        let dataset = DataSet {
            tables: vec![TableData {
                name: "NOTES".to_string(),
                columns: vec!["body".to_string()],
                rows: vec![vec![Some("a < b & c".to_string())]],
            }],
        };
        write(&dataset, &path, &utf8_options()).unwrap();

        let read_back = read(&path).unwrap();
        assert_eq!(read_back, dataset);
    }

    #[test]
    fn test_table_without_name_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.xml");
        std::fs::write(&path, "<dataset><table><column>c</column></table></dataset>").unwrap();
        assert!(read(&path).is_err());
    }
}
