//! Configuration type definitions.
//!
//! All settings are plain immutable data deserialized once from YAML;
//! the commands take references and never mutate them.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::{QuerySpec, TableSpec};
use crate::dataset::DatasetFormat;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection settings.
    pub connection: ConnectionConfig,

    /// Export command settings, when the config drives an export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportConfig>,

    /// Operation command settings, when the config drives an operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationConfig>,
}

/// Database connection configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 5432).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,

    /// Schema to enumerate tables from (default: "public").
    #[serde(default = "default_schema")]
    pub schema: String,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("schema", &self.schema)
            .finish()
    }
}

/// Export command configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Destination of the exported dataset file (a directory for the
    /// csv format).
    #[serde(default = "default_dest")]
    pub dest: PathBuf,

    /// Dataset file format (default: xml).
    #[serde(default)]
    pub format: DatasetFormat,

    /// DOCTYPE system identifier written into XML datasets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctype: Option<String>,

    /// Encoding declared in the XML prolog (default: UTF-8).
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Order exported tables by foreign-key constraints, parents first.
    #[serde(default)]
    pub ordered: bool,

    /// Explicit tables to export. Setting this (or `queries`) disables
    /// discovery entirely.
    #[serde(default)]
    pub tables: Vec<TableSpec>,

    /// Explicit queries to export. Setting this (or `tables`) disables
    /// discovery entirely.
    #[serde(default)]
    pub queries: Vec<QuerySpec>,

    /// Table-name exclusion patterns for discovery (regex, full match).
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Drop tables with zero rows from discovery.
    #[serde(default)]
    pub exclude_empty_tables: bool,

    /// Skip the command entirely.
    #[serde(default)]
    pub skip: bool,
}

/// How the export command determines what to extract.
///
/// Explicit configuration always wins; discovery is the fallback, not a
/// sibling. The variant is derived up front so the precedence rule is
/// visible instead of being an emptiness check buried in the command.
#[derive(Debug, PartialEq, Eq)]
pub enum ExportMode<'a> {
    /// No explicit tables or queries: discover from metadata.
    Discover {
        excludes: &'a [String],
        exclude_empty_tables: bool,
    },
    /// Explicit tables and/or queries pass through verbatim; exclusion
    /// settings are ignored.
    Explicit {
        tables: &'a [TableSpec],
        queries: &'a [QuerySpec],
    },
}

impl ExportConfig {
    /// Resolve which branch this configuration selects.
    pub fn mode(&self) -> ExportMode<'_> {
        if self.tables.is_empty() && self.queries.is_empty() {
            ExportMode::Discover {
                excludes: &self.excludes,
                exclude_empty_tables: self.exclude_empty_tables,
            }
        } else {
            ExportMode::Explicit {
                tables: &self.tables,
                queries: &self.queries,
            }
        }
    }
}

/// Operation command configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationConfig {
    /// Operation type to perform: INSERT, UPDATE, DELETE, DELETE_ALL,
    /// REFRESH, CLEAN_INSERT, TRUNCATE_TABLE or NONE. The vocabulary is
    /// validated by the operation executor, not here.
    pub r#type: String,

    /// Apply each dataset source inside one transaction.
    #[serde(default)]
    pub transaction: bool,

    /// Single dataset source file. Deprecated: use `sources`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<PathBuf>,

    /// Dataset source files, applied in order after `src`.
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// Dataset file format (default: xml).
    #[serde(default)]
    pub format: DatasetFormat,

    /// Truncate every table in the schema before applying sources.
    #[serde(default)]
    pub clear_all_tables: bool,

    /// Skip the command entirely.
    #[serde(default)]
    pub skip: bool,
}

impl OperationConfig {
    /// The ordered source list: the deprecated single source first,
    /// then the configured list in order.
    pub fn concatenated_sources(&self) -> Vec<PathBuf> {
        self.src
            .iter()
            .cloned()
            .chain(self.sources.iter().cloned())
            .collect()
    }
}

fn default_port() -> u16 {
    5432
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_dest() -> PathBuf {
    PathBuf::from("target/dbfixture/export.xml")
}

fn default_encoding() -> String {
    "UTF-8".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_export() -> ExportConfig {
        ExportConfig {
            dest: PathBuf::from("out.xml"),
            format: DatasetFormat::Xml,
            doctype: None,
            encoding: "UTF-8".to_string(),
            ordered: false,
            tables: vec![],
            queries: vec![],
            excludes: vec![],
            exclude_empty_tables: false,
            skip: false,
        }
    }

    #[test]
    fn test_mode_discover_when_nothing_explicit() {
        let config = base_export();
        assert!(matches!(config.mode(), ExportMode::Discover { .. }));
    }

    #[test]
    fn test_mode_explicit_wins_over_exclusion_settings() {
        let mut config = base_export();
        config.tables = vec![TableSpec {
            name: "T1".to_string(),
        }];
        config.excludes = vec![".*".to_string()];
        config.exclude_empty_tables = true;

        match config.mode() {
            ExportMode::Explicit { tables, queries } => {
                assert_eq!(tables.len(), 1);
                assert!(queries.is_empty());
            }
            ExportMode::Discover { .. } => panic!("explicit tables must disable discovery"),
        }
    }

    #[test]
    fn test_mode_explicit_for_queries_only() {
        let mut config = base_export();
        config.queries = vec![QuerySpec {
            name: "Q".to_string(),
            sql: "SELECT 1".to_string(),
        }];
        assert!(matches!(config.mode(), ExportMode::Explicit { .. }));
    }

    #[test]
    fn test_source_concatenation_order() {
        let operation = OperationConfig {
            r#type: "INSERT".to_string(),
            transaction: false,
            src: Some(PathBuf::from("legacy.xml")),
            sources: vec![PathBuf::from("a.xml"), PathBuf::from("b.xml")],
            format: DatasetFormat::Xml,
            clear_all_tables: false,
            skip: false,
        };

        let sources = operation.concatenated_sources();
        assert_eq!(
            sources,
            vec![
                PathBuf::from("legacy.xml"),
                PathBuf::from("a.xml"),
                PathBuf::from("b.xml"),
            ]
        );
    }

    #[test]
    fn test_source_concatenation_without_legacy() {
        let operation = OperationConfig {
            r#type: "INSERT".to_string(),
            transaction: false,
            src: None,
            sources: vec![PathBuf::from("a.xml"), PathBuf::from("b.xml")],
            format: DatasetFormat::Xml,
            clear_all_tables: false,
            skip: false,
        };

        assert_eq!(
            operation.concatenated_sources(),
            vec![PathBuf::from("a.xml"), PathBuf::from("b.xml")]
        );
    }

    #[test]
    fn test_connection_debug_redacts_password() {
        let connection = ConnectionConfig {
            host: "localhost".to_string(),
            port: 5432,
            database: "fixtures".to_string(),
            user: "ci".to_string(),
            password: "super_secret_password_123".to_string(),
            schema: "public".to_string(),
        };

        let output = format!("{:?}", connection);
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("super_secret_password_123"));
    }
}
