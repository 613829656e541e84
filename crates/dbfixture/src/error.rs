//! Error types for fixture export and replay.

use thiserror::Error;

/// Main error type for fixture operations.
#[derive(Error, Debug)]
pub enum FixtureError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// Metadata query returned something the caller could not use
    #[error("Metadata query failed: {0}")]
    Metadata(String),

    /// Invalid table exclusion pattern
    #[error("Invalid exclude pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// A dataset file could not be read or written
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Operation type not part of the recognized vocabulary
    #[error("Unsupported operation type: {0}")]
    UnknownOperation(String),

    /// Table has no primary key (required for UPDATE/DELETE/REFRESH)
    #[error("Table {0} has no primary key - keyed operations require primary keys")]
    NoPrimaryKey(String),

    /// The export command failed as a whole
    #[error("Error executing export")]
    Export {
        #[source]
        source: Box<FixtureError>,
    },

    /// The operation command failed as a whole
    #[error("Error executing database operation: {op_type}")]
    Operation {
        op_type: String,
        #[source]
        source: Box<FixtureError>,
    },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML read/write error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FixtureError {
    /// Wrap a failure of the export command, preserving the cause.
    pub fn export(source: FixtureError) -> Self {
        FixtureError::Export {
            source: Box::new(source),
        }
    }

    /// Wrap a failure of the operation command, preserving the cause.
    pub fn operation(op_type: impl Into<String>, source: FixtureError) -> Self {
        FixtureError::Operation {
            op_type: op_type.into(),
            source: Box::new(source),
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            FixtureError::Config(_)
            | FixtureError::Yaml(_)
            | FixtureError::Json(_)
            | FixtureError::Pattern { .. } => 1,
            FixtureError::Database(_) | FixtureError::Metadata(_) | FixtureError::NoPrimaryKey(_) => 2,
            FixtureError::Export { .. } => 3,
            FixtureError::Operation { .. } => 4,
            FixtureError::Dataset(_)
            | FixtureError::UnknownOperation(_)
            | FixtureError::Xml(_)
            | FixtureError::Csv(_) => 5,
            FixtureError::Io(_) => 7,
        }
    }
}

/// Result type alias for fixture operations.
pub type Result<T> = std::result::Result<T, FixtureError>;
