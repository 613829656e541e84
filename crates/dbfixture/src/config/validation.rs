//! Configuration validation.

use tracing::warn;

use super::Config;
use crate::error::{FixtureError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.connection.host.is_empty() {
        return Err(FixtureError::Config("connection.host is required".into()));
    }
    if config.connection.database.is_empty() {
        return Err(FixtureError::Config(
            "connection.database is required".into(),
        ));
    }
    if config.connection.user.is_empty() {
        return Err(FixtureError::Config("connection.user is required".into()));
    }

    if let Some(export) = &config.export {
        if export.dest.as_os_str().is_empty() {
            return Err(FixtureError::Config("export.dest is required".into()));
        }
        if !export.encoding.eq_ignore_ascii_case("utf-8")
            && !export.encoding.eq_ignore_ascii_case("utf8")
        {
            warn!(
                "export.encoding '{}' is declared in the XML prolog but file bytes are UTF-8",
                export.encoding
            );
        }
    }

    if let Some(operation) = &config.operation {
        if operation.r#type.is_empty() {
            return Err(FixtureError::Config("operation.type is required".into()));
        }
        if operation.src.is_none() && operation.sources.is_empty() && !operation.clear_all_tables {
            return Err(FixtureError::Config(
                "operation needs at least one source (or clear_all_tables)".into(),
            ));
        }
    }

    Ok(())
}
