//! Table discovery from database metadata with exclusion filtering.
//!
//! Discovery is the fallback path for the export command: it only runs
//! when no explicit tables or queries are configured.

use regex::Regex;
use tracing::{debug, warn};

use crate::db::DatabaseHandle;
use crate::error::{FixtureError, Result};

use super::ExportTable;

/// Compiled table-name exclusion rules.
///
/// A name is excluded when it fully matches any pattern, first match
/// wins. Patterns are anchored at compile time so `LOG` excludes `LOG`
/// but not `LOGS`; use `LOG.*` for prefix exclusion.
pub struct ExcludeFilter {
    patterns: Vec<Regex>,
}

impl ExcludeFilter {
    /// Compile a pattern list. An invalid pattern fails the whole
    /// filter; no partial rule set is built.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let anchored = format!(r"\A(?:{})\z", pattern);
            let regex = Regex::new(&anchored).map_err(|e| FixtureError::Pattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            compiled.push(regex);
        }
        Ok(Self { patterns: compiled })
    }

    /// True when the name fully matches at least one pattern.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(name))
    }
}

/// Enumerate base tables from metadata and apply filtering.
///
/// For each candidate: exclusion patterns first, then (when
/// `exclude_empty` is set) a sequential `SELECT COUNT(*)` per surviving
/// table. Survivors get their column metadata loaded. Tables that turn
/// out to have no columns are dropped with a warning, since no
/// well-formed extraction query exists for them.
///
/// Any metadata failure aborts discovery; no partial result is
/// returned.
pub async fn discover_tables(
    db: &mut dyn DatabaseHandle,
    excludes: &[String],
    exclude_empty: bool,
) -> Result<Vec<ExportTable>> {
    let filter = ExcludeFilter::new(excludes)?;

    let mut discovered = Vec::new();
    for name in db.list_tables().await? {
        if filter.is_excluded(&name) {
            debug!("Excluded by pattern: {}", name);
            continue;
        }

        if exclude_empty && db.count_rows(&name).await? == 0 {
            debug!("Excluded empty table: {}", name);
            continue;
        }

        let mut table = ExportTable::new(&name);
        for column in db.list_columns(&name).await? {
            table.add_column(column);
        }

        if table.has_no_columns() {
            warn!("Skipping table {} with no column metadata", name);
            continue;
        }

        debug!("{}", table);
        discovered.push(table);
    }

    Ok(discovered)
}
