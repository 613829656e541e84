//! Table model, query synthesis, and discovery filtering.

mod discover;
mod table;

pub use discover::{discover_tables, ExcludeFilter};
pub use table::{ExportTable, QuerySpec, TableSpec};
