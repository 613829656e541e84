//! The two commands: dataset export and dataset operation.

mod export;
mod operation;

pub use export::{execute_export, run_export, ExportSummary};
pub use operation::{execute_operation, run_operation, OperationSummary};
