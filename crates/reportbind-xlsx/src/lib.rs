//! # reportbind-xlsx
//!
//! Keeps the workbook embedded behind a chart in step with the chart data:
//! worksheet rows, the `dimension` range and the named table definition.

pub mod error;
pub mod sync;
pub mod table;

pub use error::{XlsxError, XlsxResult};
pub use sync::{write_sheet_data, SpreadsheetSyncReport, SpreadsheetSynchronizer};
pub use table::{range_address, TableColumn, TableDefinition};
