//! # reportbind-chart
//!
//! Chart support for reportbind: reconciles the series of a chart part with
//! a [`TabularResult`](reportbind_core::TabularResult) and rewrites every
//! series' name, category and value caches and formulas.
//!
//! Chart parts are expected to use the `c:` prefix for DrawingML charts and
//! `a:` for DrawingML main, as Word writes them.

pub mod error;
pub mod series;
pub mod sync;

pub use error::{ChartError, ChartResult};
pub use series::{quote_sheet_name, SeriesData, SeriesTemplate};
pub use sync::{external_data_id, series_nodes, ChartSyncReport, ChartSynchronizer};
