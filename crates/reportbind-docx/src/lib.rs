//! # reportbind-docx
//!
//! Binds tabular results into WordprocessingML templates.
//!
//! ## Template contract
//!
//! A placeholder is a content control (`w:sdt`) whose properties carry:
//!
//! - `w:alias` (the title shown in Word): the key looked up in the
//!   [`ResultSource`]. For charts, the text after the last `:` names the
//!   sheet of the embedded workbook, e.g. `CpuChart:Load`.
//! - `w:tag`: one of `ReportParameter`, `SingleValue`, `Table` or `Chart`.
//!
//! Controls with any other tag, and document part galleries such as a table
//! of contents, are left alone. Placeholders may appear in the body, in
//! headers and footers, and in foot- and endnotes.
//!
//! | tag | renders |
//! |---|---|
//! | `ReportParameter` | the scalar value, or `No Result` |
//! | `SingleValue` | the first value of a one-row result, or `No Result`; several rows is an error |
//! | `Table` | a `w:tbl` with a header row; an empty result shows `No Results` |
//! | `Chart` | the wrapped chart with its caches and embedded workbook rewritten |
//!
//! A chart template needs at least one series, an embedded workbook
//! referenced by `c:externalData`, and a header row on the chart sheet.
//! Charts with no data are removed and replaced by a short message.
//!
//! ## Example
//!
//! ```no_run
//! use reportbind_core::TabularResult;
//! use reportbind_docx::{BindOptions, ReportBinder, ResultSet};
//! use reportbind_opc::Package;
//!
//! let mut package = Package::open("template.docx")?;
//! let results = ResultSet::new()
//!     .with_parameter("Customer", "Contoso")
//!     .with_result("Errors", TabularResult::from_json(r#"{"fields":["n"],"rows":[["3"]]}"#)?);
//!
//! let report = ReportBinder::new(BindOptions::default()).bind(&mut package, &results)?;
//! package.save("report.docx")?;
//! println!("{} placeholders bound", report.placeholders.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binder;
pub mod error;
pub mod placeholder;
pub mod source;
pub mod splice;
pub mod table;

pub use binder::{
    single_value, BindOptions, BindOutcome, BindReport, BoundPlaceholder, ReportBinder,
    CHART_UNAVAILABLE, NO_RESULT,
};
pub use error::{BindError, BindResult, PlaceholderError};
pub use placeholder::{ChartRef, PlaceholderKind, PlaceholderRegion, StructuralContext};
pub use source::{ResultSet, ResultSource};
pub use table::{TableModel, DEFAULT_TABLE_STYLE};
