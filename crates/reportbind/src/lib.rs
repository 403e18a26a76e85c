//! # reportbind
//!
//! Fill Word report templates with query results.
//!
//! A template is an ordinary `.docx` file with content controls marking
//! where values go. Each control is replaced by a parameter, a single value,
//! a table, or an updated chart whose embedded workbook is rewritten to
//! match the new data.
//!
//! ## Features
//!
//! - Report parameters and single values, inline, in table cells or as paragraphs
//! - Tables rendered with a template table style
//! - Charts with series added or removed to fit the data, caches and formulas
//!   rewritten, and the embedded workbook kept in sync
//! - Placeholders in headers, footers, footnotes and endnotes
//!
//! ## Example
//!
//! ```no_run
//! use reportbind::prelude::*;
//!
//! let results = ResultSet::new()
//!     .with_parameter("Customer", "Contoso")
//!     .with_result(
//!         "CpuChart:Load",
//!         TabularResult::from_json(r#"{"fields":["Time","CPU"],"rows":[["10:00","12"]]}"#)?,
//!     );
//!
//! let report = build_report("template.docx", "report.docx", &results, &BindOptions::default())?;
//! println!("{} placeholders bound", report.placeholders.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod prelude;

use std::path::Path;

// Re-export core types
pub use reportbind_core::{
    column, AccentColor, Error, Result, TabularResult, NO_RESULTS,
};

// Re-export package types
pub use reportbind_opc::{Element, NodeId, OpcError, OpcResult, Package, XmlTree, CONTENT_TYPES};

// Re-export synchronizers
pub use reportbind_chart::{ChartError, ChartSyncReport, ChartSynchronizer, SeriesData};
pub use reportbind_xlsx::{SpreadsheetSynchronizer, TableDefinition, XlsxError};

// Re-export binding types
pub use reportbind_docx::{
    BindError, BindOptions, BindOutcome, BindReport, BindResult, BoundPlaceholder,
    PlaceholderError, PlaceholderKind, PlaceholderRegion, ReportBinder, ResultSet, ResultSource,
    StructuralContext, TableModel, CHART_UNAVAILABLE, DEFAULT_TABLE_STYLE, NO_RESULT,
};

/// Bind the template at `template` and write the finished report to `output`
pub fn build_report<P: AsRef<Path>, Q: AsRef<Path>>(
    template: P,
    output: Q,
    source: &dyn ResultSource,
    options: &BindOptions,
) -> BindResult<BindReport> {
    let mut package = Package::open(template)?;
    let report = ReportBinder::new(options.clone()).bind(&mut package, source)?;
    package.save(output)?;
    Ok(report)
}

/// Placeholders of a template, in binding order, without binding anything
pub fn inspect_template(package: &Package) -> BindResult<Vec<PlaceholderRegion>> {
    let main = reportbind_docx::placeholder::main_document_part(package)?;
    let mut regions = Vec::new();
    for part in reportbind_docx::placeholder::content_parts(package, &main)? {
        let tree = package.xml_part(&part)?;
        regions.extend(reportbind_docx::placeholder::scan_part(&part, &tree));
    }
    Ok(regions)
}
