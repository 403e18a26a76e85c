//! Placeholder binder
//!
//! Walks every placeholder of a template package in order and replaces it
//! with rendered content from a [`ResultSource`].

use std::borrow::Cow;

use reportbind_chart::{external_data_id, ChartSyncReport, ChartSynchronizer};
use reportbind_core::TabularResult;
use reportbind_opc::{OpcError, Package, XmlTree};
use reportbind_xlsx::SpreadsheetSynchronizer;

use crate::error::{BindError, BindResult, PlaceholderError};
use crate::placeholder::{content_parts, main_document_part, scan_part, PlaceholderKind, PlaceholderRegion};
use crate::source::ResultSource;
use crate::splice::{keep_content, splice_table, splice_text};
use crate::table::{TableModel, DEFAULT_TABLE_STYLE};

/// Text rendered for a parameter or single value with no result
pub const NO_RESULT: &str = "No Result";

/// Text rendered in place of a chart with no data
pub const CHART_UNAVAILABLE: &str = "Chart unavailable. No results found.";

/// Binding options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindOptions {
    /// Table style id applied to rendered tables
    pub table_style: String,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            table_style: DEFAULT_TABLE_STYLE.to_string(),
        }
    }
}

impl BindOptions {
    /// Set the table style
    pub fn with_table_style<S: Into<String>>(mut self, style: S) -> Self {
        self.table_style = style.into();
        self
    }
}

/// What was rendered for one placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    /// A value from the result source
    Value(String),
    /// The "No Result" fallback
    Fallback,
    /// A table with this many body rows
    Table { rows: usize },
    /// The chart and its workbook were updated
    Chart(ChartSyncReport),
    /// The chart was removed for lack of data
    ChartUnavailable,
}

/// One bound placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundPlaceholder {
    /// Part that contained the placeholder
    pub part: String,
    /// Placeholder title
    pub title: String,
    /// Placeholder kind
    pub kind: PlaceholderKind,
    /// What was rendered
    pub outcome: BindOutcome,
}

/// Summary of a binding run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Bound placeholders in binding order
    pub placeholders: Vec<BoundPlaceholder>,
    /// Placeholders nested in content that was already replaced
    pub skipped: usize,
}

impl BindReport {
    /// Number of bound placeholders of a kind
    pub fn count(&self, kind: PlaceholderKind) -> usize {
        self.placeholders.iter().filter(|p| p.kind == kind).count()
    }

    /// Number of placeholders that fell back to default text
    pub fn fallbacks(&self) -> usize {
        self.placeholders
            .iter()
            .filter(|p| matches!(p.outcome, BindOutcome::Fallback | BindOutcome::ChartUnavailable))
            .count()
    }
}

/// Binds result data into a template package
#[derive(Debug, Clone, Default)]
pub struct ReportBinder {
    options: BindOptions,
}

impl ReportBinder {
    /// Create a binder
    pub fn new(options: BindOptions) -> Self {
        Self { options }
    }

    /// Binding options
    pub fn options(&self) -> &BindOptions {
        &self.options
    }

    /// Bind a template held in memory and return the finished document
    pub fn bind_bytes(&self, template: &[u8], source: &dyn ResultSource) -> BindResult<Vec<u8>> {
        let mut package = Package::from_bytes(template)?;
        self.bind(&mut package, source)?;
        Ok(package.to_bytes()?)
    }

    /// Bind every placeholder of `package`.
    ///
    /// Placeholders are processed in document order, main document first,
    /// then headers, footers, footnotes and endnotes. The first failure stops
    /// binding and leaves `package` as it was.
    pub fn bind(&self, package: &mut Package, source: &dyn ResultSource) -> BindResult<BindReport> {
        let mut staged = package.clone();
        let report = self.bind_staged(&mut staged, source)?;
        *package = staged;
        Ok(report)
    }

    fn bind_staged(&self, package: &mut Package, source: &dyn ResultSource) -> BindResult<BindReport> {
        let main = main_document_part(package)?;
        if !package.contains(&main) {
            return Err(BindError::TemplateContract(format!(
                "main document part {} is missing",
                main
            )));
        }

        let mut report = BindReport::default();
        let mut modified: Vec<(String, XmlTree)> = Vec::new();

        for part in content_parts(package, &main)? {
            let mut tree = package.xml_part(&part)?;
            let regions = scan_part(&part, &tree);
            if regions.is_empty() {
                continue;
            }
            log::debug!("{}: {} placeholder(s)", part, regions.len());

            for region in &regions {
                if !tree.is_attached(region.node) {
                    log::debug!("'{}' was inside replaced content, skipping", region.title);
                    report.skipped += 1;
                    continue;
                }

                let outcome = self
                    .bind_region(package, &mut tree, region, source)
                    .map_err(|source| BindError::Placeholder {
                        title: region.title.clone(),
                        kind: region.kind,
                        source,
                    })?;
                log::debug!("'{}' ({}): {:?}", region.title, region.kind, outcome);

                report.placeholders.push(BoundPlaceholder {
                    part: part.clone(),
                    title: region.title.clone(),
                    kind: region.kind,
                    outcome,
                });
            }
            modified.push((part, tree));
        }

        for (part, tree) in &modified {
            package.set_xml_part(part, tree)?;
        }

        log::info!(
            "bound {} placeholder(s), {} fallback(s)",
            report.placeholders.len(),
            report.fallbacks()
        );
        Ok(report)
    }

    fn bind_region(
        &self,
        package: &mut Package,
        tree: &mut XmlTree,
        region: &PlaceholderRegion,
        source: &dyn ResultSource,
    ) -> Result<BindOutcome, PlaceholderError> {
        match region.kind {
            PlaceholderKind::ReportParameter => {
                let value = source.scalar(&region.title);
                self.bind_text(tree, region, value)
            }
            PlaceholderKind::SingleValue => {
                let value = single_value(source.table(&region.title))?;
                self.bind_text(tree, region, value)
            }
            PlaceholderKind::Table => {
                let data = match source.table(&region.title) {
                    Some(data) => Cow::Borrowed(data),
                    None => {
                        log::info!("no result for table '{}'", region.title);
                        Cow::Owned(TabularResult::no_results())
                    }
                };
                let model = TableModel::from_result(&data, &self.options.table_style);
                splice_table(tree, region.node, region.context, model.to_element())?;
                Ok(BindOutcome::Table {
                    rows: model.row_count(),
                })
            }
            PlaceholderKind::Chart => self.bind_chart(package, tree, region, source),
        }
    }

    fn bind_text(
        &self,
        tree: &mut XmlTree,
        region: &PlaceholderRegion,
        value: Option<&str>,
    ) -> Result<BindOutcome, PlaceholderError> {
        match value {
            Some(value) => {
                splice_text(tree, region.node, region.context, value)?;
                Ok(BindOutcome::Value(value.to_string()))
            }
            None => {
                log::info!("no result for {} '{}'", region.kind, region.title);
                splice_text(tree, region.node, region.context, NO_RESULT)?;
                Ok(BindOutcome::Fallback)
            }
        }
    }

    fn bind_chart(
        &self,
        package: &mut Package,
        tree: &mut XmlTree,
        region: &PlaceholderRegion,
        source: &dyn ResultSource,
    ) -> Result<BindOutcome, PlaceholderError> {
        let chart = region.chart.as_ref().ok_or_else(|| {
            PlaceholderError::TemplateContract("chart placeholder does not contain a chart".into())
        })?;
        let chart_part = package.resolve_relationship(&region.part, &chart.relationship_id)?;

        let data = match source.table(&region.title) {
            Some(data) if !data.is_empty() => data,
            _ => {
                log::info!("no result for chart '{}', removing it", region.title);
                remove_chart(package, &region.part, &chart.relationship_id, &chart_part)?;
                splice_text(tree, region.node, region.context, CHART_UNAVAILABLE)?;
                return Ok(BindOutcome::ChartUnavailable);
            }
        };

        let mut chart_tree = package.xml_part(&chart_part)?;
        let report = ChartSynchronizer::sync(&mut chart_tree, data, &chart.sheet_name)?;

        let workbook = match external_data_id(&chart_tree) {
            Some(id) => {
                let workbook_part = package.resolve_relationship(&chart_part, &id)?;
                let workbook = package
                    .part(&workbook_part)
                    .ok_or_else(|| OpcError::MissingPart(workbook_part.clone()))?;
                let updated = SpreadsheetSynchronizer::sync(workbook, data, &chart.sheet_name)?;
                Some((workbook_part, updated))
            }
            None => {
                log::warn!("chart '{}' has no embedded workbook", region.title);
                None
            }
        };

        // Chart and workbook are written together once both are rebuilt.
        package.set_xml_part(&chart_part, &chart_tree)?;
        if let Some((workbook_part, updated)) = workbook {
            package.set_part(workbook_part, updated);
        }

        keep_content(tree, region.node);
        Ok(BindOutcome::Chart(report))
    }
}

/// The value shown by a single-value placeholder.
///
/// No result or no rows gives `None`; more than one row is an error.
pub fn single_value(data: Option<&TabularResult>) -> Result<Option<&str>, PlaceholderError> {
    let Some(data) = data else {
        return Ok(None);
    };
    match data.row_count() {
        0 => Ok(None),
        1 => Ok(data.rows()[0].first().map(String::as_str)),
        rows => Err(PlaceholderError::Cardinality { rows }),
    }
}

/// Delete a chart part, the parts it owns and the relationship to it
fn remove_chart(
    package: &mut Package,
    owner: &str,
    relationship_id: &str,
    chart_part: &str,
) -> Result<(), OpcError> {
    package.remove_part_tree(chart_part)?;
    let mut rels = package.relationships(owner)?;
    rels.remove(relationship_id);
    package.set_relationships(owner, &rels)
}
