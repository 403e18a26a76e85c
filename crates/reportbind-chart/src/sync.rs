//! Chart synchronizer
//!
//! Brings a chart part (`c:chartSpace`) in line with a result: one series per
//! data column after the first, each with freshly built caches and formulas
//! pointing at the embedded sheet.

use reportbind_core::{AccentColor, TabularResult};
use reportbind_opc::{NodeId, XmlTree};

use crate::error::{ChartError, ChartResult};
use crate::series::{SeriesData, SeriesTemplate};

/// Outcome of one chart synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSyncReport {
    /// Series in the template before reconciliation
    pub series_before: usize,
    /// Series after reconciliation
    pub series_after: usize,
    /// Points written per series
    pub points: usize,
}

impl ChartSyncReport {
    /// Series cloned from the template
    pub fn added(&self) -> usize {
        self.series_after.saturating_sub(self.series_before)
    }

    /// Series removed from the tail
    pub fn removed(&self) -> usize {
        self.series_before.saturating_sub(self.series_after)
    }
}

/// Rewrites chart parts
pub struct ChartSynchronizer;

impl ChartSynchronizer {
    /// Synchronize the chart in `tree` with `data`, whose embedded copy lives
    /// on sheet `sheet`.
    ///
    /// `data` must have at least one row; callers render a placeholder
    /// message for empty results instead.
    pub fn sync(tree: &mut XmlTree, data: &TabularResult, sheet: &str) -> ChartResult<ChartSyncReport> {
        let existing = series_nodes(tree);
        let Some(&first) = existing.first() else {
            return Err(ChartError::TemplateContract(
                "chart has no data series".into(),
            ));
        };

        let required = data.column_count().saturating_sub(1);
        if required == 0 {
            return Err(ChartError::TemplateContract(format!(
                "chart data needs an axis column and at least one value column, got {} field(s)",
                data.column_count()
            )));
        }

        let series_before = existing.len();
        if series_before > required {
            for node in existing[required..].iter().rev() {
                tree.detach(*node);
            }
        } else if series_before < required {
            let prototype = tree
                .extract(first)
                .ok_or_else(|| ChartError::TemplateContract("first series is not an element".into()))?;
            let template = SeriesTemplate::new(prototype);

            let mut anchor = existing[series_before - 1];
            for position in series_before..required {
                let identity = SeriesData::from_result(data, sheet, position)?
                    .with_fill(AccentColor::for_series(position));
                let node = tree.build(&template.instantiate(&identity));
                tree.insert_after(anchor, node);
                anchor = node;
            }
        }

        let series = series_nodes(tree);
        if series.len() != required {
            return Err(ChartError::Reconciliation {
                expected: required,
                actual: series.len(),
            });
        }

        for (position, node) in series.iter().enumerate() {
            let series_data = SeriesData::from_result(data, sheet, position)?;
            let mut element = tree
                .extract(*node)
                .ok_or_else(|| ChartError::TemplateContract("series is not an element".into()))?;
            series_data.apply_identity(&mut element);
            series_data.apply_data(&mut element)?;

            let rebuilt = tree.build(&element);
            tree.replace(*node, rebuilt);
            log::debug!(
                "series {} of {} ('{}'): {} points",
                position + 1,
                required,
                series_data.name,
                series_data.values.len()
            );
        }

        enable_auto_update(tree);

        Ok(ChartSyncReport {
            series_before,
            series_after: required,
            points: data.row_count(),
        })
    }
}

/// Every `c:ser` of the chart in document order
pub fn series_nodes(tree: &XmlTree) -> Vec<NodeId> {
    tree.descendants_named(tree.root(), "c:ser")
}

/// Relationship id of the embedded workbook (`c:externalData/@r:id`)
pub fn external_data_id(tree: &XmlTree) -> Option<String> {
    let external = tree.first_child(tree.root(), "c:externalData")?;
    tree.attribute(external, "r:id").map(str::to_string)
}

/// Ask Word to refresh the chart from its workbook when opened
fn enable_auto_update(tree: &mut XmlTree) {
    let Some(external) = tree.first_child(tree.root(), "c:externalData") else {
        return;
    };
    match tree.first_child(external, "c:autoUpdate") {
        Some(auto_update) => tree.set_attribute(auto_update, "val", "1"),
        None => {
            let node = tree.new_element("c:autoUpdate");
            tree.set_attribute(node, "val", "1");
            tree.append_child(external, node);
        }
    }
}
