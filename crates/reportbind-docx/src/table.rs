//! Table renderer
//!
//! Renders a [`TabularResult`] as a WordprocessingML table: a header row of
//! field names followed by one row per record, styled with a table style
//! from the template.

use reportbind_core::TabularResult;
use reportbind_opc::Element;

/// Table style applied when none is configured
pub const DEFAULT_TABLE_STYLE: &str = "GridTable4-Accent1";

/// Table width in fiftieths of a percent (100%)
const FULL_WIDTH_PCT: &str = "5000";

/// A result ready to be rendered as `w:tbl`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    style: String,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableModel {
    /// Model of `data`; a result with no rows renders the "No Results" table
    pub fn from_result(data: &TabularResult, style: &str) -> Self {
        let data = data.or_sentinel();
        Self {
            style: style.to_string(),
            header: data.fields().to_vec(),
            rows: data.rows().to_vec(),
        }
    }

    /// Table style id
    pub fn style(&self) -> &str {
        &self.style
    }

    /// Number of body rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Build the `w:tbl` fragment
    pub fn to_element(&self) -> Element {
        let properties = Element::new("w:tblPr")
            .with_child(Element::new("w:tblStyle").with_attr("w:val", self.style.as_str()))
            .with_child(
                Element::new("w:tblW")
                    .with_attr("w:w", FULL_WIDTH_PCT)
                    .with_attr("w:type", "pct"),
            );
        let grid = Element::new("w:tblGrid")
            .with_children(self.header.iter().map(|_| Element::new("w:gridCol")));

        Element::new("w:tbl")
            .with_child(properties)
            .with_child(grid)
            .with_child(row(&self.header))
            .with_children(self.rows.iter().map(|r| row(r)))
    }
}

fn row(values: &[String]) -> Element {
    Element::new("w:tr").with_children(values.iter().map(|v| cell(v)))
}

fn cell(text: &str) -> Element {
    let run = Element::new("w:r").with_child(
        Element::new("w:t")
            .with_attr("xml:space", "preserve")
            .with_text(text),
    );
    Element::new("w:tc").with_child(Element::new("w:p").with_child(run))
}
