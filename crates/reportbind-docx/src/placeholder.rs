//! Placeholder discovery
//!
//! Placeholders are content controls (`w:sdt`) whose alias names the value
//! and whose tag says how to render it.

use std::fmt;

use reportbind_opc::{rel_types, NodeId, OpcResult, Package, XmlTree};

/// Main document part used when the package root relationships do not name one
const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// Parents that make a content control run-level
const RUN_CONTAINERS: [&str; 5] = ["w:p", "w:hyperlink", "w:smartTag", "w:fldSimple", "w:ins"];

/// Wrappers that can sit at either level; the context comes from above them
const TRANSPARENT_WRAPPERS: [&str; 8] = [
    "w:sdtContent",
    "w:sdt",
    "w:customXml",
    "w:del",
    "w:moveTo",
    "w:moveFrom",
    "w:dir",
    "w:bdo",
];

/// How a placeholder is rendered, from `w:tag/@w:val`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    /// A scalar report parameter
    ReportParameter,
    /// The first value of a one-row result
    SingleValue,
    /// A result rendered as a table
    Table,
    /// A chart whose data is replaced by a result
    Chart,
}

impl PlaceholderKind {
    /// Parse a content control tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ReportParameter" => Some(PlaceholderKind::ReportParameter),
            "SingleValue" => Some(PlaceholderKind::SingleValue),
            "Table" => Some(PlaceholderKind::Table),
            "Chart" => Some(PlaceholderKind::Chart),
            _ => None,
        }
    }

    /// The tag text
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderKind::ReportParameter => "ReportParameter",
            PlaceholderKind::SingleValue => "SingleValue",
            PlaceholderKind::Table => "Table",
            PlaceholderKind::Chart => "Chart",
        }
    }
}

impl fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Where a content control sits in the document structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralContext {
    /// Inside a paragraph, among runs
    Inline,
    /// In a table row, wrapping a cell
    TableCell,
    /// Between paragraphs and tables
    Block,
}

impl StructuralContext {
    /// Context implied by the name of a content control's parent element
    pub fn from_parent(parent: &str) -> Self {
        if RUN_CONTAINERS.contains(&parent) {
            StructuralContext::Inline
        } else if parent == "w:tr" {
            StructuralContext::TableCell
        } else {
            StructuralContext::Block
        }
    }

    /// Context of a content control, looking past enclosing controls and
    /// other wrappers to the nearest paragraph, row or block container
    pub fn of_control(tree: &XmlTree, sdt: NodeId) -> Self {
        tree.ancestors(sdt)
            .filter_map(|node| tree.name(node))
            .find(|name| !TRANSPARENT_WRAPPERS.contains(name))
            .map(StructuralContext::from_parent)
            .unwrap_or(StructuralContext::Block)
    }
}

/// The chart a chart placeholder wraps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRef {
    /// Relationship id from `c:chart/@r:id`, relative to the containing part
    pub relationship_id: String,
    /// Sheet of the embedded workbook that backs the chart
    pub sheet_name: String,
}

/// A content control recognised as a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRegion {
    /// Part that contains the control
    pub part: String,
    /// The `w:sdt` node in that part's tree
    pub node: NodeId,
    /// `w:alias/@w:val`
    pub title: String,
    /// Kind from `w:tag/@w:val`
    pub kind: PlaceholderKind,
    /// Structural context, fixed at scan time
    pub context: StructuralContext,
    /// Referenced chart, for chart placeholders that wrap one
    pub chart: Option<ChartRef>,
}

/// Sheet name encoded in a chart title: the text after the last `:`.
///
/// ```
/// use reportbind_docx::placeholder::sheet_name;
///
/// assert_eq!(sheet_name("CpuChart:Load"), "Load");
/// assert_eq!(sheet_name("Load"), "Load");
/// ```
pub fn sheet_name(title: &str) -> &str {
    title.rsplit(':').next().unwrap_or(title)
}

/// Name of the main document part
pub fn main_document_part(package: &Package) -> OpcResult<String> {
    let rels = package.relationships("")?;
    let part = rels
        .of_type(rel_types::OFFICE_DOCUMENT)
        .next()
        .map(|rel| reportbind_opc::resolve_target("", &rel.target))
        .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());
    Ok(part)
}

/// Parts that may contain placeholders, in binding order: the main document,
/// then headers, footers, footnotes and endnotes.
pub fn content_parts(package: &Package, main_part: &str) -> OpcResult<Vec<String>> {
    let rels = package.relationships(main_part)?;
    let mut parts = vec![main_part.to_string()];

    for rel_type in [
        rel_types::HEADER,
        rel_types::FOOTER,
        rel_types::FOOTNOTES,
        rel_types::ENDNOTES,
    ] {
        for rel in rels.of_type(rel_type).filter(|r| !r.external) {
            let part = reportbind_opc::resolve_target(main_part, &rel.target);
            if package.contains(&part) && !parts.contains(&part) {
                parts.push(part);
            }
        }
    }

    Ok(parts)
}

/// Every placeholder of a part in document order.
///
/// Document part galleries (tables of contents, cover pages) and controls
/// with an unknown tag or no alias are left out.
pub fn scan_part(part: &str, tree: &XmlTree) -> Vec<PlaceholderRegion> {
    tree.descendants_named(tree.root(), "w:sdt")
        .into_iter()
        .filter_map(|sdt| region(part, tree, sdt))
        .collect()
}

fn region(part: &str, tree: &XmlTree, sdt: NodeId) -> Option<PlaceholderRegion> {
    let properties = tree.first_child(sdt, "w:sdtPr")?;
    if tree.first_child(properties, "w:docPartObj").is_some()
        || tree.first_child(properties, "w:docPartList").is_some()
    {
        log::debug!("{}: skipping document part gallery", part);
        return None;
    }

    let Some(tag) = property(tree, properties, "w:tag") else {
        log::debug!("{}: skipping content control without tag", part);
        return None;
    };
    let Some(kind) = PlaceholderKind::from_tag(tag) else {
        log::debug!("{}: skipping content control tagged '{}'", part, tag);
        return None;
    };
    let Some(title) = property(tree, properties, "w:alias") else {
        log::debug!("{}: skipping {} content control without title", part, kind);
        return None;
    };

    let context = StructuralContext::of_control(tree, sdt);

    let chart = match kind {
        PlaceholderKind::Chart => tree
            .first_descendant(sdt, "c:chart")
            .and_then(|node| tree.attribute(node, "r:id"))
            .map(|id| ChartRef {
                relationship_id: id.to_string(),
                sheet_name: sheet_name(title).to_string(),
            }),
        _ => None,
    };

    Some(PlaceholderRegion {
        part: part.to_string(),
        node: sdt,
        title: title.to_string(),
        kind,
        context,
        chart,
    })
}

fn property<'a>(tree: &'a XmlTree, properties: NodeId, name: &str) -> Option<&'a str> {
    tree.first_child(properties, name)
        .and_then(|node| tree.attribute(node, "w:val"))
}
