//! Replacing content controls with rendered content
//!
//! The `w:sdt` wrapper is always removed. What takes its place depends on
//! where the control sits, so the result stays valid WordprocessingML.

use reportbind_opc::{Content, Element, NodeId, XmlTree};

use crate::error::PlaceholderError;
use crate::placeholder::StructuralContext;

/// Character style Word applies to placeholder prompts
pub const PLACEHOLDER_STYLE: &str = "PlaceholderText";

/// Remove the placeholder prompt style from every run under `node`
pub fn strip_placeholder_style(tree: &mut XmlTree, node: NodeId) {
    for style in tree.descendants_named(node, "w:rStyle") {
        if tree.attribute(style, "w:val") == Some(PLACEHOLDER_STYLE) {
            tree.detach(style);
        }
    }
}

/// Replace a control with a single run of `text`.
///
/// The run takes the formatting of the first run inside the control.
pub fn splice_text(
    tree: &mut XmlTree,
    sdt: NodeId,
    context: StructuralContext,
    text: &str,
) -> Result<(), PlaceholderError> {
    strip_placeholder_style(tree, sdt);
    let content = sdt_content(tree, sdt);
    let run_properties = content
        .find("w:r")
        .and_then(|run| run.child("w:rPr"))
        .cloned()
        .or_else(|| {
            tree.first_child(sdt, "w:sdtPr")
                .and_then(|props| tree.first_child(props, "w:rPr"))
                .and_then(|rpr| tree.extract(rpr))
        });
    let run = text_run(run_properties, text);

    let replacement = match context {
        StructuralContext::Inline => run,
        StructuralContext::TableCell => {
            let mut cell = table_cell(&content)?;
            match cell.child_mut("w:p") {
                Some(paragraph) => reduce_paragraph(paragraph, run),
                None => cell.push(Element::new("w:p").with_child(run)),
            }
            cell
        }
        StructuralContext::Block => {
            let mut paragraph = content
                .child("w:p")
                .cloned()
                .unwrap_or_else(|| Element::new("w:p"));
            reduce_paragraph(&mut paragraph, run);
            paragraph
        }
    };

    let node = tree.build(&replacement);
    tree.replace(sdt, node);
    Ok(())
}

/// Replace a control with a rendered `w:tbl`
pub fn splice_table(
    tree: &mut XmlTree,
    sdt: NodeId,
    context: StructuralContext,
    table: Element,
) -> Result<(), PlaceholderError> {
    let replacement = match context {
        StructuralContext::Inline => {
            return Err(PlaceholderError::TemplateContract(
                "a table placeholder cannot sit inside a paragraph".into(),
            ))
        }
        StructuralContext::TableCell => {
            let mut cell = table_cell(&sdt_content(tree, sdt))?;
            cell.children
                .retain(|c| matches!(c, Content::Element(e) if e.name == "w:tcPr"));
            cell.push(table);
            // A cell must end with a paragraph.
            cell.push(Element::new("w:p"));
            cell
        }
        StructuralContext::Block => table,
    };

    let node = tree.build(&replacement);
    tree.replace(sdt, node);
    Ok(())
}

/// Remove the control but keep what it wraps, in place
pub fn keep_content(tree: &mut XmlTree, sdt: NodeId) {
    strip_placeholder_style(tree, sdt);
    for name in ["w:sdtPr", "w:sdtEndPr"] {
        if let Some(node) = tree.first_child(sdt, name) {
            tree.detach(node);
        }
    }
    if let Some(content) = tree.first_child(sdt, "w:sdtContent") {
        tree.unwrap(content);
    }
    tree.unwrap(sdt);
}

fn sdt_content(tree: &XmlTree, sdt: NodeId) -> Element {
    tree.first_child(sdt, "w:sdtContent")
        .and_then(|content| tree.extract(content))
        .unwrap_or_else(|| Element::new("w:sdtContent"))
}

fn table_cell(content: &Element) -> Result<Element, PlaceholderError> {
    content.child("w:tc").cloned().ok_or_else(|| {
        PlaceholderError::TemplateContract("cell-level control does not wrap a table cell".into())
    })
}

fn text_run(properties: Option<Element>, text: &str) -> Element {
    let mut run = Element::new("w:r");
    if let Some(properties) = properties {
        run.push(properties);
    }
    run.with_child(
        Element::new("w:t")
            .with_attr("xml:space", "preserve")
            .with_text(text),
    )
}

/// Keep only the paragraph properties, then add `run`
fn reduce_paragraph(paragraph: &mut Element, run: Element) {
    paragraph
        .children
        .retain(|c| matches!(c, Content::Element(e) if e.name == "w:pPr"));
    paragraph.push(run);
}
