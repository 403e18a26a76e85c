//! Spreadsheet synchronizer
//!
//! Rewrites the worksheet that backs a chart so its header, data rows and
//! named table match a [`TabularResult`]. Word re-reads this workbook when a
//! user edits the chart data, so it has to agree with the chart caches.

use reportbind_core::{column, TabularResult};
use reportbind_opc::{rel_types, Element, NodeId, Package, XmlTree};

use crate::error::{XlsxError, XlsxResult};
use crate::table::TableDefinition;

const DEFAULT_WORKBOOK: &str = "xl/workbook.xml";

/// Row attributes regenerated for every row
const POSITIONAL_ROW_ATTRS: [&str; 2] = ["r", "spans"];

/// Summary of one synchronization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetSyncReport {
    /// Name of the sheet that was rewritten
    pub sheet: String,
    /// Worksheet part name inside the embedded package
    pub worksheet_part: String,
    /// New table range, when the sheet has a named table
    pub table_range: Option<String>,
    /// Data rows written (excluding the header)
    pub rows_written: usize,
}

/// Synchronizes an embedded workbook with tabular data
pub struct SpreadsheetSynchronizer;

impl SpreadsheetSynchronizer {
    /// Rewrite the embedded workbook `package_bytes` and return the new bytes.
    ///
    /// The sheet named `sheet_name` is used, falling back to the first sheet.
    pub fn sync(
        package_bytes: &[u8],
        data: &TabularResult,
        sheet_name: &str,
    ) -> XlsxResult<Vec<u8>> {
        let mut package = Package::from_bytes(package_bytes)?;
        Self::sync_package(&mut package, data, sheet_name)?;
        Ok(package.to_bytes()?)
    }

    /// Rewrite an already opened workbook package in place
    pub fn sync_package(
        package: &mut Package,
        data: &TabularResult,
        sheet_name: &str,
    ) -> XlsxResult<SpreadsheetSyncReport> {
        let workbook_part = Self::workbook_part(package)?;
        let (sheet, worksheet_part) = Self::locate_sheet(package, &workbook_part, sheet_name)?;

        let mut worksheet = package.xml_part(&worksheet_part)?;
        write_sheet_data(&mut worksheet, data, &sheet)?;
        package.set_xml_part(&worksheet_part, &worksheet)?;

        let table_range = Self::sync_table(package, &worksheet_part, data)?;

        log::debug!(
            "sheet '{}' ({}) rewritten with {} rows",
            sheet,
            worksheet_part,
            data.row_count()
        );

        Ok(SpreadsheetSyncReport {
            sheet,
            worksheet_part,
            table_range,
            rows_written: data.row_count(),
        })
    }

    fn workbook_part(package: &Package) -> XlsxResult<String> {
        let root_rels = package.relationships("")?;
        let target = root_rels
            .of_type(rel_types::OFFICE_DOCUMENT)
            .next()
            .map(|rel| reportbind_opc::resolve_target("", &rel.target));
        Ok(target.unwrap_or_else(|| DEFAULT_WORKBOOK.to_string()))
    }

    /// Find the sheet by name (or the first sheet) and its worksheet part
    fn locate_sheet(
        package: &Package,
        workbook_part: &str,
        sheet_name: &str,
    ) -> XlsxResult<(String, String)> {
        let workbook = package.xml_part(workbook_part)?;
        let sheets = workbook.descendants_named(workbook.root(), "sheet");

        let chosen = sheets
            .iter()
            .copied()
            .find(|s| workbook.attribute(*s, "name") == Some(sheet_name))
            .or_else(|| {
                let first = sheets.first().copied();
                if first.is_some() {
                    log::warn!(
                        "sheet '{}' not found in embedded workbook, using the first sheet",
                        sheet_name
                    );
                }
                first
            })
            .ok_or_else(|| {
                XlsxError::TemplateContract("embedded workbook has no sheets".into())
            })?;

        let name = workbook
            .attribute(chosen, "name")
            .unwrap_or_default()
            .to_string();
        let r_id = workbook.attribute(chosen, "r:id").ok_or_else(|| {
            XlsxError::TemplateContract(format!("sheet '{}' has no relationship id", name))
        })?;

        let part = package.resolve_relationship(workbook_part, r_id)?;
        Ok((name, part))
    }

    /// Update the first named table of the worksheet, if any
    fn sync_table(
        package: &mut Package,
        worksheet_part: &str,
        data: &TabularResult,
    ) -> XlsxResult<Option<String>> {
        let rels = package.relationships(worksheet_part)?;
        let Some(rel) = rels.of_type(rel_types::TABLE).next() else {
            log::warn!("worksheet {} has no table definition", worksheet_part);
            return Ok(None);
        };
        let table_part = reportbind_opc::resolve_target(worksheet_part, &rel.target);

        let definition = TableDefinition::for_result(data);
        let mut table = package.xml_part(&table_part)?;
        definition.apply(&mut table);
        package.set_xml_part(&table_part, &table)?;

        Ok(Some(definition.range))
    }
}

/// Replace the rows of `sheetData` with a header row plus one row per record.
///
/// The template must already have a header row; its attributes (height,
/// descent) are carried over to the new header, and the first template data
/// row's attributes to every new data row.
pub fn write_sheet_data(
    worksheet: &mut XmlTree,
    data: &TabularResult,
    sheet: &str,
) -> XlsxResult<()> {
    let root = worksheet.root();
    let sheet_data = worksheet.first_child(root, "sheetData").ok_or_else(|| {
        XlsxError::TemplateContract(format!("worksheet '{}' has no sheetData", sheet))
    })?;

    let rows = worksheet.children_named(sheet_data, "row");
    let Some(&header) = rows.first() else {
        return Err(XlsxError::TemplateContract(format!(
            "worksheet '{}' has no header row",
            sheet
        )));
    };
    let header_attrs = carried_attributes(worksheet, header);
    let data_attrs = rows
        .get(1)
        .map(|row| carried_attributes(worksheet, *row))
        .unwrap_or_else(|| header_attrs.clone());

    worksheet.clear_children(sheet_data);

    let width = data.column_count();
    let header_row = build_row(1, width, &header_attrs, data.fields().iter().map(|field| {
        CellValue::Text(field.as_str())
    }));
    let node = worksheet.build(&header_row);
    worksheet.append_child(sheet_data, node);

    for (n, record) in data.rows().iter().enumerate() {
        let row_index = n + 2;
        let cells = record.iter().enumerate().map(|(i, value)| {
            if i == 0 {
                CellValue::Text(value.as_str())
            } else {
                CellValue::infer(value.as_str())
            }
        });
        let row = build_row(row_index, width, &data_attrs, cells);
        let node = worksheet.build(&row);
        worksheet.append_child(sheet_data, node);
    }

    if let Some(dimension) = worksheet.first_child(root, "dimension") {
        let range = crate::table::range_address(width, data.row_count());
        worksheet.set_attribute(dimension, "ref", &range);
    }

    Ok(())
}

/// Value of one cell as written to the sheet
#[derive(Debug, Clone, Copy, PartialEq)]
enum CellValue<'a> {
    /// Written with `t="str"`
    Text(&'a str),
    /// Written untyped (numeric)
    Number(&'a str),
}

impl<'a> CellValue<'a> {
    /// Numeric when the text is a finite number, text otherwise
    fn infer(value: &'a str) -> Self {
        match value.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(value.trim()),
            _ => CellValue::Text(value),
        }
    }
}

fn carried_attributes(tree: &XmlTree, row: NodeId) -> Vec<(String, String)> {
    tree.extract(row)
        .map(|e| e.attributes)
        .unwrap_or_default()
        .into_iter()
        .filter(|(k, _)| !POSITIONAL_ROW_ATTRS.contains(&k.as_str()))
        .collect()
}

fn build_row<'a, I>(
    row_index: usize,
    width: usize,
    attributes: &[(String, String)],
    cells: I,
) -> Element
where
    I: Iterator<Item = CellValue<'a>>,
{
    let mut row = Element::new("row")
        .with_attr("r", row_index.to_string())
        .with_attr("spans", format!("1:{}", width.max(1)));
    for (key, value) in attributes {
        row.set_attribute(key.as_str(), value.as_str());
    }

    for (i, cell) in cells.enumerate() {
        let reference = format!("{}{}", column::letters_for_index(i), row_index);
        let element = match cell {
            CellValue::Text(text) => Element::new("c")
                .with_attr("r", reference)
                .with_attr("t", "str")
                .with_child(Element::new("v").with_text(text)),
            CellValue::Number(number) => Element::new("c")
                .with_attr("r", reference)
                .with_child(Element::new("v").with_text(number)),
        };
        row.push(element);
    }

    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><dimension ref="A1:B3"/><sheetData><row r="1" spans="1:2" ht="15"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row><row r="2" spans="1:2"><c r="A2"><v>1</v></c><c r="B2"><v>2</v></c></row><row r="3" spans="1:2"><c r="A3"><v>3</v></c><c r="B3"><v>4</v></c></row></sheetData><tableParts count="1"><tablePart r:id="rId1"/></tableParts></worksheet>"#;

    fn result() -> TabularResult {
        TabularResult::new(
            vec!["Time".into(), "CPU".into(), "Memory".into()],
            vec![
                vec!["10:00".into(), "12.5".into(), "n/a".into()],
                vec!["11:00".into(), "13".into(), "512".into()],
            ],
        )
        .unwrap()
    }

    fn cell(tree: &XmlTree, reference: &str) -> Option<NodeId> {
        tree.descendants_named(tree.root(), "c")
            .into_iter()
            .find(|c| tree.attribute(*c, "r") == Some(reference))
    }

    #[test]
    fn test_write_sheet_data() {
        let mut tree = XmlTree::parse(SHEET.as_bytes()).unwrap();
        write_sheet_data(&mut tree, &result(), "Sheet1").unwrap();

        let root = tree.root();
        let sheet_data = tree.first_child(root, "sheetData").unwrap();
        let rows = tree.children_named(sheet_data, "row");
        assert_eq!(rows.len(), 3);

        let indexes: Vec<_> = rows.iter().map(|r| tree.attribute(*r, "r").unwrap()).collect();
        assert_eq!(indexes, vec!["1", "2", "3"]);
        assert_eq!(tree.attribute(rows[0], "ht"), Some("15"));
        assert_eq!(tree.attribute(rows[1], "spans"), Some("1:3"));

        let header = cell(&tree, "C1").unwrap();
        assert_eq!(tree.attribute(header, "t"), Some("str"));
        assert_eq!(tree.text(header), "Memory");

        let axis = cell(&tree, "A2").unwrap();
        assert_eq!(tree.attribute(axis, "t"), Some("str"));
        assert_eq!(tree.text(axis), "10:00");

        let number = cell(&tree, "B2").unwrap();
        assert_eq!(tree.attribute(number, "t"), None);
        assert_eq!(tree.text(number), "12.5");

        let text = cell(&tree, "C2").unwrap();
        assert_eq!(tree.attribute(text, "t"), Some("str"));

        let dimension = tree.first_child(root, "dimension").unwrap();
        assert_eq!(tree.attribute(dimension, "ref"), Some("A1:C3"));
    }

    #[test]
    fn test_write_sheet_data_with_no_rows() {
        let mut tree = XmlTree::parse(SHEET.as_bytes()).unwrap();
        let empty = TabularResult::empty(vec!["Time".into(), "CPU".into()]);
        write_sheet_data(&mut tree, &empty, "Sheet1").unwrap();

        let sheet_data = tree.first_child(tree.root(), "sheetData").unwrap();
        assert_eq!(tree.children_named(sheet_data, "row").len(), 1);
    }

    #[test]
    fn test_missing_header_is_contract_violation() {
        let xml = r#"<worksheet><sheetData/></worksheet>"#;
        let mut tree = XmlTree::parse(xml.as_bytes()).unwrap();
        let err = write_sheet_data(&mut tree, &result(), "Sheet1").unwrap_err();
        assert!(matches!(err, XlsxError::TemplateContract(_)));
    }

    #[test]
    fn test_infer() {
        assert_eq!(CellValue::infer("42"), CellValue::Number("42"));
        assert_eq!(CellValue::infer(" 1e3 "), CellValue::Number("1e3"));
        assert_eq!(CellValue::infer("NaN"), CellValue::Text("NaN"));
        assert_eq!(CellValue::infer("web01"), CellValue::Text("web01"));
        assert_eq!(CellValue::infer(""), CellValue::Text(""));
    }
}
