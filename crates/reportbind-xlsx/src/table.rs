//! Named table definitions (`xl/tables/tableN.xml`)

use reportbind_core::{column, TabularResult};
use reportbind_opc::{Element, NodeId, XmlTree};

/// One `tableColumn` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    /// 1-based column id
    pub id: u32,
    /// Column name, identical to the header cell text
    pub name: String,
}

/// Range and columns of a named table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    /// A1-style range including the header row (e.g. `A1:C10`)
    pub range: String,
    /// One column per field, in field order
    pub columns: Vec<TableColumn>,
}

impl TableDefinition {
    /// Table definition covering the header plus every data row of `data`
    pub fn for_result(data: &TabularResult) -> Self {
        let columns = data
            .fields()
            .iter()
            .enumerate()
            .map(|(i, name)| TableColumn {
                id: i as u32 + 1,
                name: name.clone(),
            })
            .collect();

        Self {
            range: range_address(data.column_count(), data.row_count()),
            columns,
        }
    }

    /// Write the range and columns into a parsed table part.
    ///
    /// `autoFilter/@ref` follows the table range when present.
    pub fn apply(&self, tree: &mut XmlTree) {
        let root = tree.root();
        tree.set_attribute(root, "ref", &self.range);

        if let Some(filter) = tree.first_child(root, "autoFilter") {
            tree.set_attribute(filter, "ref", &self.range);
        }

        let columns = match tree.first_child(root, "tableColumns") {
            Some(node) => node,
            None => insert_table_columns(tree, root),
        };
        tree.clear_children(columns);
        tree.set_attribute(columns, "count", &self.columns.len().to_string());

        for column in &self.columns {
            let element = Element::new("tableColumn")
                .with_attr("id", column.id.to_string())
                .with_attr("name", column.name.as_str());
            let node = tree.build(&element);
            tree.append_child(columns, node);
        }
    }
}

/// Range covering `fields` columns and a header plus `rows` data rows.
///
/// A zero-field result still addresses column A.
pub fn range_address(fields: usize, rows: usize) -> String {
    let last_column = column::letters_for_index(fields.saturating_sub(1));
    format!("A1:{}{}", last_column, rows + 1)
}

fn insert_table_columns(tree: &mut XmlTree, root: NodeId) -> NodeId {
    let node = tree.new_element("tableColumns");
    // tableColumns follows autoFilter/sortState when they exist.
    let anchor = ["sortState", "autoFilter"]
        .iter()
        .find_map(|name| tree.first_child(root, name));
    match anchor {
        Some(anchor) => tree.insert_after(anchor, node),
        None => tree.prepend_child(root, node),
    }
    node
}
