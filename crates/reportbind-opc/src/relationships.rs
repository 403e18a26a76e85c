//! Part relationships (`_rels/*.rels`)

use crate::element::Element;
use crate::error::OpcResult;
use crate::xml::XmlTree;

const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Relationship type suffixes. Transitional and strict schemas share the
/// last path segment, so types are matched with `ends_with`.
pub mod rel_types {
    pub const OFFICE_DOCUMENT: &str = "/officeDocument";
    pub const CHART: &str = "/chart";
    pub const PACKAGE: &str = "/package";
    pub const HEADER: &str = "/header";
    pub const FOOTER: &str = "/footer";
    pub const FOOTNOTES: &str = "/footnotes";
    pub const ENDNOTES: &str = "/endnotes";
    pub const WORKSHEET: &str = "/worksheet";
    pub const TABLE: &str = "/table";
}

/// One relationship entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship type ends with the given suffix
    pub fn is_type(&self, suffix: &str) -> bool {
        self.rel_type.ends_with(suffix)
    }
}

/// The relationships of one part
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    /// Parse a `.rels` part
    pub fn parse(bytes: &[u8]) -> OpcResult<Self> {
        let tree = XmlTree::parse(bytes)?;
        let items = tree
            .children_named(tree.root(), "Relationship")
            .into_iter()
            .filter_map(|node| {
                let id = tree.attribute(node, "Id")?;
                let target = tree.attribute(node, "Target")?;
                Some(Relationship {
                    id: id.to_string(),
                    rel_type: tree.attribute(node, "Type").unwrap_or_default().to_string(),
                    target: target.to_string(),
                    external: tree.attribute(node, "TargetMode") == Some("External"),
                })
            })
            .collect();
        Ok(Self { items })
    }

    /// Serialize back to a `.rels` part
    pub fn to_bytes(&self) -> OpcResult<Vec<u8>> {
        let root = Element::new("Relationships")
            .with_attr("xmlns", RELATIONSHIPS_NS)
            .with_children(self.items.iter().map(|rel| {
                let element = Element::new("Relationship")
                    .with_attr("Id", rel.id.as_str())
                    .with_attr("Type", rel.rel_type.as_str())
                    .with_attr("Target", rel.target.as_str());
                if rel.external {
                    element.with_attr("TargetMode", "External")
                } else {
                    element
                }
            }));
        XmlTree::from_element(&root).to_bytes()
    }

    /// Look up a relationship by id
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Relationships whose type ends with `suffix`
    pub fn of_type<'a>(&'a self, suffix: &'a str) -> impl Iterator<Item = &'a Relationship> {
        self.items.iter().filter(move |r| r.is_type(suffix))
    }

    /// Remove a relationship by id
    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let position = self.items.iter().position(|r| r.id == id)?;
        Some(self.items.remove(position))
    }

    /// All relationships in order
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no relationships
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Name of the relationships part that belongs to `part`
///
/// `word/document.xml` -> `word/_rels/document.xml.rels`
pub fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Part that a relationships part belongs to, the inverse of
/// [`rels_part_name`]. The package relationships `_rels/.rels` give `""`.
pub fn source_part_name(rels_part: &str) -> Option<String> {
    let stem = rels_part.strip_suffix(".rels")?;
    let (dir, file) = stem.rsplit_once("_rels/")?;
    if dir.is_empty() || dir.ends_with('/') {
        Some(format!("{}{}", dir, file))
    } else {
        None
    }
}

/// Resolve a relationship target against the part that owns it
///
/// `("word/charts/chart1.xml", "../embeddings/a.xlsx")` -> `word/embeddings/a.xlsx`
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}
