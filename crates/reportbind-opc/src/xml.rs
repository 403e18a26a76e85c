//! Arena-backed XML tree
//!
//! Nodes live in a `Vec` and are addressed by [`NodeId`]. Detaching or
//! inserting a node only edits parent/child links, so ids collected before an
//! edit stay valid afterwards. Queries that return several nodes return a
//! snapshot `Vec<NodeId>` rather than a live iterator.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::element::{Content, Element};
use crate::error::{OpcError, OpcResult};

/// Handle to a node in an [`XmlTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A mutable XML document
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl XmlTree {
    /// Parse a document. Whitespace is preserved exactly.
    pub fn parse(bytes: &[u8]) -> OpcResult<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();

        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;

        loop {
            let parsed = match reader.read_event_into(&mut buf)? {
                Event::Start(e) => Some((element_data(&e)?, true)),
                Event::Empty(e) => Some((element_data(&e)?, false)),
                Event::End(_) => {
                    stack.pop();
                    None
                }
                Event::Text(e) => Some((NodeData::Text(e.unescape()?.into_owned()), false)),
                Event::CData(e) => Some((
                    NodeData::CData(String::from_utf8_lossy(&e.into_inner()).into_owned()),
                    false,
                )),
                Event::Comment(e) => Some((
                    NodeData::Comment(String::from_utf8_lossy(&e.into_inner()).into_owned()),
                    false,
                )),
                Event::Eof => break,
                // Declaration, processing instructions and doctype are
                // regenerated or dropped on write.
                _ => None,
            };
            buf.clear();

            let Some((data, opens)) = parsed else {
                continue;
            };

            let parent = stack.last().copied();
            let is_element = matches!(data, NodeData::Element { .. });
            if parent.is_none() && !is_element {
                // Whitespace or comments outside the document element.
                continue;
            }

            let id = NodeId(nodes.len());
            nodes.push(Node {
                data,
                parent,
                children: Vec::new(),
            });

            match parent {
                Some(p) => nodes[p.0].children.push(id),
                None => {
                    if root.is_some() {
                        return Err(OpcError::invalid_xml(
                            "<tree>",
                            "more than one document element",
                        ));
                    }
                    root = Some(id);
                }
            }

            if opens {
                stack.push(id);
            }
        }

        let root = root.ok_or_else(|| OpcError::invalid_xml("<tree>", "no document element"))?;
        Ok(Self { nodes, root })
    }

    /// Build a document whose root is the given fragment
    pub fn from_element(element: &Element) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.build(element);
        tree
    }

    /// Serialize with a standalone UTF-8 declaration
    pub fn to_bytes(&self) -> OpcResult<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        writer.get_mut().extend_from_slice(b"\r\n");
        self.write_node(&mut writer, self.root)?;
        Ok(writer.into_inner())
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> OpcResult<()> {
        let node = &self.nodes[id.0];
        match &node.data {
            NodeData::Element { name, attributes } => {
                let mut start = BytesStart::new(name.as_str());
                for (key, value) in attributes {
                    start.push_attribute((key.as_str(), value.as_str()));
                }
                if node.children.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start))?;
                    for child in &node.children {
                        self.write_node(writer, *child)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
                }
            }
            NodeData::Text(text) => {
                writer.write_event(Event::Text(BytesText::new(text)))?;
            }
            NodeData::CData(text) => {
                writer.write_event(Event::CData(BytesCData::new(text.as_str())))?;
            }
            NodeData::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
            }
        }
        Ok(())
    }

    /// The document element
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Qualified name of an element node
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether the node is an element with the given qualified name
    pub fn is(&self, id: NodeId, name: &str) -> bool {
        self.name(id) == Some(name)
    }

    /// Attribute value of an element node
    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Set an attribute on an element node, replacing any existing value
    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.nodes[id.0].data {
            match attributes.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1 = value.to_string(),
                None => attributes.push((key.to_string(), value.to_string())),
            }
        }
    }

    /// Parent of a node (`None` for the root and for detached nodes)
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// All children (elements and text) in order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Child elements in order
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(move |c| self.name(*c).is_some())
    }

    /// First child element with the given name
    pub fn first_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.child_elements(id).find(|c| self.is(*c, name))
    }

    /// Child elements with the given name
    pub fn children_named(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.child_elements(id)
            .filter(|c| self.is(*c, name))
            .collect()
    }

    /// Descendant elements in document order (excluding `id` itself)
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id.0].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            if self.name(next).is_some() {
                out.push(next);
                stack.extend(self.nodes[next.0].children.iter().rev().copied());
            }
        }
        out
    }

    /// Descendant elements with the given name, in document order
    pub fn descendants_named(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|d| self.is(*d, name))
            .collect()
    }

    /// First descendant element with the given name
    pub fn first_descendant(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(id).into_iter().find(|d| self.is(*d, name))
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |n| self.parent(*n))
    }

    /// Whether the node is still reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).any(|a| a == self.root)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].data {
            NodeData::Text(t) | NodeData::CData(t) => out.push_str(t),
            NodeData::Element { .. } => {
                for child in &self.nodes[id.0].children {
                    self.collect_text(*child, out);
                }
            }
            NodeData::Comment(_) => {}
        }
    }

    /// Replace all children of an element with a single text node
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        let text_node = self.push_node(NodeData::Text(text.to_string()));
        self.append_child(id, text_node);
    }

    /// Detach every child of a node
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    /// Create a detached element
    pub fn new_element(&mut self, name: &str) -> NodeId {
        self.push_node(NodeData::Element {
            name: name.to_string(),
            attributes: Vec::new(),
        })
    }

    /// Create detached nodes from a fragment, returning the new subtree root
    pub fn build(&mut self, element: &Element) -> NodeId {
        let id = self.push_node(NodeData::Element {
            name: element.name.clone(),
            attributes: element.attributes.clone(),
        });
        for content in &element.children {
            let child = match content {
                Content::Element(e) => self.build(e),
                Content::Text(t) => self.push_node(NodeData::Text(t.clone())),
            };
            self.append_child(id, child);
        }
        id
    }

    /// Deep copy of a subtree as an owned fragment.
    ///
    /// Comments are dropped and CDATA becomes text. Returns `None` when `id`
    /// is not an element.
    pub fn extract(&self, id: NodeId) -> Option<Element> {
        let (name, attributes) = match &self.nodes[id.0].data {
            NodeData::Element { name, attributes } => (name.clone(), attributes.clone()),
            _ => return None,
        };
        let mut element = Element {
            name,
            attributes,
            children: Vec::new(),
        };
        for child in &self.nodes[id.0].children {
            match &self.nodes[child.0].data {
                NodeData::Element { .. } => {
                    if let Some(e) = self.extract(*child) {
                        element.children.push(Content::Element(e));
                    }
                }
                NodeData::Text(t) | NodeData::CData(t) => {
                    element.children.push(Content::Text(t.clone()))
                }
                NodeData::Comment(_) => {}
            }
        }
        Some(element)
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `node` as the first child of `parent`
    pub fn prepend_child(&mut self, parent: NodeId, node: NodeId) {
        self.detach(node);
        self.nodes[node.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(0, node);
    }

    /// Insert `node` immediately before `reference` (which must have a parent)
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        self.insert_at_offset(reference, node, 0);
    }

    /// Insert `node` immediately after `reference` (which must have a parent)
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        self.insert_at_offset(reference, node, 1);
    }

    fn insert_at_offset(&mut self, reference: NodeId, node: NodeId, offset: usize) {
        self.detach(node);
        let Some(parent) = self.parent(reference) else {
            log::warn!("insert relative to a detached node ignored");
            return;
        };
        let siblings = &mut self.nodes[parent.0].children;
        let position = siblings
            .iter()
            .position(|c| *c == reference)
            .map(|p| p + offset)
            .unwrap_or(siblings.len());
        siblings.insert(position, node);
        self.nodes[node.0].parent = Some(parent);
    }

    /// Remove a node from its parent. The node and its subtree stay in the
    /// arena, so the id can be re-inserted.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Put `new` where `old` is and detach `old`
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        self.insert_before(old, new);
        self.detach(old);
    }

    /// Replace `node` by its own children (removing the wrapper element)
    pub fn unwrap(&mut self, node: NodeId) {
        let children = self.nodes[node.0].children.clone();
        for child in children {
            self.insert_before(node, child);
        }
        self.detach(node);
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }
}

fn element_data(e: &BytesStart<'_>) -> OpcResult<NodeData> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|err| OpcError::invalid_xml("<tree>", err.to_string()))?
        .to_string();

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| OpcError::invalid_xml("<tree>", err.to_string()))?
            .to_string();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    Ok(NodeData::Element { name, attributes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="urn:w"><w:body><w:p><w:r><w:t xml:space="preserve">a &amp; b </w:t></w:r></w:p><w:p/></w:body></w:document>"#;

    #[test]
    fn test_parse_and_query() {
        let tree = XmlTree::parse(DOC.as_bytes()).unwrap();
        let root = tree.root();
        assert_eq!(tree.name(root), Some("w:document"));
        assert_eq!(tree.attribute(root, "xmlns:w"), Some("urn:w"));

        let body = tree.first_child(root, "w:body").unwrap();
        assert_eq!(tree.children_named(body, "w:p").len(), 2);

        let t = tree.first_descendant(root, "w:t").unwrap();
        assert_eq!(tree.text(t), "a & b ");
        assert_eq!(tree.attribute(t, "xml:space"), Some("preserve"));
    }

    #[test]
    fn test_round_trip_preserves_content() {
        let tree = XmlTree::parse(DOC.as_bytes()).unwrap();
        let bytes = tree.to_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(text.contains("<w:t xml:space=\"preserve\">a &amp; b </w:t>"));
        assert!(text.contains("<w:p/>"));

        let reparsed = XmlTree::parse(text.as_bytes()).unwrap();
        assert_eq!(reparsed.text(reparsed.root()), "a & b ");
    }

    #[test]
    fn test_descendants_are_document_order() {
        let tree = XmlTree::parse(b"<a><b><c/></b><d/></a>").unwrap();
        let names: Vec<_> = tree
            .descendants(tree.root())
            .into_iter()
            .filter_map(|id| tree.name(id).map(str::to_string))
            .collect();
        assert_eq!(names, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_ids_survive_edits() {
        let mut tree = XmlTree::parse(b"<a><b/><c/><d/></a>").unwrap();
        let root = tree.root();
        let snapshot = tree.descendants(root);
        let (b, c, d) = (snapshot[0], snapshot[1], snapshot[2]);

        tree.detach(b);
        let e = tree.new_element("e");
        tree.replace(c, e);

        assert!(!tree.is_attached(b));
        assert!(!tree.is_attached(c));
        assert!(tree.is_attached(d));
        assert_eq!(tree.name(d), Some("d"));

        let names: Vec<_> = tree
            .child_elements(root)
            .filter_map(|id| tree.name(id).map(str::to_string))
            .collect();
        assert_eq!(names, vec!["e", "d"]);
    }

    #[test]
    fn test_build_and_extract() {
        let mut tree = XmlTree::parse(b"<root/>").unwrap();
        let fragment = Element::new("x:item")
            .with_attr("id", "1")
            .with_child(Element::new("x:v").with_text("<42>"));

        let id = tree.build(&fragment);
        tree.append_child(tree.root(), id);

        assert_eq!(tree.extract(id), Some(fragment));
        let text = String::from_utf8(tree.to_bytes().unwrap()).unwrap();
        assert!(text.contains("<x:item id=\"1\"><x:v>&lt;42&gt;</x:v></x:item>"));
    }

    #[test]
    fn test_unwrap_and_insert() {
        let mut tree = XmlTree::parse(b"<a><w><b/><c/></w><d/></a>").unwrap();
        let root = tree.root();
        let w = tree.first_child(root, "w").unwrap();
        tree.unwrap(w);

        let d = tree.first_child(root, "d").unwrap();
        let e = tree.new_element("e");
        tree.insert_after(d, e);
        let f = tree.new_element("f");
        tree.prepend_child(root, f);

        let text = String::from_utf8(tree.to_bytes().unwrap()).unwrap();
        assert!(text.ends_with("<a><f/><b/><c/><d/><e/></a>"));
    }

    #[test]
    fn test_set_text() {
        let mut tree = XmlTree::parse(b"<a><b>old<c/></b></a>").unwrap();
        let b = tree.first_child(tree.root(), "b").unwrap();
        tree.set_text(b, "new");
        assert_eq!(tree.text(b), "new");
        assert!(tree.first_child(b, "c").is_none());
    }

    #[test]
    fn test_parse_errors() {
        assert!(XmlTree::parse(b"").is_err());
        assert!(XmlTree::parse(b"<a></b>").is_err());
    }
}
