//! Owned XML fragments
//!
//! An [`Element`] is a detached, value-semantic piece of XML. New content
//! (table markup, chart caches, cloned series) is built as fragments and then
//! grafted into an [`XmlTree`](crate::XmlTree), so nothing built from a
//! prototype can alias the prototype's nodes.

/// Content of an element: a child element or a run of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Element(Element),
    Text(String),
}

/// An owned XML element with qualified name, attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name (e.g. `w:tbl`)
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Child content in document order
    pub children: Vec<Content>,
}

impl Element {
    /// Create an element with no attributes or children
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute (builder style)
    pub fn with_attr<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Add a child element (builder style)
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Content::Element(child));
        self
    }

    /// Add several child elements (builder style)
    pub fn with_children<I: IntoIterator<Item = Element>>(mut self, children: I) -> Self {
        self.children
            .extend(children.into_iter().map(Content::Element));
        self
    }

    /// Add a text child (builder style)
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.children.push(Content::Text(text.into()));
        self
    }

    /// Append a child element
    pub fn push(&mut self, child: Element) {
        self.children.push(Content::Element(child));
    }

    /// Get an attribute value
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value
    pub fn set_attribute<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Child elements in order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Content::Element(e) => Some(e),
            Content::Text(_) => None,
        })
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// First child element with the given name, mutably
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|c| match c {
            Content::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// Position of the first child element with the given name
    pub fn child_position(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|c| matches!(c, Content::Element(e) if e.name == name))
    }

    /// First descendant (pre-order, excluding self) with the given name
    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in self.elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// First descendant (pre-order, excluding self) with the given name, mutably
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        for content in self.children.iter_mut() {
            if let Content::Element(child) = content {
                if child.name == name {
                    return Some(child);
                }
                if let Some(found) = child.find_mut(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Concatenated text of all descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for content in &self.children {
            match content {
                Content::Text(t) => out.push_str(t),
                Content::Element(e) => e.collect_text(out),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let element = Element::new("c:ser")
            .with_child(Element::new("c:idx").with_attr("val", "0"))
            .with_child(
                Element::new("c:spPr")
                    .with_child(Element::new("a:solidFill").with_text("x")),
            );

        assert_eq!(element.child("c:idx").and_then(|e| e.attribute("val")), Some("0"));
        assert_eq!(element.find("a:solidFill").map(Element::text).as_deref(), Some("x"));
        assert_eq!(element.child_position("c:spPr"), Some(1));
        assert!(element.child("c:val").is_none());
    }

    #[test]
    fn test_set_attribute_replaces() {
        let mut element = Element::new("c:order").with_attr("val", "0");
        element.set_attribute("val", "3");
        assert_eq!(element.attributes, vec![("val".to_string(), "3".to_string())]);
    }

    #[test]
    fn test_find_mut() {
        let mut element = Element::new("root")
            .with_child(Element::new("a").with_child(Element::new("b")));
        if let Some(b) = element.find_mut("b") {
            b.set_attribute("x", "1");
        }
        assert_eq!(element.find("b").and_then(|b| b.attribute("x")), Some("1"));
    }
}
