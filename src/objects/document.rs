//! The parsed SVG element tree.
//!
//! A [`Document`] is built once per input by the reader, walked once by the
//! verdict engine, and then either discarded or serialized as the sanitized
//! output. Every node is owned by exactly one parent.

use super::common::QualifiedName;

/// An attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    /// Attribute name
    pub name: QualifiedName,
    /// Attribute value with entities expanded
    pub value: String,
}

impl Attribute {
    /// Creates a new attribute.
    pub fn new(name: QualifiedName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// A processing instruction such as `<?xml-stylesheet href="a.css"?>`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessingInstruction {
    /// PI target (`xml-stylesheet`)
    pub target: String,
    /// Everything after the target
    pub content: String,
}

/// A child of an element, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    /// A nested element
    Element(Element),
    /// Character data (text and CDATA sections)
    Text(String),
    /// A processing instruction inside the root element
    ProcessingInstruction(ProcessingInstruction),
}

/// An SVG element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    /// Element name
    pub name: QualifiedName,
    /// Attributes in document order
    pub attributes: Vec<Attribute>,
    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an element with no attributes or children.
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns the value of the attribute written as `raw_name`.
    pub fn attribute(&self, raw_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.raw() == raw_name)
            .map(|a| a.value.as_str())
    }

    /// Iterates over child elements, skipping text and processing instructions.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Returns the concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Returns true if the element has neither attributes nor children.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }

    /// Counts this element and all of its descendant elements.
    pub fn element_count(&self) -> usize {
        1 + self.child_elements().map(Element::element_count).sum::<usize>()
    }
}

/// A parsed SVG document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    /// Processing instructions outside the root element, in document order
    pub processing_instructions: Vec<ProcessingInstruction>,
    /// The root element
    pub root: Element,
}

impl Document {
    /// Creates a document with the given root element.
    pub fn new(root: Element) -> Self {
        Self {
            processing_instructions: Vec::new(),
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle() -> Element {
        let mut circle = Element::new(QualifiedName::unqualified("circle"));
        circle
            .attributes
            .push(Attribute::new(QualifiedName::unqualified("cx"), "1"));
        circle
    }

    #[test]
    fn test_attribute_lookup_by_raw_name() {
        let c = circle();
        assert_eq!(c.attribute("cx"), Some("1"));
        assert_eq!(c.attribute("cy"), None);
    }

    #[test]
    fn test_mixed_content() {
        let mut text = Element::new(QualifiedName::unqualified("text"));
        text.children.push(Node::Text("Hello ".to_string()));
        let mut tspan = Element::new(QualifiedName::unqualified("tspan"));
        tspan.children.push(Node::Text("big".to_string()));
        text.children.push(Node::Element(tspan));
        text.children.push(Node::Text(" world".to_string()));

        assert_eq!(text.text(), "Hello  world");
        assert_eq!(text.child_elements().count(), 1);
        assert_eq!(text.element_count(), 2);
    }

    #[test]
    fn test_is_empty() {
        assert!(Element::new(QualifiedName::unqualified("g")).is_empty());
        assert!(!circle().is_empty());
    }
}
