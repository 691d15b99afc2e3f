//! SVG writer for serializing accepted and sanitized documents.
//!
//! Output keeps element and attribute order and the names as written, so a
//! document that passes the policy unchanged serializes to a structurally
//! equivalent copy of its input. Comments and processing instructions are
//! never written.
//!
//! # Example
//!
//! ```rust
//! use safe_svg_rs::reader::parse;
//! use safe_svg_rs::writer::{SvgWriter, WriterConfig};
//!
//! let doc = parse(br#"<svg><circle cx="1" fill="red"/></svg>"#).unwrap();
//!
//! let writer = SvgWriter::with_config(WriterConfig::new().with_xml_declaration(false));
//! let svg = writer.write_to_string(&doc).unwrap();
//! assert_eq!(svg, r#"<svg><circle cx="1" fill="red"/></svg>"#);
//! ```

use crate::error::Result;
use crate::objects::{Document, Element, Node};
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{self, Write};

/// Configuration options for the SVG writer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WriterConfig {
    /// Whether to indent the output for readability
    pub indent: bool,
    /// Indentation string (default: two spaces)
    pub indent_string: String,
    /// Whether to include the XML declaration
    pub xml_declaration: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            indent: false,
            indent_string: "  ".to_string(),
            xml_declaration: true,
        }
    }
}

impl WriterConfig {
    /// Creates a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an indented configuration.
    ///
    /// Indentation adds whitespace to mixed content, so indented output is
    /// for reading, not for round-tripping.
    pub fn pretty() -> Self {
        Self {
            indent: true,
            ..Self::default()
        }
    }

    /// Sets whether to indent the output.
    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the indentation string.
    pub fn with_indent_string(mut self, s: impl Into<String>) -> Self {
        self.indent_string = s.into();
        self
    }

    /// Sets whether to include the XML declaration.
    pub fn with_xml_declaration(mut self, xml_declaration: bool) -> Self {
        self.xml_declaration = xml_declaration;
        self
    }
}

/// SVG XML writer.
#[derive(Debug, Clone, Default)]
pub struct SvgWriter {
    config: WriterConfig,
}

impl SvgWriter {
    /// Creates a new writer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new writer with the specified configuration.
    pub fn with_config(config: WriterConfig) -> Self {
        Self { config }
    }

    /// Writes a document to a byte vector.
    pub fn write_to_vec(&self, doc: &Document) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(doc, &mut buffer)?;
        Ok(buffer)
    }

    /// Writes a document to a string.
    pub fn write_to_string(&self, doc: &Document) -> Result<String> {
        let buffer = self.write_to_vec(doc)?;
        String::from_utf8(buffer)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
    }

    /// Writes a document to any Write implementation.
    pub fn write<W: Write>(&self, doc: &Document, writer: W) -> Result<()> {
        let mut xml_writer = if self.config.indent {
            Writer::new_with_indent(writer, b' ', self.config.indent_string.len())
        } else {
            Writer::new(writer)
        };

        if self.config.xml_declaration {
            xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
            if self.config.indent {
                xml_writer.get_mut().write_all(b"\n")?;
            }
        }

        self.write_element(&mut xml_writer, &doc.root)
    }

    fn write_element<W: Write>(&self, writer: &mut Writer<W>, element: &Element) -> Result<()> {
        let name = element.name.raw();
        let mut start = BytesStart::new(name.as_str());
        for attr in &element.attributes {
            let key = attr.name.raw();
            let value = escape_attribute(&attr.value);
            start.push_attribute(Attribute::from((key.as_bytes(), value.as_bytes())));
        }

        if element.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &element.children {
            match child {
                Node::Element(e) => self.write_element(writer, e)?,
                Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
                Node::ProcessingInstruction(_) => {}
            }
        }
        writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
        Ok(())
    }
}

/// Escapes markup characters, and the whitespace characters a parser would
/// otherwise normalize to spaces.
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\t', "&#9;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
}

/// Convenience function to write a document to bytes with default settings.
pub fn to_vec(doc: &Document) -> Result<Vec<u8>> {
    SvgWriter::new().write_to_vec(doc)
}

/// Convenience function to write a document to a string with default settings.
pub fn to_string(doc: &Document) -> Result<String> {
    SvgWriter::new().write_to_string(doc)
}

/// Convenience function to write a document to a writer.
pub fn write<W: Write>(doc: &Document, writer: W) -> Result<()> {
    SvgWriter::new().write(doc, writer)
}
