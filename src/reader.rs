//! Defensive SVG reader.
//!
//! This module turns untrusted bytes into a [`Document`] tree. It uses
//! `quick-xml` strictly as a tokenizer; everything that is dangerous by the
//! mere act of parsing is handled here:
//!
//! - inputs above the size limit are refused before decoding
//! - only UTF-8 is accepted
//! - external entities are refused and nothing is ever fetched
//! - entity expansion is charged against a budget proportional to the input
//! - element nesting is bounded
//!
//! # Example
//!
//! ```rust
//! use safe_svg_rs::reader::{ReaderConfig, SvgReader};
//!
//! let reader = SvgReader::with_config(ReaderConfig::new().with_max_depth(64));
//! let doc = reader.parse(br#"<svg><circle cx="1" fill="red"/></svg>"#).unwrap();
//!
//! assert_eq!(doc.root.name.local, "svg");
//! assert_eq!(doc.root.child_elements().count(), 1);
//! ```

use crate::dtd::{EntityTable, Expander};
use crate::error::ParseError;
use crate::objects::{
    Attribute, Document, Element, ExpandedName, Node, ProcessingInstruction, QualifiedName,
    XMLNS_XML, XMLNS_XMLNS,
};
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashSet;
use std::str;
use tracing::debug;

/// Default maximum input size (10 MiB).
pub const DEFAULT_MAX_INPUT_SIZE: usize = 10 * 1024 * 1024;

/// Default entity expansion budget, as a multiple of the input size.
pub const DEFAULT_MAX_EXPANSION_RATIO: usize = 10;

/// Default maximum element nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Resource limits applied while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReaderConfig {
    /// Inputs larger than this many bytes are refused before parsing
    pub max_input_size: usize,
    /// Entity expansion may produce at most `input size * ratio` bytes
    pub max_expansion_ratio: usize,
    /// Maximum element nesting depth
    pub max_depth: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            max_expansion_ratio: DEFAULT_MAX_EXPANSION_RATIO,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ReaderConfig {
    /// Creates a new configuration with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum input size in bytes.
    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }

    /// Sets the maximum entity expansion ratio.
    pub fn with_max_expansion_ratio(mut self, ratio: usize) -> Self {
        self.max_expansion_ratio = ratio;
        self
    }

    /// Sets the maximum element nesting depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// A defensive SVG parser.
///
/// The reader holds only its configuration, so one instance can be shared
/// across threads and reused for any number of documents.
#[derive(Debug, Clone, Default)]
pub struct SvgReader {
    config: ReaderConfig,
}

impl SvgReader {
    /// Creates a reader with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader with the specified limits.
    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Returns the reader's limits.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Parses raw bytes into a document tree.
    pub fn parse(&self, input: &[u8]) -> Result<Document, ParseError> {
        if input.len() > self.config.max_input_size {
            return Err(ParseError::InputTooLarge {
                size: input.len(),
                limit: self.config.max_input_size,
            });
        }

        let text = decode(input)?;
        let limit = input.len().saturating_mul(self.config.max_expansion_ratio);
        let mut builder = TreeBuilder::new(self.config.max_depth, limit);

        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    return Err(ParseError::Malformed(format!(
                        "{} at position {}",
                        e,
                        reader.error_position()
                    )));
                }
            };

            match event {
                Event::Decl(ref e) => builder.declaration(e)?,
                Event::DocType(ref e) => builder.doctype(str::from_utf8(e)?)?,
                Event::Start(ref e) => builder.start(e, false)?,
                Event::Empty(ref e) => builder.start(e, true)?,
                Event::End(_) => builder.end()?,
                Event::Text(ref e) => builder.text(str::from_utf8(e)?, true)?,
                Event::CData(ref e) => builder.text(str::from_utf8(e)?, false)?,
                Event::PI(ref e) => builder.processing_instruction(str::from_utf8(e)?)?,
                Event::Comment(_) => {}
                Event::Eof => break,
            }
        }

        builder.finish()
    }
}

/// Convenience function to parse bytes with default limits.
pub fn parse(input: &[u8]) -> Result<Document, ParseError> {
    SvgReader::new().parse(input)
}

/// Checks the byte order mark and decodes the input as UTF-8.
fn decode(input: &[u8]) -> Result<&str, ParseError> {
    const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

    if let Some(rest) = input.strip_prefix(UTF8_BOM) {
        return Ok(str::from_utf8(rest)?);
    }
    if input.starts_with(&[0xFE, 0xFF])
        || input.starts_with(&[0xFF, 0xFE])
        || input.starts_with(&[0x00, 0x00, 0xFE, 0xFF])
    {
        return Err(ParseError::EncodingInvalid(
            "UTF-16 and UTF-32 input is not supported".to_string(),
        ));
    }
    Ok(str::from_utf8(input)?)
}

/// Namespace declarations in scope, one frame per open element.
#[derive(Debug, Default)]
struct NamespaceScopes {
    frames: Vec<Vec<(Option<String>, String)>>,
}

impl NamespaceScopes {
    fn push(&mut self, declarations: Vec<(Option<String>, String)>) {
        self.frames.push(declarations);
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn lookup(&self, prefix: Option<&str>) -> Option<String> {
        match prefix {
            Some("xml") => return Some(XMLNS_XML.to_string()),
            Some("xmlns") => return Some(XMLNS_XMLNS.to_string()),
            _ => {}
        }
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter().rev())
            .find(|(p, _)| p.as_deref() == prefix)
            .and_then(|(_, uri)| if uri.is_empty() { None } else { Some(uri.clone()) })
    }

    /// Resolves a raw element or attribute name against the current scopes.
    fn qualify(&self, raw: &str, is_attribute: bool) -> Result<QualifiedName, ParseError> {
        match raw.split_once(':') {
            Some((prefix, local)) => {
                if prefix.is_empty() || local.is_empty() || local.contains(':') {
                    return Err(ParseError::Malformed(format!("invalid name '{}'", raw)));
                }
                if prefix == "xmlns" && !is_attribute {
                    return Err(ParseError::Malformed(format!(
                        "element '{}' uses the reserved xmlns prefix",
                        raw
                    )));
                }
                let namespace = self.lookup(Some(prefix)).ok_or_else(|| {
                    ParseError::Malformed(format!("unbound namespace prefix '{}'", prefix))
                })?;
                Ok(QualifiedName::new(Some(prefix), local, Some(&namespace)))
            }
            None if is_attribute && raw == "xmlns" => {
                Ok(QualifiedName::new(None, raw, Some(XMLNS_XMLNS)))
            }
            // Unprefixed attributes are in no namespace.
            None if is_attribute => Ok(QualifiedName::unqualified(raw)),
            None => Ok(QualifiedName::new(None, raw, self.lookup(None).as_deref())),
        }
    }
}

/// Builds the element tree from tokenizer events.
struct TreeBuilder {
    max_depth: usize,
    expansion_limit: usize,
    expanded_bytes: usize,
    entities: EntityTable,
    scopes: NamespaceScopes,
    stack: Vec<Element>,
    root: Option<Element>,
    processing_instructions: Vec<ProcessingInstruction>,
    seen_markup: bool,
    seen_doctype: bool,
}

impl TreeBuilder {
    fn new(max_depth: usize, expansion_limit: usize) -> Self {
        Self {
            max_depth,
            expansion_limit,
            expanded_bytes: 0,
            entities: EntityTable::empty(),
            scopes: NamespaceScopes::default(),
            stack: Vec::new(),
            root: None,
            processing_instructions: Vec::new(),
            seen_markup: false,
            seen_doctype: false,
        }
    }

    fn started(&self) -> bool {
        self.root.is_some() || !self.stack.is_empty()
    }

    /// Expands entity references, charging the document-wide budget.
    fn expand(&mut self, raw: &str, attribute: bool) -> Result<String, ParseError> {
        if !raw.contains('&') && !(attribute && raw.contains(['\t', '\n', '\r'])) {
            return Ok(raw.to_string());
        }
        let mut expander =
            Expander::resume(&self.entities, self.expansion_limit, self.expanded_bytes);
        let value = if attribute {
            expander.expand_attribute(raw)?
        } else {
            expander.expand_text(raw)?
        };
        self.expanded_bytes = expander.used();
        Ok(value)
    }

    fn declaration(&mut self, decl: &BytesDecl<'_>) -> Result<(), ParseError> {
        if self.seen_markup {
            return Err(ParseError::malformed(
                "XML declaration must be at the start of the document",
            ));
        }
        self.seen_markup = true;

        if let Some(encoding) = decl.encoding() {
            let encoding = encoding?;
            let name = str::from_utf8(&encoding)?;
            if !name.eq_ignore_ascii_case("utf-8") && !name.eq_ignore_ascii_case("utf8") {
                return Err(ParseError::EncodingInvalid(format!(
                    "declared encoding '{}' is not UTF-8",
                    name
                )));
            }
        }
        Ok(())
    }

    fn doctype(&mut self, content: &str) -> Result<(), ParseError> {
        if self.started() || self.seen_doctype {
            return Err(ParseError::malformed("misplaced DOCTYPE declaration"));
        }
        self.seen_markup = true;
        self.seen_doctype = true;
        self.entities = EntityTable::from_doctype(content)?;
        debug!(entities = self.entities.len(), "read DOCTYPE");
        Ok(())
    }

    fn start(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<(), ParseError> {
        self.seen_markup = true;

        if self.stack.len() >= self.max_depth {
            return Err(ParseError::NestingTooDeep(self.max_depth));
        }
        if self.stack.is_empty() && self.root.is_some() {
            return Err(ParseError::malformed("document has more than one root element"));
        }

        let raw_name = str::from_utf8(e.name().as_ref())?.to_string();

        let mut raw_attrs = Vec::new();
        let mut declarations = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = str::from_utf8(attr.key.as_ref())?.to_string();
            let value = self.expand(str::from_utf8(&attr.value)?, true)?;

            if key == "xmlns" {
                declarations.push((None, value.clone()));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                if value.is_empty() {
                    return Err(ParseError::Malformed(format!(
                        "namespace prefix '{}' cannot be undeclared",
                        prefix
                    )));
                }
                declarations.push((Some(prefix.to_string()), value.clone()));
            }
            raw_attrs.push((key, value));
        }

        // Declarations on an element apply to its own name and attributes.
        self.scopes.push(declarations);
        let mut element = Element::new(self.scopes.qualify(&raw_name, false)?);

        let mut seen: HashSet<ExpandedName> = HashSet::new();
        for (key, value) in raw_attrs {
            let name = self.scopes.qualify(&key, true)?;
            if !seen.insert(name.expanded()) {
                return Err(ParseError::Malformed(format!(
                    "duplicate attribute '{}' on '{}'",
                    key, raw_name
                )));
            }
            element.attributes.push(Attribute::new(name, value));
        }

        if empty {
            self.scopes.pop();
            self.attach(Node::Element(element))
        } else {
            self.stack.push(element);
            Ok(())
        }
    }

    fn end(&mut self) -> Result<(), ParseError> {
        let element = self
            .stack
            .pop()
            .ok_or_else(|| ParseError::malformed("unexpected end tag"))?;
        self.scopes.pop();
        self.attach(Node::Element(element))
    }

    fn text(&mut self, raw: &str, expand: bool) -> Result<(), ParseError> {
        if self.stack.is_empty() {
            if raw.trim().is_empty() {
                return Ok(());
            }
            return Err(ParseError::malformed("text outside the root element"));
        }

        let value = if expand {
            self.expand(raw, false)?
        } else {
            raw.to_string()
        };
        if value.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.stack.last_mut() {
            // Adjacent text and CDATA sections collapse into one node.
            if let Some(Node::Text(previous)) = parent.children.last_mut() {
                previous.push_str(&value);
            } else {
                parent.children.push(Node::Text(value));
            }
        }
        Ok(())
    }

    fn processing_instruction(&mut self, raw: &str) -> Result<(), ParseError> {
        self.seen_markup = true;

        let raw = raw.trim_start();
        let target_end = raw.find(char::is_whitespace).unwrap_or(raw.len());
        let pi = ProcessingInstruction {
            target: raw[..target_end].to_string(),
            content: raw[target_end..].trim_start().to_string(),
        };
        if pi.target.is_empty() {
            return Err(ParseError::malformed("processing instruction without a target"));
        }
        self.attach(Node::ProcessingInstruction(pi))
    }

    fn attach(&mut self, node: Node) -> Result<(), ParseError> {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
            return Ok(());
        }

        match node {
            Node::Element(element) => {
                if self.root.is_some() {
                    return Err(ParseError::malformed(
                        "document has more than one root element",
                    ));
                }
                self.root = Some(element);
            }
            Node::ProcessingInstruction(pi) => self.processing_instructions.push(pi),
            Node::Text(_) => return Err(ParseError::malformed("text outside the root element")),
        }
        Ok(())
    }

    fn finish(self) -> Result<Document, ParseError> {
        if let Some(open) = self.stack.last() {
            return Err(ParseError::Malformed(format!(
                "unclosed element '{}'",
                open.name
            )));
        }
        let root = self
            .root
            .ok_or_else(|| ParseError::malformed("document has no root element"))?;

        debug!(
            elements = root.element_count(),
            expanded_bytes = self.expanded_bytes,
            "parsed document"
        );

        Ok(Document {
            processing_instructions: self.processing_instructions,
            root,
        })
    }
}
