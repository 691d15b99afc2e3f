//! URI reference classification for reference-bearing attributes.
//!
//! Values are normalized the way browsers do before scheme detection: leading
//! and trailing whitespace is trimmed and embedded tab, newline and carriage
//! return characters are removed, so `java&#x0A;script:` is still seen as the
//! `javascript` scheme. Any other control character makes the reference
//! [`UriReference::Invalid`], which no policy allows.

use std::fmt;

/// A classified URI reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriReference {
    /// Same-document reference, e.g. `#gradient`
    Fragment,
    /// Relative path, including the empty reference
    Relative,
    /// Scheme-relative reference, e.g. `//example.com/a.png`
    NetworkPath,
    /// Reference with an explicit scheme (lowercased)
    Absolute {
        /// Scheme without the trailing colon
        scheme: String,
        /// Everything after the colon
        rest: String,
    },
    /// Unparseable or ambiguous reference
    Invalid,
}

impl UriReference {
    /// Classifies an attribute value.
    pub fn parse(value: &str) -> Self {
        let normalized = match normalize(value) {
            Some(n) => n,
            None => return UriReference::Invalid,
        };

        if normalized.starts_with('#') {
            return UriReference::Fragment;
        }
        if normalized.starts_with("//") {
            return UriReference::NetworkPath;
        }

        // A colon before any path, query or fragment delimiter starts a scheme.
        let delimiter = normalized.find(['/', '?', '#']).unwrap_or(normalized.len());
        match normalized[..delimiter].find(':') {
            None => UriReference::Relative,
            Some(colon) => {
                let scheme = &normalized[..colon];
                if is_valid_scheme(scheme) {
                    UriReference::Absolute {
                        scheme: scheme.to_ascii_lowercase(),
                        rest: normalized[colon + 1..].to_string(),
                    }
                } else {
                    UriReference::Invalid
                }
            }
        }
    }

    /// Returns the scheme of an absolute reference.
    pub fn scheme(&self) -> Option<&str> {
        match self {
            UriReference::Absolute { scheme, .. } => Some(scheme),
            _ => None,
        }
    }

    /// Returns the lowercased media type of a `data:` reference.
    pub fn data_media_type(&self) -> Option<String> {
        match self {
            UriReference::Absolute { scheme, rest } if scheme == "data" => {
                let end = rest.find([';', ',']).unwrap_or(rest.len());
                Some(rest[..end].trim().to_ascii_lowercase())
            }
            _ => None,
        }
    }

    /// Returns true for references that execute script when followed.
    pub fn is_scripting(&self) -> bool {
        match self.scheme() {
            Some("javascript") | Some("vbscript") | Some("livescript") => true,
            Some("data") => matches!(
                self.data_media_type().as_deref(),
                Some("text/html") | Some("image/svg+xml") | Some("application/xhtml+xml")
            ),
            _ => false,
        }
    }
}

impl fmt::Display for UriReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriReference::Fragment => write!(f, "fragment"),
            UriReference::Relative => write!(f, "relative"),
            UriReference::NetworkPath => write!(f, "network-path"),
            UriReference::Absolute { scheme, .. } => write!(f, "{}:", scheme),
            UriReference::Invalid => write!(f, "invalid"),
        }
    }
}

/// Extracts the targets of every `url(...)` in a presentation attribute or
/// CSS text.
///
/// Quotes around the target are removed. An unterminated `url(` runs to the
/// end of the value. Values containing backslashes yield a single
/// [`UriReference::Invalid`], since CSS escapes can hide a scheme.
pub fn func_iri_references(value: &str) -> Vec<UriReference> {
    if value.contains('\\') {
        return vec![UriReference::Invalid];
    }

    let lower = value.to_ascii_lowercase();
    let mut references = Vec::new();
    let mut offset = 0;

    while let Some(found) = lower[offset..].find("url(") {
        let start = offset + found + 4;
        let end = value[start..]
            .find(')')
            .map(|i| start + i)
            .unwrap_or(value.len());

        let target = value[start..end]
            .trim()
            .trim_matches(|c| c == '"' || c == '\'');
        references.push(UriReference::parse(target));

        offset = (end + 1).min(value.len());
    }

    references
}

/// Trims the value and removes tab, newline and carriage return characters.
/// Returns `None` if any other control character is present.
fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let mut normalized = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        match c {
            '\t' | '\n' | '\r' => {}
            c if c.is_control() => return None,
            c => normalized.push(c),
        }
    }
    Some(normalized)
}

/// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
pub(crate) fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}
