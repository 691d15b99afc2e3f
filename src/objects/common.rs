//! Names and namespaces shared across the SVG object model.
//!
//! - [`QualifiedName`] - A name as written in the document, with its resolved namespace
//! - [`ExpandedName`] - The (namespace, local name) identity used for policy lookups

use crate::error::{Error, Result};
use std::fmt;

// ============================================================================
// Namespaces
// ============================================================================

/// SVG namespace
pub const XMLNS_SVG: &str = "http://www.w3.org/2000/svg";

/// XLink namespace (`xlink:href`)
pub const XMLNS_XLINK: &str = "http://www.w3.org/1999/xlink";

/// Namespace bound to the reserved `xml` prefix
pub const XMLNS_XML: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace of namespace declarations (`xmlns`, `xmlns:*`)
pub const XMLNS_XMLNS: &str = "http://www.w3.org/2000/xmlns/";

/// Maps the prefixes a policy key may use to their namespace.
///
/// Only the well-known prefixes are accepted; documents may bind any prefix,
/// but policy identity is always the namespace, never the prefix.
fn well_known_prefix(prefix: &str) -> Option<&'static str> {
    match prefix {
        "xlink" => Some(XMLNS_XLINK),
        "xml" => Some(XMLNS_XML),
        "xmlns" => Some(XMLNS_XMLNS),
        _ => None,
    }
}

// ============================================================================
// Expanded names
// ============================================================================

/// A namespace-resolved name: the identity the policy catalog matches on.
///
/// `xlink:href` written with any prefix bound to the XLink namespace has the
/// same expanded name, so remapped prefixes cannot bypass the allowlist.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpandedName {
    /// Namespace URI, or `None` for names in no namespace
    pub namespace: Option<String>,
    /// Local part of the name
    pub local: String,
}

impl ExpandedName {
    /// Creates an expanded name in the given namespace.
    pub fn new(namespace: Option<&str>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local: local.into(),
        }
    }

    /// Creates an expanded name in no namespace.
    pub fn unqualified(local: impl Into<String>) -> Self {
        Self::new(None, local)
    }

    /// Parses a policy key such as `"fill"` or `"xlink:href"`.
    ///
    /// Prefixes other than `xlink`, `xml` and `xmlns` are rejected.
    pub fn parse_key(key: &str) -> Result<Self> {
        match key.split_once(':') {
            None if !key.is_empty() => Ok(Self::unqualified(key)),
            Some((prefix, local)) if !local.is_empty() => match well_known_prefix(prefix) {
                Some(ns) => Ok(Self::new(Some(ns), local)),
                None => Err(Error::InvalidPolicy(format!(
                    "unknown namespace prefix '{}' in policy key '{}'",
                    prefix, key
                ))),
            },
            _ => Err(Error::InvalidPolicy(format!("invalid policy key '{}'", key))),
        }
    }

    /// Returns true if this name is in the given namespace.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace {
            Some(ref ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

// ============================================================================
// Qualified names
// ============================================================================

/// An element or attribute name as it appears in the document.
///
/// Keeps the prefix for faithful serialization alongside the namespace the
/// reader resolved it to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QualifiedName {
    /// Prefix as written (`xlink` in `xlink:href`)
    pub prefix: Option<String>,
    /// Local part of the name
    pub local: String,
    /// Resolved namespace URI
    pub namespace: Option<String>,
}

impl QualifiedName {
    /// Creates a qualified name.
    pub fn new(prefix: Option<&str>, local: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            local: local.into(),
            namespace: namespace.map(str::to_string),
        }
    }

    /// Creates an unprefixed name in no namespace.
    pub fn unqualified(local: impl Into<String>) -> Self {
        Self::new(None, local, None)
    }

    /// Returns the name as written, e.g. `xlink:href`.
    pub fn raw(&self) -> String {
        match self.prefix {
            Some(ref p) => format!("{}:{}", p, self.local),
            None => self.local.clone(),
        }
    }

    /// Returns the (namespace, local name) identity of this name.
    pub fn expanded(&self) -> ExpandedName {
        ExpandedName {
            namespace: self.namespace.clone(),
            local: self.local.clone(),
        }
    }

    /// Returns true for `xmlns` and `xmlns:*` attributes.
    pub fn is_namespace_declaration(&self) -> bool {
        self.namespace.as_deref() == Some(XMLNS_XMLNS)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix {
            Some(ref p) => write!(f, "{}:{}", p, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_unqualified() {
        let name = ExpandedName::parse_key("fill").unwrap();
        assert_eq!(name.namespace, None);
        assert_eq!(name.local, "fill");
    }

    #[test]
    fn test_parse_key_well_known_prefix() {
        let name = ExpandedName::parse_key("xlink:href").unwrap();
        assert!(name.in_namespace(XMLNS_XLINK));
        assert_eq!(name.local, "href");

        let name = ExpandedName::parse_key("xml:space").unwrap();
        assert!(name.in_namespace(XMLNS_XML));
    }

    #[test]
    fn test_parse_key_rejects_unknown_prefix() {
        let err = ExpandedName::parse_key("inkscape:label").unwrap_err();
        assert!(err.to_string().contains("unknown namespace prefix"));
        assert!(ExpandedName::parse_key("").is_err());
        assert!(ExpandedName::parse_key("xlink:").is_err());
    }

    #[test]
    fn test_remapped_prefix_has_same_identity() {
        let a = QualifiedName::new(Some("xlink"), "href", Some(XMLNS_XLINK));
        let b = QualifiedName::new(Some("l"), "href", Some(XMLNS_XLINK));
        assert_ne!(a.raw(), b.raw());
        assert_eq!(a.expanded(), b.expanded());
    }

    #[test]
    fn test_display() {
        let name = QualifiedName::new(Some("xlink"), "href", Some(XMLNS_XLINK));
        assert_eq!(name.to_string(), "xlink:href");
        assert_eq!(
            name.expanded().to_string(),
            "{http://www.w3.org/1999/xlink}href"
        );
    }
}
