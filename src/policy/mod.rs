//! The policy catalog: which elements, attributes and URI references a
//! document may contain.
//!
//! A [`PolicyCatalog`] is immutable once built and is shared read-only
//! between validations, usually behind an [`Arc`]. All decisions are driven
//! by tables; the walker only asks questions.
//!
//! # Example
//!
//! ```rust
//! use safe_svg_rs::objects::ExpandedName;
//! use safe_svg_rs::policy::PolicyCatalog;
//! use safe_svg_rs::uri::UriReference;
//!
//! let catalog = PolicyCatalog::builder()
//!     .with_additional_elements(["cursor"])
//!     .unwrap()
//!     .allow_uri_scheme("https")
//!     .unwrap()
//!     .build();
//!
//! assert!(catalog.is_element_allowed(&ExpandedName::unqualified("cursor")));
//! assert!(!catalog.is_element_allowed(&ExpandedName::unqualified("script")));
//!
//! let href = ExpandedName::unqualified("href");
//! assert!(catalog.is_uri_scheme_allowed(&href, &UriReference::parse("https://example.com/a.png")));
//! assert!(!catalog.is_uri_scheme_allowed(&href, &UriReference::parse("javascript:alert(1)")));
//! ```

mod tables;

use crate::error::{Error, Result};
use crate::objects::{ExpandedName, Severity, XMLNS_SVG, XMLNS_XLINK, XMLNS_XML, XMLNS_XMLNS};
use crate::uri::{is_valid_scheme, UriReference};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Version of the default tables.
pub const CATALOG_VERSION: u32 = 1;

static DEFAULT_CATALOG: Lazy<Arc<PolicyCatalog>> =
    Lazy::new(|| Arc::new(PolicyBuilder::new().build()));

/// How `style` attributes and elements are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StylePolicy {
    /// `style` is on the denylist
    #[default]
    Deny,
    /// `style` is allowed and its CSS is screened
    Screened,
}

/// How a reference-bearing attribute carries its URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UriKind {
    /// The whole value is a URI reference (`href`)
    Direct,
    /// The value may contain `url(...)` references (`fill`)
    FuncIri,
    /// The value is CSS (`style`)
    Css,
}

/// The URI references a reference-bearing attribute may point at.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemeSet {
    /// Relative paths
    pub relative: bool,
    /// Same-document fragments
    pub fragment: bool,
    /// Allowed schemes, lowercased
    pub schemes: BTreeSet<String>,
    /// Allowed media types for `data:` references
    pub data_media_types: BTreeSet<String>,
}

impl Default for SchemeSet {
    fn default() -> Self {
        Self::local_only()
    }
}

impl SchemeSet {
    /// Allows relative and fragment references only.
    pub fn local_only() -> Self {
        Self {
            relative: true,
            fragment: true,
            schemes: BTreeSet::new(),
            data_media_types: BTreeSet::new(),
        }
    }

    /// Returns true if the reference may be followed.
    pub fn allows(&self, reference: &UriReference) -> bool {
        match reference {
            UriReference::Fragment => self.fragment,
            UriReference::Relative => self.relative,
            // `//host` inherits the document's scheme, which may be either.
            UriReference::NetworkPath => {
                self.schemes.contains("http") && self.schemes.contains("https")
            }
            UriReference::Absolute { scheme, .. } if scheme == "data" => reference
                .data_media_type()
                .is_some_and(|media| self.data_media_types.contains(&media)),
            UriReference::Absolute { scheme, .. } => self.schemes.contains(scheme),
            UriReference::Invalid => false,
        }
    }
}

/// Rule for one reference-bearing attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UriRule {
    /// How the value carries references
    pub kind: UriKind,
    /// Where those references may point
    pub schemes: SchemeSet,
}

/// The catalog's answer for an element or attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// On the allowlist and not denied
    Allowed,
    /// Not on the allowlist
    Unlisted,
    /// On the denylist
    Denied(Severity),
}

impl Access {
    /// Returns true for [`Access::Allowed`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allowed)
    }

    /// Severity of a violation for this access, if any.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Access::Allowed => None,
            Access::Unlisted => Some(Severity::Low),
            Access::Denied(severity) => Some(*severity),
        }
    }
}

/// Immutable allow/deny tables consulted by the tree walker.
///
/// Catalogs are only created through [`PolicyBuilder`], so they can be
/// serialized for diagnostics but not deserialized.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PolicyCatalog {
    version: u32,
    style: StylePolicy,
    elements: BTreeSet<String>,
    attributes: BTreeSet<ExpandedName>,
    element_attributes: BTreeMap<String, BTreeSet<ExpandedName>>,
    denied_elements: BTreeMap<String, Severity>,
    namespaces: BTreeSet<String>,
    uri_rules: BTreeMap<ExpandedName, UriRule>,
}

impl Default for PolicyCatalog {
    fn default() -> Self {
        PolicyBuilder::new().build()
    }
}

impl PolicyCatalog {
    /// Starts a builder from the default tables.
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::new()
    }

    /// Returns the process-wide default catalog.
    pub fn shared_default() -> Arc<PolicyCatalog> {
        Arc::clone(&DEFAULT_CATALOG)
    }

    /// Returns the catalog version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns how `style` is treated.
    pub fn style_policy(&self) -> StylePolicy {
        self.style
    }

    /// Decides whether an element may appear.
    ///
    /// The denylist is checked first, by ASCII-case-insensitive local name in
    /// any namespace. Allowed elements must be in the SVG namespace or in no
    /// namespace.
    pub fn element_access(&self, name: &ExpandedName) -> Access {
        let lower = name.local.to_ascii_lowercase();
        if let Some(severity) = self.denied_elements.get(&lower) {
            return Access::Denied(*severity);
        }
        if lower == "style" {
            return match self.style {
                StylePolicy::Deny => Access::Denied(Severity::High),
                StylePolicy::Screened if is_svg_element(name) => Access::Allowed,
                StylePolicy::Screened => Access::Unlisted,
            };
        }
        if is_svg_element(name) && self.elements.contains(&name.local) {
            Access::Allowed
        } else {
            Access::Unlisted
        }
    }

    /// Returns true if the element may appear.
    pub fn is_element_allowed(&self, name: &ExpandedName) -> bool {
        self.element_access(name).is_allowed()
    }

    /// Returns the attribute names allowed on an element.
    ///
    /// Namespace declarations are decided by value and are not included.
    pub fn allowed_attributes(&self, element: &ExpandedName) -> BTreeSet<ExpandedName> {
        let mut allowed = self.attributes.clone();
        if let Some(extra) = self.element_attributes.get(&element.local) {
            allowed.extend(extra.iter().cloned());
        }
        if self.style == StylePolicy::Screened {
            allowed.insert(ExpandedName::unqualified("style"));
        }
        allowed
    }

    /// Decides whether an attribute may appear on an element.
    pub fn attribute_access(
        &self,
        element: &ExpandedName,
        name: &ExpandedName,
        value: &str,
    ) -> Access {
        if name.in_namespace(XMLNS_XMLNS) {
            return if value.is_empty() || self.namespaces.contains(value) {
                Access::Allowed
            } else {
                Access::Unlisted
            };
        }
        if name.local.len() > 2
            && name
                .local
                .get(..2)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
        {
            return Access::Denied(Severity::Critical);
        }
        if name.in_namespace(XMLNS_XML) && name.local == "base" {
            return Access::Denied(Severity::High);
        }
        if name.namespace.is_none() && name.local == "style" {
            return match self.style {
                StylePolicy::Deny => Access::Denied(Severity::High),
                StylePolicy::Screened => Access::Allowed,
            };
        }

        let per_element = self
            .element_attributes
            .get(&element.local)
            .is_some_and(|extra| extra.contains(name));
        if per_element || self.attributes.contains(name) {
            Access::Allowed
        } else {
            Access::Unlisted
        }
    }

    /// Returns true if the attribute may appear on the element.
    pub fn is_attribute_allowed(
        &self,
        element: &ExpandedName,
        name: &ExpandedName,
        value: &str,
    ) -> bool {
        self.attribute_access(element, name, value).is_allowed()
    }

    /// Returns the URI rule for a reference-bearing attribute.
    pub fn uri_rule(&self, name: &ExpandedName) -> Option<&UriRule> {
        self.uri_rules.get(name)
    }

    /// Returns true if the attribute may carry the reference.
    ///
    /// Attributes without a URI rule carry no references and allow anything.
    pub fn is_uri_scheme_allowed(&self, name: &ExpandedName, reference: &UriReference) -> bool {
        self.uri_rule(name)
            .map_or(true, |rule| rule.schemes.allows(reference))
    }

    /// Returns true if the namespace may be declared.
    pub fn is_namespace_allowed(&self, uri: &str) -> bool {
        self.namespaces.contains(uri)
    }

    /// Returns true for elements whose `attributeName` is guarded.
    pub fn is_animation_element(&self, name: &ExpandedName) -> bool {
        tables::ANIMATION_ELEMENTS.contains(&name.local.to_ascii_lowercase().as_str())
    }

    /// Returns true if an animation `attributeName` targets a reference or
    /// an event handler.
    pub fn is_guarded_animation_target(&self, attribute_name: &str) -> bool {
        let name = attribute_name.trim();
        let local = name.rsplit(':').next().unwrap_or(name).to_ascii_lowercase();
        local.starts_with("on") || tables::GUARDED_ANIMATION_TARGETS.contains(&local.as_str())
    }

    /// Returns the URI rule of the attribute an animation's `attributeName`
    /// names, if that attribute carries references.
    pub fn animation_target_rule(&self, attribute_name: &str) -> Option<&UriRule> {
        let target = match attribute_name.trim().split_once(':') {
            Some(("xlink", local)) => ExpandedName::new(Some(XMLNS_XLINK), local),
            Some((_, local)) => ExpandedName::unqualified(local),
            None => ExpandedName::unqualified(attribute_name.trim()),
        };
        self.uri_rule(&target)
    }

    /// Returns true for `from`, `to`, `by` and `values`.
    pub fn is_animation_value(&self, name: &ExpandedName) -> bool {
        name.namespace.is_none()
            && tables::ANIMATION_VALUE_ATTRIBUTES.contains(&name.local.as_str())
    }
}

fn is_svg_element(name: &ExpandedName) -> bool {
    name.namespace.is_none() || name.in_namespace(XMLNS_SVG)
}

/// Builds a [`PolicyCatalog`], starting from the default tables.
///
/// Methods that take names return an error for keys the catalog cannot
/// represent, such as an unknown namespace prefix.
#[derive(Debug, Clone)]
pub struct PolicyBuilder {
    version: u32,
    style: StylePolicy,
    elements: BTreeSet<String>,
    attributes: BTreeSet<ExpandedName>,
    element_attributes: BTreeMap<String, BTreeSet<ExpandedName>>,
    namespaces: BTreeSet<String>,
    uri_attributes: BTreeMap<ExpandedName, UriKind>,
    schemes: SchemeSet,
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyBuilder {
    /// Creates a builder holding the default tables.
    pub fn new() -> Self {
        let mut attributes: BTreeSet<ExpandedName> = tables::ATTRIBUTES
            .iter()
            .map(|a| ExpandedName::unqualified(*a))
            .collect();
        attributes.extend(
            tables::XLINK_ATTRIBUTES
                .iter()
                .map(|a| ExpandedName::new(Some(XMLNS_XLINK), *a)),
        );
        attributes.extend(
            tables::XML_ATTRIBUTES
                .iter()
                .map(|a| ExpandedName::new(Some(XMLNS_XML), *a)),
        );

        let element_attributes = tables::ELEMENT_ATTRIBUTES
            .iter()
            .map(|(element, attrs)| {
                let names = attrs.iter().map(|a| ExpandedName::unqualified(*a)).collect();
                (element.to_string(), names)
            })
            .collect();

        let mut uri_attributes = BTreeMap::new();
        for name in tables::DIRECT_URI_ATTRIBUTES {
            uri_attributes.insert(ExpandedName::unqualified(*name), UriKind::Direct);
        }
        for name in tables::XLINK_ATTRIBUTES {
            uri_attributes.insert(ExpandedName::new(Some(XMLNS_XLINK), *name), UriKind::Direct);
        }
        for name in tables::FUNC_IRI_ATTRIBUTES {
            uri_attributes.insert(ExpandedName::unqualified(*name), UriKind::FuncIri);
        }
        uri_attributes.insert(ExpandedName::unqualified("style"), UriKind::Css);

        Self {
            version: CATALOG_VERSION,
            style: StylePolicy::default(),
            elements: tables::ELEMENTS.iter().map(|e| e.to_string()).collect(),
            attributes,
            element_attributes,
            namespaces: [XMLNS_SVG, XMLNS_XLINK, XMLNS_XML]
                .iter()
                .map(|ns| ns.to_string())
                .collect(),
            uri_attributes,
            schemes: SchemeSet::local_only(),
        }
    }

    /// Adds elements to the allowlist. Denied elements stay denied.
    pub fn with_additional_elements<I, S>(mut self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            if name.is_empty() || name.contains(':') {
                return Err(Error::InvalidPolicy(format!("invalid element name '{}'", name)));
            }
            self.elements.insert(name.to_string());
        }
        Ok(self)
    }

    /// Adds attributes allowed on every element, e.g. `"horiz-adv-x"` or
    /// `"xlink:title"`.
    pub fn with_additional_attributes<I, S>(mut self, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for key in keys {
            self.attributes.insert(ExpandedName::parse_key(key.as_ref())?);
        }
        Ok(self)
    }

    /// Adds attributes allowed only on one element.
    pub fn with_element_attributes<I, S>(mut self, element: &str, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = Vec::new();
        for key in keys {
            names.push(ExpandedName::parse_key(key.as_ref())?);
        }
        self.element_attributes
            .entry(element.to_string())
            .or_default()
            .extend(names);
        Ok(self)
    }

    /// Marks an attribute as reference-bearing.
    pub fn with_uri_attribute(mut self, key: &str, kind: UriKind) -> Result<Self> {
        self.uri_attributes.insert(ExpandedName::parse_key(key)?, kind);
        Ok(self)
    }

    /// Allows a URI scheme in every reference-bearing attribute.
    ///
    /// Script schemes and `data` cannot be allowed this way; use
    /// [`allow_data_images`](Self::allow_data_images) for inline images.
    pub fn allow_uri_scheme(mut self, scheme: &str) -> Result<Self> {
        let scheme = scheme.trim_end_matches(':').to_ascii_lowercase();
        if !is_valid_scheme(&scheme) {
            return Err(Error::InvalidPolicy(format!("invalid URI scheme '{}'", scheme)));
        }
        if tables::FORBIDDEN_SCHEMES.contains(&scheme.as_str()) {
            return Err(Error::InvalidPolicy(format!(
                "URI scheme '{}' cannot be allowed",
                scheme
            )));
        }
        self.schemes.schemes.insert(scheme);
        Ok(self)
    }

    /// Allows `data:` references to PNG, JPEG, GIF and WebP images.
    pub fn allow_data_images(mut self) -> Self {
        self.schemes
            .data_media_types
            .extend(tables::DATA_IMAGE_TYPES.iter().map(|t| t.to_string()));
        self
    }

    /// Sets how `style` is treated.
    pub fn with_style_policy(mut self, style: StylePolicy) -> Self {
        self.style = style;
        self
    }

    /// Allows declarations of an additional namespace.
    ///
    /// Elements in that namespace are still not allowed.
    pub fn with_namespace(mut self, uri: &str) -> Self {
        self.namespaces.insert(uri.to_string());
        self
    }

    /// Sets the catalog version reported in diagnostics.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Builds the immutable catalog.
    pub fn build(self) -> PolicyCatalog {
        let uri_rules = self
            .uri_attributes
            .into_iter()
            .map(|(name, kind)| {
                let rule = UriRule {
                    kind,
                    schemes: self.schemes.clone(),
                };
                (name, rule)
            })
            .collect();

        PolicyCatalog {
            version: self.version,
            style: self.style,
            elements: self.elements,
            attributes: self.attributes,
            element_attributes: self.element_attributes,
            denied_elements: tables::DENIED_ELEMENTS
                .iter()
                .map(|(name, severity)| (name.to_string(), *severity))
                .collect(),
            namespaces: self.namespaces,
            uri_rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(local: &str) -> ExpandedName {
        ExpandedName::unqualified(local)
    }

    fn svg_el(local: &str) -> ExpandedName {
        ExpandedName::new(Some(XMLNS_SVG), local)
    }

    #[test]
    fn test_default_elements() {
        let catalog = PolicyCatalog::default();
        assert_eq!(catalog.version(), CATALOG_VERSION);
        assert!(catalog.is_element_allowed(&el("circle")));
        assert!(catalog.is_element_allowed(&svg_el("feGaussianBlur")));
        assert_eq!(catalog.element_access(&el("cursor")), Access::Unlisted);
        assert_eq!(
            catalog.element_access(&el("script")),
            Access::Denied(Severity::Critical)
        );
    }

    #[test]
    fn test_denylist_is_case_insensitive_and_namespace_blind() {
        let catalog = PolicyCatalog::default();
        assert!(!catalog.is_element_allowed(&el("SCRIPT")));
        assert!(!catalog.is_element_allowed(&el("foreignObject")));
        let xhtml_script = ExpandedName::new(Some("http://www.w3.org/1999/xhtml"), "script");
        assert_eq!(
            catalog.element_access(&xhtml_script),
            Access::Denied(Severity::Critical)
        );
    }

    #[test]
    fn test_denylist_beats_additional_elements() {
        let catalog = PolicyCatalog::builder()
            .with_additional_elements(["script", "cursor"])
            .unwrap()
            .build();
        assert!(!catalog.is_element_allowed(&el("script")));
        assert!(catalog.is_element_allowed(&el("cursor")));
    }

    #[test]
    fn test_foreign_namespace_element_is_unlisted() {
        let catalog = PolicyCatalog::default();
        let foreign = ExpandedName::new(Some("http://example.com/ns"), "circle");
        assert_eq!(catalog.element_access(&foreign), Access::Unlisted);
    }

    #[test]
    fn test_event_handlers_denied() {
        let catalog = PolicyCatalog::default();
        for name in ["onload", "onClick", "ONMOUSEOVER"] {
            assert_eq!(
                catalog.attribute_access(&el("svg"), &el(name), "alert(1)"),
                Access::Denied(Severity::Critical)
            );
        }
        assert!(catalog.is_attribute_allowed(&el("svg"), &el("opacity"), "1"));
    }

    #[test]
    fn test_namespaced_attributes() {
        let catalog = PolicyCatalog::default();
        let xlink_href = ExpandedName::new(Some(XMLNS_XLINK), "href");
        assert!(catalog.is_attribute_allowed(&el("use"), &xlink_href, "#a"));

        let xml_base = ExpandedName::new(Some(XMLNS_XML), "base");
        assert_eq!(
            catalog.attribute_access(&el("svg"), &xml_base, "http://evil.example/"),
            Access::Denied(Severity::High)
        );

        let foreign_href = ExpandedName::new(Some("http://example.com/ns"), "href");
        assert_eq!(
            catalog.attribute_access(&el("use"), &foreign_href, "#a"),
            Access::Unlisted
        );
    }

    #[test]
    fn test_namespace_declarations() {
        let catalog = PolicyCatalog::default();
        let xmlns = ExpandedName::new(Some(XMLNS_XMLNS), "xmlns");
        let xmlns_x = ExpandedName::new(Some(XMLNS_XMLNS), "x");
        assert!(catalog.is_attribute_allowed(&el("svg"), &xmlns, XMLNS_SVG));
        assert!(catalog.is_attribute_allowed(&el("svg"), &xmlns_x, XMLNS_XLINK));
        let xhtml = "http://www.w3.org/1999/xhtml";
        assert!(!catalog.is_attribute_allowed(&el("svg"), &xmlns_x, xhtml));

        let inkscape = "http://www.inkscape.org/namespaces/inkscape";
        let catalog = PolicyCatalog::builder().with_namespace(inkscape).build();
        assert!(catalog.is_namespace_allowed(inkscape));
        assert!(catalog.is_attribute_allowed(&el("svg"), &xmlns_x, inkscape));
    }

    #[test]
    fn test_style_policy() {
        let deny = PolicyCatalog::default();
        assert_eq!(deny.style_policy(), StylePolicy::Deny);
        assert_eq!(deny.element_access(&el("style")), Access::Denied(Severity::High));
        assert!(!deny.allowed_attributes(&el("rect")).contains(&el("style")));

        let screened = PolicyCatalog::builder()
            .with_style_policy(StylePolicy::Screened)
            .build();
        assert!(screened.is_element_allowed(&el("style")));
        assert!(screened.is_attribute_allowed(&el("rect"), &el("style"), "fill:red"));
        assert!(screened.allowed_attributes(&el("rect")).contains(&el("style")));
    }

    #[test]
    fn test_per_element_attributes() {
        let catalog = PolicyCatalog::default();
        assert!(catalog.is_attribute_allowed(&el("font"), &el("horiz-adv-x"), "10"));
        assert!(!catalog.is_attribute_allowed(&el("rect"), &el("horiz-adv-x"), "10"));
        assert!(catalog.allowed_attributes(&el("font")).contains(&el("horiz-adv-x")));

        let catalog = PolicyCatalog::builder()
            .with_element_attributes("rect", ["data-id"])
            .unwrap()
            .build();
        assert!(catalog.is_attribute_allowed(&el("rect"), &el("data-id"), "1"));
        assert!(!catalog.is_attribute_allowed(&el("circle"), &el("data-id"), "1"));
    }

    #[test]
    fn test_builder_rejects_bad_keys() {
        assert!(PolicyCatalog::builder()
            .with_additional_attributes(["inkscape:label"])
            .is_err());
        assert!(PolicyCatalog::builder()
            .with_additional_elements(["svg:cursor"])
            .is_err());
        assert!(PolicyCatalog::builder().allow_uri_scheme("javascript").is_err());
        assert!(PolicyCatalog::builder().allow_uri_scheme("data:").is_err());
        assert!(PolicyCatalog::builder().allow_uri_scheme("not a scheme").is_err());
    }

    #[test]
    fn test_default_uri_rules() {
        let catalog = PolicyCatalog::default();
        let href = el("href");
        let xlink_href = ExpandedName::new(Some(XMLNS_XLINK), "href");

        assert_eq!(catalog.uri_rule(&href).map(|r| r.kind), Some(UriKind::Direct));
        assert_eq!(catalog.uri_rule(&el("fill")).map(|r| r.kind), Some(UriKind::FuncIri));
        assert_eq!(catalog.uri_rule(&el("style")).map(|r| r.kind), Some(UriKind::Css));
        assert!(catalog.uri_rule(&el("cx")).is_none());

        for name in [&href, &xlink_href] {
            assert!(catalog.is_uri_scheme_allowed(name, &UriReference::parse("#a")));
            assert!(catalog.is_uri_scheme_allowed(name, &UriReference::parse("a.png")));
            assert!(!catalog.is_uri_scheme_allowed(name, &UriReference::parse("javascript:x")));
            assert!(!catalog.is_uri_scheme_allowed(name, &UriReference::parse("https://a/b")));
            assert!(!catalog.is_uri_scheme_allowed(name, &UriReference::parse("//a/b")));
        }
    }

    #[test]
    fn test_allow_https_and_data_images() {
        let catalog = PolicyCatalog::builder()
            .allow_uri_scheme("HTTPS")
            .unwrap()
            .allow_data_images()
            .build();
        let href = el("href");

        assert!(catalog.is_uri_scheme_allowed(&href, &UriReference::parse("https://a/b.png")));
        assert!(!catalog.is_uri_scheme_allowed(&href, &UriReference::parse("http://a/b.png")));
        assert!(!catalog.is_uri_scheme_allowed(&href, &UriReference::parse("//a/b.png")));
        assert!(catalog.is_uri_scheme_allowed(
            &href,
            &UriReference::parse("data:image/png;base64,AAAA")
        ));
        assert!(!catalog.is_uri_scheme_allowed(
            &href,
            &UriReference::parse("data:image/svg+xml;base64,AAAA")
        ));
    }

    #[test]
    fn test_network_path_needs_both_http_schemes() {
        let catalog = PolicyCatalog::builder()
            .allow_uri_scheme("http")
            .unwrap()
            .allow_uri_scheme("https")
            .unwrap()
            .build();
        assert!(catalog.is_uri_scheme_allowed(&el("href"), &UriReference::parse("//a/b.png")));
    }

    #[test]
    fn test_animation_guard() {
        let catalog = PolicyCatalog::default();
        assert!(catalog.is_animation_element(&el("animateTransform")));
        assert!(!catalog.is_animation_element(&el("rect")));
        assert!(catalog.is_guarded_animation_target("href"));
        assert!(catalog.is_guarded_animation_target(" xlink:href "));
        assert!(catalog.is_guarded_animation_target("onclick"));
        assert!(!catalog.is_guarded_animation_target("opacity"));
    }

    #[test]
    fn test_animation_target_rule() {
        let catalog = PolicyCatalog::default();
        assert_eq!(
            catalog.animation_target_rule(" fill ").map(|r| r.kind),
            Some(UriKind::FuncIri)
        );
        assert_eq!(
            catalog.animation_target_rule("xlink:href").map(|r| r.kind),
            Some(UriKind::Direct)
        );
        assert!(catalog.animation_target_rule("opacity").is_none());

        assert!(catalog.is_animation_value(&el("values")));
        assert!(catalog.is_animation_value(&el("to")));
        assert!(!catalog.is_animation_value(&el("attributeName")));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_catalog_is_serializable() {
        fn assert_serialize<T: serde::Serialize>(_: &T) {}
        assert_serialize(&PolicyCatalog::default());
    }

    #[test]
    fn test_shared_default_is_shared() {
        let a = PolicyCatalog::shared_default();
        let b = PolicyCatalog::shared_default();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*a, PolicyCatalog::default());
    }
}
