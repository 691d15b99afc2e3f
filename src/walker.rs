//! Tree walker and verdict engine.
//!
//! The walker visits a parsed [`Document`] depth-first in document order,
//! asks the [`PolicyCatalog`] about every element and attribute, and records
//! a [`Violation`] for each refusal. Both modes perform the same walk:
//!
//! - a refused element is dropped with its whole subtree, and its children
//!   are never visited
//! - a refused attribute is dropped and its element survives
//! - processing instructions are always refused
//!
//! so [`ValidationMode::RejectOnViolation`] and
//! [`ValidationMode::SanitizeInPlace`] report the same ordered violations and
//! differ only in the verdict they return.

use crate::objects::{
    Attribute, Document, Element, ExpandedName, Node, ProcessingInstruction, Rule, Severity,
    Verdict, Violation,
};
use crate::policy::{PolicyCatalog, SchemeSet, UriKind, UriRule};
use crate::style;
use crate::uri::{func_iri_references, UriReference};
use tracing::{debug, trace};

/// What the walker does with a document that has violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationMode {
    /// Refuse the document
    #[default]
    RejectOnViolation,
    /// Remove offending nodes and attributes and return the pruned tree
    SanitizeInPlace,
}

/// Walks a document against a catalog and produces a verdict.
pub fn evaluate(document: Document, catalog: &PolicyCatalog, mode: ValidationMode) -> Verdict {
    let mut walker = Walker {
        catalog,
        violations: Vec::new(),
    };

    for pi in &document.processing_instructions {
        walker.processing_instruction(pi, "");
    }
    let root = walker.element(document.root, "");

    let violations = walker.violations;
    debug!(
        violations = violations.len(),
        mode = ?mode,
        catalog_version = catalog.version(),
        "evaluated document"
    );

    match (root, mode) {
        (Some(root), _) if violations.is_empty() => Verdict::Accepted(Document::new(root)),
        (Some(root), ValidationMode::SanitizeInPlace) => {
            Verdict::Sanitized(Document::new(root), violations)
        }
        // Nothing left to return once the root is gone.
        _ => Verdict::Rejected(violations),
    }
}

struct Walker<'a> {
    catalog: &'a PolicyCatalog,
    violations: Vec<Violation>,
}

impl Walker<'_> {
    fn record(&mut self, path: String, rule: Rule, severity: Severity, name: String) {
        trace!(%path, %rule, %severity, "policy violation");
        self.violations.push(Violation {
            path,
            rule,
            severity,
            name,
        });
    }

    fn processing_instruction(&mut self, pi: &ProcessingInstruction, parent_path: &str) {
        let path = if parent_path.is_empty() {
            format!("?{}", pi.target)
        } else {
            format!("{}/?{}", parent_path, pi.target)
        };
        self.record(
            path,
            Rule::DisallowedProcessingInstruction,
            Severity::High,
            pi.target.clone(),
        );
    }

    /// Returns the surviving element, or `None` if it was refused.
    fn element(&mut self, element: Element, parent_path: &str) -> Option<Element> {
        let raw_name = element.name.raw();
        let path = if parent_path.is_empty() {
            raw_name.clone()
        } else {
            format!("{}/{}", parent_path, raw_name)
        };
        let name = element.name.expanded();

        if let Some(severity) = self.catalog.element_access(&name).severity() {
            self.record(path, Rule::DisallowedElement, severity, raw_name);
            return None;
        }

        if name.local == "style" {
            let schemes = self.css_schemes();
            if let Err(issue) = style::screen(&element.text(), &schemes) {
                trace!(%issue, "refused style element");
                self.record(path, Rule::DisallowedStyle, issue.severity(), raw_name);
                return None;
            }
        }

        let catalog = self.catalog;
        let animated = if catalog.is_animation_element(&name) {
            element
                .attributes
                .iter()
                .find(|a| a.name.namespace.is_none() && a.name.local == "attributeName")
                .and_then(|a| catalog.animation_target_rule(&a.value))
        } else {
            None
        };

        let mut survivor = Element::new(element.name);
        for attribute in element.attributes {
            if self.attribute(&name, &attribute, &path, animated) {
                survivor.attributes.push(attribute);
            }
        }

        for node in element.children {
            match node {
                Node::Element(child) => {
                    if let Some(child) = self.element(child, &path) {
                        survivor.children.push(Node::Element(child));
                    }
                }
                Node::ProcessingInstruction(pi) => self.processing_instruction(&pi, &path),
                text => survivor.children.push(text),
            }
        }

        Some(survivor)
    }

    /// Returns true if the attribute survives.
    fn attribute(
        &mut self,
        element: &ExpandedName,
        attribute: &Attribute,
        element_path: &str,
        animated: Option<&UriRule>,
    ) -> bool {
        let raw_name = attribute.name.raw();
        let path = format!("{}@{}", element_path, raw_name);
        let name = attribute.name.expanded();

        let access = self
            .catalog
            .attribute_access(element, &name, &attribute.value);
        if let Some(severity) = access.severity() {
            self.record(path, Rule::DisallowedAttribute, severity, raw_name);
            return false;
        }

        if name.namespace.is_none()
            && name.local == "attributeName"
            && self.catalog.is_animation_element(element)
            && self.catalog.is_guarded_animation_target(&attribute.value)
        {
            self.record(
                path,
                Rule::DisallowedAnimationTarget,
                Severity::Critical,
                raw_name,
            );
            return false;
        }

        // Animation values are held to the rule of the attribute they animate.
        if let Some(target) = animated.filter(|_| self.catalog.is_animation_value(&name)) {
            if let Err((rule, severity)) =
                check_animation_values(target, &name.local, &attribute.value)
            {
                self.record(path, rule, severity, raw_name);
                return false;
            }
        }

        let Some(rule) = self.catalog.uri_rule(&name) else {
            return true;
        };
        match check_references(rule, &attribute.value) {
            Ok(()) => true,
            Err((rule, severity)) => {
                self.record(path, rule, severity, raw_name);
                false
            }
        }
    }

    /// Scheme set applied to CSS in `style` elements.
    fn css_schemes(&self) -> SchemeSet {
        self.catalog
            .uri_rule(&ExpandedName::unqualified("style"))
            .map(|rule| rule.schemes.clone())
            .unwrap_or_default()
    }
}

/// Checks `from`, `to` and `by`, or each entry of a `values` list.
fn check_animation_values(
    rule: &UriRule,
    attribute: &str,
    value: &str,
) -> Result<(), (Rule, Severity)> {
    if attribute == "values" {
        value
            .split(';')
            .try_for_each(|entry| check_references(rule, entry))
    } else {
        check_references(rule, value)
    }
}

/// Checks every reference an attribute value carries.
fn check_references(rule: &UriRule, value: &str) -> Result<(), (Rule, Severity)> {
    let refused = |reference: &UriReference| {
        let severity = if reference.is_scripting() {
            Severity::Critical
        } else {
            Severity::High
        };
        (Rule::DisallowedUriScheme, severity)
    };

    match rule.kind {
        UriKind::Direct => {
            let reference = UriReference::parse(value);
            if rule.schemes.allows(&reference) {
                Ok(())
            } else {
                Err(refused(&reference))
            }
        }
        UriKind::FuncIri => match func_iri_references(value)
            .iter()
            .find(|r| !rule.schemes.allows(r))
        {
            Some(reference) => Err(refused(reference)),
            None => Ok(()),
        },
        UriKind::Css => style::screen(value, &rule.schemes)
            .map_err(|issue| (Rule::DisallowedStyle, issue.severity())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::StylePolicy;
    use crate::reader::parse;

    fn walk(svg: &str, mode: ValidationMode) -> Verdict {
        let doc = parse(svg.as_bytes()).unwrap();
        evaluate(doc, &PolicyCatalog::default(), mode)
    }

    fn rules(verdict: &Verdict) -> Vec<(String, Rule)> {
        verdict
            .violations()
            .iter()
            .map(|v| (v.path.clone(), v.rule))
            .collect()
    }

    #[test]
    fn test_allowed_document_accepted() {
        let verdict = walk(
            r#"<svg><circle cx="1" fill="red"/></svg>"#,
            ValidationMode::RejectOnViolation,
        );
        assert!(verdict.is_accepted());
        assert!(verdict.violations().is_empty());
    }

    #[test]
    fn test_javascript_href_rejected() {
        let svg = r#"<svg><image href="javascript:alert(1)"/></svg>"#;

        let verdict = walk(svg, ValidationMode::RejectOnViolation);
        assert!(matches!(verdict, Verdict::Rejected(_)));
        assert_eq!(
            rules(&verdict),
            vec![("svg/image@href".to_string(), Rule::DisallowedUriScheme)]
        );
        assert_eq!(verdict.violations()[0].severity, Severity::Critical);
    }

    #[test]
    fn test_javascript_href_sanitized() {
        let svg = r#"<svg><image href="javascript:alert(1)"/></svg>"#;

        let verdict = walk(svg, ValidationMode::SanitizeInPlace);
        let doc = match verdict {
            Verdict::Sanitized(ref doc, _) => doc,
            ref other => panic!("expected sanitized, got {:?}", other),
        };
        let image = doc.root.child_elements().next().unwrap();
        assert_eq!(image.name.local, "image");
        assert!(image.is_empty());
        assert_eq!(verdict.violations().len(), 1);
    }

    #[test]
    fn test_script_subtree_dropped() {
        let svg = r#"<svg><script>alert(1)</script><g><rect/></g></svg>"#;

        let verdict = walk(svg, ValidationMode::SanitizeInPlace);
        let doc = verdict.document().unwrap();
        let names: Vec<_> = doc.root.child_elements().map(|e| e.name.local.clone()).collect();
        assert_eq!(names, vec!["g"]);
        assert_eq!(doc.root.text(), "");
        assert_eq!(
            rules(&verdict),
            vec![("svg/script".to_string(), Rule::DisallowedElement)]
        );
    }

    #[test]
    fn test_children_of_refused_element_not_visited() {
        let svg = r#"<svg><foreignObject><div onclick="x"><script/></div></foreignObject></svg>"#;
        let reject = walk(svg, ValidationMode::RejectOnViolation);
        let sanitize = walk(svg, ValidationMode::SanitizeInPlace);

        assert_eq!(reject.violations(), sanitize.violations());
        assert_eq!(
            rules(&reject),
            vec![("svg/foreignObject".to_string(), Rule::DisallowedElement)]
        );
    }

    #[test]
    fn test_full_violation_set_in_document_order() {
        let svg = r#"<svg onload="x"><rect onclick="y" foo="1"/><cursor/><use href="https://evil.example/a.svg#b"/></svg>"#;
        let verdict = walk(svg, ValidationMode::RejectOnViolation);
        assert_eq!(
            rules(&verdict),
            vec![
                ("svg@onload".to_string(), Rule::DisallowedAttribute),
                ("svg/rect@onclick".to_string(), Rule::DisallowedAttribute),
                ("svg/rect@foo".to_string(), Rule::DisallowedAttribute),
                ("svg/cursor".to_string(), Rule::DisallowedElement),
                ("svg/use@href".to_string(), Rule::DisallowedUriScheme),
            ]
        );

        let severities: Vec<_> = verdict.violations().iter().map(|v| v.severity).collect();
        assert_eq!(
            severities,
            vec![
                Severity::Critical,
                Severity::Critical,
                Severity::Low,
                Severity::Low,
                Severity::High
            ]
        );
    }

    #[test]
    fn test_remapped_xlink_prefix_checked() {
        let svg = r#"<svg xmlns:l="http://www.w3.org/1999/xlink"><use l:href="javascript:alert(1)"/></svg>"#;
        let verdict = walk(svg, ValidationMode::RejectOnViolation);
        assert_eq!(
            rules(&verdict),
            vec![("svg/use@l:href".to_string(), Rule::DisallowedUriScheme)]
        );
    }

    #[test]
    fn test_func_iri_checked() {
        let verdict = walk(
            r#"<svg><rect fill="url(https://evil.example/p.svg#g)"/><rect fill="url(#g)"/></svg>"#,
            ValidationMode::RejectOnViolation,
        );
        assert_eq!(
            rules(&verdict),
            vec![("svg/rect@fill".to_string(), Rule::DisallowedUriScheme)]
        );
    }

    #[test]
    fn test_animation_target_guarded() {
        let svg = r##"<svg><a/><animateTransform attributeName="transform"/><animateColor attributeName="xlink:href" to="#x"/></svg>"##;
        let verdict = walk(svg, ValidationMode::SanitizeInPlace);
        assert_eq!(
            rules(&verdict),
            vec![
                ("svg/a".to_string(), Rule::DisallowedElement),
                (
                    "svg/animateColor@attributeName".to_string(),
                    Rule::DisallowedAnimationTarget
                ),
            ]
        );
    }

    #[test]
    fn test_animation_values_follow_target_uri_rule() {
        let svg = r#"<svg><rect><animateColor attributeName="fill" to="url(https://evil.example/x.svg)"/></rect><rect><animateColor attributeName="fill" values="red;url(https://evil.example/x.svg)"/></rect></svg>"#;
        let verdict = walk(svg, ValidationMode::SanitizeInPlace);
        assert_eq!(
            rules(&verdict),
            vec![
                (
                    "svg/rect/animateColor@to".to_string(),
                    Rule::DisallowedUriScheme
                ),
                (
                    "svg/rect/animateColor@values".to_string(),
                    Rule::DisallowedUriScheme
                ),
            ]
        );
        assert!(verdict
            .violations()
            .iter()
            .all(|v| v.severity == Severity::High));

        let doc = verdict.document().unwrap();
        for rect in doc.root.child_elements() {
            let animation = rect.child_elements().next().unwrap();
            assert_eq!(animation.attributes.len(), 1);
            assert_eq!(animation.attribute("attributeName"), Some("fill"));
        }
    }

    #[test]
    fn test_local_animation_values_accepted() {
        let verdict = walk(
            r##"<svg><rect><animateColor attributeName="fill" from="red" to="url(#g)" values="red;url(#g);blue"/></rect></svg>"##,
            ValidationMode::RejectOnViolation,
        );
        assert!(verdict.is_accepted());

        let verdict = walk(
            r#"<svg><rect><animateTransform attributeName="transform" to="url(https://a/b)"/></rect></svg>"#,
            ValidationMode::RejectOnViolation,
        );
        assert!(verdict.is_accepted());
    }

    #[test]
    fn test_processing_instructions_refused() {
        let svg = r#"<?xml-stylesheet href="https://evil.example/x.css"?><svg><g><?php echo 1 ?></g></svg>"#;
        let verdict = walk(svg, ValidationMode::SanitizeInPlace);
        assert_eq!(
            rules(&verdict),
            vec![
                ("?xml-stylesheet".to_string(), Rule::DisallowedProcessingInstruction),
                ("svg/g/?php".to_string(), Rule::DisallowedProcessingInstruction),
            ]
        );
        let doc = verdict.document().unwrap();
        assert!(doc.processing_instructions.is_empty());
        assert!(doc.root.child_elements().next().unwrap().children.is_empty());
    }

    #[test]
    fn test_refused_root_rejects_even_when_sanitizing() {
        let verdict = walk("<script>alert(1)</script>", ValidationMode::SanitizeInPlace);
        assert!(matches!(verdict, Verdict::Rejected(ref v) if v.len() == 1));
    }

    #[test]
    fn test_style_denied_by_default() {
        let verdict = walk(
            r#"<svg><style>rect { fill: red }</style><rect style="fill:red"/></svg>"#,
            ValidationMode::RejectOnViolation,
        );
        let found: Vec<_> = verdict
            .violations()
            .iter()
            .map(|v| (v.path.as_str(), v.rule, v.severity))
            .collect();
        assert_eq!(
            found,
            vec![
                ("svg/style", Rule::DisallowedElement, Severity::High),
                ("svg/rect@style", Rule::DisallowedAttribute, Severity::High),
            ]
        );
    }

    #[test]
    fn test_screened_style() {
        let catalog = PolicyCatalog::builder()
            .with_style_policy(StylePolicy::Screened)
            .build();
        let check = |svg: &str| {
            let doc = parse(svg.as_bytes()).unwrap();
            evaluate(doc, &catalog, ValidationMode::SanitizeInPlace)
        };

        assert!(check(r#"<svg><style>rect { fill: red }</style><rect style="fill:url(#g)"/></svg>"#)
            .is_accepted());

        let verdict = check(r#"<svg><rect style="fill:url(javascript:alert(1))"/></svg>"#);
        assert_eq!(
            rules(&verdict),
            vec![("svg/rect@style".to_string(), Rule::DisallowedStyle)]
        );
        assert_eq!(verdict.violations()[0].severity, Severity::Critical);

        let verdict = check(r#"<svg><style>@import url(https://evil.example/x.css);</style></svg>"#);
        assert_eq!(
            rules(&verdict),
            vec![("svg/style".to_string(), Rule::DisallowedStyle)]
        );
        assert_eq!(verdict.document().unwrap().root.children.len(), 0);
    }

    #[test]
    fn test_emptied_element_retained() {
        let verdict = walk(
            r#"<svg><rect onclick="x" onmouseover="y"/></svg>"#,
            ValidationMode::SanitizeInPlace,
        );
        let doc = verdict.document().unwrap();
        let rect = doc.root.child_elements().next().unwrap();
        assert!(rect.is_empty());
        assert_eq!(verdict.offending_names().len(), 2);
    }

    #[test]
    fn test_text_kept_in_order() {
        let verdict = walk(
            r#"<svg><text>a<tspan onclick="x">b</tspan>c</text></svg>"#,
            ValidationMode::SanitizeInPlace,
        );
        let doc = verdict.document().unwrap();
        let text = doc.root.child_elements().next().unwrap();
        assert_eq!(text.children.len(), 3);
        assert_eq!(text.text(), "ac");
    }
}
