//! Policy violations and the verdict produced by a tree walk.

use super::document::Document;
use std::collections::BTreeSet;
use std::fmt;

/// The policy rule a violation broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rule {
    /// Element is denylisted or absent from the allowlist
    DisallowedElement,
    /// Attribute is denylisted or absent from the element's allowlist
    DisallowedAttribute,
    /// A reference-bearing attribute points at a scheme the policy forbids
    DisallowedUriScheme,
    /// CSS in a `style` attribute or element is unsafe
    DisallowedStyle,
    /// An animation element targets a reference or event-handler attribute
    DisallowedAnimationTarget,
    /// A processing instruction (e.g. `xml-stylesheet`) is present
    DisallowedProcessingInstruction,
}

impl Rule {
    /// Returns the rule name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::DisallowedElement => "DisallowedElement",
            Rule::DisallowedAttribute => "DisallowedAttribute",
            Rule::DisallowedUriScheme => "DisallowedUriScheme",
            Rule::DisallowedStyle => "DisallowedStyle",
            Rule::DisallowedAnimationTarget => "DisallowedAnimationTarget",
            Rule::DisallowedProcessingInstruction => "DisallowedProcessingInstruction",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How dangerous a violation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Not on the allowlist, no known attack
    Low,
    /// External or unresolvable reference, or other denylisted construct
    High,
    /// Script execution vector
    Critical,
}

impl Severity {
    /// Returns the severity name in lowercase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single policy violation found during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Violation {
    /// Location, e.g. `svg/image@href`
    pub path: String,
    /// Rule that was violated
    pub rule: Rule,
    /// Severity of the violation
    pub severity: Severity,
    /// Offending element, attribute, or PI target as written
    pub name: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} at {}", self.severity, self.rule, self.path)
    }
}

/// The classification of a walked document.
///
/// `Accepted` carries the untouched tree, `Sanitized` the pruned tree. The
/// violation list of `Rejected` and `Sanitized` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No violations
    Accepted(Document),
    /// Violations found and the document is refused
    Rejected(Vec<Violation>),
    /// Violations found and removed from the tree
    Sanitized(Document, Vec<Violation>),
}

impl Verdict {
    /// Returns the violations in document order.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Verdict::Accepted(_) => &[],
            Verdict::Rejected(v) | Verdict::Sanitized(_, v) => v,
        }
    }

    /// Returns true for `Accepted`.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }

    /// Returns the accepted or sanitized tree.
    pub fn document(&self) -> Option<&Document> {
        match self {
            Verdict::Accepted(d) | Verdict::Sanitized(d, _) => Some(d),
            Verdict::Rejected(_) => None,
        }
    }

    /// Returns the distinct names of offending elements and attributes.
    pub fn offending_names(&self) -> BTreeSet<String> {
        self.violations().iter().map(|v| v.name.clone()).collect()
    }
}
