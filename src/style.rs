//! CSS screening for `style` attributes and elements.
//!
//! Screening is only reached when the catalog's style policy allows CSS. It
//! does not parse CSS. It refuses the constructs that execute script, load
//! other stylesheets or hide their content behind escapes, and checks every
//! `url(...)` target against the attribute's scheme set.

use crate::objects::Severity;
use crate::policy::SchemeSet;
use crate::uri::{func_iri_references, UriReference};
use std::fmt;

/// Substrings that execute script or bind behaviour.
const SCRIPTING_PATTERNS: &[&str] = &[
    "expression(",
    "javascript:",
    "vbscript:",
    "-moz-binding",
    "behavior",
];

/// Substrings that load content outside `url(...)`.
const LOADING_PATTERNS: &[&str] = &["@import", "image-set(", "@font-face"];

/// Why a piece of CSS was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleIssue {
    /// Backslash escapes or an unterminated comment
    Obfuscated,
    /// A script-executing construct such as `expression(`
    Scripting(&'static str),
    /// A construct that loads external content such as `@import`
    Loading(&'static str),
    /// A `url(...)` target the scheme set does not allow
    Reference(UriReference),
}

impl StyleIssue {
    /// Returns the severity of a violation caused by this issue.
    pub fn severity(&self) -> Severity {
        match self {
            StyleIssue::Scripting(_) => Severity::Critical,
            StyleIssue::Reference(r) if r.is_scripting() => Severity::Critical,
            StyleIssue::Obfuscated | StyleIssue::Loading(_) | StyleIssue::Reference(_) => {
                Severity::High
            }
        }
    }
}

impl fmt::Display for StyleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleIssue::Obfuscated => write!(f, "escaped or unterminated CSS"),
            StyleIssue::Scripting(p) => write!(f, "script construct '{}'", p),
            StyleIssue::Loading(p) => write!(f, "loading construct '{}'", p),
            StyleIssue::Reference(r) => write!(f, "disallowed reference {}", r),
        }
    }
}

/// Screens CSS text against a scheme set.
pub fn screen(css: &str, schemes: &SchemeSet) -> Result<(), StyleIssue> {
    if css.contains('\\') {
        return Err(StyleIssue::Obfuscated);
    }
    let css = strip_comments(css).ok_or(StyleIssue::Obfuscated)?;
    let lower = css.to_ascii_lowercase();

    if let Some(p) = SCRIPTING_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(StyleIssue::Scripting(*p));
    }
    if let Some(p) = LOADING_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(StyleIssue::Loading(*p));
    }

    match func_iri_references(&css)
        .into_iter()
        .find(|r| !schemes.allows(r))
    {
        Some(reference) => Err(StyleIssue::Reference(reference)),
        None => Ok(()),
    }
}

/// Removes `/* ... */` comments, which could otherwise split a keyword.
fn strip_comments(css: &str) -> Option<String> {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        let end = rest[start + 2..].find("*/")?;
        rest = &rest[start + 2 + end + 2..];
    }
    out.push_str(rest);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> SchemeSet {
        SchemeSet::local_only()
    }

    #[test]
    fn test_plain_css_passes() {
        assert_eq!(screen("fill: red; stroke-width: 2", &local()), Ok(()));
        assert_eq!(screen("fill: url(#grad)", &local()), Ok(()));
        assert_eq!(screen(".a { fill: blue } /* note */", &local()), Ok(()));
    }

    #[test]
    fn test_scripting_refused() {
        let issue = screen("width: expression(alert(1))", &local()).unwrap_err();
        assert_eq!(issue, StyleIssue::Scripting("expression("));
        assert_eq!(issue.severity(), Severity::Critical);

        assert!(screen("-moz-binding: url(a.xml#x)", &local()).is_err());
        assert!(screen("behavior: url(a.htc)", &local()).is_err());
    }

    #[test]
    fn test_comment_split_keyword_refused() {
        assert_eq!(
            screen("width: expr/**/ession(alert(1))", &local()),
            Err(StyleIssue::Scripting("expression("))
        );
        assert_eq!(screen("fill: red /* open", &local()), Err(StyleIssue::Obfuscated));
    }

    #[test]
    fn test_escapes_refused() {
        assert_eq!(
            screen(r"background: url(java\73 cript:alert(1))", &local()),
            Err(StyleIssue::Obfuscated)
        );
    }

    #[test]
    fn test_loading_refused() {
        let issue = screen("@import 'https://evil.example/x.css';", &local()).unwrap_err();
        assert_eq!(issue, StyleIssue::Loading("@import"));
        assert_eq!(issue.severity(), Severity::High);
    }

    #[test]
    fn test_url_targets_checked() {
        let issue = screen("fill: url(https://evil.example/p.svg#a)", &local()).unwrap_err();
        assert_eq!(issue.severity(), Severity::High);

        let issue = screen("fill: url('javascript:alert(1)')", &local()).unwrap_err();
        assert_eq!(issue.severity(), Severity::Critical);

        let mut https = local();
        https.schemes.insert("https".to_string());
        assert_eq!(screen("fill: url(https://cdn.example/p.svg#a)", &https), Ok(()));
    }
}
