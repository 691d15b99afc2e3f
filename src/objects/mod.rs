//! SVG object types.
//!
//! This module contains the data structures the validator works on:
//!
//! - [`Document`] - A parsed document: root element plus top-level PIs
//! - [`Element`] and [`Attribute`] - The element tree
//! - [`Violation`] and [`Verdict`] - The result of walking a tree against a policy
//!
//! Also provides naming types:
//! - [`QualifiedName`] - A name as written, with its resolved namespace
//! - [`ExpandedName`] - The namespace/local-name identity policies match on

mod common;
mod document;
mod verdict;

pub use common::{
    ExpandedName, QualifiedName, XMLNS_SVG, XMLNS_XLINK, XMLNS_XML, XMLNS_XMLNS,
};
pub use document::{Attribute, Document, Element, Node, ProcessingInstruction};
pub use verdict::{Rule, Severity, Verdict, Violation};
