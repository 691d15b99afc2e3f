//! Security validation for untrusted SVG documents.
//!
//! This crate decides whether an SVG document is safe to accept, for example
//! as an uploaded avatar or an embeddable icon. It parses the document
//! defensively, walks the element tree against an explicit allow/deny policy,
//! and either rejects the document or returns a sanitized copy with every
//! offending element and attribute removed.
//!
//! # Features
//!
//! - **Defensive Reader**: No external entities, bounded entity expansion,
//!   bounded nesting, UTF-8 only.
//! - **Policy Catalog**: Table-driven allowlists with a denylist that always
//!   wins, namespace-aware attribute matching and per-attribute URI rules.
//! - **Verdict Engine**: Reject or sanitize, with an ordered violation trail.
//! - **Serde Support**: Optional serialization of reports with the `serde` feature.
//!
//! # Quick Start
//!
//! ```rust
//! use safe_svg_rs::{validate, ValidationOptions};
//!
//! let outcome = validate(
//!     br#"<svg><image href="javascript:alert(1)"/></svg>"#,
//!     &ValidationOptions::sanitize(),
//! );
//!
//! assert!(!outcome.is_valid());
//! for violation in outcome.violations() {
//!     println!("{}", violation); // [critical] DisallowedUriScheme at svg/image@href
//! }
//! assert_eq!(
//!     outcome.sanitized_document(),
//!     Some(&br#"<?xml version="1.0" encoding="UTF-8"?><svg><image/></svg>"#[..])
//! );
//! ```
//!
//! # Custom Policies
//!
//! ```rust
//! use safe_svg_rs::{PolicyCatalog, SvgValidator, ValidationOptions};
//!
//! let catalog = PolicyCatalog::builder()
//!     .allow_uri_scheme("https")?
//!     .allow_data_images()
//!     .with_additional_elements(["cursor"])?
//!     .build();
//!
//! let validator = SvgValidator::with_options(&ValidationOptions::new().with_policy(catalog));
//! assert!(validator
//!     .validate_str(r#"<svg><image href="https://cdn.example/a.png"/><cursor/></svg>"#)
//!     .is_valid());
//! # Ok::<(), safe_svg_rs::Error>(())
//! ```
//!
//! # Module Structure
//!
//! - [`reader`] - Defensive XML reader
//! - [`policy`] - Policy catalog and builder
//! - [`walker`] - Tree walker and verdict engine
//! - [`validation`] - Public validation API
//! - [`writer`] - Serialization of accepted and sanitized documents
//! - [`objects`] - Element tree, violations and verdicts
//! - [`uri`] and [`style`] - Reference classification and CSS screening
//! - [`error`] - Error types
//!
//! # Optional Features
//!
//! - `serde` - Enable serde serialization/deserialization support
//! - `cli` - Build the `svg_guard` command-line tool

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod dtd;
pub mod error;
pub mod objects;
pub mod policy;
pub mod reader;
pub mod style;
pub mod uri;
pub mod validation;
pub mod walker;
pub mod writer;

// Re-export commonly used types at the crate root
pub use error::{Error, ParseError, Result};
pub use objects::{Document, Element, Rule, Severity, Verdict, Violation};
pub use policy::{PolicyBuilder, PolicyCatalog, StylePolicy};
pub use reader::{ReaderConfig, SvgReader};
pub use validation::{
    validate, validate_file, validate_str, SvgValidator, ValidationOptions, ValidationOutcome,
    ValidationReport,
};
pub use walker::{evaluate, ValidationMode};
pub use writer::{SvgWriter, WriterConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
