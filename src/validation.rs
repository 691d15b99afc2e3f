//! Public validation API.
//!
//! Validation runs the three stages in order: the defensive reader parses
//! the input, the walker checks the tree against a policy catalog, and the
//! writer serializes the accepted or sanitized tree. A document that cannot
//! be parsed safely is reported as [`ValidationOutcome::Invalid`] and is
//! never treated as safe.
//!
//! # Example
//!
//! ```rust
//! use safe_svg_rs::validation::{validate, ValidationOptions};
//! use safe_svg_rs::walker::ValidationMode;
//!
//! let options = ValidationOptions::new();
//! let outcome = validate(br#"<svg><circle cx="1" fill="red"/></svg>"#, &options);
//! assert!(outcome.is_valid());
//!
//! let options = options.with_mode(ValidationMode::SanitizeInPlace);
//! let outcome = validate(br#"<svg><script>alert(1)</script></svg>"#, &options);
//! assert!(!outcome.is_valid());
//! assert!(outcome.offending_names().contains("script"));
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::Error;
use crate::objects::{Document, Verdict, Violation};
use crate::policy::PolicyCatalog;
use crate::reader::{ReaderConfig, SvgReader};
use crate::walker::{evaluate, ValidationMode};
use crate::writer::{SvgWriter, WriterConfig};

/// Options for a validation call.
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Reject or sanitize documents with violations
    pub mode: ValidationMode,
    /// Reader limits
    pub reader: ReaderConfig,
    /// Output settings for accepted and sanitized documents
    pub writer: WriterConfig,
    /// Catalog to validate against; the shared default when `None`
    pub policy: Option<Arc<PolicyCatalog>>,
}

impl ValidationOptions {
    /// Creates options with default settings: reject mode, default limits,
    /// default catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for sanitize mode.
    pub fn sanitize() -> Self {
        Self::default().with_mode(ValidationMode::SanitizeInPlace)
    }

    /// Sets the validation mode.
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the reader limits.
    pub fn with_reader_config(mut self, reader: ReaderConfig) -> Self {
        self.reader = reader;
        self
    }

    /// Sets the output settings.
    pub fn with_writer_config(mut self, writer: WriterConfig) -> Self {
        self.writer = writer;
        self
    }

    /// Overrides the policy catalog.
    pub fn with_policy(mut self, policy: impl Into<Arc<PolicyCatalog>>) -> Self {
        self.policy = Some(policy.into());
        self
    }
}

/// The result of validating one document.
#[derive(Debug)]
pub enum ValidationOutcome {
    /// No violations; `svg` is the serialized document
    Accepted {
        /// The parsed document
        document: Document,
        /// The serialized document
        svg: Vec<u8>,
    },
    /// Violations found in reject mode, or the root element was refused
    Rejected {
        /// Violations in document order
        violations: Vec<Violation>,
    },
    /// Violations found and removed in sanitize mode
    Sanitized {
        /// The pruned document
        document: Document,
        /// The serialized pruned document
        svg: Vec<u8>,
        /// Violations in document order
        violations: Vec<Violation>,
    },
    /// The document could not be parsed safely
    Invalid(Error),
}

impl ValidationOutcome {
    /// Returns true only for `Accepted`.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted { .. })
    }

    /// Returns the serialized accepted or sanitized document.
    pub fn sanitized_document(&self) -> Option<&[u8]> {
        match self {
            ValidationOutcome::Accepted { svg, .. } | ValidationOutcome::Sanitized { svg, .. } => {
                Some(svg)
            }
            _ => None,
        }
    }

    /// Returns the accepted or sanitized tree.
    pub fn document(&self) -> Option<&Document> {
        match self {
            ValidationOutcome::Accepted { document, .. }
            | ValidationOutcome::Sanitized { document, .. } => Some(document),
            _ => None,
        }
    }

    /// Returns the violations in document order.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationOutcome::Rejected { violations }
            | ValidationOutcome::Sanitized { violations, .. } => violations,
            _ => &[],
        }
    }

    /// Returns the distinct names of offending elements and attributes.
    pub fn offending_names(&self) -> BTreeSet<String> {
        self.violations().iter().map(|v| v.name.clone()).collect()
    }

    /// Returns the parse or I/O error of an `Invalid` outcome.
    pub fn error(&self) -> Option<&Error> {
        match self {
            ValidationOutcome::Invalid(e) => Some(e),
            _ => None,
        }
    }

    /// Returns a short name for the outcome.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationOutcome::Accepted { .. } => "accepted",
            ValidationOutcome::Rejected { .. } => "rejected",
            ValidationOutcome::Sanitized { .. } => "sanitized",
            ValidationOutcome::Invalid(_) => "invalid",
        }
    }

    /// Builds the flat report handed to callers outside Rust.
    pub fn report(&self) -> ValidationReport {
        ValidationReport {
            valid: self.is_valid(),
            sanitized_document: self
                .sanitized_document()
                .map(|svg| String::from_utf8_lossy(svg).into_owned()),
            violations: self.violations().to_vec(),
            error: self.error().map(|e| e.to_string()),
        }
    }
}

/// A flat summary of a [`ValidationOutcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationReport {
    /// True only when the document was accepted unchanged
    pub valid: bool,
    /// The accepted or sanitized document
    pub sanitized_document: Option<String>,
    /// Violations in document order
    pub violations: Vec<Violation>,
    /// Why the document could not be parsed
    pub error: Option<String>,
}

/// A reusable validator holding its options and catalog.
///
/// `SvgValidator` is `Send + Sync`; one instance can validate documents from
/// many threads at once.
#[derive(Debug, Clone)]
pub struct SvgValidator {
    mode: ValidationMode,
    catalog: Arc<PolicyCatalog>,
    reader: SvgReader,
    writer: SvgWriter,
}

impl Default for SvgValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgValidator {
    /// Creates a validator with default options.
    pub fn new() -> Self {
        Self::with_options(&ValidationOptions::default())
    }

    /// Creates a validator from options.
    pub fn with_options(options: &ValidationOptions) -> Self {
        Self {
            mode: options.mode,
            catalog: options
                .policy
                .clone()
                .unwrap_or_else(PolicyCatalog::shared_default),
            reader: SvgReader::with_config(options.reader.clone()),
            writer: SvgWriter::with_config(options.writer.clone()),
        }
    }

    /// Returns the catalog this validator checks against.
    pub fn catalog(&self) -> &PolicyCatalog {
        &self.catalog
    }

    /// Returns the validation mode.
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Validates raw SVG bytes.
    ///
    /// # Arguments
    ///
    /// * `input` - Untrusted document bytes
    ///
    /// # Returns
    ///
    /// `Invalid` if the input cannot be parsed safely, otherwise the verdict
    /// of the tree walk with the serialized document when one survives.
    pub fn validate(&self, input: &[u8]) -> ValidationOutcome {
        let document = match self.reader.parse(input) {
            Ok(document) => document,
            Err(e) => {
                debug!(error = %e, "document could not be parsed safely");
                return ValidationOutcome::Invalid(e.into());
            }
        };

        let outcome = match evaluate(document, &self.catalog, self.mode) {
            Verdict::Accepted(document) => match self.writer.write_to_vec(&document) {
                Ok(svg) => ValidationOutcome::Accepted { document, svg },
                Err(e) => ValidationOutcome::Invalid(e),
            },
            Verdict::Rejected(violations) => ValidationOutcome::Rejected { violations },
            Verdict::Sanitized(document, violations) => {
                match self.writer.write_to_vec(&document) {
                    Ok(svg) => ValidationOutcome::Sanitized {
                        document,
                        svg,
                        violations,
                    },
                    Err(e) => ValidationOutcome::Invalid(e),
                }
            }
        };

        debug!(
            outcome = outcome.kind(),
            violations = outcome.violations().len(),
            "validated document"
        );
        outcome
    }

    /// Validates an SVG string.
    pub fn validate_str(&self, input: &str) -> ValidationOutcome {
        self.validate(input.as_bytes())
    }

    /// Reads and validates an SVG file.
    ///
    /// Files larger than the reader's size limit are refused without being
    /// read.
    pub fn validate_file<P: AsRef<Path>>(&self, path: P) -> ValidationOutcome {
        let path = path.as_ref();
        let limit = self.reader.config().max_input_size;

        match fs::metadata(path) {
            Ok(meta) if meta.len() > limit as u64 => {
                return ValidationOutcome::Invalid(
                    crate::error::ParseError::InputTooLarge {
                        size: usize::try_from(meta.len()).unwrap_or(usize::MAX),
                        limit,
                    }
                    .into(),
                );
            }
            Ok(_) => {}
            Err(e) => return ValidationOutcome::Invalid(Error::Io(e)),
        }

        match fs::read(path) {
            Ok(bytes) => self.validate(&bytes),
            Err(e) => ValidationOutcome::Invalid(Error::Io(e)),
        }
    }
}

/// Validates raw SVG bytes.
///
/// # Arguments
///
/// * `input` - Untrusted document bytes
/// * `options` - Mode, limits, output settings and optional catalog override
pub fn validate(input: &[u8], options: &ValidationOptions) -> ValidationOutcome {
    SvgValidator::with_options(options).validate(input)
}

/// Validates an SVG string.
pub fn validate_str(input: &str, options: &ValidationOptions) -> ValidationOutcome {
    validate(input.as_bytes(), options)
}

/// Reads and validates an SVG file.
pub fn validate_file<P: AsRef<Path>>(path: P, options: &ValidationOptions) -> ValidationOutcome {
    SvgValidator::with_options(options).validate_file(path)
}
