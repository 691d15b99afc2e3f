//! Error types for the safe-svg library.

use thiserror::Error;

/// Reasons a document could not be parsed safely.
///
/// Every variant is fatal to the current validation call. A document that
/// produces a `ParseError` is never treated as safe.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input exceeded the configured maximum size before parsing started
    #[error("input of {size} bytes exceeds the maximum of {limit} bytes")]
    InputTooLarge {
        /// Size of the rejected input in bytes
        size: usize,
        /// Configured maximum input size in bytes
        limit: usize,
    },

    /// The input is not UTF-8, or declares an encoding other than UTF-8
    #[error("invalid encoding: {0}")]
    EncodingInvalid(String),

    /// The document declares or references an external entity
    #[error("external entity is not allowed: {0}")]
    ExternalEntityDisallowed(String),

    /// Entity expansion would exceed the configured budget
    #[error("entity expansion exceeds the limit of {limit} bytes")]
    EntityExpansionLimitExceeded {
        /// Maximum number of bytes entity expansion may produce
        limit: usize,
    },

    /// Elements are nested deeper than the configured maximum
    #[error("element nesting exceeds the maximum depth of {0}")]
    NestingTooDeep(usize),

    /// The input is not well-formed XML
    #[error("malformed XML: {0}")]
    Malformed(String),
}

impl ParseError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        ParseError::Malformed(message.into())
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(e: quick_xml::Error) -> Self {
        ParseError::Malformed(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        ParseError::Malformed(e.to_string())
    }
}

impl From<std::str::Utf8Error> for ParseError {
    fn from(e: std::str::Utf8Error) -> Self {
        ParseError::EncodingInvalid(e.to_string())
    }
}

/// Errors that can occur when working with the safe-svg library.
#[derive(Error, Debug)]
pub enum Error {
    /// The document could not be parsed safely
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// XML serialization error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A policy catalog could not be built from the supplied configuration
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),
}

/// Result type alias for safe-svg operations.
pub type Result<T> = std::result::Result<T, Error>;
