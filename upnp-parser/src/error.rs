//! Error types for description document parsing

use thiserror::Error;

/// Errors that can occur while turning a document into a nested mapping
#[derive(Error, Debug)]
pub enum ParseError {
    /// The XML reader rejected the input
    #[error("XML deserialization failed: {0}")]
    XmlDeserializationFailed(String),

    /// Well-formed tokens in an invalid arrangement (unclosed or stray elements)
    #[error("Invalid XML structure: {0}")]
    InvalidXmlStructure(String),

    /// Missing required element
    #[error("Missing required element: {0}")]
    MissingRequiredElement(String),
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        ParseError::XmlDeserializationFailed(err.to_string())
    }
}

/// Result type alias for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;
