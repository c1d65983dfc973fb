//! Error types for the discovery engine.

use thiserror::Error;

/// Error type for discovery operations.
///
/// Per-datagram and per-resolution failures are logged and absorbed inside
/// the engine; callers only see the variants raised at construction time or
/// by misuse of the delivery API.
#[derive(Debug, Error)]
pub enum FinderError {
    /// Socket bind, send or receive failure
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Malformed SSDP reply (non-ASCII payload, bad folding, missing LOCATION)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Description document could not be fetched
    #[error("Failed to fetch {location}: {reason}")]
    Fetch { location: String, reason: String },

    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Description document is malformed or has no root element
    #[error("Invalid description document: {0}")]
    Document(#[from] upnp_parser::ParseError),

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Stream and callback delivery were both requested on one finder
    #[error("Finder already delivers devices through a {0}")]
    DeliveryModeConflict(&'static str),
}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, FinderError>;
