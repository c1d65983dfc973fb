//! # upnp-parser
//!
//! Turns UPnP description documents into a [`Mapping`] of local tag names,
//! so callers can walk `device.friendlyName` without caring about XML
//! namespaces or declaring serde structs for every vendor extension.
//!
//! ```rust
//! use upnp_parser::parse;
//!
//! let doc = parse("<root><device><friendlyName>Hue Bridge</friendlyName></device></root>")?;
//! let device = doc["device"].as_map().unwrap();
//! assert_eq!(device["friendlyName"].as_str(), Some("Hue Bridge"));
//! # Ok::<(), upnp_parser::ParseError>(())
//! ```

pub mod document;
pub mod error;
pub mod value;

pub use document::parse;
pub use error::{ParseError, ParseResult};
pub use value::{Mapping, Value};
