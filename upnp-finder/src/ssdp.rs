//! SSDP message codec.
//!
//! Builds the M-SEARCH probe and parses reply datagrams into a
//! case-insensitive header map. Replies are HTTP/1.1-style responses sent
//! unicast back to the probing socket.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use crate::error::{FinderError, Result};

/// Standard SSDP multicast group (UPnP Device Architecture 1.0).
pub const SSDP_MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);

/// Standard SSDP port.
pub const SSDP_PORT: u16 = 1900;

/// Search target matching every root device.
pub const DEFAULT_SEARCH_TARGET: &str = "upnp:rootdevice";

/// Default MX value (max response delay in seconds).
pub const DEFAULT_MX: u8 = 2;

/// Build the M-SEARCH probe datagram.
///
/// Header order is fixed: `HOST`, `ST`, `MX`, `MAN`, each line CRLF
/// terminated and the request closed by an empty line.
pub fn build_probe(search_target: &str, mx: u8) -> Vec<u8> {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST:{}:{}\r\n\
         ST:{}\r\n\
         MX:{}\r\n\
         MAN:\"ssdp:discover\"\r\n\
         \r\n",
        SSDP_MULTICAST_ADDR, SSDP_PORT, search_target, mx
    )
    .into_bytes()
}

/// Headers of an SSDP message, keyed by lower-cased name.
///
/// Repeated headers are not modeled: the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SsdpHeaders {
    headers: HashMap<String, String>,
}

impl SsdpHeaders {
    /// Look up a header by name (ASCII case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// URL of the device description document
    pub fn location(&self) -> Option<&str> {
        self.get("location")
    }

    /// Unique service name, e.g. `uuid:...::upnp:rootdevice`
    pub fn usn(&self) -> Option<&str> {
        self.get("usn")
    }

    /// Search target the reply answers
    pub fn search_target(&self) -> Option<&str> {
        self.get("st")
    }

    pub fn server(&self) -> Option<&str> {
        self.get("server")
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterate over `(lower-cased name, value)` pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse the header block of an SSDP message.
///
/// The first line (request or status line) is skipped and empty lines are
/// ignored. A line starting with whitespace continues the previous header
/// and is appended after a single space. The first other line without a
/// `:` ends the header block.
///
/// # Errors
///
/// Returns `FinderError::Protocol` if a continuation line appears before
/// any header.
pub fn parse_headers(raw: &str) -> Result<SsdpHeaders> {
    let mut headers: HashMap<String, String> = HashMap::new();
    let mut previous: Option<String> = None;

    for line in raw.split('\n').skip(1) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            continue;
        }

        if line.starts_with(|c: char| c.is_whitespace()) {
            let name = previous.as_ref().ok_or_else(|| {
                FinderError::Protocol("continuation line before the first header".to_string())
            })?;
            if let Some(value) = headers.get_mut(name) {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }

        let Some(idx) = line.find(':') else {
            break;
        };
        let name = line[..idx].trim_end().to_ascii_lowercase();
        headers.insert(name.clone(), line[idx + 1..].trim().to_string());
        previous = Some(name);
    }

    Ok(SsdpHeaders { headers })
}

/// Decode a reply datagram and parse its headers.
///
/// # Errors
///
/// Returns `FinderError::Protocol` for non-ASCII payloads or malformed
/// header folding.
pub fn parse_response(datagram: &[u8]) -> Result<SsdpHeaders> {
    if !datagram.is_ascii() {
        return Err(FinderError::Protocol(
            "datagram is not ASCII".to_string(),
        ));
    }
    let text = std::str::from_utf8(datagram)
        .map_err(|e| FinderError::Protocol(format!("datagram is not ASCII: {}", e)))?;
    parse_headers(text)
}
