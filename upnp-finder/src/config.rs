//! Configuration for a [`Finder`](crate::Finder).

use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use crate::error::{FinderError, Result};
use crate::ssdp::{DEFAULT_MX, DEFAULT_SEARCH_TARGET, SSDP_MULTICAST_ADDR, SSDP_PORT};

/// Configuration for SSDP discovery.
#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Destination of the M-SEARCH probe
    /// Default: 239.255.255.250:1900
    pub multicast_addr: SocketAddrV4,

    /// Local address the discovery socket binds to
    /// Default: 0.0.0.0:0 (any interface, ephemeral port)
    pub bind_addr: SocketAddrV4,

    /// Value of the probe's ST header
    /// Default: "upnp:rootdevice"
    pub search_target: String,

    /// Value of the probe's MX header (max response delay in seconds)
    /// Default: 2
    pub mx: u8,

    /// Multicast TTL for outgoing probes
    /// Default: 4, as recommended by UPnP 1.0
    pub multicast_ttl: u32,

    /// Size of the receive buffer; longer replies are truncated
    /// Default: 2048 bytes
    pub recv_buffer_size: usize,

    /// Timeout for fetching description documents
    /// Default: 5 seconds
    pub http_timeout: Duration,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            multicast_addr: SocketAddrV4::new(SSDP_MULTICAST_ADDR, SSDP_PORT),
            bind_addr: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0),
            search_target: DEFAULT_SEARCH_TARGET.to_string(),
            mx: DEFAULT_MX,
            multicast_ttl: 4,
            recv_buffer_size: 2048,
            http_timeout: Duration::from_secs(5),
        }
    }
}

impl FinderConfig {
    /// Create a new FinderConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Search for a specific device or service type instead of root devices
    pub fn with_search_target(mut self, search_target: impl Into<String>) -> Self {
        self.search_target = search_target.into();
        self
    }

    pub fn with_mx(mut self, mx: u8) -> Self {
        self.mx = mx;
        self
    }

    pub fn with_bind_addr(mut self, bind_addr: SocketAddrV4) -> Self {
        self.bind_addr = bind_addr;
        self
    }

    pub fn with_multicast_addr(mut self, multicast_addr: SocketAddrV4) -> Self {
        self.multicast_addr = multicast_addr;
        self
    }

    pub fn with_recv_buffer_size(mut self, recv_buffer_size: usize) -> Self {
        self.recv_buffer_size = recv_buffer_size;
        self
    }

    pub fn with_http_timeout(mut self, http_timeout: Duration) -> Self {
        self.http_timeout = http_timeout;
        self
    }

    /// Check that the probe built from this configuration is a valid
    /// SSDP request.
    pub fn validate(&self) -> Result<()> {
        if self.search_target.is_empty() {
            return Err(FinderError::Configuration(
                "search_target must not be empty".to_string(),
            ));
        }

        // The probe is sent as ASCII and header lines are CRLF-delimited
        if !self
            .search_target
            .bytes()
            .all(|b| b.is_ascii_graphic() || b == b' ')
        {
            return Err(FinderError::Configuration(format!(
                "search_target must be printable ASCII: {:?}",
                self.search_target
            )));
        }

        if self.mx == 0 {
            return Err(FinderError::Configuration(
                "mx must be at least 1 second".to_string(),
            ));
        }

        if self.recv_buffer_size == 0 {
            return Err(FinderError::Configuration(
                "recv_buffer_size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FinderConfig::default();
        assert_eq!(config.multicast_addr.to_string(), "239.255.255.250:1900");
        assert_eq!(config.search_target, "upnp:rootdevice");
        assert_eq!(config.mx, 2);
        assert_eq!(config.recv_buffer_size, 2048);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = FinderConfig::new()
            .with_search_target("urn:schemas-upnp-org:device:MediaRenderer:1")
            .with_mx(5)
            .with_recv_buffer_size(400)
            .with_http_timeout(Duration::from_secs(1));

        assert_eq!(config.search_target, "urn:schemas-upnp-org:device:MediaRenderer:1");
        assert_eq!(config.mx, 5);
        assert_eq!(config.recv_buffer_size, 400);
        assert_eq!(config.http_timeout, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(FinderConfig::new().with_search_target("").validate().is_err());
        assert!(FinderConfig::new()
            .with_search_target("ssdp:all\r\nX-EVIL: 1")
            .validate()
            .is_err());
        assert!(FinderConfig::new().with_search_target("répéteur").validate().is_err());
        assert!(FinderConfig::new().with_mx(0).validate().is_err());
        assert!(FinderConfig::new().with_recv_buffer_size(0).validate().is_err());
    }
}
