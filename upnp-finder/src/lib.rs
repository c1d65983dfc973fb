//! UPnP device discovery library
//!
//! This crate discovers devices on the local network using SSDP (Simple
//! Service Discovery Protocol): it multicasts an M-SEARCH probe, listens for
//! the unicast replies, fetches the description document advertised in each
//! reply's `LOCATION` header and exposes it as a [`DeviceDescriptor`]
//! addressable by dotted paths.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> upnp_finder::Result<()> {
//! let devices = upnp_finder::find_devices(Duration::from_secs(3)).await?;
//! for device in devices {
//!     println!("{:?} at {}", device.get_str("device.friendlyName"), device.location());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Continuous Discovery
//!
//! A finder can also keep probing and hand each newly resolved device to a
//! callback:
//!
//! ```no_run
//! use std::time::Duration;
//! use upnp_finder::Finder;
//!
//! # #[tokio::main]
//! # async fn main() -> upnp_finder::Result<()> {
//! let finder = Finder::new().await?;
//! finder.set_callback(|device| {
//!     println!("Name: {:?}", device.friendly_name());
//! })?;
//! finder.probe_periodically(Duration::from_secs(15))?;
//! tokio::signal::ctrl_c().await?;
//! finder.close().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod delivery;
mod error;
mod finder;
pub mod device;
pub mod http;
pub mod listener;
pub mod logging;
pub mod resolver;
pub mod ssdp;
pub mod track;

pub use config::FinderConfig;
pub use device::DeviceDescriptor;
pub use error::{FinderError, Result};
pub use finder::Finder;
pub use http::{HttpFetch, HttpResponse, ReqwestFetcher};
pub use ssdp::SsdpHeaders;
pub use track::TrackTable;
pub use upnp_parser::{Mapping, Value};

use futures::StreamExt;
use std::time::Duration;

/// Discover devices for `window` with the default configuration.
///
/// This is a convenience function that collects all discovered devices into
/// a Vec. For streaming or continuous discovery, use [`Finder`] directly.
pub async fn find_devices(window: Duration) -> Result<Vec<DeviceDescriptor>> {
    find_devices_with_config(FinderConfig::default(), window).await
}

/// Discover devices for `window` with a custom configuration.
pub async fn find_devices_with_config(
    config: FinderConfig,
    window: Duration,
) -> Result<Vec<DeviceDescriptor>> {
    let finder = Finder::with_config(config).await?;
    let devices = finder.discover(window)?.collect::<Vec<_>>().await;
    finder.close().await;
    Ok(devices)
}
