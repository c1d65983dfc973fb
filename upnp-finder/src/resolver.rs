//! Turns a location into a [`DeviceDescriptor`].

use std::sync::Arc;

use crate::device::DeviceDescriptor;
use crate::error::{FinderError, Result};
use crate::http::HttpFetch;
use crate::track::TrackTable;

/// Fetches and parses description documents.
///
/// Failures are logged and reported as `None`; they never reach the caller
/// of the discovery API. A location is tracked only after it resolved, so a
/// failed location is retried the next time a reply advertises it.
pub struct Resolver {
    fetcher: Arc<dyn HttpFetch>,
    tracked: Arc<TrackTable>,
}

impl Resolver {
    pub fn new(fetcher: Arc<dyn HttpFetch>, tracked: Arc<TrackTable>) -> Self {
        Self { fetcher, tracked }
    }

    /// Resolve a location, logging the cause on failure.
    pub async fn resolve(&self, location: &str) -> Option<DeviceDescriptor> {
        match self.try_resolve(location).await {
            Ok(device) => {
                tracing::info!(
                    "Resolved {} ({})",
                    device.friendly_name().unwrap_or("unnamed device"),
                    location
                );
                Some(device)
            }
            Err(e) => {
                tracing::error!("Failed to resolve device at {}: {}", location, e);
                None
            }
        }
    }

    async fn try_resolve(&self, location: &str) -> Result<DeviceDescriptor> {
        let response = self.fetcher.get(location).await?;
        if !response.is_success() {
            return Err(FinderError::Fetch {
                location: location.to_string(),
                reason: format!("HTTP status {}", response.status),
            });
        }

        let device = DeviceDescriptor::parse(location, &response.body)?;
        self.tracked.add(location);
        Ok(device)
    }
}
