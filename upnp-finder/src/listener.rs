//! Reader side of the discovery socket.
//!
//! A listener owns a task that waits for read-readiness on the shared UDP
//! socket, takes one datagram per wakeup and hands new locations to a
//! callback. Bad datagrams are logged and dropped; the task only ends when
//! the listener is detached.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

use crate::ssdp;
use crate::track::TrackTable;

/// Pause after a failed receive so a persistent socket error cannot spin.
const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(100);

enum ListenerState {
    Idle,
    Active(JoinHandle<()>),
}

/// Receives SSDP replies and reports untracked locations.
pub struct Listener {
    socket: Arc<UdpSocket>,
    tracked: Arc<TrackTable>,
    buffer_size: usize,
    state: ListenerState,
}

impl Listener {
    pub fn new(socket: Arc<UdpSocket>, tracked: Arc<TrackTable>, buffer_size: usize) -> Self {
        Self {
            socket,
            tracked,
            buffer_size,
            state: ListenerState::Idle,
        }
    }

    /// Start reading datagrams.
    ///
    /// `on_location_found` runs once per datagram whose LOCATION is not
    /// tracked. Attaching an active listener replaces its callback.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn attach<F>(&mut self, on_location_found: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        if self.is_active() {
            tracing::debug!("Listener already active, replacing reader");
            self.detach();
        }

        let socket = Arc::clone(&self.socket);
        let tracked = Arc::clone(&self.tracked);
        let buffer_size = self.buffer_size;

        let handle = tokio::spawn(async move {
            let mut buffer = vec![0u8; buffer_size];
            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, source)) => {
                        if let Some(location) = handle_datagram(&buffer[..len], source, &tracked) {
                            on_location_found(location);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("SSDP receive failed: {}", e);
                        tokio::time::sleep(RECV_ERROR_BACKOFF).await;
                    }
                }
            }
        });

        self.state = ListenerState::Active(handle);
    }

    /// Stop reading datagrams. Does nothing when already idle.
    pub fn detach(&mut self) {
        if let ListenerState::Active(handle) = std::mem::replace(&mut self.state, ListenerState::Idle) {
            handle.abort();
        }
    }

    /// Detach and wait until the reader task has released the socket.
    pub async fn shutdown(&mut self) {
        if let ListenerState::Active(handle) = std::mem::replace(&mut self.state, ListenerState::Idle) {
            handle.abort();
            // Cancellation is the expected outcome
            let _ = handle.await;
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ListenerState::Active(_))
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Decode one reply and return its LOCATION if it is not tracked yet.
pub fn handle_datagram(datagram: &[u8], source: SocketAddr, tracked: &TrackTable) -> Option<String> {
    tracing::trace!("Received {} bytes from {}", datagram.len(), source);

    let headers = match ssdp::parse_response(datagram) {
        Ok(headers) => headers,
        Err(e) => {
            tracing::warn!("Discarding datagram from {}: {}", source, e);
            return None;
        }
    };

    let Some(location) = headers.location() else {
        tracing::warn!("Discarding reply from {}: missing LOCATION header", source);
        return None;
    };

    if tracked.contains(location) {
        tracing::trace!("Already tracking {}", location);
        return None;
    }

    tracing::info!("Device found at {}", location);
    Some(location.to_string())
}
