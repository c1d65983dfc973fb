//! Discovery orchestration.
//!
//! A [`Finder`] owns the discovery socket. Replies are read by a
//! [`Listener`], new locations are resolved concurrently and the resulting
//! devices reach the caller either as a [`Stream`] (`discover`) or through a
//! callback (`set_callback`).

use std::collections::HashSet;
use std::net::{SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, BoxStream, Stream, StreamExt};
use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::FinderConfig;
use crate::delivery::Delivery;
use crate::device::DeviceDescriptor;
use crate::error::{FinderError, Result};
use crate::http::{HttpFetch, ReqwestFetcher};
use crate::listener::Listener;
use crate::resolver::Resolver;
use crate::ssdp;
use crate::track::TrackTable;

/// SSDP discovery session.
///
/// Creating a finder binds the socket and starts listening for replies;
/// [`close`](Finder::close) (or dropping the finder) stops every background
/// task and releases the socket.
///
/// # Examples
///
/// ```no_run
/// use futures::StreamExt;
/// use std::time::Duration;
/// use upnp_finder::Finder;
///
/// # #[tokio::main]
/// # async fn main() -> upnp_finder::Result<()> {
/// let finder = Finder::new().await?;
/// let mut devices = finder.discover(Duration::from_secs(3))?;
/// while let Some(device) = devices.next().await {
///     println!("{:?} at {}", device.friendly_name(), device.location());
/// }
/// drop(devices);
/// finder.close().await;
/// # Ok(())
/// # }
/// ```
pub struct Finder {
    config: FinderConfig,
    socket: Arc<UdpSocket>,
    probe: Arc<[u8]>,
    tracked: Arc<TrackTable>,
    listener: Listener,
    delivery: Delivery,
    resolutions: Resolutions,
    periodic_probe: Mutex<Option<JoinHandle<()>>>,
}

impl Finder {
    /// Create a finder with the default configuration.
    ///
    /// # Errors
    ///
    /// Fails if the socket cannot be bound or the HTTP client cannot be built.
    pub async fn new() -> Result<Self> {
        Self::with_config(FinderConfig::default()).await
    }

    /// Create a finder fetching descriptions with a `reqwest` client.
    pub async fn with_config(config: FinderConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = ReqwestFetcher::new(config.http_timeout)?;
        Self::with_fetcher(config, Arc::new(fetcher)).await
    }

    /// Create a finder with an injected HTTP capability.
    pub async fn with_fetcher(config: FinderConfig, fetcher: Arc<dyn HttpFetch>) -> Result<Self> {
        config.validate()?;

        let socket = UdpSocket::bind(config.bind_addr).await?;
        socket.set_multicast_loop_v4(true)?;
        socket.set_multicast_ttl_v4(config.multicast_ttl)?;
        let socket = Arc::new(socket);

        let tracked = Arc::new(TrackTable::new());
        let delivery = Delivery::new();
        let resolutions = Resolutions::default();
        let dispatcher = Dispatcher {
            resolver: Arc::new(Resolver::new(fetcher, Arc::clone(&tracked))),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            sender: delivery.sender(),
            resolutions: resolutions.clone(),
        };

        let mut listener = Listener::new(
            Arc::clone(&socket),
            Arc::clone(&tracked),
            config.recv_buffer_size,
        );
        listener.attach(move |location| dispatcher.dispatch(location));

        tracing::debug!("Finder listening on {}", socket.local_addr()?);

        let probe = ssdp::build_probe(&config.search_target, config.mx).into();
        Ok(Self {
            config,
            socket,
            probe,
            tracked,
            listener,
            delivery,
            resolutions,
            periodic_probe: Mutex::new(None),
        })
    }

    /// Send one M-SEARCH probe without waiting for replies.
    ///
    /// Send failures are logged; replies to earlier probes keep arriving.
    pub async fn probe(&self) {
        send_probe(&self.socket, &self.probe, self.config.multicast_addr).await;
    }

    /// Send a probe, then wait `delay` before returning.
    pub async fn probe_after_delay(&self, delay: Duration) {
        self.probe().await;
        tokio::time::sleep(delay).await;
    }

    /// Re-send the probe every `interval` until the finder is closed.
    ///
    /// The first probe goes out immediately. Calling this again replaces
    /// the previous schedule.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Configuration` for a zero interval.
    pub fn probe_periodically(&self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(FinderError::Configuration(
                "probe interval must be greater than zero".to_string(),
            ));
        }

        let socket = Arc::clone(&self.socket);
        let probe = Arc::clone(&self.probe);
        let target = self.config.multicast_addr;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                send_probe(&socket, &probe, target).await;
            }
        });

        if let Some(previous) = self.periodic_probe.lock().replace(task) {
            previous.abort();
        }
        tracing::info!("Probing every {} seconds", interval.as_secs_f32());
        Ok(())
    }

    /// Probe once and yield the devices resolved within `window`.
    ///
    /// The stream ends without error when the window elapses. Devices
    /// resolved after that stay queued for the next call.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::DeliveryModeConflict` if a callback was set.
    pub fn discover(&self, window: Duration) -> Result<BoxStream<'_, DeviceDescriptor>> {
        self.delivery.use_stream()?;

        let stream = stream::once(async move {
            let queue = self.delivery.queue().await;
            self.probe().await;
            (queue, Instant::now() + window)
        })
        .flat_map(|(queue, deadline)| deliveries_until(queue, deadline));

        Ok(stream.boxed())
    }

    /// Hand every resolved device to `on_device` instead of queueing it.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::DeliveryModeConflict` if `discover` was used or
    /// a callback is already set.
    pub fn set_callback<F>(&self, on_device: F) -> Result<()>
    where
        F: FnMut(DeviceDescriptor) + Send + 'static,
    {
        self.delivery.use_callback(on_device)
    }

    /// Locations of every resolved device, sorted.
    pub fn tracked(&self) -> Vec<String> {
        self.tracked.snapshot()
    }

    /// Forget a location so the next reply advertising it is resolved again.
    ///
    /// Returns `false` if the location was not tracked.
    pub fn untrack(&self, location: &str) -> bool {
        self.tracked.remove(location)
    }

    /// Address of the discovery socket
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Stop probing, listening, resolving and delivering, then release the
    /// socket and the HTTP capability.
    pub async fn close(mut self) {
        let periodic = self.periodic_probe.lock().take();
        if let Some(task) = periodic {
            task.abort();
            let _ = task.await;
        }
        self.listener.shutdown().await;
        // The listener is gone, so no new resolution can start
        self.resolutions.shutdown().await;
        self.delivery.shutdown().await;
        tracing::debug!("Finder closed");
    }
}

impl Drop for Finder {
    fn drop(&mut self) {
        if let Some(task) = self.periodic_probe.lock().take() {
            task.abort();
        }
        self.resolutions.abort_all();
    }
}

async fn send_probe(socket: &UdpSocket, probe: &[u8], target: SocketAddrV4) {
    tracing::info!("Discovering devices...");
    if let Err(e) = socket.send_to(probe, target).await {
        tracing::warn!("Failed to send M-SEARCH to {}: {}", target, e);
    }
}

/// Drain the delivery queue until `deadline`.
fn deliveries_until<'a>(
    queue: MutexGuard<'a, Option<mpsc::UnboundedReceiver<DeviceDescriptor>>>,
    deadline: Instant,
) -> impl Stream<Item = DeviceDescriptor> + 'a {
    stream::unfold(queue, move |mut queue| async move {
        let receiver = queue.as_mut()?;
        match tokio::time::timeout_at(deadline, receiver.recv()).await {
            Ok(Some(device)) => Some((device, queue)),
            Ok(None) => None,
            Err(_) => {
                tracing::debug!("Discovery window elapsed");
                None
            }
        }
    })
}

/// Starts one resolution per location, skipping locations already in flight.
///
/// The tracking table only learns a location once it resolved, so without
/// this set every duplicate reply arriving during a fetch would start
/// another fetch.
struct Dispatcher {
    resolver: Arc<Resolver>,
    in_flight: Arc<Mutex<HashSet<String>>>,
    sender: mpsc::UnboundedSender<DeviceDescriptor>,
    resolutions: Resolutions,
}

impl Dispatcher {
    fn dispatch(&self, location: String) {
        if !self.in_flight.lock().insert(location.clone()) {
            tracing::debug!("Resolution already in flight for {}", location);
            return;
        }

        let resolver = Arc::clone(&self.resolver);
        let in_flight = Arc::clone(&self.in_flight);
        let sender = self.sender.clone();
        let task = tokio::spawn(async move {
            let device = resolver.resolve(&location).await;
            in_flight.lock().remove(&location);
            if let Some(device) = device {
                if sender.send(device).is_err() {
                    tracing::debug!("Finder closed, dropping device at {}", location);
                }
            }
        });
        self.resolutions.push(task);
    }
}

/// Handles of the resolution tasks still running.
///
/// Each task holds the resolver and with it the HTTP capability, so
/// teardown must abort them.
#[derive(Clone, Default)]
struct Resolutions(Arc<Mutex<Vec<JoinHandle<()>>>>);

impl Resolutions {
    fn push(&self, task: JoinHandle<()>) {
        let mut tasks = self.0.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(task);
    }

    fn abort_all(&self) {
        for task in self.0.lock().drain(..) {
            task.abort();
        }
    }

    async fn shutdown(&self) {
        let tasks = std::mem::take(&mut *self.0.lock());
        if !tasks.is_empty() {
            tracing::debug!("Cancelling {} in-flight resolutions", tasks.len());
        }
        for task in tasks {
            task.abort();
            let _ = task.await;
        }
    }
}
