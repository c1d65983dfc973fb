//! Test helpers for finder integration tests
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use upnp_finder::{Finder, FinderConfig, FinderError, HttpFetch, HttpResponse};

/// Description document served by a fake device
#[derive(Debug, Clone)]
pub struct DeviceFixture {
    pub name: String,
    pub host: String,
    pub xml_content: String,
}

impl DeviceFixture {
    /// Load a fixture from the fixtures directory
    pub fn load(filename: &str, host: &str) -> Self {
        Self {
            name: filename.to_string(),
            host: host.to_string(),
            xml_content: load_fixture(filename),
        }
    }

    /// Location advertised in this device's SSDP replies
    pub fn location_url(&self) -> String {
        format!("http://{}/description.xml", self.host)
    }

    pub fn ssdp_response(&self) -> String {
        ssdp_response(&self.location_url())
    }
}

pub fn load_fixture(filename: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(filename);

    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", filename, e))
}

/// A unicast M-SEARCH reply advertising `location`
pub fn ssdp_response(location: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\n\
         CACHE-CONTROL: max-age=1800\r\n\
         EXT:\r\n\
         LOCATION: {}\r\n\
         SERVER: Linux/5.10 UPnP/1.0 test/1.0\r\n\
         ST: upnp:rootdevice\r\n\
         USN: uuid:2f402f80-da50-11e1-9b23-001788255acc::upnp:rootdevice\r\n\r\n",
        location
    )
}

/// Canned HTTP responses keyed by URL.
///
/// Each URL answers with its queued responses in order; the last one repeats.
/// Unknown URLs fail like an unreachable host.
#[derive(Default)]
pub struct StubFetcher {
    routes: Mutex<HashMap<String, Route>>,
    calls: AtomicUsize,
}

#[derive(Default)]
struct Route {
    responses: VecDeque<HttpResponse>,
    delay: Duration,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, status: u16, body: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .responses
            .push_back(HttpResponse::new(status, body));
        self
    }

    /// Delay every response for `url`
    pub fn delayed(self, url: &str, delay: Duration) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .delay = delay;
        self
    }

    /// Serve `fixture` at its location with status 200
    pub fn device(self, fixture: &DeviceFixture) -> Self {
        self.route(&fixture.location_url(), 200, &fixture.xml_content)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpFetch for StubFetcher {
    async fn get(&self, url: &str) -> upnp_finder::Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let (delay, response) = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(url) {
                Some(route) => {
                    let response = if route.responses.len() > 1 {
                        route.responses.pop_front()
                    } else {
                        route.responses.front().cloned()
                    };
                    (route.delay, response)
                }
                None => (Duration::ZERO, None),
            }
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        response.ok_or_else(|| FinderError::Fetch {
            location: url.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

/// A finder whose probes go to a local sink instead of the multicast group.
///
/// The sink socket must stay alive for the duration of the test.
pub async fn local_finder(fetcher: Arc<dyn HttpFetch>) -> (Finder, UdpSocket) {
    let sink = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let sink_port = sink.local_addr().unwrap().port();
    let config = FinderConfig::new()
        .with_multicast_addr(SocketAddrV4::new(Ipv4Addr::LOCALHOST, sink_port));
    let finder = Finder::with_fetcher(config, fetcher).await.unwrap();
    (finder, sink)
}

/// Loopback address of the finder's discovery socket
pub fn finder_addr(finder: &Finder) -> SocketAddr {
    let port = finder.local_addr().unwrap().port();
    SocketAddr::from((Ipv4Addr::LOCALHOST, port))
}

/// Play a device answering the probe
pub async fn send_reply(finder: &Finder, payload: &[u8]) {
    let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    device.send_to(payload, finder_addr(finder)).await.unwrap();
}
