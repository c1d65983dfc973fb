//! Set of description locations that resolved successfully.

use std::collections::HashSet;

use parking_lot::Mutex;

/// Locations of devices that have already been resolved.
///
/// Shared between the listener (existence checks), the resolver (adds) and
/// the finder's public API (snapshots and removals).
#[derive(Debug, Default)]
pub struct TrackTable {
    locations: Mutex<HashSet<String>>,
}

impl TrackTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, location: &str) -> bool {
        self.locations.lock().contains(location)
    }

    /// Returns `true` if the location was not tracked before.
    pub fn add(&self, location: &str) -> bool {
        self.locations.lock().insert(location.to_string())
    }

    /// Returns `true` if the location was tracked.
    pub fn remove(&self, location: &str) -> bool {
        self.locations.lock().remove(location)
    }

    /// Sorted copy of the tracked locations.
    pub fn snapshot(&self) -> Vec<String> {
        let mut locations: Vec<String> = self.locations.lock().iter().cloned().collect();
        locations.sort();
        locations
    }

    pub fn len(&self) -> usize {
        self.locations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.lock().is_empty()
    }
}
