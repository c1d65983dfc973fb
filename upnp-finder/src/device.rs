//! Path-addressable model of a UPnP device description.
//!
//! Wraps the nested mapping produced by `upnp_parser` together with the
//! location it was fetched from. Values are addressed with dotted paths
//! such as `device.friendlyName` or `device.serviceList.service.serviceId`.

use serde::Serialize;
use upnp_parser::{Mapping, Value};

use crate::error::Result;

const PRESENTATION_URL: &str = "device.presentationURL";

/// A resolved device description.
///
/// Built once per successful resolution and never mutated afterwards. A
/// relative `device.presentationURL` is made absolute against the
/// description location at construction time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceDescriptor {
    location: String,
    info: Mapping,
}

impl DeviceDescriptor {
    /// Parse a description document fetched from `location`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Document` if the document is malformed or has
    /// no root element.
    pub fn parse(location: &str, document: &str) -> Result<Self> {
        let info = upnp_parser::parse(document)?;
        Ok(Self::from_mapping(location, info))
    }

    /// Wrap an already parsed document.
    pub fn from_mapping(location: &str, info: Mapping) -> Self {
        let mut device = Self {
            location: location.to_string(),
            info,
        };
        device.normalize_presentation_url();
        device
    }

    /// Look up a value by dotted path.
    ///
    /// Returns `None` as soon as a segment is missing, an intermediate value
    /// is not a mapping, or the element at the path has no content.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.info.get(first)?;
        for segment in segments {
            current = current.as_map()?.get(segment)?;
        }
        if current.is_empty() {
            None
        } else {
            Some(current)
        }
    }

    /// Text at a dotted path, `None` if absent or not a leaf.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Assign a value at a dotted path, creating intermediate mappings.
    ///
    /// An intermediate that exists but is not a mapping is replaced.
    pub(crate) fn set(&mut self, path: &str, value: impl Into<Value>) {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut current = &mut self.info;
        for segment in parents {
            let entry = current
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Map(Mapping::new()));
            if entry.as_map().is_none() {
                *entry = Value::Map(Mapping::new());
            }
            current = match entry.as_map_mut() {
                Some(map) => map,
                None => return,
            };
        }
        current.insert((*last).to_string(), value.into());
    }

    fn normalize_presentation_url(&mut self) {
        let Some(relative) = self
            .get_str(PRESENTATION_URL)
            .filter(|url| url.starts_with('/'))
        else {
            return;
        };

        let base = self
            .location
            .rfind('/')
            .map_or(self.location.as_str(), |idx| &self.location[..idx]);
        let absolute = format!("{}{}", base, relative);
        self.set(PRESENTATION_URL, absolute);
    }

    /// URL the description was fetched from
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The whole parsed document
    pub fn info(&self) -> &Mapping {
        &self.info
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.get_str("device.friendlyName")
    }

    pub fn device_type(&self) -> Option<&str> {
        self.get_str("device.deviceType")
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.get_str("device.manufacturer")
    }

    pub fn model_name(&self) -> Option<&str> {
        self.get_str("device.modelName")
    }

    /// Unique device name, e.g. `uuid:2f402f80-da50-11e1-9b23-001788255acc`
    pub fn udn(&self) -> Option<&str> {
        self.get_str("device.UDN")
    }

    /// Presentation page, absolute once normalized
    pub fn presentation_url(&self) -> Option<&str> {
        self.get_str(PRESENTATION_URL)
    }

    /// Host part of the description location.
    ///
    /// Returns `None` if the location is not a valid URL.
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.location)
            .ok()?
            .host_str()
            .map(str::to_string)
    }
}
