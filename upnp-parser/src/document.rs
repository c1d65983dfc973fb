//! Streaming conversion of XML text into a [`Mapping`].
//!
//! UPnP description documents are namespaced (`xmlns="urn:schemas-upnp-org:device-1-0"`,
//! vendor prefixes such as `dlna:X_DLNADOC`). Tags are keyed by their local
//! name so callers can address `device.friendlyName` regardless of the
//! namespaces a vendor chose.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ParseError, ParseResult};
use crate::value::{Mapping, Value};

/// Parse a document into the mapping of its root element's children.
///
/// The root element's own tag is not part of the result, so for a UPnP
/// description the top-level keys are `specVersion`, `device`, `URLBase`...
///
/// # Errors
///
/// Returns [`ParseError::MissingRequiredElement`] when the text has no root
/// element, [`ParseError::InvalidXmlStructure`] for unclosed or repeated root
/// elements, and [`ParseError::XmlDeserializationFailed`] for anything the
/// XML reader rejects.
pub fn parse(xml: &str) -> ParseResult<Mapping> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Mapping> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(ParseError::InvalidXmlStructure(
                        "multiple root elements".to_string(),
                    ));
                }
                stack.push(Frame::new(local_name(&start)?));
            }
            Event::Empty(start) => {
                let name = local_name(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.push_child(name, Value::Empty),
                    None if root.is_some() => {
                        return Err(ParseError::InvalidXmlStructure(
                            "multiple root elements".to_string(),
                        ));
                    }
                    None => root = Some(Mapping::new()),
                }
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    let bytes = data.into_inner();
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|e| ParseError::XmlDeserializationFailed(e.to_string()))?;
                    frame.text.push_str(text.trim());
                }
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or_else(|| {
                    ParseError::InvalidXmlStructure("closing tag without an open element".to_string())
                })?;
                match stack.last_mut() {
                    Some(parent) => {
                        let name = frame.name.clone();
                        parent.push_child(name, frame.into_value());
                    }
                    None => root = Some(frame.children),
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no data
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::InvalidXmlStructure(format!(
            "unclosed element <{}>",
            open.name
        )));
    }

    root.ok_or_else(|| ParseError::MissingRequiredElement("root element".to_string()))
}

/// Tag name with any namespace prefix removed.
fn local_name(start: &BytesStart<'_>) -> ParseResult<String> {
    let name = start.local_name();
    std::str::from_utf8(name.as_ref())
        .map(str::to_string)
        .map_err(|e| ParseError::XmlDeserializationFailed(e.to_string()))
}

/// An element whose closing tag has not been read yet.
struct Frame {
    name: String,
    children: Mapping,
    child_count: usize,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Mapping::new(),
            child_count: 0,
            text: String::new(),
        }
    }

    /// Repeated sibling tags are keyed `tag-{index}` after the first.
    fn push_child(&mut self, name: String, value: Value) {
        let key = if self.children.contains_key(&name) {
            format!("{}-{}", name, self.child_count)
        } else {
            name
        };
        self.children.insert(key, value);
        self.child_count += 1;
    }

    fn into_value(self) -> Value {
        if self.child_count > 0 {
            Value::Map(self.children)
        } else if self.text.is_empty() {
            Value::Empty
        } else {
            Value::Text(self.text)
        }
    }
}
