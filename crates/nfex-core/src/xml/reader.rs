//! Event-driven XML to tree conversion.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};
use tracing::trace;

use super::{ATTRIBUTE_PREFIX, Result, TEXT_KEY};
use crate::error::XmlError;

/// An element whose end tag has not been seen yet.
struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>, position: u64) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut children = Map::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| XmlError::Parse {
                position,
                reason: e.to_string(),
            })?;

            let key = attr.key.as_ref();
            if key == b"xmlns" || key.starts_with(b"xmlns:") {
                continue;
            }

            let local = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| XmlError::Parse {
                position,
                reason: e.to_string(),
            })?;
            children.insert(
                format!("{}{}", ATTRIBUTE_PREFIX, local),
                Value::String(value.into_owned()),
            );
        }

        Ok(Self {
            name,
            children,
            text: String::new(),
        })
    }

    fn insert(&mut self, name: String, value: Value) {
        match self.children.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }

    fn close(mut self) -> (String, Value) {
        let text = self.text.trim().to_string();
        if self.children.is_empty() {
            return (self.name, Value::String(text));
        }

        if !text.is_empty() {
            self.children.insert(TEXT_KEY.to_string(), Value::String(text));
        }
        (self.name, Value::Object(self.children))
    }
}

/// Parse XML text into a tree keyed by the root element's local name.
pub fn parse_xml(text: &str) -> Result<Value> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(XmlError::Parse {
                    position,
                    reason: e.to_string(),
                });
            }
        };

        match event {
            Event::Start(e) => stack.push(Frame::open(&e, position)?),
            Event::Empty(e) => {
                let (name, value) = Frame::open(&e, position)?.close();
                attach(&mut stack, &mut root, name, value)?;
            }
            Event::Text(e) => {
                if let Some(top) = stack.last_mut() {
                    let unescaped = e.unescape().map_err(|err| XmlError::Parse {
                        position,
                        reason: err.to_string(),
                    })?;
                    top.text.push_str(&unescaped);
                }
            }
            Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let frame = stack.pop().ok_or_else(|| XmlError::Unbalanced(name.clone()))?;
                if frame.name != name {
                    return Err(XmlError::Unbalanced(name));
                }
                let (name, value) = frame.close();
                attach(&mut stack, &mut root, name, value)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::Unbalanced(open.name.clone()));
    }

    let (name, value) = root.ok_or(XmlError::Empty)?;
    trace!("Parsed XML document with root <{}>", name);

    let mut tree = Map::new();
    tree.insert(name, value);
    Ok(Value::Object(tree))
}

fn attach(
    stack: &mut [Frame],
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.insert(name, value);
        return Ok(());
    }

    if root.is_some() {
        // A second top-level element
        return Err(XmlError::Unbalanced(name));
    }
    *root = Some((name, value));
    Ok(())
}
