//! Tree to XML serialisation.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::Value;

use super::{ATTRIBUTE_PREFIX, Result, TEXT_KEY};
use crate::error::XmlError;

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Write a tree as an indented XML document with `root_name` as the root element.
pub fn write_xml(root_name: &str, value: &Value) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_error)?;

    write_element(&mut writer, root_name, value)?;

    String::from_utf8(writer.into_inner().into_inner()).map_err(write_error)
}

fn write_element(writer: &mut XmlWriter, name: &str, value: &Value) -> Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
            Ok(())
        }
        Value::Object(map) => {
            let mut start = BytesStart::new(name);
            let mut text = None;
            let mut children = Vec::new();

            for (key, child) in map {
                if let Some(attr) = key.strip_prefix(ATTRIBUTE_PREFIX) {
                    if let Some(attr_value) = scalar_text(child) {
                        start.push_attribute((attr, attr_value.as_str()));
                    }
                } else if key == TEXT_KEY {
                    text = scalar_text(child);
                } else {
                    children.push((key.as_str(), child));
                }
            }

            if children.is_empty() && text.as_deref().is_none_or(str::is_empty) {
                return writer.write_event(Event::Empty(start)).map_err(write_error);
            }

            writer.write_event(Event::Start(start)).map_err(write_error)?;
            if let Some(text) = text {
                writer
                    .write_event(Event::Text(BytesText::new(&text)))
                    .map_err(write_error)?;
            }
            for (key, child) in children {
                write_element(writer, key, child)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(write_error)
        }
        other => match scalar_text(other).filter(|t| !t.is_empty()) {
            Some(text) => {
                writer
                    .write_event(Event::Start(BytesStart::new(name)))
                    .map_err(write_error)?;
                writer
                    .write_event(Event::Text(BytesText::new(&text)))
                    .map_err(write_error)?;
                writer
                    .write_event(Event::End(BytesEnd::new(name)))
                    .map_err(write_error)
            }
            None => writer
                .write_event(Event::Empty(BytesStart::new(name)))
                .map_err(write_error),
        },
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn write_error(e: impl std::fmt::Display) -> XmlError {
    XmlError::Write(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_attributes_and_children() {
        let xml = write_xml(
            "infNFe",
            &json!({
                "@Id": "NFe123",
                "ide": { "nNF": "000001234" },
                "det": [{ "@nItem": "1" }, { "@nItem": "2" }],
                "vazio": "",
                "qVol": 10
            }),
        )
        .unwrap();

        assert!(xml.contains(r#"<infNFe Id="NFe123">"#));
        assert!(xml.contains("<nNF>000001234</nNF>"));
        assert!(xml.contains(r#"<det nItem="1"/>"#));
        assert!(xml.contains(r#"<det nItem="2"/>"#));
        assert!(xml.contains("<vazio/>"));
        assert!(xml.contains("<qVol>10</qVol>"));
        assert!(xml.trim_end().ends_with("</infNFe>"));
    }

    #[test]
    fn test_write_escapes_text() {
        let xml = write_xml("infCpl", &json!("A & B <C>")).unwrap();
        assert!(xml.contains("<infCpl>A &amp; B &lt;C&gt;</infCpl>"));
    }
}
