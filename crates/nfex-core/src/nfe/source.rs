//! Input shapes accepted by the mapper and their normalisation into one tree.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{NfexError, XmlError};
use crate::xml::{parse_xml, ATTRIBUTE_PREFIX, TEXT_KEY};

/// A fiscal document as received, before normalisation.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceDocument {
    /// Raw NFe XML text.
    Xml(String),
    /// Parsed-XML JSON where every element is a single-element array,
    /// attributes live under `$` and mixed text under `_`.
    WrappedJson(Value),
    /// Native provider JSON under `nfeProc → NFe|nfe → infNFe`.
    ProviderJson(Value),
}

impl SourceDocument {
    /// Classify a JSON payload as wrapped parser output or provider JSON.
    pub fn from_json(value: Value) -> Self {
        if is_wrapped(&value) {
            SourceDocument::WrappedJson(value)
        } else {
            SourceDocument::ProviderJson(value)
        }
    }

    /// Classify raw text: anything starting with `<` is XML, otherwise JSON.
    pub fn from_text(text: &str) -> Result<Self, NfexError> {
        let trimmed = text.trim_start_matches('\u{feff}').trim_start();
        if trimmed.starts_with('<') {
            return Ok(SourceDocument::Xml(trimmed.to_string()));
        }

        let value: Value = serde_json::from_str(trimmed)?;
        Ok(Self::from_json(value))
    }

    /// Short label for logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceDocument::Xml(_) => "xml",
            SourceDocument::WrappedJson(_) => "wrapped-json",
            SourceDocument::ProviderJson(_) => "provider-json",
        }
    }

    /// Normalise into the canonical tree the resolver walks.
    pub fn into_tree(self) -> Result<Value, XmlError> {
        debug!("Normalising {} source into document tree", self.kind());
        match self {
            SourceDocument::Xml(text) => parse_xml(&text),
            SourceDocument::WrappedJson(value) => Ok(collapse(value)),
            SourceDocument::ProviderJson(value) => Ok(value),
        }
    }
}

/// Wrapped output has every child of the document element (or of the root
/// itself) held in an array.
fn is_wrapped(value: &Value) -> bool {
    let children_wrapped = |map: &Map<String, Value>| {
        let mut children = map.iter().filter(|(k, _)| k.as_str() != "$").peekable();
        children.peek().is_some() && children.all(|(_, v)| v.is_array())
    };

    match value {
        Value::Array(items) => items.len() == 1,
        Value::Object(map) => {
            if children_wrapped(map) {
                return true;
            }
            // Explicit root element: `{ "nfeProc": { "NFe": [ ... ] } }`
            map.len() == 1
                && map
                    .values()
                    .next()
                    .and_then(Value::as_object)
                    .is_some_and(children_wrapped)
        }
        _ => false,
    }
}

fn collapse(value: Value) -> Value {
    match value {
        Value::Array(mut items) if items.len() == 1 => collapse(items.remove(0)),
        Value::Array(items) => Value::Array(items.into_iter().map(collapse).collect()),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, child) in map {
                match key.as_str() {
                    "$" => {
                        if let Value::Object(attrs) = child {
                            for (name, attr) in attrs {
                                out.insert(format!("{}{}", ATTRIBUTE_PREFIX, name), collapse(attr));
                            }
                        }
                    }
                    "_" => {
                        out.insert(TEXT_KEY.to_string(), collapse(child));
                    }
                    _ => {
                        out.insert(key, collapse(child));
                    }
                }
            }
            Value::Object(out)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn wrapped_sample() -> Value {
        json!({
            "nfeProc": {
                "$": { "versao": "4.00" },
                "NFe": [{
                    "infNFe": [{
                        "$": { "Id": "NFe35230612345678901234550010000012341000012345" },
                        "ide": [{ "nNF": ["000001234"], "serie": ["1"] }],
                        "det": [
                            { "$": { "nItem": "1" }, "prod": [{ "cProd": ["A"] }] },
                            { "$": { "nItem": "2" }, "prod": [{ "cProd": ["B"] }] }
                        ]
                    }]
                }]
            }
        })
    }

    #[test]
    fn test_detects_wrapped_json() {
        assert_eq!(SourceDocument::from_json(wrapped_sample()).kind(), "wrapped-json");
        assert_eq!(
            SourceDocument::from_json(json!({ "NFe": [{ "infNFe": [{}] }] })).kind(),
            "wrapped-json"
        );
    }

    #[test]
    fn test_detects_provider_json() {
        let provider = json!({ "nfeProc": { "NFe": { "infNFe": { "ide": { "nNF": "1" } } } } });
        assert_eq!(SourceDocument::from_json(provider).kind(), "provider-json");
        assert_eq!(SourceDocument::from_json(json!({})).kind(), "provider-json");
    }

    #[test]
    fn test_wrapped_json_collapses() {
        let tree = SourceDocument::from_json(wrapped_sample()).into_tree().unwrap();
        assert_eq!(
            tree,
            json!({
                "nfeProc": {
                    "@versao": "4.00",
                    "NFe": {
                        "infNFe": {
                            "@Id": "NFe35230612345678901234550010000012341000012345",
                            "ide": { "nNF": "000001234", "serie": "1" },
                            "det": [
                                { "@nItem": "1", "prod": { "cProd": "A" } },
                                { "@nItem": "2", "prod": { "cProd": "B" } }
                            ]
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_from_text() {
        let xml = SourceDocument::from_text("\u{feff}  <NFe><infNFe/></NFe>").unwrap();
        assert_eq!(xml.kind(), "xml");
        assert_eq!(xml.into_tree().unwrap(), json!({ "NFe": { "infNFe": "" } }));

        let json = SourceDocument::from_text(r#"{"nfeProc": {"NFe": {"infNFe": {}}}}"#).unwrap();
        assert_eq!(json.kind(), "provider-json");

        assert!(SourceDocument::from_text("not a document").is_err());
    }
}
