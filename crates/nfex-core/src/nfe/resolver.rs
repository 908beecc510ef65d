//! Candidate-path lookup over a canonical document tree.
//!
//! A path is a sequence of object keys. Missing nodes end a candidate
//! silently, single-element arrays are unwrapped at every step, and `null`
//! or empty text counts as absent so the next candidate gets a chance.

use serde_json::Value;

/// Return the value at the first candidate path that yields a present value.
pub fn resolve<'a>(root: &'a Value, candidates: &[&[&str]]) -> Option<&'a Value> {
    candidates
        .iter()
        .find_map(|path| walk(root, path).filter(|v| is_present(v)))
}

/// Like [`resolve`], falling back to `default`.
pub fn resolve_or<'a>(root: &'a Value, candidates: &[&[&str]], default: &'a Value) -> &'a Value {
    resolve(root, candidates).unwrap_or(default)
}

/// Resolve and render the leaf as trimmed text; empty string when absent.
pub fn resolve_text(root: &Value, candidates: &[&[&str]]) -> String {
    resolve(root, candidates)
        .and_then(leaf_text)
        .unwrap_or_default()
}

/// Resolve a repeatable node (`det`, `vol`) as a list of entries.
pub fn resolve_list<'a>(root: &'a Value, candidates: &[&[&str]]) -> Vec<&'a Value> {
    match resolve(root, candidates) {
        Some(Value::Array(items)) => items.iter().filter(|v| is_present(v)).collect(),
        Some(other) => vec![other],
        None => Vec::new(),
    }
}

/// Render a leaf value as text. Element objects yield their `#text` content.
pub fn leaf_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => map.get("#text").and_then(leaf_text),
        Value::Array(items) if items.len() == 1 => leaf_text(&items[0]),
        _ => None,
    }
}

fn walk<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut node = root;
    for key in path {
        node = descend(node)?.get(*key)?;
    }
    Some(unwrap_leaf(node))
}

/// Step into an intermediate node; repeated blocks contribute their first entry.
fn descend(node: &Value) -> Option<&Value> {
    match node {
        Value::Array(items) => items.first().and_then(descend),
        Value::Object(_) => Some(node),
        _ => None,
    }
}

fn unwrap_leaf(node: &Value) -> &Value {
    match node {
        Value::Array(items) if items.len() == 1 => unwrap_leaf(&items[0]),
        _ => node,
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}
