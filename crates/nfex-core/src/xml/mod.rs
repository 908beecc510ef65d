//! XML tree reader and writer.
//!
//! Documents are represented as `serde_json::Value` trees so that XML input,
//! array-wrapped parser output and provider JSON all flow through the same
//! path resolver. Conventions:
//! - elements become object keys (local name, namespace prefix dropped);
//! - repeated siblings become arrays;
//! - attributes become `@name` keys (`xmlns` declarations are skipped);
//! - text of an element that also has attributes or children is `#text`;
//! - empty leaves are `""`.

mod reader;
mod writer;

pub use reader::parse_xml;
pub use writer::write_xml;

use crate::error::XmlError;

/// Result type for XML operations.
pub type Result<T> = std::result::Result<T, XmlError>;

/// Key prefix marking an attribute in the tree.
pub const ATTRIBUTE_PREFIX: char = '@';

/// Key holding element text next to attributes or children.
pub const TEXT_KEY: &str = "#text";
