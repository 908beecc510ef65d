//! NFe field extraction module.

mod mapper;
pub mod resolver;
pub mod rules;
pub mod source;
pub mod volumes;

pub use mapper::{ExtractionResult, FieldMapper};
pub(crate) use mapper::locate_inf_nfe;
pub use resolver::{resolve, resolve_list, resolve_or, resolve_text};
pub use source::SourceDocument;
pub use volumes::synthesize_volumes;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, crate::error::NfexError>;

/// Trait for fiscal document extractors.
pub trait FiscalExtractor {
    /// Extract a record from a classified source document.
    fn extract(&self, source: SourceDocument, access_key: Option<&str>) -> Result<ExtractionResult>;

    /// Extract a record from raw XML or JSON text.
    fn extract_from_text(&self, text: &str, access_key: Option<&str>) -> Result<ExtractionResult>;
}
