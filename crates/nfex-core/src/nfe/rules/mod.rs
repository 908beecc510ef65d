//! Rule-based normalisers, validators and free-text extractors for NFe fields.

pub mod access_key;
pub mod amounts;
pub mod dates;
pub mod freight;
pub mod order;
pub mod paths;
pub mod patterns;
pub mod postal;
pub mod tax_id;

pub use access_key::{
    extract_access_key, format_access_key, validate_access_key,
    validate_access_key_check_digit, AccessKey, AccessKeyExtractor,
};
pub use amounts::{format_brl, normalize_numeric_text, parse_amount, parse_amount_opt};
pub use dates::{parse_issue_timestamp, IssueTimestamp};
pub use freight::{freight_modality_description, FreightModality};
pub use order::{extract_order_number, OrderNumberExtractor};
pub use postal::format_cep;
pub use tax_id::{digits_only, format_tax_id, validate_cnpj, validate_cpf, TaxIdKind};

/// Trait for free-text field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A match found in free text, with a confidence score.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
