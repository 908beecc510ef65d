//! Error types for the nfex-core library.

use thiserror::Error;

/// Main error type for the nfex library.
#[derive(Error, Debug)]
pub enum NfexError {
    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// XML reading or writing error.
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// Provider API error.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to fiscal document field extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// No `infNFe` node under any known path.
    #[error("fiscal document structure not recognized")]
    StructureNotRecognized,

    /// Access key present but not 44 digits.
    #[error("invalid access key '{0}': expected exactly 44 digits")]
    InvalidAccessKey(String),

    /// The source document could not be turned into a tree.
    #[error("unreadable source document: {0}")]
    Source(String),
}

/// Errors related to XML parsing and serialisation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    /// Malformed XML input.
    #[error("failed to parse XML at byte {position}: {reason}")]
    Parse { position: u64, reason: String },

    /// Document has no root element.
    #[error("XML document has no root element")]
    Empty,

    /// Closing tag without a matching opening tag.
    #[error("unbalanced XML element: {0}")]
    Unbalanced(String),

    /// Failed to write XML output.
    #[error("failed to write XML: {0}")]
    Write(String),
}

/// A single failed attempt against a provider endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    /// Endpoint path that was tried.
    pub endpoint: String,
    /// Attempt number (1-based).
    pub attempt: u32,
    /// Human-readable reason.
    pub reason: String,
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (attempt {}): {}", self.endpoint, self.attempt, self.reason)
    }
}

/// Errors related to the fiscal document provider API.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Access key rejected before any request was made.
    #[error("access key must have exactly 44 digits, got '{0}'")]
    InvalidKey(String),

    /// No client secret / API key configured.
    #[error("provider API key is not configured")]
    MissingCredentials,

    /// Provider refused the credentials.
    #[error("provider rejected the credentials (HTTP 401) at {endpoint}")]
    Unauthorized { endpoint: String },

    /// Every endpoint was tried without success.
    #[error("document not found at any of {} endpoints", .failures.len())]
    NotFound { failures: Vec<AttemptFailure> },

    /// Response came back but its shape is unknown.
    #[error("unrecognized provider response structure")]
    UnrecognizedResponse,

    /// A document id was returned but no XML endpoint produced NFe XML.
    #[error("XML for document {id} not found or invalid")]
    XmlUnavailable { id: String, failures: Vec<AttemptFailure> },

    /// Document was fetched but could not be mapped.
    #[error("fetched document could not be extracted: {0}")]
    Extraction(#[from] ExtractionError),

    /// Document was fetched but is not valid XML.
    #[error("fetched document is not valid XML: {0}")]
    Xml(#[from] XmlError),

    /// HTTP client construction failed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl ProviderError {
    /// Attempt failures collected while probing endpoints, if any.
    pub fn failures(&self) -> &[AttemptFailure] {
        match self {
            ProviderError::NotFound { failures } => failures,
            ProviderError::XmlUnavailable { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// Result type for the nfex library.
pub type Result<T> = std::result::Result<T, NfexError>;
