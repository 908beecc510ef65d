//! Core library for Brazilian electronic invoice (NFe) field extraction.
//!
//! This crate provides:
//! - Candidate-path resolution over XML, wrapped-JSON and provider-JSON trees
//! - Normalisation of amounts, access keys, tax ids and dates
//! - Mapping of an NFe onto a flat persisted record
//! - Volume synthesis from gross weight and declared volume count
//! - An async client for fiscal document provider APIs

pub mod error;
pub mod models;
pub mod nfe;
pub mod outcome;
pub mod provider;
pub mod xml;

pub use error::{ExtractionError, NfexError, ProviderError, Result, XmlError};
pub use models::config::NfexConfig;
pub use models::document::{FiscalDocument, LogisticsInfo, ProductItem};
pub use models::volume::SyntheticVolume;
pub use nfe::{ExtractionResult, FieldMapper, FiscalExtractor, SourceDocument, synthesize_volumes};
pub use outcome::Outcome;
pub use provider::{FetchedDocument, ProviderClient};
