//! Data models for extracted fiscal documents.

pub mod config;
pub mod document;
pub mod volume;

pub use config::{ExtractionConfig, NfexConfig, ProviderConfig, VolumeConfig};
pub use document::{FiscalDocument, LogisticsInfo, ProductItem};
pub use volume::SyntheticVolume;
