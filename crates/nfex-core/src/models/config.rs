//! Configuration structures for extraction, volume synthesis and provider access.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for nfex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NfexConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Placeholder dimensions for synthesized volumes.
    pub volumes: VolumeConfig,

    /// Fiscal document provider API configuration.
    pub provider: ProviderConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Report access key and tax id check digit failures as warnings.
    pub validate_check_digits: bool,

    /// Use the first product's `xPed` when complementary text has no order number.
    pub order_number_from_products: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            validate_check_digits: true,
            order_number_from_products: true,
        }
    }
}

/// Default physical dimensions stamped on synthesized volumes, pending
/// re-measurement in the warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    pub height_cm: Decimal,
    pub width_cm: Decimal,
    pub length_cm: Decimal,
    /// Declared counts above this are not synthesized.
    pub max_volumes: u32,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            height_cm: Decimal::from(30),
            width_cm: Decimal::from(40),
            length_cm: Decimal::from(50),
            max_volumes: 1000,
        }
    }
}

impl VolumeConfig {
    /// Cubic metres of one volume with these dimensions.
    pub fn volume_m3(&self) -> Decimal {
        (self.height_cm * self.width_cm * self.length_cm / Decimal::from(1_000_000)).normalize()
    }
}

/// Fiscal document provider API configuration.
///
/// Endpoint lists are probed in order. `{key}` in document endpoints is
/// replaced by the access key, `{id}` in XML endpoints by the provider's
/// document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API base URL, without trailing slash.
    pub base_url: String,

    /// OAuth2 client id.
    pub client_id: String,

    /// OAuth2 client secret, also used as bearer API key when token
    /// exchange fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Token endpoints for the client-credentials grant.
    pub auth_endpoints: Vec<String>,

    /// Document lookup endpoints.
    pub document_endpoints: Vec<String>,

    /// XML download endpoints for a provider document id.
    pub xml_endpoints: Vec<String>,

    /// Attempts per endpoint.
    pub max_attempts: u32,

    /// Base backoff delay; attempt `n` waits `base * 2^(n-1)` plus jitter.
    pub base_delay_ms: u64,

    /// Upper bound of the random jitter added to each delay.
    pub jitter_ms: u64,

    /// Request timeout.
    pub timeout_secs: u64,

    /// User-Agent header.
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        let owned = |list: &[&str]| -> Vec<String> { list.iter().map(|s| s.to_string()).collect() };
        Self {
            base_url: "https://api-v3.nsdocs.com.br".to_string(),
            client_id: String::new(),
            client_secret: None,
            auth_endpoints: owned(&["/auth/token", "/api/auth/token", "/token", "/api/token"]),
            document_endpoints: owned(&[
                "/requests/nfe/{key}",
                "/api/requests/nfe/{key}",
                "/nfe/{key}",
                "/api/nfe/{key}",
                "/consulta/nfe/{key}",
                "/api/consulta/nfe/{key}",
            ]),
            xml_endpoints: owned(&[
                "/documents/{id}/xml",
                "/api/documents/{id}/xml",
                "/xml/{id}",
                "/api/xml/{id}",
            ]),
            max_attempts: 3,
            base_delay_ms: 1000,
            jitter_ms: 1000,
            timeout_secs: 30,
            user_agent: concat!("nfex/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl NfexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
