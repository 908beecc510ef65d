//! NFe access key (chave de acesso) validation, formatting and decoding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::patterns::ACCESS_KEY;
use super::{ExtractionMatch, FieldExtractor};
use crate::error::ExtractionError;

/// Number of digits in an access key.
pub const ACCESS_KEY_LEN: usize = 44;

/// Check that a key is exactly 44 ASCII digits.
///
/// This is the precondition for any remote lookup: callers reject keys that
/// fail it before touching the network.
pub fn validate_access_key(key: &str) -> bool {
    key.len() == ACCESS_KEY_LEN && key.chars().all(|c| c.is_ascii_digit())
}

/// Verify the mod-11 check digit (last digit) of a well-formed key.
///
/// Weights 2..=9 cycle from the rightmost of the first 43 digits.
pub fn validate_access_key_check_digit(key: &str) -> bool {
    if !validate_access_key(key) {
        return false;
    }

    let digits: Vec<u32> = key.chars().filter_map(|c| c.to_digit(10)).collect();
    let sum: u32 = digits[..43]
        .iter()
        .rev()
        .zip((2..=9).cycle())
        .map(|(d, w)| d * w)
        .sum();

    let rest = sum % 11;
    let expected = if rest < 2 { 0 } else { 11 - rest };
    expected == digits[43]
}

/// Format a key for display as eleven space-separated groups of four digits.
///
/// Keys that are not 44 digits are returned unchanged.
pub fn format_access_key(key: &str) -> String {
    if !validate_access_key(key) {
        return key.to_string();
    }

    key.as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A validated 44-digit access key with accessors for its components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessKey(String);

impl AccessKey {
    /// Parse a key, tolerating display grouping (spaces, dots, dashes).
    pub fn parse(s: &str) -> Result<Self, ExtractionError> {
        let digits: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '.' | '-'))
            .collect();

        if validate_access_key(&digits) {
            Ok(Self(digits))
        } else {
            Err(ExtractionError::InvalidAccessKey(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// IBGE state code of the issuer (e.g. 35 = SP).
    pub fn uf_code(&self) -> &str {
        &self.0[0..2]
    }

    /// Issue year and month as `YYMM`.
    pub fn year_month(&self) -> &str {
        &self.0[2..6]
    }

    /// Issuer CNPJ (or zero-padded CPF).
    pub fn issuer_tax_id(&self) -> &str {
        &self.0[6..20]
    }

    /// Document model (55 = NFe, 65 = NFC-e).
    pub fn model(&self) -> &str {
        &self.0[20..22]
    }

    pub fn series(&self) -> &str {
        &self.0[22..25]
    }

    /// Document number, zero padded to nine digits.
    pub fn number(&self) -> &str {
        &self.0[25..34]
    }

    pub fn emission_type(&self) -> &str {
        &self.0[34..35]
    }

    pub fn numeric_code(&self) -> &str {
        &self.0[35..43]
    }

    pub fn check_digit(&self) -> &str {
        &self.0[43..44]
    }

    /// Whether the trailing check digit matches the other 43 digits.
    pub fn has_valid_check_digit(&self) -> bool {
        validate_access_key_check_digit(&self.0)
    }

    /// Display form in groups of four.
    pub fn formatted(&self) -> String {
        format_access_key(&self.0)
    }
}

impl FromStr for AccessKey {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccessKey {
    type Error = ExtractionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<AccessKey> for String {
    fn from(key: AccessKey) -> Self {
        key.0
    }
}

impl fmt::Display for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Finds access keys in free text (file names, pasted DANFE text).
pub struct AccessKeyExtractor {
    require_check_digit: bool,
}

impl AccessKeyExtractor {
    pub fn new() -> Self {
        Self {
            require_check_digit: false,
        }
    }

    /// Only accept keys whose check digit verifies.
    pub fn with_check_digit(mut self, require: bool) -> Self {
        self.require_check_digit = require;
        self
    }
}

impl Default for AccessKeyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AccessKeyExtractor {
    type Output = ExtractionMatch<AccessKey>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for caps in ACCESS_KEY.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let Ok(key) = AccessKey::parse(m.as_str()) else {
                continue;
            };

            if results.iter().any(|r| r.value == key) {
                continue;
            }

            let verified = key.has_valid_check_digit();
            if self.require_check_digit && !verified {
                continue;
            }

            let confidence = if verified { 0.95 } else { 0.7 };
            results.push(
                ExtractionMatch::new(key, confidence, m.as_str()).with_position(m.start(), m.end()),
            );
        }

        results
    }
}

/// Extract the first access key found in text.
pub fn extract_access_key(text: &str) -> Option<AccessKey> {
    AccessKeyExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "35230612345678901234550010000012341000012345";
    const REAL: &str = "42250485179240000239550020004175361171503396";

    #[test]
    fn test_validate_access_key() {
        assert!(validate_access_key(SAMPLE));
        assert!(validate_access_key(REAL));
        assert!(!validate_access_key(&SAMPLE[..43]));
        assert!(!validate_access_key(&format!("{}0", SAMPLE)));
        assert!(!validate_access_key("3523061234567890123455001000001234100001234X"));
        assert!(!validate_access_key(""));
        assert!(!validate_access_key(&format_access_key(SAMPLE)));
    }

    #[test]
    fn test_validate_access_key_every_length() {
        for len in 0..=60 {
            let key = "1".repeat(len);
            assert_eq!(validate_access_key(&key), len == 44);
        }
    }

    #[test]
    fn test_check_digit() {
        assert!(validate_access_key_check_digit(REAL));
        // The sample envelope carries a made-up key whose digit would be 0
        assert!(!validate_access_key_check_digit(SAMPLE));
    }

    #[test]
    fn test_format_access_key() {
        assert_eq!(
            format_access_key(SAMPLE),
            "3523 0612 3456 7890 1234 5500 1000 0012 3410 0001 2345"
        );
        assert_eq!(format_access_key("1234"), "1234");
    }

    #[test]
    fn test_access_key_components() {
        let key = AccessKey::parse(SAMPLE).unwrap();
        assert_eq!(key.uf_code(), "35");
        assert_eq!(key.year_month(), "2306");
        assert_eq!(key.issuer_tax_id(), "12345678901234");
        assert_eq!(key.model(), "55");
        assert_eq!(key.series(), "001");
        assert_eq!(key.number(), "000001234");
        assert_eq!(key.emission_type(), "1");
        assert_eq!(key.numeric_code(), "00001234");
        assert_eq!(key.check_digit(), "5");
    }

    #[test]
    fn test_parse_display_form() {
        let key: AccessKey = format_access_key(REAL).parse().unwrap();
        assert_eq!(key.as_str(), REAL);
        assert!(AccessKey::parse("1234").is_err());
    }

    #[test]
    fn test_extract_from_text() {
        let text = format!("NFe_{}_procNFe.xml", REAL);
        assert_eq!(extract_access_key(&text).map(String::from), Some(REAL.to_string()));

        let text = format!("Chave de acesso: {}", format_access_key(SAMPLE));
        let found = AccessKeyExtractor::new().extract(&text).unwrap();
        assert_eq!(found.value.as_str(), SAMPLE);
        assert!(found.confidence < 0.9);

        let strict = AccessKeyExtractor::new().with_check_digit(true);
        assert!(strict.extract(&text).is_none());
    }
}
