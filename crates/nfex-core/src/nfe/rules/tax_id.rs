//! CPF/CNPJ (Brazilian tax identification numbers) formatting and validation.

use serde::{Deserialize, Serialize};

/// Kind of Brazilian tax identifier, told apart by digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxIdKind {
    /// Individual taxpayer (11 digits).
    Cpf,
    /// Legal entity (14 digits).
    Cnpj,
}

impl TaxIdKind {
    /// Classify a digit string by length.
    pub fn detect(digits: &str) -> Option<Self> {
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        match digits.len() {
            11 => Some(TaxIdKind::Cpf),
            14 => Some(TaxIdKind::Cnpj),
            _ => None,
        }
    }
}

/// Keep only ASCII digits.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Format a tax id for display.
///
/// 11 digits become `xxx.xxx.xxx-xx`, 14 digits become `xx.xxx.xxx/xxxx-xx`;
/// anything else (including already punctuated input) is returned unchanged.
pub fn format_tax_id(digits: &str) -> String {
    match TaxIdKind::detect(digits) {
        Some(TaxIdKind::Cpf) => format!(
            "{}.{}.{}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..11]
        ),
        Some(TaxIdKind::Cnpj) => format!(
            "{}.{}.{}/{}-{}",
            &digits[0..2],
            &digits[2..5],
            &digits[5..8],
            &digits[8..12],
            &digits[12..14]
        ),
        None => digits.to_string(),
    }
}

/// Mod-11 check digit with the given weights.
fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights.iter()).map(|(d, w)| d * w).sum();
    let rest = sum % 11;
    if rest < 2 { 0 } else { 11 - rest }
}

fn to_digits(s: &str) -> Vec<u32> {
    s.chars().filter_map(|c| c.to_digit(10)).collect()
}

/// Validate a CNPJ using its two check digits. Punctuation is ignored.
pub fn validate_cnpj(cnpj: &str) -> bool {
    let digits = to_digits(cnpj);
    if digits.len() != 14 || digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let first = check_digit(&digits[..12], &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = check_digit(&digits[..13], &[6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);

    first == digits[12] && second == digits[13]
}

/// Validate a CPF using its two check digits. Punctuation is ignored.
pub fn validate_cpf(cpf: &str) -> bool {
    let digits = to_digits(cpf);
    if digits.len() != 11 || digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let first = check_digit(&digits[..9], &[10, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = check_digit(&digits[..10], &[11, 10, 9, 8, 7, 6, 5, 4, 3, 2]);

    first == digits[9] && second == digits[10]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cpf() {
        assert_eq!(format_tax_id("52998224725"), "529.982.247-25");
    }

    #[test]
    fn test_format_cnpj() {
        assert_eq!(format_tax_id("12345678901234"), "12.345.678/9012-34");
    }

    #[test]
    fn test_format_other_lengths_unchanged() {
        for input in ["", "1", "1234567890", "123456789012", "123456789012345", "12.345.678/9012-34"] {
            assert_eq!(format_tax_id(input), input);
        }
        // Right length, not all digits
        assert_eq!(format_tax_id("1234567890a"), "1234567890a");
    }

    #[test]
    fn test_format_preserves_digit_order() {
        for input in ["00655209000193", "85179240000239", "01234567890"] {
            let formatted = format_tax_id(input);
            assert_ne!(formatted, input);
            assert_eq!(digits_only(&formatted), input);
        }
    }

    #[test]
    fn test_validate_cnpj() {
        assert!(validate_cnpj("11222333000181"));
        assert!(validate_cnpj("11.222.333/0001-81"));
        assert!(!validate_cnpj("11222333000182"));
        assert!(!validate_cnpj("11111111111111"));
        assert!(!validate_cnpj("1122233300018"));
    }

    #[test]
    fn test_validate_cpf() {
        assert!(validate_cpf("52998224725"));
        assert!(validate_cpf("529.982.247-25"));
        assert!(!validate_cpf("52998224726"));
        assert!(!validate_cpf("00000000000"));
    }

    #[test]
    fn test_detect_kind() {
        assert_eq!(TaxIdKind::detect("52998224725"), Some(TaxIdKind::Cpf));
        assert_eq!(TaxIdKind::detect("11222333000181"), Some(TaxIdKind::Cnpj));
        assert_eq!(TaxIdKind::detect("123"), None);
    }
}
