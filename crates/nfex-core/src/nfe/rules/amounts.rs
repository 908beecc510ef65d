//! Monetary and weight normalisation for fiscal numeric text.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a fiscal amount ("1050.00", "1.050,00", "1050,00", "0001050.00").
///
/// Returns `None` for empty or non-numeric input.
pub fn parse_amount_opt(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Reject text that merely contains digits ("12kg", "R$ abc")
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ',' | '.' | '-' | '+' | ' ' | '\u{00a0}');
    let body = trimmed.trim_start_matches("R$").trim();
    if body.is_empty() || !body.chars().all(allowed) {
        return None;
    }

    let cleaned: String = body
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    let normalized = if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned.replace(',', ".")
    } else if cleaned.contains(',') && cleaned.contains('.') {
        // Whichever separator comes last is the decimal separator
        match (cleaned.rfind(','), cleaned.rfind('.')) {
            (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
            (Some(_), Some(_)) => cleaned.replace(',', ""),
            _ => cleaned,
        }
    } else {
        cleaned
    };

    Decimal::from_str(&normalized).ok()
}

/// Parse a fiscal amount, defaulting to zero. Never fails.
pub fn parse_amount(s: &str) -> Decimal {
    parse_amount_opt(s).unwrap_or(Decimal::ZERO)
}

/// Normalise numeric source text for storage.
///
/// Plain point-decimal text is kept verbatim so precision and padding survive
/// ("110.000" stays "110.000"); comma decimals are canonicalised; empty or
/// malformed input becomes `default`.
pub fn normalize_numeric_text(s: &str, default: &str) -> String {
    let trimmed = s.trim();
    if !trimmed.is_empty() && Decimal::from_str(trimmed).is_ok() {
        return trimmed.to_string();
    }

    match parse_amount_opt(trimmed) {
        Some(amount) => amount.to_string(),
        None => default.to_string(),
    }
}

/// Format an amount in Brazilian style (1.234,56).
pub fn format_brl(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.round_dp(2));
    let (sign, s) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest.to_string()),
        None => ("", s),
    };

    let Some((integer_part, decimal_part)) = s.split_once('.') else {
        return format!("{}{}", sign, s);
    };

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    format!("{}{},{}", sign, formatted, decimal_part)
}
