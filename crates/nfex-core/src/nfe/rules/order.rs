//! Purchase order reference extraction from complementary information.
//!
//! Best effort only: issuers write whatever they like in `infCpl`, so the
//! first digit run after the word "Pedido" is a heuristic, not a field.

use super::patterns::ORDER_NUMBER;
use super::{ExtractionMatch, FieldExtractor};

/// Order number extractor over free text.
pub struct OrderNumberExtractor;

impl OrderNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OrderNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for OrderNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        ORDER_NUMBER
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let number = caps.get(1)?;
                Some(
                    ExtractionMatch::new(number.as_str().to_string(), 0.6, full.as_str())
                        .with_position(number.start(), number.end()),
                )
            })
            .collect()
    }
}

/// Extract the order number, or an empty string when none is found.
pub fn extract_order_number(text: &str) -> String {
    OrderNumberExtractor::new()
        .extract(text)
        .map(|m| m.value)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_order_number() {
        assert_eq!(
            extract_order_number(
                "Nota fiscal de exemplo. Pedido 12345-ABC. Informações complementares da nota fiscal."
            ),
            "12345"
        );
        assert_eq!(extract_order_number("4177566-664 Pedido Venda: 059645"), "059645");
        assert_eq!(extract_order_number("PEDIDO N. 77"), "77");
        assert_eq!(extract_order_number("pedido:991"), "991");
    }

    #[test]
    fn test_extract_order_number_missing() {
        assert_eq!(extract_order_number(""), "");
        assert_eq!(extract_order_number("Sem referencia 12345"), "");
        assert_eq!(extract_order_number("Pedido sem numero"), "");
    }

    #[test]
    fn test_extract_all() {
        let found = OrderNumberExtractor::new().extract_all("Pedido 1 / Pedido 22");
        let values: Vec<_> = found.into_iter().map(|m| m.value).collect();
        assert_eq!(values, vec!["1".to_string(), "22".to_string()]);
    }
}
