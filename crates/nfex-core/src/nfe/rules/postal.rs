//! CEP (Brazilian postal code) formatting.

/// Format an 8-digit CEP as `xxxxx-xxx`; anything else is returned unchanged.
pub fn format_cep(cep: &str) -> String {
    if cep.len() != 8 || !cep.chars().all(|c| c.is_ascii_digit()) {
        return cep.to_string();
    }

    format!("{}-{}", &cep[0..5], &cep[5..8])
}
