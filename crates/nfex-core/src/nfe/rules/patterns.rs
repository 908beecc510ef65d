//! Common regex patterns for NFe free-text extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Order reference inside complementary information ("Pedido 12345-ABC",
    // "Pedido Venda: 059645")
    pub static ref ORDER_NUMBER: Regex = Regex::new(
        r"(?i)pedido.*?(\d+)"
    ).unwrap();

    // Access key, plain or in display groups of four, not part of a longer
    // digit run
    pub static ref ACCESS_KEY: Regex = Regex::new(
        r"(?:^|\D)(\d{4}(?:[\s.\-]?\d{4}){10})(?:\D|$)"
    ).unwrap();

    // Access key carried in the infNFe Id attribute
    pub static ref NFE_ID: Regex = Regex::new(
        r"^(?i:NFe)?(\d{44})$"
    ).unwrap();

    // Brazilian display date (15/06/2023)
    pub static ref BR_DATE: Regex = Regex::new(
        r"^(\d{1,2})/(\d{1,2})/(\d{4})$"
    ).unwrap();
}
