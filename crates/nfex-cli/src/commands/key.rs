//! Key command - validate, format and decode an access key.

use clap::Args;
use console::style;
use serde::Serialize;

use nfex_core::nfe::rules::{format_tax_id, AccessKey};

/// Arguments for the key command.
#[derive(Args)]
pub struct KeyArgs {
    /// Access key, with or without grouping
    #[arg(required = true)]
    key: String,

    /// Print the decoded key as JSON
    #[arg(long)]
    json: bool,
}

/// Components of an access key.
#[derive(Serialize)]
struct DecodedKey<'a> {
    key: &'a str,
    formatted: String,
    uf_code: &'a str,
    year_month: &'a str,
    issuer_tax_id: &'a str,
    model: &'a str,
    series: &'a str,
    number: &'a str,
    emission_type: &'a str,
    numeric_code: &'a str,
    check_digit: &'a str,
    check_digit_valid: bool,
}

impl<'a> DecodedKey<'a> {
    fn new(key: &'a AccessKey) -> Self {
        Self {
            key: key.as_str(),
            formatted: key.formatted(),
            uf_code: key.uf_code(),
            year_month: key.year_month(),
            issuer_tax_id: key.issuer_tax_id(),
            model: key.model(),
            series: key.series(),
            number: key.number(),
            emission_type: key.emission_type(),
            numeric_code: key.numeric_code(),
            check_digit: key.check_digit(),
            check_digit_valid: key.has_valid_check_digit(),
        }
    }
}

pub async fn run(args: KeyArgs) -> anyhow::Result<()> {
    let key = AccessKey::parse(&args.key)?;
    let decoded = DecodedKey::new(&key);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
        return Ok(());
    }

    println!("Key:           {}", decoded.formatted);
    println!("State (IBGE):  {}", decoded.uf_code);
    println!("Year/month:    {}", decoded.year_month);
    println!("Issuer:        {}", format_tax_id(decoded.issuer_tax_id));
    println!("Model:         {}", decoded.model);
    println!("Series:        {}", decoded.series);
    println!("Number:        {}", decoded.number);
    println!("Emission type: {}", decoded.emission_type);
    println!("Numeric code:  {}", decoded.numeric_code);

    if decoded.check_digit_valid {
        println!(
            "Check digit:   {} {}",
            decoded.check_digit,
            style("valid").green()
        );
    } else {
        println!(
            "Check digit:   {} {}",
            decoded.check_digit,
            style("does not match").yellow()
        );
    }

    Ok(())
}
