//! Rendering of extracted records in the supported output formats.

use std::path::Path;

use serde::Serialize;

use nfex_core::models::document::{FiscalDocument, RECORD_XML_ROOT};
use nfex_core::models::volume::SyntheticVolume;
use nfex_core::nfe::rules::{format_access_key, format_brl, format_tax_id, validate_access_key};
use nfex_core::xml::write_xml;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
    /// XML output
    Xml,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
            OutputFormat::Xml => "xml",
        }
    }
}

/// Record columns written to CSV output and batch summaries.
pub const CSV_COLUMNS: [&str; 12] = [
    "chave_nota_fiscal",
    "numero_nota",
    "serie_nota",
    "data_hora_emissao",
    "emitente_cnpj",
    "emitente_razao_social",
    "destinatario_cnpj",
    "destinatario_razao_social",
    "valor_nota_fiscal",
    "peso_bruto",
    "quantidade_volumes",
    "numero_pedido",
];

pub fn csv_fields(document: &FiscalDocument) -> [&str; 12] {
    [
        &document.chave_nota_fiscal,
        &document.numero_nota,
        &document.serie_nota,
        &document.data_hora_emissao,
        &document.emitente_cnpj,
        &document.emitente_razao_social,
        &document.destinatario_cnpj,
        &document.destinatario_razao_social,
        &document.valor_nota_fiscal,
        &document.peso_bruto,
        &document.quantidade_volumes,
        &document.numero_pedido,
    ]
}

/// Record plus optional synthesized volumes, as one serialisable value.
#[derive(Serialize)]
struct Rendered<'a> {
    #[serde(flatten)]
    document: &'a FiscalDocument,
    #[serde(skip_serializing_if = "no_volumes")]
    volumes: &'a [SyntheticVolume],
}

fn no_volumes(volumes: &&[SyntheticVolume]) -> bool {
    volumes.is_empty()
}

pub fn render(
    document: &FiscalDocument,
    volumes: &[SyntheticVolume],
    format: OutputFormat,
) -> anyhow::Result<String> {
    let rendered = Rendered { document, volumes };
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&rendered)?),
        OutputFormat::Xml => {
            let value = serde_json::to_value(&rendered)?;
            Ok(write_xml(RECORD_XML_ROOT, &value)?)
        }
        OutputFormat::Csv => format_csv(document, volumes),
        OutputFormat::Text => Ok(format_text(document, volumes)),
    }
}

fn format_csv(document: &FiscalDocument, volumes: &[SyntheticVolume]) -> anyhow::Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(vec![]);

    wtr.write_record(CSV_COLUMNS)?;
    wtr.write_record(csv_fields(document))?;

    if !volumes.is_empty() {
        wtr.write_record(["volume", "weight_kg", "height_cm", "width_cm", "length_cm", "volume_m3"])?;
        for volume in volumes {
            wtr.write_record([
                volume.index.to_string(),
                volume.weight_kg.to_string(),
                volume.height_cm.to_string(),
                volume.width_cm.to_string(),
                volume.length_cm.to_string(),
                volume.volume_m3.to_string(),
            ])?;
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(document: &FiscalDocument, volumes: &[SyntheticVolume]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "NFe: {} série {}\n",
        document.numero_nota, document.serie_nota
    ));
    output.push_str(&format!(
        "Key: {}\n",
        format_access_key(&document.chave_nota_fiscal)
    ));
    if let Some(issued) = document.issued_at() {
        output.push_str(&format!("Issued: {}\n", issued.format_br()));
    }
    if !document.natureza_operacao.is_empty() {
        output.push_str(&format!("Operation: {}\n", document.natureza_operacao));
    }
    output.push('\n');

    output.push_str("Issuer:\n");
    output.push_str(&format!("  {}\n", document.emitente_razao_social));
    output.push_str(&format!("  CNPJ/CPF: {}\n", format_tax_id(&document.emitente_cnpj)));
    let address = document.issuer_address();
    if !address.is_empty() {
        output.push_str(&format!("  {}\n", address));
    }
    output.push('\n');

    output.push_str("Recipient:\n");
    output.push_str(&format!("  {}\n", document.destinatario_razao_social));
    output.push_str(&format!(
        "  CNPJ/CPF: {}\n",
        format_tax_id(&document.destinatario_cnpj)
    ));
    let address = document.recipient_address();
    if !address.is_empty() {
        output.push_str(&format!("  {}\n", address));
    }
    output.push('\n');

    output.push_str("Transport:\n");
    if !document.modalidade_frete_descricao.is_empty() {
        output.push_str(&format!("  Freight: {}\n", document.modalidade_frete_descricao));
    }
    if !document.transportadora_razao_social.is_empty() {
        output.push_str(&format!("  Carrier: {}\n", document.transportadora_razao_social));
    }
    output.push_str(&format!(
        "  Volumes: {} x {}\n",
        document.quantidade_volumes, document.especie_volumes
    ));
    output.push_str(&format!("  Gross weight: {} kg\n", document.peso_bruto));
    output.push('\n');

    output.push_str("Totals:\n");
    output.push_str(&format!("  Products: R$ {}\n", format_brl(document.products_value())));
    output.push_str(&format!("  Freight:  R$ {}\n", format_brl(document.freight_value())));
    output.push_str(&format!("  Total:    R$ {}\n", format_brl(document.total_value())));

    if !document.numero_pedido.is_empty() {
        output.push_str(&format!("\nOrder: {}\n", document.numero_pedido));
    }

    if !volumes.is_empty() {
        output.push_str("\nVolumes:\n");
        for volume in volumes {
            output.push_str(&format!(
                "  #{:<3} {} kg  {}x{}x{} cm  {} m³\n",
                volume.index,
                volume.weight_kg,
                volume.height_cm,
                volume.width_cm,
                volume.length_cm,
                volume.volume_m3
            ));
        }
    }

    output
}

/// Access key implied by a file named after it (`<44 digits>.xml`).
pub fn key_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|stem| stem.trim_start_matches("NFe"))
        .filter(|stem| validate_access_key(stem))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn document() -> FiscalDocument {
        FiscalDocument {
            chave_nota_fiscal: "35230612345678901234550010000012341000012345".to_string(),
            numero_nota: "000001234".to_string(),
            serie_nota: "1".to_string(),
            emitente_cnpj: "11222333000181".to_string(),
            emitente_razao_social: "EMPRESA EXEMPLO LTDA".to_string(),
            valor_nota_fiscal: "1050.00".to_string(),
            peso_bruto: "110.000".to_string(),
            quantidade_volumes: "10".to_string(),
            ..FiscalDocument::default()
        }
    }

    #[test]
    fn test_key_from_path() {
        let key = "35230612345678901234550010000012341000012345";
        assert_eq!(
            key_from_path(&PathBuf::from(format!("/tmp/{key}.xml"))),
            Some(key.to_string())
        );
        assert_eq!(
            key_from_path(&PathBuf::from(format!("NFe{key}.json"))),
            Some(key.to_string())
        );
        assert_eq!(key_from_path(&PathBuf::from("nota.xml")), None);
    }

    #[test]
    fn test_csv_has_header_and_row() {
        let csv = render(&document(), &[], OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), CSV_COLUMNS.join(","));
        assert!(lines.next().unwrap().starts_with("35230612345678901234550010000012341000012345,000001234,1,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_json_includes_volumes_only_when_requested() {
        let doc = document();
        let plain = render(&doc, &[], OutputFormat::Json).unwrap();
        assert!(!plain.contains("\"volumes\""));

        let volumes = doc.synthesize_volumes(&Default::default());
        let with_volumes = render(&doc, &volumes, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&with_volumes).unwrap();
        assert_eq!(value["numero_nota"], "000001234");
        assert_eq!(value["volumes"].as_array().unwrap().len(), 10);
    }

    #[test]
    fn test_text_formats_ids_and_amounts() {
        let text = render(&document(), &[], OutputFormat::Text).unwrap();
        assert!(text.contains("CNPJ/CPF: 11.222.333/0001-81"));
        assert!(text.contains("Total:    R$ 1.050,00"));
        assert!(text.contains("Key: 3523 0612"));
    }

    #[test]
    fn test_xml_root() {
        let xml = render(&document(), &[], OutputFormat::Xml).unwrap();
        assert!(xml.contains("<notaFiscal>"));
        assert!(xml.contains("<peso_bruto>110.000</peso_bruto>"));
    }
}
