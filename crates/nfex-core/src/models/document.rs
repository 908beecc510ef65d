//! Flat fiscal document record, shaped like the persisted invoice row.
//!
//! Field names are the persisted column names. Numeric fields keep the
//! source text ("110.000", "1050.00") so nothing is lost before storage;
//! typed views go through the accessors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::config::VolumeConfig;
use crate::models::volume::SyntheticVolume;
use crate::nfe::rules::{
    format_cep, parse_amount, parse_issue_timestamp, validate_access_key_check_digit,
    validate_cnpj, validate_cpf, AccessKey, IssueTimestamp, TaxIdKind,
};
use crate::nfe::volumes::synthesize_volumes;
use crate::xml::write_xml;

/// Root element name used when a record is written as XML.
pub const RECORD_XML_ROOT: &str = "notaFiscal";

/// A fiscal document (NFe) as one flat record.
///
/// Text fields are `""` when absent, numeric fields `"0"`, and
/// `quantidade_volumes` is never below `"1"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiscalDocument {
    // Identification
    pub chave_nota_fiscal: String,
    pub numero_nota: String,
    pub serie_nota: String,
    pub data_hora_emissao: String,
    pub natureza_operacao: String,
    pub tipo_operacao: String,

    // Issuer
    pub emitente_cnpj: String,
    pub emitente_razao_social: String,
    pub emitente_nome_fantasia: String,
    pub emitente_inscricao_estadual: String,
    pub emitente_endereco: String,
    pub emitente_numero: String,
    pub emitente_complemento: String,
    pub emitente_bairro: String,
    pub emitente_cidade: String,
    pub emitente_uf: String,
    pub emitente_cep: String,
    pub emitente_telefone: String,

    // Recipient
    pub destinatario_cnpj: String,
    pub destinatario_razao_social: String,
    pub destinatario_inscricao_estadual: String,
    pub destinatario_endereco: String,
    pub destinatario_numero: String,
    pub destinatario_complemento: String,
    pub destinatario_bairro: String,
    pub destinatario_cidade: String,
    pub destinatario_uf: String,
    pub destinatario_cep: String,
    pub destinatario_telefone: String,

    // Transport
    pub modalidade_frete: String,
    pub modalidade_frete_descricao: String,
    pub transportadora_cnpj: String,
    pub transportadora_razao_social: String,
    pub transportadora_inscricao_estadual: String,
    pub veiculo_placa: String,
    pub veiculo_uf: String,
    pub especie_volumes: String,
    pub quantidade_volumes: String,
    pub peso_bruto: String,
    pub peso_liquido: String,

    // Totals
    pub valor_produtos: String,
    pub valor_frete: String,
    pub valor_seguro: String,
    pub valor_desconto: String,
    pub valor_outros: String,
    pub valor_icms: String,
    pub valor_ipi: String,
    pub valor_pis: String,
    pub valor_cofins: String,
    pub valor_nota_fiscal: String,

    // Free text
    pub informacoes_complementares: String,
    /// Best-effort order reference; see `extract_order_number`.
    pub numero_pedido: String,

    // First product, flattened
    pub produto_codigo: String,
    pub produto_descricao: String,
    pub produto_ncm: String,
    pub produto_cfop: String,
    pub produto_quantidade: String,
    pub produto_unidade: String,
    pub produto_valor_unitario: String,
    pub produto_valor_total: String,

    // Authorisation protocol
    pub protocolo_autorizacao: String,
    pub data_hora_autorizacao: String,
    pub status_autorizacao: String,
    pub motivo_autorizacao: String,

    /// All product lines.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub produtos: Vec<ProductItem>,

    /// Manually entered logistics data, never produced by extraction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logistica: Option<LogisticsInfo>,
}

/// One product line (`det`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductItem {
    pub item: String,
    pub codigo: String,
    pub descricao: String,
    pub ncm: String,
    pub cfop: String,
    pub quantidade: String,
    pub unidade: String,
    pub valor_unitario: String,
    pub valor_total: String,
    /// Purchase order (`xPed`).
    pub pedido: String,
}

impl ProductItem {
    pub fn total_value(&self) -> Decimal {
        parse_amount(&self.valor_total)
    }
}

/// Logistics fields captured by operators after the document is ingested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticsInfo {
    pub numero_coleta: String,
    pub valor_coleta: String,
    pub numero_cte_coleta: String,
    pub numero_cte_viagem: String,
    pub responsavel_entrega: String,
    pub motorista: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_embarque: Option<NaiveDate>,
}

impl FiscalDocument {
    /// Grand total (`vNF`).
    pub fn total_value(&self) -> Decimal {
        parse_amount(&self.valor_nota_fiscal)
    }

    pub fn products_value(&self) -> Decimal {
        parse_amount(&self.valor_produtos)
    }

    pub fn freight_value(&self) -> Decimal {
        parse_amount(&self.valor_frete)
    }

    pub fn gross_weight(&self) -> Decimal {
        parse_amount(&self.peso_bruto)
    }

    pub fn net_weight(&self) -> Decimal {
        parse_amount(&self.peso_liquido)
    }

    /// Declared volume count, at least 1. Counts beyond `u32` saturate.
    pub fn volume_count(&self) -> u32 {
        let count = parse_amount(&self.quantidade_volumes).trunc();
        if count < Decimal::ONE {
            return 1;
        }
        count.to_u32().unwrap_or(u32::MAX)
    }

    pub fn issued_at(&self) -> Option<IssueTimestamp> {
        parse_issue_timestamp(&self.data_hora_emissao)
    }

    /// Parsed access key, if present and well-formed.
    pub fn access_key(&self) -> Option<AccessKey> {
        AccessKey::parse(&self.chave_nota_fiscal).ok()
    }

    /// Issuer address on one line.
    pub fn issuer_address(&self) -> String {
        format_address(
            &self.emitente_endereco,
            &self.emitente_numero,
            &self.emitente_bairro,
            &self.emitente_cidade,
            &self.emitente_uf,
            &self.emitente_cep,
        )
    }

    /// Recipient address on one line.
    pub fn recipient_address(&self) -> String {
        format_address(
            &self.destinatario_endereco,
            &self.destinatario_numero,
            &self.destinatario_bairro,
            &self.destinatario_cidade,
            &self.destinatario_uf,
            &self.destinatario_cep,
        )
    }

    /// Attach manually entered logistics data.
    pub fn with_logistics(mut self, logistics: LogisticsInfo) -> Self {
        self.logistica = Some(logistics);
        self
    }

    /// Provisional per-volume records from the gross weight and volume count.
    pub fn synthesize_volumes(&self, dims: &VolumeConfig) -> Vec<SyntheticVolume> {
        synthesize_volumes(self.gross_weight(), self.volume_count(), dims)
    }

    /// Serialise the record as XML for archival or display.
    pub fn to_xml(&self) -> Result<String> {
        let value = serde_json::to_value(self)?;
        Ok(write_xml(RECORD_XML_ROOT, &value)?)
    }

    /// Validate the record and return any issues found.
    pub fn validate(&self) -> Vec<String> {
        self.validate_with(true)
    }

    /// Validate the record; check digits are only verified when requested.
    pub fn validate_with(&self, check_digits: bool) -> Vec<String> {
        let mut issues = Vec::new();

        if self.chave_nota_fiscal.is_empty() {
            issues.push("Missing access key".to_string());
        }

        if self.numero_nota.is_empty() {
            issues.push("Missing document number".to_string());
        }

        if self.emitente_razao_social.is_empty() {
            issues.push("Missing issuer name".to_string());
        }

        if self.emitente_cnpj.is_empty() {
            issues.push("Missing issuer tax id".to_string());
        }

        if self.destinatario_razao_social.is_empty() && self.destinatario_cnpj.is_empty() {
            issues.push("Missing recipient information".to_string());
        }

        if self.total_value().is_zero() {
            issues.push("Total value is zero".to_string());
        }

        if !self.produtos.is_empty() && !self.products_value().is_zero() {
            let calculated: Decimal = self.produtos.iter().map(ProductItem::total_value).sum();
            if (calculated - self.products_value()).abs() > Decimal::new(1, 2) {
                issues.push(format!(
                    "Product line total ({}) differs from products value ({})",
                    calculated, self.valor_produtos
                ));
            }
        }

        if check_digits {
            if !self.chave_nota_fiscal.is_empty()
                && !validate_access_key_check_digit(&self.chave_nota_fiscal)
            {
                issues.push("Access key check digit does not match".to_string());
            }
            if let Some(issue) = tax_id_issue("Issuer", &self.emitente_cnpj) {
                issues.push(issue);
            }
            if let Some(issue) = tax_id_issue("Recipient", &self.destinatario_cnpj) {
                issues.push(issue);
            }
        }

        issues
    }
}

fn tax_id_issue(party: &str, tax_id: &str) -> Option<String> {
    match TaxIdKind::detect(tax_id)? {
        TaxIdKind::Cnpj if !validate_cnpj(tax_id) => {
            Some(format!("{} CNPJ check digits do not match", party))
        }
        TaxIdKind::Cpf if !validate_cpf(tax_id) => {
            Some(format!("{} CPF check digits do not match", party))
        }
        _ => None,
    }
}

fn format_address(
    street: &str,
    number: &str,
    district: &str,
    city: &str,
    state: &str,
    cep: &str,
) -> String {
    let mut parts = Vec::new();

    let street_line = match (street.is_empty(), number.is_empty()) {
        (false, false) => format!("{}, {}", street, number),
        (false, true) => street.to_string(),
        _ => String::new(),
    };
    if !street_line.is_empty() {
        parts.push(street_line);
    }
    if !district.is_empty() {
        parts.push(district.to_string());
    }

    let city_line = match (city.is_empty(), state.is_empty()) {
        (false, false) => format!("{}/{}", city, state),
        (false, true) => city.to_string(),
        (true, false) => state.to_string(),
        (true, true) => String::new(),
    };
    if !city_line.is_empty() {
        parts.push(city_line);
    }
    if !cep.is_empty() {
        parts.push(format_cep(cep));
    }

    parts.join(" - ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_xml;
    use pretty_assertions::assert_eq;

    fn sample() -> FiscalDocument {
        FiscalDocument {
            chave_nota_fiscal: "42250485179240000239550020004175361171503396".to_string(),
            numero_nota: "417536".to_string(),
            emitente_cnpj: "11222333000181".to_string(),
            emitente_razao_social: "EMPRESA EMITENTE LTDA".to_string(),
            destinatario_cnpj: "52998224725".to_string(),
            destinatario_razao_social: "FULANO DE TAL".to_string(),
            valor_nota_fiscal: "1050.00".to_string(),
            valor_produtos: "1000.00".to_string(),
            peso_bruto: "110.000".to_string(),
            quantidade_volumes: "10".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_typed_accessors() {
        let doc = sample();
        assert_eq!(doc.total_value(), Decimal::new(105000, 2));
        assert_eq!(doc.gross_weight(), Decimal::new(110, 0));
        assert_eq!(doc.volume_count(), 10);
        assert_eq!(doc.access_key().unwrap().number(), "000417536");
        assert_eq!(doc.issued_at(), None);
    }

    #[test]
    fn test_volume_count_never_below_one() {
        let mut doc = sample();
        for text in ["0", "", "abc", "-3"] {
            doc.quantidade_volumes = text.to_string();
            assert_eq!(doc.volume_count(), 1, "input {:?}", text);
        }

        doc.quantidade_volumes = "1000000000000".to_string();
        assert_eq!(doc.volume_count(), u32::MAX);
        assert!(doc.synthesize_volumes(&VolumeConfig::default()).is_empty());
    }

    #[test]
    fn test_validate_clean_record() {
        assert_eq!(sample().validate(), Vec::<String>::new());
    }

    #[test]
    fn test_validate_reports_issues() {
        let doc = FiscalDocument {
            chave_nota_fiscal: "35230612345678901234550010000012341000012345".to_string(),
            emitente_cnpj: "12345678901234".to_string(),
            ..Default::default()
        };

        let issues = doc.validate();
        assert!(issues.contains(&"Missing document number".to_string()));
        assert!(issues.contains(&"Missing issuer name".to_string()));
        assert!(issues.contains(&"Missing recipient information".to_string()));
        assert!(issues.contains(&"Total value is zero".to_string()));
        assert!(issues.contains(&"Access key check digit does not match".to_string()));
        assert!(issues.contains(&"Issuer CNPJ check digits do not match".to_string()));

        let relaxed = doc.validate_with(false);
        assert!(!relaxed.iter().any(|i| i.contains("check digit")));
    }

    #[test]
    fn test_validate_product_totals() {
        let mut doc = sample();
        doc.produtos = vec![ProductItem {
            valor_total: "900.00".to_string(),
            ..Default::default()
        }];
        let issues = doc.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("Product line total (900.00)"));
    }

    #[test]
    fn test_xml_round_trip_keeps_tax_id_digits() {
        let doc = sample();
        let xml = doc.to_xml().unwrap();
        let tree = parse_xml(&xml).unwrap();
        let record = &tree[RECORD_XML_ROOT];

        assert_eq!(record["emitente_cnpj"], "11222333000181");
        assert_eq!(record["destinatario_cnpj"], "52998224725");
        assert_eq!(record["peso_bruto"], "110.000");
        assert_eq!(record["emitente_cep"], "");
    }

    #[test]
    fn test_with_logistics() {
        let doc = sample().with_logistics(LogisticsInfo {
            numero_coleta: "COL-1".to_string(),
            motorista: "JOAO".to_string(),
            data_embarque: NaiveDate::from_ymd_opt(2023, 6, 16),
            ..Default::default()
        });
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["logistica"]["numero_coleta"], "COL-1");
        assert_eq!(json["logistica"]["data_embarque"], "2023-06-16");
        assert!(sample().to_xml().unwrap().find("logistica").is_none());
    }

    #[test]
    fn test_address_formatting() {
        let doc = FiscalDocument {
            emitente_endereco: "RUA DO EXEMPLO".to_string(),
            emitente_numero: "123".to_string(),
            emitente_bairro: "CENTRO".to_string(),
            emitente_cidade: "SAO PAULO".to_string(),
            emitente_uf: "SP".to_string(),
            emitente_cep: "01001000".to_string(),
            ..Default::default()
        };
        assert_eq!(
            doc.issuer_address(),
            "RUA DO EXEMPLO, 123 - CENTRO - SAO PAULO/SP - 01001-000"
        );
        assert_eq!(doc.recipient_address(), "");
    }
}
