//! Field mapper: canonical document tree to flat `FiscalDocument`.

use std::time::Instant;

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::document::{FiscalDocument, ProductItem};

use super::resolver::{resolve, resolve_list, resolve_text};
use super::rules::paths::{self, Candidates};
use super::rules::patterns::NFE_ID;
use super::rules::{
    extract_order_number, freight_modality_description, normalize_numeric_text, parse_amount,
    AccessKey,
};
use super::source::SourceDocument;
use super::{FiscalExtractor, Result};

/// Result of extracting one source document.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Mapped record.
    pub document: FiscalDocument,
    /// Input shape the record came from.
    pub source_kind: &'static str,
    /// Validation warnings; never fatal.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Maps any supported document tree onto the flat record.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    /// Whether check digit failures are reported as warnings.
    validate_check_digits: bool,
    /// Whether the first product's `xPed` backs up the order number.
    order_number_from_products: bool,
}

impl FieldMapper {
    /// Create a mapper with default settings.
    pub fn new() -> Self {
        Self {
            validate_check_digits: true,
            order_number_from_products: true,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_check_digit_validation(config.validate_check_digits)
            .with_product_order_fallback(config.order_number_from_products)
    }

    /// Set check digit validation.
    pub fn with_check_digit_validation(mut self, validate: bool) -> Self {
        self.validate_check_digits = validate;
        self
    }

    /// Set the `xPed` fallback for the order number.
    pub fn with_product_order_fallback(mut self, enabled: bool) -> Self {
        self.order_number_from_products = enabled;
        self
    }

    pub fn validates_check_digits(&self) -> bool {
        self.validate_check_digits
    }

    /// Map a canonical tree onto a record.
    ///
    /// `access_key` comes from the caller's context (request parameters,
    /// file name) and wins over anything found in the document.
    pub fn map(
        &self,
        tree: &Value,
        access_key: Option<&str>,
    ) -> std::result::Result<FiscalDocument, ExtractionError> {
        let inf = locate_inf_nfe(tree).ok_or(ExtractionError::StructureNotRecognized)?;
        let protocol = resolve(tree, paths::PROTOCOL);

        let text = |candidates: Candidates| resolve_text(inf, candidates);
        let number = |candidates: Candidates| normalize_numeric_text(&text(candidates), "0");
        let protocol_text = |candidates: Candidates| {
            protocol
                .map(|p| resolve_text(p, candidates))
                .unwrap_or_default()
        };

        let chave_nota_fiscal = resolve_access_key(inf, protocol, access_key)?;

        let produtos = map_products(inf);
        let first_product = produtos.first().cloned().unwrap_or_default();

        let informacoes_complementares = text(paths::INFORMACOES_COMPLEMENTARES);
        let mut numero_pedido = extract_order_number(&informacoes_complementares);
        if numero_pedido.is_empty() && self.order_number_from_products {
            numero_pedido = first_product.pedido.clone();
        }

        let mut quantidade_volumes = normalize_numeric_text(&text(paths::QUANTIDADE_VOLUMES), "1");
        if parse_amount(&quantidade_volumes) < Decimal::ONE {
            quantidade_volumes = "1".to_string();
        }

        let modalidade_frete = text(paths::MODALIDADE_FRETE);
        let modalidade_frete_descricao = freight_modality_description(&modalidade_frete);

        let document = FiscalDocument {
            chave_nota_fiscal,
            numero_nota: text(paths::NUMERO_NOTA),
            serie_nota: text(paths::SERIE_NOTA),
            data_hora_emissao: text(paths::DATA_HORA_EMISSAO),
            natureza_operacao: text(paths::NATUREZA_OPERACAO),
            tipo_operacao: text(paths::TIPO_OPERACAO),

            emitente_cnpj: text(paths::EMITENTE_CNPJ),
            emitente_razao_social: text(paths::EMITENTE_RAZAO_SOCIAL),
            emitente_nome_fantasia: text(paths::EMITENTE_NOME_FANTASIA),
            emitente_inscricao_estadual: text(paths::EMITENTE_IE),
            emitente_endereco: text(paths::EMITENTE_ENDERECO),
            emitente_numero: text(paths::EMITENTE_NUMERO),
            emitente_complemento: text(paths::EMITENTE_COMPLEMENTO),
            emitente_bairro: text(paths::EMITENTE_BAIRRO),
            emitente_cidade: text(paths::EMITENTE_CIDADE),
            emitente_uf: text(paths::EMITENTE_UF),
            emitente_cep: text(paths::EMITENTE_CEP),
            emitente_telefone: text(paths::EMITENTE_TELEFONE),

            destinatario_cnpj: text(paths::DESTINATARIO_CNPJ),
            destinatario_razao_social: text(paths::DESTINATARIO_RAZAO_SOCIAL),
            destinatario_inscricao_estadual: text(paths::DESTINATARIO_IE),
            destinatario_endereco: text(paths::DESTINATARIO_ENDERECO),
            destinatario_numero: text(paths::DESTINATARIO_NUMERO),
            destinatario_complemento: text(paths::DESTINATARIO_COMPLEMENTO),
            destinatario_bairro: text(paths::DESTINATARIO_BAIRRO),
            destinatario_cidade: text(paths::DESTINATARIO_CIDADE),
            destinatario_uf: text(paths::DESTINATARIO_UF),
            destinatario_cep: text(paths::DESTINATARIO_CEP),
            destinatario_telefone: text(paths::DESTINATARIO_TELEFONE),

            modalidade_frete,
            modalidade_frete_descricao,
            transportadora_cnpj: text(paths::TRANSPORTADORA_CNPJ),
            transportadora_razao_social: text(paths::TRANSPORTADORA_RAZAO_SOCIAL),
            transportadora_inscricao_estadual: text(paths::TRANSPORTADORA_IE),
            veiculo_placa: text(paths::VEICULO_PLACA),
            veiculo_uf: text(paths::VEICULO_UF),
            especie_volumes: text(paths::VOLUME_ESPECIE),
            quantidade_volumes,
            peso_bruto: number(paths::PESO_BRUTO),
            peso_liquido: number(paths::PESO_LIQUIDO),

            valor_produtos: number(paths::VALOR_PRODUTOS),
            valor_frete: number(paths::VALOR_FRETE),
            valor_seguro: number(paths::VALOR_SEGURO),
            valor_desconto: number(paths::VALOR_DESCONTO),
            valor_outros: number(paths::VALOR_OUTROS),
            valor_icms: number(paths::VALOR_ICMS),
            valor_ipi: number(paths::VALOR_IPI),
            valor_pis: number(paths::VALOR_PIS),
            valor_cofins: number(paths::VALOR_COFINS),
            valor_nota_fiscal: number(paths::VALOR_NOTA_FISCAL),

            informacoes_complementares,
            numero_pedido,

            produto_codigo: first_product.codigo,
            produto_descricao: first_product.descricao,
            produto_ncm: first_product.ncm,
            produto_cfop: first_product.cfop,
            produto_quantidade: first_product.quantidade,
            produto_unidade: first_product.unidade,
            produto_valor_unitario: first_product.valor_unitario,
            produto_valor_total: first_product.valor_total,

            protocolo_autorizacao: protocol_text(paths::PROTOCOL_NUMBER),
            data_hora_autorizacao: protocol_text(paths::PROTOCOL_RECEIVED_AT),
            status_autorizacao: protocol_text(paths::PROTOCOL_STATUS),
            motivo_autorizacao: protocol_text(paths::PROTOCOL_REASON),

            produtos,
            logistica: None,
        };

        debug!(
            "Mapped NFe {} series {} ({} products)",
            document.numero_nota,
            document.serie_nota,
            document.produtos.len()
        );

        Ok(document)
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FiscalExtractor for FieldMapper {
    fn extract(&self, source: SourceDocument, access_key: Option<&str>) -> Result<ExtractionResult> {
        let start = Instant::now();
        let source_kind = source.kind();

        let tree = source.into_tree()?;
        let document = self.map(&tree, access_key)?;

        let warnings = document.validate_with(self.validate_check_digits);
        for warning in &warnings {
            warn!("NFe {}: {}", document.numero_nota, warning);
        }

        info!(
            "Extracted NFe {} from {} source with {} warnings",
            document.chave_nota_fiscal,
            source_kind,
            warnings.len()
        );

        Ok(ExtractionResult {
            document,
            source_kind,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn extract_from_text(&self, text: &str, access_key: Option<&str>) -> Result<ExtractionResult> {
        let source = SourceDocument::from_text(text)?;
        self.extract(source, access_key)
    }
}

/// Find the `infNFe` node; a root carrying `ide` is taken as already flattened.
pub(crate) fn locate_inf_nfe(tree: &Value) -> Option<&Value> {
    if let Some(inf) = resolve(tree, paths::INF_NFE).filter(|v| v.is_object()) {
        return Some(inf);
    }

    tree.get("ide").map(|_| tree)
}

/// Caller key, then the protocol's `chNFe`, then the `infNFe` Id attribute.
fn resolve_access_key(
    inf: &Value,
    protocol: Option<&Value>,
    supplied: Option<&str>,
) -> std::result::Result<String, ExtractionError> {
    let from_caller = supplied
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string);

    let key = from_caller
        .or_else(|| {
            protocol
                .map(|p| resolve_text(p, paths::PROTOCOL_KEY))
                .filter(|k| !k.is_empty())
        })
        .or_else(|| {
            let id = resolve_text(inf, paths::INF_NFE_ID);
            if id.is_empty() {
                return None;
            }
            Some(match NFE_ID.captures(&id) {
                Some(caps) => caps[1].to_string(),
                None => id.trim_start_matches("NFe").to_string(),
            })
        });

    match key {
        Some(key) => Ok(AccessKey::parse(&key)?.into()),
        None => {
            debug!("Document carries no access key");
            Ok(String::new())
        }
    }
}

fn map_products(inf: &Value) -> Vec<ProductItem> {
    resolve_list(inf, paths::PRODUCTS)
        .into_iter()
        .enumerate()
        .map(|(i, det)| {
            let text = |candidates: Candidates| resolve_text(det, candidates);
            let number = |candidates: Candidates| normalize_numeric_text(&text(candidates), "0");

            let item = text(paths::PRODUTO_ITEM);
            ProductItem {
                item: if item.is_empty() { (i + 1).to_string() } else { item },
                codigo: text(paths::PRODUTO_CODIGO),
                descricao: text(paths::PRODUTO_DESCRICAO),
                ncm: text(paths::PRODUTO_NCM),
                cfop: text(paths::PRODUTO_CFOP),
                quantidade: number(paths::PRODUTO_QUANTIDADE),
                unidade: text(paths::PRODUTO_UNIDADE),
                valor_unitario: number(paths::PRODUTO_VALOR_UNITARIO),
                valor_total: number(paths::PRODUTO_VALOR_TOTAL),
                pedido: text(paths::PRODUTO_PEDIDO),
            }
        })
        .collect()
}
