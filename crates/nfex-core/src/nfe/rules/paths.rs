//! Candidate field paths, in priority order.
//!
//! Paths are relative to the `infNFe` node unless stated otherwise. The first
//! path that resolves to a present value wins, so the order of every list is
//! part of the extraction contract: providers disagree on shape, and picking
//! the wrong candidate silently turns a real value into a default.

/// A prioritised list of key paths for one logical field.
pub type Candidates = &'static [&'static [&'static str]];

// Envelope level (relative to the document root)

pub const INF_NFE: Candidates = &[
    &["nfeProc", "NFe", "infNFe"],
    &["nfeProc", "nfe", "infNFe"],
    &["NFe", "infNFe"],
    &["nfe", "infNFe"],
    &["infNFe"],
];

pub const PROTOCOL: Candidates = &[
    &["nfeProc", "protNFe", "infProt"],
    &["protNFe", "infProt"],
];

// Relative to the protocol node

pub const PROTOCOL_KEY: Candidates = &[&["chNFe"]];
pub const PROTOCOL_NUMBER: Candidates = &[&["nProt"]];
pub const PROTOCOL_RECEIVED_AT: Candidates = &[&["dhRecbto"]];
pub const PROTOCOL_STATUS: Candidates = &[&["cStat"]];
pub const PROTOCOL_REASON: Candidates = &[&["xMotivo"]];

// Identification

pub const INF_NFE_ID: Candidates = &[&["@Id"], &["@_Id"], &["Id"]];
pub const NUMERO_NOTA: Candidates = &[&["ide", "nNF"]];
pub const SERIE_NOTA: Candidates = &[&["ide", "serie"]];
pub const DATA_HORA_EMISSAO: Candidates = &[&["ide", "dhEmi"], &["ide", "dEmi"]];
pub const NATUREZA_OPERACAO: Candidates = &[&["ide", "natOp"]];
pub const TIPO_OPERACAO: Candidates = &[&["ide", "tpNF"]];

// Issuer

pub const EMITENTE_CNPJ: Candidates = &[&["emit", "CNPJ"], &["emit", "CPF"]];
pub const EMITENTE_RAZAO_SOCIAL: Candidates = &[&["emit", "xNome"]];
pub const EMITENTE_NOME_FANTASIA: Candidates = &[&["emit", "xFant"]];
pub const EMITENTE_IE: Candidates = &[&["emit", "IE"]];
pub const EMITENTE_ENDERECO: Candidates = &[&["emit", "enderEmit", "xLgr"]];
pub const EMITENTE_NUMERO: Candidates = &[&["emit", "enderEmit", "nro"]];
pub const EMITENTE_COMPLEMENTO: Candidates = &[&["emit", "enderEmit", "xCpl"]];
pub const EMITENTE_BAIRRO: Candidates = &[&["emit", "enderEmit", "xBairro"]];
pub const EMITENTE_CIDADE: Candidates = &[&["emit", "enderEmit", "xMun"]];
pub const EMITENTE_UF: Candidates = &[&["emit", "enderEmit", "UF"]];
pub const EMITENTE_CEP: Candidates = &[&["emit", "enderEmit", "CEP"]];
pub const EMITENTE_TELEFONE: Candidates = &[&["emit", "enderEmit", "fone"]];

// Recipient

pub const DESTINATARIO_CNPJ: Candidates = &[
    &["dest", "CNPJ"],
    &["dest", "CPF"],
    &["dest", "idEstrangeiro"],
];
pub const DESTINATARIO_RAZAO_SOCIAL: Candidates = &[&["dest", "xNome"]];
pub const DESTINATARIO_IE: Candidates = &[&["dest", "IE"]];
pub const DESTINATARIO_ENDERECO: Candidates = &[&["dest", "enderDest", "xLgr"]];
pub const DESTINATARIO_NUMERO: Candidates = &[&["dest", "enderDest", "nro"]];
pub const DESTINATARIO_COMPLEMENTO: Candidates = &[&["dest", "enderDest", "xCpl"]];
pub const DESTINATARIO_BAIRRO: Candidates = &[&["dest", "enderDest", "xBairro"]];
pub const DESTINATARIO_CIDADE: Candidates = &[&["dest", "enderDest", "xMun"]];
pub const DESTINATARIO_UF: Candidates = &[&["dest", "enderDest", "UF"]];
pub const DESTINATARIO_CEP: Candidates = &[&["dest", "enderDest", "CEP"]];
pub const DESTINATARIO_TELEFONE: Candidates = &[&["dest", "enderDest", "fone"]];

// Transport

pub const MODALIDADE_FRETE: Candidates = &[&["transp", "modFrete"]];
pub const TRANSPORTADORA_CNPJ: Candidates = &[
    &["transp", "transporta", "CNPJ"],
    &["transp", "transporta", "CPF"],
];
pub const TRANSPORTADORA_RAZAO_SOCIAL: Candidates = &[&["transp", "transporta", "xNome"]];
pub const TRANSPORTADORA_IE: Candidates = &[&["transp", "transporta", "IE"]];
pub const VEICULO_PLACA: Candidates = &[&["transp", "veicTransp", "placa"]];
pub const VEICULO_UF: Candidates = &[&["transp", "veicTransp", "UF"]];
pub const VOLUME_ESPECIE: Candidates = &[&["transp", "vol", "esp"]];

/// Volume count: provider nested, flat top-level, legacy nested.
pub const QUANTIDADE_VOLUMES: Candidates = &[
    &["transp", "vol", "qVol"],
    &["qVol"],
    &["transp", "qVol"],
];

/// Gross weight: provider nested, flat top-level, legacy nested, then the
/// net weight as a last resort.
pub const PESO_BRUTO: Candidates = &[
    &["transp", "vol", "pesoB"],
    &["pesoB"],
    &["transp", "pesoB"],
    &["transp", "vol", "pesoL"],
];

pub const PESO_LIQUIDO: Candidates = &[
    &["transp", "vol", "pesoL"],
    &["pesoL"],
    &["transp", "pesoL"],
];

// Totals

/// Document total: provider nested, flat top-level, legacy nested.
pub const VALOR_NOTA_FISCAL: Candidates = &[
    &["total", "ICMSTot", "vNF"],
    &["vNF"],
    &["total", "vNF"],
];

pub const VALOR_PRODUTOS: Candidates = &[&["total", "ICMSTot", "vProd"], &["total", "vProd"]];
pub const VALOR_FRETE: Candidates = &[&["total", "ICMSTot", "vFrete"], &["total", "vFrete"]];
pub const VALOR_SEGURO: Candidates = &[&["total", "ICMSTot", "vSeg"], &["total", "vSeg"]];
pub const VALOR_DESCONTO: Candidates = &[&["total", "ICMSTot", "vDesc"], &["total", "vDesc"]];
pub const VALOR_OUTROS: Candidates = &[&["total", "ICMSTot", "vOutro"], &["total", "vOutro"]];
pub const VALOR_ICMS: Candidates = &[&["total", "ICMSTot", "vICMS"], &["total", "vICMS"]];
pub const VALOR_IPI: Candidates = &[&["total", "ICMSTot", "vIPI"], &["total", "vIPI"]];
pub const VALOR_PIS: Candidates = &[&["total", "ICMSTot", "vPIS"], &["total", "vPIS"]];
pub const VALOR_COFINS: Candidates = &[&["total", "ICMSTot", "vCOFINS"], &["total", "vCOFINS"]];

// Free text

pub const INFORMACOES_COMPLEMENTARES: Candidates = &[&["infAdic", "infCpl"]];

// Products (relative to a single `det` entry)

pub const PRODUCTS: Candidates = &[&["det"]];
pub const PRODUTO_ITEM: Candidates = &[&["@nItem"], &["nItem"]];
pub const PRODUTO_CODIGO: Candidates = &[&["prod", "cProd"]];
pub const PRODUTO_DESCRICAO: Candidates = &[&["prod", "xProd"]];
pub const PRODUTO_NCM: Candidates = &[&["prod", "NCM"]];
pub const PRODUTO_CFOP: Candidates = &[&["prod", "CFOP"]];
pub const PRODUTO_QUANTIDADE: Candidates = &[&["prod", "qCom"]];
pub const PRODUTO_UNIDADE: Candidates = &[&["prod", "uCom"]];
pub const PRODUTO_VALOR_UNITARIO: Candidates = &[&["prod", "vUnCom"]];
pub const PRODUTO_VALOR_TOTAL: Candidates = &[&["prod", "vProd"]];
pub const PRODUTO_PEDIDO: Candidates = &[&["prod", "xPed"]];
