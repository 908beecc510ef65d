//! Freight modality (`modFrete`) codes.

use serde::{Deserialize, Serialize};

/// Who contracts and pays for transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreightModality {
    /// 0 - contracted by the issuer (CIF).
    Issuer,
    /// 1 - contracted by the recipient (FOB).
    Recipient,
    /// 2 - contracted by a third party.
    ThirdParty,
    /// 3 - own transport of the sender.
    OwnBySender,
    /// 4 - own transport of the recipient.
    OwnByRecipient,
    /// 9 - no transport.
    NoTransport,
}

impl FreightModality {
    /// Parse a `modFrete` code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(Self::Issuer),
            "1" => Some(Self::Recipient),
            "2" => Some(Self::ThirdParty),
            "3" => Some(Self::OwnBySender),
            "4" => Some(Self::OwnByRecipient),
            "9" => Some(Self::NoTransport),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Issuer => "0",
            Self::Recipient => "1",
            Self::ThirdParty => "2",
            Self::OwnBySender => "3",
            Self::OwnByRecipient => "4",
            Self::NoTransport => "9",
        }
    }

    /// Label as printed on the DANFE.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Issuer => "0-Por conta do Emit",
            Self::Recipient => "1-Por conta do Dest",
            Self::ThirdParty => "2-Por conta de Terceiros",
            Self::OwnBySender => "3-Próprio por conta do Rem",
            Self::OwnByRecipient => "4-Próprio por conta do Dest",
            Self::NoTransport => "9-Sem Ocorrência de Transporte",
        }
    }
}

/// Description for a raw code; empty when the code is unknown.
pub fn freight_modality_description(code: &str) -> String {
    FreightModality::from_code(code)
        .map(|m| m.description().to_string())
        .unwrap_or_default()
}
