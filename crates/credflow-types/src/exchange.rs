//! Credential exchange (issue-credential 2.0) records and filters.
//!
//! A credential travels offer → request → issue. Each party keeps its own
//! record (`cred_ex_id`); the records are correlated by `thread_id`, which is
//! identical on both sides.

use serde::{Deserialize, Serialize};

/// State of one party's credential exchange record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExchangeState {
    ProposalSent,
    ProposalReceived,
    OfferSent,
    OfferReceived,
    RequestSent,
    RequestReceived,
    CredentialIssued,
    CredentialReceived,
    Done,
    Abandoned,
    Deleted,
    /// A state this controller does not know about, kept verbatim.
    Unknown(String),
}

impl ExchangeState {
    /// Wire name, as used in record filters.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ProposalSent => "proposal-sent",
            Self::ProposalReceived => "proposal-received",
            Self::OfferSent => "offer-sent",
            Self::OfferReceived => "offer-received",
            Self::RequestSent => "request-sent",
            Self::RequestReceived => "request-received",
            Self::CredentialIssued => "credential-issued",
            Self::CredentialReceived => "credential-received",
            Self::Done => "done",
            Self::Abandoned => "abandoned",
            Self::Deleted => "deleted",
            Self::Unknown(s) => s,
        }
    }
}

impl From<&str> for ExchangeState {
    fn from(s: &str) -> Self {
        match s {
            "proposal-sent" => Self::ProposalSent,
            "proposal-received" => Self::ProposalReceived,
            "offer-sent" => Self::OfferSent,
            "offer-received" => Self::OfferReceived,
            "request-sent" => Self::RequestSent,
            "request-received" => Self::RequestReceived,
            "credential-issued" => Self::CredentialIssued,
            "credential-received" => Self::CredentialReceived,
            "done" => Self::Done,
            "abandoned" => Self::Abandoned,
            "deleted" => Self::Deleted,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for ExchangeState {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<ExchangeState> for String {
    fn from(state: ExchangeState) -> Self {
        state.as_str().to_string()
    }
}

impl std::fmt::Display for ExchangeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(name, value)` pair of a credential preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialAttribute {
    pub name: String,
    pub value: String,
}

impl CredentialAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPreview {
    #[serde(default)]
    pub attributes: Vec<CredentialAttribute>,
}

/// One party's view of a credential exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialExchangeRecord {
    /// Party-local exchange id.
    pub cred_ex_id: String,
    /// Cross-party correlation key.
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub connection_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub state: ExchangeState,
    #[serde(default)]
    pub cred_preview: Option<CredentialPreview>,
}

impl CredentialExchangeRecord {
    /// Previewed attributes, in offer order.
    pub fn attributes(&self) -> &[CredentialAttribute] {
        self.cred_preview
            .as_ref()
            .map(|p| p.attributes.as_slice())
            .unwrap_or(&[])
    }
}

/// Query filter for `GET /issue-credential-2.0/records`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeFilter {
    pub connection_id: Option<String>,
    pub role: Option<String>,
    pub state: Option<ExchangeState>,
    pub thread_id: Option<String>,
}

impl ExchangeFilter {
    pub fn thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Default::default()
        }
    }

    pub fn thread_in_state(thread_id: impl Into<String>, state: ExchangeState) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            state: Some(state),
            ..Default::default()
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("connection_id", self.connection_id.as_deref()),
            ("role", self.role.as_deref()),
            ("state", self.state.as_ref().map(|s| s.as_str())),
            ("thread_id", self.thread_id.as_deref()),
        ]
    }
}

/// Everything the issuer needs to send a credential offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialOffer {
    /// Issuer-local id of the connection to the holder.
    pub connection_id: String,
    pub schema_id: String,
    pub cred_def_id: String,
    pub attributes: Vec<CredentialAttribute>,
    /// DID of the schema author; defaults to the issuer's public DID.
    pub schema_issuer_did: Option<String>,
}

/// Ids returned by a successful offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferReceipt {
    /// Issuer-local exchange id.
    pub cred_ex_id: String,
    pub thread_id: String,
}
