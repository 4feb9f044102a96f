//! Public identifiers (DIDs) an agent announces on the ledger.

use serde::{Deserialize, Serialize};

/// Ledger role requested when registering a DID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DidRole {
    /// Plain identity with no write privileges (`""` on the wire).
    #[default]
    #[serde(rename = "")]
    None,
    /// Endorser role (`"ENDORSER"` on the wire).
    #[serde(rename = "ENDORSER")]
    Endorser,
}

impl DidRole {
    /// Wire representation expected by the ledger registration service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Endorser => "ENDORSER",
        }
    }
}

impl std::fmt::Display for DidRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Endorser => write!(f, "ENDORSER"),
        }
    }
}

/// Lifecycle of a DID from the controller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DidStage {
    /// Keypair requested from the agent's wallet.
    Pending,
    /// The ledger echoed the DID back.
    Confirmed,
    /// The agent announces the DID as its public DID.
    Public,
}

impl std::fmt::Display for DidStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Public => write!(f, "public"),
        }
    }
}

/// An agent's current public identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Did {
    /// The DID value as registered on the ledger.
    pub value: String,
    /// Verification key, when the agent reported it.
    #[serde(default)]
    pub verkey: Option<String>,
    /// Role the DID was registered with. DIDs fetched from the agent rather
    /// than registered by this controller carry `None`: the admin API does
    /// not report ledger roles.
    #[serde(default)]
    pub role: DidRole,
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}
