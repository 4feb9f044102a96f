//! Peer connections between two agents.
//!
//! Each party assigns its own `connection_id` to the same logical link; the
//! two ids are correlated only through the DIDs exchanged during the
//! handshake.

use serde::{Deserialize, Serialize};

/// A connection record as reported by one agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Party-local connection identifier.
    pub connection_id: String,
    #[serde(default)]
    pub state: Option<String>,
    /// DID this agent uses on the connection.
    #[serde(default)]
    pub my_did: Option<String>,
    /// DID the peer uses on the connection.
    #[serde(default)]
    pub their_did: Option<String>,
    #[serde(default)]
    pub their_label: Option<String>,
    #[serde(default)]
    pub their_role: Option<String>,
}

/// Response to `POST /connections/create-invitation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    /// Inviter-local id of the prospective connection.
    pub connection_id: String,
    /// The invitation message, passed verbatim to the invitee.
    pub invitation: serde_json::Value,
    #[serde(default)]
    pub invitation_url: Option<String>,
}

/// Query filter for `GET /connections`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionFilter {
    pub alias: Option<String>,
    pub connection_protocol: Option<String>,
    pub invitation_key: Option<String>,
    pub my_did: Option<String>,
    pub state: Option<String>,
    pub their_did: Option<String>,
    pub their_public_did: Option<String>,
    pub their_role: Option<String>,
}

impl ConnectionFilter {
    /// Filter on the peer's connection DID.
    pub fn their_did(did: impl Into<String>) -> Self {
        Self {
            their_did: Some(did.into()),
            ..Default::default()
        }
    }

    /// Query pairs in admin API order; `None` entries are dropped by the transport.
    pub fn to_query(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("alias", self.alias.as_deref()),
            ("connection_protocol", self.connection_protocol.as_deref()),
            ("invitation_key", self.invitation_key.as_deref()),
            ("my_did", self.my_did.as_deref()),
            ("state", self.state.as_deref()),
            ("their_did", self.their_did.as_deref()),
            ("their_public_did", self.their_public_did.as_deref()),
            ("their_role", self.their_role.as_deref()),
        ]
    }
}

/// Both parties' local ids for one established connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionPair {
    pub issuer_connection_id: String,
    pub holder_connection_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_only_sets_their_did() {
        let filter = ConnectionFilter::their_did("did:peer:abc");
        let set: Vec<_> = filter
            .to_query()
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect();
        assert_eq!(set, vec![("their_did", "did:peer:abc")]);
    }

    #[test]
    fn test_record_tolerates_missing_fields() {
        let record: ConnectionRecord =
            serde_json::from_value(serde_json::json!({ "connection_id": "c-1", "extra": 1 }))
                .unwrap();
        assert_eq!(record.connection_id, "c-1");
        assert!(record.my_did.is_none());
    }
}
