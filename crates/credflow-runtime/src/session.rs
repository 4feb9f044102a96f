//! `AgentSession`: the business façade over one agent.
//!
//! A session owns the agent's admin transport, shares the ledger client with
//! the other sessions and caches the agent's current public DID. Everything
//! else (connections, exchange records, schemas) lives in the agent and is
//! queried on demand.
//!
//! Schema and credential definition registration live in `registration`.

use crate::admin::{AdminApi, AdminTransport};
use crate::ledger::{LedgerRegistrar, NymRequest};
use crate::poll::{discovery_policy, PollPolicy};
use credflow_types::config::PollingConfig;
use credflow_types::connection::{ConnectionFilter, ConnectionRecord, Invitation};
use credflow_types::error::{ControllerError, ControllerResult};
use credflow_types::exchange::{
    CredentialAttribute, CredentialExchangeRecord, CredentialOffer, ExchangeFilter, ExchangeState,
    OfferReceipt,
};
use credflow_types::identity::{Did, DidRole, DidStage};
use credflow_types::ledger::SchemaRef;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

const CREDENTIAL_PREVIEW_TYPE: &str = "issue-credential/2.0/credential-preview";
const EXCHANGE_RECORDS: &str = "/issue-credential-2.0/records";

/// One agent, as seen by the controller.
pub struct AgentSession {
    pub(crate) ident: String,
    pub(crate) admin: Arc<dyn AdminApi>,
    pub(crate) ledger: Arc<dyn LedgerRegistrar>,
    pub(crate) discovery: PollPolicy,
    public_did: Option<Did>,
}

impl AgentSession {
    /// Create a session over an existing admin API.
    pub fn new(
        ident: impl Into<String>,
        admin: Arc<dyn AdminApi>,
        ledger: Arc<dyn LedgerRegistrar>,
        discovery: PollPolicy,
    ) -> Self {
        Self {
            ident: ident.into(),
            admin,
            ledger,
            discovery,
            public_did: None,
        }
    }

    /// Create a session talking HTTP to the admin API at `admin_url`.
    pub fn connect(
        ident: impl Into<String>,
        admin_url: &str,
        ledger: Arc<dyn LedgerRegistrar>,
        polling: &PollingConfig,
    ) -> Self {
        let ident = ident.into();
        let admin = Arc::new(AdminTransport::new(ident.clone(), admin_url));
        info!(agent = %ident, admin_url, "Agent session opened");
        Self::new(ident, admin, ledger, discovery_policy(polling))
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// The cached public DID, if one is known.
    pub fn public_did(&self) -> Option<&Did> {
        self.public_did.as_ref()
    }

    /// End the session and release its transport.
    pub async fn close(self) {
        self.admin.close().await;
        info!(agent = %self.ident, "Agent session closed");
    }

    // -----------------------------------------------------------------------
    // DIDs
    // -----------------------------------------------------------------------

    /// The agent's public DID: cached, else announced by the agent, else a
    /// freshly registered endorser DID.
    pub async fn get_public_did(&mut self) -> ControllerResult<Did> {
        if let Some(did) = &self.public_did {
            return Ok(did.clone());
        }
        if let Some(did) = self.fetch_public_did().await? {
            info!(agent = %self.ident, did = %did, "Obtained public DID from agent");
            self.public_did = Some(did.clone());
            return Ok(did);
        }
        self.register_did(DidRole::Endorser).await
    }

    async fn fetch_public_did(&self) -> ControllerResult<Option<Did>> {
        let response = self.admin.get("/wallet/did/public", &[]).await?;
        let Some(did) = response["result"]["did"].as_str() else {
            return Ok(None);
        };
        Ok(Some(Did {
            value: did.to_string(),
            verkey: response["result"]["verkey"].as_str().map(String::from),
            role: DidRole::None,
        }))
    }

    /// Create a new DID, write it to the ledger and make it the agent's
    /// public DID. Every call yields a new DID.
    pub async fn register_did(&mut self, role: DidRole) -> ControllerResult<Did> {
        const CREATE: &str = "/wallet/did/create";

        info!(agent = %self.ident, role = %role, stage = %DidStage::Pending, "Registering DID");
        let created = self.admin.post(CREATE, None, &[]).await?;
        let did = str_field(CREATE, &created["result"], "did", "result.did")?;
        let verkey = str_field(CREATE, &created["result"], "verkey", "result.verkey")?;

        let nym = self
            .ledger
            .register_nym(&NymRequest {
                alias: self.ident.clone(),
                role,
                did,
                verkey: verkey.clone(),
            })
            .await?;
        info!(agent = %self.ident, did = %nym.did, stage = %DidStage::Confirmed, "Ledger confirmed DID");

        self.admin
            .post("/wallet/did/public", None, &[("did", Some(nym.did.as_str()))])
            .await?;

        let did = Did {
            value: nym.did,
            verkey: nym.verkey.or(Some(verkey)),
            role,
        };
        info!(agent = %self.ident, did = %did, stage = %DidStage::Public, "Registered DID");
        self.public_did = Some(did.clone());
        Ok(did)
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    pub async fn create_invitation(&self) -> ControllerResult<Invitation> {
        const PATH: &str = "/connections/create-invitation";
        info!(agent = %self.ident, "Create invitation");
        let response = self.admin.post(PATH, None, &[]).await?;
        decode(PATH, "invitation", response)
    }

    /// Accept an invitation created by another agent. The returned record
    /// carries this agent's id for the prospective connection.
    pub async fn receive_invitation(&self, invitation: &Value) -> ControllerResult<ConnectionRecord> {
        const PATH: &str = "/connections/receive-invitation";
        info!(agent = %self.ident, "Receive invitation");
        let response = self.admin.post(PATH, Some(invitation), &[]).await?;
        decode(PATH, "connection_id", response)
    }

    /// Send a connection request to the inviter. The returned record's
    /// `my_did` is the DID the inviter will see as `their_did`.
    pub async fn request_connection(&self, connection_id: &str) -> ControllerResult<ConnectionRecord> {
        let path = format!("/connections/{connection_id}/accept-invitation");
        info!(agent = %self.ident, connection_id, "Send connection request");
        let response = self.admin.post(&path, None, &[]).await?;
        decode(&path, "connection_id", response)
    }

    /// Accept the pending request from the peer using `their_did`. Takes the
    /// first matching connection.
    pub async fn accept_connection_request(&self, their_did: &str) -> ControllerResult<ConnectionRecord> {
        info!(agent = %self.ident, their_did, "Accept connection request");
        let connection = self
            .list_connections(&ConnectionFilter::their_did(their_did))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ControllerError::ConnectionNotFound {
                their_did: their_did.to_string(),
            })?;

        let path = format!("/connections/{}/accept-request", connection.connection_id);
        let response = self.admin.post(&path, None, &[]).await?;
        decode(&path, "connection_id", response)
    }

    pub async fn list_connections(&self, filter: &ConnectionFilter) -> ControllerResult<Vec<ConnectionRecord>> {
        const PATH: &str = "/connections";
        let response = self.admin.get(PATH, &filter.to_query()).await?;
        results(PATH, response)
    }

    pub async fn has_connection(&self, filter: &ConnectionFilter) -> ControllerResult<bool> {
        Ok(!self.list_connections(filter).await?.is_empty())
    }

    // -----------------------------------------------------------------------
    // Credential exchange
    // -----------------------------------------------------------------------

    /// Offer a credential over `offer.connection_id`.
    ///
    /// Schema name and version are read from the last two segments of the
    /// schema id. The schema issuer defaults to this agent's public DID.
    pub async fn offer_credential(&mut self, offer: &CredentialOffer) -> ControllerResult<OfferReceipt> {
        const PATH: &str = "/issue-credential-2.0/send-offer";

        let schema = SchemaRef::parse(&offer.schema_id)?;
        let issuer_did = self.get_public_did().await?.value;
        let schema_issuer_did = offer
            .schema_issuer_did
            .clone()
            .unwrap_or_else(|| issuer_did.clone());

        info!(agent = %self.ident, connection_id = %offer.connection_id, cred_def_id = %offer.cred_def_id, "Offering credential");
        let body = json!({
            "auto_remove": true,
            "comment": format!("{} offers {}", self.ident, schema.name),
            "connection_id": offer.connection_id,
            "credential_preview": {
                "@type": CREDENTIAL_PREVIEW_TYPE,
                "attributes": offer.attributes,
            },
            "filter": {
                "indy": {
                    "cred_def_id": offer.cred_def_id,
                    "issuer_did": issuer_did,
                    "schema_id": offer.schema_id,
                    "schema_issuer_did": schema_issuer_did,
                    "schema_name": schema.name,
                    "schema_version": schema.version,
                }
            }
        });

        let response = self.admin.post(PATH, Some(&body), &[]).await?;
        let receipt: OfferReceipt = decode(PATH, "cred_ex_id", response)?;
        info!(agent = %self.ident, cred_ex_id = %receipt.cred_ex_id, thread_id = %receipt.thread_id, "Offered credential");
        Ok(receipt)
    }

    pub async fn get_credential_exchange_records(
        &self,
        filter: &ExchangeFilter,
    ) -> ControllerResult<Vec<CredentialExchangeRecord>> {
        let response = self.admin.get(EXCHANGE_RECORDS, &filter.to_query()).await?;
        let Some(entries) = response["results"].as_array() else {
            return Err(ControllerError::missing_field(EXCHANGE_RECORDS, "results"));
        };
        entries
            .iter()
            .map(|entry| decode(EXCHANGE_RECORDS, "results[].cred_ex_record", entry["cred_ex_record"].clone()))
            .collect()
    }

    pub async fn has_credential_exchange_record(&self, filter: &ExchangeFilter) -> ControllerResult<bool> {
        Ok(!self.get_credential_exchange_records(filter).await?.is_empty())
    }

    /// Holder side: answer the offer on `thread_id` with a request.
    pub async fn request_credential(&self, thread_id: &str) -> ControllerResult<Value> {
        info!(agent = %self.ident, thread_id, "Requesting credential");
        let record = self.record_in_state(thread_id, ExchangeState::OfferReceived).await?;
        let path = format!("{EXCHANGE_RECORDS}/{}/send-request", record.cred_ex_id);
        self.admin.post(&path, None, &[]).await
    }

    /// Issuer side: issue the credential requested on `thread_id`.
    pub async fn issue_credential(&self, thread_id: &str) -> ControllerResult<Value> {
        info!(agent = %self.ident, thread_id, "Issuing credential");
        let record = self.record_in_state(thread_id, ExchangeState::RequestReceived).await?;
        let path = format!("{EXCHANGE_RECORDS}/{}/issue", record.cred_ex_id);
        self.admin.post(&path, Some(&json!({})), &[]).await
    }

    async fn record_in_state(
        &self,
        thread_id: &str,
        state: ExchangeState,
    ) -> ControllerResult<CredentialExchangeRecord> {
        let filter = ExchangeFilter::thread_in_state(thread_id, state.clone());
        self.get_credential_exchange_records(&filter)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ControllerError::RecordNotFound {
                thread_id: thread_id.to_string(),
                state: state.to_string(),
            })
    }

    /// One `(name, default_value)` attribute per attribute of the ledger
    /// schema `schema_id`.
    pub async fn build_credential_preview(
        &self,
        schema_id: &str,
        default_value: &str,
    ) -> ControllerResult<Vec<CredentialAttribute>> {
        let path = format!("/schemas/{schema_id}");
        let response = self.admin.get(&path, &[]).await?;
        let schema = &response["schema"];
        let empty = match schema {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if empty {
            return Err(ControllerError::UnknownSchema {
                schema_id: schema_id.to_string(),
            });
        }

        let names = schema["attrNames"]
            .as_array()
            .ok_or_else(|| ControllerError::missing_field(&path, "schema.attrNames"))?;
        let attributes: Vec<_> = names
            .iter()
            .filter_map(Value::as_str)
            .map(|name| CredentialAttribute::new(name, default_value))
            .collect();
        debug!(agent = %self.ident, schema_id, attributes = attributes.len(), "Built credential preview");
        Ok(attributes)
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Deserialize a response, naming `field` if it does not fit.
pub(crate) fn decode<T: DeserializeOwned>(path: &str, field: &str, value: Value) -> ControllerResult<T> {
    serde_json::from_value(value).map_err(|_| ControllerError::missing_field(path, field))
}

fn results<T: DeserializeOwned>(path: &str, mut response: Value) -> ControllerResult<Vec<T>> {
    match response.get_mut("results").map(Value::take) {
        Some(entries @ Value::Array(_)) => decode(path, "results", entries),
        _ => Err(ControllerError::missing_field(path, "results")),
    }
}

fn str_field(path: &str, object: &Value, key: &str, field: &str) -> ControllerResult<String> {
    object[key]
        .as_str()
        .map(String::from)
        .ok_or_else(|| ControllerError::missing_field(path, field))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EchoLedger, ScriptedAdmin};
    use reqwest::Method;
    use std::time::Duration;

    fn session(admin: ScriptedAdmin) -> (AgentSession, Arc<ScriptedAdmin>, Arc<EchoLedger>) {
        session_with_ledger(admin, EchoLedger::new())
    }

    fn session_with_ledger(
        admin: ScriptedAdmin,
        ledger: EchoLedger,
    ) -> (AgentSession, Arc<ScriptedAdmin>, Arc<EchoLedger>) {
        let admin = Arc::new(admin);
        let ledger = Arc::new(ledger);
        let session = AgentSession::new(
            "ServerController",
            admin.clone(),
            ledger.clone(),
            PollPolicy::bounded(3, Duration::from_millis(1)),
        );
        (session, admin, ledger)
    }

    fn created(did: &str) -> Value {
        json!({ "result": { "did": did, "verkey": format!("vk-{did}") } })
    }

    fn record(cred_ex_id: &str, thread_id: &str, state: &str) -> Value {
        json!({
            "cred_ex_record": {
                "cred_ex_id": cred_ex_id,
                "thread_id": thread_id,
                "state": state
            }
        })
    }

    #[tokio::test]
    async fn test_register_did_twice_yields_distinct_dids() {
        let admin = ScriptedAdmin::new()
            .on(Method::POST, "/wallet/did/create", created("Did1"))
            .on(Method::POST, "/wallet/did/create", created("Did2"))
            .on(Method::POST, "/wallet/did/public", Value::Null);
        let (mut session, admin, ledger) = session(admin);

        let first = session.register_did(DidRole::Endorser).await.unwrap();
        let second = session.register_did(DidRole::Endorser).await.unwrap();

        assert_ne!(first.value, second.value);
        assert_eq!(session.public_did(), Some(&second));
        assert_eq!(ledger.requests().len(), 2);
        assert_eq!(ledger.requests()[0].alias, "ServerController");
        assert_eq!(ledger.requests()[0].role, DidRole::Endorser);

        let announced: Vec<_> = admin
            .calls_to(Method::POST, "/wallet/did/public")
            .iter()
            .map(|c| c.query_value("did").unwrap_or_default().to_string())
            .collect();
        assert_eq!(announced, vec!["Did1", "Did2"]);
    }

    #[tokio::test]
    async fn test_register_did_ledger_rejection_stops_before_announcing() {
        let admin = ScriptedAdmin::new().on(Method::POST, "/wallet/did/create", created("Did1"));
        let (mut session, admin, _) = session_with_ledger(admin, EchoLedger::rejecting(400));

        let err = session.register_did(DidRole::Endorser).await.unwrap_err();

        assert!(matches!(err, ControllerError::LedgerRegistrationFailed { status: 400, .. }));
        assert!(admin.calls_to(Method::POST, "/wallet/did/public").is_empty());
        assert!(session.public_did().is_none());
    }

    #[tokio::test]
    async fn test_get_public_did_prefers_announced_did_and_caches() {
        let admin = ScriptedAdmin::new().on(
            Method::GET,
            "/wallet/did/public",
            json!({ "result": { "did": "Existing", "verkey": "vk" } }),
        );
        let (mut session, admin, ledger) = session(admin);

        let did = session.get_public_did().await.unwrap();
        let again = session.get_public_did().await.unwrap();

        assert_eq!(did.value, "Existing");
        assert_eq!(did.role, DidRole::None);
        assert_eq!(did, again);
        assert_eq!(admin.calls_to(Method::GET, "/wallet/did/public").len(), 1);
        assert!(ledger.requests().is_empty());
    }

    #[tokio::test]
    async fn test_get_public_did_registers_when_agent_has_none() {
        let admin = ScriptedAdmin::new()
            .on(Method::GET, "/wallet/did/public", json!({ "result": null }))
            .on(Method::POST, "/wallet/did/create", created("Fresh"))
            .on(Method::POST, "/wallet/did/public", Value::Null);
        let (mut session, _, ledger) = session(admin);

        let did = session.get_public_did().await.unwrap();

        assert_eq!(did.value, "Fresh");
        assert_eq!(did.role, DidRole::Endorser);
        assert_eq!(ledger.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_offer_credential_derives_schema_name_and_version() {
        let admin = ScriptedAdmin::new()
            .on(
                Method::GET,
                "/wallet/did/public",
                json!({ "result": { "did": "Av1" } }),
            )
            .on(
                Method::POST,
                "/issue-credential-2.0/send-offer",
                json!({ "cred_ex_id": "ex-1", "thread_id": "th-1", "state": "offer-sent" }),
            );
        let (mut session, admin, _) = session(admin);

        let receipt = session
            .offer_credential(&CredentialOffer {
                connection_id: "conn-1".into(),
                schema_id: "Av1:2:demo:1.0".into(),
                cred_def_id: "Av1:3:CL:12:tag".into(),
                attributes: vec![CredentialAttribute::new("Attr1", "default")],
                schema_issuer_did: None,
            })
            .await
            .unwrap();

        assert_eq!(receipt.cred_ex_id, "ex-1");
        assert_eq!(receipt.thread_id, "th-1");

        let sent = admin.calls_to(Method::POST, "/issue-credential-2.0/send-offer");
        let body = sent[0].body.as_ref().unwrap();
        let indy = &body["filter"]["indy"];
        assert_eq!(indy["schema_name"], "demo");
        assert_eq!(indy["schema_version"], "1.0");
        assert_eq!(indy["issuer_did"], "Av1");
        assert_eq!(indy["schema_issuer_did"], "Av1");
        assert_eq!(body["connection_id"], "conn-1");
        assert_eq!(body["credential_preview"]["@type"], CREDENTIAL_PREVIEW_TYPE);
        assert_eq!(body["credential_preview"]["attributes"][0]["name"], "Attr1");
    }

    #[tokio::test]
    async fn test_offer_credential_rejects_malformed_schema_id() {
        let (mut session, admin, _) = session(ScriptedAdmin::new());
        let err = session
            .offer_credential(&CredentialOffer {
                connection_id: "conn-1".into(),
                schema_id: "demo".into(),
                cred_def_id: "cd".into(),
                attributes: vec![],
                schema_issuer_did: Some("Other".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ControllerError::InvalidSchemaId(_)));
        assert!(admin.calls().is_empty());
    }

    #[tokio::test]
    async fn test_request_credential_acts_on_first_offer_received_record() {
        let admin = ScriptedAdmin::new()
            .on(
                Method::GET,
                EXCHANGE_RECORDS,
                json!({ "results": [
                    record("ex-9", "th-1", "offer-received"),
                    record("ex-10", "th-1", "offer-received")
                ] }),
            )
            .on(
                Method::POST,
                "/issue-credential-2.0/records/ex-9/send-request",
                json!({ "state": "request-sent" }),
            );
        let (session, admin, _) = session(admin);

        let response = session.request_credential("th-1").await.unwrap();

        assert_eq!(response["state"], "request-sent");
        let queries = admin.calls_to(Method::GET, EXCHANGE_RECORDS);
        assert_eq!(queries[0].query_value("thread_id"), Some("th-1"));
        assert_eq!(queries[0].query_value("state"), Some("offer-received"));
    }

    #[tokio::test]
    async fn test_missing_records_are_record_not_found() {
        let admin =
            ScriptedAdmin::new().on(Method::GET, EXCHANGE_RECORDS, json!({ "results": [] }));
        let (session, admin, _) = session(admin);

        for thread_id in ["th-1", "th-2", ""] {
            match session.request_credential(thread_id).await.unwrap_err() {
                ControllerError::RecordNotFound { thread_id: t, state } => {
                    assert_eq!(t, thread_id);
                    assert_eq!(state, "offer-received");
                }
                other => panic!("unexpected error: {other:?}"),
            }
            match session.issue_credential(thread_id).await.unwrap_err() {
                ControllerError::RecordNotFound { state, .. } => {
                    assert_eq!(state, "request-received")
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
        assert!(admin
            .calls()
            .iter()
            .all(|c| c.method == "GET" && c.path == EXCHANGE_RECORDS));
    }

    #[tokio::test]
    async fn test_issue_credential_posts_empty_body() {
        let admin = ScriptedAdmin::new()
            .on(
                Method::GET,
                EXCHANGE_RECORDS,
                json!({ "results": [record("ex-1", "th-1", "request-received")] }),
            )
            .on(
                Method::POST,
                "/issue-credential-2.0/records/ex-1/issue",
                json!({ "state": "credential-issued" }),
            );
        let (session, admin, _) = session(admin);

        session.issue_credential("th-1").await.unwrap();

        let issued = admin.calls_to(Method::POST, "/issue-credential-2.0/records/ex-1/issue");
        assert_eq!(issued[0].body, Some(json!({})));
    }

    #[tokio::test]
    async fn test_accept_connection_request_uses_first_match() {
        let admin = ScriptedAdmin::new()
            .on(
                Method::GET,
                "/connections",
                json!({ "results": [
                    { "connection_id": "c-1", "their_did": "peer" },
                    { "connection_id": "c-2", "their_did": "peer" }
                ] }),
            )
            .on(
                Method::POST,
                "/connections/c-1/accept-request",
                json!({ "connection_id": "c-1", "state": "response" }),
            );
        let (session, _, _) = session(admin);

        let accepted = session.accept_connection_request("peer").await.unwrap();
        assert_eq!(accepted.connection_id, "c-1");
    }

    #[tokio::test]
    async fn test_accept_connection_request_without_match() {
        let admin = ScriptedAdmin::new().on(Method::GET, "/connections", json!({ "results": [] }));
        let (session, _, _) = session(admin);

        let err = session.accept_connection_request("peer").await.unwrap_err();
        assert!(matches!(err, ControllerError::ConnectionNotFound { their_did } if their_did == "peer"));
    }

    #[tokio::test]
    async fn test_has_connection_stays_true_once_visible() {
        let admin = ScriptedAdmin::new()
            .on(Method::GET, "/connections", json!({ "results": [] }))
            .on(
                Method::GET,
                "/connections",
                json!({ "results": [{ "connection_id": "c-1" }] }),
            );
        let (session, _, _) = session(admin);
        let filter = ConnectionFilter::their_did("peer");

        assert!(!session.has_connection(&filter).await.unwrap());
        for _ in 0..3 {
            assert!(session.has_connection(&filter).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_build_credential_preview() {
        let admin = ScriptedAdmin::new()
            .on(
                Method::GET,
                "/schemas/Av1:2:demo:1.0",
                json!({ "schema": { "id": "Av1:2:demo:1.0", "attrNames": ["Attr1", "Attr2"] } }),
            )
            .on(Method::GET, "/schemas/missing", json!({ "schema": {} }));
        let (session, _, _) = session(admin);

        let preview = session
            .build_credential_preview("Av1:2:demo:1.0", "default")
            .await
            .unwrap();
        assert_eq!(
            preview,
            vec![
                CredentialAttribute::new("Attr1", "default"),
                CredentialAttribute::new("Attr2", "default")
            ]
        );

        let err = session
            .build_credential_preview("missing", "default")
            .await
            .unwrap_err();
        assert!(matches!(err, ControllerError::UnknownSchema { schema_id } if schema_id == "missing"));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates_unchanged() {
        let admin = ScriptedAdmin::new().on_status(
            Method::POST,
            "/connections/create-invitation",
            500,
            "boom",
        );
        let (session, _, _) = session(admin);

        let err = session.create_invitation().await.unwrap_err();
        assert!(matches!(err, ControllerError::RequestFailed { status: 500, .. }));
    }
}
