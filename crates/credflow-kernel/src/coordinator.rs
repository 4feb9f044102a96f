//! Issuer/holder choreography.
//!
//! The coordinator drives two sessions through connection establishment,
//! ledger registration and credential issuance. It never runs the two
//! sessions concurrently: every cross-party step is issue, then poll the
//! other side until the effect is visible, then proceed.

use crate::error::{KernelError, KernelResult};
use chrono::{DateTime, Utc};
use credflow_runtime::ledger::{LedgerClient, LedgerRegistrar};
use credflow_runtime::poll::{connection_policy, exchange_policy, poll_until, PollPolicy};
use credflow_runtime::session::AgentSession;
use credflow_types::config::{ControllerConfig, PollingConfig};
use credflow_types::connection::{ConnectionFilter, ConnectionPair};
use credflow_types::error::ControllerError;
use credflow_types::exchange::{CredentialAttribute, CredentialOffer, ExchangeFilter, ExchangeState};
use credflow_types::identity::{Did, DidRole};
use credflow_types::ledger::{LedgerArtifacts, SchemaSpec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Identifier of one coordinator run, for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A credential that reached the issued state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedCredential {
    pub thread_id: String,
    /// Issuer-local exchange id.
    pub issuer_cred_ex_id: String,
}

/// Inputs of a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    pub schema: SchemaSpec,
    /// Must be unique per run: a tag cannot be reissued for a schema.
    pub cred_def_tag: String,
    /// Register fresh DIDs for both agents before anything else.
    pub register_dids: bool,
    /// Value given to every attribute of the issued credential.
    pub preview_default: String,
}

impl SessionPlan {
    pub fn new(schema: SchemaSpec, cred_def_tag: impl Into<String>) -> Self {
        Self {
            schema,
            cred_def_tag: cred_def_tag.into(),
            register_dids: true,
            preview_default: "default".to_string(),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub issuer_did: Option<String>,
    pub holder_did: Option<String>,
    pub connection: ConnectionPair,
    pub artifacts: LedgerArtifacts,
    pub credential: IssuedCredential,
}

/// Drives an issuer and a holder session.
pub struct ExchangeCoordinator {
    run_id: RunId,
    issuer: AgentSession,
    holder: AgentSession,
    connection_policy: PollPolicy,
    exchange_policy: PollPolicy,
}

impl ExchangeCoordinator {
    pub fn new(issuer: AgentSession, holder: AgentSession, polling: &PollingConfig) -> Self {
        Self::with_policies(
            issuer,
            holder,
            connection_policy(polling),
            exchange_policy(polling),
        )
    }

    pub fn with_policies(
        issuer: AgentSession,
        holder: AgentSession,
        connection_policy: PollPolicy,
        exchange_policy: PollPolicy,
    ) -> Self {
        Self {
            run_id: RunId::new(),
            issuer,
            holder,
            connection_policy,
            exchange_policy,
        }
    }

    /// Open HTTP sessions for both configured agents, sharing one ledger client.
    pub fn from_config(config: &ControllerConfig) -> Self {
        let ledger: Arc<dyn LedgerRegistrar> = Arc::new(LedgerClient::new(&config.ledger_url));
        let issuer = AgentSession::connect(
            &config.issuer.ident,
            &config.issuer.admin_url,
            ledger.clone(),
            &config.polling,
        );
        let holder = AgentSession::connect(
            &config.holder.ident,
            &config.holder.admin_url,
            ledger,
            &config.polling,
        );
        Self::new(issuer, holder, &config.polling)
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn issuer(&self) -> &AgentSession {
        &self.issuer
    }

    pub fn holder(&self) -> &AgentSession {
        &self.holder
    }

    /// Register a fresh endorser DID for the issuer, then the holder.
    pub async fn register_did(&mut self) -> KernelResult<(Did, Did)> {
        let issuer = self.issuer.register_did(DidRole::Endorser).await?;
        let holder = self.holder.register_did(DidRole::Endorser).await?;
        Ok((issuer, holder))
    }

    /// Connect holder to issuer. Returns both parties' connection ids.
    ///
    /// The issuer only sees the holder's request after the agents have
    /// exchanged messages, so it polls for it without a bound.
    pub async fn exchange_connection(&self) -> KernelResult<ConnectionPair> {
        info!(run = %self.run_id, "Establish connection between holder and issuer");
        let invitation = self.issuer.create_invitation().await?;
        let received = self.holder.receive_invitation(&invitation.invitation).await?;
        let requested = self.holder.request_connection(&received.connection_id).await?;

        let holder_did = requested.my_did.ok_or_else(|| {
            ControllerError::missing_field(
                &format!("/connections/{}/accept-invitation", received.connection_id),
                "my_did",
            )
        })?;

        info!(agent = %self.issuer.ident(), their_did = %holder_did, "Wait for connection");
        let issuer = &self.issuer;
        let filter = ConnectionFilter::their_did(holder_did.clone());
        let filter = &filter;
        poll_until(&self.connection_policy, move || async move {
            issuer.has_connection(filter).await.map(|found| found.then_some(()))
        })
        .await?
        .ready()
        .ok_or_else(|| ControllerError::ConnectionNotFound {
            their_did: holder_did.clone(),
        })?;

        let accepted = self.issuer.accept_connection_request(&holder_did).await?;
        let pair = ConnectionPair {
            issuer_connection_id: accepted.connection_id,
            holder_connection_id: received.connection_id,
        };
        info!(
            run = %self.run_id,
            issuer_connection_id = %pair.issuer_connection_id,
            holder_connection_id = %pair.holder_connection_id,
            "Connection established"
        );
        Ok(pair)
    }

    /// Register the schema and a credential definition on the issuer.
    pub async fn register_schema_and_cred_def(
        &self,
        schema: &SchemaSpec,
        cred_def_tag: &str,
    ) -> KernelResult<LedgerArtifacts> {
        info!(run = %self.run_id, schema = %schema.name, "Register schema and credential definition");
        Ok(self
            .issuer
            .register_schema_and_cred_def(schema, Some(cred_def_tag))
            .await?)
    }

    /// Carry a credential through offer, request and issue.
    pub async fn exchange_credential(
        &mut self,
        issuer_connection_id: &str,
        artifacts: &LedgerArtifacts,
        attributes: Vec<CredentialAttribute>,
    ) -> KernelResult<IssuedCredential> {
        info!(run = %self.run_id, "Issue credential from issuer to holder");
        let receipt = self
            .issuer
            .offer_credential(&CredentialOffer {
                connection_id: issuer_connection_id.to_string(),
                schema_id: artifacts.schema_id.clone(),
                cred_def_id: artifacts.cred_def_id.clone(),
                attributes,
                schema_issuer_did: None,
            })
            .await?;
        let thread_id = receipt.thread_id.as_str();

        info!(agent = %self.holder.ident(), thread_id, "Wait for credential offer");
        self.wait_for_record(&self.holder, ExchangeFilter::thread(thread_id))
            .await?;
        self.holder.request_credential(thread_id).await?;

        info!(agent = %self.issuer.ident(), thread_id, "Wait for credential request");
        self.wait_for_record(
            &self.issuer,
            ExchangeFilter::thread_in_state(thread_id, ExchangeState::RequestReceived),
        )
        .await?;
        self.issuer.issue_credential(thread_id).await?;

        info!(run = %self.run_id, thread_id, "Credential issued");
        Ok(IssuedCredential {
            thread_id: receipt.thread_id.clone(),
            issuer_cred_ex_id: receipt.cred_ex_id.clone(),
        })
    }

    async fn wait_for_record(&self, session: &AgentSession, filter: ExchangeFilter) -> KernelResult<()> {
        let filter = &filter;
        poll_until(&self.exchange_policy, move || async move {
            session
                .has_credential_exchange_record(filter)
                .await
                .map(|found| found.then_some(()))
        })
        .await?
        .ready()
        .ok_or_else(|| {
            KernelError::from(ControllerError::RecordNotFound {
                thread_id: filter.thread_id.clone().unwrap_or_default(),
                state: filter
                    .state
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            })
        })
    }

    /// Run a whole session: DIDs (optional), connection, schema and cred def,
    /// credential preview from the ledger schema, credential exchange.
    pub async fn run(&mut self, plan: &SessionPlan) -> KernelResult<SessionReport> {
        let started_at = Utc::now();
        info!(run = %self.run_id, schema = %plan.schema.name, tag = %plan.cred_def_tag, "Session run started");

        if plan.register_dids {
            self.register_did().await?;
        }
        let connection = self.exchange_connection().await?;
        let artifacts = self
            .register_schema_and_cred_def(&plan.schema, &plan.cred_def_tag)
            .await?;
        let attributes = self
            .issuer
            .build_credential_preview(&artifacts.schema_id, &plan.preview_default)
            .await?;
        let credential = self
            .exchange_credential(&connection.issuer_connection_id, &artifacts, attributes)
            .await?;

        let report = SessionReport {
            run_id: self.run_id,
            started_at,
            finished_at: Utc::now(),
            issuer_did: self.issuer.public_did().map(|d| d.value.clone()),
            holder_did: self.holder.public_did().map(|d| d.value.clone()),
            connection,
            artifacts,
            credential,
        };
        info!(
            run = %self.run_id,
            elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "Session run finished"
        );
        Ok(report)
    }

    /// Close both sessions.
    pub async fn close(self) {
        self.issuer.close().await;
        self.holder.close().await;
        info!(run = %self.run_id, "Coordinator closed");
    }
}
