//! Built-in commands over one `AgentSession`.

use crate::dispatcher::{CommandDispatcher, CommandHandler};
use async_trait::async_trait;
use credflow_runtime::session::AgentSession;
use credflow_types::command::CommandArgs;
use credflow_types::error::{ControllerError, ControllerResult};
use credflow_types::exchange::{CredentialAttribute, CredentialOffer, ExchangeFilter, ExchangeState};
use credflow_types::identity::DidRole;
use credflow_types::ledger::SchemaSpec;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Version used by `register_schema`.
pub const DEFAULT_SCHEMA_VERSION: &str = "1.0";

/// The session operations exposed as commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    RegisterDid,
    RegisterSchema,
    RegisterCredDef,
    OfferCredential,
    RequestCredential,
    IssueCredential,
    PublicDid,
    CreateInvitation,
    ReceiveInvitation,
    AcceptConnectionRequest,
    CredentialRecords,
}

impl Builtin {
    /// Every built-in with its name and argument spec, in registration order.
    pub const ALL: [(Builtin, &'static str, &'static [(&'static str, &'static str)]); 11] = [
        (Builtin::RegisterDid, "register_did", &[]),
        (
            Builtin::RegisterSchema,
            "register_schema",
            &[("schema_name", "1"), ("schema_attrs", "+")],
        ),
        (
            Builtin::RegisterCredDef,
            "register_cred_def",
            &[("schema_id", "1"), ("schema_name", "1"), ("tag", "?")],
        ),
        (
            Builtin::OfferCredential,
            "offer_credential",
            &[
                ("connection_id", "1"),
                ("schema_id", "1"),
                ("cred_def_id", "1"),
                ("attributes_json", "1"),
                ("schema_issuer_did", "?"),
            ],
        ),
        (Builtin::RequestCredential, "request_credential", &[("thread_id", "1")]),
        (Builtin::IssueCredential, "issue_credential", &[("thread_id", "1")]),
        (Builtin::PublicDid, "public_did", &[]),
        (Builtin::CreateInvitation, "create_invitation", &[]),
        (
            Builtin::ReceiveInvitation,
            "receive_invitation",
            &[("invitation_json", "1")],
        ),
        (
            Builtin::AcceptConnectionRequest,
            "accept_connection_request",
            &[("their_did", "1")],
        ),
        (
            Builtin::CredentialRecords,
            "credential_records",
            &[("thread_id", "?"), ("state", "?")],
        ),
    ];
}

/// A dispatcher with every built-in registered.
pub fn session_commands() -> ControllerResult<CommandDispatcher<AgentSession>> {
    let mut dispatcher = CommandDispatcher::new();
    for (builtin, name, params) in Builtin::ALL {
        dispatcher.register(name, params, builtin)?;
    }
    Ok(dispatcher)
}

#[async_trait]
impl CommandHandler<AgentSession> for Builtin {
    async fn invoke(&self, session: &mut AgentSession, args: CommandArgs) -> ControllerResult<Value> {
        match self {
            Builtin::RegisterDid => to_json(&session.register_did(DidRole::Endorser).await?),
            Builtin::RegisterSchema => {
                let schema = SchemaSpec {
                    name: args.one("schema_name")?.to_string(),
                    version: DEFAULT_SCHEMA_VERSION.to_string(),
                    attributes: args.list("schema_attrs")?.to_vec(),
                };
                Ok(Value::String(session.register_schema(&schema).await?))
            }
            Builtin::RegisterCredDef => {
                let artifacts = session
                    .register_cred_def(
                        args.one("schema_id")?,
                        args.one("schema_name")?,
                        args.optional("tag"),
                    )
                    .await?;
                to_json(&artifacts)
            }
            Builtin::OfferCredential => {
                let attributes: Vec<CredentialAttribute> =
                    parse_json("offer_credential", "attributes_json", args.one("attributes_json")?)?;
                let offer = CredentialOffer {
                    connection_id: args.one("connection_id")?.to_string(),
                    schema_id: args.one("schema_id")?.to_string(),
                    cred_def_id: args.one("cred_def_id")?.to_string(),
                    attributes,
                    schema_issuer_did: args.optional("schema_issuer_did").map(String::from),
                };
                to_json(&session.offer_credential(&offer).await?)
            }
            Builtin::RequestCredential => session.request_credential(args.one("thread_id")?).await,
            Builtin::IssueCredential => session.issue_credential(args.one("thread_id")?).await,
            Builtin::PublicDid => to_json(&session.get_public_did().await?),
            Builtin::CreateInvitation => to_json(&session.create_invitation().await?),
            Builtin::ReceiveInvitation => {
                let invitation: Value =
                    parse_json("receive_invitation", "invitation_json", args.one("invitation_json")?)?;
                to_json(&session.receive_invitation(&invitation).await?)
            }
            Builtin::AcceptConnectionRequest => {
                to_json(&session.accept_connection_request(args.one("their_did")?).await?)
            }
            Builtin::CredentialRecords => {
                let filter = ExchangeFilter {
                    thread_id: args.optional("thread_id").map(String::from),
                    state: args.optional("state").map(ExchangeState::from),
                    ..Default::default()
                };
                to_json(&session.get_credential_exchange_records(&filter).await?)
            }
        }
    }
}

fn parse_json<T: DeserializeOwned>(command: &str, argument: &str, raw: &str) -> ControllerResult<T> {
    serde_json::from_str(raw).map_err(|e| ControllerError::InvalidArgument {
        command: command.to_string(),
        argument: argument.to_string(),
        reason: e.to_string(),
    })
}

fn to_json<T: Serialize>(value: &T) -> ControllerResult<Value> {
    serde_json::to_value(value).map_err(|e| ControllerError::EncodeFailed(e.to_string()))
}
