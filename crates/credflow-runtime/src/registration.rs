//! Schema and credential definition registration.
//!
//! Both ledger objects follow the same flow. The creation request either
//! returns the new id (direct mode) or returns without one because an
//! endorser still has to sign the write (endorsed mode). In endorsed mode the
//! id only shows up later in the agent's "created" listing, which is polled
//! under the session's discovery policy.

use crate::poll::poll_until;
use crate::session::AgentSession;
use credflow_types::error::{ControllerError, ControllerResult};
use credflow_types::ledger::{default_cred_def_tag, LedgerArtifacts, SchemaSpec};
use serde_json::{json, Value};
use tracing::info;

/// Result of a creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The agent wrote the object and returned its id.
    Direct(String),
    /// The write awaits endorsement; the id is not known yet.
    Endorsed,
}

impl RegistrationOutcome {
    /// Read `id_field` from the top level of `response`, or from `sent`.
    pub fn from_response(response: &Value, id_field: &str) -> Self {
        response[id_field]
            .as_str()
            .or_else(|| response["sent"][id_field].as_str())
            .map(|id| Self::Direct(id.to_string()))
            .unwrap_or(Self::Endorsed)
    }
}

/// Where a kind of ledger object is created and listed.
struct LedgerObject {
    kind: &'static str,
    create_path: &'static str,
    created_path: &'static str,
    id_field: &'static str,
    listing_field: &'static str,
}

const SCHEMA: LedgerObject = LedgerObject {
    kind: "schema",
    create_path: "/schemas",
    created_path: "/schemas/created",
    id_field: "schema_id",
    listing_field: "schema_ids",
};

const CRED_DEF: LedgerObject = LedgerObject {
    kind: "credential definition",
    create_path: "/credential-definitions",
    created_path: "/credential-definitions/created",
    id_field: "credential_definition_id",
    listing_field: "credential_definition_ids",
};

impl AgentSession {
    /// Register a schema, reusing one this agent already created with the
    /// same name and version.
    pub async fn register_schema(&self, schema: &SchemaSpec) -> ControllerResult<String> {
        let query = [
            ("schema_name", Some(schema.name.as_str())),
            ("schema_version", Some(schema.version.as_str())),
        ];

        if let Some(existing) = self.first_created(&SCHEMA, &query, None).await? {
            info!(agent = %self.ident, schema_id = %existing, "Schema {} exists already on ledger", schema.name);
            return Ok(existing);
        }

        info!(agent = %self.ident, name = %schema.name, version = %schema.version, "Registering schema");
        let body = json!({
            "schema_name": schema.name,
            "schema_version": schema.version,
            "attributes": schema.attributes,
        });

        let schema_id = self
            .create(&SCHEMA, &body, &query, None)
            .await?
            .ok_or_else(|| ControllerError::SchemaNotFound {
                name: schema.name.clone(),
            })?;
        info!(agent = %self.ident, schema_id = %schema_id, "Schema registered");
        Ok(schema_id)
    }

    /// Register a credential definition for `schema_id`.
    ///
    /// Without a tag, `{ident}.{schema_name}` (spaces removed) is used. A tag
    /// cannot be reused for the same schema, so repeated runs need fresh tags.
    pub async fn register_cred_def(
        &self,
        schema_id: &str,
        schema_name: &str,
        tag: Option<&str>,
    ) -> ControllerResult<LedgerArtifacts> {
        let tag = tag
            .map(String::from)
            .unwrap_or_else(|| default_cred_def_tag(&self.ident, schema_name));

        info!(agent = %self.ident, schema_id, tag = %tag, "Registering credential definition");
        let body = json!({
            "schema_id": schema_id,
            "support_revocation": false,
            "tag": tag,
        });
        let query = [("schema_id", Some(schema_id))];

        let cred_def_id = self
            .create(&CRED_DEF, &body, &query, Some(tag.as_str()))
            .await?
            .ok_or_else(|| ControllerError::CredDefNotFound {
                schema_id: schema_id.to_string(),
            })?;
        info!(agent = %self.ident, cred_def_id = %cred_def_id, "Credential definition registered");

        Ok(LedgerArtifacts {
            schema_id: schema_id.to_string(),
            cred_def_id,
        })
    }

    pub async fn register_schema_and_cred_def(
        &self,
        schema: &SchemaSpec,
        tag: Option<&str>,
    ) -> ControllerResult<LedgerArtifacts> {
        let schema_id = self.register_schema(schema).await?;
        self.register_cred_def(&schema_id, &schema.name, tag).await
    }

    /// Submit a creation request. `Ok(None)` means the object was endorsed
    /// but never appeared in the listing filtered by `query`. With a `tag`,
    /// only a listed id ending in `:{tag}` counts.
    async fn create(
        &self,
        object: &LedgerObject,
        body: &Value,
        query: &[(&str, Option<&str>)],
        tag: Option<&str>,
    ) -> ControllerResult<Option<String>> {
        let response = self.admin.post(object.create_path, Some(body), &[]).await?;

        match RegistrationOutcome::from_response(&response, object.id_field) {
            RegistrationOutcome::Direct(id) => Ok(Some(id)),
            RegistrationOutcome::Endorsed => {
                info!(agent = %self.ident, "Waiting for endorsement of {}", object.kind);
                let outcome =
                    poll_until(&self.discovery, move || self.first_created(object, query, tag)).await?;
                info!(
                    agent = %self.ident,
                    attempts = outcome.attempts(),
                    "Polled {} listing",
                    object.kind
                );
                Ok(outcome.ready())
            }
        }
    }

    /// First id in the object's "created" listing, if any. With a `tag`,
    /// ids carrying another tag are skipped.
    async fn first_created(
        &self,
        object: &LedgerObject,
        query: &[(&str, Option<&str>)],
        tag: Option<&str>,
    ) -> ControllerResult<Option<String>> {
        let listing = self.admin.get(object.created_path, query).await?;
        Ok(listing[object.listing_field]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .find(|id| tag.map_or(true, |tag| has_tag(id, tag)))
            .map(String::from))
    }
}

/// Cred def ids end in their tag: `{did}:3:CL:{seq}:{tag}`.
fn has_tag(id: &str, tag: &str) -> bool {
    id.rsplit(':').next() == Some(tag)
}
