//! Ledger artifacts: schemas and credential definitions.

use crate::error::{ControllerError, ControllerResult};
use serde::{Deserialize, Serialize};

/// A schema to register: a named, versioned list of attribute names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSpec {
    /// Schema name.
    pub name: String,
    /// Schema version, e.g. `"1.0"`.
    pub version: String,
    /// Attribute names, in order.
    pub attributes: Vec<String>,
}

/// Name and version recovered from a schema id.
///
/// Schema ids look like `{issuer_did}:2:{name}:{version}`; only the last two
/// segments are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRef {
    pub name: String,
    pub version: String,
}

impl SchemaRef {
    /// Split `schema_id` on `:` and take the last two segments.
    pub fn parse(schema_id: &str) -> ControllerResult<Self> {
        let mut segments = schema_id.rsplit(':');
        match (segments.next(), segments.next()) {
            (Some(version), Some(name)) if !version.is_empty() && !name.is_empty() => Ok(Self {
                name: name.to_string(),
                version: version.to_string(),
            }),
            _ => Err(ControllerError::InvalidSchemaId(schema_id.to_string())),
        }
    }
}

/// Default credential definition tag: `{issuer_ident}.{schema_name}` with
/// all spaces removed.
pub fn default_cred_def_tag(issuer_ident: &str, schema_name: &str) -> String {
    format!("{issuer_ident}.{schema_name}").replace(' ', "")
}

/// Ids of a schema and its credential definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerArtifacts {
    pub schema_id: String,
    pub cred_def_id: String,
}
