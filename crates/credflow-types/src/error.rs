//! Shared error types for the credflow controller.

use thiserror::Error;

/// Top-level error type for every controller operation.
///
/// Each variant carries the path, status or filter needed to reproduce the
/// failure against the agent by hand.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// The agent answered with a non-2xx status.
    #[error("{method} {path} failed with status {status}: {body}")]
    RequestFailed {
        /// HTTP method of the failed request.
        method: String,
        /// Admin path, relative to the agent's base URL.
        path: String,
        /// Response status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A 2xx response carried a body that is not valid JSON.
    #[error("Could not decode response from {path}: {body}")]
    DecodeFailed {
        /// Admin path the response came from.
        path: String,
        /// Raw response body.
        body: String,
    },

    /// The request never produced a response (connection refused, reset, ...).
    #[error("Transport error on {path}: {reason}")]
    Transport {
        /// Target path or URL.
        path: String,
        /// Underlying client error.
        reason: String,
    },

    /// The ledger registration service rejected a new DID.
    #[error("Ledger rejected DID registration with status {status}: {payload}")]
    LedgerRegistrationFailed {
        /// Response status code.
        status: u16,
        /// Request payload and response body, for reproduction.
        payload: String,
    },

    /// No credential exchange record for the thread is in the required state.
    #[error("No credential exchange record with thread_id {thread_id} in state {state}")]
    RecordNotFound {
        /// Cross-party thread identifier.
        thread_id: String,
        /// State the record was expected to be in.
        state: String,
    },

    /// An endorsed schema never showed up in the created-schemas listing.
    #[error("Schema {name} not found after endorsement polling")]
    SchemaNotFound {
        /// Schema name that was registered.
        name: String,
    },

    /// An endorsed credential definition never showed up in its listing.
    #[error("Credential definition for schema {schema_id} not found after endorsement polling")]
    CredDefNotFound {
        /// Schema the definition was registered for.
        schema_id: String,
    },

    /// No connection matches the peer DID.
    #[error("No connection with their_did {their_did}")]
    ConnectionNotFound {
        /// Peer DID used as the filter.
        their_did: String,
    },

    /// The ledger has no schema with the given id.
    #[error("Ledger has no schema with id {schema_id}")]
    UnknownSchema {
        /// Queried schema id.
        schema_id: String,
    },

    /// A response decoded fine but lacks a field the protocol requires.
    #[error("Response from {path} is missing field '{field}'")]
    UnexpectedResponse {
        /// Admin path the response came from.
        path: String,
        /// Missing or mistyped field.
        field: String,
    },

    /// A schema id without the trailing `name:version` segments.
    #[error("Invalid schema id: {0}")]
    InvalidSchemaId(String),

    /// A command was registered with an unusable argument specification.
    #[error("Invalid argument spec: {0}")]
    InvalidArgumentSpec(String),

    /// Resolved arguments do not fit the command's declared arity.
    #[error("Invalid argument '{argument}' for command '{command}': {reason}")]
    InvalidArgument {
        /// Command being executed.
        command: String,
        /// Offending argument.
        argument: String,
        /// What is wrong with it.
        reason: String,
    },

    /// No command with this name or index is registered.
    #[error("{0} is not a valid command")]
    UnknownCommand(String),

    #[error("Could not encode result as JSON: {0}")]
    EncodeFailed(String),
}

impl ControllerError {
    /// Build a [`ControllerError::UnexpectedResponse`] for `field` of `path`.
    pub fn missing_field(path: &str, field: &str) -> Self {
        Self::UnexpectedResponse {
            path: path.to_string(),
            field: field.to_string(),
        }
    }
}

/// Alias for Result with ControllerError.
pub type ControllerResult<T> = Result<T, ControllerError>;
