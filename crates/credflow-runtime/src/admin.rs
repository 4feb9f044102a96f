//! HTTP transport for one agent's admin API.
//!
//! Every admin call goes through [`AdminApi::request`]. The transport maps
//! HTTP outcomes onto [`ControllerError`] variants and never retries; waiting
//! for remote state to converge is the caller's business (see `poll`).

use async_trait::async_trait;
use credflow_types::error::{ControllerError, ControllerResult};
use serde_json::Value;
use tracing::debug;

pub use reqwest::Method;

/// Keys whose values never appear in trace output.
const SECRET_KEYS: &[&str] = &[
    "seed",
    "wallet_key",
    "private_key",
    "api_key",
    "link_secret",
    "secret",
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How a successful response body is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    #[default]
    Json,
    Text,
}

/// A decoded 2xx response.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminResponse {
    Json(Value),
    Text(String),
    /// 2xx with an empty body in JSON mode.
    Empty,
}

impl AdminResponse {
    /// Collapse into a JSON value; `Empty` becomes `null`.
    pub fn into_json(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
            Self::Empty => Value::Null,
        }
    }
}

/// Query parameters; `None` values are dropped before sending.
pub type Query<'a> = [(&'a str, Option<&'a str>)];

/// An agent's admin API.
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Name of the controller driving this agent, for log context.
    fn agent(&self) -> &str;

    /// Issue one request against the admin API.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &Query<'_>,
        mode: ResponseMode,
    ) -> ControllerResult<AdminResponse>;

    /// `GET` in JSON mode.
    async fn get(&self, path: &str, query: &Query<'_>) -> ControllerResult<Value> {
        self.request(Method::GET, path, None, query, ResponseMode::Json)
            .await
            .map(AdminResponse::into_json)
    }

    /// `POST` in JSON mode.
    async fn post(
        &self,
        path: &str,
        body: Option<&Value>,
        query: &Query<'_>,
    ) -> ControllerResult<Value> {
        self.request(Method::POST, path, body, query, ResponseMode::Json)
            .await
            .map(AdminResponse::into_json)
    }

    /// Mark the end of use. Implementations hold no resource that outlives
    /// them; pooled connections go when the last handle is dropped.
    async fn close(&self) {}
}

// ---------------------------------------------------------------------------
// reqwest transport
// ---------------------------------------------------------------------------

/// [`AdminApi`] over a pooled `reqwest` client.
pub struct AdminTransport {
    agent: String,
    base_url: String,
    client: reqwest::Client,
}

impl AdminTransport {
    /// Create a transport for the admin API at `base_url`.
    pub fn new(agent: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .user_agent(concat!("credflow/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AdminApi for AdminTransport {
    fn agent(&self) -> &str {
        &self.agent
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &Query<'_>,
        mode: ResponseMode,
    ) -> ControllerResult<AdminResponse> {
        let params = present_params(query);
        let url = format!("{}{}", self.base_url, path);

        let traced_body = body.map(redact).unwrap_or_default();
        debug!(
            agent = %self.agent,
            method = %method,
            path,
            query = ?params,
            body = %traced_body,
            "admin request"
        );

        let mut request = self.client.request(method.clone(), &url);
        if !params.is_empty() {
            request = request.query(&params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ControllerError::Transport {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|e| ControllerError::Transport {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        debug!(
            agent = %self.agent,
            path,
            status = status.as_u16(),
            response = %text,
            "admin response"
        );

        if !status.is_success() {
            return Err(ControllerError::RequestFailed {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }
        decode_body(path, text, mode)
    }

    /// Logs only. The `reqwest` pool is released when `AgentSession::close`
    /// drops the last `Arc` to this transport.
    async fn close(&self) {
        debug!(agent = %self.agent, base_url = %self.base_url, "admin transport closed");
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Drop `None` entries from a query.
pub fn present_params<'a>(query: &Query<'a>) -> Vec<(&'a str, &'a str)> {
    query
        .iter()
        .filter_map(|(key, value)| value.map(|v| (*key, v)))
        .collect()
}

/// Interpret a 2xx body according to `mode`.
pub fn decode_body(path: &str, text: String, mode: ResponseMode) -> ControllerResult<AdminResponse> {
    match mode {
        ResponseMode::Text => Ok(AdminResponse::Text(text)),
        ResponseMode::Json if text.trim().is_empty() => Ok(AdminResponse::Empty),
        ResponseMode::Json => serde_json::from_str(&text)
            .map(AdminResponse::Json)
            .map_err(|_| ControllerError::DecodeFailed {
                path: path.to_string(),
                body: text,
            }),
    }
}

/// Copy of `value` with every secret-bearing key masked, at any depth.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| {
                    if SECRET_KEYS.contains(&key.as_str()) {
                        (key.clone(), Value::String("***".to_string()))
                    } else {
                        (key.clone(), redact(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
