//! Ledger registration service client.
//!
//! The service exposes a single `POST /register` endpoint that writes a NYM
//! (DID + verkey + role) to the ledger on the caller's behalf.

use async_trait::async_trait;
use credflow_types::error::{ControllerError, ControllerResult};
use credflow_types::identity::DidRole;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Body of `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NymRequest {
    pub alias: String,
    pub role: DidRole,
    pub did: String,
    pub verkey: String,
}

/// What the ledger echoes back for a registered NYM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NymInfo {
    pub did: String,
    #[serde(default)]
    pub verkey: Option<String>,
}

/// Something that can write a NYM to the ledger.
#[async_trait]
pub trait LedgerRegistrar: Send + Sync {
    async fn register_nym(&self, request: &NymRequest) -> ControllerResult<NymInfo>;
}

/// HTTP client for the ledger registration service.
pub struct LedgerClient {
    ledger_url: String,
    client: reqwest::Client,
}

impl LedgerClient {
    pub fn new(ledger_url: impl Into<String>) -> Self {
        Self {
            ledger_url: ledger_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .user_agent(concat!("credflow/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn ledger_url(&self) -> &str {
        &self.ledger_url
    }
}

#[async_trait]
impl LedgerRegistrar for LedgerClient {
    async fn register_nym(&self, request: &NymRequest) -> ControllerResult<NymInfo> {
        let url = format!("{}/register", self.ledger_url);
        debug!(url = %url, alias = %request.alias, did = %request.did, role = %request.role, "Registering NYM");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ControllerError::Transport {
                path: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ControllerError::Transport {
            path: url.clone(),
            reason: e.to_string(),
        })?;

        if status != 200 {
            let sent = serde_json::to_string(request).unwrap_or_default();
            return Err(ControllerError::LedgerRegistrationFailed {
                status,
                payload: format!("request {sent}, response {body}"),
            });
        }

        let info: NymInfo =
            serde_json::from_str(&body).map_err(|_| ControllerError::DecodeFailed {
                path: url.clone(),
                body,
            })?;
        info!(did = %info.did, alias = %request.alias, "Ledger accepted NYM");
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn nym() -> NymRequest {
        NymRequest {
            alias: "ServerController".to_string(),
            role: DidRole::Endorser,
            did: "Av1".to_string(),
            verkey: "vk1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_nym_posts_payload() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/register")
            .match_body(Matcher::Json(json!({
                "alias": "ServerController",
                "role": "ENDORSER",
                "did": "Av1",
                "verkey": "vk1"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"did":"Av1","seed":null,"verkey":"vk1"}"#)
            .create_async()
            .await;

        let client = LedgerClient::new(format!("{}/", server.url()));
        let info = client.register_nym(&nym()).await.unwrap();

        assert_eq!(info.did, "Av1");
        assert_eq!(info.verkey.as_deref(), Some("vk1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_200_is_registration_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/register")
            .with_status(201)
            .with_body("pending")
            .create_async()
            .await;

        let client = LedgerClient::new(server.url());
        let err = client.register_nym(&nym()).await.unwrap_err();
        match err {
            ControllerError::LedgerRegistrationFailed { status, payload } => {
                assert_eq!(status, 201);
                assert!(payload.contains("\"did\":\"Av1\""));
                assert!(payload.contains("pending"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
