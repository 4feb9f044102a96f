//! Scripted in-process fakes for session tests.

use crate::admin::{AdminApi, AdminResponse, Query, ResponseMode};
use crate::ledger::{LedgerRegistrar, NymInfo, NymRequest};
use async_trait::async_trait;
use credflow_types::error::{ControllerError, ControllerResult};
use reqwest::Method;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16, String),
}

/// A request the fake received.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl Call {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// [`AdminApi`] answering from per-route reply queues.
///
/// Each `(method, path)` route pops its replies in order; the last reply
/// repeats forever. Unscripted routes answer 404.
#[derive(Default)]
pub struct ScriptedAdmin {
    routes: Mutex<HashMap<(String, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: Method, path: &str, reply: Value) -> Self {
        self.push(method, path, Reply::Json(reply))
    }

    pub fn on_status(self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.push(method, path, Reply::Status(status, body.to_string()))
    }

    fn push(self, method: Method, path: &str, reply: Reply) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method.as_str() && c.path == path)
            .collect()
    }
}

#[async_trait]
impl AdminApi for ScriptedAdmin {
    fn agent(&self) -> &str {
        "Scripted"
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &Query<'_>,
        _mode: ResponseMode,
    ) -> ControllerResult<AdminResponse> {
        self.calls.lock().unwrap().push(Call {
            method: method.to_string(),
            path: path.to_string(),
            body: body.cloned(),
            query: query
                .iter()
                .filter_map(|(k, v)| v.map(|v| (k.to_string(), v.to_string())))
                .collect(),
        });

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&(method.to_string(), path.to_string())) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Json(Value::Null)) => Ok(AdminResponse::Empty),
            Some(Reply::Json(value)) => Ok(AdminResponse::Json(value)),
            Some(Reply::Status(status, body)) => Err(ControllerError::RequestFailed {
                method: method.to_string(),
                path: path.to_string(),
                status,
                body,
            }),
            None => Err(ControllerError::RequestFailed {
                method: method.to_string(),
                path: path.to_string(),
                status: 404,
                body: "unscripted route".to_string(),
            }),
        }
    }
}

/// [`LedgerRegistrar`] that echoes the DID back, or rejects with a status.
#[derive(Default)]
pub struct EchoLedger {
    reject_with: Option<u16>,
    requests: Mutex<Vec<NymRequest>>,
}

impl EchoLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(status: u16) -> Self {
        Self {
            reject_with: Some(status),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<NymRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerRegistrar for EchoLedger {
    async fn register_nym(&self, request: &NymRequest) -> ControllerResult<NymInfo> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(status) = self.reject_with {
            return Err(ControllerError::LedgerRegistrationFailed {
                status,
                payload: request.did.clone(),
            });
        }
        Ok(NymInfo {
            did: request.did.clone(),
            verkey: Some(request.verkey.clone()),
        })
    }
}
