//! Subcommand implementations.

pub mod exec;
pub mod run;
pub mod shell;

use crate::cli::AgentChoice;
use crate::ui;
use credflow_kernel::error::{KernelError, KernelResult};
use credflow_runtime::ledger::{LedgerClient, LedgerRegistrar};
use credflow_runtime::session::AgentSession;
use credflow_types::config::ControllerConfig;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Exit code for a run cut short by Ctrl+C.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Run `future` to completion on a fresh runtime and return its exit code.
pub(crate) fn block_on<F>(future: F) -> i32
where
    F: Future<Output = i32>,
{
    match tokio::runtime::Runtime::new() {
        Ok(rt) => {
            let code = rt.block_on(future);
            // A pending stdin read must not keep the process alive.
            rt.shutdown_background();
            code
        }
        Err(e) => {
            ui::error(&format!("Failed to start async runtime: {e}"));
            1
        }
    }
}

/// Race `future` against Ctrl+C.
pub(crate) async fn interruptible<F: Future>(future: F) -> KernelResult<F::Output> {
    tokio::select! {
        output = future => Ok(output),
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, closing sessions");
            Err(KernelError::Interrupted)
        }
    }
}

pub(crate) fn exit_code(err: &KernelError) -> i32 {
    match err {
        KernelError::Interrupted => EXIT_INTERRUPTED,
        _ => 1,
    }
}

/// Open an HTTP session for one configured agent.
pub(crate) fn open_session(config: &ControllerConfig, agent: AgentChoice) -> AgentSession {
    let endpoint = match agent {
        AgentChoice::Issuer => &config.issuer,
        AgentChoice::Holder => &config.holder,
    };
    let ledger: Arc<dyn LedgerRegistrar> = Arc::new(LedgerClient::new(&config.ledger_url));
    AgentSession::connect(&endpoint.ident, &endpoint.admin_url, ledger, &config.polling)
}

/// Human-readable form of a command result.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "ok".to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
