//! `credflow exec` and `credflow commands`.

use super::{block_on, exit_code, interruptible, open_session, render_value};
use crate::cli::AgentChoice;
use crate::ui;
use credflow_kernel::commands::session_commands;
use credflow_kernel::error::KernelResult;
use credflow_kernel::CommandDispatcher;
use credflow_runtime::session::AgentSession;
use credflow_types::command::CommandSelector;
use credflow_types::config::ControllerConfig;
use serde_json::Value;

pub fn cmd_commands() -> i32 {
    match session_commands() {
        Ok(dispatcher) => {
            print_commands(&dispatcher);
            0
        }
        Err(e) => {
            ui::error(&e.to_string());
            1
        }
    }
}

pub(crate) fn print_commands(dispatcher: &CommandDispatcher<AgentSession>) {
    ui::section("Commands");
    for (index, command) in dispatcher.commands().iter().enumerate() {
        ui::command_line(index, command.name(), &command.signature());
    }
}

pub fn cmd_exec(
    config: &ControllerConfig,
    agent: AgentChoice,
    command: &str,
    raw: &[(String, String)],
) -> i32 {
    let dispatcher = match session_commands() {
        Ok(d) => d,
        Err(e) => {
            ui::error(&e.to_string());
            return 1;
        }
    };
    let selector = CommandSelector::from(command);

    block_on(async move {
        let mut session = open_session(config, agent);
        let outcome = execute(&dispatcher, &mut session, &selector, raw).await;
        session.close().await;

        match outcome {
            Ok(value) => {
                println!("{}", render_value(&value));
                0
            }
            Err(e) => {
                ui::error(&e.to_string());
                exit_code(&e)
            }
        }
    })
}

async fn execute(
    dispatcher: &CommandDispatcher<AgentSession>,
    session: &mut AgentSession,
    selector: &CommandSelector,
    raw: &[(String, String)],
) -> KernelResult<Value> {
    let args = dispatcher.resolve(selector)?.bind(raw);
    Ok(interruptible(dispatcher.execute(session, selector, args)).await??)
}
