//! `credflow shell`: read a command, read its arguments, execute, repeat.

use super::exec::print_commands;
use super::{block_on, interruptible, open_session, render_value, EXIT_INTERRUPTED};
use crate::cli::AgentChoice;
use crate::ui;
use credflow_kernel::commands::session_commands;
use credflow_kernel::dispatcher::raw_value;
use credflow_types::command::{Arity, CommandArgs, CommandSelector};
use credflow_types::config::ControllerConfig;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// What the loop should do after reading one line.
enum Input {
    Line(String),
    /// EOF or Ctrl+C: leave with this exit code.
    Quit(i32),
}

pub fn cmd_shell(config: &ControllerConfig, agent: AgentChoice) -> i32 {
    let dispatcher = match session_commands() {
        Ok(d) => d,
        Err(e) => {
            ui::error(&e.to_string());
            return 1;
        }
    };

    block_on(async move {
        let mut session = open_session(config, agent);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        print_commands(&dispatcher);
        ui::hint("enter a command name or index; 'help' lists commands, 'exit' quits");

        let code = loop {
            let line = match read_line(&mut lines, &format!("{}> ", session.ident())).await {
                Input::Line(line) => line,
                Input::Quit(code) => break code,
            };
            match line.trim() {
                "" => continue,
                "exit" | "quit" => break 0,
                "help" | "?" => {
                    print_commands(&dispatcher);
                    continue;
                }
                _ => {}
            }

            let selector = CommandSelector::from(line.as_str());
            let command = match dispatcher.resolve(&selector) {
                Ok(command) => command,
                Err(e) => {
                    ui::error(&e.to_string());
                    continue;
                }
            };

            let mut args = CommandArgs::new();
            let mut quit = None;
            for param in command.params() {
                let prompt = format!("  {} ({}): ", param.name, describe(param.arity));
                match read_line(&mut lines, &prompt).await {
                    Input::Line(value) => {
                        args.insert(param.name.clone(), raw_value(param.arity, value.trim()))
                    }
                    Input::Quit(code) => {
                        quit = Some(code);
                        break;
                    }
                }
            }
            if let Some(code) = quit {
                break code;
            }

            match interruptible(dispatcher.execute(&mut session, &selector, args)).await {
                Ok(Ok(value)) => ui::success(&render_value(&value)),
                Ok(Err(e)) => ui::error(&e.to_string()),
                Err(_) => break EXIT_INTERRUPTED,
            }
            ui::blank();
        };

        session.close().await;
        code
    })
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>, prompt: &str) -> Input {
    print!("{prompt}");
    let _ = std::io::stdout().flush();
    match interruptible(lines.next_line()).await {
        Ok(Ok(Some(line))) => Input::Line(line),
        Ok(Ok(None)) => Input::Quit(0),
        Ok(Err(e)) => {
            ui::error(&format!("Failed to read input: {e}"));
            Input::Quit(1)
        }
        Err(_) => Input::Quit(EXIT_INTERRUPTED),
    }
}

fn describe(arity: Arity) -> &'static str {
    match arity {
        Arity::One => "required",
        Arity::Optional => "optional, empty to skip",
        Arity::List => "comma-separated",
    }
}
