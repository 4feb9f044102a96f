//! credflow CLI: drives an issuer and a holder agent through their admin APIs.
//!
//! Every subcommand opens its own sessions and closes them before exiting,
//! including on Ctrl+C (exit code 130).

mod cli;
mod cmd;
mod ui;

use crate::cli::{Cli, Commands};
use clap::Parser;
use credflow_kernel::config::{apply_env_overrides, load_config, validate_config};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn init_tracing_stderr(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Load `.env` (or `--env-file`) into the process environment. Variables
/// already set take priority.
fn load_env_file(path: Option<&Path>) -> Result<(), String> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .map_err(|e| format!("Failed to load {}: {e}", path.display())),
        None => match dotenvy::dotenv() {
            Ok(_) => Ok(()),
            Err(e) if e.not_found() => Ok(()),
            Err(e) => Err(format!("Failed to load .env: {e}")),
        },
    }
}

fn main() {
    let cli = Cli::parse();

    let env_loaded = load_env_file(cli.env_file.as_deref());
    let mut config = load_config(cli.config.as_deref());
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    init_tracing_stderr(&config.log_level);

    if let Err(e) = env_loaded {
        ui::error_with_fix(&e, "check the --env-file path");
        std::process::exit(1);
    }
    if let Err(e) = validate_config(&config) {
        ui::error_with_fix(&e.to_string(), "edit ~/.credflow/config.toml or pass --config");
        std::process::exit(1);
    }

    let code = match cli.command {
        Commands::Run(args) => cmd::run::cmd_run(&config, args),
        Commands::Exec {
            agent,
            command,
            args,
        } => cmd::exec::cmd_exec(&config, agent, &command, &args),
        Commands::Shell { agent } => cmd::shell::cmd_shell(&config, agent),
        Commands::Commands => cmd::exec::cmd_commands(),
    };
    std::process::exit(code);
}
