//! Clap CLI definitions for credflow.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const AFTER_HELP: &str = "\
\x1b[1;36mExamples:\x1b[0m
  credflow run                                  Full issuer/holder session with a random tag
  credflow run --schema-name Licence --schema-attrs name,age
  credflow commands                             List the session commands
  credflow exec public_did                      Run one command on the issuer
  credflow exec --agent holder credential_records --arg thread_id=th-1
  credflow shell --agent holder                 Interactive command loop

\x1b[1;36mEnvironment:\x1b[0m
  LEDGER_URL, SERVER_AGENT_IP, SERVER_AGENT_ADMIN_PORT,
  CLIENT_AGENT_IP, CLIENT_AGENT_ADMIN_PORT override ~/.credflow/config.toml.
  A .env file in the working directory is loaded first.";

/// credflow: drive identity agents through credential issuance.
#[derive(Parser)]
#[command(
    name = "credflow",
    version,
    about = "Drive an issuer and a holder agent through credential issuance",
    after_help = AFTER_HELP,
)]
pub struct Cli {
    /// Path to config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Load environment variables from this file instead of `./.env`.
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect holder to issuer, register schema and credential definition, issue a credential.
    Run(RunArgs),
    /// Execute one session command against an agent.
    Exec {
        /// Agent to run the command on.
        #[arg(long, value_enum, default_value_t = AgentChoice::Issuer)]
        agent: AgentChoice,
        /// Command name or index (see `credflow commands`).
        command: String,
        /// Argument as `name=value`; list values are comma-separated.
        #[arg(long = "arg", value_name = "NAME=VALUE", value_parser = parse_arg)]
        args: Vec<(String, String)>,
    },
    /// Interactive loop: pick commands by name or index and enter their arguments.
    Shell {
        /// Agent to run commands on.
        #[arg(long, value_enum, default_value_t = AgentChoice::Issuer)]
        agent: AgentChoice,
    },
    /// List the session commands and their arguments.
    Commands,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Schema name (default: from config).
    #[arg(long)]
    pub schema_name: Option<String>,
    /// Comma-separated schema attributes (default: from config).
    #[arg(long)]
    pub schema_attrs: Option<String>,
    /// Schema version (default: from config).
    #[arg(long)]
    pub schema_version: Option<String>,
    /// Credential definition tag (default: random number).
    #[arg(long)]
    pub tag: Option<String>,
    /// Keep the agents' current public DIDs instead of registering new ones.
    #[arg(long)]
    pub skip_did: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AgentChoice {
    Issuer,
    Holder,
}

/// Parse `name=value`. The value may itself contain `=`.
pub fn parse_arg(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(name, _)| !name.trim().is_empty())
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_arg() {
        assert_eq!(
            parse_arg("attributes_json=[{\"a\":\"b=c\"}]").unwrap(),
            ("attributes_json".to_string(), "[{\"a\":\"b=c\"}]".to_string())
        );
        assert_eq!(parse_arg("tag=").unwrap(), ("tag".to_string(), String::new()));
        assert!(parse_arg("no-equals").is_err());
        assert!(parse_arg("=value").is_err());
    }

    #[test]
    fn test_exec_arguments() {
        let cli = Cli::try_parse_from([
            "credflow",
            "exec",
            "--agent",
            "holder",
            "request_credential",
            "--arg",
            "thread_id=th-1",
        ])
        .unwrap();
        match cli.command {
            Commands::Exec {
                agent,
                command,
                args,
            } => {
                assert_eq!(agent, AgentChoice::Holder);
                assert_eq!(command, "request_credential");
                assert_eq!(args, vec![("thread_id".to_string(), "th-1".to_string())]);
            }
            _ => panic!("expected exec"),
        }
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["credflow", "run", "--skip-did"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert!(args.skip_did);
                assert!(args.tag.is_none());
                assert!(args.schema_name.is_none());
            }
            _ => panic!("expected run"),
        }
    }
}
