//! Named commands with declared argument arity.
//!
//! Commands are kept in registration order so they can be selected by index
//! as well as by name. Arity symbols are resolved once, at registration; at
//! dispatch time resolved arguments are checked against the declared
//! [`Arity`] before the handler runs.

use async_trait::async_trait;
use credflow_types::command::{split_list, ArgValue, Arity, CommandArgs, CommandSelector, ParamSpec};
use credflow_types::error::{ControllerError, ControllerResult};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// An operation that can be run against a target (usually an `AgentSession`).
#[async_trait]
pub trait CommandHandler<T>: Send + Sync {
    async fn invoke(&self, target: &mut T, args: CommandArgs) -> ControllerResult<Value>;
}

/// A registered command.
pub struct Command<T> {
    name: String,
    params: Vec<ParamSpec>,
    handler: Box<dyn CommandHandler<T>>,
}

impl<T: Send> Command<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Human-readable argument list, e.g. `schema_name:1 schema_attrs:+`.
    pub fn signature(&self) -> String {
        self.params
            .iter()
            .map(|p| format!("{}:{}", p.name, p.arity.symbol()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Build arguments from raw `name=value` strings. List arguments are
    /// comma separated. Unknown names are kept so `execute` can reject them.
    pub fn bind(&self, raw: &[(String, String)]) -> CommandArgs {
        let mut args = CommandArgs::new();
        for (name, value) in raw {
            let arity = self
                .params
                .iter()
                .find(|p| &p.name == name)
                .map(|p| p.arity)
                .unwrap_or(Arity::One);
            args.insert(name.clone(), raw_value(arity, value));
        }
        args
    }

    fn check(&self, args: &CommandArgs) -> ControllerResult<()> {
        let invalid = |argument: &str, reason: &str| ControllerError::InvalidArgument {
            command: self.name.clone(),
            argument: argument.to_string(),
            reason: reason.to_string(),
        };

        for name in args.names() {
            if !self.params.iter().any(|p| p.name == name) {
                return Err(invalid(name, "not declared by this command"));
            }
        }
        for param in &self.params {
            match (args.get(&param.name), param.arity) {
                (None, Arity::Optional) => {}
                (None, _) => return Err(invalid(&param.name, "missing")),
                (Some(value), arity) if value.fits(arity) => {}
                (Some(_), Arity::One) => return Err(invalid(&param.name, "expected exactly one value")),
                (Some(_), Arity::Optional) => return Err(invalid(&param.name, "expected at most one value")),
                (Some(_), Arity::List) => return Err(invalid(&param.name, "expected one or more values")),
            }
        }
        Ok(())
    }
}

/// Convert one raw string into a value of the given arity.
pub fn raw_value(arity: Arity, raw: &str) -> ArgValue {
    match arity {
        Arity::One => ArgValue::One(raw.to_string()),
        Arity::Optional if raw.is_empty() => ArgValue::Optional(None),
        Arity::Optional => ArgValue::Optional(Some(raw.to_string())),
        Arity::List => ArgValue::List(split_list(raw)),
    }
}

/// Registry of named commands over a target type `T`.
pub struct CommandDispatcher<T> {
    commands: Vec<Command<T>>,
}

impl<T: Send> Default for CommandDispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> CommandDispatcher<T> {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register `handler` under `name`. Each param is `(name, "1" | "?" | "+")`.
    pub fn register<H>(&mut self, name: &str, params: &[(&str, &str)], handler: H) -> ControllerResult<()>
    where
        H: CommandHandler<T> + 'static,
    {
        if name.trim().is_empty() {
            return Err(ControllerError::InvalidArgumentSpec(
                "command name is empty".to_string(),
            ));
        }
        if self.commands.iter().any(|c| c.name == name) {
            return Err(ControllerError::InvalidArgumentSpec(format!(
                "command '{name}' is already registered"
            )));
        }

        let params = ParamSpec::parse_all(params)?;
        let mut seen = HashSet::new();
        for param in &params {
            if param.name.trim().is_empty() {
                return Err(ControllerError::InvalidArgumentSpec(format!(
                    "command '{name}' has an unnamed argument"
                )));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(ControllerError::InvalidArgumentSpec(format!(
                    "command '{name}' declares argument '{}' twice",
                    param.name
                )));
            }
        }

        self.commands.push(Command {
            name: name.to_string(),
            params,
            handler: Box::new(handler),
        });
        Ok(())
    }

    /// Registered commands, in registration order.
    pub fn commands(&self) -> &[Command<T>] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Look up a command by name or 0-based index.
    pub fn resolve(&self, selector: &CommandSelector) -> ControllerResult<&Command<T>> {
        let found = match selector {
            CommandSelector::Index(index) => self.commands.get(*index),
            CommandSelector::Name(name) => self.commands.iter().find(|c| &c.name == name),
        };
        found.ok_or_else(|| ControllerError::UnknownCommand(selector.to_string()))
    }

    /// Run a command once with fully resolved arguments. The handler's
    /// result or error is returned unchanged.
    pub async fn execute(
        &self,
        target: &mut T,
        selector: &CommandSelector,
        args: CommandArgs,
    ) -> ControllerResult<Value> {
        let command = self.resolve(selector)?;
        command.check(&args)?;
        debug!(command = %command.name, args = args.len(), "Executing command");
        command.handler.invoke(target, args).await
    }
}
