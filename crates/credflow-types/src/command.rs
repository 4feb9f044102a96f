//! Argument specifications and resolved arguments for named commands.

use crate::error::{ControllerError, ControllerResult};
use std::collections::HashMap;
use std::str::FromStr;

/// How many values a command argument takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Exactly one value (`"1"`).
    One,
    /// Zero or one value (`"?"`).
    Optional,
    /// A list of values (`"+"`).
    List,
}

impl Arity {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::One => "1",
            Self::Optional => "?",
            Self::List => "+",
        }
    }
}

impl FromStr for Arity {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Self::One),
            "?" => Ok(Self::Optional),
            "+" => Ok(Self::List),
            other => Err(ControllerError::InvalidArgumentSpec(format!(
                "arity must be one of '1', '?', '+' but is '{other}'"
            ))),
        }
    }
}

/// A declared command parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub arity: Arity,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, arity: Arity) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    /// Parse `(name, "1" | "?" | "+")` pairs.
    pub fn parse_all(specs: &[(&str, &str)]) -> ControllerResult<Vec<Self>> {
        specs
            .iter()
            .map(|(name, arity)| Ok(Self::new(*name, arity.parse()?)))
            .collect()
    }
}

/// A fully resolved argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    One(String),
    Optional(Option<String>),
    List(Vec<String>),
}

impl ArgValue {
    /// Whether this value satisfies `arity`.
    pub fn fits(&self, arity: Arity) -> bool {
        match (self, arity) {
            (Self::One(v), Arity::One) => !v.is_empty(),
            (Self::Optional(_), Arity::Optional) => true,
            (Self::List(values), Arity::List) => !values.is_empty(),
            _ => false,
        }
    }
}

/// Resolved arguments for one command invocation, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs {
    values: HashMap<String, ArgValue>,
}

impl CommandArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: ArgValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Value of an exactly-one argument.
    pub fn one(&self, name: &str) -> ControllerResult<&str> {
        match self.values.get(name) {
            Some(ArgValue::One(v)) => Ok(v),
            _ => Err(missing(name, "expected exactly one value")),
        }
    }

    /// Value of a zero-or-one argument; absent is `None`.
    pub fn optional(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Optional(v)) => v.as_deref(),
            Some(ArgValue::One(v)) => Some(v),
            _ => None,
        }
    }

    /// Values of a list argument.
    pub fn list(&self, name: &str) -> ControllerResult<&[String]> {
        match self.values.get(name) {
            Some(ArgValue::List(v)) => Ok(v),
            _ => Err(missing(name, "expected a list of values")),
        }
    }
}

fn missing(name: &str, reason: &str) -> ControllerError {
    ControllerError::InvalidArgument {
        command: String::new(),
        argument: name.to_string(),
        reason: reason.to_string(),
    }
}

/// How a command is picked: by registration index or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSelector {
    Index(usize),
    Name(String),
}

impl From<&str> for CommandSelector {
    /// All-digit input selects by index; anything else by name.
    fn from(s: &str) -> Self {
        let s = s.trim();
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = s.parse() {
                return Self::Index(index);
            }
        }
        Self::Name(s.to_string())
    }
}

impl std::fmt::Display for CommandSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(n) => f.write_str(n),
        }
    }
}

/// Split a comma-separated list, dropping spaces and empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.replace(' ', "")
        .split(',')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
