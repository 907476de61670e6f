use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while building or parsing a [`Command`].
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command name was empty.
    #[error("Kea command name must not be empty")]
    EmptyName,
    /// The arguments did not serialize to a JSON object.
    #[error("Kea command arguments must be a map or a struct, got {kind}")]
    InvalidArguments { kind: &'static str },
    /// The arguments could not be serialized.
    #[error("failed to serialize Kea command arguments: {0}")]
    Serialize(#[from] serde_json::Error),
    /// A raw command document could not be decoded.
    #[error("failed to parse Kea command: {input}: {source}")]
    Parse {
        input: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A command that can be routed to Kea daemons and serialized for sending.
pub trait SerializableCommand {
    /// Command name, e.g. `config-get`.
    fn name(&self) -> &str;
    /// Daemons the command is addressed to, in the order they were serialized.
    fn daemons(&self) -> &[String];
    /// Wire representation of the command.
    fn marshal(&self) -> Result<String, serde_json::Error>;
}

/// A command sent to Kea: its name, the daemons (the `service` list in Kea
/// terms) and optional arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub command: String,
    #[serde(rename = "service", default, skip_serializing_if = "Vec::is_empty")]
    pub daemons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

impl Command {
    /// Build a command from a name, target daemons and arguments.
    ///
    /// The arguments must serialize to a JSON object, which is what maps and
    /// structs produce. Sequences, scalars and unit values are rejected and no
    /// command is built.
    ///
    /// The daemon list is sorted. Replies are correlated against the sorted
    /// order, not the order the caller supplied.
    pub fn new<A>(name: &str, daemons: &[&str], arguments: Option<&A>) -> Result<Self, CommandError>
    where
        A: Serialize + ?Sized,
    {
        if name.is_empty() {
            return Err(CommandError::EmptyName);
        }

        let arguments = match arguments {
            Some(arguments) => match serde_json::to_value(arguments)? {
                object @ Value::Object(_) => Some(object),
                other => {
                    return Err(CommandError::InvalidArguments {
                        kind: json_kind(&other),
                    })
                }
            },
            None => None,
        };

        let mut daemons: Vec<String> = daemons.iter().map(|d| d.to_string()).collect();
        daemons.sort();

        Ok(Self {
            command: name.to_string(),
            daemons,
            arguments,
        })
    }

    /// Build a command that carries no arguments.
    pub fn without_arguments(name: &str, daemons: &[&str]) -> Result<Self, CommandError> {
        Self::new::<Value>(name, daemons, None)
    }

    /// Hydrate a command from its JSON document.
    ///
    /// This is a decoding path: the arguments are taken as they are and the
    /// daemon list keeps the document order.
    pub fn from_json(input: &str) -> Result<Self, CommandError> {
        serde_json::from_str(input).map_err(|source| CommandError::Parse {
            input: input.to_string(),
            source,
        })
    }
}

impl SerializableCommand for Command {
    fn name(&self) -> &str {
        &self.command
    }

    fn daemons(&self) -> &[String] {
        &self.daemons
    }

    fn marshal(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}
