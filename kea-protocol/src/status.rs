use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use crate::response::ExaminableResponse;

pub const RESPONSE_SUCCESS: i64 = 0;
pub const RESPONSE_ERROR: i64 = 1;
pub const RESPONSE_COMMAND_UNSUPPORTED: i64 = 2;
pub const RESPONSE_EMPTY: i64 = 3;

/// Outcome of a command as reported by the `result` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Success,
    Error,
    CommandUnsupported,
    /// The command succeeded but there was nothing to return.
    Empty,
    Unknown(i64),
}

impl ResponseStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            RESPONSE_SUCCESS => Self::Success,
            RESPONSE_ERROR => Self::Error,
            RESPONSE_COMMAND_UNSUPPORTED => Self::CommandUnsupported,
            RESPONSE_EMPTY => Self::Empty,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Success => RESPONSE_SUCCESS,
            Self::Error => RESPONSE_ERROR,
            Self::CommandUnsupported => RESPONSE_COMMAND_UNSUPPORTED,
            Self::Empty => RESPONSE_EMPTY,
            Self::Unknown(code) => code,
        }
    }
}

impl Display for ResponseStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::CommandUnsupported => write!(f, "unsupported command"),
            Self::Empty => write!(f, "empty"),
            Self::Unknown(code) => write!(f, "unknown ({code})"),
        }
    }
}

/// A non-success outcome reported by a daemon.
///
/// These are expected during normal operation against a live fleet (a daemon
/// may lack a hook library, for instance) and are not fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseStatusError {
    #[error("error status ({code}) returned by {} with text: '{text}'", origin(.daemon))]
    Error {
        code: i64,
        daemon: String,
        text: String,
    },
    #[error(
        "unsupported command status ({code}) returned by {} with text: '{text}'",
        origin(.daemon)
    )]
    Unsupported {
        code: i64,
        daemon: String,
        text: String,
    },
}

impl ResponseStatusError {
    /// Daemon that returned the response, empty when unknown.
    pub fn daemon(&self) -> &str {
        match self {
            Self::Error { daemon, .. } | Self::Unsupported { daemon, .. } => daemon,
        }
    }
}

fn origin(daemon: &str) -> String {
    if daemon.is_empty() {
        "Kea".to_string()
    } else {
        format!("Kea {daemon} daemon")
    }
}

/// Check a response's result code.
///
/// Success and empty results pass; error and unsupported-command results
/// produce an error naming the daemon and carrying the reply text. Codes
/// outside the Kea taxonomy are not treated as failures.
pub fn check_response<R>(response: &R) -> Result<(), ResponseStatusError>
where
    R: ExaminableResponse + ?Sized,
{
    let daemon = response.daemon().to_string();
    let text = response.text().to_string();
    match response.status() {
        ResponseStatus::Error => Err(ResponseStatusError::Error {
            code: RESPONSE_ERROR,
            daemon,
            text,
        }),
        ResponseStatus::CommandUnsupported => Err(ResponseStatusError::Unsupported {
            code: RESPONSE_COMMAND_UNSUPPORTED,
            daemon,
            text,
        }),
        ResponseStatus::Success | ResponseStatus::Empty | ResponseStatus::Unknown(_) => Ok(()),
    }
}
