//! Diagnostic logging to stderr.

use std::io::{self, IsTerminal};
use std::sync::OnceLock;

use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "KEACTL_LOG";

static INSTALLED: OnceLock<()> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter in KEACTL_LOG: {0}")]
    Filter(String),
    #[error("failed to install log subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Install the global subscriber. Later calls do nothing.
///
/// The filter comes from `KEACTL_LOG` when set; otherwise only warnings are
/// shown, or debug output with `verbose`.
pub fn initialise(verbose: bool) -> Result<(), TelemetryError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let directives = std::env::var(LOG_ENV).ok();
    let filter = build_filter(directives.as_deref(), verbose)?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let _ = INSTALLED.set(());
    Ok(())
}

fn build_filter(directives: Option<&str>, verbose: bool) -> Result<EnvFilter, TelemetryError> {
    match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|error| TelemetryError::Filter(error.to_string())),
        None if verbose => Ok(EnvFilter::new("debug")),
        None => Ok(EnvFilter::new("warn")),
    }
}

#[cfg(test)]
mod tests {
    use super::{build_filter, TelemetryError};

    #[test]
    fn defaults_follow_verbosity() {
        let quiet = build_filter(None, false).expect("default filter");
        assert!(quiet.to_string().contains("warn"));
        let verbose = build_filter(None, true).expect("verbose filter");
        assert!(verbose.to_string().contains("debug"));
    }

    #[test]
    fn environment_directives_win_over_verbosity() {
        let filter = build_filter(Some("keactl=trace"), false).expect("env filter");
        assert!(filter.to_string().contains("keactl=trace"));
    }

    #[test]
    fn invalid_directives_are_rejected() {
        let err = build_filter(Some("keactl=loud"), true).expect_err("bad level");
        assert!(matches!(err, TelemetryError::Filter(_)));
        assert!(err.to_string().starts_with("invalid log filter in KEACTL_LOG"));
    }
}
