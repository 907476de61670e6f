use std::fs;

use anyhow::{Context, Result};
use kea_protocol::{Command, SerializableCommand};
use serde_json::Value;

use crate::cli::CommandArgs;

pub fn run_command(args: CommandArgs) -> Result<()> {
    let arguments = match (&args.arguments, &args.arguments_file) {
        (Some(inline), _) => Some(parse_arguments(inline, "--arguments")?),
        (None, Some(path)) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Some(parse_arguments(&raw, &path.display().to_string())?)
        }
        (None, None) => None,
    };

    let services: Vec<&str> = args.services.iter().map(String::as_str).collect();
    let command = Command::new(&args.name, &services, arguments.as_ref())
        .with_context(|| format!("cannot build command '{}'", args.name))?;
    tracing::debug!(
        command = command.name(),
        daemons = ?command.daemons(),
        "built control command"
    );

    println!("{}", command.marshal()?);
    Ok(())
}

fn parse_arguments(raw: &str, origin: &str) -> Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("invalid JSON in {origin}"))
}
