use anyhow::Result;
use clap::Parser;

mod cli;
mod command_cmd;
mod input;
mod option_cmd;
mod responses_cmd;
mod scan_cmd;
mod telemetry;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::initialise(cli.verbose)?;

    match cli.command {
        Command::Command(args) => command_cmd::run_command(args),
        Command::Responses(args) => responses_cmd::run_responses(args),
        Command::DhcpOption(command) => option_cmd::run_option(command),
        Command::Scan(args) => scan_cmd::run_scan(args),
    }
}
