use anyhow::{bail, Context, Result};
use kea_protocol::{
    create_dhcp_option, create_single_option_data, DhcpOptionData, SingleOptionData, Universe,
};
use keactl::config_scan::KeaDhcpConfig;
use keactl::definitions::{build_registry, complete_option_data};
use keactl::report::{render_option_data, render_options};

use crate::cli::{OptionCommand, OptionDecodeArgs, OptionEncodeArgs, OutputFormat};
use crate::input::read_input;

pub fn run_option(command: OptionCommand) -> Result<()> {
    match command {
        OptionCommand::Encode(args) => run_encode(args),
        OptionCommand::Decode(args) => run_decode(args),
    }
}

fn run_encode(args: OptionEncodeArgs) -> Result<()> {
    let mut registry = build_registry(&args.definitions)?;
    if let (Some(daemon), Some(path)) = (args.daemon, &args.config) {
        let config = KeaDhcpConfig::load(path)?;
        for definition in config.option_definitions() {
            registry.insert_for_daemon(daemon, definition);
        }
    }

    let raw = read_input(&args.input)?;
    let options: Vec<DhcpOptionData> = serde_json::from_slice(&raw)
        .with_context(|| format!("invalid options in {}", args.input.display()))?;

    let mut converted = Vec::new();
    let mut failures = Vec::new();
    for option in &options {
        match create_single_option_data(args.daemon, &registry, option) {
            Ok(data) => converted.push(data),
            Err(err) => failures.push(format!("option {} in {}: {err}", option.code, option.space)),
        }
    }

    match args.format {
        OutputFormat::Text => println!("{}", render_option_data(&converted)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&converted)?),
    }
    report_failures(&failures)
}

fn run_decode(args: OptionDecodeArgs) -> Result<()> {
    let registry = build_registry(&args.definitions)?;
    let universe = Universe::from(args.universe);

    let raw = read_input(&args.input)?;
    let items: Vec<SingleOptionData> = serde_json::from_slice(&raw)
        .with_context(|| format!("invalid option-data in {}", args.input.display()))?;

    let mut decoded = Vec::new();
    let mut failures = Vec::new();
    for mut item in items {
        complete_option_data(&mut item, universe, &registry);
        match create_dhcp_option(&item, universe, &registry) {
            Ok(option) => decoded.push(option),
            Err(err) => failures.push(format!("option {} in {}: {err}", item.code, item.space)),
        }
    }

    match args.format {
        OutputFormat::Text => println!("{}", render_options(&decoded)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&decoded)?),
    }
    report_failures(&failures)
}

fn report_failures(failures: &[String]) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    bail!(
        "{} option(s) could not be converted:\n{}",
        failures.len(),
        failures.join("\n")
    )
}
