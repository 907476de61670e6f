use anyhow::{bail, Result};
use keactl::config_scan::KeaDhcpConfig;
use keactl::definitions::build_registry;
use keactl::report::render_scan;

use crate::cli::{OutputFormat, ScanArgs};

pub fn run_scan(args: ScanArgs) -> Result<()> {
    let registry = build_registry(&args.definitions)?;
    let config = KeaDhcpConfig::load(&args.file)?;
    let report = config.scan(&registry);

    match args.format {
        OutputFormat::Text => println!("{}", render_scan(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if args.strict && report.failures() > 0 {
        bail!(
            "strict mode failed: {} option(s) could not be decoded",
            report.failures()
        );
    }
    Ok(())
}
