use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use kea_protocol::{DaemonId, Universe};

#[derive(Parser, Debug)]
#[command(name = "keactl")]
#[command(about = "Build Kea control commands, interpret replies and convert DHCP option data")]
pub struct Cli {
    /// Show debug diagnostics on stderr (overridden by KEACTL_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the wire form of a control command.
    Command(CommandArgs),
    /// Correlate a reply array with the daemons of its command and report each outcome.
    Responses(ResponsesArgs),
    /// Convert DHCP options between typed fields and Kea option-data.
    #[command(name = "option", subcommand)]
    DhcpOption(OptionCommand),
    /// Decode all option data of a Kea DHCPv4 or DHCPv6 configuration.
    Scan(ScanArgs),
}

#[derive(Parser, Debug)]
pub struct CommandArgs {
    /// Command name, for example config-get.
    pub name: String,
    /// Daemon the command is forwarded to. Repeatable.
    #[arg(long = "service")]
    pub services: Vec<String>,
    /// Command arguments as a JSON object.
    #[arg(long, conflicts_with = "arguments_file")]
    pub arguments: Option<String>,
    /// File holding the command arguments as a JSON object.
    #[arg(long)]
    pub arguments_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ResponsesArgs {
    /// Reply file, or - for stdin.
    pub reply: PathBuf,
    /// The command the reply answers, as JSON or @FILE.
    #[arg(long)]
    pub command: String,
    /// Fingerprint each reply's arguments.
    #[arg(long)]
    pub hash: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Exit with failure when any daemon reports an error or unsupported command.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Subcommand, Debug)]
pub enum OptionCommand {
    /// Convert typed options (JSON array) into option-data items.
    Encode(OptionEncodeArgs),
    /// Convert option-data items (JSON array) into typed options.
    Decode(OptionDecodeArgs),
}

#[derive(Parser, Debug)]
pub struct OptionEncodeArgs {
    /// JSON file of typed options, or - for stdin.
    pub input: PathBuf,
    /// Daemon whose custom definitions apply.
    #[arg(long, requires = "config")]
    pub daemon: Option<DaemonId>,
    /// Kea configuration holding the option-def entries of --daemon.
    #[arg(long, requires = "daemon")]
    pub config: Option<PathBuf>,
    /// Additional option definitions TOML file. Repeatable.
    #[arg(long)]
    pub definitions: Vec<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct OptionDecodeArgs {
    /// JSON file of option-data items, or - for stdin.
    pub input: PathBuf,
    /// Protocol family of the options.
    #[arg(long, value_enum)]
    pub universe: UniverseArg,
    /// Additional option definitions TOML file. Repeatable.
    #[arg(long)]
    pub definitions: Vec<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Kea configuration file.
    pub file: PathBuf,
    /// Additional option definitions TOML file. Repeatable.
    #[arg(long)]
    pub definitions: Vec<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Exit with failure when any option fails to decode.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum UniverseArg {
    #[value(name = "4")]
    V4,
    #[value(name = "6")]
    V6,
}

impl From<UniverseArg> for Universe {
    fn from(arg: UniverseArg) -> Self {
        match arg {
            UniverseArg::V4 => Universe::V4,
            UniverseArg::V6 => Universe::V6,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
