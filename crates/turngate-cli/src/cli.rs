use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use turngate_core::PinId;
use turngate_core::constants::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(name = "turngate", version, about = "Turnstile check-in controller")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Configuration file, created with defaults if missing
    #[arg(
        long,
        short = 'c',
        global = true,
        env = "TURNGATE_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Drive an in-memory relay instead of the GPIO line
    #[arg(long, global = true)]
    pub mock_relay: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read scans from stdin and open the gate for consumed tickets (default)
    Run,
    /// Check that the backend knows this gate
    Probe,
    /// Pulse the relay once
    Pulse,
    /// Show or edit the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the configuration (API key redacted)
    Show,
    /// Replace fields and write the whole record back
    Set(SetArgs),
}

#[derive(Args, Debug, Default)]
pub struct SetArgs {
    #[arg(long)]
    pub demo_mode: Option<bool>,

    #[arg(long)]
    pub single_mode: Option<bool>,

    #[arg(long)]
    pub direction_out: Option<bool>,

    #[arg(long, conflicts_with = "clear_api_key")]
    pub api_key: Option<String>,

    /// Remove the stored API key
    #[arg(long)]
    pub clear_api_key: bool,

    /// GPIO line number or name (17, GPIO17, P1_11)
    #[arg(long)]
    pub relay_pin: Option<PinId>,

    #[arg(long)]
    pub high_mode: Option<bool>,

    #[arg(long)]
    pub signal_duration_ms: Option<u64>,

    #[arg(long)]
    pub request_timeout_ms: Option<u64>,
}
