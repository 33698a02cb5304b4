mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ConfigCommand};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let path = cli.global.config.as_path();
    let mut stdout = std::io::stdout();

    match cli.command.unwrap_or(Command::Run) {
        // Config commands don't touch the relay or the backend
        Command::Config { command } => match command {
            ConfigCommand::Show => commands::show_config(&commands::load_config(path)?, &mut stdout),
            ConfigCommand::Set(args) => {
                commands::set_config(path, args)?;
                println!("Configuration written to {}", path.display());
                Ok(())
            }
        },

        cmd => {
            let config = commands::load_config(path)?;
            let service = commands::build_service(config, &cli.global)?;
            tracing::debug!(command = ?cmd, "dispatching command");

            match cmd {
                Command::Probe => commands::probe(&service, &mut stdout).await,
                Command::Pulse => commands::pulse(&service, &mut stdout).await,
                _ => {
                    let stdin = BufReader::new(tokio::io::stdin());
                    let ctrl_c = async {
                        if let Err(e) = tokio::signal::ctrl_c().await {
                            tracing::warn!(error = %e, "Ctrl-C handler unavailable");
                            std::future::pending::<()>().await;
                        }
                    };
                    commands::run(&service, stdin, &mut stdout, ctrl_c).await
                }
            }
        }
    }
}
