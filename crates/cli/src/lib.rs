pub mod commands;

use clap::{Parser, Subcommand};
use ratebot_core::config::LoggingConfig;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "ratebot",
    about = "Ratebot operator CLI",
    long_about = "Price quote commands offline, inspect parse results, and review effective configuration.",
    after_help = "Examples:\n  ratebot quote 報價 1680\n  ratebot quote --json 報價 2200 VIP3 用券\n  ratebot config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Parse and price a quote command exactly as the bot would")]
    Quote {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
        #[arg(required = true, help = "The chat message, e.g. 報價 1680 VIP1")]
        words: Vec<String>,
    },
    #[command(about = "Show how a chat message parses, without pricing it")]
    Parse {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
        #[arg(required = true, help = "The chat message to parse")]
        words: Vec<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

fn init_logging(logging: &LoggingConfig) {
    use ratebot_core::config::LogFormat::*;

    // RATEBOT_LOG takes a full filter directive; otherwise the configured
    // level applies globally.
    let filter = tracing_subscriber::EnvFilter::try_from_env("RATEBOT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_target(false).with_env_filter(filter);

    match logging.format {
        Compact => builder.compact().init(),
        Pretty => builder.pretty().init(),
        Json => builder.json().init(),
    }
}

pub fn run() -> ExitCode {
    init_logging(&LoggingConfig::discover(None));
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Quote { json, words } => commands::quote::run(&words, json),
        Command::Parse { json, words } => commands::parse::run(&words, json),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
