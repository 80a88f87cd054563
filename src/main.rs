use clap::Parser;
use colored::Colorize;

use tokenmeter::cli::{Cli, ColorMode, Command};
use tokenmeter::commands;
use tokenmeter::commands::batch::BatchCommandOptions;
use tokenmeter::commands::estimate::EstimateCommandOptions;
use tokenmeter::commands::models::ModelsCommandOptions;
use tokenmeter::error::TokenMeterError;
use tokenmeter::output::Format;

fn main() {
    let cli = Cli::parse();

    // Configure color output
    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    // Init tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("{} {err}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), TokenMeterError> {
    let format = if cli.json { Format::Json } else { Format::Text };

    match cli.command {
        Command::Estimate {
            model,
            system,
            user,
            user_file,
            tools_json,
            output_tokens,
            embedding_tokens,
            vectors_read,
            vector_read_fee,
        } => commands::estimate::run(EstimateCommandOptions {
            model,
            system,
            user,
            user_file,
            tools_json,
            output_tokens,
            embedding_tokens,
            vectors_read,
            vector_read_fee,
            pricing: cli.pricing,
            config_path: cli.config,
            format,
            quiet: cli.quiet,
        }),
        Command::Batch { file } => commands::batch::run(BatchCommandOptions {
            file,
            pricing: cli.pricing,
            config_path: cli.config,
            format,
            quiet: cli.quiet,
        }),
        Command::Models => commands::models::run(ModelsCommandOptions {
            pricing: cli.pricing,
            config_path: cli.config,
            format,
            quiet: cli.quiet,
        }),
    }
}
