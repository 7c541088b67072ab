//! Docket CLI - Command-line interface for legal event extraction.

use clap::Parser;
use docket_cli::commands;
use docket_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CRATES: [&str; 6] = [
    "docket",
    "docket_cli",
    "docket_document",
    "docket_llm",
    "docket_pipeline",
    "docket_table",
];

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> docket_cli::Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine
    dotenvy::dotenv().ok();
    init_logging(cli.verbose);

    let env = |name: &str| std::env::var(name).ok();
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env(env);
    let providers = config.provider_settings(env)?;

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Extract(args) => {
            commands::execute_extract(args, &config, providers, &formatter).await?;
        }
        Command::Benchmark(args) => {
            commands::execute_benchmark(args, &config, providers, &formatter).await?;
        }
        Command::Providers => {
            commands::execute_providers(&providers, &formatter)?;
        }
    }

    Ok(())
}

/// Logs go to stderr so table and JSON output stay clean on stdout.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let default_filter = CRATES
        .iter()
        .map(|krate| format!("{}={}", krate, level))
        .collect::<Vec<_>>()
        .join(",");

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("warn,{}", default_filter).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
