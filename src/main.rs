//! Referat CLI entry point.

use anyhow::Result;
use clap::Parser;
use referat::cli::{commands, Cli, Commands, Output};
use referat::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("referat={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    tokio::select! {
        result = dispatch(cli, settings) => {
            if let Err(e) = result {
                Output::error(&e.to_string());
                std::process::exit(1);
            }
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            // Already-written files stay valid; in-flight work is abandoned
            Output::warning("Interrupted");
            std::process::exit(130);
        }
    }
}

async fn dispatch(cli: Cli, settings: Settings) -> referat::Result<()> {
    match cli.command {
        Commands::Run {
            force,
            input,
            output,
            no_keyframes,
            max_keyframes,
        } => {
            commands::run_pipeline(
                commands::RunArgs {
                    force,
                    input,
                    output,
                    no_keyframes,
                    max_keyframes,
                },
                settings,
            )
            .await
        }

        Commands::Init => commands::run_init(&settings),

        Commands::Config { action } => commands::run_config(&action, settings),
    }
}
