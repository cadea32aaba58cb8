//! weekly-brief
//!
//! Entry point for scheduled runs.

use std::process::ExitCode;

use clap::Parser;
use infrastructure::{AppConfig, LoggingConfig, init_logging};
use presentation_cli::{Cli, EXIT_CONFIG, execute, log_filter_from_verbosity};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is normal in CI where secrets come from the environment
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            let _ = init_logging(&with_verbosity(LoggingConfig::default(), cli.verbose));
            error!(error = %err, "Could not load configuration");
            return ExitCode::from(EXIT_CONFIG);
        },
    };

    // Held until exit so the log file is flushed
    let _log_guard = match init_logging(&with_verbosity(config.logging.clone(), cli.verbose)) {
        Ok(guard) => guard,
        Err(err) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("weekly-brief: {err}");
            }
            return ExitCode::from(EXIT_CONFIG);
        },
    };

    info!(version = env!("CARGO_PKG_VERSION"), "weekly-brief starting");
    ExitCode::from(execute(cli.command, &config).await)
}

fn with_verbosity(mut logging: LoggingConfig, verbose: u8) -> LoggingConfig {
    if let Some(filter) = log_filter_from_verbosity(verbose) {
        logging.filter = filter.to_string();
    }
    logging
}
