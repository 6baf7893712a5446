use clap::Parser;
use schoolboard::app::{App, print_grade};
use schoolboard::cli::{Args, Command};
use schoolboard::logging::setup_logging;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Serve);

    // Grading is pure; it needs neither configuration nor a backend.
    if let Command::Grade { percentage } = command {
        return print_grade(percentage);
    }

    // Load config and setup logging before App::new() so startup logs are never silently dropped
    let config = match App::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&config, args.tracing);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("GIT_COMMIT_SHORT"),
        environment = if cfg!(debug_assertions) {
            "development"
        } else {
            "production"
        },
        "starting schoolboard"
    );

    let app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = ?e, "Failed to initialize application");
            return ExitCode::FAILURE;
        }
    };

    match command {
        Command::Monitor => app.monitor_once().await,
        Command::Serve | Command::Grade { .. } => app.serve().await,
    }
}
