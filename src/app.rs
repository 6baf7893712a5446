use crate::api::SchoolApi;
use crate::config::Config;
use crate::grading::{LetterGrade, calc_letter_grade};
use crate::monitor::get_monitoring_data;
use crate::state::AppState;
use crate::web::create_router;
use anyhow::Context;
use figment::{Figment, providers::Env};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use yansi::Paint;

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    app_state: AppState,
}

impl App {
    /// Read configuration from the process environment.
    pub fn load_config() -> Result<Config, anyhow::Error> {
        Figment::new()
            .merge(Env::raw())
            .extract()
            .context("Failed to load config")
    }

    /// Create a new App instance with all necessary components initialized
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let api = SchoolApi::from_config(&config).context("Failed to create SchoolApi")?;
        let app_state = AppState::new(Arc::new(api), config.monitor_options());

        info!(
            backend = %config.api_base_url,
            authenticated = config.api_token.is_some(),
            rate_limit = config.rate_limit_per_second,
            "backend client configured"
        );

        Ok(App { config, app_state })
    }

    /// Serve the HTTP API until a shutdown signal arrives.
    pub async fn serve(self) -> ExitCode {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(error = %e, %addr, "Failed to bind listener");
                return ExitCode::FAILURE;
            }
        };
        info!(%addr, "web server listening");

        let shutdown = self.app_state.shutdown_token();
        let router = create_router(self.app_state.clone());
        let mut server = tokio::spawn(
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown.clone().cancelled_owned())
                .into_future(),
        );

        tokio::select! {
            _ = wait_for_shutdown_signal() => {}
            result = &mut server => {
                // The server only stops on its own if it failed.
                error!(result = ?result, "web server exited unexpectedly");
                self.app_state.shutdown();
                return ExitCode::FAILURE;
            }
        }

        info!(
            timeout = crate::utils::fmt_duration(self.config.shutdown_timeout),
            "shutdown signal received, draining connections"
        );
        self.app_state.shutdown();

        match tokio::time::timeout(self.config.shutdown_timeout, server).await {
            Ok(Ok(Ok(()))) => {
                info!("web server stopped");
                ExitCode::SUCCESS
            }
            Ok(Ok(Err(e))) => {
                error!(error = %e, "web server failed during shutdown");
                ExitCode::FAILURE
            }
            Ok(Err(e)) => {
                error!(error = %e, "web server task panicked");
                ExitCode::FAILURE
            }
            Err(_) => {
                warn!("graceful shutdown timed out, exiting");
                ExitCode::FAILURE
            }
        }
    }

    /// Load monitoring data once and print it to stdout.
    pub async fn monitor_once(self) -> ExitCode {
        let students = self.app_state.student_cache();
        let data = get_monitoring_data(
            self.app_state.api.as_ref(),
            &students,
            self.app_state.monitor,
        )
        .await;
        self.app_state.shutdown();

        match serde_json::to_string_pretty(&data) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!(error = %e, "Failed to serialize monitoring data");
                return ExitCode::FAILURE;
            }
        }

        if data.error.is_some() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

/// Print the letter grade for a percentage, colored by band.
pub fn print_grade(percentage: f64) -> ExitCode {
    if !percentage.is_finite() {
        eprintln!("{} percentage must be a finite number", "error:".red().bold());
        return ExitCode::FAILURE;
    }

    let grade = calc_letter_grade(percentage);
    let label = grade.as_str();
    let painted = match grade {
        LetterGrade::APlus | LetterGrade::A | LetterGrade::AMinus => label.green(),
        LetterGrade::BPlus | LetterGrade::B | LetterGrade::BMinus => label.cyan(),
        LetterGrade::CPlus | LetterGrade::C | LetterGrade::CMinus => label.yellow(),
        LetterGrade::D => label.magenta(),
        LetterGrade::F => label.red(),
    };
    println!("{percentage}% → {}", painted.bold());
    ExitCode::SUCCESS
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("received SIGTERM"),
                    _ = tokio::signal::ctrl_c() => info!("received Ctrl+C"),
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler, listening for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("received Ctrl+C");
    }
}
