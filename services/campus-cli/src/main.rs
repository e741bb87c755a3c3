//! Campus platform client CLI
//!
//! Single-binary client that maintains one logged-in session:
//! 1. Loads TOML configuration and initializes JSON tracing
//! 2. Restores any stored session from the credential store
//! 3. Authenticates with credentials from the environment when needed
//! 4. In `run` mode, holds the session with background token refresh
//!    until SIGTERM/SIGINT

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_auth::{CredentialStore, LoginRequest};
use campus_gateway::ApiClient;
use campus_session::SessionManager;

use crate::config::Config;

const USAGE: &str = "usage: campus [login|status|run|logout] [--config <path>]";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Install the Prometheus recorder before any requests are dispatched
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .set_buckets_for_metric(
            metrics_exporter_prometheus::Matcher::Full("api_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0],
        )
        .context("failed to set histogram buckets")?
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("status");
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        base_url = %config.api.base_url,
        storage_dir = %config.session.storage_dir.display(),
        refresh_margin_secs = config.session.refresh_margin_secs,
        "configuration loaded"
    );

    let client = Arc::new(ApiClient::new(
        &config.api.base_url,
        config.client_options(),
    ));
    let store = Arc::new(CredentialStore::new(&config.session.storage_dir));
    let session = SessionManager::new(client, store, config.refresh_margin());

    match command {
        "login" => {
            let request = credentials_from_env()?;
            session
                .login(request)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            print_state(&session);
        }
        "status" => {
            session.restore().await;
            print_state(&session);
        }
        "logout" => {
            if session.restore().await {
                session.logout().await.ok();
            }
            print_state(&session);
        }
        "run" => {
            if !session.restore().await {
                info!("no stored session, logging in");
                let request = credentials_from_env()?;
                session
                    .login(request)
                    .await
                    .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            }
            info!("session active, refreshing in the background until shutdown");

            shutdown_signal().await;

            let telemetry = session.client().telemetry();
            info!(
                requests = telemetry.performance().len(),
                errors = telemetry.errors().len(),
                "telemetry summary"
            );
            debug!(metrics = %prometheus_handle.render(), "final metrics snapshot");
            info!("shutdown complete");
        }
        other => {
            warn!(command = other, "unknown command");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}

/// Account credentials from the environment; never read from the TOML.
fn credentials_from_env() -> Result<LoginRequest> {
    let student_id =
        std::env::var("CAMPUS_STUDENT_ID").context("CAMPUS_STUDENT_ID is not set")?;
    let password = std::env::var("CAMPUS_PASSWORD").context("CAMPUS_PASSWORD is not set")?;
    Ok(LoginRequest {
        student_id,
        password: password.into(),
    })
}

/// Print a session summary to stdout for scripting.
fn print_state(session: &SessionManager) {
    let state = session.snapshot();
    let summary = match &state.user {
        Some(user) => json!({
            "authenticated": state.authenticated,
            "user": {
                "id": user.id,
                "name": user.name,
                "role": user.role.label(),
            },
            "error": state.error,
        }),
        None => json!({
            "authenticated": state.authenticated,
            "error": state.error,
        }),
    };
    println!("{summary:#}");
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
