//! nawa-web - form submission backend for the Nawa marketing site
//!
//! Serves the contact, newsletter and workshop endpoints plus the
//! key-protected developer routes. Configuration comes from flags,
//! environment and an optional `nawa.toml` (see `config`).

use anyhow::{Context, Result};
use clap::Parser;
use nawa_common::db;
use nawa_web::config::ServerArgs;
use nawa_web::email::Mailer;
use nawa_web::{build_router, ApiSecrets, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nawa_web=info,nawa_common=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting nawa-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = ServerArgs::parse();
    let settings = args.load_settings().context("Failed to load configuration")?;
    settings.log_summary();

    let pool = db::connect(&settings.database_url)
        .await
        .context("Failed to open database")?;

    let mailer = match Mailer::from_settings(settings.smtp.as_ref()) {
        Ok(mailer) => mailer,
        Err(e) => {
            error!("Invalid SMTP configuration, confirmation emails disabled: {}", e);
            Mailer::disabled()
        }
    };

    let state = AppState::new(
        pool,
        ApiSecrets::from_settings(&settings),
        mailer,
        settings.assets_dir.clone(),
    )
    .with_cors_origin(settings.cors_origin.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.bind.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind))?;
    info!("Listening on http://{}", settings.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
