//! Venue booking HTTP server.

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use venue_booking_core::providers::Notifier;
use venue_booking_core::{BookingEnvironment, SystemClock};
use venue_booking_postgres::PostgresStore;
use venue_booking_server::notify::LogNotifier;
use venue_booking_server::{AppState, Config, build_router, metrics};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments use the environment.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,venue_booking=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting venue booking server");

    let config = Config::from_env()?;
    info!(
        conflict_policy = %config.booking.conflict_policy,
        notifications = config.booking.notifications_enabled,
        "Configuration loaded"
    );

    // Metrics exporter
    let metrics_addr: SocketAddr = config
        .metrics_address()
        .parse()
        .context("invalid metrics address")?;
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .context("failed to install Prometheus exporter")?;
    metrics::register_booking_metrics();
    info!(address = %metrics_addr, "Metrics exporter listening");

    // Database
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(config.database.connect_timeout)
        .idle_timeout(config.database.idle_timeout)
        .connect(&config.database.url)
        .await
        .context("failed to connect to database")?;
    let store = PostgresStore::new(pool);
    store.migrate().await?;
    info!("Database ready");

    let notifier: Option<Arc<dyn Notifier>> = if config.booking.notifications_enabled {
        Some(Arc::new(LogNotifier))
    } else {
        None
    };
    let env = BookingEnvironment::new(Arc::new(SystemClock), config.booking.conflict_policy);
    let app = build_router(AppState::new(store, notifier, env));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(address = %addr, "Server listening");

    let (stopping_tx, mut stopping_rx) = tokio::sync::watch::channel(false);
    let server = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = stopping_tx.send(true);
            })
            .await
    };
    let shutdown_timeout = config.server.shutdown_timeout;
    let deadline = async move {
        let _ = stopping_rx.wait_for(|stopping| *stopping).await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        result = server => result.context("server error")?,
        () = deadline => warn!(
            ?shutdown_timeout,
            "Graceful shutdown timed out, closing open connections"
        ),
    }

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for Ctrl+C (SIGINT) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            error!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                error!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal, shutting down gracefully..."),
        () = terminate => info!("Received SIGTERM signal, shutting down gracefully..."),
    }
}
