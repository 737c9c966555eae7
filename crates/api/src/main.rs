use std::net::SocketAddr;

use sqlx::{Connection, PgConnection};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autodash_api::config::{LogFormat, ServerConfig};
use autodash_api::router::build_app_router;
use autodash_api::state::AppState;
use autodash_db::PgSessionProvider;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "autodash_api=debug,autodash_db=debug,tower_http=debug".into());
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }

    tracing::info!(
        host = %config.host,
        port = %config.port,
        db_host = %config.database.host,
        db_name = %config.database.database,
        query_timeout_secs = config.query_timeout_secs,
        "Loaded server configuration",
    );

    // --- Migrations ---
    if config.run_migrations {
        let mut conn = PgConnection::connect_with(&config.database.connect_options())
            .await
            .expect("Failed to connect to database for migrations");
        autodash_db::run_migrations(&mut conn)
            .await
            .expect("Failed to run database migrations");
        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "Migration connection did not close cleanly");
        }
        tracing::info!("Database migrations applied");
    }

    // --- App state ---
    let provider = PgSessionProvider::new(&config.database);
    let state = AppState::new(config.clone(), provider);

    // Connections are opened per page load, so an unreachable database at
    // startup is reported but does not stop the server.
    match state.orchestrator.health_check().await {
        Ok(()) => tracing::info!("Database health check passed"),
        Err(e) => tracing::warn!(error = %e, "Database health check failed"),
    }

    // --- Router ---
    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
