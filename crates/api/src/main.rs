use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use jobhook_core::{JobLogger, JobName, Payload, ServiceRegistry};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobhook_api::config::ServerConfig;
use jobhook_api::router::build_app_router;
use jobhook_api::state::AppState;
use jobhook_api::TriggerOptions;

/// Default trigger handler: records each firing.
async fn log_trigger(job_name: JobName, payload: Payload, logger: Option<JobLogger>) {
    match logger {
        Some(logger) => logger.info(format_args!(
            "Job triggered with {} byte payload",
            payload.len()
        )),
        None => tracing::info!(%job_name, payload_len = payload.len(), "Job triggered"),
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "jobhook_api=debug,jobhook_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        job_timeout_secs = config.job_timeout_secs,
        on_timeout = %config.timeout_response,
        max_payload_bytes = config.max_payload_bytes,
        "Loaded server configuration"
    );

    // --- Services ---
    let services = ServiceRegistry::new();
    let options = TriggerOptions::from_config(&config).resolver(Arc::new(services));

    // --- Router ---
    let app = build_app_router(AppState::new(config.clone()), log_trigger, options);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    let shutdown = CancellationToken::new();
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.clone().cancelled_owned())
            .into_future(),
    );

    tokio::select! {
        () = shutdown_signal() => {}
        result = &mut server => {
            tracing::error!(?result, "Server stopped unexpectedly");
            return;
        }
    }

    // --- Drain in-flight triggers ---
    shutdown.cancel();
    match tokio::time::timeout(config.shutdown_timeout(), server).await {
        Ok(Ok(Ok(()))) => tracing::info!("Graceful shutdown complete"),
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "Server error during shutdown"),
        Ok(Err(e)) => tracing::error!(error = %e, "Server task failed"),
        Err(_) => tracing::warn!(
            shutdown_timeout_secs = config.shutdown_timeout_secs,
            "In-flight triggers did not drain in time, exiting"
        ),
    }
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
