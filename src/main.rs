#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use sangehassan_auth::config::Config;
use sangehassan_auth::workers::RefreshTokenCleanupWorker;
use sangehassan_auth::{AppBuilder, adapters, telemetry};
use std::net::SocketAddr;
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    config.auth.validate().map_err(anyhow::Error::msg)?;

    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    let boot_span = tracing::info_span!("boot_server");
    let (listener, app_router, cleanup_worker, shutdown_rx) = async {
        // Phase 1: Infrastructure
        let pool = adapters::database::init_pool(&config.database).await?;
        adapters::database::run_migrations(&pool).await?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        sangehassan_auth::spawn_signal_handler(shutdown_tx);

        // Phase 2: Wiring
        let services = AppBuilder::new(config.clone()).with_database(pool).build()?;
        let cleanup_worker = RefreshTokenCleanupWorker::new(
            services.auth_service.clone(),
            config.auth.refresh_cleanup_interval_secs,
        );
        let app_router = sangehassan_auth::api::app_router(config.clone(), services);

        // Phase 3: Listener
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(address = %addr, "listening");

        Ok::<(tokio::net::TcpListener, axum::Router, RefreshTokenCleanupWorker, watch::Receiver<bool>), anyhow::Error>((
            listener,
            app_router,
            cleanup_worker,
            shutdown_rx,
        ))
    }
    .instrument(boot_span)
    .await?;

    // Phase 4: Serve until a shutdown signal, then drain in-flight requests
    let cleanup_task = tokio::spawn(cleanup_worker.run(shutdown_rx.clone()));

    let mut server_rx = shutdown_rx.clone();
    let server = axum::serve(listener, app_router)
        .with_graceful_shutdown(async move {
            let _ = server_rx.wait_for(|&s| s).await;
        });
    let mut server = std::pin::pin!(server.into_future());

    let mut drain_rx = shutdown_rx;
    tokio::select! {
        result = &mut server => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server error");
            }
        }
        () = async { let _ = drain_rx.wait_for(|&s| s).await; } => {
            let timeout = std::time::Duration::from_secs(config.server.shutdown_timeout_secs);
            match tokio::time::timeout(timeout, &mut server).await {
                Ok(Err(e)) => tracing::error!(error = %e, "Server error"),
                Ok(Ok(())) => tracing::info!("Server drained."),
                Err(_) => tracing::warn!("Timeout waiting for in-flight requests to finish."),
            }
        }
    }

    let timeout = std::time::Duration::from_secs(config.server.shutdown_timeout_secs);
    match tokio::time::timeout(timeout, cleanup_task).await {
        Ok(Err(e)) => tracing::warn!(error = %e, "Refresh token cleanup task ended abnormally"),
        Ok(Ok(())) => {}
        Err(_) => tracing::warn!("Timeout waiting for refresh token cleanup to stop."),
    }

    telemetry_guard.shutdown();
    Ok(())
}
