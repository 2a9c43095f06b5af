use crate::services::auth_service::AuthService;
use opentelemetry::{global, metrics::Counter};
use std::time::Duration;
use tokio::sync::watch;
use tracing::Instrument;

#[derive(Clone, Debug)]
struct Metrics {
    deleted: Counter<u64>,
    errors: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("sangehassan-auth");
        Self {
            deleted: meter
                .u64_counter("refresh_tokens_purged_total")
                .with_description("Total number of expired or revoked refresh tokens deleted")
                .build(),
            errors: meter
                .u64_counter("refresh_token_cleanup_errors_total")
                .with_description("Total number of failed refresh token cleanup cycles")
                .build(),
        }
    }
}

/// Periodically deletes refresh tokens that are expired or already rotated out.
#[derive(Debug)]
pub struct RefreshTokenCleanupWorker {
    auth_service: AuthService,
    interval_secs: u64,
    metrics: Metrics,
}

impl RefreshTokenCleanupWorker {
    #[must_use]
    pub fn new(auth_service: AuthService, interval_secs: u64) -> Self {
        Self { auth_service, interval_secs, metrics: Metrics::new() }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        if self.interval_secs == 0 {
            tracing::info!("Refresh token cleanup is disabled (interval = 0)");
            return;
        }

        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));

        while !*shutdown.borrow() {
            tokio::select! {
                _ = interval.tick() => {
                    self.run_once().instrument(tracing::info_span!("refresh_token_cleanup_iteration")).await;
                }
                _ = shutdown.changed() => {}
            }
        }
        tracing::info!("Refresh token cleanup loop shutting down...");
    }

    async fn run_once(&self) {
        match self.auth_service.purge_stale().await {
            Ok(count) => {
                if count > 0 {
                    tracing::info!(count, "Deleted stale refresh tokens");
                    self.metrics.deleted.add(count, &[]);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Refresh token cleanup cycle failed");
                self.metrics.errors.add(1, &[]);
            }
        }
    }
}
