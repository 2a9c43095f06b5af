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

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;
pub mod workers;

use crate::adapters::database::{AdminRepository, CustomerRepository, DbPool, RefreshTokenRepository};
use crate::adapters::{AdminStore, CustomerStore, RefreshTokenStore};
use crate::api::ServiceContainer;
use crate::config::Config;
use crate::services::account_service::AccountService;
use crate::services::admin_service::AdminAuthService;
use crate::services::auth_service::AuthService;
use crate::services::password_service::PasswordService;
use std::sync::Arc;
use tokio::sync::watch;

/// Wires the services over a set of stores.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    admins: Option<Arc<dyn AdminStore>>,
    customers: Option<Arc<dyn CustomerStore>>,
    refresh_tokens: Option<Arc<dyn RefreshTokenStore>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, admins: None, customers: None, refresh_tokens: None }
    }

    /// Backs every store with the Postgres repositories.
    #[must_use]
    pub fn with_database(self, pool: DbPool) -> Self {
        self.with_stores(
            Arc::new(AdminRepository::new(pool.clone())),
            Arc::new(CustomerRepository::new(pool.clone())),
            Arc::new(RefreshTokenRepository::new(pool)),
        )
    }

    #[must_use]
    pub fn with_stores(
        mut self,
        admins: Arc<dyn AdminStore>,
        customers: Arc<dyn CustomerStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
    ) -> Self {
        self.admins = Some(admins);
        self.customers = Some(customers);
        self.refresh_tokens = Some(refresh_tokens);
        self
    }

    /// # Errors
    /// Returns an error if no stores were provided.
    pub fn build(self) -> anyhow::Result<ServiceContainer> {
        let (Some(admins), Some(customers), Some(refresh_tokens)) = (self.admins, self.customers, self.refresh_tokens)
        else {
            anyhow::bail!("stores are required to build the application");
        };

        let auth = self.config.auth;
        let passwords = PasswordService::new();

        let auth_service = AuthService::new(auth.clone(), Arc::clone(&customers), refresh_tokens);
        let account_service = AccountService::new(customers, auth_service.clone(), passwords);
        let admin_service = AdminAuthService::new(auth, admins, passwords);

        Ok(ServiceContainer { account_service, admin_service, auth_service })
    }
}

/// Flips `shutdown_tx` to `true` on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}
