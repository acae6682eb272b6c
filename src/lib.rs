mod error;
use std::sync::Arc;

pub use error::{AppError, ErrorKind, Result};
pub mod config;
pub mod conversion;
pub mod models;
pub mod rate_service;
pub mod routes;
pub mod storage;
pub mod transaction_service;

use config::Config;
use models::AppState;
use rate_service::RateService;
use storage::{CurrencyStorage, RateStorage, TransactionStorage};
use transaction_service::TransactionService;

pub struct LocalService {
    pool: sqlx::AnyPool,
    config: Config,
}
impl LocalService {
    pub fn new(pool: sqlx::AnyPool, config: Config) -> Self {
        Self { pool, config }
    }
    /// Brings the schema up to date and serves the API until Ctrl-C.
    pub async fn run(&self) -> Result<()> {
        storage::migrate(&self.pool, &self.config.db).await?;
        let router = routes::init(self.state());
        let listener = tokio::net::TcpListener::bind(self.config.listen_addr)
            .await
            .map_err(|e| AppError::Server(format!("bind {}: {e}", self.config.listen_addr)))?;
        tracing::info!("Listening on {}", self.config.listen_addr);
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::Server(format!("server stopped: {e}")))?;
        self.pool.close().await;
        tracing::info!("Shut down");
        Ok(())
    }
    pub fn state(&self) -> AppState {
        let currency_storage = Arc::new(CurrencyStorage::new(self.pool.clone()));
        let rate_storage = Arc::new(RateStorage::new(self.pool.clone()));
        let transaction_storage = Arc::new(TransactionStorage::new(self.pool.clone()));
        AppState::new(
            currency_storage.clone(),
            Arc::new(RateService::new(currency_storage, rate_storage)),
            Arc::new(TransactionService::new(transaction_storage)),
        )
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("{e:?}");
    }
}
