use fx_ledger::config::Config;
use fx_ledger::{storage, LocalService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded: {:?}", config);
    let pool = storage::connect(&config).await?;
    LocalService::new(pool, config).run().await?;
    Ok(())
}
