mod currency;
mod rate;
mod transaction;
pub use currency::CurrencyStorage;
pub use rate::RateStorage;
pub use transaction::TransactionStorage;

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use crate::config::{Config, DbConfig};
use crate::{AppError, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Opens the connection pool described by `config`.
pub async fn connect(config: &Config) -> Result<AnyPool> {
    sqlx::any::install_default_drivers();
    let url = config.db.url();
    let options = if url == "sqlite::memory:" {
        // every connection to an in-memory database is a separate database
        AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        AnyPoolOptions::new().max_connections(config.max_connections)
    };
    let pool = options.connect(&url).await?;
    tracing::info!("Connected to {:?}", config.db);
    Ok(pool)
}

/// Applies the migrations for the configured dialect.
pub async fn migrate(pool: &AnyPool, db: &DbConfig) -> Result<()> {
    if db.is_sqlite() {
        sqlx::migrate!("./migrations/sqlite").run(pool).await?;
    } else {
        sqlx::migrate!("./migrations/postgres").run(pool).await?;
    }
    tracing::info!("Database schema is up to date");
    Ok(())
}

fn parse_decimal(column: &str, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| AppError::DbError(format!("column {column} holds '{raw}': {e}")))
}

fn parse_date(column: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::from_str(raw)
        .map_err(|e| AppError::DbError(format!("column {column} holds '{raw}': {e}")))
}

fn parse_timestamp(column: &str, raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| AppError::DbError(format!("column {column} holds '{raw}': {e}")))
}

fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}


#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_timestamp_text_format() -> Result<()> {
        let timestamp = NaiveDate::from_ymd_opt(2026, 2, 2)
            .and_then(|d| d.and_hms_micro_opt(10, 30, 0, 250))
            .unwrap_or_default();
        let raw = format_timestamp(timestamp);
        assert_eq!(raw, "2026-02-02T10:30:00.000250");
        assert_eq!(parse_timestamp("occurred_at", &raw)?, timestamp);
        assert_eq!(
            parse_timestamp("occurred_at", "2026-02-02T10:30:00")?,
            timestamp.date().and_hms_opt(10, 30, 0).unwrap_or_default()
        );
        Ok(())
    }
    #[test]
    fn test_bad_column_is_db_error() {
        assert!(matches!(
            parse_decimal("rate", "one"),
            Err(AppError::DbError(_))
        ));
        assert!(parse_date("rate_date", "2026-02-30").is_err());
    }
}
