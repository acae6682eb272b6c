use sqlx::{AnyConnection, AnyPool, FromRow};

use super::{parse_date, parse_decimal};
use crate::models::{Currency, NewRate, Rate, RateKey};
use crate::{AppError, Result};

const SELECT_RATES: &str = "SELECT r.id AS rate_id, r.rate_date, r.side, r.rate, \
    b.id AS base_id, b.iso AS base_iso, q.id AS quote_id, q.iso AS quote_iso \
    FROM rates r \
    JOIN currencies b ON b.id = r.base_currency_id \
    JOIN currencies q ON q.id = r.quote_currency_id";

#[derive(Clone)]
pub struct RateStorage {
    pool: AnyPool,
}
impl RateStorage {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
    /// Inserts `rate`. The (date, base, quote, side) uniqueness is left to the
    /// table constraint; a violation comes back as [`AppError::DuplicateRate`].
    pub async fn record(&self, rate: NewRate) -> Result<Rate> {
        let query = "INSERT INTO rates (rate_date, base_currency_id, quote_currency_id, side, rate) \
            VALUES ($1, $2, $3, $4, $5) RETURNING id";
        let inserted = sqlx::query_scalar::<_, i64>(query)
            .bind(rate.rate_date.to_string())
            .bind(rate.base_currency.id)
            .bind(rate.quote_currency.id)
            .bind(rate.side.as_str())
            .bind(rate.rate.to_string())
            .fetch_one(&self.pool)
            .await;
        let id = match inserted {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::DuplicateRate(rate.key().to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Rate {
            id,
            rate_date: rate.rate_date,
            base_currency: rate.base_currency,
            quote_currency: rate.quote_currency,
            side: rate.side,
            rate: rate.rate,
        })
    }
    pub async fn lookup(&self, key: &RateKey) -> Result<Rate> {
        let mut conn = self.pool.acquire().await?;
        lookup(&mut conn, key).await
    }
    pub async fn get_all(&self) -> Result<Vec<Rate>> {
        let query = format!("{SELECT_RATES} ORDER BY r.id");
        sqlx::query_as::<_, RateRow>(&query)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Rate::try_from)
            .collect()
    }
}

/// Exact-match lookup on an open connection, so it can share a database transaction.
pub(super) async fn lookup(conn: &mut AnyConnection, key: &RateKey) -> Result<Rate> {
    let query = format!(
        "{SELECT_RATES} WHERE r.rate_date = $1 AND b.iso = $2 AND q.iso = $3 AND r.side = $4"
    );
    let row = sqlx::query_as::<_, RateRow>(&query)
        .bind(key.rate_date.to_string())
        .bind(key.base_currency.as_str())
        .bind(key.quote_currency.as_str())
        .bind(key.side.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    match row {
        Some(row) => Rate::try_from(row),
        None => Err(AppError::NoRateFound(key.to_string())),
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[derive(Debug, FromRow)]
pub(super) struct RateRow {
    rate_id: i64,
    rate_date: String,
    side: String,
    rate: String,
    base_id: i64,
    base_iso: String,
    quote_id: i64,
    quote_iso: String,
}
impl TryFrom<RateRow> for Rate {
    type Error = AppError;

    fn try_from(row: RateRow) -> Result<Self> {
        Ok(Rate {
            id: row.rate_id,
            rate_date: parse_date("rate_date", &row.rate_date)?,
            base_currency: Currency {
                id: row.base_id,
                iso: row.base_iso,
            },
            quote_currency: Currency {
                id: row.quote_id,
                iso: row.quote_iso,
            },
            side: row.side.parse()?,
            rate: parse_decimal("rate", &row.rate)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Side;
    use crate::storage::test_support::memory_pool;
    use crate::storage::CurrencyStorage;
    use anyhow::Result;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    async fn new_rate(
        currencies: &CurrencyStorage,
        side: Side,
        rate: Decimal,
    ) -> Result<NewRate> {
        let found = currencies.resolve(&["PHP", "USD"]).await?;
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default();
        Ok(NewRate::new(
            date,
            found["PHP"].clone(),
            found["USD"].clone(),
            side,
            rate,
        )?)
    }

    #[tokio::test]
    async fn test_record_then_lookup() -> Result<()> {
        let pool = memory_pool().await?;
        let currencies = CurrencyStorage::new(pool.clone());
        let storage = RateStorage::new(pool);
        let recorded = storage
            .record(new_rate(&currencies, Side::Sell, dec!(1.12)).await?)
            .await?;
        let found = storage.lookup(&recorded.key()).await?;
        assert_eq!(found, recorded);
        assert_eq!(found.rate, dec!(1.12));
        assert_eq!(storage.get_all().await?, vec![recorded]);
        Ok(())
    }
    #[tokio::test]
    async fn test_duplicate_rate_is_conflict() -> Result<()> {
        let pool = memory_pool().await?;
        let currencies = CurrencyStorage::new(pool.clone());
        let storage = RateStorage::new(pool);
        storage
            .record(new_rate(&currencies, Side::Sell, dec!(1.12)).await?)
            .await?;
        let second = storage
            .record(new_rate(&currencies, Side::Sell, dec!(2.00)).await?)
            .await;
        assert!(matches!(second, Err(AppError::DuplicateRate(_))));
        storage
            .record(new_rate(&currencies, Side::Buy, dec!(2.13)).await?)
            .await?;
        assert_eq!(storage.get_all().await?.len(), 2);
        Ok(())
    }
    #[tokio::test]
    async fn test_lookup_is_exact() -> Result<()> {
        let pool = memory_pool().await?;
        let currencies = CurrencyStorage::new(pool.clone());
        let storage = RateStorage::new(pool);
        let buy = storage
            .record(new_rate(&currencies, Side::Buy, dec!(2.13)).await?)
            .await?;
        let sell_key = RateKey {
            side: Side::Sell,
            ..buy.key()
        };
        assert!(matches!(
            storage.lookup(&sell_key).await,
            Err(AppError::NoRateFound(_))
        ));
        let next_day = RateKey {
            rate_date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap_or_default(),
            ..buy.key()
        };
        assert!(matches!(
            storage.lookup(&next_day).await,
            Err(AppError::NoRateFound(_))
        ));
        Ok(())
    }
}
