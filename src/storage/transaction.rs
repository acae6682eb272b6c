use sqlx::{AnyConnection, AnyPool, FromRow};

use super::rate::{lookup, RateRow};
use super::{format_timestamp, parse_decimal, parse_timestamp};
use crate::models::{
    generate_transaction_id, NewTransaction, Rate, RateKey, Transaction, TransactionView,
};
use crate::{AppError, Result};

const SELECT_TRANSACTIONS: &str = "SELECT t.id, t.occurred_at, t.rate_used_id, \
    t.base_amount, t.foreign_amount, t.rounding_adjustment, \
    r.id AS rate_id, r.rate_date, r.side, r.rate, \
    b.id AS base_id, b.iso AS base_iso, q.id AS quote_id, q.iso AS quote_iso \
    FROM transactions t \
    JOIN rates r ON r.id = t.rate_used_id \
    JOIN currencies b ON b.id = r.base_currency_id \
    JOIN currencies q ON q.id = r.quote_currency_id";

#[derive(Clone)]
pub struct TransactionStorage {
    pool: AnyPool,
}
impl TransactionStorage {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
    #[cfg(test)]
    async fn create(&self, new: NewTransaction) -> Result<Transaction> {
        let mut conn = self.pool.acquire().await?;
        create(&mut conn, new).await
    }
    /// Looks up the rate for `key`, prices the transaction with `price` and writes it,
    /// all inside one database transaction. On SQLite the transaction is deferred, so
    /// concurrent writers on a multi-connection pool may see `SQLITE_BUSY`.
    pub async fn create_with_rate<F>(&self, key: &RateKey, price: F) -> Result<TransactionView>
    where
        F: FnOnce(&Rate) -> Result<NewTransaction>,
    {
        let mut tx = self.pool.begin().await?;
        let rate = lookup(&mut tx, key).await?;
        let new = price(&rate)?;
        let transaction = create(&mut tx, new).await?;
        tx.commit().await?;
        Ok(TransactionView::new(transaction, &rate))
    }
    /// All transactions in the order they were created.
    pub async fn list(&self) -> Result<Vec<TransactionView>> {
        let query = format!("{SELECT_TRANSACTIONS} ORDER BY t.seq");
        sqlx::query_as::<_, TransactionRow>(&query)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(TransactionView::try_from)
            .collect()
    }
    pub async fn get(&self, id: &str) -> Result<Option<TransactionView>> {
        let query = format!("{SELECT_TRANSACTIONS} WHERE t.id = $1");
        sqlx::query_as::<_, TransactionRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(TransactionView::try_from)
            .transpose()
    }
}

/// Writes `new` under a freshly generated identifier on an open connection.
/// A missing rate or an identifier collision surfaces as [`AppError::Integrity`].
pub(super) async fn create(conn: &mut AnyConnection, new: NewTransaction) -> Result<Transaction> {
    let transaction = Transaction {
        id: generate_transaction_id(new.timestamp),
        timestamp: new.timestamp,
        rate_used_id: new.rate_used_id,
        base_amount: new.base_amount,
        foreign_amount: new.foreign_amount,
        rounding_adjustment: new.rounding_adjustment,
    };
    let query = "INSERT INTO transactions \
        (id, occurred_at, rate_used_id, base_amount, foreign_amount, rounding_adjustment) \
        VALUES ($1, $2, $3, $4, $5, $6)";
    sqlx::query(query)
        .bind(transaction.id.as_str())
        .bind(format_timestamp(transaction.timestamp))
        .bind(transaction.rate_used_id)
        .bind(transaction.base_amount.to_string())
        .bind(transaction.foreign_amount.to_string())
        .bind(transaction.rounding_adjustment.to_string())
        .execute(&mut *conn)
        .await?;
    Ok(transaction)
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: String,
    occurred_at: String,
    rate_used_id: i64,
    base_amount: String,
    foreign_amount: String,
    rounding_adjustment: String,
    #[sqlx(flatten)]
    rate: RateRow,
}
impl TryFrom<TransactionRow> for TransactionView {
    type Error = AppError;

    fn try_from(row: TransactionRow) -> Result<Self> {
        let rate = Rate::try_from(row.rate)?;
        let transaction = Transaction {
            id: row.id,
            timestamp: parse_timestamp("occurred_at", &row.occurred_at)?,
            rate_used_id: row.rate_used_id,
            base_amount: parse_decimal("base_amount", &row.base_amount)?,
            foreign_amount: parse_decimal("foreign_amount", &row.foreign_amount)?,
            rounding_adjustment: parse_decimal("rounding_adjustment", &row.rounding_adjustment)?,
        };
        Ok(TransactionView::new(transaction, &rate))
    }
}
