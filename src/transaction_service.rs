use std::sync::Arc;

use crate::conversion::convert;
use crate::models::{NewTransaction, TransactionCreate, TransactionView};
use crate::storage::TransactionStorage;
use crate::Result;

#[derive(Clone)]
pub struct TransactionService {
    storage: Arc<TransactionStorage>,
}

impl TransactionService {
    pub fn new(storage: Arc<TransactionStorage>) -> Self {
        TransactionService { storage }
    }
    /// Prices `input` against the rate recorded for its date, pair and side and stores it.
    #[tracing::instrument(name = "creating transaction", skip_all, fields(key = %input.rate_key()))]
    pub async fn create(&self, input: TransactionCreate) -> Result<TransactionView> {
        let requested = input.validate()?;
        let view = self
            .storage
            .create_with_rate(&input.rate_key(), |rate| {
                let conversion = convert(rate, requested)?;
                NewTransaction::builder()
                    .timestamp(input.timestamp)
                    .rate_used_id(rate.id)
                    .conversion(conversion)
                    .build()
            })
            .await?;
        tracing::info!(
            "Created transaction {} at rate {}",
            view.transaction.id,
            view.effective_rate
        );
        Ok(view)
    }
    pub async fn list(&self) -> Result<Vec<TransactionView>> {
        self.storage.list().await
    }
    pub async fn get(&self, id: &str) -> Result<Option<TransactionView>> {
        self.storage.get(id).await
    }
}
