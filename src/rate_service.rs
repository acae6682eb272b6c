use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{Currency, NewRate, Rate, RateCreate};
use crate::storage::{CurrencyStorage, RateStorage};
use crate::{AppError, Result};

#[derive(Clone)]
pub struct RateService {
    currency_storage: Arc<CurrencyStorage>,
    storage: Arc<RateStorage>,
}

impl RateService {
    pub fn new(currency_storage: Arc<CurrencyStorage>, storage: Arc<RateStorage>) -> Self {
        RateService {
            currency_storage,
            storage,
        }
    }
    #[tracing::instrument(name = "recording rate", skip_all, fields(key = %input.key()))]
    pub async fn record(&self, input: RateCreate) -> Result<Rate> {
        input.validate()?;
        let mut currencies = self
            .currency_storage
            .resolve(&[input.base_currency.as_str(), input.quote_currency.as_str()])
            .await?;
        let quote = take_currency(&mut currencies, &input.quote_currency)?;
        let base = if input.base_currency == input.quote_currency {
            quote.clone()
        } else {
            take_currency(&mut currencies, &input.base_currency)?
        };
        let rate = NewRate::new(input.rate_date, base, quote, input.side, input.rate)?;
        let recorded = self.storage.record(rate).await?;
        tracing::info!("Recorded rate {} = {}", recorded.key(), recorded.rate);
        Ok(recorded)
    }
    pub async fn get_all(&self) -> Result<Vec<Rate>> {
        self.storage.get_all().await
    }
}

fn take_currency(currencies: &mut HashMap<String, Currency>, code: &str) -> Result<Currency> {
    currencies
        .remove(code)
        .ok_or_else(|| AppError::CurrencyNotFound(vec![code.to_string()]))
}
