mod currency;
mod rate;
mod transaction;
pub use currency::*;
pub use rate::*;
pub use transaction::*;

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::rate_service::RateService;
use crate::storage::CurrencyStorage;
use crate::transaction_service::TransactionService;
use crate::{AppError, Result};

/// Largest number of significant digits accepted for a rate or an amount.
pub const MAX_DIGITS: u32 = 20;
/// Largest number of fractional digits accepted for a rate or an amount.
pub const MAX_DECIMAL_PLACES: u32 = 10;

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub currency_storage: Arc<CurrencyStorage>,
    pub rate_service: Arc<RateService>,
    pub transaction_service: Arc<TransactionService>,
}
impl AppState {
    pub fn new(
        currency_storage: Arc<CurrencyStorage>,
        rate_service: Arc<RateService>,
        transaction_service: Arc<TransactionService>,
    ) -> Self {
        Self {
            currency_storage,
            rate_service,
            transaction_service,
        }
    }
}

/// Checks that `value` is positive and fits the accepted precision.
/// Returns a human readable reason on failure.
pub(crate) fn check_value(name: &str, value: Decimal) -> std::result::Result<(), String> {
    if value <= Decimal::ZERO {
        return Err(format!("{name} must be greater than 0, got {value}"));
    }
    let value = value.normalize();
    let scale = value.scale();
    if scale > MAX_DECIMAL_PLACES {
        return Err(format!(
            "{name} must have at most {MAX_DECIMAL_PLACES} decimal places, got {value}"
        ));
    }
    let whole = value.trunc();
    let whole_digits = if whole.is_zero() {
        0
    } else {
        whole.to_string().len() as u32
    };
    if whole_digits + scale > MAX_DIGITS {
        return Err(format!(
            "{name} must have at most {MAX_DIGITS} digits in total, got {value}"
        ));
    }
    Ok(())
}

pub(crate) fn check_amount(name: &str, value: Decimal) -> Result<()> {
    check_value(name, value).map_err(AppError::InvalidAmount)
}
