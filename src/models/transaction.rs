use chrono::{DateTime, NaiveDate, NaiveDateTime};
use derive_builder::{Builder, UninitializedFieldError};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::{check_amount, validate_currency_code, Rate, RateKey, Side};
use crate::conversion::{Conversion, RequestedAmount};
use crate::{AppError, Result};

const ID_PREFIX: &str = "TXN";
const ID_HEX_LEN: usize = 8;
const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];
const SPACED_OFFSET_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

/// Builds a `TXN-<date>-<8 hex>` identifier for a transaction made at `timestamp`.
pub fn generate_transaction_id(timestamp: NaiveDateTime) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{ID_PREFIX}-{date}-{hex}",
        date = timestamp.date().format("%Y-%m-%d"),
        hex = &random[..ID_HEX_LEN]
    )
}

/// Extracts the date part of a well-formed transaction identifier.
pub fn transaction_id_date(id: &str) -> Option<NaiveDate> {
    let rest = id.strip_prefix(ID_PREFIX)?.strip_prefix('-')?;
    let (date, hex) = rest.rsplit_once('-')?;
    let valid_hex = hex.len() == ID_HEX_LEN
        && hex
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    if !valid_hex || date.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Reads a request timestamp as the caller's wall-clock time.
///
/// RFC 3339 values with `Z` or a numeric offset keep their local date and time;
/// the offset itself is dropped. Offset-free values may use `T` or a space
/// between date and time, and may omit seconds.
pub fn parse_request_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, SPACED_OFFSET_TIMESTAMP_FORMAT))
        .ok()
        .map(|dt| dt.naive_local())
        .or_else(|| {
            NAIVE_TIMESTAMP_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        })
}

fn deserialize_request_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_request_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}

/// Body of `POST /transaction`. Exactly one of the amounts must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionCreate {
    #[serde(deserialize_with = "deserialize_request_timestamp")]
    pub timestamp: NaiveDateTime,
    pub base_currency: String,
    pub quote_currency: String,
    pub side: Side,
    #[serde(default)]
    pub base_amount: Option<Decimal>,
    #[serde(default)]
    pub foreign_amount: Option<Decimal>,
}
impl TransactionCreate {
    pub fn validate(&self) -> Result<RequestedAmount> {
        validate_currency_code("base_currency", &self.base_currency)?;
        validate_currency_code("quote_currency", &self.quote_currency)?;
        let requested = RequestedAmount::from_pair(self.base_amount, self.foreign_amount)?;
        match requested {
            RequestedAmount::Base(amount) => check_amount("base_amount", amount)?,
            RequestedAmount::Foreign(amount) => check_amount("foreign_amount", amount)?,
        }
        Ok(requested)
    }
    /// Key of the rate this transaction is priced with: the rate recorded for the
    /// timestamp's date.
    pub fn rate_key(&self) -> RateKey {
        RateKey {
            rate_date: self.timestamp.date(),
            base_currency: self.base_currency.clone(),
            quote_currency: self.quote_currency.clone(),
            side: self.side,
        }
    }
}

/// A conversion result ready to be persisted.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(build_fn(validate = "Self::validate", error = "AppError"))]
pub struct NewTransaction {
    pub timestamp: NaiveDateTime,
    pub rate_used_id: i64,
    pub base_amount: Decimal,
    pub foreign_amount: Decimal,
    pub rounding_adjustment: Decimal,
}
impl NewTransaction {
    pub fn builder() -> NewTransactionBuilder {
        NewTransactionBuilder::default()
    }
}
impl NewTransactionBuilder {
    pub fn conversion(&mut self, conversion: Conversion) -> &mut Self {
        self.base_amount(conversion.base_amount)
            .foreign_amount(conversion.foreign_amount)
            .rounding_adjustment(conversion.rounding_adjustment)
    }
    fn validate(&self) -> Result<()> {
        if let Some(amount) = self.base_amount {
            if amount <= Decimal::ZERO {
                return Err(AppError::InvalidAmount(format!(
                    "base_amount must be positive, got {amount}"
                )));
            }
        }
        if let Some(amount) = self.foreign_amount {
            if amount <= Decimal::ZERO {
                return Err(AppError::InvalidAmount(format!(
                    "foreign_amount must be positive, got {amount}"
                )));
            }
        }
        Ok(())
    }
}
impl From<UninitializedFieldError> for AppError {
    fn from(value: UninitializedFieldError) -> Self {
        AppError::Validation(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub timestamp: NaiveDateTime,
    pub rate_used_id: i64,
    pub base_amount: Decimal,
    pub foreign_amount: Decimal,
    pub rounding_adjustment: Decimal,
}

/// A transaction together with the rate it was priced with, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub base_currency: String,
    pub quote_currency: String,
    pub side: Side,
    pub effective_rate: Decimal,
    pub fee_amount: Decimal,
}
impl TransactionView {
    pub fn new(transaction: Transaction, rate: &Rate) -> Self {
        Self {
            transaction,
            base_currency: rate.base_currency.iso.clone(),
            quote_currency: rate.quote_currency.iso.clone(),
            side: rate.side,
            effective_rate: rate.rate,
            fee_amount: Decimal::ZERO,
        }
    }
}
