use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::{check_value, serialize_iso, validate_currency_code, Currency};
use crate::{AppError, Result};

/// Fractional digits a rate is stored with.
pub const RATE_SCALE: u32 = 4;

/// Direction of trade a rate applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}
impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}
impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
impl FromStr for Side {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(AppError::Validation(format!(
                "side must be BUY or SELL, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rate {
    pub id: i64,
    pub rate_date: NaiveDate,
    #[serde(serialize_with = "serialize_iso")]
    pub base_currency: Currency,
    #[serde(serialize_with = "serialize_iso")]
    pub quote_currency: Currency,
    pub side: Side,
    pub rate: Decimal,
}
impl Rate {
    pub fn key(&self) -> RateKey {
        RateKey {
            rate_date: self.rate_date,
            base_currency: self.base_currency.iso.clone(),
            quote_currency: self.quote_currency.iso.clone(),
            side: self.side,
        }
    }
}

/// The tuple a rate is unique by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateKey {
    pub rate_date: NaiveDate,
    pub base_currency: String,
    pub quote_currency: String,
    pub side: Side,
}
impl Display for RateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} {} on {}",
            self.base_currency, self.quote_currency, self.side, self.rate_date
        )
    }
}

/// Body of `POST /rates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateCreate {
    pub rate_date: NaiveDate,
    pub base_currency: String,
    pub quote_currency: String,
    pub side: Side,
    pub rate: Decimal,
}
impl RateCreate {
    pub fn validate(&self) -> Result<()> {
        validate_currency_code("base_currency", &self.base_currency)?;
        validate_currency_code("quote_currency", &self.quote_currency)?;
        check_value("rate", self.rate).map_err(AppError::InvalidRate)
    }
    pub fn key(&self) -> RateKey {
        RateKey {
            rate_date: self.rate_date,
            base_currency: self.base_currency.clone(),
            quote_currency: self.quote_currency.clone(),
            side: self.side,
        }
    }
}

/// A rate ready to be written: currencies resolved, value coerced to [`RATE_SCALE`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewRate {
    pub rate_date: NaiveDate,
    pub base_currency: Currency,
    pub quote_currency: Currency,
    pub side: Side,
    pub rate: Decimal,
}
impl NewRate {
    pub fn new(
        rate_date: NaiveDate,
        base_currency: Currency,
        quote_currency: Currency,
        side: Side,
        rate: Decimal,
    ) -> Result<Self> {
        let coerced =
            rate.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero);
        if coerced <= Decimal::ZERO {
            return Err(AppError::InvalidRate(format!(
                "rate must be greater than 0 at {RATE_SCALE} decimal places, got {rate}"
            )));
        }
        Ok(Self {
            rate_date,
            base_currency,
            quote_currency,
            side,
            rate: coerced,
        })
    }
    pub fn key(&self) -> RateKey {
        RateKey {
            rate_date: self.rate_date,
            base_currency: self.base_currency.iso.clone(),
            quote_currency: self.quote_currency.iso.clone(),
            side: self.side,
        }
    }
}
