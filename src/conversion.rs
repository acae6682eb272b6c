//! Amount conversion against a recorded rate.
//!
//! Foreign amounts are truncated toward zero to [`FOREIGN_AMOUNT_SCALE`] fractional
//! digits. The residual is returned as `rounding_adjustment` so that
//! `foreign_amount + rounding_adjustment` always equals the computed amount.
//! The side of the rate only selects which rate is used; the formula is the same
//! for BUY and SELL.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Rate;
use crate::{AppError, Result};

/// Fractional digits kept in a stored foreign amount.
pub const FOREIGN_AMOUNT_SCALE: u32 = 2;

/// The one amount a caller supplies; the other is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedAmount {
    Base(Decimal),
    Foreign(Decimal),
}

impl RequestedAmount {
    pub fn from_pair(base: Option<Decimal>, foreign: Option<Decimal>) -> Result<Self> {
        match (base, foreign) {
            (Some(base), None) => Ok(Self::Base(base)),
            (None, Some(foreign)) => Ok(Self::Foreign(foreign)),
            _ => Err(AppError::AmbiguousAmount),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub base_amount: Decimal,
    pub foreign_amount: Decimal,
    pub rounding_adjustment: Decimal,
}

pub fn convert(rate: &Rate, amount: RequestedAmount) -> Result<Conversion> {
    if rate.rate <= Decimal::ZERO {
        return Err(AppError::InvalidRate(rate.rate.to_string()));
    }
    let (base_amount, raw_foreign_amount) = match amount {
        RequestedAmount::Foreign(foreign) => {
            let base = foreign.checked_div(rate.rate).ok_or_else(|| {
                AppError::InvalidAmount(format!("{foreign} / {} is out of range", rate.rate))
            })?;
            (base, foreign)
        }
        RequestedAmount::Base(base) => {
            let foreign = base.checked_mul(rate.rate).ok_or_else(|| {
                AppError::InvalidAmount(format!("{base} * {} is out of range", rate.rate))
            })?;
            (base, foreign)
        }
    };
    let foreign_amount = truncate(raw_foreign_amount);
    if base_amount <= Decimal::ZERO {
        return Err(AppError::InvalidAmount(format!(
            "base amount {base_amount} must be positive"
        )));
    }
    if foreign_amount <= Decimal::ZERO {
        return Err(AppError::InvalidAmount(format!(
            "foreign amount {raw_foreign_amount} truncates to {foreign_amount}"
        )));
    }
    Ok(Conversion {
        base_amount,
        foreign_amount,
        rounding_adjustment: raw_foreign_amount - foreign_amount,
    })
}

fn truncate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(FOREIGN_AMOUNT_SCALE, RoundingStrategy::ToZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{check_value, Currency, Side, MAX_DECIMAL_PLACES, RATE_SCALE};
    use anyhow::Result;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn rate(value: Decimal, side: Side) -> Rate {
        Rate {
            id: 1,
            rate_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
            base_currency: Currency {
                id: 1,
                iso: "PHP".to_string(),
            },
            quote_currency: Currency {
                id: 2,
                iso: "USD".to_string(),
            },
            side,
            rate: value,
        }
    }

    #[test]
    fn test_foreign_amount_is_truncated() -> Result<()> {
        let c = convert(&rate(dec!(1.12), Side::Sell), RequestedAmount::Foreign(dec!(4.1234)))?;
        assert_eq!(c.foreign_amount, dec!(4.12));
        assert_eq!(c.rounding_adjustment, dec!(0.0034));
        assert_eq!(c.base_amount, dec!(4.1234) / dec!(1.12));
        assert!(c.base_amount.scale() > 4);
        Ok(())
    }
    #[test]
    fn test_base_amount_reconciles() -> Result<()> {
        let r = rate(dec!(2.1357), Side::Buy);
        for base in [dec!(1), dec!(0.5), dec!(3.3333333), dec!(1234567.891), dec!(0.4683)] {
            let c = convert(&r, RequestedAmount::Base(base))?;
            let exact = base * r.rate;
            assert_eq!(c.base_amount, base);
            assert!(c.foreign_amount <= exact);
            assert!(c.rounding_adjustment >= Decimal::ZERO);
            assert!(c.rounding_adjustment < dec!(0.01));
            assert_eq!(c.foreign_amount + c.rounding_adjustment, exact);
            assert!(c.foreign_amount.scale() <= FOREIGN_AMOUNT_SCALE);
        }
        Ok(())
    }

    /// Positive rates with at most four fractional digits.
    fn arb_rate() -> impl Strategy<Value = Decimal> {
        (1i64..=100_000_000, 0u32..=RATE_SCALE).prop_map(|(m, s)| Decimal::new(m, s))
    }

    /// Positive amounts that pass the request precision checks.
    fn arb_amount() -> impl Strategy<Value = Decimal> {
        (1i64..=1_000_000_000_000, 0u32..=MAX_DECIMAL_PLACES)
            .prop_map(|(m, s)| Decimal::new(m, s))
    }

    proptest! {
        #[test]
        fn prop_base_amount_reconciles(r in arb_rate(), base in arb_amount()) {
            prop_assert!(check_value("base_amount", base).is_ok());
            let exact = base * r;
            match convert(&rate(r, Side::Sell), RequestedAmount::Base(base)) {
                Ok(c) => {
                    prop_assert_eq!(c.base_amount, base);
                    prop_assert_eq!(c.foreign_amount + c.rounding_adjustment, exact);
                    prop_assert!(c.foreign_amount > Decimal::ZERO);
                    prop_assert!(c.foreign_amount.scale() <= FOREIGN_AMOUNT_SCALE);
                    prop_assert!(c.rounding_adjustment >= Decimal::ZERO);
                    prop_assert!(c.rounding_adjustment < dec!(0.01));
                }
                Err(AppError::InvalidAmount(_)) => prop_assert!(exact < dec!(0.01)),
                Err(e) => prop_assert!(false, "unexpected error {e:?}"),
            }
        }

        #[test]
        fn prop_foreign_amount_reconciles(r in arb_rate(), foreign in arb_amount()) {
            prop_assert!(check_value("foreign_amount", foreign).is_ok());
            match convert(&rate(r, Side::Buy), RequestedAmount::Foreign(foreign)) {
                Ok(c) => {
                    prop_assert_eq!(c.foreign_amount + c.rounding_adjustment, foreign);
                    prop_assert!(c.base_amount > Decimal::ZERO);
                    prop_assert!(c.foreign_amount > Decimal::ZERO);
                    prop_assert!(c.foreign_amount.scale() <= FOREIGN_AMOUNT_SCALE);
                    prop_assert!(c.rounding_adjustment >= Decimal::ZERO);
                    prop_assert!(c.rounding_adjustment < dec!(0.01));
                }
                Err(AppError::InvalidAmount(_)) => prop_assert!(foreign < dec!(0.01)),
                Err(e) => prop_assert!(false, "unexpected error {e:?}"),
            }
        }
    }

    #[test]
    fn test_never_rounds_up() -> Result<()> {
        let c = convert(&rate(dec!(1), Side::Sell), RequestedAmount::Base(dec!(9.999)))?;
        assert_eq!(c.foreign_amount, dec!(9.99));
        assert_eq!(c.rounding_adjustment, dec!(0.009));
        Ok(())
    }
    #[test]
    fn test_side_does_not_change_formula() -> Result<()> {
        let amount = RequestedAmount::Base(dec!(10));
        let buy = convert(&rate(dec!(1.5), Side::Buy), amount)?;
        let sell = convert(&rate(dec!(1.5), Side::Sell), amount)?;
        assert_eq!(buy, sell);
        Ok(())
    }
    #[test]
    fn test_amount_truncated_to_zero_is_rejected() {
        let result = convert(&rate(dec!(0.5), Side::Sell), RequestedAmount::Base(dec!(0.01)));
        assert!(matches!(result, Err(AppError::InvalidAmount(_))));
        let result = convert(&rate(dec!(1), Side::Sell), RequestedAmount::Foreign(dec!(0.009)));
        assert!(matches!(result, Err(AppError::InvalidAmount(_))));
    }
    #[test]
    fn test_non_positive_rate_is_rejected() {
        let result = convert(&rate(Decimal::ZERO, Side::Sell), RequestedAmount::Base(dec!(1)));
        assert!(matches!(result, Err(AppError::InvalidRate(_))));
    }
    #[test]
    fn test_exactly_one_amount_required() {
        assert!(matches!(
            RequestedAmount::from_pair(Some(dec!(5)), Some(dec!(10))),
            Err(AppError::AmbiguousAmount)
        ));
        assert!(matches!(
            RequestedAmount::from_pair(None, None),
            Err(AppError::AmbiguousAmount)
        ));
        assert_eq!(
            RequestedAmount::from_pair(None, Some(dec!(10))).ok(),
            Some(RequestedAmount::Foreign(dec!(10)))
        );
    }
}
