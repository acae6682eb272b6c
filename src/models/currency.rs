use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;

use crate::{AppError, Result};

static ISO_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{3}$").expect("currency code pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct Currency {
    pub id: i64,
    pub iso: String,
}

/// Checks that `code` looks like an ISO-4217 code: three uppercase latin letters.
pub fn validate_currency_code(field: &str, code: &str) -> Result<()> {
    if ISO_CODE.is_match(code) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{field} must be a 3-letter uppercase currency code, got '{code}'"
        )))
    }
}

/// Serializes a referenced currency as its code.
pub(crate) fn serialize_iso<S: Serializer>(
    currency: &Currency,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&currency.iso)
}
