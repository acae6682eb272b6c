use std::collections::{BTreeSet, HashMap};

use sqlx::AnyPool;

use crate::models::Currency;
use crate::{AppError, Result};

#[derive(Clone)]
pub struct CurrencyStorage {
    pool: AnyPool,
}
impl CurrencyStorage {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
    pub async fn get_all(&self) -> Result<Vec<Currency>> {
        let query = "SELECT id, iso FROM currencies ORDER BY iso";
        let result = sqlx::query_as::<_, Currency>(query)
            .fetch_all(&self.pool)
            .await?;
        Ok(result)
    }
    pub async fn get_by_code(&self, iso: &str) -> Result<Option<Currency>> {
        let query = "SELECT id, iso FROM currencies WHERE iso = $1";
        let result = sqlx::query_as::<_, Currency>(query)
            .bind(iso)
            .fetch_optional(&self.pool)
            .await?;
        Ok(result)
    }
    /// Resolves every code in `codes` or fails with [`AppError::CurrencyNotFound`]
    /// naming all codes that are missing.
    pub async fn resolve(&self, codes: &[&str]) -> Result<HashMap<String, Currency>> {
        let wanted = codes.iter().copied().collect::<BTreeSet<_>>();
        if wanted.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = (1..=wanted.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!("SELECT id, iso FROM currencies WHERE iso IN ({placeholders})");
        let mut query = sqlx::query_as::<_, Currency>(&query);
        for code in &wanted {
            query = query.bind(*code);
        }
        let found = query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|c| (c.iso.clone(), c))
            .collect::<HashMap<_, _>>();
        let missing = wanted
            .into_iter()
            .filter(|code| !found.contains_key(*code))
            .map(String::from)
            .collect::<Vec<_>>();
        if missing.is_empty() {
            Ok(found)
        } else {
            Err(AppError::CurrencyNotFound(missing))
        }
    }
}
