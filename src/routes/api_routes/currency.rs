use crate::models::{AppState, Currency};
use crate::{AppError, Result};
use axum::extract::{Path, State};
use axum::Json;

pub(super) async fn currencies(State(state): State<AppState>) -> Result<Json<Vec<Currency>>> {
    let currencies = state.currency_storage.get_all().await?;
    Ok(Json(currencies))
}
pub(super) async fn currency(
    State(state): State<AppState>,
    Path(iso): Path<String>,
) -> Result<Json<Currency>> {
    match state.currency_storage.get_by_code(&iso).await? {
        Some(currency) => Ok(Json(currency)),
        None => Err(AppError::NotFound(format!("currency '{iso}'"))),
    }
}
