use crate::models::{transaction_id_date, AppState, TransactionCreate, TransactionView};
use crate::{AppError, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

pub(super) async fn transactions(
    State(state): State<AppState>,
) -> Result<Json<Vec<TransactionView>>> {
    let transactions = state.transaction_service.list().await?;
    Ok(Json(transactions))
}
pub(super) async fn transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionView>> {
    let not_found = || AppError::NotFound(format!("transaction '{id}'"));
    if transaction_id_date(&id).is_none() {
        return Err(not_found());
    }
    match state.transaction_service.get(&id).await? {
        Some(transaction) => Ok(Json(transaction)),
        None => Err(not_found()),
    }
}
pub(super) async fn create_transaction(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TransactionCreate>, JsonRejection>,
) -> Result<Json<TransactionView>> {
    let Json(input) = payload?;
    let transaction = state.transaction_service.create(input).await?;
    Ok(Json(transaction))
}
