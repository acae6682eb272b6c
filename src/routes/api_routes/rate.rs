use crate::models::{AppState, Rate, RateCreate};
use crate::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use http::StatusCode;

pub(super) async fn rates(State(state): State<AppState>) -> Result<Json<Vec<Rate>>> {
    let rates = state.rate_service.get_all().await?;
    Ok(Json(rates))
}
pub(super) async fn record_rate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RateCreate>, JsonRejection>,
) -> Result<StatusCode> {
    let Json(input) = payload?;
    state.rate_service.record(input).await?;
    Ok(StatusCode::OK)
}
