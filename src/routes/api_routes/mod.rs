use crate::models::AppState;
use axum::routing::get;
use axum::Router;

mod currency;
mod rate;
mod transaction;

pub fn init(state: AppState) -> Router {
    Router::new()
        .route("/currencies", get(currency::currencies))
        .route("/currencies/{iso}", get(currency::currency))
        .route("/rates", get(rate::rates).post(rate::record_rate))
        .route(
            "/transaction",
            get(transaction::transactions).post(transaction::create_transaction),
        )
        .route("/transaction/{id}", get(transaction::transaction))
        .with_state(state)
}
