use crate::models::ApiResponse;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct ExchangeRates {
    pub eth_usd: f64,
}

/// Serves the cached ETH/USD rate. Always succeeds: before the first
/// upstream fetch lands this is the fallback constant, never an error.
pub async fn get_exchange_rates(State(state): State<AppState>) -> Json<ApiResponse<ExchangeRates>> {
    let price = state.price.current_price().await;
    Json(ApiResponse::ok(ExchangeRates {
        eth_usd: price.eth_usd,
    }))
}
