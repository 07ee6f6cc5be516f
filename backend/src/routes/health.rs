use crate::services::price_updater::PriceStats;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
    /// Price updater diagnostics, handy when the exchange rate looks stale.
    pub price_updater: PriceStats,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        service: "EthosRadar",
        price_updater: state.price.stats().await,
    })
}
