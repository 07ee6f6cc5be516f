use crate::models::{ApiResponse, EthosUser};
use crate::services::user_service::{self, SearchMode, UserServiceError};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default, rename = "searchType")]
    pub search_type: SearchMode,
}

pub async fn search_user(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<ApiResponse<EthosUser>>, (StatusCode, Json<ApiResponse<EthosUser>>)> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err("Query must not be empty")),
        ));
    }

    match user_service::search_user(&state.ethos, query, req.search_type).await {
        Ok(user) => Ok(Json(ApiResponse::ok(user))),
        Err(UserServiceError::NotFound(msg)) => {
            Err((StatusCode::NOT_FOUND, Json(ApiResponse::err(msg))))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::err(e.to_string())),
        )),
    }
}
