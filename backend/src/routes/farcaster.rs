use crate::models::{ApiResponse, EthosUser};
use crate::services::user_service::{self, UserServiceError};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarcasterSearchRequest {
    pub farcaster_username: String,
}

pub async fn search_farcaster_user(
    State(state): State<AppState>,
    Json(req): Json<FarcasterSearchRequest>,
) -> Result<Json<ApiResponse<EthosUser>>, (StatusCode, Json<ApiResponse<EthosUser>>)> {
    let username = req.farcaster_username.trim();
    if username.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err("farcasterUsername must not be empty")),
        ));
    }

    match user_service::search_farcaster_user(&state.ethos, username).await {
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
