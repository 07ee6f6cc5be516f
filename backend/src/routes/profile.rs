use crate::models::{ApiResponse, EnhancedProfile};
use crate::services::user_service::{self, UserServiceError};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::{http::StatusCode, Json};

/// GET /api/enhanced-profile/:userkey
///
/// The userkey arrives percent-encoded (it usually carries `:`); axum's
/// path extractor decodes it before we see it.
pub async fn enhanced_profile(
    State(state): State<AppState>,
    Path(userkey): Path<String>,
) -> Result<Json<ApiResponse<EnhancedProfile>>, (StatusCode, Json<ApiResponse<EnhancedProfile>>)> {
    let userkey = userkey.trim();
    if userkey.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err("Missing userkey parameter")),
        ));
    }

    match user_service::enhanced_profile(&state.ethos, userkey).await {
        Ok(profile) => Ok(Json(ApiResponse::ok(profile))),
        Err(UserServiceError::NotFound(msg)) => {
            Err((StatusCode::NOT_FOUND, Json(ApiResponse::err(msg))))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::err(e.to_string())),
        )),
    }
}
