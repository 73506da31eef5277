use axum::{Router, response::Json as ResponseJson, routing::get};
use utils::response::ApiResponse;

use crate::AppState;

/// GET /api/health
pub async fn health() -> ResponseJson<ApiResponse<String>> {
    ResponseJson(ApiResponse::success("ok".to_string()))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().route("/health", get(health))
}
