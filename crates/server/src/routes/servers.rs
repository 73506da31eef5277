//! Routes for lead-source servers.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::server::{CreateServer, Server};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// GET /api/servers
pub async fn list_servers(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Server>>>, ApiError> {
    let servers = Server::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(servers)))
}

/// POST /api/servers
pub async fn create_server(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateServer>,
) -> Result<ResponseJson<ApiResponse<Server>>, ApiError> {
    let server = Server::create(&state.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(server)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().route("/servers", get(list_servers).post(create_server))
}
