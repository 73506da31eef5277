//! Routes for franchises and the selection previews built on them.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use chrono::NaiveDate;
use db::models::franchise::{CreateFranchise, Franchise};
use serde::{Deserialize, Serialize};
use services::services::{PhoneSelectionStrategy, SelectedPhone};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct NextFranchiseQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct NextPhoneQuery {
    pub strategy: Option<PhoneSelectionStrategy>,
}

/// GET /api/franchises
pub async fn list_franchises(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Franchise>>>, ApiError> {
    let franchises = Franchise::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(franchises)))
}

/// POST /api/franchises
pub async fn create_franchise(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateFranchise>,
) -> Result<ResponseJson<ApiResponse<Franchise>>, ApiError> {
    let franchise = Franchise::create(&state.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(franchise)))
}

/// GET /api/franchises/{franchise_id}
pub async fn get_franchise(
    State(state): State<AppState>,
    Path(franchise_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Franchise>>, ApiError> {
    let franchise = Franchise::find_by_id(&state.db().pool, franchise_id)
        .await?
        .ok_or(ApiError::NotFound("franchise"))?;
    Ok(ResponseJson(ApiResponse::success(franchise)))
}

/// GET /api/franchises/next?date=YYYY-MM-DD
/// Least-loaded franchise among those with an active phone
pub async fn get_next_franchise(
    State(state): State<AppState>,
    Query(query): Query<NextFranchiseQuery>,
) -> Result<ResponseJson<ApiResponse<Franchise>>, ApiError> {
    let franchise = state.distribution_service().next_franchise(query.date).await?;
    Ok(ResponseJson(ApiResponse::success(franchise)))
}

/// GET /api/franchises/{franchise_id}/next-phone?strategy=
/// Preview which phone would receive the next batch, without writing
pub async fn get_next_phone(
    State(state): State<AppState>,
    Path(franchise_id): Path<Uuid>,
    Query(query): Query<NextPhoneQuery>,
) -> Result<ResponseJson<ApiResponse<SelectedPhone>>, ApiError> {
    let phone = state
        .distribution_service()
        .next_phone(franchise_id, query.strategy)
        .await?;
    Ok(ResponseJson(ApiResponse::success(phone)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().nest(
        "/franchises",
        Router::new()
            .route("/", get(list_franchises).post(create_franchise))
            .route("/next", get(get_next_franchise))
            .route("/{franchise_id}", get(get_franchise))
            .route("/{franchise_id}/next-phone", get(get_next_phone)),
    )
}
