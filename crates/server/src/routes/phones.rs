//! Routes for franchise phone management.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::{
    franchise::Franchise,
    franchise_phone::{CreateFranchisePhone, FranchisePhone},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Body for POST /api/franchises/{franchise_id}/phones; the franchise comes
/// from the path.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreatePhoneRequest {
    pub phone_number: String,
    pub is_active: Option<bool>,
    pub order_number: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SetPhoneActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SetPhoneOrderRequest {
    pub order_number: i64,
}

/// GET /api/franchises/{franchise_id}/phones
pub async fn list_franchise_phones(
    State(state): State<AppState>,
    Path(franchise_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<FranchisePhone>>>, ApiError> {
    let phones = FranchisePhone::find_by_franchise_id(&state.db().pool, franchise_id).await?;
    Ok(ResponseJson(ApiResponse::success(phones)))
}

/// POST /api/franchises/{franchise_id}/phones
pub async fn create_franchise_phone(
    State(state): State<AppState>,
    Path(franchise_id): Path<Uuid>,
    axum::Json(payload): axum::Json<CreatePhoneRequest>,
) -> Result<ResponseJson<ApiResponse<FranchisePhone>>, ApiError> {
    Franchise::find_by_id(&state.db().pool, franchise_id)
        .await?
        .ok_or(ApiError::NotFound("franchise"))?;

    let phone = FranchisePhone::create(
        &state.db().pool,
        &CreateFranchisePhone {
            franchise_id,
            phone_number: payload.phone_number,
            is_active: payload.is_active,
            order_number: payload.order_number,
        },
        Uuid::new_v4(),
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(phone)))
}

/// PUT /api/phones/{phone_id}/active
pub async fn set_phone_active(
    State(state): State<AppState>,
    Path(phone_id): Path<Uuid>,
    axum::Json(payload): axum::Json<SetPhoneActiveRequest>,
) -> Result<ResponseJson<ApiResponse<FranchisePhone>>, ApiError> {
    let phone = FranchisePhone::set_active(&state.db().pool, phone_id, payload.is_active)
        .await?
        .ok_or(ApiError::NotFound("franchise phone"))?;
    Ok(ResponseJson(ApiResponse::success(phone)))
}

/// PUT /api/phones/{phone_id}/order
pub async fn set_phone_order(
    State(state): State<AppState>,
    Path(phone_id): Path<Uuid>,
    axum::Json(payload): axum::Json<SetPhoneOrderRequest>,
) -> Result<ResponseJson<ApiResponse<FranchisePhone>>, ApiError> {
    let phone = FranchisePhone::set_order_number(&state.db().pool, phone_id, payload.order_number)
        .await?
        .ok_or(ApiError::NotFound("franchise phone"))?;
    Ok(ResponseJson(ApiResponse::success(phone)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .nest(
            "/franchises/{franchise_id}/phones",
            Router::new().route("/", get(list_franchise_phones).post(create_franchise_phone)),
        )
        .nest(
            "/phones/{phone_id}",
            Router::new()
                .route("/active", put(set_phone_active))
                .route("/order", put(set_phone_order)),
        )
}
