//! Routes for the lead distribution ledger: assignment and readback.

use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::NaiveDate;
use db::models::lead_distribution::{
    FranchiseDailyTotal, LeadDistribution, LeadDistributionWithContext,
};
use serde::{Deserialize, Serialize};
use services::services::AssignLeads;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ListDistributionsQuery {
    pub date: NaiveDate,
    pub server_id: Option<Uuid>,
    pub franchise_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DailySummaryQuery {
    pub date: NaiveDate,
}

/// POST /api/distributions
/// Assign a batch of leads to one of the franchise's active phones
pub async fn create_distribution(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<AssignLeads>,
) -> Result<ResponseJson<ApiResponse<LeadDistribution>>, ApiError> {
    let distribution = state.distribution_service().assign_leads(&payload).await?;
    Ok(ResponseJson(ApiResponse::success(distribution)))
}

/// GET /api/distributions?date=YYYY-MM-DD&server_id=&franchise_id=
/// Ledger rows for a date with display names, newest first
pub async fn list_distributions(
    State(state): State<AppState>,
    Query(query): Query<ListDistributionsQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<LeadDistributionWithContext>>>, ApiError> {
    let distributions = state
        .distribution_service()
        .distributions_for_date(query.date, query.server_id, query.franchise_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(distributions)))
}

/// GET /api/distributions/summary?date=YYYY-MM-DD
/// Per-franchise totals for a date
pub async fn get_daily_summary(
    State(state): State<AppState>,
    Query(query): Query<DailySummaryQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<FranchiseDailyTotal>>>, ApiError> {
    let summary = state.distribution_service().daily_summary(query.date).await?;
    Ok(ResponseJson(ApiResponse::success(summary)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().nest(
        "/distributions",
        Router::new()
            .route("/", post(create_distribution).get(list_distributions))
            .route("/summary", get(get_daily_summary)),
    )
}
