use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use services::services::DistributionError;
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Distribution(#[from] DistributionError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Distribution(err) => match err {
                DistributionError::InvalidFranchiseId | DistributionError::MissingFields(_) => {
                    StatusCode::BAD_REQUEST
                }
                DistributionError::FranchiseNotFound(_) | DistributionError::PhoneNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                DistributionError::NoActivePhones(_) | DistributionError::NoEligibleFranchise => {
                    StatusCode::CONFLICT
                }
                DistributionError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = %status, "request failed: {}", self);
        }
        let body = ResponseJson(ApiResponse::<()>::error(self.to_string()));
        (status, body).into_response()
    }
}
