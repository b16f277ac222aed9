use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use nisab_core::prices::{FailureView, ResolutionError};
use nisab_market_data::MarketDataError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{}", .0.error)]
    Unavailable(FailureView),
    #[error("Not Found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::Unavailable(failure) => {
                // Resolution failures keep their structured shape.
                return (StatusCode::SERVICE_UNAVAILABLE, Json(failure)).into_response();
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason),
            ApiError::Unauthorized(reason) => (StatusCode::UNAUTHORIZED, reason),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<FailureView> for ApiError {
    fn from(failure: FailureView) -> Self {
        ApiError::Unavailable(failure)
    }
}

impl From<ResolutionError> for ApiError {
    fn from(err: ResolutionError) -> Self {
        ApiError::Unavailable(FailureView::from(err))
    }
}

impl From<MarketDataError> for ApiError {
    fn from(err: MarketDataError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
