use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{lifecycle::TransitionError, token::TokenError};

/// Stable reason codes surfaced in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorReason {
    BadRequest,
    Conflict,
    NotFound,
    Unauthorized,
    Forbidden,
    Unknown,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("FORBIDDEN")]
    Forbidden,

    #[error("UNKNOWN_ERROR")]
    Db(#[from] sqlx::Error),

    #[error("UNKNOWN_ERROR")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn reason(&self) -> ErrorReason {
        match self {
            AppError::NotFound(_) => ErrorReason::NotFound,
            AppError::Conflict(_) => ErrorReason::Conflict,
            AppError::BadRequest(_) => ErrorReason::BadRequest,
            AppError::Unauthorized(_) => ErrorReason::Unauthorized,
            AppError::Forbidden => ErrorReason::Forbidden,
            AppError::Db(_) | AppError::Internal(_) => ErrorReason::Unknown,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Db(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Unauthorized(err.code())
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        AppError::Conflict(err.to_string())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub reason: ErrorReason,
    pub message: String,
    pub status_code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if matches!(self, AppError::Db(_) | AppError::Internal(_)) {
            tracing::error!(error = ?self, "unexpected failure");
        }
        let body = ErrorBody {
            reason: self.reason(),
            message: self.to_string(),
            status_code: status.as_u16(),
        };
        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_matches_status() {
        let err = AppError::NotFound("ORDER_NOT_FOUND");
        assert_eq!(err.reason(), ErrorReason::NotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = AppError::Conflict("ORDER_ALREADY_FINISHED".into());
        assert_eq!(err.reason(), ErrorReason::Conflict);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn unexpected_failures_map_to_unknown() {
        let err = AppError::Internal(anyhow::anyhow!("boom"));
        assert_eq!(err.reason(), ErrorReason::Unknown);
        assert_eq!(err.to_string(), "UNKNOWN_ERROR");
    }
}
