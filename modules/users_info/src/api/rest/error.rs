use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::rest::dto::{ErrorBody, ErrorListBody};
use crate::domain::error::DomainError;

/// Transport-level failure of a users endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("User not found.")]
    NotFound,

    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Email already exists")]
    Conflict,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::UserNotFound { .. } => Self::NotFound,
            DomainError::EmailAlreadyExists { .. } => Self::Conflict,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(error = %self, status = status.as_u16(), "request failed");

        match self {
            Self::Validation(errors) => (status, Json(ErrorListBody { errors })).into_response(),
            other => (
                status,
                Json(ErrorBody {
                    error: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}
