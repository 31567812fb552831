use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as RespJson, Response},
};
use thiserror::Error;

use crate::model::patient::PatientValidationError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Database error")]
    Store(#[from] StoreError),

    #[error("Internal server error")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::EmailTaken => StatusCode::CONFLICT,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PatientValidationError> for ApiError {
    fn from(e: PatientValidationError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Store(e) => tracing::error!("❌ Store error: {}", e),
            ApiError::Internal(e) => tracing::error!("❌ Internal error: {}", e),
            other => tracing::warn!("⚠️ {}", other),
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), RespJson(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_details_are_not_leaked() {
        let err = ApiError::from(StoreError::Corrupt("user 1: unknown role".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Database error");
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ApiError::from(PatientValidationError {
            problems: vec!["age is required".into()],
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Patient validation failed: age is required");
    }
}
