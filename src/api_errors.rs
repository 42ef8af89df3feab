use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::errors::DashError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.status();
        (code, Json(ErrBody { error: self.to_string() })).into_response()
    }
}

impl From<DashError> for AppError {
    fn from(err: DashError) -> Self {
        let message = err.display_chain();
        match err {
            DashError::Validation { .. } => AppError::BadRequest(message),
            DashError::NotFound { .. } => AppError::NotFound(message),
            DashError::Inference { .. } => AppError::Unprocessable(message),
            DashError::Config { .. }
            | DashError::SchemaUnavailable { .. }
            | DashError::Dataset { .. }
            | DashError::Serialization { .. }
            | DashError::Io { .. } => AppError::Unavailable(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_families_to_status_codes() {
        let cases = [
            (DashError::validation("source", "unknown city"), StatusCode::BAD_REQUEST),
            (DashError::inference("backend failed"), StatusCode::UNPROCESSABLE_ENTITY),
            (DashError::config("model missing"), StatusCode::SERVICE_UNAVAILABLE),
            (DashError::not_found("page", "nope"), StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }
}
