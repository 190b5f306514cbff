use axum::{
    Json,
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
};
use buddy_core::wire::ErrorBody;
use http::StatusCode;
use thiserror::Error;

use crate::service::database::DatabaseError;

/// Any failure a handler reports. Rendered as `{"error", "message"}` JSON.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Database(err) => err.status(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status.is_server_error() {
            tracing::error!("Request failed: {self}");
            ErrorBody::with_message("Internal server error", self.to_string())
        } else {
            ErrorBody::with_message(
                self.to_string(),
                status.canonical_reason().unwrap_or("Request failed"),
            )
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(DatabaseError::StaleRevision {
                stored: 3,
                incoming: 2
            })
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(DatabaseError::EventNotFound).status(),
            StatusCode::NOT_FOUND
        );
    }
}
