use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::domain::error::DomainError;

/// Map domain errors to HTTP status codes
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::MissingFields { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::AlreadyExists { .. } => StatusCode::CONFLICT,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::NotModified { .. } => StatusCode::NOT_MODIFIED,
        DomainError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error responses carry the status only; the detail goes to the log.
impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }
        status.into_response()
    }
}
