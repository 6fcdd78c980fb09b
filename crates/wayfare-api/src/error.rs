//! HTTP error mapping.
//!
//! Every failure leaves the server as `{"success": false, "message": ...}`.
//! Messages for 5xx errors never carry internal detail; the detail goes to
//! the log instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use wayfare_core::Error;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unavailable(String),
    Internal(Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) | Error::Duplicate(msg) => ApiError::BadRequest(msg),
            Error::Unavailable(reason) => ApiError::Unavailable(reason),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) => msg,
            ApiError::Unavailable(reason) => format!("Service unavailable: {}", reason),
            ApiError::Internal(err) => {
                error!(subsystem = "api", error = %err, "Request failed");
                "Server error".to_string()
            }
        };

        let body = Json(serde_json::json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}
