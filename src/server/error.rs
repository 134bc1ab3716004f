//! Server error type with HTTP status code mapping
//!
//! Every failure leaves the server as `{"status_code": <int>, "error": <string>}`.

use crate::utils::error::FacetError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http_body_util::LengthLimitError;
use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::error::Error as StdError;
use thiserror::Error;

/// JSON error envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
}

/// Errors returned by request handlers
#[derive(Error, Debug)]
pub enum ApiError {
    /// Aggregation failed on the request document
    #[error("unable to parse facets json: {0}")]
    Facet(#[from] FacetError),

    /// Unexpected fault outside the aggregation domain
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Facet(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Facet(FacetError::Io(err)) if is_body_too_large(err) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ApiError::Facet(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!("Request failed ({}): {}", status.as_u16(), message);
        } else {
            warn!("Request rejected ({}): {}", status.as_u16(), message);
        }

        error_response(status, message)
    }
}

/// Build the JSON error envelope for any status
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        status_code: status.as_u16(),
        error: message.into(),
    };
    (status, Json(body)).into_response()
}

/// Turn a caught handler panic into a 500 response
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown error".to_string()
    };

    error!("Panic recovered: {}", message);

    error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// True if the I/O error was caused by the request body size limit
fn is_body_too_large(err: &std::io::Error) -> bool {
    let mut source = err
        .get_ref()
        .map(|inner| inner as &(dyn StdError + 'static));

    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return true;
        }
        source = current.source();
    }

    false
}
