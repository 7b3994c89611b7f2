//! Error handling for the HTTP surface.
//!
//! Handlers return [`AppResult`]; every variant maps to a status code and a
//! JSON body of the form `{"error": "...", "status": 404}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use roic_traits::RoicError;
use serde_json::json;

/// Application error type with HTTP response mapping.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Unknown symbol (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data (400).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The data source failed (502).
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error (500).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RoicError> for AppError {
    fn from(err: RoicError) -> Self {
        match err {
            RoicError::SymbolNotFound(symbol) => Self::NotFound(format!("symbol {symbol}")),
            RoicError::InvalidArgument(msg) => Self::BadRequest(msg),
            RoicError::DataFetch(msg) => Self::Upstream(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
