//! Server error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Failures surfaced by the read API
#[derive(Error, Debug)]
pub enum AppError {
    #[error("catalog query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    BadRequest(String),

    /// Filter or projection names outside a view's columns
    #[error("following columns are not supported: {}", .0.join(", "))]
    UnknownColumns(Vec<String>),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::UnknownColumns(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text shown to the client; database details stay in the log
    fn public_message(&self) -> String {
        match self {
            Self::Database(_) => "query against the catalog failed".to_string(),
            Self::BadRequest(message) | Self::Unavailable(message) | Self::Internal(message) => message.clone(),
            Self::UnknownColumns(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = ?self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), %self, "Request rejected");
        }

        let body = json!({
            "error": {
                "message": self.public_message(),
                "status": status.as_u16(),
            }
        });
        (status, Json(body)).into_response()
    }
}
