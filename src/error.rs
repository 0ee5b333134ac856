use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    detail: String,
}

/// Why an outbound fetch did not produce a page.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("{0}")]
    RequestFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to fetch URL: {0}")]
    FetchError(#[from] FetchError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The cause is kept for logging only and never reaches the client.
    #[error("Scraping error")]
    Unexpected(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::FetchError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::FetchError(err) => tracing::warn!(error = %err, "fetch failed"),
            AppError::InvalidRequest(msg) => tracing::debug!(%msg, "rejected request"),
            AppError::Unexpected(cause) => tracing::error!(%cause, "scrape failed unexpectedly"),
            AppError::ConfigError(msg) => tracing::error!(%msg, "configuration error"),
        }

        let body = Json(ErrorResponse {
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Unexpected(err.to_string())
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
