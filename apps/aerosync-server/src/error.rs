//! Error types for the AeroSync server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use audit_engine::AuditError;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No document loaded in slot '{0}'")]
    DocumentNotLoaded(String),

    #[error("Section '{0}' not found")]
    SectionNotFound(String),

    #[error("Failed to load document: {0}")]
    DocumentLoad(String),

    #[error("Audit service not configured")]
    AuditUnavailable,

    #[error("Audit service error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ServerError::DocumentNotLoaded(slot) => (
                StatusCode::NOT_FOUND,
                "DOCUMENT_NOT_LOADED",
                format!("No document loaded in slot '{}'", slot),
            ),
            ServerError::SectionNotFound(title) => (
                StatusCode::NOT_FOUND,
                "SECTION_NOT_FOUND",
                format!("Section '{}' not found", title),
            ),
            ServerError::DocumentLoad(msg) => (
                StatusCode::BAD_REQUEST,
                "DOCUMENT_LOAD_FAILED",
                msg.clone(),
            ),
            ServerError::AuditUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "AUDIT_UNAVAILABLE",
                "Audit service not configured; supply an API key".to_string(),
            ),
            ServerError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone()),
            ServerError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<aerosync_core::CoreError> for ServerError {
    fn from(err: aerosync_core::CoreError) -> Self {
        use aerosync_core::CoreError;
        match err {
            CoreError::DocumentLoad(msg) => ServerError::DocumentLoad(msg),
            CoreError::TextExtraction(msg) => ServerError::DocumentLoad(msg),
            CoreError::InvalidPattern(msg) => ServerError::InvalidRequest(msg),
        }
    }
}

impl From<AuditError> for ServerError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::Config(msg) => ServerError::Internal(msg),
            other => ServerError::Upstream(other.to_string()),
        }
    }
}
