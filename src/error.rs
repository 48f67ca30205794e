// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::manager::OperationResult;

/// Stable, serializable failure category carried in every failed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Conflict,
    UnsupportedType,
    InvalidInput,
    PermissionDenied,
    Timeout,
    ValidationFailed,
    ReloadFailed,
    Io,
    SerialOverflow,
}

#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("Zone file not found")]
    ZoneFileNotFound,

    #[error("Record {hostname} {rrtype} not found")]
    RecordNotFound { hostname: String, rrtype: String },

    #[error("Record {hostname} {rrtype} already exists")]
    Conflict { hostname: String, rrtype: String },

    #[error("Unsupported record type: {0}")]
    UnsupportedType(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("command `{command}` timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("Zone validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to reload Bind9: {0}")]
    ReloadFailed(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serial counter exhausted for {0}; no more edits possible on that date")]
    SerialOverflow(String),
}

impl ZoneError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ZoneError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        ZoneError::InvalidInput(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ZoneError::ZoneFileNotFound | ZoneError::RecordNotFound { .. } => ErrorKind::NotFound,
            ZoneError::Conflict { .. } => ErrorKind::Conflict,
            ZoneError::UnsupportedType(_) => ErrorKind::UnsupportedType,
            ZoneError::InvalidInput(_) => ErrorKind::InvalidInput,
            ZoneError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            ZoneError::Timeout { .. } => ErrorKind::Timeout,
            ZoneError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            ZoneError::ReloadFailed(_) => ErrorKind::ReloadFailed,
            ZoneError::Io { .. } => ErrorKind::Io,
            ZoneError::SerialOverflow(_) => ErrorKind::SerialOverflow,
        }
    }
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::UnsupportedType | ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors raised by the HTTP layer itself, before the zone is touched.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(OperationResult::failure_message(msg));
        (status, body).into_response()
    }
}
