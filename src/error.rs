use std::fmt;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Invalid startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ConfigError {
    pub fn invalid(key: &'static str, value: impl Into<String>, reason: &'static str) -> Self {
        Self::Invalid {
            key,
            value: value.into(),
            reason,
        }
    }
}

/// Error codes reported alongside a fallback value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ProviderNotReady,
    FlagNotFound,
    ParseError,
    TypeMismatch,
    InvalidContext,
    General,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::ProviderNotReady => "PROVIDER_NOT_READY",
            Self::FlagNotFound => "FLAG_NOT_FOUND",
            Self::ParseError => "PARSE_ERROR",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::InvalidContext => "INVALID_CONTEXT",
            Self::General => "GENERAL",
        };
        f.write_str(code)
    }
}

/// Why a flag could not be resolved. Never leaves the flag client's
/// typed resolve calls; those fall back to the caller's default instead.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("flag not found: {0}")]
    FlagNotFound(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("could not parse backend response: {0}")]
    Parse(String),

    #[error("invalid evaluation context: {0}")]
    InvalidContext(String),

    #[error("provider not ready: {0}")]
    ProviderNotReady(String),

    #[error("resolution timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("{0}")]
    General(String),
}

impl ResolutionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::FlagNotFound(_) => ErrorCode::FlagNotFound,
            Self::TypeMismatch(_) => ErrorCode::TypeMismatch,
            Self::Parse(_) => ErrorCode::ParseError,
            Self::InvalidContext(_) => ErrorCode::InvalidContext,
            Self::ProviderNotReady(_) => ErrorCode::ProviderNotReady,
            Self::Timeout(_) | Self::Transport(_) | Self::General(_) => ErrorCode::General,
        }
    }
}

impl From<reqwest::Error> for ResolutionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::ProviderNotReady(format!("cannot connect to flag backend: {err}"))
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Errors returned to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Forbidden(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        };
        let detail = self.to_string();
        (status, Json(ErrorBody { detail: &detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ResolutionError::FlagNotFound("x".into()).code(),
            ErrorCode::FlagNotFound
        );
        assert_eq!(
            ResolutionError::Timeout(Duration::from_millis(10)).code(),
            ErrorCode::General
        );
        assert_eq!(ErrorCode::TypeMismatch.to_string(), "TYPE_MISMATCH");
        assert_eq!(ErrorCode::ProviderNotReady.to_string(), "PROVIDER_NOT_READY");
    }

    #[test]
    fn test_forbidden_status() {
        let response = ApiError::Forbidden("Feature disabled by flag".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
