// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::message::ErrorResponse;

/// Failures of the outbound chat call.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response body is null")]
    NullBody,
}

/// Errors returned by the dev backend handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Failures of the reply generator behind `/api/chat`.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("responder unavailable: {0}")]
    Unavailable(String),
}

/// Why a proposed payment date was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateRejection {
    #[error("❌ Usa formato YYYY-MM-DD.")]
    BadFormat,
    #[error("❌ La fecha debe ser posterior a hoy.")]
    NotInFuture,
    #[error("⚠️ La fecha excede {max_days} días, considera un compromiso más cercano.")]
    TooFar { max_days: i64 },
}

/// Why a payment promise could not be registered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PromiseRejection {
    #[error("❌ El monto debe ser mayor que 0.")]
    NonPositiveAmount,
    #[error("❌ La fecha debe estar en formato YYYY-MM-DD.")]
    BadDate,
}
