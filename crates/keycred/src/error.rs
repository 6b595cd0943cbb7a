use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::receipt::certificate::CertificateError;
use crate::workflows::receipt::repository::DecisionStoreError;
use crate::workflows::receipt::service::ReceiptServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Serialization(serde_json::Error),
    Receipt(ReceiptServiceError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Receipt(ReceiptServiceError::PayloadTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            AppError::Receipt(ReceiptServiceError::Store(DecisionStoreError::NotFound(_))) => {
                StatusCode::NOT_FOUND
            }
            AppError::Receipt(ReceiptServiceError::Store(DecisionStoreError::Conflict(_)))
            | AppError::Receipt(ReceiptServiceError::Certificate(
                CertificateError::NotApproved { .. },
            )) => StatusCode::CONFLICT,
            AppError::Receipt(ReceiptServiceError::Store(DecisionStoreError::Unavailable(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Receipt(ReceiptServiceError::Certificate(
                CertificateError::ValidityOutOfRange { .. },
            ))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Serialization(err) => write!(f, "serialization error: {}", err),
            AppError::Receipt(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Serialization(err) => Some(err),
            AppError::Receipt(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<ReceiptServiceError> for AppError {
    fn from(value: ReceiptServiceError) -> Self {
        Self::Receipt(value)
    }
}
