use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

/// The main error type for the contact gateway.
///
/// Every failure a request can hit maps onto one of these variants, and
/// every variant maps onto exactly one HTTP status. Nothing propagates
/// past the handler boundary uncaught.
#[derive(Debug, thiserror::Error)]
pub enum FormgateError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Missing required fields: name, email, message")]
    MissingFields,

    #[error("Please provide a valid email address.")]
    InvalidEmail,

    /// Required server-side settings are absent. The message names config
    /// keys only, never secret values.
    #[error("Server not configured: missing {0}")]
    Misconfigured(String),

    /// The relay or provider rejected the send. The diagnostic detail is
    /// surfaced in the response body to aid debugging.
    #[error("Failed to send email")]
    Delivery { detail: Value },

    /// Anything uncaught. The detail stays in the server log.
    #[error("Unexpected server error")]
    Internal(String),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, FormgateError>;

impl FormgateError {
    pub fn misconfigured(missing: impl Into<String>) -> Self {
        Self::Misconfigured(missing.into())
    }

    pub fn delivery(detail: impl Into<Value>) -> Self {
        Self::Delivery {
            detail: detail.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingFields | Self::InvalidEmail => StatusCode::BAD_REQUEST,
            Self::Misconfigured(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Delivery { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Full diagnostic for the server log. `Internal` hides its detail
    /// from clients, so this is the only place it surfaces.
    fn diagnostic(&self) -> String {
        match self {
            Self::Internal(detail) => detail.clone(),
            Self::Delivery { detail } => detail.to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl IntoResponse for FormgateError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), detail = %self.diagnostic(), "contact request failed");
        } else {
            tracing::warn!(status = status.as_u16(), detail = %self.diagnostic(), "contact request rejected");
        }

        let details = match &self {
            Self::Delivery { detail } => Some(detail.clone()),
            _ => None,
        };

        let body = ErrorBody {
            error: self.to_string(),
            details,
        };

        let mut response = (status, Json(body)).into_response();
        if matches!(self, Self::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, header::HeaderValue::from_static("POST"));
        }
        response
    }
}
