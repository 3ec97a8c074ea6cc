use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use service::crud::Variant;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

use crate::envelope::Envelope;

/// Error body layout of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStyle {
    /// `{"detail": message}`
    Detail,
    /// `{"error": message}`
    Plain,
    /// `{"error": "Not Found", "message": message}`
    Titled,
    /// `{"status": "error", "message": message, "data": null}`
    Envelope,
}

impl ErrorStyle {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::ItemsBasic | Variant::ItemsIntermediate => ErrorStyle::Detail,
            Variant::ItemsAdvanced => ErrorStyle::Envelope,
            Variant::UsersBasic => ErrorStyle::Plain,
            Variant::UsersIntermediate | Variant::UsersAdvanced => ErrorStyle::Titled,
        }
    }

    /// Message for a request that matched no route.
    pub fn unknown_route_message(self) -> &'static str {
        match self {
            ErrorStyle::Titled => "The requested URL was not found on the server. If you entered the URL manually please check your spelling and try again.",
            _ => "Not Found",
        }
    }

    /// Message for a known route hit with a method it does not serve.
    pub fn method_not_allowed_message(self) -> &'static str {
        match self {
            ErrorStyle::Titled => "The method is not allowed for the requested URL.",
            _ => "Method Not Allowed",
        }
    }
}

/// Error leaving a handler. Every fault funnels through here, so status code
/// and body layout are decided in one place.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub style: ErrorStyle,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, style: ErrorStyle) -> Self {
        Self { status, message: message.into(), style }
    }

    /// Translate a service fault.
    pub fn from_service(err: ServiceError, style: ErrorStyle) -> Self {
        let status = match &err {
            ServiceError::BadRequest(_) | ServiceError::Conflict(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        match err {
            // internal details stay in the log
            ServiceError::Internal(detail) => {
                error!(%detail, "internal service error");
                Self::internal(style)
            }
            other => Self::new(status, other.message(), style),
        }
    }

    pub fn internal(style: ErrorStyle) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", style)
    }

    pub fn unknown_route(style: ErrorStyle) -> Self {
        Self::new(StatusCode::NOT_FOUND, style.unknown_route_message(), style)
    }

    pub fn method_not_allowed(style: ErrorStyle) -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, style.method_not_allowed_message(), style)
    }

    fn title(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), message = %self.message, "request failed");
        } else {
            warn!(status = self.status.as_u16(), message = %self.message, "request rejected");
        }
        let body = match self.style {
            ErrorStyle::Detail => json!({"detail": self.message}),
            ErrorStyle::Plain => json!({"error": self.message}),
            ErrorStyle::Titled if self.status.is_server_error() => json!({"error": self.title()}),
            ErrorStyle::Titled => json!({"error": self.title(), "message": self.message}),
            ErrorStyle::Envelope => serde_json::to_value(Envelope::<()>::error(self.message))
                .unwrap_or(serde_json::Value::Null),
        };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
