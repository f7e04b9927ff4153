// HTTP error mapping
//
// Every failure leaves the server as JSON `{error, message}` with a status
// that tells the client whether to fix the request or retry later.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::documents::DocumentError;
use crate::errors::GenerationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Malformed request the extractors could not catch
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Generation(e) => match e {
                GenerationError::EmptyFeedback | GenerationError::InvalidInput(_) => {
                    StatusCode::BAD_REQUEST
                }
                GenerationError::ParseFailure(_) | GenerationError::Provider { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                GenerationError::ProviderTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
                GenerationError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Document(DocumentError::Unsupported(_)) => StatusCode::BAD_REQUEST,
            ApiError::Document(DocumentError::Unreadable { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Generation(e) => e.code(),
            ApiError::Document(DocumentError::Unsupported(_)) => "unsupported_file",
            ApiError::Document(DocumentError::Unreadable { .. }) => "unreadable_document",
            ApiError::BadRequest(_) => "invalid_input",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "Request failed: {:#}", self);
        } else {
            tracing::debug!(code = self.code(), "Request rejected: {}", self);
        }
        let body = ErrorBody {
            error: self.code(),
            message: format!("{:#}", self),
        };
        (status, Json(body)).into_response()
    }
}
