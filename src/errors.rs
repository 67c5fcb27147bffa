use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

const FALLBACK_MESSAGE: &str = "Something went wrong";

/// Error body. Shares the `{statusCode, message, data}` shape with successful responses.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    DbError(#[from] DbErr),

    #[error("{0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Upstream(String),

    #[error("")]
    Internal,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            // Every other failure, including db and upstream faults, surfaces as a 400.
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = self.public_message();
        if matches!(
            self,
            AppError::DbError(_) | AppError::ReqwestError(_) | AppError::Upstream(_) | AppError::Internal
        ) {
            log::error!("{} ({}): {}", self.code(), status, message);
        }
        let body = ErrorResponse {
            status_code: status.as_u16(),
            message,
            data: None,
        };
        HttpResponse::build(status).json(body)
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DbError(_) => "DB_ERROR",
            AppError::ReqwestError(_) => "HTTP_ERROR",
            AppError::JsonError(_) => "JSON_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Upstream(_) => "UPSTREAM",
            AppError::Internal => "INTERNAL",
        }
    }

    /// Message placed in the envelope; blank messages fall back to a generic one.
    pub fn public_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }
}
