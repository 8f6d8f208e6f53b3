use std::fmt;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub const PERMISSION_DENIED: &str = "Permission Denied";

#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    Unauthorized,
    InvalidToken,
    ExpiredToken,
    CredentialHashing(String),
    TokenIssue(String),
    Database(sqlx::Error),
    StoreTimeout,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "invalid request: {msg}"),
            AppError::NotFound(msg) => write!(f, "{msg}"),
            AppError::Conflict(msg) => write!(f, "conflict: {msg}"),
            AppError::Unauthorized => write!(f, "unauthorized"),
            AppError::InvalidToken => write!(f, "invalid token"),
            AppError::ExpiredToken => write!(f, "token expired"),
            AppError::CredentialHashing(msg) => write!(f, "credential hashing failed: {msg}"),
            AppError::TokenIssue(msg) => write!(f, "token signing failed: {msg}"),
            AppError::Database(e) => write!(f, "database error: {e}"),
            AppError::StoreTimeout => write!(f, "store call exceeded its deadline"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::NotFound(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized | AppError::InvalidToken | AppError::ExpiredToken => {
                StatusCode::FORBIDDEN
            }
            AppError::CredentialHashing(_) | AppError::TokenIssue(_) | AppError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::StoreTimeout => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Validation(_) | AppError::NotFound(_) | AppError::Conflict(_) => {
                tracing::warn!(error = %self, status = status.as_u16(), "Client error");
                self.to_string()
            }
            AppError::Unauthorized | AppError::InvalidToken | AppError::ExpiredToken => {
                tracing::warn!(error = %self, "Responding with 403");
                PERMISSION_DENIED.to_string()
            }
            AppError::CredentialHashing(_) | AppError::TokenIssue(_) | AppError::Database(_) => {
                tracing::error!(error = %self, "Responding with 500");
                "Internal server error".to_string()
            }
            AppError::StoreTimeout => {
                tracing::error!(error = %self, "Responding with 503");
                "Service unavailable".to_string()
            }
        };
        (status, Json(json!({ "Error": message }))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::ExpiredToken,
            _ => AppError::InvalidToken,
        }
    }
}
