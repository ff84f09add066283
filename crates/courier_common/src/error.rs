use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// The base error type for all Courier errors.
///
/// This enum provides the common error taxonomy used across all crates.
/// Each crate can extend this by implementing From<SpecificError> for CourierError.
#[derive(Error, Debug)]
pub enum CourierError {
    /// A required field is missing or blank; the client can correct and retry
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced user, message, or subscription does not exist (or is not owned by the caller)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid identity token; rejected before any core logic runs
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Underlying storage failure
    #[error("Database error: {0}")]
    Database(String),

    /// A push delivery attempt failed. Logged and isolated to the one
    /// subscription; never propagated to the caller.
    #[error("Delivery failure: {0}")]
    Delivery(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error that doesn't fit into any other category
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A trait for converting errors to HTTP status codes.
///
/// This trait can be implemented by error types to provide a consistent way
/// to convert errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for CourierError {
    fn status_code(&self) -> u16 {
        match self {
            CourierError::Validation(_) => 400,
            CourierError::NotFound(_) => 404,
            CourierError::Authentication(_) => 401,
            CourierError::Database(_) => 500,
            CourierError::Delivery(_) => 502,
            CourierError::Config(_) => 500,
            CourierError::Internal(_) => 500,
        }
    }
}

impl IntoResponse for CourierError {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "code": status_code.as_u16(),
            }
        }));

        (status_code, body).into_response()
    }
}

// Common error conversions
impl From<serde_json::Error> for CourierError {
    fn from(err: serde_json::Error) -> Self {
        CourierError::Internal(err.to_string())
    }
}

// Utility functions for error handling
pub fn validation_error<T: fmt::Display>(message: T) -> CourierError {
    CourierError::Validation(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> CourierError {
    CourierError::NotFound(message.to_string())
}

pub fn authentication_error<T: fmt::Display>(message: T) -> CourierError {
    CourierError::Authentication(message.to_string())
}

pub fn database_error<T: fmt::Display>(message: T) -> CourierError {
    CourierError::Database(message.to_string())
}
