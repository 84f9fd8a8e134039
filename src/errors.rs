// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::engine::AdvanceError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    #[error("BSON serialization error: {0}")]
    BsonSerialization(#[from] mongodb::bson::ser::Error),

    #[error("Invalid ObjectId: {0}")]
    InvalidObjectId(String),

    #[error("Match not found")]
    MatchNotFound,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Match already has a result")]
    MatchAlreadyDecided,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::MongoDB(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            AppError::BsonSerialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Serialization error")
            }
            AppError::InvalidObjectId(_) => (StatusCode::BAD_REQUEST, "Invalid ID format"),
            AppError::MatchNotFound => (StatusCode::NOT_FOUND, "Match not found"),
            AppError::SessionNotFound => (StatusCode::NOT_FOUND, "Session not found"),
            AppError::MatchAlreadyDecided => {
                (StatusCode::CONFLICT, "Match already has a result")
            }
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "Validation failed"),
            AppError::ConfigurationError(_) => {
                (StatusCode::BAD_REQUEST, "Invalid match configuration")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string(),
            "success": false,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

// Manual From implementations
impl From<mongodb::bson::oid::Error> for AppError {
    fn from(err: mongodb::bson::oid::Error) -> Self {
        AppError::InvalidObjectId(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<AdvanceError> for AppError {
    fn from(err: AdvanceError) -> Self {
        match err {
            AdvanceError::MatchAlreadyDecided => AppError::MatchAlreadyDecided,
            AdvanceError::InningsInProgress => {
                AppError::ValidationError("innings end condition not met".to_string())
            }
        }
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::ConfigurationError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
