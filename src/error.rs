use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::ai_service::ProviderError;

/// Errors surfaced to HTTP clients. Each variant maps to one status code and
/// one `error` tag in the response body.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    AiResponse(String),
    #[error("{0}")]
    JsonParsing(String),
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Deployment(String),
    #[error("{0}")]
    Generation(String),
}

impl ApiError {
    pub fn tag(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "Validation Error",
            ApiError::AiResponse(_) => "AI Response Error",
            ApiError::JsonParsing(_) => "JSON Parsing Error",
            ApiError::Configuration(_) => "Configuration Error",
            ApiError::Deployment(_) => "Deployment Error",
            ApiError::Generation(_) => "Generation Error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify a failed model call. Malformed provider JSON and empty model
    /// text get their own tags; everything else is a generic generation error.
    /// Provider details stay in the logs.
    pub fn from_generation_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ProviderError>() {
            Some(ProviderError::MalformedResponse(_)) => ApiError::JsonParsing(
                "The AI response contains invalid JSON format. Please try again.".to_string(),
            ),
            Some(ProviderError::EmptyResponse(_)) => ApiError::AiResponse(
                "The AI response is missing required fields. Please try again.".to_string(),
            ),
            _ => ApiError::Generation(
                "An unexpected error occurred during website generation. Please try again later."
                    .to_string(),
            ),
        }
    }

    pub fn from_deployment_error(err: &anyhow::Error) -> Self {
        ApiError::Deployment(format!("Failed to deploy website: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.tag(),
            "details": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}
