use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extract::ExtractError;
use crate::llm_client::LlmError;
use crate::summarize::SummarizeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Summarization error: {0}")]
    Summarize(#[from] SummarizeError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            // Client-correctable: the uploaded document carries no readable text.
            AppError::Extraction(e) => {
                (StatusCode::BAD_REQUEST, "EXTRACTION_FAILED", e.to_string())
            }
            // Credentials rejected by the provider at request time means the
            // service is misconfigured, not that the request was bad.
            AppError::Summarize(SummarizeError::Llm(LlmError::Api { status, .. }))
                if *status == 401 || *status == 403 =>
            {
                tracing::error!("model provider rejected credentials");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PROVIDER_NOT_CONFIGURED",
                    "The model provider is not correctly configured".to_string(),
                )
            }
            AppError::Summarize(e) => {
                tracing::error!("Summarization error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SUMMARIZATION_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        let response = AppError::Validation("bad upload".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_extraction_failure_maps_to_400() {
        let response =
            AppError::Extraction(ExtractError::NoViableText { last_cause: None }).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_malformed_model_reply_maps_to_500() {
        let response =
            AppError::Summarize(SummarizeError::MalformedResponse("not json".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_rejected_credentials_map_to_503() {
        let response = AppError::Summarize(SummarizeError::Llm(LlmError::Api {
            status: 401,
            message: "invalid api key".to_string(),
        }))
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_other_llm_errors_map_to_500() {
        let response =
            AppError::Summarize(SummarizeError::Llm(LlmError::EmptyContent)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
