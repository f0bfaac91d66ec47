use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Every configured completion provider failed (or none is configured)
    #[error("All completion providers failed: {0}")]
    AllProvidersExhausted(String),

    /// The model's text contained no well-formed recommendation lines
    #[error("Could not parse recommendations: {0}")]
    ParseFailure(String),

    /// A catalog call failed after the bounded retry
    #[error("Catalog lookup failed: {0}")]
    CatalogLookup(String),

    /// Both the AI path and the popularity fallback came back empty
    #[error("No recommendations found that match your criteria")]
    NoMatchesFound,

    #[error("Invalid preferences: {0}")]
    InvalidPreferenceSpec(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status the boundary layer reports for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::AllProvidersExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ParseFailure(_) | AppError::NoMatchesFound => StatusCode::NOT_FOUND,
            AppError::InvalidPreferenceSpec(_) => StatusCode::BAD_REQUEST,
            AppError::CatalogLookup(_) | AppError::HttpClient(_) | AppError::ExternalApi(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::InvalidPreferenceSpec(msg) => msg.clone(),
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_exhaustion_is_service_unavailable() {
        let err = AppError::AllProvidersExhausted("gemini: timeout".to_string());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_no_matches_distinct_from_exhaustion() {
        assert_eq!(AppError::NoMatchesFound.status_code(), StatusCode::NOT_FOUND);
        assert_ne!(
            AppError::NoMatchesFound.status_code(),
            AppError::AllProvidersExhausted(String::new()).status_code()
        );
    }

    #[test]
    fn test_invalid_spec_is_bad_request() {
        let err = AppError::InvalidPreferenceSpec("minimum rating must be between 0 and 10".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Invalid preferences: minimum rating must be between 0 and 10"
        );
    }
}
